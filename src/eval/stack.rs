use super::EvalError;
use crate::value::Value;

/// The value stack; the last element is the top
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    items: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    pub fn extend(&mut self, values: impl IntoIterator<Item = Value>) {
        self.items.extend(values);
    }

    /// Pop the top value; `context` names the word that needed it
    pub fn pop(&mut self, context: &str) -> Result<Value, EvalError> {
        self.items
            .pop()
            .ok_or_else(|| EvalError::StackUnderflow(context.to_string()))
    }

    /// Pop `n` values, most recently pushed first.
    ///
    /// Values popped before an underflow are not put back.
    pub fn pop_n(&mut self, n: usize, context: &str) -> Result<Vec<Value>, EvalError> {
        (0..n).map(|_| self.pop(context)).collect()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.clone()
    }

    /// Replace the contents with a snapshot
    pub fn restore(&mut self, snapshot: Vec<Value>) {
        self.items = snapshot;
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_peek() {
        let mut stack = Stack::new();
        stack.push(Value::from(1));
        stack.push(Value::from(2));
        assert_eq!(stack.peek(), Some(&Value::from(2)));
        assert_eq!(stack.pop("t").unwrap(), Value::from(2));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut stack = Stack::new();
        assert_eq!(
            stack.pop("+"),
            Err(EvalError::StackUnderflow("+".into()))
        );
    }

    #[test]
    fn test_pop_n_order_and_partial_loss() {
        let mut stack = Stack::new();
        stack.extend([1i64, 2, 3].map(Value::from));
        assert_eq!(
            stack.pop_n(2, "t").unwrap(),
            vec![Value::from(3), Value::from(2)]
        );
        assert!(stack.pop_n(2, "t").is_err());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut stack = Stack::new();
        stack.push(Value::from(1));
        let saved = stack.snapshot();
        stack.push(Value::from(2));
        stack.restore(saved);
        assert_eq!(stack.as_slice(), &[Value::from(1)]);
        stack.clear();
        assert!(stack.is_empty());
    }
}
