//! Meta-actions: stack transforms driven by a popped control value

use super::{EvalError, Evaluator};
use crate::resolver::MetaAction;
use crate::value::Value;
use num_traits::{Signed, ToPrimitive};

/// Interpret a control value as a count; negative counts are zero
fn count(control: &Value, action: MetaAction) -> Result<usize, EvalError> {
    let n = control.as_int().ok_or_else(|| EvalError::TypeError {
        expected: format!("int count for {}", action.name()),
        got: control.type_name().into(),
    })?;
    if n.is_negative() {
        return Ok(0);
    }
    n.to_usize()
        .ok_or_else(|| EvalError::ValueError(format!("{}: count too large", action.name())))
}

impl Evaluator {
    /// Compute the replacement values for `action`; `None` leaves the
    /// control value in place
    fn transform(
        &mut self,
        action: MetaAction,
        control: &Value,
    ) -> Result<Option<Vec<Value>>, EvalError> {
        match action {
            MetaAction::Collect => {
                let n = count(control, action)?;
                let items = self.stack.pop_n(n, action.name())?;
                Ok(Some(vec![Value::List(items)]))
            }
            MetaAction::Dup => Ok(Some(vec![control.clone(), control.clone()])),
            // Puts back what it popped, in pop order; nothing is duplicated
            MetaAction::Dups => {
                let n = count(control, action)?;
                self.stack.pop_n(n, action.name()).map(Some)
            }
        }
    }

    pub(crate) fn apply_meta(&mut self, action: MetaAction) -> Result<(), EvalError> {
        let control = self.stack.pop(action.name())?;
        match self.transform(action, &control)? {
            Some(values) => self.stack.extend(values),
            None => self.stack.push(control),
        }
        Ok(())
    }
}
