use super::stack::Stack;
use crate::value::Value;

/// Single-slot undo history: the stack as it was before the last line
#[derive(Debug, Clone, Default)]
pub struct History {
    previous: Vec<Value>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the current stack, replacing the previous snapshot
    pub fn record(&mut self, stack: &Stack) {
        self.previous = stack.snapshot();
    }

    pub fn previous(&self) -> &[Value] {
        &self.previous
    }

    /// Put the remembered stack back; the slot keeps its snapshot
    pub fn restore_into(&self, stack: &mut Stack) {
        stack.restore(self.previous.clone());
    }

    pub fn forget(&mut self) {
        self.previous.clear();
    }
}
