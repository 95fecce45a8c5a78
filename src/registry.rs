//! Symbol table: named constants and callables
//!
//! Each callable is registered with a [`Signature`] describing its
//! positional parameters. The number of parameters without a default is the
//! number of values popped from the stack before the call. Callables whose
//! signature cannot be described ([`Signature::Opaque`]) take one argument.

use crate::builtins;
use crate::ops::OpResult;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// Arity assumed for callables with an opaque signature
pub const OPAQUE_ARITY: usize = 1;

/// Implementation of a callable: positional args plus a sink for printed lines
pub type BuiltinFn = fn(&[Value], &mut Vec<String>) -> OpResult;

/// A positional parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub has_default: bool,
}

/// Parameter without a default
pub const fn req(name: &'static str) -> Param {
    Param { name, has_default: false }
}

/// Parameter with a default
pub const fn opt(name: &'static str) -> Param {
    Param { name, has_default: true }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Params(&'static [Param]),
    /// Variadic or otherwise undescribable
    Opaque,
}

impl Signature {
    /// Number of values the callable consumes from the stack
    pub fn arity(&self) -> usize {
        match self {
            Signature::Params(params) => params.iter().filter(|p| !p.has_default).count(),
            Signature::Opaque => OPAQUE_ARITY,
        }
    }
}

/// A named host function
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub signature: Signature,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    /// Call with arguments in stack-pop order (args[0] was on top)
    pub fn call(&self, args: &[Value], out: &mut Vec<String>) -> OpResult {
        (self.func)(args, out)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({}/{})", self.name, self.arity())
    }
}

/// What a name is bound to
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Constant(Value),
    Callable(Builtin),
}

/// Curated global symbol table
#[derive(Debug, Clone, Default)]
pub struct Registry {
    constants: HashMap<&'static str, Value>,
    callables: HashMap<&'static str, Builtin>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry populated with the standard constants and builtins
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.define_constant("pi", Value::Float(std::f64::consts::PI));
        registry.define_constant("e", Value::Float(std::f64::consts::E));
        registry.define_constant("tau", Value::Float(std::f64::consts::TAU));
        registry.define_constant("inf", Value::Float(f64::INFINITY));
        registry.define_constant("nan", Value::Float(f64::NAN));
        registry.define_constant("True", Value::Bool(true));
        registry.define_constant("False", Value::Bool(false));
        for builtin in builtins::all() {
            registry.register(builtin);
        }
        registry
    }

    pub fn define_constant(&mut self, name: &'static str, value: Value) {
        self.constants.insert(name, value);
    }

    pub fn register(&mut self, builtin: Builtin) {
        self.callables.insert(builtin.name, builtin);
    }

    /// Look a name up: constants win over callables
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        if let Some(v) = self.constants.get(name) {
            return Some(Symbol::Constant(v.clone()));
        }
        self.callables.get(name).map(|b| Symbol::Callable(*b))
    }

    pub fn callable(&self, name: &str) -> Option<Builtin> {
        self.callables.get(name).copied()
    }

    /// Sorted names of all constants
    pub fn constant_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.constants.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Sorted names of all callables (for help output)
    pub fn callable_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.callables.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
