//! Name bindings for evaluation.
//!
//! The environment is a singly-linked association list: new bindings are
//! prepended and lookup walks from the most recent binding, so an older binding
//! of the same name is shadowed but never removed. Nodes are shared through
//! [`Rc`], which makes cloning an environment O(1) and lets every extension
//! keep the original intact.

use std::rc::Rc;

use crate::ast::Value;

#[derive(Debug, PartialEq)]
struct Binding {
    name: String,
    value: Value,
    next: Option<Rc<Binding>>,
}

/// Environment for variable bindings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    head: Option<Rc<Binding>>,
}

impl Environment {
    /// An environment without any bindings.
    pub fn new() -> Self {
        Environment { head: None }
    }

    /// Prepend a binding. An existing binding of `name` stays in the list but
    /// is shadowed by this one.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let next = self.head.take();
        self.head = Some(Rc::new(Binding {
            name: name.into(),
            value,
            next,
        }));
    }

    /// A new environment that extends this one with a single binding.
    pub fn extend(&self, name: impl Into<String>, value: Value) -> Self {
        let mut env = self.clone();
        env.define(name, value);
        env
    }

    /// Look up the most recent binding of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings()
            .find(|(bound, _)| *bound == name)
            .map(|(_, value)| value)
    }

    /// All bindings, most recently added first, shadowed ones included.
    pub fn bindings(&self) -> Bindings<'_> {
        Bindings {
            node: self.head.as_deref(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl Drop for Binding {
    // Unlink the chain iteratively so a long environment cannot exhaust the
    // stack through recursive drops.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut binding) => next = binding.next.take(),
                Err(_) => break,
            }
        }
    }
}

/// Iterator over `(name, value)` pairs of an [`Environment`].
#[derive(Debug, Clone)]
pub struct Bindings<'a> {
    node: Option<&'a Binding>,
}

impl<'a> Iterator for Bindings<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.next.as_deref();
        Some((node.name.as_str(), &node.value))
    }
}
