//! Canonical textual rendering of values.
//!
//! Integers print in decimal, symbols verbatim, the empty list as `nil`.
//! Lists print as space-separated elements in parentheses; a chain of pairs
//! that does not end in `Nil` shows its final tail after ` . `.

use std::fmt;

use crate::ast::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Nil => write!(f, "nil"),
            Value::Pair(..) => {
                write!(f, "(")?;
                let mut elements = self.iter();
                for (i, elem) in elements.by_ref().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{elem}")?;
                }
                let tail = elements.remainder();
                if !tail.is_nil() {
                    write!(f, " . {tail}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Render a value to its canonical text.
pub fn print(value: &Value) -> String {
    value.to_string()
}
