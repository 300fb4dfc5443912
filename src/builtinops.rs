//! Registry of the primitive operators.
//!
//! There are exactly five primitives. Four are integer folds, `+ - * /`, and
//! one is a special form, `quote`. The evaluator resolves the symbol in operator
//! position through this registry; nothing can be added at run time.
//!
//! ## Argument evaluation
//!
//! Arithmetic primitives receive a [`NumArgs`] iterator that evaluates one
//! argument per step, left to right. A fold therefore stops at the first
//! failing step: `(/ 1 0 x)` reports the zero divisor before `x` is ever looked
//! up. `quote` receives its argument list unevaluated.
//!
//! ## Kept quirks
//!
//! - `(- a)` is `a`, not its negation.
//! - `(/)` is a division-by-zero error rather than an identity.
//!
//! Regression tests for both live in this module and in the evaluator.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::Error;
use crate::ast::{NumberType, Value};
use crate::environment::Environment;
use crate::evaluator::{NumArgs, eval_quote};

/// Represents the implementation of a primitive operator
#[derive(Clone, Copy)]
pub enum OpKind {
    /// Integer fold over arguments evaluated one at a time
    Arithmetic(fn(NumArgs<'_>) -> Result<NumberType, Error>),
    /// Special form receiving the unevaluated argument list, the environment
    /// and the current evaluation depth
    SpecialForm(fn(&Value, &Environment, usize) -> Result<Value, Error>),
}

impl std::fmt::Debug for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Arithmetic(_) => write!(f, "Arithmetic(<fn>)"),
            OpKind::SpecialForm(_) => write!(f, "SpecialForm(<fn>)"),
        }
    }
}

/// Accepted number of arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Any,
    AtLeast(usize),
}

impl Arity {
    /// Check the length of an (unevaluated) argument list.
    pub fn validate(&self, operator: &str, args: &Value) -> Result<(), Error> {
        match *self {
            Arity::Any => Ok(()),
            Arity::AtLeast(min) => {
                let got = args.iter().count();
                if got < min {
                    Err(Error::arity_error(operator, min, got))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Definition of a primitive operator
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    /// Symbol naming this operator
    pub id: &'static str,
    pub op_kind: OpKind,
    pub arity: Arity,
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl BuiltinOp {
    pub fn is_special_form(&self) -> bool {
        matches!(self.op_kind, OpKind::SpecialForm(_))
    }
}

fn overflow(operation: &str) -> Error {
    Error::EvalError(format!("Integer overflow in {operation}"))
}

fn builtin_add(args: NumArgs<'_>) -> Result<NumberType, Error> {
    let mut sum: NumberType = 0;
    for arg in args {
        sum = sum.checked_add(arg?).ok_or_else(|| overflow("addition"))?;
    }
    Ok(sum)
}

fn builtin_sub(mut args: NumArgs<'_>) -> Result<NumberType, Error> {
    let Some(first) = args.next() else {
        return Ok(0);
    };

    // A single argument comes back unchanged
    let mut result = first?;
    for arg in args {
        result = result
            .checked_sub(arg?)
            .ok_or_else(|| overflow("subtraction"))?;
    }
    Ok(result)
}

fn builtin_mul(args: NumArgs<'_>) -> Result<NumberType, Error> {
    let mut product: NumberType = 1;
    for arg in args {
        product = product
            .checked_mul(arg?)
            .ok_or_else(|| overflow("multiplication"))?;
    }
    Ok(product)
}

fn builtin_div(mut args: NumArgs<'_>) -> Result<NumberType, Error> {
    let Some(first) = args.next() else {
        return Err(Error::DivisionByZero);
    };

    let mut quotient = first?;
    for arg in args {
        let divisor = arg?;
        if divisor == 0 {
            return Err(Error::DivisionByZero);
        }
        // Truncates toward zero; only MIN / -1 can fail here
        quotient = quotient
            .checked_div(divisor)
            .ok_or_else(|| overflow("division"))?;
    }
    Ok(quotient)
}

/// Global registry of all primitive operators, in binding order.
static BUILTIN_OPS: [BuiltinOp; 5] = [
    BuiltinOp {
        id: "+",
        op_kind: OpKind::Arithmetic(builtin_add),
        arity: Arity::Any,
    },
    BuiltinOp {
        id: "-",
        op_kind: OpKind::Arithmetic(builtin_sub),
        arity: Arity::Any,
    },
    BuiltinOp {
        id: "*",
        op_kind: OpKind::Arithmetic(builtin_mul),
        arity: Arity::Any,
    },
    BuiltinOp {
        id: "/",
        op_kind: OpKind::Arithmetic(builtin_div),
        // Zero operands is reported as division by zero by the fold itself
        arity: Arity::Any,
    },
    BuiltinOp {
        id: "quote",
        op_kind: OpKind::SpecialForm(eval_quote),
        arity: Arity::AtLeast(1),
    },
];

static BUILTIN_BY_ID: LazyLock<HashMap<&'static str, &'static BuiltinOp>> =
    LazyLock::new(|| BUILTIN_OPS.iter().map(|op| (op.id, op)).collect());

/// Get all primitive operators (for environment setup)
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    &BUILTIN_OPS
}

/// Find a primitive operator by the symbol naming it
pub fn find_builtin_op(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_BY_ID.get(id).copied()
}
