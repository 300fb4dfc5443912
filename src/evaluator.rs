use log::trace;

use crate::Error;
use crate::MAX_EVAL_DEPTH;
use crate::ast::{NumberType, Value};
use crate::builtinops::{OpKind, find_builtin_op, get_builtin_ops};
use crate::environment::Environment;

/// Evaluate an expression (public API)
pub fn eval(expr: &Value, env: &Environment) -> Result<Value, Error> {
    eval_with_depth_tracking(expr, env, 0)
}

/// Evaluate an expression with depth tracking to prevent stack overflow
fn eval_with_depth_tracking(expr: &Value, env: &Environment, depth: usize) -> Result<Value, Error> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(Error::EvalError(format!(
            "Evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})"
        )));
    }
    match expr {
        // Self-evaluating forms
        Value::Integer(_) | Value::Nil => Ok(expr.clone()),

        // Variable lookup
        Value::Symbol(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnboundSymbol(name.clone())),

        // Application: head names the operator, tail is the argument list
        Value::Pair(operator, args) => apply_with_depth(operator, args, env, depth),
    }
}

/// Apply the primitive named by `operator` to the unevaluated argument list `args`.
///
/// The operator itself is not evaluated: it must be a symbol naming one of the
/// primitives in [`crate::builtinops`].
pub fn apply(operator: &Value, args: &Value, env: &Environment) -> Result<Value, Error> {
    apply_with_depth(operator, args, env, 0)
}

fn apply_with_depth(
    operator: &Value,
    args: &Value,
    env: &Environment,
    depth: usize,
) -> Result<Value, Error> {
    let Value::Symbol(name) = operator else {
        return Err(Error::NonSymbolOperator);
    };
    let op = find_builtin_op(name).ok_or_else(|| Error::UnknownOperator(name.clone()))?;
    op.arity.validate(op.id, args)?;

    trace!("apply {name} to {args}");
    match op.op_kind {
        OpKind::Arithmetic(fold) => {
            fold(NumArgs::new(op.id, args, env, depth)).map(Value::Integer)
        }
        OpKind::SpecialForm(special_form) => special_form(args, env, depth),
    }
}

/// Evaluate every element of a list, left to right, into a new list.
pub fn eval_list(list: &Value, env: &Environment) -> Result<Value, Error> {
    let mut elements = list.iter();
    let values = elements
        .by_ref()
        .map(|element| eval_with_depth_tracking(element, env, 1))
        .collect::<Result<Vec<_>, _>>()?;

    let remainder = elements.remainder();
    if !remainder.is_nil() {
        return Err(improper_argument_list(remainder));
    }
    Ok(Value::list(values))
}

fn improper_argument_list(tail: &Value) -> Error {
    Error::EvalError(format!("Improper argument list ending in {tail}"))
}

/// Arguments of an arithmetic primitive, evaluated one per `next` call.
///
/// Every item is the integer value of the next argument expression, or the
/// error that evaluating it produced. A dotted tail yields one error and then
/// ends the iteration.
pub struct NumArgs<'a> {
    operator: &'static str,
    rest: Option<&'a Value>,
    env: &'a Environment,
    depth: usize,
}

impl<'a> NumArgs<'a> {
    pub(crate) fn new(
        operator: &'static str,
        args: &'a Value,
        env: &'a Environment,
        depth: usize,
    ) -> Self {
        NumArgs {
            operator,
            rest: Some(args),
            env,
            depth,
        }
    }

    fn eval_integer(&self, expr: &Value) -> Result<NumberType, Error> {
        match eval_with_depth_tracking(expr, self.env, self.depth + 1)? {
            Value::Integer(n) => Ok(n),
            other => Err(Error::TypeError(format!(
                "'{}' expects integer arguments, got {other}",
                self.operator
            ))),
        }
    }
}

impl Iterator for NumArgs<'_> {
    type Item = Result<NumberType, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rest? {
            Value::Nil => {
                self.rest = None;
                None
            }
            Value::Pair(head, tail) => {
                self.rest = Some(tail.as_ref());
                Some(self.eval_integer(head))
            }
            improper => {
                self.rest = None;
                Some(Err(improper_argument_list(improper)))
            }
        }
    }
}

/// Evaluate quote special form: hand back the first argument untouched
pub(crate) fn eval_quote(args: &Value, _env: &Environment, _depth: usize) -> Result<Value, Error> {
    // Arguments after the first are ignored
    args.head()
        .cloned()
        .ok_or_else(|| Error::arity_error("quote", 1, 0))
}

/// Create a global environment with every primitive bound to its own name
pub fn create_global_env() -> Environment {
    let mut env = Environment::new();
    for builtin_op in get_builtin_ops() {
        env.define(builtin_op.id, Value::symbol(builtin_op.id));
    }
    env
}
