//! This module defines the value model shared by every stage of the interpreter.
//! The main enum, [`Value`], is a closed tagged union of integers, symbols, cons
//! cells and the empty list. Pairs own their children through [`Rc`], so results
//! of `quote` can hand back subtrees of the parsed expression without copying
//! them, and everything is released once the last owner goes away.
//!
//! Helper functions such as [`Value::cons`] and [`Value::list`] and the `From`
//! conversions for Rust integers, arrays and vectors keep construction terse in
//! code and tests.

use std::rc::Rc;

use crate::Error;

/// Type alias for number values in interpreter
pub type NumberType = i64;

/// Core value type of the interpreter
///
/// There is exactly one logical empty list: the payload-free [`Value::Nil`]
/// variant, so checking for it is a tag comparison.
///
/// Comparing and dropping walk the tail chain in a loop, so list length is
/// not limited by the stack.
#[derive(Clone)]
pub enum Value {
    /// Signed integer scalar
    Integer(NumberType),
    /// Identifier, used for variable names and primitive operator names
    Symbol(String),
    /// Cons cell (head, tail)
    Pair(Rc<Value>, Rc<Value>),
    /// The empty list
    Nil,
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Pair(head, tail) => write!(f, "Pair({head:?}, {tail:?})"),
            Value::Nil => write!(f, "Nil"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        loop {
            match (left, right) {
                (Value::Pair(lh, lt), Value::Pair(rh, rt)) => {
                    if !Rc::ptr_eq(lh, rh) && lh != rh {
                        return false;
                    }
                    left = lt;
                    right = rt;
                }
                (Value::Integer(a), Value::Integer(b)) => return a == b,
                (Value::Symbol(a), Value::Symbol(b)) => return a == b,
                (Value::Nil, Value::Nil) => return true,
                _ => return false,
            }
        }
    }
}

impl Eq for Value {}

thread_local! {
    // Stand-in left behind in pairs whose children were moved out during drop
    static DETACHED: Rc<Value> = Rc::new(Value::Nil);
}

fn detach(slot: &mut Rc<Value>) -> Rc<Value> {
    let placeholder = DETACHED
        .try_with(Rc::clone)
        .unwrap_or_else(|_| Rc::new(Value::Nil));
    std::mem::replace(slot, placeholder)
}

impl Drop for Value {
    // Unlink uniquely owned pairs iteratively; heads and tails can both be
    // arbitrarily long chains when built through the API.
    fn drop(&mut self) {
        let Value::Pair(head, tail) = self else {
            return;
        };
        let mut pending = vec![detach(head), detach(tail)];
        while let Some(node) = pending.pop() {
            if let Ok(mut value) = Rc::try_unwrap(node)
                && let Value::Pair(head, tail) = &mut value
            {
                pending.push(detach(head));
                pending.push(detach(tail));
            }
        }
    }
}

impl Value {
    /// Construct a symbol value.
    pub fn symbol<S: AsRef<str>>(name: S) -> Value {
        Value::Symbol(name.as_ref().to_owned())
    }

    /// Construct a cons cell from a head and a tail.
    pub fn cons(head: Value, tail: Value) -> Value {
        Value::Pair(Rc::new(head), Rc::new(tail))
    }

    /// Build a proper, `Nil`-terminated list from a sequence of values.
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Value::Nil, |tail, head| Value::cons(head, tail))
    }

    /// Wrap an expression the way the `'` reader shorthand does:
    /// `(quote expr)`.
    pub fn quoted(expr: Value) -> Value {
        Value::list([Value::symbol("quote"), expr])
    }

    /// Check if a value is the empty list
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Head of a pair, `None` for anything else.
    pub fn head(&self) -> Option<&Value> {
        match self {
            Value::Pair(head, _) => Some(head.as_ref()),
            _ => None,
        }
    }

    /// Tail of a pair, `None` for anything else.
    pub fn tail(&self) -> Option<&Value> {
        match self {
            Value::Pair(_, tail) => Some(tail.as_ref()),
            _ => None,
        }
    }

    /// Iterate over the heads of a chain of pairs.
    ///
    /// Iteration stops at the first tail that is not a pair; use
    /// [`ListIter::remainder`] to see what terminated the chain.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter { rest: self }
    }

    /// True for `Nil` and for chains of pairs ending in `Nil`.
    pub fn is_proper_list(&self) -> bool {
        let mut iter = self.iter();
        for _ in iter.by_ref() {}
        iter.remainder().is_nil()
    }
}

/// Iterator over the elements of a (possibly improper) list.
#[derive(Debug, Clone)]
pub struct ListIter<'a> {
    rest: &'a Value,
}

impl<'a> ListIter<'a> {
    /// The part of the list not yet visited. Once the iterator is exhausted
    /// this is `Nil` for a proper list or the dotted tail otherwise.
    pub fn remainder(&self) -> &'a Value {
        self.rest
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let current: &'a Value = self.rest;
        match current {
            Value::Pair(head, tail) => {
                self.rest = tail.as_ref();
                Some(head.as_ref())
            }
            _ => None,
        }
    }
}

impl std::iter::FusedIterator for ListIter<'_> {}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Integer(NumberType::from(n))
            }
        }
    };
}

// Generate From implementations for the integer types that widen losslessly
impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v.into_iter().map(Into::into))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::list(arr.into_iter().map(Into::into))
    }
}

impl TryFrom<Value> for NumberType {
    type Error = Error;

    fn try_from(value: Value) -> Result<NumberType, Error> {
        match value {
            Value::Integer(n) => Ok(n),
            other => Err(Error::TypeError(format!("expected integer, got {other}"))),
        }
    }
}

/// Helper function for creating symbols in tests and mixed lists
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::symbol(name)
}

/// Helper function for creating Values from anything convertible
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

#[cfg(test)]
mod helper_function_tests {
    use super::*;

    #[test]
    fn test_helper_functions_data_driven() {
        let test_cases = vec![
            (val(42), Value::Integer(42)),
            (val(-17), Value::Integer(-17)),
            (val(255u8), Value::Integer(255)),
            (val(-32768i16), Value::Integer(-32768)),
            (val(4294967295u32), Value::Integer(4294967295)),
            (val(NumberType::MIN), Value::Integer(NumberType::MIN)),
            (sym("+"), Value::Symbol("+".to_owned())),
            (sym(String::from("quote")), Value::Symbol("quote".to_owned())),
            (
                val([1, 2]),
                Value::cons(
                    Value::Integer(1),
                    Value::cons(Value::Integer(2), Value::Nil),
                ),
            ),
            (
                val(vec![sym("a"), val(1)]),
                Value::cons(sym("a"), Value::cons(Value::Integer(1), Value::Nil)),
            ),
            (Value::list(Vec::<Value>::new()), Value::Nil),
            (
                Value::quoted(sym("x")),
                Value::cons(sym("quote"), Value::cons(sym("x"), Value::Nil)),
            ),
        ];

        for (i, (actual, expected)) in test_cases.iter().enumerate() {
            assert_eq!(actual, expected, "Test case {} failed", i + 1);
        }
    }

    #[test]
    fn test_list_iteration() {
        let proper = val([1, 2, 3]);
        let items: Vec<&Value> = proper.iter().collect();
        assert_eq!(items, vec![&val(1), &val(2), &val(3)]);
        assert!(proper.is_proper_list());
        assert!(Value::Nil.is_proper_list());

        let dotted = Value::cons(val(1), Value::cons(val(2), val(3)));
        let mut iter = dotted.iter();
        assert_eq!(iter.next(), Some(&val(1)));
        assert_eq!(iter.next(), Some(&val(2)));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.remainder(), &val(3));
        assert!(!dotted.is_proper_list());
        assert!(!val(7).is_proper_list());
    }

    #[test]
    fn test_accessors() {
        let pair = Value::cons(sym("a"), val(1));
        assert_eq!(pair.head(), Some(&sym("a")));
        assert_eq!(pair.tail(), Some(&val(1)));
        assert_eq!(val(1).head(), None);
        assert_eq!(Value::Nil.tail(), None);
        assert!(Value::Nil.is_nil());
        assert!(!val([1]).is_nil());
    }

    #[test]
    fn test_long_chains_compare_and_drop() {
        const LEN: usize = 1_000_000;

        let long = Value::list(std::iter::repeat_n(val(1), LEN).collect::<Vec<_>>());
        let same = Value::list(std::iter::repeat_n(val(1), LEN).collect::<Vec<_>>());
        assert_eq!(long.iter().count(), LEN);
        assert!(long == same);
        drop(same);

        let mut different: Vec<Value> = std::iter::repeat_n(val(1), LEN).collect();
        different[LEN - 1] = val(2);
        assert!(long != Value::list(different));

        // Shared structure survives dropping one owner
        let shared = long.clone();
        drop(long);
        assert_eq!(shared.iter().count(), LEN);

        // Nesting through heads: ((((...))))
        let nested = (0..LEN).fold(Value::Nil, |inner, _| Value::list([inner]));
        drop(nested);
    }

    #[test]
    fn test_integer_conversion() {
        assert_eq!(NumberType::try_from(val(5)), Ok(5));
        assert!(matches!(
            NumberType::try_from(sym("x")),
            Err(Error::TypeError(_))
        ));
    }
}
