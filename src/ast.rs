//! This module defines the core value type shared by code and data, and the
//! structural operations over it. The main enum, [`Value`], covers booleans,
//! integers, symbols, the empty list, cons cells, closures and builtin
//! procedures. Cons cells are reference counted so list tails can be shared
//! between lists without copying.
//!
//! Ergonomic helper functions such as [`val`], [`sym`] and [`nil`] are provided
//! for convenient construction in both code and tests, together with `From`
//! conversions from Rust literals, arrays and vectors (which build proper
//! lists). Equality and display follow Scheme conventions: `equal?` is deep
//! structural equality, improper lists print with a dot.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::Error;
use crate::builtinops::BuiltinOp;

/// Type alias for number values in interpreter
pub type NumberType = i64;

/// A cons cell. `rest` need not be a list.
pub struct Pair {
    pub first: Value,
    pub rest: Value,
}

// Long lists would otherwise be dropped recursively, one native frame per cell.
impl Drop for Pair {
    fn drop(&mut self) {
        let mut next = std::mem::replace(&mut self.rest, Value::Nil);
        while let Value::Pair(cell) = next {
            match Rc::try_unwrap(cell) {
                Ok(mut pair) => next = std::mem::replace(&mut pair.rest, Value::Nil),
                Err(_) => break,
            }
        }
    }
}

/// A user-defined procedure.
///
/// No environment is captured: free variables in `body` are looked up in the
/// caller's frames when the closure is applied.
pub struct Closure {
    pub params: Vec<String>,
    pub body: Value,
    /// Name shown by the printer, `anonymous` for plain lambdas
    pub name: String,
}

/// Core value type in interpreter
///
/// To build values, use the ergonomic helper functions:
/// - `val(42)` for values, `sym("name")` for symbols, `nil()` for the empty list
/// - `val([1, 2, 3])` for homogeneous lists
/// - `val(vec![sym("op"), val(42)])` for mixed lists
#[derive(Clone)]
pub enum Value {
    /// `#t` / `#f`
    Bool(bool),
    /// Numbers (integers only)
    Number(NumberType),
    /// Symbols (identifiers), compared by content
    Symbol(String),
    /// The empty list `()`
    Nil,
    /// A cons cell; chains of pairs ending in `Nil` are proper lists
    Pair(Rc<Pair>),
    /// User-defined procedure created by `lambda` or `define`
    Closure(Rc<Closure>),
    /// Entry of the builtin table (procedure or special form)
    Builtin(Arc<BuiltinOp>),
}

impl Value {
    /// Build a single cons cell
    pub fn cons(first: Value, rest: Value) -> Value {
        Value::Pair(Rc::new(Pair { first, rest }))
    }

    /// Build a proper list from the given elements
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        Value::improper_list(items, Value::Nil)
    }

    /// Build a list whose final `rest` is `tail`.
    ///
    /// With no items the result is `tail` itself; with a list `tail` the
    /// result is a proper list sharing `tail`'s cells.
    pub fn improper_list<I>(items: I, tail: Value) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(tail, |rest, first| Value::cons(first, rest))
    }

    /// Falsy test used by conditionals: true for `()` and `#f`.
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Check if a value is the empty list `()` (and not `#f`)
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// True for proper lists: `()` or a pair whose rest is a proper list
    pub fn is_list(&self) -> bool {
        let mut iter = self.iter_list();
        let _ = iter.by_ref().count();
        iter.tail().is_nil()
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Builtin(_))
    }

    /// Iterate over the `first` slots of a pair chain.
    ///
    /// Iteration stops at the first non-pair; [`ListIter::tail`] tells whether
    /// that was `()`.
    pub fn iter_list(&self) -> ListIter<'_> {
        ListIter { current: self }
    }

    /// Elements of a proper list, or `None` for anything else
    pub fn to_vec(&self) -> Option<Vec<Value>> {
        let mut iter = self.iter_list();
        let items: Vec<Value> = iter.by_ref().cloned().collect();
        iter.tail().is_nil().then_some(items)
    }

    /// Number of elements of a proper list
    pub fn list_length(&self) -> Result<usize, Error> {
        let mut iter = self.iter_list();
        let count = iter.by_ref().count();
        if iter.tail().is_nil() {
            Ok(count)
        } else {
            Err(Error::TypeError(format!("expected a proper list, got {self}")))
        }
    }

    /// A new proper list equal to `self` with `value` appended.
    ///
    /// The spine is copied, so lists sharing cells with `self` are unaffected.
    pub fn list_append(&self, value: Value) -> Result<Value, Error> {
        let Some(mut items) = self.to_vec() else {
            return Err(Error::TypeError(format!(
                "expected a proper list, got {self}"
            )));
        };
        items.push(value);
        Ok(Value::list(items))
    }

    /// True iff `self` is a proper list of 2-element proper lists
    pub fn is_assoc_list(&self) -> bool {
        self.is_list()
            && self
                .iter_list()
                .all(|entry| matches!(entry.list_length(), Ok(2)))
    }

    /// First entry whose key is `equal?` to `key`
    pub fn assoc_list_get(&self, key: &Value) -> Option<&Value> {
        self.iter_list().find(|entry| match entry {
            Value::Pair(pair) => pair.first == *key,
            _ => false,
        })
    }

    /// Short variant name used in type error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "integer",
            Value::Symbol(_) => "symbol",
            Value::Nil => "empty list",
            Value::Pair(_) => "pair",
            Value::Closure(_) => "procedure",
            Value::Builtin(_) => "builtin",
        }
    }
}

/// Borrowing iterator over list elements, see [`Value::iter_list`]
pub struct ListIter<'a> {
    current: &'a Value,
}

impl<'a> ListIter<'a> {
    /// The part of the chain not yet visited
    pub fn tail(&self) -> &'a Value {
        self.current
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current {
            Value::Pair(pair) => {
                self.current = &pair.rest;
                Some(&pair.first)
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Nil => write!(f, "Nil"),
            Value::Pair(pair) => write!(f, "Pair({:?}, {:?})", pair.first, pair.rest),
            Value::Closure(closure) => write!(
                f,
                "Closure({}, params={:?}, body={:?})",
                closure.name, closure.params, closure.body
            ),
            Value::Builtin(op) => write!(f, "Builtin({})", op.id),
        }
    }
}

// From trait implementations for Value - enables .into() conversion
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Number(NumberType::from(n))
            }
        }
    };
}

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
            Value::Number(n) => Ok(n),
            other => Err(Error::TypeError(format!(
                "expected integer, got {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<bool, Error> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(Error::TypeError(format!(
                "expected boolean, got {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for Rc<Pair> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Rc<Pair>, Error> {
        match value {
            Value::Pair(pair) => Ok(pair),
            other => Err(Error::TypeError(format!(
                "expected cons cell, got {}",
                other.type_name()
            ))),
        }
    }
}

/// Helper function for creating symbols
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating Values from anything convertible
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for creating the empty list (nil)
pub fn nil() -> Value {
    Value::Nil
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Number(n) => write!(f, "{n}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Nil => write!(f, "()"),
            Value::Pair(_) => {
                write!(f, "(")?;
                let mut elements = self.iter_list();
                for (i, elem) in elements.by_ref().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{elem}")?;
                }
                let tail = elements.tail();
                if !tail.is_nil() {
                    write!(f, " . {tail}")?;
                }
                write!(f, ")")
            }
            Value::Closure(closure) => write!(f, "#<procedure:{}>", closure.name),
            Value::Builtin(op) => write!(f, "#<builtin:{}>", op.id),
        }
    }
}

/// Deep structural equality (`equal?`).
///
/// Pairs compare element-wise; closures and builtins only equal themselves.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        // Walk the rest slots iteratively so long lists don't recurse per cell.
        loop {
            match (left, right) {
                (Value::Pair(a), Value::Pair(b)) => {
                    if Rc::ptr_eq(a, b) {
                        return true;
                    }
                    if a.first != b.first {
                        return false;
                    }
                    left = &a.rest;
                    right = &b.rest;
                }
                (Value::Bool(a), Value::Bool(b)) => return a == b,
                (Value::Number(a), Value::Number(b)) => return a == b,
                (Value::Symbol(a), Value::Symbol(b)) => return a == b,
                (Value::Nil, Value::Nil) => return true,
                (Value::Closure(a), Value::Closure(b)) => return Rc::ptr_eq(a, b),
                (Value::Builtin(a), Value::Builtin(b)) => return Arc::ptr_eq(a, b),
                _ => return false, // Different variants are never equal
            }
        }
    }
}
