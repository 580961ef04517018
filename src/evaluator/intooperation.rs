use crate::Error;
use crate::ast::{NumberType, Value};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::Arc;

// Adapter layer that turns strongly-typed Rust functions into the erased
// `OperationFn` stored in builtin table entries. Host code reaches it through
// `Environment::register_builtin_operation` and friends.

/// Canonical erased builtin function type used by the evaluator.
///
/// Builtins receive ownership of their evaluated argument vector. Arity has
/// already been checked against the table entry when this is called.
pub type OperationFn = dyn Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync;

// =====================================================================
// Fixed parameters
// =====================================================================

/// Turns one evaluated operand into a typed parameter.
///
/// The associated `Param<'a>` type is the parameter type as seen by the
/// builtin for a given lifetime of the local argument slot.
pub trait FromParam {
    type Param<'a>;

    fn from_arg<'a>(value: &'a mut Value) -> Result<Self::Param<'a>, Error>;
}

impl FromParam for Value {
    type Param<'a> = Value;

    fn from_arg<'a>(value: &'a mut Value) -> Result<Self::Param<'a>, Error> {
        Ok(std::mem::replace(value, Value::Nil))
    }
}

// Covers `NumberType`, `bool` and `Rc<Pair>`, for which `ast.rs` provides
// `TryFrom<Value>`.
impl<T> FromParam for T
where
    Value: TryInto<T, Error = Error>,
{
    type Param<'a> = T;

    fn from_arg<'a>(value: &'a mut Value) -> Result<Self::Param<'a>, Error> {
        let owned = std::mem::replace(value, Value::Nil);
        <Value as TryInto<T>>::try_into(owned)
    }
}

// =====================================================================
// Rest parameters
// =====================================================================

/// Describes how to view a run of operands as a typed iterator: an upfront
/// check over the whole run, then a projection per element.
#[doc(hidden)]
pub trait ValueElementKind {
    type Item<'a>;

    fn precheck(slice: &[Value]) -> Result<(), Error>;
    fn project<'a>(v: &'a Value) -> Self::Item<'a>;
}

/// Iterator over the trailing operands of a call, parameterized by a
/// [`ValueElementKind`] that determines the element type and validation.
#[doc(hidden)]
pub struct TypedValueIter<'a, K: ValueElementKind> {
    inner: std::slice::Iter<'a, Value>,
    _marker: PhantomData<K>,
}

impl<'a, K> TypedValueIter<'a, K>
where
    K: ValueElementKind,
{
    pub(crate) fn new(values: &'a [Value]) -> Result<Self, Error> {
        K::precheck(values)?;
        Ok(TypedValueIter {
            inner: values.iter(),
            _marker: PhantomData,
        })
    }
}

impl<'a, K> Iterator for TypedValueIter<'a, K>
where
    K: ValueElementKind,
{
    type Item = K::Item<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let v = self.inner.next()?;
        Some(K::project(v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K> DoubleEndedIterator for TypedValueIter<'a, K>
where
    K: ValueElementKind,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let v = self.inner.next_back()?;
        Some(K::project(v))
    }
}

impl<'a, K> ExactSizeIterator for TypedValueIter<'a, K> where K: ValueElementKind {}
impl<'a, K> FusedIterator for TypedValueIter<'a, K> where K: ValueElementKind {}

#[doc(hidden)]
pub struct ValueKind;

impl ValueElementKind for ValueKind {
    type Item<'a> = &'a Value;

    fn precheck(_slice: &[Value]) -> Result<(), Error> {
        Ok(())
    }

    fn project<'a>(v: &'a Value) -> Self::Item<'a> {
        v
    }
}

#[doc(hidden)]
pub struct NumberKind;

impl ValueElementKind for NumberKind {
    type Item<'a> = NumberType;

    fn precheck(slice: &[Value]) -> Result<(), Error> {
        match slice.iter().find(|v| !matches!(v, Value::Number(_))) {
            Some(other) => Err(Error::TypeError(format!(
                "expected integer, got {}",
                other.type_name()
            ))),
            None => Ok(()),
        }
    }

    fn project<'a>(v: &'a Value) -> Self::Item<'a> {
        match v {
            Value::Number(n) => *n,
            _ => unreachable!("NumberKind invariant violated"),
        }
    }
}

/// Borrowed iterator over the remaining operands as `&Value`.
pub type ValueIter<'a> = TypedValueIter<'a, ValueKind>;

/// Iterator over the remaining operands as integers; a non-integer anywhere
/// in the run fails with `TypeError` before the builtin body runs.
pub type NumIter<'a> = TypedValueIter<'a, NumberKind>;

/// Builds a rest parameter from the operands that follow the fixed prefix.
pub trait FromRest {
    type Param<'a>;

    fn from_rest<'a>(slice: &'a [Value]) -> Result<Self::Param<'a>, Error>;
}

impl<K> FromRest for TypedValueIter<'static, K>
where
    K: ValueElementKind,
{
    type Param<'a> = TypedValueIter<'a, K>;

    fn from_rest<'a>(slice: &'a [Value]) -> Result<Self::Param<'a>, Error> {
        TypedValueIter::<K>::new(slice)
    }
}

// =====================================================================
// Return values
// =====================================================================

/// Normalizes builtin return types to `Result<Value, Error>`.
pub trait IntoValueResult {
    fn into_value_result(self) -> Result<Value, Error>;
}

impl<T> IntoValueResult for Result<T, Error>
where
    T: Into<Value>,
{
    fn into_value_result(self) -> Result<Value, Error> {
        self.map(Into::into)
    }
}

impl<T> IntoValueResult for T
where
    T: Into<Value>,
{
    fn into_value_result(self) -> Result<Value, Error> {
        Ok(self.into())
    }
}

/// Converts a typed function with a fixed parameter list into an
/// [`OperationFn`]. `ARITY` is the number of parameters and becomes the
/// builtin's exact arity when registered.
pub trait IntoOperation<Args> {
    const ARITY: usize;

    fn into_operation(self) -> Arc<OperationFn>;
}

/// Converts a typed function whose last parameter is a rest iterator
/// ([`ValueIter`] or [`NumIter`]), optionally after a fixed prefix, into an
/// [`OperationFn`].
pub trait IntoVariadicOperation<Args> {
    fn into_variadic_operation(self) -> Arc<OperationFn>;
}

// =====================================================================
// Variadic adapters
// =====================================================================

impl<F, I, R> IntoVariadicOperation<(I,)> for F
where
    I: FromRest,
    F: for<'a> Fn(<I as FromRest>::Param<'a>) -> R + Send + Sync + 'static,
    R: IntoValueResult,
{
    fn into_variadic_operation(self) -> Arc<OperationFn> {
        Arc::new(move |args: Vec<Value>| {
            let rest_param: <I as FromRest>::Param<'_> = <I as FromRest>::from_rest(&args[..])?;
            let result: R = (self)(rest_param);
            result.into_value_result()
        })
    }
}

macro_rules! impl_into_variadic_operation_for_prefix_and_rest {
    ($prefix:expr, $( $v:ident, $p:ident : $A:ident ),+ ) => {
        impl<F, I, R, $( $A ),+> IntoVariadicOperation<( $( $A, )+ I, )> for F
        where
            I: FromRest,
            $( $A: FromParam, )+
            F: for<'a> Fn(
                    $( <$A as FromParam>::Param<'a> ),+,
                    <I as FromRest>::Param<'a>,
                ) -> R
                + Send
                + Sync
                + 'static,
            R: IntoValueResult,
        {
            fn into_variadic_operation(self) -> Arc<OperationFn> {
                Arc::new(move |mut args: Vec<Value>| {
                    let len = args.len();
                    match args.as_mut_slice() {
                        &mut [ $( ref mut $v ),+, ref mut rest @ .. ] => {
                            $(
                                let $p: <$A as FromParam>::Param<'_> =
                                    <$A as FromParam>::from_arg($v)?;
                            )+

                            let rest_param: <I as FromRest>::Param<'_> =
                                <I as FromRest>::from_rest(&*rest)?;

                            let result: R = (self)( $( $p ),+, rest_param );
                            result.into_value_result()
                        }
                        _ => Err(Error::arity_error($prefix, len)),
                    }
                })
            }
        }
    };
}

impl_into_variadic_operation_for_prefix_and_rest!(1, v0, p0: A1);
impl_into_variadic_operation_for_prefix_and_rest!(2, v0, p0: A1, v1, p1: A2);

// =====================================================================
// Fixed-arity adapters
// =====================================================================

macro_rules! impl_into_operation_for_arity {
    ($arity:expr, $( $v:ident, $p:ident : $A:ident ),+ ) => {
        impl<F, R, $( $A ),+> IntoOperation<( $( $A, )+ )> for F
        where
            F: for<'a> Fn( $( <$A as FromParam>::Param<'a> ),+ ) -> R
                + Send
                + Sync
                + 'static,
            $( $A: FromParam, )+
            R: IntoValueResult,
        {
            const ARITY: usize = $arity;

            fn into_operation(self) -> Arc<OperationFn> {
                Arc::new(move |mut args: Vec<Value>| {
                    let len = args.len();
                    match args.as_mut_slice() {
                        &mut [ $( ref mut $v ),+ ] => {
                            $(
                                let $p: <$A as FromParam>::Param<'_> =
                                    <$A as FromParam>::from_arg($v)?;
                            )+

                            let result: R = (self)( $( $p ),+ );
                            result.into_value_result()
                        }
                        _ => Err(Error::arity_error($arity, len)),
                    }
                })
            }
        }
    };
}

impl<F, R> IntoOperation<()> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: IntoValueResult,
{
    const ARITY: usize = 0;

    fn into_operation(self) -> Arc<OperationFn> {
        Arc::new(move |args: Vec<Value>| {
            if !args.is_empty() {
                return Err(Error::arity_error(0, args.len()));
            }

            let result: R = (self)();
            result.into_value_result()
        })
    }
}

impl_into_operation_for_arity!(1, v0, p0: A1);
impl_into_operation_for_arity!(2, v0, p0: A1, v1, p1: A2);
impl_into_operation_for_arity!(3, v0, p0: A1, v1, p1: A2, v2, p2: A3);
impl_into_operation_for_arity!(4, v0, p0: A1, v1, p1: A2, v2, p2: A3, v3, p3: A4);

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{Pair, sym, val};
    use std::rc::Rc;

    #[test]
    fn test_fixed_adapters_convert_parameters() {
        fn second(pair: Rc<Pair>) -> Value {
            pair.rest.clone()
        }
        fn pick(flag: bool, a: NumberType, b: NumberType) -> NumberType {
            if flag { a } else { b }
        }

        let op = IntoOperation::<(Rc<Pair>,)>::into_operation(second);
        assert_eq!(op(vec![Value::cons(val(1), val(2))]).unwrap(), val(2));
        assert!(matches!(op(vec![val(1)]), Err(Error::TypeError(_))));
        assert!(matches!(op(vec![]), Err(Error::ArityError { .. })));

        let op = IntoOperation::<(bool, NumberType, NumberType)>::into_operation(pick);
        assert_eq!(op(vec![val(false), val(1), val(2)]).unwrap(), val(2));
        assert!(matches!(
            op(vec![val(false), sym("x"), val(2)]),
            Err(Error::TypeError(_))
        ));

        fn arity_of<Args, F: IntoOperation<Args>>(_: &F) -> usize {
            F::ARITY
        }
        assert_eq!(arity_of::<(bool, NumberType, NumberType), _>(&pick), 3);
        assert_eq!(arity_of::<(Rc<Pair>,), _>(&second), 1);
    }

    #[test]
    fn test_variadic_adapters_precheck_rest() {
        fn total(first: NumberType, rest: NumIter<'_>) -> Result<NumberType, Error> {
            Ok(first + rest.sum::<NumberType>())
        }
        fn count(values: ValueIter<'_>) -> NumberType {
            values.len() as NumberType
        }

        let op = IntoVariadicOperation::<(NumberType, NumIter<'static>)>::into_variadic_operation(
            total,
        );
        assert_eq!(op(vec![val(1), val(2), val(3)]).unwrap(), val(6));
        assert!(matches!(op(vec![val(1), val(true)]), Err(Error::TypeError(_))));
        assert!(matches!(op(vec![]), Err(Error::ArityError { .. })));

        let op = IntoVariadicOperation::<(ValueIter<'static>,)>::into_variadic_operation(count);
        assert_eq!(op(vec![]).unwrap(), val(0));
        assert_eq!(op(vec![sym("a"), val(true)]).unwrap(), val(2));
    }
}
