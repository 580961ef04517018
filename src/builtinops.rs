//! Built-in operations registry.
//!
//! Every builtin lives in one table, whether it is an ordinary procedure or a
//! special form. At startup each entry is bound in the global frame as a
//! [`Value::Builtin`], so builtins are first-class: they can be passed to
//! other procedures, shadowed by `define`, and applied through any expression
//! that evaluates to them.
//!
//! ```scheme
//! (+ 1 2 3)                  ; procedure: operands evaluated first
//! (quote (a b))              ; special form: operand left unevaluated
//! ((car (list car cdr)) '(1 2))
//! ```
//!
//! ## Functions vs Special Forms
//!
//! - **Functions**: the evaluator checks arity, evaluates all operands left to
//!   right, then calls the native implementation with the values
//!   (e.g. `+`, `car`, `append`). Arithmetic and comparisons declare
//!   [`OperandType::Integer`], which stops the call at the first non-integer
//!   operand before later operands are evaluated.
//! - **Special Forms**: receive the unevaluated operands and the environment,
//!   and decide themselves what to evaluate and when (e.g. `quote`, `cond`,
//!   `and`). Their implementations live in the evaluator.
//!
//! ## Falsy values
//!
//! `#f` and `()` are both falsy; every other value is truthy. `not` and the
//! conditional special forms share this convention through
//! [`Value::is_empty_list`].
//!
//! ## Adding New Operations
//!
//! 1. **Implement the function** with typed parameters (`Value`, `NumberType`,
//!    `Rc<Pair>`, or a trailing `ValueIter`/`NumIter` rest parameter)
//! 2. **Add to BUILTIN_OPS** with its Scheme identifier and arity
//! 3. **Add tests** covering edge cases and error conditions

use crate::Error;
use crate::ast::{NumberType, Pair, Value};
use crate::evaluator::intooperation::{
    IntoOperation, IntoVariadicOperation, NumIter, OperationFn, ValueIter,
};
use crate::evaluator::{
    Environment, eval_and, eval_cond, eval_define, eval_if, eval_lambda, eval_or, eval_quote,
};
use std::rc::Rc;
use std::sync::{Arc, LazyLock};

/// Signature of special forms: unevaluated operands, the active environment,
/// and the current evaluation depth
pub type SpecialFormFn = fn(&[Value], &mut Environment, usize) -> Result<Value, Error>;

/// Represents the implementation of a built-in expression (function or special form)
#[derive(Clone)]
pub enum OpKind {
    /// Regular function that takes evaluated arguments and returns a value
    Function(Arc<OperationFn>),
    /// Special form that requires access to the environment, unevaluated arguments and current evaluation depth
    SpecialForm(SpecialFormFn),
}

impl std::fmt::Debug for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Function(_) => write!(f, "Function(<fn>)"),
            OpKind::SpecialForm(_) => write!(f, "SpecialForm(<fn>)"),
        }
    }
}

/// Number of operands an operation accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Inclusive range
    Range(usize, usize),
    Any,
}

impl Arity {
    pub fn validate(self, arg_count: usize) -> Result<(), Error> {
        match self {
            Arity::Exact(n) if arg_count != n => Err(Error::arity_error(n, arg_count)),
            Arity::AtLeast(n) if arg_count < n => Err(Error::arity_error(n, arg_count)),
            Arity::Range(min, _) if arg_count < min => Err(Error::arity_error(min, arg_count)),
            Arity::Range(_, max) if arg_count > max => Err(Error::arity_error(max, arg_count)),
            _ => Ok(()),
        }
    }
}

/// Type every operand of a procedure must have.
///
/// The evaluator checks each operand as soon as it is evaluated, so a bad
/// operand stops the call before any later operand runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    Any,
    Integer,
}

impl OperandType {
    pub fn check(self, value: &Value) -> Result<(), Error> {
        match (self, value) {
            (OperandType::Any, _) | (OperandType::Integer, Value::Number(_)) => Ok(()),
            (OperandType::Integer, other) => Err(Error::TypeError(format!(
                "expected integer, got {}",
                other.type_name()
            ))),
        }
    }
}

/// Definition of a built-in operation
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    /// The Scheme identifier for this operation
    pub id: String,
    /// The implementation of this operation (function or special form)
    pub op_kind: OpKind,
    /// Expected number of arguments
    pub arity: Arity,
    /// Checked on each evaluated operand of a function
    pub operand_type: OperandType,
}

impl BuiltinOp {
    /// Check if this operation is a special form
    pub fn is_special_form(&self) -> bool {
        matches!(self.op_kind, OpKind::SpecialForm(_))
    }

    /// Check if the given number of arguments is valid for this operation
    pub(crate) fn validate_arity(&self, arg_count: usize) -> Result<(), Error> {
        self.arity.validate(arg_count)
    }
}

//
// Builtin Function Implementations
//

// Macro to generate chained numeric comparison functions (arity >= 2 is
// enforced by the table entry)
macro_rules! numeric_comparison {
    ($name:ident, $op:tt) => {
        fn $name(first: NumberType, rest: NumIter<'_>) -> bool {
            let mut prev = first;
            for current in rest {
                if !(prev $op current) {
                    return false;
                }
                prev = current;
            }
            true
        }
    };
}

numeric_comparison!(builtin_eq, ==);
numeric_comparison!(builtin_lt, <);
numeric_comparison!(builtin_gt, >);
numeric_comparison!(builtin_le, <=);
numeric_comparison!(builtin_ge, >=);

fn builtin_add(args: NumIter<'_>) -> Result<NumberType, Error> {
    let mut sum: NumberType = 0;
    for arg in args {
        sum = sum
            .checked_add(arg)
            .ok_or_else(|| Error::EvalError("Integer overflow in addition".into()))?;
    }
    Ok(sum)
}

fn builtin_sub(first: NumberType, rest: NumIter<'_>) -> Result<NumberType, Error> {
    let mut iter = rest.peekable();

    if iter.peek().is_none() {
        return first
            .checked_neg()
            .ok_or_else(|| Error::EvalError("Integer overflow in negation".into()));
    }

    let mut result = first;
    for n in iter {
        result = result
            .checked_sub(n)
            .ok_or_else(|| Error::EvalError("Integer overflow in subtraction".into()))?;
    }

    Ok(result)
}

fn builtin_mul(args: NumIter<'_>) -> Result<NumberType, Error> {
    let mut product: NumberType = 1;
    for n in args {
        product = product
            .checked_mul(n)
            .ok_or_else(|| Error::EvalError("Integer overflow in multiplication".into()))?;
    }
    Ok(product)
}

fn builtin_car(pair: Rc<Pair>) -> Value {
    pair.first.clone()
}

fn builtin_cdr(pair: Rc<Pair>) -> Value {
    pair.rest.clone()
}

fn builtin_cons(first: Value, rest: Value) -> Value {
    Value::cons(first, rest)
}

fn builtin_list(args: ValueIter<'_>) -> Value {
    Value::list(args.cloned())
}

/// Concatenate lists; the last operand becomes the tail as-is, so a non-list
/// last operand yields an improper list. The spine of the last operand is
/// shared with the result.
fn builtin_append(first: Value, rest: ValueIter<'_>) -> Result<Value, Error> {
    let mut operands: Vec<Value> = std::iter::once(first).chain(rest.cloned()).collect();
    let Some(tail) = operands.pop() else {
        return Err(Error::arity_error(1, 0));
    };

    let mut items = Vec::new();
    for operand in &operands {
        match operand.to_vec() {
            Some(elements) => items.extend(elements),
            None => {
                return Err(Error::TypeError(format!(
                    "expected list, got {operand}"
                )));
            }
        }
    }

    if !tail.is_list() {
        if operands.is_empty() {
            return Err(Error::TypeError(format!(
                "first argument must be a list, got {tail}"
            )));
        }
        if items.is_empty() {
            return Err(Error::TypeError(format!(
                "cannot attach {tail} to an empty list"
            )));
        }
    }

    Ok(Value::improper_list(items, tail))
}

fn builtin_is_list(value: Value) -> bool {
    value.is_list()
}

fn builtin_null(value: Value) -> bool {
    value.is_empty_list()
}

fn builtin_is_symbol(value: Value) -> bool {
    matches!(value, Value::Symbol(_))
}

fn builtin_is_function(value: Value) -> bool {
    value.is_function()
}

fn builtin_not(value: Value) -> bool {
    value.is_empty_list()
}

fn builtin_equal(first: Value, second: Value) -> bool {
    first == second
}

fn builtin_assoc(key: Value, alist: Value) -> Result<Value, Error> {
    if !alist.is_assoc_list() {
        return Err(Error::TypeError(format!(
            "expected association list, got {alist}"
        )));
    }

    Ok(alist
        .assoc_list_get(&key)
        .cloned()
        .unwrap_or(Value::Bool(false)))
}

fn builtin_exit() -> Result<Value, Error> {
    Err(Error::Exit)
}

/// Global registry of all built-in operations.
///
/// The registry is a single contiguous collection for ease of auditing; typed
/// implementations are wired through the same adapter layer used for custom
/// builtin registration, once, at initialization time.
static BUILTIN_OPS: LazyLock<Vec<Arc<BuiltinOp>>> = LazyLock::new(|| {
    fn builtin_fixed<Args, F>(f: F) -> OpKind
    where
        F: IntoOperation<Args>,
    {
        OpKind::Function(<F as IntoOperation<Args>>::into_operation(f))
    }

    fn builtin_variadic<Args, F>(f: F) -> OpKind
    where
        F: IntoVariadicOperation<Args>,
    {
        OpKind::Function(<F as IntoVariadicOperation<Args>>::into_variadic_operation(f))
    }

    fn op(id: &str, op_kind: OpKind, arity: Arity) -> Arc<BuiltinOp> {
        Arc::new(BuiltinOp {
            id: id.to_owned(),
            op_kind,
            arity,
            operand_type: OperandType::Any,
        })
    }

    fn numeric_op(id: &str, op_kind: OpKind, arity: Arity) -> Arc<BuiltinOp> {
        Arc::new(BuiltinOp {
            id: id.to_owned(),
            op_kind,
            arity,
            operand_type: OperandType::Integer,
        })
    }

    vec![
        // Special forms
        op("quote", OpKind::SpecialForm(eval_quote), Arity::Exact(1)),
        // SCHEME-STRICT: only fixed-arity lambdas (lambda (a b c) body)
        op("lambda", OpKind::SpecialForm(eval_lambda), Arity::Exact(2)),
        op("define", OpKind::SpecialForm(eval_define), Arity::Exact(2)),
        op("cond", OpKind::SpecialForm(eval_cond), Arity::Any),
        op("if", OpKind::SpecialForm(eval_if), Arity::Range(2, 3)),
        op("and", OpKind::SpecialForm(eval_and), Arity::Any),
        op("or", OpKind::SpecialForm(eval_or), Arity::Any),
        // List operations
        op(
            "list",
            builtin_variadic::<(ValueIter<'static>,), _>(builtin_list),
            Arity::Any,
        ),
        op(
            "cons",
            builtin_fixed::<(Value, Value), _>(builtin_cons),
            Arity::Exact(2),
        ),
        op(
            "car",
            builtin_fixed::<(Rc<Pair>,), _>(builtin_car),
            Arity::Exact(1),
        ),
        op(
            "cdr",
            builtin_fixed::<(Rc<Pair>,), _>(builtin_cdr),
            Arity::Exact(1),
        ),
        op(
            "append",
            builtin_variadic::<(Value, ValueIter<'static>), _>(builtin_append),
            Arity::AtLeast(1),
        ),
        op(
            "assoc",
            builtin_fixed::<(Value, Value), _>(builtin_assoc),
            Arity::Exact(2),
        ),
        // Predicates
        op(
            "list?",
            builtin_fixed::<(Value,), _>(builtin_is_list),
            Arity::Exact(1),
        ),
        op(
            "null?",
            builtin_fixed::<(Value,), _>(builtin_null),
            Arity::Exact(1),
        ),
        op(
            "empty?",
            builtin_fixed::<(Value,), _>(builtin_null),
            Arity::Exact(1),
        ),
        op(
            "symbol?",
            builtin_fixed::<(Value,), _>(builtin_is_symbol),
            Arity::Exact(1),
        ),
        op(
            "function?",
            builtin_fixed::<(Value,), _>(builtin_is_function),
            Arity::Exact(1),
        ),
        op(
            "equal?",
            builtin_fixed::<(Value, Value), _>(builtin_equal),
            Arity::Exact(2),
        ),
        op(
            "not",
            builtin_fixed::<(Value,), _>(builtin_not),
            Arity::Exact(1),
        ),
        // Arithmetic operations
        numeric_op(
            "+",
            builtin_variadic::<(NumIter<'static>,), _>(builtin_add),
            Arity::Any,
        ),
        numeric_op(
            "-",
            builtin_variadic::<(NumberType, NumIter<'static>), _>(builtin_sub),
            Arity::AtLeast(1),
        ),
        numeric_op(
            "*",
            builtin_variadic::<(NumIter<'static>,), _>(builtin_mul),
            Arity::Any,
        ),
        // Comparison operations
        numeric_op(
            "=",
            builtin_variadic::<(NumberType, NumIter<'static>), _>(builtin_eq),
            Arity::AtLeast(2),
        ),
        numeric_op(
            "<",
            builtin_variadic::<(NumberType, NumIter<'static>), _>(builtin_lt),
            Arity::AtLeast(2),
        ),
        numeric_op(
            ">",
            builtin_variadic::<(NumberType, NumIter<'static>), _>(builtin_gt),
            Arity::AtLeast(2),
        ),
        numeric_op(
            "<=",
            builtin_variadic::<(NumberType, NumIter<'static>), _>(builtin_le),
            Arity::AtLeast(2),
        ),
        numeric_op(
            ">=",
            builtin_variadic::<(NumberType, NumIter<'static>), _>(builtin_ge),
            Arity::AtLeast(2),
        ),
        // Process control
        op("exit", builtin_fixed::<(), _>(builtin_exit), Arity::Exact(0)),
    ]
});

/// Get all builtin operations (for internal use by evaluator)
pub(crate) fn get_builtin_ops() -> &'static [Arc<BuiltinOp>] {
    BUILTIN_OPS.as_slice()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, clippy::expect_used)] // test code OK
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::ast::{nil, sym, val};
    use std::collections::HashSet;

    fn find_scheme_op(id: &str) -> Option<&'static Arc<BuiltinOp>> {
        get_builtin_ops().iter().find(|op| op.id == id)
    }

    /// Micro-helper for success cases in comprehensive tests
    fn success<T: Into<Value>>(value: T) -> Result<Value, ErrorKind> {
        Ok(val(value))
    }

    /// Invoke a procedure builtin through the registry with already-evaluated
    /// arguments, applying the table's arity check the way the evaluator does.
    fn call_builtin(name: &str, args: &[Value]) -> Result<Value, Error> {
        let op = find_scheme_op(name).expect("builtin not found");
        op.validate_arity(args.len())?;
        match &op.op_kind {
            OpKind::Function(func) => func(args.to_vec()),
            OpKind::SpecialForm(_) => {
                panic!("expected function builtin in tests, got special form: {name}")
            }
        }
    }

    #[test]
    fn test_builtin_ops_registry() {
        let car_op = find_scheme_op("car").unwrap();
        assert_eq!(car_op.arity, Arity::Exact(1));
        assert!(!car_op.is_special_form());

        for special in ["quote", "lambda", "define", "cond", "and", "or", "if"] {
            assert!(
                find_scheme_op(special).unwrap().is_special_form(),
                "{special} should be a special form"
            );
        }

        for name in [
            "exit", "list", "list?", "empty?", "null?", "append", "cons", "car", "cdr", "+", "-",
            "*", "symbol?", "equal?", "assoc", "function?",
        ] {
            let op = find_scheme_op(name).unwrap();
            assert_eq!(op.id, name);
            assert!(!op.is_special_form(), "{name} should be a function");
        }

        assert!(find_scheme_op("unknown").is_none());
        for name in ["+", "-", "*", "=", "<", ">", "<=", ">="] {
            assert_eq!(find_scheme_op(name).unwrap().operand_type, OperandType::Integer, "{name}");
        }
        for name in ["cons", "list", "append", "quote"] {
            assert_eq!(find_scheme_op(name).unwrap().operand_type, OperandType::Any, "{name}");
        }

        let ids: HashSet<&str> = get_builtin_ops().iter().map(|op| op.id.as_str()).collect();
        assert_eq!(ids.len(), get_builtin_ops().len(), "builtin ids must be unique");
    }

    #[test]
    fn test_operand_type_check() {
        assert!(OperandType::Integer.check(&val(3)).is_ok());
        assert!(OperandType::Any.check(&sym("a")).is_ok());
        assert_eq!(
            OperandType::Integer.check(&val(true)),
            Err(Error::TypeError("expected integer, got boolean".into()))
        );
        assert_eq!(OperandType::Integer.check(&nil()).unwrap_err().kind(), ErrorKind::Type);
    }

    /// Macro to create test cases, invoking builtins via the registry.
    macro_rules! test {
        ($name:expr, $args:expr, $expected:expr) => {
            ($name, call_builtin($name, $args), $expected)
        };
    }

    #[test]
    #[expect(clippy::too_many_lines)] // Comprehensive test coverage is intentionally thorough
    fn test_builtin_function_implementations() {
        type TestCase = (&'static str, Result<Value, Error>, Result<Value, ErrorKind>);

        let pair = Value::cons(val(1), val(2));
        let alist = val([val([sym("a"), val(1)]), val([sym("b"), val(2)])]);

        let test_cases: Vec<TestCase> = vec![
            // =================================================================
            // ARITHMETIC
            // =================================================================
            test!("+", &[], success(0)),
            test!("+", &[val(5)], success(5)),
            test!("+", &[val(1), val(2), val(3)], success(6)),
            test!("+", &[val(-5), val(10)], success(5)),
            test!("+", &[val(1), val(true)], Err(ErrorKind::Type)),
            test!("+", &[nil()], Err(ErrorKind::Type)),
            test!("-", &[val(5)], success(-5)),
            test!("-", &[val(10), val(3), val(2)], success(5)),
            test!("-", &[], Err(ErrorKind::Arity)),
            test!("-", &[val(5), sym("x")], Err(ErrorKind::Type)),
            test!("*", &[], success(1)),
            test!("*", &[val(2), val(3), val(4)], success(24)),
            test!("*", &[val(2), nil()], Err(ErrorKind::Type)),
            test!("+", &[val(NumberType::MAX), val(1)], Err(ErrorKind::Eval)),
            test!("*", &[val(NumberType::MAX), val(2)], Err(ErrorKind::Eval)),
            test!("-", &[val(NumberType::MIN)], Err(ErrorKind::Eval)),
            test!("-", &[val(NumberType::MIN), val(1)], Err(ErrorKind::Eval)),
            // =================================================================
            // COMPARISON
            // =================================================================
            test!("=", &[val(7), val(7), val(7)], success(true)),
            test!("=", &[val(9), val(9), val(4)], success(false)),
            test!("<", &[val(1), val(2), val(3)], success(true)),
            test!("<", &[val(1), val(3), val(2)], success(false)),
            test!(">", &[val(9), val(6), val(2)], success(true)),
            test!("<=", &[val(3), val(3)], success(true)),
            test!(">=", &[val(2), val(6)], success(false)),
            test!(">", &[val(5)], Err(ErrorKind::Arity)),
            test!("<", &[val(1), sym("a")], Err(ErrorKind::Type)),
            // =================================================================
            // LIST OPERATIONS
            // =================================================================
            test!("list", &[], Ok(nil())),
            test!("list", &[val(1), sym("a"), val(true)], success(vec![val(1), sym("a"), val(true)])),
            test!("cons", &[val(0), val([1, 2])], success([0, 1, 2])),
            test!("cons", &[val(1), val(2)], Ok(Value::cons(val(1), val(2)))),
            test!("cons", &[val(1)], Err(ErrorKind::Arity)),
            test!("car", &[val([1, 2, 3])], success(1)),
            test!("car", std::slice::from_ref(&pair), success(1)),
            test!("car", &[nil()], Err(ErrorKind::Type)),
            test!("car", &[val(42)], Err(ErrorKind::Type)),
            test!("car", &[], Err(ErrorKind::Arity)),
            test!("cdr", &[val([1, 2, 3])], success([2, 3])),
            test!("cdr", &[val([1])], Ok(nil())),
            test!("cdr", std::slice::from_ref(&pair), success(2)),
            test!("cdr", &[val(false)], Err(ErrorKind::Type)),
            test!("append", &[val([1, 2]), val([3, 4])], success([1, 2, 3, 4])),
            test!("append", &[val([1, 2])], success([1, 2])),
            test!("append", &[nil(), val([1])], success([1])),
            test!("append", &[val([1]), nil(), val([2]), nil()], success([1, 2])),
            test!(
                "append",
                &[val([1, 2]), val(3)],
                Ok(Value::improper_list([val(1), val(2)], val(3)))
            ),
            test!("append", &[val(3)], Err(ErrorKind::Type)),
            test!("append", &[val(1), val([2])], Err(ErrorKind::Type)),
            test!("append", &[nil(), val(3)], Err(ErrorKind::Type)),
            test!("append", &[], Err(ErrorKind::Arity)),
            test!("append", &[pair.clone(), val([3])], Err(ErrorKind::Type)),
            test!("assoc", &[sym("b"), alist.clone()], success(vec![sym("b"), val(2)])),
            test!("assoc", &[sym("z"), alist.clone()], success(false)),
            test!("assoc", &[sym("a"), nil()], success(false)),
            test!("assoc", &[sym("a"), val([1, 2])], Err(ErrorKind::Type)),
            test!("assoc", &[sym("a")], Err(ErrorKind::Arity)),
            // =================================================================
            // PREDICATES
            // =================================================================
            test!("list?", &[val([1, 2])], success(true)),
            test!("list?", &[nil()], success(true)),
            test!("list?", &[pair.clone()], success(false)),
            test!("list?", &[val(false)], success(false)),
            test!("null?", &[nil()], success(true)),
            test!("null?", &[val(false)], success(true)),
            test!("null?", &[val([1])], success(false)),
            test!("empty?", &[val(0)], success(false)),
            test!("null?", &[], Err(ErrorKind::Arity)),
            test!("symbol?", &[sym("a")], success(true)),
            test!("symbol?", &[val([1])], success(false)),
            test!("function?", &[Value::Builtin(Arc::clone(find_scheme_op("car").unwrap()))], success(true)),
            test!("function?", &[sym("car")], success(false)),
            test!("equal?", &[val([1, 2]), val([1, 2])], success(true)),
            test!("equal?", &[val(1), val(true)], success(false)),
            test!("equal?", &[nil(), val(false)], success(false)),
            test!("equal?", &[val(1)], Err(ErrorKind::Arity)),
            test!("not", &[val(false)], success(true)),
            test!("not", &[nil()], success(true)),
            test!("not", &[val(0)], success(false)),
            // =================================================================
            // PROCESS CONTROL
            // =================================================================
            test!("exit", &[], Err(ErrorKind::Exit)),
            test!("exit", &[val(0)], Err(ErrorKind::Arity)),
        ];

        for (test_expr, result, expected) in test_cases {
            match (result, expected) {
                (Ok(actual), Ok(expected_val)) => {
                    assert_eq!(actual, expected_val, "Failed for test case: {test_expr}");
                }
                (Err(err), Err(kind)) => {
                    assert_eq!(err.kind(), kind, "Wrong error for {test_expr}: {err}");
                }
                (actual, expected) => panic!(
                    "Unexpected result for test case: {test_expr}\nGot: {actual:?}, Expected: {expected:?}"
                ),
            }
        }
    }

    #[test]
    fn test_arity_validation() {
        use Arity::*;

        Exact(2).validate(2).unwrap();
        Exact(2).validate(1).unwrap_err();
        Exact(2).validate(3).unwrap_err();

        AtLeast(1).validate(1).unwrap();
        AtLeast(1).validate(2).unwrap();
        AtLeast(1).validate(0).unwrap_err();

        Range(2, 3).validate(2).unwrap();
        Range(2, 3).validate(3).unwrap();
        Range(2, 3).validate(1).unwrap_err();
        Range(2, 3).validate(4).unwrap_err();

        Any.validate(0).unwrap();
        Any.validate(100).unwrap();

        match Exact(2).validate(1).unwrap_err() {
            Error::ArityError { expected, got, .. } => {
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("Expected ArityError, got {other:?}"),
        }
    }
}
