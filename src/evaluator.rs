use crate::Error;
use crate::ast::{Closure, Value};
use crate::builtinops::{BuiltinOp, OpKind, get_builtin_ops};
use crate::config::Config;
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

pub mod environment;
pub mod intooperation;

pub use environment::{Environment, Frame};

/// Evaluate an S-expression (public API)
pub fn eval(expr: &Value, env: &mut Environment) -> Result<Value, Error> {
    eval_with_depth_tracking(expr, env, 0)
}

/// Evaluate an S-expression, counting nesting against the configured limit
fn eval_with_depth_tracking(
    expr: &Value,
    env: &mut Environment,
    depth: usize,
) -> Result<Value, Error> {
    if let Some(limit) = env.config().max_eval_depth
        && depth >= limit
    {
        return Err(Error::EvalError(format!(
            "Evaluation depth limit exceeded (max: {limit})"
        )));
    }

    match expr {
        Value::Bool(_)
        | Value::Number(_)
        | Value::Nil
        | Value::Closure(_)
        | Value::Builtin(_) => Ok(expr.clone()),

        Value::Symbol(name) => env
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::ReferenceError(name.clone())),

        Value::Pair(_) => eval_application(expr, env, depth),
    }
}

/// Evaluate each operand left to right in the current frame
fn eval_args(args: &[Value], env: &mut Environment, depth: usize) -> Result<Vec<Value>, Error> {
    args.iter()
        .map(|arg| eval_with_depth_tracking(arg, env, depth + 1))
        .collect()
}

/// Apply the operator in head position to the remaining elements.
///
/// The head is evaluated like any other expression, so it may itself be an
/// application. What happens to the operands depends on the operator:
/// special forms get them unevaluated, procedures get their values.
fn eval_application(expr: &Value, env: &mut Environment, depth: usize) -> Result<Value, Error> {
    let Some(elements) = expr.to_vec() else {
        return Err(Error::SyntaxError(format!(
            "cannot apply improper list {expr}"
        )));
    };
    let Some((func_expr, operands)) = elements.split_first() else {
        return Err(Error::SyntaxError("cannot apply empty list".to_owned()));
    };

    let func = eval_with_depth_tracking(func_expr, env, depth + 1)?;

    match &func {
        Value::Builtin(op) => apply_builtin(op, operands, env, depth),
        Value::Closure(closure) => apply_closure(closure, operands, env, depth),
        other => Err(Error::TypeError(format!(
            "expected function, got {other}"
        ))),
    }
}

fn apply_builtin(
    op: &Arc<BuiltinOp>,
    operands: &[Value],
    env: &mut Environment,
    depth: usize,
) -> Result<Value, Error> {
    op.validate_arity(operands.len())
        .map_err(|err| name_arity_error(err, &op.id))?;

    match &op.op_kind {
        OpKind::SpecialForm(special_form) => special_form(operands, env, depth),
        OpKind::Function(func) => {
            let mut args = Vec::with_capacity(operands.len());
            for operand in operands {
                let value = eval_with_depth_tracking(operand, env, depth + 1)?;
                op.operand_type
                    .check(&value)
                    .map_err(|err| name_builtin_error(err, &op.id))?;
                args.push(value);
            }
            func(args).map_err(|err| name_builtin_error(err, &op.id))
        }
    }
}

/// Attribute an error raised by a builtin's own checks to that builtin
fn name_builtin_error(err: Error, id: &str) -> Error {
    match err {
        Error::TypeError(msg) => Error::TypeError(format!("{id}: {msg}")),
        Error::ArityError { expected, got, .. } => {
            Error::arity_error_with_expr(expected, got, id.to_owned())
        }
        other => other,
    }
}

/// Call a user procedure.
///
/// Operands are evaluated in the caller's frame, then bound in a fresh frame.
/// The frame is popped whether or not the body succeeds. Free variables in
/// the body resolve against whatever is visible at call time.
fn apply_closure(
    closure: &Rc<Closure>,
    operands: &[Value],
    env: &mut Environment,
    depth: usize,
) -> Result<Value, Error> {
    if closure.params.len() != operands.len() {
        return Err(Error::arity_error_with_expr(
            closure.params.len(),
            operands.len(),
            closure.name.clone(),
        ));
    }

    let args = eval_args(operands, env, depth)?;
    trace!(procedure = %closure.name, depth, "apply");

    env.push();
    for (param, arg) in closure.params.iter().zip(args) {
        env.define(param.clone(), arg);
    }
    let result = eval_with_depth_tracking(&closure.body, env, depth + 1);
    env.pop()?;

    result
}

fn name_arity_error(err: Error, name: &str) -> Error {
    match err {
        Error::ArityError {
            expected,
            got,
            expression: None,
        } => Error::arity_error_with_expr(expected, got, name.to_owned()),
        other => other,
    }
}

/// Collect a parameter list into names, rejecting non-symbols and duplicates.
/// The caller decides which error kind a malformed list is.
fn collect_params<'a>(
    params: impl IntoIterator<Item = &'a Value>,
) -> Result<Vec<String>, String> {
    let mut names: Vec<String> = Vec::new();
    for param in params {
        match param {
            Value::Symbol(name) if names.contains(name) => {
                return Err(format!("duplicate parameter name: {name}"));
            }
            Value::Symbol(name) => names.push(name.clone()),
            other => return Err(format!("parameters must be symbols, got {other}")),
        }
    }
    Ok(names)
}

/// Evaluate quote special form
pub(crate) fn eval_quote(
    args: &[Value],
    _env: &mut Environment,
    _depth: usize,
) -> Result<Value, Error> {
    match args {
        [expr] => Ok(expr.clone()),
        _ => Err(Error::arity_error(1, args.len())),
    }
}

/// Evaluate define special form
///
/// `(define name expr)` binds the value of `expr`; `(define (name params...) body)`
/// binds a procedure named `name`. Both bind in the current frame and
/// evaluate to the defined name.
pub(crate) fn eval_define(
    args: &[Value],
    env: &mut Environment,
    depth: usize,
) -> Result<Value, Error> {
    match args {
        [Value::Symbol(name), expr] => {
            let value = eval_with_depth_tracking(expr, env, depth + 1)?;
            env.define(name.clone(), value);
            Ok(Value::Symbol(name.clone()))
        }
        [header @ Value::Pair(_), body] => {
            let Some(parts) = header.to_vec() else {
                return Err(Error::TypeError(format!(
                    "define: malformed procedure header {header}"
                )));
            };
            let Some((Value::Symbol(name), params)) = parts.split_first() else {
                return Err(Error::TypeError(format!(
                    "define: procedure name must be a symbol in {header}"
                )));
            };
            let params =
                collect_params(params).map_err(|msg| Error::TypeError(format!("define: {msg}")))?;

            let closure = Closure {
                params,
                body: body.clone(),
                name: name.clone(),
            };
            env.define(name.clone(), Value::Closure(Rc::new(closure)));
            Ok(Value::Symbol(name.clone()))
        }
        [target, _] => Err(Error::TypeError(format!(
            "define: expected a symbol or procedure header, got {target}"
        ))),
        _ => Err(Error::arity_error(2, args.len())),
    }
}

/// Evaluate lambda special form
pub(crate) fn eval_lambda(
    args: &[Value],
    _env: &mut Environment,
    _depth: usize,
) -> Result<Value, Error> {
    match args {
        [param_list, body] => {
            // SCHEME-STRICT: no variadic forms, (lambda args body) or
            // (lambda (a . rest) body)
            let Some(items) = param_list.to_vec() else {
                return Err(Error::SyntaxError(format!(
                    "lambda: parameters must be a list, got {param_list}"
                )));
            };
            let params =
                collect_params(&items).map_err(|msg| Error::SyntaxError(format!("lambda: {msg}")))?;

            Ok(Value::Closure(Rc::new(Closure {
                params,
                body: body.clone(),
                name: "anonymous".to_owned(),
            })))
        }
        _ => Err(Error::arity_error(2, args.len())),
    }
}

/// Evaluate cond special form
///
/// Clauses are checked for shape as they are reached, so a malformed clause
/// after the one taken is never inspected. The first clause whose test is
/// truthy (or which is an `else` clause) has its body forms evaluated in
/// order, yielding the last one. No match yields `()`.
pub(crate) fn eval_cond(
    args: &[Value],
    env: &mut Environment,
    depth: usize,
) -> Result<Value, Error> {
    for (index, clause) in args.iter().enumerate() {
        let parts = match clause.to_vec() {
            Some(parts) if parts.len() >= 2 => parts,
            _ => {
                return Err(Error::SyntaxError(format!(
                    "cond: clause must be a list of a test and at least one body form, got {clause}"
                )));
            }
        };
        let (test, body) = parts.split_at(1);

        if matches!(&test[0], Value::Symbol(s) if s == "else") {
            if index + 1 != args.len() {
                return Err(Error::SyntaxError(
                    "cond: else must be the last clause".to_owned(),
                ));
            }
        } else {
            let outcome = eval_with_depth_tracking(&test[0], env, depth + 1)?;
            if outcome.is_empty_list() {
                continue;
            }
        }

        let mut result = Value::Nil;
        for form in body {
            result = eval_with_depth_tracking(form, env, depth + 1)?;
        }
        return Ok(result);
    }

    Ok(Value::Nil)
}

/// Evaluate if special form; a missing else-branch yields `()`
pub(crate) fn eval_if(args: &[Value], env: &mut Environment, depth: usize) -> Result<Value, Error> {
    let (condition_expr, then_expr, else_expr) = match args {
        [condition_expr, then_expr] => (condition_expr, then_expr, None),
        [condition_expr, then_expr, else_expr] => (condition_expr, then_expr, Some(else_expr)),
        _ => return Err(Error::arity_error(3, args.len())),
    };

    let condition = eval_with_depth_tracking(condition_expr, env, depth + 1)?;
    if !condition.is_empty_list() {
        eval_with_depth_tracking(then_expr, env, depth + 1)
    } else if let Some(else_expr) = else_expr {
        eval_with_depth_tracking(else_expr, env, depth + 1)
    } else {
        Ok(Value::Nil)
    }
}

/// Evaluate and special form: `#f` at the first falsy operand, otherwise the
/// last value (`#t` with no operands)
pub(crate) fn eval_and(
    args: &[Value],
    env: &mut Environment,
    depth: usize,
) -> Result<Value, Error> {
    let mut last = Value::Bool(true);
    for arg in args {
        last = eval_with_depth_tracking(arg, env, depth + 1)?;
        if last.is_empty_list() {
            return Ok(Value::Bool(false));
        }
    }
    Ok(last)
}

/// Evaluate or special form: the first truthy value, otherwise `#f`
pub(crate) fn eval_or(args: &[Value], env: &mut Environment, depth: usize) -> Result<Value, Error> {
    for arg in args {
        let result = eval_with_depth_tracking(arg, env, depth + 1)?;
        if !result.is_empty_list() {
            return Ok(result);
        }
    }
    Ok(Value::Bool(false))
}

/// Create a global environment with every builtin bound
pub fn create_global_env() -> Environment {
    create_global_env_with_config(Config::default())
}

pub fn create_global_env_with_config(config: Config) -> Environment {
    let mut env = Environment::with_config(config);
    for op in get_builtin_ops() {
        env.define(op.id.clone(), Value::Builtin(Arc::clone(op)));
    }
    env
}
