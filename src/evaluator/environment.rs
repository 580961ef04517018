use crate::Error;
use crate::ast::Value;
use crate::builtinops::{Arity, BuiltinOp, OpKind, OperandType};
use crate::config::Config;
use crate::evaluator::intooperation::{IntoOperation, IntoVariadicOperation, OperationFn};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// One scope level of bindings.
///
/// Bindings keep insertion order; a later definition of the same name hides
/// the earlier one for the lifetime of the frame. Hidden entries are kept, so
/// repeatedly redefining a global grows the global frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    bindings: Vec<(String, Value)>,
}

impl Frame {
    fn define(&mut self, name: String, value: Value) {
        self.bindings.push((name, value));
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }
}

/// Stack of scope frames for variable bindings
///
/// There is always at least the global frame. Each procedure call pushes one
/// frame and pops it again on every exit path. Lookup searches the frames
/// innermost first, so a frame sees every binding visible when it was pushed.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<Frame>,
    config: Config,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// An environment holding only an empty global frame
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Environment {
            frames: vec![Frame::default()],
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of frames, including the global frame
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter a new scope
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
        trace!(depth = self.frames.len(), "push frame");
    }

    /// Leave the current scope, discarding every binding made in it.
    ///
    /// The global frame cannot be popped; the attempt fails and leaves the
    /// environment unchanged.
    pub fn pop(&mut self) -> Result<(), Error> {
        if self.frames.len() <= 1 {
            warn!("attempt to pop the global frame");
            return Err(Error::EvalError("cannot pop last frame".to_owned()));
        }
        self.frames.pop();
        trace!(depth = self.frames.len(), "pop frame");
        Ok(())
    }

    /// Bind `name` in the current (innermost) frame only
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        debug!(name = %name, depth = self.frames.len(), "define");
        if let Some(frame) = self.frames.last_mut() {
            frame.define(name, value);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Register a custom builtin function working directly on evaluated
    /// operands.
    ///
    /// This is the low-level API; arity is not checked for it. Prefer
    /// [`Environment::register_builtin_operation`] for typed parameters.
    ///
    /// # Example
    /// ```
    /// use minischeme::evaluator::{create_global_env, eval};
    /// use minischeme::scheme::parse_scheme;
    /// use minischeme::ast::Value;
    /// use minischeme::Error;
    ///
    /// fn count(args: &[Value]) -> Result<Value, Error> {
    ///     Ok(Value::Number(args.len() as i64))
    /// }
    ///
    /// let mut env = create_global_env();
    /// env.register_builtin_function("count", count);
    /// let expr = parse_scheme("(count 1 2 3)").unwrap();
    /// assert_eq!(eval(&expr, &mut env).unwrap(), Value::Number(3));
    /// ```
    pub fn register_builtin_function(
        &mut self,
        name: &str,
        func: fn(&[Value]) -> Result<Value, Error>,
    ) {
        let wrapped: Arc<OperationFn> = Arc::new(move |args: Vec<Value>| func(&args));
        self.bind_builtin(name, wrapped, Arity::Any);
    }

    /// Register a strongly-typed Rust function as a builtin procedure.
    ///
    /// ```rust,ignore
    /// fn add(a: i64, b: i64) -> i64 { a + b }
    /// let mut env = minischeme::evaluator::create_global_env();
    /// env.register_builtin_operation::<_, (i64, i64)>("add", add);
    /// ```
    ///
    /// Supported parameter types: `Value`, `i64`, `bool` and `Rc<Pair>`.
    /// Supported return types: anything `Into<Value>`, or
    /// `Result<T, Error>` with `T: Into<Value>`.
    ///
    /// The exact arity is derived from the signature. Conversion failures
    /// surface as `TypeError`.
    pub fn register_builtin_operation<F, Args>(&mut self, name: &str, func: F)
    where
        F: IntoOperation<Args> + 'static,
    {
        let arity = Arity::Exact(F::ARITY);
        self.bind_builtin(name, func.into_operation(), arity);
    }

    /// Register a builtin whose last parameter collects the remaining
    /// operands as a [`ValueIter`](crate::evaluator::intooperation::ValueIter)
    /// or [`NumIter`](crate::evaluator::intooperation::NumIter).
    ///
    /// The minimum operand count is not derivable from the signature, so the
    /// caller supplies the [`Arity`].
    pub fn register_variadic_builtin_operation<F, Args>(
        &mut self,
        name: &str,
        arity: Arity,
        func: F,
    ) where
        F: IntoVariadicOperation<Args> + 'static,
    {
        self.bind_builtin(name, func.into_variadic_operation(), arity);
    }

    fn bind_builtin(&mut self, name: &str, func: Arc<OperationFn>, arity: Arity) {
        let op = BuiltinOp {
            id: name.to_owned(),
            op_kind: OpKind::Function(func),
            arity,
            operand_type: OperandType::Any,
        };
        self.define(name, Value::Builtin(Arc::new(op)));
    }

    /// Every visible binding, innermost definition winning, sorted by name
    pub fn get_all_bindings(&self) -> Vec<(String, Value)> {
        let mut bindings = HashMap::new();

        // Outer frames first so inner definitions override them
        for frame in &self.frames {
            for (name, value) in &frame.bindings {
                bindings.insert(name.clone(), value.clone());
            }
        }

        let mut result: Vec<_> = bindings.into_iter().collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}
