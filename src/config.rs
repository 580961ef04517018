//! Interpreter settings shared by the reader, the evaluator and the shell.

/// Settings for one interpreter session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Treat `;` as the start of a line comment when reading
    pub handle_comments: bool,
    /// Fail with `EvalError` once evaluation nests deeper than this.
    /// `None` leaves recursion bounded only by the native stack.
    pub max_eval_depth: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            handle_comments: true,
            max_eval_depth: None,
        }
    }
}

impl Config {
    pub fn with_max_eval_depth(mut self, limit: usize) -> Self {
        self.max_eval_depth = Some(limit);
        self
    }

    pub fn without_comments(mut self) -> Self {
        self.handle_comments = false;
        self
    }

    /// The subset of settings the reader cares about
    pub fn parse_config(&self) -> ParseConfig {
        ParseConfig {
            handle_comments: self.handle_comments,
        }
    }
}

/// Reader settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    pub handle_comments: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Config::default().parse_config()
    }
}
