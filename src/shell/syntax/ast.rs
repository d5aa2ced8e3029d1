/// The classified shape of one semicolon-delimited command segment.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Plan {
    /// One program or built-in invocation.
    Simple(Vec<String>),
    /// The left side of the first `|`, classified, and everything after it as
    /// a verbatim argument list. Only the first pipe is structural, so
    /// `a | b | c` hands `b`, `|`, `c` to the right-hand command as literal
    /// arguments rather than chaining a third stage.
    Pipe(Box<Plan>, Vec<String>),
    /// `args > path`: standard output replaced by `path`, truncated or
    /// created.
    RedirectOut { args: Vec<String>, path: String },
    /// `args < path`: standard input replaced by `path`.
    RedirectIn { args: Vec<String>, path: String },
}
