/// A single-character structural operator.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Op {
    Semi,
    Pipe,
    RedirectOut,
    RedirectIn,
    LParen,
    RParen,
}

impl Op {
    pub fn from_char(c: char) -> Option<Op> {
        match c {
            ';' => Some(Op::Semi),
            '|' => Some(Op::Pipe),
            '>' => Some(Op::RedirectOut),
            '<' => Some(Op::RedirectIn),
            '(' => Some(Op::LParen),
            ')' => Some(Op::RParen),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Semi => ";",
            Op::Pipe => "|",
            Op::RedirectOut => ">",
            Op::RedirectIn => "<",
            Op::LParen => "(",
            Op::RParen => ")",
        }
    }
}

/// Minimal lexical unit: a bare word, a quoted literal (quotes already
/// stripped), or a structural operator.
///
/// `Quoted` is kept distinct from `Word` so that a quoted `";"` stays an
/// ordinary argument instead of splitting the line into two commands.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Token {
    Word(String),
    Quoted(String),
    Op(Op),
}

impl Token {
    /// The text this token contributes to an argument list.
    pub fn text(&self) -> &str {
        match self {
            Token::Word(s) | Token::Quoted(s) => s,
            Token::Op(op) => op.as_str(),
        }
    }

    pub fn is_op(&self, op: Op) -> bool {
        matches!(self, Token::Op(o) if *o == op)
    }
}
