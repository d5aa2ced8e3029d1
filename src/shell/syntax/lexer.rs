//! Splits one input line into tokens, one character at a time.

use thiserror::Error;

use super::tokens::{Op, Token};

/// Longest accepted input line, in bytes.
pub const MAX_LINE_BYTES: usize = 255;
/// Most tokens accepted on one line.
pub const MAX_TOKENS: usize = 100;

#[derive(PartialEq, Eq, Debug, Error)]
pub enum LexError {
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("input line exceeds {MAX_LINE_BYTES} bytes")]
    InputTooLong,
    #[error("input line exceeds {MAX_TOKENS} tokens")]
    TooManyTokens,
}

enum State {
    Start,
    InWord,
    InQuote,
}

/// Tokenizes `line`.
///
/// Operator characters (`;` `<` `>` `(` `)` `|`) end any in-progress word and
/// become their own one-character token, whitespace or not: `ls>out` lexes as
/// `ls`, `>`, `out`, and `a;;b` as `a`, `;`, `;`, `b`. Inside double quotes
/// every character is literal and the whole run becomes a single token with
/// the quotes stripped. A quote opens only at a token boundary; one in the
/// middle of a word is an ordinary word character.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    if line.len() > MAX_LINE_BYTES {
        return Err(LexError::InputTooLong);
    }
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut state = State::Start;
    for c in line.chars() {
        match state {
            State::Start => match c {
                '"' => state = State::InQuote,
                ' ' | '\t' | '\n' => {}
                c => {
                    if let Some(op) = Op::from_char(c) {
                        push(&mut tokens, Token::Op(op))?;
                    } else {
                        buf.push(c);
                        state = State::InWord;
                    }
                }
            },
            State::InWord => match c {
                ' ' | '\t' | '\n' => {
                    push(&mut tokens, Token::Word(std::mem::take(&mut buf)))?;
                    state = State::Start;
                }
                c => {
                    if let Some(op) = Op::from_char(c) {
                        push(&mut tokens, Token::Word(std::mem::take(&mut buf)))?;
                        push(&mut tokens, Token::Op(op))?;
                        state = State::Start;
                    } else {
                        buf.push(c);
                    }
                }
            },
            State::InQuote => match c {
                '"' => {
                    push(&mut tokens, Token::Quoted(std::mem::take(&mut buf)))?;
                    state = State::Start;
                }
                c => buf.push(c),
            },
        }
    }
    match state {
        State::InQuote => Err(LexError::UnterminatedQuote),
        State::InWord => {
            push(&mut tokens, Token::Word(buf))?;
            Ok(tokens)
        }
        State::Start => Ok(tokens),
    }
}

fn push(tokens: &mut Vec<Token>, token: Token) -> Result<(), LexError> {
    if tokens.len() == MAX_TOKENS {
        return Err(LexError::TooManyTokens);
    }
    tokens.push(token);
    Ok(())
}
