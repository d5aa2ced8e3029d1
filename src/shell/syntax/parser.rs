//! Groups a token sequence into command segments and classifies each segment
//! into a [`Plan`].

use std::ops::Range;

use thiserror::Error;

use super::ast::Plan;
use super::tokens::{Op, Token};

#[derive(PartialEq, Eq, Debug, Error)]
pub enum ParseError {
    #[error("`{0}` needs a command on its left and a target on its right")]
    InvalidRedirection(&'static str),
    #[error("`{0}` takes a single target, found extra tokens after it")]
    TrailingRedirectTokens(&'static str),
    #[error("empty command on one side of `|`")]
    EmptyPipeSide,
}

/// Splits a token sequence into command segments at `;` tokens.
///
/// Each range is end-exclusive at the index of the `;` that closes it; the
/// final segment is closed implicitly at the end of the sequence even without
/// a trailing `;`. Empty ranges (from `;;`, or a leading or trailing `;`) are
/// returned as-is and must be skipped by the caller rather than executed.
pub fn split_on_semicolons(tokens: &[Token]) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_op(Op::Semi) {
            segments.push(start..i);
            start = i + 1;
        }
    }
    segments.push(start..tokens.len());
    segments
}

/// Classifies one command segment.
///
/// The tie-break is fixed: the first `|` anywhere wins over `>`, which wins
/// over `<`, regardless of their relative positions. The left side of a pipe
/// is classified recursively (it can still carry a redirection); the right
/// side is taken verbatim.
pub fn classify(segment: &[Token]) -> Result<Plan, ParseError> {
    if let Some(i) = position_of(segment, Op::Pipe) {
        let (left, right) = (&segment[..i], &segment[i + 1..]);
        if left.is_empty() || right.is_empty() {
            return Err(ParseError::EmptyPipeSide);
        }
        let left = classify(left)?;
        return Ok(Plan::Pipe(Box::new(left), argv(right)));
    }
    if let Some(i) = position_of(segment, Op::RedirectOut) {
        let (args, path) = redirect_parts(segment, i, ">")?;
        return Ok(Plan::RedirectOut { args, path });
    }
    if let Some(i) = position_of(segment, Op::RedirectIn) {
        let (args, path) = redirect_parts(segment, i, "<")?;
        return Ok(Plan::RedirectIn { args, path });
    }
    Ok(Plan::Simple(argv(segment)))
}

fn position_of(tokens: &[Token], op: Op) -> Option<usize> {
    tokens.iter().position(|t| t.is_op(op))
}

fn argv(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text().to_owned()).collect()
}

fn redirect_parts(
    segment: &[Token],
    i: usize,
    op: &'static str,
) -> Result<(Vec<String>, String), ParseError> {
    if i == 0 || i == segment.len() - 1 {
        return Err(ParseError::InvalidRedirection(op));
    }
    if segment.len() > i + 2 {
        return Err(ParseError::TrailingRedirectTokens(op));
    }
    Ok((argv(&segment[..i]), segment[i + 1].text().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn args(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn three_segments_in_order() {
        let tokens = tokenize("a;b;c").unwrap();
        assert_eq!(split_on_semicolons(&tokens), vec![0..1, 2..3, 4..5]);
    }

    #[test]
    fn empty_middle_segment_is_reported_empty() {
        let tokens = tokenize("a;;b").unwrap();
        let segments = split_on_semicolons(&tokens);
        assert_eq!(segments, vec![0..1, 2..2, 3..4]);
        assert_eq!(segments.iter().filter(|r| !r.is_empty()).count(), 2);
    }

    #[test]
    fn trailing_semicolon_yields_empty_final_segment() {
        let tokens = tokenize("a;").unwrap();
        assert_eq!(split_on_semicolons(&tokens), vec![0..1, 2..2]);
    }

    #[test]
    fn quoted_semicolon_does_not_split() {
        let tokens = tokenize("echo \";\"").unwrap();
        assert_eq!(split_on_semicolons(&tokens), vec![0..2]);
    }

    #[test]
    fn input_redirect_is_classified() {
        let tokens = tokenize("cat<in.txt").unwrap();
        assert_eq!(
            classify(&tokens).unwrap(),
            Plan::RedirectIn {
                args: args(&["cat"]),
                path: "in.txt".to_owned(),
            }
        );
    }

    #[test]
    fn output_redirect_is_classified() {
        let tokens = tokenize("echo hi>out.txt").unwrap();
        assert_eq!(
            classify(&tokens).unwrap(),
            Plan::RedirectOut {
                args: args(&["echo", "hi"]),
                path: "out.txt".to_owned(),
            }
        );
    }

    #[test]
    fn redirect_at_either_end_is_invalid() {
        let tokens = tokenize(">out.txt").unwrap();
        assert_eq!(
            classify(&tokens),
            Err(ParseError::InvalidRedirection(">"))
        );
        let tokens = tokenize("echo<").unwrap();
        assert_eq!(
            classify(&tokens),
            Err(ParseError::InvalidRedirection("<"))
        );
    }

    #[test]
    fn extra_tokens_after_redirect_target_are_rejected() {
        let tokens = tokenize("echo>a b").unwrap();
        assert_eq!(
            classify(&tokens),
            Err(ParseError::TrailingRedirectTokens(">"))
        );
    }

    #[test]
    fn pipe_splits_at_first_pipe_only() {
        let tokens = tokenize("a|b|c").unwrap();
        assert_eq!(
            classify(&tokens).unwrap(),
            Plan::Pipe(
                Box::new(Plan::Simple(args(&["a"]))),
                args(&["b", "|", "c"]),
            )
        );
    }

    #[test]
    fn pipe_wins_over_redirect_regardless_of_position() {
        let tokens = tokenize("a>b|c").unwrap();
        assert_eq!(
            classify(&tokens).unwrap(),
            Plan::Pipe(
                Box::new(Plan::RedirectOut {
                    args: args(&["a"]),
                    path: "b".to_owned(),
                }),
                args(&["c"]),
            )
        );
    }

    #[test]
    fn pipe_with_an_empty_side_is_rejected() {
        let tokens = tokenize("|a").unwrap();
        assert_eq!(classify(&tokens), Err(ParseError::EmptyPipeSide));
        let tokens = tokenize("a|").unwrap();
        assert_eq!(classify(&tokens), Err(ParseError::EmptyPipeSide));
    }

    #[test]
    fn plain_segment_is_simple() {
        let tokens = tokenize("echo hi there").unwrap();
        assert_eq!(
            classify(&tokens).unwrap(),
            Plan::Simple(args(&["echo", "hi", "there"]))
        );
    }
}
