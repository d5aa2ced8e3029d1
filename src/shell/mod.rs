//! The interactive read-eval loop and the per-line driver shared with
//! `source`.

pub mod builtins;
pub mod jobs;
pub mod syntax;

use anyhow::Result;
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use self::syntax::tokens::Token;
use self::syntax::{lexer, parser};

const PROMPT: &str = "shell $ ";

pub struct Shell {
    editor: DefaultEditor,
    /// Deep copy of the last executed line, replayed by `prev`.
    prev_tokens: Option<Vec<Token>>,
}

impl Shell {
    pub fn new() -> Result<Self> {
        Ok(Shell {
            editor: DefaultEditor::new()?,
            prev_tokens: None,
        })
    }

    /// Reads and runs lines until `exit` or end of input.
    pub fn run_interactive(&mut self) -> Result<()> {
        println!("Welcome to mini-shell.");
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());
                    if !self.eval_line(&line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {}
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }
        println!("Bye bye.");
        Ok(())
    }

    /// Runs one line; returns `false` when the session should end.
    ///
    /// A line that is exactly `prev` replays the cached previous token
    /// sequence without touching the cache, so two `prev` lines in a row
    /// replay the same thing. Anything else becomes the new cache entry
    /// before it runs.
    fn eval_line(&mut self, line: &str) -> bool {
        let tokens = match lexer::tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                eprintln!("cress: {e}");
                return true;
            }
        };
        debug!("tokens: {tokens:?}");
        match tokens.as_slice() {
            [] => true,
            [Token::Word(w)] if w == "exit" => false,
            [Token::Word(w)] if w == "prev" => {
                if let Some(prev) = self.prev_tokens.clone() {
                    run_tokens(&prev);
                }
                true
            }
            _ => {
                self.prev_tokens = Some(tokens.clone());
                run_tokens(&tokens);
                true
            }
        }
    }
}

/// Tokenizes and runs one line, reporting any failure to the user. Sourced
/// script lines come through here as well.
pub fn run_line(line: &str) {
    match lexer::tokenize(line) {
        Ok(tokens) => run_tokens(&tokens),
        Err(e) => eprintln!("cress: {e}"),
    }
}

/// Runs every command segment of one token sequence, strictly left to right.
/// A classification error skips only that segment; a spawn-level failure
/// abandons the rest of the line.
pub fn run_tokens(tokens: &[Token]) {
    for range in parser::split_on_semicolons(tokens) {
        let segment = &tokens[range];
        if segment.is_empty() {
            continue;
        }
        let plan = match parser::classify(segment) {
            Ok(plan) => plan,
            Err(e) => {
                eprintln!("cress: {e}");
                continue;
            }
        };
        if let Err(e) = jobs::execute(&plan) {
            eprintln!("cress: {e}");
            break;
        }
    }
}
