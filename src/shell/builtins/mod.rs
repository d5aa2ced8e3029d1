//! Built-in dispatch, run inside the forked child.
//!
//! Everything here ends the child process: built-ins exit directly and
//! anything unrecognized is handed to `execvp`. `cd` is the one built-in
//! whose effect must outlive the child, so it reports its resulting
//! directory back to the parent over the working-directory channel.

use std::ffi::CString;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::os::fd::OwnedFd;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::process;

use nix::unistd::{chdir, execvp, getcwd};

pub const CD: &str = "cd";

const HELP_TEXT: &str = "\
The built in commands are as follows:
1. exit   : helps exit from the shell
2. cd     : changes the current working directory of the shell to the path specified as the argument
3. source : helps execute a script
4. prev   : prints the previous command line and executes it again, without becoming the new command line
5. help   : explains all the built-in commands available in the shell";

/// Runs `args` to completion inside the current (forked) child and never
/// returns.
///
/// Built-in names are matched only in first position. `prev` is a no-op down
/// here; its replay lives in the top-level loop, which never forwards it to a
/// child except from inside a sourced script.
pub fn run_in_child(args: &[String], wd_channel: Option<OwnedFd>) -> ! {
    let Some(name) = args.first() else {
        process::exit(0);
    };
    match name.as_str() {
        "help" => {
            println!("{HELP_TEXT}");
            process::exit(0);
        }
        "prev" => process::exit(0),
        CD => run_cd(args, wd_channel),
        "source" => run_source(args),
        _ => exec_external(args),
    }
}

/// Changes this child's directory and sends the resulting absolute path back
/// through the channel. On any failure nothing is written, so the parent's
/// frame read sees EOF instead of blocking.
fn run_cd(args: &[String], wd_channel: Option<OwnedFd>) -> ! {
    let Some(target) = args.get(1) else {
        eprintln!("cd: missing operand");
        process::exit(1);
    };
    if let Err(e) = chdir(Path::new(target)) {
        eprintln!("cd: {target}: {e}");
        process::exit(1);
    }
    let cwd = match getcwd() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("cd: getcwd: {e}");
            process::exit(1);
        }
    };
    if let Some(write_end) = wd_channel {
        let bytes = cwd.as_os_str().as_bytes();
        let mut channel = File::from(write_end);
        let framed = channel
            .write_all(&(bytes.len() as u32).to_le_bytes())
            .and_then(|()| channel.write_all(bytes));
        if let Err(e) = framed {
            eprintln!("cd: working-directory channel: {e}");
            process::exit(1);
        }
    }
    process::exit(0);
}

/// Runs a script file line by line, each line through the same
/// tokenize/segment/classify/execute path as the interactive loop. A file
/// that cannot be opened is reported and skipped; it does not bring down the
/// session.
fn run_source(args: &[String]) -> ! {
    let Some(path) = args.get(1) else {
        eprintln!("source: missing file name");
        process::exit(1);
    };
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("source: {path}: {e}");
            process::exit(1);
        }
    };
    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => crate::shell::run_line(&line),
            Err(e) => {
                eprintln!("source: {path}: {e}");
                process::exit(1);
            }
        }
    }
    process::exit(0);
}

fn exec_external(args: &[String]) -> ! {
    let argv: Result<Vec<CString>, _> = args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect();
    let argv = match argv {
        Ok(argv) => argv,
        Err(_) => {
            eprintln!("{}: argument contains an interior NUL byte", args[0]);
            process::exit(1);
        }
    };
    // execvp only ever returns on failure
    let _ = execvp(&argv[0], &argv);
    eprintln!("{}: command not found", args[0]);
    process::exit(127);
}
