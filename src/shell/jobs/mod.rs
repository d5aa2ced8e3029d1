//! Process orchestration: turns a classified [`Plan`] into child processes
//! wired together with pipes and redirected descriptors.
//!
//! Every command runs in a forked child; the parent waits per segment, so
//! segments execute strictly left to right. The one piece of state that has
//! to cross the process boundary backwards is the result of the `cd`
//! built-in: the child changes its own directory and sends the resulting
//! absolute path to the parent over a one-shot pipe, framed as a 4-byte
//! little-endian length followed by the path bytes.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStringExt;
use std::path::PathBuf;
use std::process;

use log::{debug, warn};
use nix::libc;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{chdir, dup2, fork, pipe, ForkResult, Pid};
use thiserror::Error;

use super::builtins;
use super::syntax::ast::Plan;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] nix::Error),
    #[error("failed to create pipe: {0}")]
    Channel(#[source] nix::Error),
    #[error("failed to wait for child {0}: {1}")]
    Wait(Pid, #[source] nix::Error),
    #[error("empty command")]
    EmptyCommand,
}

/// How a child's standard streams are wired before it runs.
enum Wiring<'a> {
    Inherit,
    OutputFile(&'a str),
    InputFile(&'a str),
}

/// Runs one classified command segment to completion.
///
/// Returns the exit status of the last child the parent waited for. A spawn
/// or pipe failure is fatal for the rest of the line; everything that goes
/// wrong inside a child (missing program, unopenable file) is reported on
/// that child's stderr and isolated there by the process boundary.
pub fn execute(plan: &Plan) -> Result<i32, Error> {
    debug!("executing {plan:?}");
    match plan {
        Plan::Simple(args) => spawn_command(args, Wiring::Inherit),
        Plan::RedirectOut { args, path } => spawn_command(args, Wiring::OutputFile(path.as_str())),
        Plan::RedirectIn { args, path } => spawn_command(args, Wiring::InputFile(path.as_str())),
        Plan::Pipe(left, right) => run_pipeline(left, right),
    }
}

fn spawn_command(args: &[String], wiring: Wiring) -> Result<i32, Error> {
    let head = args.first().ok_or(Error::EmptyCommand)?;
    // The working-directory channel lives for exactly one round trip.
    let wd_channel = if head == builtins::CD {
        Some(pipe().map_err(Error::Channel)?)
    } else {
        None
    };
    match unsafe { fork() }.map_err(Error::Spawn)? {
        ForkResult::Child => {
            let wd_write = wd_channel.map(|(read, write)| {
                drop(read);
                write
            });
            apply_wiring(&wiring);
            builtins::run_in_child(args, wd_write)
        }
        ForkResult::Parent { child } => {
            let wd_read = wd_channel.map(|(read, write)| {
                drop(write);
                read
            });
            let status = wait_blocking(child)?;
            if let Some(read) = wd_read {
                apply_cd_result(read);
            }
            Ok(status)
        }
    }
}

/// Wires left stdout to right stdin through one pipe.
///
/// The first child evaluates the already-classified left plan (so a
/// redirection on the left still works); the second runs the raw right-hand
/// argument list through the same child-side dispatcher as a simple command.
/// The parent makes one non-blocking reap attempt on the left child, waits
/// for the right child, then reaps the left child for real so no zombie
/// survives the segment.
fn run_pipeline(left: &Plan, right: &[String]) -> Result<i32, Error> {
    if right.is_empty() {
        return Err(Error::EmptyCommand);
    }
    let (read_end, write_end) = pipe().map_err(Error::Channel)?;

    let left_child = match unsafe { fork() }.map_err(Error::Spawn)? {
        ForkResult::Child => {
            drop(read_end);
            redirect_into(write_end, libc::STDOUT_FILENO);
            let status = match execute(left) {
                Ok(status) => status,
                Err(e) => {
                    eprintln!("cress: {e}");
                    1
                }
            };
            process::exit(status);
        }
        ForkResult::Parent { child } => child,
    };

    let right_child = match unsafe { fork() }.map_err(Error::Spawn)? {
        ForkResult::Child => {
            drop(write_end);
            redirect_into(read_end, libc::STDIN_FILENO);
            builtins::run_in_child(right, None)
        }
        ForkResult::Parent { child } => child,
    };

    // Both parent ends must close here or the right child never sees EOF.
    drop(write_end);
    drop(read_end);

    let left_reaped = wait_nonblocking(left_child)?.is_some();
    let status = wait_blocking(right_child)?;
    if !left_reaped {
        wait_blocking(left_child)?;
    }
    Ok(status)
}

/// Child-side stream setup. Failure to open a redirection target is fatal for
/// this child only; the error is reported here and the child exits.
fn apply_wiring(wiring: &Wiring) {
    match wiring {
        Wiring::Inherit => {}
        Wiring::OutputFile(path) => {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path);
            match file {
                Ok(file) => redirect_into(file.into(), libc::STDOUT_FILENO),
                Err(e) => {
                    eprintln!("cress: {path}: cannot open for writing: {e}");
                    process::exit(1);
                }
            }
        }
        Wiring::InputFile(path) => match File::open(path) {
            Ok(file) => redirect_into(file.into(), libc::STDIN_FILENO),
            Err(e) => {
                eprintln!("cress: {path}: cannot open for reading: {e}");
                process::exit(1);
            }
        },
    }
}

/// Replaces the standard stream slot `target` with `fd`, then closes `fd`.
fn redirect_into(fd: OwnedFd, target: RawFd) {
    if let Err(e) = dup2(fd.as_raw_fd(), target) {
        eprintln!("cress: cannot redirect descriptor {target}: {e}");
        process::exit(1);
    }
    // dropping `fd` closes the original; the duplicate on `target` remains
}

/// Reads the framed path a `cd` child sent back and applies it to this
/// process. EOF before a full frame means the child's chdir failed and the
/// child already reported its own error, so there is nothing to apply.
fn apply_cd_result(read_end: OwnedFd) {
    let mut channel = File::from(read_end);
    let mut len_bytes = [0u8; 4];
    match channel.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return,
        Err(e) => {
            warn!("working-directory channel read failed: {e}");
            return;
        }
    }
    let mut path = vec![0u8; u32::from_le_bytes(len_bytes) as usize];
    if let Err(e) = channel.read_exact(&mut path) {
        warn!("working-directory channel sent a short frame: {e}");
        return;
    }
    let path = PathBuf::from(OsString::from_vec(path));
    if let Err(e) = chdir(&path) {
        eprintln!("cress: cd: {}: {e}", path.display());
    }
}

fn wait_blocking(child: Pid) -> Result<i32, Error> {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(128 + signal as i32),
            Ok(_) => continue,
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => return Err(Error::Wait(child, e)),
        }
    }
}

/// One non-blocking reap attempt; `None` when the child has not exited yet.
fn wait_nonblocking(child: Pid) -> Result<Option<i32>, Error> {
    match waitpid(child, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::StillAlive) => Ok(None),
        Ok(WaitStatus::Exited(_, code)) => Ok(Some(code)),
        Ok(WaitStatus::Signaled(_, signal, _)) => Ok(Some(128 + signal as i32)),
        Ok(_) => Ok(None),
        Err(e) => Err(Error::Wait(child, e)),
    }
}
