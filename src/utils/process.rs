use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs `program args..` and returns its stdout.
///
/// Stdout is drained on a helper thread while this thread waits for exit, so a
/// child that fills the pipe cannot deadlock the wait. If `timeout` elapses the
/// child is killed. In every path the child is reaped before returning. The
/// reader is only waited on for a bounded time: a grandchild that inherited
/// stdout can hold the pipe open past the child's exit, in which case the
/// reader thread is left to finish on its own.
pub fn run_with_timeout(program: &str, args: &[String], timeout: Duration) -> Result<String> {
    let display = command_line(program, args);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::command(&display, e.to_string()))?;

    let Some(mut stdout) = child.stdout.take() else {
        reap(&mut child);
        return Err(Error::command(&display, "stdout pipe unavailable"));
    };

    let (tx, rx) = mpsc::channel();
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        let res = stdout.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(res);
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                reap(&mut child);
                let _ = rx.recv_timeout(POLL_INTERVAL);
                return Err(Error::CommandTimeout { command: display, timeout });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                reap(&mut child);
                let _ = rx.recv_timeout(POLL_INTERVAL);
                return Err(Error::command(&display, e.to_string()));
            }
        }
    };

    let remaining = deadline.saturating_duration_since(Instant::now()).max(POLL_INTERVAL);
    let output = match rx.recv_timeout(remaining) {
        Ok(res) => {
            let _ = reader.join();
            res.map_err(|e| Error::command(&display, e.to_string()))?
        }
        Err(_) => return Err(Error::CommandTimeout { command: display, timeout }),
    };

    if !status.success() {
        return Err(Error::command(&display, format!("exited with {status}")));
    }

    Ok(String::from_utf8_lossy(&output).into_owned())
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
