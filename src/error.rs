use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error getting net io info: {0}")]
    Counters(String),

    #[error("error getting list of interfaces: {0}")]
    Interfaces(String),

    #[error("error compiling filter {pattern:?}: {reason}")]
    Filter { pattern: String, reason: String },

    #[error("Command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("Command `{command}` timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    pub(crate) fn counters<S: Into<String>>(msg: S) -> Self {
        Error::Counters(msg.into())
    }

    pub(crate) fn interfaces<S: Into<String>>(msg: S) -> Self {
        Error::Interfaces(msg.into())
    }

    pub(crate) fn filter<P: Into<String>, R: Into<String>>(pattern: P, reason: R) -> Self {
        Error::Filter { pattern: pattern.into(), reason: reason.into() }
    }

    pub(crate) fn command<C: Into<String>, R: Into<String>>(command: C, reason: R) -> Self {
        Error::Command { command: command.into(), reason: reason.into() }
    }

    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error aborts a poll. Side-channel errors never reach the
    /// caller, so anything returned from `gather` is fatal by construction;
    /// this is for hosts that want to classify errors from individual sources.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Counters(_) | Error::Interfaces(_) | Error::Filter { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::counters("open /proc/net/dev: no such file").to_string(),
            "error getting net io info: open /proc/net/dev: no such file"
        );
        assert_eq!(
            Error::interfaces("getifaddrs: EPERM").to_string(),
            "error getting list of interfaces: getifaddrs: EPERM"
        );
        assert_eq!(
            Error::filter("eth[", "unterminated character class").to_string(),
            "error compiling filter \"eth[\": unterminated character class"
        );
        let timeout = Error::CommandTimeout { command: "route -n".into(), timeout: Duration::from_secs(5) };
        assert_eq!(timeout.to_string(), "Command `route -n` timed out after 5s");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::counters("x").is_fatal());
        assert!(Error::interfaces("x").is_fatal());
        assert!(Error::filter("x", "y").is_fatal());
        assert!(!Error::command("route -n", "exit status: 1").is_fatal());
        assert!(!Error::config("x").is_fatal());
        assert!(!Error::from(std::io::Error::new(std::io::ErrorKind::Other, "x")).is_fatal());
    }
}
