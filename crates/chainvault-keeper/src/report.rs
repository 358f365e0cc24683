// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chainvault_core::{RaisedError, Transition};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Forwards errors raised during command execution to the front-end.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    tx: mpsc::UnboundedSender<RaisedError>,
}

/// Create a reporter and the receiver the front-end drains.
pub fn error_channel() -> (ErrorReporter, mpsc::UnboundedReceiver<RaisedError>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ErrorReporter { tx }, rx)
}

impl ErrorReporter {
    /// Log and forward an error, returning the transition the command
    /// should report.
    pub fn raise(&self, message: impl Into<String>, critical: bool) -> Transition {
        let message = message.into();
        error!(critical, "{message}");
        if self.tx.send(RaisedError { message, critical }).is_err() {
            debug!("no receiver for raised error");
        }
        if critical {
            Transition::CriticalError
        } else {
            Transition::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn raise_logs_and_forwards() {
        let (reporter, mut rx) = error_channel();
        assert_eq!(reporter.raise("disk gone", false), Transition::Failed);
        assert_eq!(reporter.raise("out of memory", true), Transition::CriticalError);

        assert_eq!(
            rx.try_recv().unwrap(),
            RaisedError {
                message: "disk gone".to_string(),
                critical: false
            }
        );
        assert!(rx.try_recv().unwrap().critical);
        assert!(logs_contain("disk gone"));
    }

    #[test]
    fn raise_without_receiver_still_returns() {
        let (reporter, rx) = error_channel();
        drop(rx);
        assert_eq!(reporter.raise("nobody listening", false), Transition::Failed);
    }
}
