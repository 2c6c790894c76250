use std::io::{self, Write};

use color_print::cformat;

pub const QUERY_FAILED_TITLE: &str = "Error";
pub const QUERY_FAILED_DESCRIPTION: &str = "Backend query failed.";

/// A transient, user-visible alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn query_failed() -> Self {
        Self {
            title: QUERY_FAILED_TITLE.to_string(),
            description: QUERY_FAILED_DESCRIPTION.to_string(),
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Prints notifications as a red toast line on stderr.
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn format(&self, notification: &Notification) -> String {
        if self.color {
            cformat!(
                "<red><bold>✗ {}</></>: <red>{}</>",
                notification.title,
                notification.description
            )
        } else {
            format!("✗ {}: {}", notification.title, notification.description)
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let line = self.format(&notification);
        // Nothing sensible to do if stderr itself is gone.
        let _ = writeln!(io::stderr(), "{}", line);
    }
}
