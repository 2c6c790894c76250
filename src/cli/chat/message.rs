use std::fmt;

use chrono::{DateTime, Local};

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single transcript entry.
///
/// Messages never change after they are created, so the fields are only
/// reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
    timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self::with_timestamp(id, role, content, Local::now())
    }

    pub fn with_timestamp(
        id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

/// Hands out message ids derived from the submission time.
///
/// Ids are epoch milliseconds, bumped by one whenever the clock has not moved
/// past the previous id.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: i64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now: DateTime<Local>) -> String {
        let millis = now.timestamp_millis();
        let id = if millis > self.last { millis } else { self.last + 1 };
        self.last = id;
        id.to_string()
    }
}
