//! Terminal chat client for the InsectoPedia question-answering backend.
//!
//! [`cli::chat::session::ChatSession`] is the chat component and
//! [`cli::chat::ChatContext`] hosts it on a terminal.

pub mod cli;
pub mod query_client;
