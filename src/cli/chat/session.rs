use tracing::{debug, error};

use super::conversation_state::ConversationState;
use super::notification::{Notification, Notifier};
use crate::query_client::{QueryBackend, QueryError};

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    EmptyInput,
    InFlight,
}

/// What a submission ended up doing to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(SubmitRejected),
    Answered,
    Failed,
}

/// A question that has been recorded in the transcript and is waiting on the
/// backend. Handed back to [`ChatSession::finish_submit`] once resolved.
#[derive(Debug)]
#[must_use]
pub struct PendingQuery {
    question: String,
}

impl PendingQuery {
    pub fn question(&self) -> &str {
        &self.question
    }
}

/// The chat component: transcript, pending input and the in-flight flag.
pub struct ChatSession<B, N> {
    conversation_state: ConversationState,
    pending_input: String,
    in_flight: bool,
    backend: B,
    notifier: N,
}

impl<B: QueryBackend, N: Notifier> ChatSession<B, N> {
    pub fn new(backend: B, notifier: N) -> Self {
        Self {
            conversation_state: ConversationState::new(),
            pending_input: String::new(),
            in_flight: false,
            backend,
            notifier,
        }
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation_state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn input(&self) -> &str {
        &self.pending_input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn input_enabled(&self) -> bool {
        !self.in_flight
    }

    pub fn can_submit(&self) -> bool {
        !self.in_flight && !self.pending_input.trim().is_empty()
    }

    /// Records the pending input as a user message and marks the session busy.
    ///
    /// Nothing changes when the input is blank or a request is outstanding.
    pub fn begin_submit(&mut self) -> Result<PendingQuery, SubmitRejected> {
        if self.in_flight {
            debug!("Ignoring submit while a query is in flight");
            return Err(SubmitRejected::InFlight);
        }
        let question = self.pending_input.trim().to_string();
        if question.is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }

        self.conversation_state.add_user_message(&question);
        self.pending_input.clear();
        self.in_flight = true;

        Ok(PendingQuery { question })
    }

    pub async fn resolve(&self, pending: &PendingQuery) -> Result<String, QueryError> {
        self.backend.query(pending.question()).await
    }

    pub fn finish_submit(
        &mut self,
        pending: PendingQuery,
        result: Result<String, QueryError>,
    ) -> SubmitOutcome {
        self.in_flight = false;

        match result {
            Ok(answer) => {
                self.conversation_state.add_assistant_message(&answer);
                SubmitOutcome::Answered
            }
            Err(e) => {
                error!("Query for {:?} failed: {}", pending.question(), e);
                self.notifier.notify(Notification::query_failed());
                SubmitOutcome::Failed
            }
        }
    }

    /// Submits the pending input and waits for the backend.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(reason) => return SubmitOutcome::Rejected(reason),
        };
        let result = self.resolve(&pending).await;
        self.finish_submit(pending, result)
    }

    pub async fn submit_question(&mut self, question: &str) -> SubmitOutcome {
        self.set_input(question);
        self.submit().await
    }
}
