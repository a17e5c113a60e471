//! Pure conversation reducer.
//!
//! [`Conversation`] applies one event at a time and never performs I/O. The
//! async side (generation, timers) lives in [`crate::session`], which feeds
//! results back in here.

use log::{ debug, warn };
use crate::generator::GenerationError;
use crate::models::chat::{ ChatMessage, ConversationState, Phase };
use crate::validator;

pub const GREETING: &str =
    "Hello! I'm Market Mind Spark, your AI market research assistant. How can I help with your market analysis today?";

pub const GENERATION_FAILED_MESSAGE: &str =
    "Sorry, there was an error analyzing your market query. Please try again.";

/// Identifies one error occurrence. An auto-clear only applies if the error
/// it was scheduled for is still the one displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// User message appended and loading started; the query must be generated.
    Accepted {
        query: String,
    },
    /// Off-topic input. Nothing appended.
    Rejected {
        reason: String,
        ticket: ErrorTicket,
    },
    /// The active generator needs a credential and none is stored.
    CredentialRequired,
    /// A generation is already in flight; the send was dropped.
    Busy,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    is_loading: bool,
    error: Option<(ErrorTicket, String)>,
    awaiting_credential: bool,
    error_generation: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    pub fn with_greeting(greeting: &str) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(greeting)],
            is_loading: false,
            error: None,
            awaiting_credential: false,
            error_generation: 0,
        }
    }

    /// `credential_available` is false only when the active generator needs a
    /// credential and the store has none.
    pub fn send(&mut self, text: &str, credential_available: bool) -> SendOutcome {
        if self.is_loading {
            warn!("Dropping send while a generation is outstanding");
            return SendOutcome::Busy;
        }

        if !credential_available {
            self.awaiting_credential = true;
            return SendOutcome::CredentialRequired;
        }

        let validation = validator::validate(text);
        if !validation.is_valid {
            let reason = validation.reason.unwrap_or_else(||
                validator::OFF_TOPIC_REASON.to_string()
            );
            let ticket = self.set_error(reason.clone());
            return SendOutcome::Rejected { reason, ticket };
        }

        debug!("Accepted query, matched keywords: {:?}", validator::matched_keywords(text));
        self.error = None;
        self.awaiting_credential = false;
        self.messages.push(ChatMessage::user(text));
        self.is_loading = true;
        SendOutcome::Accepted { query: text.to_string() }
    }

    /// Returns false if no generation was outstanding.
    pub fn generation_succeeded(&mut self, text: impl Into<String>) -> bool {
        if !self.is_loading {
            warn!("Ignoring generation result with no outstanding request");
            return false;
        }
        self.messages.push(ChatMessage::assistant(text));
        self.is_loading = false;
        true
    }

    /// Returns the ticket to schedule an auto-clear for, if a banner was set.
    pub fn generation_failed(&mut self, err: &GenerationError) -> Option<ErrorTicket> {
        if !self.is_loading {
            warn!("Ignoring generation failure with no outstanding request: {}", err);
            return None;
        }
        self.is_loading = false;
        match err {
            GenerationError::MissingCredential => {
                self.awaiting_credential = true;
                None
            }
            GenerationError::GenerationFailure(_) | GenerationError::Timeout(_) => {
                Some(self.set_error(GENERATION_FAILED_MESSAGE.to_string()))
            }
        }
    }

    /// Clears the error only if `ticket` still names the displayed one.
    pub fn auto_clear(&mut self, ticket: ErrorTicket) -> bool {
        match &self.error {
            Some((current, _)) if *current == ticket => {
                self.error = None;
                true
            }
            _ => false,
        }
    }

    pub fn credential_submitted(&mut self) {
        self.awaiting_credential = false;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn phase(&self) -> Phase {
        self.snapshot().phase()
    }

    pub fn snapshot(&self) -> ConversationState {
        ConversationState {
            messages: self.messages.clone(),
            is_loading: self.is_loading,
            error: self.error().map(str::to_string),
            awaiting_credential: self.awaiting_credential,
        }
    }

    fn set_error(&mut self, text: String) -> ErrorTicket {
        self.error_generation += 1;
        let ticket = ErrorTicket(self.error_generation);
        self.error = Some((ticket, text));
        ticket
    }
}
