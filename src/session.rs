//! Single-owner actor around [`Conversation`].
//!
//! Every transition runs on the actor task, in arrival order. Generation and
//! auto-clear timers run as spawned tasks and report back over an internal
//! channel, so the loop never waits on the model.

use log::{ debug, error, info, warn };
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{ mpsc, oneshot, watch };
use tokio::task::JoinHandle;
use crate::conversation::{ Conversation, ErrorTicket, SendOutcome };
use crate::credential::{ CredentialError, CredentialStore };
use crate::generator::{ GenerationError, ResponseGenerator };
use crate::models::chat::ConversationState;

pub const DEFAULT_ERROR_DISPLAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("chat session has shut down")]
    Closed,
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub error_display: Duration,
    /// No limit when `None`.
    pub generation_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            error_display: DEFAULT_ERROR_DISPLAY,
            generation_timeout: None,
        }
    }
}

enum SessionCommand {
    Send {
        text: String,
        reply: oneshot::Sender<SendOutcome>,
    },
    SubmitCredential {
        text: String,
        reply: oneshot::Sender<Result<(), CredentialError>>,
    },
    ClearCredential {
        reply: oneshot::Sender<Result<(), CredentialError>>,
    },
    Shutdown,
}

enum SessionEvent {
    GenerationSettled(Result<String, GenerationError>),
    AutoClear(ErrorTicket),
}

pub struct ChatSession {
    conversation: Conversation,
    credentials: CredentialStore,
    generator: Arc<dyn ResponseGenerator>,
    config: SessionConfig,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    state_tx: watch::Sender<ConversationState>,
    pending_clear: Option<JoinHandle<()>>,
}

impl ChatSession {
    /// Starts the actor on the current tokio runtime.
    pub fn spawn(
        generator: Arc<dyn ResponseGenerator>,
        credentials: CredentialStore,
        config: SessionConfig
    ) -> ChatSessionHandle {
        let conversation = Conversation::new();
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(conversation.snapshot());

        info!(
            "Starting chat session: generator={}, credential set={}, error display={:?}, timeout={:?}",
            generator.name(),
            credentials.is_set(),
            config.error_display,
            config.generation_timeout
        );

        let session = Self {
            conversation,
            credentials,
            generator,
            config,
            commands,
            events_tx,
            events_rx,
            state_tx,
            pending_clear: None,
        };
        tokio::spawn(session.run());

        ChatSessionHandle {
            commands: commands_tx,
            state: state_rx,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(SessionCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command).await,
                    }
                }
                Some(event) = self.events_rx.recv() => self.handle_event(event),
            }
        }
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }
        debug!("Chat session loop finished");
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Send { text, reply } => {
                let outcome = self.handle_send(&text);
                let _ = reply.send(outcome);
            }
            SessionCommand::SubmitCredential { text, reply } => {
                let result = self.credentials.submit(&text).await;
                if result.is_ok() {
                    self.conversation.credential_submitted();
                    self.publish();
                }
                let _ = reply.send(result);
            }
            SessionCommand::ClearCredential { reply } => {
                let result = self.credentials.clear().await;
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn handle_send(&mut self, text: &str) -> SendOutcome {
        let credential_available = !self.generator.requires_credential() || self.credentials.is_set();
        let outcome = self.conversation.send(text, credential_available);
        match &outcome {
            SendOutcome::Accepted { query } => self.start_generation(query.clone()),
            SendOutcome::Rejected { ticket, .. } => {
                info!("Query rejected as off-topic");
                self.schedule_auto_clear(*ticket);
            }
            SendOutcome::CredentialRequired => {
                info!("Query held back: {} generator needs an API key", self.generator.name());
            }
            SendOutcome::Busy => warn!("Send ignored, a response is still being generated"),
        }
        self.publish();
        outcome
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::GenerationSettled(Ok(text)) => {
                if self.conversation.generation_succeeded(text) {
                    info!("Market analysis completed");
                }
            }
            SessionEvent::GenerationSettled(Err(err)) => {
                error!("Analysis failed: {}", err);
                if let Some(ticket) = self.conversation.generation_failed(&err) {
                    self.schedule_auto_clear(ticket);
                }
            }
            SessionEvent::AutoClear(ticket) => {
                if self.conversation.auto_clear(ticket) {
                    debug!("Error banner cleared after {:?}", self.config.error_display);
                }
            }
        }
        self.publish();
    }

    fn start_generation(&self, query: String) {
        let generator = Arc::clone(&self.generator);
        let credential = self.credentials.current().clone();
        let timeout = self.config.generation_timeout;
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let result = match timeout {
                Some(limit) =>
                    match tokio::time::timeout(limit, generator.generate(&query, &credential)).await {
                        Ok(result) => result,
                        Err(_) => Err(GenerationError::Timeout(limit)),
                    }
                None => generator.generate(&query, &credential).await,
            };
            let _ = events.send(SessionEvent::GenerationSettled(result));
        });
    }

    fn schedule_auto_clear(&mut self, ticket: ErrorTicket) {
        let delay = self.config.error_display;
        let events = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::AutoClear(ticket));
        });
        if let Some(previous) = self.pending_clear.replace(handle) {
            previous.abort();
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.conversation.snapshot());
    }
}

/// Cloneable front door to a running [`ChatSession`].
#[derive(Clone)]
pub struct ChatSessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    state: watch::Receiver<ConversationState>,
}

impl ChatSessionHandle {
    pub async fn send_message(&self, text: impl Into<String>) -> Result<SendOutcome, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Send { text: text.into(), reply })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn submit_credential(&self, text: impl Into<String>) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::SubmitCredential { text: text.into(), reply })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?.map_err(SessionError::from)
    }

    pub async fn clear_credential(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::ClearCredential { reply })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?.map_err(SessionError::from)
    }

    pub fn state(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.clone()
    }

    /// Waits until no generation is outstanding and returns that state.
    pub async fn settled(&self) -> Result<ConversationState, SessionError> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(|s| !s.is_loading).await
            .map_err(|_| SessionError::Closed)?;
        Ok(state.clone())
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
    }
}
