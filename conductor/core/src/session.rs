//! Session Management
//!
//! A session is one conversation with one figure: the figure, the message
//! log, and whether an exchange is in flight.
//!
//! # Send Workflow
//!
//! A send happens in two halves so that the interactive surface can keep
//! running while the exchange is in flight:
//!
//! 1. [`SessionController::begin_send`] validates the input, appends the
//!    user message, marks the session pending and hands back an
//!    [`ExchangeTicket`].
//! 2. [`ExchangeTicket::run`] performs the exchange and always produces an
//!    [`ExchangeOutcome`], even if the client panics.
//! 3. [`SessionController::resolve`] appends the reply (or the fallback) and
//!    clears the pending flag, but only for an outcome that targets this
//!    session.
//!
//! [`SessionController::send_message`] runs all three in sequence for
//! callers that can simply await the reply.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::catalog::Figure;
use crate::exchange::{ExchangeClient, ExchangeError, ExchangeReply};
use crate::messages::{Message, SessionId};

/// Assistant text substituted when an exchange fails
pub const FALLBACK_MESSAGE: &str = "Sorry, something went wrong. Please try again later.";

/// The greeting that opens every session
#[must_use]
pub fn render_greeting(figure: &Figure) -> String {
    format!(
        "Greetings, I am {}. Through the wisdom of ages, I am here to share knowledge and insights from my era. What would you like to discuss?",
        figure.name
    )
}

/// Why a send was not started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The input was empty after trimming
    Empty,
    /// An exchange is already in flight for this session
    Busy,
}

/// Result of [`SessionController::send_message`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The figure replied
    Replied,
    /// The exchange failed and the fallback message was appended
    Failed,
    /// Nothing was sent; the log is unchanged
    Rejected(RejectReason),
}

/// A started exchange, ready to be run
///
/// Carries its own copy of the figure so it can outlive the session that
/// issued it.
#[derive(Clone, Debug)]
pub struct ExchangeTicket {
    session_id: SessionId,
    figure: Figure,
    message: String,
}

impl ExchangeTicket {
    /// Session that issued this ticket
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The message exactly as the user typed it
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Perform the exchange
    ///
    /// Never fails: transport errors, bad payloads and panics inside the
    /// client are all captured in the outcome.
    pub async fn run(self, client: &dyn ExchangeClient) -> ExchangeOutcome {
        tracing::debug!(
            session_id = %self.session_id,
            figure = %self.figure.name,
            client = client.name(),
            "Starting exchange"
        );

        let result = AssertUnwindSafe(client.send(&self.figure, &self.message))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ExchangeError::Panicked(panic_message(&*panic))));

        ExchangeOutcome {
            session_id: self.session_id,
            result,
        }
    }
}

/// The resolution of an exchange, addressed to the session that started it
#[derive(Debug)]
pub struct ExchangeOutcome {
    /// Session the outcome belongs to
    pub session_id: SessionId,
    /// Reply or failure
    pub result: Result<ExchangeReply, ExchangeError>,
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The active conversation
pub struct SessionController {
    /// Unique session ID
    id: SessionId,
    /// The persona being spoken to
    figure: Figure,
    /// Conversation log, oldest first; never empty
    log: Vec<Message>,
    /// Whether an exchange is in flight
    pending: bool,
    /// Client used by [`Self::send_message`]
    client: Arc<dyn ExchangeClient>,
}

impl SessionController {
    /// Start a session with `figure`
    ///
    /// The log begins with the figure's greeting.
    pub fn start(figure: Figure, client: Arc<dyn ExchangeClient>) -> Self {
        let id = SessionId::new();
        let greeting = Message::assistant(render_greeting(&figure));

        tracing::info!(session_id = %id, figure = %figure.name, "Session started");

        Self {
            id,
            figure,
            log: vec![greeting],
            pending: false,
            client,
        }
    }

    /// Session ID
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The figure this session talks to
    #[must_use]
    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    /// All messages, oldest first
    #[must_use]
    pub fn log(&self) -> &[Message] {
        &self.log
    }

    /// Whether an exchange is in flight
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Validate input and start an exchange
    ///
    /// On success the trimmed text is appended as a user message and the
    /// session becomes pending. The ticket carries the untrimmed text.
    ///
    /// # Errors
    ///
    /// Returns the [`RejectReason`] if the input is blank or an exchange is
    /// already in flight. The session is left untouched.
    pub fn begin_send(&mut self, raw: &str) -> Result<ExchangeTicket, RejectReason> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            tracing::debug!(session_id = %self.id, "Ignoring blank message");
            return Err(RejectReason::Empty);
        }
        if self.pending {
            tracing::debug!(session_id = %self.id, "Ignoring message while exchange is pending");
            return Err(RejectReason::Busy);
        }

        self.log.push(Message::user(trimmed));
        self.pending = true;

        Ok(ExchangeTicket {
            session_id: self.id,
            figure: self.figure.clone(),
            message: raw.to_string(),
        })
    }

    /// Apply an exchange outcome
    ///
    /// Appends the reply, or [`FALLBACK_MESSAGE`] on any failure, and clears
    /// the pending flag. Outcomes for another session, or arriving when
    /// nothing is pending, are ignored. Returns whether the outcome was
    /// applied.
    pub fn resolve(&mut self, outcome: ExchangeOutcome) -> bool {
        if outcome.session_id != self.id {
            tracing::warn!(
                session_id = %self.id,
                outcome_session = %outcome.session_id,
                "Ignoring exchange outcome for another session"
            );
            return false;
        }
        if !self.pending {
            tracing::warn!(session_id = %self.id, "Ignoring exchange outcome with nothing pending");
            return false;
        }

        match outcome.result {
            Ok(reply) => {
                self.log.push(Message::assistant(reply.response_text));
            }
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "Exchange failed");
                self.log.push(Message::assistant(FALLBACK_MESSAGE));
            }
        }
        self.pending = false;
        true
    }

    /// Send a message and wait for the reply
    ///
    /// Grows the log by exactly two messages (user + reply or fallback), or
    /// by none if the input is rejected. Failures never escape.
    pub async fn send_message(&mut self, raw: &str) -> SendOutcome {
        let ticket = match self.begin_send(raw) {
            Ok(ticket) => ticket,
            Err(reason) => return SendOutcome::Rejected(reason),
        };

        let client = Arc::clone(&self.client);
        let outcome = ticket.run(client.as_ref()).await;
        let replied = outcome.result.is_ok();
        self.resolve(outcome);

        if replied {
            SendOutcome::Replied
        } else {
            SendOutcome::Failed
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("id", &self.id)
            .field("figure", &self.figure.name)
            .field("log_len", &self.log.len())
            .field("pending", &self.pending)
            .field("client", &self.client.name())
            .finish()
    }
}
