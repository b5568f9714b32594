//! View State Machine
//!
//! The top-level mode of the application:
//!
//! ```text
//!            select_entity(id)
//!   Browse ─────────────────────▶ Conversation(SessionController)
//!     ▲                                      │
//!     └──────────────── back ────────────────┘
//! ```
//!
//! Transition methods are the only way to change mode. The browse query
//! lives outside the mode, so it survives a round trip through a
//! conversation.
//!
//! # Exchanges
//!
//! [`ViewStateMachine::send_message`] spawns the exchange on the tokio
//! runtime and returns at once. Every spawned exchange reports back on one
//! channel, tagged with the session that started it. Outcomes are applied by
//! [`ViewStateMachine::poll_exchanges`] (non-blocking, once per frame) or
//! [`ViewStateMachine::settle`] (await the next one). There is no
//! cancellation: leaving a conversation leaves its request running, and when
//! it lands it is dropped as stale instead of touching whatever session is
//! active by then.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::catalog::{Catalog, Figure, FigureId};
use crate::events::Intent;
use crate::exchange::ExchangeClient;
use crate::filter::{CategoryFilter, FilterIndex};
use crate::session::{ExchangeOutcome, SessionController};

/// Capacity of the exchange outcome channel
const OUTCOME_CHANNEL_CAPACITY: usize = 16;

/// Intent not valid in the current mode
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// No figure with this id exists in the catalog
    #[error("no figure with id {0}")]
    UnknownFigure(FigureId),

    /// Figure selection is only possible while browsing
    #[error("cannot select a figure during a conversation")]
    NotBrowsing,

    /// Sending and going back need an active conversation
    #[error("no active conversation")]
    NotInConversation,

    /// Sending was attempted outside a tokio runtime
    #[error("no async runtime to run the exchange on")]
    NoRuntime,
}

/// Current mode
#[derive(Debug)]
pub enum ViewState {
    /// Browsing the catalog
    Browse,
    /// Talking to a figure
    Conversation(SessionController),
}

impl ViewState {
    /// Whether the view is browsing
    #[must_use]
    pub fn is_browse(&self) -> bool {
        matches!(self, Self::Browse)
    }

    /// The active session, if in conversation
    #[must_use]
    pub fn session(&self) -> Option<&SessionController> {
        match self {
            Self::Browse => None,
            Self::Conversation(session) => Some(session),
        }
    }
}

/// Browse / Conversation state machine
pub struct ViewStateMachine {
    /// Catalog and browse query
    index: FilterIndex,
    /// Exchange client shared by every session
    client: Arc<dyn ExchangeClient>,
    /// Current mode
    state: ViewState,
    /// Sender handed to spawned exchanges
    outcome_tx: mpsc::Sender<ExchangeOutcome>,
    /// Outcomes of spawned exchanges
    outcome_rx: mpsc::Receiver<ExchangeOutcome>,
    /// Spawned exchanges whose outcome has not been received yet
    in_flight: usize,
}

impl ViewStateMachine {
    /// Create a state machine in Browse mode
    pub fn new(catalog: Catalog, client: Arc<dyn ExchangeClient>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);

        Self {
            index: FilterIndex::new(catalog),
            client,
            state: ViewState::Browse,
            outcome_tx,
            outcome_rx,
            in_flight: 0,
        }
    }

    /// Current mode
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The active session, if in conversation
    #[must_use]
    pub fn session(&self) -> Option<&SessionController> {
        self.state.session()
    }

    /// The catalog
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.index.catalog()
    }

    /// Categories for the browse tabs, `"All"` first
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.index.catalog().categories()
    }

    /// Current search text
    #[must_use]
    pub fn query(&self) -> &str {
        self.index.query()
    }

    /// Current category
    #[must_use]
    pub fn category(&self) -> &CategoryFilter {
        self.index.category()
    }

    /// Figures matching the current browse query
    #[must_use]
    pub fn results(&self) -> Vec<&Figure> {
        self.index.results()
    }

    /// Whether any spawned exchange has yet to report back
    #[must_use]
    pub fn has_in_flight(&self) -> bool {
        self.in_flight > 0
    }

    /// Dispatch an intent
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if the intent is not valid in the
    /// current mode.
    pub fn handle_intent(&mut self, intent: Intent) -> Result<(), TransitionError> {
        tracing::debug!(intent = intent.name(), "Handling intent");

        match intent {
            Intent::SetSearchQuery(text) => {
                self.set_search_query(text);
                Ok(())
            }
            Intent::SetCategory(name) => {
                self.set_category(&name);
                Ok(())
            }
            Intent::SelectEntity(id) => self.select_entity(id),
            Intent::SendMessage(text) => self.send_message(&text).map(|_| ()),
            Intent::Back => self.back(),
        }
    }

    /// Replace the browse search text
    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.index.set_query(text);
    }

    /// Replace the browse category
    pub fn set_category(&mut self, name: &str) {
        self.index.set_category(name);
    }

    /// Browse → Conversation with the figure `id`
    ///
    /// # Errors
    ///
    /// Fails if already in a conversation or the id is unknown.
    pub fn select_entity(&mut self, id: FigureId) -> Result<(), TransitionError> {
        if !self.state.is_browse() {
            return Err(TransitionError::NotBrowsing);
        }

        let figure = self
            .index
            .catalog()
            .get(id)
            .cloned()
            .ok_or(TransitionError::UnknownFigure(id))?;

        let session = SessionController::start(figure, Arc::clone(&self.client));
        self.state = ViewState::Conversation(session);
        Ok(())
    }

    /// Send a message in the active conversation
    ///
    /// Returns `Ok(true)` if an exchange was spawned and `Ok(false)` if the
    /// input was blank or an exchange is already pending.
    ///
    /// # Errors
    ///
    /// Fails if not in a conversation, or with [`TransitionError::NoRuntime`]
    /// outside a tokio runtime. Neither failure touches the session.
    pub fn send_message(&mut self, text: &str) -> Result<bool, TransitionError> {
        let ViewState::Conversation(session) = &mut self.state else {
            return Err(TransitionError::NotInConversation);
        };
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| TransitionError::NoRuntime)?;

        let ticket = match session.begin_send(text) {
            Ok(ticket) => ticket,
            Err(reason) => {
                tracing::debug!(reason = ?reason, "Send not started");
                return Ok(false);
            }
        };

        let client = Arc::clone(&self.client);
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;

        runtime.spawn(async move {
            let outcome = ticket.run(client.as_ref()).await;
            if tx.send(outcome).await.is_err() {
                tracing::debug!("View dropped before exchange resolved");
            }
        });

        Ok(true)
    }

    /// Conversation → Browse, discarding the session
    ///
    /// A pending exchange keeps running; its outcome will be ignored.
    ///
    /// # Errors
    ///
    /// Fails if not in a conversation.
    pub fn back(&mut self) -> Result<(), TransitionError> {
        match std::mem::replace(&mut self.state, ViewState::Browse) {
            ViewState::Conversation(session) => {
                tracing::info!(
                    session_id = %session.id(),
                    pending = session.is_pending(),
                    messages = session.log().len(),
                    "Session discarded"
                );
                Ok(())
            }
            ViewState::Browse => Err(TransitionError::NotInConversation),
        }
    }

    /// Apply every exchange outcome that has already arrived
    ///
    /// Call this regularly (e.g. once per frame). Returns how many outcomes
    /// were applied to the active session; stale ones are dropped.
    pub fn poll_exchanges(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if self.route(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next exchange outcome and apply it
    ///
    /// Returns immediately with `false` if nothing is in flight. Otherwise
    /// returns whether the outcome was applied to the active session.
    pub async fn settle(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.outcome_rx.recv().await {
            Some(outcome) => self.route(outcome),
            None => false,
        }
    }

    fn route(&mut self, outcome: ExchangeOutcome) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        match &mut self.state {
            ViewState::Conversation(session) if session.id() == outcome.session_id => {
                session.resolve(outcome)
            }
            _ => {
                tracing::warn!(
                    session_id = %outcome.session_id,
                    ok = outcome.result.is_ok(),
                    "Dropping stale exchange outcome"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for ViewStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewStateMachine")
            .field("state", &self.state)
            .field("query", &self.index.query())
            .field("category", &self.index.category())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}
