//! Runtime for executing chat sessions
//!
//! Each session owns one `ConversationEngine` running in its own task, fed by
//! an mpsc channel that carries both user input and timer callbacks.

mod engine;
mod message;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use engine::ConversationEngine;
use message::ChatMessage;
pub use message::SessionSnapshot;
use traits::{BroadcastRenderer, SystemClock, TokioTimer};

use crate::config::Delays;
use crate::script::{PromptDescriptor, Script};
use crate::state_machine::{ChatContext, ChatState, Event, TransitionError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Type alias for production engine with concrete implementations
pub type ProductionEngine = ConversationEngine<BroadcastRenderer, TokioTimer, SystemClock>;

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Init { snapshot: SessionSnapshot },
    Prompt { prompt: PromptDescriptor },
    Message { message: ChatMessage },
    StateChange { state: ChatState },
    Error { message: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session closed: {0}")]
    Closed(String),
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<ChatEvent>,
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
    cancel: CancellationToken,
}

type SessionMap = Arc<RwLock<HashMap<String, SessionHandle>>>;

/// Manager for all chat sessions
pub struct SessionManager {
    delays: Delays,
    idle_timeout: Duration,
    script: Arc<Script>,
    sessions: SessionMap,
}

impl SessionManager {
    pub fn new(delays: Delays, idle_timeout: Duration, script: Arc<Script>) -> Self {
        Self {
            delays,
            idle_timeout,
            script,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a session and start its script; returns the session id
    pub async fn create_session(&self) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let context = ChatContext::new(&session_id, self.delays, Arc::clone(&self.script));

        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);

        let engine: ProductionEngine = ConversationEngine::new(
            context,
            BroadcastRenderer::new(broadcast_tx.clone()),
            TokioTimer::new(event_tx.clone()),
            SystemClock,
        );
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let cancel = CancellationToken::new();

        // Register before spawning so an idle expiry always finds the entry
        self.sessions.write().await.insert(
            session_id.clone(),
            SessionHandle {
                event_tx,
                broadcast_tx: broadcast_tx.clone(),
                snapshot_rx,
                cancel: cancel.clone(),
            },
        );

        tokio::spawn(run_session(
            engine,
            SessionChannels {
                event_rx,
                broadcast_tx,
                snapshot_tx,
            },
            cancel,
            self.idle_timeout,
            Arc::clone(&self.sessions),
        ));

        session_id
    }

    async fn handle(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Queue an event for a session
    pub async fn send_event(&self, session_id: &str, event: Event) -> Result<(), SessionError> {
        let handle = self.handle(session_id).await?;
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|_| SessionError::Closed(session_id.to_string()))
    }

    /// Subscribe to session updates; the snapshot is taken after subscribing
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<ChatEvent>), SessionError> {
        let handle = self.handle(session_id).await?;
        let rx = handle.broadcast_tx.subscribe();
        let snapshot = handle.snapshot_rx.borrow().clone();
        Ok((snapshot, rx))
    }

    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        let handle = self.handle(session_id).await?;
        let snapshot = handle.snapshot_rx.borrow().clone();
        Ok(snapshot)
    }

    /// Stop a session's task and forget it
    pub async fn close(&self, session_id: &str) -> Result<(), SessionError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        handle.cancel.cancel();
        tracing::info!(session_id = %session_id, "Session closed");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

struct SessionChannels {
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<ChatEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

/// Route an event to the engine operation it stands for
fn apply(engine: &mut ProductionEngine, event: Event) -> Result<(), TransitionError> {
    match event {
        Event::Start => engine.start(),
        Event::UserText { text } => engine.submit_text(text),
        Event::UserOption { label } => engine.submit_option(label),
        Event::UserCheckboxes { selected } => engine.submit_checkboxes(selected),
        timer => engine.handle(timer),
    }
}

async fn run_session(
    mut engine: ProductionEngine,
    channels: SessionChannels,
    cancel: CancellationToken,
    idle_timeout: Duration,
    sessions: SessionMap,
) {
    let SessionChannels {
        mut event_rx,
        broadcast_tx,
        snapshot_tx,
    } = channels;
    let session_id = engine.context().session_id.clone();
    tracing::info!(session_id = %session_id, "Starting chat session");

    if let Err(e) = engine.start() {
        tracing::error!(session_id = %session_id, error = %e, "Failed to start session");
    }
    snapshot_tx.send_replace(engine.snapshot());

    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    // Process events in a loop until the session is closed or goes idle
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            () = &mut idle => {
                sessions.write().await.remove(&session_id);
                cancel.cancel();
                tracing::info!(session_id = %session_id, "Session expired after inactivity");
                break;
            }
            Some(event) = event_rx.recv() => {
                if event.is_user_input() || event == Event::Start {
                    idle.as_mut().reset(Instant::now() + idle_timeout);
                }
                if let Err(e) = apply(&mut engine, event) {
                    // Transition errors are user-facing (e.g., "still typing")
                    let _ = broadcast_tx.send(ChatEvent::Error {
                        message: e.to_string(),
                    });
                }
                snapshot_tx.send_replace(engine.snapshot());
            }
            else => break,
        }
    }

    tracing::info!(session_id = %session_id, "Chat session stopped");
}
