//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the engine with mock implementations.

use super::message::ChatMessage;
use super::ChatEvent;
use crate::script::PromptDescriptor;
use crate::state_machine::{ChatState, Event};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Displays bot turns and the transcript
pub trait Renderer: Send + Sync {
    /// Show a prompt descriptor (text plus its options, checkboxes, cards or slots)
    fn render(&self, prompt: &PromptDescriptor);

    /// Append a message to the transcript
    fn message(&self, message: &ChatMessage);

    /// State changed; renderers use this for the typing indicator
    fn state_changed(&self, _state: &ChatState) {}
}

/// Delivers an event back to the engine after a delay
pub trait Timer: Send + Sync {
    fn after(&self, delay: Duration, event: Event);
}

/// Wall-clock source for timestamps and appointment ids
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

impl<T: Renderer + ?Sized> Renderer for Arc<T> {
    fn render(&self, prompt: &PromptDescriptor) {
        (**self).render(prompt);
    }

    fn message(&self, message: &ChatMessage) {
        (**self).message(message);
    }

    fn state_changed(&self, state: &ChatState) {
        (**self).state_changed(state);
    }
}

impl<T: Timer + ?Sized> Timer for Arc<T> {
    fn after(&self, delay: Duration, event: Event) {
        (**self).after(delay, event);
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Renderer that fans events out to SSE subscribers
#[derive(Clone)]
pub struct BroadcastRenderer {
    tx: broadcast::Sender<ChatEvent>,
}

impl BroadcastRenderer {
    pub fn new(tx: broadcast::Sender<ChatEvent>) -> Self {
        Self { tx }
    }
}

impl Renderer for BroadcastRenderer {
    fn render(&self, prompt: &PromptDescriptor) {
        // No subscribers is fine; the snapshot still carries the prompt
        let _ = self.tx.send(ChatEvent::Prompt {
            prompt: prompt.clone(),
        });
    }

    fn message(&self, message: &ChatMessage) {
        let _ = self.tx.send(ChatEvent::Message {
            message: message.clone(),
        });
    }

    fn state_changed(&self, state: &ChatState) {
        let _ = self.tx.send(ChatEvent::StateChange {
            state: state.clone(),
        });
    }
}

/// Timer backed by tokio sleeps feeding the session's event channel
#[derive(Clone)]
pub struct TokioTimer {
    event_tx: mpsc::Sender<Event>,
}

impl TokioTimer {
    pub fn new(event_tx: mpsc::Sender<Event>) -> Self {
        Self { event_tx }
    }
}

impl Timer for TokioTimer {
    fn after(&self, delay: Duration, event: Event) {
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if event_tx.send(event).await.is_err() {
                tracing::debug!("Session closed before timer fired");
            }
        });
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
