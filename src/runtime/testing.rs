//! Mock implementations for testing
//!
//! These mocks let the engine run synchronously on virtual time.

use super::message::{ChatMessage, Sender};
use super::traits::{Clock, Renderer, Timer};
use super::ConversationEngine;
use crate::script::PromptDescriptor;
use crate::state_machine::{ChatState, Event, Step};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Recording Renderer
// ============================================================================

/// Something the engine handed to the renderer
#[derive(Debug, Clone)]
pub enum Rendered {
    Prompt(PromptDescriptor),
    Message(ChatMessage),
    State(ChatState),
}

/// Renderer that records everything it is asked to show
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<Vec<Rendered>>>,
}

#[allow(dead_code)]
impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<Rendered> {
        self.log.lock().unwrap().clone()
    }

    /// Steps of every rendered prompt, in order
    pub fn prompts(&self) -> Vec<Step> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Rendered::Prompt(p) => Some(p.step),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Rendered::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn bot_messages(&self) -> Vec<ChatMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.sender == Sender::Bot)
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, prompt: &PromptDescriptor) {
        self.log
            .lock()
            .unwrap()
            .push(Rendered::Prompt(prompt.clone()));
    }

    fn message(&self, message: &ChatMessage) {
        self.log
            .lock()
            .unwrap()
            .push(Rendered::Message(message.clone()));
    }

    fn state_changed(&self, state: &ChatState) {
        self.log.lock().unwrap().push(Rendered::State(state.clone()));
    }
}

// ============================================================================
// Manual Timer (virtual time)
// ============================================================================

#[derive(Default)]
struct TimerQueue {
    now: Duration,
    seq: u64,
    pending: Vec<(Duration, u64, Event)>,
}

/// Timer that only fires when the test asks it to
#[derive(Clone, Default)]
pub struct ManualTimer {
    queue: Arc<Mutex<TimerQueue>>,
}

#[allow(dead_code)]
impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance virtual time to the earliest pending event and return it
    pub fn pop_due(&self) -> Option<Event> {
        let mut queue = self.queue.lock().unwrap();
        let index = queue
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, (due, seq, _))| (*due, *seq))
            .map(|(i, _)| i)?;
        let (due, _, event) = queue.pending.remove(index);
        queue.now = due;
        Some(event)
    }

    pub fn pending(&self) -> Vec<Event> {
        let queue = self.queue.lock().unwrap();
        queue.pending.iter().map(|(_, _, e)| e.clone()).collect()
    }

    /// Virtual time elapsed so far
    pub fn now(&self) -> Duration {
        self.queue.lock().unwrap().now
    }
}

impl Timer for ManualTimer {
    fn after(&self, delay: Duration, event: Event) {
        let mut queue = self.queue.lock().unwrap();
        let due = queue.now + delay;
        let seq = queue.seq;
        queue.seq += 1;
        queue.pending.push((due, seq, event));
    }
}

// ============================================================================
// Fixed Clock
// ============================================================================

/// Clock that only moves when told to
#[derive(Clone)]
pub struct FixedClock {
    millis: Arc<Mutex<i64>>,
}

#[allow(dead_code)]
impl FixedClock {
    pub fn at(millis: i64) -> Self {
        Self {
            millis: Arc::new(Mutex::new(millis)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.millis.lock().unwrap() += i64::try_from(by.as_millis()).unwrap();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(*self.millis.lock().unwrap()).unwrap()
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub type TestEngine = ConversationEngine<RecordingRenderer, ManualTimer, FixedClock>;

/// Fire pending timers in due order until none remain
pub fn run_until_idle(engine: &mut TestEngine, timer: &ManualTimer) {
    while let Some(event) = timer.pop_due() {
        engine
            .handle(event)
            .expect("timer events are never rejected");
    }
}

/// Fire pending timers until the engine is waiting for input again
pub fn settle(engine: &mut TestEngine, timer: &ManualTimer) {
    while engine.state().is_thinking() {
        let Some(event) = timer.pop_due() else { break };
        engine
            .handle(event)
            .expect("timer events are never rejected");
    }
}
