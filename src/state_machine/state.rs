//! Conversation state types

use super::Advisory;
use crate::config::Delays;
use crate::script::Script;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Script Steps
// ============================================================================

/// A point in the booking script
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Welcome,
    BookingIntro,
    SymptomPrompt,
    HeadacheDetails,
    Duration,
    PainType,
    Location,
    Doctors,
    Availability,
    Confirmed,
    Payment,
}

impl Step {
    pub const ALL: [Step; 11] = [
        Step::Welcome,
        Step::BookingIntro,
        Step::SymptomPrompt,
        Step::HeadacheDetails,
        Step::Duration,
        Step::PainType,
        Step::Location,
        Step::Doctors,
        Step::Availability,
        Step::Confirmed,
        Step::Payment,
    ];

    /// Position in the script, 0 for the welcome prompt
    pub fn index(self) -> u8 {
        match self {
            Step::Welcome => 0,
            Step::BookingIntro => 1,
            Step::SymptomPrompt => 2,
            Step::HeadacheDetails => 3,
            Step::Duration => 4,
            Step::PainType => 5,
            Step::Location => 6,
            Step::Doctors => 7,
            Step::Availability => 8,
            Step::Confirmed => 9,
            Step::Payment => 10,
        }
    }

    #[allow(dead_code)] // Lookup utility
    pub fn from_index(index: u8) -> Option<Step> {
        Step::ALL.get(usize::from(index)).copied()
    }

    /// Steps where the user describes symptoms in free text
    pub fn is_symptom_entry(self) -> bool {
        matches!(self, Step::BookingIntro | Step::SymptomPrompt)
    }

    /// Terminal step; the session resets to `Welcome` shortly after reaching it
    pub fn is_terminal(self) -> bool {
        self == Step::Payment
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Conversation state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatState {
    /// Session created, `start()` not yet called
    #[default]
    NotStarted,

    /// Input accepted; the bot is "typing" until the thinking delay fires
    Thinking {
        /// Step whose prompt the user answered
        step: Step,
        /// Step to show once the delay elapses
        next: Step,
        /// Shown right before the next prompt
        advisory: Option<Advisory>,
        turn: u64,
    },

    /// Prompt displayed, waiting for user input
    Awaiting { step: Step, turn: u64 },
}

impl ChatState {
    /// Current script step, if the session has started
    pub fn step(&self) -> Option<Step> {
        match self {
            ChatState::NotStarted => None,
            ChatState::Thinking { step, .. } | ChatState::Awaiting { step, .. } => Some(*step),
        }
    }

    /// Counter bumped on every scheduled delay; stale timer events carry an older value
    pub fn turn(&self) -> u64 {
        match self {
            ChatState::NotStarted => 0,
            ChatState::Thinking { turn, .. } | ChatState::Awaiting { turn, .. } => *turn,
        }
    }

    /// Check if a delayed transition is pending
    pub fn is_thinking(&self) -> bool {
        matches!(self, ChatState::Thinking { .. })
    }
}

// ============================================================================
// Collected Intake
// ============================================================================

/// What the user told the bot during one booking cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intake {
    /// Checkbox selections in submission order; duplicates are kept
    pub symptoms: Vec<String>,
    /// Free-text city, unvalidated
    pub location: Option<String>,
    pub slot: Option<String>,
}

impl Intake {
    pub fn clear(&mut self) {
        *self = Intake::default();
    }
}

// ============================================================================
// Context
// ============================================================================

/// Immutable per-session context
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub session_id: String,
    pub delays: Delays,
    pub script: Arc<Script>,
}

impl ChatContext {
    pub fn new(session_id: impl Into<String>, delays: Delays, script: Arc<Script>) -> Self {
        Self {
            session_id: session_id.into(),
            delays,
            script,
        }
    }
}
