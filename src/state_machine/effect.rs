//! Effects produced by state transitions

use super::{Event, Step};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static notice shown when input does not match the script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Free text at a symptom step did not mention a headache
    UnsupportedSymptom,
    /// Option click with no transition from the current step
    NotImplemented,
    /// Booking button pressed before picking a time slot
    SelectTimeSlot,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Advisory::UnsupportedSymptom => {
                "Sorry, I can only assist with 'headache' symptoms in this demo."
            }
            Advisory::NotImplemented => "This feature is not implemented in this demo.",
            Advisory::SelectTimeSlot => "Please select a time slot.",
        }
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show the user's input back in the transcript
    EchoUser { text: String },

    /// Show a static advisory message
    ShowAdvisory { advisory: Advisory },

    /// Hand the step's prompt descriptor to the renderer
    RenderPrompt { step: Step },

    /// Tell the renderer the state changed (typing indicator, input enablement)
    NotifyStateChange,

    /// Deliver `event` back to the engine after `delay`
    Schedule { delay: Duration, event: Event },

    /// Append checkbox selections to the collected symptoms
    RecordSymptoms { symptoms: Vec<String> },

    RecordLocation { city: String },

    RecordSlot { slot: String },

    /// Forget everything collected this cycle
    ClearIntake,

    /// Issue an appointment id and show the booking confirmation
    ConfirmBooking,
}

impl Effect {
    pub fn schedule(delay: Duration, event: Event) -> Self {
        Effect::Schedule { delay, event }
    }

    pub fn advisory(advisory: Advisory) -> Self {
        Effect::ShowAdvisory { advisory }
    }

    pub fn echo(text: impl Into<String>) -> Self {
        Effect::EchoUser { text: text.into() }
    }
}
