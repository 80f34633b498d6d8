//! Transcript messages and session snapshots handed to renderers

use crate::script::PromptDescriptor;
use crate::state_machine::{Advisory, ChatState};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Bot,
    User,
}

/// How a renderer should colour a message bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// Details of a paid booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub appointment_id: String,
    pub doctor: String,
    pub speciality: String,
    pub slot: String,
    pub duration_minutes: u32,
    pub location: String,
    pub fee: String,
}

/// One line of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub tone: Tone,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            tone: Tone::Info,
            at,
            confirmation: None,
        }
    }

    pub fn advisory(advisory: Advisory, at: DateTime<Utc>) -> Self {
        let tone = match advisory {
            Advisory::UnsupportedSymptom | Advisory::NotImplemented => Tone::Error,
            Advisory::SelectTimeSlot => Tone::Warning,
        };
        Self {
            sender: Sender::Bot,
            text: advisory.message().to_string(),
            tone,
            at,
            confirmation: None,
        }
    }

    pub fn confirmation(confirmation: Confirmation, at: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::Bot,
            text: "Payment approved successfully! Your appointment has been confirmed.".to_string(),
            tone: Tone::Success,
            at,
            confirmation: Some(confirmation),
        }
    }
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: ChatState,
    /// Script index of the current step, 0 to 10
    pub step: Option<u8>,
    pub prompt: Option<PromptDescriptor>,
    pub symptoms: Vec<String>,
}
