//! Events that can occur in a conversation

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin (or restart) the script at the welcome prompt
    Start,

    // User events
    UserText {
        text: String,
    },
    UserOption {
        label: String,
    },
    UserCheckboxes {
        selected: Vec<String>,
    },

    // Timer events
    ThinkingElapsed {
        turn: u64,
    },
    PaymentApproved {
        turn: u64,
    },
    ResetElapsed {
        turn: u64,
    },
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::UserText { text: text.into() }
    }

    pub fn option(label: impl Into<String>) -> Self {
        Event::UserOption {
            label: label.into(),
        }
    }

    pub fn checkboxes<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Event::UserCheckboxes {
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this event originates from the user rather than a timer
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Event::UserText { .. } | Event::UserOption { .. } | Event::UserCheckboxes { .. }
        )
    }
}
