//! Pure state transition function

use super::{Advisory, ChatContext, ChatState, Effect, Event, Step};
use crate::script::{BOOK_APPOINTMENT, BOOK_WITHOUT_SLOT, MAKE_PAYMENT, SHOW_SLOTS, SUPPORTED_SYMPTOM};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// Keep the current state, no effects yet
    pub fn unchanged(state: &ChatState) -> Self {
        Self::new(state.clone())
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Assistant is still typing, wait for the next prompt")]
    Busy,
    #[error("Conversation has not started")]
    NotStarted,
}

/// Pure transition function
///
/// Given the same inputs, it always produces the same outputs, with no I/O.
/// Unrecognized input is never an error: it yields an advisory effect and the
/// state holds (or loops back for the symptom steps).
pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Session start / restart
        // ============================================================
        (_, Event::Start) => {
            let turn = state.turn() + 1;
            Ok(TransitionResult::new(ChatState::Thinking {
                step: Step::Welcome,
                next: Step::Welcome,
                advisory: None,
                turn,
            })
            .with_effect(Effect::ClearIntake)
            .with_effect(Effect::NotifyStateChange)
            .with_effect(Effect::schedule(
                context.delays.start,
                Event::ThinkingElapsed { turn },
            )))
        }

        // ============================================================
        // Input outside an awaiting state
        // ============================================================
        (ChatState::NotStarted, event) if event.is_user_input() => Err(TransitionError::NotStarted),
        (ChatState::Thinking { .. }, event) if event.is_user_input() => Err(TransitionError::Busy),

        // ============================================================
        // Thinking delay elapsed -> show the next prompt
        // ============================================================
        (
            ChatState::Thinking {
                next,
                advisory,
                turn,
                ..
            },
            Event::ThinkingElapsed { turn: fired },
        ) if *turn == fired => Ok(arrive(*next, *advisory, *turn, context)),

        // ============================================================
        // User input
        // ============================================================
        (ChatState::Awaiting { step, .. }, event) if step.is_terminal() && event.is_user_input() => {
            Ok(on_payment_input(state, event))
        }
        (ChatState::Awaiting { step, turn }, Event::UserText { text }) => {
            Ok(on_text(state, *step, *turn, &text, context))
        }
        (ChatState::Awaiting { step, turn }, Event::UserOption { label }) => {
            Ok(on_option(state, *step, *turn, &label, context))
        }
        (ChatState::Awaiting { step, turn }, Event::UserCheckboxes { selected }) => {
            Ok(on_checkboxes(*step, *turn, selected, context))
        }

        // ============================================================
        // Booking completion
        // ============================================================
        // Approval and reset carry the turn of the booking they belong to
        (
            ChatState::Awaiting {
                step: Step::Payment,
                turn,
            },
            Event::PaymentApproved { turn: fired },
        ) if *turn == fired => {
            let turn = turn + 1;
            Ok(TransitionResult::new(ChatState::Awaiting {
                step: Step::Payment,
                turn,
            })
            .with_effect(Effect::ConfirmBooking)
            .with_effect(Effect::schedule(
                context.delays.reset,
                Event::ResetElapsed { turn },
            )))
        }

        (
            ChatState::Awaiting {
                step: Step::Payment,
                turn,
            },
            Event::ResetElapsed { turn: fired },
        ) if *turn == fired => Ok(TransitionResult::new(ChatState::Awaiting {
            step: Step::Welcome,
            turn: turn + 1,
        })
        .with_effect(Effect::ClearIntake)
        .with_effect(Effect::RenderPrompt {
            step: Step::Welcome,
        })
        .with_effect(Effect::NotifyStateChange)),

        // ============================================================
        // Stale timer events
        // ============================================================
        (state, _) => Ok(TransitionResult::unchanged(state)),
    }
}

/// Enter `Thinking` after accepting input at `step`
fn think(
    step: Step,
    turn: u64,
    next: Step,
    advisory: Option<Advisory>,
    prelude: Vec<Effect>,
    context: &ChatContext,
) -> TransitionResult {
    let turn = turn + 1;
    TransitionResult::new(ChatState::Thinking {
        step,
        next,
        advisory,
        turn,
    })
    .with_effects(prelude)
    .with_effect(Effect::NotifyStateChange)
    .with_effect(Effect::schedule(
        context.delays.thinking,
        Event::ThinkingElapsed { turn },
    ))
}

fn arrive(
    next: Step,
    advisory: Option<Advisory>,
    turn: u64,
    context: &ChatContext,
) -> TransitionResult {
    let mut result = TransitionResult::new(ChatState::Awaiting { step: next, turn })
        .with_effects(advisory.map(Effect::advisory))
        .with_effect(Effect::RenderPrompt { step: next })
        .with_effect(Effect::NotifyStateChange);

    // Payment is approved automatically; the approval is tied to this turn
    if next.is_terminal() {
        result = result.with_effect(Effect::schedule(
            context.delays.confirmation,
            Event::PaymentApproved { turn },
        ));
    }
    result
}

/// Input while payment is in flight never moves the turn, so the pending
/// approval and reset stay valid
fn on_payment_input(state: &ChatState, event: Event) -> TransitionResult {
    match event {
        Event::UserOption { label } => TransitionResult::unchanged(state)
            .with_effect(Effect::echo(label))
            .with_effect(Effect::advisory(Advisory::NotImplemented)),
        Event::UserCheckboxes { selected } => TransitionResult::unchanged(state)
            .with_effect(Effect::echo(selected.join(", ")))
            .with_effect(Effect::RecordSymptoms { symptoms: selected }),
        _ => TransitionResult::unchanged(state),
    }
}

fn on_text(
    state: &ChatState,
    step: Step,
    turn: u64,
    text: &str,
    context: &ChatContext,
) -> TransitionResult {
    let text = text.trim();
    if text.is_empty() {
        return TransitionResult::unchanged(state);
    }

    if step.is_symptom_entry() {
        let prelude = vec![Effect::echo(text)];
        return if text.to_lowercase().contains(SUPPORTED_SYMPTOM) {
            think(step, turn, Step::HeadacheDetails, None, prelude, context)
        } else {
            think(
                step,
                turn,
                Step::BookingIntro,
                Some(Advisory::UnsupportedSymptom),
                prelude,
                context,
            )
        };
    }

    if step == Step::Location {
        let prelude = vec![
            Effect::echo(text),
            Effect::RecordLocation {
                city: text.to_string(),
            },
        ];
        return think(step, turn, Step::Doctors, None, prelude, context);
    }

    // Text input is disabled everywhere else
    TransitionResult::unchanged(state)
}

fn on_option(
    state: &ChatState,
    step: Step,
    turn: u64,
    label: &str,
    context: &ChatContext,
) -> TransitionResult {
    let prompt = context.script.prompt(step);

    if step == Step::Availability && label == BOOK_WITHOUT_SLOT {
        return TransitionResult::unchanged(state)
            .with_effect(Effect::advisory(Advisory::SelectTimeSlot));
    }

    let offered = prompt.offers(label);
    let accepted = match step {
        Step::Welcome if offered && label == BOOK_APPOINTMENT => Some((Step::BookingIntro, None)),
        Step::Duration if offered => Some((Step::PainType, None)),
        Step::Doctors if offered && label == SHOW_SLOTS => Some((Step::Availability, None)),
        Step::Availability => prompt.booked_slot(label).map(|slot| {
            (
                Step::Confirmed,
                Some(Effect::RecordSlot {
                    slot: slot.to_string(),
                }),
            )
        }),
        Step::Confirmed if offered && label == MAKE_PAYMENT => Some((Step::Payment, None)),
        _ => None,
    };

    let mut prelude = vec![Effect::echo(label)];
    match accepted {
        Some((next, record)) => {
            prelude.extend(record);
            think(step, turn, next, None, prelude, context)
        }
        None => think(
            step,
            turn,
            step,
            Some(Advisory::NotImplemented),
            prelude,
            context,
        ),
    }
}

fn on_checkboxes(
    step: Step,
    turn: u64,
    selected: Vec<String>,
    context: &ChatContext,
) -> TransitionResult {
    let prelude = vec![
        Effect::echo(selected.join(", ")),
        Effect::RecordSymptoms { symptoms: selected },
    ];

    let next = match step {
        Step::HeadacheDetails => Step::Duration,
        Step::PainType => Step::Location,
        // Selections are still kept; the prompt is shown again
        other => other,
    };
    think(step, turn, next, None, prelude, context)
}
