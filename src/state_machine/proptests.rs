//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::config::Delays;
use crate::script::{Script, BOOK_APPOINTMENT, MAKE_PAYMENT, SHOW_SLOTS};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ChatContext {
    ChatContext::new("prop-session", Delays::default(), Arc::new(Script::reference().unwrap()))
}

/// Whether (step, event) is a row of the transition table that moves the script
fn advances(step: Step, event: &Event, ctx: &ChatContext) -> bool {
    let prompt = ctx.script.prompt(step);
    match (step, event) {
        (Step::BookingIntro | Step::SymptomPrompt, Event::UserText { text }) => {
            text.to_lowercase().contains("headache")
        }
        (Step::Location, Event::UserText { text }) => !text.trim().is_empty(),
        (Step::HeadacheDetails | Step::PainType, Event::UserCheckboxes { .. }) => true,
        (Step::Welcome, Event::UserOption { label }) => label == BOOK_APPOINTMENT,
        (Step::Duration, Event::UserOption { label }) => prompt.options.contains(label),
        (Step::Doctors, Event::UserOption { label }) => label == SHOW_SLOTS,
        (Step::Availability, Event::UserOption { label }) => prompt.booked_slot(label).is_some(),
        (Step::Confirmed, Event::UserOption { label }) => label == MAKE_PAYMENT,
        _ => false,
    }
}

/// Step the state will show once any pending delay has elapsed
fn settled_step(state: &ChatState) -> Option<Step> {
    match state {
        ChatState::NotStarted => None,
        ChatState::Thinking { next, .. } => Some(*next),
        ChatState::Awaiting { step, .. } => Some(*step),
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_step() -> impl Strategy<Value = Step> {
    proptest::sample::select(Step::ALL.to_vec())
}

fn arb_label() -> impl Strategy<Value = String> {
    let script = Script::reference().unwrap();
    let mut known: Vec<String> = Step::ALL
        .iter()
        .flat_map(|s| script.prompt(*s).options.clone())
        .collect();
    known.extend([
        SHOW_SLOTS.to_string(),
        "Booked for FRI 12, 14:15".to_string(),
        "Booked for MON 1, 09:00".to_string(),
        "Book Appointment".to_string(),
    ]);
    prop_oneof![
        proptest::sample::select(known),
        "[a-zA-Z ]{0,20}".prop_map(String::from),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{0,30}".prop_map(String::from),
        "[a-z ]{0,10}".prop_map(|s| format!("{s} HEADACHE {s}")),
    ]
}

fn arb_user_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::UserText { text }),
        arb_label().prop_map(|label| Event::UserOption { label }),
        proptest::collection::vec("[a-zA-Z ]{1,20}".prop_map(String::from), 0..4)
            .prop_map(|selected| Event::UserCheckboxes { selected }),
    ]
}

fn arb_timer_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (0u64..20).prop_map(|turn| Event::ThinkingElapsed { turn }),
        (0u64..20).prop_map(|turn| Event::PaymentApproved { turn }),
        (0u64..20).prop_map(|turn| Event::ResetElapsed { turn }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        8 => arb_user_event(),
        3 => arb_timer_event(),
        1 => Just(Event::Start),
    ]
}

fn arb_thinking_state() -> impl Strategy<Value = ChatState> {
    (arb_step(), arb_step(), 1u64..20).prop_map(|(step, next, turn)| ChatState::Thinking {
        step,
        next,
        advisory: None,
        turn,
    })
}

fn arb_advancing_input() -> impl Strategy<Value = (Step, Event)> {
    let script = Script::reference().unwrap();
    let durations = script.prompt(Step::Duration).options.clone();
    let slots = script
        .prompt(Step::Availability)
        .availability
        .clone()
        .map(|a| a.slots)
        .unwrap_or_default();
    let symptoms = proptest::collection::vec("[a-zA-Z ]{1,20}".prop_map(String::from), 0..4);

    prop_oneof![
        (
            proptest::sample::select(vec![Step::BookingIntro, Step::SymptomPrompt]),
            "[a-z ]{0,10}".prop_map(|s| format!("{s}headache{s}")),
        )
            .prop_map(|(step, text)| (step, Event::UserText { text })),
        "[a-zA-Z]{1,20}".prop_map(|text| (Step::Location, Event::UserText { text })),
        (
            proptest::sample::select(vec![Step::HeadacheDetails, Step::PainType]),
            symptoms,
        )
            .prop_map(|(step, selected)| (step, Event::UserCheckboxes { selected })),
        Just((Step::Welcome, Event::option(BOOK_APPOINTMENT))),
        proptest::sample::select(durations).prop_map(|label| (Step::Duration, Event::UserOption { label })),
        Just((Step::Doctors, Event::option(SHOW_SLOTS))),
        proptest::sample::select(slots)
            .prop_map(|slot| (Step::Availability, Event::option(format!("Booked for {slot}")))),
        Just((Step::Confirmed, Event::option(MAKE_PAYMENT))),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Input outside the transition table never moves the script
    // (symptom steps loop back to the intro instead)
    #[test]
    fn prop_unrecognized_input_holds_step(step in arb_step(), event in arb_user_event()) {
        let ctx = test_context();
        prop_assume!(!advances(step, &event, &ctx));

        let state = ChatState::Awaiting { step, turn: 1 };
        let result = transition(&state, &ctx, event.clone()).unwrap();
        let settled = settled_step(&result.new_state);

        let symptom_text = step.is_symptom_entry()
            && matches!(&event, Event::UserText { text } if !text.trim().is_empty());
        if symptom_text {
            prop_assert_eq!(settled, Some(Step::BookingIntro));
        } else {
            prop_assert_eq!(settled, Some(step));
        }
    }

    // Input in the table always moves the script forward
    #[test]
    fn prop_recognized_input_advances((step, event) in arb_advancing_input()) {
        let ctx = test_context();
        prop_assert!(advances(step, &event, &ctx));

        let state = ChatState::Awaiting { step, turn: 1 };
        let result = transition(&state, &ctx, event).unwrap();
        let next = settled_step(&result.new_state).unwrap();
        prop_assert!(next.index() > step.index(), "{:?} did not advance past {:?}", next, step);
    }

    // A pending delay rejects every user input
    #[test]
    fn prop_thinking_rejects_input(state in arb_thinking_state(), event in arb_user_event()) {
        let result = transition(&state, &test_context(), event);
        prop_assert!(matches!(result, Err(TransitionError::Busy)));
    }

    // Every thinking state schedules exactly one matching wake-up
    #[test]
    fn prop_thinking_always_scheduled(events in proptest::collection::vec(arb_event(), 0..30)) {
        let ctx = test_context();
        let mut state = ChatState::NotStarted;

        for event in events {
            let Ok(result) = transition(&state, &ctx, event) else { continue };
            if let ChatState::Thinking { turn, .. } = result.new_state {
                if result.new_state != state {
                    let wakeups = result
                        .effects
                        .iter()
                        .filter(|e| matches!(e, Effect::Schedule { event: Event::ThinkingElapsed { turn: t }, .. } if *t == turn))
                        .count();
                    prop_assert_eq!(wakeups, 1);
                }
            }
            prop_assert!(result.new_state.turn() >= state.turn(), "turn went backwards");
            state = result.new_state;
        }
    }

    // Symptom text without "headache" produces exactly one advisory on arrival
    #[test]
    fn prop_unsupported_symptom_single_advisory(text in "[b-z ]{1,30}") {
        prop_assume!(!text.trim().is_empty());
        let ctx = test_context();
        let state = ChatState::Awaiting { step: Step::BookingIntro, turn: 1 };

        let thinking = transition(&state, &ctx, Event::UserText { text }).unwrap().new_state;
        let arrived = transition(&thinking, &ctx, Event::ThinkingElapsed { turn: thinking.turn() }).unwrap();

        let advisories = arrived
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::ShowAdvisory { .. }))
            .count();
        prop_assert_eq!(advisories, 1);
        prop_assert_eq!(arrived.new_state.step(), Some(Step::BookingIntro));
    }
}
