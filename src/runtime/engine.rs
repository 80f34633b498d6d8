//! Conversation engine: applies transitions and executes their effects

use super::message::{ChatMessage, Confirmation, SessionSnapshot};
use super::traits::{Clock, Renderer, Timer};
use crate::state_machine::{
    transition, ChatContext, ChatState, Effect, Event, Intake, Step, TransitionError,
};

const APPOINTMENT_PREFIX: &str = "MDT";
const APPOINTMENT_MINUTES: u32 = 30;
const CONSULTATION_FEE: &str = "₹1,200";
const HOSPITAL: &str = "Medanta Hospital";
const DEFAULT_CITY: &str = "Gurgaon";

/// One booking conversation, generic over its renderer, timer and clock
pub struct ConversationEngine<R, T, C>
where
    R: Renderer,
    T: Timer,
    C: Clock,
{
    context: ChatContext,
    state: ChatState,
    intake: Intake,
    renderer: R,
    timer: T,
    clock: C,
    /// Millisecond stamp of the last issued appointment id
    last_appointment_ms: Option<i64>,
}

impl<R, T, C> ConversationEngine<R, T, C>
where
    R: Renderer,
    T: Timer,
    C: Clock,
{
    pub fn new(context: ChatContext, renderer: R, timer: T, clock: C) -> Self {
        Self {
            context,
            state: ChatState::NotStarted,
            intake: Intake::default(),
            renderer,
            timer,
            clock,
            last_appointment_ms: None,
        }
    }

    /// Begin at the welcome prompt (after the start delay); restarts a running session
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.handle(Event::Start)
    }

    pub fn submit_text(&mut self, value: impl Into<String>) -> Result<(), TransitionError> {
        self.handle(Event::text(value))
    }

    pub fn submit_option(&mut self, label: impl Into<String>) -> Result<(), TransitionError> {
        self.handle(Event::option(label))
    }

    pub fn submit_checkboxes(&mut self, selected: Vec<String>) -> Result<(), TransitionError> {
        self.handle(Event::UserCheckboxes { selected })
    }

    /// Apply one event: pure transition, then its effects in order.
    /// Timer callbacks come back through here; user input goes through `submit_*`
    pub fn handle(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(
                    session_id = %self.context.session_id,
                    state = ?self.state,
                    error = %e,
                    "Input rejected"
                );
                return Err(e);
            }
        };

        if result.new_state != self.state {
            tracing::debug!(
                session_id = %self.context.session_id,
                from = ?self.state,
                to = ?result.new_state,
                "State transition"
            );
        }
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::EchoUser { text } => {
                self.renderer.message(&ChatMessage::user(text, self.clock.now()));
            }
            Effect::ShowAdvisory { advisory } => {
                tracing::debug!(session_id = %self.context.session_id, ?advisory, "Advisory");
                self.renderer
                    .message(&ChatMessage::advisory(advisory, self.clock.now()));
            }
            Effect::RenderPrompt { step } => {
                self.renderer.render(self.context.script.prompt(step));
            }
            Effect::NotifyStateChange => self.renderer.state_changed(&self.state),
            Effect::Schedule { delay, event } => self.timer.after(delay, event),
            Effect::RecordSymptoms { symptoms } => self.intake.symptoms.extend(symptoms),
            Effect::RecordLocation { city } => self.intake.location = Some(city),
            Effect::RecordSlot { slot } => self.intake.slot = Some(slot),
            Effect::ClearIntake => self.intake.clear(),
            Effect::ConfirmBooking => {
                let confirmation = self.build_confirmation();
                tracing::info!(
                    session_id = %self.context.session_id,
                    appointment_id = %confirmation.appointment_id,
                    slot = %confirmation.slot,
                    "Appointment confirmed"
                );
                self.renderer
                    .message(&ChatMessage::confirmation(confirmation, self.clock.now()));
            }
        }
    }

    fn build_confirmation(&mut self) -> Confirmation {
        let appointment_id = self.next_appointment_id();
        let (doctor, speciality) = self
            .context
            .script
            .featured_doctor()
            .map(|d| (d.name.clone(), d.speciality.clone()))
            .unwrap_or_default();
        let city = self.intake.location.as_deref().unwrap_or(DEFAULT_CITY);

        Confirmation {
            appointment_id,
            doctor,
            speciality,
            slot: self.intake.slot.clone().unwrap_or_default(),
            duration_minutes: APPOINTMENT_MINUTES,
            location: format!("{HOSPITAL}, {city}"),
            fee: CONSULTATION_FEE.to_string(),
        }
    }

    /// Time-based id, bumped past the previous one if the clock has not moved
    fn next_appointment_id(&mut self) -> String {
        let now = self.clock.now().timestamp_millis();
        let millis = match self.last_appointment_ms {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_appointment_ms = Some(millis);
        format!("{APPOINTMENT_PREFIX}{millis}")
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    #[allow(dead_code)]
    pub fn step(&self) -> Option<Step> {
        self.state.step()
    }

    /// Symptoms collected this booking cycle, in submission order
    #[allow(dead_code)]
    pub fn symptoms(&self) -> &[String] {
        &self.intake.symptoms
    }

    #[allow(dead_code)] // Inspection utility
    pub fn intake(&self) -> &Intake {
        &self.intake
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let step = self.state.step();
        SessionSnapshot {
            session_id: self.context.session_id.clone(),
            state: self.state.clone(),
            step: step.map(Step::index),
            prompt: step.map(|s| self.context.script.prompt(s).clone()),
            symptoms: self.intake.symptoms.clone(),
        }
    }
}
