//! The booking script: one prompt descriptor per conversation step

use crate::state_machine::Step;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Option that starts the booking flow from the welcome prompt
pub const BOOK_APPOINTMENT: &str = "I want to book appointment";
/// Action on a doctor card
pub const SHOW_SLOTS: &str = "Show available slots";
/// Prefix of the option sent when a time slot is booked
pub const BOOKED_FOR_PREFIX: &str = "Booked for ";
/// Booking button pressed without a selected time slot
pub const BOOK_WITHOUT_SLOT: &str = "Book Appointment";
pub const MAKE_PAYMENT: &str = "Make Payment";
/// The only symptom the demo understands
pub const SUPPORTED_SYMPTOM: &str = "headache";

/// A doctor card shown alongside a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,
    pub speciality: String,
    pub experience: String,
    pub timings: String,
    pub languages: String,
}

/// Time slots offered for one doctor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub doctor: String,
    pub slots: Vec<String>,
}

/// Everything a renderer needs to display one bot turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub step: Step,
    /// Display text; may embed simple markup
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkboxes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doctors: Vec<Doctor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub accepts_text: bool,
}

impl PromptDescriptor {
    fn new(step: Step, text: impl Into<String>) -> Self {
        Self {
            step,
            text: text.into(),
            options: vec![],
            checkboxes: vec![],
            doctors: vec![],
            availability: None,
            accepts_text: false,
        }
    }

    fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(ToString::to_string).collect();
        self
    }

    fn with_checkboxes(mut self, checkboxes: &[&str]) -> Self {
        self.checkboxes = checkboxes.iter().map(ToString::to_string).collect();
        self
    }

    fn with_text_input(mut self) -> Self {
        self.accepts_text = true;
        self
    }

    /// Whether `label` is something this prompt lets the user click
    pub fn offers(&self, label: &str) -> bool {
        if self.options.iter().any(|o| o == label) {
            return true;
        }
        if !self.doctors.is_empty() && label == SHOW_SLOTS {
            return true;
        }
        self.booked_slot(label).is_some()
    }

    /// The offered slot named by a "Booked for ..." label, if any
    pub fn booked_slot<'a>(&self, label: &'a str) -> Option<&'a str> {
        let slot = label.strip_prefix(BOOKED_FOR_PREFIX)?;
        self.availability
            .as_ref()
            .filter(|a| a.slots.iter().any(|s| s == slot))
            .map(|_| slot)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("No prompt for step {0:?}")]
    MissingPrompt(Step),
    #[error("More than one prompt for step {0:?}")]
    Duplicate(Step),
}

/// Prompt table keyed by step
#[derive(Debug, Clone)]
pub struct Script {
    prompts: BTreeMap<Step, PromptDescriptor>,
}

impl Script {
    /// Build a script, requiring exactly one prompt per step
    pub fn new(prompts: impl IntoIterator<Item = PromptDescriptor>) -> Result<Self, ScriptError> {
        let mut map = BTreeMap::new();
        for prompt in prompts {
            let step = prompt.step;
            if map.insert(step, prompt).is_some() {
                return Err(ScriptError::Duplicate(step));
            }
        }
        if let Some(missing) = Step::ALL.iter().find(|s| !map.contains_key(s)) {
            return Err(ScriptError::MissingPrompt(*missing));
        }
        Ok(Self { prompts: map })
    }

    pub fn prompt(&self, step: Step) -> &PromptDescriptor {
        // Construction guarantees every step is present
        &self.prompts[&step]
    }

    /// The doctor the demo books with
    pub fn featured_doctor(&self) -> Option<&Doctor> {
        self.prompt(Step::Doctors).doctors.first()
    }

    /// The Medanta headache booking script
    #[allow(clippy::too_many_lines)]
    pub fn reference() -> Result<Self, ScriptError> {
        let doctor = Doctor {
            name: "Dr. Neelesh Kapoor".to_string(),
            speciality: "Internal Medicine".to_string(),
            experience: "38 years".to_string(),
            timings: "Mon-Sat, 10:00 AM - 4:00 PM".to_string(),
            languages: "English, Hindi".to_string(),
        };

        let prompts = vec![
            PromptDescriptor::new(
                Step::Welcome,
                "Hi, I'm Medanta Assist, your personal support for all medical needs. How can I help you?",
            )
            .with_options(&[
                "Help me find a doctor",
                BOOK_APPOINTMENT,
                "I have an emergency",
            ]),
            PromptDescriptor::new(
                Step::BookingIntro,
                "Hello! I'm Medanta Assist your healthcare appointment assistant. I can help you:<br>\
                 <ul><li>Book a follow-up appointment with your doctor</li>\
                 <li>Find a specialist for your symptoms</li>\
                 <li>Schedule a new consultation</li></ul><br>\
                 To get started, could you let me know:<br>\
                 Are you looking to book with a specific doctor you've seen before? \
                 Or do you need help finding the right specialist for your symptoms?",
            )
            .with_text_input(),
            PromptDescriptor::new(
                Step::SymptomPrompt,
                "I'll help you find the right specialist for your symptoms. \
                 Let me understand your symptoms better. Please describe your symptoms.",
            )
            .with_text_input(),
            PromptDescriptor::new(
                Step::HeadacheDetails,
                "I see you mentioned headache. To help me understand better, \
                 please select any of the following that apply:",
            )
            .with_checkboxes(&[
                "Sudden, severe headache",
                "Headache with fever",
                "Headache with vision changes or blurred vision",
                "Headache with nausea or vomiting",
                "Headache with neck stiffness",
                "Headache with dizziness",
                "None of the above",
            ]),
            PromptDescriptor::new(
                Step::Duration,
                "I understand you're experiencing headache with nausea/vomiting and dizziness. \
                 Let me gather a bit more information. How long has this been going on?",
            )
            .with_options(&[
                "Started suddenly today",
                "Been going on for a few days",
                "Recurring for weeks/months",
                "Chronic condition I've had for years",
            ]),
            PromptDescriptor::new(
                Step::PainType,
                "Thank you for the information. One more question to help me find the right \
                 specialist: What does the pain feel like?",
            )
            .with_checkboxes(&[
                "Throbbing/pulsating pain",
                "Constant dull ache",
                "Sharp/stabbing pain",
                "Pressure-like sensation",
                "None of the above",
            ]),
            PromptDescriptor::new(
                Step::Location,
                "Based on your symptoms, I can help you find the right specialist. \
                 If you have any medical records or previous reports, feel free to upload them. \
                 It's completely okay if you don't have any.<br><br>\
                 Now, which city are you located in?",
            )
            .with_text_input(),
            PromptDescriptor {
                doctors: vec![doctor.clone()],
                ..PromptDescriptor::new(
                    Step::Doctors,
                    "Great! Let me find neurologists in your city. I found several specialists \
                     who can help with your symptoms. Here are some excellent options:",
                )
            },
            PromptDescriptor {
                availability: Some(Availability {
                    doctor: doctor.name.clone(),
                    slots: vec![
                        "FRI 12, 14:15".to_string(),
                        "FRI 12, 14:45".to_string(),
                        "SAT 13, 10:30".to_string(),
                    ],
                }),
                ..PromptDescriptor::new(
                    Step::Availability,
                    format!(
                        "Great choice! Let me check {}'s availability for you. \
                         Let me show you the appointment options:",
                        doctor.name
                    ),
                )
            },
            PromptDescriptor::new(Step::Confirmed, "Appointment confirmed!")
                .with_options(&[MAKE_PAYMENT]),
            PromptDescriptor::new(Step::Payment, "Redirecting to payment..."),
        ];

        Self::new(prompts)
    }
}
