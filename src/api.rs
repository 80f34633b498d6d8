//! HTTP API for the booking assistant
//!
//! The browser client is the production renderer: prompts and messages reach
//! it over SSE, user input comes back through small JSON POST endpoints.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::config::Delays;
use crate::runtime::SessionManager;
use crate::script::Script;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(delays: Delays, session_idle: Duration, script: Arc<Script>) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(delays, session_idle, script)),
        }
    }
}
