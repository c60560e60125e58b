use super::{AuthOutcome, AuthPrompt, AuthRequest};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

/// Scripted prompt used in tests and for offline runs of the CLI.
/// It records the requests it saw and answers with a fixed outcome.
pub struct MockPrompt {
    outcome: MockOutcome,
    seen: Mutex<Vec<AuthRequest>>,
}

enum MockOutcome {
    /// Echo the request's state back with this code.
    Code(String),
    Fixed(AuthOutcome),
}

impl MockPrompt {
    pub fn approve(code: &str) -> Self {
        Self::build(MockOutcome::Code(code.to_string()))
    }

    pub fn respond(outcome: AuthOutcome) -> Self {
        Self::build(MockOutcome::Fixed(outcome))
    }

    fn build(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<AuthRequest> {
        self.seen.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuthPrompt for MockPrompt {
    async fn prompt(&self, request: &AuthRequest) -> Result<AuthOutcome> {
        info!("MockPrompt: prompt {}", request.url);
        if let Ok(mut g) = self.seen.lock() {
            g.push(request.clone());
        }
        Ok(match &self.outcome {
            MockOutcome::Code(code) => AuthOutcome::Success {
                code: code.clone(),
                state: Some(request.state.clone()),
            },
            MockOutcome::Fixed(outcome) => outcome.clone(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
