use crate::session::SessionState;

pub const TITLE: &str = "Spotify Auth";
pub const LOGIN_LABEL: &str = "Login with Spotify";

/// Render the single login screen for the given session.
pub fn render(state: &SessionState) -> String {
    let body = match state {
        SessionState::Authenticated { profile, .. } => {
            format!("Welcome, {}", profile.greeting_name())
        }
        SessionState::AuthFailed { reason } => format!("Login failed: {}", reason),
        SessionState::Unauthenticated { .. } if state.prompt_enabled() => {
            format!("[ {} ]", LOGIN_LABEL)
        }
        SessionState::Unauthenticated { .. } => format!("[ {} ] (disabled)", LOGIN_LABEL),
    };
    format!("{}\n\n{}\n", TITLE, body)
}
