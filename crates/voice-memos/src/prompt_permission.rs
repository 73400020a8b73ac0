use crate::{
    config::PermissionMode,
    input::{SharedInput, next_line},
};

use voice_memos_core::{
    CoreResult,
    platform::{PermissionService, PermissionStatus, StaticPermission},
};

use std::io::Write;

use async_trait::async_trait;
use tracing::{info, instrument};

const PROMPT: &str = "Allow microphone access? [y/N] ";

/// Asks on the terminal the first time recording needs the microphone.
pub struct PromptPermission {
    input: SharedInput,
    status: PermissionStatus,
}

impl PromptPermission {
    /// Prompt on `input`; nothing is asked until the first request.
    pub fn new(input: SharedInput) -> Self {
        Self {
            input,
            status: PermissionStatus::Undetermined,
        }
    }
}

#[async_trait(?Send)]
impl PermissionService for PromptPermission {
    async fn status(&mut self) -> CoreResult<PermissionStatus> {
        Ok(self.status)
    }

    #[instrument(skip(self))]
    async fn request(&mut self) -> CoreResult<PermissionStatus> {
        let mut stdout = std::io::stdout();
        stdout.write_all(PROMPT.as_bytes())?;
        stdout.flush()?;

        let answer = next_line(&self.input).await;
        self.status = parse_answer(answer.as_deref());

        info!(status = ?self.status, "Microphone permission answered");

        Ok(self.status)
    }
}

/// `y`/`yes` grants; anything else, including end of input, denies.
pub fn parse_answer(answer: Option<&str>) -> PermissionStatus {
    match answer.map(|a| a.trim().to_ascii_lowercase()).as_deref() {
        Some("y" | "yes") => PermissionStatus::Granted,
        _ => PermissionStatus::Denied,
    }
}

/// Permission service for the configured mode.
pub fn permission_service(mode: PermissionMode, input: SharedInput) -> Box<dyn PermissionService> {
    match mode {
        PermissionMode::Prompt => Box::new(PromptPermission::new(input)),
        PermissionMode::Granted => Box::new(StaticPermission::granted()),
        PermissionMode::Denied => Box::new(StaticPermission::denied()),
    }
}
