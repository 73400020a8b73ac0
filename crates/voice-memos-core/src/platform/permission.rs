use crate::{
    CoreResult,
    platform::{PermissionService, PermissionStatus},
};

use async_trait::async_trait;
use tracing::debug;

/// Permission service with a fixed answer.
///
/// Desktop platforms have no microphone prompt of their own, so the
/// answer comes from configuration. Until the first request the status
/// reads as [`PermissionStatus::Undetermined`].
#[derive(Debug, Clone)]
pub struct StaticPermission {
    answer: PermissionStatus,
    status: PermissionStatus,
}

impl StaticPermission {
    /// Grants every request.
    pub fn granted() -> Self {
        Self::answering(PermissionStatus::Granted)
    }

    /// Denies every request.
    pub fn denied() -> Self {
        Self::answering(PermissionStatus::Denied)
    }

    fn answering(answer: PermissionStatus) -> Self {
        Self {
            answer,
            status: PermissionStatus::Undetermined,
        }
    }
}

#[async_trait(?Send)]
impl PermissionService for StaticPermission {
    async fn status(&mut self) -> CoreResult<PermissionStatus> {
        Ok(self.status)
    }

    async fn request(&mut self) -> CoreResult<PermissionStatus> {
        self.status = self.answer;
        debug!(status = ?self.status, "Permission answered from configuration");
        Ok(self.status)
    }
}
