use tracing::info;

/// Signed-in identity for the memo screen.
///
/// Sign-out only clears the identity; nothing reads a result from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    user: Option<String>,
}

impl AuthSession {
    /// Signed in as `user`.
    pub fn signed_in(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    /// Signed in as the OS account running the process.
    pub fn local() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "local".to_string());
        Self::signed_in(user)
    }

    /// Current user, if signed in.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Whether a user is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Forget the current user. Harmless when already signed out.
    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user = %user, "Signed out");
        }
    }
}
