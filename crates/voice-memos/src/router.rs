use tracing::debug;

/// Memo screen.
pub const HOME_ROUTE: &str = "/";
/// Shown after sign-out.
pub const SIGN_IN_ROUTE: &str = "/sign-in";

/// Route stack for the terminal screens.
#[derive(Debug, Clone)]
pub struct Router {
    stack: Vec<String>,
}

impl Router {
    /// Starts on the memo screen.
    pub fn new() -> Self {
        Self {
            stack: vec![HOME_ROUTE.to_string()],
        }
    }

    /// Route on top of the stack.
    pub fn current(&self) -> &str {
        self.stack.last().map_or(HOME_ROUTE, String::as_str)
    }

    /// Replace the current route without growing history.
    pub fn replace(&mut self, route: &str) {
        let from = self.stack.pop();
        debug!(from = ?from, to = route, "Route replaced");
        self.stack.push(route.to_string());
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
