use crate::transform::TransformedError;

/// Where a binding's current request is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing issued, or the descriptor is skipped
    #[default]
    Idle,
    Pending,
    Success,
    Failure,
    /// The server redirected to a login page; retries cannot fix this
    LoginRequired { url: String },
}

/// Observable state of a [`RequestBinding`](super::RequestBinding).
///
/// `response` and `error` never both describe the same completed request.
/// While a new request is pending `response` may still hold the previous
/// payload when the descriptor asks to preserve it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T> {
    pub response: Option<T>,
    pub pending: bool,
    pub error: Option<TransformedError>,
    pub phase: Phase,
    /// Identity of the request this state belongs to
    pub generation: u64,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            response: None,
            pending: false,
            error: None,
            phase: Phase::Idle,
            generation: 0,
        }
    }
}

impl<T> RequestState<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.phase == Phase::Success
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.phase == Phase::Failure
    }

    #[must_use]
    pub const fn is_login_required(&self) -> bool {
        matches!(self.phase, Phase::LoginRequired { .. })
    }

    pub(crate) fn reset_idle(&mut self) {
        self.response = None;
        self.pending = false;
        self.error = None;
        self.phase = Phase::Idle;
    }

    pub(crate) fn begin(&mut self, preserve_response: bool) {
        if !preserve_response {
            self.response = None;
        }
        self.pending = true;
        self.error = None;
        self.phase = Phase::Pending;
    }

    pub(crate) fn succeed(&mut self, response: T) {
        self.response = Some(response);
        self.pending = false;
        self.error = None;
        self.phase = Phase::Success;
    }

    pub(crate) fn fail(&mut self, error: TransformedError) {
        self.response = None;
        self.pending = false;
        self.error = Some(error);
        self.phase = Phase::Failure;
    }

    pub(crate) fn require_login(&mut self, url: String) {
        self.response = None;
        self.pending = false;
        self.error = None;
        self.phase = Phase::LoginRequired { url };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn test_begin_clears_response_unless_preserved() {
        let mut state = RequestState::default();
        state.succeed(1);

        state.begin(true);
        assert!(state.pending);
        assert_eq!(state.response, Some(1));

        state.begin(false);
        assert!(state.pending);
        assert_eq!(state.response, None);
    }

    #[test]
    fn test_response_and_error_are_exclusive() {
        let mut state = RequestState::default();
        state.succeed(1);
        state.fail(TransformedError::network(Method::Get, "/x", "down"));
        assert!(state.response.is_none());
        assert!(state.error.is_some());
        assert!(state.is_failure());

        state.succeed(2);
        assert!(state.error.is_none());
        assert!(state.is_success());
    }

    #[test]
    fn test_login_required_is_terminal_and_empty() {
        let mut state = RequestState::<u8>::default();
        state.begin(false);
        state.require_login("https://go.example/login/".to_string());
        assert!(!state.pending);
        assert!(state.is_login_required());
        assert!(state.response.is_none());
    }
}
