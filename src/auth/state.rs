/// Session state definitions for the login flow
///
/// Transitions are monotonic: a session only moves forward through the
/// flow, and `Authenticated`/`Failed` are terminal.
use std::fmt;

/// Represents where a portal session is in the login flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No login attempted yet
    Anonymous,

    /// Email/password submitted, outcome unknown
    CredentialsSubmitted,

    /// OTP submitted, awaiting validation
    OtpPending,

    /// No OTP input present; waiting for out-of-band push approval
    PushPending,

    // ===== Terminal states =====
    /// The authenticated-area marker was observed
    Authenticated,

    /// Login failed; the whole run aborts
    Failed,
}

impl SessionState {
    /// Returns true for states that permit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Anonymous => 0,
            Self::CredentialsSubmitted => 1,
            Self::OtpPending => 2,
            Self::PushPending => 2,
            Self::Authenticated => 3,
            Self::Failed => 3,
        }
    }

    /// Advances to `next` if that is a forward move; regressions and moves
    /// out of a terminal state are ignored.
    pub fn advance(&mut self, next: SessionState) {
        if self.is_terminal() {
            return;
        }
        if next.rank() >= self.rank() {
            *self = next;
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Anonymous => "anonymous",
            Self::CredentialsSubmitted => "credentials-submitted",
            Self::OtpPending => "otp-pending",
            Self::PushPending => "push-pending",
            Self::Authenticated => "authenticated",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
