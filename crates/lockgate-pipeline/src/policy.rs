//! Authorization policy for resolved credentials.
//!
//! This module implements the per-attempt state machine that decides whether
//! a resolved credential may open its locker:
//!
//! ```text
//! Idle → Resolved(LOW)  → Authorized
//! Idle → Resolved(HIGH) → AwaitingConfirmation → Authorized
//!                                              → Denied(reason)
//! Authorized | Denied → Idle  (next attempt)
//! ```
//!
//! HIGH credentials suspend the pipeline on the confirmation channel until
//! the operator answers, the channel closes, or the optional timeout expires.

use crate::error::PipelineResult;
use lockgate_core::constants::{CONFIRM_KEYWORD, CONFIRM_PROMPT};
use lockgate_core::{Credential, Error, SecurityLevel};
use lockgate_hardware::ConfirmationChannel;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Maximum number of transitions kept for inspection.
const MAX_HISTORY_SIZE: usize = 64;

/// Why a HIGH credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// Operator typed something other than the confirmation keyword.
    Mismatch,

    /// No answer before the configured timeout.
    Timeout,

    /// Confirmation channel closed (EOF) before an answer arrived.
    ChannelClosed,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DenialReason::Mismatch => "confirmation mismatch",
            DenialReason::Timeout => "confirmation timeout",
            DenialReason::ChannelClosed => "confirmation channel closed",
        };
        f.write_str(reason)
    }
}

/// Per-attempt authorization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyState {
    Idle,

    /// Credential found, tier known.
    Resolved(SecurityLevel),

    /// Waiting on the operator.
    AwaitingConfirmation,

    Authorized,

    Denied(DenialReason),
}

impl fmt::Display for PolicyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyState::Idle => f.write_str("Idle"),
            PolicyState::Resolved(level) => write!(f, "Resolved({level})"),
            PolicyState::AwaitingConfirmation => f.write_str("AwaitingConfirmation"),
            PolicyState::Authorized => f.write_str("Authorized"),
            PolicyState::Denied(reason) => write!(f, "Denied({reason})"),
        }
    }
}

impl PolicyState {
    /// Check if transition to `target` is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockgate_core::SecurityLevel;
    /// use lockgate_pipeline::PolicyState;
    ///
    /// let resolved_high = PolicyState::Resolved(SecurityLevel::High);
    /// assert!(PolicyState::Idle.can_transition_to(&resolved_high));
    /// assert!(resolved_high.can_transition_to(&PolicyState::AwaitingConfirmation));
    /// assert!(!resolved_high.can_transition_to(&PolicyState::Authorized));
    /// ```
    pub fn can_transition_to(&self, target: &PolicyState) -> bool {
        matches!(
            (self, target),
            (PolicyState::Idle, PolicyState::Resolved(_))
                | (PolicyState::Resolved(SecurityLevel::Low), PolicyState::Authorized)
                | (
                    PolicyState::Resolved(SecurityLevel::High),
                    PolicyState::AwaitingConfirmation
                )
                | (
                    PolicyState::AwaitingConfirmation,
                    PolicyState::Authorized | PolicyState::Denied(_)
                )
                | (PolicyState::Authorized, PolicyState::Idle)
                | (PolicyState::Denied(_), PolicyState::Idle)
        )
    }

    /// Returns `true` once an attempt has been decided.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PolicyState::Authorized | PolicyState::Denied(_))
    }
}

/// One recorded policy transition.
#[derive(Debug, Clone)]
pub struct PolicyTransition {
    pub from: PolicyState,
    pub to: PolicyState,
    pub timestamp: Instant,
}

impl PolicyTransition {
    fn new(from: PolicyState, to: PolicyState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Outcome of [`SecurityPolicy::authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Authorized,
    Denied(DenialReason),
}

impl PolicyDecision {
    pub fn is_authorized(self) -> bool {
        self == PolicyDecision::Authorized
    }
}

/// Returns `true` if `input` is the confirmation keyword.
///
/// Surrounding whitespace is ignored and the comparison is case-insensitive.
///
/// ```
/// use lockgate_pipeline::policy::is_confirmation;
///
/// assert!(is_confirmation("confirm"));
/// assert!(is_confirmation("  Confirm\n"));
/// assert!(!is_confirmation("yes"));
/// ```
pub fn is_confirmation(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(CONFIRM_KEYWORD)
}

/// Tier-based authorization with operator confirmation for HIGH credentials.
///
/// The policy is not thread-safe; the scan pipeline owns it and runs one
/// attempt at a time.
#[derive(Debug)]
pub struct SecurityPolicy {
    state: PolicyState,
    history: VecDeque<PolicyTransition>,
    confirmation_timeout: Option<Duration>,
}

impl SecurityPolicy {
    /// Create a policy. `None` waits for the operator indefinitely.
    pub fn new(confirmation_timeout: Option<Duration>) -> Self {
        Self {
            state: PolicyState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            confirmation_timeout,
        }
    }

    pub fn state(&self) -> PolicyState {
        self.state
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> &VecDeque<PolicyTransition> {
        &self.history
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if `to` is not reachable from
    /// the current state. The state is left unchanged.
    pub fn transition_to(&mut self, to: PolicyState) -> lockgate_core::Result<PolicyTransition> {
        if !self.state.can_transition_to(&to) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }

        let transition = PolicyTransition::new(self.state, to);
        self.state = to;
        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }

    /// Decide whether `credential` may be dispatched.
    ///
    /// LOW credentials are authorized immediately without touching the
    /// channel. HIGH credentials prompt on `channel` and are authorized only
    /// if the answer is the confirmation keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the confirmation channel fails.
    pub async fn authorize<C: ConfirmationChannel>(
        &mut self,
        credential: &Credential,
        channel: &mut C,
    ) -> PipelineResult<PolicyDecision> {
        if self.state.is_terminal() {
            self.transition_to(PolicyState::Idle)?;
        }

        let level = credential.security_level;
        self.transition_to(PolicyState::Resolved(level))?;

        if !level.requires_confirmation() {
            self.transition_to(PolicyState::Authorized)?;
            return Ok(PolicyDecision::Authorized);
        }

        self.transition_to(PolicyState::AwaitingConfirmation)?;
        info!(
            owner = %credential.owner_name,
            locker_num = credential.locker_num,
            "High security: waiting for operator confirmation"
        );

        let request = channel.request_confirmation(CONFIRM_PROMPT);
        let answer = match self.confirmation_timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(answer) => answer?,
                Err(_) => return self.deny(DenialReason::Timeout),
            },
            None => request.await?,
        };

        match answer {
            Some(input) if is_confirmation(&input) => {
                self.transition_to(PolicyState::Authorized)?;
                Ok(PolicyDecision::Authorized)
            }
            Some(_) => self.deny(DenialReason::Mismatch),
            None => self.deny(DenialReason::ChannelClosed),
        }
    }

    fn deny(&mut self, reason: DenialReason) -> PipelineResult<PolicyDecision> {
        self.transition_to(PolicyState::Denied(reason))?;
        warn!(%reason, "Operator confirmation failed, access denied");
        Ok(PolicyDecision::Denied(reason))
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockgate_hardware::mock::MockConfirmation;
    use rstest::rstest;

    fn low() -> Credential {
        Credential::new("ABC123", "Alice", 1, SecurityLevel::Low)
    }

    fn high() -> Credential {
        Credential::new("XYZ999", "Bob", 2, SecurityLevel::High)
    }

    #[rstest]
    #[case("CONFIRM", true)]
    #[case("confirm", true)]
    #[case("CoNfIrM", true)]
    #[case("  confirm  ", true)]
    #[case("confirm\n", true)]
    #[case("yes", false)]
    #[case("", false)]
    #[case("CONFIRMED", false)]
    #[case("con firm", false)]
    fn test_is_confirmation(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_confirmation(input), expected);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut policy = SecurityPolicy::default();

        let result = policy.transition_to(PolicyState::Authorized);
        assert!(matches!(result, Err(Error::InvalidStateTransition { .. })));
        assert_eq!(policy.state(), PolicyState::Idle);
        assert!(policy.history().is_empty());
    }

    #[test]
    fn test_low_cannot_await_confirmation() {
        let state = PolicyState::Resolved(SecurityLevel::Low);
        assert!(!state.can_transition_to(&PolicyState::AwaitingConfirmation));
        assert!(!state.can_transition_to(&PolicyState::Denied(DenialReason::Mismatch)));
    }

    #[tokio::test]
    async fn test_low_authorized_without_prompt() {
        let (mut channel, mut handle) = MockConfirmation::new();
        let mut policy = SecurityPolicy::default();

        let decision = policy.authorize(&low(), &mut channel).await.unwrap();

        assert_eq!(decision, PolicyDecision::Authorized);
        assert_eq!(handle.prompt_count(), 0);
        let states: Vec<_> = policy.history().iter().map(|t| t.to).collect();
        assert_eq!(
            states,
            vec![
                PolicyState::Resolved(SecurityLevel::Low),
                PolicyState::Authorized
            ]
        );
    }

    #[tokio::test]
    async fn test_high_authorized_on_keyword() {
        let (mut channel, mut handle) = MockConfirmation::new();
        let mut policy = SecurityPolicy::default();

        handle.respond("confirm").await.unwrap();
        let decision = policy.authorize(&high(), &mut channel).await.unwrap();

        assert_eq!(decision, PolicyDecision::Authorized);
        assert_eq!(handle.prompt_count(), 1);
        assert_eq!(policy.history().len(), 3);
    }

    #[tokio::test]
    async fn test_high_denied_on_other_input() {
        let (mut channel, handle) = MockConfirmation::new();
        let mut policy = SecurityPolicy::default();

        handle.respond("yes").await.unwrap();
        let decision = policy.authorize(&high(), &mut channel).await.unwrap();

        assert_eq!(decision, PolicyDecision::Denied(DenialReason::Mismatch));
        assert_eq!(
            policy.state(),
            PolicyState::Denied(DenialReason::Mismatch)
        );
    }

    #[tokio::test]
    async fn test_high_denied_when_channel_closes() {
        let (mut channel, handle) = MockConfirmation::new();
        drop(handle);
        let mut policy = SecurityPolicy::default();

        let decision = policy.authorize(&high(), &mut channel).await.unwrap();
        assert_eq!(decision, PolicyDecision::Denied(DenialReason::ChannelClosed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_high_denied_on_timeout() {
        let (mut channel, _handle) = MockConfirmation::new();
        let mut policy = SecurityPolicy::new(Some(Duration::from_secs(30)));

        let decision = policy.authorize(&high(), &mut channel).await.unwrap();
        assert_eq!(decision, PolicyDecision::Denied(DenialReason::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_timestamps_follow_runtime_clock() {
        let (mut channel, _handle) = MockConfirmation::new();
        let mut policy = SecurityPolicy::new(Some(Duration::from_secs(30)));
        let start = Instant::now();

        policy.authorize(&high(), &mut channel).await.unwrap();

        let stamp = |state: PolicyState| {
            policy
                .history()
                .iter()
                .find(|t| t.to == state)
                .map(|t| t.timestamp)
                .unwrap()
        };
        let asked = stamp(PolicyState::AwaitingConfirmation);
        let denied = stamp(PolicyState::Denied(DenialReason::Timeout));

        assert_eq!(asked, start);
        let waited = denied - asked;
        assert!(waited >= Duration::from_secs(30));
        assert!(waited < Duration::from_secs(31));
    }

    #[tokio::test]
    async fn test_consecutive_attempts_return_through_idle() {
        let (mut channel, handle) = MockConfirmation::new();
        let mut policy = SecurityPolicy::default();

        handle.respond("nope").await.unwrap();
        policy.authorize(&high(), &mut channel).await.unwrap();
        policy.authorize(&low(), &mut channel).await.unwrap();

        let states: Vec<_> = policy.history().iter().map(|t| t.to).collect();
        assert_eq!(
            states,
            vec![
                PolicyState::Resolved(SecurityLevel::High),
                PolicyState::AwaitingConfirmation,
                PolicyState::Denied(DenialReason::Mismatch),
                PolicyState::Idle,
                PolicyState::Resolved(SecurityLevel::Low),
                PolicyState::Authorized,
            ]
        );
    }
}
