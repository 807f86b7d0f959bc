//! Suppression of repeated scans.
//!
//! Scanners re-read a QR code held in front of them many times per second.
//! The filter drops a token identical to the previous accepted one while the
//! cooldown window is still open.

use lockgate_core::ScanToken;
use lockgate_core::constants::DEFAULT_COOLDOWN;
use std::time::Duration;
use tokio::time::Instant;

/// Verdict for one decoded token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// Token should be processed.
    Accept,

    /// Same token as last time, still inside the cooldown.
    Reject,
}

impl DebounceDecision {
    pub fn is_accept(self) -> bool {
        self == DebounceDecision::Accept
    }
}

/// Cooldown-based duplicate filter.
///
/// Only the most recent accepted token is remembered. A different token is
/// always accepted and restarts the window, even if it later turns out to
/// be unknown.
///
/// # Examples
///
/// ```
/// use lockgate_core::ScanToken;
/// use lockgate_pipeline::{DebounceDecision, DebounceFilter};
/// use std::time::Duration;
/// use tokio::time::Instant;
///
/// let mut filter = DebounceFilter::new(Duration::from_secs(5));
/// let token = ScanToken::new("ABC123").unwrap();
/// let t0 = Instant::now();
///
/// assert_eq!(filter.check(&token, t0), DebounceDecision::Accept);
/// assert_eq!(filter.check(&token, t0 + Duration::from_secs(2)), DebounceDecision::Reject);
/// assert_eq!(filter.check(&token, t0 + Duration::from_secs(5)), DebounceDecision::Accept);
/// ```
#[derive(Debug, Clone)]
pub struct DebounceFilter {
    cooldown: Duration,
    last: Option<(ScanToken, Instant)>,
}

impl DebounceFilter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Most recently accepted token, if any.
    pub fn last_token(&self) -> Option<&ScanToken> {
        self.last.as_ref().map(|(token, _)| token)
    }

    /// Decide whether `token` observed at `now` should be processed.
    ///
    /// Accepting overwrites the remembered token and timestamp.
    pub fn check(&mut self, token: &ScanToken, now: Instant) -> DebounceDecision {
        if let Some((last_token, last_scan)) = &self.last
            && last_token == token
            && now.saturating_duration_since(*last_scan) < self.cooldown
        {
            return DebounceDecision::Reject;
        }

        self.last = Some((token.clone(), now));
        DebounceDecision::Accept
    }
}

impl Default for DebounceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
