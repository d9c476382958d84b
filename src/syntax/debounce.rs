//! Debounce scheduling for tokenize requests.
//!
//! The first request after a quiet period goes out at once. Requests that
//! arrive while the previous dispatch is still within the delay are
//! coalesced into a single pending request, due one delay after the latest
//! edit. Every dispatched request carries a new id and only the response
//! to the latest id is accepted.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::Language;
use super::cache::CacheStats;
use super::token::LineToken;
use crate::clock::Clock;

/// Default debounce delay in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 75;

/// Maximum debounce delay in milliseconds.
pub const MAX_DEBOUNCE_MS: u64 = 2000;

/// A request to tokenize a full document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeRequest {
    pub id: u64,
    pub content: String,
    pub language: Language,
}

/// The answer to a [`TokenizeRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeResponse {
    /// Id of the request this answers.
    pub id: u64,
    pub tokens: Vec<LineToken>,
    pub stats: CacheStats,
}

#[derive(Debug, Clone)]
struct Pending {
    content: String,
    language: Language,
    due: Instant,
}

/// Debounces tokenize requests against an injected clock.
///
/// Nothing here arms a timer: the host calls [`TokenizeScheduler::poll`]
/// whenever it wakes up and gets back a request once one is due.
pub struct TokenizeScheduler {
    delay: Duration,
    clock: Arc<dyn Clock>,
    /// Id of the most recently dispatched request.
    latest_id: u64,
    last_dispatch: Option<Instant>,
    pending: Option<Pending>,
}

impl fmt::Debug for TokenizeScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizeScheduler")
            .field("delay", &self.delay)
            .field("latest_id", &self.latest_id)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl TokenizeScheduler {
    /// Creates a scheduler. The delay is clamped to `MAX_DEBOUNCE_MS`.
    #[must_use]
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            delay: delay.min(Duration::from_millis(MAX_DEBOUNCE_MS)),
            clock,
            latest_id: 0,
            last_dispatch: None,
            pending: None,
        }
    }

    /// Records an edit. Returns a request when it can be dispatched now.
    pub fn request(
        &mut self,
        content: impl Into<String>,
        language: Language,
    ) -> Option<TokenizeRequest> {
        let now = self.clock.now();
        let content = content.into();

        let quiet = self
            .last_dispatch
            .is_none_or(|at| now.saturating_duration_since(at) >= self.delay);
        if self.pending.is_none() && quiet {
            return Some(self.dispatch(content, language, now));
        }

        self.pending = Some(Pending {
            content,
            language,
            due: now + self.delay,
        });
        None
    }

    /// Returns the pending request once it is due.
    pub fn poll(&mut self) -> Option<TokenizeRequest> {
        let now = self.clock.now();
        if self.pending.as_ref()?.due > now {
            return None;
        }
        let pending = self.pending.take()?;
        Some(self.dispatch(pending.content, pending.language, now))
    }

    /// Drops any pending request and dispatches immediately.
    pub fn force(&mut self, content: impl Into<String>, language: Language) -> TokenizeRequest {
        self.pending = None;
        let now = self.clock.now();
        self.dispatch(content.into(), language, now)
    }

    /// Drops the pending request and invalidates any in-flight one.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.latest_id += 1;
    }

    /// Passes a response through only if it answers the latest request.
    pub fn accept(&self, response: TokenizeResponse) -> Option<TokenizeResponse> {
        if self.is_current(response.id) {
            Some(response)
        } else {
            trace!(id = response.id, latest = self.latest_id, "stale tokenize response");
            None
        }
    }

    #[must_use]
    pub const fn is_current(&self, id: u64) -> bool {
        id == self.latest_id
    }

    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending request becomes due.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Returns the id of the latest dispatched request.
    #[must_use]
    pub const fn current_id(&self) -> u64 {
        self.latest_id
    }

    /// Returns the debounce delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    fn dispatch(&mut self, content: String, language: Language, now: Instant) -> TokenizeRequest {
        self.latest_id += 1;
        self.last_dispatch = Some(now);
        TokenizeRequest {
            id: self.latest_id,
            content,
            language,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn scheduler() -> (Arc<ManualClock>, TokenizeScheduler) {
        let clock = Arc::new(ManualClock::new());
        let scheduler = TokenizeScheduler::new(Duration::from_millis(100), clock.clone());
        (clock, scheduler)
    }

    fn response(id: u64) -> TokenizeResponse {
        TokenizeResponse {
            id,
            tokens: Vec::new(),
            stats: CacheStats {
                cached_lines: 0,
                language: Language::PlainText,
                retokenized_lines: 0,
            },
        }
    }

    #[test]
    fn test_first_request_is_immediate() {
        let (_clock, mut scheduler) = scheduler();
        let request = scheduler.request("a", Language::Json).unwrap();
        assert_eq!(request.id, 1);
        assert_eq!(request.language, Language::Json);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_burst_is_coalesced() {
        let (clock, mut scheduler) = scheduler();
        scheduler.request("a", Language::Json).unwrap();

        clock.advance_ms(10);
        assert!(scheduler.request("ab", Language::Json).is_none());
        clock.advance_ms(10);
        assert!(scheduler.request("abc", Language::Json).is_none());

        // Due one delay after the latest edit.
        clock.advance_ms(99);
        assert!(scheduler.poll().is_none());
        clock.advance_ms(1);
        let request = scheduler.poll().unwrap();
        assert_eq!(request.content, "abc");
        assert_eq!(request.id, 2);
        assert!(scheduler.poll().is_none());
    }

    #[test]
    fn test_request_after_quiet_period_is_immediate() {
        let (clock, mut scheduler) = scheduler();
        scheduler.request("a", Language::Json).unwrap();
        clock.advance_ms(100);
        assert_eq!(scheduler.request("b", Language::Json).unwrap().id, 2);
    }

    #[test]
    fn test_force_drops_pending() {
        let (clock, mut scheduler) = scheduler();
        scheduler.request("a", Language::Css).unwrap();
        clock.advance_ms(5);
        scheduler.request("ab", Language::Css);
        assert!(scheduler.has_pending());

        let forced = scheduler.force("abc", Language::Css);
        assert_eq!(forced.id, 2);
        assert!(!scheduler.has_pending());
        clock.advance_ms(500);
        assert!(scheduler.poll().is_none());
    }

    #[test]
    fn test_only_latest_response_is_accepted() {
        let (clock, mut scheduler) = scheduler();
        let first = scheduler.request("a", Language::Html).unwrap();
        let second = scheduler.force("b", Language::Html);
        clock.advance_ms(1);

        assert!(scheduler.accept(response(first.id)).is_none());
        assert_eq!(scheduler.accept(response(second.id)), Some(response(second.id)));
    }

    #[test]
    fn test_cancel_invalidates_in_flight() {
        let (_clock, mut scheduler) = scheduler();
        let request = scheduler.request("a", Language::Html).unwrap();
        scheduler.cancel();
        assert!(!scheduler.is_current(request.id));
        assert!(scheduler.accept(response(request.id)).is_none());
    }

    #[test]
    fn test_delay_is_clamped() {
        let clock = Arc::new(ManualClock::new());
        let scheduler = TokenizeScheduler::new(Duration::from_secs(60), clock);
        assert_eq!(scheduler.delay(), Duration::from_millis(MAX_DEBOUNCE_MS));
    }
}
