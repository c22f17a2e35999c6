//! Per-slot request tokens
//!
//! Every in-flight fetch is tagged with the UI slot it will populate. Starting
//! a new fetch on a slot supersedes the previous one, and a response whose
//! token is no longer current is dropped without touching state.

use std::collections::HashMap;

/// UI location a response is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSlot {
    Overview,
    Projects,
    Accounts,
    PmAccounts,
    PmModels,
    AccountModels,
    ProviderModels,
    Chat,
    Github,
    CoderAccounts,
    Workspaces,
    Browser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub slot: RequestSlot,
    pub seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    next: u64,
    current: HashMap<RequestSlot, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for `slot`, superseding whatever was in flight there
    pub fn begin(&mut self, slot: RequestSlot) -> RequestToken {
        self.next += 1;
        self.current.insert(slot, self.next);
        RequestToken {
            slot,
            seq: self.next,
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current.get(&token.slot) == Some(&token.seq)
    }

    /// Accept a response: true (and the slot is cleared) only for the current token
    pub fn complete(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.current.remove(&token.slot);
            true
        } else {
            tracing::debug!("Dropping stale response for {:?} (seq {})", token.slot, token.seq);
            false
        }
    }

    /// Forget the in-flight request on `slot` so its response is ignored
    pub fn cancel(&mut self, slot: RequestSlot) {
        self.current.remove(&slot);
    }

    pub fn in_flight(&self, slot: RequestSlot) -> bool {
        self.current.contains_key(&slot)
    }

    pub fn pending(&self) -> usize {
        self.current.len()
    }

    /// Invalidate everything (sign-out)
    pub fn reset(&mut self) {
        self.current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_token_supersedes() {
        let mut tracker = RequestTracker::new();
        let first = tracker.begin(RequestSlot::PmModels);
        let second = tracker.begin(RequestSlot::PmModels);

        assert!(!tracker.complete(first));
        assert!(tracker.complete(second));
        assert!(!tracker.in_flight(RequestSlot::PmModels));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut tracker = RequestTracker::new();
        let models = tracker.begin(RequestSlot::PmModels);
        let _accounts = tracker.begin(RequestSlot::Accounts);
        assert!(tracker.complete(models));
    }

    #[test]
    fn test_reset_drops_everything() {
        let mut tracker = RequestTracker::new();
        let token = tracker.begin(RequestSlot::Overview);
        tracker.reset();
        assert!(!tracker.complete(token));
    }

    #[test]
    fn test_response_accepted_once() {
        let mut tracker = RequestTracker::new();
        let token = tracker.begin(RequestSlot::Chat);
        assert!(tracker.complete(token));
        assert!(!tracker.complete(token));
    }
}
