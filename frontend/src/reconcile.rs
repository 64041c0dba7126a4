//! Optimistic-update + bounded-reconciliation state machine for comment
//! counts.
//!
//! Submitting a comment only hands it to the automation workflow; the row
//! lands in the tabular store at some later point with no completion
//! signal. This controller bumps the displayed count immediately and then
//! re-polls the summary endpoint until the server catches up to the
//! optimistic value, or gives up and keeps the optimistic value rather
//! than visibly reverting the user's own action.
//!
//! The state machine is deliberately free of browser types: the page
//! drives it with timers, the tests drive it directly.

use std::collections::BTreeMap;

/// Section key -> displayed comment count.
pub type SectionCounts = BTreeMap<String, u32>;

/// Delay before the first poll, giving the workflow a head start.
pub const INITIAL_DELAY_MS: u32 = 1_000;
/// Fixed poll interval. Deliberately not exponential: the whole window is
/// bounded to ~15s, so backoff would only slow confirmation down.
pub const POLL_INTERVAL_MS: u32 = 1_000;
/// Hard attempt ceiling per submission.
pub const MAX_ATTEMPTS: u32 = 15;

/// One submission's polling cycle.
#[derive(Debug)]
pub struct Reconciliation {
    section: String,
    attempt: u32,
    active: bool,
}

/// What the page should do after feeding one poll response in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Not confirmed yet; schedule the next poll.
    Continue,
    /// Server caught up; the whole server map was adopted. Stop.
    Settled,
    /// Attempt budget exhausted; the optimistic value stays. Stop, and do
    /// not surface an error.
    Exhausted,
    /// The cycle was cancelled (product switch or a superseding
    /// submission); the response was ignored.
    Cancelled,
}

impl Reconciliation {
    /// Applies the optimistic bump for `section` and opens a polling cycle.
    /// The bump happens here, before any server confirmation.
    pub fn begin(counts: &mut SectionCounts, section: impl Into<String>) -> Self {
        let section = section.into();
        *counts.entry(section.clone()).or_insert(0) += 1;
        Self {
            section,
            attempt: 0,
            active: true,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Timers cannot be preempted reliably; a fired callback checks this
    /// before doing anything.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Feeds one poll response in. `server` is `None` when the poll itself
    /// failed; a failed poll still consumes an attempt.
    ///
    /// The comparison reads the *currently held* expected count, not the
    /// count captured at submission time, so a second submission arriving
    /// mid-poll raises the bar instead of being confirmed away. Comparing
    /// and adopting inside one `&mut` borrow makes that a single mutation
    /// step; an interleaved optimistic bump can never be lost to a stale
    /// poll result.
    pub fn observe(&mut self, counts: &mut SectionCounts, server: Option<&SectionCounts>) -> PollStep {
        if !self.active {
            return PollStep::Cancelled;
        }
        self.attempt += 1;

        if let Some(server) = server {
            let expected = counts.get(&self.section).copied().unwrap_or(0);
            let actual = server.get(&self.section).copied().unwrap_or(0);
            if actual >= expected {
                // Adopt the entire server map, not just this section: other
                // sections may have moved while we were polling.
                *counts = server.clone();
                self.active = false;
                return PollStep::Settled;
            }
        }

        if self.attempt >= MAX_ATTEMPTS {
            self.active = false;
            PollStep::Exhausted
        } else {
            PollStep::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u32)]) -> SectionCounts {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn begin_bumps_the_section_immediately() {
        let mut held = counts(&[("name", 2)]);
        let rec = Reconciliation::begin(&mut held, "name");
        assert_eq!(held.get("name"), Some(&3));
        assert!(rec.is_active());

        let mut empty = SectionCounts::new();
        Reconciliation::begin(&mut empty, "brand");
        assert_eq!(empty.get("brand"), Some(&1));
    }

    #[test]
    fn converges_when_the_server_catches_up() {
        // expected=3 after the bump; server reports 1, 2, then 3.
        let mut held = counts(&[("name", 2)]);
        let mut rec = Reconciliation::begin(&mut held, "name");

        for server_count in [1, 2] {
            let server = counts(&[("name", server_count)]);
            assert_eq!(rec.observe(&mut held, Some(&server)), PollStep::Continue);
            // Optimistic value stays on display while unconfirmed.
            assert_eq!(held.get("name"), Some(&3));
        }

        let server = counts(&[("name", 3), ("brand", 7)]);
        assert_eq!(rec.observe(&mut held, Some(&server)), PollStep::Settled);
        assert_eq!(rec.attempt(), 3);
        // The whole server map was adopted, not just the polled section.
        assert_eq!(held.get("name"), Some(&3));
        assert_eq!(held.get("brand"), Some(&7));
        assert!(!rec.is_active());
    }

    #[test]
    fn a_server_count_above_expected_also_settles() {
        let mut held = SectionCounts::new();
        let mut rec = Reconciliation::begin(&mut held, "name");
        let server = counts(&[("name", 5)]);
        assert_eq!(rec.observe(&mut held, Some(&server)), PollStep::Settled);
        assert_eq!(held.get("name"), Some(&5));
    }

    #[test]
    fn exhausts_after_the_attempt_budget_and_keeps_the_optimistic_value() {
        let mut held = counts(&[("name", 0)]);
        let mut rec = Reconciliation::begin(&mut held, "name");
        let stale = counts(&[("name", 0)]);

        for _ in 0..(MAX_ATTEMPTS - 1) {
            assert_eq!(rec.observe(&mut held, Some(&stale)), PollStep::Continue);
        }
        assert_eq!(rec.observe(&mut held, Some(&stale)), PollStep::Exhausted);
        assert_eq!(rec.attempt(), MAX_ATTEMPTS);
        // No rollback: the user keeps seeing their own comment counted.
        assert_eq!(held.get("name"), Some(&1));
        assert!(!rec.is_active());
    }

    #[test]
    fn failed_polls_consume_attempts() {
        let mut held = SectionCounts::new();
        let mut rec = Reconciliation::begin(&mut held, "name");
        for _ in 0..(MAX_ATTEMPTS - 1) {
            assert_eq!(rec.observe(&mut held, None), PollStep::Continue);
        }
        assert_eq!(rec.observe(&mut held, None), PollStep::Exhausted);
    }

    #[test]
    fn cancelled_cycles_ignore_late_responses() {
        let mut held = SectionCounts::new();
        let mut rec = Reconciliation::begin(&mut held, "name");
        rec.cancel();

        let server = counts(&[("name", 9)]);
        assert_eq!(rec.observe(&mut held, Some(&server)), PollStep::Cancelled);
        // A late response from a cancelled cycle must not touch the counts.
        assert_eq!(held.get("name"), Some(&1));
    }

    #[test]
    fn a_second_submission_mid_poll_raises_the_expected_count() {
        let mut held = SectionCounts::new();
        let mut rec = Reconciliation::begin(&mut held, "name");
        assert_eq!(held.get("name"), Some(&1));

        // The first cycle is superseded: cancel it, bump again.
        rec.cancel();
        let mut rec2 = Reconciliation::begin(&mut held, "name");
        assert_eq!(held.get("name"), Some(&2));

        // A server snapshot that only covers the first submission is not
        // confirmation for the second.
        let server = counts(&[("name", 1)]);
        assert_eq!(rec2.observe(&mut held, Some(&server)), PollStep::Continue);
        assert_eq!(held.get("name"), Some(&2));

        let server = counts(&[("name", 2)]);
        assert_eq!(rec2.observe(&mut held, Some(&server)), PollStep::Settled);
    }
}
