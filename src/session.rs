use chrono::{DateTime, Utc};
use itertools::Itertools;
use std::collections::HashMap;

use crate::clock::{Epoch, SessionClock, TickKind};
use crate::metrics::{Metrics, MetricsEngine, PerformanceSample, TestResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// What a change of input amounted to
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    /// finished session, or nothing typed yet
    Ignored,
    Updated(Metrics),
    Finished(TestResult),
}

/// Per-character press counts for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPressTally {
    counts: HashMap<char, u32>,
}

impl KeyPressTally {
    pub fn record(&mut self, c: char) {
        *self.counts.entry(c).or_insert(0) += 1;
    }

    pub fn count(&self, c: char) -> u32 {
        self.counts.get(&c).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn max(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Most pressed keys first; ties ordered by character
    pub fn top(&self, n: usize) -> Vec<(char, u32)> {
        self.counts
            .iter()
            .map(|(c, count)| (*c, *count))
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
            .take(n)
            .collect()
    }
}

/// One typing test: the reference passage, what has been typed so far, its
/// clock and the derived metrics. Replaced wholesale on a new-test request.
#[derive(Debug)]
pub struct Session {
    reference: String,
    reference_chars: Vec<char>,
    input: Vec<char>,
    phase: Phase,
    clock: SessionClock,
    engine: MetricsEngine,
    tally: KeyPressTally,
    result: Option<TestResult>,
}

impl Session {
    pub fn new(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        Self {
            reference_chars: reference.chars().collect(),
            reference,
            input: Vec::new(),
            phase: Phase::Idle,
            clock: SessionClock::new(),
            engine: MetricsEngine::new(),
            tally: KeyPressTally::default(),
            result: None,
        }
    }

    /// Install a new reference text and reset every figure to its initial value
    pub fn on_text_generated(&mut self, reference: impl Into<String>) {
        *self = Self::new(reference);
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn reference_len(&self) -> usize {
        self.reference_chars.len()
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.reference_chars.get(idx).copied()
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn input_string(&self) -> String {
        self.input.iter().collect()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn epoch(&self) -> Option<Epoch> {
        self.clock.epoch()
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.elapsed_seconds()
    }

    pub fn metrics(&self) -> Metrics {
        self.engine.metrics()
    }

    pub fn samples(&self) -> &[PerformanceSample] {
        self.engine.samples()
    }

    pub fn tally(&self) -> &KeyPressTally {
        &self.tally
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// Share of the reference typed so far, 0..=100
    pub fn progress(&self) -> u32 {
        if self.reference_chars.is_empty() {
            return 0;
        }
        (self.input.len() as f64 / self.reference_chars.len() as f64 * 100.0).round() as u32
    }

    /// Feed the full current input. Excess input beyond the reference is truncated.
    pub fn on_input_changed(&mut self, input: &str) -> InputOutcome {
        self.on_input_changed_at(input, Utc::now())
    }

    pub fn on_input_changed_at(&mut self, input: &str, now: DateTime<Utc>) -> InputOutcome {
        if self.phase == Phase::Finished {
            return InputOutcome::Ignored;
        }

        let incoming: Vec<char> = input.chars().collect();
        if self.phase == Phase::Idle {
            if incoming.is_empty() {
                return InputOutcome::Ignored;
            }
            self.phase = Phase::Running;
            let epoch = self.clock.start();
            tracing::info!(?epoch, len = self.reference_len(), "session started");
        }

        let within_reference = incoming.len() <= self.reference_chars.len();
        let grew = incoming.len() > self.input.len();
        let mut limited = incoming;
        limited.truncate(self.reference_chars.len());

        if within_reference && grew {
            if let Some(&last) = limited.last() {
                self.tally.record(last);
            }
        }
        self.input = limited;

        if !self.reference_chars.is_empty() && self.input.len() >= self.reference_chars.len() {
            return InputOutcome::Finished(self.complete(now));
        }

        let metrics =
            self.engine
                .on_input_changed(&self.input, &self.reference_chars, self.elapsed_seconds());
        InputOutcome::Updated(metrics)
    }

    /// Append one typed character
    pub fn type_char(&mut self, c: char) -> InputOutcome {
        if self.phase == Phase::Finished {
            return InputOutcome::Ignored;
        }
        let mut next = self.input_string();
        next.push(c);
        self.on_input_changed(&next)
    }

    /// Remove the last typed character
    pub fn backspace(&mut self) -> InputOutcome {
        if self.phase != Phase::Running {
            return InputOutcome::Ignored;
        }
        let mut next = self.input_string();
        next.pop();
        self.on_input_changed(&next)
    }

    /// Apply a clock tick scheduled for `epoch`. Stale ticks and ticks outside
    /// the running phase leave the session untouched.
    pub fn on_tick(&mut self, epoch: Epoch) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        match self.clock.on_tick(epoch) {
            None => {
                tracing::debug!(?epoch, "stale tick ignored");
                false
            }
            Some(TickKind::Clock) => true,
            Some(TickKind::Sample) => {
                self.engine
                    .record_sample(self.input.len(), self.clock.elapsed_seconds());
                true
            }
        }
    }

    /// Finish early with whatever has been typed. Only a running session can be finished.
    pub fn force_finish(&mut self) -> Option<TestResult> {
        self.force_finish_at(Utc::now())
    }

    pub fn force_finish_at(&mut self, now: DateTime<Utc>) -> Option<TestResult> {
        if self.phase != Phase::Running {
            return None;
        }
        Some(self.complete(now))
    }

    fn complete(&mut self, now: DateTime<Utc>) -> TestResult {
        self.clock.stop();
        self.phase = Phase::Finished;
        let result = self.engine.finish(
            &self.input,
            &self.reference_chars,
            self.clock.elapsed_seconds(),
            now,
        );
        tracing::info!(
            wpm = result.wpm,
            accuracy = result.accuracy,
            errors = result.errors,
            time = result.time,
            "session finished"
        );
        self.result = Some(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn run_ticks(session: &mut Session, n: usize) {
        let epoch = session.epoch().unwrap();
        for _ in 0..n {
            session.on_tick(epoch);
        }
    }

    #[test]
    fn test_new_session_is_idle_with_initial_metrics() {
        let session = Session::new("hello world");
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.metrics(), Metrics::default());
        assert_eq!(session.elapsed_seconds(), 0.0);
        assert!(session.input().is_empty());
        assert!(session.tally().is_empty());
        assert!(session.epoch().is_none());
    }

    #[test]
    fn test_first_keystroke_starts_the_clock() {
        let mut session = Session::new("hello");
        assert_matches!(session.on_input_changed(""), InputOutcome::Ignored);
        assert_eq!(session.phase(), Phase::Idle);
        assert_matches!(session.type_char('h'), InputOutcome::Updated(_));
        assert_eq!(session.phase(), Phase::Running);
        assert!(session.epoch().is_some());
    }

    #[test]
    fn test_excess_input_is_truncated() {
        let mut session = Session::new("abc");
        run_ticks_after_start(&mut session);
        let outcome = session.on_input_changed("abcdef");
        assert_matches!(outcome, InputOutcome::Finished(_));
        assert_eq!(session.input_string(), "abc");
    }

    fn run_ticks_after_start(session: &mut Session) {
        session.on_input_changed("a");
        run_ticks(session, 10);
    }

    #[test]
    fn test_reaching_full_length_finishes() {
        let mut session = Session::new("abcdefghij");
        session.type_char('a');
        let epoch = session.epoch().unwrap();
        run_ticks(&mut session, 599);
        let mut last = InputOutcome::Ignored;
        for c in "bcdefghij".chars() {
            last = session.type_char(c);
        }
        assert!(!session.on_tick(epoch));
        let result = match last {
            InputOutcome::Finished(result) => result,
            other => panic!("expected finish, got {other:?}"),
        };
        assert!(session.is_finished());
        assert_eq!(result.time, 59.9);
        assert_eq!(result.accuracy, 100);
        assert_eq!(result.errors, 0);
        // 2 words in just under a minute
        assert_eq!(result.raw_wpm, 2);
        assert_eq!(session.result(), Some(&result));
        // ticks after finishing change nothing
        assert_eq!(session.elapsed_seconds(), 59.9);
    }

    #[test]
    fn test_scenario_one_mismatch_in_a_minute() {
        let mut session = Session::new("abcdefghij");
        session.on_input_changed("a");
        run_ticks(&mut session, 600);
        let outcome = session.on_input_changed("abcdeXghij");
        let result = match outcome {
            InputOutcome::Finished(result) => result,
            other => panic!("expected finish, got {other:?}"),
        };
        assert_eq!(result.time, 60.0);
        assert_eq!(result.errors, 1);
        assert_eq!(result.accuracy, 90);
        assert_eq!(result.raw_wpm, 2);
        assert_eq!(result.net_wpm, 2);
    }

    #[test]
    fn test_force_finish_counts_missing_characters() {
        let mut session = Session::new("abcdefghij");
        session.on_input_changed("aXcYZ");
        run_ticks(&mut session, 50);
        let result = session.force_finish().unwrap();
        assert_eq!(result.errors, 8);
        assert!(session.is_finished());
    }

    #[test]
    fn test_force_finish_requires_running() {
        let mut session = Session::new("abc");
        assert!(session.force_finish().is_none());
        session.on_input_changed("abc");
        assert!(session.force_finish().is_none());
    }

    #[test]
    fn test_input_ignored_once_finished() {
        let mut session = Session::new("ab");
        session.on_input_changed("ab");
        assert_matches!(session.on_input_changed("a"), InputOutcome::Ignored);
        assert_matches!(session.type_char('x'), InputOutcome::Ignored);
        assert_matches!(session.backspace(), InputOutcome::Ignored);
        assert_eq!(session.input_string(), "ab");
    }

    #[test]
    fn test_tally_counts_accepted_characters() {
        let mut session = Session::new("aab");
        session.type_char('a');
        session.type_char('x');
        session.backspace();
        session.type_char('a');
        assert_eq!(session.tally().count('a'), 2);
        assert_eq!(session.tally().count('x'), 1);
        // deleting does not count as a press
        assert_eq!(session.tally().count('b'), 0);
    }

    #[test]
    fn test_tally_ignores_overflowing_paste() {
        let mut session = Session::new("abcd");
        session.on_input_changed("ab");
        session.on_input_changed("abcdef");
        assert_eq!(session.tally().count('d'), 0);
        assert_eq!(session.tally().count('f'), 0);
    }

    #[test]
    fn test_tally_top_orders_by_count() {
        let mut tally = KeyPressTally::default();
        for c in "hello world".chars() {
            tally.record(c);
        }
        let top = tally.top(2);
        assert_eq!(top, vec![('l', 3), ('o', 2)]);
        assert_eq!(tally.max(), 3);
    }

    #[test]
    fn test_sample_ticks_record_samples() {
        let mut session = Session::new("the quick brown fox jumps");
        session.on_input_changed("the quick");
        run_ticks(&mut session, 30);
        let samples = session.samples();
        assert_eq!(samples.len(), 3);
        assert!(samples
            .windows(2)
            .all(|w| w[1].time_seconds - w[0].time_seconds > 0.5));
        // 9 chars -> 2 words over 1 second
        assert_eq!(samples[0], PerformanceSample::new(1.0, 120));
    }

    #[test]
    fn test_stale_ticks_do_not_touch_new_session() {
        let mut session = Session::new("abcdef");
        session.on_input_changed("abc");
        let old_epoch = session.epoch().unwrap();
        run_ticks(&mut session, 15);

        session.on_text_generated("uvwxyz");
        assert!(!session.on_tick(old_epoch));
        assert_eq!(session.elapsed_seconds(), 0.0);

        session.on_input_changed("u");
        assert!(!session.on_tick(old_epoch));
        assert_eq!(session.elapsed_seconds(), 0.0);
        assert_ne!(session.epoch(), Some(old_epoch));
    }

    #[test]
    fn test_on_text_generated_resets_everything() {
        let mut session = Session::new("abcdefghij");
        session.on_input_changed("abx");
        run_ticks(&mut session, 40);
        session.on_input_changed("abxd");
        session.force_finish();

        session.on_text_generated("fresh text");
        assert_eq!(session.reference(), "fresh text");
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(
            session.metrics(),
            Metrics {
                wpm: 0,
                raw_wpm: 0,
                net_wpm: 0,
                accuracy: 100,
                errors: 0,
                consistency: 100,
            }
        );
        assert_eq!(session.elapsed_seconds(), 0.0);
        assert!(session.samples().is_empty());
        assert!(session.tally().is_empty());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_live_accuracy_and_errors() {
        let mut session = Session::new("hello world");
        session.on_input_changed("h");
        run_ticks(&mut session, 60);
        let metrics = match session.on_input_changed("hxllo") {
            InputOutcome::Updated(m) => m,
            other => panic!("expected update, got {other:?}"),
        };
        assert_eq!(metrics.errors, 1);
        assert_eq!(metrics.accuracy, 80);
        // 1 token in 0.1 minutes, minus 10 errors per minute
        assert_eq!(metrics.raw_wpm, 10);
        assert_eq!(metrics.net_wpm, 0);
    }

    #[test]
    fn test_progress() {
        let mut session = Session::new("abcd");
        assert_eq!(session.progress(), 0);
        session.on_input_changed("ab");
        assert_eq!(session.progress(), 50);
    }

    #[test]
    fn test_unicode_reference_counts_scalars() {
        let mut session = Session::new("a—b");
        assert_eq!(session.reference_len(), 3);
        let outcome = session.on_input_changed("a—b");
        assert_matches!(outcome, InputOutcome::Finished(r) if r.errors == 0);
    }
}
