//! Pattern match engine.
//!
//! The engine answers two questions for every completed value: which
//! patterns it satisfies exactly (emit), and whether any pattern still needs
//! the surrounding subtree (retain). Two interchangeable strategies answer
//! them:
//!
//! - [`MatchStrategy::Scan`] re-derives the answer from the full path
//!   snapshot on every completed value.
//! - [`MatchStrategy::Incremental`] (the default) maintains a [`MatchState`]
//!   per pattern, updated only on structural events, and consults just the
//!   currently-matching set at value completion.
//!
//! Both must produce identical observable output; the property tests hold
//! one against the other.
use std::collections::BTreeSet;

use crate::builder::{Mode, PathStep};
use crate::pattern::{Component, Pattern};

/// Which matching strategy the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Compare every pattern against the full path of every completed value.
    Scan,
    /// Track per-pattern match state on structural events.
    #[default]
    Incremental,
}

/// Per-pattern match state at the current stack position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchState {
    /// The pattern prefix matches up to `min(depth, pattern length)`.
    Yes,
    /// Mismatch strictly before the final component, at this index. Nothing
    /// below that depth can match until a pop rises above it.
    NoBeforeEnd(usize),
    /// Mismatch exactly at the final component; a new binding at that depth
    /// may still match.
    NoAtEnd,
    /// Not evaluated at the current depth (freshly reset after a pop).
    Unknown,
}

/// Emission/retention decision for one completed value.
#[derive(Debug, Default)]
pub(crate) struct ValueOutcome {
    /// Indexes of patterns the value matches exactly, in registration order.
    pub matched: Vec<usize>,
    /// Whether some pattern still needs the surrounding subtree.
    pub keep: bool,
}

/// Tracks which of the registered patterns match the parser's position.
#[derive(Debug)]
pub(crate) struct MatchEngine {
    patterns: Vec<Pattern>,
    strategy: MatchStrategy,
    states: Vec<MatchState>,
    /// Patterns currently in [`MatchState::Yes`], ascending.
    matching: BTreeSet<usize>,
    /// Mirror of the bound path components; the last slot of an object is a
    /// placeholder until its first key arrives.
    steps: Vec<PathStep>,
}

impl MatchEngine {
    pub(crate) fn new(patterns: Vec<Pattern>, strategy: MatchStrategy) -> Self {
        // The empty prefix matches vacuously, so every pattern starts out
        // matching; the root pattern stays that way forever.
        let states = vec![MatchState::Yes; patterns.len()];
        let matching = (0..patterns.len()).collect();
        Self {
            patterns,
            strategy,
            states,
            matching,
            steps: Vec::new(),
        }
    }

    /// A container opened. Array slots bind immediately; object slots stay
    /// unbound until the first `on_key`.
    pub(crate) fn on_push(&mut self, mode: Mode) {
        if self.strategy == MatchStrategy::Scan {
            return;
        }
        match mode {
            Mode::Array => {
                self.steps.push(PathStep::Elem);
                self.evaluate_last();
            }
            Mode::Object => {
                self.steps.push(PathStep::Key(String::new()));
            }
        }
    }

    /// An object member key was bound at the deepest slot.
    pub(crate) fn on_key(&mut self, key: &str) {
        if self.strategy == MatchStrategy::Scan {
            return;
        }
        if let Some(last) = self.steps.last_mut() {
            *last = PathStep::Key(key.to_string());
        }
        self.evaluate_last();
    }

    /// A container closed; `depth` is the number of still-open containers.
    pub(crate) fn on_pop(&mut self, depth: usize) {
        if self.strategy == MatchStrategy::Scan {
            return;
        }
        self.steps.truncate(depth);
        // Any pattern reaching below the new depth must be re-evaluated once
        // the stack grows again: its recorded verdict may concern bindings
        // that no longer exist.
        for i in 0..self.patterns.len() {
            if self.patterns[i].components().len() > depth {
                self.set_state(i, MatchState::Unknown);
            }
        }
    }

    /// Decides emission and retention for a value completed at `path`.
    pub(crate) fn on_value(&self, path: &[PathStep]) -> ValueOutcome {
        match self.strategy {
            MatchStrategy::Scan => self.scan_value(path),
            MatchStrategy::Incremental => self.incremental_value(path),
        }
    }

    fn scan_value(&self, path: &[PathStep]) -> ValueOutcome {
        let mut outcome = ValueOutcome::default();
        for (i, pattern) in self.patterns.iter().enumerate() {
            let components = pattern.components();
            if components.len() > path.len() {
                continue;
            }
            let matches = components
                .iter()
                .zip(path)
                .all(|(c, step)| component_matches(c, step));
            if !matches {
                continue;
            }
            if components.len() == path.len() {
                outcome.matched.push(i);
            } else {
                // The value sits inside a subtree this pattern is still
                // building.
                outcome.keep = true;
            }
        }
        outcome
    }

    fn incremental_value(&self, path: &[PathStep]) -> ValueOutcome {
        let mut outcome = ValueOutcome::default();
        for &i in &self.matching {
            let len = self.patterns[i].components().len();
            if len == path.len() {
                outcome.matched.push(i);
            } else if len < path.len() {
                outcome.keep = true;
            }
        }
        outcome
    }

    /// Re-evaluates every pattern against the component that was just bound.
    fn evaluate_last(&mut self) {
        let Some(idx) = self.steps.len().checked_sub(1) else {
            return;
        };
        for i in 0..self.patterns.len() {
            let components = self.patterns[i].components();
            let len = components.len();
            if len == 0 || idx >= len {
                // Deeper than the pattern reaches; its prefix is unchanged.
                continue;
            }
            let state = self.states[i];
            let next = match state {
                // A mismatch above this depth is conclusive until a pop.
                MatchState::NoBeforeEnd(at) if at < idx => state,
                // The prefix below `idx` is already verified; re-check only
                // the component the event bound.
                MatchState::Yes => self.check_one(i, idx),
                MatchState::NoBeforeEnd(at) if at == idx => self.check_one(i, idx),
                MatchState::NoAtEnd if idx + 1 == len => self.check_one(i, idx),
                // Unknown, or a verdict that no longer lines up with the
                // stack: re-derive the whole prefix.
                _ => self.check_prefix(i, idx),
            };
            self.set_state(i, next);
        }
    }

    fn check_one(&self, i: usize, idx: usize) -> MatchState {
        let components = self.patterns[i].components();
        if component_matches(&components[idx], &self.steps[idx]) {
            MatchState::Yes
        } else if idx + 1 == components.len() {
            MatchState::NoAtEnd
        } else {
            MatchState::NoBeforeEnd(idx)
        }
    }

    fn check_prefix(&self, i: usize, idx: usize) -> MatchState {
        let components = self.patterns[i].components();
        for j in 0..=idx {
            if !component_matches(&components[j], &self.steps[j]) {
                return if j + 1 == components.len() {
                    MatchState::NoAtEnd
                } else {
                    MatchState::NoBeforeEnd(j)
                };
            }
        }
        MatchState::Yes
    }

    fn set_state(&mut self, i: usize, state: MatchState) {
        self.states[i] = state;
        if state == MatchState::Yes {
            self.matching.insert(i);
        } else {
            self.matching.remove(&i);
        }
    }
}

/// Component equality: a key matches only the identical observed key; a
/// wildcard matches any observed step, array element or object member alike.
fn component_matches(component: &Component, step: &PathStep) -> bool {
    match component {
        Component::Wildcard => true,
        Component::Key(name) => matches!(step, PathStep::Key(k) if k == name),
    }
}
