use std::collections::HashSet;
use serde::Serialize;
use thiserror::Error;
use crate::models::{UserProfile, Verdict};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("Candidate already decided: {0}")]
    AlreadyDecided(String),
}

/// Per-viewer discovery state
///
/// Holds the last loaded candidate order and a cursor into it. A candidate id
/// lives in at most one of `liked`/`passed`, and once decided it is skipped
/// for the rest of the session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryState {
    candidates: Vec<String>,
    cursor: usize,
    liked: HashSet<String>,
    passed: HashSet<String>,
}

impl DiscoveryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded candidates and rewind the cursor
    pub fn load<'a>(&mut self, queue: impl IntoIterator<Item = &'a UserProfile>) {
        self.candidates = queue.into_iter().map(|p| p.user_id.clone()).collect();
        self.cursor = 0;
    }

    /// Head of the loaded queue, skipping anything decided since loading
    pub fn current(&self) -> Option<&str> {
        self.candidates
            .iter()
            .skip(self.cursor)
            .find(|id| !self.is_decided(id))
            .map(String::as_str)
    }

    /// Move the cursor past the current head
    pub fn advance(&mut self) {
        let skipped = self
            .candidates
            .iter()
            .skip(self.cursor)
            .take_while(|id| self.is_decided(id))
            .count();
        self.cursor = (self.cursor + skipped).min(self.candidates.len());
    }

    pub fn is_decided(&self, candidate_id: &str) -> bool {
        self.liked.contains(candidate_id) || self.passed.contains(candidate_id)
    }

    /// Record a verdict; deciding the same candidate twice is rejected
    pub fn record(&mut self, verdict: Verdict, candidate_id: &str) -> Result<(), SessionError> {
        if self.is_decided(candidate_id) {
            return Err(SessionError::AlreadyDecided(candidate_id.to_string()));
        }

        match verdict {
            Verdict::Like => self.liked.insert(candidate_id.to_string()),
            Verdict::Pass => self.passed.insert(candidate_id.to_string()),
        };
        Ok(())
    }

    /// Union of liked and passed ids
    pub fn decided_ids(&self) -> HashSet<String> {
        self.liked.union(&self.passed).cloned().collect()
    }

    pub fn liked(&self) -> &HashSet<String> {
        &self.liked
    }

    pub fn passed(&self) -> &HashSet<String> {
        &self.passed
    }

    /// Remaining undecided candidates from the cursor on
    pub fn remaining(&self) -> usize {
        self.candidates
            .iter()
            .skip(self.cursor)
            .filter(|id| !self.is_decided(id))
            .count()
    }

    /// Forget every decision; the caller reloads the queue afterwards
    pub fn reset(&mut self) {
        self.liked.clear();
        self.passed.clear();
        self.candidates.clear();
        self.cursor = 0;
    }
}
