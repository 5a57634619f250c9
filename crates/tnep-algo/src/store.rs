//! Tagged results of every solve attempt.
//!
//! Each attempt gets a unique tag: [`BASE_TAG`] for the full network and
//! [`attempt_tag`] for an outage retry. The store keeps insertion order so
//! reports and output files list attempts in the order they ran.

use crate::planning::{DesignError, DesignSolution};
use crate::solver::SolveStatus;
use serde::Serialize;
use std::collections::HashMap;
use tnep_core::NodeId;

/// Tag of the design over the full network.
pub const BASE_TAG: &str = "base";

/// Tag of the `attempt`-th (1-based) retry for an outage of `station`.
pub fn attempt_tag(station: NodeId, attempt: u32) -> String {
    format!("station_{}_try_{}", station, attempt)
}

/// One recorded attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub tag: String,
    pub status: SolveStatus,
    pub solution: DesignSolution,
}

#[derive(Debug, Clone, Default)]
pub struct AttemptStore {
    records: Vec<AttemptRecord>,
    index: HashMap<String, usize>,
}

impl AttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a solution under its own tag. Tags are write-once.
    pub fn insert(&mut self, solution: DesignSolution) -> Result<&AttemptRecord, DesignError> {
        if self.index.contains_key(&solution.tag) {
            return Err(DesignError::DuplicateTag(solution.tag));
        }
        let idx = self.records.len();
        self.index.insert(solution.tag.clone(), idx);
        self.records.push(AttemptRecord {
            tag: solution.tag.clone(),
            status: solution.status,
            solution,
        });
        Ok(&self.records[idx])
    }

    pub fn get(&self, tag: &str) -> Option<&AttemptRecord> {
        self.index.get(tag).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttemptRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.tag.as_str())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

impl<'a> IntoIterator for &'a AttemptStore {
    type Item = &'a AttemptRecord;
    type IntoIter = std::slice::Iter<'a, AttemptRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
