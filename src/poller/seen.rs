//! In-memory record of inspect links already claimed

use std::collections::HashSet;

/// Links that have been claimed for a lookup
///
/// Grows monotonically for the lifetime of the process and is never
/// persisted. There is deliberately no removal API.
#[derive(Debug, Clone, Default)]
pub struct SeenLinks {
    links: HashSet<String>,
}

impl SeenLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Claim a link; returns `false` if it was already claimed
    pub fn insert(&mut self, link: &str) -> bool {
        if self.links.contains(link) {
            return false;
        }
        self.links.insert(link.to_string())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Links from `candidates` not yet claimed, order kept
    pub fn unseen<'a>(&self, candidates: &'a [String]) -> Vec<&'a String> {
        candidates.iter().filter(|l| !self.contains(l)).collect()
    }
}
