//! Bounded memory store with importance-based eviction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Context overlap at which a new memory is associated with an older one
const ASSOCIATION_THRESHOLD: f64 = 0.5;
const MAX_ASSOCIATIONS: usize = 3;

/// Kind of memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// Something that happened during the debate
    Episodic,
    /// A fact or piece of feedback
    Semantic,
}

/// A stored memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub content: String,
    pub importance: f64,
    pub context: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub kind: MemoryKind,
    pub associations: Vec<Uuid>,
}

impl Memory {
    pub fn new(content: impl Into<String>, importance: f64, kind: MemoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            importance: if importance.is_finite() {
                importance.clamp(0.0, 1.0)
            } else {
                0.0
            },
            context: BTreeMap::new(),
            timestamp: Utc::now(),
            kind,
            associations: Vec::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Fraction of the query's key/value pairs this memory matches
    pub fn context_similarity(&self, query: &BTreeMap<String, String>) -> f64 {
        if query.is_empty() {
            return 0.0;
        }
        let matched = query
            .iter()
            .filter(|(k, v)| self.context.get(*k) == Some(*v))
            .count();
        matched as f64 / query.len() as f64
    }
}

/// Capacity-bounded memory store; insertion order is preserved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    capacity: usize,
    entries: Vec<Memory>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Memory> {
        self.entries.iter()
    }

    pub fn by_kind(&self, kind: MemoryKind) -> Vec<&Memory> {
        self.entries.iter().filter(|m| m.kind == kind).collect()
    }

    /// Store a memory, evicting the least important entry (oldest on ties)
    /// when over capacity. Returns the evicted memory, if any.
    pub fn store(&mut self, mut memory: Memory) -> Option<Memory> {
        memory.associations = self
            .entries
            .iter()
            .rev()
            .filter(|m| m.context_similarity(&memory.context) >= ASSOCIATION_THRESHOLD)
            .take(MAX_ASSOCIATIONS)
            .map(|m| m.id)
            .collect();
        self.entries.push(memory);

        let evicted = if self.entries.len() > self.capacity {
            self.evict()
        } else {
            None
        };
        metrics::gauge!("agora_memory_size").set(self.entries.len() as f64);
        evicted
    }

    fn evict(&mut self) -> Option<Memory> {
        let (index, _) = self
            .entries
            .iter()
            .enumerate()
            .min_by(|(ia, a), (ib, b)| a.importance.total_cmp(&b.importance).then(ia.cmp(ib)))?;
        let removed = self.entries.remove(index);
        metrics::counter!("agora_memory_evictions_total").increment(1);
        tracing::debug!(
            memory = %removed.id,
            importance = removed.importance,
            "Evicted memory"
        );
        Some(removed)
    }

    /// Memories whose context matches at least `threshold`, most important first
    pub fn recall(&self, context: &BTreeMap<String, String>, threshold: f64) -> Vec<&Memory> {
        let mut found: Vec<&Memory> = self
            .entries
            .iter()
            .filter(|m| m.context_similarity(context) >= threshold)
            .collect();
        found.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        found
    }

    /// The `n` most recent memories
    pub fn recent(&self, n: usize) -> Vec<&Memory> {
        self.entries.iter().rev().take(n).collect()
    }
}
