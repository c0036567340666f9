//! Append-only debate log

use agora_agents::{DebateStage, Speaker};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a log entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Introduction,
    Transition,
    Opening,
    Rebuttal,
    Closing,
    FactCheck,
    Intervention,
    Thinking,
    ModeratorClosing,
    Analytics,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Introduction => "introduction",
            EntryKind::Transition => "transition",
            EntryKind::Opening => "opening",
            EntryKind::Rebuttal => "rebuttal",
            EntryKind::Closing => "closing",
            EntryKind::FactCheck => "fact_check",
            EntryKind::Intervention => "intervention",
            EntryKind::Thinking => "thinking",
            EntryKind::ModeratorClosing => "moderator_closing",
            EntryKind::Analytics => "analytics",
        }
    }

    /// Debater statements, as opposed to moderator or verifier output
    pub fn is_statement(&self) -> bool {
        matches!(self, EntryKind::Opening | EntryKind::Rebuttal | EntryKind::Closing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the log, starting at 0
    pub sequence: usize,
    pub stage: DebateStage,
    pub speaker: Speaker,
    pub kind: EntryKind,
    pub content: String,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Ordered record of everything said during a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebateLog {
    entries: Vec<LogEntry>,
}

impl DebateLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its sequence number
    pub fn append(
        &mut self,
        stage: DebateStage,
        speaker: Speaker,
        kind: EntryKind,
        content: impl Into<String>,
        metadata: serde_json::Value,
    ) -> usize {
        let sequence = self.entries.len();
        self.entries.push(LogEntry {
            sequence,
            stage,
            speaker,
            kind,
            content: content.into(),
            metadata,
            timestamp: Utc::now(),
        });
        tracing::debug!(sequence, kind = kind.as_str(), speaker = %speaker, "Log entry appended");
        sequence
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn statements(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.kind.is_statement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequence_numbers_follow_append_order() {
        let mut log = DebateLog::new();
        let a = log.append(DebateStage::Introduction, Speaker::Moderator, EntryKind::Introduction, "Welcome", json!({}));
        let b = log.append(DebateStage::Opening, Speaker::Proponent, EntryKind::Opening, "I stand in favor", json!({"strength": 0.6}));
        assert_eq!((a, b), (0, 1));
        assert_eq!(log.len(), 2);
        assert_eq!(log.count(EntryKind::Opening), 1);
        assert_eq!(log.statements().count(), 1);
        assert_eq!(log.last().map(|e| e.speaker), Some(Speaker::Proponent));
    }

    #[test]
    fn test_serializes_as_array() {
        let mut log = DebateLog::new();
        log.append(DebateStage::Round(1), Speaker::Opponent, EntryKind::Rebuttal, "No", json!(null));
        let value = serde_json::to_value(&log).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["kind"], "rebuttal");
        assert_eq!(value[0]["stage"]["round"], 1);
    }
}
