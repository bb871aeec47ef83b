use crate::domain::model::Sequence;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Issued before an update call goes out. Responses are applied in issue
/// order: only the newest ticket issued for a sequence may replace it, so an
/// older response never overwrites a newer optimistic change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTicket {
    pub sequence_id: String,
    pub number: u64,
    pub issued_at: DateTime<Utc>,
}

/// Local, optimistic list of sequences.
#[derive(Debug, Default)]
pub struct SequenceStore {
    sequences: Vec<Sequence>,
    issued: HashMap<String, u64>,
}

impl SequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequences(sequences: Vec<Sequence>) -> Self {
        Self {
            sequences,
            ..Default::default()
        }
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn get(&self, sequence_id: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.id == sequence_id)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Replaces the sequence with the same id in place, or appends it.
    pub fn replace_or_append(&mut self, sequence: Sequence) {
        match self.sequences.iter().position(|s| s.id == sequence.id) {
            Some(index) => self.sequences[index] = sequence,
            None => self.sequences.push(sequence),
        }
    }

    pub fn remove(&mut self, sequence_id: &str) {
        self.sequences.retain(|s| s.id != sequence_id);
        self.issued.remove(sequence_id);
    }

    pub fn replace_all(&mut self, sequences: Vec<Sequence>) {
        self.sequences = sequences;
        let sequences = &self.sequences;
        self.issued.retain(|id, _| sequences.iter().any(|s| &s.id == id));
    }

    pub fn issue_ticket(&mut self, sequence_id: &str) -> UpdateTicket {
        let counter = self.issued.entry(sequence_id.to_string()).or_insert(0);
        *counter += 1;
        UpdateTicket {
            sequence_id: sequence_id.to_string(),
            number: *counter,
            issued_at: Utc::now(),
        }
    }

    /// Number of sequences with update tickets on record.
    pub fn tracked(&self) -> usize {
        self.issued.len()
    }

    /// Applies the server's canonical copy for `ticket`. Returns false when a
    /// newer ticket has been issued for the sequence or the sequence has since
    /// been removed locally.
    pub fn apply_response(&mut self, ticket: &UpdateTicket, sequence: Sequence) -> bool {
        if self.get(&ticket.sequence_id).is_none() {
            tracing::debug!(
                "Dropping response for {}: no longer in the local store",
                ticket.sequence_id
            );
            return false;
        }
        let newest = self
            .issued
            .get(&ticket.sequence_id)
            .copied()
            .unwrap_or(0);
        if ticket.number < newest {
            tracing::debug!(
                "Dropping stale response #{} for {} (issued {}), #{} is newer",
                ticket.number,
                ticket.sequence_id,
                ticket.issued_at.to_rfc3339(),
                newest
            );
            return false;
        }

        self.replace_or_append(sequence);
        true
    }
}
