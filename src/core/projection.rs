use crate::domain::model::{Sequence, Step};
use std::fmt;

/// Card id of the form `{sequence_id}-{step_number}`.
///
/// Sequence ids may themselves contain `-`, so ids are only ever compared,
/// never split; the owning sequence travels alongside on [`StepCard`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardId(String);

impl CardId {
    pub fn new(sequence_id: &str, step_number: u32) -> Self {
        Self(format!("{}-{}", sequence_id, step_number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CardId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Flat, draggable view of one step. Rebuilt on every projection, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCard {
    pub id: CardId,
    pub sequence_id: String,
    pub step_number: u32,
    pub step: Step,
}

/// Concatenates one card per step, sequences in input order, steps in step order.
pub fn project(sequences: &[Sequence]) -> Vec<StepCard> {
    sequences
        .iter()
        .flat_map(|sequence| {
            sequence.steps.iter().map(move |step| StepCard {
                id: CardId::new(&sequence.id, step.step_number),
                sequence_id: sequence.id.clone(),
                step_number: step.step_number,
                step: step.clone(),
            })
        })
        .collect()
}

pub fn find_card(cards: &[StepCard], id: &CardId) -> Option<usize> {
    cards.iter().position(|card| &card.id == id)
}
