//! Turns drag-and-drop gestures and step edits into per-sequence step lists.
//!
//! Everything here is pure: a plan is computed from a snapshot of the
//! sequences and carries the full new step list of every sequence that
//! changed. Applying and persisting the plan is the workspace's job.

use crate::core::projection::{find_card, project, CardId, StepCard};
use crate::domain::model::{Sequence, Step, StepEdit};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::validate_delay_days;
use serde::{Deserialize, Serialize};

/// What happens when a card is dropped onto a card owned by another sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossSequencePolicy {
    #[default]
    Reject,
    /// Move the step into the target's sequence and renumber both sides.
    Reparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReorderOptions {
    pub cross_sequence: CrossSequencePolicy,
    /// Rewrite step numbers to match the new positions after a reorder.
    pub renumber_on_reorder: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderPlan {
    pub updates: Vec<Sequence>,
}

impl ReorderPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn sequence_ids(&self) -> Vec<&str> {
        self.updates.iter().map(|s| s.id.as_str()).collect()
    }
}

/// Moves the `source` card to the position of the `target` card.
pub fn plan_move(
    sequences: &[Sequence],
    source: &CardId,
    target: &CardId,
    options: ReorderOptions,
) -> Result<ReorderPlan> {
    if source == target {
        return Ok(ReorderPlan::default());
    }

    let mut cards = project(sequences);
    let from = locate(&cards, source)?;
    let to = locate(&cards, target)?;

    let source_owner = cards[from].sequence_id.clone();
    let target_owner = cards[to].sequence_id.clone();
    let crosses = source_owner != target_owner;

    if crosses && options.cross_sequence == CrossSequencePolicy::Reject {
        return Err(SyncError::CrossSequenceMove {
            source_card: source.to_string(),
            target_card: target.to_string(),
        });
    }

    let mut moved = cards.remove(from);
    if crosses {
        moved.sequence_id = target_owner.clone();
    }
    cards.insert(to, moved);

    let mut plan = ReorderPlan::default();
    for sequence in sequences {
        let steps: Vec<Step> = cards
            .iter()
            .filter(|card| card.sequence_id == sequence.id)
            .map(|card| card.step.clone())
            .collect();

        // 跨序列移動時兩邊都必須重新編號，否則 step_number 會重複
        let touched_by_reparent =
            crosses && (sequence.id == source_owner || sequence.id == target_owner);
        let steps = if options.renumber_on_reorder || touched_by_reparent {
            renumber(steps)
        } else {
            steps
        };

        if steps != sequence.steps {
            plan.updates.push(with_steps(sequence, steps));
        }
    }

    tracing::debug!(
        "Planned move {} -> {} touching {:?}",
        source,
        target,
        plan.sequence_ids()
    );
    Ok(plan)
}

/// Merges `edit` into the step behind `card`. A delete edit drops the step and
/// renumbers the survivors.
pub fn plan_step_edit(
    sequences: &[Sequence],
    card: &CardId,
    edit: &StepEdit,
) -> Result<ReorderPlan> {
    if edit.is_empty() {
        return Ok(ReorderPlan::default());
    }
    if let Some(delay) = &edit.delay_days {
        validate_delay_days("delay_days", delay)?;
    }

    let cards = project(sequences);
    let index = locate(&cards, card)?;
    let owner = &cards[index];

    let sequence = sequences
        .iter()
        .find(|s| s.id == owner.sequence_id)
        .ok_or_else(|| SyncError::SequenceNotFound {
            sequence_id: owner.sequence_id.clone(),
        })?;

    let mut steps = sequence.steps.clone();
    for step in steps.iter_mut().filter(|s| s.step_number == owner.step_number) {
        edit.apply_to(step);
    }
    let steps = prepare_steps(steps);

    if steps == sequence.steps {
        return Ok(ReorderPlan::default());
    }
    Ok(ReorderPlan {
        updates: vec![with_steps(sequence, steps)],
    })
}

/// Drops soft-deleted steps. When anything was dropped the survivors are
/// renumbered 1..N in their current order; otherwise the list is untouched.
pub fn prepare_steps(steps: Vec<Step>) -> Vec<Step> {
    if !steps.iter().any(|s| s.is_deleted) {
        return steps;
    }
    renumber(steps.into_iter().filter(|s| !s.is_deleted).collect())
}

pub fn renumber(steps: Vec<Step>) -> Vec<Step> {
    steps
        .into_iter()
        .enumerate()
        .map(|(i, mut step)| {
            step.step_number = i as u32 + 1;
            step
        })
        .collect()
}

fn locate(cards: &[StepCard], id: &CardId) -> Result<usize> {
    find_card(cards, id).ok_or_else(|| SyncError::CardNotFound {
        card_id: id.to_string(),
    })
}

fn with_steps(sequence: &Sequence, steps: Vec<Step>) -> Sequence {
    let mut updated = sequence.clone();
    updated.steps = steps;
    updated.refresh_content();
    updated
}
