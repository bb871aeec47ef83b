use crate::core::projection::{project, CardId, StepCard};
use crate::core::reconciler::{
    plan_move, plan_step_edit, prepare_steps, ReorderOptions, ReorderPlan,
};
use crate::core::store::{SequenceStore, UpdateTicket};
use crate::domain::model::{
    CreateSequenceData, ListSequencesParams, Sequence, StepEdit, UpdateSequenceData,
};
use crate::domain::ports::SequenceService;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{validate_required, Validate};

/// An update that has been applied locally and still has to reach the server.
#[derive(Debug, Clone)]
pub struct PendingUpdate {
    pub ticket: UpdateTicket,
    pub payload: UpdateSequenceData,
}

impl PendingUpdate {
    pub fn sequence_id(&self) -> &str {
        &self.ticket.sequence_id
    }
}

#[derive(Debug)]
pub enum SyncOutcome {
    Applied,
    /// Server accepted the update but a newer response was already applied.
    Stale,
    Failed(SyncError),
}

/// Per-sequence result of persisting a plan. Calls are independent, so a
/// report can mix successes and failures.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub synced: Vec<String>,
    pub stale: Vec<String>,
    pub failed: Vec<(String, SyncError)>,
}

impl SyncReport {
    pub fn record(&mut self, sequence_id: &str, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Applied => self.synced.push(sequence_id.to_string()),
            SyncOutcome::Stale => self.stale.push(sequence_id.to_string()),
            SyncOutcome::Failed(err) => self.failed.push((sequence_id.to_string(), err)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        self.synced.is_empty() && self.stale.is_empty() && self.failed.is_empty()
    }
}

/// Local sequence state plus the remote service it is persisted to.
///
/// Mutations are optimistic: the store changes first, then each affected
/// sequence is sent on its own. A failed call leaves the local change in
/// place and shows up in the [`SyncReport`]; nothing is rolled back or retried.
pub struct Workspace<S: SequenceService> {
    service: S,
    store: SequenceStore,
    options: ReorderOptions,
}

impl<S: SequenceService> Workspace<S> {
    pub fn new(service: S, options: ReorderOptions) -> Self {
        Self {
            service,
            store: SequenceStore::new(),
            options,
        }
    }

    pub fn with_store(service: S, store: SequenceStore, options: ReorderOptions) -> Self {
        Self {
            service,
            store,
            options,
        }
    }

    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn options(&self) -> ReorderOptions {
        self.options
    }

    pub fn cards(&self) -> Vec<StepCard> {
        project(self.store.sequences())
    }

    pub async fn load(&mut self, params: &ListSequencesParams) -> Result<usize> {
        let sequences = self.service.list(params).await?;
        let count = sequences.len();
        self.store.replace_all(sequences);
        tracing::info!("Loaded {} sequences", count);
        Ok(count)
    }

    pub async fn move_card(&mut self, source: &CardId, target: &CardId) -> Result<SyncReport> {
        let pending = self.stage_move(source, target)?;
        if pending.is_empty() {
            tracing::debug!("Move {} -> {} changes nothing", source, target);
        }
        Ok(self.persist(pending).await)
    }

    pub async fn edit_step(&mut self, card: &CardId, edit: &StepEdit) -> Result<SyncReport> {
        let pending = self.stage_step_edit(card, edit)?;
        Ok(self.persist(pending).await)
    }

    /// Plans a move and applies it to the local store. The returned updates
    /// still have to be sent and completed by the caller.
    pub fn stage_move(&mut self, source: &CardId, target: &CardId) -> Result<Vec<PendingUpdate>> {
        let plan = plan_move(self.store.sequences(), source, target, self.options)?;
        Ok(self.stage(plan))
    }

    pub fn stage_step_edit(
        &mut self,
        card: &CardId,
        edit: &StepEdit,
    ) -> Result<Vec<PendingUpdate>> {
        let plan = plan_step_edit(self.store.sequences(), card, edit)?;
        Ok(self.stage(plan))
    }

    fn stage(&mut self, plan: ReorderPlan) -> Vec<PendingUpdate> {
        plan.updates
            .into_iter()
            .map(|mut sequence| {
                sequence.steps = prepare_steps(sequence.steps);
                sequence.refresh_content();

                let ticket = self.store.issue_ticket(&sequence.id);
                let payload = UpdateSequenceData::steps(sequence.steps.clone());
                self.store.replace_or_append(sequence);
                PendingUpdate { ticket, payload }
            })
            .collect()
    }

    pub async fn send(&self, pending: &PendingUpdate) -> Result<Sequence> {
        self.service
            .update(pending.sequence_id(), &pending.payload)
            .await
    }

    /// Folds a finished call back into the store.
    pub fn complete(&mut self, pending: &PendingUpdate, result: Result<Sequence>) -> SyncOutcome {
        match result {
            Ok(canonical) => {
                if self.store.apply_response(&pending.ticket, canonical) {
                    SyncOutcome::Applied
                } else {
                    SyncOutcome::Stale
                }
            }
            Err(err) => {
                tracing::error!(
                    "❌ Failed to save sequence {}: {} ({})",
                    pending.sequence_id(),
                    err,
                    err.recovery_suggestion()
                );
                SyncOutcome::Failed(err)
            }
        }
    }

    pub async fn persist(&mut self, pending: Vec<PendingUpdate>) -> SyncReport {
        let mut report = SyncReport::default();
        for update in pending {
            let result = self.send(&update).await;
            let outcome = self.complete(&update, result);
            report.record(update.sequence_id(), outcome);
        }
        if !report.is_noop() {
            tracing::info!(
                "Saved {} sequences ({} stale, {} failed)",
                report.synced.len(),
                report.stale.len(),
                report.failed.len()
            );
        }
        report
    }

    pub async fn create(&mut self, data: &CreateSequenceData) -> Result<Sequence> {
        data.validate()?;
        let created = self.service.create(data).await?;
        tracing::info!("✅ Created sequence {} ({})", created.id, created.title);
        self.store.replace_or_append(created.clone());
        Ok(created)
    }

    pub async fn delete(&mut self, sequence_id: &str) -> Result<()> {
        self.service.delete(sequence_id).await?;
        self.store.remove(sequence_id);
        tracing::info!("🗑️ Deleted sequence {}", sequence_id);
        Ok(())
    }

    pub async fn set_active(&mut self, sequence_id: &str, is_active: bool) -> Result<Sequence> {
        let ticket = self.store.issue_ticket(sequence_id);
        let updated = self
            .service
            .update(sequence_id, &UpdateSequenceData::active(is_active))
            .await?;
        self.store.apply_response(&ticket, updated.clone());
        Ok(updated)
    }

    pub async fn generate(&mut self, prompt: &str) -> Result<Sequence> {
        validate_required("prompt", prompt)?;
        let generated = self.service.generate(prompt).await?;
        self.store.replace_or_append(generated.clone());
        Ok(generated)
    }

    pub async fn edit_with_prompt(&mut self, sequence_id: &str, prompt: &str) -> Result<Sequence> {
        validate_required("prompt", prompt)?;
        let ticket = self.store.issue_ticket(sequence_id);
        let edited = self.service.edit_with_prompt(sequence_id, prompt).await?;
        self.store.apply_response(&ticket, edited.clone());
        Ok(edited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reconciler::CrossSequencePolicy;
    use crate::domain::model::Step;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Echoes updates back as the canonical sequence and records every call.
    #[derive(Clone, Default)]
    struct MockService {
        calls: Arc<Mutex<Vec<(String, UpdateSequenceData)>>>,
        failing: Arc<Mutex<HashSet<String>>>,
        remote: Arc<Mutex<Vec<Sequence>>>,
    }

    impl MockService {
        fn with_remote(sequences: Vec<Sequence>) -> Self {
            Self {
                remote: Arc::new(Mutex::new(sequences)),
                ..Default::default()
            }
        }

        async fn fail_for(&self, sequence_id: &str) {
            self.failing.lock().await.insert(sequence_id.to_string());
        }

        async fn calls(&self) -> Vec<(String, UpdateSequenceData)> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl SequenceService for MockService {
        async fn create(&self, data: &CreateSequenceData) -> Result<Sequence> {
            let mut remote = self.remote.lock().await;
            let sequence = Sequence {
                id: format!("created-{}", remote.len() + 1),
                title: data.title.clone(),
                description: data.description.clone(),
                content: data.content.clone(),
                steps: data.steps.clone(),
                status: data.status.unwrap_or_default(),
                is_active: data.is_active.unwrap_or(false),
            };
            remote.push(sequence.clone());
            Ok(sequence)
        }

        async fn update(&self, sequence_id: &str, data: &UpdateSequenceData) -> Result<Sequence> {
            self.calls
                .lock()
                .await
                .push((sequence_id.to_string(), data.clone()));
            if self.failing.lock().await.contains(sequence_id) {
                return Err(SyncError::Server {
                    operation: "update",
                    status: 500,
                    message: "Failed to update sequence".to_string(),
                });
            }
            let mut remote = self.remote.lock().await;
            let sequence = remote
                .iter_mut()
                .find(|s| s.id == sequence_id)
                .ok_or_else(|| SyncError::Server {
                    operation: "update",
                    status: 404,
                    message: "Sequence not found".to_string(),
                })?;
            if let Some(steps) = &data.steps {
                sequence.steps = steps.clone();
            }
            if let Some(content) = &data.content {
                sequence.content = content.clone();
            }
            if let Some(active) = data.is_active {
                sequence.is_active = active;
            }
            Ok(sequence.clone())
        }

        async fn get(&self, sequence_id: &str) -> Result<Sequence> {
            self.remote
                .lock()
                .await
                .iter()
                .find(|s| s.id == sequence_id)
                .cloned()
                .ok_or_else(|| SyncError::SequenceNotFound {
                    sequence_id: sequence_id.to_string(),
                })
        }

        async fn delete(&self, sequence_id: &str) -> Result<()> {
            let mut remote = self.remote.lock().await;
            let before = remote.len();
            remote.retain(|s| s.id != sequence_id);
            if remote.len() == before {
                return Err(SyncError::Server {
                    operation: "delete",
                    status: 404,
                    message: "Sequence not found".to_string(),
                });
            }
            Ok(())
        }

        async fn list(&self, _params: &ListSequencesParams) -> Result<Vec<Sequence>> {
            Ok(self.remote.lock().await.clone())
        }

        async fn generate(&self, prompt: &str) -> Result<Sequence> {
            let mut step = Step::blank(1);
            step.step_title = "Generated".to_string();
            step.content = prompt.to_string();
            Ok(Sequence {
                id: "generated".to_string(),
                title: "Generated".to_string(),
                description: prompt.to_string(),
                content: prompt.to_string(),
                steps: vec![step],
                status: Default::default(),
                is_active: false,
            })
        }

        async fn edit_with_prompt(&self, sequence_id: &str, prompt: &str) -> Result<Sequence> {
            let mut sequence = self.get(sequence_id).await?;
            sequence.description = prompt.to_string();
            Ok(sequence)
        }
    }

    fn step(title: &str, number: u32) -> Step {
        let mut step = Step::blank(number);
        step.step_title = title.to_string();
        step.content = title.to_lowercase();
        step
    }

    fn sequence(id: &str, steps: Vec<Step>) -> Sequence {
        let mut sequence = Sequence {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            content: String::new(),
            steps,
            status: Default::default(),
            is_active: true,
        };
        sequence.refresh_content();
        sequence
    }

    fn titles<'a>(workspace: &'a Workspace<MockService>, sequence_id: &str) -> Vec<&'a str> {
        workspace
            .store()
            .get(sequence_id)
            .unwrap()
            .steps
            .iter()
            .map(|s| s.step_title.as_str())
            .collect()
    }

    async fn loaded(sequences: Vec<Sequence>, options: ReorderOptions) -> Workspace<MockService> {
        let mut workspace = Workspace::new(MockService::with_remote(sequences), options);
        workspace
            .load(&ListSequencesParams::default())
            .await
            .unwrap();
        workspace
    }

    #[tokio::test]
    async fn self_move_issues_no_calls() {
        let mut workspace = loaded(
            vec![sequence("s1", vec![step("A", 1), step("B", 2)])],
            ReorderOptions::default(),
        )
        .await;

        let report = workspace
            .move_card(&CardId::from("s1-1"), &CardId::from("s1-1"))
            .await
            .unwrap();

        assert!(report.is_noop());
        assert!(workspace.service().calls().await.is_empty());
    }

    #[tokio::test]
    async fn reorder_sends_full_step_list_for_owner_only() {
        let mut workspace = loaded(
            vec![
                sequence("s1", vec![step("A", 1), step("B", 2)]),
                sequence("s2", vec![step("C", 1)]),
            ],
            ReorderOptions::default(),
        )
        .await;

        let report = workspace
            .move_card(&CardId::from("s1-2"), &CardId::from("s1-1"))
            .await
            .unwrap();

        assert_eq!(report.synced, vec!["s1".to_string()]);
        let calls = workspace.service().calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "s1");
        let sent: Vec<&str> = calls[0]
            .1
            .steps
            .as_ref()
            .unwrap()
            .iter()
            .map(|s| s.step_title.as_str())
            .collect();
        assert_eq!(sent, vec!["B", "A"]);

        let ids: Vec<String> = workspace.cards().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["s1-2", "s1-1", "s2-1"]);
    }

    #[tokio::test]
    async fn one_failing_sequence_does_not_block_the_other() {
        let mut workspace = loaded(
            vec![
                sequence("s1", vec![step("A", 1), step("B", 2)]),
                sequence("s2", vec![step("C", 1)]),
            ],
            ReorderOptions {
                cross_sequence: CrossSequencePolicy::Reparent,
                ..Default::default()
            },
        )
        .await;
        workspace.service().fail_for("s1").await;

        let report = workspace
            .move_card(&CardId::from("s1-2"), &CardId::from("s2-1"))
            .await
            .unwrap();

        assert_eq!(report.synced, vec!["s2".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "s1");
        assert!(!report.is_success());
        assert_eq!(workspace.service().calls().await.len(), 2);

        // optimistic state stays even though s1 failed to save
        assert_eq!(workspace.store().get("s1").unwrap().steps.len(), 1);
        assert_eq!(workspace.store().get("s2").unwrap().steps.len(), 2);
    }

    #[tokio::test]
    async fn rejected_cross_move_leaves_state_untouched() {
        let original = vec![
            sequence("s1", vec![step("A", 1), step("B", 2)]),
            sequence("s2", vec![step("C", 1)]),
        ];
        let mut workspace = loaded(original.clone(), ReorderOptions::default()).await;

        let err = workspace
            .move_card(&CardId::from("s1-2"), &CardId::from("s2-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::CrossSequenceMove { .. }));
        assert_eq!(workspace.store().sequences(), original.as_slice());
        assert!(workspace.service().calls().await.is_empty());
    }

    #[tokio::test]
    async fn delete_step_sends_renumbered_list() {
        let mut workspace = loaded(
            vec![sequence("s1", vec![step("A", 1), step("B", 2), step("C", 3)])],
            ReorderOptions::default(),
        )
        .await;

        let report = workspace
            .edit_step(&CardId::from("s1-1"), &StepEdit::delete())
            .await
            .unwrap();
        assert!(report.is_success());

        let calls = workspace.service().calls().await;
        let sent = calls[0].1.steps.as_ref().unwrap();
        let numbered: Vec<(&str, u32)> = sent
            .iter()
            .map(|s| (s.step_title.as_str(), s.step_number))
            .collect();
        assert_eq!(numbered, vec![("B", 1), ("C", 2)]);
        assert_eq!(calls[0].1.content.as_deref(), Some("b\n\nc"));
    }

    #[tokio::test]
    async fn late_response_from_earlier_reorder_is_dropped() {
        let mut workspace = loaded(
            vec![sequence("s1", vec![step("A", 1), step("B", 2), step("C", 3)])],
            ReorderOptions::default(),
        )
        .await;

        let first = workspace
            .stage_move(&CardId::from("s1-3"), &CardId::from("s1-1"))
            .unwrap();
        let second = workspace
            .stage_move(&CardId::from("s1-1"), &CardId::from("s1-2"))
            .unwrap();

        let first_result = workspace.send(&first[0]).await;
        let second_result = workspace.send(&second[0]).await;

        // complete in reverse order
        assert!(matches!(
            workspace.complete(&second[0], second_result),
            SyncOutcome::Applied
        ));
        assert!(matches!(
            workspace.complete(&first[0], first_result),
            SyncOutcome::Stale
        ));

        assert_eq!(titles(&workspace, "s1"), vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn older_success_does_not_undo_newer_failed_move() {
        let original = vec![sequence("s1", vec![step("A", 1), step("B", 2), step("C", 3)])];
        let mut workspace = Workspace::with_store(
            MockService::with_remote(original.clone()),
            SequenceStore::with_sequences(original),
            ReorderOptions::default(),
        );

        let first = workspace
            .stage_move(&CardId::from("s1-3"), &CardId::from("s1-1"))
            .unwrap();
        let second = workspace
            .stage_move(&CardId::from("s1-1"), &CardId::from("s1-2"))
            .unwrap();
        assert_eq!(titles(&workspace, "s1"), vec!["C", "B", "A"]);

        let first_result = workspace.send(&first[0]).await;
        assert!(matches!(
            workspace.complete(&first[0], first_result),
            SyncOutcome::Stale
        ));
        assert_eq!(titles(&workspace, "s1"), vec!["C", "B", "A"]);

        let failed = Err(SyncError::Server {
            operation: "update",
            status: 500,
            message: "Failed to update sequence".to_string(),
        });
        assert!(matches!(
            workspace.complete(&second[0], failed),
            SyncOutcome::Failed(_)
        ));
        assert_eq!(titles(&workspace, "s1"), vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn create_validates_before_calling_service() {
        let mut workspace = loaded(vec![], ReorderOptions::default()).await;

        let invalid = CreateSequenceData::new("", "desc", vec![step("A", 1)]);
        let err = workspace.create(&invalid).await.unwrap_err();
        assert!(matches!(err, SyncError::ValidationError { .. }));
        assert!(workspace.store().is_empty());

        let valid = CreateSequenceData::new("Rust hiring", "Senior engineers", vec![step("A", 1)]);
        let created = workspace.create(&valid).await.unwrap();
        assert_eq!(workspace.store().get(&created.id).unwrap().title, "Rust hiring");
    }

    #[tokio::test]
    async fn delete_and_toggle_active_update_store() {
        let mut workspace = loaded(
            vec![
                sequence("s1", vec![step("A", 1)]),
                sequence("s2", vec![step("B", 1)]),
            ],
            ReorderOptions::default(),
        )
        .await;

        let updated = workspace.set_active("s2", false).await.unwrap();
        assert!(!updated.is_active);
        assert!(!workspace.store().get("s2").unwrap().is_active);

        workspace.delete("s1").await.unwrap();
        assert!(workspace.store().get("s1").is_none());
        assert_eq!(workspace.store().tracked(), 1);

        // second delete surfaces the server error
        assert!(workspace.delete("s1").await.is_err());
    }

    #[tokio::test]
    async fn generated_sequence_is_added_to_store() {
        let mut workspace = loaded(vec![], ReorderOptions::default()).await;

        assert!(workspace.generate("  ").await.is_err());

        let generated = workspace.generate("Reach out to Rust devs").await.unwrap();
        assert_eq!(workspace.store().len(), 1);
        assert_eq!(workspace.cards()[0].sequence_id, generated.id);
    }
}
