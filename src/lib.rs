pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;

pub use adapters::http::HttpSequenceService;
pub use config::ClientConfig;
pub use core::{
    projection::{project, CardId, StepCard},
    reconciler::{plan_move, plan_step_edit, CrossSequencePolicy, ReorderOptions, ReorderPlan},
    store::SequenceStore,
    workspace::{SyncReport, Workspace},
};
pub use domain::model::{
    CreateSequenceData, ListSequencesParams, Sequence, SequenceStatus, Step, StepEdit, StepType,
    UpdateSequenceData,
};
pub use utils::error::{Result, SyncError};
