use crate::config::toml_config::ClientConfig;
use crate::core::reconciler::CrossSequencePolicy;
use crate::domain::model::{ListSequencesParams, SequenceStatus, StepEdit, StepType};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "campaign-sync")]
#[command(about = "Manage recruiting campaign sequences and reorder their steps")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the API base URL from the config
    #[arg(long)]
    pub api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List sequences
    List(ListArgs),
    /// Show the flat list of step cards
    Cards(ListArgs),
    /// Move a step card onto the position of another card
    Move {
        source: String,
        target: String,
        /// Allow moving a step into another sequence
        #[arg(long)]
        reparent: bool,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Edit the fields of one step
    EditStep {
        card: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        delay: Option<String>,
        #[arg(long = "type")]
        step_type: Option<StepType>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Remove one step and renumber the rest
    DeleteStep {
        card: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a sequence from a JSON file
    Create { file: PathBuf },
    /// Delete a sequence
    Delete { id: String },
    /// Mark a sequence active
    Activate { id: String },
    /// Mark a sequence inactive
    Deactivate { id: String },
    /// Ask the assistant to draft a sequence
    Generate { prompt: String },
    /// Ask the assistant to rewrite an existing sequence
    Rewrite { id: String, prompt: String },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub offset: Option<u32>,
    /// Include inactive sequences
    #[arg(long)]
    pub all: bool,
    #[arg(long)]
    pub status: Option<SequenceStatus>,
}

impl ListArgs {
    pub fn params(&self) -> ListSequencesParams {
        ListSequencesParams {
            limit: self.limit,
            offset: self.offset,
            active_only: self.all.then_some(false),
            status: self.status,
        }
    }
}

impl Cli {
    /// 載入配置並套用命令列覆蓋設定
    pub fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Command::Move { reparent: true, .. } = self.command {
            config.reorder.cross_sequence = CrossSequencePolicy::Reparent;
        }
        config.logging.verbose |= self.verbose;
        config.logging.json |= self.json_logs;
        Ok(config)
    }
}

impl Command {
    pub fn step_edit(&self) -> Option<StepEdit> {
        match self {
            Command::EditStep {
                title,
                content,
                delay,
                step_type,
                ..
            } => Some(StepEdit {
                step_title: title.clone(),
                content: content.clone(),
                delay_days: delay.clone(),
                step_type: *step_type,
                delete: false,
            }),
            Command::DeleteStep { .. } => Some(StepEdit::delete()),
            _ => None,
        }
    }
}
