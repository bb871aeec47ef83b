use campaign_sync::config::cli::{Command, ListArgs};
use campaign_sync::utils::error::ErrorSeverity;
use campaign_sync::utils::{logger, validation::Validate};
use campaign_sync::{
    CardId, Cli, CreateSequenceData, HttpSequenceService, Sequence, SyncError, SyncReport,
    Workspace,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(config.logging.verbose, config.logging.json);
    tracing::debug!("Client config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let service = HttpSequenceService::from_config(&config)?;
    tracing::info!("Using campaign API at {}", service.base_url());
    let mut workspace = Workspace::new(service, config.reorder_options());

    if let Err(e) = run(&mut workspace, &cli.command).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(
    workspace: &mut Workspace<HttpSequenceService>,
    command: &Command,
) -> Result<(), SyncError> {
    match command {
        Command::List(args) => {
            workspace.load(&args.params()).await?;
            for sequence in workspace.store().sequences() {
                print_sequence(sequence);
            }
        }
        Command::Cards(args) => {
            workspace.load(&args.params()).await?;
            print_cards(workspace);
        }
        Command::Move {
            source,
            target,
            list,
            ..
        } => {
            load(workspace, list).await?;
            let report = workspace
                .move_card(&CardId::from(source.as_str()), &CardId::from(target.as_str()))
                .await?;
            print_report(&report);
            print_cards(workspace);
        }
        Command::EditStep { card, list, .. } | Command::DeleteStep { card, list } => {
            load(workspace, list).await?;
            if let Some(edit) = command.step_edit() {
                let report = workspace
                    .edit_step(&CardId::from(card.as_str()), &edit)
                    .await?;
                print_report(&report);
                print_cards(workspace);
            }
        }
        Command::Create { file } => {
            let content = std::fs::read_to_string(file)?;
            let data: CreateSequenceData = serde_json::from_str(&content)?;
            let created = workspace.create(&data).await?;
            print_sequence(&created);
        }
        Command::Delete { id } => {
            workspace.delete(id).await?;
            println!("🗑️ Deleted {}", id);
        }
        Command::Activate { id } => {
            let updated = workspace.set_active(id, true).await?;
            print_sequence(&updated);
        }
        Command::Deactivate { id } => {
            let updated = workspace.set_active(id, false).await?;
            print_sequence(&updated);
        }
        Command::Generate { prompt } => {
            let generated = workspace.generate(prompt).await?;
            print_sequence(&generated);
        }
        Command::Rewrite { id, prompt } => {
            let edited = workspace.edit_with_prompt(id, prompt).await?;
            print_sequence(&edited);
        }
    }
    Ok(())
}

async fn load(
    workspace: &mut Workspace<HttpSequenceService>,
    list: &ListArgs,
) -> Result<(), SyncError> {
    let count = workspace.load(&list.params()).await?;
    tracing::debug!("Working on {} sequences", count);
    Ok(())
}

fn print_sequence(sequence: &Sequence) {
    println!(
        "{}  {} [{}{}] - {} steps",
        sequence.id,
        sequence.title,
        sequence.status,
        if sequence.is_active { ", active" } else { "" },
        sequence.steps.len()
    );
}

fn print_cards(workspace: &Workspace<HttpSequenceService>) {
    for card in workspace.cards() {
        println!(
            "{:<40} {:>3}d  {:?}  {}",
            card.id.as_str(),
            card.step.delay_days,
            card.step.step_type,
            card.step.step_title
        );
    }
}

fn print_report(report: &SyncReport) {
    if report.is_noop() {
        println!("Nothing to save");
        return;
    }
    for id in &report.synced {
        println!("✅ Saved {}", id);
    }
    for id in &report.stale {
        println!("⏭️ Skipped stale response for {}", id);
    }
    for (id, err) in &report.failed {
        println!("❌ Failed to save {}: {}", id, err.user_friendly_message());
    }
}
