// src/main.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aari::commands::HELP_TEXT;
use aari::{
    AssistantApp, AssistantResponse, Command, CommandPipeline, MetaCommand, PipelineConfig,
    SimulationConfig, Speaker,
};
use aari_config::{AariConfig, ConfigLoader, ConfigValidator};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// aari - a text-driven personal assistant
#[derive(Parser, Debug)]
#[command(name = "aari")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify plain-English commands and route them to task handlers")]
struct Cli {
    /// Configuration file; missing files fall back to defaults
    #[arg(short, long, default_value = "config/aari.toml")]
    config: PathBuf,

    /// Name used in greetings
    #[arg(short, long)]
    user_name: Option<String>,

    /// Handle a single utterance and exit
    #[arg(long, conflicts_with = "script")]
    once: Option<String>,

    /// Replay one utterance per line from a file and exit
    #[arg(long)]
    script: Option<PathBuf>,

    /// Delay between scripted utterances
    #[arg(long, default_value_t = 250)]
    interval_ms: u64,

    /// Print full responses as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(name) = &cli.user_name {
        config.router.user_name = name.clone();
    }
    ConfigValidator::validate(&config).context("invalid configuration")?;

    init_logging(&config.app.log_level)?;

    info!("Starting aari v{}", env!("CARGO_PKG_VERSION"));

    let app = Arc::new(AssistantApp::new(config).await?);

    if let Some(utterance) = &cli.once {
        let response = app.respond(utterance).await;
        print_response(&response, cli.json)?;
        return Ok(());
    }

    if let Some(script) = &cli.script {
        return run_script(app, script, cli.interval_ms, cli.json).await;
    }

    let mut pipeline = CommandPipeline::new(PipelineConfig::default(), app.clone());
    pipeline.start().await?;

    let result = run_repl(&app, &pipeline, cli.json).await;

    pipeline.stop().await?;
    info!("aari shut down successfully");
    result
}

fn init_logging(default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn load_config(path: &Path) -> Result<AariConfig> {
    ConfigLoader::load(Some(path))
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

async fn run_script(app: Arc<AssistantApp>, path: &Path, interval_ms: u64, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let scripted_commands: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    let expected = scripted_commands.len();

    let config = PipelineConfig {
        simulation: SimulationConfig {
            enabled: true,
            scripted_commands,
            interval_ms,
        },
    };
    let mut pipeline = CommandPipeline::new(config, app);
    pipeline.start().await?;
    let mut responses = pipeline
        .take_response_receiver()
        .context("response receiver already taken")?;

    for _ in 0..expected {
        match responses.recv().await {
            Some(response) => print_response(&response, json)?,
            None => {
                warn!("Pipeline closed before the script finished");
                break;
            }
        }
    }

    pipeline.stop().await?;
    Ok(())
}

async fn run_repl(app: &AssistantApp, pipeline: &CommandPipeline, json: bool) -> Result<()> {
    println!("aari is ready. Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        announce_due_reminders(app).await;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        match Command::parse(&line) {
            None => continue,
            Some(Command::Utterance(text)) => match pipeline.submit(text).await {
                Ok(response) => print_response(&response, json)?,
                Err(e) => {
                    error!("Pipeline error: {}", e);
                    break;
                }
            },
            Some(Command::Meta(MetaCommand::Quit)) => break,
            Some(Command::Meta(meta)) => handle_meta(app, meta).await?,
        }
    }

    Ok(())
}

async fn handle_meta(app: &AssistantApp, command: MetaCommand) -> Result<()> {
    match command {
        MetaCommand::Help => println!("{}", HELP_TEXT),
        MetaCommand::Quit => {}
        MetaCommand::History => {
            for turn in app.history() {
                let who = match turn.speaker {
                    Speaker::User => "you",
                    Speaker::Assistant => "aari",
                };
                println!("[{}] {}: {}", turn.timestamp.format("%H:%M:%S"), who, turn.text);
            }
        }
        MetaCommand::ClearHistory => {
            app.clear_history();
            println!("History cleared.");
        }
        MetaCommand::Stats => {
            let health = app.metrics().get_health_status();
            println!("{}", serde_json::to_string_pretty(&health)?);
            if let Some(stats) = app.action_stats() {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
        }
        MetaCommand::Metrics => print!("{}", app.metrics().get_prometheus_metrics()?),
        MetaCommand::Contacts => {
            let contacts = app.contacts().await?;
            if contacts.is_empty() {
                println!("No contacts saved. Add one with /contact <name> <phone>.");
            }
            for contact in contacts {
                println!("{}: {}", contact.name, contact.phone);
            }
        }
        MetaCommand::AddContact { name, phone, email } => {
            match app.add_contact(&name, &phone, email.as_deref()).await {
                Ok(message) => println!("{}", message),
                Err(e) => println!("Could not save contact: {}", e),
            }
        }
        MetaCommand::Reminders => {
            if !announce_due_reminders(app).await {
                println!("No reminders are due.");
            }
        }
        MetaCommand::Invalid(hint) => println!("{}", hint),
    }

    Ok(())
}

/// Prints reminders that have come due; returns whether any were shown.
async fn announce_due_reminders(app: &AssistantApp) -> bool {
    match app.take_due_reminders(Utc::now()).await {
        Ok(due) => {
            for reminder in &due {
                println!("Reminder: {}", reminder.text);
            }
            !due.is_empty()
        }
        Err(e) => {
            warn!("Could not check reminders: {}", e);
            false
        }
    }
}

fn print_response(response: &AssistantResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(response)?);
    } else {
        println!("aari: {}", response.reply);
    }
    Ok(())
}
