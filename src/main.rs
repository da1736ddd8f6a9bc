// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use trend_harvest::utils::logging::{format_error, format_info, format_success, format_warning};
use trend_harvest::{
    AiOverrides, AiSettingsView, Category, Config, Enhancer, GithubClient, HistoryLedger, Project,
    ReadmeLookup, RefreshOptions, RefreshPipeline, ReportExporter, SettingsStore, SnapshotStats,
    SnapshotStore, TaskPoll, Validator,
};

#[derive(Parser)]
#[command(name = "trend_harvest")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Weekly trending GitHub repository aggregator", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, rank, optionally enhance, and persist trending projects
    Refresh {
        #[arg(long, value_name = "DAYS")]
        days: Option<u32>,

        #[arg(long, value_name = "NUM")]
        per_page: Option<u32>,

        #[arg(long, value_name = "NUM")]
        top_k: Option<usize>,

        /// Skip language-model enhancement for this run
        #[arg(long)]
        no_ai: bool,

        #[arg(long)]
        json: bool,
    },

    /// List projects in the current snapshot
    Projects {
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show one project by short or full name
    Project {
        name: String,

        #[arg(long)]
        json: bool,
    },

    /// Aggregate counts over the current snapshot
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Weekly history records
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Write the weekly markdown report
    Report {
        #[arg(short, long, default_value = "./reports")]
        output: PathBuf,

        /// Report date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Fetch a repository README in the background and wait for it
    Readme {
        full_name: String,

        #[arg(long, default_value_t = 30)]
        wait_secs: u64,
    },

    /// Language-model provider checks
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },

    /// Inspect or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum AiAction {
    /// Send a short prompt to the configured provider
    Test,
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    SetAi {
        #[arg(long)]
        provider: String,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        endpoint: Option<String>,

        /// Omit to keep the stored key
        #[arg(long, env = "TREND_HARVEST_AI_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
    ClearAi,
    /// Store a GitHub token; an empty value removes it
    SetGithubToken {
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    trend_harvest::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let base = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    let settings = SettingsStore::new(base.settings_path());
    let mut config = base;
    settings.load().await.apply_to(&mut config);
    config
        .validate()
        .context("Persisted settings produced an invalid configuration")?;

    match cli.command {
        Commands::Refresh {
            days,
            per_page,
            top_k,
            no_ai,
            json,
        } => {
            let options = RefreshOptions {
                days,
                per_page,
                top_k,
                enhance: !no_ai,
                show_progress: !json,
            };
            cmd_refresh(&config, options, json).await?;
        }
        Commands::Projects {
            category,
            language,
            json,
        } => {
            cmd_projects(&config, category.as_deref(), language.as_deref(), json).await?;
        }
        Commands::Project { name, json } => {
            cmd_project(&config, &name, json).await?;
        }
        Commands::Stats { json } => {
            cmd_stats(&config, json).await?;
        }
        Commands::History { action } => {
            cmd_history(&config, action).await?;
        }
        Commands::Report { output, date } => {
            cmd_report(&config, output, date).await?;
        }
        Commands::Readme {
            full_name,
            wait_secs,
        } => {
            cmd_readme(&config, &full_name, Duration::from_secs(wait_secs)).await?;
        }
        Commands::Ai {
            action: AiAction::Test,
        } => {
            cmd_ai_test(&config).await?;
        }
        Commands::Config { action } => {
            cmd_config(&config, &settings, action).await?;
        }
    }

    Ok(())
}

async fn cmd_refresh(config: &Config, options: RefreshOptions, json: bool) -> Result<()> {
    let pipeline =
        RefreshPipeline::new(config.clone()).context("Failed to initialize refresh pipeline")?;

    if pipeline.enhancement_enabled() && options.enhance {
        info!("Enhancement enabled with provider {}", config.ai.provider);
    }

    let outcome = pipeline.run(options).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.success {
        println!("{}", format_success(&outcome.message));
        println!(
            "{}",
            format_info(&format!(
                "{} queries ({} failed), {} items, {} duplicates removed, {} enhanced in {} ms",
                outcome.stats.queries_issued,
                outcome.stats.queries_failed,
                outcome.stats.items_fetched,
                outcome.stats.duplicates_removed,
                outcome.stats.projects_enhanced,
                outcome.stats.duration_ms
            ))
        );
        if outcome.stats.rate_limited {
            println!(
                "{}",
                format_warning("GitHub rate limit reached; configure a token for higher limits")
            );
        }
    } else {
        println!("{}", format_error(&outcome.message));
    }

    if !outcome.success {
        return Err(anyhow::anyhow!("Refresh did not persist its results"));
    }

    Ok(())
}

async fn cmd_projects(
    config: &Config,
    category: Option<&str>,
    language: Option<&str>,
    json: bool,
) -> Result<()> {
    let category = category
        .map(|c| c.parse::<Category>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()?;

    let store = SnapshotStore::new(config.projects_path());
    let snapshot = store.load().await;

    let projects: Vec<&Project> = snapshot
        .projects
        .iter()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .filter(|p| language.is_none_or(|l| p.language.eq_ignore_ascii_case(l)))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("{}", format_warning("No projects stored; run `refresh` first"));
        return Ok(());
    }

    println!(
        "\nSnapshot from {} ({} projects)\n",
        snapshot.timestamp.format("%Y-%m-%d %H:%M UTC"),
        projects.len()
    );
    println!("{}", "=".repeat(80));
    for (idx, project) in projects.iter().enumerate() {
        println!(
            "{:>2}. {:<40} {:>8} stars  {:<8} {}",
            idx + 1,
            project.full_name,
            project.stars,
            project.trend,
            project.category
        );
        println!(
            "    {}",
            Validator::truncate_text(&project.description, 72)
        );
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

fn print_project(project: &Project) {
    println!("\n{} ({})", project.full_name, project.url);
    println!("   Description: {}", project.description);
    println!("   Language:    {}", project.language);
    println!("   Category:    {}", project.category);
    println!("   Trend:       {}", project.trend);
    println!(
        "   Stars: {}  Forks: {}  Open issues: {}",
        project.stars, project.forks, project.issues
    );
    println!("   Fork:   {}", project.fork_url);
    println!("   Issues: {}", project.issues_url);
    println!("   Usage:");
    for step in &project.usage_steps {
        println!("     - {}", step);
    }
}

async fn cmd_project(config: &Config, name: &str, json: bool) -> Result<()> {
    let store = SnapshotStore::new(config.projects_path());
    let project = store
        .find(name)
        .await
        .with_context(|| format!("Project lookup failed for {}", name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else {
        print_project(&project);
    }
    Ok(())
}

async fn cmd_stats(config: &Config, json: bool) -> Result<()> {
    info!("Gathering statistics");

    let store = SnapshotStore::new(config.projects_path());
    let stats = SnapshotStats::from_snapshot(&store.load().await);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("\nTotal projects: {}", stats.total_projects);
    println!("Total stars:    {}", stats.total_stars);
    println!("Total forks:    {}", stats.total_forks);
    println!("Last updated:   {}", stats.last_updated.to_rfc3339());
    println!("\nLanguages:");
    for (language, count) in &stats.languages {
        println!("  {:<24} {}", language, count);
    }
    println!("\nCategories:");
    for (category, count) in &stats.categories {
        println!("  {:<24} {}", category, count);
    }
    Ok(())
}

async fn cmd_history(config: &Config, action: HistoryAction) -> Result<()> {
    let ledger =
        HistoryLedger::with_retention(config.history_path(), config.storage.history_retention);

    match action {
        HistoryAction::List => {
            let history = ledger.list().await;
            if history.is_empty() {
                println!("{}", format_warning("No history recorded yet"));
            }
            for record in history {
                println!(
                    "{:<10} {:<16} {}  {} projects",
                    record.id, record.label, record.date, record.total_projects
                );
            }
        }
        HistoryAction::Show { id, json } => {
            Validator::validate_week_id(&id)?;
            let record = ledger
                .get(&id)
                .await
                .with_context(|| format!("History lookup failed for {}", id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("\n{} ({}), {} projects", record.label, record.date, record.total_projects);
                for project in &record.projects {
                    print_project(project);
                }
            }
        }
        HistoryAction::Delete { id } => {
            Validator::validate_week_id(&id)?;
            ledger
                .delete(&id)
                .await
                .with_context(|| format!("Failed to delete history record {}", id))?;
            println!("{}", format_success(&format!("Deleted history record {}", id)));
        }
    }

    Ok(())
}

async fn cmd_report(config: &Config, output: PathBuf, date: Option<NaiveDate>) -> Result<()> {
    let store = SnapshotStore::new(config.projects_path());
    let snapshot = store.load().await;
    if snapshot.is_empty() {
        warn!("Snapshot is empty; the report will contain no projects");
    }

    let exporter = ReportExporter::new(output);
    let path = exporter
        .export_weekly(&snapshot, date.unwrap_or_else(|| Utc::now().date_naive()))
        .await
        .context("Failed to write weekly report")?;

    println!("{}", format_success(&format!("Report written to {}", path.display())));
    Ok(())
}

async fn cmd_readme(config: &Config, full_name: &str, wait: Duration) -> Result<()> {
    Validator::validate_full_name(full_name)?;

    let client = GithubClient::new(config.github.clone()).context("Failed to create GitHub client")?;
    let lookup = ReadmeLookup::with_ttl(
        Arc::new(client),
        Duration::from_secs(config.lookup.task_ttl_secs),
    );

    let id = lookup.start(full_name).await;
    let started = Instant::now();

    loop {
        match lookup.poll(id).await {
            TaskPoll::Ready(Some(readme)) => {
                println!("{}", readme);
                return Ok(());
            }
            TaskPoll::Ready(None) => {
                println!("{}", format_warning(&format!("{} has no README", full_name)));
                return Ok(());
            }
            TaskPoll::Unknown => {
                return Err(anyhow::anyhow!("README task {} expired", id));
            }
            TaskPoll::Pending if started.elapsed() >= wait => {
                return Err(anyhow::anyhow!(
                    "README for {} not ready after {}s",
                    full_name,
                    wait.as_secs()
                ));
            }
            TaskPoll::Pending => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
}

async fn cmd_ai_test(config: &Config) -> Result<()> {
    let enhancer = Enhancer::from_config(&config.ai).context("AI provider is not configured")?;
    info!(
        "Testing provider {} at {} with model {}",
        enhancer.provider(),
        enhancer.endpoint(),
        enhancer.model()
    );

    match enhancer.probe().await {
        Ok(reply) => {
            println!("{}", format_success("Provider responded"));
            println!("   {}", Validator::truncate_text(reply.trim(), 200));
            Ok(())
        }
        Err(e) => {
            println!("{}", format_error(&format!("Provider test failed: {}", e)));
            Err(e.into())
        }
    }
}

async fn cmd_config(config: &Config, settings: &SettingsStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let view = AiSettingsView::from_config(config);
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "ai": view,
                "github": {
                    "api_base": config.github.api_base,
                    "has_token": config.github.token.is_some(),
                    "lookback_days": config.github.lookback_days,
                    "per_page": config.github.per_page,
                },
                "storage": {
                    "data_dir": config.storage.data_dir,
                    "history_retention": config.storage.history_retention,
                },
                "pipeline": config.pipeline,
            }))?);
        }
        ConfigAction::SetAi {
            provider,
            model,
            endpoint,
            api_key,
        } => {
            if let Some(endpoint) = &endpoint {
                Validator::validate_url(endpoint)?;
            }
            let saved = settings
                .update_ai(AiOverrides {
                    enabled: None,
                    provider: Some(provider),
                    model,
                    endpoint,
                    api_key,
                })
                .await
                .context("Failed to save AI settings")?;
            println!(
                "{}",
                format_success(&format!(
                    "Saved AI settings: provider {}, model {}",
                    saved.provider.as_deref().unwrap_or("qwen"),
                    saved.model.as_deref().unwrap_or("default")
                ))
            );
        }
        ConfigAction::ClearAi => {
            if settings.clear_ai().await.context("Failed to clear AI settings")? {
                println!("{}", format_success("AI settings removed"));
            } else {
                println!("{}", format_info("No AI settings were stored"));
            }
        }
        ConfigAction::SetGithubToken { token } => {
            let has_token = settings
                .set_github_token(&token)
                .await
                .context("Failed to save GitHub settings")?;
            if has_token {
                println!("{}", format_success("GitHub token saved"));
            } else {
                println!("{}", format_success("GitHub token removed"));
            }
        }
    }

    Ok(())
}
