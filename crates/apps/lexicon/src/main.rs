//! Lexicon - Offline vocabulary cache for a Firestore-backed word list
//!
//! This is the command-line entry point: sync the local cache, browse it,
//! and check or import new words against it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{error, info};
use vocab::import::IMPORT_USER_ID;
use vocab::{
    Candidate, ConnectivityMonitor, EnrichmentField, FirebaseConfig, MatchOutcome, RemoteStore,
    SyncManager, SyncOutcome, SyncSettings, VocabId, VocabSummary, check_one, enrichment_gaps,
    get_vocabulary_detail, list_by_part_of_speech, list_vocabularies, parse_json_rows,
    part_of_speech_counts, plan_import, search_vocabularies,
};

mod app;

use app::LexiconApp;

#[derive(Parser)]
#[command(name = "lexicon")]
#[command(about = "Offline vocabulary cache with Firestore sync", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the local cache database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Firebase web config JSON to use instead of the configured one
    #[arg(long, global = true)]
    firebase_config: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync cycle
    Sync,

    /// Keep syncing on a timer until interrupted
    Watch {
        /// Minutes between cycles (overrides sync.json)
        #[arg(short, long)]
        interval_minutes: Option<u64>,
    },

    /// Show cache and sync status
    Status,

    /// Check whether a word already exists
    Check {
        /// English headword
        english: String,
        /// Part of speech, e.g. "Noun"
        part_of_speech: Option<String>,
    },

    /// Import words from a JSON file, skipping exact duplicates
    Import {
        /// JSON file holding an array of rows or a single row
        file: PathBuf,
        /// Report what would be imported without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List cached words, newest first
    List {
        /// Only this part of speech
        #[arg(short, long)]
        pos: Option<String>,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Search headwords and translations
    Search {
        text: String,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one entry in full
    Show {
        /// Entry ID
        id: String,
    },

    /// List entries with thin optional fields
    Gaps {
        /// Only check this field (repeatable), e.g. "synonyms" or "verbForms"
        #[arg(short, long = "field")]
        fields: Vec<EnrichmentField>,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Forget the sync cursor so the next sync starts over
    ResetSync,

    /// Write Firebase and sync settings to the config directory
    Configure {
        /// Firebase project ID
        #[arg(long)]
        project_id: Option<String>,
        /// Web API key from the Firebase console
        #[arg(long)]
        api_key: Option<String>,
        /// Firestore emulator address, e.g. "localhost:8080"
        #[arg(long)]
        emulator: Option<String>,
        /// Minutes between background sync cycles
        #[arg(long)]
        interval_minutes: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Configure {
            project_id,
            api_key,
            emulator,
            interval_minutes,
        } => configure(project_id, api_key, emulator, interval_minutes),
        command => {
            let app = LexiconApp::open(cli.db.as_deref(), cli.firebase_config.as_deref())?;
            run_with_cache(command, app)
        }
    }
}

fn run_with_cache(command: Commands, app: LexiconApp) -> Result<()> {
    match command {
        Commands::Sync => sync_once(&app),
        Commands::Watch { interval_minutes } => watch(app, interval_minutes),
        Commands::Status => status(&app),
        Commands::Check {
            english,
            part_of_speech,
        } => check(&app, english, part_of_speech),
        Commands::Import { file, dry_run } => import(&app, &file, dry_run),
        Commands::List {
            pos,
            limit,
            offset,
            json,
        } => {
            let entries = match pos {
                Some(pos) => list_by_part_of_speech(app.store.as_ref(), &pos, limit, offset)?,
                None => list_vocabularies(app.store.as_ref(), limit, offset)?,
            };
            print_summaries(&entries, json)
        }
        Commands::Search { text, limit, json } => {
            let hits = search_vocabularies(app.store.as_ref(), &text, limit)?;
            print_summaries(&hits, json)
        }
        Commands::Show { id } => {
            let detail = get_vocabulary_detail(app.store.as_ref(), &VocabId::new(id.clone()))?
                .with_context(|| format!("No entry with id {}", id))?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
            Ok(())
        }
        Commands::Gaps {
            fields,
            limit,
            json,
        } => {
            let mut gaps = enrichment_gaps(&app.store.get_all()?, &fields);
            gaps.truncate(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&gaps)?);
            } else if gaps.is_empty() {
                println!("No entries need enrichment");
            } else {
                for gap in &gaps {
                    let missing: Vec<&str> = gap.missing.iter().map(|f| f.as_str()).collect();
                    println!(
                        "{:<24} {:<12} {}",
                        gap.english,
                        gap.part_of_speech,
                        missing.join(", ")
                    );
                }
            }
            Ok(())
        }
        Commands::ResetSync => {
            app.store
                .delete_sync_metadata(&app.settings.collection)
                .context("Failed to reset sync cursor")?;
            println!(
                "Sync cursor cleared; the next sync pulls up to {} records",
                app.settings.initial_limit
            );
            Ok(())
        }
        Commands::Configure { .. } => Ok(()),
    }
}

fn configure(
    project_id: Option<String>,
    api_key: Option<String>,
    emulator: Option<String>,
    interval_minutes: Option<u64>,
) -> Result<()> {
    if let Some(project_id) = project_id {
        let mut firebase = FirebaseConfig::new(project_id);
        firebase.api_key = api_key;
        if let Some(host) = emulator {
            firebase = firebase.with_emulator(host);
        }
        let path = firebase.save()?;
        println!("Wrote {}", path.display());
    } else if api_key.is_some() || emulator.is_some() {
        anyhow::bail!("--project-id is required when setting Firebase options");
    }

    if let Some(minutes) = interval_minutes {
        let mut settings = SyncSettings::load()?;
        settings.interval_minutes = minutes;
        let path = settings.save()?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn sync_once(app: &LexiconApp) -> Result<()> {
    let client = app.firestore_client()?;
    let monitor = Arc::new(ConnectivityMonitor::new(client.is_reachable()));
    let coordinator = app.coordinator(client, monitor);
    let outcome = coordinator.sync_vocabularies();
    println!("{}", outcome.user_message());

    match outcome {
        SyncOutcome::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

fn watch(mut app: LexiconApp, interval_minutes: Option<u64>) -> Result<()> {
    if let Some(minutes) = interval_minutes {
        app.settings.interval_minutes = minutes;
    }

    let client = app.firestore_client()?;
    let monitor = Arc::new(ConnectivityMonitor::new(true));
    let coordinator = Arc::new(app.coordinator(client.clone(), monitor.clone()));
    let manager = SyncManager::new(coordinator, monitor.subscribe()).with_reachability_check(
        monitor,
        client,
        app.settings.reachability_check_interval(),
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    manager.start(runtime.handle());
    info!("Watching for vocabulary changes, press Ctrl-C to stop");

    runtime.block_on(async {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")
    })?;

    manager.stop();
    // Let an in-flight cycle finish its local writes
    runtime.shutdown_timeout(Duration::from_secs(10));
    Ok(())
}

fn status(app: &LexiconApp) -> Result<()> {
    let count = app.store.count_entries()?;
    println!("Database:   {}", app.db_path.display());
    println!("Entries:    {}", count);

    match app.store.get_sync_metadata(&app.settings.collection)? {
        Some(meta) => println!(
            "Last sync:  {} ({} minutes ago)",
            meta.last_synced_at.to_rfc3339(),
            meta.age().num_minutes()
        ),
        None => println!("Last sync:  never"),
    }

    println!(
        "Firebase:   {}",
        if app.firebase_available() {
            "configured"
        } else {
            "not configured"
        }
    );

    let counts = part_of_speech_counts(app.store.as_ref())?;
    if !counts.is_empty() {
        println!();
        for (label, n) in counts {
            println!("  {:<16} {}", label, n);
        }
    }
    Ok(())
}

fn check(app: &LexiconApp, english: String, part_of_speech: Option<String>) -> Result<()> {
    let corpus = app.store.get_all()?;
    let candidate = Candidate {
        english: Some(english),
        part_of_speech,
    };
    let result = check_one(&candidate, &corpus);

    println!("{}", result.message);
    for entry in &result.matches {
        println!(
            "  {:<10} {} ({}) {}",
            entry.id, entry.english, entry.part_of_speech, entry.bangla
        );
    }

    if result.outcome == MatchOutcome::ExactDuplicate {
        std::process::exit(2);
    }
    Ok(())
}

fn import(app: &LexiconApp, file: &Path, dry_run: bool) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let rows = parse_json_rows(&json)?;

    let plan = plan_import(rows, &app.store.get_all()?);
    for check in plan.checks.iter().filter(|c| c.outcome != MatchOutcome::NoMatch) {
        println!("  {}", check.message);
    }
    println!(
        "{} rows: {} new, {} duplicates, {} same word with another part of speech",
        plan.stats.total,
        plan.stats.unique,
        plan.stats.duplicates,
        plan.stats.same_word_different_pos
    );

    if dry_run {
        return Ok(());
    }

    let now = Utc::now();
    let batch = now.timestamp_millis();
    let entries = plan
        .accepted
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let id = VocabId::new(format!("import-{}-{}", batch, i));
            row.into_entry(id, IMPORT_USER_ID, now)
        })
        .collect::<Result<Vec<_>>>()?;

    let stored = app.store.bulk_upsert(entries)?;
    info!("Imported {} vocabularies into {}", stored, app.db_path.display());
    println!("Imported {} entries", stored);
    Ok(())
}

fn print_summaries(entries: &[VocabSummary], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }
    for entry in entries {
        println!(
            "{:<24} {:<12} {:<24} {}",
            entry.english,
            entry.part_of_speech,
            entry.bangla,
            entry.id
        );
    }
    Ok(())
}
