use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use piano_analytics::analysis::{CachedAnalyzer, DEFAULT_TOP_K};
use piano_analytics::model::{NoteEvent, Song, DEFAULT_VELOCITY};
use piano_analytics::pipeline::{NoteRequest, DEFAULT_RECENT_WINDOW};
use piano_analytics::store::MemoryStore;
use piano_analytics::{AnalyticsConfig, AnalyticsPipeline, MelodyAnalyzer, PatternAnalyzer};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "piano-analytics")]
#[command(about = "Melody statistics and next-note prediction for piano note streams", long_about = None)]
struct Args {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Maximum prediction candidates
    #[arg(long, global = true, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print melody statistics for a note sequence
    Analyze {
        /// Key numbers in play order
        #[arg(allow_negative_numbers = true)]
        notes: Vec<i32>,

        /// Read the notes from a song JSON file instead
        #[arg(short = 'f', long, conflicts_with = "notes")]
        file: Option<String>,
    },

    /// Predict the next note after a sequence (most recent note last)
    Predict {
        /// Key numbers in play order
        #[arg(allow_negative_numbers = true)]
        notes: Vec<i32>,
    },

    /// Feed a JSON array of note events through the pipeline
    Replay {
        /// Note events file
        #[arg(short = 'e', long)]
        events: String,

        /// Store snapshot to load before and write after the replay
        #[arg(short = 's', long)]
        store: Option<String>,

        /// Report analytics for this user (default: every user in the file)
        #[arg(short = 'u', long)]
        user: Option<String>,

        /// Recent notes seen by the predictor
        #[arg(long, default_value_t = DEFAULT_RECENT_WINDOW)]
        window: usize,

        /// Velocity for events that omit one
        #[arg(long, default_value_t = DEFAULT_VELOCITY)]
        velocity: f32,
    },

    /// Analyze every song JSON file under a directory
    Batch {
        /// Directory to scan
        dir: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let analyzer = MelodyAnalyzer::new().with_top_k(args.top_k);

    match args.command {
        Command::Analyze { notes, file } => {
            let notes = match file {
                Some(path) => read_song(&expand(&path))?.notes,
                None => notes,
            };
            let analysis = analyzer.analyze_melody(&notes);
            if analysis.is_empty() {
                log::warn!("No notes given, nothing to analyze");
            }
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Predict { notes } => {
            let prediction = analyzer.predict_next(&notes);
            if prediction.is_empty() {
                log::info!("Not enough history to predict after {:?}", notes.last());
            }
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Command::Replay {
            events,
            store,
            user,
            window,
            velocity,
        } => {
            let config = AnalyticsConfig::new()
                .with_recent_window(window)
                .with_default_velocity(velocity);
            replay(analyzer, config, &expand(&events), store.map(|s| expand(&s)), user)?
        }
        Command::Batch { dir } => batch(analyzer, &expand(&dir))?,
    }

    Ok(())
}

/// Expand ~ in a user-supplied path
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn read_song(path: &Path) -> Result<Song> {
    let data = fs::read_to_string(path).with_context(|| format!("Failed to read song: {:?}", path))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid song JSON: {:?}", path))
}

fn replay(
    analyzer: MelodyAnalyzer,
    config: AnalyticsConfig,
    events_path: &Path,
    store_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let data = fs::read_to_string(events_path)
        .with_context(|| format!("Failed to read events: {:?}", events_path))?;
    let requests: Vec<NoteRequest> = serde_json::from_str(&data)
        .with_context(|| format!("Invalid events JSON: {:?}", events_path))?;

    let store = match &store_path {
        Some(path) => MemoryStore::load(path)?,
        None => MemoryStore::new(),
    };

    let mut pipeline = AnalyticsPipeline::new(config, CachedAnalyzer::new(analyzer), store);

    log::info!("Replaying {} note events...", requests.len());

    let mut users: Vec<String> = Vec::new();
    for request in requests {
        let event: NoteEvent = pipeline.event_from_request(request);
        if !users.contains(&event.user_id) {
            users.push(event.user_id.clone());
        }

        let outcome = pipeline.process_note(event)?;
        match outcome.prediction.best() {
            Some(best) => log::debug!(
                "key {} -> next {} (p={:.2})",
                outcome.key_number,
                best.note,
                best.probability
            ),
            None => log::debug!("key {} -> no prediction", outcome.key_number),
        }
    }

    log::info!(
        "Prediction cache: {} hits, {} misses",
        pipeline.analyzer().hits(),
        pipeline.analyzer().misses()
    );

    let report_users = match user {
        Some(u) => vec![u],
        None => users,
    };
    for user_id in &report_users {
        let report = pipeline.user_analytics(user_id);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(path) = store_path {
        pipeline.into_store().save(&path)?;
        log::info!("Store snapshot written to {:?}", path);
    }

    Ok(())
}

fn batch(analyzer: MelodyAnalyzer, dir: &Path) -> Result<()> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("Failed to scan {:?}", dir))?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "json") {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    let mut songs = Vec::new();
    for path in &paths {
        match read_song(path) {
            Ok(song) => songs.push(song),
            Err(e) => log::warn!("Skipping {:?}: {:#}", path, e),
        }
    }

    let pipeline = AnalyticsPipeline::new(AnalyticsConfig::new(), analyzer, MemoryStore::new());
    let results = pipeline.analyze_batch(&songs);

    for (song, analysis) in songs.iter().zip(&results) {
        println!(
            "{}\t{} notes\trange {}\tunique {}\tcomplexity {:.3}",
            song.song_name,
            song.notes.len(),
            analysis.pitch_range,
            analysis.unique_note_count,
            analysis.complexity_score
        );
    }

    log::info!("Analyzed {} of {} files", songs.len(), paths.len());
    Ok(())
}
