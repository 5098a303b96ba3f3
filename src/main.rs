// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use form_coach::recording::{Recording, ReportExporter};
use form_coach::{CoachConfig, Exercise, FeedbackKind, PoseLayout, Session, SessionFeed};

#[derive(Parser)]
#[command(
    name = "form-coach",
    about = "Counts reps and checks exercise form from pose landmarks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded landmark CSV through a coaching session
    Replay {
        /// Exercise id, e.g. "squat" or "Bicep Curl"
        #[arg(long)]
        exercise: String,

        /// CSV with one row per landmark: frame,timestamp_ms,landmark,x,y,z,visibility
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = LayoutArg::Mediapipe)]
        layout: LayoutArg,

        /// Source video width in pixels (defaults to the config value)
        #[arg(long)]
        width: Option<u32>,

        /// Source video height in pixels (defaults to the config value)
        #[arg(long)]
        height: Option<u32>,

        /// Config file (defaults to the platform config directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write per-frame reports and a summary into this directory
        #[arg(long)]
        export: Option<PathBuf>,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported exercises
    Exercises,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Mediapipe,
    Coco,
}

impl From<LayoutArg> for PoseLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Mediapipe => PoseLayout::MediaPipe,
            LayoutArg::Coco => PoseLayout::Coco,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            exercise,
            input,
            layout,
            width,
            height,
            config,
            export,
            json,
        } => {
            replay(ReplayArgs {
                exercise,
                input,
                layout: layout.into(),
                width,
                height,
                config,
                export,
                json,
            })
            .await
        }
        Command::Exercises => {
            for exercise in Exercise::ALL {
                println!(
                    "{:<16} {:<16} {}",
                    exercise.id(),
                    exercise.name(),
                    exercise.muscle_group()
                );
            }
            Ok(())
        }
    }
}

struct ReplayArgs {
    exercise: String,
    input: PathBuf,
    layout: PoseLayout,
    width: Option<u32>,
    height: Option<u32>,
    config: Option<PathBuf>,
    export: Option<PathBuf>,
    json: bool,
}

async fn replay(args: ReplayArgs) -> Result<()> {
    let config = CoachConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config")?;
    let width = args.width.unwrap_or(config.frame_width);
    let height = args.height.unwrap_or(config.frame_height);

    let recording = Recording::from_path(&args.input, args.layout, width, height)
        .with_context(|| format!("Failed to read recording {}", args.input.display()))?;
    info!(frames = recording.len(), "loaded recording");

    let session = Session::start(&args.exercise, &config);
    if session.selection().is_fallback() {
        eprintln!(
            "Unknown exercise '{}', using {} instead",
            args.exercise,
            session.exercise().name()
        );
    }

    let feed = SessionFeed::spawn(session);
    let mut reports = feed.subscribe();
    let mut exporter = args.export.as_ref().map(|dir| ReportExporter::new(dir, None));

    for recorded in recording.frames {
        feed.push(recorded.frame, recorded.timestamp)
            .await
            .context("Session feed stopped")?;
        let report = reports.recv().await.context("Session feed stopped")?;

        for feedback in &report.accepted {
            let marker = match feedback.kind {
                FeedbackKind::Success => "+",
                FeedbackKind::Warning => "!",
                FeedbackKind::Info => "-",
            };
            println!("[frame {:>5}] {} {}", recorded.number, marker, feedback.text);
        }
        if let Some(exporter) = exporter.as_mut() {
            exporter.add_frame(recorded.number, recorded.timestamp, &report);
        }
    }

    let session = feed.finish().await.context("Session feed stopped")?;
    let snapshot = session.end();

    if let Some(exporter) = exporter {
        let csv_path = exporter.export_csv().context("Failed to export frame reports")?;
        let summary_path = exporter
            .export_summary(&snapshot)
            .context("Failed to export summary")?;
        info!(csv = %csv_path.display(), summary = %summary_path.display(), "exported replay");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "{}: {} reps over {} frames ({:.0}% tracked)",
            snapshot.exercise_name,
            snapshot.reps,
            snapshot.frames,
            snapshot.metrics.tracking_ratio * 100.0
        );
    }

    Ok(())
}
