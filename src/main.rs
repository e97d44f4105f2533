use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::{Connection, OpenFlags};
use series_detect::config::Settings;
use series_detect::progress::{create_spinner, format_duration, set_log_only};
use series_detect::safety::validate_output_path;
use series_detect::{aggregate_tagged, detect_series, load_snapshot, DetectOptions, SeriesGroup};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "series-detect")]
#[command(about = "Detect podcast and radio show series in a music library database")]
struct Args {
    /// Library database containing the `tracks` table
    database: PathBuf,

    /// Minimum tracks to form a series
    #[arg(long, default_value = "2")]
    min_tracks: usize,

    /// Group already tagged tracks too instead of matching orphans against them
    #[arg(long)]
    include_tagged: bool,

    /// List tagged series instead of detecting new ones
    #[arg(long)]
    tagged: bool,

    /// Directory holding settings.json
    #[arg(long, env = "CONFIG_DIR", default_value = "/config")]
    config_dir: PathBuf,

    /// Override the minimum duration filter from settings.json
    #[arg(long)]
    min_duration_minutes: Option<u32>,

    /// Write JSON here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,

    /// Hide progress bars (for tail-friendly logs)
    #[arg(long)]
    log_only: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn write_output(groups: &[SeriesGroup], args: &Args) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(groups)
    } else {
        serde_json::to_string(groups)
    }
    .context("Failed to serialize groups")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} groups to {}", groups.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();
    set_log_only(args.log_only);

    if let Some(output) = &args.output {
        validate_output_path(output, &args.database)?;
    }

    let start = Instant::now();

    let mut settings = Settings::load(&args.config_dir)?;
    if let Some(minutes) = args.min_duration_minutes {
        settings.min_duration_minutes = minutes;
    }
    let options = DetectOptions {
        min_tracks: args.min_tracks,
        include_tagged: args.include_tagged,
        min_duration_sec: settings.min_duration_sec(),
    };
    info!(
        min_tracks = options.effective_min_tracks(),
        include_tagged = options.include_tagged,
        min_duration_minutes = settings.min_duration_minutes,
        "Options"
    );

    info!("Opening library database: {:?}", args.database);
    let conn = Connection::open_with_flags(&args.database, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .context("Failed to open library database")?;
    let tracks = load_snapshot(&conn)?;
    drop(conn);

    let spinner = create_spinner(if args.tagged {
        "Collecting tagged series"
    } else {
        "Detecting series"
    });
    let groups = if args.tagged {
        aggregate_tagged(&tracks, &options)
    } else {
        detect_series(&tracks, &options)
    };
    spinner.finish_and_clear();

    write_output(&groups, &args)?;

    let grouped: usize = groups.iter().map(|g| g.track_count).sum();
    info!(
        "Done: {} groups covering {} of {} tracks in {}",
        groups.len(),
        grouped,
        tracks.len(),
        format_duration(start.elapsed())
    );

    Ok(())
}
