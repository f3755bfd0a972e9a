//! Harmony CLI - Command-line interface for Mood Harmony
//!
//! Commands:
//! - sector: Map an angle to its mood sector
//! - simulate: Replay pointer events through a mood wheel (NDJSON in/out)
//! - render: Write every sector panel and the wheel as SVG
//! - chords: Render a culture's chord network
//! - cultures: List the culture catalog
//! - doctor: Check configuration and data files

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use mood_harmony::dataset::buckets::EmotionClusterFile;
use mood_harmony::dataset::{read_json, ChordLibrary, DataStatus, SectorDatasetIndex};
use mood_harmony::geometry::sector_range;
use mood_harmony::types::{CULTURES, SECTOR_COUNT};
use mood_harmony::{
    GalleryConfig, HarmonyError, MoodGallery, MoodSample, MoodWheel, PointerEvent, HARMONY_VERSION,
    PRODUCER_NAME,
};

/// Harmony - mood wheel sectors and music-distribution charts
#[derive(Parser)]
#[command(name = "harmony")]
#[command(author = "Team Apple-Pie-Chart")]
#[command(version = HARMONY_VERSION)]
#[command(about = "Map moods to sectors and render their music distributions", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map an angle to its mood sector
    Sector {
        /// Angle, counter-clockwise from 3 o'clock
        #[arg(allow_hyphen_values = true)]
        angle: f64,

        /// Interpret the angle as degrees instead of radians
        #[arg(long)]
        degrees: bool,
    },

    /// Replay pointer events through a mood wheel
    Simulate {
        /// NDJSON pointer events (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// NDJSON notifications (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Leave a hover preview that is still pending at end of input unfired
        #[arg(long)]
        no_flush: bool,
    },

    /// Write every sector panel and the wheel as SVG
    Render {
        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Emotion cluster file (overrides config)
        #[arg(long)]
        emotion: Option<PathBuf>,

        /// Key-count file (overrides config)
        #[arg(long)]
        key_counts: Option<PathBuf>,
    },

    /// Render a culture's chord network
    Chords {
        /// Culture id, see `harmony cultures`
        culture: String,

        /// Directory of <culture>.json graphs (overrides config)
        #[arg(long)]
        chords_dir: Option<PathBuf>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// List the culture catalog
    Cultures {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check configuration and data files
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), HarmonyCliError> {
    match cli.command {
        Commands::Sector { angle, degrees } => cmd_sector(angle, degrees),

        Commands::Simulate {
            input,
            output,
            no_flush,
        } => {
            let config = GalleryConfig::load_or_default(cli.config.as_deref())?;
            cmd_simulate(&config, &input, &output, !no_flush)
        }

        Commands::Render {
            out_dir,
            emotion,
            key_counts,
        } => {
            let mut config = GalleryConfig::load_or_default(cli.config.as_deref())?;
            if let Some(path) = emotion {
                config.data.emotion_clusters = path;
            }
            if let Some(path) = key_counts {
                config.data.key_counts = Some(path);
            }
            cmd_render(config, &out_dir)
        }

        Commands::Chords {
            culture,
            chords_dir,
            output,
        } => {
            let mut config = GalleryConfig::load_or_default(cli.config.as_deref())?;
            if let Some(dir) = chords_dir {
                config.data.chords_dir = dir;
            }
            cmd_chords(&config, &culture, &output)
        }

        Commands::Cultures { json } => cmd_cultures(json),

        Commands::Doctor { json } => cmd_doctor(cli.config.as_deref(), json),
    }
}

fn cmd_sector(angle: f64, degrees: bool) -> Result<(), HarmonyCliError> {
    let radians = if degrees { angle.to_radians() } else { angle };
    let sample = MoodSample::from_angle(radians);
    let (start, end) = sector_range(sample.sector);

    let report = serde_json::json!({
        "sample": sample,
        "label": sample.sector.label(),
        "color": sample.sector.color(),
        "data_key": sample.sector.data_key(),
        "range_degrees": [start.to_degrees(), end.to_degrees()],
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_simulate(config: &GalleryConfig, input: &Path, output: &Path, flush: bool) -> Result<(), HarmonyCliError> {
    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(fs::File::open(input)?))
    };
    let mut writer: Box<dyn Write> = if output.to_string_lossy() == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(fs::File::create(output)?)
    };

    let mut wheel = MoodWheel::from_config(&config.wheel);
    let mut handled = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: PointerEvent = serde_json::from_str(trimmed).map_err(|e| {
            HarmonyCliError::ParseError(format!("line {}: invalid pointer event: {}", line_no + 1, e))
        })?;
        for note in wheel.handle(&event) {
            writeln!(writer, "{}", serde_json::to_string(&note)?)?;
        }
        handled += 1;
    }

    if handled == 0 {
        return Err(HarmonyCliError::NoEvents);
    }

    if flush {
        if let Some(deadline) = wheel.next_deadline() {
            for note in wheel.tick(deadline) {
                writeln!(writer, "{}", serde_json::to_string(&note)?)?;
            }
        }
    }
    writer.flush()?;

    tracing::debug!(events = handled, committed = wheel.committed().index(), "simulation finished");
    Ok(())
}

fn cmd_render(config: GalleryConfig, out_dir: &Path) -> Result<(), HarmonyCliError> {
    let gallery = MoodGallery::load(config);
    let written = gallery.render_all(out_dir)?;
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_chords(config: &GalleryConfig, culture: &str, output: &Path) -> Result<(), HarmonyCliError> {
    let gallery = MoodGallery::new(
        config.clone(),
        SectorDatasetIndex::new(),
        ChordLibrary::load_dir(&config.data.chords_dir),
    );
    let svg = gallery.chord_chart(culture);

    if output.to_string_lossy() == "-" {
        print!("{}", svg);
    } else {
        fs::write(output, svg)?;
    }
    Ok(())
}

fn cmd_cultures(json: bool) -> Result<(), HarmonyCliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(&CULTURES)?);
    } else {
        for culture in CULTURES.iter() {
            println!("{} {:<26} {}", culture.flag, culture.name, culture.id);
        }
    }
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), HarmonyCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "harmony_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Mood Harmony version {}", HARMONY_VERSION),
    });

    let config = match GalleryConfig::load_or_default(config_path) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: match config_path {
                    Some(path) => format!("Loaded {}", path.display()),
                    None => "Using built-in defaults".to_string(),
                },
            });
            config
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            });
            GalleryConfig::default()
        }
    };

    let emotion_path = &config.data.emotion_clusters;
    match read_json::<EmotionClusterFile>(emotion_path) {
        Ok(_) => {
            let index = SectorDatasetIndex::load(emotion_path, config.data.key_counts.as_deref());
            let populated = index.populated_sectors().len();
            let (status, message) = match index.status() {
                DataStatus::Fallback { reason } => (CheckStatus::Warning, format!("Key counts unavailable: {}", reason)),
                DataStatus::Loaded if populated < SECTOR_COUNT as usize => (
                    CheckStatus::Warning,
                    format!("{} of {} sectors have data", populated, SECTOR_COUNT),
                ),
                DataStatus::Loaded => (CheckStatus::Ok, format!("All {} sectors have data", SECTOR_COUNT)),
            };
            checks.push(DoctorCheck {
                name: "sector_data".to_string(),
                status,
                message,
            });
        }
        Err(e) => checks.push(DoctorCheck {
            name: "sector_data".to_string(),
            status: CheckStatus::Error,
            message: format!("Cannot use {}: {}", emotion_path.display(), e),
        }),
    }

    checks.push(chord_data_check(&config.data.chords_dir));

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (simulate can read events)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: HARMONY_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Harmony Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error)) {
        Err(HarmonyCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn chord_data_check(chords_dir: &Path) -> DoctorCheck {
    let chords = ChordLibrary::load_dir(chords_dir);
    let degraded = chords
        .degraded_ids()
        .into_iter()
        .filter(|id| CULTURES.iter().any(|c| c.id == *id))
        .count();
    DoctorCheck {
        name: "chord_data".to_string(),
        status: if degraded == 0 { CheckStatus::Ok } else { CheckStatus::Warning },
        message: format!(
            "{} of {} culture graphs loaded from {}",
            CULTURES.len() - degraded,
            CULTURES.len(),
            chords_dir.display()
        ),
    }
}

// Error types

#[derive(Debug)]
enum HarmonyCliError {
    Io(io::Error),
    Harmony(HarmonyError),
    Json(serde_json::Error),
    NoEvents,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for HarmonyCliError {
    fn from(e: io::Error) -> Self {
        HarmonyCliError::Io(e)
    }
}

impl From<HarmonyError> for HarmonyCliError {
    fn from(e: HarmonyError) -> Self {
        HarmonyCliError::Harmony(e)
    }
}

impl From<serde_json::Error> for HarmonyCliError {
    fn from(e: serde_json::Error) -> Self {
        HarmonyCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HarmonyCliError> for CliError {
    fn from(e: HarmonyCliError) -> Self {
        match e {
            HarmonyCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HarmonyCliError::Harmony(e @ (HarmonyError::TomlError(_) | HarmonyError::ConfigError(_))) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run `harmony doctor --config <file>` to inspect the configuration".to_string()),
            },
            HarmonyCliError::Harmony(e) => CliError {
                code: "HARMONY_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            HarmonyCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check input is valid JSON".to_string()),
            },
            HarmonyCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No pointer events found in input".to_string(),
                hint: Some("Provide one JSON event per line: {\"kind\":\"move\",\"x\":..,\"y\":..,\"at\":..}".to_string()),
            },
            HarmonyCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            HarmonyCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Debug, PartialEq, serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
