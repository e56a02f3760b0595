//! gml: music theory helpers and cross-app exchange from the command line

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// GML music theory toolkit
#[derive(Parser)]
#[command(name = "gml")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/gml/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a note name or MIDI number
    Note {
        /// e.g. C4, F#3 or 60
        note: String,
    },

    /// Nearest note for a frequency in Hz
    Freq { hz: f64 },

    /// Notes of a scale, or the list of scales
    Scale {
        root: Option<String>,
        #[arg(default_value = "major")]
        pattern: String,
        #[arg(long)]
        list: bool,
    },

    /// Notes of a chord, or the list of chords
    Chord {
        root: Option<String>,
        #[arg(default_value = "major")]
        pattern: String,
        #[arg(long)]
        list: bool,
    },

    /// Name the chord formed by a set of notes
    Analyze {
        #[arg(required = true, num_args = 2..)]
        notes: Vec<String>,
    },

    /// Check two moving voices for parallel fifths or octaves
    Parallels {
        v1_start: String,
        v1_end: String,
        v2_start: String,
        v2_end: String,
    },

    /// Closest-note voice leading between two chords
    VoiceLead {
        /// Comma-separated notes
        #[arg(long, value_delimiter = ',', required = true)]
        from: Vec<String>,
        #[arg(long, value_delimiter = ',', required = true)]
        to: Vec<String>,
        /// fux, schoenberg or rimsky
        #[arg(long)]
        book: Option<String>,
    },

    /// Validate a counterpoint line against a cantus firmus
    Counterpoint {
        #[arg(long, value_delimiter = ',', required = true)]
        cantus: Vec<String>,
        #[arg(long, value_delimiter = ',', required = true)]
        counterpoint: Vec<String>,
        /// Species 1-5
        #[arg(long, default_value_t = 1)]
        species: u8,
    },

    /// Ask the reference books a question
    Ask {
        question: String,
        /// Limit to these books (repeatable)
        #[arg(long)]
        book: Vec<String>,
    },

    /// Book advice for a context (voice_leading, orchestration)
    Recommend { context: String },

    /// Convert between sibling app note formats
    Convert {
        #[command(subcommand)]
        direction: commands::Convert,
    },

    /// List sibling apps and their URLs
    Apps,

    /// Export JSON (file or stdin) to a sibling app
    Export {
        #[arg(long)]
        target: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Import from a URL produced by an export
    Import { url: String },
}

/// `RUST_LOG` plus info for the gml crates
fn log_filter() -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::from_default_env().add_directive("gml=info".parse()?))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(log_filter()?)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref());
    let out = commands::Output { json: cli.json };

    match cli.command {
        Commands::Note { note } => commands::note(out, &note),
        Commands::Freq { hz } => commands::freq(out, hz),
        Commands::Scale { root, pattern, list } => {
            commands::scale(out, &config.build_tables()?, root.as_deref(), &pattern, list)
        }
        Commands::Chord { root, pattern, list } => {
            commands::chord(out, &config.build_tables()?, root.as_deref(), &pattern, list)
        }
        Commands::Analyze { notes } => commands::analyze(out, &config.build_tables()?, &notes),
        Commands::Parallels { v1_start, v1_end, v2_start, v2_end } => {
            commands::parallels(out, [v1_start.as_str(), v1_end.as_str(), v2_start.as_str(), v2_end.as_str()])
        }
        Commands::VoiceLead { from, to, book } => commands::voice_lead(out, &from, &to, book.as_deref()),
        Commands::Counterpoint { cantus, counterpoint, species } => {
            commands::counterpoint(out, &cantus, &counterpoint, species)
        }
        Commands::Ask { question, book } => commands::ask(out, &question, &book),
        Commands::Recommend { context } => commands::recommend(out, &context),
        Commands::Convert { direction } => commands::convert(out, direction),
        Commands::Apps => commands::apps(out, config.exchange.environment),
        Commands::Export { target, file } => commands::export(out, &config, &target, file.as_deref()),
        Commands::Import { url } => commands::import(out, &config, &url),
    }
}
