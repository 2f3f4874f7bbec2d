//! abctab - notes, transposition and tablature for ABC tunes
//!
//! Subcommands:
//! - `abctab notes <input>` - Resolved notes and barlines
//! - `abctab transpose <input> <semitones>` - Transposed ABC text
//! - `abctab tab <input>` - Whistle or fiddle tablature
//! - `abctab finger <note>` - Fingering for a single note
//! - `abctab recommend <input>` - Which whistle to pick up
//! - `abctab config` - Effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tabconf::TabConfig;

mod commands;

#[derive(Parser)]
#[command(name = "abctab")]
#[command(about = "Notes, transposition and whistle/fiddle tablature for ABC tunes")]
#[command(version)]
struct Cli {
    /// Config file used instead of ./abctab.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the notes of a tune with accidentals resolved
    Notes {
        /// ABC file, or - for stdin
        input: String,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transpose a tune by a number of semitones
    Transpose {
        /// ABC file, or - for stdin
        input: String,

        /// Semitones to move, negative for down
        #[arg(allow_negative_numbers = true)]
        semitones: i32,

        /// Read unmarked notes from the key signature only, ignoring
        /// accidentals earlier in the bar
        #[arg(long)]
        key_only: bool,
    },

    /// Print tablature for a tune
    Tab {
        /// ABC file, or - for stdin
        input: String,

        /// whistle, whistle:<key>, fiddle or violin
        #[arg(short, long)]
        instrument: Option<String>,

        /// Whistle key (D, C, G, A, Bb, F, Eb)
        #[arg(short, long)]
        key: Option<String>,

        /// Leave out fingerings that repeat the previous note's
        #[arg(long)]
        skip_repeated: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the fingering for one note, e.g. ^c or F,
    Finger {
        note: String,

        /// whistle, whistle:<key>, fiddle or violin
        #[arg(short, long)]
        instrument: Option<String>,

        /// Whistle key (D, C, G, A, Bb, F, Eb)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Recommend a whistle for a tune
    Recommend {
        /// ABC file, or - for stdin
        input: String,
    },

    /// Show the effective configuration and where it came from
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = TabConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
    tracing::debug!(files = ?sources.files, env = ?sources.env_overrides, "config loaded");

    match cli.command {
        Commands::Notes { input, json } => {
            commands::notes(&input, json)?;
        }
        Commands::Transpose {
            input,
            semitones,
            key_only,
        } => {
            commands::transpose(&input, semitones, key_only, &config)?;
        }
        Commands::Tab {
            input,
            instrument,
            key,
            skip_repeated,
            json,
        } => {
            commands::tab(
                &input,
                commands::TabArgs {
                    instrument: instrument.as_deref(),
                    key: key.as_deref(),
                    skip_repeated,
                    json,
                },
                &config,
            )?;
        }
        Commands::Finger {
            note,
            instrument,
            key,
        } => {
            commands::finger(&note, instrument.as_deref(), key.as_deref(), &config)?;
        }
        Commands::Recommend { input } => {
            commands::recommend(&input)?;
        }
        Commands::Config => {
            commands::show_config(&config, &sources);
        }
    }

    Ok(())
}
