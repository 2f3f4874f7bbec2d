//! CLI command implementations

use std::io::Read;

use abc::{
    parse_notes_with_feedback, recommend_whistle_key, render_text,
    resolve_fiddle_fingering, tablature, transpose_with, FiddleFingering, Instrument, Pitch,
    RenderOptions, TransposeOptions, WhistleKey,
};
use anyhow::{bail, Context, Result};
use tabconf::{ConfigSources, TabConfig};

/// Read a tune from a file, or stdin for `-`
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
}

/// Print resolved events space separated, feedback on stderr.
pub fn notes(input: &str, json: bool) -> Result<()> {
    let text = read_input(input)?;
    let result = parse_notes_with_feedback(&text);

    for feedback in &result.feedback {
        eprintln!("{}", feedback);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result.value)?);
    } else {
        let tokens: Vec<&str> = result.value.iter().map(|e| e.token()).collect();
        println!("{}", tokens.join(" "));
    }
    Ok(())
}

pub fn transpose(input: &str, semitones: i32, key_only: bool, config: &TabConfig) -> Result<()> {
    let text = read_input(input)?;
    let options = if key_only || !config.transpose.bar_accidentals {
        TransposeOptions::key_signature_only()
    } else {
        TransposeOptions::default()
    };

    let output = transpose_with(&text, semitones, &options);
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

pub struct TabArgs<'a> {
    pub instrument: Option<&'a str>,
    pub key: Option<&'a str>,
    pub skip_repeated: bool,
    pub json: bool,
}

pub fn tab(input: &str, args: TabArgs<'_>, config: &TabConfig) -> Result<()> {
    let text = read_input(input)?;
    let recommended = if config.tablature.auto_whistle_key {
        recommend_whistle_key(&text)
    } else {
        None
    };
    let instrument = choose_instrument(args.instrument, args.key, recommended, config)?;
    tracing::info!(%instrument, "building tablature");

    let result = parse_notes_with_feedback(&text);
    for feedback in &result.feedback {
        eprintln!("{}", feedback);
    }
    let entries = tablature(&result.value, instrument);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        let options = RenderOptions {
            skip_repeated: args.skip_repeated || config.tablature.skip_repeated,
        };
        print!("{}", render_text(&entries, &options));
    }
    Ok(())
}

pub fn finger(
    note: &str,
    instrument: Option<&str>,
    key: Option<&str>,
    config: &TabConfig,
) -> Result<()> {
    let pitch: Pitch = note.parse()?;
    let instrument = choose_instrument(instrument, key, None, config)?;

    match instrument {
        Instrument::Whistle(whistle) => {
            let fingering = whistle.fingering(&pitch);
            if fingering.out_of_range {
                bail!("{} is out of range on a {} whistle", pitch, whistle);
            }
            let holes: String = fingering.holes.iter().map(|h| h.symbol()).collect();
            let register = if fingering.octave >= 2 { " +" } else { "" };
            println!("{} on {} whistle: {}{}", pitch, whistle, holes, register);
        }
        Instrument::Fiddle => match resolve_fiddle_fingering(&pitch) {
            FiddleFingering::OutOfRange => bail!("{} is out of range on the fiddle", pitch),
            fingering => println!("{} on fiddle: {}", pitch, fingering),
        },
    }
    Ok(())
}

pub fn recommend(input: &str) -> Result<()> {
    let text = read_input(input)?;
    match recommend_whistle_key(&text) {
        Some(key) => {
            println!("{}", key);
            Ok(())
        }
        None => bail!("No K: field in {}, cannot recommend a whistle", input),
    }
}

pub fn show_config(config: &TabConfig, sources: &ConfigSources) {
    print!("{}", config.to_toml());

    println!();
    if sources.files.is_empty() {
        println!("# No config files loaded (using defaults)");
    }
    for path in &sources.files {
        println!("# Loaded from: {}", path.display());
    }
    for var in &sources.env_overrides {
        println!("# Overridden by: {}", var);
    }
}

/// Pick the instrument from flags, then config.
///
/// For whistles the key comes from a `whistle:<key>` name, then `--key`,
/// then the tune's recommendation, then the configured default.
fn choose_instrument(
    instrument: Option<&str>,
    key: Option<&str>,
    recommended: Option<WhistleKey>,
    config: &TabConfig,
) -> Result<Instrument> {
    let name = instrument.unwrap_or(&config.tablature.instrument);
    let parsed: Instrument = name.parse()?;

    match parsed {
        Instrument::Whistle(_) if !name.contains(':') => {
            let whistle = match (key, recommended) {
                (Some(key), _) => key.parse()?,
                (None, Some(recommended)) => recommended,
                (None, None) => config.tablature.whistle_key.parse()?,
            };
            Ok(Instrument::Whistle(whistle))
        }
        other => Ok(other),
    }
}
