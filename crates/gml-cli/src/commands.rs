//! Subcommand implementations

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;

use gml_core::{adapters, Answer, Book, PatternTables, Pitch, Species};
use gml_exchange::{AppRegistry, Delivery, Environment, Exporter, FileStore, ImportHandler, QueryParams};

use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum Convert {
    /// RiffGen frequencies to note names
    FromRiffgen {
        #[arg(required = true, allow_negative_numbers = true)]
        hz: Vec<f64>,
    },
    /// QuartetEngine MIDI numbers to note names
    FromQuartet {
        #[arg(required = true, allow_negative_numbers = true)]
        midi: Vec<i64>,
    },
    /// Note names to RiffGen frequencies
    ToRiffgen {
        #[arg(required = true)]
        notes: Vec<String>,
    },
    /// Note names to QuartetEngine MIDI numbers
    ToQuartet {
        #[arg(required = true)]
        notes: Vec<String>,
    },
}

#[derive(Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// JSON when `--json` was given, otherwise the text form
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

fn parse_book(key: &str) -> anyhow::Result<Book> {
    Book::from_key(key).with_context(|| format!("Unknown book '{key}' (fux, schoenberg, rimsky)"))
}

fn or_dash<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| "-".to_string(), T::to_string)
}

#[derive(Serialize)]
struct NoteInfo {
    name: String,
    midi: u8,
    frequency: f64,
}

impl From<Pitch> for NoteInfo {
    fn from(pitch: Pitch) -> Self {
        Self {
            name: pitch.name(),
            midi: pitch.value(),
            frequency: pitch.frequency(),
        }
    }
}

pub fn note(out: Output, note: &str) -> anyhow::Result<()> {
    let pitch = match note.parse::<i64>() {
        Ok(number) => Pitch::new(number)?,
        Err(_) => Pitch::parse(note)?,
    };
    let info = NoteInfo::from(pitch);
    out.emit(&info, || format!("{}  midi {}  {:.2} Hz", info.name, info.midi, info.frequency))
}

pub fn freq(out: Output, hz: f64) -> anyhow::Result<()> {
    let info = NoteInfo::from(Pitch::from_frequency(hz)?);
    out.emit(&info, || format!("{}  midi {}  (tuned {:.2} Hz)", info.name, info.midi, info.frequency))
}

fn list_patterns(out: Output, patterns: &[gml_core::IntervalPattern]) -> anyhow::Result<()> {
    out.emit(&patterns, || {
        patterns
            .iter()
            .map(|p| format!("{:<18} {:?}", p.name, p.semitones))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn scale(out: Output, tables: &PatternTables, root: Option<&str>, pattern: &str, list: bool) -> anyhow::Result<()> {
    match root {
        Some(root) if !list => {
            let notes = tables.generate_scale(root, pattern)?;
            out.emit(&notes, || notes.join(" "))
        }
        _ => list_patterns(out, tables.scales()),
    }
}

pub fn chord(out: Output, tables: &PatternTables, root: Option<&str>, pattern: &str, list: bool) -> anyhow::Result<()> {
    match root {
        Some(root) if !list => {
            let notes = tables.build_chord(root, pattern)?;
            out.emit(&notes, || notes.join(" "))
        }
        _ => list_patterns(out, tables.chords()),
    }
}

pub fn analyze(out: Output, tables: &PatternTables, notes: &[String]) -> anyhow::Result<()> {
    let analysis = gml_core::analyze_chord(tables, notes)?;
    out.emit(&analysis, || match &analysis.outcome {
        gml_core::ChordMatch::Known { .. } => format!("{} {}", analysis.root, analysis.chord_type()),
        gml_core::ChordMatch::Unknown { intervals } => {
            format!("{} unknown, intervals {:?}", analysis.root, intervals)
        }
    })
}

pub fn parallels(out: Output, voices: [&str; 4]) -> anyhow::Result<()> {
    let [v1_start, v1_end, v2_start, v2_end] = voices.map(Pitch::parse);
    let motion = gml_core::check_parallel_motion(v1_start?, v1_end?, v2_start?, v2_end?);
    let rule = motion.map(|m| m.rule().id());
    out.emit(&rule, || rule.unwrap_or("no parallel fifths or octaves").to_string())
}

pub fn voice_lead(out: Output, from: &[String], to: &[String], book: Option<&str>) -> anyhow::Result<()> {
    let book = book.map(parse_book).transpose()?;
    let leading = gml_core::suggest_voice_leading(from, to, book)?;
    out.emit(&leading, || {
        format!("{} -> {}  ({}, {})", leading.from.join(" "), leading.to.join(" "), leading.method, leading.book.key())
    })
}

pub fn counterpoint(out: Output, cantus: &[String], counterpoint: &[String], species: u8) -> anyhow::Result<()> {
    let species = Species::from_number(species)?;
    let result = gml_core::validate_counterpoint(cantus, counterpoint, species)?;
    out.emit(&result, || {
        if result.valid {
            return format!("valid {} counterpoint", species.name());
        }
        result
            .violations
            .iter()
            .map(|v| format!("position {}: {} [{}] ({})", v.position, v.rule.id(), v.family.id(), v.source.key()))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn ask(out: Output, question: &str, books: &[String]) -> anyhow::Result<()> {
    let books = books.iter().map(|b| parse_book(b)).collect::<anyhow::Result<Vec<_>>>()?;
    let answers = gml_core::ask(question, &books);
    out.emit(&answers, || {
        if answers.is_empty() {
            return "no answer".to_string();
        }
        answers
            .iter()
            .map(|(book, answer)| match answer {
                Answer::Range(r) => format!("{}: {} {}-{}", book.title(), r.instrument, r.low, r.high),
                Answer::Text(text) => format!("{}: {}", book.title(), text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn recommend(out: Output, context: &str) -> anyhow::Result<()> {
    let advice = gml_core::recommend(context);
    out.emit(&advice, || {
        advice
            .iter()
            .map(|r| format!("{} ({}): {}", r.book.title(), r.book.author(), r.advice))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn convert(out: Output, direction: Convert) -> anyhow::Result<()> {
    match direction {
        Convert::FromRiffgen { hz } => {
            let names = adapters::from_riffgen(&hz);
            out.emit(&names, || names.iter().map(or_dash).collect::<Vec<_>>().join(" "))
        }
        Convert::FromQuartet { midi } => {
            let names = adapters::from_quartet(&midi);
            out.emit(&names, || names.iter().map(or_dash).collect::<Vec<_>>().join(" "))
        }
        Convert::ToRiffgen { notes } => {
            let hz = adapters::to_riffgen(&notes);
            out.emit(&hz, || {
                hz.iter()
                    .map(|f| f.map_or_else(|| "-".to_string(), |f| format!("{f:.2}")))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
        }
        Convert::ToQuartet { notes } => {
            let midi = adapters::to_quartet(&notes);
            out.emit(&midi, || midi.iter().map(or_dash).collect::<Vec<_>>().join(" "))
        }
    }
}

#[derive(Serialize)]
struct AppListing<'a> {
    name: &'a str,
    url: String,
    exports: &'a [&'a str],
}

pub fn apps(out: Output, environment: Environment) -> anyhow::Result<()> {
    let registry = AppRegistry::standard();
    let listing: Vec<AppListing> = registry
        .apps()
        .iter()
        .filter_map(|app| {
            let url = registry.url_for(app.name, environment)?;
            Some(AppListing { name: app.name, url, exports: app.exports })
        })
        .collect();
    out.emit(&listing, || {
        listing
            .iter()
            .map(|a| format!("{:<16} {:<40} {}", a.name, a.url, a.exports.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn read_request(file: Option<&Path>) -> anyhow::Result<Value> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("Export request is not valid JSON")
}

pub fn export(out: Output, config: &AppConfig, target: &str, file: Option<&Path>) -> anyhow::Result<()> {
    let request = read_request(file)?;
    let registry = AppRegistry::standard();
    let exporter = Exporter::new(&registry, config.export_settings());
    let mut store = FileStore::open(config.store_dir())?;

    let delivery = exporter.export_to_app(&request, target, &mut store)?;
    tracing::info!(target_app = target, "Export ready");
    out.emit(&delivery, || match &delivery {
        Delivery::UrlParams { url } => url.clone(),
        Delivery::Storage { url, storage_key } => format!("{url}\n(stored as {storage_key})"),
    })
}

pub fn import(out: Output, config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let params = QueryParams::parse(url);
    let mut store = FileStore::open(config.store_dir())?;
    let mut handler = ImportHandler::with_auto_process(config.exchange.auto_process);

    if handler.detect(&params, &mut store) == 0 {
        bail!("Nothing imported from {url}");
    }
    let records = handler.records();
    out.emit(&records, || {
        records
            .iter()
            .map(|r| {
                format!(
                    "{}  {} -> {}  {}  {:?}",
                    r.id,
                    r.source,
                    r.target,
                    r.data.content_type().as_str(),
                    r.status
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book() {
        assert_eq!(parse_book("rimsky").unwrap(), Book::Rimsky);
        assert!(parse_book("bach").is_err());
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(&Some(60u8)), "60");
        assert_eq!(or_dash::<String>(&None), "-");
    }

    #[test]
    fn test_note_info() {
        let info = NoteInfo::from(Pitch::parse("A4").unwrap());
        assert_eq!(info.midi, 69);
        assert!((info.frequency - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_then_import_through_config_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.exchange.store_dir = Some(dir.path().to_path_buf());
        config.exchange.inline_limit = 0;

        let request = dir.path().join("request.json");
        std::fs::write(&request, r#"{"riffs": [440, 660]}"#).unwrap();
        let out = Output { json: true };
        export(out, &config, "RiffGen", Some(&request)).unwrap();

        let stored: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str()?.strip_suffix(".json").map(str::to_string))
            .filter(|name| name.starts_with("gml_export_"))
            .collect();
        assert_eq!(stored.len(), 1);

        import(out, &config, &format!("http://localhost:3001?importKey={}", stored[0])).unwrap();
        assert!(import(out, &config, &format!("http://localhost:3001?importKey={}", stored[0])).is_err());
    }
}
