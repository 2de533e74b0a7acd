//! Note scripts.
//!
//! One event per line:
//!
//! ```text
//! # C major chord, half a second, then release
//! on 60 100
//! on 64 100
//! on 67 100
//! wait 22050
//! off 60
//! panic
//! ```
//!
//! `wait` counts 44.1 kHz samples. Blank lines and `#` comments are skipped.
use std::fmt;
use std::fs;
use std::io::{Read, stdin};
use std::path::Path;

use anyhow::{Context, Result, bail};

/// One script event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    On { note: u8, velocity: u8 },
    Off { note: u8 },
    Wait(u32),
    /// Key off every sounding voice.
    Panic,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::On { note, velocity } => write!(f, "on {} {}", note, velocity),
            Event::Off { note } => write!(f, "off {}", note),
            Event::Wait(samples) => write!(f, "wait {}", samples),
            Event::Panic => write!(f, "panic"),
        }
    }
}

/// An event and the 1-based line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub event: Event,
}

/// Read script text from a path, or stdin for `-`.
pub fn read_script(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        stdin()
            .read_to_string(&mut text)
            .context("failed to read script from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read script: {}", path.display()))
    }
}

pub fn parse(text: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let event = parse_event(content).with_context(|| format!("line {}: {}", line, raw.trim()))?;
        lines.push(ScriptLine { line, event });
    }
    Ok(lines)
}

fn parse_event(content: &str) -> Result<Event> {
    let mut words = content.split_whitespace();
    let keyword = words.next().unwrap_or("");
    let args: Vec<&str> = words.collect();

    let event = match (keyword.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("on", [note, velocity]) => Event::On {
            note: number(note, "note")?,
            velocity: number(velocity, "velocity")?,
        },
        ("off", [note]) => Event::Off {
            note: number(note, "note")?,
        },
        ("wait", [samples]) => Event::Wait(number(samples, "wait")?),
        ("panic", []) => Event::Panic,
        ("on" | "off" | "wait" | "panic", _) => {
            bail!("wrong number of arguments for '{}'", keyword)
        }
        _ => bail!("unknown event '{}'", keyword),
    };
    Ok(event)
}

fn number<T: std::str::FromStr>(word: &str, what: &str) -> Result<T> {
    word.parse()
        .map_err(|_| anyhow::anyhow!("invalid {} '{}'", what, word))
}

/// Total samples waited by a script.
pub fn total_samples(lines: &[ScriptLine]) -> u64 {
    lines
        .iter()
        .map(|l| match l.event {
            Event::Wait(samples) => samples as u64,
            _ => 0,
        })
        .sum()
}
