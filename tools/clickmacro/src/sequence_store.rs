//! Plain-text persistence for recorded sequences.
//!
//! Layout: the first line is the point count `n`, followed by `n` lines of
//! `x y`. Lines are written with CRLF; reading also accepts bare LF.

use crate::errors::MacroError;
use crate::logging::append_run_log;
use crate::runtime::{FileSystem, Terminal};
use crate::types::Point;
use serde_json::json;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_DATA_FILE: &str = "recorded_data.txt";
const LINE_END: &str = "\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("missing point count")]
    MissingCount,
    #[error("invalid point count {0:?}")]
    InvalidCount(String),
    #[error("point {index} of {expected} is missing")]
    MissingPoint { index: usize, expected: usize },
    #[error("line {line}: expected \"x y\", got {text:?}")]
    InvalidPoint { line: usize, text: String },
}

/// Result of parsing a data file. `points` holds everything read before
/// `error`, if any, stopped the parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedSequence {
    pub points: Vec<Point>,
    pub error: Option<SequenceError>,
}

pub fn encode(points: &[Point]) -> String {
    let mut out = format!("{}{LINE_END}", points.len());
    for point in points {
        out.push_str(&format!("{} {}{LINE_END}", point.x, point.y));
    }
    out
}

pub fn parse(contents: &str) -> ParsedSequence {
    let mut lines = contents.lines();
    let mut parsed = ParsedSequence::default();

    let expected = match lines.next() {
        None => {
            parsed.error = Some(SequenceError::MissingCount);
            return parsed;
        }
        Some(line) => match line.trim().parse::<usize>() {
            Ok(count) => count,
            Err(_) => {
                parsed.error = Some(SequenceError::InvalidCount(line.to_string()));
                return parsed;
            }
        },
    };

    for index in 1..=expected {
        let Some(line) = lines.next() else {
            parsed.error = Some(SequenceError::MissingPoint { index, expected });
            return parsed;
        };
        match parse_point(line) {
            Some(point) => parsed.points.push(point),
            None => {
                parsed.error = Some(SequenceError::InvalidPoint {
                    line: index + 1,
                    text: line.to_string(),
                });
                return parsed;
            }
        }
    }

    parsed
}

fn parse_point(line: &str) -> Option<Point> {
    let mut fields = line.split_whitespace();
    let x = fields.next()?.parse::<i32>().ok()?;
    let y = fields.next()?.parse::<i32>().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Point::new(x, y))
}

/// Startup load. Never fails: problems are printed and whatever was parsed
/// before the first bad line is returned.
pub fn load_sequence(
    fs: &dyn FileSystem,
    terminal: &dyn Terminal,
    path: &Path,
) -> Result<Vec<Point>, MacroError> {
    if !fs.exists(path) {
        terminal.write_line("No Recorded File Exists")?;
        append_run_log(
            "info",
            "sequence.load_failed",
            json!({ "path": path.display().to_string(), "reason": "missing" }),
        );
        return Ok(Vec::new());
    }

    let contents = match fs.read_to_string(path) {
        Ok(contents) => contents,
        Err(error) => {
            terminal.write_line(&format!("Error reading file: {error}"))?;
            append_run_log(
                "warn",
                "sequence.load_failed",
                json!({ "path": path.display().to_string(), "error": error.to_string() }),
            );
            return Ok(Vec::new());
        }
    };

    let parsed = parse(&contents);
    if let Some(error) = parsed.error {
        terminal.write_line(&format!("Error reading file: {error}"))?;
        append_run_log(
            "warn",
            "sequence.load_failed",
            json!({
                "path": path.display().to_string(),
                "error": error.to_string(),
                "kept_points": parsed.points.len()
            }),
        );
        return Ok(parsed.points);
    }

    terminal.write_line("Recorded Data Loaded")?;
    for point in &parsed.points {
        terminal.write_line(&format!("Pos({point})"))?;
    }
    append_run_log(
        "info",
        "sequence.loaded",
        json!({ "path": path.display().to_string(), "points": parsed.points.len() }),
    );
    Ok(parsed.points)
}

/// Writes the whole sequence, replacing any existing file. A write failure
/// is reported and swallowed; the returned flag says whether it landed.
pub fn save_sequence(
    fs: &dyn FileSystem,
    terminal: &dyn Terminal,
    path: &Path,
    points: &[Point],
) -> Result<bool, MacroError> {
    match fs.write_string(path, &encode(points)) {
        Ok(()) => {
            append_run_log(
                "info",
                "sequence.saved",
                json!({ "path": path.display().to_string(), "points": points.len() }),
            );
            Ok(true)
        }
        Err(error) => {
            terminal.write_line(&format!("Error creating file: {error}"))?;
            append_run_log(
                "error",
                "sequence.save_failed",
                json!({ "path": path.display().to_string(), "error": error.to_string() }),
            );
            Ok(false)
        }
    }
}
