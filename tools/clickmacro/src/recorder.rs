use crate::errors::MacroError;
use crate::hotkeys::STOP_RECORDING_KEY;
use crate::logging::append_run_log;
use crate::runtime::{MouseDriver, Terminal};
use crate::types::Point;
use serde_json::json;

pub const RECORD_INSTRUCTIONS: [&str; 3] = [
    "Recording...",
    " - If you want to record to click current Mouse Position, press any key",
    " - If you want to stop recording, press 'q'",
];

/// Captures a fresh sequence: every byte except `q` samples the cursor,
/// menu digits included. Closed input ends the recording like `q` does.
pub fn record_sequence(
    terminal: &dyn Terminal,
    mouse: &dyn MouseDriver,
) -> Result<Vec<Point>, MacroError> {
    for line in RECORD_INSTRUCTIONS {
        terminal.write_line(line)?;
    }

    let mut points = Vec::new();
    loop {
        let key = match terminal.read_byte() {
            Ok(Some(key)) => key,
            Ok(None) => break,
            Err(error) => {
                terminal.write_line(&format!("Error reading input: {error}"))?;
                append_run_log(
                    "warn",
                    "input.read_failed",
                    json!({ "context": "record", "error": error.to_string() }),
                );
                0
            }
        };
        if key == STOP_RECORDING_KEY {
            break;
        }

        match mouse.position() {
            Ok(point) => {
                terminal.write_line(&format!("Click({point})"))?;
                append_run_log(
                    "debug",
                    "record.captured",
                    json!({ "index": points.len(), "x": point.x, "y": point.y }),
                );
                points.push(point);
            }
            Err(error) => {
                terminal.write_line(&format!("Error reading cursor position: {error}"))?;
                append_run_log(
                    "warn",
                    "record.position_failed",
                    json!({ "error": error.to_string() }),
                );
            }
        }
    }

    append_run_log("info", "record.finished", json!({ "points": points.len() }));
    Ok(points)
}
