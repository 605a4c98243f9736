use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A screen position where a click lands during replay.
///
/// Coordinates are taken as-is: negative or off-screen values are legal and
/// are handed to the mouse driver unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Pause inserted after every automated mouse action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDelay(pub Duration);

impl ActionDelay {
    pub const RUN: Self = Self(Duration::from_millis(50));
    pub const TEST: Self = Self(Duration::from_millis(700));

    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseBackend {
    Enigo,
    Virtual,
}

impl MouseBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enigo => "enigo",
            Self::Virtual => "virtual",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionDelay, MouseBackend, Point};
    use std::time::Duration;

    #[test]
    fn point_display_matches_console_format() {
        assert_eq!(format!("Click({})", Point::new(10, -20)), "Click(10, -20)");
    }

    #[test]
    fn action_delay_defaults() {
        assert_eq!(ActionDelay::RUN.as_duration(), Duration::from_millis(50));
        assert_eq!(ActionDelay::TEST.as_duration(), Duration::from_millis(700));
        assert_eq!(ActionDelay::from_millis(50), ActionDelay::RUN);
    }

    #[test]
    fn mouse_backend_names_match_config_spelling() {
        #[derive(serde::Deserialize)]
        struct Doc {
            a: MouseBackend,
            b: MouseBackend,
        }
        let doc: Doc = toml::from_str("a = \"enigo\"\nb = \"virtual\"\n").expect("toml");
        assert_eq!(doc.a, MouseBackend::Enigo);
        assert_eq!(doc.b, MouseBackend::Virtual);
        assert_eq!(doc.a.as_str(), "enigo");
        assert_eq!(doc.b.as_str(), "virtual");
    }
}
