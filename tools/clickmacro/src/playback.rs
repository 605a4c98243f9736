use crate::errors::MacroError;
use crate::logging::append_run_log;
use crate::runtime::{Clock, MouseDriver, Terminal};
use crate::types::{ActionDelay, Point};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Move and click at every point.
    Click,
    /// Move only, for checking a recording by eye.
    DryRun,
}

impl PlaybackMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DryRun => "dry_run",
        }
    }

    fn banner(self) -> &'static str {
        match self {
            Self::Click => "Running...",
            Self::DryRun => "Testing...",
        }
    }

    fn step_label(self) -> &'static str {
        match self {
            Self::Click => "Click",
            Self::DryRun => "Move",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackSummary {
    pub actions: usize,
    pub failed: usize,
}

pub struct Player<'a> {
    pub mouse: &'a dyn MouseDriver,
    pub clock: &'a dyn Clock,
    pub terminal: &'a dyn Terminal,
}

impl Player<'_> {
    /// Plays every point in order, one driver call and one pause per point.
    /// Driver failures are logged and playback carries on.
    pub fn play(
        &self,
        points: &[Point],
        mode: PlaybackMode,
        delay: ActionDelay,
    ) -> Result<PlaybackSummary, MacroError> {
        self.terminal.write_line(mode.banner())?;
        append_run_log(
            "info",
            "playback.started",
            json!({
                "mode": mode.as_str(),
                "points": points.len(),
                "delay_ms": delay.as_duration().as_millis() as u64
            }),
        );

        let mut summary = PlaybackSummary::default();
        for (index, point) in points.iter().enumerate() {
            self.terminal
                .write_line(&format!("{}({point})", mode.step_label()))?;
            let result = match mode {
                PlaybackMode::Click => self.mouse.click_at(*point),
                PlaybackMode::DryRun => self.mouse.move_to(*point),
            };
            if let Err(error) = result {
                summary.failed += 1;
                append_run_log(
                    "warn",
                    "playback.action_failed",
                    json!({
                        "mode": mode.as_str(),
                        "index": index,
                        "x": point.x,
                        "y": point.y,
                        "error": error.to_string()
                    }),
                );
            }
            summary.actions += 1;
            self.clock.sleep(delay.as_duration());
        }

        append_run_log(
            "info",
            "playback.finished",
            json!({
                "mode": mode.as_str(),
                "actions": summary.actions,
                "failed": summary.failed
            }),
        );
        Ok(summary)
    }
}

pub fn run_sequence(
    player: &Player<'_>,
    points: &[Point],
    delay: ActionDelay,
) -> Result<PlaybackSummary, MacroError> {
    player.play(points, PlaybackMode::Click, delay)
}

pub fn test_sequence(
    player: &Player<'_>,
    points: &[Point],
    delay: ActionDelay,
) -> Result<PlaybackSummary, MacroError> {
    player.play(points, PlaybackMode::DryRun, delay)
}

#[cfg(test)]
mod tests {
    use super::{run_sequence, test_sequence, PlaybackSummary, Player};
    use crate::errors::MacroError;
    use crate::runtime::{FakeClock, FakeMouse, FakeTerminal, MouseCall};
    use crate::types::{ActionDelay, Point};
    use std::time::Duration;

    fn points() -> Vec<Point> {
        vec![Point::new(1, 1), Point::new(5, 9), Point::new(1, 1)]
    }

    #[test]
    fn run_clicks_each_point_in_order_without_dedup() {
        let mouse = FakeMouse::default();
        let clock = FakeClock::default();
        let terminal = FakeTerminal::new(true);
        let player = Player {
            mouse: &mouse,
            clock: &clock,
            terminal: &terminal,
        };

        let summary = run_sequence(&player, &points(), ActionDelay::RUN).expect("run");

        assert_eq!(summary, PlaybackSummary { actions: 3, failed: 0 });
        assert_eq!(
            mouse.calls(),
            points().into_iter().map(MouseCall::ClickAt).collect::<Vec<_>>()
        );
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(50); 3]);
        assert_eq!(
            terminal.written_lines(),
            vec!["Running...", "Click(1, 1)", "Click(5, 9)", "Click(1, 1)"]
        );
    }

    #[test]
    fn dry_run_only_moves() {
        let mouse = FakeMouse::default();
        let clock = FakeClock::default();
        let terminal = FakeTerminal::new(true);
        let player = Player {
            mouse: &mouse,
            clock: &clock,
            terminal: &terminal,
        };

        test_sequence(&player, &points(), ActionDelay::TEST).expect("test");

        assert_eq!(
            mouse.calls(),
            points().into_iter().map(MouseCall::MoveTo).collect::<Vec<_>>()
        );
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(700); 3]);
        assert_eq!(terminal.written_lines()[0], "Testing...");
        assert_eq!(terminal.written_lines()[1], "Move(1, 1)");
    }

    #[test]
    fn driver_failure_does_not_stop_playback() {
        let mouse = FakeMouse::default();
        mouse.set_fail_next(MacroError::Mouse("display gone".to_string()));
        let clock = FakeClock::default();
        let terminal = FakeTerminal::new(true);
        let player = Player {
            mouse: &mouse,
            clock: &clock,
            terminal: &terminal,
        };

        let summary = run_sequence(&player, &points(), ActionDelay::RUN).expect("run");

        assert_eq!(summary, PlaybackSummary { actions: 3, failed: 1 });
        assert_eq!(mouse.calls().len(), 3);
    }

    #[test]
    fn empty_sequence_only_prints_banner() {
        let mouse = FakeMouse::default();
        let clock = FakeClock::default();
        let terminal = FakeTerminal::new(true);
        let player = Player {
            mouse: &mouse,
            clock: &clock,
            terminal: &terminal,
        };

        run_sequence(&player, &[], ActionDelay::RUN).expect("run");

        assert!(mouse.calls().is_empty());
        assert!(clock.sleeps().is_empty());
        assert_eq!(terminal.written_lines(), vec!["Running..."]);
    }
}
