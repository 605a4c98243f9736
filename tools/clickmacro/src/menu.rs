use crate::errors::MacroError;
use crate::hotkeys::{command_for_key, menu_lines, MenuCommand};
use crate::logging::append_run_log;
use crate::playback::{run_sequence, test_sequence, Player};
use crate::recorder::record_sequence;
use crate::runtime::ProductionRuntime;
use crate::sequence_store::{load_sequence, save_sequence};
use crate::types::{ActionDelay, Point};
use serde_json::json;
use std::path::PathBuf;

const CONTINUE_PROMPT: &str = "Press any key to continue...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub data_file: PathBuf,
    pub run_delay: ActionDelay,
    pub test_delay: ActionDelay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Owns the recorded sequence for the whole session and runs the menu loop.
pub struct MenuController<'a> {
    runtime: &'a ProductionRuntime,
    settings: SessionSettings,
    sequence: Vec<Point>,
}

impl<'a> MenuController<'a> {
    pub fn new(runtime: &'a ProductionRuntime, settings: SessionSettings) -> Self {
        Self {
            runtime,
            settings,
            sequence: Vec::new(),
        }
    }

    pub fn sequence(&self) -> &[Point] {
        &self.sequence
    }

    /// Replaces the in-memory sequence with whatever the data file holds.
    pub fn init(&mut self) -> Result<(), MacroError> {
        self.sequence = load_sequence(
            self.runtime.file_system.as_ref(),
            self.runtime.terminal.as_ref(),
            &self.settings.data_file,
        )?;
        Ok(())
    }

    pub fn run_until_exit(&mut self) -> Result<(), MacroError> {
        while self.step()? == Flow::Continue {}
        Ok(())
    }

    /// One pass of the loop: show the menu, read a key, dispatch.
    pub fn step(&mut self) -> Result<Flow, MacroError> {
        let runtime = self.runtime;
        let terminal = runtime.terminal.as_ref();
        for line in menu_lines() {
            terminal.write_line(&line)?;
        }

        let key = match terminal.read_byte() {
            Ok(Some(key)) => key,
            Ok(None) => {
                append_run_log("info", "input.closed", json!({ "context": "menu" }));
                self.save_and_exit()?;
                return Ok(Flow::Exit);
            }
            Err(error) => {
                terminal.write_line(&format!("Error reading input: {error}"))?;
                append_run_log(
                    "warn",
                    "input.read_failed",
                    json!({ "context": "menu", "error": error.to_string() }),
                );
                0
            }
        };

        let Some(command) = command_for_key(key) else {
            append_run_log("debug", "menu.ignored", json!({ "key": key }));
            terminal.clear_screen()?;
            return Ok(Flow::Continue);
        };
        append_run_log(
            "info",
            "menu.command",
            json!({ "command": command.as_str(), "points": self.sequence.len() }),
        );

        match command {
            MenuCommand::Run => self.run()?,
            MenuCommand::Record => self.record()?,
            MenuCommand::TestRecord => self.test_record()?,
            MenuCommand::CheckRecordedData => self.check_recorded_data()?,
            MenuCommand::SaveAndExit => {
                self.save_and_exit()?;
                return Ok(Flow::Exit);
            }
        }
        terminal.clear_screen()?;
        Ok(Flow::Continue)
    }

    pub fn run(&self) -> Result<(), MacroError> {
        self.runtime.terminal.clear_screen()?;
        run_sequence(&self.player(), &self.sequence, self.settings.run_delay)?;
        self.wait_for_key()
    }

    pub fn record(&mut self) -> Result<(), MacroError> {
        self.runtime.terminal.clear_screen()?;
        self.sequence = record_sequence(
            self.runtime.terminal.as_ref(),
            self.runtime.mouse.as_ref(),
        )?;
        Ok(())
    }

    pub fn test_record(&self) -> Result<(), MacroError> {
        self.runtime.terminal.clear_screen()?;
        test_sequence(&self.player(), &self.sequence, self.settings.test_delay)?;
        self.wait_for_key()
    }

    pub fn check_recorded_data(&self) -> Result<(), MacroError> {
        let terminal = self.runtime.terminal.as_ref();
        terminal.clear_screen()?;
        terminal.write_line("Recorded Data...")?;
        for point in &self.sequence {
            terminal.write_line(&format!("Pos({point})"))?;
        }
        self.wait_for_key()
    }

    pub fn save_and_exit(&self) -> Result<(), MacroError> {
        let terminal = self.runtime.terminal.as_ref();
        terminal.clear_screen()?;
        terminal.write_line("Saving Data & Exit...")?;
        save_sequence(
            self.runtime.file_system.as_ref(),
            terminal,
            &self.settings.data_file,
            &self.sequence,
        )?;
        Ok(())
    }

    fn player(&self) -> Player<'_> {
        Player {
            mouse: self.runtime.mouse.as_ref(),
            clock: self.runtime.clock.as_ref(),
            terminal: self.runtime.terminal.as_ref(),
        }
    }

    fn wait_for_key(&self) -> Result<(), MacroError> {
        let terminal = self.runtime.terminal.as_ref();
        terminal.write_line(CONTINUE_PROMPT)?;
        if let Err(error) = terminal.read_byte() {
            terminal.write_line(&format!("Error reading input: {error}"))?;
            append_run_log(
                "warn",
                "input.read_failed",
                json!({ "context": "continue", "error": error.to_string() }),
            );
        }
        Ok(())
    }
}
