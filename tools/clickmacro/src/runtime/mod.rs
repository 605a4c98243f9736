use crate::errors::MacroError;
use crate::types::{MouseBackend, Point};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub trait Clock {
    fn sleep(&self, duration: Duration);
}

pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, MacroError>;
    fn write_string(&self, path: &Path, contents: &str) -> Result<(), MacroError>;
    fn exists(&self, path: &Path) -> bool;
}

/// Console the menu runs on. Lines are written with CRLF since the
/// terminal is in raw mode for the whole session.
pub trait Terminal {
    fn stdin_is_tty(&self) -> bool;
    fn enable_raw_mode(&self) -> Result<(), MacroError>;
    fn disable_raw_mode(&self) -> Result<(), MacroError>;
    /// Blocks until one byte arrives. `Ok(None)` means input is closed.
    fn read_byte(&self) -> Result<Option<u8>, MacroError>;
    fn write_line(&self, line: &str) -> Result<(), MacroError>;
    fn clear_screen(&self) -> Result<(), MacroError>;
}

/// OS automation boundary.
pub trait MouseDriver {
    fn move_to(&self, point: Point) -> Result<(), MacroError>;
    /// Moves to `point` and presses the left button there.
    fn click_at(&self, point: Point) -> Result<(), MacroError>;
    fn position(&self) -> Result<Point, MacroError>;
}

pub struct ProductionClock;

impl Clock for ProductionClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

pub struct ProductionFileSystem;

impl FileSystem for ProductionFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, MacroError> {
        std::fs::read_to_string(path).map_err(|e| MacroError::Io(e.to_string()))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), MacroError> {
        std::fs::write(path, contents).map_err(|e| MacroError::Io(e.to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

pub struct ProductionTerminal;

impl Terminal for ProductionTerminal {
    fn stdin_is_tty(&self) -> bool {
        std::io::IsTerminal::is_terminal(&std::io::stdin())
    }

    fn enable_raw_mode(&self) -> Result<(), MacroError> {
        crossterm::terminal::enable_raw_mode().map_err(|e| MacroError::Terminal(e.to_string()))
    }

    fn disable_raw_mode(&self) -> Result<(), MacroError> {
        crossterm::terminal::disable_raw_mode().map_err(|e| MacroError::Terminal(e.to_string()))
    }

    fn read_byte(&self) -> Result<Option<u8>, MacroError> {
        let mut buf = [0u8; 1];
        let mut stdin = std::io::stdin().lock();
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(MacroError::Io(e.to_string())),
            }
        }
    }

    fn write_line(&self, line: &str) -> Result<(), MacroError> {
        let mut out = std::io::stdout().lock();
        write!(out, "{line}\r\n").map_err(|e| MacroError::Io(e.to_string()))?;
        out.flush().map_err(|e| MacroError::Io(e.to_string()))
    }

    fn clear_screen(&self) -> Result<(), MacroError> {
        use crossterm::cursor::MoveTo;
        use crossterm::terminal::{Clear, ClearType};
        let mut out = std::io::stdout();
        crossterm::execute!(out, MoveTo(0, 0), Clear(ClearType::All))
            .map_err(|e| MacroError::Io(e.to_string()))
    }
}

pub struct EnigoMouse {
    enigo: RefCell<enigo::Enigo>,
}

impl EnigoMouse {
    pub fn new() -> Result<Self, MacroError> {
        let enigo = enigo::Enigo::new(&enigo::Settings::default())
            .map_err(|e| MacroError::Mouse(e.to_string()))?;
        Ok(Self {
            enigo: RefCell::new(enigo),
        })
    }
}

impl MouseDriver for EnigoMouse {
    fn move_to(&self, point: Point) -> Result<(), MacroError> {
        use enigo::{Coordinate, Mouse};
        self.enigo
            .borrow_mut()
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| MacroError::Mouse(e.to_string()))
    }

    fn click_at(&self, point: Point) -> Result<(), MacroError> {
        use enigo::{Button, Coordinate, Direction, Mouse};
        let mut enigo = self.enigo.borrow_mut();
        enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| MacroError::Mouse(e.to_string()))?;
        enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| MacroError::Mouse(e.to_string()))
    }

    fn position(&self) -> Result<Point, MacroError> {
        use enigo::Mouse;
        let (x, y) = self
            .enigo
            .borrow_mut()
            .location()
            .map_err(|e| MacroError::Mouse(e.to_string()))?;
        Ok(Point::new(x, y))
    }
}

/// Headless driver: moves a cursor that only exists in memory and drops
/// clicks. Lets a session run where no display is available.
#[derive(Default)]
pub struct VirtualMouse {
    cursor: Cell<(i32, i32)>,
}

impl MouseDriver for VirtualMouse {
    fn move_to(&self, point: Point) -> Result<(), MacroError> {
        self.cursor.set((point.x, point.y));
        Ok(())
    }

    fn click_at(&self, point: Point) -> Result<(), MacroError> {
        self.move_to(point)
    }

    fn position(&self) -> Result<Point, MacroError> {
        Ok(Point::from(self.cursor.get()))
    }
}

pub fn mouse_for_backend(backend: MouseBackend) -> Result<Box<dyn MouseDriver>, MacroError> {
    match backend {
        MouseBackend::Enigo => Ok(Box::new(EnigoMouse::new()?)),
        MouseBackend::Virtual => Ok(Box::new(VirtualMouse::default())),
    }
}

pub struct ProductionRuntime {
    pub clock: Box<dyn Clock>,
    pub file_system: Box<dyn FileSystem>,
    pub terminal: Box<dyn Terminal>,
    pub mouse: Box<dyn MouseDriver>,
}

impl ProductionRuntime {
    /// Connects the mouse backend; the rest of the runtime cannot fail.
    pub fn new(backend: MouseBackend) -> Result<Self, MacroError> {
        Ok(Self {
            clock: Box::new(ProductionClock),
            file_system: Box::new(ProductionFileSystem),
            terminal: Box::new(ProductionTerminal),
            mouse: mouse_for_backend(backend)?,
        })
    }
}

#[derive(Default, Clone)]
pub struct FakeClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl FakeClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("sleep lock").clone()
    }
}

impl Clock for FakeClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().expect("sleep lock").push(duration);
    }
}

#[derive(Default, Clone)]
pub struct FakeFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    fail_next: Arc<Mutex<Option<MacroError>>>,
}

impl FakeFileSystem {
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .expect("files lock")
            .insert(path.into(), contents.into());
        fs
    }

    pub fn set_fail_next(&self, error: MacroError) {
        *self.fail_next.lock().expect("fail lock") = Some(error);
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .lock()
            .expect("files lock")
            .get(path.as_ref())
            .cloned()
    }

    fn maybe_fail(&self) -> Result<(), MacroError> {
        if let Some(err) = self.fail_next.lock().expect("fail lock").take() {
            return Err(err);
        }
        Ok(())
    }
}

impl FileSystem for FakeFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, MacroError> {
        self.maybe_fail()?;
        self.file(path)
            .ok_or_else(|| MacroError::Io(format!("missing file {}", path.display())))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), MacroError> {
        self.maybe_fail()?;
        self.files
            .lock()
            .expect("files lock")
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("files lock").contains_key(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScriptedInput {
    Byte(u8),
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScreenEvent {
    Line(String),
    Clear,
}

/// Scripted console. Input runs out into EOF.
#[derive(Default, Clone)]
pub struct FakeTerminal {
    pub is_tty: bool,
    input: Arc<Mutex<VecDeque<ScriptedInput>>>,
    events: Arc<Mutex<Vec<ScreenEvent>>>,
    raw_mode: Arc<Mutex<Vec<&'static str>>>,
    fail_raw_mode: Arc<Mutex<bool>>,
}

impl FakeTerminal {
    pub fn new(is_tty: bool) -> Self {
        Self {
            is_tty,
            ..Self::default()
        }
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        let terminal = Self::new(true);
        terminal.push_input(bytes);
        terminal
    }

    pub fn push_input(&self, bytes: &[u8]) {
        self.input
            .lock()
            .expect("input lock")
            .extend(bytes.iter().copied().map(ScriptedInput::Byte));
    }

    pub fn push_read_error(&self, message: &str) {
        self.input
            .lock()
            .expect("input lock")
            .push_back(ScriptedInput::Fail(message.to_string()));
    }

    pub fn set_fail_raw_mode(&self, fail: bool) {
        *self.fail_raw_mode.lock().expect("raw mode lock") = fail;
    }

    pub fn pending_input(&self) -> usize {
        self.input.lock().expect("input lock").len()
    }

    pub fn written_lines(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("events lock")
            .iter()
            .filter_map(|event| match event {
                ScreenEvent::Line(line) => Some(line.clone()),
                ScreenEvent::Clear => None,
            })
            .collect()
    }

    /// Output grouped by screen clears; the first entry is what was shown
    /// before the first clear.
    pub fn screens(&self) -> Vec<Vec<String>> {
        let mut screens = vec![Vec::new()];
        for event in self.events.lock().expect("events lock").iter() {
            match event {
                ScreenEvent::Line(line) => {
                    if let Some(current) = screens.last_mut() {
                        current.push(line.clone());
                    }
                }
                ScreenEvent::Clear => screens.push(Vec::new()),
            }
        }
        screens
    }

    pub fn clear_count(&self) -> usize {
        self.events
            .lock()
            .expect("events lock")
            .iter()
            .filter(|event| **event == ScreenEvent::Clear)
            .count()
    }

    pub fn raw_mode_transitions(&self) -> Vec<&'static str> {
        self.raw_mode.lock().expect("raw mode lock").clone()
    }
}

impl Terminal for FakeTerminal {
    fn stdin_is_tty(&self) -> bool {
        self.is_tty
    }

    fn enable_raw_mode(&self) -> Result<(), MacroError> {
        if *self.fail_raw_mode.lock().expect("raw mode lock") {
            return Err(MacroError::Terminal("not a terminal".to_string()));
        }
        self.raw_mode.lock().expect("raw mode lock").push("enable");
        Ok(())
    }

    fn disable_raw_mode(&self) -> Result<(), MacroError> {
        self.raw_mode.lock().expect("raw mode lock").push("disable");
        Ok(())
    }

    fn read_byte(&self) -> Result<Option<u8>, MacroError> {
        match self.input.lock().expect("input lock").pop_front() {
            Some(ScriptedInput::Byte(byte)) => Ok(Some(byte)),
            Some(ScriptedInput::Fail(message)) => Err(MacroError::Io(message)),
            None => Ok(None),
        }
    }

    fn write_line(&self, line: &str) -> Result<(), MacroError> {
        self.events
            .lock()
            .expect("events lock")
            .push(ScreenEvent::Line(line.to_string()));
        Ok(())
    }

    fn clear_screen(&self) -> Result<(), MacroError> {
        self.events
            .lock()
            .expect("events lock")
            .push(ScreenEvent::Clear);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseCall {
    MoveTo(Point),
    ClickAt(Point),
    Position,
}

/// Records every driver call. `position()` pops queued samples first and
/// falls back to wherever the cursor was last moved.
#[derive(Default, Clone)]
pub struct FakeMouse {
    calls: Arc<Mutex<Vec<MouseCall>>>,
    positions: Arc<Mutex<VecDeque<Point>>>,
    cursor: Arc<Mutex<Point>>,
    fail_next: Arc<Mutex<Option<MacroError>>>,
}

impl FakeMouse {
    pub fn with_positions(points: impl IntoIterator<Item = Point>) -> Self {
        let mouse = Self::default();
        mouse
            .positions
            .lock()
            .expect("positions lock")
            .extend(points);
        mouse
    }

    pub fn set_fail_next(&self, error: MacroError) {
        *self.fail_next.lock().expect("fail lock") = Some(error);
    }

    pub fn calls(&self) -> Vec<MouseCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: MouseCall) -> Result<(), MacroError> {
        self.calls.lock().expect("calls lock").push(call);
        if let Some(err) = self.fail_next.lock().expect("fail lock").take() {
            return Err(err);
        }
        Ok(())
    }
}

impl MouseDriver for FakeMouse {
    fn move_to(&self, point: Point) -> Result<(), MacroError> {
        self.record(MouseCall::MoveTo(point))?;
        *self.cursor.lock().expect("cursor lock") = point;
        Ok(())
    }

    fn click_at(&self, point: Point) -> Result<(), MacroError> {
        self.record(MouseCall::ClickAt(point))?;
        *self.cursor.lock().expect("cursor lock") = point;
        Ok(())
    }

    fn position(&self) -> Result<Point, MacroError> {
        self.record(MouseCall::Position)?;
        if let Some(point) = self.positions.lock().expect("positions lock").pop_front() {
            return Ok(point);
        }
        Ok(*self.cursor.lock().expect("cursor lock"))
    }
}
