#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub key: char,
    pub action: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Run,
    Record,
    TestRecord,
    CheckRecordedData,
    SaveAndExit,
}

impl MenuCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Record => "record",
            Self::TestRecord => "test_record",
            Self::CheckRecordedData => "check_recorded_data",
            Self::SaveAndExit => "save_and_exit",
        }
    }
}

/// Menu entries in display order.
pub const MENU_BINDINGS: [HotkeyBinding; 5] = [
    HotkeyBinding {
        key: '0',
        action: "Run",
    },
    HotkeyBinding {
        key: '1',
        action: "Record",
    },
    HotkeyBinding {
        key: '2',
        action: "Test Record",
    },
    HotkeyBinding {
        key: '3',
        action: "Check Recorded Data",
    },
    HotkeyBinding {
        key: '4',
        action: "Saving Data & Exit",
    },
];

/// Key that ends a recording. Every other byte captures a point.
pub const STOP_RECORDING_KEY: u8 = b'q';

pub fn command_for_key(key: u8) -> Option<MenuCommand> {
    match key {
        b'0' => Some(MenuCommand::Run),
        b'1' => Some(MenuCommand::Record),
        b'2' => Some(MenuCommand::TestRecord),
        b'3' => Some(MenuCommand::CheckRecordedData),
        b'4' => Some(MenuCommand::SaveAndExit),
        _ => None,
    }
}

pub fn menu_lines() -> Vec<String> {
    MENU_BINDINGS
        .iter()
        .map(|binding| format!("{}. {}", binding.key, binding.action))
        .collect()
}
