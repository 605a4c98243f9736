use clickmacro::hotkeys::{
    command_for_key, menu_lines, MenuCommand, MENU_BINDINGS, STOP_RECORDING_KEY,
};

#[test]
fn all_menu_bindings_resolved() {
    let cases = [
        (b'0', MenuCommand::Run),
        (b'1', MenuCommand::Record),
        (b'2', MenuCommand::TestRecord),
        (b'3', MenuCommand::CheckRecordedData),
        (b'4', MenuCommand::SaveAndExit),
    ];
    for (key, expected) in cases {
        assert_eq!(
            command_for_key(key),
            Some(expected),
            "key '{}' should resolve to {expected:?}",
            key as char
        );
    }
}

#[test]
fn unknown_keys_return_none() {
    for key in [b'q', b'5', b'9', b'\r', b'\x1b', b' ', 0u8, 0xff] {
        assert_eq!(command_for_key(key), None, "key {key:#04x} should be ignored");
    }
}

#[test]
fn advertised_menu_keys_have_behavior() {
    for (binding, line) in MENU_BINDINGS.iter().zip(menu_lines()) {
        assert!(
            line.starts_with(&format!("{}. ", binding.key)),
            "menu line {line:?} should lead with its key"
        );
        let key = u8::try_from(binding.key).expect("ascii key");
        assert!(
            command_for_key(key).is_some(),
            "advertised key '{}' ({}) has no behavior",
            binding.key,
            binding.action
        );
    }
}

#[test]
fn stop_key_is_not_a_menu_command() {
    assert_eq!(command_for_key(STOP_RECORDING_KEY), None);
}
