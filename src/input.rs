use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    SaveNow,
    ClearLog,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            's' => Some(UiCommand::SaveNow),
            'c' => Some(UiCommand::ClearLog),
            _ => None,
        },
        _ => None,
    }
}

/// Raw mode swallows SIGINT, so Ctrl+C arrives as a key event.
pub fn parse_key_event(key: &KeyEvent) -> Option<UiCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(UiCommand::Quit);
    }
    parse_main_command(&key.code)
}
