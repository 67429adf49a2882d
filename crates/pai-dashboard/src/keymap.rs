use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pai_core::Command;

/// Key hints shown in the help line, in display order.
pub const HELP: [(&str, Command); 6] = [
    ("↑/k", Command::Up),
    ("↓/j", Command::Down),
    ("⏎", Command::ToggleDetail),
    ("r", Command::Refresh),
    ("s", Command::StartStop),
    ("q", Command::Quit),
];

pub fn command_for_event(event: &Event) -> Option<Command> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => command_for_key(key),
        _ => None,
    }
}

pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Command::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::Down),
        KeyCode::Enter => Some(Command::ToggleDetail),
        KeyCode::Char('r') => Some(Command::Refresh),
        KeyCode::Char('s') => Some(Command::StartStop),
        KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}
