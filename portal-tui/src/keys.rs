//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tab::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing into the search box.
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextTab,
    PreviousTab,
    BeginSearch,
    /// Leave the search box, settling the query now.
    SubmitSearch,
    /// Leave the search box and let the debounce settle on its own.
    LeaveSearch,
    SearchChar(char),
    SearchBackspace,
    Tab(Command),
    Ignore,
}

pub fn map_key(key: KeyEvent, mode: Mode) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match mode {
        Mode::Search => match key.code {
            KeyCode::Enter => Action::SubmitSearch,
            KeyCode::Esc => Action::LeaveSearch,
            KeyCode::Backspace => Action::SearchBackspace,
            KeyCode::Char(c) => Action::SearchChar(c),
            _ => Action::Ignore,
        },
        Mode::Normal => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Tab => Action::NextTab,
            KeyCode::BackTab => Action::PreviousTab,
            KeyCode::Char('/') => Action::BeginSearch,
            KeyCode::Esc => Action::Tab(Command::ClearSearch),
            KeyCode::Up | KeyCode::Char('k') => Action::Tab(Command::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Action::Tab(Command::CursorDown),
            KeyCode::Right | KeyCode::PageDown => Action::Tab(Command::NextPage),
            KeyCode::Left | KeyCode::PageUp => Action::Tab(Command::PreviousPage),
            KeyCode::Home => Action::Tab(Command::FirstPage),
            KeyCode::End => Action::Tab(Command::LastPage),
            KeyCode::Char('[') => Action::Tab(Command::FocusColumn(-1)),
            KeyCode::Char(']') => Action::Tab(Command::FocusColumn(1)),
            KeyCode::Char('s') => Action::Tab(Command::Sort),
            KeyCode::Char(' ') => Action::Tab(Command::ToggleRow),
            KeyCode::Char('a') => Action::Tab(Command::ToggleAll),
            KeyCode::Char('x') => Action::Tab(Command::ClearSelection),
            KeyCode::Char('d') => Action::Tab(Command::Delete),
            KeyCode::Char('+') | KeyCode::Char('=') => Action::Tab(Command::GrowPageSize),
            KeyCode::Char('-') => Action::Tab(Command::ShrinkPageSize),
            KeyCode::Char('r') => Action::Tab(Command::Refresh),
            _ => Action::Ignore,
        },
    }
}

/// One-line key reference for the status bar.
pub fn help(mode: Mode) -> &'static str {
    match mode {
        Mode::Normal => {
            "/ search  ←→ page  ↑↓ row  [ ] column  s sort  space select  a all  d delete  +/- size  tab switch  q quit"
        }
        Mode::Search => "type to search  enter apply  esc done",
    }
}
