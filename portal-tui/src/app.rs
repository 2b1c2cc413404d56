//! Console event loop.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::context::{PartnerIdentity, PortalContext};
use crate::error::AppError;
use crate::keys::{self, Action, Mode};
use crate::tab::{self, Command, Tab};
use crate::terminal::{LineStyle, TerminalGuard};

const TICK: Duration = Duration::from_millis(50);

pub struct App {
    partner: PartnerIdentity,
    tabs: Vec<Box<dyn Tab>>,
    active: usize,
    mode: Mode,
    /// Text typed into the active tab's search box.
    search: String,
    message: Option<String>,
    wake: mpsc::UnboundedReceiver<()>,
    quit: bool,
}

impl App {
    pub fn new(ctx: &PortalContext) -> Result<Self, AppError> {
        let (wake_tx, wake) = mpsc::unbounded_channel();
        let tabs = tab::build_tabs(ctx, wake_tx)?;
        Ok(Self {
            partner: ctx.partner.clone(),
            tabs,
            active: 0,
            mode: Mode::Normal,
            search: String::new(),
            message: None,
            wake,
            quit: false,
        })
    }

    pub async fn run(mut self) -> Result<(), AppError> {
        let mut terminal = TerminalGuard::new()?;
        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(TICK);

        self.switch_to(0);
        log::info!("Console started for {} (#{})", self.partner.name, self.partner.id);

        while !self.quit {
            self.tabs[self.active].pump();
            let (width, _) = terminal.size()?;
            terminal.draw(&self.frame(width as usize))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => self.on_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                },
                _ = self.wake.recv() => {}
                _ = tick.tick() => {}
            }
        }

        log::info!("Console closed");
        Ok(())
    }

    fn switch_to(&mut self, index: usize) {
        self.active = index % self.tabs.len();
        self.mode = Mode::Normal;
        self.search.clear();
        self.message = None;
        log::debug!("Switched to {}", self.tabs[self.active].title());
        self.tabs[self.active].enter();
    }

    fn on_key(&mut self, key: KeyEvent) {
        match keys::map_key(key, self.mode) {
            Action::Quit => self.quit = true,
            Action::NextTab => self.switch_to(self.active + 1),
            Action::PreviousTab => self.switch_to(self.active + self.tabs.len() - 1),
            Action::BeginSearch => self.mode = Mode::Search,
            Action::SubmitSearch => {
                self.mode = Mode::Normal;
                self.dispatch(Command::SubmitSearch);
            }
            Action::LeaveSearch => self.mode = Mode::Normal,
            Action::SearchChar(c) => {
                self.search.push(c);
                self.dispatch(Command::Search(self.search.clone()));
            }
            Action::SearchBackspace => {
                self.search.pop();
                self.dispatch(Command::Search(self.search.clone()));
            }
            Action::Tab(command) => {
                if command == Command::ClearSearch {
                    self.search.clear();
                }
                self.dispatch(command);
            }
            Action::Ignore => {}
        }
    }

    fn dispatch(&mut self, command: Command) {
        self.message = None;
        if let Err(err) = self.tabs[self.active].apply(command) {
            log::warn!("{}", err);
            self.message = Some(err.to_string());
        }
    }

    fn frame(&self, width: usize) -> Vec<(String, LineStyle)> {
        let titles: Vec<String> = self
            .tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                if i == self.active {
                    format!("[{}]", tab.title())
                } else {
                    format!(" {} ", tab.title())
                }
            })
            .collect();

        let mut lines = vec![
            (
                format!(" Partner Portal · {}   {}", self.partner.name, titles.join(" ")),
                LineStyle::Bold,
            ),
            (String::new(), LineStyle::Plain),
        ];

        for line in self.tabs[self.active].lines(width) {
            let style = if line.starts_with('›') {
                LineStyle::Reversed
            } else {
                LineStyle::Plain
            };
            lines.push((line, style));
        }

        lines.push((String::new(), LineStyle::Plain));
        let status = self
            .message
            .as_deref()
            .or_else(|| self.tabs[self.active].status())
            .unwrap_or_else(|| keys::help(self.mode));
        let status = match self.mode {
            Mode::Search => format!("search: {}▏  {}", self.search, status),
            Mode::Normal => status.to_string(),
        };
        lines.push((status, LineStyle::Dim));
        lines
    }
}
