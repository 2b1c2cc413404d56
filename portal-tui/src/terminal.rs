//! Raw-mode terminal with restore on drop and on panic.

use std::io::{self, Stdout, Write};
use std::panic;

use crossterm::{
    cursor, execute, queue,
    style::{Print, PrintStyledContent, Stylize},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

/// How a line should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Bold,
    Reversed,
    Dim,
}

pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    pub fn new() -> io::Result<Self> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            original_hook(info);
        }));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { stdout })
    }

    /// Terminal size as (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Replace the screen contents with `lines`, clipped to the terminal height.
    pub fn draw(&mut self, lines: &[(String, LineStyle)]) -> io::Result<()> {
        let (_, rows) = self.size()?;
        queue!(self.stdout, Clear(ClearType::All))?;
        for (y, (line, style)) in lines.iter().take(rows as usize).enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, y as u16))?;
            match style {
                LineStyle::Plain => queue!(self.stdout, Print(line))?,
                LineStyle::Bold => queue!(self.stdout, PrintStyledContent(line.as_str().bold()))?,
                LineStyle::Reversed => {
                    queue!(self.stdout, PrintStyledContent(line.as_str().reverse()))?
                }
                LineStyle::Dim => queue!(self.stdout, PrintStyledContent(line.as_str().dim()))?,
            }
        }
        self.stdout.flush()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), cursor::Show, LeaveAlternateScreen)?;
    Ok(())
}
