mod app;
mod help_text;
mod ui;

pub use app::{App, AppMode};

use color_eyre::Result;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::DefaultTerminal;
use std::io::stdout;
use std::time::Duration;

/// Poll interval; also how quickly background results reach the screen.
const TICK: Duration = Duration::from_millis(100);

/// Run the event loop until the user quits.
///
/// Drawing and key handling happen on this thread. Fetches and highlighter
/// loading run on the app's tokio runtime and report back through its
/// channel, which is drained once per tick.
pub fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
    loop {
        app.process_messages();
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

/// Set up the terminal, run the app, and restore the terminal afterwards
/// even when the loop fails.
pub fn launch(app: App) -> Result<()> {
    enable_raw_mode().inspect_err(|e| eprintln!("Failed to enable raw mode: {e}"))?;
    stdout().execute(EnterAlternateScreen).inspect_err(|_| {
        disable_raw_mode().ok();
    })?;

    let backend = ratatui::backend::CrosstermBackend::new(stdout());
    let mut terminal = ratatui::Terminal::new(backend).inspect_err(|_| {
        stdout().execute(LeaveAlternateScreen).ok();
        disable_raw_mode().ok();
    })?;

    let result = run(&mut terminal, app);

    stdout().execute(LeaveAlternateScreen).ok();
    disable_raw_mode().ok();
    terminal.show_cursor().ok();
    result
}
