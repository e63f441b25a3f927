//! Terminal front-end for the funnel.

mod input;
mod render;

use std::{io, time::Duration};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{debug, info};

use crate::funnel::{Funnel, FunnelEvent};
use crate::storage::FlagStore;

pub use input::{key_action, KeyAction};

/// How long to wait for a key before checking for submission outcomes.
const TICK: Duration = Duration::from_millis(100);

/// Takes over the terminal and runs the funnel until the user quits.
pub fn run<S: FlagStore>(funnel: &mut Funnel<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, funnel);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend, S: FlagStore>(terminal: &mut Terminal<B>, funnel: &mut Funnel<S>) -> Result<()> {
    funnel.apply(FunnelEvent::Start);
    loop {
        terminal.draw(|f| render::ui(f, funnel))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key_action(funnel.screen(), funnel.state().term(), key) {
                    KeyAction::Apply(event) => {
                        funnel.apply(event);
                    }
                    KeyAction::Quit => {
                        info!(screen = ?funnel.screen(), "session ended by user");
                        return Ok(());
                    }
                    KeyAction::Ignore => debug!(?key, "key ignored"),
                }
            }
        }

        funnel.poll_submission();
    }
}
