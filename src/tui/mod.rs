//! Terminal front end for the add-liquidity form
//!
//! Draws the [`SessionView`](crate::session::SessionView) published by the
//! controller and turns key presses into controller commands.

pub mod app;
pub mod events;
pub mod ui;

pub use app::{App, Focus, FormInputs};
pub use events::{Event, EventHandler};
pub use ui::render_ui;

use crate::controller::ControllerHandle;
use crate::Error;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

pub type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Global flag to track if terminal cleanup is needed
static TERMINAL_NEEDS_CLEANUP: AtomicBool = AtomicBool::new(false);

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<TuiTerminal, Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    TERMINAL_NEEDS_CLEANUP.store(true, Ordering::SeqCst);
    Ok(terminal)
}

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal(terminal: &mut TuiTerminal) -> Result<(), Error> {
    if TERMINAL_NEEDS_CLEANUP.swap(false, Ordering::SeqCst) {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
    }
    Ok(())
}

/// Best-effort restoration for panics
fn emergency_terminal_cleanup() {
    if TERMINAL_NEEDS_CLEANUP.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = execute!(io::stdout(), cursor::Show);
    }
}

/// Restore the terminal before the default panic output is printed
pub fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        emergency_terminal_cleanup();
        original_hook(panic_info);
    }));
}

/// Run the form until the user quits, then stop the controller
pub async fn run_tui(handle: ControllerHandle, network_name: String) -> Result<(), Error> {
    setup_panic_handler();

    let mut terminal = init_terminal().inspect_err(|_| emergency_terminal_cleanup())?;

    let mut app = App::new(handle, network_name);
    let mut event_handler = EventHandler::new();

    let app_result = run_app_loop(&mut terminal, &mut app, &mut event_handler).await;

    if let Err(restore_error) = restore_terminal(&mut terminal) {
        if app_result.is_ok() {
            return Err(restore_error);
        }
        warn!(error = %restore_error, "failed to restore terminal");
    }

    app.shutdown().await?;
    app_result
}

async fn run_app_loop(
    terminal: &mut TuiTerminal,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<(), Error> {
    loop {
        app.poll_view();
        terminal.draw(|frame| render_ui(frame, app))?;

        // Time out so controller updates are drawn without input
        match tokio::time::timeout(Duration::from_millis(100), event_handler.next()).await {
            Ok(Ok(event)) => {
                if let Err(e) = app.handle_event(event) {
                    app.set_status(format!("Error: {}", e));
                }
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {}
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_cleanup_resets_flag() {
        TERMINAL_NEEDS_CLEANUP.store(false, Ordering::SeqCst);
        emergency_terminal_cleanup();
        assert!(!TERMINAL_NEEDS_CLEANUP.load(Ordering::SeqCst));
    }
}
