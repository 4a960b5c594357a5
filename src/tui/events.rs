//! Event Handling System
//!
//! Terminal input is read on a background task and converted into
//! application [`Event`]s delivered over a channel.

use crossterm::event::{self, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::Error;

/// Application events that can be handled
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Quit the application
    Quit,
    /// Move focus to the next control
    Tab,
    /// Move focus to the previous control (Shift+Tab)
    BackTab,
    Enter,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Char(char),
    Backspace,
    Delete,
    /// Function keys
    F(u8),
    /// Re-read the pool (F5)
    Refresh,
}

/// Event handler for processing terminal events
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    _terminal_task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let terminal_task = tokio::spawn(async move {
            loop {
                // Poll for events with a timeout to avoid blocking
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    if let Ok(event::Event::Key(key_event)) = event::read() {
                        if let Some(app_event) = Self::convert_key_event(key_event) {
                            if sender.send(app_event).is_err() {
                                break;
                            }
                        }
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });

        Self {
            receiver,
            _terminal_task: terminal_task,
        }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Result<Event, Error> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| Error::Channel("Event channel closed".to_string()))
    }

    /// Convert a key event to an application event
    pub fn convert_key_event(key_event: KeyEvent) -> Option<Event> {
        if key_event.kind != event::KeyEventKind::Press {
            return None;
        }
        let KeyEvent {
            code, modifiers, ..
        } = key_event;

        if modifiers.contains(KeyModifiers::CONTROL) {
            return match code {
                KeyCode::Char('c') | KeyCode::Char('q') => Some(Event::Quit),
                _ => None,
            };
        }

        match code {
            KeyCode::Tab => Some(Event::Tab),
            KeyCode::BackTab => Some(Event::BackTab),
            KeyCode::Enter => Some(Event::Enter),
            KeyCode::Esc => Some(Event::Escape),
            KeyCode::Left => Some(Event::Left),
            KeyCode::Right => Some(Event::Right),
            KeyCode::Up => Some(Event::Up),
            KeyCode::Down => Some(Event::Down),
            KeyCode::Home => Some(Event::Home),
            KeyCode::End => Some(Event::End),
            KeyCode::Backspace => Some(Event::Backspace),
            KeyCode::Delete => Some(Event::Delete),
            KeyCode::F(5) => Some(Event::Refresh),
            KeyCode::F(n) => Some(Event::F(n)),
            KeyCode::Char(c) => Some(Event::Char(c)),
            _ => None,
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(
            EventHandler::convert_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::Quit)
        );
    }

    #[test]
    fn test_plain_q_is_text() {
        // Token addresses and symbols may contain a q
        assert_eq!(
            EventHandler::convert_key_event(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Event::Char('q'))
        );
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(
            EventHandler::convert_key_event(key(KeyCode::F(5), KeyModifiers::NONE)),
            Some(Event::Refresh)
        );
        assert_eq!(
            EventHandler::convert_key_event(key(KeyCode::F(2), KeyModifiers::NONE)),
            Some(Event::F(2))
        );
    }

    #[test]
    fn test_shift_tab() {
        assert_eq!(
            EventHandler::convert_key_event(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Event::BackTab)
        );
    }
}
