//! Add-liquidity screen state
//!
//! [`App`] owns the text inputs and the focus, and forwards every edit to
//! the controller. What gets drawn comes from the latest [`SessionView`]
//! the controller published, never from the inputs alone.

use tokio::sync::watch;
use tui_input::{Input, InputRequest};

use crate::controller::{Command, ControllerHandle};
use crate::error::Error;
use crate::form::Field;
use crate::session::SessionView;
use crate::tui::events::Event;

/// Focusable controls, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Output,
    Token,
    Submit,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Input => Focus::Output,
            Focus::Output => Focus::Token,
            Focus::Token => Focus::Submit,
            Focus::Submit => Focus::Input,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Input => Focus::Submit,
            Focus::Output => Focus::Input,
            Focus::Token => Focus::Output,
            Focus::Submit => Focus::Token,
        }
    }

    fn field(self) -> Option<Field> {
        match self {
            Focus::Input => Some(Field::Input),
            Focus::Output => Some(Field::Output),
            _ => None,
        }
    }
}

/// What a key press asks the app to do
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Send(Command),
    Quit,
}

/// Text inputs and screen-local toggles
#[derive(Debug, Clone)]
pub struct FormInputs {
    pub input: Input,
    pub output: Input,
    pub token: Input,
    pub focus: Focus,
    pub show_details: bool,
    /// Mirror the focused amount field from the next view (after a Max key)
    resync_focused: bool,
}

impl FormInputs {
    pub fn from_view(view: &SessionView) -> Self {
        Self {
            input: Input::default().with_value(view.form.input_value.clone()),
            output: Input::default().with_value(view.form.output_value.clone()),
            token: Input::default().with_value(view.form.output_currency.clone()),
            focus: Focus::Input,
            show_details: false,
            resync_focused: false,
        }
    }

    fn amount_input(&mut self, field: Field) -> &mut Input {
        match field {
            Field::Input => &mut self.input,
            Field::Output => &mut self.output,
        }
    }

    /// Copy controller-owned values into the inputs the user is not typing in
    pub fn sync_from_view(&mut self, view: &SessionView) {
        for (field, value) in [
            (Field::Input, &view.form.input_value),
            (Field::Output, &view.form.output_value),
        ] {
            let focused = self.focus.field() == Some(field);
            if focused && !self.resync_focused {
                continue;
            }
            let input = self.amount_input(field);
            if input.value() != value {
                *input = Input::default().with_value(value.clone());
            }
        }
        if self.focus != Focus::Token && self.token.value() != view.form.output_currency {
            self.token = Input::default().with_value(view.form.output_currency.clone());
        }
        self.resync_focused = false;
    }

    /// Map a key to an action, updating local input state on the way
    pub fn handle_event(&mut self, event: &Event, view: &SessionView) -> Action {
        if view.show_token_warning {
            return match event {
                Event::Escape | Event::Enter => Action::Send(Command::DismissTokenWarning),
                Event::Quit => Action::Quit,
                _ => Action::None,
            };
        }

        match event {
            Event::Quit => Action::Quit,
            Event::Tab => {
                self.focus = self.focus.next();
                Action::None
            }
            Event::BackTab => {
                self.focus = self.focus.previous();
                Action::None
            }
            Event::Refresh => Action::Send(Command::Refresh),
            Event::F(2) => {
                self.resync_focused = true;
                Action::Send(Command::UseMaxInput)
            }
            Event::F(3) => {
                self.resync_focused = true;
                Action::Send(Command::UseMaxOutput)
            }
            Event::F(4) => {
                self.show_details = !self.show_details;
                Action::None
            }
            Event::Enter => match self.focus {
                Focus::Token => Action::Send(Command::SelectCurrency(
                    self.token.value().trim().to_string(),
                )),
                Focus::Submit if view.can_submit => Action::Send(Command::Submit),
                _ => Action::None,
            },
            _ => self.edit(event),
        }
    }

    fn edit(&mut self, event: &Event) -> Action {
        let request = match event {
            Event::Char(c) => InputRequest::InsertChar(*c),
            Event::Backspace => InputRequest::DeletePrevChar,
            Event::Delete => InputRequest::DeleteNextChar,
            Event::Left => InputRequest::GoToPrevChar,
            Event::Right => InputRequest::GoToNextChar,
            Event::Home => InputRequest::GoToStart,
            Event::End => InputRequest::GoToEnd,
            _ => return Action::None,
        };

        match self.focus {
            Focus::Input | Focus::Output => {
                let Some(field) = self.focus.field() else {
                    return Action::None;
                };
                let input = self.amount_input(field);
                let before = input.value().to_string();
                input.handle(request);
                let value = input.value().to_string();
                if value == before {
                    Action::None
                } else {
                    Action::Send(Command::EditField { field, value })
                }
            }
            Focus::Token => {
                self.token.handle(request);
                Action::None
            }
            Focus::Submit => Action::None,
        }
    }
}

/// Main application state
pub struct App {
    handle: ControllerHandle,
    updates: watch::Receiver<SessionView>,
    pub view: SessionView,
    pub inputs: FormInputs,
    pub network_name: String,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(handle: ControllerHandle, network_name: String) -> Self {
        let updates = handle.subscribe();
        let view = handle.view();
        let inputs = FormInputs::from_view(&view);
        Self {
            handle,
            updates,
            view,
            inputs,
            network_name,
            status: None,
            should_quit: false,
        }
    }

    /// Pick up a newly published view, if any
    pub fn poll_view(&mut self) {
        if self.updates.has_changed().unwrap_or(false) {
            self.view = self.updates.borrow_and_update().clone();
            self.inputs.sync_from_view(&self.view);
        }
    }

    pub fn handle_event(&mut self, event: Event) -> Result<(), Error> {
        match self.inputs.handle_event(&event, &self.view) {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::Send(command) => {
                if command == Command::Submit {
                    self.status = Some("Submitting addLiquidity...".to_string());
                }
                self.handle.send(command)?;
            }
        }
        Ok(())
    }

    pub fn set_status(&mut self, status: String) {
        self.status = Some(status);
    }

    pub async fn shutdown(self) -> Result<(), Error> {
        self.handle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> FormInputs {
        FormInputs::from_view(&SessionView::default())
    }

    #[test]
    fn test_typing_sends_edit() {
        let mut inputs = inputs();
        let view = SessionView::default();
        let action = inputs.handle_event(&Event::Char('1'), &view);
        assert_eq!(
            action,
            Action::Send(Command::EditField {
                field: Field::Input,
                value: "1".to_string()
            })
        );
    }

    #[test]
    fn test_token_selected_on_enter() {
        let mut inputs = inputs();
        let view = SessionView::default();
        inputs.handle_event(&Event::Tab, &view);
        inputs.handle_event(&Event::Tab, &view);
        assert_eq!(inputs.focus, Focus::Token);

        for c in "TTok".chars() {
            assert_eq!(inputs.handle_event(&Event::Char(c), &view), Action::None);
        }
        assert_eq!(
            inputs.handle_event(&Event::Enter, &view),
            Action::Send(Command::SelectCurrency("TTok".to_string()))
        );
    }

    #[test]
    fn test_submit_requires_can_submit() {
        let mut inputs = inputs();
        let mut view = SessionView::default();
        inputs.focus = Focus::Submit;
        assert_eq!(inputs.handle_event(&Event::Enter, &view), Action::None);

        view.can_submit = true;
        assert_eq!(
            inputs.handle_event(&Event::Enter, &view),
            Action::Send(Command::Submit)
        );
    }

    #[test]
    fn test_token_warning_captures_keys() {
        let mut inputs = inputs();
        let view = SessionView {
            show_token_warning: true,
            ..Default::default()
        };
        assert_eq!(inputs.handle_event(&Event::Char('1'), &view), Action::None);
        assert_eq!(
            inputs.handle_event(&Event::Escape, &view),
            Action::Send(Command::DismissTokenWarning)
        );
    }

    #[test]
    fn test_sync_keeps_focused_field() {
        let mut inputs = inputs();
        let view = SessionView::default();
        inputs.handle_event(&Event::Char('1'), &view);
        inputs.handle_event(&Event::Char('2'), &view);

        // A view for the first keystroke arrives late
        let mut stale = SessionView::default();
        stale.form.input_value = "1".to_string();
        stale.form.output_value = "2.0".to_string();
        inputs.sync_from_view(&stale);

        assert_eq!(inputs.input.value(), "12");
        assert_eq!(inputs.output.value(), "2.0");
    }

    #[test]
    fn test_max_resyncs_focused_field() {
        let mut inputs = inputs();
        let view = SessionView::default();
        inputs.handle_event(&Event::F(2), &view);

        let mut max = SessionView::default();
        max.form.input_value = "9.9".to_string();
        inputs.sync_from_view(&max);
        assert_eq!(inputs.input.value(), "9.9");
    }
}
