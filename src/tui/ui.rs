//! UI Rendering Logic
//!
//! Draws the add-liquidity form: two amount panels, the token selector,
//! pool overview, the contextual message, expandable transaction details
//! and the submit button, plus the unknown-token warning on top.

use ratatui::{prelude::*, widgets::*};
use tui_input::Input;

use crate::session::{SessionView, TransactionDetails};
use crate::tui::app::{App, Focus, FormInputs};
use crate::validation::ValidationMessage;

/// Main UI rendering function
pub fn render_ui(frame: &mut Frame, app: &App) {
    render_liquidity_form(
        frame,
        &app.view,
        &app.inputs,
        &app.network_name,
        app.status.as_deref(),
    );
}

/// Render the whole screen from a view and the local inputs
pub fn render_liquidity_form(
    frame: &mut Frame,
    view: &SessionView,
    inputs: &FormInputs,
    network_name: &str,
    status: Option<&str>,
) {
    let details_height = if inputs.show_details { 9 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Base amount
            Constraint::Length(4), // Token amount
            Constraint::Length(3), // Token selector
            Constraint::Length(5), // Pool summary
            Constraint::Length(3), // Contextual info
            Constraint::Length(details_height),
            Constraint::Length(3), // Submit
            Constraint::Min(1),    // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], view, network_name);
    render_amount_panel(
        frame,
        chunks[1],
        "Deposit",
        "TRX",
        &inputs.input,
        view.input_balance.as_deref(),
        view.input_error,
        inputs.focus == Focus::Input,
        "F2 max",
    );
    let output_title = if view.output_estimated {
        "Deposit (estimated)"
    } else {
        "Deposit"
    };
    render_amount_panel(
        frame,
        chunks[2],
        output_title,
        view.symbol.as_deref().unwrap_or("-"),
        &inputs.output,
        view.output_balance.as_deref(),
        view.output_error,
        inputs.focus == Focus::Output,
        "F3 max",
    );
    render_token_selector(frame, chunks[3], inputs);
    render_summary(frame, chunks[4], view);
    render_contextual_info(frame, chunks[5], view);
    if inputs.show_details {
        render_details(frame, chunks[6], view.details.as_ref());
    }
    render_submit(frame, chunks[7], view, inputs.focus == Focus::Submit);
    render_status_bar(frame, chunks[8], status);

    if view.show_token_warning {
        render_token_warning(frame, view);
    }
}

fn render_header(frame: &mut Frame, area: Rect, view: &SessionView, network_name: &str) {
    let block = match view.block {
        Some(number) => format!("block {}", number),
        None => "connecting...".to_string(),
    };
    let title = Line::from(vec![
        Span::styled(
            "Add Liquidity",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {}  ", network_name)),
        Span::styled(block, Style::default().fg(Color::DarkGray)),
    ]);
    let header = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

#[allow(clippy::too_many_arguments)]
fn render_amount_panel(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    symbol: &str,
    input: &Input,
    balance: Option<&str>,
    error: Option<ValidationMessage>,
    focused: bool,
    max_hint: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(format!(" {} ", title))
        .title(
            Line::from(format!(" Balance: {} ", balance.unwrap_or("-")))
                .alignment(Alignment::Right),
        );

    let value_line = Line::from(vec![
        Span::raw(if input.value().is_empty() {
            "0.0".to_string()
        } else {
            input.value().to_string()
        }),
        Span::styled(format!("  {}", symbol), Style::default().fg(Color::Cyan)),
    ]);
    let hint_line = match error {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(max_hint, Style::default().fg(Color::DarkGray))),
    };

    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(vec![value_line, hint_line]).block(block), area);

    if focused {
        frame.set_cursor_position((inner.x + input.visual_cursor() as u16, inner.y));
    }
}

fn render_token_selector(frame: &mut Frame, area: Rect, inputs: &FormInputs) {
    let focused = inputs.focus == Focus::Token;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(" Token (address, Enter to select) ");
    let inner = block.inner(area);
    frame.render_widget(
        Paragraph::new(inputs.token.value().to_string()).block(block),
        area,
    );
    if focused {
        frame.set_cursor_position((inner.x + inputs.token.visual_cursor() as u16, inner.y));
    }
}

fn render_summary(frame: &mut Frame, area: Rect, view: &SessionView) {
    let summary = &view.summary;
    let row = |label: &str, value: Option<&String>| {
        Line::from(vec![
            Span::styled(format!("{:<16}", label), Style::default().fg(Color::Gray)),
            Span::raw(value.cloned().unwrap_or_else(|| "-".to_string())),
        ])
    };
    let share = match (&summary.share_percent, &summary.share_amounts) {
        (Some(percent), Some(amounts)) => Some(format!("{}% ({})", percent, amounts)),
        _ => None,
    };
    let title = if view.is_new_exchange {
        " Pool (new exchange) "
    } else {
        " Pool "
    };
    let lines = vec![
        row("Exchange rate", summary.exchange_rate.as_ref()),
        row("Pool size", summary.pool_size.as_ref()),
        row("Your share", share.as_ref()),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

fn render_contextual_info(frame: &mut Frame, area: Rect, view: &SessionView) {
    let line = match &view.contextual_info {
        Some(info) => {
            let color = if info.is_error { Color::Red } else { Color::Gray };
            Line::from(Span::styled(info.message.to_string(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            "F4 transaction details",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(
        Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_details(frame: &mut Frame, area: Rect, details: Option<&TransactionDetails>) {
    let lines: Vec<Line> = match details {
        None => vec![Line::from("Enter amounts to see transaction details.")],
        Some(TransactionDetails::NewExchange {
            base_amount,
            token_amount,
            symbol,
            initial_rate,
            minted,
        }) => vec![
            Line::from("You are the first liquidity provider and set the initial rate."),
            Line::from(format!("You are adding {} TRX and {} {}.", base_amount, token_amount, symbol)),
            Line::from(format!(
                "Initial exchange rate: 1 TRX = {} {}",
                initial_rate.as_deref().unwrap_or("-"),
                symbol
            )),
            Line::from(format!("You will mint {} pool tokens.", minted)),
        ],
        Some(TransactionDetails::Existing {
            base_amount,
            max_token_amount,
            symbol,
            minted,
            total_supply,
            base_per_pool_token,
            token_per_pool_token,
        }) => vec![
            Line::from(format!(
                "You are adding between {} TRX and at most {} {}.",
                base_amount, max_token_amount, symbol
            )),
            Line::from(format!("You will mint {} pool tokens.", minted)),
            Line::from(format!("Current total supply: {} pool tokens.", total_supply)),
            Line::from(format!(
                "Each pool token is worth {} TRX and {} {}.",
                base_per_pool_token, token_per_pool_token, symbol
            )),
        ],
    };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Transaction details ")),
        area,
    );
}

fn render_submit(frame: &mut Frame, area: Rect, view: &SessionView, focused: bool) {
    let (label, style) = if view.show_unlock {
        (
            "Unlock the token before adding liquidity",
            Style::default().fg(Color::Red),
        )
    } else if view.can_submit {
        (
            "[ Add Liquidity ]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        ("[ Add Liquidity ]", Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(
        Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(focus_style(focused)),
            ),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, area: Rect, status: Option<&str>) {
    let help = "Tab focus | F2/F3 max | F4 details | F5 refresh | Ctrl+C quit";
    let text = match status {
        Some(status) => format!("{}  |  {}", status, help),
        None => help.to_string(),
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_token_warning(frame: &mut Frame, view: &SessionView) {
    let area = centered_rect(60, 30, frame.area());
    let origin = if view.token_from_link {
        "This token was added by the link you followed"
    } else {
        "This token is not in the token registry"
    };
    let lines = vec![
        Line::from(Span::styled(
            "Token imported",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "{}. Anyone can create a token, including fake versions of existing tokens. Make sure this is the token you want.",
            origin
        )),
        Line::from(""),
        Line::from("Press Esc or Enter to continue"),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            ),
        area,
    );
}

/// Rect of `percent_x` by `percent_y` centred in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
