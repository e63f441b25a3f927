use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::finance::Term;
use crate::funnel::Funnel;
use crate::money::{format_money, format_money_precise};
use crate::navigation::Screen;
use crate::storage::FlagStore;

pub fn ui<S: FlagStore>(f: &mut Frame, funnel: &Funnel<S>) {
    match funnel.screen() {
        Screen::Calculator => render_calculator_screen(f, funnel),
        Screen::Confirm => render_confirm_screen(f, funnel),
        Screen::Success => render_success_screen(f),
    }
}

fn title(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM))
}

fn help(text: &'static str) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
}

fn button(label: &str, enabled: bool) -> Paragraph<'static> {
    let style = if enabled {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Paragraph::new(format!("[ {label} ]"))
        .style(style)
        .alignment(Alignment::Center)
}

fn render_calculator_screen<S: FlagStore>(f: &mut Frame, funnel: &Funnel<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    let config = funnel.config();
    let state = funnel.state();
    let symbol = config.currency_symbol.as_str();

    f.render_widget(
        title(format!(
            "Get up to {} in installments",
            format_money(config.max_amount as f64, symbol)
        )),
        chunks[0],
    );

    let pitch = Paragraph::new("The money goes straight to your card. No trip to the bank.")
        .alignment(Alignment::Center);
    f.render_widget(pitch, chunks[1]);

    let valid = state.is_amount_valid();
    let field_style = if valid {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red)
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if valid {
            Style::default()
        } else {
            Style::default().fg(Color::Red)
        })
        .title("Enter amount");
    let input = Paragraph::new(state.amount_text().to_string())
        .style(field_style)
        .block(input_block);
    f.render_widget(input, chunks[2]);
    place_cursor(f, chunks[2], state.amount_field().cursor());

    let range = Paragraph::new(format!(
        "from {} to {}",
        format_money(state.min_amount() as f64, symbol),
        format_money(state.max_amount() as f64, symbol)
    ))
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(range, chunks[3]);

    let terms: Vec<Span> = Term::ALL
        .iter()
        .flat_map(|term| {
            let label = format!(" {} mo ", term.months());
            let span = if *term == state.term() {
                Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(label, Style::default().fg(Color::Gray))
            };
            [span, Span::raw(" ")]
        })
        .collect();
    let term_picker = Paragraph::new(Line::from(terms))
        .block(Block::default().borders(Borders::ALL).title("Choose a term"));
    f.render_widget(term_picker, chunks[4]);

    let payment = match state.quote() {
        Some(quote) => format!("{} per month", format_money(quote.payment, symbol)),
        None => "— per month".to_string(),
    };
    let card = Paragraph::new(vec![
        Line::from(Span::styled(
            payment,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "including the service fee",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(card, chunks[5]);

    f.render_widget(button("Continue", funnel.can_continue()), chunks[6]);

    f.render_widget(
        help("0-9: edit | ←/→: move | Tab/↑↓: term | Enter: continue | [/]: history | q: quit"),
        chunks[7],
    );
}

/// Keeps the caret on the same character across redraws.
fn place_cursor(f: &mut Frame, field: Rect, cursor: usize) {
    let (x, y) = cursor_position(field, cursor);
    f.set_cursor(x, y);
}

/// Terminal cell of the caret inside a bordered field, clamped to its last
/// inner column when the text is wider than the field.
fn cursor_position(field: Rect, cursor: usize) -> (u16, u16) {
    let inner_width = field.width.saturating_sub(2);
    let offset = u16::try_from(cursor)
        .unwrap_or(u16::MAX)
        .min(inner_width.saturating_sub(1));
    (field.x + 1 + offset, field.y + 1)
}

fn render_confirm_screen<S: FlagStore>(f: &mut Frame, funnel: &Funnel<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    f.render_widget(title("Check everything and apply".to_string()), chunks[0]);

    let state = funnel.state();
    let symbol = funnel.config().currency_symbol.as_str();
    let (payment, fee) = match state.quote() {
        Some(quote) => (
            format_money(quote.payment, symbol),
            format_money_precise(quote.service_fee, symbol),
        ),
        None => ("—".to_string(), "—".to_string()),
    };
    let amount = state
        .amount()
        .map(|amount| format_money(amount as f64, symbol))
        .unwrap_or_else(|| "—".to_string());

    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<22}"), Style::default().fg(Color::DarkGray)),
            Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
        ])
    };
    let summary = Paragraph::new(vec![
        row("Total in installments", amount),
        row("Service fee", fee),
        row("Monthly payment", payment),
        row("Term", format!("{} months", state.term().months())),
    ])
    .block(Block::default().borders(Borders::ALL).title("Your installment"));
    f.render_widget(summary, chunks[1]);

    let account = Paragraph::new(format!("{}  Current account", symbol))
        .block(Block::default().borders(Borders::ALL).title("Where to send the money"));
    f.render_widget(account, chunks[2]);

    let submit = if funnel.is_submitting() {
        button("Sending…", false)
    } else {
        button("Apply for installment", funnel.can_submit())
    };
    f.render_widget(submit, chunks[3]);

    f.render_widget(
        help("Enter: apply | Esc/h/←: back | [/]: history | q: quit"),
        chunks[4],
    );
}

fn render_success_screen(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    f.render_widget(title("Thank you!".to_string()), chunks[0]);

    let message = Paragraph::new(vec![
        Line::from(Span::styled(
            "Just between us",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(
            "You took part in a very important study that will help improve the product. \
             You are our hero!",
        ),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(message, chunks[1]);

    f.render_widget(help("q/Esc/Enter: exit"), chunks[2]);
}
