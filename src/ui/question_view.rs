//! Daily question screen rendering
//!
//! Renders the question card with its randomized answer list, selection
//! feedback, the revealed answer, and any fetch error.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Renders the daily question view
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Min(10),    // Question card
            Constraint::Length(1),  // Key hints
        ])
        .split(area);

    render_title(frame, chunks[0]);
    render_card(frame, app, chunks[1]);
    render_hints(frame, app, chunks[2]);
}

/// Renders the application title bar
fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Daily Trivia",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));

    frame.render_widget(title, area);
}

/// Renders the question card: prompt, answers, feedback, and errors
fn render_card(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.session.state();

    let Some(question) = &state.current_question else {
        render_error_only(frame, state.error_message.as_deref(), area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    // Category and difficulty header
    lines.push(Line::from(vec![
        Span::styled(
            question.category.clone(),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  ·  "),
        Span::styled(
            question.difficulty.clone(),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    lines.push(Line::from(""));

    // The question text
    lines.push(Line::from(Span::styled(
        question.prompt.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    // Answer rows
    for (index, answer) in app.answers.iter().enumerate() {
        lines.push(answer_line(app, answer, index == app.selected_index));
    }
    lines.push(Line::from(""));

    // Feedback after a selection
    if let Some(is_correct) = state.is_correct {
        let (text, color) = if is_correct {
            ("Correct!", Color::Green)
        } else {
            ("Incorrect, try again!", Color::Red)
        };
        lines.push(Line::from(Span::styled(text, Style::default().fg(color))));
    }

    // Revealed answer
    if app.show_answer {
        lines.push(Line::from(vec![
            Span::styled("Correct answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                question.correct_answer.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    // A fetch failure never clears the question; show both
    if let Some(error) = &state.error_message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    let card = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Today's Question ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );

    frame.render_widget(card, area);
}

/// Renders the error screen shown when no question has loaded yet
fn render_error_only(frame: &mut Frame, error: Option<&str>, area: Rect) {
    let message = match error {
        Some(error) => format!("Error: {}", error),
        None => "No question loaded".to_string(),
    };

    let lines = vec![
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let card = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(" Today's Question ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );

    frame.render_widget(card, area);
}

/// Builds one answer row with cursor and correctness styling
fn answer_line<'a>(app: &App, answer: &'a str, is_cursor: bool) -> Line<'a> {
    let state = app.session.state();
    let marker = if is_cursor { "▸ " } else { "  " };

    let style = answer_style(
        answer,
        state.selected_answer.as_deref(),
        state
            .current_question
            .as_ref()
            .map(|q| q.correct_answer.as_str()),
        app.show_answer,
        is_cursor,
    );

    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(answer, style),
    ])
}

/// Determines the style for an answer row
///
/// With the answer revealed, the correct row is green and a wrong pick red.
/// Before that, the picked row is colored by its correctness alone.
fn answer_style(
    answer: &str,
    selected: Option<&str>,
    correct: Option<&str>,
    show_answer: bool,
    is_cursor: bool,
) -> Style {
    let is_selected = selected == Some(answer);
    let is_correct_answer = correct == Some(answer);

    let mut style = if show_answer {
        if is_correct_answer {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        }
    } else if is_selected {
        if is_correct_answer {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red)
        }
    } else {
        Style::default()
    };

    if is_cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

/// Renders the key hint footer
fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = "↑/↓ move · Enter select · a reveal · ? help · q quit".to_string();
    if app.session.state().error_message.is_some() {
        hints.push_str(" · r retry");
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}
