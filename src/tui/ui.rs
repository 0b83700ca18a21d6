use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use chrono::{Local, Utc};

use crate::chat::{describe_tool_calls, QUICK_ACTIONS};
use crate::dashboard::{Stats, TaskFilter};
use crate::due::{due_label, format_due, time_left, DueLabel};
use crate::forms::{AuthMode, TaskField};
use crate::models::{Priority, Role};
use crate::validation::Field;
use super::app::{App, Screen};

pub fn ui(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Login | Screen::Signup => auth_screen(f, app),
        Screen::Dashboard => dashboard(f, app),
        Screen::Chat => chat(f, app),
    }
}

fn help_bar(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn banner(app: &App) -> Option<Line<'static>> {
    if let Some(err) = &app.error {
        return Some(Line::styled(err.clone(), Style::default().fg(Color::Red)));
    }
    app.status
        .as_ref()
        .map(|s| Line::styled(s.clone(), Style::default().fg(Color::Green)))
}

fn field_lines(label: &str, value: String, focused: bool, error: Option<&str>) -> Vec<Line<'static>> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let marker = if focused { "> " } else { "  " };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{}{}: ", marker, label), style.add_modifier(Modifier::BOLD)),
        Span::styled(value, style),
    ])];
    if let Some(message) = error {
        lines.push(Line::styled(format!("    {}", message), Style::default().fg(Color::Red)));
    }
    lines
}

fn auth_screen(f: &mut Frame, app: &App) {
    let form = &app.auth_form;
    let title = match form.mode {
        AuthMode::Login => "TaskFlow - Sign in",
        AuthMode::Signup => "TaskFlow - Create account",
    };

    let mut lines = Vec::new();
    for field in form.fields() {
        let (label, value) = match field {
            Field::Email => ("Email", form.email.clone()),
            Field::Password => ("Password", "*".repeat(form.password.chars().count())),
            _ => ("Confirm", "*".repeat(form.confirm.chars().count())),
        };
        lines.extend(field_lines(label, value, form.focus == *field, form.errors.get(*field)));
        lines.push(Line::default());
    }
    if let Some(line) = banner(app) {
        lines.push(line);
    }

    let area = centered_rect(60, 14, f.area());
    f.render_widget(Clear, area);
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(body, area);

    let switch = match form.mode {
        AuthMode::Login => "F2: Create account",
        AuthMode::Signup => "F2: Back to sign in",
    };
    let help_area = Rect {
        y: f.area().height.saturating_sub(3),
        height: 3.min(f.area().height),
        ..f.area()
    };
    help_bar(f, help_area, &format!("Tab: Next field | Enter: Submit | {} | Esc: Quit", switch));
}

fn stats_bar(f: &mut Frame, area: Rect, stats: Stats) {
    let cells = [
        ("Total", stats.total, Color::Cyan),
        ("Completed", stats.completed, Color::Green),
        ("Pending", stats.pending, Color::Yellow),
        ("Overdue", stats.overdue, Color::Red),
    ];
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    for (i, (label, value, color)) in cells.into_iter().enumerate() {
        let p = Paragraph::new(value.to_string())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title(label));
        f.render_widget(p, chunks[i]);
    }
}

fn dashboard(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Stats
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Banner
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let now = Local::now();
    let now_utc = now.with_timezone(&Utc);
    stats_bar(f, chunks[0], Stats::from_tasks(&app.tasks, now_utc));

    let rows: Vec<Row> = app
        .visible_tasks()
        .into_iter()
        .map(|t| {
            let style = if t.completed {
                Style::default().fg(Color::DarkGray)
            } else if t.is_overdue_at(now_utc) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            let priority_color = match t.priority {
                Priority::High => Color::Red,
                Priority::Medium => Color::Yellow,
                Priority::Low => Color::Green,
            };
            let due = match (format_due(t), due_label(t, now)) {
                (Some(d), Some(label @ (DueLabel::DueToday | DueLabel::DueTomorrow))) => {
                    format!("{} ({})", d, label)
                }
                (Some(d), _) => d,
                (None, _) => "-".to_string(),
            };

            Row::new(vec![
                Cell::from(if t.completed { "[x]" } else { "[ ]" }),
                Cell::from(t.title.clone()),
                Cell::from(t.priority.label()).style(Style::default().fg(priority_color)),
                Cell::from(due),
                Cell::from(time_left(t, now)),
                Cell::from(t.status_label(now_utc)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(28),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let filters = TaskFilter::ALL
        .iter()
        .map(|f| if *f == app.filter { format!("[{}]", f) } else { f.to_string() })
        .collect::<Vec<_>>()
        .join(" ");
    let title = format!("TaskFlow - Tasks  {}", filters);

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Title", "Priority", "Due", "Time Left", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);

    if app.visible_tasks().is_empty() {
        let empty = match app.filter {
            TaskFilter::All => "No tasks yet. Press 'a' to add one.",
            TaskFilter::Pending => "No pending tasks.",
            TaskFilter::Completed => "No completed tasks.",
        };
        let inner = centered_rect(50, 1, chunks[1]);
        f.render_widget(
            Paragraph::new(empty).style(Style::default().fg(Color::Gray)),
            inner,
        );
    }

    if let Some(line) = banner(app) {
        f.render_widget(Paragraph::new(line), chunks[2]);
    }

    let help_text = if app.form.is_some() {
        "Tab/Up/Down: Field | Any key on Priority: Cycle | Enter: Save | Esc: Cancel"
    } else {
        "q: Quit | a: Add | e: Edit | Space: Toggle | d: Del | f: Filter | r: Reload | c: Chat | L: Logout"
    };
    help_bar(f, chunks[3], help_text);

    if let Some(form) = &app.form {
        let mut lines = Vec::new();
        for field in TaskField::ORDER {
            let error = match field {
                TaskField::Title => form.errors.get(Field::Title),
                TaskField::DueDate => form.errors.get(Field::DueDate),
                _ => None,
            };
            lines.extend(field_lines(field.label(), form.value(field), form.focus == field, error));
        }

        let area = centered_rect(70, 10, f.area());
        f.render_widget(Clear, area);
        let title = match form.editing {
            Some(id) => format!("Edit Task {}", id),
            None => "Add Task".to_string(),
        };
        let popup = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(popup, area);
    }
}

fn chat(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Messages
            Constraint::Length(3), // Input
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let mut lines = Vec::new();
    for message in app.conversation.messages() {
        let (who, style) = match (message.role, message.is_error) {
            (_, true) => ("Assistant", Style::default().fg(Color::Red)),
            (Role::User, _) => ("You", Style::default().fg(Color::Cyan)),
            (Role::Assistant, _) => ("Assistant", Style::default().fg(Color::Green)),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", who), style.add_modifier(Modifier::BOLD)),
            Span::styled(
                message.timestamp.with_timezone(&Local).format("%H:%M").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for text in message.content.lines() {
            lines.push(Line::styled(text.to_string(), style));
        }
        if let Some(actions) = describe_tool_calls(&message.tool_calls) {
            lines.push(Line::styled(actions, Style::default().fg(Color::Magenta)));
        }
        lines.push(Line::default());
    }
    if app.conversation.is_loading() {
        lines.push(Line::styled("Thinking...", Style::default().fg(Color::DarkGray)));
    }

    let history = Paragraph::new(lines).wrap(Wrap { trim: false });
    let scroll = bottom_scroll(&history, chunks[0]);
    let history = history
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("TaskFlow Assistant"));
    f.render_widget(history, chunks[0]);

    let input = Paragraph::new(app.chat_input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Message"));
    f.render_widget(input, chunks[1]);

    let quick = QUICK_ACTIONS
        .iter()
        .enumerate()
        .map(|(i, (label, _))| format!("F{}: {}", i + 1, label))
        .collect::<Vec<_>>()
        .join(" | ");
    help_bar(f, chunks[2], &format!("Enter: Send | {} | Esc: Back", quick));
}

/// Vertical offset that keeps the last wrapped row of an unbordered
/// `paragraph` in view once drawn inside a bordered `area`.
fn bottom_scroll(paragraph: &Paragraph, area: Rect) -> u16 {
    let width = area.width.saturating_sub(2);
    let height = usize::from(area.height.saturating_sub(2));
    let rows = paragraph.line_count(width);
    u16::try_from(rows.saturating_sub(height)).unwrap_or(u16::MAX)
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height - height) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height - height) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_scroll_counts_wrapped_rows() {
        // One logical line that wraps to many rows in a narrow box.
        let text = "word ".repeat(40);
        let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
        let area = Rect::new(0, 0, 12, 5);

        let rows = paragraph.line_count(10);
        assert!(rows > 3);
        assert_eq!(bottom_scroll(&paragraph, area), (rows - 3) as u16);
    }

    #[test]
    fn short_history_does_not_scroll() {
        let paragraph = Paragraph::new("hi").wrap(Wrap { trim: false });
        assert_eq!(bottom_scroll(&paragraph, Rect::new(0, 0, 40, 10)), 0);
    }
}
