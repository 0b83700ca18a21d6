use std::io::{self, IsTerminal};
use chrono::{Local, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::chat::describe_tool_calls;
use crate::context::AppContext;
use crate::dashboard::{Stats, TaskFilter};
use crate::due::{due_label, format_due, time_left};
use crate::error::{Error, Result};
use crate::forms::{parse_due, TaskForm};
use crate::models::{Priority, Task, TaskPatch};
use crate::validation::{self, Field, ValidationErrors};

fn require_terminal(is_terminal: bool) -> Result<()> {
    if is_terminal {
        return Ok(());
    }
    Err(Error::Io(io::Error::other(
        "cannot read a password from non-interactive stdin, pass --password instead",
    )))
}

/// Reads a password without echoing it.
fn read_password(label: &str) -> Result<String> {
    require_terminal(io::stdin().is_terminal())?;
    Ok(rpassword::prompt_password(label)?)
}

/// Creates an account.
///
/// Missing passwords are prompted for; the confirmation is only asked when
/// the password was typed interactively.
pub async fn cmd_signup(ctx: &AppContext, email: String, password: Option<String>) -> Result<()> {
    let (password, confirm) = match password {
        Some(p) => (p.clone(), p),
        None => (read_password("Password: ")?, read_password("Confirm password: ")?),
    };
    validation::validate_signup(email.trim(), &password, &confirm).into_result()?;

    let account = ctx.auth.sign_up(email.trim(), &password).await?;
    println!("Account created for {}. Run `taskflow login` to sign in.", account.email);
    Ok(())
}

pub async fn cmd_login(ctx: &AppContext, email: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password("Password: ")?,
    };
    validation::validate_login(email.trim(), &password).into_result()?;

    let session = ctx.auth.sign_in(email.trim(), &password).await?;
    println!(
        "Signed in as {}.",
        session.user().email.as_deref().unwrap_or(session.user_id())
    );
    Ok(())
}

pub fn cmd_logout(ctx: &AppContext) -> Result<()> {
    ctx.auth.sign_out()?;
    println!("Signed out.");
    Ok(())
}

pub fn cmd_whoami(ctx: &AppContext) -> Result<()> {
    match ctx.auth.current_user() {
        Some(user) => {
            println!("User id: {}", user.id);
            println!("Email:   {}", user.email.unwrap_or_else(|| "-".into()));
            println!("API:     {}", ctx.config.api_url);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

/// Builds the task table shared by `list` and `show`.
fn task_table(tasks: &[&Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Time Left").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    let now = Local::now();
    let now_utc = now.with_timezone(&Utc);

    for t in tasks {
        let priority_color = match t.priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Green,
        };
        let status = t.status_label(now_utc);
        let status_color = match status {
            "Completed" => Color::Green,
            "Overdue" => Color::Red,
            _ => Color::Yellow,
        };
        let due = match (format_due(t), due_label(t, now)) {
            (Some(d), Some(label)) => format!("{} ({})", d, label),
            (Some(d), None) => d,
            (None, _) => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(t.priority.label()).fg(priority_color),
            Cell::new(due),
            Cell::new(time_left(t, now)).fg(if t.is_overdue_at(now_utc) { Color::Red } else { Color::Reset }),
            Cell::new(status).fg(status_color),
        ]);
    }
    table
}

/// Lists the user's tasks, narrowed by `filter`.
pub async fn cmd_list(ctx: &AppContext, filter: TaskFilter) -> Result<()> {
    let session = ctx.session()?;
    let tasks = ctx.tasks.list(&session).await?;
    let visible = filter.apply(&tasks);
    if visible.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    println!("{}", task_table(&visible));
    Ok(())
}

pub async fn cmd_show(ctx: &AppContext, id: i64) -> Result<()> {
    let session = ctx.session()?;
    let task = ctx.tasks.get(&session, id).await?;
    println!("{}", task_table(&[&task]));
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{}", description);
    }
    println!("Created {}", task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    Ok(())
}

/// Adds a task. Validation happens before the session is even loaded.
pub async fn cmd_add(
    ctx: &AppContext,
    title: String,
    description: Option<String>,
    due: Option<String>,
    priority: Priority,
) -> Result<()> {
    let mut form = TaskForm {
        title,
        description: description.unwrap_or_default(),
        due: due.unwrap_or_default(),
        priority,
        ..TaskForm::default()
    };
    let draft = form.to_draft()?;

    let session = ctx.session()?;
    let task = ctx.tasks.create(&session, &draft).await?;
    println!("Task added (id = {})", task.id);
    Ok(())
}

/// Updates only the given fields. `clear_due` removes the deadline.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_edit(
    ctx: &AppContext,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    priority: Option<Priority>,
    clear_due: bool,
) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if let Some(t) = &title {
        if let Some(message) = validation::validate_task(t).get(Field::Title) {
            errors.add(Field::Title, message);
        }
    }
    let due_date = if clear_due {
        Some(None)
    } else {
        match due.as_deref().map(parse_due).transpose() {
            Ok(d) => d,
            Err(message) => {
                errors.add(Field::DueDate, message);
                None
            }
        }
    };
    errors.into_result()?;

    let patch = TaskPatch {
        title: title.map(|t| t.trim().to_string()),
        description,
        completed: None,
        priority,
        due_date,
    };
    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    let session = ctx.session()?;
    ctx.tasks.update(&session, id, &patch).await?;
    println!("Task {} updated.", id);
    Ok(())
}

/// Flips completion and reports the state the server settled on.
pub async fn cmd_toggle(ctx: &AppContext, id: i64) -> Result<()> {
    let session = ctx.session()?;
    let task = ctx.tasks.toggle_completion(&session, id).await?;
    if task.completed {
        println!("Task {} marked as complete.", id);
    } else {
        println!("Task {} marked as pending.", id);
    }
    Ok(())
}

pub async fn cmd_remove(ctx: &AppContext, id: i64) -> Result<()> {
    let session = ctx.session()?;
    ctx.tasks.delete(&session, id).await?;
    println!("Task {} removed.", id);
    Ok(())
}

pub async fn cmd_stats(ctx: &AppContext) -> Result<()> {
    let session = ctx.session()?;
    let tasks = ctx.tasks.list(&session).await?;
    let stats = Stats::from_tasks(&tasks, Utc::now());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Total", "Completed", "Pending", "Overdue"]);
    table.add_row(vec![
        Cell::new(stats.total),
        Cell::new(stats.completed).fg(Color::Green),
        Cell::new(stats.pending).fg(Color::Yellow),
        Cell::new(stats.overdue).fg(if stats.overdue > 0 { Color::Red } else { Color::Reset }),
    ]);
    println!("{table}");
    Ok(())
}

/// Sends one message to the assistant and prints the reply.
pub async fn cmd_chat(ctx: &AppContext, message: String) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        println!("Nothing to send.");
        return Ok(());
    }
    let session = ctx.session()?;
    let reply = ctx.chat.send(&session, message).await?;
    println!("{}", reply.response);
    if let Some(actions) = describe_tool_calls(&reply.tool_calls) {
        println!("{}", actions);
    }
    Ok(())
}

pub async fn cmd_forgot_password(ctx: &AppContext, email: String) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if !validation::validate_email(email.trim()) {
        errors.add(Field::Email, "Please enter a valid email address");
    }
    errors.into_result()?;

    let reply = ctx.auth.forgot_password(email.trim()).await?;
    println!("{}", reply.message);
    if let Some(link) = reply.reset_link {
        println!("{}", link);
    }
    Ok(())
}

pub async fn cmd_reset_password(ctx: &AppContext, token: String, password: Option<String>) -> Result<()> {
    let (password, confirm) = match password {
        Some(p) => (p.clone(), p),
        None => (read_password("New password: ")?, read_password("Confirm password: ")?),
    };
    validation::validate_reset(&token, &password, &confirm).into_result()?;

    let message = ctx.auth.reset_password(token.trim(), &password).await?;
    println!("{}", message);
    Ok(())
}
