pub mod app;
pub mod ui;

use std::{error::Error, io, time::Duration};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::context::AppContext;
use app::{App, Screen};
use ui::ui;

const TICK: Duration = Duration::from_millis(100);

pub async fn run_tui(ctx: AppContext) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(ctx);
    app.reload().await;

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "tui loop failed");
        println!("{:?}", err)
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.poll_chat();
        terminal.draw(|f| ui(f, app))?;

        // Poll so chat replies show up without a key press.
        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key).await;
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Login | Screen::Signup => match key.code {
            KeyCode::Esc => app.should_quit = true,
            KeyCode::F(2) => app.switch_auth_mode(),
            KeyCode::Tab | KeyCode::Down => app.auth_form.next_field(),
            KeyCode::Enter => app.submit_auth().await,
            KeyCode::Backspace => app.auth_form.pop_char(),
            KeyCode::Char(c) => app.auth_form.push_char(c),
            _ => {}
        },
        Screen::Dashboard if app.form.is_some() => match key.code {
            KeyCode::Esc => app.cancel_form(),
            KeyCode::Enter => app.submit_form().await,
            code => {
                let Some(form) = app.form.as_mut() else {
                    return;
                };
                match code {
                    KeyCode::Tab | KeyCode::Down => form.next_field(),
                    KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                    KeyCode::Backspace => form.pop_char(),
                    KeyCode::Char(c) => form.push_char(c),
                    _ => {}
                }
            }
        },
        Screen::Dashboard => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Char(' ') => app.toggle_selected().await,
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected().await,
            KeyCode::Char('a') => app.start_add(),
            KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),
            KeyCode::Char('f') => app.cycle_filter(),
            KeyCode::Char('r') => app.reload().await,
            KeyCode::Char('c') => app.open_chat(),
            KeyCode::Char('L') => app.logout(),
            _ => {}
        },
        Screen::Chat => match key.code {
            KeyCode::Esc => app.close_chat().await,
            KeyCode::Enter => app.submit_chat(),
            KeyCode::F(n @ 1..=4) => app.use_quick_action(usize::from(n - 1)),
            KeyCode::Backspace => {
                app.chat_input.pop();
            }
            KeyCode::Char(c) => app.chat_input.push(c),
            _ => {}
        },
    }
}
