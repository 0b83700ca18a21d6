use ratatui::widgets::TableState;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::chat::{Conversation, QUICK_ACTIONS};
use crate::context::AppContext;
use crate::dashboard::TaskFilter;
use crate::error::{Error, Result};
use crate::forms::{AuthForm, AuthMode, TaskForm};
use crate::models::{ChatReply, Task};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Signup,
    Dashboard,
    Chat,
}

pub struct App {
    pub ctx: AppContext,
    pub session: Option<Session>,
    pub screen: Screen,
    pub auth_form: AuthForm,
    /// Last list fetched from the server, unfiltered.
    pub tasks: Vec<Task>,
    pub filter: TaskFilter,
    pub state: TableState,
    /// The open create/edit form. At most one per list.
    pub form: Option<TaskForm>,
    pub conversation: Conversation,
    pub chat_input: String,
    /// Error banner for the current screen.
    pub error: Option<String>,
    /// One-line informational message.
    pub status: Option<String>,
    pub should_quit: bool,
    /// Bumped whenever a session ends; replies tagged with an older value are dropped.
    chat_generation: u64,
    chat_task: Option<JoinHandle<()>>,
    replies_tx: UnboundedSender<ChatOutcome>,
    replies_rx: UnboundedReceiver<ChatOutcome>,
}

/// A chat reply tagged with the session generation it was sent under.
type ChatOutcome = (u64, Result<ChatReply>);

impl App {
    /// Creates the app, starting on the dashboard if a session is stored.
    pub fn new(ctx: AppContext) -> App {
        let session = match ctx.session() {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::debug!(error = %e, "no usable stored session");
                None
            }
        };
        let screen = if session.is_some() { Screen::Dashboard } else { Screen::Login };
        let (replies_tx, replies_rx) = unbounded_channel();

        App {
            ctx,
            session,
            screen,
            auth_form: AuthForm::new(AuthMode::Login),
            tasks: Vec::new(),
            filter: TaskFilter::All,
            state: TableState::default(),
            form: None,
            conversation: Conversation::new(),
            chat_input: String::new(),
            error: None,
            status: None,
            should_quit: false,
            chat_generation: 0,
            chat_task: None,
            replies_tx,
            replies_rx,
        }
    }

    /// Tasks passing the current filter, in server order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let i = self.state.selected()?;
        self.visible_tasks().get(i).copied()
    }

    /// Selects the next row, wrapping around.
    pub fn next(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row, wrapping around.
    pub fn previous(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Records a failed action. A rejected token sends the user back to login.
    fn fail(&mut self, err: Error) {
        tracing::warn!(error = %err, "action failed");
        if err.is_unauthorized() {
            if let Err(e) = self.ctx.auth.sign_out() {
                tracing::warn!(error = %e, "could not clear rejected token");
            }
            self.end_session();
            self.error = Some("Your session has expired. Please sign in again.".into());
        } else {
            self.error = Some(err.to_string());
        }
    }

    /// Re-fetches the whole task list from the server.
    pub async fn reload(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        match self.ctx.tasks.list(&session).await {
            Ok(tasks) => {
                self.tasks = tasks;
                self.error = None;
            }
            Err(e) => self.fail(e),
        }
        self.clamp_selection();
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.state.select(None);
        self.clamp_selection();
    }

    /// Toggles the selected task, then shows whatever the server now holds.
    pub async fn toggle_selected(&mut self) {
        let (Some(session), Some(id)) = (self.session.clone(), self.selected_task().map(|t| t.id)) else {
            return;
        };
        match self.ctx.tasks.toggle_completion(&session, id).await {
            Ok(task) => {
                self.status = Some(format!(
                    "Task {} is now {}.",
                    task.id,
                    if task.completed { "completed" } else { "pending" }
                ));
                self.reload().await;
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn delete_selected(&mut self) {
        let (Some(session), Some(id)) = (self.session.clone(), self.selected_task().map(|t| t.id)) else {
            return;
        };
        match self.ctx.tasks.delete(&session, id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                if self.form.as_ref().and_then(|f| f.editing) == Some(id) {
                    self.form = None;
                }
                self.status = Some(format!("Task {} deleted.", id));
                self.reload().await;
            }
            Err(e) => self.fail(e),
        }
    }

    /// Opens an empty create form unless a form is already open.
    pub fn start_add(&mut self) {
        if self.form.is_none() {
            self.form = Some(TaskForm::new());
        }
    }

    /// Opens the editor for the selected task unless a form is already open.
    pub fn start_edit(&mut self) {
        if self.form.is_some() {
            return;
        }
        if let Some(task) = self.selected_task() {
            self.form = Some(TaskForm::from_task(task));
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Validates the open form and, only if valid, sends it.
    ///
    /// The form stays open with its messages when validation or the request fails.
    pub async fn submit_form(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let Some(form) = self.form.as_mut() else {
            return;
        };

        let outcome = match form.editing {
            Some(id) => match form.to_patch() {
                Ok(patch) => Some(self.ctx.tasks.update(&session, id, &patch).await),
                Err(_) => None,
            },
            None => match form.to_draft() {
                Ok(draft) => Some(self.ctx.tasks.create(&session, &draft).await),
                Err(_) => None,
            },
        };

        match outcome {
            None => {}
            Some(Ok(task)) => {
                self.status = Some(format!("Task {} saved.", task.id));
                self.form = None;
                self.reload().await;
            }
            Some(Err(e)) => self.fail(e),
        }
    }

    pub fn switch_auth_mode(&mut self) {
        let (screen, mode) = match self.screen {
            Screen::Login => (Screen::Signup, AuthMode::Signup),
            _ => (Screen::Login, AuthMode::Login),
        };
        self.screen = screen;
        self.auth_form = AuthForm::new(mode);
        self.error = None;
    }

    /// Validates and submits the login or sign-up form.
    pub async fn submit_auth(&mut self) {
        if !self.auth_form.validate() {
            return;
        }
        let email = self.auth_form.email.trim().to_string();
        let password = self.auth_form.password.clone();

        match self.auth_form.mode {
            AuthMode::Login => match self.ctx.auth.sign_in(&email, &password).await {
                Ok(session) => {
                    self.session = Some(session);
                    self.screen = Screen::Dashboard;
                    self.auth_form = AuthForm::new(AuthMode::Login);
                    self.error = None;
                    self.reload().await;
                }
                Err(e) => self.error = Some(e.to_string()),
            },
            AuthMode::Signup => match self.ctx.auth.sign_up(&email, &password).await {
                Ok(account) => {
                    self.switch_auth_mode();
                    self.auth_form.email = account.email;
                    self.status = Some("Account created. Sign in to continue.".into());
                }
                Err(e) => self.error = Some(e.to_string()),
            },
        }
    }

    /// Drops everything tied to the signed-in user, including a chat
    /// request still in flight.
    fn end_session(&mut self) {
        if let Some(task) = self.chat_task.take() {
            task.abort();
        }
        self.chat_generation = self.chat_generation.wrapping_add(1);
        self.session = None;
        self.tasks.clear();
        self.state.select(None);
        self.form = None;
        self.conversation = Conversation::new();
        self.chat_input.clear();
        self.screen = Screen::Login;
        self.auth_form = AuthForm::new(AuthMode::Login);
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.ctx.auth.sign_out() {
            self.error = Some(e.to_string());
            return;
        }
        self.end_session();
        self.status = Some("Signed out.".into());
    }

    pub fn open_chat(&mut self) {
        self.screen = Screen::Chat;
        self.conversation.open();
    }

    /// Back to the dashboard; the assistant may have changed tasks meanwhile.
    pub async fn close_chat(&mut self) {
        self.screen = Screen::Dashboard;
        self.reload().await;
    }

    pub fn use_quick_action(&mut self, index: usize) {
        if let Some((_, message)) = QUICK_ACTIONS.get(index) {
            self.chat_input = message.to_string();
        }
    }

    /// Appends the user's message and sends it in the background.
    ///
    /// The reply is picked up by [`App::poll_chat`] or [`App::wait_for_chat`].
    pub fn submit_chat(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let Some(message) = self.conversation.begin(&self.chat_input) else {
            return;
        };
        self.chat_input.clear();

        let chat = self.ctx.chat.clone();
        let tx = self.replies_tx.clone();
        let generation = self.chat_generation;
        self.chat_task = Some(tokio::spawn(async move {
            let outcome = chat.send(&session, &message).await;
            let _ = tx.send((generation, outcome));
        }));
    }

    /// Applies a reply unless it belongs to an ended session.
    fn accept_reply(&mut self, (generation, outcome): ChatOutcome) -> bool {
        if generation != self.chat_generation {
            tracing::debug!(generation, "dropping chat reply from an ended session");
            return false;
        }
        self.chat_task = None;
        self.conversation.finish(outcome)
    }

    /// Applies any replies that have arrived. Returns whether one did.
    pub fn poll_chat(&mut self) -> bool {
        let mut received = false;
        while let Ok(reply) = self.replies_rx.try_recv() {
            received |= self.accept_reply(reply);
        }
        received
    }

    /// Waits for the pending reply, if any.
    pub async fn wait_for_chat(&mut self) {
        while self.conversation.is_loading() {
            match self.replies_rx.recv().await {
                Some(reply) => {
                    self.accept_reply(reply);
                }
                None => return,
            }
        }
    }
}
