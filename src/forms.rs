//! Editable form state for the task editor and the auth screens.
//!
//! Forms hold raw field text; converting to a request payload runs the
//! validators first, so an invalid form never reaches the network.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::models::{Priority, Task, TaskDraft, TaskPatch};
use crate::validation::{self, Field, ValidationErrors};

const DUE_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses the due-date field.
///
/// Accepts `YYYY-MM-DD HH:MM` (or with a `T`) in local time, or a bare
/// `YYYY-MM-DD`, which means the end of that day. Blank means no deadline.
pub fn parse_due(input: &str) -> Result<Option<DateTime<Utc>>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let naive = NaiveDateTime::parse_from_str(input, DUE_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d").map(|d| {
                d.and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default())
            })
        })
        .map_err(|_| format!("Invalid due date '{}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM.", input))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|d| Some(d.with_timezone(&Utc)))
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", input))
}

pub fn format_due_input(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format(DUE_INPUT_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    DueDate,
    Priority,
}

impl TaskField {
    pub const ORDER: [TaskField; 4] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::DueDate,
        TaskField::Priority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskField::Title => "Title *",
            TaskField::Description => "Description",
            TaskField::DueDate => "Due (YYYY-MM-DD [HH:MM])",
            TaskField::Priority => "Priority",
        }
    }
}

/// Create/edit form for a single task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    /// Id of the task being edited; `None` when creating.
    pub editing: Option<i64>,
    pub title: String,
    pub description: String,
    pub due: String,
    pub priority: Priority,
    pub focus: TaskField,
    pub errors: ValidationErrors,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            editing: None,
            title: String::new(),
            description: String::new(),
            due: String::new(),
            priority: Priority::Medium,
            focus: TaskField::Title,
            errors: ValidationErrors::new(),
        }
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-filled editor for an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            editing: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due: task.due_date.map(format_due_input).unwrap_or_default(),
            priority: task.priority,
            ..Self::default()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn next_field(&mut self) {
        let i = TaskField::ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = TaskField::ORDER[(i + 1) % TaskField::ORDER.len()];
    }

    pub fn previous_field(&mut self) {
        let i = TaskField::ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = TaskField::ORDER[(i + TaskField::ORDER.len() - 1) % TaskField::ORDER.len()];
    }

    /// Types a character into the focused field. On the priority field any
    /// key cycles the value.
    pub fn push_char(&mut self, c: char) {
        match self.focus {
            TaskField::Title => self.title.push(c),
            TaskField::Description => self.description.push(c),
            TaskField::DueDate => self.due.push(c),
            TaskField::Priority => self.priority = self.priority.next(),
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            TaskField::Title => {
                self.title.pop();
            }
            TaskField::Description => {
                self.description.pop();
            }
            TaskField::DueDate => {
                self.due.pop();
            }
            TaskField::Priority => {}
        }
    }

    pub fn value(&self, field: TaskField) -> String {
        match field {
            TaskField::Title => self.title.clone(),
            TaskField::Description => self.description.clone(),
            TaskField::DueDate => self.due.clone(),
            TaskField::Priority => self.priority.label().to_string(),
        }
    }

    fn validated_due(&mut self) -> Result<Option<DateTime<Utc>>, ValidationErrors> {
        let mut errors = validation::validate_task(&self.title);
        let due = match parse_due(&self.due) {
            Ok(due) => due,
            Err(message) => {
                errors.add(Field::DueDate, message);
                None
            }
        };
        self.errors = errors.clone();
        errors.into_result().map(|()| due)
    }

    /// Payload for `POST /tasks`. Records validation errors on the form.
    pub fn to_draft(&mut self) -> Result<TaskDraft, ValidationErrors> {
        let due_date = self.validated_due()?;
        Ok(TaskDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            completed: false,
            priority: self.priority,
            due_date,
        })
    }

    /// Payload for `PUT /tasks/{id}`. Sends every editable field; a blank
    /// due date clears the deadline.
    pub fn to_patch(&mut self) -> Result<TaskPatch, ValidationErrors> {
        let due_date = self.validated_due()?;
        Ok(TaskPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            completed: None,
            priority: Some(self.priority),
            due_date: Some(due_date),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

/// Email/password form shared by the login and sign-up screens.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub focus: Field,
    pub errors: ValidationErrors,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            email: String::new(),
            password: String::new(),
            confirm: String::new(),
            focus: Field::Email,
            errors: ValidationErrors::new(),
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.mode {
            AuthMode::Login => &[Field::Email, Field::Password],
            AuthMode::Signup => &[Field::Email, Field::Password, Field::ConfirmPassword],
        }
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + 1) % fields.len()];
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm,
            _ => &mut self.email,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.focused_mut().pop();
    }

    /// Runs the validators for the current mode and keeps the messages.
    pub fn validate(&mut self) -> bool {
        self.errors = match self.mode {
            AuthMode::Login => validation::validate_login(self.email.trim(), &self.password),
            AuthMode::Signup => {
                validation::validate_signup(self.email.trim(), &self.password, &self.confirm)
            }
        };
        self.errors.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn empty_title_blocks_draft() {
        let mut form = TaskForm::new();
        let errors = form.to_draft().unwrap_err();
        assert_eq!(errors.get(Field::Title), Some("Title is required"));
        assert_eq!(form.errors.get(Field::Title), Some("Title is required"));
    }

    #[test]
    fn draft_carries_fields() {
        let mut form = TaskForm::new();
        form.title = "  Write report ".into();
        form.priority = Priority::High;
        form.due = "2030-01-15 14:30".into();
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.title, "Write report");
        assert_eq!(draft.priority, Priority::High);
        let due = draft.due_date.unwrap().with_timezone(&Local);
        assert_eq!((due.hour(), due.minute()), (14, 30));
        assert!(form.errors.is_valid());
    }

    #[test]
    fn bad_due_date_is_a_field_error() {
        let mut form = TaskForm::new();
        form.title = "x".into();
        form.due = "next tuesday".into();
        let errors = form.to_draft().unwrap_err();
        assert!(errors.get(Field::DueDate).is_some());
    }

    #[test]
    fn date_only_means_end_of_day() {
        let due = parse_due("2030-02-01").unwrap().unwrap().with_timezone(&Local);
        assert_eq!((due.hour(), due.minute()), (23, 59));
        assert_eq!(parse_due("   ").unwrap(), None);
    }

    #[test]
    fn blank_due_in_patch_clears_deadline() {
        let mut form = TaskForm::new();
        form.editing = Some(4);
        form.title = "t".into();
        let patch = form.to_patch().unwrap();
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.completed, None);
    }

    #[test]
    fn focus_cycles_and_priority_field_cycles_value() {
        let mut form = TaskForm::new();
        form.previous_field();
        assert_eq!(form.focus, TaskField::Priority);
        form.push_char('x');
        assert_eq!(form.priority, Priority::High);
        form.next_field();
        assert_eq!(form.focus, TaskField::Title);
        form.push_char('a');
        form.pop_char();
        form.push_char('b');
        assert_eq!(form.title, "b");
    }

    #[test]
    fn signup_form_checks_confirmation() {
        let mut form = AuthForm::new(AuthMode::Signup);
        for c in "ada@example.com".chars() {
            form.push_char(c);
        }
        form.next_field();
        for c in "secret1".chars() {
            form.push_char(c);
        }
        form.next_field();
        for c in "secret2".chars() {
            form.push_char(c);
        }
        assert!(!form.validate());
        assert_eq!(form.errors.get(Field::ConfirmPassword), Some("Passwords do not match"));

        form.pop_char();
        form.push_char('1');
        assert!(form.validate());
    }

    #[test]
    fn login_form_has_two_fields() {
        let mut form = AuthForm::new(AuthMode::Login);
        form.next_field();
        form.next_field();
        assert_eq!(form.focus, Field::Email);
    }
}
