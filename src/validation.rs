//! Synchronous input checks run before any request is issued.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Minimum password length accepted by the sign-up form.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
    Title,
    DueDate,
    ResetToken,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm password",
            Field::Title => "title",
            Field::DueDate => "due date",
            Field::ResetToken => "reset token",
        })
    }
}

/// Field-keyed messages. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.joined())]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// First message in field order, used for single-line banners.
    pub fn first(&self) -> Option<&str> {
        self.errors.values().next().map(String::as_str)
    }

    /// All messages in field order, joined with `; `.
    pub fn joined(&self) -> String {
        self.errors.values().map(String::as_str).collect::<Vec<_>>().join("; ")
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}


fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// At least [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn validate_title(title: &str) -> bool {
    !title.trim().is_empty()
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        errors.add(Field::Email, "Email is required");
    } else if !validate_email(email) {
        errors.add(Field::Email, "Please enter a valid email address");
    }
}

fn check_new_password(errors: &mut ValidationErrors, password: &str, confirm: &str) {
    if password.is_empty() {
        errors.add(Field::Password, "Password is required");
    } else if !validate_password(password) {
        errors.add(
            Field::Password,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
    if password != confirm {
        errors.add(Field::ConfirmPassword, "Passwords do not match");
    }
}

pub fn validate_signup(email: &str, password: &str, confirm: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    check_new_password(&mut errors, password, confirm);
    errors
}

/// Login only requires a password to be present; length is the server's call.
pub fn validate_login(email: &str, password: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.add(Field::Password, "Password is required");
    }
    errors
}

pub fn validate_task(title: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if title.is_empty() {
        errors.add(Field::Title, "Title is required");
    } else if !validate_title(title) {
        errors.add(Field::Title, "Title cannot be empty");
    }
    errors
}

pub fn validate_reset(token: &str, password: &str, confirm: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if token.trim().is_empty() {
        errors.add(Field::ResetToken, "Reset token is required");
    }
    check_new_password(&mut errors, password, confirm);
    errors
}
