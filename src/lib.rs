//! # taskflow
//!
//! Terminal client for the TaskFlow task API. The server does the real work
//! (accounts, task storage, the AI assistant); this crate holds the HTTP
//! wrapper, the stored session, the task and chat clients, input validation,
//! and the view state behind the CLI and the TUI.
//!
//! Every mutation is followed by a full re-fetch of the task list; nothing
//! is merged optimistically.

pub mod api;
pub mod auth;
pub mod chat;
pub mod commands;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod due;
pub mod error;
pub mod forms;
pub mod logging;
pub mod models;
pub mod session;
pub mod storage;
pub mod tasks;
pub mod tui;
pub mod validation;

pub use context::AppContext;
pub use error::{AuthError, Error, Result};
