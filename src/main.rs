//! # TaskFlow
//!
//! Terminal client for the TaskFlow task API: a CLI for quick, scriptable
//! commands and a TUI with a task dashboard and an AI assistant chat.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! Run without arguments to launch the interactive UI:
//!
//! ```bash
//! taskflow
//! # or explicitly
//! taskflow ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! **Sign in / Sign up**
//! *   `Tab`: Next field
//! *   `Enter`: Submit
//! *   `F2`: Switch between sign in and sign up
//! *   `Esc`: Quit
//!
//! **Dashboard**
//! *   `a`: Add task
//! *   `e` / `Enter`: Edit selected task
//! *   `Space`: Toggle completion
//! *   `d`: Delete selected task
//! *   `f`: Cycle filter (All, Pending, Completed)
//! *   `r`: Reload
//! *   `c`: Open the assistant chat
//! *   `L`: Sign out
//! *   `q`: Quit
//!
//! **Chat**
//! *   `Enter`: Send
//! *   `F1`-`F4`: Quick actions
//! *   `Esc`: Back to the dashboard
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! taskflow login ada@example.com
//! taskflow add "Write report" --due 2025-12-01 --priority high
//! taskflow list --filter pending
//! taskflow toggle 12
//! taskflow chat "what is due this week?"
//! ```
//!
//! ## Configuration
//!
//! The API address comes from `TASKFLOW_API_URL`, `./taskflow.toml` or
//! `~/.config/taskflow/config.toml` (default `http://localhost:8000`). The
//! access token is stored under the platform data directory, e.g.
//! `~/.local/share/taskflow/access_token`. Set `TASKFLOW_LOG` to change the
//! log filter.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

use taskflow::commands::*;
use taskflow::config::Config;
use taskflow::dashboard::TaskFilter;
use taskflow::models::Priority;
use taskflow::logging;
use taskflow::tui::run_tui;
use taskflow::AppContext;

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Terminal client for the TaskFlow task manager", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        email: String,
        /// Password (prompted for if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign in and store the access token
    Login {
        email: String,
        /// Password (prompted for if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored access token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List tasks
    List {
        /// all, pending or completed
        #[arg(short, long, default_value = "all")]
        filter: TaskFilter,
    },
    /// Show a single task
    Show {
        id: i64,
    },
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Due date, YYYY-MM-DD or "YYYY-MM-DD HH:MM" (local time)
        #[arg(short, long)]
        due: Option<String>,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },
    /// Edit a task
    Edit {
        id: i64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// New due date
        #[arg(short, long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Toggle a task between pending and completed
    Toggle {
        id: i64,
    },
    /// Remove a task
    Remove {
        id: i64,
    },
    /// Show task counters
    Stats,
    /// Send one message to the assistant
    Chat {
        message: String,
    },
    /// Request a password reset email
    ForgotPassword {
        email: String,
    },
    /// Set a new password with a reset token
    ResetPassword {
        token: String,
        /// New password (prompted for if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Ui));
    // Before tracing, so `TASKFLOW_LOG` in `.env` is honoured.
    Config::load_dotenv();
    logging::init(cli.verbose, interactive);

    if let Some(Commands::Completions { shell }) = &cli.command {
        let shell_enum = match shell.as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" => Shell::PowerShell,
            "elvish" => Shell::Elvish,
            _ => {
                eprintln!("Unsupported shell: {}", shell);
                process::exit(1);
            }
        };
        let mut cmd = Cli::command();
        generate(shell_enum, &mut cmd, "taskflow", &mut io::stdout());
        return;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    tracing::debug!(api_url = %config.api_url, "configuration loaded");
    let ctx = AppContext::new(config);

    let result = match cli.command {
        Some(Commands::Signup { email, password }) => cmd_signup(&ctx, email, password).await,
        Some(Commands::Login { email, password }) => cmd_login(&ctx, email, password).await,
        Some(Commands::Logout) => cmd_logout(&ctx),
        Some(Commands::Whoami) => cmd_whoami(&ctx),
        Some(Commands::List { filter }) => cmd_list(&ctx, filter).await,
        Some(Commands::Show { id }) => cmd_show(&ctx, id).await,
        Some(Commands::Add { title, description, due, priority }) => {
            cmd_add(&ctx, title, description, due, priority).await
        }
        Some(Commands::Edit { id, title, description, due, priority, clear_due }) => {
            cmd_edit(&ctx, id, title, description, due, priority, clear_due).await
        }
        Some(Commands::Toggle { id }) => cmd_toggle(&ctx, id).await,
        Some(Commands::Remove { id }) => cmd_remove(&ctx, id).await,
        Some(Commands::Stats) => cmd_stats(&ctx).await,
        Some(Commands::Chat { message }) => cmd_chat(&ctx, message).await,
        Some(Commands::ForgotPassword { email }) => cmd_forgot_password(&ctx, email).await,
        Some(Commands::ResetPassword { token, password }) => {
            cmd_reset_password(&ctx, token, password).await
        }
        Some(Commands::Completions { .. }) => Ok(()),
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(ctx).await {
                eprintln!("Error running TUI: {}", e);
                process::exit(1);
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
