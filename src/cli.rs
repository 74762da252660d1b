//! Command-line surface.
//!
//! `serve` runs the HTTP server. `session …` acts as one browser context: a
//! [`SessionStore`] over a JSON file that stands in for local storage, so a
//! remembered sign-in survives between invocations. `--ephemeral` keeps it in
//! memory instead. Every invocation starts
//! with `initialize` followed by `rehydrate`, the same order a page load
//! follows.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ConfigError;
use crate::guard::{self, PageDecision};
use crate::session::{SessionStorage, SessionStore, StorageError};
use crate::types::{AuthError, LoginCredentials, RegisterData, ResetRequest};
use crate::validation::{self, FieldError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{}", describe_fields(.0))]
    Invalid(Vec<FieldError>),
    #[error("{kind}: {message}", kind = .0.kind, message = .0.message)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Vec<FieldError>> for CliError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Invalid(errors)
    }
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join("; ")
}

#[derive(Parser, Debug)]
#[command(name = "fincairbnb", about = "Finca Airbnb site and mock auth")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server.
    Serve,
    /// Drive a session from the command line.
    Session(SessionArgs),
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Session file; overrides `FINCAIRBNB_STORAGE`.
    #[arg(long, conflicts_with = "ephemeral")]
    pub storage: Option<PathBuf>,

    /// Keep the session in memory only, like a private window.
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    Login {
        email: String,
        password: String,
        /// Keep the session for later invocations.
        #[arg(long)]
        remember: bool,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to `--password`.
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        accept_terms: bool,
        #[arg(long)]
        newsletter: bool,
    },
    Logout,
    Whoami,
    /// Show the store status and acknowledge any pending error.
    Status,
    /// Show what the page guard does for `path`.
    Visit { path: String },
    ForgotPassword { email: String },
}

/// Bring a fresh store to the state a page load would see.
pub fn open<S: SessionStorage>(store: &mut SessionStore<S>) {
    store.initialize();
    if store.rehydrate() {
        tracing::debug!("restored persisted session");
    }
}

/// Run one session command and return the text to print.
///
/// # Errors
///
/// Form validation, auth operation and storage failures.
pub async fn execute<S: SessionStorage>(
    store: &mut SessionStore<S>,
    command: SessionCommand,
) -> Result<String, CliError> {
    match command {
        SessionCommand::Login { email, password, remember } => {
            let creds = LoginCredentials { email, password, remember_me: remember };
            validation::check(&creds)?;
            let session = store.login(&creds).await?;
            let note = if remember { "" } else { " (not remembered)" };
            Ok(format!("signed in as {} <{}>{note}", session.user.name, session.user.email))
        }
        SessionCommand::Register { name, email, password, confirm_password, phone, accept_terms, newsletter } => {
            let data = RegisterData {
                name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
                phone,
                accept_terms,
                newsletter: Some(newsletter),
            };
            validation::check(&data)?;
            let session = store.register(&data).await?;
            Ok(format!("registered {} <{}> as user {}", session.user.name, session.user.email, session.user.id))
        }
        SessionCommand::Logout => {
            store.logout();
            Ok("signed out".to_owned())
        }
        SessionCommand::Whoami => match store.current_user() {
            Some(user) if store.is_authenticated() => Ok(serde_json::to_string_pretty(user)?),
            _ => Ok("not signed in".to_owned()),
        },
        SessionCommand::Status => Ok(report_status(store)),
        SessionCommand::Visit { path } => Ok(match visit_decision(&path, store) {
            PageDecision::Wait => "wait".to_owned(),
            PageDecision::Redirect(to) => format!("redirect {to}"),
            PageDecision::Render => format!("render {path}"),
        }),
        SessionCommand::ForgotPassword { email } => {
            let request = ResetRequest { email };
            validation::check(&request)?;
            store.request_password_reset(&request.email).await?;
            Ok(format!("recovery instructions sent to {}", request.email))
        }
    }
}

fn report_status<S: SessionStorage>(store: &mut SessionStore<S>) -> String {
    let mut out = format!("status: {}", store.status().as_str());
    if let Some(user) = store.current_user() {
        out.push_str(&format!("\nuser: {} <{}>", user.name, user.email));
    }
    if let Some(error) = store.error() {
        out.push_str(&format!("\nerror: {} {}", error.kind, error.message));
    }
    store.clear_error();
    out
}

fn visit_decision<S: SessionStorage>(path: &str, store: &SessionStore<S>) -> PageDecision {
    let snapshot = store.snapshot();
    if guard::is_protected(path) {
        guard::page_decision(path, snapshot)
    } else if guard::is_auth_page(path) {
        guard::guest_page_decision(snapshot)
    } else {
        PageDecision::Render
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
