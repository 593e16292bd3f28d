use crate::{DaemonError, Result, Settings, console::ConsoleObserver};
use authfetch_core::{
    CredentialStore, FeedbackChannel, FormatValidation, LoginFlow,
    store::logout,
    token::{self, Claims, validate_format},
};
use authfetch_http::{client::AuthClient, types::PROXIED_DATA_PATH};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the mock auth server
    Serve,

    /// Log in with the demo account and store the issued tokens
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Keep the session for 30 days instead of 7
        #[arg(long)]
        remember_me: bool,
    },

    /// Remove stored tokens
    Logout,

    /// Fetch data with the stored tokens, refreshing them if needed
    Fetch {
        #[arg(long, default_value = PROXIED_DATA_PATH)]
        path: String,
    },

    /// Decode a token and report its format and expiry
    Inspect { token: String },
}

impl Commands {
    pub async fn execute(self, settings: Settings) -> Result<()> {
        match self {
            Commands::Serve => {
                let listener = crate::server::bind(&settings).await?;
                println!("Server running at: http://{}/", listener.local_addr()?);
                crate::server::run(&settings, listener, shutdown_signal()).await
            }
            Commands::Login {
                email,
                password,
                remember_me,
            } => {
                let flow = LoginFlow::new(store(&settings), console());
                let outcome = flow.submit(&email, &password, remember_me);
                if outcome.success {
                    Ok(())
                } else {
                    Err(DaemonError::Login(outcome.message))
                }
            }
            Commands::Logout => {
                logout(store(&settings).as_ref())?;
                println!("Logged out.");
                Ok(())
            }
            Commands::Fetch { path } => {
                let client = AuthClient::builder()
                    .base_url(settings.client_base_url())
                    .refresh_path(settings.client.refresh_path.clone())
                    .timeout(Duration::from_secs(settings.client.timeout_secs))
                    .store(store(&settings))
                    .feedback(console())
                    .build()?;

                let data = client.fetch_data(Some(&path)).await?;
                println!("{}", serde_json::to_string_pretty(&data).unwrap_or_default());
                Ok(())
            }
            Commands::Inspect { token } => {
                println!("{}", inspect(&token)?);
                Ok(())
            }
        }
    }
}

fn store(settings: &Settings) -> Arc<dyn CredentialStore> {
    let store = settings.credential_store();
    info!("Using credential store at {}", store.path().display());
    Arc::new(store)
}

fn console() -> FeedbackChannel {
    FeedbackChannel::with_observer(Arc::new(ConsoleObserver))
}

/// When a token stops being usable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// No `exp` claim
    Never,
    Expired,
    In { secs: u64, at: Option<DateTime<Utc>> },
}

/// Decoded view of a token, printed by `inspect`
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub header: Claims,
    pub payload: Claims,
    pub signature_len: usize,
    pub format: FormatValidation,
    pub expiry: Expiry,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "header:  {}", Value::Object(self.header.clone()))?;
        writeln!(f, "payload: {}", Value::Object(self.payload.clone()))?;
        writeln!(f, "signature: {} bytes", self.signature_len)?;
        match &self.format.reason {
            None => writeln!(f, "format:  valid")?,
            Some(reason) => writeln!(f, "format:  invalid ({reason})")?,
        }
        match &self.expiry {
            Expiry::Never => write!(f, "expiry:  never"),
            Expiry::Expired => write!(f, "expiry:  expired"),
            Expiry::In { secs, at } => {
                let at = at.map(|at| at.to_rfc3339()).unwrap_or_default();
                write!(f, "expiry:  in {secs}s ({at})")
            }
        }
    }
}

/// Decode `raw` and describe its format and expiry
///
/// # Errors
///
/// Returns an error if the token does not decode at all
pub fn inspect(raw: &str) -> Result<InspectReport> {
    let decoded = token::decode(raw)?;

    let expiry = match token::time_to_expiry(raw) {
        None => Expiry::Never,
        Some(0) => Expiry::Expired,
        Some(secs) => Expiry::In {
            secs,
            at: decoded
                .expires_at()
                .and_then(|exp| DateTime::from_timestamp(exp, 0)),
        },
    };

    Ok(InspectReport {
        signature_len: decoded.signature.len(),
        format: validate_format(raw),
        header: decoded.header,
        payload: decoded.payload,
        expiry,
    })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal");
    }
}
