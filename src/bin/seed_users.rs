//! Create staff accounts directly in the database.
//!
//! ```text
//! seed-users --file accounts.json
//! seed-users --email admin@fgs.tn --password ****** --full-name "Admin" --role admin
//! ```
//!
//! `accounts.json` is an array of `{"email", "password", "full_name", "role"}`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use fgs_store::auth::password::{hash_password, MIN_PASSWORD_LENGTH};
use fgs_store::db::{create_pool, profiles::ProfileRepository, RepositoryError};
use fgs_store::domain::status::Role;
use secrecy::SecretString;
use serde::Deserialize;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Seed staff accounts", long_about = None)]
struct Args {
    /// JSON file with the accounts to create.
    #[arg(short = 'f', long, conflicts_with_all = ["email", "password", "full_name"])]
    file: Option<PathBuf>,

    #[arg(long, requires = "password")]
    email: Option<String>,

    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    full_name: Option<String>,

    #[arg(long, default_value = "employee")]
    role: String,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SeedAccount {
    email: String,
    password: String,
    full_name: Option<String>,
    #[serde(default = "default_role")]
    role: String,
}

fn default_role() -> String { Role::Employee.as_str().to_string() }

impl Args {
    fn accounts(&self) -> Result<Vec<SeedAccount>> {
        if let Some(path) = &self.file {
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            return serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()));
        }
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Ok(vec![SeedAccount {
                email: email.clone(),
                password: password.clone(),
                full_name: self.full_name.clone(),
                role: self.role.clone(),
            }]),
            _ => bail!("pass --file or --email with --password"),
        }
    }
}

/// Returns whether the account was created; existing emails are skipped.
async fn seed(db: &PgPool, account: &SeedAccount) -> Result<bool> {
    let email = account.email.trim().to_lowercase();
    let role: Role = account.role.parse()?;
    if account.password.chars().count() < MIN_PASSWORD_LENGTH {
        bail!("{email}: password must be at least {MIN_PASSWORD_LENGTH} characters");
    }
    let hash = hash_password(&account.password)?;
    let full_name = account.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    match ProfileRepository::new(db).create_account(&email, &hash, full_name, role).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, %email, %role, "Account created");
            Ok(true)
        }
        Err(RepositoryError::Conflict(_)) => {
            tracing::warn!(%email, "Email already registered, skipping");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let accounts = args.accounts()?;
    let db = create_pool(&SecretString::from(args.database_url.clone()))
        .await
        .context("failed to connect to database")?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let mut created = 0;
    for account in &accounts {
        match seed(&db, account).await {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => tracing::error!(email = %account.email, error = %e, "Account not created"),
        }
    }
    println!("{created}/{} accounts created", accounts.len());
    Ok(())
}
