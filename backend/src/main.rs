//! Backend entry-point: configuration, migrations, and server bootstrap.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use dogcal_backend::inbound::http::health::HealthState;
use dogcal_backend::outbound::mailer::MailerConfig;
use dogcal_backend::outbound::whatsapp::WhatsAppConfig;
use dogcal_backend::server::{ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Command-line overrides; everything else comes from the environment.
#[derive(Debug, Parser)]
#[command(name = "dogcal-backend", about = "Dogcal scheduling backend")]
struct Args {
    /// Address to bind, e.g. 0.0.0.0:8080.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Media directory for photo uploads.
    #[arg(long, default_value = "media")]
    media_dir: PathBuf,
}

fn session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn whatsapp_config() -> Option<WhatsAppConfig> {
    if env::var("WHATSAPP_ENABLED").ok().as_deref() != Some("1") {
        return None;
    }
    let api_base = env::var("WHATSAPP_API_BASE").ok()?;
    let api_base = match Url::parse(&api_base) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "invalid WHATSAPP_API_BASE; disabling whatsapp delivery");
            return None;
        }
    };
    let access_token = env::var("WHATSAPP_ACCESS_TOKEN").ok()?;
    let phone_number_id = env::var("WHATSAPP_PHONE_NUMBER_ID").ok()?;
    Some(WhatsAppConfig {
        api_base,
        access_token,
        phone_number_id,
        template_name: env::var("WHATSAPP_TEMPLATE").ok(),
    })
}

fn mailer_config() -> Option<MailerConfig> {
    let endpoint = env::var("MAIL_API_URL").ok()?;
    let endpoint = match Url::parse(&endpoint) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "invalid MAIL_API_URL; disabling mail delivery");
            return None;
        }
    };
    Some(MailerConfig {
        endpoint,
        api_token: env::var("MAIL_API_TOKEN").ok()?,
        from_address: env::var("MAIL_FROM").ok()?,
    })
}

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = diesel::pg::PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("connecting for migrations: {e}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("running migrations: {e}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Args::parse();

    let database_url = env::var("DATABASE_URL").ok();
    if let Some(url) = &database_url {
        run_migrations(url)?;
    }

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let config = ServerConfig::new(session_key()?, cookie_secure, SameSite::Lax, args.bind)
        .with_database_url(database_url)
        .with_whatsapp(whatsapp_config())
        .with_mailer(mailer_config())
        .with_contact_address(env::var("CONTACT_ADDRESS").ok())
        .with_admin_token(env::var("ADMIN_TOKEN").ok())
        .with_media_dir(args.media_dir);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    info!("dogcal backend listening");
    server.await
}
