//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};

use crate::outbound::mailer::MailerConfig;
use crate::outbound::whatsapp::WhatsAppConfig;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: Option<String>,
    pub(crate) whatsapp: Option<WhatsAppConfig>,
    pub(crate) mailer: Option<MailerConfig>,
    pub(crate) contact_address: Option<String>,
    pub(crate) admin_token: Option<String>,
    pub(crate) media_dir: PathBuf,
}

impl ServerConfig {
    /// Construct a configuration with the required session settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            database_url: None,
            whatsapp: None,
            mailer: None,
            contact_address: None,
            admin_token: None,
            media_dir: PathBuf::from("media"),
        }
    }

    /// Attach a database URL; without one the in-memory adapters serve.
    #[must_use]
    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        self.database_url = url;
        self
    }

    /// Attach WhatsApp delivery settings; without them sends are skipped.
    #[must_use]
    pub fn with_whatsapp(mut self, config: Option<WhatsAppConfig>) -> Self {
        self.whatsapp = config;
        self
    }

    /// Attach mail delivery settings for the contact form.
    #[must_use]
    pub fn with_mailer(mut self, config: Option<MailerConfig>) -> Self {
        self.mailer = config;
        self
    }

    /// Set the contact-form destination address.
    #[must_use]
    pub fn with_contact_address(mut self, address: Option<String>) -> Self {
        self.contact_address = address;
        self
    }

    /// Set the admin shared secret.
    #[must_use]
    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token;
        self
    }

    /// Set the media directory for photo storage.
    #[must_use]
    pub fn with_media_dir(mut self, dir: PathBuf) -> Self {
        self.media_dir = dir;
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
