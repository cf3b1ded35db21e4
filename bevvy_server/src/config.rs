use std::{env, time::Duration};

use bevvy_common::{parse_boolean_flag, Secret};
use log::*;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_IMAP_HOST: &str = "imap.web.de";
const DEFAULT_IMAP_PORT: u16 = 993;
const DEFAULT_SMTP_HOST: &str = "smtp.web.de";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_PAYMENT_REQUEST_TEMPLATE: &str = "Please pay {ORDER_AMOUNT} € with reference {ORDER_ID}. Thanks!";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    /// How often the mailbox is polled for new payment notifications.
    pub poll_interval: Duration,
    pub mail: MailConfig,
    /// Body template for outbound payment requests. `{ORDER_ID}` and `{ORDER_AMOUNT}` are
    /// substituted at send time.
    pub payment_request_template: String,
}

#[derive(Clone, Debug, Default)]
pub struct MailConfig {
    pub imap_host: String,
    pub imap_port: u16,
    pub imap_user: String,
    pub imap_password: Secret<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Wrap the SMTP connection in TLS from the start (port 465 style) instead of STARTTLS.
    pub smtp_secure: bool,
    pub smtp_user: String,
    pub smtp_password: Secret<String>,
    /// The From address on outbound mail. Defaults to the SMTP user.
    pub from_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: String::default(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            mail: MailConfig::default(),
            payment_request_template: DEFAULT_PAYMENT_REQUEST_TEMPLATE.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = bevvy_engine::db_url();
        let poll_interval = env::var("BVY_POLL_INTERVAL_SECS")
            .map(|s| {
                s.parse::<u64>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for BVY_POLL_INTERVAL_SECS. {e} Using the default, \
                         {DEFAULT_POLL_INTERVAL_SECS}s, instead."
                    );
                    DEFAULT_POLL_INTERVAL_SECS
                })
            })
            .ok()
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let mail = MailConfig::from_env_or_default();
        let payment_request_template = env::var("BVY_PAYMENT_REQUEST_TEMPLATE").ok().unwrap_or_else(|| {
            info!("🪛️ BVY_PAYMENT_REQUEST_TEMPLATE is not set. Using the built-in template.");
            DEFAULT_PAYMENT_REQUEST_TEMPLATE.to_string()
        });
        Self { database_url, poll_interval: Duration::from_secs(poll_interval), mail, payment_request_template }
    }
}

impl MailConfig {
    pub fn from_env_or_default() -> Self {
        let imap_host = env_or_default("BVY_IMAP_HOST", DEFAULT_IMAP_HOST);
        let imap_port = port_from_env("BVY_IMAP_PORT", DEFAULT_IMAP_PORT);
        let imap_user = env::var("BVY_IMAP_USER").ok().unwrap_or_else(|| {
            error!("🪛️ BVY_IMAP_USER is not set. The server will not be able to read the mailbox.");
            String::default()
        });
        let imap_password = Secret::new(env::var("BVY_IMAP_PASSWORD").ok().unwrap_or_else(|| {
            error!("🪛️ BVY_IMAP_PASSWORD is not set. The server will not be able to read the mailbox.");
            String::default()
        }));
        let smtp_host = env_or_default("BVY_SMTP_HOST", DEFAULT_SMTP_HOST);
        let smtp_port = port_from_env("BVY_SMTP_PORT", DEFAULT_SMTP_PORT);
        let smtp_secure = parse_boolean_flag(env::var("BVY_SMTP_SECURE").ok(), false);
        let smtp_user = env::var("BVY_SMTP_USER").ok().unwrap_or_else(|| {
            info!("🪛️ BVY_SMTP_USER is not set. Falling back to BVY_IMAP_USER.");
            imap_user.clone()
        });
        let smtp_password = env::var("BVY_SMTP_PASSWORD").ok().map(Secret::new).unwrap_or_else(|| {
            info!("🪛️ BVY_SMTP_PASSWORD is not set. Falling back to BVY_IMAP_PASSWORD.");
            imap_password.clone()
        });
        let from_address = env::var("BVY_MAIL_FROM").ok().unwrap_or_else(|| smtp_user.clone());
        Self {
            imap_host,
            imap_port,
            imap_user,
            imap_password,
            smtp_host,
            smtp_port,
            smtp_secure,
            smtp_user,
            smtp_password,
            from_address,
        }
    }
}

fn env_or_default(var: &str, default: &str) -> String {
    env::var(var).ok().unwrap_or_else(|| {
        info!("🪛️ {var} is not set. Using the default, {default}.");
        default.to_string()
    })
}

fn port_from_env(var: &str, default: u16) -> u16 {
    env::var(var)
        .map(|s| {
            s.parse::<u16>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid port for {var}. {e} Using the default, {default}, instead.");
                default
            })
        })
        .ok()
        .unwrap_or(default)
}
