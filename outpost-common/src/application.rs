use serde::{Deserialize, Serialize};

/// Outbound SMTP configuration owned by a single tenant.
///
/// Modelled as a plain value record; transport construction is a pure
/// mapping from this record performed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte. Default false (opportunistic
    /// STARTTLS). Port 465 overrides this at resolution time.
    #[serde(default)]
    pub secure: bool,
    pub username: String,
    pub password: String,
}

/// A registered tenant application.
///
/// Each queued message is owned by exactly one application, whose SMTP
/// block supplies the credentials used to deliver it. An application
/// without an SMTP block cannot have its messages delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    /// Checked at the intake boundary only; the delivery worker does not
    /// re-check it for already-queued messages.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

const fn default_enabled() -> bool {
    true
}
