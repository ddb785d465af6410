//! Resolution of a tenant's SMTP configuration into transport
//! credentials.

use outpost_common::application::Application;

use crate::DeliveryError;

/// Resolved credentials for one tenant's outbound transport.
///
/// A plain value record; the dispatcher maps it to a transport session
/// in a single pure step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte (as opposed to STARTTLS).
    pub secure: bool,
    pub username: String,
    pub password: String,
}

/// Extract and normalize an application's SMTP credentials.
///
/// Port 465 is the SMTPS port: it always means implicit TLS, so the
/// stored `secure` flag is overridden there and honored everywhere else.
///
/// # Errors
/// `MissingCredentials` when the application has no SMTP block.
pub fn resolve(application: &Application) -> Result<SmtpCredentials, DeliveryError> {
    let Some(smtp) = &application.smtp else {
        return Err(DeliveryError::MissingCredentials(application.id.clone()));
    };

    Ok(SmtpCredentials {
        host: smtp.host.clone(),
        port: smtp.port,
        secure: smtp.port == 465 || smtp.secure,
        username: smtp.username.clone(),
        password: smtp.password.clone(),
    })
}

#[cfg(test)]
mod tests {
    use outpost_common::application::SmtpConfig;

    use super::*;

    fn application(smtp: Option<SmtpConfig>) -> Application {
        Application {
            id: "app-1".to_string(),
            name: "demo".to_string(),
            enabled: true,
            smtp,
        }
    }

    fn smtp(port: u16, secure: bool) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port,
            secure,
            username: "mailer@example.com".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn missing_block_is_an_error() {
        let result = resolve(&application(None));
        assert!(matches!(
            result,
            Err(DeliveryError::MissingCredentials(id)) if id == "app-1"
        ));
    }

    #[test]
    fn port_465_forces_implicit_tls() {
        let creds = resolve(&application(Some(smtp(465, false)))).unwrap();
        assert!(creds.secure);
    }

    #[test]
    fn other_ports_honor_the_stored_flag() {
        let creds = resolve(&application(Some(smtp(587, false)))).unwrap();
        assert!(!creds.secure);

        let creds = resolve(&application(Some(smtp(2525, true)))).unwrap();
        assert!(creds.secure);
    }
}
