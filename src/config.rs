use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// The production application gateway.
pub const GATEWAY_URL: &str = "https://webapps.quickbooks.com/j/AppGateway";

/// How long a single POST may take before the transport gives up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The application identity presented in every signon block.
#[derive(Clone, Debug)]
pub struct AppIdentity {
    pub application_login: String,
    pub app_id: String,
    pub app_version: String,
    pub connection_ticket: String,
}

impl AppIdentity {
    #[must_use]
    pub fn new(
        application_login: impl Into<String>,
        app_id: impl Into<String>,
        app_version: impl Into<String>,
        connection_ticket: impl Into<String>,
    ) -> Self {
        Self {
            application_login: application_login.into(),
            app_id: app_id.into(),
            app_version: app_version.into(),
            connection_ticket: connection_ticket.into(),
        }
    }

    /// Creates an `AppIdentity` from the `QBOE_APP_LOGIN`, `QBOE_APP_ID`,
    /// `QBOE_APP_VERSION` and `QBOE_CONNECTION_TICKET` environment variables.
    ///
    /// # Panics
    /// Panics if any of the four variables is not set.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            application_login: std::env::var("QBOE_APP_LOGIN").expect("QBOE_APP_LOGIN not set"),
            app_id: std::env::var("QBOE_APP_ID").expect("QBOE_APP_ID not set"),
            app_version: std::env::var("QBOE_APP_VERSION").expect("QBOE_APP_VERSION not set"),
            connection_ticket: std::env::var("QBOE_CONNECTION_TICKET")
                .expect("QBOE_CONNECTION_TICKET not set"),
        }
    }
}

/// Client certificate material used for mutual TLS, as a pair of PEM files.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub key_file: PathBuf,
    pub certificate_file: PathBuf,
}

/// Where and how to reach the gateway.
#[derive(Clone, Debug)]
pub struct Connection {
    pub(crate) endpoint: Url,
    pub(crate) identity: AppIdentity,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) timeout: Duration,
}

impl Connection {
    pub fn new(endpoint: &str, identity: AppIdentity) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|_| Error::InvalidEndpoint)?;
        Ok(Self {
            endpoint,
            identity,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Attach the mutual-TLS credential files. Connections without credentials
    /// present no client identity, which the production gateway rejects.
    #[must_use]
    pub fn with_credentials(
        mut self,
        key_file: impl AsRef<Path>,
        certificate_file: impl AsRef<Path>,
    ) -> Self {
        self.credentials = Some(Credentials {
            key_file: key_file.as_ref().to_owned(),
            certificate_file: certificate_file.as_ref().to_owned(),
        });
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds a connection from `QBOE_GATEWAY_URL` (defaulting to the
    /// production gateway), the `AppIdentity` environment variables, and
    /// `QBOE_KEY_FILE`/`QBOE_CERT_FILE` when both are set.
    ///
    /// # Panics
    /// Panics if a required identity variable is not set.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("QBOE_GATEWAY_URL").unwrap_or_else(|_| GATEWAY_URL.to_owned());
        let mut connection = Self::new(&endpoint, AppIdentity::from_env())?;
        if let (Ok(key_file), Ok(certificate_file)) =
            (std::env::var("QBOE_KEY_FILE"), std::env::var("QBOE_CERT_FILE"))
        {
            connection = connection.with_credentials(key_file, certificate_file);
        }
        Ok(connection)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}
