//! The HTTPS POST half of every exchange with the gateway.
//!
//! One request means one connection: pooling is disabled so the TLS
//! connection is released when the response (or failure) comes back,
//! on every exit path.

use std::io;
use std::path::Path;

use reqwest::{StatusCode, header};
use url::Url;

use crate::config::{Connection, Credentials};
use crate::error::{CredentialKind, CredentialProblem, Error, Result, TlsProblem};

const CONTENT_TYPE_QBXML: &str = "application/x-qbxml";

#[derive(Debug)]
pub(crate) struct Transport {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Option<Credentials>,
}

impl Transport {
    /// Builds the HTTP client, loading and preflighting the credential PEM
    /// files when the connection carries any.
    pub(crate) fn new(connection: &Connection) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(connection.timeout)
            .pool_max_idle_per_host(0);
        if let Some(credentials) = &connection.credentials {
            builder = builder.identity(load_identity(credentials)?);
        }
        let http = builder.build().map_err(Error::Request)?;
        Ok(Self {
            http,
            endpoint: connection.endpoint.clone(),
            credentials: connection.credentials.clone(),
        })
    }

    /// POST one serialized document and return the raw response text.
    pub(crate) async fn post(&self, body: Vec<u8>) -> Result<String> {
        trace!(bytes = body.len(), url = %self.endpoint, "posting qbXML request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, CONTENT_TYPE_QBXML)
            .body(body)
            .send()
            .await
            .map_err(|error| self.diagnose(error))?;

        let status = response.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or("unknown").to_owned();
            return Err(Error::Http { status, reason });
        }
        let text = response.text().await.map_err(Error::Request)?;
        trace!(bytes = text.len(), "received qbXML response");
        Ok(text)
    }

    /// Secondary diagnostic pass for TLS failures: unreadable credential
    /// files and known handshake signatures become actionable errors;
    /// anything unrecognized propagates unchanged.
    fn diagnose(&self, error: reqwest::Error) -> Error {
        let Some(credentials) = &self.credentials else {
            return Error::Request(error);
        };
        let chain = error_chain(&error);
        if !is_tls_failure(&chain) {
            return Error::Request(error);
        }
        if let Err(config) = check_readable(credentials) {
            return config;
        }
        match classify_tls_chain(&chain, credentials) {
            Some(problem) => Error::Tls(problem),
            None => Error::Request(error),
        }
    }
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn is_tls_failure(chain: &str) -> bool {
    let chain = chain.to_ascii_lowercase();
    chain.contains("tls")
        || chain.contains("ssl")
        || chain.contains("certificate")
        || chain.contains("handshake")
}

fn check_readable(credentials: &Credentials) -> Result<()> {
    check_file(CredentialKind::PrivateKey, &credentials.key_file)?;
    check_file(CredentialKind::Certificate, &credentials.certificate_file)
}

fn check_file(kind: CredentialKind, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::Credentials {
            kind,
            path: path.to_owned(),
            problem: CredentialProblem::Missing,
        });
    }
    match std::fs::File::open(path) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error::Credentials {
            kind,
            path: path.to_owned(),
            problem: CredentialProblem::Unreadable,
        }),
    }
}

fn classify_tls_chain(chain: &str, credentials: &Credentials) -> Option<TlsProblem> {
    let chain = chain.to_ascii_lowercase();
    // failures about the peer's certificate are the server's problem, not a
    // local credential signature
    if chain.contains("peer") {
        return None;
    }
    if chain.contains("private key") || chain.contains("no keys") {
        Some(TlsProblem::InvalidKey {
            path: credentials.key_file.clone(),
        })
    } else if chain.contains("mismatch")
        || chain.contains("inconsistent")
        || (chain.contains("certificate") && chain.contains("key"))
    {
        Some(TlsProblem::KeyMismatch {
            key: credentials.key_file.clone(),
            certificate: credentials.certificate_file.clone(),
        })
    } else if chain.contains("certificate")
        && (chain.contains("malformed")
            || chain.contains("invalid")
            || chain.contains("parse")
            || chain.contains("bad"))
    {
        Some(TlsProblem::InvalidCertificate {
            path: credentials.certificate_file.clone(),
        })
    } else {
        None
    }
}

fn read_credential(kind: CredentialKind, path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|error| {
        let problem = if error.kind() == io::ErrorKind::NotFound {
            CredentialProblem::Missing
        } else {
            CredentialProblem::Unreadable
        };
        Error::Credentials {
            kind,
            path: path.to_owned(),
            problem,
        }
    })
}

/// Load the client identity from the two PEM files, preflighting the obvious
/// failure modes so they fail here with the file named instead of deep inside
/// a handshake.
fn load_identity(credentials: &Credentials) -> Result<reqwest::Identity> {
    let key = read_credential(CredentialKind::PrivateKey, &credentials.key_file)?;
    let certificate = read_credential(CredentialKind::Certificate, &credentials.certificate_file)?;
    if !key.contains("PRIVATE KEY") {
        return Err(Error::Tls(TlsProblem::InvalidKey {
            path: credentials.key_file.clone(),
        }));
    }
    if !certificate.contains("BEGIN CERTIFICATE") {
        return Err(Error::Tls(TlsProblem::InvalidCertificate {
            path: credentials.certificate_file.clone(),
        }));
    }

    let mut pem = Vec::with_capacity(key.len() + certificate.len() + 1);
    pem.extend_from_slice(key.as_bytes());
    pem.push(b'\n');
    pem.extend_from_slice(certificate.as_bytes());
    reqwest::Identity::from_pem(&pem).map_err(|error| {
        match classify_tls_chain(&error_chain(&error), credentials) {
            Some(problem) => Error::Tls(problem),
            None => Error::Request(error),
        }
    })
}
