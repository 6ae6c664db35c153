//! The process-wide session and its sign-on lifecycle.

use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::config::AppIdentity;
use crate::envelope;
use crate::error::Result;
use crate::response;
use crate::transport::Transport;

/// `NoSession → Authenticating → Authenticated`. The ticket is set exactly
/// once per process and never persisted anywhere else.
#[derive(Debug)]
enum SessionState {
    NoSession,
    Authenticating,
    Authenticated(String),
}

/// Owns the session ticket and the application identity that obtains it.
///
/// The ticket has a single writer (the sign-in below) and many readers (every
/// envelope build); both go through the lock, so a concurrent caller can
/// never observe a half-written ticket.
#[derive(Debug)]
pub(crate) struct Session {
    identity: AppIdentity,
    state: RwLock<SessionState>,
}

impl Session {
    pub(crate) fn new(identity: AppIdentity) -> Self {
        Self {
            identity,
            state: RwLock::new(SessionState::NoSession),
        }
    }

    pub(crate) fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    /// The current ticket, signing in first if this process has none yet.
    ///
    /// A sign-in failure restores `NoSession` and propagates: it is fatal to
    /// the in-flight operation, never silently retried. Once authenticated,
    /// sign-in is not re-attempted for the life of the process; a ticket the
    /// server invalidates mid-session surfaces as the gateway's own error.
    pub(crate) async fn ticket(&self, transport: &Transport) -> Result<String> {
        if let SessionState::Authenticated(ticket) = &*self.state.read().await {
            return Ok(ticket.clone());
        }
        let mut state = self.state.write().await;
        if let SessionState::Authenticated(ticket) = &*state {
            return Ok(ticket.clone());
        }
        *state = SessionState::Authenticating;
        match self.sign_in(transport).await {
            Ok(ticket) => {
                debug!("session ticket acquired");
                *state = SessionState::Authenticated(ticket.clone());
                Ok(ticket)
            }
            Err(error) => {
                *state = SessionState::NoSession;
                Err(error)
            }
        }
    }

    #[instrument(skip(self, transport))]
    async fn sign_in(&self, transport: &Transport) -> Result<String> {
        let request = envelope::sign_in(&self.identity, OffsetDateTime::now_utc())?;
        let body = transport.post(request).await?;
        response::extract_session_ticket(&body)
    }
}
