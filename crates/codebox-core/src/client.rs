//! Session client for a single remote CodeBox.
//!
//! A [`CodeBox`] moves through three states:
//!
//! ```text
//!   Uninitialized ──start──▶ Active ──stop──▶ Uninitialized
//!         │                    │
//!         └──────cleanup───────┴──────────────▶ Disposed (terminal)
//! ```
//!
//! Every session-scoped operation goes through a single dispatch routine,
//! which rejects calls outside the `Active` state before touching the network.

use crate::config::CodeBoxConfig;
use crate::error::{CodeBoxError, Result};
use crate::transport::{HttpTransport, Method, Transport};
use crate::types::{
    DownloadResponse, FileRef, ListFilesResponse, Output, SessionId, StartResponse, Status,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Internal session state. The transport lives only in non-disposed states.
enum SessionState<T> {
    Uninitialized { transport: Arc<T> },
    Active { id: SessionId, transport: Arc<T> },
    Disposed,
}

impl<T> SessionState<T> {
    fn phase(&self) -> Phase {
        match self {
            Self::Uninitialized { .. } => Phase::Uninitialized,
            Self::Active { .. } => Phase::Active,
            Self::Disposed => Phase::Disposed,
        }
    }
}

/// Snapshot of a client's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session has been started (or it was stopped).
    Uninitialized,
    /// A remote session is running.
    Active,
    /// The transport was released by `cleanup`.
    Disposed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Active => write!(f, "Active"),
            Self::Disposed => write!(f, "Disposed"),
        }
    }
}

/// Client managing the lifecycle of one remote CodeBox session.
///
/// Operations take `&self` and may be issued concurrently; no ordering is
/// guaranteed between in-flight requests. Callers that need ordering should
/// await each call before issuing the next.
pub struct CodeBox<T: Transport = HttpTransport> {
    state: Mutex<SessionState<T>>,
    last_interaction: std::sync::Mutex<DateTime<Utc>>,
}

impl CodeBox<HttpTransport> {
    /// Create a client talking HTTP to the configured service.
    pub fn new(config: &CodeBoxConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(transport))
    }

    /// Create a client from `CODEBOX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(&CodeBoxConfig::from_env())
    }
}

impl<T: Transport> CodeBox<T> {
    /// Create a client over an injected transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            state: Mutex::new(SessionState::Uninitialized {
                transport: Arc::new(transport),
            }),
            last_interaction: std::sync::Mutex::new(Utc::now()),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> Phase {
        self.state.lock().await.phase()
    }

    /// Identifier of the running session, if any.
    pub async fn session_id(&self) -> Option<SessionId> {
        match &*self.state.lock().await {
            SessionState::Active { id, .. } => Some(id.clone()),
            _ => None,
        }
    }

    pub async fn is_active(&self) -> bool {
        self.state().await == Phase::Active
    }

    /// Time of the last dispatched operation (or construction).
    pub fn last_interaction(&self) -> DateTime<Utc> {
        *self
            .last_interaction
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn touch(&self) {
        *self
            .last_interaction
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Utc::now();
    }

    /// Start a remote session.
    ///
    /// Calling this while a session is already active returns `started`
    /// without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns [`CodeBoxError::Disposed`] after `cleanup`, or the transport's
    /// error if the creation request fails.
    pub async fn start(&self) -> Result<Status> {
        // Held across the request so concurrent starts create one session.
        let mut state = self.state.lock().await;
        let transport = match &*state {
            SessionState::Active { id, .. } => {
                tracing::info!(session_id = %id, "CodeBox is already started");
                return Ok(Status::started());
            }
            SessionState::Disposed => return Err(CodeBoxError::Disposed),
            SessionState::Uninitialized { transport } => Arc::clone(transport),
        };

        let start = std::time::Instant::now();
        tracing::debug!("Starting CodeBox session");
        let value = transport
            .send(Method::Get, "/codebox/start", None)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Session creation failed"))?;
        let response: StartResponse = decode("start", value)?;

        let id = SessionId::new(response.id);
        tracing::info!(
            session_id = %id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "CodeBox started"
        );
        *state = SessionState::Active { id, transport };
        Ok(Status::started())
    }

    /// Stop the remote session.
    ///
    /// The session id is cleared once the service answers, whatever the
    /// shape of the body; the transport is kept so the client can be restarted.
    ///
    /// # Errors
    ///
    /// Returns [`CodeBoxError::NotStarted`] when no session is active. A body
    /// without a `status` field yields [`CodeBoxError::Protocol`] after the
    /// session has already been cleared.
    pub async fn stop(&self) -> Result<Status> {
        let mut state = self.state.lock().await;
        let (id, transport) = match &*state {
            SessionState::Active { id, transport } => (id.clone(), Arc::clone(transport)),
            SessionState::Uninitialized { .. } => return Err(CodeBoxError::NotStarted),
            SessionState::Disposed => return Err(CodeBoxError::Disposed),
        };

        tracing::debug!(session_id = %id, "Stopping CodeBox session");
        let value = transport
            .send(Method::Post, &format!("/codebox/{id}/stop"), None)
            .await
            .inspect_err(|e| tracing::warn!(session_id = %id, error = %e, "Session stop failed"))?;

        *state = SessionState::Uninitialized { transport };
        tracing::info!(session_id = %id, "CodeBox stopped");
        decode("stop", value)
    }

    /// Release the transport. Local only; does not stop the remote session.
    ///
    /// Safe to call repeatedly.
    pub async fn cleanup(&self) {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut *state, SessionState::Disposed) {
            SessionState::Disposed => {}
            SessionState::Active { id, .. } => {
                tracing::warn!(session_id = %id, "Disposing transport while session is still active");
            }
            SessionState::Uninitialized { .. } => {
                tracing::debug!("CodeBox transport disposed");
            }
        }
    }

    /// Send a request scoped under the active session.
    ///
    /// `endpoint` is appended to `/codebox/{id}/`. The precondition is checked
    /// before the activity timestamp is updated, so rejected calls don't count
    /// as activity. Transport errors are returned unchanged.
    pub(crate) async fn dispatch(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let (id, transport) = {
            let state = self.state.lock().await;
            match &*state {
                SessionState::Active { id, transport } => (id.clone(), Arc::clone(transport)),
                SessionState::Uninitialized { .. } => return Err(CodeBoxError::NotStarted),
                SessionState::Disposed => return Err(CodeBoxError::Disposed),
            }
        };
        self.touch();

        let path = format!("/codebox/{id}/{endpoint}");
        let start = std::time::Instant::now();
        tracing::debug!(session_id = %id, %method, path = %path, "Dispatching request");
        if let Some(body) = &body {
            tracing::trace!(session_id = %id, body = %body, "Request body");
        }

        match transport.send(method, &path, body).await {
            Ok(value) => {
                tracing::debug!(
                    session_id = %id,
                    %method,
                    path = %path,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request completed"
                );
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(session_id = %id, %method, path = %path, error = %e, "Request failed");
                Err(e.into())
            }
        }
    }

    /// Query the health of the remote session.
    pub async fn status(&self) -> Result<Status> {
        let value = self.dispatch(Method::Get, "", None).await?;
        decode("status", value)
    }

    /// Execute a code string in the session.
    pub async fn run(&self, code: &str) -> Result<Output> {
        let value = self
            .dispatch(Method::Post, "run", Some(json!({ "code": code })))
            .await?;
        decode("run", value)
    }

    /// Write a file into the session filesystem.
    pub async fn upload(&self, file_name: &str, content: &str) -> Result<Status> {
        let body = json!({ "file": { "file_name": file_name, "content": content } });
        let value = self.dispatch(Method::Post, "upload", Some(body)).await?;
        decode("upload", value)
    }

    /// Read a file from the session filesystem.
    pub async fn download(&self, file_name: &str) -> Result<FileRef> {
        let value = self
            .dispatch(Method::Get, "download", Some(json!({ "file_name": file_name })))
            .await?;
        let response: DownloadResponse = decode("download", value)?;
        Ok(FileRef {
            name: file_name.to_string(),
            content: response.content,
        })
    }

    /// Install a package into the session environment.
    pub async fn install(&self, package_name: &str) -> Result<Status> {
        let value = self
            .dispatch(
                Method::Post,
                "install",
                Some(json!({ "package_name": package_name })),
            )
            .await?;
        decode("install", value)
    }

    /// List files in the session filesystem, in service order.
    pub async fn list_files(&self) -> Result<Vec<FileRef>> {
        let value = self.dispatch(Method::Get, "files", None).await?;
        let response: ListFilesResponse = decode("list_files", value)?;
        Ok(response.files.into_iter().map(FileRef::named).collect())
    }

    /// Restart the session's execution environment. The id is unchanged.
    pub async fn restart(&self) -> Result<Status> {
        let value = self.dispatch(Method::Post, "restart", None).await?;
        decode("restart", value)
    }
}

/// Interpret a response body as the schema expected for `operation`.
fn decode<R: DeserializeOwned>(operation: &str, value: Value) -> Result<R> {
    serde_json::from_value(value)
        .map_err(|e| CodeBoxError::Protocol(format!("unexpected {operation} response: {e}")))
}
