//! Google Secret Manager backed store
//!
//! Talks to the Secret Manager REST API directly:
//! `GET {endpoint}/v1/projects/{project}/secrets/{key}/versions/latest:access`
//! with a bearer token. Only the latest version of a secret is ever read.
//!
//! HTTP calls run on a worker thread owned by the store, so lookups are safe
//! from inside an async runtime. The calling thread still blocks until the
//! reply arrives.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use base64::Engine as _;
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};
use crate::logging::{ConsoleLogger, SharedLogger};
use crate::{log_debug, log_error, log_info, log_warn};

pub const DEFAULT_GSM_ENDPOINT: &str = "https://secretmanager.googleapis.com";
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
/// Environment variable consulted for a pre-minted OAuth access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
pub const DEFAULT_GSM_TIMEOUT: Duration = Duration::from_secs(5);

/// Refresh metadata tokens this long before they actually expire
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Where the bearer token for Secret Manager calls comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A fixed token supplied by the caller
    Static(String),
    /// `GOOGLE_OAUTH_ACCESS_TOKEN`
    Environment,
    /// The GCE/GKE/Cloud Run metadata server
    MetadataServer,
    /// `Environment` if the variable is set, otherwise `MetadataServer`
    Auto,
}

/// Connection options for `GsmSecretStore`
#[derive(Clone)]
pub struct GsmOptions {
    pub endpoint: String,
    pub metadata_token_url: String,
    pub timeout: Duration,
    pub token_source: TokenSource,
    pub logger: SharedLogger,
}

impl Default for GsmOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GSM_ENDPOINT.to_string(),
            metadata_token_url: DEFAULT_METADATA_TOKEN_URL.to_string(),
            timeout: DEFAULT_GSM_TIMEOUT,
            token_source: TokenSource::Auto,
            logger: Arc::new(ConsoleLogger::new()),
        }
    }
}

impl GsmOptions {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_metadata_token_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_token_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token_source(mut self, source: TokenSource) -> Self {
        self.token_source = source;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }
}

#[derive(Deserialize)]
struct AccessSecretVersionResponse {
    payload: Option<SecretPayload>,
}

#[derive(Deserialize)]
struct SecretPayload {
    #[serde(default)]
    data: String,
}

#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() + TOKEN_EXPIRY_SLACK < at,
            None => true,
        }
    }
}

// ==================== HTTP WORKER ====================

/// A GET request handed to the worker thread
struct HttpRequest {
    url: String,
    headers: Vec<(&'static str, String)>,
    reply: mpsc::Sender<Result<HttpReply, reqwest::Error>>,
}

struct HttpReply {
    status: StatusCode,
    body: Vec<u8>,
}

/// Owns the blocking client; it is built and dropped on this thread only
struct HttpWorker {
    requests: Mutex<Option<mpsc::Sender<HttpRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl HttpWorker {
    fn spawn(timeout: Duration) -> SecretStoreResult<Self> {
        let (request_tx, request_rx) = mpsc::channel::<HttpRequest>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), reqwest::Error>>();

        let handle = thread::Builder::new()
            .name("layercfg-gsm".to_string())
            .spawn(move || {
                let client = match Client::builder().timeout(timeout).build() {
                    Ok(client) => client,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                for request in request_rx {
                    let mut builder = client.get(&request.url);
                    for (name, value) in &request.headers {
                        builder = builder.header(*name, value.as_str());
                    }
                    let result = builder.send().and_then(|response| {
                        let status = response.status();
                        response.bytes().map(|body| HttpReply {
                            status,
                            body: body.to_vec(),
                        })
                    });
                    // The caller may have given up; nothing to do then
                    let _ = request.reply.send(result);
                }
            })
            .map_err(|e| SecretStoreError::Other(format!("Failed to start HTTP worker: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                requests: Mutex::new(Some(request_tx)),
                handle: Some(handle),
            }),
            Ok(Err(e)) => Err(SecretStoreError::Http(e)),
            Err(_) => Err(SecretStoreError::Other("HTTP worker exited during startup".to_string())),
        }
    }

    fn get(&self, url: String, headers: Vec<(&'static str, String)>) -> SecretStoreResult<HttpReply> {
        let sender = self
            .requests
            .lock()
            .clone()
            .ok_or_else(|| SecretStoreError::NotAvailable("HTTP worker has stopped".to_string()))?;

        let (reply_tx, reply_rx) = mpsc::channel();
        sender
            .send(HttpRequest {
                url,
                headers,
                reply: reply_tx,
            })
            .map_err(|_| SecretStoreError::NotAvailable("HTTP worker has stopped".to_string()))?;

        reply_rx
            .recv()
            .map_err(|_| SecretStoreError::NotAvailable("HTTP worker dropped the request".to_string()))?
            .map_err(SecretStoreError::from)
    }

    /// Stop the worker and wait for it; false if it panicked
    fn shutdown(&mut self) -> bool {
        // Closing the channel ends the worker loop
        self.requests.get_mut().take();
        match self.handle.take() {
            Some(handle) => handle.join().is_ok(),
            None => true,
        }
    }
}

impl Drop for HttpWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ==================== STORE ====================

/// Secret store backed by Google Secret Manager
///
/// # Example
///
/// ```no_run
/// use layercfg_core::secrets::{GsmOptions, GsmSecretStore, SecretStore};
///
/// let store = GsmSecretStore::connect("my-project", GsmOptions::default()).unwrap();
/// let password = store.get("DB_PASSWORD");
/// ```
pub struct GsmSecretStore {
    project_id: String,
    endpoint: String,
    metadata_token_url: String,
    token_source: TokenSource,
    token: Mutex<Option<CachedToken>>,
    logger: SharedLogger,
    worker: HttpWorker,
}

impl GsmSecretStore {
    /// Establish a handle scoped to `project_id`
    ///
    /// Fails if the project id is empty, the HTTP client cannot be built, or
    /// no access token can be obtained.
    pub fn connect(project_id: impl Into<String>, options: GsmOptions) -> SecretStoreResult<Self> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(SecretStoreError::InvalidIdentifier(
                "projectID cannot be empty".to_string(),
            ));
        }

        let worker = HttpWorker::spawn(options.timeout)?;

        let store = Self {
            project_id,
            endpoint: options.endpoint.trim_end_matches('/').to_string(),
            metadata_token_url: options.metadata_token_url,
            token_source: options.token_source,
            token: Mutex::new(None),
            logger: options.logger,
            worker,
        };

        // Fail fast instead of on the first lookup
        store.access_token()?;
        log_info!(store.logger, "Google Secret Manager enabled for project: {}", store.project_id);
        Ok(store)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Resource path of the latest version of `key`
    pub fn secret_path(&self, key: &str) -> String {
        format!("projects/{}/secrets/{}/versions/latest", self.project_id, key)
    }

    /// Access the latest version of `key`, surfacing every failure
    ///
    /// `Ok(None)` means the secret (or its latest version) does not exist.
    /// `SecretStore::get` is the logging, never-failing form.
    pub fn access_latest(&self, key: &str) -> SecretStoreResult<Option<String>> {
        if !is_valid_secret_id(key) {
            return Ok(None);
        }

        let mut reply = self.request_secret(key)?;
        if reply.status == StatusCode::UNAUTHORIZED {
            // Token revoked or expired early: mint a new one and retry once
            *self.token.lock() = None;
            reply = self.request_secret(key)?;
        }

        let status = reply.status;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SecretStoreError::Other(format!(
                "Secret Manager returned {} for {}",
                status,
                self.secret_path(key)
            )));
        }

        let body: AccessSecretVersionResponse = serde_json::from_slice(&reply.body)
            .map_err(|e| SecretStoreError::Decode(format!("unexpected response body: {}", e)))?;
        let Some(payload) = body.payload else {
            return Ok(None);
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.data.as_bytes())
            .map_err(|e| SecretStoreError::Decode(e.to_string()))?;
        let value = String::from_utf8(bytes)
            .map_err(|e| SecretStoreError::Decode(format!("payload is not UTF-8: {}", e)))?;
        Ok(Some(value))
    }

    fn request_secret(&self, key: &str) -> SecretStoreResult<HttpReply> {
        let token = self.access_token()?;
        let url = format!("{}/v1/{}:access", self.endpoint, self.secret_path(key));
        self.worker
            .get(url, vec![("Authorization", format!("Bearer {}", token))])
    }

    fn access_token(&self) -> SecretStoreResult<String> {
        if let Some(token) = self.token.lock().as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }
        // Minted without the lock held; concurrent refreshes race and the
        // last one is kept
        let token = self.mint_token()?;
        let value = token.value.clone();
        *self.token.lock() = Some(token);
        Ok(value)
    }

    fn mint_token(&self) -> SecretStoreResult<CachedToken> {
        match &self.token_source {
            TokenSource::Static(token) => static_token(token.clone()),
            TokenSource::Environment => env_token().ok_or_else(|| {
                SecretStoreError::NotAvailable(format!("{} is not set", ACCESS_TOKEN_ENV))
            }),
            TokenSource::MetadataServer => self.metadata_token(),
            TokenSource::Auto => match env_token() {
                Some(token) => Ok(token),
                None => self.metadata_token(),
            },
        }
    }

    fn metadata_token(&self) -> SecretStoreResult<CachedToken> {
        let reply = self
            .worker
            .get(
                self.metadata_token_url.clone(),
                vec![("Metadata-Flavor", "Google".to_string())],
            )
            .map_err(|e| {
                SecretStoreError::NotAvailable(format!("metadata server unreachable: {}", e))
            })?;
        if !reply.status.is_success() {
            return Err(SecretStoreError::NotAvailable(format!(
                "metadata server returned {}",
                reply.status
            )));
        }
        let body: MetadataTokenResponse = serde_json::from_slice(&reply.body).map_err(|e| {
            SecretStoreError::NotAvailable(format!("unexpected metadata server response: {}", e))
        })?;
        Ok(CachedToken {
            value: body.access_token,
            expires_at: body
                .expires_in
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        })
    }
}

fn static_token(token: String) -> SecretStoreResult<CachedToken> {
    if token.is_empty() {
        return Err(SecretStoreError::NotAvailable("access token is empty".to_string()));
    }
    Ok(CachedToken {
        value: token,
        expires_at: None,
    })
}

fn env_token() -> Option<CachedToken> {
    std::env::var(ACCESS_TOKEN_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map(|value| CachedToken {
            value,
            expires_at: None,
        })
}

/// Secret ids are limited to letters, digits, `_` and `-`, up to 255 chars
fn is_valid_secret_id(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 255
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl SecretStore for GsmSecretStore {
    fn name(&self) -> &str {
        "Google Secret Manager"
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.access_latest(key) {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                log_debug!(self.logger, "Secret {} not found", self.secret_path(key));
                None
            }
            Err(e) => {
                log_warn!(self.logger, "Failed to access secret {}: {}", key, e);
                None
            }
        }
    }
}

impl Drop for GsmSecretStore {
    fn drop(&mut self) {
        log_debug!(
            self.logger,
            "Releasing Google Secret Manager handle for project: {}",
            self.project_id
        );
        if !self.worker.shutdown() {
            log_error!(
                self.logger,
                "Secret Manager HTTP worker for project {} terminated abnormally",
                self.project_id
            );
        }
    }
}

impl std::fmt::Debug for GsmSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GsmSecretStore")
            .field("project_id", &self.project_id)
            .field("endpoint", &self.endpoint)
            .field("token_source", &match self.token_source {
                TokenSource::Static(_) => "static",
                TokenSource::Environment => "environment",
                TokenSource::MetadataServer => "metadata",
                TokenSource::Auto => "auto",
            })
            .finish()
    }
}
