//! # YouTrack Client
//!
//! The HTTP core shared by every endpoint: URL normalization, authentication,
//! the retry-once-on-403 request protocol and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::consts::{API_SUFFIX, LOGIN_PATH, USER_AGENT};
use crate::error::{Result, YouTrackError};
use crate::models::Authentication;

/// Normalize a server URL so it ends with exactly one `/api/` suffix.
///
/// ```
/// use ytrack_api::canonical_api_url;
///
/// assert_eq!(canonical_api_url("https://yt.example.com/").unwrap(), "https://yt.example.com/api/");
/// assert_eq!(canonical_api_url("https://yt.example.com/api").unwrap(), "https://yt.example.com/api/");
/// ```
pub fn canonical_api_url(server_url: &str) -> Result<String> {
  let trimmed = server_url.trim();
  if trimmed.is_empty() {
    return Err(YouTrackError::MissingServerUrl);
  }

  if trimmed.ends_with(API_SUFFIX) {
    Ok(trimmed.to_string())
  } else if trimmed.ends_with("/api") {
    Ok(format!("{trimmed}/"))
  } else {
    Ok(format!("{}{API_SUFFIX}", trimmed.trim_end_matches('/')))
  }
}

/// A request relative to the API root
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
  method: Method,
  path: String,
  query: Vec<(String, String)>,
  body: Option<serde_json::Value>,
}

impl ApiRequest {
  pub(crate) fn get(path: impl Into<String>) -> Self {
    Self::new(Method::GET, path)
  }

  pub(crate) fn post(path: impl Into<String>) -> Self {
    Self::new(Method::POST, path)
  }

  fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      query: Vec::new(),
      body: None,
    }
  }

  pub(crate) fn query(mut self, key: &str, value: impl Into<String>) -> Self {
    self.query.push((key.to_string(), value.into()));
    self
  }

  pub(crate) fn json(mut self, body: &impl Serialize) -> Result<Self> {
    let body = serde_json::to_value(body).map_err(|e| YouTrackError::Decode(format!("Failed to encode request: {e}")))?;
    self.body = Some(body);
    Ok(self)
  }
}

/// Represents a YouTrack API client
pub struct YouTrackClient {
  pub(crate) client: Client,
  pub(crate) api_url: String,
  pub(crate) auth: Authentication,
  pub(crate) default_project: Option<String>,
  cancel: Option<CancellationToken>,
  authenticated: AtomicBool,
}

impl std::fmt::Debug for YouTrackClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("YouTrackClient")
      .field("api_url", &self.api_url)
      .field("auth", &self.auth)
      .field("default_project", &self.default_project)
      .finish_non_exhaustive()
  }
}

impl YouTrackClient {
  /// Create a new YouTrack client.
  ///
  /// The session cookie store is only enabled for password authentication.
  pub fn new(server_url: &str, auth: Authentication) -> Result<Self> {
    let api_url = canonical_api_url(server_url)?;
    let client = Client::builder()
      .user_agent(USER_AGENT)
      .cookie_store(matches!(auth, Authentication::Password { .. }))
      .build()?;

    debug!("Created YouTrack client for {api_url} ({})", auth.describe());

    Ok(Self {
      client,
      api_url,
      auth,
      default_project: None,
      cancel: None,
      authenticated: AtomicBool::new(false),
    })
  }

  /// Use `project` when an operation is not given one
  pub fn with_default_project(mut self, project: impl Into<String>) -> Self {
    let project = project.into();
    self.default_project = (!project.trim().is_empty()).then_some(project);
    self
  }

  /// Abort reads and skip further requests once `token` is cancelled
  pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
    self.cancel = Some(token);
    self
  }

  /// The normalized API URL, ending in `/api/`
  pub fn api_url(&self) -> &str {
    &self.api_url
  }

  /// The server root with a trailing slash, used for login and issue links
  pub fn server_root(&self) -> &str {
    self.api_url.strip_suffix("api/").unwrap_or(&self.api_url)
  }

  /// The server root without its trailing slash, for messages
  pub fn server_url(&self) -> &str {
    self.server_root().trim_end_matches('/')
  }

  pub fn authentication(&self) -> &Authentication {
    &self.auth
  }

  pub fn default_project(&self) -> Option<&str> {
    self.default_project.as_deref()
  }

  /// Log in now when using password authentication; other modes need no
  /// session.
  pub async fn login(&self) -> Result<()> {
    let Authentication::Password { username, password } = &self.auth else {
      return Ok(());
    };
    self.check_cancelled()?;

    let url = format!("{}{LOGIN_PATH}", self.server_root());
    debug!("Logging in to {url} as {username}");

    let response = self
      .client
      .post(&url)
      .header(ACCEPT, "application/json")
      .form(&[("login", username.as_str()), ("password", password.as_str())])
      .send()
      .await?;

    if response.status() != StatusCode::OK {
      let cause = YouTrackError::from_response(response).await;
      return Err(YouTrackError::Authentication {
        message: format!(
          "Authentication failed for user {username} on YouTrack {}: {cause}",
          self.server_url()
        ),
        source: Some(Box::new(cause)),
      });
    }

    self.authenticated.store(true, Ordering::SeqCst);
    Ok(())
  }

  /// Send a request, re-authenticating and retrying once on 403.
  pub(crate) async fn send(&self, request: &ApiRequest) -> Result<Response> {
    if matches!(self.auth, Authentication::Password { .. }) && !self.authenticated.load(Ordering::SeqCst) {
      self.login().await?;
    }

    let response = self.dispatch(request).await?;
    if response.status() != StatusCode::FORBIDDEN {
      return Self::check(response).await;
    }

    let cause = YouTrackError::from_response(response).await;
    self.reauthenticate(cause).await?;

    let response = self.dispatch(request).await?;
    Self::check(response).await
  }

  /// Send a request and decode its JSON body
  pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
    let response = self.send(request).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| YouTrackError::Decode(format!("{} for {}: {e}", request.method, request.path)))
  }

  /// Send a request whose response body is not needed
  pub(crate) async fn send_empty(&self, request: &ApiRequest) -> Result<()> {
    self.send(request).await.map(drop)
  }

  async fn reauthenticate(&self, cause: YouTrackError) -> Result<()> {
    match &self.auth {
      Authentication::Password { .. } => {
        debug!("YouTrack answered 403 ({cause}); logging in again");
        self.authenticated.store(false, Ordering::SeqCst);
        self.login().await
      }
      auth => Err(YouTrackError::Authentication {
        message: format!(
          "Authentication failed for {} on YouTrack {}",
          auth.describe(),
          self.server_url()
        ),
        source: Some(Box::new(cause)),
      }),
    }
  }

  async fn dispatch(&self, request: &ApiRequest) -> Result<Response> {
    self.check_cancelled()?;

    let mut builder = self
      .client
      .request(request.method.clone(), format!("{}{}", self.api_url, request.path))
      .header(ACCEPT, "application/json");
    if !request.query.is_empty() {
      builder = builder.query(&request.query);
    }
    if let Authentication::Token(token) = &self.auth {
      builder = builder.bearer_auth(token);
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let http_request = builder.build()?;
    debug!("Making request to {} {}", http_request.method(), http_request.url());
    let send = self.client.execute(http_request);

    // Reads may be abandoned mid-flight; writes always run to completion
    match &self.cancel {
      Some(cancel) if request.method == Method::GET => tokio::select! {
        _ = cancel.cancelled() => Err(YouTrackError::Cancelled),
        response = send => Ok(response?),
      },
      _ => Ok(send.await?),
    }
  }

  async fn check(response: Response) -> Result<Response> {
    if response.status().is_success() {
      Ok(response)
    } else {
      Err(YouTrackError::from_response(response).await)
    }
  }

  fn check_cancelled(&self) -> Result<()> {
    match &self.cancel {
      Some(cancel) if cancel.is_cancelled() => Err(YouTrackError::Cancelled),
      _ => Ok(()),
    }
  }
}
