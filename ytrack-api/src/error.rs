//! Error types for the YouTrack client.
//!
//! Every non-2xx response is normalized into a [`YouTrackError`] here, whatever
//! shape its body has: a JSON `error`/`error_description` pair, a bare legacy
//! `<error>text</error>` document, or arbitrary text such as an HTML error
//! page.

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;

use crate::consts::{INVALID_QUERY_ERROR, MAX_ERROR_BODY_CHARS};

/// Errors that can occur when talking to a YouTrack server.
#[derive(Debug, Error)]
pub enum YouTrackError {
  /// The server URL was empty.
  #[error("YouTrack server URL is not set")]
  MissingServerUrl,

  /// No project was given and the client has no default project.
  #[error("No project given and no default project configured")]
  MissingProject,

  /// The server rejected the credentials and they cannot be refreshed.
  #[error("{message}")]
  Authentication {
    message: String,
    #[source]
    source: Option<Box<YouTrackError>>,
  },

  /// No project matches the name or short name.
  #[error("Project '{0}' not found")]
  ProjectNotFound(String),

  /// The project has no custom field with this name.
  #[error("Custom field '{field}' not found in project '{project}'")]
  FieldNotFound { field: String, project: String },

  /// Any other non-2xx response.
  #[error("{status} - {message}")]
  Api {
    status: u16,
    error: Option<String>,
    message: String,
  },

  /// YouTrack could not parse a search query.
  #[error("Invalid query: {message}")]
  InvalidQuery { message: String },

  /// The caller cancelled the operation.
  #[error("Operation cancelled")]
  Cancelled,

  /// Network or HTTP error.
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// A 2xx response whose body did not have the expected shape.
  #[error("Failed to decode YouTrack response: {0}")]
  Decode(String),
}

/// Result type for YouTrack operations.
pub type Result<T> = std::result::Result<T, YouTrackError>;

#[derive(Deserialize)]
struct ErrorBody {
  error: Option<String>,
  error_description: Option<String>,
}

impl YouTrackError {
  /// HTTP status carried by the error, if any
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Api { status, .. } => Some(*status),
      Self::InvalidQuery { .. } => Some(StatusCode::BAD_REQUEST.as_u16()),
      Self::Http(error) => error.status().map(|status| status.as_u16()),
      _ => None,
    }
  }

  /// Build an error from a failed response, consuming its body
  pub(crate) async fn from_response(response: reqwest::Response) -> Self {
    let status = response.status().as_u16();
    let is_json = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .is_some_and(|value| value.contains("json"));

    match response.text().await {
      Ok(body) => Self::from_body(status, is_json, &body),
      Err(error) => Self::Http(error),
    }
  }

  /// Normalize a failed response body into an error
  pub(crate) fn from_body(status: u16, is_json: bool, body: &str) -> Self {
    if is_json && let Ok(ErrorBody { error: Some(error), error_description }) = serde_json::from_str(body) {
      let message = match &error_description {
        Some(description) if !description.is_empty() => format!("{error}: {description}"),
        _ => error.clone(),
      };

      if status == StatusCode::BAD_REQUEST.as_u16() && error == INVALID_QUERY_ERROR {
        return Self::InvalidQuery { message };
      }

      return Self::Api {
        status,
        error: Some(error),
        message,
      };
    }

    let message = match legacy_error_text(body) {
      Some(text) => text.to_string(),
      None if body.trim().is_empty() => StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string(),
      None => body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    };

    Self::Api {
      status,
      error: None,
      message,
    }
  }
}

/// Text of a bare `<error>text</error>` document, as returned by the legacy
/// REST API. Documents with child elements do not qualify.
fn legacy_error_text(body: &str) -> Option<&str> {
  let mut rest = body.trim();
  if rest.starts_with("<?xml") {
    rest = rest[rest.find("?>")? + 2..].trim_start();
  }

  let text = rest.strip_prefix("<error>")?.strip_suffix("</error>")?;
  if text.contains('<') {
    return None;
  }
  Some(text.trim())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_json_error_body() {
    let error = YouTrackError::from_body(
      404,
      true,
      r#"{"error":"Not Found","error_description":"Entity with id DEMO-9 not found"}"#,
    );

    assert_eq!(error.to_string(), "404 - Not Found: Entity with id DEMO-9 not found");
    match error {
      YouTrackError::Api { status, error, .. } => {
        assert_eq!(status, 404);
        assert_eq!(error.as_deref(), Some("Not Found"));
      }
      other => panic!("Expected Api error, got {other:?}"),
    }
  }

  #[test]
  fn test_invalid_query_body() {
    let error = YouTrackError::from_body(
      400,
      true,
      r#"{"error":"invalid_query","error_description":"Unknown value: 9.9"}"#,
    );

    assert!(matches!(error, YouTrackError::InvalidQuery { .. }));
    assert_eq!(error.status(), Some(400));
  }

  #[test]
  fn test_invalid_query_needs_bad_request_status() {
    let error = YouTrackError::from_body(500, true, r#"{"error":"invalid_query"}"#);
    assert!(matches!(error, YouTrackError::Api { status: 500, .. }));
  }

  #[test]
  fn test_legacy_xml_error_body() {
    let body = r#"<?xml version="1.0" encoding="UTF-8"?><error>Incorrect login or password.</error>"#;
    let error = YouTrackError::from_body(403, false, body);

    assert_eq!(error.to_string(), "403 - Incorrect login or password.");
    assert_eq!(error.status(), Some(403));
  }

  #[test]
  fn test_nested_xml_is_kept_verbatim() {
    let body = "<error><field>x</field></error>";
    let error = YouTrackError::from_body(500, false, body);

    assert_eq!(error.to_string(), format!("500 - {body}"));
  }

  #[test]
  fn test_unstructured_body_is_truncated() {
    let body = "x".repeat(MAX_ERROR_BODY_CHARS + 100);
    match YouTrackError::from_body(502, false, &body) {
      YouTrackError::Api { message, error, .. } => {
        assert_eq!(message.len(), MAX_ERROR_BODY_CHARS);
        assert!(error.is_none());
      }
      other => panic!("Expected Api error, got {other:?}"),
    }
  }

  #[test]
  fn test_empty_body_uses_reason_phrase() {
    let error = YouTrackError::from_body(503, false, "  ");
    assert_eq!(error.to_string(), "503 - Service Unavailable");
  }

  #[test]
  fn test_authentication_error_keeps_source() {
    let cause = YouTrackError::from_body(403, false, "");
    let error = YouTrackError::Authentication {
      message: "Authentication failed for anonymous user on YouTrack https://yt.example.com".to_string(),
      source: Some(Box::new(cause)),
    };

    let source = std::error::Error::source(&error).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("403 - Forbidden"));
  }
}
