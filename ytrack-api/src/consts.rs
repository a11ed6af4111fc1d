//! Constants for the ytrack-api client.

/// User-Agent header value for the YouTrack API client
pub const USER_AGENT: &str = concat!("ytrack/", env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Number of items requested per page
pub const PAGE_SIZE: usize = 40;

/// Canonical suffix of the JSON REST API under the server root
pub const API_SUFFIX: &str = "/api/";

/// Legacy session login endpoint, relative to the server root
pub const LOGIN_PATH: &str = "rest/user/login";

/// Longest prefix of an unstructured error body kept in error messages
pub const MAX_ERROR_BODY_CHARS: usize = 8192;

/// `$type` of project custom fields backed by a version bundle
pub const VERSION_FIELD_TYPE: &str = "VersionProjectCustomField";

/// `$type` of a value stored in a version bundle
pub const VERSION_BUNDLE_ELEMENT: &str = "VersionBundleElement";

/// Server error code for queries YouTrack cannot parse
pub const INVALID_QUERY_ERROR: &str = "invalid_query";
