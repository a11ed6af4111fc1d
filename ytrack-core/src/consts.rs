//! Constants shared across the ytrack workspace
//!
//! Environment variable names, default custom field names, and other static
//! values used by both the API client and the CLI.

/// Application name used for configuration directories
pub const APP_NAME: &str = "ytrack";

/// Environment variable holding the YouTrack server URL
pub const ENV_YOUTRACK_URL: &str = "YOUTRACK_URL";

/// Environment variable holding a permanent token
pub const ENV_YOUTRACK_TOKEN: &str = "YOUTRACK_TOKEN";

/// Environment variable holding a user name for session login
pub const ENV_YOUTRACK_USERNAME: &str = "YOUTRACK_USERNAME";

/// Environment variable holding the password for session login
pub const ENV_YOUTRACK_PASSWORD: &str = "YOUTRACK_PASSWORD";

/// `.netrc` login value marking the password as a permanent token
pub const NETRC_TOKEN_LOGIN: &str = "token";

/// Default name of the custom field holding an issue's state
pub const DEFAULT_STATUS_FIELD: &str = "State";

/// Default name of the custom field holding an issue's type
pub const DEFAULT_TYPE_FIELD: &str = "Type";

/// Default name of the custom field holding an issue's target version
pub const DEFAULT_VERSION_FIELD: &str = "Fix version";
