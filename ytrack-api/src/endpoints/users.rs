//! # User Endpoints

use crate::client::{ApiRequest, YouTrackClient};
use crate::error::Result;
use crate::models::CurrentUser;

impl YouTrackClient {
  /// Fetch the authenticated user; doubles as a connectivity check
  pub async fn current_user(&self) -> Result<CurrentUser> {
    let request = ApiRequest::get("users/me").query("fields", "login,fullName");
    self.send_json(&request).await
  }
}
