//! Mock server fixtures shared by the endpoint tests.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve two projects: `Demo` (`DEMO`, id `0-1`) and `Other` (`OTH`, id `0-2`)
pub(crate) async fn mount_projects(server: &MockServer) {
  Mock::given(method("GET"))
    .and(path("/api/admin/projects"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": "0-1", "name": "Demo", "shortName": "DEMO", "$type": "Project"},
      {"id": "0-2", "name": "Other", "shortName": "OTH", "$type": "Project"}
    ])))
    .mount(server)
    .await;
}

/// Serve the custom fields of `Demo`: a version field, a state field and an
/// enum field
pub(crate) async fn mount_project_fields(server: &MockServer) {
  Mock::given(method("GET"))
    .and(path("/api/admin/projects/0-1/customFields"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": "92-1", "$type": "VersionProjectCustomField", "field": {"name": "Fix version"}},
      {"id": "92-2", "$type": "StateProjectCustomField", "field": {"name": "State"}},
      {"id": "92-3", "$type": "EnumProjectCustomField", "field": {"name": "Type"}}
    ])))
    .mount(server)
    .await;
}
