use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::AppConfig;

pub const TEST_TOKEN: &str = "test-token";
pub const MEETING_ID: &str = "469737038";

/// Fixed "now" used by the time-window tests
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 12, 20, 0, 0).unwrap()
}

/// Build a configuration pointing at a mock server, with extra overrides
pub fn test_config(server_uri: &str, output_dir: &Path, extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("ZOOM_ACCOUNT_ID".into(), "acct_123".into());
    vars.insert("ZOOM_CLIENT_ID".into(), "client".into());
    vars.insert("ZOOM_CLIENT_SECRET".into(), "secret".into());
    vars.insert("ZOOM_API_BASE_URL".into(), format!("{}/v2", server_uri));
    vars.insert("ZOOM_OAUTH_URL".into(), format!("{}/oauth/token", server_uri));
    vars.insert("REPORT_OUTPUT_DIR".into(), output_dir.to_string_lossy().into_owned());
    vars.insert("REPORT_TIMEZONE".into(), "America/Los_Angeles".into());
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }

    AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn token_json() -> Value {
    json!({
        "access_token": TEST_TOKEN,
        "token_type": "bearer",
        "expires_in": 3599,
        "scope": "report:read:admin"
    })
}

/// `(uuid, start_time)` pairs as an instances listing
pub fn instances_json(instances: &[(&str, &str)]) -> Value {
    let meetings: Vec<Value> = instances
        .iter()
        .map(|(uuid, start)| json!({ "uuid": uuid, "start_time": start }))
        .collect();
    json!({ "meetings": meetings })
}

/// `(name, join_time, leave_time)` triples as a participants report
pub fn participants_json(records: &[(&str, &str, Option<&str>)]) -> Value {
    let participants: Vec<Value> = records
        .iter()
        .enumerate()
        .map(|(i, (name, join, leave))| {
            json!({
                "id": format!("p{}", i),
                "name": name,
                "user_email": "",
                "join_time": join,
                "leave_time": leave.unwrap_or(""),
                "duration": 600,
                "status": "in_meeting"
            })
        })
        .collect();
    json!({
        "page_size": 300,
        "total_records": participants.len(),
        "participants": participants
    })
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json()))
        .mount(server)
        .await;
}

pub async fn mount_instances(server: &MockServer, meeting_id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/past_meetings/{}/instances", meeting_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_participants(server: &MockServer, uuid: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/report/meetings/{}/participants", uuid)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_previous_meetings(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/v2/users/me/meetings"))
        .and(query_param("type", "previous_meetings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
