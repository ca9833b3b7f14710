use chrono::Duration;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::auth::{AccessToken, ZoomAuth};
use crate::config::{AppConfig, ZoomCredentials};
use crate::error::{ReportError, ReportResult};
use crate::models::attendance::{parse_api_timestamp, ParticipantSession};
use crate::models::meeting::{
    ApiErrorBody, MeetingInstance, MeetingListResponse, ParticipantRecord, ParticipantsResponse,
};
use crate::models::request::TimeWindow;

/// Largest page the report endpoints accept; one page is fetched per call
pub const PAGE_SIZE: &str = "300";

const REQUEST_TIMEOUT_SECS: u64 = 30;

// Instances that started this long before the window may still overlap it
const MAX_MEETING_SPAN_HOURS: i64 = 24;

/// Client for the Zoom REST API
pub struct ZoomClient {
    client: Client,
    credentials: ZoomCredentials,
    api_base_url: String,
    oauth_url: String,
}

impl ZoomClient {
    pub fn new(
        credentials: ZoomCredentials,
        api_base_url: impl Into<String>,
        oauth_url: impl Into<String>,
    ) -> ReportResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ReportError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            oauth_url: oauth_url.into(),
        })
    }

    /// Create a client from loaded configuration.
    ///
    /// Fails with a configuration error when credentials are missing, before
    /// any network call.
    pub fn from_config(config: &AppConfig) -> ReportResult<Self> {
        Self::new(
            config.zoom_credentials()?,
            config.api_base_url.clone(),
            config.oauth_url.clone(),
        )
    }

    pub async fn authenticate(&self) -> ReportResult<AccessToken> {
        ZoomAuth::request_token(&self.client, &self.oauth_url, &self.credentials).await
    }

    /// List the ended instances of a meeting ID
    pub async fn list_meeting_instances(
        &self,
        token: &AccessToken,
        meeting_id: &str,
    ) -> ReportResult<Vec<MeetingInstance>> {
        let url = format!(
            "{}/past_meetings/{}/instances",
            self.api_base_url,
            urlencoding::encode(meeting_id)
        );

        info!("Listing instances of meeting {}", meeting_id);
        let response: MeetingListResponse = self.get_json(token, &url, &[]).await?;
        info!("Found {} instances of meeting {}", response.meetings.len(), meeting_id);

        Ok(response.meetings)
    }

    /// List the account owner's previous meetings
    pub async fn list_previous_meetings(&self, token: &AccessToken) -> ReportResult<Vec<MeetingInstance>> {
        let url = format!("{}/users/me/meetings", self.api_base_url);

        info!("Listing previous meetings");
        let response: MeetingListResponse = self
            .get_json(token, &url, &[("type", "previous_meetings"), ("page_size", PAGE_SIZE)])
            .await?;
        info!("Found {} previous meetings", response.meetings.len());

        Ok(response.meetings)
    }

    /// Fetch the participants report of one meeting instance
    pub async fn list_participants(
        &self,
        token: &AccessToken,
        meeting_uuid: &str,
    ) -> ReportResult<Vec<ParticipantRecord>> {
        let url = format!(
            "{}/report/meetings/{}/participants",
            self.api_base_url,
            encode_meeting_uuid(meeting_uuid)
        );

        let response: ParticipantsResponse = self
            .get_json(token, &url, &[("page_size", PAGE_SIZE)])
            .await?;
        info!(
            "Received {} participant records for instance {}",
            response.participants.len(),
            meeting_uuid
        );

        Ok(response.participants)
    }

    /// Fetch every participant session overlapping `window`.
    ///
    /// With `meeting_id` set, only instances of that meeting are considered,
    /// merged with matching entries of the previous meetings list; otherwise
    /// all previous meetings of the account owner are. Either the
    /// full set is returned or an error, never a partial result.
    pub async fn fetch_sessions(
        &self,
        meeting_id: Option<&str>,
        window: &TimeWindow,
    ) -> ReportResult<Vec<ParticipantSession>> {
        let token = self.authenticate().await?;

        let listed = match meeting_id {
            Some(id) => {
                // Recently ended occurrences may only show up in the user's meeting list
                let mut instances = self.list_meeting_instances(&token, id).await?;
                let previous = self.list_previous_meetings(&token).await?;
                let before = instances.len();
                instances.extend(previous.into_iter().filter(|meeting| meeting.is_meeting(id)));
                debug!(
                    "Added {} occurrences of meeting {} from the previous meetings list",
                    instances.len() - before,
                    id
                );
                instances
            }
            None => self.list_previous_meetings(&token).await?,
        };
        let instances = select_instances(listed, window);
        info!("{} meeting instances fall within the time window", instances.len());

        let mut sessions = Vec::new();
        for (index, instance) in instances.iter().enumerate() {
            let Some(key) = instance.report_key() else {
                continue;
            };
            info!(
                "Processing {}/{}: {}",
                index + 1,
                instances.len(),
                instance.topic.as_deref().unwrap_or("Unknown Meeting")
            );

            let records = self.list_participants(&token, &key).await?;
            for record in &records {
                match ParticipantSession::from_record(record) {
                    Some(session) if session.overlaps(window.start, window.end) => sessions.push(session),
                    Some(_) => debug!("Session of '{}' lies outside the time window", record.name),
                    None => warn!("Skipping participant '{}' without a valid join time", record.name),
                }
            }
        }

        info!("Fetched {} participant sessions", sessions.len());
        Ok(sessions)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: &str,
        query: &[(&str, &str)],
    ) -> ReportResult<T> {
        debug!("API URL: {}", url);

        let res = self
            .client
            .get(url)
            .header("Authorization", token.bearer())
            .header("Content-Type", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!("Request to {} failed: {}", url, e);
                ReportError::fetch(e.status().map(|s| s.as_u16()), e.to_string())
            })?;

        let status = res.status();
        info!("Response received with status: {}", status);

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .filter(|parsed| !parsed.message.is_empty())
                .map(|parsed| parsed.message)
                .unwrap_or(body);
            error!("Request to {} returned {}: {}", url, status, message);
            return Err(ReportError::fetch(Some(status.as_u16()), message));
        }

        res.json::<T>()
            .await
            .map_err(|e| ReportError::fetch(Some(status.as_u16()), format!("malformed response: {}", e)))
    }
}

/// Encode a meeting uuid for use in a URL path.
///
/// Uuids that begin with `/` or contain `//` must be encoded twice.
pub fn encode_meeting_uuid(uuid: &str) -> String {
    let once = urlencoding::encode(uuid).into_owned();
    if uuid.starts_with('/') || uuid.contains("//") {
        urlencoding::encode(&once).into_owned()
    } else {
        once
    }
}

/// Keep the instances that may overlap `window`, one per uuid, oldest first.
pub fn select_instances(instances: Vec<MeetingInstance>, window: &TimeWindow) -> Vec<MeetingInstance> {
    let earliest_start = window
        .start
        .checked_sub_signed(Duration::hours(MAX_MEETING_SPAN_HOURS))
        .unwrap_or(window.start);
    let mut unique: HashMap<String, MeetingInstance> = HashMap::new();

    for instance in instances {
        let Some(start) = instance.start_time.as_deref().and_then(parse_api_timestamp) else {
            continue;
        };
        if start < earliest_start || start > window.end {
            continue;
        }
        if let Some(key) = instance.report_key() {
            unique.insert(key, instance);
        }
    }

    let mut selected: Vec<MeetingInstance> = unique.into_values().collect();
    selected.sort_by_key(|instance| {
        (
            instance.start_time.as_deref().and_then(parse_api_timestamp),
            instance.report_key(),
        )
    });
    selected
}
