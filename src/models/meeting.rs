use serde::{Deserialize, Serialize};

// Token response from the OAuth endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

// One occurrence of a meeting, as listed by the instances and user-meetings endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingInstance {
    #[serde(default)]
    pub uuid: String,
    // Meeting IDs exceed 2^53 for some accounts; keep the raw JSON value
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
}

impl MeetingInstance {
    /// Identifier used to query the participants report.
    ///
    /// Falls back to the numeric meeting ID, rendered as a string, when the
    /// listing carries no uuid.
    pub fn report_key(&self) -> Option<String> {
        if !self.uuid.is_empty() {
            return Some(self.uuid.clone());
        }
        match &self.id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(serde_json::Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Whether this listing entry is an occurrence of `meeting_id`.
    pub fn is_meeting(&self, meeting_id: &str) -> bool {
        match &self.id {
            Some(serde_json::Value::String(id)) => id == meeting_id,
            Some(serde_json::Value::Number(id)) => id.to_string() == meeting_id,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeetingListResponse {
    #[serde(default)]
    pub meetings: Vec<MeetingInstance>,
}

// Raw participant record from the meeting report endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub join_time: Option<String>,
    #[serde(default)]
    pub leave_time: Option<String>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantsResponse {
    #[serde(default)]
    pub page_size: i32,
    #[serde(default)]
    pub total_records: i32,
    #[serde(default)]
    pub participants: Vec<ParticipantRecord>,
}

// Error body returned by the API on non-success statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}
