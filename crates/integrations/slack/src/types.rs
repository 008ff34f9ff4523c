use serde::Deserialize;

/// Response from `chat.postMessage`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackApiResponse {
    pub ok: bool,
    pub channel: Option<String>,
    pub ts: Option<String>,
    pub error: Option<String>,
}

/// Response from `auth.test`, used for health checks.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackAuthTestResponse {
    pub ok: bool,
    pub user_id: Option<String>,
    pub team_id: Option<String>,
    pub error: Option<String>,
}
