use serde::{Deserialize, Serialize};

use super::common::is_truthy;

/// Endpoint family used by the dashboard poller
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DashboardSource {
    /// `GET /api/dashboard` returning `{ok, logs}`; the poll doubles as liveness signal
    #[default]
    Consolidated,
    /// `GET /api/logs` returning plain text, plus a separate `POST /ping`
    Legacy,
}

impl DashboardSource {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Consolidated => "/api/dashboard",
            Self::Legacy => "/api/logs",
        }
    }

    /// Whether the shell has to run the separate liveness ping timer
    pub fn needs_ping(&self) -> bool {
        matches!(self, Self::Legacy)
    }
}

/// Live dashboard state
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardState {
    pub source: DashboardSource,
    pub logs: String,
    /// Bumped on every log replacement; the shell scrolls to the bottom when it changes
    pub logs_revision: u32,
    /// Transient "device reachable" indicator
    pub reachable: bool,
    /// Bumped on every successful poll; a pending expiry only clears its own pulse
    pub reachable_pulse: u32,
}

/// Extract the log text from a consolidated dashboard body
pub fn parse_dashboard_body(body: &[u8]) -> Result<String, String> {
    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON: {e}"))?;

    if !is_truthy(json.get("ok")) {
        return Err("device reported failure".to_string());
    }

    json.get("logs")
        .and_then(|logs| logs.as_str())
        .map(str::to_string)
        .ok_or_else(|| "missing logs".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_body_yields_logs() {
        let logs = parse_dashboard_body(br#"{"ok":true,"logs":"[WEB] up\n"}"#).unwrap();
        assert_eq!(logs, "[WEB] up\n");
    }

    #[test]
    fn dashboard_body_without_ok_is_rejected() {
        assert!(parse_dashboard_body(br#"{"ok":false,"logs":"x"}"#).is_err());
        assert!(parse_dashboard_body(br#"{"ok":true}"#).is_err());
    }

    #[test]
    fn only_legacy_source_needs_ping() {
        assert!(DashboardSource::Legacy.needs_ping());
        assert!(!DashboardSource::Consolidated.needs_ping());
    }
}
