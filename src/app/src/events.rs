use serde::{Deserialize, Serialize};

use crate::types::*;

/// Events that can happen in the app
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Event {
    // Initialization: load the configuration and run the first dashboard poll
    Initialize,

    // Domain events
    Config(ConfigEvent),
    Dashboard(DashboardEvent),
    Wifi(WifiEvent),
    Action(ActionEvent),
    Ui(UiEvent),
}

/// Configuration form events
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum ConfigEvent {
    Load,
    Save,
    /// JSON-encoded `ConfigFormData` from the form
    FormUpdate {
        form_data: String,
    },

    // HTTP responses (internal events, skipped from serialization)
    #[serde(skip)]
    LoadResponse(Result<ConfigResponse, String>),
    #[serde(skip)]
    SaveResponse(Result<(), String>),
}

/// Dashboard polling events
///
/// `Tick`, `PingTick` and `ReachableExpired` are sent by the shell's timers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    SetSource(DashboardSource),
    Tick,
    PingTick,
    ReachableExpired { pulse: u32 },

    #[serde(skip)]
    TickResponse(Result<String, String>),
    #[serde(skip)]
    PingResponse(Result<(), String>),
}

/// Wi-Fi scan events
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum WifiEvent {
    Scan,
    /// Empty ssid means the placeholder was selected
    SelectNetwork { ssid: String },

    #[serde(skip)]
    ScanResponse(Result<Vec<AccessPoint>, String>),
}

/// One-shot device actions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum ActionEvent {
    RequestReboot,
    ConfirmReboot,
    CancelReboot,
    MqttTest,

    #[serde(skip)]
    RebootResponse(Result<(), String>),
    #[serde(skip)]
    MqttTestResponse(Result<(), String>),
}

/// UI events
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ClearStatus,
}
