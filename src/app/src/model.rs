use serde::{Deserialize, Serialize};

use crate::types::*;

/// Trait for types that can handle error messages
///
/// This allows HTTP helper functions to work with Model without directly depending on it.
pub trait ModelErrorHandler {
    fn set_error(&mut self, error: String);
}

/// Application Model - the complete state
/// Also serves as the ViewModel when serialized
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Model {
    // Configuration form state
    pub config_form: ConfigFormState,

    // Configuration form dirty flag (tracks unsaved changes)
    pub config_form_dirty: bool,

    // Dashboard state (log tail and reachability)
    pub dashboard: DashboardState,

    // Wi-Fi scan state
    pub wifi_scan: WifiScanState,

    // Device action state
    pub reboot_confirmation_pending: bool,

    // UI state
    pub is_loading: bool,
    pub status: Option<StatusMessage>,
}

impl Model {
    /// Start a loading operation (sets is_loading=true, clears a stale error)
    pub fn start_loading(&mut self) {
        self.is_loading = true;
        if self.status.as_ref().is_some_and(StatusMessage::is_error) {
            self.status = None;
        }
    }

    /// Stop loading without touching the status line
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
    }

    /// Set an error status and stop loading
    pub fn set_error(&mut self, error: String) {
        log::warn!("{error}");
        self.is_loading = false;
        self.status = Some(StatusMessage::error(error));
    }

    /// Set an error status, stop loading, and return a render command
    pub fn set_error_and_render(
        &mut self,
        error: String,
    ) -> crux_core::Command<crate::Effect, crate::events::Event> {
        self.set_error(error);
        crux_core::render::render()
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::success(message));
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::info(message));
    }

    /// Recompute the dirty flag after the form inputs changed
    pub fn refresh_config_form_dirty(&mut self) {
        self.config_form_dirty = self
            .config_form
            .form_data
            .is_dirty(&self.config_form.original_data);
    }
}

impl ModelErrorHandler for Model {
    fn set_error(&mut self, error: String) {
        Model::set_error(self, error)
    }
}
