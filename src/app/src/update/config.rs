use crux_core::Command;

use crate::events::{ConfigEvent, Event};
use crate::model::Model;
use crate::types::{timezone_options, ConfigFormData, ConfigRecord, ConfigResponse};
use crate::{device_get, device_post, handle_response, Effect};

const LOAD_ACTION: &str = "Load configuration";
const SAVE_ACTION: &str = "Save configuration";

/// Handle configuration events (load, save, form edits)
pub fn handle(event: ConfigEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        ConfigEvent::Load => device_get!(
            Config,
            ConfigEvent,
            model,
            "/api/config",
            LoadResponse,
            LOAD_ACTION,
            process: crate::process_json_response::<ConfigResponse>
        ),

        ConfigEvent::LoadResponse(result) => handle_response!(model, result, {
            on_success: |model, response| {
                apply_loaded_config(response, model);
            },
            success_message: "Configuration loaded",
        }),

        ConfigEvent::Save => {
            let record = match model.config_form.form_data.to_record() {
                Ok(record) => record,
                Err(e) => return model.set_error_and_render(format!("{SAVE_ACTION} failed: {e}")),
            };
            log::debug!(
                "saving configuration (wifi_pass: {}, mqtt_pass: {}, admin_pass: {})",
                record.wifi_pass.is_some(),
                record.mqtt_pass.is_some(),
                record.admin_pass.is_some()
            );
            device_post!(Config, ConfigEvent, model, "/api/config", SaveResponse, SAVE_ACTION,
                body_json: &record,
                process: crate::process_ack_response
            )
        }

        ConfigEvent::SaveResponse(result) => handle_response!(model, result, {
            on_success: |model, _| {
                let form = &mut model.config_form;
                form.form_data.clear_secrets();
                form.original_data = form.form_data.clone();
                model.config_form_dirty = false;
            },
            success_message: "Configuration saved",
        }),

        ConfigEvent::FormUpdate { form_data } => handle_form_update(form_data, model),
    }
}

/// Overwrite the form with a freshly loaded record.
///
/// Secret inputs are kept as typed; the device never sends them.
fn apply_loaded_config(response: ConfigResponse, model: &mut Model) {
    let app_version = response.app_version.clone();
    let record = ConfigRecord::from(response);
    let form_data = ConfigFormData::from(&record);

    let form = &mut model.config_form;
    form.timezone_options = timezone_options(&form_data.tz_string);
    form.form_data = form_data.clone().with_secrets_from(&form.form_data);
    form.original_data = form_data;
    form.app_version = app_version;
    form.loaded = true;

    model.refresh_config_form_dirty();
}

/// Handle a form edit - replace form inputs with the values from the UI
fn handle_form_update(form_data_json: String, model: &mut Model) -> Command<Effect, Event> {
    let form_data: ConfigFormData = match serde_json::from_str(&form_data_json) {
        Ok(form_data) => form_data,
        Err(e) => return model.set_error_and_render(format!("Invalid form data: {e}")),
    };

    let form = &mut model.config_form;
    if !form
        .timezone_options
        .iter()
        .any(|o| o.value == form_data.tz_string)
    {
        form.timezone_options = timezone_options(&form_data.tz_string);
    }
    form.form_data = form_data;

    model.refresh_config_form_dirty();
    crux_core::render::render()
}
