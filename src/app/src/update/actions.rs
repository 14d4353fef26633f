use crux_core::Command;

use crate::events::{ActionEvent, Event};
use crate::model::Model;
use crate::{device_post, handle_response, update_field, Effect};

/// Handle one-shot device actions (reboot, MQTT connectivity test)
///
/// None of them is retried; the user has to trigger them again.
pub fn handle(event: ActionEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        ActionEvent::RequestReboot => update_field!(model.reboot_confirmation_pending, true),

        ActionEvent::CancelReboot => update_field!(model.reboot_confirmation_pending, false),

        ActionEvent::ConfirmReboot => {
            if !model.reboot_confirmation_pending {
                log::warn!("ignoring reboot confirmation without pending request");
                return Command::done();
            }
            model.reboot_confirmation_pending = false;
            device_post!(
                Action,
                ActionEvent,
                model,
                "/api/reboot",
                RebootResponse,
                "Reboot"
            )
        }

        ActionEvent::RebootResponse(result) => handle_response!(model, result, {
            success_message: "Reboot requested, the device is restarting",
        }),

        ActionEvent::MqttTest => {
            model.set_info("Testing MQTT...");
            device_post!(
                Action,
                ActionEvent,
                model,
                "/api/mqtt/test",
                MqttTestResponse,
                "MQTT test"
            )
        }

        ActionEvent::MqttTestResponse(result) => handle_response!(model, result, {
            success_message: "MQTT test succeeded",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatusSeverity;

    mod reboot {
        use super::*;

        #[test]
        fn request_only_asks_for_confirmation() {
            let mut model = Model::default();

            let _ = handle(ActionEvent::RequestReboot, &mut model);

            assert!(model.reboot_confirmation_pending);
            assert!(!model.is_loading);
        }

        #[test]
        fn confirm_issues_request() {
            let mut model = Model {
                reboot_confirmation_pending: true,
                ..Default::default()
            };

            let _ = handle(ActionEvent::ConfirmReboot, &mut model);

            assert!(!model.reboot_confirmation_pending);
            assert!(model.is_loading);
        }

        #[test]
        fn confirm_without_request_is_ignored() {
            let mut model = Model::default();

            let _ = handle(ActionEvent::ConfirmReboot, &mut model);

            assert!(!model.is_loading);
            assert!(model.status.is_none());
        }

        #[test]
        fn cancel_clears_pending_confirmation() {
            let mut model = Model {
                reboot_confirmation_pending: true,
                ..Default::default()
            };

            let _ = handle(ActionEvent::CancelReboot, &mut model);

            assert!(!model.reboot_confirmation_pending);
        }

        #[test]
        fn both_outcomes_report_status() {
            let mut model = Model::default();
            let _ = handle(ActionEvent::RebootResponse(Ok(())), &mut model);
            assert_eq!(
                model.status.as_ref().map(|s| s.severity),
                Some(StatusSeverity::Success)
            );

            let _ = handle(
                ActionEvent::RebootResponse(Err("Reboot failed: HTTP 500".to_string())),
                &mut model,
            );
            assert_eq!(
                model.status.as_ref().map(|s| s.text.as_str()),
                Some("Reboot failed: HTTP 500")
            );
        }
    }

    mod mqtt_test {
        use super::*;

        #[test]
        fn test_shows_progress() {
            let mut model = Model::default();

            let _ = handle(ActionEvent::MqttTest, &mut model);

            assert!(model.is_loading);
            assert_eq!(
                model.status.as_ref().map(|s| s.severity),
                Some(StatusSeverity::Info)
            );
        }

        #[test]
        fn failure_is_reported() {
            let mut model = Model {
                is_loading: true,
                ..Default::default()
            };

            let _ = handle(
                ActionEvent::MqttTestResponse(Err("MQTT test failed: HTTP 502".to_string())),
                &mut model,
            );

            assert!(!model.is_loading);
            assert!(model.status.as_ref().is_some_and(|s| s.is_error()));
        }
    }
}
