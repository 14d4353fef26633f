use crux_core::Command;

use crate::events::{Event, WifiEvent};
use crate::model::Model;
use crate::types::{dedupe_and_rank, network_options};
use crate::{background_request, Effect};

const SCAN_ACTION: &str = "Wi-Fi scan";

/// Handle Wi-Fi scan events
pub fn handle(event: WifiEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        WifiEvent::Scan => {
            model.wifi_scan.scanning = true;
            model.set_info("Scanning...");
            Command::all([
                crux_core::render::render(),
                background_request!(
                    Wifi,
                    WifiEvent,
                    get,
                    "/api/wifi/scan",
                    ScanResponse,
                    SCAN_ACTION,
                    process: crate::process_scan_response
                ),
            ])
        }

        WifiEvent::ScanResponse(result) => {
            // re-enable the scan control whatever the outcome
            model.wifi_scan.scanning = false;

            match result {
                Ok(access_points) => {
                    let networks = dedupe_and_rank(access_points);
                    let scan = &mut model.wifi_scan;
                    scan.options = network_options(&networks);
                    scan.networks = networks;
                    scan.selected = None;

                    let count = scan.networks.len();
                    model.set_success(format!(
                        "Found {count} network{}",
                        if count == 1 { "" } else { "s" }
                    ));
                }
                Err(e) => model.set_error(e),
            }
            crux_core::render::render()
        }

        WifiEvent::SelectNetwork { ssid } => {
            if ssid.is_empty() {
                model.wifi_scan.selected = None;
            } else {
                model.config_form.form_data.wifi_ssid = ssid.clone();
                model.wifi_scan.selected = Some(ssid);
                model.refresh_config_form_dirty();
            }
            crux_core::render::render()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessPoint, StatusSeverity, NO_SELECTION_LABEL};

    fn ap(ssid: &str, rssi: Option<i32>) -> AccessPoint {
        AccessPoint {
            ssid: ssid.to_string(),
            rssi,
        }
    }

    fn scan_ok(model: &mut Model, aps: Vec<AccessPoint>) {
        let _ = handle(WifiEvent::ScanResponse(Ok(aps)), model);
    }

    mod scan {
        use super::*;

        #[test]
        fn scan_disables_control_and_shows_progress() {
            let mut model = Model::default();

            let _ = handle(WifiEvent::Scan, &mut model);

            assert!(model.wifi_scan.scanning);
            assert_eq!(
                model.status.as_ref().map(|s| s.severity),
                Some(StatusSeverity::Info)
            );
            assert!(!model.is_loading);
        }

        #[test]
        fn successful_scan_renders_deduplicated_list() {
            let mut model = Model::default();
            model.wifi_scan.scanning = true;

            scan_ok(
                &mut model,
                vec![ap("A", Some(-40)), ap("A", Some(-70)), ap("B", Some(-60))],
            );

            assert!(!model.wifi_scan.scanning);
            assert_eq!(
                model.wifi_scan.networks,
                vec![ap("A", Some(-40)), ap("B", Some(-60))]
            );
            let labels: Vec<_> = model
                .wifi_scan
                .options
                .iter()
                .map(|o| o.label.as_str())
                .collect();
            assert_eq!(labels, [NO_SELECTION_LABEL, "A (-40 dBm)", "B (-60 dBm)"]);
            assert_eq!(
                model.status.as_ref().map(|s| s.text.as_str()),
                Some("Found 2 networks")
            );
        }

        #[test]
        fn entry_without_rssi_sorts_ahead_of_weak_signals() {
            let mut model = Model::default();

            scan_ok(&mut model, vec![ap("weak", Some(-80)), ap("mystery", None)]);

            let ssids: Vec<_> = model
                .wifi_scan
                .networks
                .iter()
                .map(|ap| ap.ssid.as_str())
                .collect();
            assert_eq!(ssids, ["mystery", "weak"]);
        }

        #[test]
        fn failed_scan_reenables_control_and_keeps_previous_list() {
            let mut model = Model::default();
            scan_ok(&mut model, vec![ap("A", Some(-40))]);
            let networks = model.wifi_scan.networks.clone();
            model.wifi_scan.scanning = true;

            let _ = handle(
                WifiEvent::ScanResponse(Err(
                    "Wi-Fi scan failed: missing access point list".to_string(),
                )),
                &mut model,
            );

            assert!(!model.wifi_scan.scanning);
            assert_eq!(model.wifi_scan.networks, networks);
            assert_eq!(
                model.status.as_ref().map(|s| s.text.as_str()),
                Some("Wi-Fi scan failed: missing access point list")
            );
        }

        #[test]
        fn list_is_rebuilt_from_scratch() {
            let mut model = Model::default();
            scan_ok(&mut model, vec![ap("A", Some(-40)), ap("B", Some(-50))]);

            scan_ok(&mut model, vec![ap("C", Some(-45))]);

            assert_eq!(model.wifi_scan.options.len(), 2);
            assert_eq!(model.wifi_scan.options[1].value, "C");
        }
    }

    mod select {
        use super::*;

        #[test]
        fn selection_copies_ssid_into_form_only() {
            let mut model = Model::default();
            scan_ok(&mut model, vec![ap("A", Some(-40))]);

            let _ = handle(
                WifiEvent::SelectNetwork {
                    ssid: "A".to_string(),
                },
                &mut model,
            );

            assert_eq!(model.config_form.form_data.wifi_ssid, "A");
            assert_eq!(model.wifi_scan.selected.as_deref(), Some("A"));
            assert!(model.config_form_dirty);
            assert!(!model.wifi_scan.scanning);
            assert!(!model.is_loading);
        }

        #[test]
        fn placeholder_selection_leaves_form_alone() {
            let mut model = Model::default();
            model.config_form.form_data.wifi_ssid = "home".to_string();

            let _ = handle(
                WifiEvent::SelectNetwork {
                    ssid: String::new(),
                },
                &mut model,
            );

            assert_eq!(model.config_form.form_data.wifi_ssid, "home");
            assert!(model.wifi_scan.selected.is_none());
        }
    }
}
