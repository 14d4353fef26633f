use crux_core::Command;

use crate::events::{DashboardEvent, Event};
use crate::model::Model;
use crate::types::DashboardSource;
use crate::{background_request, update_field, Effect};

const POLL_ACTION: &str = "Dashboard poll";
const PING_ACTION: &str = "Ping";
const PING_BODY: &str = "page=config";

/// Handle dashboard polling events
///
/// Poll and ping failures never reach the status line: they are expected
/// while the device reboots and the next tick retries anyway.
pub fn handle(event: DashboardEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        DashboardEvent::SetSource(source) => update_field!(model.dashboard.source, source),

        DashboardEvent::Tick => match model.dashboard.source {
            DashboardSource::Consolidated => background_request!(
                Dashboard,
                DashboardEvent,
                get,
                DashboardSource::Consolidated.endpoint(),
                TickResponse,
                POLL_ACTION,
                process: crate::process_dashboard_response
            ),
            DashboardSource::Legacy => background_request!(
                Dashboard,
                DashboardEvent,
                get,
                DashboardSource::Legacy.endpoint(),
                TickResponse,
                POLL_ACTION,
                process: crate::process_string_response
            ),
        },

        DashboardEvent::TickResponse(Ok(logs)) => {
            let dashboard = &mut model.dashboard;
            if dashboard.logs != logs {
                dashboard.logs = logs;
                dashboard.logs_revision = dashboard.logs_revision.wrapping_add(1);
            }
            dashboard.reachable = true;
            dashboard.reachable_pulse = dashboard.reachable_pulse.wrapping_add(1);
            crux_core::render::render()
        }

        DashboardEvent::TickResponse(Err(e)) => {
            log::debug!("{e}");
            Command::done()
        }

        DashboardEvent::ReachableExpired { pulse } => {
            // a newer successful poll restarted the indicator window
            if pulse != model.dashboard.reachable_pulse {
                return Command::done();
            }
            update_field!(model.dashboard.reachable, false)
        }

        DashboardEvent::PingTick => {
            if !model.dashboard.source.needs_ping() {
                return Command::done();
            }
            background_request!(
                Dashboard,
                DashboardEvent,
                post,
                "/ping",
                PingResponse,
                PING_ACTION,
                body_form: PING_BODY
            )
        }

        DashboardEvent::PingResponse(result) => {
            if let Err(e) = result {
                log::debug!("{e}");
            }
            Command::done()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_ok(model: &mut Model, logs: &str) {
        let _ = handle(DashboardEvent::TickResponse(Ok(logs.to_string())), model);
    }

    mod tick {
        use super::*;

        #[test]
        fn tick_does_not_touch_state() {
            let mut model = Model::default();
            let before = model.clone();

            let _ = handle(DashboardEvent::Tick, &mut model);

            assert_eq!(model, before);
        }

        #[test]
        fn changed_logs_replace_text_and_bump_revision() {
            let mut model = Model::default();

            tick_ok(&mut model, "boot\n");

            assert_eq!(model.dashboard.logs, "boot\n");
            assert_eq!(model.dashboard.logs_revision, 1);
            assert!(model.dashboard.reachable);
        }

        #[test]
        fn identical_logs_keep_revision() {
            let mut model = Model::default();
            tick_ok(&mut model, "boot\n");

            tick_ok(&mut model, "boot\n");

            assert_eq!(model.dashboard.logs_revision, 1);
            assert_eq!(model.dashboard.reachable_pulse, 2);
        }

        #[test]
        fn out_of_order_completions_last_processed_wins() {
            let mut model = Model::default();

            // second request completes first
            tick_ok(&mut model, "boot\nwifi up\n");
            tick_ok(&mut model, "boot\n");

            assert_eq!(model.dashboard.logs, "boot\n");
            assert_eq!(model.dashboard.logs_revision, 2);
        }

        #[test]
        fn failed_poll_leaves_state_unchanged() {
            let mut model = Model::default();
            tick_ok(&mut model, "boot\n");
            let before = model.clone();

            let _ = handle(
                DashboardEvent::TickResponse(Err("Dashboard poll failed: timeout".to_string())),
                &mut model,
            );

            assert_eq!(model, before);
            assert!(model.status.is_none());
        }
    }

    mod reachability {
        use super::*;

        #[test]
        fn expiry_for_current_pulse_clears_indicator() {
            let mut model = Model::default();
            tick_ok(&mut model, "");
            let pulse = model.dashboard.reachable_pulse;

            let _ = handle(DashboardEvent::ReachableExpired { pulse }, &mut model);

            assert!(!model.dashboard.reachable);
        }

        #[test]
        fn stale_expiry_is_ignored() {
            let mut model = Model::default();
            tick_ok(&mut model, "");
            let stale = model.dashboard.reachable_pulse;
            tick_ok(&mut model, "");

            let _ = handle(DashboardEvent::ReachableExpired { pulse: stale }, &mut model);

            assert!(model.dashboard.reachable);
        }
    }

    mod source {
        use super::*;

        #[test]
        fn set_source_switches_endpoint() {
            let mut model = Model::default();

            let _ = handle(
                DashboardEvent::SetSource(DashboardSource::Legacy),
                &mut model,
            );

            assert_eq!(model.dashboard.source, DashboardSource::Legacy);
            assert_eq!(model.dashboard.source.endpoint(), "/api/logs");
        }

        #[test]
        fn legacy_log_text_is_taken_verbatim() {
            let mut model = Model::default();
            let _ = handle(
                DashboardEvent::SetSource(DashboardSource::Legacy),
                &mut model,
            );

            tick_ok(&mut model, "[  12] boot\n{not json}\n");

            assert_eq!(model.dashboard.logs, "[  12] boot\n{not json}\n");
            assert!(model.dashboard.reachable);
        }

        #[test]
        fn ping_tick_under_consolidated_source_is_ignored() {
            let mut model = Model::default();
            let before = model.clone();

            let _ = handle(DashboardEvent::PingTick, &mut model);

            assert_eq!(model, before);
        }

        #[test]
        fn failed_ping_is_silent() {
            let mut model = Model {
                dashboard: crate::types::DashboardState {
                    source: DashboardSource::Legacy,
                    ..Default::default()
                },
                ..Default::default()
            };
            let before = model.clone();

            let _ = handle(
                DashboardEvent::PingResponse(Err("Ping failed: HTTP 503".to_string())),
                &mut model,
            );

            assert_eq!(model, before);
        }
    }
}
