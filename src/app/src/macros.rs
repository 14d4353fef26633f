/// Macro for model field updates with automatic rendering.
/// Renders only when a value actually changed.
///
/// # Examples
///
/// Single field update:
/// ```ignore
/// update_field!(model.status, None)
/// ```
///
/// Multiple field updates:
/// ```ignore
/// update_field!(
///     model.dashboard.reachable, false;
///     model.status, None
/// )
/// ```
#[macro_export]
macro_rules! update_field {
    // Multiple field updates (must come first to match the pattern)
    ($($model_field:expr, $value:expr);+ $(;)?) => {{
        let mut changed = false;
        $(
            let value = $value;
            if $model_field != value {
                $model_field = value;
                changed = true;
            }
        )+
        if changed {
            crux_core::render::render()
        } else {
            crux_core::Command::done()
        }
    }};

    // Single field update
    ($model_field:expr, $value:expr) => {{
        update_field!($model_field, $value;)
    }};
}

// Re-export http_helpers functions for macro use
pub use crate::http_helpers::{
    build_url, check_ack_response, check_response_status, extract_error_message,
    extract_string_response, handle_request_error, is_response_success, map_http_error,
    parse_json_response, process_ack_response, process_dashboard_response, process_json_response,
    process_scan_response, process_status_response, process_string_response, BASE_URL,
};

/// Macro for user-triggered POST requests to the device with standard error handling.
/// Sets the loading state and renders before the request goes out.
///
/// # Patterns
///
/// Pattern 1: POST without body (status only)
/// ```ignore
/// device_post!(Action, ActionEvent, model, "/api/reboot", RebootResponse, "Reboot")
/// ```
///
/// Pattern 2: POST with JSON body and a custom response processor
/// ```ignore
/// device_post!(Config, ConfigEvent, model, "/api/config", SaveResponse, "Save configuration",
///     body_json: &record,
///     process: process_ack_response
/// )
/// ```
#[macro_export]
macro_rules! device_post {
    // Pattern 1: POST without body (status only)
    ($domain:ident, $domain_event:ident, $model:expr, $endpoint:expr, $response_event:ident, $action:expr) => {{
        $model.start_loading();
        crux_core::Command::all([
            crux_core::render::render(),
            $crate::HttpCmd::post($crate::build_url($endpoint))
                .build()
                .then_send(|result| {
                    let event_result = $crate::process_status_response($action, result);
                    $crate::events::Event::$domain($crate::events::$domain_event::$response_event(
                        event_result,
                    ))
                }),
        ])
    }};

    // Pattern 2: POST with JSON body and a custom response processor
    ($domain:ident, $domain_event:ident, $model:expr, $endpoint:expr, $response_event:ident, $action:expr, body_json: $body:expr, process: $processor:expr) => {{
        $model.start_loading();
        match $crate::HttpCmd::post($crate::build_url($endpoint))
            .header("Content-Type", "application/json")
            .body_json($body)
        {
            Ok(builder) => crux_core::Command::all([
                crux_core::render::render(),
                builder.build().then_send(|result| {
                    let event_result = $processor($action, result);
                    $crate::events::Event::$domain($crate::events::$domain_event::$response_event(
                        event_result,
                    ))
                }),
            ]),
            Err(e) => $crate::handle_request_error($model, $action, e),
        }
    }};
}

/// Macro for user-triggered, non-cached GET requests to the device.
/// Sets the loading state and renders before the request goes out.
///
/// # Example
/// ```ignore
/// device_get!(Config, ConfigEvent, model, "/api/config", LoadResponse, "Load configuration",
///     process: process_json_response::<ConfigResponse>
/// )
/// ```
#[macro_export]
macro_rules! device_get {
    ($domain:ident, $domain_event:ident, $model:expr, $endpoint:expr, $response_event:ident, $action:expr, process: $processor:expr) => {{
        $model.start_loading();
        crux_core::Command::all([
            crux_core::render::render(),
            $crate::HttpCmd::get($crate::build_url($endpoint))
                .header("Cache-Control", "no-store")
                .build()
                .then_send(|result| {
                    let event_result = $processor($action, result);
                    $crate::events::Event::$domain($crate::events::$domain_event::$response_event(
                        event_result,
                    ))
                }),
        ])
    }};
}

/// Background request - no loading state, no render.
///
/// Used for timer-driven polling and scans whose progress is tracked in
/// domain state instead of the global loading flag.
///
/// # Patterns
///
/// Pattern 1: GET with a response processor
/// ```ignore
/// background_request!(Dashboard, DashboardEvent, get, "/api/dashboard", TickResponse, "Dashboard poll",
///     process: process_dashboard_response
/// )
/// ```
///
/// Pattern 2: POST with a form-encoded body (status only)
/// ```ignore
/// background_request!(Dashboard, DashboardEvent, post, "/ping", PingResponse, "Ping",
///     body_form: "page=config"
/// )
/// ```
#[macro_export]
macro_rules! background_request {
    // Pattern 1: GET with a response processor
    ($domain:ident, $domain_event:ident, get, $endpoint:expr, $response_event:ident, $action:expr, process: $processor:expr) => {
        $crate::HttpCmd::get($crate::build_url($endpoint))
            .header("Cache-Control", "no-store")
            .build()
            .then_send(|result| {
                let event_result = $processor($action, result);
                $crate::events::Event::$domain($crate::events::$domain_event::$response_event(
                    event_result,
                ))
            })
    };

    // Pattern 2: POST with a form-encoded body (status only)
    ($domain:ident, $domain_event:ident, post, $endpoint:expr, $response_event:ident, $action:expr, body_form: $body:expr) => {
        $crate::HttpCmd::post($crate::build_url($endpoint))
            .body_string($body.to_string())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .build()
            .then_send(|result| {
                let event_result = $crate::process_status_response($action, result);
                $crate::events::Event::$domain($crate::events::$domain_event::$response_event(
                    event_result,
                ))
            })
    };
}

/// Macro for handling response events with standard loading state and error handling.
///
/// # Patterns
///
/// Pattern 1: Only success message (for `Result<(), String>`)
/// ```ignore
/// handle_response!(model, result, {
///     success_message: "Operation successful",
/// })
/// ```
///
/// Pattern 2: Custom success handler + success message
/// ```ignore
/// handle_response!(model, result, {
///     on_success: |m, value| {
///         m.some_field = value;
///     },
///     success_message: "Operation successful",
/// })
/// ```
#[macro_export]
macro_rules! handle_response {
    // Pattern 1: Only success message (for Result<(), String>)
    ($model:expr, $result:expr, {
        success_message: $msg:expr $(,)?
    }) => {{
        $model.stop_loading();
        match $result {
            Ok(()) => {
                $model.set_success($msg);
            }
            Err(e) => {
                $model.set_error(e);
            }
        }
        crux_core::render::render()
    }};

    // Pattern 2: Custom success handler + success message
    ($model:expr, $result:expr, {
        on_success: |$success_model:ident, $value:tt| $success_body:block,
        success_message: $msg:expr $(,)?
    }) => {{
        $model.stop_loading();
        match $result {
            Ok($value) => {
                let $success_model = &mut *$model;
                $success_body
                $model.set_success($msg);
            }
            Err(e) => {
                $model.set_error(e);
            }
        }
        crux_core::render::render()
    }};
}
