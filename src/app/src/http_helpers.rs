//! HTTP helper functions for Crux Core
//!
//! This module extracts common HTTP response handling logic from macros
//! into debuggable, testable functions.

use crux_http::Response;

use crate::types::{is_truthy, parse_dashboard_body, parse_scan_body, AccessPoint};

/// Base URL for device API endpoints.
///
/// NOTE: This is a dummy prefix required because `crux_http` (v0.16.0-rc2) requires
/// absolute URLs and rejects relative paths (`RelativeUrlWithoutBase` error).
/// Shells strip this prefix before sending requests: the browser shell sends
/// them relative to the page origin (the device), the native shell prepends
/// the configured device address.
pub const BASE_URL: &str = "https://relative";

/// Constructs the full address from a given endpoint.
///
/// # Example
/// ```
/// use epd_config_ui_core::http_helpers::build_url;
/// let url = build_url("/api/reboot");
/// assert_eq!(url, "https://relative/api/reboot");
/// ```
pub fn build_url(endpoint: &str) -> String {
    format!("{BASE_URL}{endpoint}")
}

/// Returns `true` if the response status is 2xx.
pub fn is_response_success(response: &Response<Vec<u8>>) -> bool {
    response.status().is_success()
}

/// Extracts error message from HTTP response.
///
/// Device error bodies look like `{"ok":false,"err":"..."}`; the `err` text is
/// preferred over the raw body when present.
pub fn extract_error_message(action: &str, response: &mut Response<Vec<u8>>) -> String {
    let status = response.status().to_string();

    match response.take_body() {
        Some(body) if !body.is_empty() => match String::from_utf8(body) {
            Ok(msg) => match device_error_text(&msg) {
                Some(err) => format!("{action} failed: HTTP {status} ({err})"),
                None => format!("{action} failed: HTTP {status} ({})", msg.trim()),
            },
            Err(e) => format!("{action} failed: HTTP {status} (Invalid UTF-8: {e})"),
        },
        _ => format!("{action} failed: HTTP {status}"),
    }
}

fn device_error_text(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("err")?.as_str().map(str::to_string)
}

/// Maps a transport error to a user-facing message.
pub fn map_http_error(action: &str, error: crux_http::HttpError) -> String {
    format!("{action} failed: {error}")
}

/// Parse JSON from response body.
///
/// Returns error if response is not successful or JSON parsing fails.
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    action: &str,
    response: &mut Response<Vec<u8>>,
) -> Result<T, String> {
    if !is_response_success(response) {
        return Err(extract_error_message(action, response));
    }

    match response.take_body() {
        Some(body) => {
            serde_json::from_slice(&body).map_err(|e| format!("{action}: JSON parse error: {e}"))
        }
        None => Err(format!("{action}: Empty response body")),
    }
}

/// Check response status only (no body parsing).
pub fn check_response_status(action: &str, response: &mut Response<Vec<u8>>) -> Result<(), String> {
    if is_response_success(response) {
        Ok(())
    } else {
        Err(extract_error_message(action, response))
    }
}

/// Extract string body from response.
///
/// For endpoints that return plain text (e.g. the legacy log tail).
pub fn extract_string_response(
    action: &str,
    response: &mut Response<Vec<u8>>,
) -> Result<String, String> {
    if !is_response_success(response) {
        return Err(extract_error_message(action, response));
    }

    match response.take_body() {
        Some(bytes) => {
            String::from_utf8(bytes).map_err(|_| format!("{action}: Invalid UTF-8 in response"))
        }
        // an empty log is a valid log
        None => Ok(String::new()),
    }
}

/// Check an acknowledged write: HTTP success AND a truthy `ok` field.
pub fn check_ack_response(action: &str, response: &mut Response<Vec<u8>>) -> Result<(), String> {
    if !is_response_success(response) {
        return Err(extract_error_message(action, response));
    }

    let body = response.take_body().unwrap_or_default();
    let json: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| format!("{action} failed: invalid acknowledgement ({e})"))?;

    if is_truthy(json.get("ok")) {
        Ok(())
    } else {
        match json.get("err").and_then(|e| e.as_str()) {
            Some(err) => Err(format!("{action} failed: {err}")),
            None => Err(format!("{action} failed: not acknowledged by device")),
        }
    }
}

/// Process HTTP response result and check status only (no JSON parsing)
pub fn process_status_response(
    action: &str,
    result: crux_http::Result<Response<Vec<u8>>>,
) -> Result<(), String> {
    match result {
        Ok(mut response) => check_response_status(action, &mut response),
        Err(e) => Err(map_http_error(action, e)),
    }
}

/// Process HTTP response result and parse JSON
pub fn process_json_response<T: serde::de::DeserializeOwned>(
    action: &str,
    result: crux_http::Result<Response<Vec<u8>>>,
) -> Result<T, String> {
    match result {
        Ok(mut response) => parse_json_response(action, &mut response),
        Err(e) => Err(map_http_error(action, e)),
    }
}

/// Process HTTP response result and extract the plain-text body
pub fn process_string_response(
    action: &str,
    result: crux_http::Result<Response<Vec<u8>>>,
) -> Result<String, String> {
    match result {
        Ok(mut response) => extract_string_response(action, &mut response),
        Err(e) => Err(map_http_error(action, e)),
    }
}

/// Process HTTP response result of an acknowledged write
pub fn process_ack_response(
    action: &str,
    result: crux_http::Result<Response<Vec<u8>>>,
) -> Result<(), String> {
    match result {
        Ok(mut response) => check_ack_response(action, &mut response),
        Err(e) => Err(map_http_error(action, e)),
    }
}

/// Process HTTP response result of a consolidated dashboard poll
pub fn process_dashboard_response(
    action: &str,
    result: crux_http::Result<Response<Vec<u8>>>,
) -> Result<String, String> {
    match result {
        Ok(mut response) => {
            if !is_response_success(&response) {
                return Err(extract_error_message(action, &mut response));
            }
            let body = response.take_body().unwrap_or_default();
            parse_dashboard_body(&body).map_err(|e| format!("{action} failed: {e}"))
        }
        Err(e) => Err(map_http_error(action, e)),
    }
}

/// Process HTTP response result of a Wi-Fi scan
pub fn process_scan_response(
    action: &str,
    result: crux_http::Result<Response<Vec<u8>>>,
) -> Result<Vec<AccessPoint>, String> {
    match result {
        Ok(mut response) => {
            if !is_response_success(&response) {
                return Err(extract_error_message(action, &mut response));
            }
            let body = response.take_body().unwrap_or_default();
            parse_scan_body(&body).map_err(|e| format!("{action} failed: {e}"))
        }
        Err(e) => Err(map_http_error(action, e)),
    }
}

/// Handle request creation error - sets error message and returns render command
///
/// This is used when building an HTTP request fails (e.g., JSON serialization error).
pub fn handle_request_error<M, E>(
    model: &mut M,
    action: &str,
    error: impl std::fmt::Display,
) -> crux_core::Command<crate::Effect, E>
where
    M: crate::model::ModelErrorHandler,
    E: Send + 'static,
{
    model.set_error(format!("Failed to create {action} request: {error}"));
    crux_core::render::render()
}

// Note: Unit tests for the response helpers are not included because crux_http::Response
// has a private constructor. Body parsing is tested in `types/`, the helpers are
// integration-tested through the update handlers and the native shell tests.
