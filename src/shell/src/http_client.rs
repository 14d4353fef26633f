use crate::config::DeviceConfig;
use anyhow::{Context, Result};
use crux_http::{
    HttpError,
    protocol::{HttpRequest, HttpResponse, HttpResult},
};
use epd_config_ui_core::BASE_URL;
use log::debug;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use reqwest::{Client, Method};
use trait_variant::make;

/// Executes the core's HTTP effects against the device
#[make(Send)]
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait DeviceClient {
    async fn execute(&self, request: HttpRequest) -> HttpResult;
}

#[derive(Clone)]
pub struct ReqwestDeviceClient {
    client: Client,
    device_url: String,
    credentials: Option<(String, String)>,
}

impl ReqwestDeviceClient {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to create device HTTP client")?;

        Ok(Self {
            client,
            device_url: config.url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    /// Replace the core's placeholder prefix with the device address
    pub fn device_url(&self, url: &str) -> String {
        let path = url.strip_prefix(BASE_URL).unwrap_or(url);
        format!("{}{path}", self.device_url)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .with_context(|| format!("failed to parse HTTP method {}", request.method))?;
        let url = self.device_url(&request.url);
        debug!("{method} {url}");

        let mut builder = self.client.request(method, &url);
        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, Some(password));
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let res = builder
            .send()
            .await
            .with_context(|| format!("failed to send request to {url}"))?;

        let status = res.status().as_u16();
        let body = res
            .bytes()
            .await
            .with_context(|| format!("failed to read response body from {url}"))?;

        Ok(HttpResponse::status(status).body(body.to_vec()).build())
    }
}

impl DeviceClient for ReqwestDeviceClient {
    async fn execute(&self, request: HttpRequest) -> HttpResult {
        match self.send(request).await {
            Ok(response) => HttpResult::Ok(response),
            Err(e) => HttpResult::Err(HttpError::Io(format!("{e:#}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_prefix_is_replaced_by_device_address() {
        let client = ReqwestDeviceClient::new(&DeviceConfig {
            url: "http://10.0.0.7:8080".to_string(),
            credentials: None,
        })
        .expect("failed to create client");

        assert_eq!(
            client.device_url(&epd_config_ui_core::build_url("/api/wifi/scan")),
            "http://10.0.0.7:8080/api/wifi/scan"
        );
    }
}
