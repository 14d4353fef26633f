use anyhow::{Context, Result, bail};
use epd_config_ui_core::DashboardSource;
use std::{env, str::FromStr, time::Duration};

/// Shell configuration loaded and validated at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Device connection configuration
    pub device: DeviceConfig,

    /// Timer configuration
    pub polling: PollingConfig,
}

#[derive(Clone, Debug)]
pub struct DeviceConfig {
    /// Scheme, host and optional port, without trailing slash
    pub url: String,
    /// Basic auth credentials of the device's admin account
    pub credentials: Option<(String, String)>,
}

#[derive(Clone, Debug)]
pub struct PollingConfig {
    pub poll_interval: Duration,
    pub ping_interval: Duration,
    pub reachable_indicator: Duration,
    pub source: DashboardSource,
}

impl AppConfig {
    /// Load and validate all configuration from environment variables
    pub fn load() -> Result<Self> {
        let device = DeviceConfig::load()?;
        let polling = PollingConfig::load()?;

        Ok(Self { device, polling })
    }
}

impl DeviceConfig {
    const DEFAULT_URL: &str = "http://192.168.4.1";

    fn load() -> Result<Self> {
        let url = env::var("DEVICE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_string());
        let url = url.trim_end_matches('/').to_string();

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("failed to parse DEVICE_URL: expected http:// or https:// but got {url}");
        }

        let credentials = credentials(
            env::var("DEVICE_USER").ok(),
            env::var("DEVICE_PASSWORD").ok(),
        )?;

        Ok(Self { url, credentials })
    }
}

/// Basic auth credentials; user and password must be given together
fn credentials(user: Option<String>, password: Option<String>) -> Result<Option<(String, String)>> {
    match (user, password) {
        (Some(user), Some(password)) => Ok(Some((user, password))),
        (Some(_), None) => bail!("DEVICE_USER is set but DEVICE_PASSWORD is missing"),
        (None, Some(_)) => bail!("DEVICE_PASSWORD is set but DEVICE_USER is missing"),
        (None, None) => Ok(None),
    }
}

impl PollingConfig {
    fn load() -> Result<Self> {
        let poll_interval = millis_var("POLL_INTERVAL_MS", 2000)?;
        let ping_interval = millis_var("PING_INTERVAL_MS", 10_000)?;
        let reachable_indicator = millis_var("REACHABLE_INDICATOR_MS", 1500)?;

        let source = match env::var("DASHBOARD_SOURCE").as_deref() {
            Err(_) | Ok("consolidated") => DashboardSource::Consolidated,
            Ok("legacy") => DashboardSource::Legacy,
            Ok(other) => bail!(
                "failed to parse DASHBOARD_SOURCE: expected consolidated or legacy but got {other}"
            ),
        };

        Ok(Self {
            poll_interval,
            ping_interval,
            reachable_indicator,
            source,
        })
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            ping_interval: Duration::from_millis(10_000),
            reachable_indicator: Duration::from_millis(1500),
            source: DashboardSource::default(),
        }
    }
}

fn millis_var(name: &str, default: u64) -> Result<Duration> {
    let millis = parse_var(name, default)?;
    if millis == 0 {
        bail!("{name} must be greater than zero");
    }
    Ok(Duration::from_millis(millis))
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("failed to parse {name}: {value}")),
        Err(_) => Ok(default),
    }
}
