use serde::{Deserialize, Serialize};

use super::common::lenient;

pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_INTERACTIVE_TIMEOUT_MS: u32 = 600_000;
pub const DEFAULT_DEEPSLEEP_INTERVAL_S: u32 = 60;
pub const DEFAULT_TZ_STRING: &str = "CET-1CEST,M3.5.0/2,M10.5.0/3";
pub const DEFAULT_TEMP_OFFSET_C: f64 = 0.0;
pub const DEFAULT_HUM_OFFSET_PCT: f64 = 0.0;

/// Known POSIX timezone expressions offered by the timezone selector
pub const TIMEZONE_PRESETS: &[(&str, &str)] = &[
    ("Europe/Paris (CET/CEST)", DEFAULT_TZ_STRING),
    ("UTC", "UTC0"),
    ("Europe/London (GMT/BST)", "GMT0BST,M3.5.0/1,M10.5.0"),
    ("Europe/Helsinki (EET/EEST)", "EET-2EEST,M3.5.0/3,M10.5.0/4"),
    ("America/New_York (EST/EDT)", "EST5EDT,M3.2.0,M11.1.0"),
    ("America/Chicago (CST/CDT)", "CST6CDT,M3.2.0,M11.1.0"),
    ("America/Denver (MST/MDT)", "MST7MDT,M3.2.0,M11.1.0"),
    ("America/Los_Angeles (PST/PDT)", "PST8PDT,M3.2.0,M11.1.0"),
    ("Asia/Tokyo (JST)", "JST-9"),
    ("Australia/Sydney (AEST/AEDT)", "AEST-10AEDT,M10.1.0,M4.1.0/3"),
];

/// Device configuration as persisted on the device.
///
/// This is also the body of `POST /api/config`. Secrets are only serialized
/// when set; an absent secret tells the device to keep its current value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigRecord {
    pub wifi_ssid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_pass: Option<String>,

    pub mqtt_enabled: bool,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mqtt_pass: Option<String>,
    pub mqtt_topic: String,

    pub interactive_timeout_ms: u32,
    pub deepsleep_interval_s: u32,

    pub device_name: String,
    pub admin_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,

    pub tz_string: String,

    pub temp_offset_c: f64,
    pub hum_offset_pct: f64,

    // Distance sensor settings. Only sent when the form holds a value, the
    // device keeps its own otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_interval_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_offset_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_n: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_delay_ms: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_min_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_max_cm: Option<f64>,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            wifi_ssid: String::new(),
            wifi_pass: None,
            mqtt_enabled: false,
            mqtt_host: String::new(),
            mqtt_port: DEFAULT_MQTT_PORT,
            mqtt_user: String::new(),
            mqtt_pass: None,
            mqtt_topic: String::new(),
            interactive_timeout_ms: DEFAULT_INTERACTIVE_TIMEOUT_MS,
            deepsleep_interval_s: DEFAULT_DEEPSLEEP_INTERVAL_S,
            device_name: String::new(),
            admin_user: String::new(),
            admin_pass: None,
            tz_string: DEFAULT_TZ_STRING.to_string(),
            temp_offset_c: DEFAULT_TEMP_OFFSET_C,
            hum_offset_pct: DEFAULT_HUM_OFFSET_PCT,
            measure_interval_ms: None,
            measure_offset_cm: None,
            avg_alpha: None,
            median_n: None,
            median_delay_ms: None,
            filter_min_cm: None,
            filter_max_cm: None,
        }
    }
}

/// Body of `GET /api/config`.
///
/// Every field is optional and type-tolerant. Secret keys are not part of
/// this type: the firmware echoes them masked (`"*****"`) and they must never
/// reach the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub wifi_ssid: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub mqtt_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub mqtt_host: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub mqtt_port: Option<u16>,
    #[serde(default, deserialize_with = "lenient")]
    pub mqtt_user: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub mqtt_topic: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub interactive_timeout_ms: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub interactive_timeout_min: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub deepsleep_interval_s: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub deepsleep_interval_min: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub admin_user: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tz_string: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub temp_offset_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub hum_offset_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub measure_interval_ms: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub measure_offset_cm: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub avg_alpha: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub median_n: Option<u16>,
    #[serde(default, deserialize_with = "lenient")]
    pub median_delay_ms: Option<u16>,
    #[serde(default, deserialize_with = "lenient")]
    pub filter_min_cm: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub filter_max_cm: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub app_version: Option<String>,
}

impl From<ConfigResponse> for ConfigRecord {
    fn from(response: ConfigResponse) -> Self {
        // newer firmware reports minutes, the form still edits ms / s
        let interactive_timeout_ms = response.interactive_timeout_ms.or_else(|| {
            response
                .interactive_timeout_min
                .map(|min| min.saturating_mul(60_000))
        });
        let deepsleep_interval_s = response
            .deepsleep_interval_s
            .or_else(|| response.deepsleep_interval_min.map(|min| min.saturating_mul(60)));

        Self {
            wifi_ssid: response.wifi_ssid.unwrap_or_default(),
            wifi_pass: None,
            mqtt_enabled: response.mqtt_enabled.unwrap_or(false),
            mqtt_host: response.mqtt_host.unwrap_or_default(),
            mqtt_port: response.mqtt_port.unwrap_or(DEFAULT_MQTT_PORT),
            mqtt_user: response.mqtt_user.unwrap_or_default(),
            mqtt_pass: None,
            mqtt_topic: response.mqtt_topic.unwrap_or_default(),
            interactive_timeout_ms: interactive_timeout_ms
                .unwrap_or(DEFAULT_INTERACTIVE_TIMEOUT_MS),
            deepsleep_interval_s: deepsleep_interval_s.unwrap_or(DEFAULT_DEEPSLEEP_INTERVAL_S),
            device_name: response.device_name.unwrap_or_default(),
            admin_user: response.admin_user.unwrap_or_default(),
            admin_pass: None,
            tz_string: response
                .tz_string
                .filter(|tz| !tz.is_empty())
                .unwrap_or_else(|| DEFAULT_TZ_STRING.to_string()),
            temp_offset_c: response
                .temp_offset_c
                .filter(|v| v.is_finite())
                .unwrap_or(DEFAULT_TEMP_OFFSET_C),
            hum_offset_pct: response
                .hum_offset_pct
                .filter(|v| v.is_finite())
                .unwrap_or(DEFAULT_HUM_OFFSET_PCT),
            measure_interval_ms: response.measure_interval_ms,
            measure_offset_cm: response.measure_offset_cm.filter(|v| v.is_finite()),
            avg_alpha: response.avg_alpha.filter(|v| v.is_finite()),
            median_n: response.median_n,
            median_delay_ms: response.median_delay_ms,
            filter_min_cm: response.filter_min_cm.filter(|v| v.is_finite()),
            filter_max_cm: response.filter_max_cm.filter(|v| v.is_finite()),
        }
    }
}

/// Raw values of the configuration form inputs
///
/// Numeric inputs are kept as entered and only parsed when a save payload is
/// assembled. Sensor inputs stay empty when the device did not report them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFormData {
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub mqtt_enabled: bool,
    pub mqtt_host: String,
    pub mqtt_port: String,
    pub mqtt_user: String,
    pub mqtt_pass: String,
    pub mqtt_topic: String,
    pub interactive_timeout_ms: String,
    pub deepsleep_interval_s: String,
    pub device_name: String,
    pub admin_user: String,
    pub admin_pass: String,
    pub tz_string: String,
    pub temp_offset_c: String,
    pub hum_offset_pct: String,
    pub measure_interval_ms: String,
    pub measure_offset_cm: String,
    pub avg_alpha: String,
    pub median_n: String,
    pub median_delay_ms: String,
    pub filter_min_cm: String,
    pub filter_max_cm: String,
}

impl From<&ConfigRecord> for ConfigFormData {
    fn from(record: &ConfigRecord) -> Self {
        Self {
            wifi_ssid: record.wifi_ssid.clone(),
            wifi_pass: String::new(),
            mqtt_enabled: record.mqtt_enabled,
            mqtt_host: record.mqtt_host.clone(),
            mqtt_port: record.mqtt_port.to_string(),
            mqtt_user: record.mqtt_user.clone(),
            mqtt_pass: String::new(),
            mqtt_topic: record.mqtt_topic.clone(),
            interactive_timeout_ms: record.interactive_timeout_ms.to_string(),
            deepsleep_interval_s: record.deepsleep_interval_s.to_string(),
            device_name: record.device_name.clone(),
            admin_user: record.admin_user.clone(),
            admin_pass: String::new(),
            tz_string: record.tz_string.clone(),
            temp_offset_c: record.temp_offset_c.to_string(),
            hum_offset_pct: record.hum_offset_pct.to_string(),
            measure_interval_ms: optional_input(record.measure_interval_ms),
            measure_offset_cm: optional_input(record.measure_offset_cm),
            avg_alpha: optional_input(record.avg_alpha),
            median_n: optional_input(record.median_n),
            median_delay_ms: optional_input(record.median_delay_ms),
            filter_min_cm: optional_input(record.filter_min_cm),
            filter_max_cm: optional_input(record.filter_max_cm),
        }
    }
}

impl ConfigFormData {
    /// Assemble the save payload from the current inputs.
    ///
    /// Numbers are read from the leading numeric part of an input, so
    /// `"1200.5"` saves 1200. An input without a number falls back to the
    /// default; a number the device field cannot hold is an error.
    pub fn to_record(&self) -> Result<ConfigRecord, String> {
        Ok(ConfigRecord {
            wifi_ssid: self.wifi_ssid.clone(),
            wifi_pass: secret_input(&self.wifi_pass),
            mqtt_enabled: self.mqtt_enabled,
            mqtt_host: self.mqtt_host.clone(),
            mqtt_port: leading_int("mqtt_port", &self.mqtt_port)?.unwrap_or(DEFAULT_MQTT_PORT),
            mqtt_user: self.mqtt_user.clone(),
            mqtt_pass: secret_input(&self.mqtt_pass),
            mqtt_topic: self.mqtt_topic.clone(),
            interactive_timeout_ms: leading_int(
                "interactive_timeout_ms",
                &self.interactive_timeout_ms,
            )?
            .unwrap_or(DEFAULT_INTERACTIVE_TIMEOUT_MS),
            deepsleep_interval_s: leading_int("deepsleep_interval_s", &self.deepsleep_interval_s)?
                .unwrap_or(DEFAULT_DEEPSLEEP_INTERVAL_S),
            device_name: self.device_name.clone(),
            admin_user: self.admin_user.clone(),
            admin_pass: secret_input(&self.admin_pass),
            tz_string: self.tz_string.clone(),
            temp_offset_c: leading_float(&self.temp_offset_c).unwrap_or(DEFAULT_TEMP_OFFSET_C),
            hum_offset_pct: leading_float(&self.hum_offset_pct).unwrap_or(DEFAULT_HUM_OFFSET_PCT),
            measure_interval_ms: leading_int("measure_interval_ms", &self.measure_interval_ms)?,
            measure_offset_cm: leading_float(&self.measure_offset_cm),
            avg_alpha: leading_float(&self.avg_alpha),
            median_n: leading_int("median_n", &self.median_n)?,
            median_delay_ms: leading_int("median_delay_ms", &self.median_delay_ms)?,
            filter_min_cm: leading_float(&self.filter_min_cm),
            filter_max_cm: leading_float(&self.filter_max_cm),
        })
    }

    /// Copy the secret inputs of `other` into `self`
    pub fn with_secrets_from(mut self, other: &Self) -> Self {
        self.wifi_pass = other.wifi_pass.clone();
        self.mqtt_pass = other.mqtt_pass.clone();
        self.admin_pass = other.admin_pass.clone();
        self
    }

    pub fn clear_secrets(&mut self) {
        self.wifi_pass.clear();
        self.mqtt_pass.clear();
        self.admin_pass.clear();
    }

    pub fn has_secret_input(&self) -> bool {
        !self.wifi_pass.is_empty() || !self.mqtt_pass.is_empty() || !self.admin_pass.is_empty()
    }

    /// Whether the inputs differ from the last values synced with the device
    pub fn is_dirty(&self, original: &Self) -> bool {
        self.has_secret_input() || self.clone().with_secrets_from(original) != *original
    }
}

fn secret_input(input: &str) -> Option<String> {
    (!input.is_empty()).then(|| input.to_string())
}

fn optional_input<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Integer at the start of `input`, ignoring whatever follows it.
///
/// `Ok(None)` when the input does not start with a number.
fn leading_int<T: TryFrom<i64>>(field: &str, input: &str) -> Result<Option<T>, String> {
    let trimmed = input.trim();
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let sign_len = trimmed.len() - unsigned.len();
    let digits_len = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    if sign_len > 1 || digits_len == 0 {
        return Ok(None);
    }

    let number = &trimmed[..sign_len + digits_len];
    number
        .parse::<i64>()
        .ok()
        .and_then(|v| T::try_from(v).ok())
        .map(Some)
        .ok_or_else(|| format!("Invalid {field}: {number} is out of range"))
}

/// Longest finite float at the start of `input`
fn leading_float(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    (1..=trimmed.len())
        .rev()
        .filter(|&end| trimmed.is_char_boundary(end))
        .find_map(|end| trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite()))
}

/// Entry of the timezone selector
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimezoneOption {
    pub label: String,
    pub value: String,
    pub custom: bool,
}

/// Build the timezone selector so that `current` is always selectable.
///
/// An expression that is not a preset gets a leading custom entry.
pub fn timezone_options(current: &str) -> Vec<TimezoneOption> {
    let mut options: Vec<TimezoneOption> = TIMEZONE_PRESETS
        .iter()
        .map(|(label, value)| TimezoneOption {
            label: label.to_string(),
            value: value.to_string(),
            custom: false,
        })
        .collect();

    if !options.iter().any(|o| o.value == current) {
        options.insert(
            0,
            TimezoneOption {
                label: format!("Custom: {current}"),
                value: current.to_string(),
                custom: true,
            },
        );
    }

    options
}

/// Configuration form state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFormState {
    pub form_data: ConfigFormData,
    /// Values as last loaded from or saved to the device, without secrets
    pub original_data: ConfigFormData,
    pub timezone_options: Vec<TimezoneOption>,
    pub app_version: Option<String>,
    pub loaded: bool,
}

impl Default for ConfigFormState {
    fn default() -> Self {
        let form_data = ConfigFormData::from(&ConfigRecord::default());
        Self {
            timezone_options: timezone_options(&form_data.tz_string),
            original_data: form_data.clone(),
            form_data,
            app_version: None,
            loaded: false,
        }
    }
}
