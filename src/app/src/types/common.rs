use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// Severity cue of the status line
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StatusSeverity {
    #[default]
    Info,
    Success,
    Error,
}

/// Single status line shown to the user after an action
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub severity: StatusSeverity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == StatusSeverity::Error
    }
}

/// Deserialize an optional field, mapping a type mismatch to `None`.
///
/// The device firmware is not strict about JSON types, so a malformed field
/// falls back to its default instead of failing the whole document.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Truthiness of an acknowledgement flag as the device firmware emits it
///
/// `false`, `null`, `0`, `""` and a missing key all count as false.
pub fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
