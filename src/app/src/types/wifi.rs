use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::is_truthy;

/// Rank of an access point without rssi when picking the best entry per ssid
pub const MISSING_RSSI_RANK: i32 = -999;

/// Rank of an access point without rssi when ordering the list for display
pub const MISSING_RSSI_SORT: i32 = 0;

/// Label of the leading "no selection" entry
pub const NO_SELECTION_LABEL: &str = "-- Select a network --";

/// A discovered Wi-Fi network
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessPoint {
    pub ssid: String,
    pub rssi: Option<i32>,
}

impl AccessPoint {
    /// Read one scan entry; an rssi that is not an integer counts as missing
    fn from_scan_entry(entry: &serde_json::Value) -> Option<Self> {
        let entry = entry.as_object()?;
        Some(Self {
            ssid: entry
                .get("ssid")
                .and_then(|ssid| ssid.as_str())
                .unwrap_or_default()
                .to_string(),
            rssi: entry
                .get("rssi")
                .and_then(|rssi| rssi.as_i64())
                .and_then(|rssi| i32::try_from(rssi).ok()),
        })
    }
}

/// Entry of the network selector
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkOption {
    /// Empty for the placeholder
    pub value: String,
    pub label: String,
}

/// Wi-Fi scan state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WifiScanState {
    /// A scan is in flight; the scan control is disabled
    pub scanning: bool,
    pub networks: Vec<AccessPoint>,
    pub options: Vec<NetworkOption>,
    pub selected: Option<String>,
}

impl Default for WifiScanState {
    fn default() -> Self {
        Self {
            scanning: false,
            networks: Vec::new(),
            options: network_options(&[]),
            selected: None,
        }
    }
}

/// Validate a scan response body and extract its entries.
///
/// The body must carry a truthy `ok` flag and an `aps` array. Entries that
/// are not objects are skipped.
pub fn parse_scan_body(body: &[u8]) -> Result<Vec<AccessPoint>, String> {
    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON: {e}"))?;

    if !is_truthy(json.get("ok")) {
        return Err(match json.get("err").and_then(|e| e.as_str()) {
            Some(err) => format!("device reported failure: {err}"),
            None => "device reported failure".to_string(),
        });
    }

    let Some(entries) = json.get("aps").and_then(|aps| aps.as_array()) else {
        return Err("missing access point list".to_string());
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let ap = AccessPoint::from_scan_entry(entry);
            if ap.is_none() {
                log::warn!("skipping malformed scan entry {entry}");
            }
            ap
        })
        .collect())
}

/// Keep the strongest entry per ssid and order the result for display.
///
/// Per ssid the entry with the highest rssi wins, a missing rssi counting as
/// [`MISSING_RSSI_RANK`]. The survivors are then sorted by descending rssi, a
/// missing rssi counting as [`MISSING_RSSI_SORT`]. The two defaults differ on
/// purpose. Hidden networks (empty ssid) are dropped.
pub fn dedupe_and_rank(access_points: Vec<AccessPoint>) -> Vec<AccessPoint> {
    let mut best: Vec<AccessPoint> = Vec::new();
    let mut index_by_ssid: HashMap<String, usize> = HashMap::new();

    for ap in access_points {
        if ap.ssid.is_empty() {
            continue;
        }

        match index_by_ssid.get(&ap.ssid) {
            Some(&index) => {
                let rank = |ap: &AccessPoint| ap.rssi.unwrap_or(MISSING_RSSI_RANK);
                if rank(&ap) > rank(&best[index]) {
                    best[index] = ap;
                }
            }
            None => {
                index_by_ssid.insert(ap.ssid.clone(), best.len());
                best.push(ap);
            }
        }
    }

    best.sort_by_key(|ap| std::cmp::Reverse(ap.rssi.unwrap_or(MISSING_RSSI_SORT)));
    best
}

/// Build the selector entries, led by the placeholder
pub fn network_options(networks: &[AccessPoint]) -> Vec<NetworkOption> {
    std::iter::once(NetworkOption {
        value: String::new(),
        label: NO_SELECTION_LABEL.to_string(),
    })
    .chain(networks.iter().map(|ap| NetworkOption {
        value: ap.ssid.clone(),
        label: match ap.rssi {
            Some(rssi) => format!("{} ({rssi} dBm)", ap.ssid),
            None => ap.ssid.clone(),
        },
    }))
    .collect()
}
