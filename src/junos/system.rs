//! Device platform facts and feature compatibility checks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::netconf::extract_element;

/// SRX branch, high-end and virtual models, plus the J series
static SECURITY_MODEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(v?srx|j)").expect("Invalid security model regex"));

/// Facts returned by `<get-system-information/>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemInformation {
    /// Hardware model, e.g. `srx300` or `vsrx`
    pub hardware_model: String,
    /// Operating system name
    pub os_name: String,
    /// Operating system version
    pub os_version: String,
    /// Chassis serial number
    pub serial_number: String,
    /// Configured host name
    pub host_name: String,
}

impl SystemInformation {
    /// Parse the body of a `get-system-information` reply.
    ///
    /// Missing elements are left empty; an empty model never passes a
    /// compatibility check.
    pub fn parse(xml: &str) -> Self {
        let get = |name: &str| extract_element(xml, name).unwrap_or_default();
        Self {
            hardware_model: get("hardware-model"),
            os_name: get("os-name"),
            os_version: get("os-version"),
            serial_number: get("serial-number"),
            host_name: get("host-name"),
        }
    }
}

/// Whether the platform carries the SRX security feature set
pub fn check_compatibility_security(info: &SystemInformation) -> bool {
    SECURITY_MODEL_REGEX.is_match(&info.hardware_model)
}
