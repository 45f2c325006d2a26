//! User-agent fingerprinting for audit records.
//!
//! The client computes the same classification for local display, but the
//! value persisted with sessions and login logs is always re-derived here
//! from the raw request header.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserFingerprint {
    pub browser_name: String,
    pub device_type: DeviceType,
    pub operating_system: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
        }
    }
}

const MOBILE_TOKENS: [&str; 8] = [
    "mobile",
    "android",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

const TABLET_TOKENS: [&str; 2] = ["ipad", "tablet"];

/// Classifies a raw user-agent string into browser family, device class
/// and operating system. Unknown inputs fall back to "Unknown"/desktop;
/// there is no error path.
pub fn resolve(user_agent: &str) -> BrowserFingerprint {
    let browser_name = if user_agent.contains("Chrome") && !user_agent.contains("Edg") {
        "Chrome"
    } else if user_agent.contains("Firefox") {
        "Firefox"
    } else if user_agent.contains("Safari") && !user_agent.contains("Chrome") {
        "Safari"
    } else if user_agent.contains("Edg") {
        "Edge"
    } else if user_agent.contains("Opera") || user_agent.contains("OPR") {
        "Opera"
    } else {
        "Unknown"
    };

    let lowered = user_agent.to_ascii_lowercase();
    let device_type = if MOBILE_TOKENS.iter().any(|token| lowered.contains(token)) {
        // Tablet wins when both mobile- and tablet-style tokens appear.
        if TABLET_TOKENS.iter().any(|token| lowered.contains(token)) {
            DeviceType::Tablet
        } else {
            DeviceType::Mobile
        }
    } else {
        DeviceType::Desktop
    };

    let operating_system = if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Mac") {
        "macOS"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("iPhone") || user_agent.contains("iPad") {
        "iOS"
    } else {
        "Unknown"
    };

    BrowserFingerprint {
        browser_name: browser_name.to_string(),
        device_type,
        operating_system: operating_system.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const OPERA_WIN: &str = "Opera/9.80 (Windows NT 6.1) Presto/2.12.388 Version/12.18";

    #[test]
    fn classifies_desktop_browsers() {
        let chrome = resolve(CHROME_WIN);
        assert_eq!(chrome.browser_name, "Chrome");
        assert_eq!(chrome.device_type, DeviceType::Desktop);
        assert_eq!(chrome.operating_system, "Windows");

        let firefox = resolve(FIREFOX_LINUX);
        assert_eq!(firefox.browser_name, "Firefox");
        assert_eq!(firefox.operating_system, "Linux");

        let safari = resolve(SAFARI_MAC);
        assert_eq!(safari.browser_name, "Safari");
        assert_eq!(safari.operating_system, "macOS");
    }

    #[test]
    fn edge_is_not_reported_as_chrome() {
        let edge = resolve(EDGE_WIN);
        assert_eq!(edge.browser_name, "Edge");
    }

    #[test]
    fn opera_is_detected() {
        let opera = resolve(OPERA_WIN);
        assert_eq!(opera.browser_name, "Opera");
    }

    #[test]
    fn android_phone_is_mobile() {
        let phone = resolve(CHROME_ANDROID);
        assert_eq!(phone.device_type, DeviceType::Mobile);
        assert_eq!(phone.operating_system, "Android");
    }

    #[test]
    fn ipad_is_tablet_on_ios() {
        let tablet = resolve(SAFARI_IPAD);
        assert_eq!(tablet.device_type, DeviceType::Tablet);
        assert_eq!(tablet.operating_system, "iOS");
        assert_eq!(tablet.browser_name, "Safari");
    }

    #[test]
    fn unknown_input_falls_back_to_defaults() {
        let unknown = resolve("curl/8.4.0");
        assert_eq!(unknown.browser_name, "Unknown");
        assert_eq!(unknown.device_type, DeviceType::Desktop);
        assert_eq!(unknown.operating_system, "Unknown");

        let empty = resolve("");
        assert_eq!(empty.browser_name, "Unknown");
        assert_eq!(empty.device_type, DeviceType::Desktop);
        assert_eq!(empty.operating_system, "Unknown");
    }
}
