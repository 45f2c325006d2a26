//! Client-side copy of the user-agent classifier, for local display only.
//! The server re-derives the same values from the request header and its
//! result is what gets persisted.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserInfo {
    pub browser_name: String,
    pub device_type: String,
    pub operating_system: String,
}

pub fn get_browser_info(user_agent: &str) -> BrowserInfo {
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
    let is_mobile_like = [
        "mobile",
        "android",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
    ]
    .iter()
    .any(|token| lowered.contains(token));
    let device_type = if is_mobile_like {
        if lowered.contains("ipad") || lowered.contains("tablet") {
            "tablet"
        } else {
            "mobile"
        }
    } else {
        "desktop"
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

    BrowserInfo {
        browser_name: browser_name.to_string(),
        device_type: device_type.to_string(),
        operating_system: operating_system.to_string(),
    }
}

/// Reads the browser's own user-agent string.
pub fn current_user_agent() -> String {
    web_sys::window()
        .map(|w| w.navigator().user_agent().unwrap_or_default())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_matches_server_rules() {
        let chrome = get_browser_info(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        );
        assert_eq!(chrome.browser_name, "Chrome");
        assert_eq!(chrome.device_type, "desktop");
        assert_eq!(chrome.operating_system, "Windows");

        let ipad = get_browser_info(
            "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
        );
        assert_eq!(ipad.browser_name, "Safari");
        assert_eq!(ipad.device_type, "tablet");
        assert_eq!(ipad.operating_system, "iOS");

        let unknown = get_browser_info("curl/8.4.0");
        assert_eq!(unknown.browser_name, "Unknown");
        assert_eq!(unknown.device_type, "desktop");
    }
}
