//! Coarse user-agent classification for alert messages.

/// Operating system and browser families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub os: &'static str,
    pub browser: &'static str,
}

const UNKNOWN: &str = "Unknown";

pub fn parse_user_agent(ua: &str) -> DeviceInfo {
    DeviceInfo {
        os: os_family(ua),
        browser: browser_family(ua),
    }
}

fn os_family(ua: &str) -> &'static str {
    // iOS UAs contain "like Mac OS X", Android UAs contain "Linux".
    if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        UNKNOWN
    }
}

fn browser_family(ua: &str) -> &'static str {
    // Order matters: Edge and Opera also advertise Chrome, Chrome advertises Safari.
    if ua.contains("Edg/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_agents() {
        let cases = [
            (
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36 Edg/120.0",
                "Windows",
                "Edge",
            ),
            (
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
                "macOS",
                "Safari",
            ),
            (
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/120.0 Mobile/15E148 Safari/604.1",
                "iOS",
                "Chrome",
            ),
            (
                "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36",
                "Android",
                "Chrome",
            ),
            (
                "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
                "Linux",
                "Firefox",
            ),
        ];

        for (ua, os, browser) in cases {
            assert_eq!(parse_user_agent(ua), DeviceInfo { os, browser }, "{}", ua);
        }
    }

    #[test]
    fn test_unknown_agent() {
        assert_eq!(
            parse_user_agent("curl/8.4.0"),
            DeviceInfo { os: "Unknown", browser: "Unknown" }
        );
    }
}
