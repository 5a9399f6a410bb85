//! Best-effort IP geolocation.
//!
//! Lookups never fail outward: any error yields [`GeoInfo::unknown`].

use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    pub city: String,
    pub country: String,
    pub isp: String,
}

impl GeoInfo {
    pub fn unknown() -> Self {
        Self {
            city: "Unknown".to_string(),
            country: "Unknown".to_string(),
            isp: "Unknown".to_string(),
        }
    }

    fn local() -> Self {
        Self {
            city: "Local network".to_string(),
            country: "Unknown".to_string(),
            isp: "Unknown".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    status: String,
    country: Option<String>,
    city: Option<String>,
    isp: Option<String>,
}

fn is_non_routable(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

/// Look `ip` up at `base_url/<ip>`.
pub async fn lookup(client: &reqwest::Client, base_url: &str, ip: &str, timeout: Duration) -> GeoInfo {
    let addr: IpAddr = match ip.parse() {
        Ok(addr) => addr,
        Err(_) => return GeoInfo::unknown(),
    };
    if is_non_routable(&addr) {
        return GeoInfo::local();
    }

    let mut url = match url::Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(base_url = %base_url, error = %e, "Invalid geolocation URL");
            return GeoInfo::unknown();
        }
    };
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().push(ip);
        }
        Err(()) => return GeoInfo::unknown(),
    }
    url.query_pairs_mut().append_pair("fields", "status,country,city,isp");

    let response = match client.get(url).timeout(timeout).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(ip = %ip, error = %e, "Geolocation lookup failed");
            return GeoInfo::unknown();
        }
    };

    match response.json::<LookupResponse>().await {
        Ok(body) if body.status == "success" => {
            let or_unknown = |v: Option<String>| v.filter(|s| !s.is_empty()).unwrap_or_else(|| "Unknown".to_string());
            GeoInfo {
                city: or_unknown(body.city),
                country: or_unknown(body.country),
                isp: or_unknown(body.isp),
            }
        }
        Ok(body) => {
            tracing::debug!(ip = %ip, status = %body.status, "Geolocation lookup unsuccessful");
            GeoInfo::unknown()
        }
        Err(e) => {
            tracing::warn!(ip = %ip, error = %e, "Geolocation response unreadable");
            GeoInfo::unknown()
        }
    }
}
