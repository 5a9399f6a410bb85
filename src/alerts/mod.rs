//! Outbound admin login alerts.
//!
//! # Data Flow
//! ```text
//! login handler → Alerts::dispatch (spawned, never awaited)
//!     → geo.rs (IP lookup, 3s timeout)
//!     → user_agent.rs (OS / browser family)
//!     → telegram.rs (sendMessage)
//! ```
//!
//! Failures are logged and dropped; the login decision never waits on them.

pub mod geo;
pub mod telegram;
pub mod user_agent;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::AlertConfig;
use crate::observability::metrics;
use geo::GeoInfo;
use telegram::TelegramTarget;
use user_agent::{parse_user_agent, DeviceInfo};

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("alert rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

/// What happened at the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    Blocked { retry_after_secs: u64 },
    Failed,
    Succeeded,
}

#[derive(Debug, Clone)]
pub struct LoginAlert {
    pub event: LoginEvent,
    pub ip: String,
    pub user_agent: String,
}

/// Fire-and-forget alert dispatcher.
#[derive(Clone)]
pub struct Alerts {
    inner: Arc<AlertsInner>,
}

struct AlertsInner {
    client: reqwest::Client,
    target: Option<TelegramTarget>,
    geo_url: String,
    timeout: Duration,
}

impl Alerts {
    pub fn new(config: &AlertConfig, timeout: Duration) -> Self {
        let target = match (&config.telegram_bot_token, &config.telegram_chat_id) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => Some(TelegramTarget {
                api_base: config.telegram_api_base.clone(),
                bot_token: token.clone(),
                chat_id: chat.clone(),
            }),
            _ => None,
        };

        Self {
            inner: Arc::new(AlertsInner {
                client: reqwest::Client::new(),
                target,
                geo_url: config.geo_lookup_url.clone(),
                timeout,
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.target.is_some()
    }

    /// Spawn delivery of `alert` and return immediately.
    pub fn dispatch(&self, alert: LoginAlert) {
        if !self.is_enabled() {
            tracing::debug!(event = ?alert.event, "Telegram not configured, alert skipped");
            return;
        }

        let alerts = self.clone();
        tokio::spawn(async move {
            match alerts.send(&alert).await {
                Ok(()) => metrics::record_alert("sent"),
                Err(e) => {
                    tracing::warn!(event = ?alert.event, ip = %alert.ip, error = %e, "Failed to send login alert");
                    metrics::record_alert("failed");
                }
            }
        });
    }

    /// Enrich and deliver one alert.
    pub async fn send(&self, alert: &LoginAlert) -> Result<(), AlertError> {
        let Some(target) = &self.inner.target else {
            return Ok(());
        };
        let geo = geo::lookup(&self.inner.client, &self.inner.geo_url, &alert.ip, self.inner.timeout).await;
        let device = parse_user_agent(&alert.user_agent);
        let text = format_message(alert, &geo, &device);
        telegram::send_message(&self.inner.client, target, &text, self.inner.timeout).await
    }
}

pub fn format_message(alert: &LoginAlert, geo: &GeoInfo, device: &DeviceInfo) -> String {
    let title = match alert.event {
        LoginEvent::Blocked { .. } => "*Admin login blocked*",
        LoginEvent::Failed => "*Admin login failed*",
        LoginEvent::Succeeded => "*Admin login succeeded*",
    };

    let mut text = format!(
        "{}\nIP: `{}`\nLocation: {}, {}\nISP: {}\nDevice: {} / {}",
        title,
        code_span_text(&alert.ip),
        escape_markdown(&geo.city),
        escape_markdown(&geo.country),
        escape_markdown(&geo.isp),
        device.os,
        device.browser
    );
    if let LoginEvent::Blocked { retry_after_secs } = alert.event {
        text.push_str(&format!("\nRetry after: {}s", retry_after_secs));
    }
    text
}

/// Escape Telegram Markdown entity markers outside of an entity.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Text placed inside a code span. Markdown has no escape there, so a
/// backtick would close the span early.
fn code_span_text(text: &str) -> String {
    text.chars().filter(|c| *c != '`').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(event: LoginEvent) -> LoginAlert {
        LoginAlert {
            event,
            ip: "203.0.113.5".into(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0".into(),
        }
    }

    #[test]
    fn test_format_blocked() {
        let a = alert(LoginEvent::Blocked { retry_after_secs: 600 });
        let text = format_message(&a, &GeoInfo::unknown(), &parse_user_agent(&a.user_agent));
        assert_eq!(
            text,
            "*Admin login blocked*\nIP: `203.0.113.5`\nLocation: Unknown, Unknown\nISP: Unknown\nDevice: Linux / Firefox\nRetry after: 600s"
        );
    }

    #[test]
    fn test_client_controlled_fields_cannot_break_markup() {
        let a = LoginAlert {
            event: LoginEvent::Failed,
            ip: "1.2.3.4`_x*".into(),
            user_agent: "curl/8.4.0".into(),
        };
        let geo = GeoInfo {
            city: "Gen_eva".into(),
            country: "*CH".into(),
            isp: "[evil](http://x) `isp`".into(),
        };
        let text = format_message(&a, &geo, &parse_user_agent(&a.user_agent));
        assert_eq!(
            text,
            "*Admin login failed*\nIP: `1.2.3.4_x*`\nLocation: Gen\\_eva, \\*CH\nISP: \\[evil](http://x) \\`isp\\`\nDevice: Unknown / Unknown"
        );
        // One code span: exactly two backticks that are not escaped.
        let bare = text.matches('`').count() - text.matches("\\`").count();
        assert_eq!(bare, 2);
    }

    #[test]
    fn test_format_success_has_no_retry() {
        let a = alert(LoginEvent::Succeeded);
        let text = format_message(&a, &GeoInfo::unknown(), &parse_user_agent(&a.user_agent));
        assert!(text.starts_with("*Admin login succeeded*"));
        assert!(!text.contains("Retry after"));
    }

    #[tokio::test]
    async fn test_unconfigured_is_noop() {
        let alerts = Alerts::new(&AlertConfig::default(), Duration::from_secs(1));
        assert!(!alerts.is_enabled());
        alerts.dispatch(alert(LoginEvent::Failed));
        assert!(alerts.send(&alert(LoginEvent::Failed)).await.is_ok());
    }

    #[test]
    fn test_empty_credentials_disable_alerts() {
        let config = AlertConfig {
            telegram_bot_token: Some(String::new()),
            telegram_chat_id: Some("1".into()),
            ..AlertConfig::default()
        };
        assert!(!Alerts::new(&config, Duration::from_secs(1)).is_enabled());
    }
}
