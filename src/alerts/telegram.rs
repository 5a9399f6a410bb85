//! Telegram Bot API `sendMessage` client.

use std::time::Duration;

use serde::Serialize;

use crate::alerts::AlertError;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Target chat for alerts.
#[derive(Debug, Clone)]
pub struct TelegramTarget {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramTarget {
    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), self.bot_token)
    }
}

pub async fn send_message(
    client: &reqwest::Client,
    target: &TelegramTarget,
    text: &str,
    timeout: Duration,
) -> Result<(), AlertError> {
    let body = SendMessage {
        chat_id: &target.chat_id,
        text,
        parse_mode: "Markdown",
    };

    let response = client
        .post(target.endpoint())
        .timeout(timeout)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AlertError::Rejected {
            status: status.as_u16(),
            detail,
        });
    }
    Ok(())
}
