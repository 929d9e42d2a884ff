// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Slack incoming-webhook delivery.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

use super::compose::MealType;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(String),

    #[error("webhook rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// One reminder: a single meal slot for a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub user_id: Uuid,
    pub user_name: String,
    pub meal_type: MealType,
    pub message: String,
}

/// Webhook body: a plain-text fallback plus Block Kit sections.
#[derive(Debug, Serialize)]
pub struct SlackPayload {
    pub text: String,
    pub blocks: Vec<Value>,
}

impl From<&Reminder> for SlackPayload {
    fn from(reminder: &Reminder) -> Self {
        let Reminder {
            user_id,
            user_name,
            meal_type,
            message,
        } = reminder;

        let text =
            format!("user_id: {user_id}\nuser_name: {user_name}\nmeal_type: {meal_type}\n\n{message}");
        let blocks = vec![
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*user_id:* {user_id}\n*user_name:* {user_name}\n*meal_type:* {meal_type}"
                    ),
                }
            }),
            json!({
                "type": "section",
                "text": {"type": "plain_text", "text": message}
            }),
        ];
        Self { text, blocks }
    }
}

/// Destination for reminders.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, reminder: &Reminder) -> Result<(), NotifyError>;
}

pub struct SlackWebhook {
    client: Client,
    url: Url,
}

impl SlackWebhook {
    pub fn new(url: Url, client: Client) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    async fn send(&self, reminder: &Reminder) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&SlackPayload::from(reminder))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reminder() -> Reminder {
        Reminder {
            user_id: Uuid::nil(),
            user_name: "Priya".into(),
            meal_type: MealType::Lunch,
            message: "Today's Lunch is Dal and Rice".into(),
        }
    }

    #[test]
    fn payload_has_header_and_body_sections() {
        let payload = SlackPayload::from(&reminder());
        assert!(payload.text.starts_with("user_id: 00000000-0000-0000-0000-000000000000\n"));
        assert!(payload.text.contains("meal_type: lunch\n\nToday's Lunch is Dal and Rice"));
        assert_eq!(payload.blocks.len(), 2);
        assert_eq!(payload.blocks[0]["text"]["type"], "mrkdwn");
        assert_eq!(payload.blocks[1]["text"]["text"], "Today's Lunch is Dal and Rice");
    }

    #[tokio::test]
    async fn posts_payload_to_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(json!({
                "text": "user_id: 00000000-0000-0000-0000-000000000000\nuser_name: Priya\n\
                         meal_type: lunch\n\nToday's Lunch is Dal and Rice"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/hook", server.uri())).unwrap();
        let webhook = SlackWebhook::new(url, Client::new());
        webhook.send(&reminder()).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let webhook = SlackWebhook::new(Url::parse(&server.uri()).unwrap(), Client::new());
        let err = webhook.send(&reminder()).await.unwrap_err();
        assert!(matches!(
            err,
            NotifyError::Rejected { status: 404, ref body } if body == "no_service"
        ));
    }
}
