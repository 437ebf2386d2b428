//! Payment notice delivery

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

use super::GatewayError;

/// Delivers one message to one recipient
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Returns the provider message id when one is available
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<Option<String>, GatewayError>;
}

/// Plain-text email via AWS SES v2
pub struct SesNotificationGateway {
    ses: SesClient,
    from: String,
}

impl SesNotificationGateway {
    pub fn new(ses: SesClient, from: impl Into<String>) -> Self {
        Self {
            ses,
            from: from.into(),
        }
    }

    /// Build from the default AWS configuration, optionally pinned to a region
    pub async fn from_env(from: impl Into<String>, region: Option<String>) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = match region {
            Some(region) => {
                let ses_config = aws_config
                    .to_builder()
                    .region(aws_config::Region::new(region))
                    .build();
                SesClient::new(&ses_config)
            }
            None => SesClient::new(&aws_config),
        };
        Self::new(ses, from)
    }
}

#[async_trait]
impl NotificationGateway for SesNotificationGateway {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<Option<String>, GatewayError> {
        let subject = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| GatewayError::Rejected(format!("invalid subject: {e}")))?;
        let text = Content::builder()
            .data(body)
            .charset("UTF-8")
            .build()
            .map_err(|e| GatewayError::Rejected(format!("invalid body: {e}")))?;

        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().text(text).build())
            .build();

        let output = self
            .ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(recipient).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some() {
                    GatewayError::Rejected(e.to_string())
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        tracing::info!(to = recipient, "Payment notice sent");
        Ok(output.message_id().map(str::to_string))
    }
}
