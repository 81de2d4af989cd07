//! Outbound one-time code delivery.
//!
//! Issuance hands the plaintext code to an [`OtpSender`] and moves on:
//! delivery is best-effort and a failure never invalidates the stored
//! record. Production uses the WhatsApp Cloud API template dispatch; local
//! development uses [`LogOtpSender`], which discloses the code to the log
//! instead of delivering it.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::info;
use url::Url;

use crate::APP_USER_AGENT;

pub const DEFAULT_WHATSAPP_API_BASE: &str = "https://graph.facebook.com/v20.0";
const OTP_TEMPLATE_NAME: &str = "otp_verification";

/// A single code dispatch: destination phone and the plaintext code.
#[derive(Clone, Debug)]
pub struct OtpMessage {
    pub phone: i64,
    pub code: String,
}

/// Delivery seam between issuance and the outside world.
///
/// An enum rather than a trait object: delivery is async end to end and the
/// two implementations are known at startup.
pub enum OtpSender {
    WhatsApp(WhatsAppSender),
    Log(LogOtpSender),
}

impl OtpSender {
    /// Attempt delivery of the plaintext code.
    ///
    /// # Errors
    /// Returns an error when the provider rejects or the request fails;
    /// callers decide whether that failure is fatal (issuance treats it as
    /// non-fatal).
    pub async fn send(&self, message: &OtpMessage) -> Result<()> {
        match self {
            Self::WhatsApp(sender) => sender.send(message).await,
            Self::Log(sender) => {
                sender.send(message);
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    sender_phone_id: String,
    access_token: SecretString,
    api_base: Url,
}

impl WhatsAppConfig {
    /// # Errors
    /// Returns an error if the API base is not a valid URL.
    pub fn new(sender_phone_id: String, access_token: SecretString) -> Result<Self> {
        Self::with_api_base(sender_phone_id, access_token, DEFAULT_WHATSAPP_API_BASE)
    }

    /// # Errors
    /// Returns an error if `api_base` is not a valid URL.
    pub fn with_api_base(
        sender_phone_id: String,
        access_token: SecretString,
        api_base: &str,
    ) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .with_context(|| format!("Invalid WhatsApp API base: {api_base}"))?;
        Ok(Self {
            sender_phone_id,
            access_token,
            api_base,
        })
    }

    fn messages_url(&self) -> String {
        let base = self.api_base.as_str().trim_end_matches('/');
        format!("{base}/{}/messages", self.sender_phone_id)
    }
}

/// WhatsApp Cloud API template dispatch.
pub struct WhatsAppSender {
    client: Client,
    config: WhatsAppConfig,
}

impl WhatsAppSender {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: WhatsAppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("failed to build WhatsApp HTTP client")?;
        Ok(Self { client, config })
    }

    async fn send(&self, message: &OtpMessage) -> Result<()> {
        let response = self
            .client
            .post(self.config.messages_url())
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&template_payload(message))
            .send()
            .await
            .context("WhatsApp request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("WhatsApp API returned {status}: {body}"));
        }

        info!(phone = message.phone, "one-time code dispatched");
        Ok(())
    }
}

/// Development sender: the log line is the delivery channel.
pub struct LogOtpSender;

impl LogOtpSender {
    fn send(&self, message: &OtpMessage) {
        // Deliberate plaintext disclosure, dev only.
        info!(
            phone = message.phone,
            code = %message.code,
            "one-time code (log delivery)"
        );
    }
}

/// The `otp_verification` template: the code fills the body parameter and
/// the copy-code button.
fn template_payload(message: &OtpMessage) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": message.phone,
        "type": "template",
        "template": {
            "name": OTP_TEMPLATE_NAME,
            "language": { "code": "en" },
            "components": [
                {
                    "type": "body",
                    "parameters": [ { "type": "text", "text": message.code } ]
                },
                {
                    "type": "button",
                    "sub_type": "url",
                    "index": "0",
                    "parameters": [ { "type": "text", "text": message.code } ]
                }
            ]
        }
    })
}
