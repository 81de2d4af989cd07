use crate::api;
use crate::api::handlers::auth::{AuthConfig, AuthState, NoopRateLimiter};
use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::sms::{LogOtpSender, OtpSender, WhatsAppConfig, WhatsAppSender};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

/// Handle the server action
pub async fn handle(action: Action, globals: GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            let sender = match globals.whatsapp() {
                Some((phone_id, token)) => OtpSender::WhatsApp(WhatsAppSender::new(
                    WhatsAppConfig::new(phone_id.to_string(), token.clone())?,
                )?),
                None => {
                    // Without delivery credentials every code goes to the log.
                    warn!("WhatsApp credentials not configured, using log delivery");
                    OtpSender::Log(LogOtpSender)
                }
            };

            let config =
                AuthConfig::new(globals.frontend_url.clone()).with_disclose_codes(globals.dev);

            let state = Arc::new(AuthState::new(
                config,
                globals.secret.clone(),
                sender,
                Arc::new(NoopRateLimiter),
            ));

            api::new(port, dsn, state).await?;
        }
    }

    Ok(())
}
