use anyhow::{anyhow, Result};
use secrecy::SecretString;

/// Cross-cutting configuration lifted out of the CLI matches: secrets and
/// delivery credentials that several actions need.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret: SecretString,
    pub frontend_url: String,
    pub wa_phone_id: Option<String>,
    pub wa_token: SecretString,
    pub dev: bool,
}

impl GlobalArgs {
    /// # Errors
    /// Returns an error when a required argument is absent from the matches.
    pub fn from_matches(matches: &clap::ArgMatches) -> Result<Self> {
        let secret = matches
            .get_one::<String>("secret")
            .map(|value| SecretString::from(value.clone()))
            .ok_or_else(|| anyhow!("missing required argument: --secret"))?;

        let frontend_url = matches
            .get_one::<String>("frontend-url")
            .map_or_else(|| "http://localhost:3000".to_string(), ToString::to_string);

        let wa_phone_id = matches
            .get_one::<String>("wa-phone-id")
            .map(ToString::to_string);

        let wa_token = matches
            .get_one::<String>("wa-token")
            .map_or_else(SecretString::default, |value| {
                SecretString::from(value.clone())
            });

        Ok(Self {
            secret,
            frontend_url,
            wa_phone_id,
            wa_token,
            dev: matches.get_flag("dev"),
        })
    }

    /// WhatsApp credentials when fully configured.
    #[must_use]
    pub fn whatsapp(&self) -> Option<(&str, &SecretString)> {
        self.wa_phone_id
            .as_deref()
            .map(|phone_id| (phone_id, &self.wa_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "fleetpass",
            "--dsn",
            "postgres://localhost/fleetpass",
            "--secret",
            "hmac-key",
            "--dev",
        ]);
        let args = GlobalArgs::from_matches(&matches)?;
        assert_eq!(args.secret.expose_secret(), "hmac-key");
        assert_eq!(args.frontend_url, "http://localhost:3000");
        assert!(args.dev);
        assert!(args.whatsapp().is_none());
        Ok(())
    }

    #[test]
    fn test_whatsapp_pair() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "fleetpass",
            "--dsn",
            "postgres://localhost/fleetpass",
            "--secret",
            "hmac-key",
            "--wa-phone-id",
            "104523",
            "--wa-token",
            "wa-token",
        ]);
        let args = GlobalArgs::from_matches(&matches)?;
        let (phone_id, token) = args.whatsapp().expect("credentials");
        assert_eq!(phone_id, "104523");
        assert_eq!(token.expose_secret(), "wa-token");
        Ok(())
    }
}
