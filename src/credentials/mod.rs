//! Web-identity credential exchange.
//!
//! The bearer token is presented once to the security-token service, which
//! checks it against the trust policy bound to the role and returns temporary
//! credentials. The resulting provider serves that one credential set for the
//! whole run and only re-exchanges if it expires mid-run; callers cannot
//! observe whether a refresh happened.

use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use aws_credential_types::Credentials;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{self, ProvideCredentials, future};
use aws_sdk_sts::config::{BehaviorVersion, Region};
use aws_sdk_sts::error::DisplayErrorContext;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

const PROVIDER_NAME: &str = "WebIdentityExchange";

/// Re-exchange when the cached credentials are this close to expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(120);

/// Credential provider backed by a single `AssumeRoleWithWebIdentity` call.
pub struct WebIdentityProvider {
    sts: aws_sdk_sts::Client,
    role_arn: String,
    session_name: String,
    web_identity_token: Zeroizing<String>,
    cached: Mutex<Option<Credentials>>,
}

// The identity token must never appear in logs.
impl std::fmt::Debug for WebIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebIdentityProvider")
            .field("role_arn", &self.role_arn)
            .field("session_name", &self.session_name)
            .field("web_identity_token", &"<redacted>")
            .finish()
    }
}

impl WebIdentityProvider {
    fn new(region: &str, role_arn: &str, web_identity_token: Zeroizing<String>) -> Self {
        let config = aws_sdk_sts::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .build();

        Self {
            sts: aws_sdk_sts::Client::from_conf(config),
            role_arn: role_arn.to_string(),
            session_name: format!("riffraff-publisher-{}", Uuid::new_v4()),
            web_identity_token,
            cached: Mutex::new(None),
        }
    }

    /// Exchange the identity token for role credentials, eagerly, so a
    /// rejected exchange fails the run before anything is uploaded.
    pub async fn connect(
        region: &str,
        role_arn: &str,
        web_identity_token: Zeroizing<String>,
    ) -> Result<Self> {
        let provider = Self::new(region, role_arn, web_identity_token);
        let credentials = provider
            .exchange()
            .await
            .map_err(Error::CredentialExchangeFailed)?;
        provider.store(credentials);
        Ok(provider)
    }

    async fn exchange(&self) -> std::result::Result<Credentials, String> {
        log::debug!("assuming role {} via web identity", self.role_arn);

        let response = self
            .sts
            .assume_role_with_web_identity()
            .role_arn(&self.role_arn)
            .role_session_name(&self.session_name)
            .web_identity_token(self.web_identity_token.as_str())
            .send()
            .await
            .map_err(|e| DisplayErrorContext(&e).to_string())?;

        let credentials = response
            .credentials()
            .ok_or_else(|| "exchange response carried no credentials".to_string())?;
        let expiry = SystemTime::try_from(credentials.expiration().to_owned())
            .map_err(|e| e.to_string())?;

        Ok(Credentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            Some(credentials.session_token().to_string()),
            Some(expiry),
            PROVIDER_NAME,
        ))
    }

    fn store(&self, credentials: Credentials) {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        *cached = Some(credentials);
    }

    /// The cached credentials, unless they are about to expire.
    fn cached_valid(&self) -> Option<Credentials> {
        let cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        cached.clone().filter(|credentials| {
            credentials
                .expiry()
                .is_none_or(|expiry| SystemTime::now() + REFRESH_MARGIN < expiry)
        })
    }

    async fn current(&self) -> provider::Result {
        if let Some(credentials) = self.cached_valid() {
            return Ok(credentials);
        }

        let fresh = self
            .exchange()
            .await
            .map_err(CredentialsError::provider_error)?;
        self.store(fresh.clone());
        Ok(fresh)
    }
}

impl ProvideCredentials for WebIdentityProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> WebIdentityProvider {
        WebIdentityProvider::new(
            "eu-west-1",
            "arn:aws:iam::0123:role/deploy",
            Zeroizing::new("bearer-assertion-value".to_string()),
        )
    }

    fn credentials_expiring_in(duration: Duration) -> Credentials {
        Credentials::new(
            "AKIDEXAMPLE",
            "secret",
            Some("session".to_string()),
            Some(SystemTime::now() + duration),
            PROVIDER_NAME,
        )
    }

    #[test]
    fn fresh_credentials_are_served_from_the_cache() {
        let provider = provider();
        provider.store(credentials_expiring_in(Duration::from_secs(3600)));

        let cached = provider.cached_valid().expect("cache should hold");
        assert_eq!(cached.access_key_id(), "AKIDEXAMPLE");
    }

    #[test]
    fn near_expiry_credentials_are_not_served() {
        let provider = provider();
        provider.store(credentials_expiring_in(Duration::from_secs(30)));

        assert!(provider.cached_valid().is_none());
    }

    #[test]
    fn session_names_are_unique_per_run() {
        let first = provider();
        let second = provider();

        assert!(first.session_name.starts_with("riffraff-publisher-"));
        assert_ne!(first.session_name, second.session_name);
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let rendered = format!("{:?}", provider());
        assert!(!rendered.contains("bearer-assertion-value"));
        assert!(rendered.contains("arn:aws:iam::0123:role/deploy"));
    }
}
