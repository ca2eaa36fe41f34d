//! Short-lived identity token acquisition.
//!
//! The token is a bearer assertion minted for a fixed audience, either handed
//! to the process directly or fetched from the platform's issuance endpoint.
//! One attempt only: a transient failure here fails the run.

use serde::Deserialize;
use zeroize::Zeroizing;

use crate::config::Environment;
use crate::error::{Error, Result};

/// Audience the token is scoped to. Must match the audience condition in the
/// role's trust policy.
pub const AUDIENCE: &str = "sigstore";

/// Variable carrying a pre-issued token, when the surrounding environment can
/// mint one itself.
pub const PROVIDED_TOKEN_VAR: &str = "RIFFRAFF_IDENTITY_TOKEN";

pub const REQUEST_TOKEN_VAR: &str = "ACTIONS_ID_TOKEN_REQUEST_TOKEN";
pub const REQUEST_URL_VAR: &str = "ACTIONS_ID_TOKEN_REQUEST_URL";

/// Where this run's identity token comes from.
pub enum TokenSource {
    /// A token issued directly by the surrounding environment.
    Provided(Zeroizing<String>),
    /// A token minted on demand by the issuance endpoint.
    Endpoint {
        request_url: String,
        request_token: Zeroizing<String>,
    },
}

// The request token is a credential; keep it out of Debug output.
impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provided(_) => f.write_str("TokenSource::Provided(<redacted>)"),
            Self::Endpoint { request_url, .. } => f
                .debug_struct("TokenSource::Endpoint")
                .field("request_url", request_url)
                .field("request_token", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    value: String,
}

impl TokenSource {
    /// Pick the issuance strategy for this run: a directly provided token
    /// wins, otherwise both endpoint variables must be present.
    pub fn from_environment(env: &Environment) -> Result<Self> {
        if let Some(token) = env.get(PROVIDED_TOKEN_VAR) {
            return Ok(Self::Provided(Zeroizing::new(token.to_string())));
        }

        let request_token = env.require(REQUEST_TOKEN_VAR)?;
        let request_url = env.require(REQUEST_URL_VAR)?;
        Ok(Self::Endpoint {
            request_url: request_url.to_string(),
            request_token: Zeroizing::new(request_token.to_string()),
        })
    }

    /// Obtain the bearer token for the web-identity exchange.
    pub async fn fetch(&self) -> Result<Zeroizing<String>> {
        match self {
            Self::Provided(token) => Ok(token.clone()),
            Self::Endpoint {
                request_url,
                request_token,
            } => {
                let client = reqwest::Client::new();
                let response = client
                    .get(request_url)
                    .query(&[("audience", AUDIENCE)])
                    .header(
                        reqwest::header::AUTHORIZATION,
                        format!("bearer {}", request_token.as_str()),
                    )
                    .send()
                    .await
                    .map_err(|e| Error::TokenFetchFailed(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Error::TokenFetchFailed(format!(
                        "token endpoint returned {status}"
                    )));
                }

                let body: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::TokenFetchFailed(format!("unexpected response: {e}")))?;
                parse_token_value(body)
            }
        }
    }
}

fn parse_token_value(body: TokenResponse) -> Result<Zeroizing<String>> {
    if body.value.is_empty() {
        return Err(Error::TokenFetchFailed(
            "token response had an empty value".to_string(),
        ));
    }
    log::debug!("fetched identity token for audience {AUDIENCE}");
    Ok(Zeroizing::new(body.value))
}
