use std::fs;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::CredentialsSource;
use crate::error::{CalendarError, ConfigError};

/// Read-only access to calendars, the only scope the dashboard needs.
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Refresh this long before the provider-side expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_expires_in() -> i64 {
    3600
}

/// The fields of a service-account key file we use.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Credentials {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::Credentials {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Claims of the JWT assertion exchanged for an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn build_assertion_claims(key: &ServiceAccountKey, now: DateTime<Utc>) -> AssertionClaims {
    AssertionClaims {
        iss: key.client_email.clone(),
        scope: CALENDAR_READONLY_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

enum TokenSource {
    Static(String),
    ServiceAccount {
        key: ServiceAccountKey,
        signing_key: EncodingKey,
    },
}

/// Supplies bearer tokens for calendar API calls.
///
/// Service-account tokens are cached until shortly before they expire.
pub struct GoogleAuth {
    source: TokenSource,
    http: Client,
    cache: Mutex<Option<CachedToken>>,
}

impl GoogleAuth {
    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
            http: Client::new(),
            cache: Mutex::new(None),
        }
    }

    pub fn with_service_account(key: ServiceAccountKey) -> Result<Self, CalendarError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| CalendarError::Auth(format!("invalid service account key: {}", e)))?;

        info!("Using service account {} for calendar access", key.client_email);

        Ok(Self {
            source: TokenSource::ServiceAccount { key, signing_key },
            http: Client::new(),
            cache: Mutex::new(None),
        })
    }

    pub fn from_credentials(credentials: &CredentialsSource) -> Result<Self, ConfigError> {
        match credentials {
            CredentialsSource::AccessToken(token) => Ok(Self::with_access_token(token.clone())),
            CredentialsSource::ServiceAccountFile(path) => {
                let key = ServiceAccountKey::from_file(path)?;
                Self::with_service_account(key).map_err(|e| ConfigError::Credentials {
                    path: path.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Return a valid access token, exchanging a fresh assertion when needed.
    pub async fn access_token(&self) -> Result<String, CalendarError> {
        let (key, signing_key) = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ServiceAccount { key, signing_key } => (key, signing_key),
        };

        let mut cache = self.cache.lock().await;
        let now = Utc::now();

        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > now + Duration::seconds(EXPIRY_MARGIN_SECS) {
                return Ok(cached.value.clone());
            }
            debug!("Cached access token expires at {}, refreshing", cached.expires_at);
        }

        let fresh = self.exchange(key, signing_key, now).await?;
        let value = fresh.value.clone();
        *cache = Some(fresh);

        Ok(value)
    }

    async fn exchange(
        &self,
        key: &ServiceAccountKey,
        signing_key: &EncodingKey,
        now: DateTime<Utc>,
    ) -> Result<CachedToken, CalendarError> {
        let claims = build_assertion_claims(key, now);
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, signing_key)
            .map_err(|e| CalendarError::Auth(format!("failed to sign assertion: {}", e)))?;

        debug!("Exchanging service account assertion at {}", key.token_uri);

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Auth(format!("token exchange HTTP {}: {}", status.as_u16(), body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CalendarError::Auth(format!("unreadable token response: {}", e)))?;

        info!("Obtained calendar access token valid for {}s", token.expires_in);

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = include_str!("tests/common/service_account_key.pem");

    fn test_key(token_uri: String) -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "dashboard@effynails.iam.gserviceaccount.com".to_string(),
            private_key: TEST_KEY.to_string(),
            token_uri,
        }
    }

    #[test]
    fn test_assertion_claims() {
        let key = test_key(default_token_uri());
        let now = Utc.with_ymd_and_hms(2025, 5, 12, 9, 0, 0).unwrap();

        let claims = build_assertion_claims(&key, now);

        assert_eq!(claims.iss, "dashboard@effynails.iam.gserviceaccount.com");
        assert_eq!(claims.scope, CALENDAR_READONLY_SCOPE);
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_key_file_defaults_token_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("google-credentials.json");
        fs::write(
            &path,
            json!({
                "type": "service_account",
                "client_email": "svc@example.iam.gserviceaccount.com",
                "private_key": TEST_KEY,
            })
            .to_string(),
        )
        .unwrap();

        let key = ServiceAccountKey::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(key.client_email, "svc@example.iam.gserviceaccount.com");
    }

    #[test]
    fn test_missing_key_file() {
        let result = ServiceAccountKey::from_file("/nonexistent/google-credentials.json");
        assert!(matches!(result, Err(ConfigError::Credentials { .. })));
    }

    #[test]
    fn test_invalid_private_key_is_rejected() {
        let mut key = test_key(default_token_uri());
        key.private_key = "not a pem".to_string();
        assert!(matches!(GoogleAuth::with_service_account(key), Err(CalendarError::Auth(_))));
    }

    #[tokio::test]
    async fn test_static_token() {
        let auth = GoogleAuth::with_access_token("ya29.static");
        assert_eq!(auth.access_token().await.unwrap(), "ya29.static");
    }

    #[tokio::test]
    async fn test_service_account_exchange_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .and(body_string_contains("assertion="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.service",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = GoogleAuth::with_service_account(test_key(format!("{}/token", server.uri()))).unwrap();

        assert_eq!(auth.access_token().await.unwrap(), "ya29.service");
        assert_eq!(auth.access_token().await.unwrap(), "ya29.service");
    }

    #[tokio::test]
    async fn test_rejected_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"error\":\"invalid_grant\"}"))
            .mount(&server)
            .await;

        let auth = GoogleAuth::with_service_account(test_key(format!("{}/token", server.uri()))).unwrap();

        match auth.access_token().await {
            Err(CalendarError::Auth(message)) => assert!(message.contains("invalid_grant")),
            other => panic!("expected auth error, got {:?}", other.map(|_| ())),
        }
    }
}
