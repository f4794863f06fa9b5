use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::config::IdentityConfig;
use crate::identity::{ClaimMap, IdentityError, IdentityProvider};

/// Identity provider admin client. The wire contract is fixed:
///
/// - `POST   {base}/v1/accounts`               -> `{"id": "..."}`
/// - `DELETE {base}/v1/accounts/{id}`          -> 204, 404 when absent
/// - `GET    {base}/v1/accounts/{id}/claims`   -> claim map
/// - `PUT    {base}/v1/accounts/{id}/claims`   -> 204
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct CreatedAccount {
    id: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let res = self
            .client
            .post(self.url("/v1/accounts"))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "email": email,
                "password": password,
                "email_verified": false,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        if !res.status().is_success() {
            return Err(IdentityError::Upstream(format!(
                "account creation returned {}",
                res.status()
            )));
        }

        let created: CreatedAccount = res
            .json()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;
        Ok(created.id)
    }

    async fn delete_account(&self, id: &str) -> Result<(), IdentityError> {
        let res = self
            .client
            .delete(self.url(&format!("/v1/accounts/{}", id)))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound(id.to_string())),
            s if s.is_success() => Ok(()),
            s => Err(IdentityError::Upstream(format!(
                "account deletion returned {}",
                s
            ))),
        }
    }

    async fn claims(&self, id: &str) -> Result<ClaimMap, IdentityError> {
        let res = self
            .client
            .get(self.url(&format!("/v1/accounts/{}/claims", id)))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound(id.to_string())),
            s if s.is_success() => res
                .json()
                .await
                .map_err(|e| IdentityError::Upstream(e.to_string())),
            s => Err(IdentityError::Upstream(format!("claims read returned {}", s))),
        }
    }

    async fn set_claims(&self, id: &str, claims: ClaimMap) -> Result<(), IdentityError> {
        let res = self
            .client
            .put(self.url(&format!("/v1/accounts/{}/claims", id)))
            .bearer_auth(&self.api_key)
            .json(&claims)
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound(id.to_string())),
            s if s.is_success() => Ok(()),
            s => Err(IdentityError::Upstream(format!(
                "claims update returned {}",
                s
            ))),
        }
    }
}
