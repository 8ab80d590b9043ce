//! REST Store Client
//!
//! Speaks the PostgREST-style protocol of the hosted store: table endpoints
//! under `/rest/v1/`, auth endpoints under `/auth/v1/`. One request per
//! operation, no retries.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use shared::models::Identity;

use super::{
    AuthApi, AuthError, AuthSession, OrderDir, QuerySpec, StoreClient, StoreError, StoreResult,
};

/// HTTP client for the remote store.
///
/// Requests carry the project key plus a bearer token: the signed-in user's
/// access token when present, the anonymous key otherwise. The token slot is
/// shared with the session layer through [`RestStore::set_access_token`].
pub struct RestStore {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: RwLock::new(None),
        }
    }

    /// Install or clear the bearer token used for subsequent requests.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn bearer(&self) -> String {
        self.access_token
            .read()
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    /// Pull the store's error message out of a failed response body.
    async fn rejection(response: Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error_description"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(body);
        debug!(status = %status, message = %message, "store rejected request");
        StoreError::Rejected(format!("{status}: {message}"))
    }

    async fn auth_failure(response: Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error_description")
                    .or_else(|| v.get("msg"))
                    .or_else(|| v.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(body);

        if status == StatusCode::BAD_REQUEST && message.contains("Invalid login") {
            AuthError::InvalidCredentials
        } else if message.contains("already registered") {
            AuthError::EmailTaken
        } else if message.contains("Password") {
            AuthError::WeakPassword
        } else {
            AuthError::Service(format!("{status}: {message}"))
        }
    }

    fn apply_spec(builder: RequestBuilder, spec: &QuerySpec) -> RequestBuilder {
        let mut builder = builder;
        if let Some(columns) = &spec.columns {
            builder = builder.query(&[("select", columns.as_str())]);
        }
        if let Some((column, value)) = &spec.filter {
            builder = builder.query(&[(column.as_str(), format!("eq.{value}"))]);
        }
        if let Some((column, dir)) = &spec.order {
            let suffix = match dir {
                OrderDir::Asc => "asc",
                OrderDir::Desc => "desc",
            };
            builder = builder.query(&[("order", format!("{column}.{suffix}"))]);
        }
        builder
    }

    fn session_from(value: Value) -> Result<AuthSession, AuthError> {
        let access_token = value
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::Service("auth response missing access_token".into()))?
            .to_string();
        let identity: Identity = value
            .get("user")
            .cloned()
            .ok_or_else(|| AuthError::Service("auth response missing user".into()))
            .and_then(|user| {
                serde_json::from_value(user)
                    .map_err(|e| AuthError::Service(format!("malformed user object: {e}")))
            })?;
        Ok(AuthSession {
            access_token,
            identity,
        })
    }
}

#[async_trait]
impl StoreClient for RestStore {
    async fn select(&self, table: &str, spec: QuerySpec) -> StoreResult<Vec<Value>> {
        let builder = Self::apply_spec(self.client.get(self.rest_url(table)), &spec);
        let response = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        let response = self
            .authed(self.client.post(self.rest_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let mut rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if rows.is_empty() {
            return Err(StoreError::Decode("insert returned no row".into()));
        }
        Ok(rows.remove(0))
    }

    async fn update(&self, table: &str, id: &str, fields: Value) -> StoreResult<()> {
        let response = self
            .authed(self.client.patch(self.rest_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&fields)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn count(&self, table: &str) -> StoreResult<u64> {
        let response = self
            .authed(self.client.get(self.rest_url(table)))
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        // Total row count rides in Content-Range as "<range>/<total>".
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| StoreError::Decode("missing count in Content-Range".into()))?;
        Ok(total)
    }
}

#[async_trait]
impl AuthApi for RestStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::auth_failure(response).await);
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;
        Self::session_from(body)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::auth_failure(response).await);
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;
        Self::session_from(body)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::auth_failure(response).await);
        }
        Ok(())
    }
}
