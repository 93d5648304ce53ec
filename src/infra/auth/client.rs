use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::services::auth_api::{AuthApi, Session};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    role: String,
}

#[derive(Serialize)]
struct SignupStartRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct SignupStartResponse {
    token: String,
}

#[derive(Serialize)]
struct SignupCompleteRequest<'a> {
    token: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SignupCompleteResponse {
    #[serde(default)]
    success: bool,
}

/// Error body returned by the service on 4xx/5xx.
#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

pub struct HttpAuthClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send {} request: {}", path, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(anyhow::anyhow!("{} failed with status {}: {}", path, status, message));
        }

        response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse {} response: {}", path, e))
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response: LoginResponse = self.post("login", &LoginRequest { email, password }).await?;

        Ok(Session {
            token: response.token,
            role: response.role,
        })
    }

    async fn signup_start(&self, email: &str) -> Result<String> {
        let response: SignupStartResponse = self
            .post("signup/start", &SignupStartRequest { email })
            .await?;

        Ok(response.token)
    }

    async fn signup_complete(&self, token: &str, password: &str) -> Result<()> {
        let response: SignupCompleteResponse = self
            .post("signup/complete", &SignupCompleteRequest { token, password })
            .await?;

        if !response.success {
            return Err(anyhow::anyhow!("signup/complete did not report success"));
        }
        Ok(())
    }
}
