use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Operation,
    error::ApiError,
    protocol::{Payload, Profile},
};
use url::Url;

use crate::{
    config::ClientSettings, dashboard::ProfileSource, error::ClientError,
    operations::OperationDispatcher,
};

const SIGN_UP_PATH: &str = "auth/signup";
const CHANGE_PASSWORD_PATH: &str = "auth/password";
const PROFILE_PATH: &str = "user/profile";

#[derive(Debug, Clone)]
pub struct AuthApiClient {
    http: Client,
    base: Url,
}

impl AuthApiClient {
    pub fn new(api_base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(api_base_url).map_err(|source| ClientError::InvalidUrl {
            url: api_base_url.to_string(),
            source,
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        Self::new(&settings.api_base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn sign_up(&self, payload: &Payload) -> Result<(), ClientError> {
        self.post(SIGN_UP_PATH, payload).await
    }

    pub async fn change_password(&self, payload: &Payload) -> Result<(), ClientError> {
        self.post(CHANGE_PASSWORD_PATH, payload).await
    }

    pub async fn retrieve_profile(&self) -> Result<Profile, ClientError> {
        let endpoint = self.endpoint(PROFILE_PATH)?;
        let res = self
            .http
            .get(endpoint.clone())
            .send()
            .await
            .map_err(|source| transport(&endpoint, source))?;
        decode(&endpoint, check_status(&endpoint, res).await?).await
    }

    pub fn dispatcher(self: &Arc<Self>) -> OperationDispatcher {
        let sign_up = Arc::clone(self);
        let change_password = Arc::clone(self);
        OperationDispatcher::new()
            .with(Operation::SignUp, move |payload| {
                let client = Arc::clone(&sign_up);
                async move { Ok(client.sign_up(&payload).await?) }
            })
            .with(Operation::ChangeUserPassword, move |payload| {
                let client = Arc::clone(&change_password);
                async move { Ok(client.change_password(&payload).await?) }
            })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(|source| ClientError::InvalidUrl {
            url: format!("{}{path}", self.base),
            source,
        })
    }

    async fn post(&self, path: &str, payload: &Payload) -> Result<(), ClientError> {
        let endpoint = self.endpoint(path)?;
        tracing::debug!(%endpoint, "posting form payload");
        let res = self
            .http
            .post(endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|source| transport(&endpoint, source))?;
        check_status(&endpoint, res).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileSource for AuthApiClient {
    async fn retrieve_profile(&self) -> anyhow::Result<Profile> {
        Ok(AuthApiClient::retrieve_profile(self).await?)
    }
}

fn transport(endpoint: &Url, source: reqwest::Error) -> ClientError {
    ClientError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}

async fn check_status(endpoint: &Url, res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let endpoint = endpoint.to_string();
    let status = status.as_u16();
    match res.json::<ApiError>().await {
        Ok(body) => Err(ClientError::Api {
            endpoint,
            status,
            source: body,
        }),
        Err(_) => Err(ClientError::Status { endpoint, status }),
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &Url, res: Response) -> Result<T, ClientError> {
    res.json::<T>()
        .await
        .map_err(|source| transport(endpoint, source))
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
