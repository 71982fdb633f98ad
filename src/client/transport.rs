use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{cookie::Jar, Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    client::{
        coordinator::SessionRefresher,
        error::ClientError,
        store::{UserAction, UserStore},
    },
    responses::{JsonResponse, ResponseStatus},
};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The cookie-carrying HTTP half of the client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
    users: UserStore,
}

impl HttpTransport {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: &str, jar: Arc<Jar>, users: UserStore) -> Result<Self, ClientError> {
        // A trailing slash keeps `join` from replacing the last path segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|err| ClientError::Validation(format!("invalid base URL {base_url}: {err}")))?;

        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            jar,
            base_url,
            users,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::Validation(format!("invalid path {path}: {err}")))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Reads the `{status, data}` envelope, turning anything but a success
    /// into a [`ClientError`].
    pub async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::from_status(status, &body));
        }

        let envelope: JsonResponse<T> = serde_json::from_str(&body)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;
        match envelope.status {
            ResponseStatus::Success => Ok(envelope.data),
            _ => Err(ClientError::InvalidResponse(format!(
                "status {status} carried a non-success envelope"
            ))),
        }
    }
}

#[async_trait]
impl SessionRefresher for HttpTransport {
    async fn refresh_session(&self) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("auth/refresh-token")?)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("access cookie refreshed");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(status, &body))
    }

    async fn end_session(&self) {
        self.users.dispatch(UserAction::LoggedOut);

        let url = match self.url("auth/logout") {
            Ok(url) => url,
            Err(err) => {
                warn!(%err, "cannot build logout URL");
                return;
            }
        };
        if let Err(err) = self.client.post(url).send().await {
            warn!(%err, "best-effort logout failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_under_the_api_root() {
        let transport = HttpTransport::new(
            "http://localhost:5000/api",
            Arc::new(Jar::default()),
            UserStore::default(),
        )
        .unwrap();

        assert_eq!(
            transport.url("/auth/refresh-token").unwrap().as_str(),
            "http://localhost:5000/api/auth/refresh-token"
        );
        assert_eq!(
            transport.url("cart").unwrap().as_str(),
            "http://localhost:5000/api/cart"
        );
    }

    #[test]
    fn rejects_garbage_base_url() {
        let result = HttpTransport::new("not a url", Arc::new(Jar::default()), UserStore::default());
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }
}
