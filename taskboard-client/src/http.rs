/// Shared HTTP core
///
/// Every gateway sends its requests through [`ApiClient`], which applies the
/// cross-cutting rules in one place:
///
/// - `Authorization: Bearer <token>` read from persisted storage on every
///   request, when a token exists
/// - the CSRF cookie (`csrfToken` by default) mirrored into its header
///   (`X-CSRF-TOKEN` by default)
/// - `X-Requested-With: XMLHttpRequest` and a cookie jar on every request
/// - a blanket timeout from configuration
/// - any 401 clears the session through [`SessionStore::force_logout`] and
///   fails with [`ClientError::Unauthorized`]
///
/// The client never writes the persisted token itself.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use taskboard_shared::session::SessionStore;

use crate::config::{Config, CsrfConfig};
use crate::error::{ClientError, ClientResult};

/// HTTP client bound to one backend and one session
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
    csrf: CsrfConfig,
    /// Token taken from a CSRF response body, used when the jar has none
    csrf_fallback: Arc<RwLock<Option<String>>>,
    session: SessionStore,
}

impl ApiClient {
    /// Builds the client from configuration
    pub fn new(config: &Config, session: SessionStore) -> ClientResult<Self> {
        let base_url = config
            .base_url()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            jar,
            csrf: config.csrf.clone(),
            csrf_fallback: Arc::new(RwLock::new(None)),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current CSRF token: the jar's cookie, else one remembered from a body
    pub fn csrf_token(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|header| header.to_str().ok().map(str::to_string))
            .and_then(|header| cookie_value(&header, &self.csrf.cookie_name))
            .or_else(|| {
                self.csrf_fallback
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
    }

    /// Remembers a CSRF token delivered in a response body
    pub fn remember_csrf_token(&self, token: impl Into<String>) {
        *self
            .csrf_fallback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("Invalid request path {}: {}", path, e)))
    }

    /// Starts a request with the bearer and CSRF headers applied
    pub fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.url(path)?;
        let mut builder = self.http.request(method, url);

        if let Some(token) = self.session.persisted_token()? {
            builder = builder.bearer_auth(token);
        }

        if let Some(csrf) = self.csrf_token() {
            builder = builder.header(self.csrf.header_name.as_str(), csrf);
        }

        Ok(builder)
    }

    /// Sends a request and classifies any non-success status
    pub async fn execute(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_status(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), path = %url, error = %err, "Request failed");

        if let ClientError::Unauthorized(reason) = &err {
            self.session.force_logout(reason.clone()).await;
        }

        Err(err)
    }

    /// Sends a request and decodes a JSON body
    pub async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = self.execute(builder).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ClientError::from)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.fetch(self.request(Method::GET, path)?).await
    }

    /// Sends a JSON body and decodes the JSON response
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(self.request(method, path)?.json(body)).await
    }

    /// Sends an optional JSON body and ignores the response body
    pub async fn send_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder).await.map(|_| ())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Value of cookie `name` in a `Cookie` header (`a=1; b=2`)
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
