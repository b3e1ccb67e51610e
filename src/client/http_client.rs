use std::time::Duration;

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::auth::session::AuthSession;
use crate::client::interceptor::{on_response, with_credentials, ResponseVerdict};
use crate::client::request::{ApiRequest, ApiResponse, RequestAttempt};
use crate::config::settings::ApiConfig;
use crate::errors::error::{body_message, ClientError};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;

/// JSON client for the classroom backend. Every call is authenticated through
/// the [`AuthSession`] it was built with.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: AuthSession,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: AuthSession) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::setup(format!("failed to build HTTP client: {e}")))?;

        Url::parse(&config.base_url)
            .map_err(|e| ClientError::setup(format!("invalid base url '{}': {e}", config.base_url)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            session,
        })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ClientError> {
        self.execute(ApiRequest::new(Method::GET, path, None)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::new(Method::POST, path, Some(to_body(body)?))).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::new(Method::PUT, path, Some(to_body(body)?))).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ClientError> {
        self.execute(ApiRequest::new(Method::DELETE, path, None)).await
    }

    /// Run one logical request through the interceptors and decode the body.
    /// An empty body decodes as JSON `null`.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<ApiResponse<T>, ClientError> {
        let metrics = get_metrics();
        let method = request.method.as_str().to_owned();
        let start = get_instant();
        metrics.requests.with_label_values(&[method.as_str()]).inc();

        let result = self.dispatch(&request).await.and_then(|(status, url, bytes)| {
            decode::<T>(&url, &bytes).map(|data| ApiResponse { status, data })
        });

        metrics
            .request_duration
            .with_label_values(&[method.as_str()])
            .observe(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            metrics.request_failures.with_label_values(&[err.kind()]).inc();
        }
        result
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<(StatusCode, String, Vec<u8>), ClientError> {
        let url = self.resolve_url(&request.path)?;
        let mut attempt = RequestAttempt::First;
        let mut token = self.session.authorize().await;

        loop {
            let response = self.send(request, &url, token.as_deref()).await?;
            let status = response.status();

            match on_response(status, attempt) {
                ResponseVerdict::Accept => {
                    let bytes = read_bytes(&url, response).await?;
                    debug!(method = %request.method, url = %url, status = status.as_u16(), "request succeeded");
                    return Ok((status, url.to_string(), bytes));
                }
                ResponseVerdict::RefreshAndRetry => {
                    attempt = RequestAttempt::Retried;
                    info!(method = %request.method, url = %url, "401 received, refreshing credentials");
                    match self.session.refresh().await {
                        Some(fresh) => {
                            get_metrics().auth_retries.inc();
                            token = Some(fresh);
                        }
                        None => {
                            let body = read_error_body(response).await;
                            return Err(self.auth_failed(request, &url, status, body));
                        }
                    }
                }
                ResponseVerdict::AuthFailed => {
                    let body = read_error_body(response).await;
                    return Err(self.auth_failed(request, &url, status, body));
                }
                ResponseVerdict::Reject => {
                    let body = read_error_body(response).await;
                    let message = body_message(&body);
                    error!(method = %request.method, url = %url, status = status.as_u16(), message = %message, "request failed");
                    return Err(ClientError::Server { status, url: url.to_string(), message, body });
                }
            }
        }
    }

    async fn send(&self, request: &ApiRequest, url: &Url, token: Option<&str>) -> Result<Response, ClientError> {
        let mut builder = with_credentials(self.http.request(request.method.clone(), url.clone()), token);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|source| {
            if source.is_builder() {
                error!(method = %request.method, url = %url, error = %source, "request setup failed");
                ClientError::setup(source.to_string())
            } else {
                error!(method = %request.method, url = %url, error = %source, "no response received");
                ClientError::Network { url: url.to_string(), source }
            }
        })
    }

    fn auth_failed(&self, request: &ApiRequest, url: &Url, status: StatusCode, body: Value) -> ClientError {
        warn!(method = %request.method, url = %url, status = status.as_u16(), "authorization could not be recovered");
        self.session.expire_session(request.method.as_str(), url.as_str());
        ClientError::AuthFailed { status, url: url.to_string(), body }
    }

    /// Absolute URLs pass through, anything else is appended to the base URL.
    fn resolve_url(&self, path: &str) -> Result<Url, ClientError> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_owned()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };
        Url::parse(&raw).map_err(|e| {
            error!(path, error = %e, "request setup failed");
            ClientError::setup(format!("invalid request url '{raw}': {e}"))
        })
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|e| {
        error!(error = %e, "request body serialization failed");
        ClientError::setup(format!("failed to serialize request body: {e}"))
    })
}

async fn read_bytes(url: &Url, response: Response) -> Result<Vec<u8>, ClientError> {
    response.bytes().await.map(|bytes| bytes.to_vec()).map_err(|source| {
        error!(url = %url, error = %source, "response body could not be read");
        ClientError::Network { url: url.to_string(), source }
    })
}

/// Error bodies are JSON when the backend structured them, text otherwise.
async fn read_error_body(response: Response) -> Value {
    match response.bytes().await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Value::Null,
        Ok(bytes) => serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
        Err(err) => {
            debug!(error = %err, "error body could not be read");
            Value::Null
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T, ClientError> {
    let decoded = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(bytes)
    };
    decoded.map_err(|source| {
        error!(url, error = %source, "response body could not be decoded");
        ClientError::Decode { url: url.to_owned(), source }
    })
}

