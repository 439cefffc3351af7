// REST client for the booking backend. The backend owns validation, pricing and auth;
// this side only shapes requests, attaches bearer tokens and turns failures into messages.
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Booking, Destination, HotelRoom, Package, User};
use crate::config::ClientConfig;
use crate::draft::CreateBookingRequest;
use crate::session::{AuthTokens, SessionError, TokenStore};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("Unexpected response body: {0}")]
    DecodeError(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl ApiError {
    // The one-line message a form shows when a call fails
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NetworkError(_) => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            ApiError::Timeout(_) => "The server took too long to respond. Please try again.".to_string(),
            ApiError::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            ApiError::ApiResponseError { message, .. } => message.clone(),
            ApiError::DecodeError(_) | ApiError::Session(_) | ApiError::ClientError(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub token_refreshes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// Items the admin console manages through plain CRUD endpoints
pub trait CatalogResource: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn resource_id(&self) -> Option<&str>;
}

impl CatalogResource for Destination {
    const COLLECTION: &'static str = "destinations";

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl CatalogResource for HotelRoom {
    const COLLECTION: &'static str = "hotels";

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl CatalogResource for Package {
    const COLLECTION: &'static str = "packages";

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl CatalogResource for User {
    const COLLECTION: &'static str = "users";

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[async_trait]
pub trait BackendApi: Send + Sync + 'static {
    // Authenticates and stores the issued tokens
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, ApiError>;

    // Exchanges the stored refresh token for a new pair
    async fn refresh(&self) -> Result<AuthTokens, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    async fn current_user(&self) -> Result<User, ApiError>;

    async fn list_destinations(&self) -> Result<Vec<Destination>, ApiError>;

    async fn list_hotel_rooms(&self) -> Result<Vec<HotelRoom>, ApiError>;

    async fn list_packages(&self) -> Result<Vec<Package>, ApiError>;

    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, ApiError>;

    async fn cancel_booking(&self, booking_id: &str) -> Result<Booking, ApiError>;

    async fn my_bookings(&self) -> Result<Vec<Booking>, ApiError>;

    async fn search_suggestions(&self, query: &str) -> Result<Vec<String>, ApiError>;

    fn stats(&self) -> ClientStats;
}

#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub destinations: Vec<Destination>,
    pub hotel_rooms: Vec<HotelRoom>,
    pub packages: Vec<Package>,
}

// Fetches the three listings concurrently; the first failure wins
pub async fn load_catalog<B: BackendApi + ?Sized>(backend: &B) -> Result<CatalogSnapshot, ApiError> {
    let (destinations, hotel_rooms, packages) = futures::try_join!(
        backend.list_destinations(),
        backend.list_hotel_rooms(),
        backend.list_packages()
    )?;
    debug!(
        "Loaded catalog: {} destinations, {} rooms, {} packages",
        destinations.len(),
        hotel_rooms.len(),
        packages.len()
    );
    Ok(CatalogSnapshot {
        destinations,
        hotel_rooms,
        packages,
    })
}

// Pull a readable message out of an error body, falling back to the status reason
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "msg", "detail"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                if !message.trim().is_empty() {
                    return message.trim().to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

struct Call {
    method: Method,
    segments: Vec<String>,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    authorized: bool,
}

impl Call {
    fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
            authorized: true,
        }
    }

    fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn query(mut self, key: &'static str, value: &str) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn anonymous(mut self) -> Self {
        self.authorized = false;
        self
    }
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    timeout_ms: u64,
    tokens: Arc<dyn TokenStore>,
    stats: Mutex<ClientStats>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::ConfigError(format!("invalid base url '{}': {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::ConfigError(format!(
                "base url '{}' cannot carry paths",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        info!("Backend client targeting {}", base_url);
        Ok(Self {
            client,
            base_url,
            timeout_ms: config.timeout_ms,
            tokens,
            stats: Mutex::new(ClientStats::default()),
        })
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // Appends percent-encoded path segments to the base url
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::ClientError("base url cannot carry paths".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout_ms)
        } else {
            ApiError::NetworkError(error.to_string())
        }
    }

    async fn send_once(&self, call: &Call) -> Result<reqwest::Response, ApiError> {
        let segments: Vec<&str> = call.segments.iter().map(String::as_str).collect();
        let url = self.endpoint(&segments)?;
        debug!("{} {}", call.method, url);

        let mut builder = self.client.request(call.method.clone(), url);
        if !call.query.is_empty() {
            builder = builder.query(&call.query);
        }
        if call.authorized {
            if let Some(token) = self.tokens.access_token() {
                builder = builder.bearer_auth(token);
            }
        }
        if let Some(body) = &call.body {
            builder = builder.json(body);
        }

        self.stats.lock().requests_sent += 1;
        builder.send().await.map_err(|e| {
            self.stats.lock().requests_failed += 1;
            self.map_transport_error(e)
        })
    }

    // A 401 only means an expired session on authorized calls; anonymous calls keep the backend's message
    async fn check_status(
        &self,
        response: reqwest::Response,
        authorized: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            self.stats.lock().requests_succeeded += 1;
            return Ok(response);
        }

        self.stats.lock().requests_failed += 1;
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(status, &body);
        warn!("Backend answered {}: {}", status.as_u16(), message);

        if status == StatusCode::UNAUTHORIZED && authorized {
            return Err(ApiError::Unauthorized(message));
        }
        Err(ApiError::ApiResponseError {
            status_code: status.as_u16(),
            message,
        })
    }

    async fn refresh_tokens(&self) -> Result<AuthTokens, ApiError> {
        let refresh_token = match self.tokens.refresh_token() {
            Some(token) => token,
            None => return Err(ApiError::Unauthorized("no refresh token stored".to_string())),
        };

        let call = Call::new(Method::POST, &["auth", "refresh"])
            .body(json!({ "refreshToken": refresh_token }))
            .anonymous();

        let outcome: Result<AuthTokens, ApiError> = async {
            let response = self.send_once(&call).await?;
            let response = self.check_status(response, false).await?;
            response
                .json::<AuthTokens>()
                .await
                .map_err(|e| ApiError::DecodeError(e.to_string()))
        }
        .await;

        match outcome {
            Ok(tokens) => {
                self.tokens.store(&tokens)?;
                self.stats.lock().token_refreshes += 1;
                info!("Refreshed access token");
                Ok(tokens)
            }
            Err(e) => {
                warn!("Token refresh failed, clearing session: {e}");
                self.tokens.clear()?;
                Err(ApiError::Unauthorized(e.to_string()))
            }
        }
    }

    // Sends a call; an authorized call answered with 401 is replayed once after a refresh
    async fn execute(&self, call: Call) -> Result<reqwest::Response, ApiError> {
        let mut response = self.send_once(&call).await?;

        if response.status() == StatusCode::UNAUTHORIZED && call.authorized {
            self.stats.lock().requests_failed += 1;
            debug!("Access token rejected, attempting refresh");
            self.refresh_tokens().await?;
            response = self.send_once(&call).await?;
        }

        self.check_status(response, call.authorized).await
    }

    async fn fetch<T: DeserializeOwned>(&self, call: Call) -> Result<T, ApiError> {
        let response = self.execute(call).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DecodeError(e.to_string()))
    }

    pub async fn list<T: CatalogResource>(&self) -> Result<Vec<T>, ApiError> {
        self.fetch(Call::new(Method::GET, &[T::COLLECTION])).await
    }

    pub async fn create<T: CatalogResource>(&self, item: &T) -> Result<T, ApiError> {
        let body = serde_json::to_value(item).map_err(|e| ApiError::ClientError(e.to_string()))?;
        let created: T = self
            .fetch(Call::new(Method::POST, &[T::COLLECTION]).body(body))
            .await?;
        info!("Created {} {:?}", T::COLLECTION, created.resource_id());
        Ok(created)
    }

    pub async fn update<T: CatalogResource>(&self, item: &T) -> Result<T, ApiError> {
        let id = item
            .resource_id()
            .ok_or_else(|| ApiError::ClientError(format!("cannot update unsaved {}", T::COLLECTION)))?;
        let body = serde_json::to_value(item).map_err(|e| ApiError::ClientError(e.to_string()))?;
        self.fetch(Call::new(Method::PUT, &[T::COLLECTION, id]).body(body))
            .await
    }

    pub async fn delete<T: CatalogResource>(&self, id: &str) -> Result<(), ApiError> {
        self.execute(Call::new(Method::DELETE, &[T::COLLECTION, id]))
            .await?;
        info!("Deleted {} {}", T::COLLECTION, id);
        Ok(())
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, ApiError> {
        let body = serde_json::to_value(LoginRequest { email, password })
            .map_err(|e| ApiError::ClientError(e.to_string()))?;
        let tokens: AuthTokens = self
            .fetch(Call::new(Method::POST, &["auth", "login"]).body(body).anonymous())
            .await?;
        self.tokens.store(&tokens)?;
        info!("Logged in as {}", email);
        Ok(tokens)
    }

    async fn refresh(&self) -> Result<AuthTokens, ApiError> {
        self.refresh_tokens().await
    }

    // Local tokens are always dropped; a failed remote logout is only logged
    async fn logout(&self) -> Result<(), ApiError> {
        let refresh_token = self.tokens.refresh_token().unwrap_or_default();
        let call = Call::new(Method::POST, &["auth", "logout"])
            .body(json!({ "refreshToken": refresh_token }));
        let outcome = match self.send_once(&call).await {
            Ok(response) => self.check_status(response, true).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            warn!("Remote logout failed: {e}");
        }
        self.tokens.clear()?;
        info!("Logged out");
        Ok(())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch(Call::new(Method::GET, &["auth", "me"])).await
    }

    async fn list_destinations(&self) -> Result<Vec<Destination>, ApiError> {
        self.list::<Destination>().await
    }

    async fn list_hotel_rooms(&self) -> Result<Vec<HotelRoom>, ApiError> {
        self.list::<HotelRoom>().await
    }

    async fn list_packages(&self) -> Result<Vec<Package>, ApiError> {
        self.list::<Package>().await
    }

    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::ClientError(e.to_string()))?;
        self.fetch(Call::new(Method::POST, &["bookings"]).body(body))
            .await
    }

    async fn cancel_booking(&self, booking_id: &str) -> Result<Booking, ApiError> {
        self.fetch(Call::new(Method::PATCH, &["bookings", booking_id, "cancel"]))
            .await
    }

    async fn my_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        self.fetch(Call::new(Method::GET, &["bookings", "mine"])).await
    }

    async fn search_suggestions(&self, query: &str) -> Result<Vec<String>, ApiError> {
        self.fetch(Call::new(Method::GET, &["search", "suggestions"]).query("q", query))
            .await
    }

    fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }
}


// Minimal scripted HTTP/1.1 server: one canned response per accepted connection
#[cfg(test)]
mod stub_server {
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub request_line: String,
        pub authorization: Option<String>,
        pub body: String,
    }

    pub async fn start(script: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Recorded>>>) {
        start_delayed(script, 0).await
    }

    // Holds every response back for `delay_ms` after reading the request
    pub async fn start_delayed(
        script: Vec<(u16, &'static str)>,
        delay_ms: u64,
    ) -> (String, Arc<Mutex<Vec<Recorded>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&recorded);

        tokio::spawn(async move {
            for (status, body) in script {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };

                let mut raw = Vec::new();
                let mut buf = [0u8; 4096];
                let header_end = loop {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break None;
                    }
                    raw.extend_from_slice(&buf[..n]);
                    if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                        break Some(pos + 4);
                    }
                };
                let Some(header_end) = header_end else { continue };

                let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
                let content_length = head
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                while raw.len() < header_end + content_length {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    raw.extend_from_slice(&buf[..n]);
                }

                let authorization = head.lines().find_map(|l| {
                    l.split_once(':')
                        .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
                        .map(|(_, v)| v.trim().to_string())
                });
                log.lock().await.push(Recorded {
                    request_line: head.lines().next().unwrap_or_default().to_string(),
                    authorization,
                    body: String::from_utf8_lossy(&raw[header_end..]).to_string(),
                });

                if delay_ms > 0 {
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                }
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/api", addr), recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;

    fn backend(base_url: &str, tokens: Arc<dyn TokenStore>) -> HttpBackend {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            timeout_ms: 2000,
            ..Default::default()
        };
        HttpBackend::new(&config, tokens).unwrap()
    }

    fn logged_in_store() -> Arc<MemoryTokenStore> {
        let store = Arc::new(MemoryTokenStore::new());
        store
            .store(&AuthTokens {
                access_token: "old-access".to_string(),
                refresh_token: "old-refresh".to_string(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = backend("https://api.example.com/api/", Arc::new(MemoryTokenStore::new()));
        let url = client.endpoint(&["destinations", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/destinations/a%20b%2Fc");

        let client = backend("https://api.example.com", Arc::new(MemoryTokenStore::new()));
        let url = client.endpoint(&["auth", "login"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/auth/login");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let config = ClientConfig {
            base_url: "mailto:someone@example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HttpBackend::new(&config, Arc::new(MemoryTokenStore::new())),
            Err(ClientError::ConfigError(_))
        ));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(StatusCode::CONFLICT, r#"{"message": "Dates already booked"}"#),
            "Dates already booked"
        );
        assert_eq!(
            extract_error_message(StatusCode::BAD_REQUEST, r#"{"error": "Invalid tour type"}"#),
            "Invalid tour type"
        );
        assert_eq!(extract_error_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(extract_error_message(StatusCode::NOT_FOUND, ""), "Not Found");
        assert_eq!(
            extract_error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_user_messages() {
        let conflict = ApiError::ApiResponseError {
            status_code: 409,
            message: "Dates already booked".to_string(),
        };
        assert_eq!(conflict.user_message(), "Dates already booked");
        assert!(ApiError::Timeout(10).user_message().contains("too long"));
        assert!(ApiError::Unauthorized(String::new()).user_message().contains("log in"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = backend(&format!("http://{}", addr), Arc::new(MemoryTokenStore::new()));
        let result = client.list_destinations().await;
        assert!(matches!(result, Err(ApiError::NetworkError(_))));

        let stats = client.stats();
        assert_eq!(stats.requests_sent, 1);
        assert_eq!(stats.requests_failed, 1);
    }

    #[tokio::test]
    async fn test_login_stores_tokens() {
        let (url, recorded) = stub_server::start(vec![(
            200,
            r#"{"accessToken": "a1", "refreshToken": "r1"}"#,
        )])
        .await;
        let store = Arc::new(MemoryTokenStore::new());
        let client = backend(&url, store.clone());

        let tokens = client.login("maria@example.com", "secret").await.unwrap();
        assert_eq!(tokens.access_token, "a1");
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));

        let requests = recorded.lock().await;
        assert!(requests[0].request_line.starts_with("POST /api/auth/login"));
        assert!(requests[0].authorization.is_none());
        assert!(requests[0].body.contains("maria@example.com"));
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_backend_message() {
        let (url, recorded) = stub_server::start(vec![(
            401,
            r#"{"message": "Invalid email or password"}"#,
        )])
        .await;
        let store = Arc::new(MemoryTokenStore::new());
        let client = backend(&url, store.clone());

        let err = client.login("maria@example.com", "wrong").await.unwrap_err();
        match &err {
            ApiError::ApiResponseError { status_code, message } => {
                assert_eq!(*status_code, 401);
                assert_eq!(message, "Invalid email or password");
            }
            other => panic!("Expected API response error, got {other:?}"),
        }
        assert_eq!(err.user_message(), "Invalid email or password");
        assert!(!store.is_logged_in());
        assert_eq!(recorded.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_logout_counts_failure_and_clears_tokens() {
        let (url, recorded) = stub_server::start(vec![(500, r#"{"message": "boom"}"#)]).await;
        let store = logged_in_store();
        let client = backend(&url, store.clone());

        client.logout().await.unwrap();
        assert!(!store.is_logged_in());

        let stats = client.stats();
        assert_eq!(stats.requests_sent, 1);
        assert_eq!(stats.requests_succeeded, 0);
        assert_eq!(stats.requests_failed, 1);

        let requests = recorded.lock().await;
        assert!(requests[0].request_line.starts_with("POST /api/auth/logout"));
        assert!(requests[0].body.contains("old-refresh"));
    }

    #[tokio::test]
    async fn test_logout_clears_tokens_when_backend_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = logged_in_store();
        let client = backend(&format!("http://{}", addr), store.clone());
        client.logout().await.unwrap();
        assert!(!store.is_logged_in());
        assert_eq!(client.stats().requests_failed, 1);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let (url, _recorded) = stub_server::start_delayed(vec![(200, "[]")], 1000).await;
        let config = ClientConfig {
            base_url: url,
            timeout_ms: 100,
            ..Default::default()
        };
        let client = HttpBackend::new(&config, Arc::new(MemoryTokenStore::new())).unwrap();

        let result = client.list_packages().await;
        assert!(matches!(result, Err(ApiError::Timeout(100))));
        assert_eq!(client.stats().requests_failed, 1);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_skips_network() {
        let client = backend("http://127.0.0.1:1", Arc::new(MemoryTokenStore::new()));
        let result = client.refresh().await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
        assert_eq!(client.stats().requests_sent, 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_request_replayed() {
        let (url, recorded) = stub_server::start(vec![
            (401, r#"{"message": "jwt expired"}"#),
            (200, r#"{"accessToken": "new-access", "refreshToken": "new-refresh"}"#),
            (200, r#"[{"name": "Kawasan Falls", "location": "Cebu", "budget": 12500}]"#),
        ])
        .await;
        let store = logged_in_store();
        let client = backend(&url, store.clone());

        let destinations = client.list_destinations().await.unwrap();
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations[0].budget, 12500.0);
        assert_eq!(store.access_token().as_deref(), Some("new-access"));

        let requests = recorded.lock().await;
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer old-access"));
        assert!(requests[1].request_line.starts_with("POST /api/auth/refresh"));
        assert!(requests[1].body.contains("old-refresh"));
        assert_eq!(requests[2].authorization.as_deref(), Some("Bearer new-access"));

        let stats = client.stats();
        assert_eq!(stats.token_refreshes, 1);
        assert_eq!(stats.requests_sent, 3);
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let (url, _recorded) = stub_server::start(vec![
            (401, r#"{"message": "jwt expired"}"#),
            (403, r#"{"message": "refresh token revoked"}"#),
        ])
        .await;
        let store = logged_in_store();
        let client = backend(&url, store.clone());

        let result = client.my_bookings().await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn test_error_status_carries_backend_message() {
        let (url, recorded) = stub_server::start(vec![(
            409,
            r#"{"message": "Selected dates are no longer available"}"#,
        )])
        .await;
        let client = backend(&url, logged_in_store());

        let err = client.cancel_booking("bk 1").await.unwrap_err();
        match &err {
            ApiError::ApiResponseError { status_code, message } => {
                assert_eq!(*status_code, 409);
                assert_eq!(message, "Selected dates are no longer available");
            }
            other => panic!("Expected API response error, got {other:?}"),
        }
        assert_eq!(err.user_message(), "Selected dates are no longer available");

        let requests = recorded.lock().await;
        assert!(requests[0].request_line.starts_with("PATCH /api/bookings/bk%201/cancel"));
    }

    #[tokio::test]
    async fn test_suggestions_send_query_parameter() {
        let (url, recorded) = stub_server::start(vec![(200, r#"["Kawasan Falls", "Kalanggaman"]"#)]).await;
        let client = backend(&url, Arc::new(MemoryTokenStore::new()));

        let suggestions = client.search_suggestions("ka wa").await.unwrap();
        assert_eq!(suggestions.len(), 2);

        let requests = recorded.lock().await;
        assert!(requests[0].request_line.starts_with("GET /api/search/suggestions?q=ka+wa"));
    }

    #[tokio::test]
    async fn test_admin_update_requires_id() {
        let client = backend("http://127.0.0.1:1", Arc::new(MemoryTokenStore::new()));
        let unsaved = mock_backend::sample_destination();
        let unsaved = Destination { id: None, ..unsaved };
        assert!(matches!(client.update(&unsaved).await, Err(ApiError::ClientError(_))));
        assert_eq!(client.stats().requests_sent, 0);
    }

    #[tokio::test]
    async fn test_admin_delete_user() {
        let (url, recorded) = stub_server::start(vec![(204, "")]).await;
        let client = backend(&url, logged_in_store());

        client.delete::<User>("u-9").await.unwrap();
        let requests = recorded.lock().await;
        assert!(requests[0].request_line.starts_with("DELETE /api/users/u-9"));
    }

    #[tokio::test]
    async fn test_load_catalog_joins_listings() {
        let mut mock = mock_backend::MockBackend::new();
        mock.destinations = vec![mock_backend::sample_destination()];
        let snapshot = load_catalog(&mock).await.unwrap();
        assert_eq!(snapshot.destinations.len(), 1);
        assert!(snapshot.packages.is_empty());
        assert_eq!(mock.request_count(), 3);

        mock.fail_next_requests(1);
        assert!(load_catalog(&mock).await.is_err());
    }
}
