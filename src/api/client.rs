use crate::api::types::{
    CreateDomainRequest, CreateTunnelRequest, DeleteDomainRequest, DeleteTunnelRequest,
    EditTunnelRequest, InspectLogEntry, LoginRequest, ReplayRequest, ReplayResponse,
    StatusPayload,
};
use crate::api::{ApiError, ApiResult, TunnelApi};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

// Configuration constants
pub const DEFAULT_API_BASE: &str = "http://localhost:10000/api";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cookie-session HTTP client for the tunnel service dashboard API.
pub struct TunnelServiceClient {
    client: Client,
    base_url: String,
}

impl TunnelServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        // The service authenticates with a session_id cookie set by /login
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> ApiResult<Response> {
        let url = self.endpoint(path);
        log::debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        check_status(response).await
    }

    async fn send_for_json<T, R>(&self, method: Method, path: &str, body: Option<&T>) -> ApiResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(method, path, body).await?;
        response
            .json::<R>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl TunnelApi for TunnelServiceClient {
    async fn login(&self, password: &str) -> ApiResult<()> {
        let body = LoginRequest {
            password: password.to_string(),
        };

        match self.send(Method::POST, "login", Some(&body)).await {
            Ok(_) => {
                log::info!("Dashboard login accepted");
                Ok(())
            }
            // Any rejection of the password is an auth failure, not a server fault
            Err(ApiError::Server { status, .. }) => {
                log::warn!("Dashboard login rejected with status {}", status);
                Err(ApiError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }

    async fn logout(&self) -> ApiResult<()> {
        self.send::<()>(Method::GET, "logout", None).await?;
        Ok(())
    }

    async fn status(&self) -> ApiResult<StatusPayload> {
        self.send_for_json::<(), _>(Method::GET, "status", None).await
    }

    async fn inspect(&self) -> ApiResult<Vec<InspectLogEntry>> {
        let entries: Option<Vec<InspectLogEntry>> =
            self.send_for_json::<(), _>(Method::GET, "inspect", None).await?;
        Ok(entries.unwrap_or_default())
    }

    async fn create_tunnel(&self, request: &CreateTunnelRequest) -> ApiResult<()> {
        log::info!(
            "Creating {} tunnel :{} -> {}",
            request.protocol,
            request.public_port,
            request.local_port
        );
        self.send(Method::POST, "tunnels", Some(request)).await?;
        Ok(())
    }

    async fn edit_tunnel(&self, request: &EditTunnelRequest) -> ApiResult<()> {
        log::info!(
            "Retargeting tunnel :{} -> {}",
            request.public_port,
            request.local_port
        );
        self.send(Method::POST, "tunnels/edit", Some(request)).await?;
        Ok(())
    }

    async fn delete_tunnels(&self, request: &DeleteTunnelRequest) -> ApiResult<()> {
        log::info!("Deleting {} tunnel(s)", request.len());
        self.send(Method::DELETE, "tunnels", Some(request)).await?;
        Ok(())
    }

    async fn create_domain(&self, request: &CreateDomainRequest) -> ApiResult<()> {
        log::info!(
            "Mapping domain {} -> :{} ({})",
            request.domain,
            request.public_port,
            request.mode.label()
        );
        self.send(Method::POST, "domains", Some(request)).await?;
        Ok(())
    }

    async fn delete_domain(&self, domain: &str) -> ApiResult<()> {
        let body = DeleteDomainRequest {
            domain: domain.to_string(),
        };
        log::info!("Unmapping domain {}", domain);
        self.send(Method::DELETE, "domains", Some(&body)).await?;
        Ok(())
    }

    async fn replay(&self, id: &str) -> ApiResult<ReplayResponse> {
        let body = ReplayRequest { id: id.to_string() };
        self.send_for_json(Method::POST, "replay", Some(&body)).await
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    log::error!("Request failed with status {}: {}", status, error_text.trim());
    Err(ApiError::Server {
        status: status.as_u16(),
        message: strip_line_breaks(&error_text),
    })
}

/// Plain-text error bodies are shown on a single line.
pub fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}
