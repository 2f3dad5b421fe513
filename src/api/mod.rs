// HTTP collaborator for the remote tunnel service.
// Everything above this module talks to the service through `TunnelApi`.

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::TunnelServiceClient;
pub use types::*;

use std::future::Future;

// Error types for tunnel service calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

// Result type for tunnel service calls
pub type ApiResult<T> = Result<T, ApiError>;

/// The remote tunnel service as seen by the dashboard.
pub trait TunnelApi: Send + Sync + 'static {
    fn login(&self, password: &str) -> impl Future<Output = ApiResult<()>> + Send;

    fn logout(&self) -> impl Future<Output = ApiResult<()>> + Send;

    fn status(&self) -> impl Future<Output = ApiResult<StatusPayload>> + Send;

    /// Captured inspector traffic, oldest entry first.
    fn inspect(&self) -> impl Future<Output = ApiResult<Vec<InspectLogEntry>>> + Send;

    fn create_tunnel(
        &self,
        request: &CreateTunnelRequest,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn edit_tunnel(&self, request: &EditTunnelRequest)
        -> impl Future<Output = ApiResult<()>> + Send;

    fn delete_tunnels(
        &self,
        request: &DeleteTunnelRequest,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn create_domain(
        &self,
        request: &CreateDomainRequest,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn delete_domain(&self, domain: &str) -> impl Future<Output = ApiResult<()>> + Send;

    fn replay(&self, id: &str) -> impl Future<Output = ApiResult<ReplayResponse>> + Send;
}
