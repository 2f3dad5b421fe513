// In-memory tunnel service used by the dashboard tests.

use crate::api::types::{
    CreateDomainRequest, CreateTunnelRequest, DeleteTunnelRequest, EditTunnelRequest,
    InspectLogEntry, ReplayResponse, StatsPayload, StatusPayload,
};
use crate::api::{ApiError, ApiResult, TunnelApi};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Login(String),
    Logout,
    Status,
    Inspect,
    CreateTunnel(CreateTunnelRequest),
    EditTunnel(EditTunnelRequest),
    DeleteTunnels(DeleteTunnelRequest),
    CreateDomain(CreateDomainRequest),
    DeleteDomain(String),
    Replay(String),
}

pub struct FakeApi {
    calls: Mutex<Vec<ApiCall>>,
    status: Mutex<ApiResult<StatusPayload>>,
    queued_status: Mutex<VecDeque<ApiResult<StatusPayload>>>,
    inspect: Mutex<ApiResult<Vec<InspectLogEntry>>>,
    password: String,
    mutation_error: Mutex<Option<ApiError>>,
    failing_delete_call: Mutex<Option<usize>>,
    delete_issued_at: Mutex<Vec<Instant>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            status: Mutex::new(Ok(status_with_tunnels(&[]))),
            queued_status: Mutex::new(VecDeque::new()),
            inspect: Mutex::new(Ok(Vec::new())),
            password: "hunter2".to_string(),
            mutation_error: Mutex::new(None),
            failing_delete_call: Mutex::new(None),
            delete_issued_at: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tunnels(ports: &[u16]) -> Self {
        let api = Self::new();
        api.set_status(Ok(status_with_tunnels(ports)));
        api
    }

    pub fn set_status(&self, status: ApiResult<StatusPayload>) {
        *self.status.lock().unwrap() = status;
    }

    /// Served once, ahead of the standing status response.
    pub fn queue_status(&self, status: ApiResult<StatusPayload>) {
        self.queued_status.lock().unwrap().push_back(status);
    }

    pub fn set_inspect(&self, entries: ApiResult<Vec<InspectLogEntry>>) {
        *self.inspect.lock().unwrap() = entries;
    }

    pub fn fail_mutations_with(&self, error: ApiError) {
        *self.mutation_error.lock().unwrap() = Some(error);
    }

    /// Makes the n-th DELETE /tunnels call (1-based) fail with a network error.
    pub fn fail_delete_call(&self, n: usize) {
        *self.failing_delete_call.lock().unwrap() = Some(n);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<DeleteTunnelRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::DeleteTunnels(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// When each DELETE /tunnels call arrived, on the tokio clock.
    pub fn delete_instants(&self) -> Vec<Instant> {
        self.delete_issued_at.lock().unwrap().clone()
    }

    pub fn count(&self, wanted: &ApiCall) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn mutation_result(&self) -> ApiResult<()> {
        match self.mutation_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub fn status_with_tunnels(ports: &[u16]) -> StatusPayload {
    StatusPayload {
        connected: true,
        tunnels: ports.iter().map(|port| (*port, port + 1)).collect(),
        domains: BTreeMap::new(),
        uptime: 42.0,
        server_addr: "203.0.113.7:64290".to_string(),
        stats: Some(StatsPayload {
            bytes_up: 0,
            bytes_down: 0,
            latency_ms: 12,
        }),
    }
}

pub fn log_entry(id: &str, timestamp: i64) -> InspectLogEntry {
    InspectLogEntry {
        id: id.to_string(),
        timestamp,
        method: "GET".to_string(),
        url: format!("/items/{}", id),
        status: 200,
        duration_ms: 3,
        client_ip: "198.51.100.4".to_string(),
        public_port: 8080,
        req_headers: BTreeMap::new(),
        req_body: None,
        res_headers: BTreeMap::new(),
        res_body: Some("ok".to_string()),
    }
}

impl TunnelApi for FakeApi {
    async fn login(&self, password: &str) -> ApiResult<()> {
        self.record(ApiCall::Login(password.to_string()));
        if password == self.password {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    async fn logout(&self) -> ApiResult<()> {
        self.record(ApiCall::Logout);
        Ok(())
    }

    async fn status(&self) -> ApiResult<StatusPayload> {
        self.record(ApiCall::Status);
        if let Some(queued) = self.queued_status.lock().unwrap().pop_front() {
            return queued;
        }
        self.status.lock().unwrap().clone()
    }

    async fn inspect(&self) -> ApiResult<Vec<InspectLogEntry>> {
        self.record(ApiCall::Inspect);
        self.inspect.lock().unwrap().clone()
    }

    async fn create_tunnel(&self, request: &CreateTunnelRequest) -> ApiResult<()> {
        self.record(ApiCall::CreateTunnel(request.clone()));
        self.mutation_result()
    }

    async fn edit_tunnel(&self, request: &EditTunnelRequest) -> ApiResult<()> {
        self.record(ApiCall::EditTunnel(request.clone()));
        self.mutation_result()
    }

    async fn delete_tunnels(&self, request: &DeleteTunnelRequest) -> ApiResult<()> {
        self.record(ApiCall::DeleteTunnels(request.clone()));
        self.delete_issued_at.lock().unwrap().push(Instant::now());
        let issued = self.delete_calls().len();
        if *self.failing_delete_call.lock().unwrap() == Some(issued) {
            return Err(ApiError::Network("connection reset".to_string()));
        }
        self.mutation_result()
    }

    async fn create_domain(&self, request: &CreateDomainRequest) -> ApiResult<()> {
        self.record(ApiCall::CreateDomain(request.clone()));
        self.mutation_result()
    }

    async fn delete_domain(&self, domain: &str) -> ApiResult<()> {
        self.record(ApiCall::DeleteDomain(domain.to_string()));
        self.mutation_result()
    }

    async fn replay(&self, id: &str) -> ApiResult<ReplayResponse> {
        self.record(ApiCall::Replay(id.to_string()));
        self.mutation_result()?;
        Ok(ReplayResponse {
            status: "200 OK".to_string(),
            status_code: 200,
            replayed_to: format!("http://127.0.0.1:8081/items/{}", id),
        })
    }
}
