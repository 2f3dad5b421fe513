use crate::api::types::CreateDomainRequest;
use crate::api::TunnelApi;
use crate::dashboard::{Dashboard, DashboardResult, DestructiveAction, ToastKind};
use crate::utils::validation::{
    parse_mode, parse_port, parse_rate_limit, require_fields, validate_domain_name, PortField,
    ValidationError,
};

/// Domain mapping form. Basic auth needs both user and password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainForm {
    pub domain: String,
    pub target_port: String,
    pub mode: String,
    pub auth_user: Option<String>,
    pub auth_pass: Option<String>,
    pub rate_limit: Option<String>,
    pub smart_shield: bool,
}

impl DomainForm {
    pub fn new(domain: impl Into<String>, target_port: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            target_port: target_port.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<CreateDomainRequest, ValidationError> {
        require_fields(&[&self.domain, &self.target_port])?;
        let domain = validate_domain_name(&self.domain)?;
        let public_port = parse_port(PortField::Target, &self.target_port)?;
        let mode = parse_mode(&self.mode)?;
        let rate_limit = parse_rate_limit(self.rate_limit.as_deref())?;

        let auth_user = non_empty(&self.auth_user);
        let auth_pass = non_empty(&self.auth_pass);
        if auth_user.is_some() != auth_pass.is_some() {
            return Err(ValidationError::MissingFields);
        }

        Ok(CreateDomainRequest {
            domain,
            public_port,
            mode,
            auth_user,
            auth_pass,
            rate_limit,
            smart_shield: self.smart_shield,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl<A: TunnelApi> Dashboard<A> {
    pub async fn add_domain(&self, form: DomainForm) -> DashboardResult<()> {
        let result = self.try_add_domain(form).await;
        self.settle(result, "Failed to map domain").await
    }

    async fn try_add_domain(&self, form: DomainForm) -> DashboardResult<()> {
        let request = form.validate()?;
        log::info!(
            "Command: map {} -> :{} ({})",
            request.domain,
            request.public_port,
            request.mode.label()
        );

        self.api().create_domain(&request).await?;
        self.refresh_status().await;
        self.notify(format!("Mapped {}", request.domain), ToastKind::Success)
            .await;
        Ok(())
    }

    pub async fn request_unmap_domain(&self, domain: String) {
        self.mutate(|state| {
            state.request_confirmation(
                "Unmap Domain?",
                format!(
                    "This will remove the mapping for {}. It will no longer point to your tunnel.",
                    domain
                ),
                DestructiveAction::UnmapDomain(domain),
            )
        })
        .await;
    }

    pub(crate) async fn unmap_domain(&self, domain: &str) -> DashboardResult<()> {
        let result = self.try_unmap_domain(domain).await;
        self.settle(result, "Failed to unmap domain").await
    }

    async fn try_unmap_domain(&self, domain: &str) -> DashboardResult<()> {
        log::info!("Command: unmap {}", domain);

        self.api().delete_domain(domain).await?;
        self.refresh_status().await;
        self.notify(format!("Unmapped {}", domain), ToastKind::Success)
            .await;
        Ok(())
    }
}
