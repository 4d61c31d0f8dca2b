use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, SdkConfig};
use log::{debug, error};
use tokio::runtime::{Builder, Runtime};

use crate::error::ServiceError;
use crate::issuance::acm::AcmCertificateAuthority;
use crate::issuance::authority::CertificateAuthority;
use crate::issuance::dns_providers::{DnsZoneWriter, Route53ZoneWriter};

/// Hands out the external service clients an invocation needs.
pub trait ServiceClients: Send + Sync {
    /// A certificate authority client scoped to `region`.
    fn certificate_authority(
        &self,
        region: &str,
    ) -> Result<Arc<dyn CertificateAuthority>, ServiceError>;

    fn dns_zone_writer(&self) -> Result<Arc<dyn DnsZoneWriter>, ServiceError>;
}

/// Runtime and SDK configuration shared by every AWS client of one process.
pub struct AwsEnvironment {
    pub runtime: Arc<Runtime>,
    pub sdk_config: SdkConfig,
}

impl AwsEnvironment {
    /// Builds a current-thread runtime and loads the default credential chain.
    pub fn load() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;
        let sdk_config = runtime.block_on(aws_config::defaults(BehaviorVersion::latest()).load());
        Ok(Self {
            runtime: Arc::new(runtime),
            sdk_config,
        })
    }
}

type EnvironmentLoader = Box<dyn Fn() -> Result<AwsEnvironment> + Send + Sync>;

/// AWS-backed clients. The environment is loaded on first use, so load failures
/// surface as service errors inside the reconciliation.
pub struct AwsServiceClients {
    loader: EnvironmentLoader,
    environment: OnceLock<Result<AwsEnvironment, String>>,
}

impl AwsServiceClients {
    pub fn new() -> Self {
        Self::with_loader(AwsEnvironment::load)
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<AwsEnvironment> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            environment: OnceLock::new(),
        }
    }

    fn environment(&self) -> Result<&AwsEnvironment, ServiceError> {
        let loaded = self.environment.get_or_init(|| {
            (self.loader)().map_err(|err| {
                error!("[clients] Failed to load AWS configuration: {err:#}");
                format!("{err:#}")
            })
        });
        loaded
            .as_ref()
            .map_err(|message| ServiceError::call("AWS", "LoadConfig", message.clone()))
    }
}

impl Default for AwsServiceClients {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceClients for AwsServiceClients {
    fn certificate_authority(
        &self,
        region: &str,
    ) -> Result<Arc<dyn CertificateAuthority>, ServiceError> {
        let environment = self.environment()?;
        debug!("[clients] building ACM client for {region}");
        let config = aws_sdk_acm::config::Builder::from(&environment.sdk_config)
            .region(aws_sdk_acm::config::Region::new(region.to_string()))
            .build();
        Ok(Arc::new(AcmCertificateAuthority::new(
            aws_sdk_acm::Client::from_conf(config),
            environment.runtime.clone(),
        )))
    }

    fn dns_zone_writer(&self) -> Result<Arc<dyn DnsZoneWriter>, ServiceError> {
        let environment = self.environment()?;
        Ok(Arc::new(Route53ZoneWriter::new(
            aws_sdk_route53::Client::new(&environment.sdk_config),
            environment.runtime.clone(),
        )))
    }
}
