//! Shared gateway state: the three collaborators behind trait objects.

use std::sync::Arc;

use crate::compiler::{LocalTemplateCompiler, PlatformCompiler, PromptCatalog, TemplateCompiler};
use crate::config::{CompilerBackend, Config};
use crate::error::{GatewayError, Result};
use crate::lookup::{PlatformRequestLookup, RequestLookup};
use crate::telemetry::{NoopSink, PostHogSink, TelemetrySink};

/// Collaborators used by every request.
///
/// Holds no per-request data; API keys travel with each request.
#[derive(Clone)]
pub struct GatewayState {
    pub compiler: Arc<dyn TemplateCompiler>,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub lookup: Arc<dyn RequestLookup>,
}

impl GatewayState {
    pub fn new(
        compiler: Arc<dyn TemplateCompiler>,
        telemetry: Arc<dyn TelemetrySink>,
        lookup: Arc<dyn RequestLookup>,
    ) -> Self {
        Self {
            compiler,
            telemetry,
            lookup,
        }
    }

    /// Build collaborators from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let compiler: Arc<dyn TemplateCompiler> = match config.compiler.backend {
            CompilerBackend::Local => {
                let compiler = match &config.compiler.catalog_path {
                    Some(path) => LocalTemplateCompiler::load(path)?,
                    None => {
                        log::warn!("No compiler.catalog_path configured; every prompt fetch will fail");
                        LocalTemplateCompiler::new(PromptCatalog::default())
                    }
                };
                Arc::new(compiler.with_max_downloads(config.compiler.max_downloads))
            }
            CompilerBackend::Platform => {
                log::info!("Delegating prompt compilation to {}", config.platform.base_url);
                Arc::new(PlatformCompiler::new(&config.platform))
            }
        };

        let telemetry: Arc<dyn TelemetrySink> = if config.telemetry.enabled {
            let api_key = config
                .telemetry
                .api_key
                .clone()
                .ok_or_else(|| GatewayError::Config("telemetry.enabled requires telemetry.api_key".to_string()))?;
            log::info!("Sending telemetry to {}", config.telemetry.host);
            Arc::new(PostHogSink::new(&config.telemetry, api_key))
        } else {
            log::info!("Telemetry disabled");
            Arc::new(NoopSink)
        };

        let lookup: Arc<dyn RequestLookup> = Arc::new(PlatformRequestLookup::new(&config.platform));

        Ok(Self::new(compiler, telemetry, lookup))
    }
}
