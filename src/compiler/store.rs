//! Local template compiler backed by a YAML prompt catalog.
//!
//! The catalog lists accepted API keys and the prompts they can fetch:
//!
//! ```yaml
//! apiKeys:
//!   - abc123
//! prompts:
//!   - id: p-greeting
//!     name: greeting
//!     tags: [onboarding]
//!     versions:
//!       - version: 1.0.0
//!         prompt: "Hello {{user}}"
//! ```

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{CompileError, PromptRenderer, TemplateCompiler};
use crate::domain::{CompilationRequest, CompiledPrompt};
use crate::error::{GatewayError, Result};

/// Prompts and API keys known to the local compiler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptCatalog {
    pub api_keys: Vec<String>,
    pub prompts: Vec<PromptDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta_properties: Map<String, Value>,
    pub versions: Vec<PromptVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVersion {
    pub version: String,
    pub prompt: String,
}

impl PromptDefinition {
    /// Highest version by semver precedence
    pub fn latest(&self) -> Option<&PromptVersion> {
        self.versions
            .iter()
            .max_by(|a, b| compare_versions(&a.version, &b.version))
    }

    pub fn version(&self, version: &str) -> Option<&PromptVersion> {
        self.versions.iter().find(|v| v.version == version)
    }
}

impl PromptCatalog {
    /// Parse and validate a catalog from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: Self = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let catalog = Self::from_yaml(&content)?;
        log::info!(
            "Loaded {} prompts from {}",
            catalog.prompts.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for prompt in &self.prompts {
            if !ids.insert(prompt.id.as_str()) {
                return Err(GatewayError::Catalog(format!("duplicate prompt id '{}'", prompt.id)));
            }
            if !names.insert(prompt.name.as_str()) {
                return Err(GatewayError::Catalog(format!("duplicate prompt name '{}'", prompt.name)));
            }
            if prompt.versions.is_empty() {
                return Err(GatewayError::Catalog(format!("prompt '{}' has no versions", prompt.name)));
            }
            let mut versions = HashSet::new();
            for v in &prompt.versions {
                if !versions.insert(v.version.as_str()) {
                    return Err(GatewayError::Catalog(format!(
                        "prompt '{}' repeats version '{}'",
                        prompt.name, v.version
                    )));
                }
            }
        }
        Ok(())
    }

    fn find(&self, request: &CompilationRequest) -> std::result::Result<&PromptDefinition, CompileError> {
        let found = match (&request.id, &request.name) {
            (Some(id), _) => self.prompts.iter().find(|p| &p.id == id),
            (None, Some(name)) => self.prompts.iter().find(|p| &p.name == name),
            (None, None) => return Err(CompileError::MissingIdentifier),
        };
        found.ok_or(CompileError::PromptNotFound)
    }
}

/// Order versions the way semver does, tolerating loose input.
///
/// A leading `v` and `+build` metadata are ignored. The core compares
/// dot-separated segments numerically, and a pre-release (`-beta`) sorts
/// below its release. Pre-release identifiers follow semver precedence.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a_core, a_pre) = split_version(a);
    let (b_core, b_pre) = split_version(b);
    compare_identifiers(a_core, b_core).then_with(|| match (a_pre, b_pre) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => compare_identifiers(l, r),
    })
}

fn split_version(raw: &str) -> (&str, Option<&str>) {
    let raw = raw.trim();
    let raw = raw.strip_prefix(['v', 'V']).unwrap_or(raw);
    let raw = raw.split_once('+').map_or(raw, |(version, _)| version);
    match raw.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (raw, None),
    }
}

/// Numeric identifiers compare as numbers and sort below alphanumeric ones;
/// a missing identifier sorts first
fn compare_identifiers(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// A successful prompt resolution, as recorded by the local compiler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDownload {
    pub prompt_id: String,
    pub version: String,
    pub meta_properties: Option<Value>,
    pub source: Option<String>,
    pub downloaded_at: DateTime<Utc>,
}

/// Downloads kept in memory unless configured otherwise
pub const DEFAULT_MAX_DOWNLOADS: usize = 1000;

/// Template compiler that serves prompts from an in-process catalog
pub struct LocalTemplateCompiler {
    catalog: PromptCatalog,
    api_keys: HashSet<String>,
    renderer: PromptRenderer,
    downloads: Mutex<VecDeque<PromptDownload>>,
    max_downloads: usize,
}

impl LocalTemplateCompiler {
    pub fn new(catalog: PromptCatalog) -> Self {
        let api_keys = catalog.api_keys.iter().cloned().collect();
        Self {
            catalog,
            api_keys,
            renderer: PromptRenderer::new(),
            downloads: Mutex::new(VecDeque::new()),
            max_downloads: DEFAULT_MAX_DOWNLOADS,
        }
    }

    /// Keep at most `max` downloads, dropping the oldest; zero disables recording
    pub fn with_max_downloads(mut self, max: usize) -> Self {
        self.max_downloads = max;
        self
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(PromptCatalog::load(path)?))
    }

    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    /// Most recent downloads, oldest first
    pub async fn downloads(&self) -> Vec<PromptDownload> {
        self.downloads.lock().await.iter().cloned().collect()
    }

    async fn record_download(&self, download: PromptDownload) {
        if self.max_downloads == 0 {
            return;
        }
        let mut downloads = self.downloads.lock().await;
        while downloads.len() >= self.max_downloads {
            downloads.pop_front();
        }
        downloads.push_back(download);
    }
}

#[async_trait]
impl TemplateCompiler for LocalTemplateCompiler {
    async fn compile(&self, request: &CompilationRequest) -> std::result::Result<Option<Value>, CompileError> {
        if !self.api_keys.contains(request.api_key.expose()) {
            log::debug!("Rejected compile request from {}", request.api_key);
            return Err(CompileError::InvalidApiKey);
        }

        let prompt = self.catalog.find(request)?;
        let version = match request.version.as_deref() {
            Some(wanted) => prompt.version(wanted).ok_or_else(|| CompileError::VersionNotFound {
                version: wanted.to_string(),
            })?,
            None => prompt.latest().ok_or(CompileError::PromptNotFound)?,
        };

        let compiled_prompt = if request.should_compile {
            Some(self.renderer.render(&version.prompt, &request.variables)?)
        } else {
            None
        };

        let compiled = CompiledPrompt {
            prompt_id: prompt.id.clone(),
            name: prompt.name.clone(),
            version: version.version.clone(),
            tags: prompt.tags.clone(),
            meta_properties: prompt.meta_properties.clone(),
            prompt: version.prompt.clone(),
            compiled_prompt,
        };
        let value = serde_json::to_value(&compiled).map_err(|e| CompileError::Render(e.to_string()))?;

        self.record_download(PromptDownload {
            prompt_id: prompt.id.clone(),
            version: version.version.clone(),
            meta_properties: request.download_meta_properties.clone(),
            source: request.download_source.clone(),
            downloaded_at: Utc::now(),
        })
        .await;
        log::debug!("Resolved prompt {}@{} for {}", prompt.name, version.version, request.api_key);

        Ok(Some(value))
    }
}
