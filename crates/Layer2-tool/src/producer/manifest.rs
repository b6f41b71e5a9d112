//! Compiled-crate tool manifests
//!
//! ```json
//! {
//!   "crate": "fs-tools",
//!   "category": "filesystem",
//!   "tools": [
//!     { "name": "read_file", "description": "Read a file", "inputSchema": { "type": "object" } }
//!   ]
//! }
//! ```

use super::ToolProducer;
use crate::catalog::{empty_object_schema, ToolDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use toolgate_foundation::{Error, Result, ToolPriority, ToolSource};
use tracing::{debug, warn};

/// 크레이트 매니페스트 파일
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolManifest {
    #[serde(rename = "crate")]
    pub crate_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub tools: Vec<ToolManifestEntry>,
}

/// 매니페스트의 도구 한 개
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolManifestEntry {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "empty_object_schema")]
    pub input_schema: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ToolPriority>,
}

impl ToolManifest {
    pub fn from_json(content: &str) -> Result<Self> {
        let manifest: ToolManifest = serde_json::from_str(content)?;
        if manifest.crate_name.trim().is_empty() {
            return Err(Error::Catalog("manifest requires a non-empty 'crate'".into()));
        }
        Ok(manifest)
    }

    pub fn into_descriptors(self) -> Vec<ToolDescriptor> {
        let crate_name = self.crate_name;
        let default_category = self.category;
        self.tools
            .into_iter()
            .map(|t| ToolDescriptor {
                name: t.name,
                description: t.description,
                input_schema: t.input_schema,
                server: crate_name.clone(),
                source: ToolSource::CompiledCrate,
                category: t.category.or_else(|| default_category.clone()),
                priority: t.priority,
            })
            .collect()
    }
}

/// 매니페스트 경로(파일 또는 `*.json` 디렉토리) 생산자
pub struct ManifestProducer {
    paths: Vec<PathBuf>,
}

impl ManifestProducer {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    async fn read_manifest(path: &Path) -> Result<ToolManifest> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Catalog(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;
        ToolManifest::from_json(&content).map_err(|e| {
            Error::Catalog(format!("Invalid manifest {}: {}", path.display(), e))
        })
    }

    async fn manifest_files(path: &Path) -> Result<Vec<PathBuf>> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            Error::Catalog(format!("Manifest path {}: {}", path.display(), e))
        })?;
        if !meta.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        let mut dir = tokio::fs::read_dir(path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let p = entry.path();
            if p.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(p);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl ToolProducer for ManifestProducer {
    fn name(&self) -> &str {
        "manifests"
    }

    fn source(&self) -> ToolSource {
        ToolSource::CompiledCrate
    }

    async fn produce(&self) -> Result<Vec<ToolDescriptor>> {
        let mut tools = Vec::new();

        for path in &self.paths {
            for file in Self::manifest_files(path).await? {
                // 잘못된 파일 하나는 건너뜀
                match Self::read_manifest(&file).await {
                    Ok(manifest) => {
                        debug!(
                            "Manifest {} ({} tools) from {}",
                            manifest.crate_name,
                            manifest.tools.len(),
                            file.display()
                        );
                        tools.extend(manifest.into_descriptors());
                    }
                    Err(e) => warn!("Skipping manifest: {}", e),
                }
            }
        }

        Ok(tools)
    }
}
