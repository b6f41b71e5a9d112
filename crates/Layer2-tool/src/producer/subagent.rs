//! Subagent definitions (Markdown + YAML front matter)
//!
//! ```markdown
//! ---
//! name: code-reviewer
//! description: Reviews diffs for bugs and style issues
//! category: review
//! priority: high
//! ---
//! You are a careful reviewer...
//! ```

use super::ToolProducer;
use crate::catalog::ToolDescriptor;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use toolgate_foundation::{Error, Result, ToolPriority, ToolSource};
use tracing::{debug, warn};

/// 서브에이전트 소유자 이름
const SUBAGENT_OWNER: &str = "subagents";

#[derive(Debug, Deserialize)]
struct FrontMatter {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    priority: Option<ToolPriority>,
}

/// 서브에이전트 디렉토리 생산자
pub struct SubagentProducer {
    dirs: Vec<PathBuf>,
}

impl SubagentProducer {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// 정의 파일 하나 파싱
    pub fn parse_definition(content: &str) -> Result<ToolDescriptor> {
        let yaml = extract_front_matter(content)
            .ok_or_else(|| Error::Catalog("missing YAML front matter".into()))?;
        let fm: FrontMatter = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Catalog(format!("invalid front matter: {}", e)))?;
        if fm.name.trim().is_empty() {
            return Err(Error::Catalog("subagent requires a non-empty 'name'".into()));
        }

        let mut descriptor =
            ToolDescriptor::new(ToolSource::Subagent, SUBAGENT_OWNER, fm.name.trim(), fm.description)
                .schema(prompt_schema());
        descriptor.category = fm.category;
        descriptor.priority = fm.priority;
        Ok(descriptor)
    }

    async fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            Error::Catalog(format!("Subagent dir {}: {}", dir.display(), e))
        })?;
        while let Some(entry) = entries.next_entry().await? {
            let p = entry.path();
            if p.extension().and_then(|e| e.to_str()) == Some("md") {
                files.push(p);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl ToolProducer for SubagentProducer {
    fn name(&self) -> &str {
        "subagents"
    }

    fn source(&self) -> ToolSource {
        ToolSource::Subagent
    }

    async fn produce(&self) -> Result<Vec<ToolDescriptor>> {
        let mut tools = Vec::new();
        for dir in &self.dirs {
            for file in Self::scan_dir(dir).await? {
                let content = tokio::fs::read_to_string(&file).await?;
                match Self::parse_definition(&content) {
                    Ok(d) => {
                        debug!("Subagent '{}' from {}", d.name, file.display());
                        tools.push(d);
                    }
                    Err(e) => warn!("Skipping subagent {}: {}", file.display(), e),
                }
            }
        }
        Ok(tools)
    }
}

/// `---` 로 둘러싸인 앞부분 추출
fn extract_front_matter(content: &str) -> Option<&str> {
    let rest = content.trim_start_matches('\u{feff}').trim_start();
    let rest = rest.strip_prefix("---")?;
    let rest = rest.trim_start_matches(['\r', '\n']);
    let end = rest.find("\n---")?;
    Some(&rest[..end])
}

fn prompt_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "prompt": { "type": "string", "description": "Task for the subagent" }
        },
        "required": ["prompt"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVIEWER: &str = "---\nname: code-reviewer\ndescription: Reviews diffs for bugs\ncategory: review\npriority: high\n---\nYou are a careful reviewer.\n";

    #[test]
    fn test_parse_definition() {
        let d = SubagentProducer::parse_definition(REVIEWER).unwrap();
        assert_eq!(d.id(), "agent__code-reviewer");
        assert_eq!(d.description, "Reviews diffs for bugs");
        assert_eq!(d.category.as_deref(), Some("review"));
        assert_eq!(d.priority, Some(ToolPriority::High));
        assert_eq!(d.input_schema["required"][0], "prompt");
    }

    #[test]
    fn test_parse_without_front_matter() {
        assert!(SubagentProducer::parse_definition("just text").is_err());
        assert!(SubagentProducer::parse_definition("---\ndescription: x\n---\n").is_err());
    }

    #[test]
    fn test_crlf_front_matter() {
        let content = "---\r\nname: planner\r\n---\r\nbody";
        let d = SubagentProducer::parse_definition(content).unwrap();
        assert_eq!(d.name, "planner");
    }

    #[tokio::test]
    async fn test_produce_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("reviewer.md"), REVIEWER).unwrap();
        std::fs::write(dir.path().join("broken.md"), "no front matter").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let producer = SubagentProducer::new(vec![dir.path().to_path_buf()]);
        let tools = producer.produce().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].source, ToolSource::Subagent);
    }
}
