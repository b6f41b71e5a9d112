//! Subcommand implementations

use anyhow::Context;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolgate_core::{Gateway, McpContent, ServerTools};
use toolgate_foundation::{SearchType, ToolSource};
use toolgate_tool::{export_tools, BuildReport, EditorSettings, ToolCatalog, ToolSearch};

/// `search` 플래그
pub struct SearchArgs {
    pub query: String,
    pub search_type: Option<SearchType>,
    pub limit: Option<usize>,
    pub category: Option<String>,
    pub source: Option<ToolSource>,
    pub min_score: Option<f64>,
}

/// 백엔드 상태 출력
pub async fn status(gateway: &Gateway) -> anyhow::Result<()> {
    gateway.start().await;
    let status = gateway.router().get_status();

    println!("\nBackends ({}/{} ready)\n", status.ready_count, status.total);
    for (name, ready) in &status.servers {
        let mark = if *ready { "✓" } else { "✗" };
        let detail = gateway
            .router()
            .get_server(name)
            .ok()
            .and_then(|adapter| adapter.last_error())
            .unwrap_or_default();
        println!("  {} {:<24} {}", mark, name, detail);
    }
    if status.servers.is_empty() {
        println!("  (no backends registered)");
    }

    gateway.shutdown().await;
    Ok(())
}

/// 백엔드별 도구 목록 출력
pub async fn tools(gateway: &Gateway) -> anyhow::Result<()> {
    gateway.start().await;
    let listing = gateway.router().list_all_tools().await;

    for (server, slot) in &listing.tools {
        match slot {
            ServerTools::Tools { tools } => {
                println!("\n{} ({} tools)", server, tools.len());
                for tool in tools {
                    println!(
                        "  {:<32} {}",
                        tool.name,
                        truncate(tool.description.as_deref().unwrap_or(""), 80)
                    );
                }
            }
            ServerTools::Error { error } => println!("\n{} ✗ {}", server, error),
        }
    }

    gateway.shutdown().await;
    Ok(())
}

/// 백엔드 도구 호출
pub async fn call(gateway: &Gateway, server: &str, tool: &str, args: &str) -> anyhow::Result<()> {
    let arguments: Value =
        serde_json::from_str(args).with_context(|| format!("--args is not valid JSON: {}", args))?;

    gateway.start().await;
    let outcome = gateway.router().call_tool(server, tool, arguments).await;
    gateway.shutdown().await;

    let result = outcome?;
    for content in &result.content {
        match content {
            McpContent::Text { text } => println!("{}", text),
            other => println!("{}", serde_json::to_string_pretty(other)?),
        }
    }
    if result.is_error {
        anyhow::bail!("{} reported a tool error", tool);
    }
    Ok(())
}

/// 카탈로그 빌드 후 저장
pub async fn build_catalog(gateway: &Gateway, output: Option<&Path>) -> anyhow::Result<()> {
    gateway.start().await;
    let report = gateway.build_catalog().await;
    gateway.shutdown().await;

    print_report(&report);
    let path = gateway.save_catalog(output)?;
    println!("\n✓ Catalog saved to {}", path.display());
    Ok(())
}

/// 카탈로그 검색
pub async fn search(gateway: &Gateway, args: SearchArgs) -> anyhow::Result<()> {
    let catalog = load_or_build(gateway).await?;

    let mut options = gateway.search_options();
    if let Some(t) = args.search_type {
        options = options.search_type(t);
    }
    if let Some(limit) = args.limit {
        options = options.limit(limit);
    }
    options.category = args.category;
    options.source = args.source;
    options.min_score = args.min_score;

    let search = ToolSearch::new(&catalog);
    let results = search.search(&args.query, &options);

    if results.is_empty() {
        println!("No tools match '{}'.", args.query);
        return Ok(());
    }

    println!("{:<8} {:<44} {:<10} {}", "Score", "Tool", "Priority", "Description");
    println!("{}", "-".repeat(100));
    for r in &results {
        println!(
            "{:<8.3} {:<44} {:<10} {}",
            r.score,
            r.tool.id,
            r.tool.priority.as_str(),
            truncate(&r.tool.description, 40)
        );
    }
    Ok(())
}

/// 자동완성 제안
pub async fn suggest(gateway: &Gateway, partial: &str, limit: usize) -> anyhow::Result<()> {
    let catalog = load_or_build(gateway).await?;
    for suggestion in ToolSearch::new(&catalog).suggest(partial, limit) {
        println!("{}", suggestion);
    }
    Ok(())
}

/// 카탈로그 통계와 토큰 절감 추정
pub async fn stats(gateway: &Gateway) -> anyhow::Result<()> {
    load_or_build(gateway).await?;
    let stats = gateway.stats();

    println!("\n📊 Catalog\n");
    println!("  Total tools:     {}", stats.total);
    println!("  Always loaded:   {}", stats.always_loaded);
    println!("  Deferred:        {}", stats.deferred);

    println!("\n  By source:");
    for (source, count) in &stats.by_source {
        println!("    {:<16} {}", source.as_str(), count);
    }
    println!("\n  By priority:");
    for (priority, count) in &stats.by_priority {
        println!("    {:<16} {}", priority.as_str(), count);
    }

    let tokens = &stats.tokens;
    println!("\n💰 Context budget\n");
    println!("  Without defer_loading: {} tokens", tokens.without_defer_loading);
    println!("  With defer_loading:    {} tokens", tokens.with_defer_loading);
    println!(
        "  Savings:               {} tokens ({:.1}%)",
        tokens.savings, tokens.savings_percent
    );
    Ok(())
}

/// 내보내기 대상
pub enum ExportTarget {
    Anthropic { with_search_tool: bool },
    Editor,
}

/// 카탈로그 내보내기 (stdout 또는 파일)
pub async fn export(
    gateway: &Gateway,
    target: ExportTarget,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let catalog = load_or_build(gateway).await?;

    let document = match target {
        ExportTarget::Anthropic { with_search_tool } => {
            serde_json::to_string_pretty(&export_tools(&catalog, with_search_tool))?
        }
        ExportTarget::Editor => {
            let catalog_path = gateway.config().catalog_path().ok();
            let settings =
                EditorSettings::from_catalog(&catalog, &gateway.config().search, catalog_path);
            serde_json::to_string_pretty(&settings)?
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Exported to {}", path.display());
        }
        None => println!("{}", document),
    }
    Ok(())
}

/// 저장된 카탈로그를 쓰고, 없으면 백엔드를 띄워서 빌드
async fn load_or_build(gateway: &Gateway) -> anyhow::Result<Arc<ToolCatalog>> {
    let path: Option<PathBuf> = gateway.config().catalog_path().ok();

    if let Some(path) = path.filter(|p| p.exists()) {
        gateway.load_catalog(&path)?;
    } else {
        tracing::info!("No saved catalog, building from backends");
        gateway.start().await;
        let report = gateway.build_catalog().await;
        gateway.shutdown().await;
        for failure in report.failures() {
            tracing::warn!(
                "Producer '{}' failed: {}",
                failure.name,
                failure.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(gateway.catalog())
}

fn print_report(report: &BuildReport) {
    println!("\nProducers\n");
    for p in &report.producers {
        match &p.error {
            None => println!("  ✓ {:<16} {:<16} {} tools", p.name, p.source.as_str(), p.tools),
            Some(e) => println!("  ✗ {:<16} {:<16} {}", p.name, p.source.as_str(), e),
        }
    }
    if !report.duplicates.is_empty() {
        println!("\n  Duplicate ids dropped: {}", report.duplicates.join(", "));
    }
    println!("\n  Total: {} tools", report.total);
}

/// Truncate a string for display
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
