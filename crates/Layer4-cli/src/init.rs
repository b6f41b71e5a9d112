//! ToolGate init command
//!
//! Initializes a project with `.toolgate/` configuration.

use serde_json::json;
use std::fs;
use std::path::Path;
use toolgate_foundation::{GatewayConfig, JsonStore, GATEWAY_CONFIG_FILE, MCP_FILE};

/// Example subagent definition written by `toolgate init`
const EXAMPLE_SUBAGENT: &str = r#"---
name: code-reviewer
description: Review a diff for bugs, missing tests and unclear naming
category: review
priority: low
---

You review code changes and report concrete problems with file and line.
"#;

/// Initialize ToolGate configuration under `root`
pub fn init_project(root: &Path, force: bool) -> anyhow::Result<()> {
    let store = JsonStore::project(root);

    if store.exists(GATEWAY_CONFIG_FILE) && !force {
        println!("✓ ToolGate already initialized in this directory.");
        println!("  Use --force to reinitialize.");
        return Ok(());
    }

    println!("Initializing ToolGate...");

    let subagents = store.base_dir().join("subagents");
    let mut config = GatewayConfig::default();
    config.catalog.subagent_dirs = vec![subagents.clone()];

    store.save(GATEWAY_CONFIG_FILE, &config)?;
    println!("  Created .toolgate/{}", GATEWAY_CONFIG_FILE);

    if !store.exists(MCP_FILE) || force {
        store.save(MCP_FILE, &json!({ "mcpServers": {} }))?;
        println!("  Created .toolgate/{}", MCP_FILE);
    }

    fs::create_dir_all(&subagents)?;
    fs::write(subagents.join("code-reviewer.md"), EXAMPLE_SUBAGENT)?;
    println!("  Created .toolgate/subagents/code-reviewer.md");

    println!("\n✓ ToolGate initialized successfully!");
    println!("\nNext steps:");
    println!("  1. Register backends in .toolgate/{}", MCP_FILE);
    println!("  2. Run 'toolgate catalog build' to index their tools");
    println!("  3. Run 'toolgate search <query>' to try the catalog");

    Ok(())
}
