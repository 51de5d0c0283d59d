use anyhow::Result;
use console::style;
use std::path::Path;

use crate::core::config::PlatformConfig;
use crate::core::store::AgentStore;
use crate::core::store::types::{AgentStatus, RunStatus};
use crate::core::terminal::{GuideSection, print_error, print_info, print_success, print_warn};

const SAMPLE_CONFIG: &str = r#"# newsdesk workspace configuration
[api]
host = "127.0.0.1"
port = 17990

# Register a generation endpoint per agent type:
# [[worker]]
# agent_type = "REPORTER"
# endpoint = "http://127.0.0.1:9100/generate"
"#;

pub async fn run_install(workspace_dir: &Path) -> Result<()> {
    let store = AgentStore::new(workspace_dir).await?;
    let seeded = store.seed_default_agents().await?;

    let config_path = workspace_dir.join("newsdesk.toml");
    if !config_path.exists() {
        tokio::fs::write(&config_path, SAMPLE_CONFIG).await?;
    }

    print_success(&format!(
        "Workspace ready at {} ({} agent(s) seeded)",
        workspace_dir.display(),
        seeded
    ));
    Ok(())
}

/// One scheduling pass and exit; the shape an external cron wants when it
/// prefers a process over hitting the HTTP endpoint.
pub async fn run_tick(workspace_dir: &Path) -> Result<()> {
    let config = PlatformConfig::load(workspace_dir).await?;
    let (_store, _registry, coordinator) = super::serve::build_core(workspace_dir, &config).await?;

    let summary = coordinator.tick().await?;
    GuideSection::new("Tick Complete")
        .status("Evaluated", &summary.evaluated.to_string())
        .status("Triggered", &summary.triggered.to_string())
        .status("Skipped (running)", &summary.skipped_running.to_string())
        .status("Failed", &summary.failed.to_string())
        .print();
    println!();
    Ok(())
}

pub async fn run_agents_command(workspace_dir: &Path, args: &[String]) -> Result<()> {
    let sub_cmd = if args.len() > 2 { args[2].as_str() } else { "" };
    match sub_cmd {
        "list" | "" => {
            let store = AgentStore::new(workspace_dir).await?;
            let configs = store.get_all_agent_configs().await?;
            if configs.is_empty() {
                print_warn("No agents configured. Run 'newsdesk install' to seed the defaults.");
                return Ok(());
            }
            let mut section = GuideSection::new("Agents");
            for config in configs {
                let status = if config.status == "active" {
                    style(config.status.clone()).green()
                } else {
                    style(config.status.clone()).yellow()
                };
                section = section.text(&format!(
                    "{:<20} {:<16} {}",
                    style(&config.agent_type).bold(),
                    config.schedule,
                    status
                ));
            }
            section.print();
            println!();
        }
        "pause" | "resume" => {
            let Some(agent_type) = args.get(3).map(|a| a.trim().to_uppercase()) else {
                print_error(&format!("Usage: newsdesk agents {} <agent_type>", sub_cmd));
                return Ok(());
            };
            let status = if sub_cmd == "pause" {
                AgentStatus::Paused
            } else {
                AgentStatus::Active
            };
            let store = AgentStore::new(workspace_dir).await?;
            if store.set_agent_status(&agent_type, status).await? {
                print_success(&format!("Agent {} is now {}", agent_type, status.as_str()));
            } else {
                print_error(&format!("Agent {} not found", agent_type));
            }
        }
        _ => {
            print_error("Unknown agents command. Expected: list, pause, resume");
        }
    }
    Ok(())
}

pub async fn run_runs_command(workspace_dir: &Path, args: &[String]) -> Result<()> {
    let mut agent: Option<String> = None;
    let mut limit: usize = 20;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--agent" | "-a" => {
                if i + 1 < args.len() {
                    agent = Some(args[i + 1].trim().to_uppercase());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--limit" | "-n" => {
                if i + 1 < args.len() {
                    limit = args[i + 1].parse().unwrap_or(20);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    let store = AgentStore::new(workspace_dir).await?;
    let runs = store.list_runs(agent.as_deref(), limit).await?;
    if runs.is_empty() {
        print_info("No runs recorded yet.");
        return Ok(());
    }

    let mut section = GuideSection::new("Recent Runs");
    for run in runs {
        let status = match RunStatus::from_status(&run.status) {
            Some(RunStatus::Completed) => style(run.status.clone()).green(),
            Some(RunStatus::Failed) => style(run.status.clone()).red(),
            _ => style(run.status.clone()).yellow(),
        };
        section = section.text(&format!(
            "#{:<6} {:<20} {:<10} started {}",
            run.id,
            run.agent_type,
            status,
            run.started_at
        ));
    }
    section.print();
    println!();
    Ok(())
}
