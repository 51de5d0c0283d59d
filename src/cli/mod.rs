mod admin;
mod serve;

use anyhow::Result;
use std::path::PathBuf;

use crate::core::config::DEFAULT_API_PORT;
use crate::core::terminal::{self, GuideSection, print_error};

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Core")
        .command("serve", "Run the scheduling daemon (API + minute ticker)")
        .command("tick", "Run a single scheduling pass and exit")
        .print();

    GuideSection::new("Management")
        .command("install", "Create the workspace and seed default agents")
        .command("agents", "List, pause or resume agents")
        .command("runs", "Show recent runs from the ledger")
        .print();

    println!(
        "\n {} {} <command> [--workspace <dir>] [flags]\n",
        console::style("Usage:").bold(),
        console::style("newsdesk").green()
    );
}

fn default_workspace_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".newsdesk"))
        .unwrap_or_else(|| PathBuf::from(".newsdesk"))
}

pub(crate) fn parse_workspace_flag(args: &[String], fallback: PathBuf) -> PathBuf {
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--workspace" || args[i] == "-w" {
            if i + 1 < args.len() {
                return PathBuf::from(&args[i + 1]);
            }
            return fallback;
        }
        i += 1;
    }
    fallback
}

pub(crate) fn parse_api_server_flags(
    args: &[String],
    start: usize,
) -> (Option<String>, Option<u16>) {
    let mut api_host = None;
    let mut api_port = None;
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--api-port" => {
                if i + 1 < args.len() {
                    api_port = Some(args[i + 1].parse().unwrap_or(DEFAULT_API_PORT));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--api-host" => {
                if i + 1 < args.len() {
                    api_host = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    (api_host, api_port)
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let workspace_dir = parse_workspace_flag(&args, default_workspace_dir());

    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" => {
            let (api_host, api_port) = parse_api_server_flags(&args, 2);
            serve::run_serve(&workspace_dir, api_host, api_port).await?;
        }
        "tick" => {
            admin::run_tick(&workspace_dir).await?;
        }
        "install" => {
            admin::run_install(&workspace_dir).await?;
        }
        "agents" => {
            admin::run_agents_command(&workspace_dir, &args).await?;
        }
        "runs" => {
            admin::run_runs_command(&workspace_dir, &args).await?;
        }
        "help" | "--help" | "-h" => {
            print_help();
        }
        cmd => {
            print_error(&format!("Unknown command: {}", cmd));
            print_help();
        }
    }
    Ok(())
}
