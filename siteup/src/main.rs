use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use siteup::core::types::{CommandDisposition, FileDisposition, UpdateReport};
use siteup::io::config::{SiteConfig, load_config};
use siteup::io::images::list_assets;
use siteup::io::model::OpenAiClient;
use siteup::update::run_update;
use siteup::{exit_codes, logging};

#[derive(Parser)]
#[command(name = "siteup", version, about = "LLM-assisted website content updater")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "siteup.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send the managed pages and an instruction to the model, apply the reply.
    Run {
        /// Change instruction; read interactively when omitted.
        #[arg(long)]
        instruction: Option<String>,
    },
    /// Validate the config and confirm every managed page exists.
    Check,
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::FAILED
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    match cli.command {
        Command::Run { instruction } => cmd_run(&config, instruction),
        Command::Check => cmd_check(&config),
    }
}

fn cmd_run(config: &SiteConfig, instruction: Option<String>) -> Result<()> {
    let instruction = match instruction {
        Some(text) => text,
        None => prompt_for_instruction()?,
    };
    if instruction.trim().is_empty() {
        println!("no instruction given, nothing to do");
        return Ok(());
    }

    let client = OpenAiClient::from_config(&config.model)?;
    let report = run_update(config, &client, &instruction)?;
    render_report(&report);
    Ok(())
}

fn cmd_check(config: &SiteConfig) -> Result<()> {
    for page in &config.pages {
        let path = config.site_root.join(page);
        if !path.is_file() {
            bail!("missing page {}", path.display());
        }
    }
    let assets = list_assets(&config.images_root)?;
    println!(
        "check: pages={} assets={} images_root={}",
        config.pages.len(),
        assets.len(),
        config.images_root.display()
    );
    Ok(())
}

fn prompt_for_instruction() -> Result<String> {
    print!("instruction> ");
    io::stdout().flush().context("flush prompt")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("read instruction")?;
    Ok(line.trim().to_string())
}

fn render_report(report: &UpdateReport) {
    if report.no_changes {
        println!("model reported no content changes");
    }
    for file in &report.files {
        match &file.disposition {
            FileDisposition::Written => println!("updated {}", file.label),
            FileDisposition::Unchanged => println!("unchanged {}", file.label),
            FileDisposition::UnknownLabel => {
                println!("skipped unknown label {}", file.label);
            }
            FileDisposition::Failed { error } => {
                println!("failed {}: {}", file.label, error);
            }
        }
    }
    for command in &report.commands {
        match &command.disposition {
            CommandDisposition::Applied => println!("command ok: {}", command.line),
            CommandDisposition::Rejected { reason } => {
                println!("command rejected: {} ({})", command.line, reason);
            }
            CommandDisposition::Failed { error } => {
                println!("command failed: {} ({})", command.line, error);
            }
        }
    }
    println!(
        "done: {} file(s) updated, {} command(s) applied",
        report.written(),
        report.applied()
    );
}
