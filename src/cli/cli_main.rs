// Main CLI entrypoint
// (c) 2024 Ross Younger

use std::process::ExitCode;

use super::{
    args::{CliArgs, Command},
    styles::{ERROR, INFO},
};

use crate::{
    config::{Configuration, Manager},
    store::{options, HostRecord, Store, StoreError},
    util::setup_tracing,
};
use anstream::{eprintln, println};
use anyhow::Context as _;
use clap::Parser;
use figment::providers::Serialized;
use tabled::{settings::style::Style, Table, Tabled};

/// Main CLI entrypoint
pub fn cli() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();
    let trace_level = if args.debug {
        "trace"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    setup_tracing(trace_level, args.log_file.as_deref()).inspect_err(|e| eprintln!("{e:?}"))?;

    let mut manager = Manager::new();
    // Command-line options take precedence over everything else
    manager.merge_provider(Serialized::defaults(Configuration {
        ssh_config: args.config.clone(),
        ..Default::default()
    }));

    run(&manager, &args.command).or_else(|e| match e.downcast_ref::<StoreError>() {
        Some(
            se @ (StoreError::NotFound { .. }
            | StoreError::AlreadyExists { .. }
            | StoreError::InvalidName { .. }
            | StoreError::MoveIncomplete { .. }),
        ) => {
            eprintln!("{}ERROR{}: {se}", ERROR.render(), ERROR.render_reset());
            Ok(ExitCode::FAILURE)
        }
        _ => Err(e),
    })
}

fn open_store(manager: &Manager) -> anyhow::Result<Store> {
    let config: Configuration = manager.get().context("invalid configuration")?;
    Ok(Store::from_config(&config)?)
}

/// One row of `sshdir list`
#[derive(Tabled)]
struct HostRow {
    name: String,
    hostname: String,
    user: String,
    port: String,
    tags: String,
    file: String,
}

impl From<HostRecord> for HostRow {
    fn from(h: HostRecord) -> Self {
        Self {
            name: h.name,
            hostname: h.hostname,
            user: h.user,
            port: h.port,
            tags: h.tags.join(", "),
            file: h.source_file.display().to_string(),
        }
    }
}

fn run(manager: &Manager, command: &Command) -> anyhow::Result<ExitCode> {
    let store = || open_store(manager);
    match command {
        Command::List { json } => {
            let hosts = store()?.load(None)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&hosts)?);
            } else {
                let rows: Vec<HostRow> = hosts.into_iter().map(HostRow::from).collect();
                println!("{}", Table::new(rows).with(Style::sharp()));
            }
        }
        Command::Exists { name } => {
            if !store()?.quick_exists(name, None)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Files => {
            for file in store()?.list_config_files(None)? {
                println!("{}", file.display());
            }
        }
        Command::Show { name } => {
            let store = store()?;
            let host = store
                .find(name, None)?
                .ok_or_else(|| StoreError::not_found(name, store.entry()))?;
            println!(
                "{}# {}{}",
                INFO.render(),
                host.source_file.display(),
                INFO.render_reset()
            );
            for line in host.render() {
                println!("{line}");
            }
        }
        Command::Delete { name } => store()?.delete(name, None)?,
        Command::Move { name, destination } => store()?.move_host(name, destination)?,
        Command::OptionsToConfig { options } => println!("{}", options::to_config(options)),
        Command::OptionsToCommand { options } => println!("{}", options::to_command(options)),
        Command::ShowConfig => show_config(manager),
    }
    Ok(ExitCode::SUCCESS)
}

fn show_config(manager: &Manager) {
    let files = Manager::config_files();
    println!("Configuration files read, in order of increasing priority:");
    for f in &files {
        let note = if f.exists() { "" } else { " (not present)" };
        println!("  {}{note}", f.display());
    }
    println!("{manager}");
}
