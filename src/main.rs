use chrono::Local;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, HistoryCommands};
use config::Config;
use spoolr::domain::{Spool, UsageEntry, UsageKey};
use spoolr::inventory::{Inventory, NewSpool, SpoolFilter, SpoolUpdate, UsageEdit};
use spoolr::storage::{self, Storage, WorkbookStore};

fn setup_logging() -> Result<()> {
    let log_dir = config::default_data_dir().join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("spoolr.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{} {}", "Data file:".yellow(), config.storage.data_file.display());
    }

    let store = WorkbookStore::new(&config.storage.data_file);
    store
        .ensure_initialized()
        .with_context(|| format!("Failed to initialize {}", config.storage.data_file.display()))?;
    let inventory = Inventory::with_timestamp_format(&store, config.usage.timestamp_format.clone());

    match &cli.command {
        None => handle_list_command(&inventory, &SpoolFilter::default()),
        Some(Commands::Init) => {
            println!("{} {}", "Ready:".green(), store.path().display());
            Ok(())
        }
        Some(Commands::List {
            material,
            supplier,
            min_weight,
        }) => {
            let filter = SpoolFilter {
                material: material.clone(),
                supplier: supplier.clone(),
                min_weight: *min_weight,
            };
            handle_list_command(&inventory, &filter)
        }
        Some(Commands::Show { code }) => handle_show_command(&inventory, code),
        Some(Commands::Add {
            material,
            variant,
            supplier,
            weight,
            empty_spool_weight,
            date,
            color,
            description,
        }) => {
            let new = NewSpool {
                material: material.clone(),
                variant: variant.clone(),
                supplier: supplier.clone(),
                date_opened: date.unwrap_or_else(|| Local::now().date_naive()),
                weight: *weight,
                empty_spool_weight: *empty_spool_weight,
                hex_color: color.clone(),
                description: description.clone(),
            };
            let spool = inventory.add_spool(new).context("Failed to add spool")?;
            println!("{} {} ({})", "Added:".green(), spool.code, spool.label());
            Ok(())
        }
        Some(Commands::Edit {
            code,
            material,
            variant,
            supplier,
            weight,
            empty_spool_weight,
            date,
            color,
            description,
        }) => {
            let update = SpoolUpdate {
                material: material.clone(),
                variant: variant.clone(),
                supplier: supplier.clone(),
                date_opened: *date,
                weight: *weight,
                empty_spool_weight: *empty_spool_weight,
                hex_color: color.clone(),
                description: description.clone(),
            };
            let spool = inventory
                .update_spool(code, update)
                .with_context(|| format!("Failed to update spool {}", code))?;
            println!("{} {}", "Updated:".green(), spool.code);
            print_spool(&spool);
            Ok(())
        }
        Some(Commands::Delete { code }) => {
            let spool = inventory
                .delete_spool(code)
                .with_context(|| format!("Failed to delete spool {}", code))?;
            println!("{} {} ({})", "Deleted:".red(), spool.code, spool.label());
            Ok(())
        }
        Some(Commands::Use { code, grams, name }) => {
            let entry = inventory
                .register_usage(code, name, *grams)
                .context("Failed to register usage")?;
            println!(
                "{} '{}' used {:.0}g of {}, {:.0}g left",
                "Registered:".green(),
                entry.print_name,
                entry.used_weight,
                entry.filament_code,
                entry.remaining_weight
            );
            Ok(())
        }
        Some(Commands::History { command }) => handle_history_command(&inventory, command.as_ref()),
        Some(Commands::NextCode) => {
            println!("{}", inventory.next_code()?);
            Ok(())
        }
        Some(Commands::Backup { dest }) => {
            let dest = dest
                .clone()
                .unwrap_or_else(|| PathBuf::from(storage::default_backup_name()));
            let report = storage::create_backup(store.path(), &dest).context("Failed to create backup")?;
            println!("{} {}", "Backup created:".green(), report.path.display());
            println!("  {} bytes, sha256 {}", report.bytes, report.sha256);
            Ok(())
        }
        Some(Commands::Restore { source }) => {
            let report = storage::restore_backup(store.path(), source, &config.backup_dir())
                .context("Failed to restore backup")?;
            println!("{} {}", "Restored from:".green(), report.restored_from.display());
            if let Some(copy) = report.safety_copy {
                println!("  Previous data saved to {}", copy.display());
            }
            Ok(())
        }
    }
}

fn handle_list_command<S: Storage>(inventory: &Inventory<'_, S>, filter: &SpoolFilter) -> Result<()> {
    info!("Listing spools: {:?}", filter);
    let spools = inventory.find_spools(filter)?;
    if spools.is_empty() {
        println!("{}", "No spools match.".yellow());
        return Ok(());
    }
    for spool in &spools {
        print_spool(spool);
    }
    Ok(())
}

fn handle_show_command<S: Storage>(inventory: &Inventory<'_, S>, code: &str) -> Result<()> {
    let spool = inventory.get_spool(code)?;
    print_spool(&spool);
    println!("  supplier: {}, opened {}", spool.supplier, spool.date_opened);
    println!("  empty spool: {:.0}g, color {}", spool.empty_spool_weight, spool.hex_color);
    if !spool.description.is_empty() {
        println!("  {}", spool.description);
    }
    let entries = inventory.list_usage(Some(code))?;
    if !entries.is_empty() {
        println!("{}", "History:".cyan());
        for entry in entries.iter().rev() {
            print_entry(entry);
        }
    }
    Ok(())
}

fn handle_history_command<S: Storage>(inventory: &Inventory<'_, S>, command: Option<&HistoryCommands>) -> Result<()> {
    info!("Handling history command: {:?}", command);
    match command {
        None => print_history(inventory, None),
        Some(HistoryCommands::List { code }) => print_history(inventory, code.as_deref()),
        Some(HistoryCommands::Edit {
            timestamp,
            code,
            used,
            name,
        }) => {
            let key = UsageKey::new(timestamp.as_str(), code.as_str());
            let edit = UsageEdit {
                used_weight: *used,
                print_name: name.clone(),
            };
            let entry = inventory
                .edit_usage(&key, edit)
                .with_context(|| format!("Failed to edit entry {}", key))?;
            println!("{}", "Entry updated:".green());
            print_entry(&entry);
            Ok(())
        }
        Some(HistoryCommands::Remove { timestamp, code }) => {
            let key = UsageKey::new(timestamp.as_str(), code.as_str());
            let entry = inventory
                .delete_usage(&key)
                .with_context(|| format!("Failed to remove entry {}", key))?;
            println!("{} {} ({:.0}g)", "Entry removed:".red(), entry.print_name, entry.used_weight);
            Ok(())
        }
    }
}

fn print_history<S: Storage>(inventory: &Inventory<'_, S>, code: Option<&str>) -> Result<()> {
    let entries = inventory.list_usage(code)?;
    if entries.is_empty() {
        println!("{}", "No prints logged.".yellow());
        return Ok(());
    }
    for entry in entries.iter().rev() {
        print_entry(entry);
    }
    Ok(())
}

fn print_spool(spool: &Spool) {
    println!(
        "{}  {:<24} {:>7.0}g  {}",
        spool.code.bold(),
        spool.label(),
        spool.weight,
        spool.hex_color.dimmed()
    );
}

fn print_entry(entry: &UsageEntry) {
    println!(
        "{}  {:<24} {} {:<16} {:>6.0}g  {:>6.0}g left",
        entry.timestamp.dimmed(),
        entry.print_name,
        entry.filament_code,
        format!("{} {}", entry.material, entry.variant),
        entry.used_weight,
        entry.remaining_weight
    );
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
