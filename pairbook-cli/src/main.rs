mod cli;
mod prompts;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::prelude::*;

use pairbook_core::{
    determine_contacts_path, export, get_config_path, Address, CommandError, CommandResult,
    Config, Contact, ContactBook, ContactBuilder, ContactFilter, ContactModel, Email, Index,
    ModelManager, Name, PairCommand, Phone, Remark, Storage, Tag, UnpairCommand,
};

use crate::cli::{Cli, Command, FieldArgs};

const DEFAULT_LOG_FILTER: &str = "pairbook=info";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(get_config_path()?)?;
    init_tracing(&config);

    // Determine which contacts file to use
    let contacts_path = determine_contacts_path(cli.file.as_deref(), &config)?;
    debug!(path = ?contacts_path, "using contacts file");
    let storage = Storage::new(contacts_path);

    match &cli.command {
        Command::Add { fields } => {
            if fields.name.is_none() {
                let fields = prompts::prompt_new_contact(fields)?;
                add_contact(&storage, &fields)?;
            } else {
                add_contact(&storage, fields)?;
            }
        }
        Command::List { tags, names } => {
            list_contacts(&storage, tags, names)?;
        }
        Command::Show { index } => {
            show_contact(&storage, *index)?;
        }
        Command::Edit {
            index,
            fields,
            clear_phone,
            clear_email,
            clear_address,
            clear_tags,
            clear_remark,
        } => {
            let mut edits = builder_from_fields(fields)?;
            if *clear_phone {
                edits = edits.clear_phone();
            }
            if *clear_email {
                edits = edits.clear_email();
            }
            if *clear_address {
                edits = edits.clear_address();
            }
            if *clear_tags {
                edits = edits.clear_tags();
            }
            if *clear_remark {
                edits = edits.clear_remark();
            }
            edit_contact(&storage, *index, edits)?;
        }
        Command::Del { index, yes } => {
            delete_contact(&storage, *index, *yes)?;
        }
        Command::Pair { index, targets } => {
            let targets = checked_targets(*index, targets)?;
            let command = PairCommand::new(*index, targets);
            run_linkage(&storage, |model| command.execute(model))?;
        }
        Command::Unpair { index, targets } => {
            let targets = checked_targets(*index, targets)?;
            let command = UnpairCommand::new(*index, targets);
            run_linkage(&storage, |model| command.execute(model))?;
        }
        Command::Export { output } => {
            export_contacts(&storage, output.as_deref())?;
        }
        Command::Config {
            contacts_path,
            log_filter,
        } => {
            update_config(config, contacts_path, log_filter)?;
        }
    }

    Ok(())
}

/// RUST_LOG wins over the config file's `log_filter`
fn init_tracing(config: &Config) {
    let fallback = config
        .log_filter
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Applies `update_fn` to the stored book under the storage lock
fn with_model<F, T>(storage: &Storage, update_fn: F) -> Result<T>
where
    F: FnOnce(&mut ModelManager) -> Result<T>,
{
    storage.update_atomically(|book| {
        let mut model = ModelManager::new(std::mem::take(book));
        let outcome = update_fn(&mut model)?;
        *book = model.into_book();
        Ok(outcome)
    })
}

fn parse_tags(tags_str: &str) -> Result<Vec<Tag>> {
    tags_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Tag::new(s).map_err(Into::into))
        .collect()
}

fn builder_from_fields(fields: &FieldArgs) -> Result<ContactBuilder> {
    let mut builder = ContactBuilder::new();
    if let Some(name) = &fields.name {
        builder = builder.name(Name::new(name)?);
    }
    if let Some(phone) = &fields.phone {
        builder = builder.phone(Phone::new(phone)?);
    }
    if let Some(email) = &fields.email {
        builder = builder.email(Email::new(email)?);
    }
    if let Some(address) = &fields.address {
        builder = builder.address(Address::new(address)?);
    }
    if let Some(tags) = &fields.tags {
        builder = builder.tags(parse_tags(tags)?);
    }
    if let Some(remark) = &fields.remark {
        builder = builder.remark(Remark::new(remark));
    }
    Ok(builder)
}

/// The CLI is where self-pairing and repeated targets are filtered out
fn checked_targets(index: Index, targets: &[Index]) -> Result<Vec<Index>> {
    if targets.contains(&index) {
        bail!("A contact cannot be paired with themselves (index {}).", index);
    }
    let mut seen = HashSet::new();
    let distinct: Vec<Index> = targets.iter().copied().filter(|t| seen.insert(*t)).collect();
    if distinct.len() < targets.len() {
        debug!(
            requested = targets.len(),
            distinct = distinct.len(),
            "dropped repeated targets"
        );
    }
    Ok(distinct)
}

fn contact_at(model: &ModelManager, index: Index) -> Result<&Contact> {
    model
        .filtered_contact(index)
        .ok_or_else(|| CommandError::InvalidIndex(index).into())
}

fn partner_names(book: &ContactBook, contact: &Contact) -> String {
    book.partners_view(&contact.id())
        .map(|view| view.names().join(", "))
        .unwrap_or_default()
}

fn add_contact(storage: &Storage, fields: &FieldArgs) -> Result<()> {
    let contact = builder_from_fields(fields)?.build()?;
    let name = contact.name().to_string();

    with_model(storage, |model| Ok(model.add_contact(contact)?))?;

    println!("{}", format!("Contact '{}' added successfully!", name).green());
    Ok(())
}

fn list_contacts(storage: &Storage, tags: &[String], names: &[String]) -> Result<()> {
    let book = storage.load()?;

    let mut filters = Vec::new();
    if !tags.is_empty() {
        let tags = tags
            .iter()
            .map(|t| Tag::new(t.trim()))
            .collect::<Result<_, _>>()?;
        filters.push(ContactFilter::TagsContain(tags));
    }
    if !names.is_empty() {
        filters.push(ContactFilter::NameContains(names.to_vec()));
    }

    // Positions are always those of the unfiltered list
    let listed: Vec<(usize, &Contact)> = book
        .contacts()
        .iter()
        .enumerate()
        .filter(|(_, c)| filters.iter().all(|f| f.matches(c)))
        .collect();

    if listed.is_empty() {
        println!("{}", "No contacts found.".yellow());
        return Ok(());
    }

    println!(
        "{:<5} | {:<24} | {:<15} | {:<28} | {}",
        "#", "Name", "Phone", "Email", "Partners"
    );
    println!("{}", "-".repeat(100));

    for (position, contact) in listed {
        let tags: Vec<&str> = contact.tags().iter().map(Tag::as_str).collect();
        let name = if tags.is_empty() {
            contact.name().to_string()
        } else {
            format!("{} [{}]", contact.name(), tags.join(", "))
        };
        println!(
            "{:<5} | {:<24} | {:<15} | {:<28} | {}",
            Index::from_zero_based(position).to_string(),
            name,
            contact.phone().as_str(),
            contact.email().as_str(),
            partner_names(&book, contact).cyan()
        );
    }

    Ok(())
}

fn show_contact(storage: &Storage, index: Index) -> Result<()> {
    let model = ModelManager::new(storage.load()?);
    let contact = contact_at(&model, index)?;

    println!("{}", contact.name().to_string().bold());
    println!("  ID: {}", contact.id());
    println!("  Phone: {}", contact.phone());
    println!("  Email: {}", contact.email());
    println!("  Address: {}", contact.address());
    if !contact.tags().is_empty() {
        let tags: Vec<&str> = contact.tags().iter().map(Tag::as_str).collect();
        println!("  Tags: {}", tags.join(", "));
    }
    if !contact.remark().is_empty() {
        println!("  Remark: {}", contact.remark());
    }

    let partners = partner_names(model.book(), contact);
    if partners.is_empty() {
        println!("  Partners: {}", "none".dimmed());
    } else {
        println!("  Partners: {}", partners.cyan());
    }

    Ok(())
}

fn edit_contact(storage: &Storage, index: Index, edits: ContactBuilder) -> Result<()> {
    if !edits.is_any_field_edited() {
        bail!("At least one field to edit must be provided.");
    }

    let edited = with_model(storage, |model| {
        let existing = contact_at(model, index)?;
        let old_id = existing.id();
        let edited = ContactBuilder::from_contact(existing)
            .override_with(edits)
            .build()?;
        model.replace(old_id, edited.clone())?;
        Ok(edited)
    })?;

    println!("{}", format!("Edited contact: {}", edited.name()).green());
    Ok(())
}

fn delete_contact(storage: &Storage, index: Index, skip_confirm: bool) -> Result<()> {
    let model = ModelManager::new(storage.load()?);
    let contact = contact_at(&model, index)?;
    let id = contact.id();

    println!("{}", "Contact to delete:".yellow());
    println!("  Name: {}", contact.name());
    println!("  Phone: {}", contact.phone());
    println!("  Email: {}", contact.email());

    // Confirm deletion unless --yes flag is used
    if !skip_confirm && !prompts::confirm_delete(contact)? {
        println!("{}", "Deletion cancelled.".yellow());
        return Ok(());
    }

    let removed = with_model(storage, |model| {
        model
            .delete_contact(&id)
            .context("Contact was removed by another process")
    })?;

    println!("{}", format!("Deleted contact: {}", removed.name()).green());
    Ok(())
}

fn run_linkage<F>(storage: &Storage, execute: F) -> Result<()>
where
    F: FnOnce(&mut ModelManager) -> Result<CommandResult, CommandError>,
{
    let result = with_model(storage, |model| Ok(execute(model)?))?;
    println!("{} {}", "✓".green(), result.feedback());
    Ok(())
}

fn export_contacts(storage: &Storage, output: Option<&Path>) -> Result<()> {
    let book = storage.load()?;

    match output {
        Some(path) => {
            export::export_json(&book, path)?;
            println!("Exported to JSON: {}", path.display());
            println!("  Total contacts: {}", book.len());
        }
        None => println!("{}", export::contacts_to_json(&book)?),
    }

    Ok(())
}

fn update_config(
    mut config: Config,
    contacts_path: &Option<PathBuf>,
    log_filter: &Option<String>,
) -> Result<()> {
    let config_path = get_config_path()?;

    if contacts_path.is_some() || log_filter.is_some() {
        if let Some(path) = contacts_path {
            config.contacts_path = Some(path.clone());
        }
        if let Some(filter) = log_filter {
            config.log_filter = Some(filter.clone());
        }
        config.save(&config_path)?;
        println!(
            "{}",
            format!("Configuration saved to {}", config_path.display()).green()
        );
    }

    println!("Config file: {}", config_path.display());
    println!(
        "  contacts_path: {}",
        config
            .contacts_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(default)".to_string())
    );
    println!(
        "  log_filter: {}",
        config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    );
    Ok(())
}
