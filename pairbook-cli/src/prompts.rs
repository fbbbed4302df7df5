use anyhow::Result;
use inquire::{Confirm, Text};

use pairbook_core::Contact;

use crate::cli::FieldArgs;

/// Prompts for the fields of a new contact. Fields already given on the
/// command line are kept and not asked for again.
pub fn prompt_new_contact(given: &FieldArgs) -> Result<FieldArgs> {
    let name = match &given.name {
        Some(name) => name.clone(),
        None => Text::new("Name:").prompt()?,
    };

    // Blank answers keep the field's default
    let optional = |label: &str, given: &Option<String>| -> Result<Option<String>> {
        if given.is_some() {
            return Ok(given.clone());
        }
        let answer = Text::new(label)
            .with_help_message("Leave blank to skip")
            .prompt()?;
        Ok(Some(answer).filter(|a| !a.trim().is_empty()))
    };

    Ok(FieldArgs {
        name: Some(name),
        phone: optional("Phone:", &given.phone)?,
        email: optional("Email:", &given.email)?,
        address: optional("Address:", &given.address)?,
        tags: optional("Tags (comma-separated):", &given.tags)?,
        remark: optional("Remark:", &given.remark)?,
    })
}

/// Asks before deleting `contact`. Defaults to no.
pub fn confirm_delete(contact: &Contact) -> Result<bool> {
    let confirm = Confirm::new(&format!("Are you sure you want to delete {}?", contact.name()))
        .with_default(false)
        .prompt()?;
    Ok(confirm)
}
