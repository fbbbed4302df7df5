use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::models::{Contact, ContactBook};

/// A contact as written by `export_json`, with partners named rather than
/// referenced by id
#[derive(Debug, Serialize)]
pub struct ExportedContact<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub tags: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<&'a str>,
    pub partners: Vec<&'a str>,
}

impl<'a> ExportedContact<'a> {
    fn from_contact(book: &'a ContactBook, contact: &'a Contact) -> Self {
        let partners = book
            .partners_view(&contact.id())
            .map(|view| view.names())
            .unwrap_or_default();
        Self {
            id: contact.id(),
            name: contact.name().as_str(),
            phone: contact.phone().as_str(),
            email: contact.email().as_str(),
            address: contact.address().as_str(),
            tags: contact.tags().iter().map(|t| t.as_str()).collect(),
            remark: Some(contact.remark().as_str()).filter(|r| !r.is_empty()),
            partners,
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportedBook<'a> {
    contacts: Vec<ExportedContact<'a>>,
}

/// Renders the book as pretty-printed JSON
pub fn contacts_to_json(book: &ContactBook) -> Result<String> {
    let exported = ExportedBook {
        contacts: book
            .contacts()
            .iter()
            .map(|c| ExportedContact::from_contact(book, c))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&exported)?)
}

/// Export contacts to JSON format
pub fn export_json(book: &ContactBook, output_path: &Path) -> Result<()> {
    let json = contacts_to_json(book)?;
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write export to {:?}", output_path))?;

    info!(path = ?output_path, contacts = book.len(), "exported contacts");
    Ok(())
}
