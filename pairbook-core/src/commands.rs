//! Pair and unpair commands
//!
//! Both commands take one primary position and any number of partner
//! positions in the displayed list. All positions are resolved and checked
//! first, the links are applied to a scratch copy of the book, and only a
//! fully successful run is written back through `ContactModel::replace_all`.
//! A failing command leaves the model untouched.

use std::collections::HashSet;
use std::iter;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CommandError, PairingError};
use crate::filter::Index;
use crate::model::ContactModel;
use crate::models::ContactBook;

/// Feedback shown to the user after a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    feedback: String,
}

impl CommandResult {
    pub fn new(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
        }
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }
}

/// Links the contact at `index` with every contact at `targets`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCommand {
    index: Index,
    targets: Vec<Index>,
}

impl PairCommand {
    pub fn new(index: Index, targets: Vec<Index>) -> Self {
        Self { index, targets }
    }

    pub fn execute<M: ContactModel + ?Sized>(
        &self,
        model: &mut M,
    ) -> Result<CommandResult, CommandError> {
        execute_linkage(model, self.index, &self.targets, Linkage::Pair)
    }
}

/// Removes the links between the contact at `index` and every contact at
/// `targets`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpairCommand {
    index: Index,
    targets: Vec<Index>,
}

impl UnpairCommand {
    pub fn new(index: Index, targets: Vec<Index>) -> Self {
        Self { index, targets }
    }

    pub fn execute<M: ContactModel + ?Sized>(
        &self,
        model: &mut M,
    ) -> Result<CommandResult, CommandError> {
        execute_linkage(model, self.index, &self.targets, Linkage::Unpair)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Linkage {
    Pair,
    Unpair,
}

impl Linkage {
    fn verb(self) -> &'static str {
        match self {
            Linkage::Pair => "Paired",
            Linkage::Unpair => "Unpaired",
        }
    }

    fn apply(self, book: &mut ContactBook, primary: &Uuid, target: &Uuid) -> Result<(), PairingError> {
        match self {
            Linkage::Pair => book.pair(primary, target),
            Linkage::Unpair => book.unpair(primary, target),
        }
    }

    fn to_command_error(self, err: PairingError) -> CommandError {
        match (self, err) {
            (_, PairingError::SelfPairing) => CommandError::SelfPairing,
            (Linkage::Pair, PairingError::DuplicatePairing { .. }) => {
                CommandError::PairingAlreadyExists
            }
            (Linkage::Unpair, PairingError::NoSuchPairing { .. }) => {
                CommandError::PairingDoesNotExist
            }
            (_, other) => CommandError::Pairing(other),
        }
    }
}

fn execute_linkage<M: ContactModel + ?Sized>(
    model: &mut M,
    index: Index,
    targets: &[Index],
    linkage: Linkage,
) -> Result<CommandResult, CommandError> {
    let primary = model
        .filtered_contact(index)
        .ok_or(CommandError::InvalidIndex(index))?;
    let primary_id = primary.id();
    let primary_name = primary.name().to_string();

    // Resolve every position before touching anything
    let mut seen = HashSet::new();
    let mut resolved: Vec<(Uuid, String)> = Vec::new();
    for target in targets {
        let contact = model
            .filtered_contact(*target)
            .ok_or(CommandError::InvalidIndex(*target))?;

        debug_assert_ne!(
            contact.id(),
            primary_id,
            "self-pairing must be rejected before a command is built"
        );
        if contact.id() == primary_id {
            return Err(CommandError::SelfPairing);
        }

        let linked = contact.is_paired_with(&primary_id);
        if linked == (linkage == Linkage::Pair) {
            warn!(
                primary = %primary_name,
                partner = %contact.name(),
                linked,
                "{} request was not filtered upstream",
                linkage.verb().to_lowercase()
            );
        }

        if seen.insert(contact.id()) {
            resolved.push((contact.id(), contact.name().to_string()));
        }
    }

    let mut scratch = model.book().clone();
    for (target_id, _) in &resolved {
        linkage
            .apply(&mut scratch, &primary_id, target_id)
            .map_err(|e| linkage.to_command_error(e))?;
    }

    let mut updates = Vec::with_capacity(resolved.len() + 1);
    for id in iter::once(primary_id).chain(resolved.iter().map(|(id, _)| *id)) {
        let contact = scratch
            .get(&id)
            .cloned()
            .ok_or(PairingError::ContactNotFound(id))?;
        updates.push((id, contact));
    }
    model.replace_all(updates)?;
    model.reset_filter();

    let names: Vec<&str> = resolved.iter().map(|(_, name)| name.as_str()).collect();
    info!(
        primary = %primary_name,
        partners = names.len(),
        "{} contacts",
        linkage.verb().to_lowercase()
    );
    Ok(CommandResult::new(format!(
        "{}: {} to {{{}}}",
        linkage.verb(),
        primary_name,
        names.join(", ")
    )))
}
