//! The store seam used by commands
//!
//! `ContactModel` is what the pair/unpair commands need from their
//! surroundings: ordinal access into the displayed list, identity-keyed
//! replacement, and filter control. `ModelManager` is the in-memory
//! implementation, notifying registered listeners after each change.

use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::error::ModelError;
use crate::filter::{ContactFilter, Index};
use crate::identity::is_same_person;
use crate::models::{Contact, ContactBook};

/// A change notification sent to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    Added(Uuid),
    Replaced { old_id: Uuid, new_id: Uuid },
    Removed(Uuid),
    FilterChanged,
}

pub type Listener = Box<dyn FnMut(&ModelEvent)>;

pub trait ContactModel {
    /// The full contact book, ignoring any filter
    fn book(&self) -> &ContactBook;

    /// Ids of the displayed contacts, in display order
    fn filtered_ids(&self) -> &[Uuid];

    fn contact(&self, id: &Uuid) -> Option<&Contact> {
        self.book().get(id)
    }

    fn filtered_len(&self) -> usize {
        self.filtered_ids().len()
    }

    /// The displayed contact at `index`, or `None` if it is out of range
    fn filtered_contact(&self, index: Index) -> Option<&Contact> {
        self.filtered_ids()
            .get(index.zero_based())
            .and_then(|id| self.contact(id))
    }

    /// Swaps each stored contact for its replacement, keyed by the old id.
    /// Either every replacement is applied or none is.
    fn replace_all(&mut self, updates: Vec<(Uuid, Contact)>) -> Result<(), ModelError>;

    fn replace(&mut self, old_id: Uuid, contact: Contact) -> Result<(), ModelError> {
        self.replace_all(vec![(old_id, contact)])
    }

    fn update_filter(&mut self, filter: ContactFilter);

    fn reset_filter(&mut self) {
        self.update_filter(ContactFilter::All);
    }
}

/// In-memory contact model with a display filter and change listeners
pub struct ModelManager {
    book: ContactBook,
    filter: ContactFilter,
    filtered: Vec<Uuid>,
    listeners: Vec<Listener>,
}

impl ModelManager {
    pub fn new(book: ContactBook) -> Self {
        let mut model = Self {
            book,
            filter: ContactFilter::All,
            filtered: Vec::new(),
            listeners: Vec::new(),
        };
        model.refresh_filtered();
        model
    }

    pub fn filter(&self) -> &ContactFilter {
        &self.filter
    }

    pub fn into_book(self) -> ContactBook {
        self.book
    }

    /// Registers a listener. Listeners are called in no particular order.
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Displayed contacts, in display order
    pub fn filtered_contacts(&self) -> Vec<&Contact> {
        self.filtered
            .iter()
            .filter_map(|id| self.book.get(id))
            .collect()
    }

    /// Adds a new contact, rejecting it if it is the same person as an
    /// existing one
    pub fn add_contact(&mut self, contact: Contact) -> Result<(), ModelError> {
        if let Some(existing) = self
            .book
            .contacts()
            .iter()
            .find(|c| is_same_person(c, &contact))
        {
            return Err(ModelError::DuplicateContact(existing.name().to_string()));
        }
        let id = contact.id();
        self.book.add(contact)?;
        self.refresh_filtered();
        self.notify(&[ModelEvent::Added(id)]);
        Ok(())
    }

    /// Deletes a contact, unlinking it from all of its partners
    pub fn delete_contact(&mut self, id: &Uuid) -> Option<Contact> {
        let removed = self.book.remove(id)?;
        self.refresh_filtered();
        self.notify(&[ModelEvent::Removed(*id)]);
        Some(removed)
    }

    fn refresh_filtered(&mut self) {
        let filter = &self.filter;
        self.filtered = self
            .book
            .contacts()
            .iter()
            .filter(|c| filter.matches(c))
            .map(Contact::id)
            .collect();
    }

    fn notify(&mut self, events: &[ModelEvent]) {
        for listener in &mut self.listeners {
            for event in events {
                listener(event);
            }
        }
    }
}

impl ContactModel for ModelManager {
    fn book(&self) -> &ContactBook {
        &self.book
    }

    fn filtered_ids(&self) -> &[Uuid] {
        &self.filtered
    }

    fn replace_all(&mut self, updates: Vec<(Uuid, Contact)>) -> Result<(), ModelError> {
        let replaced: Vec<Uuid> = updates.iter().map(|(old_id, _)| *old_id).collect();
        for (old_id, contact) in &updates {
            // Write-backs that keep the record's identity skip the collision search
            let unchanged = self
                .book
                .get(old_id)
                .is_some_and(|stored| is_same_person(stored, contact));
            if unchanged {
                continue;
            }
            let collision = self
                .book
                .contacts()
                .iter()
                .filter(|c| !replaced.contains(&c.id()))
                .find(|c| is_same_person(c, contact));
            if let Some(existing) = collision {
                debug!(old_id = %old_id, "replacement collides with {}", existing.name());
                return Err(ModelError::DuplicateContact(existing.name().to_string()));
            }
        }

        let events: Vec<ModelEvent> = updates
            .iter()
            .map(|(old_id, contact)| ModelEvent::Replaced {
                old_id: *old_id,
                new_id: contact.id(),
            })
            .collect();
        self.book.replace_all(updates)?;
        self.refresh_filtered();
        self.notify(&events);
        Ok(())
    }

    fn update_filter(&mut self, filter: ContactFilter) {
        self.filter = filter;
        self.refresh_filtered();
        self.notify(&[ModelEvent::FilterChanged]);
    }
}

impl fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelManager")
            .field("book", &self.book)
            .field("filter", &self.filter)
            .field("filtered", &self.filtered)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
