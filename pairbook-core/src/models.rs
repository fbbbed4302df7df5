use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;
use uuid::Uuid;

use crate::error::PairingError;
use crate::fields::{Address, Email, Name, Phone, Remark, Tag};

/// Represents a single person in the contact book
///
/// A contact is immutable apart from its partner list, which only the owning
/// `ContactBook` may change (always for both sides of a pair at once). Partner
/// links are stored as contact ids; lookups go through the book.
#[derive(Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Stable identifier, used as the key for replace and for partner links
    pub(crate) id: Uuid,

    pub(crate) name: Name,
    pub(crate) phone: Phone,
    pub(crate) email: Email,
    pub(crate) address: Address,

    #[serde(default)]
    pub(crate) tags: BTreeSet<Tag>,

    #[serde(default, skip_serializing_if = "Remark::is_empty")]
    pub(crate) remark: Remark,

    /// Ids of paired contacts, sorted by partner name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) partners: Vec<Uuid>,
}

impl Contact {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    pub fn remark(&self) -> &Remark {
        &self.remark
    }

    /// Ids of this contact's partners, in partner-name order
    pub fn partner_ids(&self) -> &[Uuid] {
        &self.partners
    }

    pub fn is_paired_with(&self, other: &Uuid) -> bool {
        self.partners.contains(other)
    }
}

// Equality and hashing ignore the id and the partner list.
impl PartialEq for Contact {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.phone == other.phone
            && self.email == other.email
            && self.address == other.address
            && self.tags == other.tags
            && self.remark == other.remark
    }
}

impl Eq for Contact {}

impl Hash for Contact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.phone.hash(state);
        self.email.hash(state);
        self.address.hash(state);
        self.tags.hash(state);
        self.remark.hash(state);
    }
}

impl fmt::Debug for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contact")
            .field("id", &self.id)
            .field("name", &self.name.as_str())
            .field("phone", &self.phone.as_str())
            .field("email", &self.email.as_str())
            .field("address", &self.address.as_str())
            .field("tags", &self.tags)
            .field("remark", &self.remark.as_str())
            .field("partners", &self.partners)
            .finish()
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Read-only view of a contact's partners, resolved through the book
#[derive(Debug, Clone, Copy)]
pub struct PartnersView<'a> {
    book: &'a ContactBook,
    ids: &'a [Uuid],
}

impl<'a> PartnersView<'a> {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &'a [Uuid] {
        self.ids
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    /// Partner contacts in partner-name order
    pub fn iter(&self) -> impl Iterator<Item = &'a Contact> + 'a {
        let book = self.book;
        self.ids.iter().filter_map(move |id| book.get(id))
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Collection of all contacts
///
/// Acts as the arena for the pairing graph: every partner link is an id that
/// must resolve to a contact in the same book, and links are always held on
/// both sides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactBook {
    #[serde(default)]
    contacts: Vec<Contact>,
}

impl ContactBook {
    /// Creates an empty contact book
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Gets a contact by ID
    pub fn get(&self, id: &Uuid) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == *id)
    }

    fn position(&self, id: &Uuid) -> Option<usize> {
        self.contacts.iter().position(|c| c.id == *id)
    }

    fn require(&self, id: &Uuid) -> Result<usize, PairingError> {
        self.position(id).ok_or(PairingError::ContactNotFound(*id))
    }

    fn name_of(&self, id: &Uuid) -> String {
        self.get(id)
            .map(|c| c.name.as_str().to_string())
            .unwrap_or_default()
    }

    /// Returns the partners of a contact, or `None` if the contact is unknown
    pub fn partners_view(&self, id: &Uuid) -> Option<PartnersView<'_>> {
        self.get(id).map(|c| PartnersView {
            book: self,
            ids: &c.partners,
        })
    }

    /// Adds a contact to the book
    ///
    /// Any partner ids the contact already carries must refer to existing
    /// contacts; the matching back-links are added so the graph stays
    /// symmetric.
    pub fn add(&mut self, contact: Contact) -> Result<(), PairingError> {
        if self.position(&contact.id).is_some() {
            return Err(PairingError::InternalConsistency(format!(
                "contact id {} is already in use",
                contact.id
            )));
        }
        let mut seen = HashSet::new();
        for partner in &contact.partners {
            if *partner == contact.id {
                return Err(PairingError::SelfPairing);
            }
            self.require(partner)?;
            if !seen.insert(*partner) {
                return Err(PairingError::DuplicatePairing {
                    first: contact.name.as_str().to_string(),
                    second: self.name_of(partner),
                });
            }
        }

        let id = contact.id;
        let partners = contact.partners.clone();
        self.contacts.push(contact);
        for partner in &partners {
            if let Some(pos) = self.position(partner) {
                self.contacts[pos].partners.push(id);
            }
            self.sort_partners(partner);
        }
        self.sort_partners(&id);
        Ok(())
    }

    /// Removes a contact and every partner link pointing at it
    pub fn remove(&mut self, id: &Uuid) -> Option<Contact> {
        let pos = self.position(id)?;
        let removed = self.contacts.remove(pos);
        for contact in &mut self.contacts {
            contact.partners.retain(|p| p != id);
        }
        Some(removed)
    }

    /// Pairs two contacts. Call this from one side only: pairing the same two
    /// contacts again, in either order, fails with `DuplicatePairing`.
    pub fn pair(&mut self, first: &Uuid, second: &Uuid) -> Result<(), PairingError> {
        if first == second {
            return Err(PairingError::SelfPairing);
        }
        let a = self.require(first)?;
        let b = self.require(second)?;

        let forward = self.contacts[a].partners.contains(second);
        let backward = self.contacts[b].partners.contains(first);
        if forward != backward {
            return Err(self.asymmetry(first, second));
        }
        if forward {
            return Err(PairingError::DuplicatePairing {
                first: self.name_of(first),
                second: self.name_of(second),
            });
        }

        self.contacts[a].partners.push(*second);
        self.contacts[b].partners.push(*first);
        self.sort_partners(first);
        self.sort_partners(second);
        debug!(first = %first, second = %second, "paired contacts");
        Ok(())
    }

    /// Removes the pairing between two contacts
    pub fn unpair(&mut self, first: &Uuid, second: &Uuid) -> Result<(), PairingError> {
        if first == second {
            return Err(PairingError::SelfPairing);
        }
        let a = self.require(first)?;
        let b = self.require(second)?;

        let forward = self.contacts[a].partners.contains(second);
        let backward = self.contacts[b].partners.contains(first);
        if forward != backward {
            return Err(self.asymmetry(first, second));
        }
        if !forward {
            return Err(PairingError::NoSuchPairing {
                first: self.name_of(first),
                second: self.name_of(second),
            });
        }

        self.contacts[a].partners.retain(|p| p != second);
        self.contacts[b].partners.retain(|p| p != first);
        self.sort_partners(first);
        self.sort_partners(second);
        debug!(first = %first, second = %second, "unpaired contacts");
        Ok(())
    }

    fn asymmetry(&self, first: &Uuid, second: &Uuid) -> PairingError {
        PairingError::InternalConsistency(format!(
            "pairing between {} and {} is recorded on one side only",
            self.name_of(first),
            self.name_of(second)
        ))
    }

    /// Stable sort of a contact's partners by partner name
    fn sort_partners(&mut self, id: &Uuid) {
        let Some(pos) = self.position(id) else {
            return;
        };
        let mut keyed: Vec<(String, Uuid)> = self.contacts[pos]
            .partners
            .iter()
            .map(|p| (self.name_of(p), *p))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        self.contacts[pos].partners = keyed.into_iter().map(|(_, p)| p).collect();
    }

    /// Re-sorts every partner list. Used after loading and after renames.
    pub(crate) fn sort_all_partners(&mut self) {
        let ids: Vec<Uuid> = self.contacts.iter().map(|c| c.id).collect();
        for id in &ids {
            self.sort_partners(id);
        }
    }

    /// Replaces contacts by identity
    ///
    /// Each `(old_id, contact)` swaps the stored contact with id `old_id` for
    /// `contact`, keeping its position in the book. When the new contact has a
    /// different id every link to the old id is rewritten. The whole batch is
    /// applied before the graph is checked; if the result is inconsistent the
    /// book is left exactly as it was.
    pub fn replace_all(&mut self, updates: Vec<(Uuid, Contact)>) -> Result<(), PairingError> {
        let snapshot = self.contacts.clone();
        match self.apply_replacements(updates) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.contacts = snapshot;
                Err(e)
            }
        }
    }

    /// Replaces a single contact by identity. See `replace_all`.
    pub fn replace(&mut self, old_id: &Uuid, contact: Contact) -> Result<(), PairingError> {
        self.replace_all(vec![(*old_id, contact)])
    }

    fn apply_replacements(&mut self, updates: Vec<(Uuid, Contact)>) -> Result<(), PairingError> {
        for (old_id, contact) in updates {
            let pos = self.require(&old_id)?;
            let new_id = contact.id;
            if new_id != old_id && self.position(&new_id).is_some() {
                return Err(PairingError::InternalConsistency(format!(
                    "contact id {} is already in use",
                    new_id
                )));
            }
            self.contacts[pos] = contact;
            if new_id != old_id {
                for other in &mut self.contacts {
                    for partner in &mut other.partners {
                        if *partner == old_id {
                            *partner = new_id;
                        }
                    }
                }
            }
            debug!(old_id = %old_id, new_id = %new_id, "replaced contact");
        }
        self.sort_all_partners();
        self.validate()
    }

    /// Checks that every partner list is free of self-links and duplicates,
    /// only names contacts in this book, and is mirrored on the other side
    pub fn validate(&self) -> Result<(), PairingError> {
        for contact in &self.contacts {
            let mut seen = HashSet::new();
            for partner in &contact.partners {
                if *partner == contact.id {
                    return Err(PairingError::InternalConsistency(format!(
                        "{} is paired with itself",
                        contact.name
                    )));
                }
                if !seen.insert(*partner) {
                    return Err(PairingError::InternalConsistency(format!(
                        "{} lists partner {} more than once",
                        contact.name, partner
                    )));
                }
                let Some(other) = self.get(partner) else {
                    return Err(PairingError::InternalConsistency(format!(
                        "{} lists unknown partner {}",
                        contact.name, partner
                    )));
                };
                if !other.partners.contains(&contact.id) {
                    return Err(self.asymmetry(&contact.id, partner));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ContactBuilder;
    use crate::fixtures::{person, typical_book};
    use std::collections::hash_map::DefaultHasher;

    fn id_of(book: &ContactBook, name: &str) -> Uuid {
        book.contacts()
            .iter()
            .find(|c| c.name().as_str() == name)
            .map(|c| c.id())
            .unwrap()
    }

    fn hash_of(contact: &Contact) -> u64 {
        let mut hasher = DefaultHasher::new();
        contact.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_pair_is_symmetric() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");

        book.pair(&alice, &bob).unwrap();

        assert!(book.get(&alice).unwrap().is_paired_with(&bob));
        assert!(book.get(&bob).unwrap().is_paired_with(&alice));
        assert!(book.validate().is_ok());
    }

    #[test]
    fn test_unpair_removes_both_sides() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");
        book.pair(&alice, &bob).unwrap();

        book.unpair(&bob, &alice).unwrap();

        assert!(book.get(&alice).unwrap().partner_ids().is_empty());
        assert!(book.get(&bob).unwrap().partner_ids().is_empty());
    }

    #[test]
    fn test_pair_twice_fails_and_leaves_lists_unchanged() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");
        book.pair(&alice, &bob).unwrap();

        let result = book.pair(&alice, &bob);
        assert!(matches!(result, Err(PairingError::DuplicatePairing { .. })));
        let reversed = book.pair(&bob, &alice);
        assert!(matches!(reversed, Err(PairingError::DuplicatePairing { .. })));

        assert_eq!(book.get(&alice).unwrap().partner_ids(), &[bob]);
        assert_eq!(book.get(&bob).unwrap().partner_ids(), &[alice]);
    }

    #[test]
    fn test_duplicate_pairing_message_names_both() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");
        book.pair(&alice, &bob).unwrap();

        let err = book.pair(&alice, &bob).unwrap_err();
        assert_eq!(err.to_string(), "Alice and Bob already paired.");
    }

    #[test]
    fn test_self_pairing_rejected() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");

        assert_eq!(book.pair(&alice, &alice), Err(PairingError::SelfPairing));
        assert_eq!(book.unpair(&alice, &alice), Err(PairingError::SelfPairing));
    }

    #[test]
    fn test_unpair_without_pairing_fails() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");

        let result = book.unpair(&alice, &bob);
        assert!(matches!(result, Err(PairingError::NoSuchPairing { .. })));
    }

    #[test]
    fn test_pair_unknown_contact() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let stranger = Uuid::new_v4();

        assert_eq!(
            book.pair(&alice, &stranger),
            Err(PairingError::ContactNotFound(stranger))
        );
        assert!(book.get(&alice).unwrap().partner_ids().is_empty());
    }

    #[test]
    fn test_partners_sorted_by_name() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");
        let carol = id_of(&book, "Carol");
        let daniel = id_of(&book, "Daniel");

        book.pair(&alice, &daniel).unwrap();
        book.pair(&alice, &bob).unwrap();
        book.pair(&carol, &alice).unwrap();

        let view = book.partners_view(&alice).unwrap();
        assert_eq!(view.names(), vec!["Bob", "Carol", "Daniel"]);
    }

    #[test]
    fn test_partners_with_same_name_keep_pairing_order() {
        let mut book = typical_book();
        let first_sam = person("Sam", "91110001", "sam.one@example.com");
        let second_sam = person("Sam", "91110002", "sam.two@example.com");
        let (first_sam_id, second_sam_id) = (first_sam.id(), second_sam.id());
        book.add(first_sam).unwrap();
        book.add(second_sam).unwrap();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");

        book.pair(&alice, &second_sam_id).unwrap();
        book.pair(&alice, &first_sam_id).unwrap();
        book.pair(&alice, &bob).unwrap();

        assert_eq!(
            book.get(&alice).unwrap().partner_ids(),
            &[bob, second_sam_id, first_sam_id]
        );
    }

    #[test]
    fn test_partners_view_tracks_later_changes() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");

        assert!(book.partners_view(&alice).unwrap().is_empty());
        book.pair(&alice, &bob).unwrap();

        let view = book.partners_view(&alice).unwrap();
        assert_eq!(view.len(), 1);
        assert!(view.contains(&bob));
        assert_eq!(view.iter().next().unwrap().name().as_str(), "Bob");
    }

    #[test]
    fn test_equality_excludes_partners() {
        let mut book = ContactBook::new();
        let twin = person("Twin", "91234567", "twin@example.com");
        let copy = ContactBuilder::from_contact(&twin)
            .id(Uuid::new_v4())
            .build()
            .unwrap();
        let other = person("Other", "98765432", "other@example.com");
        let (twin_id, other_id) = (twin.id(), other.id());
        book.add(twin).unwrap();
        book.add(other).unwrap();
        book.pair(&twin_id, &other_id).unwrap();

        let paired = book.get(&twin_id).unwrap();
        assert_ne!(paired.partner_ids(), copy.partner_ids());
        assert_eq!(paired, &copy);
        assert_eq!(hash_of(paired), hash_of(&copy));
    }

    #[test]
    fn test_debug_does_not_recurse_into_partners() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");
        book.pair(&alice, &bob).unwrap();

        let printed = format!("{:?}", book.get(&alice).unwrap());
        assert!(printed.contains(&bob.to_string()));
        assert!(!printed.contains("\"Bob\""));
    }

    #[test]
    fn test_add_with_partners_links_back() {
        let mut book = typical_book();
        let bob = id_of(&book, "Bob");
        let zed = ContactBuilder::new()
            .name(Name::new("Zed").unwrap())
            .partners(vec![bob])
            .build()
            .unwrap();
        let zed_id = zed.id();

        book.add(zed).unwrap();

        assert!(book.get(&bob).unwrap().is_paired_with(&zed_id));
        assert!(book.validate().is_ok());
    }

    #[test]
    fn test_add_rejects_unknown_partner() {
        let mut book = typical_book();
        let ghost = Uuid::new_v4();
        let zed = ContactBuilder::new()
            .name(Name::new("Zed").unwrap())
            .partners(vec![ghost])
            .build()
            .unwrap();

        assert_eq!(book.add(zed), Err(PairingError::ContactNotFound(ghost)));
        assert_eq!(book.len(), 5);
    }

    #[test]
    fn test_remove_strips_back_links() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");
        book.pair(&alice, &bob).unwrap();

        let removed = book.remove(&bob).unwrap();

        assert_eq!(removed.name().as_str(), "Bob");
        assert!(book.get(&alice).unwrap().partner_ids().is_empty());
        assert!(book.validate().is_ok());
    }

    #[test]
    fn test_replace_carries_partners_and_resorts() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");
        let carol = id_of(&book, "Carol");
        book.pair(&alice, &bob).unwrap();
        book.pair(&alice, &carol).unwrap();

        let renamed = ContactBuilder::from_contact(book.get(&bob).unwrap())
            .name(Name::new("Zoe").unwrap())
            .build()
            .unwrap();
        book.replace(&bob, renamed).unwrap();

        let view = book.partners_view(&alice).unwrap();
        assert_eq!(view.names(), vec!["Carol", "Zoe"]);
        assert!(book.get(&bob).unwrap().is_paired_with(&alice));
    }

    #[test]
    fn test_replace_with_new_id_rewrites_links() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");
        book.pair(&alice, &bob).unwrap();

        let fresh = ContactBuilder::from_contact(book.get(&bob).unwrap())
            .id(Uuid::new_v4())
            .build()
            .unwrap();
        let fresh_id = fresh.id();
        book.replace(&bob, fresh).unwrap();

        assert!(book.get(&bob).is_none());
        assert_eq!(book.get(&alice).unwrap().partner_ids(), &[fresh_id]);
    }

    #[test]
    fn test_replace_rolls_back_on_asymmetry() {
        let mut book = typical_book();
        let alice = id_of(&book, "Alice");
        let bob = id_of(&book, "Bob");

        let one_sided = ContactBuilder::from_contact(book.get(&alice).unwrap())
            .partners(vec![bob])
            .build()
            .unwrap();
        let result = book.replace(&alice, one_sided);

        assert!(matches!(result, Err(PairingError::InternalConsistency(_))));
        assert!(book.get(&alice).unwrap().partner_ids().is_empty());
    }

    #[test]
    fn test_validate_detects_dangling_partner() {
        let yaml = format!(
            "contacts:\n  - id: '{}'\n    name: Alice\n    phone: '000'\n    email: default@email\n    address: Default Address\n    partners: ['{}']\n",
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let book: ContactBook = serde_yaml::from_str(&yaml).unwrap();
        assert!(matches!(
            book.validate(),
            Err(PairingError::InternalConsistency(_))
        ));
    }
}
