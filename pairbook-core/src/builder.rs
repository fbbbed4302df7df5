//! Staged construction of contacts
//!
//! A `ContactBuilder` holds an optional override for every field. Setters
//! always overwrite; the `_if_absent` variants only fill fields nothing has
//! assigned yet, so a late default never clobbers an earlier explicit value.
//! The `clear_` setters assign the placeholder value explicitly, which lets an
//! edit reset a field back to its default.

use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::BuildError;
use crate::fields::{Address, Email, Name, Phone, Remark, Tag};
use crate::models::Contact;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactBuilder {
    id: Option<Uuid>,
    name: Option<Name>,
    phone: Option<Phone>,
    email: Option<Email>,
    address: Option<Address>,
    tags: Option<BTreeSet<Tag>>,
    remark: Option<Remark>,
    partners: Option<Vec<Uuid>>,
}

impl ContactBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates every field from an existing contact, including its id
    /// and a copy of its partner list
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            id: Some(contact.id()),
            name: Some(contact.name().clone()),
            phone: Some(contact.phone().clone()),
            email: Some(contact.email().clone()),
            address: Some(contact.address().clone()),
            tags: Some(contact.tags().clone()),
            remark: Some(contact.remark().clone()),
            partners: Some(contact.partner_ids().to_vec()),
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: Name) -> Self {
        self.name = Some(name);
        self
    }

    pub fn name_if_absent(mut self, name: Name) -> Self {
        self.name.get_or_insert(name);
        self
    }

    pub fn phone(mut self, phone: Phone) -> Self {
        self.phone = Some(phone);
        self
    }

    pub fn phone_if_absent(mut self, phone: Phone) -> Self {
        self.phone.get_or_insert(phone);
        self
    }

    pub fn clear_phone(self) -> Self {
        self.phone(Phone::default())
    }

    pub fn email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    pub fn email_if_absent(mut self, email: Email) -> Self {
        self.email.get_or_insert(email);
        self
    }

    pub fn clear_email(self) -> Self {
        self.email(Email::default())
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn address_if_absent(mut self, address: Address) -> Self {
        self.address.get_or_insert(address);
        self
    }

    pub fn clear_address(self) -> Self {
        self.address(Address::default())
    }

    pub fn tags<I: IntoIterator<Item = Tag>>(mut self, tags: I) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    pub fn tags_if_absent<I: IntoIterator<Item = Tag>>(mut self, tags: I) -> Self {
        if self.tags.is_none() {
            self.tags = Some(tags.into_iter().collect());
        }
        self
    }

    pub fn clear_tags(mut self) -> Self {
        self.tags = Some(BTreeSet::new());
        self
    }

    pub fn remark(mut self, remark: Remark) -> Self {
        self.remark = Some(remark);
        self
    }

    pub fn remark_if_absent(mut self, remark: Remark) -> Self {
        self.remark.get_or_insert(remark);
        self
    }

    pub fn clear_remark(self) -> Self {
        self.remark(Remark::default())
    }

    pub fn partners(mut self, partners: Vec<Uuid>) -> Self {
        self.partners = Some(partners);
        self
    }

    pub fn partners_if_absent(mut self, partners: Vec<Uuid>) -> Self {
        self.partners.get_or_insert(partners);
        self
    }

    /// Overwrites every field `other` has set
    pub fn override_with(mut self, other: ContactBuilder) -> Self {
        self.id = other.id.or(self.id);
        self.name = other.name.or(self.name);
        self.phone = other.phone.or(self.phone);
        self.email = other.email.or(self.email);
        self.address = other.address.or(self.address);
        self.tags = other.tags.or(self.tags);
        self.remark = other.remark.or(self.remark);
        self.partners = other.partners.or(self.partners);
        self
    }

    /// Fills only the fields that are still unset from `other`
    pub fn override_if_absent(mut self, other: ContactBuilder) -> Self {
        self.id = self.id.or(other.id);
        self.name = self.name.or(other.name);
        self.phone = self.phone.or(other.phone);
        self.email = self.email.or(other.email);
        self.address = self.address.or(other.address);
        self.tags = self.tags.or(other.tags);
        self.remark = self.remark.or(other.remark);
        self.partners = self.partners.or(other.partners);
        self
    }

    /// Returns true if at least one field has been assigned
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some()
            || self.phone.is_some()
            || self.email.is_some()
            || self.address.is_some()
            || self.tags.is_some()
            || self.remark.is_some()
            || self.partners.is_some()
    }

    /// Builds a new contact. Unset fields fall back to their defaults and a
    /// fresh id is generated unless one was assigned.
    pub fn build(&self) -> Result<Contact, BuildError> {
        let name = self
            .name
            .clone()
            .ok_or(BuildError::MissingRequiredField("name"))?;
        Ok(Contact {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name,
            phone: self.phone.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            tags: self.tags.clone().unwrap_or_default(),
            remark: self.remark.clone().unwrap_or_default(),
            partners: self.partners.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{DEFAULT_ADDRESS, DEFAULT_EMAIL, DEFAULT_PHONE};
    use crate::fixtures::person;

    fn name(raw: &str) -> Name {
        Name::new(raw).unwrap()
    }

    #[test]
    fn test_build_requires_name() {
        let result = ContactBuilder::new()
            .phone(Phone::new("91234567").unwrap())
            .build();
        assert_eq!(result, Err(BuildError::MissingRequiredField("name")));
    }

    #[test]
    fn test_build_uses_defaults() {
        let contact = ContactBuilder::new().name(name("Alice")).build().unwrap();
        assert_eq!(contact.phone().as_str(), DEFAULT_PHONE);
        assert_eq!(contact.email().as_str(), DEFAULT_EMAIL);
        assert_eq!(contact.address().as_str(), DEFAULT_ADDRESS);
        assert!(contact.tags().is_empty());
        assert!(contact.remark().is_empty());
        assert!(contact.partner_ids().is_empty());
    }

    #[test]
    fn test_set_overwrites_but_if_absent_does_not() {
        let builder = ContactBuilder::new()
            .name(name("Alice"))
            .name(name("Alicia"))
            .name_if_absent(name("Ignored"));
        assert_eq!(builder.build().unwrap().name().as_str(), "Alicia");

        let filled = ContactBuilder::new().name_if_absent(name("Bob"));
        assert_eq!(filled.build().unwrap().name().as_str(), "Bob");
    }

    #[test]
    fn test_from_contact_keeps_original_untouched() {
        let original = person("Alice", "91234567", "alice@example.com");
        let edited = ContactBuilder::from_contact(&original)
            .phone(Phone::new("88887777").unwrap())
            .build()
            .unwrap();

        assert_eq!(original.phone().as_str(), "91234567");
        assert_eq!(edited.phone().as_str(), "88887777");
        assert_eq!(edited.id(), original.id());
        assert_eq!(edited.email(), original.email());
    }

    #[test]
    fn test_from_contact_copies_partner_list() {
        let partner = Uuid::new_v4();
        let original = ContactBuilder::new()
            .name(name("Alice"))
            .partners(vec![partner])
            .build()
            .unwrap();

        let rebuilt = ContactBuilder::from_contact(&original)
            .partners(Vec::new())
            .build()
            .unwrap();

        assert_eq!(original.partner_ids(), &[partner]);
        assert!(rebuilt.partner_ids().is_empty());
    }

    #[test]
    fn test_clear_resets_to_default() {
        let original = person("Alice", "91234567", "alice@example.com");
        let cleared = ContactBuilder::from_contact(&original)
            .clear_phone()
            .clear_email()
            .build()
            .unwrap();
        assert!(cleared.phone().is_default());
        assert!(cleared.email().is_default());

        // an explicit clear wins over a later default
        let staged = ContactBuilder::new()
            .name(name("Alice"))
            .clear_phone()
            .phone_if_absent(Phone::new("91234567").unwrap());
        assert!(staged.build().unwrap().phone().is_default());
    }

    #[test]
    fn test_override_with_and_if_absent() {
        let parsed = ContactBuilder::new().phone(Phone::new("91234567").unwrap());
        let source = ContactBuilder::new()
            .name(name("Alice"))
            .phone(Phone::new("80001111").unwrap());

        let explicit_wins = source.clone().override_with(parsed.clone()).build().unwrap();
        assert_eq!(explicit_wins.phone().as_str(), "91234567");

        let existing_wins = source.override_if_absent(parsed).build().unwrap();
        assert_eq!(existing_wins.phone().as_str(), "80001111");
    }

    #[test]
    fn test_is_any_field_edited() {
        assert!(!ContactBuilder::new().is_any_field_edited());
        assert!(ContactBuilder::new().clear_tags().is_any_field_edited());
        assert!(!ContactBuilder::new().id(Uuid::new_v4()).is_any_field_edited());
    }
}
