//! Typical contacts shared by the unit tests

use crate::builder::ContactBuilder;
use crate::fields::{Email, Name, Phone, Tag};
use crate::model::ModelManager;
use crate::models::{Contact, ContactBook};

pub(crate) fn person(name: &str, phone: &str, email: &str) -> Contact {
    ContactBuilder::new()
        .name(Name::new(name).unwrap())
        .phone(Phone::new(phone).unwrap())
        .email(Email::new(email).unwrap())
        .build()
        .unwrap()
}

pub(crate) fn person_with_defaults(name: &str) -> Contact {
    ContactBuilder::new()
        .name(Name::new(name).unwrap())
        .build()
        .unwrap()
}

fn tagged(contact: Contact, tags: &[&str]) -> Contact {
    ContactBuilder::from_contact(&contact)
        .tags(tags.iter().map(|t| Tag::new(t).unwrap()))
        .build()
        .unwrap()
}

/// Alice, Bob, Carol, Daniel and Elle, unpaired. Alice and Bob are tagged
/// `friends`; Elle has only default contact details.
pub(crate) fn typical_book() -> ContactBook {
    let mut book = ContactBook::new();
    let contacts = [
        tagged(person("Alice", "94351253", "alice@example.com"), &["friends"]),
        tagged(
            person("Bob", "98765432", "bob@example.com"),
            &["owesMoney", "friends"],
        ),
        person("Carol", "95352563", "carol@example.com"),
        person("Daniel", "87652533", "daniel@example.com"),
        person_with_defaults("Elle"),
    ];
    for contact in contacts {
        book.add(contact).unwrap();
    }
    book
}

pub(crate) fn typical_model() -> ModelManager {
    ModelManager::new(typical_book())
}

/// A model holding one contact per name, in the given order
pub(crate) fn model_of(names: &[&str]) -> ModelManager {
    let mut book = ContactBook::new();
    for (i, name) in names.iter().enumerate() {
        book.add(person(name, &format!("9{:07}", i + 1), &format!("person{}@example.com", i + 1)))
            .unwrap();
    }
    ModelManager::new(book)
}
