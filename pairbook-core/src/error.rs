//! Error types for the contact book, one enum per layer
//!
//! Everything except `PairingError::InternalConsistency` is recoverable at the
//! command boundary.

use thiserror::Error;
use uuid::Uuid;

use crate::filter::Index;

/// A raw value was rejected by one of the field constructors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Names should only contain alphanumeric characters and spaces, and it should not be blank: '{0}'")]
    InvalidName(String),

    #[error("Phone numbers should only contain digits, spaces and dashes, and be at least 3 digits long: '{0}'")]
    InvalidPhone(String),

    #[error("Emails should be of the format local-part@domain: '{0}'")]
    InvalidEmail(String),

    #[error("Addresses can take any values, and it should not be blank")]
    InvalidAddress,

    #[error("Tag names should be alphanumeric: '{0}'")]
    InvalidTag(String),
}

/// Errors raised by the pairing graph held in a `ContactBook`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairingError {
    #[error("Person cannot be paired with themselves.")]
    SelfPairing,

    #[error("{first} and {second} already paired.")]
    DuplicatePairing { first: String, second: String },

    #[error("{first} and {second} are not paired.")]
    NoSuchPairing { first: String, second: String },

    #[error("Contact not found: {0}")]
    ContactNotFound(Uuid),

    /// Stored partner lists break symmetry, contain self-links or duplicates,
    /// or point at contacts that do not exist. Always a prior bug.
    #[error("Pairing graph is inconsistent: {0}")]
    InternalConsistency(String),
}

/// Errors raised while turning a `ContactBuilder` into a `Contact`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
}

/// Errors raised by a `ContactModel` implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("This person already exists in the address book: {0}")]
    DuplicateContact(String),

    #[error(transparent)]
    Book(#[from] PairingError),
}

/// User-facing failures of the pair/unpair commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("The person index provided is invalid: {0}")]
    InvalidIndex(Index),

    #[error("This pairing already exists in the address book.")]
    PairingAlreadyExists,

    #[error("This pairing doesn't even exist in the address book yet.")]
    PairingDoesNotExist,

    #[error("Person cannot be paired with themselves.")]
    SelfPairing,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Pairing(#[from] PairingError),
}
