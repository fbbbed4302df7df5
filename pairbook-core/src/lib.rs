pub mod builder;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod fields;
pub mod filter;
pub mod identity;
pub mod model;
pub mod models;
pub mod storage;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use builder::ContactBuilder;
pub use commands::{CommandResult, PairCommand, UnpairCommand};
pub use config::{determine_contacts_path, get_config_path, Config};
pub use error::{BuildError, CommandError, FieldError, ModelError, PairingError};
pub use fields::{
    Address, Email, Name, Phone, Remark, Tag, DEFAULT_ADDRESS, DEFAULT_EMAIL, DEFAULT_PHONE,
};
pub use filter::{ContactFilter, Index, IndexParseError};
pub use identity::is_same_person;
pub use model::{ContactModel, Listener, ModelEvent, ModelManager};
pub use models::{Contact, ContactBook, PartnersView};
pub use storage::{Storage, StorageError};
