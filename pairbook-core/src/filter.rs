//! Display filters and positions into the displayed list

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::fields::Tag;
use crate::models::Contact;

/// A position in the currently displayed contact list
///
/// Stored zero-based; users see and type one-based positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index(usize);

impl Index {
    pub fn from_zero_based(index: usize) -> Self {
        Self(index)
    }

    /// Returns `None` for 0, which is not a valid one-based position
    pub fn from_one_based(index: usize) -> Option<Self> {
        index.checked_sub(1).map(Self)
    }

    pub fn zero_based(&self) -> usize {
        self.0
    }

    pub fn one_based(&self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.one_based())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Index must be a positive integer: '{0}'")]
pub struct IndexParseError(String);

impl FromStr for Index {
    type Err = IndexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(Index::from_one_based)
            .ok_or_else(|| IndexParseError(s.to_string()))
    }
}

/// Which contacts are currently displayed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContactFilter {
    #[default]
    All,
    /// Any keyword equals a whole word of the name, ignoring case
    NameContains(Vec<String>),
    /// The contact carries at least one of the tags, ignoring case
    TagsContain(BTreeSet<Tag>),
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            ContactFilter::All => true,
            ContactFilter::NameContains(keywords) => {
                let name = contact.name().as_str().to_lowercase();
                keywords.iter().any(|keyword| {
                    let keyword = keyword.to_lowercase();
                    name.split_whitespace().any(|word| word == keyword)
                })
            }
            ContactFilter::TagsContain(tags) => tags
                .iter()
                .any(|wanted| contact.tags().iter().any(|tag| tag.matches(wanted))),
        }
    }
}

impl fmt::Display for ContactFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactFilter::All => write!(f, "all contacts"),
            ContactFilter::NameContains(keywords) => {
                write!(f, "name contains [{}]", keywords.join(", "))
            }
            ContactFilter::TagsContain(tags) => {
                let tags: Vec<&str> = tags.iter().map(Tag::as_str).collect();
                write!(f, "tags contain [{}]", tags.join(", "))
            }
        }
    }
}
