use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pairbook_core::Index;

#[derive(Parser, Debug)]
#[clap(author, version, about = "A personal contact book with partner pairings")]
pub struct Cli {
    /// Path to the contacts file
    #[clap(long, short = 'f')]
    pub file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

/// Field values shared by `add` and `edit`
#[derive(clap::Args, Debug, Default)]
pub struct FieldArgs {
    /// Name of the contact
    #[clap(long)]
    pub name: Option<String>,

    /// Phone number
    #[clap(long)]
    pub phone: Option<String>,

    /// Email address
    #[clap(long)]
    pub email: Option<String>,

    /// Postal address
    #[clap(long)]
    pub address: Option<String>,

    /// Tags for the contact (comma-separated)
    #[clap(long)]
    pub tags: Option<String>,

    /// Free-text remark
    #[clap(long)]
    pub remark: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new contact
    Add {
        #[clap(flatten)]
        fields: FieldArgs,
    },

    /// List contacts with their partners
    List {
        /// Only show contacts carrying this tag (repeatable)
        #[clap(long = "tag")]
        tags: Vec<String>,

        /// Only show contacts with this word in their name (repeatable)
        #[clap(long = "name")]
        names: Vec<String>,
    },

    /// Show details for a specific contact
    Show {
        /// Position of the contact in `list`
        index: Index,
    },

    /// Edit an existing contact
    Edit {
        /// Position of the contact in `list`
        index: Index,

        #[clap(flatten)]
        fields: FieldArgs,

        /// Reset the phone number to its default
        #[clap(long, conflicts_with = "phone")]
        clear_phone: bool,

        /// Reset the email address to its default
        #[clap(long, conflicts_with = "email")]
        clear_email: bool,

        /// Reset the postal address to its default
        #[clap(long, conflicts_with = "address")]
        clear_address: bool,

        /// Remove every tag
        #[clap(long, conflicts_with = "tags")]
        clear_tags: bool,

        /// Remove the remark
        #[clap(long, conflicts_with = "remark")]
        clear_remark: bool,
    },

    /// Delete a contact
    Del {
        /// Position of the contact in `list`
        index: Index,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Pair a contact with one or more others
    Pair {
        /// Position of the contact in `list`
        index: Index,

        /// Positions of the partners
        #[clap(required = true)]
        targets: Vec<Index>,
    },

    /// Remove pairings between a contact and one or more others
    Unpair {
        /// Position of the contact in `list`
        index: Index,

        /// Positions of the partners
        #[clap(required = true)]
        targets: Vec<Index>,
    },

    /// Export contacts to JSON
    Export {
        /// Output file path (prints to stdout if omitted)
        #[clap(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show the configuration, or update it when options are given
    Config {
        /// Contacts file to use by default
        #[clap(long)]
        contacts_path: Option<PathBuf>,

        /// Log filter used when RUST_LOG is not set (e.g. "pairbook=debug")
        #[clap(long)]
        log_filter: Option<String>,
    },
}
