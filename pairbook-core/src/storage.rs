use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::PairingError;
use crate::models::ContactBook;

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(100);

/// Error type for storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// File is locked by another process
    #[error("File is locked by another user/process: {0:?}")]
    FileLocked(PathBuf),

    /// The stored pairing graph does not hold together
    #[error("Contact file {path:?} is inconsistent: {source}")]
    Inconsistent {
        path: PathBuf,
        #[source]
        source: PairingError,
    },
}

/// Handles saving and loading the contact book from disk with file locking
///
/// Partner links are persisted as contact ids. Loading re-sorts every partner
/// list and refuses a file whose links are not symmetric.
pub struct Storage {
    file_path: PathBuf,
    lock_file_path: PathBuf,
}

impl Storage {
    /// Creates a new Storage instance
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let lock_file_path = file_path.with_extension("yaml.lock");
        Self {
            file_path,
            lock_file_path,
        }
    }

    /// Returns the path to the storage file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn open_lock_file(&self, truncate: bool) -> Result<File> {
        if let Some(parent) = self.lock_file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(truncate)
            .open(&self.lock_file_path)
            .with_context(|| format!("Failed to open lock file: {:?}", self.lock_file_path))
    }

    /// Retries `try_lock` until it succeeds or the timeout passes
    fn wait_for_lock<F>(&self, lock_file: &File, try_lock: F) -> Result<()>
    where
        F: Fn(&File) -> std::io::Result<()>,
    {
        let start = Instant::now();
        loop {
            match try_lock(lock_file) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > LOCK_TIMEOUT {
                        return Err(StorageError::FileLocked(self.file_path.clone()).into());
                    }
                    std::thread::sleep(LOCK_RETRY);
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to acquire lock on {:?}", self.lock_file_path)
                    })
                }
            }
        }
    }

    /// Acquire an exclusive lock on the file for writing
    /// Returns the lock file handle which must be held during the operation
    fn acquire_write_lock(&self) -> Result<File> {
        let mut lock_file = self.open_lock_file(true)?;
        self.wait_for_lock(&lock_file, |f| FileExt::try_lock_exclusive(f))?;

        // Lock holder info, for debugging
        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        );
        Ok(lock_file)
    }

    /// Acquire a shared lock on the file for reading
    fn acquire_read_lock(&self) -> Result<File> {
        let lock_file = self.open_lock_file(false)?;
        self.wait_for_lock(&lock_file, |f| FileExt::try_lock_shared(f))?;
        Ok(lock_file)
    }

    fn read_book(&self) -> Result<ContactBook> {
        let file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open file: {:?}", self.file_path))?;
        let reader = BufReader::new(file);

        let mut book: ContactBook = serde_yaml::from_reader(reader)
            .with_context(|| format!("Failed to parse YAML from {:?}", self.file_path))?;

        book.sort_all_partners();
        book.validate().map_err(|source| StorageError::Inconsistent {
            path: self.file_path.clone(),
            source,
        })?;
        Ok(book)
    }

    fn write_book(&self, book: &ContactBook) -> Result<()> {
        let yaml = serde_yaml::to_string(book)?;
        fs::write(&self.file_path, yaml)
            .with_context(|| format!("Failed to write file: {:?}", self.file_path))?;
        Ok(())
    }

    /// Loads the contact book, creating an empty one if the file is missing
    pub fn load(&self) -> Result<ContactBook> {
        if !self.file_path.exists() {
            let default_book = ContactBook::new();
            self.save(&default_book)?;
            return Ok(default_book);
        }

        let _lock = self.acquire_read_lock()?;
        let book = self.read_book()?;
        info!(path = ?self.file_path, contacts = book.len(), "loaded contact book");
        Ok(book)
    }

    /// Saves the contact book with file locking
    pub fn save(&self, book: &ContactBook) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Lock is released when the handle is dropped
        let _lock = self.acquire_write_lock()?;
        self.write_book(book)?;
        info!(path = ?self.file_path, contacts = book.len(), "saved contact book");
        Ok(())
    }

    /// Reloads the file under an exclusive lock, applies `update_fn` and saves
    /// the result. Nothing is written if `update_fn` fails.
    pub fn update_atomically<F, T>(&self, update_fn: F) -> Result<T>
    where
        F: FnOnce(&mut ContactBook) -> Result<T>,
    {
        if !self.file_path.exists() {
            self.save(&ContactBook::new())?;
        }

        let _lock = self.acquire_write_lock()?;
        let mut book = self.read_book()?;
        let outcome = update_fn(&mut book)?;
        self.write_book(&book)?;
        debug!(path = ?self.file_path, "atomic update written");
        Ok(outcome)
    }
}
