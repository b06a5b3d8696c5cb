//! Store - the password file and the entries loaded from it
//!
//! The file is plain text, one record per entry, in sequence order:
//!
//! ```text
//! Name: github
//! Password: hunter2
//! Category: dev
//! Website: github.com
//! Login: octocat
//! ----------
//! Timestamp: 18/10/2026 09:15:00
//! ```
//!
//! A record is committed when its `----------` line is read. Unknown lines
//! and the trailing timestamp are ignored by the parser. Every mutating
//! operation rewrites the whole file, and dropping the store writes it one
//! final time.

use anyhow::{bail, Result};
use std::cmp::Ordering;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::entry::Entry;
use crate::transform::{transform, DEFAULT_KEY};

const NAME: &str = "Name: ";
const PASSWORD: &str = "Password: ";
const CATEGORY: &str = "Category: ";
const WEBSITE: &str = "Website: ";
const LOGIN: &str = "Login: ";
const DELIMITER: &str = "----------";
const TIMESTAMP: &str = "Timestamp: ";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Store-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    Duplicate(String),

    #[error("Category already exists: {0}")]
    CategoryExists(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Invalid sort criterion: {0} (expected 'name' or 'category')")]
    InvalidSortCriterion(String),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a successful add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Appended as a new entry
    Added,
    /// An entry with the same name was overwritten in place
    Updated,
}

/// Field to sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Category,
}

impl FromStr for SortKey {
    type Err = StoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "category" => Ok(SortKey::Category),
            other => Err(StoreError::InvalidSortCriterion(other.to_string())),
        }
    }
}

impl SortKey {
    /// Byte-wise ordering on the chosen field
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Category => a.category.cmp(&b.category),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::Category => write!(f, "category"),
        }
    }
}

/// The entry store
pub struct Store {
    /// Entries in file order
    entries: Vec<Entry>,
    /// Backing file
    path: PathBuf,
    /// XOR key for encrypt/decrypt
    key: u8,
    /// Cleared by `close` so the final write happens once
    persist_on_drop: bool,
}

impl Store {
    /// Load the store at `path` with the default transform key
    pub fn load(path: impl AsRef<Path>) -> Self {
        Self::load_with_key(path, DEFAULT_KEY)
    }

    /// Load the store at `path`
    ///
    /// An unreadable or missing file is not an error: the store starts empty
    /// and the first save creates the file.
    pub fn load_with_key(path: impl AsRef<Path>, key: u8) -> Self {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read(&path) {
            Ok(bytes) => {
                let entries = parse(&String::from_utf8_lossy(&bytes));
                tracing::debug!(path = %path.display(), count = entries.len(), "loaded entries");
                entries
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "password file not found, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open password file, starting empty");
                Vec::new()
            }
        };

        Self {
            entries,
            path,
            key,
            persist_on_drop: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Direct access to the sequence; changes are written on the next save
    /// or when the store is closed
    pub fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry named `name`
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Write every entry followed by a timestamp line, replacing the file
    ///
    /// On failure the in-memory entries are untouched and stay authoritative.
    pub fn save(&self) -> Result<()> {
        ensure_parent(&self.path)?;

        let file = File::create(&self.path).map_err(|source| self.io_error(source))?;
        let mut writer = BufWriter::new(file);

        for entry in &self.entries {
            write_record(&mut writer, entry).map_err(|source| self.io_error(source))?;
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        writeln!(writer, "{}{}", TIMESTAMP, timestamp).map_err(|source| self.io_error(source))?;
        writer.flush().map_err(|source| self.io_error(source))?;

        restrict_permissions(&self.path)?;

        tracing::debug!(path = %self.path.display(), count = self.entries.len(), "saved entries");
        Ok(())
    }

    /// Final write; use this instead of dropping to see the error
    pub fn close(mut self) -> Result<()> {
        self.persist_on_drop = false;
        self.save()
    }

    /// Add an entry, or update the entry that has the same name
    ///
    /// A record identical in all five fields is rejected as a duplicate.
    /// Otherwise the record is appended to the file, the in-memory sequence
    /// is updated (in place for an existing name, at the end for a new one)
    /// and the whole file is rewritten.
    pub fn add(&mut self, entry: Entry) -> Result<AddOutcome> {
        validate(&entry)?;

        if self.entries.iter().any(|e| *e == entry) {
            tracing::debug!(name = %entry.name, "duplicate entry rejected");
            bail!(StoreError::Duplicate(entry.name));
        }

        self.append(&entry)?;

        let outcome = match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => {
                *existing = entry;
                AddOutcome::Updated
            }
            None => {
                self.entries.push(entry);
                AddOutcome::Added
            }
        };

        self.save()?;
        Ok(outcome)
    }

    /// Replace the secret of the first entry named `name`
    pub fn edit(&mut self, name: &str, new_secret: &str) -> Result<()> {
        check_field("secret", new_secret)?;

        let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) else {
            bail!(StoreError::NotFound(name.to_string()));
        };
        entry.secret = new_secret.to_string();

        self.save()
    }

    /// Remove the first entry named `name`
    pub fn delete(&mut self, name: &str) -> Result<Entry> {
        let Some(index) = self.entries.iter().position(|e| e.name == name) else {
            bail!(StoreError::NotFound(name.to_string()));
        };
        let removed = self.entries.remove(index);

        self.save()?;
        Ok(removed)
    }

    /// Remove every entry; the file keeps only its timestamp line
    pub fn delete_all(&mut self) -> Result<usize> {
        let count = self.entries.len();
        self.entries.clear();

        self.save()?;
        Ok(count)
    }

    /// Entries with `query` in any field, in store order
    ///
    /// Matching is a case-sensitive substring test, so an empty query
    /// returns everything.
    pub fn search(&self, query: &str) -> Vec<&Entry> {
        self.entries.iter().filter(|e| e.matches(query)).collect()
    }

    /// Entries whose category is exactly `category`
    pub fn filter_category(&self, category: &str) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Distinct non-empty categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !entry.category.is_empty() && !seen.contains(&entry.category.as_str()) {
                seen.push(&entry.category);
            }
        }
        seen
    }

    /// Sort by a criterion given as text ("name" or "category")
    ///
    /// An unknown criterion leaves the order unchanged. Sorting does not
    /// write the file by itself.
    pub fn sort(&mut self, criterion: &str) -> Result<()> {
        let key: SortKey = criterion.parse()?;
        self.sort_by(key);
        Ok(())
    }

    /// Stable ascending byte-wise sort on one field
    pub fn sort_by(&mut self, key: SortKey) {
        self.entries.sort_by(|a, b| key.compare(a, b));
    }

    /// XOR `value` with this store's key
    pub fn transform(&self, value: &str) -> String {
        transform(value, self.key)
    }

    /// Obfuscate every secret and save
    pub fn encrypt_all(&mut self) -> Result<()> {
        self.transform_all()
    }

    /// Reverse `encrypt_all` and save
    ///
    /// The transform is its own inverse, so this is the same operation.
    pub fn decrypt_all(&mut self) -> Result<()> {
        self.transform_all()
    }

    /// All-or-nothing: if any transformed secret would contain a line break
    /// (which the record format cannot hold), nothing changes
    fn transform_all(&mut self) -> Result<()> {
        let transformed: Vec<String> = self
            .entries
            .iter()
            .map(|e| transform(&e.secret, self.key))
            .collect();

        for secret in &transformed {
            check_field("secret", secret)?;
        }

        for (entry, secret) in self.entries.iter_mut().zip(transformed) {
            entry.secret = secret;
        }

        tracing::debug!(count = self.entries.len(), "transformed secrets");
        self.save()
    }

    /// Register a category with a marker entry and save
    pub fn add_category(&mut self, category: &str) -> Result<()> {
        if category.is_empty() {
            bail!(StoreError::InvalidField {
                field: "category",
                reason: "must not be empty".to_string(),
            });
        }
        check_field("category", category)?;

        if self.entries.iter().any(|e| e.category == category) {
            bail!(StoreError::CategoryExists(category.to_string()));
        }

        self.entries.push(Entry::category_marker(category));
        self.save()
    }

    /// Remove EVERY entry in `category`, real secrets included, and save
    ///
    /// Matching is exact, so `""` removes every entry without a category.
    /// Returns how many entries were removed.
    pub fn delete_category(&mut self, category: &str) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|e| e.category != category);
        let removed = before - self.entries.len();

        if removed == 0 {
            bail!(StoreError::CategoryNotFound(category.to_string()));
        }

        tracing::debug!(category, removed, "deleted category");
        self.save()?;
        Ok(removed)
    }

    /// Append one record to the file without rewriting it
    fn append(&self, entry: &Entry) -> Result<()> {
        ensure_parent(&self.path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        append_record(&mut file, entry).map_err(|source| self.io_error(source))?;
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if !self.persist_on_drop {
            return;
        }
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "final save failed");
        }
    }
}

/// Parse the record format into entries
pub fn parse(text: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut current = Entry::default();

    for line in text.lines() {
        if let Some(value) = line.strip_prefix(NAME) {
            current.name = value.to_string();
        } else if let Some(value) = line.strip_prefix(PASSWORD) {
            current.secret = value.to_string();
        } else if let Some(value) = line.strip_prefix(CATEGORY) {
            current.category = value.to_string();
        } else if let Some(value) = line.strip_prefix(WEBSITE) {
            current.site = value.to_string();
        } else if let Some(value) = line.strip_prefix(LOGIN) {
            current.login = value.to_string();
        } else if line == DELIMITER {
            entries.push(std::mem::take(&mut current));
        }
    }

    entries
}

/// Full five-line record, as written by save
pub fn write_record<W: Write>(writer: &mut W, entry: &Entry) -> io::Result<()> {
    writeln!(writer, "{}{}", NAME, entry.name)?;
    writeln!(writer, "{}{}", PASSWORD, entry.secret)?;
    writeln!(writer, "{}{}", CATEGORY, entry.category)?;
    writeln!(writer, "{}{}", WEBSITE, entry.site)?;
    writeln!(writer, "{}{}", LOGIN, entry.login)?;
    writeln!(writer, "{}", DELIMITER)
}

/// Short record, as appended by add: empty website/login lines are left out
pub fn append_record<W: Write>(writer: &mut W, entry: &Entry) -> io::Result<()> {
    writeln!(writer, "{}{}", NAME, entry.name)?;
    writeln!(writer, "{}{}", PASSWORD, entry.secret)?;
    writeln!(writer, "{}{}", CATEGORY, entry.category)?;
    if !entry.site.is_empty() {
        writeln!(writer, "{}{}", WEBSITE, entry.site)?;
    }
    if !entry.login.is_empty() {
        writeln!(writer, "{}{}", LOGIN, entry.login)?;
    }
    writeln!(writer, "{}", DELIMITER)
}

/// Reject values that would break the line-based format
fn validate(entry: &Entry) -> Result<()> {
    for (field, value) in entry.fields() {
        check_field(field, value)?;
    }
    Ok(())
}

fn check_field(field: &'static str, value: &str) -> Result<()> {
    if value.contains(|c| c == '\n' || c == '\r') {
        bail!(StoreError::InvalidField {
            field,
            reason: "line breaks are not allowed".to_string(),
        });
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|source| {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
