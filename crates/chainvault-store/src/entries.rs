// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named password entries and their TOML document form.
//!
//! ```toml
//! version = 1
//!
//! [password]
//! entry1 = "secret-value"
//!
//! [password.document]
//! type = "File"
//! content = "<url-safe base64>"
//! ```
//!
//! TOML places plain values before sub-tables, so text entries always
//! serialize ahead of file entries.

use std::path::Path;
use std::sync::Arc;

use chainvault_core::ChainVaultError;
use chainvault_crypto::encoding;
use secrecy::{ExposeSecret, SecretString};
use toml::{Table, Value};
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::UnsavedState;

const DOCUMENT_VERSION: i64 = 1;
const FILE_TYPE: &str = "File";

/// The secret held by one entry.
pub enum EntryValue {
    Text(SecretString),
    File(Zeroizing<Vec<u8>>),
}

impl std::fmt::Debug for EntryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Text([REDACTED])"),
            Self::File(bytes) => write!(f, "File([REDACTED; {}])", bytes.len()),
        }
    }
}

#[derive(Debug)]
struct Entry {
    name: String,
    value: EntryValue,
}

/// Ordered collection of uniquely named entries.
#[derive(Debug)]
pub struct EntryStore {
    entries: Vec<Entry>,
    unsaved: Arc<UnsavedState>,
}

impl EntryStore {
    pub fn new(unsaved: Arc<UnsavedState>) -> Self {
        Self {
            entries: Vec::new(),
            unsaved,
        }
    }

    /// Remove every entry without marking the store changed.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self, index: usize) -> Result<&str, ChainVaultError> {
        Ok(&self.entry(index)?.name)
    }

    pub fn is_text(&self, index: usize) -> bool {
        matches!(
            self.entries.get(index).map(|e| &e.value),
            Some(EntryValue::Text(_))
        )
    }

    pub fn is_file(&self, index: usize) -> bool {
        matches!(
            self.entries.get(index).map(|e| &e.value),
            Some(EntryValue::File(_))
        )
    }

    pub fn text(&self, index: usize) -> Result<&SecretString, ChainVaultError> {
        match &self.entry(index)?.value {
            EntryValue::Text(secret) => Ok(secret),
            EntryValue::File(_) => Err(kind_mismatch(index, "text")),
        }
    }

    pub fn file(&self, index: usize) -> Result<&[u8], ChainVaultError> {
        match &self.entry(index)?.value {
            EntryValue::File(bytes) => Ok(bytes.as_slice()),
            EntryValue::Text(_) => Err(kind_mismatch(index, "file")),
        }
    }

    /// Index of the entry called `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn add_text(&mut self, name: &str, secret: SecretString) -> Result<(), ChainVaultError> {
        self.push(name, EntryValue::Text(secret))
    }

    /// Add an entry holding the bytes of the file at `path`.
    pub fn add_file(&mut self, name: &str, path: &Path) -> Result<(), ChainVaultError> {
        let bytes = read_attachment(path)?;
        self.push(name, EntryValue::File(bytes))
    }

    pub fn remove(&mut self, index: usize) -> Result<(), ChainVaultError> {
        self.entry(index)?;
        self.entries.remove(index);
        self.unsaved.notify_change();
        Ok(())
    }

    pub fn change_text(&mut self, index: usize, secret: SecretString) -> Result<(), ChainVaultError> {
        match &mut self.entry_mut(index)?.value {
            EntryValue::Text(current) => *current = secret,
            EntryValue::File(_) => return Err(kind_mismatch(index, "text")),
        }
        self.unsaved.notify_change();
        Ok(())
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), ChainVaultError> {
        validate_name(name)?;
        if self.find(name).is_some_and(|existing| existing != index) {
            return Err(duplicate(name));
        }
        self.entry_mut(index)?.name = name.to_string();
        self.unsaved.notify_change();
        Ok(())
    }

    /// Replace the content of file entry `index` with the file at `path`.
    pub fn change_file(&mut self, index: usize, path: &Path) -> Result<(), ChainVaultError> {
        if !self.is_file(index) {
            self.entry(index)?;
            return Err(kind_mismatch(index, "file"));
        }
        let bytes = read_attachment(path)?;
        if let EntryValue::File(current) = &mut self.entry_mut(index)?.value {
            *current = bytes;
        }
        self.unsaved.notify_change();
        Ok(())
    }

    /// Write the content of file entry `index` to `path`, replacing it.
    pub fn extract_file(&self, index: usize, path: &Path) -> Result<(), ChainVaultError> {
        let bytes = self.file(index)?;
        std::fs::write(path, bytes).map_err(|e| {
            ChainVaultError::io(format!("failed to extract file to {}", path.display()), e)
        })
    }

    /// Render the store as a TOML document.
    pub fn serialize(&self) -> Result<Zeroizing<String>, ChainVaultError> {
        let mut passwords = Table::new();
        for entry in &self.entries {
            let value = match &entry.value {
                EntryValue::Text(secret) => Value::String(secret.expose_secret().to_string()),
                EntryValue::File(bytes) => {
                    let mut file = Table::new();
                    file.insert("type".to_string(), Value::String(FILE_TYPE.to_string()));
                    file.insert(
                        "content".to_string(),
                        Value::String(encoding::encode(bytes).to_string()),
                    );
                    Value::Table(file)
                }
            };
            passwords.insert(entry.name.clone(), value);
        }

        let mut document = Table::new();
        document.insert("version".to_string(), Value::Integer(DOCUMENT_VERSION));
        document.insert("password".to_string(), Value::Table(passwords));

        let rendered = toml::to_string(&document)
            .map_err(|e| ChainVaultError::Serialization(format!("failed to render entries: {e}")));
        scrub_table(&mut document);

        debug!(entries = self.entries.len(), "serialized entry store");
        rendered.map(Zeroizing::new)
    }

    /// Append the entries of a TOML document produced by [`EntryStore::serialize`].
    ///
    /// Nested entries of an unknown `type` are skipped. Does not mark the
    /// store changed.
    pub fn deserialize(&mut self, text: &str) -> Result<(), ChainVaultError> {
        let mut document: Table = text
            .parse()
            .map_err(|e| ChainVaultError::Serialization(format!("invalid entry document: {e}")))?;

        let result = self.load_document(&document);
        scrub_table(&mut document);
        result
    }

    fn load_document(&mut self, document: &Table) -> Result<(), ChainVaultError> {
        let version = document.get("version").and_then(Value::as_integer);
        if version != Some(DOCUMENT_VERSION) {
            return Err(ChainVaultError::Serialization(format!(
                "unsupported entry document version {version:?}"
            )));
        }
        let passwords = document
            .get("password")
            .and_then(Value::as_table)
            .ok_or_else(|| {
                ChainVaultError::Serialization("entry document has no password table".to_string())
            })?;

        for (name, value) in passwords {
            let entry = match value {
                Value::String(text) => EntryValue::Text(SecretString::from(text.clone())),
                Value::Table(table) => match parse_file_entry(table) {
                    Some(bytes) => EntryValue::File(bytes),
                    None => {
                        warn!(entry = %name, "skipping nested entry that is not a valid file");
                        continue;
                    }
                },
                _ => {
                    warn!(entry = %name, "skipping entry with unsupported value type");
                    continue;
                }
            };
            if self.find(name).is_some() {
                warn!(entry = %name, "skipping duplicate entry");
                continue;
            }
            self.entries.push(Entry {
                name: name.clone(),
                value: entry,
            });
        }

        debug!(entries = self.entries.len(), "deserialized entry store");
        Ok(())
    }

    fn push(&mut self, name: &str, value: EntryValue) -> Result<(), ChainVaultError> {
        validate_name(name)?;
        if self.find(name).is_some() {
            return Err(duplicate(name));
        }
        self.entries.push(Entry {
            name: name.to_string(),
            value,
        });
        self.unsaved.notify_change();
        Ok(())
    }

    fn entry(&self, index: usize) -> Result<&Entry, ChainVaultError> {
        let len = self.entries.len();
        self.entries.get(index).ok_or_else(|| out_of_range(index, len))
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut Entry, ChainVaultError> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))
    }
}

fn parse_file_entry(table: &Table) -> Option<Zeroizing<Vec<u8>>> {
    if table.get("type").and_then(Value::as_str) != Some(FILE_TYPE) {
        return None;
    }
    let content = table.get("content").and_then(Value::as_str)?;
    encoding::decode(content).ok()
}

fn read_attachment(path: &Path) -> Result<Zeroizing<Vec<u8>>, ChainVaultError> {
    std::fs::read(path).map(Zeroizing::new).map_err(|e| {
        ChainVaultError::io(format!("failed to read attachment {}", path.display()), e)
    })
}

/// Zero every string held by a parsed or rendered document.
fn scrub_table(table: &mut Table) {
    for (_, value) in table.iter_mut() {
        scrub_value(value);
    }
}

fn scrub_value(value: &mut Value) {
    match value {
        Value::String(s) => s.zeroize(),
        Value::Table(table) => scrub_table(table),
        Value::Array(items) => items.iter_mut().for_each(scrub_value),
        _ => {}
    }
}

fn validate_name(name: &str) -> Result<(), ChainVaultError> {
    if name.is_empty() {
        return Err(ChainVaultError::Validation(
            "entry name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn out_of_range(index: usize, len: usize) -> ChainVaultError {
    ChainVaultError::Validation(format!("entry {index} out of range ({len} entries)"))
}

fn kind_mismatch(index: usize, expected: &str) -> ChainVaultError {
    ChainVaultError::Validation(format!("entry {index} is not a {expected} entry"))
}

fn duplicate(name: &str) -> ChainVaultError {
    ChainVaultError::Validation(format!("an entry named `{name}` already exists"))
}
