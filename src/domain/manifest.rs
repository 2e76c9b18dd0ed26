//! The model manifest.
//!
//! A [`Manifest`] is an ordered list of model entries, keyed by filename.
//! It knows nothing about the filesystem; [`crate::storage`] populates it
//! from a resource tree.

use std::{collections::HashMap, io};

use serde::{Serialize, ser::Error as _};
use serde_json::ser::Formatter;

use crate::domain::ResourcePath;

/// Where an entry's path comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The model's own path under the models tree.
    Default,
    /// A same-named file under the overrides tree.
    Override,
}

/// A single model in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    name: String,
    path: ResourcePath,
    origin: Origin,
}

impl ModelEntry {
    /// Creates an entry, keyed by the last segment of `path`.
    #[must_use]
    pub fn new(path: ResourcePath, origin: Origin) -> Self {
        Self {
            name: path.file_name().to_string(),
            path,
            origin,
        }
    }

    /// The filename the entry is keyed by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path recorded in the manifest.
    #[must_use]
    pub const fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Whether the recorded path is the default or an override.
    #[must_use]
    pub const fn origin(&self) -> Origin {
        self.origin
    }
}

/// The outcome of [`Manifest::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The filename was not yet in the manifest.
    Added,
    /// An override replaced an existing default entry with the same
    /// filename.
    Replaced {
        /// The path now listed for the filename.
        kept: ResourcePath,
        /// The entry that was replaced.
        previous: ModelEntry,
    },
    /// An entry with the same filename was already present and was kept.
    Rejected {
        /// The path listed for the filename.
        kept: ResourcePath,
        /// The entry that was not inserted.
        rejected: ModelEntry,
    },
}

impl Insertion {
    /// Returns `true` if the insertion collided with an existing filename.
    #[must_use]
    pub const fn is_collision(&self) -> bool {
        !matches!(self, Self::Added)
    }
}

/// An ordered, filename-deduplicated list of models.
///
/// Entries keep the order in which their filename was first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ModelEntry>,
    index: HashMap<String, usize>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty manifest with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts an entry, deduplicating by filename.
    ///
    /// If the filename is already present, an [`Origin::Override`] entry
    /// replaces an [`Origin::Default`] one in place. In every other case the
    /// existing entry wins.
    pub fn insert(&mut self, entry: ModelEntry) -> Insertion {
        let Some(position) = self.index.get(entry.name()).copied() else {
            self.index.insert(entry.name.clone(), self.entries.len());
            self.entries.push(entry);
            return Insertion::Added;
        };

        let existing = &mut self.entries[position];
        if existing.origin == Origin::Default && entry.origin == Origin::Override {
            let kept = entry.path.clone();
            Insertion::Replaced {
                kept,
                previous: std::mem::replace(existing, entry),
            }
        } else {
            Insertion::Rejected {
                kept: existing.path.clone(),
                rejected: entry,
            }
        }
    }

    /// Looks up an entry by filename.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Iterates over the entries in manifest order.
    pub fn iter(&self) -> std::slice::Iter<'_, ModelEntry> {
        self.entries.iter()
    }

    /// Iterates over the recorded paths in manifest order.
    pub fn paths(&self) -> impl Iterator<Item = &ResourcePath> {
        self.entries.iter().map(ModelEntry::path)
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the manifest as a JSON array of path strings.
    ///
    /// Elements are separated by `, ` and non-ASCII characters are written
    /// as `\uXXXX` escapes, which is the layout manifests have always been
    /// written in. Equal manifests always render to identical bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let paths: Vec<&ResourcePath> = self.paths().collect();
        let mut out = Vec::new();
        paths.serialize(&mut serde_json::Serializer::with_formatter(
            &mut out,
            ManifestFormatter,
        ))?;
        String::from_utf8(out).map_err(serde_json::Error::custom)
    }

    /// Parses the paths out of a previously rendered manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an array of valid resource paths.
    pub fn from_json(json: &str) -> Result<Vec<ResourcePath>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ModelEntry;
    type IntoIter = std::slice::Iter<'a, ModelEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A single-line JSON layout with `, ` separators and ASCII-only output.
struct ManifestFormatter;

impl Formatter for ManifestFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut utf16 = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(c.encode_utf8(&mut [0; 4]).as_bytes())?;
            } else {
                for unit in c.encode_utf16(&mut utf16) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}
