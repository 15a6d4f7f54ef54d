use std::collections::BTreeMap;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    File,
    Directory,
}

/// An entry in the backend's resource directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFile {
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceFile {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ResourceKind::Directory
    }
}

/// The cached resource listing: a set keyed by name.
///
/// A later entry with the same name replaces the earlier one. Iteration
/// lists directories first, then files, each by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    by_name: BTreeMap<String, ResourceFile>,
}

impl ResourceSet {
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ResourceFile> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Entries in display order (directories first).
    pub fn iter(&self) -> impl Iterator<Item = &ResourceFile> {
        let dirs = self.by_name.values().filter(|f| f.is_directory());
        let files = self.by_name.values().filter(|f| !f.is_directory());
        dirs.chain(files)
    }

    /// Plain files only, e.g. candidates for a RIB comparison.
    pub fn files(&self) -> impl Iterator<Item = &ResourceFile> {
        self.by_name.values().filter(|f| !f.is_directory())
    }

    pub fn to_vec(&self) -> Vec<ResourceFile> {
        self.iter().cloned().collect()
    }
}

impl FromIterator<ResourceFile> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = ResourceFile>>(iter: I) -> Self {
        Self {
            by_name: iter.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }
}

/// Serialized as a list in display order.
impl Serialize for ResourceSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for file in self.iter() {
            seq.serialize_element(file)?;
        }
        seq.end()
    }
}
