use crate::catalog::version::Version;
use crate::error::{Result, UpdaterError};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A single entry of a package's update list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRecord {
    /// Currently recommended (non-experimental) version, no patch attached.
    Stable { stable: Version },
    /// A binary patch turning an installation at `from` into one at `to`.
    Delta { from: Version, to: Version },
}

impl UpdateRecord {
    pub fn as_stable(&self) -> Option<&Version> {
        match self {
            UpdateRecord::Stable { stable } => Some(stable),
            UpdateRecord::Delta { .. } => None,
        }
    }

    pub fn as_delta(&self) -> Option<(&Version, &Version)> {
        match self {
            UpdateRecord::Delta { from, to } => Some((from, to)),
            UpdateRecord::Stable { .. } => None,
        }
    }
}

/// Wire shape of a record: `{"stable": "x"}` or `{"from": "x", "to": "y"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRecord {
    Delta { from: String, to: String },
    Stable { stable: String },
}

impl TryFrom<RawRecord> for UpdateRecord {
    type Error = UpdaterError;

    fn try_from(raw: RawRecord) -> Result<Self> {
        Ok(match raw {
            RawRecord::Delta { from, to } => UpdateRecord::Delta {
                from: Version::parse(&from)?,
                to: Version::parse(&to)?,
            },
            RawRecord::Stable { stable } => UpdateRecord::Stable {
                stable: Version::parse(&stable)?,
            },
        })
    }
}

/// Package name to update records, exactly as served by the catalog.
///
/// Record order is preserved; nothing is sorted or deduplicated here.
#[derive(Debug, Clone)]
pub struct UpdateCatalog {
    packages: BTreeMap<String, Vec<UpdateRecord>>,
}

impl UpdateCatalog {
    /// Parse the body of `get-available-versions`.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<RawRecord>> = serde_json::from_str(body)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: BTreeMap<String, Vec<RawRecord>>) -> Result<Self> {
        let mut packages = BTreeMap::new();
        for (name, rows) in raw {
            let records = rows
                .into_iter()
                .map(UpdateRecord::try_from)
                .collect::<Result<Vec<_>>>()
                .map_err(|e| match e {
                    UpdaterError::MalformedVersion(msg) => {
                        UpdaterError::MalformedVersion(format!("{msg} (package {name})"))
                    }
                    other => other,
                })?;
            packages.insert(name, records);
        }
        Ok(Self { packages })
    }

    /// Package names in sorted order.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn has_package(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn records(&self, package: &str) -> Result<&[UpdateRecord]> {
        self.packages
            .get(package)
            .map(Vec::as_slice)
            .ok_or_else(|| UpdaterError::UnknownPackage(package.to_string()))
    }
}
