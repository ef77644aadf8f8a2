use crate::error::{Result, UpdaterError};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Dotted numeric version as published by the update catalog (e.g. `1.1.110`).
///
/// Ordering is component-wise by integer value, so `1.10.0 > 1.9.0`.
/// Versions of different arity are compared as if the shorter one were
/// padded with zeros: `1.2 == 1.2.0 < 1.2.1`.
///
/// The original string is kept verbatim because the update service expects
/// it back in download requests and file names.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    components: Vec<u64>,
}

impl Version {
    pub fn parse(version: &str) -> Result<Self> {
        if version.is_empty() {
            return Err(UpdaterError::MalformedVersion(
                "version string is empty".to_string(),
            ));
        }

        let mut components = Vec::new();
        for part in version.split('.') {
            // u64::from_str accepts a leading '+', the catalog never does
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(UpdaterError::MalformedVersion(format!(
                    "'{version}' has a non-numeric component '{part}'"
                )));
            }

            let number = part.parse::<u64>().map_err(|e| {
                UpdaterError::MalformedVersion(format!("'{version}': component '{part}' {e}"))
            })?;
            components.push(number);
        }

        Ok(Version {
            original: version.to_string(),
            components,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Components without trailing zeros; equal versions share this slice.
    fn significant(&self) -> &[u64] {
        let end = self
            .components
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |idx| idx + 1);
        &self.components[..end]
    }
}

impl FromStr for Version {
    type Err = UpdaterError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for idx in 0..len {
            let a = self.components.get(idx).copied().unwrap_or(0);
            let b = other.components.get(idx).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}
