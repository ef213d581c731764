//! File records and their digest sets.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::DigestFailure;

/// Content digest algorithm.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DigestKind {
    Md5,
    Sha1,
    Sha256,
    Blake3,
}

impl DigestKind {
    /// Kinds computed when the operator does not choose.
    pub const DEFAULT: [DigestKind; 3] = [DigestKind::Md5, DigestKind::Sha1, DigestKind::Sha256];

    /// Lowercase name, also used as the report field name.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Result of one digest kind for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutcome {
    /// Lowercase hex digest.
    Hex(String),
    /// The digest could not be computed.
    Failed(DigestFailure),
}

impl DigestOutcome {
    /// Hex value if the digest was computed.
    pub fn hex(&self) -> Option<&str> {
        match self {
            DigestOutcome::Hex(hex) => Some(hex),
            DigestOutcome::Failed(_) => None,
        }
    }

    /// Failure details if the digest was not computed.
    pub fn failure(&self) -> Option<&DigestFailure> {
        match self {
            DigestOutcome::Hex(_) => None,
            DigestOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Digest outcomes of a record, keyed by kind in request order.
///
/// A set is either pending (empty) or complete (one outcome per requested
/// kind). The constructors only produce those two states.
///
/// Serializes flat: one field per kind holding the hex string, or `null` when
/// that kind failed, plus a `digest_errors` object when anything failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSet {
    outcomes: IndexMap<DigestKind, DigestOutcome>,
}

impl DigestSet {
    /// A set that has not been processed yet.
    pub fn pending() -> Self {
        Self::default()
    }

    /// A complete set of successfully computed digests.
    pub fn computed(digests: impl IntoIterator<Item = (DigestKind, String)>) -> Self {
        Self {
            outcomes: digests
                .into_iter()
                .map(|(kind, hex)| (kind, DigestOutcome::Hex(hex)))
                .collect(),
        }
    }

    /// A complete set where every requested kind failed for the same reason.
    pub fn failed(kinds: &[DigestKind], failure: DigestFailure) -> Self {
        Self {
            outcomes: kinds
                .iter()
                .map(|kind| (*kind, DigestOutcome::Failed(failure.clone())))
                .collect(),
        }
    }

    /// True until a digest task has filled the set.
    pub fn is_pending(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome for a kind.
    pub fn get(&self, kind: DigestKind) -> Option<&DigestOutcome> {
        self.outcomes.get(&kind)
    }

    /// Hex digest for a kind, if it was computed.
    pub fn hex(&self, kind: DigestKind) -> Option<&str> {
        self.get(kind).and_then(DigestOutcome::hex)
    }

    /// Check if any kind failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.values().any(|o| o.failure().is_some())
    }

    /// Failed kinds with their failure details.
    pub fn failures(&self) -> impl Iterator<Item = (DigestKind, &DigestFailure)> {
        self.outcomes
            .iter()
            .filter_map(|(kind, outcome)| outcome.failure().map(|f| (*kind, f)))
    }

    /// Kinds present in this set.
    pub fn kinds(&self) -> impl Iterator<Item = DigestKind> + '_ {
        self.outcomes.keys().copied()
    }

    /// Number of kinds in this set.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Same as [`DigestSet::is_pending`].
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl Serialize for DigestSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let failures: Vec<(&'static str, &DigestFailure)> =
            self.failures().map(|(kind, f)| (kind.as_str(), f)).collect();

        let len = self.outcomes.len() + usize::from(!failures.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        for (kind, outcome) in &self.outcomes {
            map.serialize_entry(kind.as_str(), &outcome.hex())?;
        }
        if !failures.is_empty() {
            map.serialize_entry("digest_errors", &FailureMap(&failures))?;
        }
        map.end()
    }
}

struct FailureMap<'a>(&'a [(&'static str, &'a DigestFailure)]);

impl Serialize for FailureMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(kind, failure)| (kind, failure)))
    }
}

/// One regular file discovered during a run.
///
/// The walker creates records with pending digests; a digest task fills them
/// in before the record reaches the aggregator.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// Absolute path.
    #[serde(rename = "file_path", serialize_with = "serialize_path")]
    pub path: PathBuf,

    /// Final path component.
    #[serde(rename = "file_name")]
    pub name: CompactString,

    /// Text after the last `.` of the name, empty if none.
    pub extension: CompactString,

    /// Size in bytes at stat time.
    pub size: u64,

    /// Last modification time.
    #[serde(rename = "mod_time")]
    pub modified: DateTime<Utc>,

    /// Always false; directories are traversed, not recorded.
    pub is_dir: bool,

    /// Platform mode bits.
    pub permissions: u32,

    /// Digest outcomes.
    #[serde(flatten)]
    pub digests: DigestSet,
}

impl FileRecord {
    /// Create a record with pending digests.
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: SystemTime, permissions: u32) -> Self {
        let path = path.into();
        let name: CompactString = path
            .file_name()
            .map(|n| n.to_string_lossy().into())
            .unwrap_or_else(|| path.to_string_lossy().into());
        let extension = CompactString::new(extension_of(&name));

        Self {
            path,
            name,
            extension,
            size,
            modified: DateTime::<Utc>::from(modified),
            is_dir: false,
            permissions,
            digests: DigestSet::pending(),
        }
    }

    /// Attach digest outcomes.
    pub fn with_digests(mut self, digests: DigestSet) -> Self {
        self.digests = digests;
        self
    }

    /// Check if digests have not been computed yet.
    pub fn is_pending(&self) -> bool {
        self.digests.is_pending()
    }

    /// Check if any digest failed.
    pub fn has_digest_failures(&self) -> bool {
        self.digests.has_failures()
    }
}

/// Text after the last `.` of a file name.
fn extension_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

fn serialize_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}
