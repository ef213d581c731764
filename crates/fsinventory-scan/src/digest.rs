//! Streaming content digests.
//!
//! Every requested algorithm is fed from the same read loop, so a file is read
//! exactly once regardless of how many digest kinds are selected. Output does
//! not depend on the read buffer size.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use fsinventory_core::{DigestError, DigestFailure, DigestKind, DigestSet};

/// Default read buffer size.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Computes the digest set of a file. Called concurrently by pool workers.
pub trait Digester: Sync {
    /// Kinds every returned set contains.
    fn kinds(&self) -> &[DigestKind];

    /// Digest the file at `path`. Failures are reported inside the set.
    fn digest(&self, path: &Path) -> DigestSet;
}

/// Incremental hasher for one digest kind.
enum StreamHasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl StreamHasher {
    fn new(kind: DigestKind) -> Self {
        match kind {
            DigestKind::Md5 => Self::Md5(Md5::new()),
            DigestKind::Sha1 => Self::Sha1(Sha1::new()),
            DigestKind::Sha256 => Self::Sha256(Sha256::new()),
            DigestKind::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Md5(h) => h.update(bytes),
            Self::Sha1(h) => h.update(bytes),
            Self::Sha256(h) => h.update(bytes),
            Self::Blake3(h) => {
                h.update(bytes);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Md5(h) => hex::encode(h.finalize()),
            Self::Sha1(h) => hex::encode(h.finalize()),
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Multi-algorithm file digester.
#[derive(Debug, Clone)]
pub struct DigestEngine {
    kinds: Vec<DigestKind>,
    buffer_size: usize,
}

impl DigestEngine {
    /// Create an engine for a set of kinds. Duplicates are ignored.
    pub fn new(kinds: impl IntoIterator<Item = DigestKind>) -> Self {
        let mut unique = Vec::new();
        for kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        Self {
            kinds: unique,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the read buffer size (minimum 1 byte).
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Digest everything `reader` yields until EOF.
    ///
    /// Returns one hex digest per configured kind, in configuration order.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> io::Result<Vec<(DigestKind, String)>> {
        let mut hashers: Vec<(DigestKind, StreamHasher)> = self
            .kinds
            .iter()
            .map(|kind| (*kind, StreamHasher::new(*kind)))
            .collect();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            for (_, hasher) in &mut hashers {
                hasher.update(&buffer[..bytes_read]);
            }
        }

        Ok(hashers
            .into_iter()
            .map(|(kind, hasher)| (kind, hasher.finalize_hex()))
            .collect())
    }

    /// Digest a file on disk. The handle is closed before returning.
    pub fn digest_file(&self, path: &Path) -> Result<Vec<(DigestKind, String)>, DigestError> {
        let file = File::open(path).map_err(|source| DigestError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.digest_reader(file).map_err(|source| DigestError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new(DigestKind::DEFAULT)
    }
}

impl Digester for DigestEngine {
    fn kinds(&self) -> &[DigestKind] {
        &self.kinds
    }

    fn digest(&self, path: &Path) -> DigestSet {
        match self.digest_file(path) {
            Ok(digests) => DigestSet::computed(digests),
            Err(err) => DigestSet::failed(&self.kinds, DigestFailure::from(&err)),
        }
    }
}
