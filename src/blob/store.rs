//! Blob Store
//!
//! Writes payloads to digest-named files under a field directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest as _, Sha256};

use crate::error::Result;

use super::Digest;

/// Length in bytes of the random temp-file token
const TOKEN_SIZE: usize = 16;

/// Copy buffer size for streaming writes
const COPY_BUFFER_SIZE: usize = 8192;

/// Content-addressed store rooted at one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobStore {
    dir: PathBuf,
}

/// A committed blob, as decoded from a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    digest: Digest,
    path: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stream `reader` into the store and return its digest
    ///
    /// Steps:
    /// 1. Create a uniquely named temp file under the store directory
    /// 2. Copy the stream into it, hashing as we go
    /// 3. Move it to `shard/rest`, or drop it if that blob already exists
    pub fn put<R: Read>(&self, reader: &mut R) -> Result<Digest> {
        fs::create_dir_all(&self.dir)?;

        let (temp_path, file) = self.create_temp()?;
        let digest = match Self::copy_hashed(reader, file) {
            Ok(digest) => digest,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        let dest = self.path_for(&digest);
        if let Some(shard_dir) = dest.parent() {
            fs::create_dir_all(shard_dir)?;
        }

        if dest.exists() {
            // Same content already committed
            fs::remove_file(&temp_path)?;
            tracing::trace!(%digest, "blob already stored");
        } else {
            match fs::rename(&temp_path, &dest) {
                Ok(()) => tracing::debug!(%digest, dir = %self.dir.display(), "blob committed"),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    fs::remove_file(&temp_path)?;
                }
                Err(e) => {
                    let _ = fs::remove_file(&temp_path);
                    return Err(e.into());
                }
            }
        }

        Ok(digest)
    }

    /// Store an in-memory payload
    pub fn put_bytes(&self, data: &[u8]) -> Result<Digest> {
        let mut reader = data;
        self.put(&mut reader)
    }

    /// Final location of the blob with `digest`
    pub fn path_for(&self, digest: &Digest) -> PathBuf {
        self.dir.join(digest.shard()).join(digest.rest())
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.path_for(digest).is_file()
    }

    /// Open a stored blob for reading (fails if absent)
    pub fn open(&self, digest: &Digest) -> Result<File> {
        Ok(File::open(self.path_for(digest))?)
    }

    /// Read a stored blob fully into memory
    pub fn read(&self, digest: &Digest) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.open(digest)?.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Reference to a stored blob without touching the filesystem
    pub fn blob_ref(&self, digest: Digest) -> BlobRef {
        BlobRef {
            path: self.path_for(&digest),
            digest,
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Create a fresh temp file, retrying on name collision
    fn create_temp(&self) -> Result<(PathBuf, File)> {
        loop {
            let token: [u8; TOKEN_SIZE] = rand::random();
            let path = self.dir.join(hex::encode(token));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn copy_hashed<R: Read>(reader: &mut R, file: File) -> Result<Digest> {
        let mut hasher = Sha256::new();
        let mut writer = BufWriter::new(file);
        let mut buffer = [0u8; COPY_BUFFER_SIZE];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            hasher.update(&buffer[..n]);
            writer.write_all(&buffer[..n])?;
        }

        writer.flush()?;
        Ok(Digest::from_bytes(hasher.finalize().into()))
    }
}

impl BlobRef {
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the blob for streaming reads
    pub fn open(&self) -> Result<File> {
        Ok(File::open(&self.path)?)
    }

    /// Read the blob fully into memory
    pub fn read_to_vec(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.open()?.read_to_end(&mut data)?;
        Ok(data)
    }
}
