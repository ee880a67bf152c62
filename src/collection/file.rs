//! Row File
//!
//! The collection's data file, accessed only at absolute offsets.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::Result;

/// Data file handle with positional reads and writes
///
/// Every call seeks and transfers while holding the lock, so no caller
/// ever depends on a cursor left behind by another.
pub(crate) struct RowFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl RowFile {
    /// Open or create the file, returning it with its current length
    pub fn open(path: &Path) -> Result<(Self, u64)> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let len = file.metadata()?.len();

        Ok((
            Self {
                path: path.to_path_buf(),
                file: Mutex::new(file),
            },
            len,
        ))
    }

    /// Fill `buf` from `offset`; short files surface as `UnexpectedEof`
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    pub fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(())
    }

    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync_data()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
