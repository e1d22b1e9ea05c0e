//! Class byte source backed by a file on disk.
//!
//! The file is only read when the scanner asks for its bytes, so constructing thousands of
//! entries is cheap and the blocking read happens inside a worker task.

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use super::ByteSource;
use crate::Result;

/// A `.class` file on disk.
#[derive(Debug, Clone)]
pub struct ClassPathEntry {
    identifier: String,
    path: PathBuf,
}

impl ClassPathEntry {
    /// Create an entry whose identifier is the file's path
    pub fn new(path: impl AsRef<Path>) -> ClassPathEntry {
        let path = path.as_ref().to_path_buf();
        ClassPathEntry {
            identifier: path.display().to_string(),
            path,
        }
    }

    /// Create an entry with an explicit identifier (e.g. a class path relative name)
    pub fn with_identifier(identifier: impl Into<String>, path: impl AsRef<Path>) -> ClassPathEntry {
        ClassPathEntry {
            identifier: identifier.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for ClassPathEntry {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Owned(fs::read(&self.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn physical() {
        let path = std::env::temp_dir().join(format!(
            "jvmscope-physical-{}.class",
            std::process::id()
        ));
        fs::write(&path, [0xCA, 0xFE, 0xBA, 0xBE]).unwrap();

        let entry = ClassPathEntry::with_identifier("Test.class", &path);
        assert_eq!(entry.identifier(), "Test.class");
        assert_eq!(entry.read_bytes().unwrap().as_ref(), &[0xCA, 0xFE, 0xBA, 0xBE]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file() {
        let entry = ClassPathEntry::new("/definitely/not/here/Missing.class");
        assert!(matches!(entry.read_bytes(), Err(Error::Io(_))));
    }
}
