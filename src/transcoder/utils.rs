//! Helpers around the pipeline: reading dumps and fingerprinting results.
use md5::{Digest, Md5};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use super::containers::DatasetArray;

/// Reads the whole dump into memory.
///
/// Fails with [Error::UnreadableDump] if the file cannot be opened or is not UTF-8.
pub fn load_dump(path: &Path) -> Result<String> {
    log::info!("Loading dump {}", path.display());

    let unreadable = |source: io::Error| Error::UnreadableDump {
        path: path.to_path_buf(),
        source,
    };

    let bytes = fs::read(path).map_err(unreadable)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| unreadable(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    log::debug!("Read {} bytes", text.len());
    Ok(text)
}

/// MD5 over shape and pixels. Two runs that agree on this produced the same dataset.
pub fn fingerprint(dataset: &DatasetArray) -> String {
    let mut hasher = Md5::new();
    hasher.update((dataset.rows as u64).to_le_bytes());
    hasher.update((dataset.width() as u64).to_le_bytes());
    hasher.update(&dataset.data);
    let result = hasher.finalize();

    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_dump() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"a IP b\n").unwrap();
        temp.flush().unwrap();

        assert_eq!(load_dump(temp.path()).unwrap(), "a IP b\n");
    }

    #[test]
    fn test_missing_dump() {
        let err = load_dump(Path::new("/nonexistent/dump.txt")).unwrap_err();
        assert!(matches!(err, Error::UnreadableDump { .. }));
    }

    #[test]
    fn test_binary_dump_is_unreadable() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&[0xd4, 0xc3, 0xb2, 0xa1, 0xff, 0xfe]).unwrap();
        temp.flush().unwrap();

        let err = load_dump(temp.path()).unwrap_err();
        assert!(matches!(err, Error::UnreadableDump { .. }));
    }

    #[test]
    fn test_fingerprint_depends_on_shape_and_data() {
        let a = DatasetArray::filled(2, 2, 1, 255);
        let b = DatasetArray::filled(1, 2, 2, 255);
        let mut c = a.clone();
        c.data[3] = 254;

        assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
        assert_ne!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
        assert_eq!(fingerprint(&a).len(), 32);
    }
}
