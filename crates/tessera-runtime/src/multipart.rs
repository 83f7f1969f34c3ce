//! Multipart form data.
//!
//! The host's multipart parser produces [`RawPart`] items; [`PartMap`]
//! folds them into per-field parts for the request cycle:
//!
//! | Raw item | Part |
//! |----------|------|
//! | form field | [`ValuePart`]; repeated names accumulate in order |
//! | file | [`UploadPart`]; content above the threshold is spilled to disk |
//!
//! Uploads stored on disk must be removed with [`PartMap::cleanup`] when
//! the request ends; the engine does this in its cleanup phase.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MultipartConfig;
use crate::EngineError;

/// Content of an uploaded file as handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    InMemory(Vec<u8>),
    /// Already written to disk by the host.
    Stored(PathBuf),
}

/// One item of a decoded multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPart {
    Field {
        name: String,
        value: String,
    },
    File {
        name: String,
        /// Path of the file on the client, as submitted.
        file_path: String,
        content_type: String,
        content: FileContent,
    },
}

/// A multipart request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    /// Declared body length in bytes.
    pub content_length: u64,
    pub items: Vec<RawPart>,
}

/// Values of a repeated form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePart {
    values: Vec<String>,
}

impl ValuePart {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    pub fn add(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    /// The first value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.values.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UploadContent {
    Memory(Vec<u8>),
    Disk(PathBuf),
}

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPart {
    file_path: String,
    content_type: String,
    size: u64,
    content: UploadContent,
}

impl UploadPart {
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Full path of the file on the client.
    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Last segment of the client path; handles both separator styles.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file_path)
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Where the content is stored, if on disk.
    #[must_use]
    pub fn store_location(&self) -> Option<&Path> {
        match &self.content {
            UploadContent::Disk(path) => Some(path),
            UploadContent::Memory(_) => None,
        }
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        matches!(self.content, UploadContent::Memory(_))
    }

    /// Opens the content for reading.
    ///
    /// # Errors
    ///
    /// [`EngineError::Upload`] if the stored file cannot be opened.
    pub fn open(&self) -> Result<Box<dyn Read + '_>, EngineError> {
        match &self.content {
            UploadContent::Memory(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
            UploadContent::Disk(path) => File::open(path)
                .map(|file| Box::new(file) as Box<dyn Read>)
                .map_err(|e| EngineError::Upload {
                    path: path.clone(),
                    message: format!("unable to open content file: {e}"),
                }),
        }
    }

    /// Deletes the stored content file, if there is one.
    ///
    /// # Errors
    ///
    /// [`EngineError::Upload`] if the file still exists afterwards.
    pub fn cleanup(&self) -> Result<(), EngineError> {
        let UploadContent::Disk(path) = &self.content else {
            return Ok(());
        };
        if let Err(e) = std::fs::remove_file(path) {
            debug!(path = %path.display(), error = %e, "upload removal failed");
        }
        if path.exists() {
            return Err(EngineError::Upload {
                path: path.clone(),
                message: "temporary file not deleted".into(),
            });
        }
        Ok(())
    }
}

/// One field of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Value(ValuePart),
    Upload(UploadPart),
}

/// Multipart fields by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartMap {
    parts: HashMap<String, Part>,
}

impl PartMap {
    /// Folds raw items into parts.
    ///
    /// A later item replaces an earlier one of another kind under the same
    /// name; a replaced upload is cleaned up at once. When decoding fails,
    /// every upload stored so far is cleaned up before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`EngineError::PayloadTooLarge`] above `config.max_size`
    /// - [`EngineError::Upload`] if spilling an upload to disk fails
    pub fn decode(body: MultipartBody, config: &MultipartConfig) -> Result<Self, EngineError> {
        if body.content_length > config.max_size {
            return Err(EngineError::PayloadTooLarge {
                size: body.content_length,
                max: config.max_size,
            });
        }

        let mut map = Self::default();
        if let Err(err) = map.fold(body.items, config) {
            if let Err(cleanup) = map.cleanup() {
                warn!(error = %cleanup, "upload cleanup after failed decode");
            }
            return Err(err);
        }
        debug!(parts = map.parts.len(), "multipart body decoded");
        Ok(map)
    }

    fn fold(&mut self, items: Vec<RawPart>, config: &MultipartConfig) -> Result<(), EngineError> {
        for item in items {
            match item {
                RawPart::Field { name, value } => self.add_value(name, value)?,
                RawPart::File {
                    name,
                    file_path,
                    content_type,
                    content,
                } => {
                    let upload = store_upload(file_path, content_type, content, config)?;
                    self.replace(name, Part::Upload(upload))?;
                }
            }
        }
        Ok(())
    }

    fn add_value(&mut self, name: String, value: String) -> Result<(), EngineError> {
        if let Some(Part::Value(part)) = self.parts.get_mut(&name) {
            part.add(value);
            return Ok(());
        }
        self.replace(name, Part::Value(ValuePart::new(value)))
    }

    fn replace(&mut self, name: String, part: Part) -> Result<(), EngineError> {
        match self.parts.insert(name, part) {
            Some(Part::Upload(replaced)) => replaced.cleanup(),
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.get(name)
    }

    /// First value of a form field.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.parts.get(name) {
            Some(Part::Value(part)) => Some(part.value()),
            _ => None,
        }
    }

    /// All values of a form field.
    #[must_use]
    pub fn strings(&self, name: &str) -> Option<&[String]> {
        match self.parts.get(name) {
            Some(Part::Value(part)) => Some(part.values()),
            _ => None,
        }
    }

    #[must_use]
    pub fn upload_file(&self, name: &str) -> Option<&UploadPart> {
        match self.parts.get(name) {
            Some(Part::Upload(part)) => Some(part),
            _ => None,
        }
    }

    /// Field names with their values, uploads excluded.
    pub fn values(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.parts.iter().filter_map(|(name, part)| match part {
            Part::Value(value) => Some((name.as_str(), value.values())),
            Part::Upload(_) => None,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Cleans up every upload.
    ///
    /// Every part is attempted; the first failure is returned.
    ///
    /// # Errors
    ///
    /// [`EngineError::Upload`] for a stored file that survived deletion.
    pub fn cleanup(&self) -> Result<(), EngineError> {
        let mut first = None;
        for part in self.parts.values() {
            if let Part::Upload(upload) = part {
                if let Err(err) = upload.cleanup() {
                    warn!(error = %err, "upload cleanup failed");
                    first.get_or_insert(err);
                }
            }
        }
        first.map_or(Ok(()), Err)
    }
}

fn store_upload(
    file_path: String,
    content_type: String,
    content: FileContent,
    config: &MultipartConfig,
) -> Result<UploadPart, EngineError> {
    let (size, content) = match content {
        FileContent::InMemory(bytes) if bytes.len() as u64 > config.threshold_size => {
            let path = config
                .repository_dir()
                .join(format!("tessera-upload-{}.tmp", Uuid::new_v4()));
            std::fs::write(&path, &bytes).map_err(|e| EngineError::Upload {
                path: path.clone(),
                message: format!("unable to store upload: {e}"),
            })?;
            debug!(path = %path.display(), size = bytes.len(), "upload spilled to disk");
            (bytes.len() as u64, UploadContent::Disk(path))
        }
        FileContent::InMemory(bytes) => (bytes.len() as u64, UploadContent::Memory(bytes)),
        FileContent::Stored(path) => {
            let size = std::fs::metadata(&path)
                .map(|meta| meta.len())
                .map_err(|e| EngineError::Upload {
                    path: path.clone(),
                    message: format!("stored upload missing: {e}"),
                })?;
            (size, UploadContent::Disk(path))
        }
    };
    Ok(UploadPart {
        file_path,
        content_type,
        size,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> MultipartConfig {
        MultipartConfig {
            max_size: 1_000,
            threshold_size: 8,
            repository: Some(dir.path().to_path_buf()),
        }
    }

    fn field(name: &str, value: &str) -> RawPart {
        RawPart::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    fn file(name: &str, bytes: &[u8]) -> RawPart {
        RawPart::File {
            name: name.into(),
            file_path: "C:\\Users\\ada\\notes.txt".into(),
            content_type: "text/plain".into(),
            content: FileContent::InMemory(bytes.to_vec()),
        }
    }

    #[test]
    fn repeated_fields_accumulate() {
        let dir = TempDir::new().unwrap();
        let body = MultipartBody {
            content_length: 10,
            items: vec![field("tag", "a"), field("name", "Ada"), field("tag", "b")],
        };
        let map = PartMap::decode(body, &config(&dir)).unwrap();

        assert_eq!(map.string("tag"), Some("a"));
        assert_eq!(map.strings("tag").unwrap(), ["a", "b"]);
        assert_eq!(map.string("name"), Some("Ada"));
        assert!(map.upload_file("tag").is_none());
    }

    #[test]
    fn oversized_request_rejected() {
        let dir = TempDir::new().unwrap();
        let body = MultipartBody {
            content_length: 1_001,
            items: vec![field("a", "b")],
        };
        let err = PartMap::decode(body, &config(&dir)).unwrap_err();
        assert!(matches!(err, EngineError::PayloadTooLarge { size: 1_001, max: 1_000 }));
    }

    #[test]
    fn small_upload_stays_in_memory() {
        let dir = TempDir::new().unwrap();
        let body = MultipartBody {
            content_length: 10,
            items: vec![file("doc", b"tiny")],
        };
        let map = PartMap::decode(body, &config(&dir)).unwrap();
        let upload = map.upload_file("doc").unwrap();

        assert!(upload.is_in_memory());
        assert_eq!(upload.file_name(), "notes.txt");
        assert_eq!(upload.size(), 4);
        let mut text = String::new();
        upload.open().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "tiny");
        assert!(map.cleanup().is_ok());
    }

    #[test]
    fn large_upload_spills_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let body = MultipartBody {
            content_length: 100,
            items: vec![file("doc", b"more than eight bytes")],
        };
        let map = PartMap::decode(body, &config(&dir)).unwrap();
        let upload = map.upload_file("doc").unwrap();
        let stored = upload.store_location().unwrap().to_path_buf();

        assert!(stored.starts_with(dir.path()));
        assert!(stored.exists());
        map.cleanup().unwrap();
        assert!(!stored.exists());
    }

    fn leftovers(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn field_replacing_spilled_upload_removes_it() {
        let dir = TempDir::new().unwrap();
        let body = MultipartBody {
            content_length: 100,
            items: vec![file("doc", b"ten bytes!"), field("doc", "text")],
        };
        let map = PartMap::decode(body, &config(&dir)).unwrap();

        assert_eq!(map.string("doc"), Some("text"));
        assert!(map.upload_file("doc").is_none());
        assert_eq!(leftovers(&dir), 0);
    }

    #[test]
    fn upload_replacing_upload_removes_first() {
        let dir = TempDir::new().unwrap();
        let body = MultipartBody {
            content_length: 100,
            items: vec![file("doc", b"first upload"), file("doc", b"second upload")],
        };
        let map = PartMap::decode(body, &config(&dir)).unwrap();

        assert_eq!(map.upload_file("doc").unwrap().size(), 13);
        assert_eq!(leftovers(&dir), 1);
        map.cleanup().unwrap();
        assert_eq!(leftovers(&dir), 0);
    }

    #[test]
    fn failed_decode_removes_spilled_uploads() {
        let dir = TempDir::new().unwrap();
        let body = MultipartBody {
            content_length: 100,
            items: vec![
                file("doc", b"more than eight bytes"),
                RawPart::File {
                    name: "gone".into(),
                    file_path: "gone.txt".into(),
                    content_type: "text/plain".into(),
                    content: FileContent::Stored(dir.path().join("missing.tmp")),
                },
            ],
        };
        let err = PartMap::decode(body, &config(&dir)).unwrap_err();

        assert!(err.to_string().contains("stored upload missing"));
        assert_eq!(leftovers(&dir), 0);
    }

    #[test]
    fn cleanup_reports_surviving_file() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be removed with remove_file, so it survives.
        let stubborn = dir.path().join("stubborn");
        std::fs::create_dir(&stubborn).unwrap();
        let upload = UploadPart {
            file_path: "x".into(),
            content_type: "text/plain".into(),
            size: 0,
            content: UploadContent::Disk(stubborn.clone()),
        };

        let err = upload.cleanup().unwrap_err();
        assert!(matches!(err, EngineError::Upload { .. }));
        assert!(err.to_string().contains("not deleted"));
    }
}
