//! Uploaded card images.

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::warn;

/// Rewindable image bytes.
///
/// An image whose bytes could not be loaded keeps the load error and returns
/// it from every read, so the failure surfaces when the image is processed.
#[derive(Debug, Clone)]
pub struct ImageReader {
    inner: Result<Cursor<Vec<u8>>, (io::ErrorKind, String)>,
}

impl ImageReader {
    fn failure(kind: io::ErrorKind, message: &str) -> io::Error {
        io::Error::new(kind, message.to_string())
    }
}

impl Read for ImageReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Ok(cursor) => cursor.read(buf),
            Err((kind, message)) => Err(Self::failure(*kind, message)),
        }
    }
}

impl Seek for ImageReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.inner {
            Ok(cursor) => cursor.seek(pos),
            Err((kind, message)) => Err(Self::failure(*kind, message)),
        }
    }
}

/// One uploaded image, owned by the request that carried it.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    name: String,
    content_type: Option<String>,
    size: u64,
    reader: ImageReader,
}

impl UploadedImage {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            size: bytes.len() as u64,
            reader: ImageReader {
                inner: Ok(Cursor::new(bytes)),
            },
        }
    }

    /// An image whose bytes are unavailable; every read fails with `error`.
    pub fn unreadable(name: impl Into<String>, error: &io::Error) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            size: 0,
            reader: ImageReader {
                inner: Err((error.kind(), error.to_string())),
            },
        }
    }

    /// Load an image from disk, guessing the content type from the extension.
    ///
    /// A file that cannot be read still yields an image; the error is
    /// reported when the image is read.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match std::fs::read(path) {
            Ok(bytes) => {
                let content_type = mime_guess::from_path(path)
                    .first_raw()
                    .map(|m| m.to_string());
                Self::new(name, content_type, bytes)
            }
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                Self::unreadable(name, &e)
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Readable view of the image bytes.
    pub fn reader_mut(&mut self) -> &mut ImageReader {
        &mut self.reader
    }
}
