//! Uploaded source files supplied as extra analysis input.

use file_format::FileFormat;
use humansize::{format_size, DECIMAL};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A file uploaded during the session. Lives only in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// File name as provided by the user.
    pub name: String,
    /// Raw text content.
    pub content: String,
}

impl UploadedFile {
    /// Create an uploaded file from already-decoded text.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Decode raw bytes into an uploaded file.
    ///
    /// Any UTF-8 content without NUL bytes is text, whatever format it looks
    /// like (scripts with a shebang, XML, empty files). `file-format` only
    /// names what was rejected.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> CoreResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::EmptyFileName);
        }

        let detected = FileFormat::from_bytes(&bytes);
        let known_binary = !matches!(
            detected,
            FileFormat::ArbitraryBinaryData | FileFormat::PlainText
        );
        if bytes.contains(&0) {
            return Err(CoreError::BinaryUpload {
                name,
                format: detected.name().to_string(),
            });
        }

        match String::from_utf8(bytes) {
            Ok(content) => Ok(Self { name, content }),
            Err(_) if known_binary => Err(CoreError::BinaryUpload {
                name,
                format: detected.name().to_string(),
            }),
            Err(_) => Err(CoreError::InvalidEncoding { name }),
        }
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Human readable size, e.g. `1.2 kB`.
    pub fn human_size(&self) -> String {
        format_size(self.size(), DECIMAL)
    }

    /// Whether the content is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Reject the file if it is larger than `limit` bytes.
    pub fn ensure_within(&self, limit: u64) -> CoreResult<()> {
        if self.size() > limit {
            return Err(CoreError::UploadTooLarge {
                name: self.name.clone(),
                size: self.human_size(),
                limit: format_size(limit, DECIMAL),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_python_source() {
        let file = UploadedFile::from_bytes("net.py", b"import torch\n".to_vec()).unwrap();
        assert_eq!(file.name, "net.py");
        assert_eq!(file.content, "import torch\n");
        assert!(!file.is_blank());
    }

    #[test]
    fn rejects_png_bytes() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        let err = UploadedFile::from_bytes("logo.png", png).unwrap_err();
        assert!(matches!(err, CoreError::BinaryUpload { .. }));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = UploadedFile::from_bytes("weird.txt", b"abc\xC3\x28def".to_vec()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidEncoding { .. }));
    }

    #[test]
    fn accepts_text_that_looks_like_a_known_format() {
        let script = b"#!/usr/bin/env python\nimport torch\n".to_vec();
        let file = UploadedFile::from_bytes("train.py", script).unwrap();
        assert!(file.content.starts_with("#!"));

        let xml = b"<?xml version=\"1.0\"?>\n<model><layer type=\"conv\"/></model>".to_vec();
        assert!(UploadedFile::from_bytes("model.xml", xml).is_ok());

        let html = b"<!DOCTYPE html>\n<html><body>net</body></html>".to_vec();
        assert!(UploadedFile::from_bytes("page.html", html).is_ok());
    }

    #[test]
    fn accepts_empty_file() {
        let file = UploadedFile::from_bytes("empty.py", Vec::new()).unwrap();
        assert!(file.is_blank());
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn nul_bytes_are_binary() {
        let err = UploadedFile::from_bytes("data.py", b"x = 1\0\0".to_vec()).unwrap_err();
        assert!(matches!(err, CoreError::BinaryUpload { .. }));
    }

    #[test]
    fn rejects_empty_name() {
        let err = UploadedFile::from_bytes(" ", b"x".to_vec()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyFileName));
    }

    #[test]
    fn size_limit_is_enforced() {
        let file = UploadedFile::new("big.py", "x".repeat(2048));
        assert!(file.ensure_within(4096).is_ok());
        let err = file.ensure_within(1000).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }
}
