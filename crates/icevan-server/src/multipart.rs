//! Multipart upload forms

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::Multipart;
use std::collections::HashMap;

/// The `file` part of an upload
#[derive(Debug)]
pub struct UploadedFile {
    /// Client-supplied filename
    pub name: String,
    pub bytes: Bytes,
}

/// A drained multipart form: the file plus text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Read every part; the part named `file` is kept as the upload
    ///
    /// # Errors
    /// `ApiError::Multipart` on a malformed or oversized body.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if name == "file" {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                form.file = Some(UploadedFile {
                    name: filename,
                    bytes,
                });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// Take the uploaded file
    ///
    /// # Errors
    /// `ApiError::MissingField("file")` if no file part with a name arrived.
    pub fn take_file(&mut self) -> Result<UploadedFile, ApiError> {
        self.file
            .take()
            .filter(|file| !file.name.is_empty())
            .ok_or(ApiError::MissingField("file"))
    }

    /// Trimmed text field; blank counts as absent
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Required text field
    ///
    /// # Errors
    /// `ApiError::MissingField` if absent or blank.
    pub fn require(&self, name: &'static str) -> Result<&str, ApiError> {
        self.text(name).ok_or(ApiError::MissingField(name))
    }
}
