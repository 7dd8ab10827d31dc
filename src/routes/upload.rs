use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::{AppError, AppResult};

/// The `file` part of an upload.
pub struct Upload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Upload {
    /// Declared type, else a guess from the filename.
    pub fn content_type(&self) -> String {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(self.filename.as_deref().unwrap_or_default())
                    .first_or_octet_stream()
                    .to_string()
            })
    }
}

/// The parts of a photo upload form; unknown parts are skipped.
#[derive(Default)]
pub struct UploadForm {
    pub description: Option<String>,
    pub file: Option<Upload>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("description") => form.description = Some(field.text().await?),
                Some("file") => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    form.file = Some(Upload {
                        filename,
                        content_type,
                        data,
                    });
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// The uploaded file; an absent or empty one is a missing field.
    pub fn take_file(&mut self) -> AppResult<Upload> {
        self.file
            .take()
            .filter(|u| !u.data.is_empty())
            .ok_or(AppError::MissingField("file"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(filename: Option<&str>, content_type: Option<&str>, data: &'static [u8]) -> Upload {
        Upload {
            filename: filename.map(str::to_string),
            content_type: content_type.map(str::to_string),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn declared_content_type_wins() {
        assert_eq!(
            upload(Some("a.png"), Some("image/webp"), b"x").content_type(),
            "image/webp"
        );
    }

    #[test]
    fn content_type_guessed_from_filename() {
        assert_eq!(upload(Some("a.jpg"), None, b"x").content_type(), "image/jpeg");
        assert_eq!(upload(Some("a.png"), Some(""), b"x").content_type(), "image/png");
    }

    #[test]
    fn unknown_content_type_is_octet_stream() {
        assert_eq!(
            upload(None, None, b"x").content_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn empty_or_absent_file_is_missing() {
        let mut form = UploadForm::default();
        assert!(matches!(form.take_file(), Err(AppError::MissingField("file"))));

        form.file = Some(upload(Some("a.jpg"), None, b""));
        assert!(matches!(form.take_file(), Err(AppError::MissingField("file"))));

        form.file = Some(upload(Some("a.jpg"), None, b"jpg"));
        assert_eq!(&form.take_file().unwrap().data[..], b"jpg");
    }
}
