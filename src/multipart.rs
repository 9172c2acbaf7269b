//! Multipart form-data fields and files.
//!
//! Grammar work (boundary scanning, part framing, content-disposition) is
//! multer's job; this module adapts a fully-buffered body into multer's
//! stream interface and folds the parts into one ordered map.

use bytes::Bytes;
use futures_util::future::ready;
use futures_util::stream::once;
use indexmap::IndexMap;

/// One decoded part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// A plain text field.
    Text(String),
    /// A file upload.
    File(FileField),
}

/// An uploaded file: original filename, declared MIME type, raw content.
#[derive(Debug, Clone, PartialEq)]
pub struct FileField {
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub bytes: Bytes,
}

/// Folds a buffered multipart body into `name → FormValue`.
///
/// Parts with a `filename` in their content-disposition become
/// [`FormValue::File`]; everything else is read as UTF-8 text. Unnamed parts
/// are skipped. Duplicate part names keep the first occurrence, matching the
/// urlencoded policy.
pub(crate) async fn parse(
    boundary: String,
    bytes: Bytes,
) -> Result<IndexMap<String, FormValue>, multer::Error> {
    let stream = once(ready(Ok::<_, std::io::Error>(bytes)));
    let mut parts = multer::Multipart::new(stream, boundary);

    let mut fields = IndexMap::new();
    while let Some(field) = parts.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else { continue };

        let value = if field.file_name().is_some() {
            let filename = field.file_name().map(str::to_owned);
            let mime_type = field.content_type().map(|m| m.to_string());
            FormValue::File(FileField { filename, mime_type, bytes: field.bytes().await? })
        } else {
            FormValue::Text(field.text().await?)
        };

        fields.entry(name).or_insert(value);
    }
    Ok(fields)
}
