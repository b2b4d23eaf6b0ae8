//! Collects an upload form body into text fields and files.
//!
//! Forms that may carry a file accept `multipart/form-data`; API clients
//! that send no file may post the same fields urlencoded instead.

use crate::error::AppError;
use actix_multipart::Multipart;
use actix_web::{web, HttpMessage, HttpRequest};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl UploadForm {
    /// Reads the whole body, failing with `413` once more than `limit`
    /// bytes have arrived.
    pub async fn read(
        req: &HttpRequest,
        mut payload: web::Payload,
        limit: usize,
    ) -> Result<Self, AppError> {
        if req.content_type().starts_with("multipart/") {
            return Self::read_multipart(Multipart::new(req.headers(), payload), limit).await;
        }

        let mut body = web::BytesMut::new();
        while let Some(chunk) = payload.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
            if body.len() + chunk.len() > limit {
                return Err(AppError::PayloadTooLarge(limit));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(UploadForm {
            fields: url::form_urlencoded::parse(&body).into_owned().collect(),
            files: HashMap::new(),
        })
    }

    /// File inputs left empty by the browser are skipped.
    async fn read_multipart(mut payload: Multipart, limit: usize) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        let mut received = 0usize;

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|e| AppError::BadRequest(e.to_string()))?;
            let (name, filename) = match field.content_disposition() {
                Some(cd) => (
                    cd.get_name().map(|n| n.to_string()),
                    cd.get_filename().map(|f| f.to_string()),
                ),
                None => (None, None),
            };
            let Some(name) = name else { continue };

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
                received += chunk.len();
                if received > limit {
                    return Err(AppError::PayloadTooLarge(limit));
                }
                bytes.extend_from_slice(&chunk);
            }

            match filename {
                Some(filename) if !filename.is_empty() && !bytes.is_empty() => {
                    form.files
                        .entry(name)
                        .or_default()
                        .push(UploadedFile { filename, bytes });
                }
                Some(_) => {}
                None => {
                    let text = String::from_utf8(bytes).map_err(|_| {
                        AppError::BadRequest(format!("field '{}' is not valid UTF-8", name))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The first file posted under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let mut files = self.files.remove(name)?;
        (!files.is_empty()).then(|| files.swap_remove(0))
    }

    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }

    /// Deserializes the text fields into one of the form payload types.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let value = serde_json::to_value(&self.fields)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::requests::GalleryUploadForm;

    fn form(fields: &[(&str, &str)], files: &[(&str, &str)]) -> UploadForm {
        let mut form = UploadForm::default();
        for (k, v) in fields {
            form.fields.insert(k.to_string(), v.to_string());
        }
        for (k, name) in files {
            form.files.entry(k.to_string()).or_default().push(UploadedFile {
                filename: name.to_string(),
                bytes: vec![1, 2, 3],
            });
        }
        form
    }

    #[test]
    fn text_fields_deserialize_into_form_types() {
        let parsed: GalleryUploadForm = form(&[("caption", "Lab day"), ("category", "events")], &[])
            .parse()
            .unwrap();
        assert_eq!(parsed.caption, "Lab day");
        assert_eq!(parsed.category, "events");
        assert_eq!(parsed.sort_order, "");
    }

    #[test]
    fn repeated_file_fields_are_kept_in_order() {
        let mut upload = form(&[], &[("images", "a.png"), ("images", "b.png")]);
        let names: Vec<String> = upload
            .take_files("images")
            .into_iter()
            .map(|f| f.filename)
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert!(upload.take_file("images").is_none());
    }
}
