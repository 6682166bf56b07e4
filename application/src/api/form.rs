//! [`Form`] of a `multipart/form-data` request.

use std::{collections::HashMap, str::FromStr};

use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use service::{
    domain::{property::ImageFormat, Property},
    infra::storage::Upload,
};

use crate::{define_error, AsError as _, Error};

use super::parse;

/// Parsed `multipart/form-data` request with [`Property`] data.
///
/// Binary images are the file parts named [`Form::IMAGES`], all the other
/// parts are kept as text. Nested values are JSON-encoded text parts.
#[derive(Debug, Default)]
pub struct Form {
    /// Text parts by their names.
    fields: HashMap<String, String>,

    /// Uploaded images.
    pub uploads: Vec<Upload>,
}

impl Form {
    /// Name of the parts containing binary images.
    pub const IMAGES: &'static str = "images";

    /// Reads a [`Form`] out of the provided [`Multipart`] stream.
    ///
    /// # Errors
    ///
    /// If the stream is malformed, or contains an image of an unsupported
    /// format, or too many images.
    pub async fn read(mut multipart: Multipart) -> Result<Self, Error> {
        let mut form = Self::default();
        while let Some(field) =
            multipart.next_field().await.map_err(|e| e.into_error())?
        {
            let name = field.name().unwrap_or_default().to_owned();
            if name == Self::IMAGES {
                if form.uploads.len() == Property::MAX_IMAGES {
                    return Err(ImageError::TooMany.into());
                }
                let format = field
                    .content_type()
                    .and_then(ImageFormat::from_mime)
                    .ok_or(ImageError::UnsupportedFormat)?;
                let file_name = field.file_name().map(ToOwned::to_owned);
                let bytes = field.bytes().await.map_err(|e| e.into_error())?;
                form.uploads.push(Upload {
                    file_name,
                    format,
                    bytes: bytes.to_vec(),
                });
            } else {
                let text = field.text().await.map_err(|e| e.into_error())?;
                drop(form.fields.insert(name, text));
            }
        }
        Ok(form)
    }

    /// Takes the text part with the provided `name`, parsing it.
    ///
    /// # Errors
    ///
    /// If the part cannot be parsed.
    pub fn text<T>(&mut self, name: &str) -> Result<Option<T>, Error>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        parse(name, self.fields.remove(name).as_deref())
    }

    /// Takes the JSON-encoded part with the provided `name`, decoding it.
    ///
    /// # Errors
    ///
    /// If the part is not a valid JSON of the `T`ype.
    pub fn json<T: DeserializeOwned>(
        &mut self,
        name: &str,
    ) -> Result<Option<T>, Error> {
        self.fields
            .remove(name)
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                serde_json::from_str(&v).map_err(|e| {
                    Error::validation(format!("Invalid `{name}` value: {e}"))
                })
            })
            .transpose()
    }
}

define_error! {
    enum ImageError {
        #[code = "UNSUPPORTED_IMAGE_FORMAT"]
        #[status = BAD_REQUEST]
        #[message = "Only JPEG, PNG, WebP and GIF images are accepted"]
        UnsupportedFormat,

        #[code = "TOO_MANY_IMAGES"]
        #[status = BAD_REQUEST]
        #[message = "At most 10 images are accepted"]
        TooMany,

        #[code = "IMAGE_TOO_LARGE"]
        #[status = PAYLOAD_TOO_LARGE]
        #[message = "Image exceeds the size limit"]
        TooLarge,

        #[code = "UNKNOWN_IMAGE"]
        #[status = BAD_REQUEST]
        #[message = "Kept image doesn't belong to the `Property`"]
        Unknown,
    }
}

#[cfg(test)]
mod spec {
    use axum::{
        body::Body,
        extract::{FromRequest as _, Multipart},
    };

    use super::Form;

    const BOUNDARY: &str = "X-BOUNDARY";

    /// Part name, optional file name with MIME type, and content.
    type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

    fn request(parts: &[Part<'_>]) -> http::Request<Body> {
        let mut body = Vec::new();
        for (name, file, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((file_name, mime)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; \
                         filename=\"{file_name}\"\r\n\
                         Content-Type: {mime}\r\n\r\n",
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; \
                         name=\"{name}\"\r\n\r\n",
                    )
                    .as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(&b"\r\n"[..]);
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        http::Request::builder()
            .method("POST")
            .header(
                http::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn read(parts: &[Part<'_>]) -> Result<Form, crate::Error> {
        let multipart = Multipart::from_request(request(parts), &())
            .await
            .unwrap();
        Form::read(multipart).await
    }

    #[tokio::test]
    async fn splits_images_and_fields() {
        const JPEG: &[u8] = &[0xFF, 0xD8];

        let mut form = read(&[
            ("title", None, &b"Cozy flat"[..]),
            ("price", None, &b"25000"[..]),
            ("location", None, &br#"{"city":"Karachi"}"#[..]),
            ("images", Some(("front.jpg", "image/jpeg")), JPEG),
        ])
        .await
        .unwrap();

        assert_eq!(form.uploads.len(), 1);
        assert_eq!(form.uploads[0].file_name.as_deref(), Some("front.jpg"));
        assert_eq!(
            form.text::<String>("title").unwrap().as_deref(),
            Some("Cozy flat"),
        );
        assert_eq!(form.text::<u32>("price").unwrap(), Some(25000));
        assert_eq!(form.text::<u32>("price").unwrap(), None);

        let location = form.json::<serde_json::Value>("location").unwrap();
        assert_eq!(location.unwrap()["city"], "Karachi");
    }

    #[tokio::test]
    async fn rejects_unsupported_images() {
        let err = read(&[(
            "images",
            Some(("notes.txt", "text/plain")),
            &b"hello"[..],
        )])
        .await
        .unwrap_err();

        assert_eq!(err.code, "UNSUPPORTED_IMAGE_FORMAT");
    }

    #[tokio::test]
    async fn rejects_too_many_images() {
        let image: Part<'_> =
            ("images", Some(("a.png", "image/png")), &b"\x89PNG"[..]);
        let err = read(&[image; 11]).await.unwrap_err();

        assert_eq!(err.code, "TOO_MANY_IMAGES");
    }
}
