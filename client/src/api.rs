//! [`Api`] transport definitions.

use std::future::Future;

use reqwest::{multipart, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use service::domain::property;

use crate::{
    model::{ImageInput, List, NewImage, Page, Property, PropertyInput},
    Error, SearchFilters,
};

/// Transport of requests to the server.
///
/// Every request carries the optional bearer `token` of the current user.
pub trait Api {
    /// Fetches a [`Page`] of the listings matching the provided
    /// [`SearchFilters`].
    fn list(
        &self,
        token: Option<&str>,
        filters: &SearchFilters,
    ) -> impl Future<Output = Result<Page, Error>> + Send;

    /// Fetches the featured listings.
    fn featured(
        &self,
        token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Property>, Error>> + Send;

    /// Fetches a [`Page`] of the listings of the current user.
    fn my(
        &self,
        token: Option<&str>,
        page: u32,
    ) -> impl Future<Output = Result<Page, Error>> + Send;

    /// Fetches the listings saved by the current user.
    fn saved(
        &self,
        token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Property>, Error>> + Send;

    /// Fetches a single [`Property`].
    fn property(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> impl Future<Output = Result<Property, Error>> + Send;

    /// Saves the [`Property`] for the current user.
    fn save(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes the [`Property`] from the saved ones of the current user.
    fn unsave(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Lists a new [`Property`].
    fn create(
        &self,
        token: Option<&str>,
        input: PropertyInput,
    ) -> impl Future<Output = Result<Property, Error>> + Send;

    /// Updates the [`Property`].
    fn update(
        &self,
        token: Option<&str>,
        id: property::Id,
        input: PropertyInput,
    ) -> impl Future<Output = Result<Property, Error>> + Send;

    /// Changes the status of the [`Property`].
    fn update_status(
        &self,
        token: Option<&str>,
        id: property::Id,
        status: property::Status,
    ) -> impl Future<Output = Result<Property, Error>> + Send;

    /// Deletes the [`Property`].
    fn delete(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// HTTP [`Api`] transport.
#[derive(Clone, Debug)]
pub struct Http {
    /// Underlying HTTP client.
    client: reqwest::Client,

    /// Base URL of the server, without a trailing slash.
    base_url: String,
}

impl Http {
    /// Creates a new [`Http`] transport to the server at the provided
    /// `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a new [`Http`] transport reusing the provided
    /// [`reqwest::Client`].
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Starts a request to the provided `path`.
    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// Sends the request, turning an error response into an [`Error`].
    async fn send(req: RequestBuilder) -> Result<Response, Error> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.bytes().await?;
            Err(Error::from_response(status.as_u16(), &body))
        }
    }

    /// Sends the request, decoding a JSON response.
    async fn json<T>(req: RequestBuilder) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        Ok(Self::send(req).await?.json().await?)
    }
}

impl Api for Http {
    async fn list(
        &self,
        token: Option<&str>,
        filters: &SearchFilters,
    ) -> Result<Page, Error> {
        let req = self
            .request(Method::GET, "/api/properties", token)
            .query(&filters.query());
        Self::json(req).await
    }

    async fn featured(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<Property>, Error> {
        let req = self.request(Method::GET, "/api/properties/featured", token);
        Ok(Self::json::<List>(req).await?.properties)
    }

    async fn my(&self, token: Option<&str>, page: u32) -> Result<Page, Error> {
        let req = self
            .request(Method::GET, "/api/properties/my", token)
            .query(&[("page", page)]);
        Self::json(req).await
    }

    async fn saved(&self, token: Option<&str>) -> Result<Vec<Property>, Error> {
        let req =
            self.request(Method::GET, "/api/users/saved-properties", token);
        Ok(Self::json::<List>(req).await?.properties)
    }

    async fn property(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> Result<Property, Error> {
        let path = format!("/api/properties/{id}");
        Self::json(self.request(Method::GET, &path, token)).await
    }

    async fn save(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> Result<(), Error> {
        let path = format!("/api/users/saved-properties/{id}");
        Self::send(self.request(Method::POST, &path, token))
            .await
            .map(drop)
    }

    async fn unsave(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> Result<(), Error> {
        let path = format!("/api/users/saved-properties/{id}");
        Self::send(self.request(Method::DELETE, &path, token))
            .await
            .map(drop)
    }

    async fn create(
        &self,
        token: Option<&str>,
        input: PropertyInput,
    ) -> Result<Property, Error> {
        let req = self
            .request(Method::POST, "/api/properties", token)
            .multipart(form(input, false)?);
        Self::json(req).await
    }

    async fn update(
        &self,
        token: Option<&str>,
        id: property::Id,
        input: PropertyInput,
    ) -> Result<Property, Error> {
        let path = format!("/api/properties/{id}");
        let req = self
            .request(Method::PUT, &path, token)
            .multipart(form(input, true)?);
        Self::json(req).await
    }

    async fn update_status(
        &self,
        token: Option<&str>,
        id: property::Id,
        status: property::Status,
    ) -> Result<Property, Error> {
        /// Body of a status change request.
        #[derive(Serialize)]
        struct Body {
            /// New status.
            status: property::Status,
        }

        let path = format!("/api/properties/{id}/status");
        let req = self
            .request(Method::PATCH, &path, token)
            .json(&Body { status });
        Self::json(req).await
    }

    async fn delete(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> Result<(), Error> {
        let path = format!("/api/properties/{id}");
        Self::send(self.request(Method::DELETE, &path, token))
            .await
            .map(drop)
    }
}

/// Builds a `multipart/form-data` form out of the provided
/// [`PropertyInput`].
///
/// Scalar fields become text parts, nested ones are JSON-encoded. Already
/// stored images are referenced in the `existingImages` part (only if
/// `with_existing`), new ones are uploaded as `images` file parts.
///
/// # Errors
///
/// If a MIME type of a new image is malformed.
pub fn form(
    input: PropertyInput,
    with_existing: bool,
) -> Result<multipart::Form, Error> {
    parts(input, with_existing)?.into_iter().try_fold(
        multipart::Form::new(),
        |form, part| -> Result<_, Error> {
            Ok(match part {
                FormPart::Text(name, v) => form.text(name, v),
                FormPart::File(new) => {
                    let part = multipart::Part::bytes(new.bytes)
                        .file_name(new.file_name)
                        .mime_str(&new.mime)
                        .map_err(|_| Error::Validation(None))?;
                    form.part("images", part)
                }
            })
        },
    )
}

/// Single part of a [`form()`].
#[derive(Clone, Debug, Eq, PartialEq)]
enum FormPart {
    /// Text field with its name.
    Text(&'static str, String),

    /// `images` file upload.
    File(NewImage),
}

/// Lays out the provided [`PropertyInput`] as [`FormPart`]s in the order
/// they are sent.
fn parts(
    input: PropertyInput,
    with_existing: bool,
) -> Result<Vec<FormPart>, Error> {
    let PropertyInput {
        title,
        description,
        property_type,
        category,
        price,
        rent_period,
        available_from,
        location,
        specifications,
        size,
        features,
        status,
        contact,
        is_featured,
        images,
    } = input;

    let texts = [
        ("title", title),
        ("description", description),
        ("propertyType", property_type.map(|k| k.to_string())),
        ("category", category.map(|c| c.to_string())),
        ("price", price.map(|p| p.to_string())),
        ("rentPeriod", rent_period.map(|p| p.to_string())),
        ("availableFrom", available_from.map(|at| at.to_rfc3339())),
        ("status", status.map(|s| s.to_string())),
        ("isFeatured", is_featured.map(|f| f.to_string())),
        ("location", location.as_ref().map(to_json).transpose()?),
        (
            "specifications",
            specifications.as_ref().map(to_json).transpose()?,
        ),
        ("size", size.as_ref().map(to_json).transpose()?),
        ("features", features.as_ref().map(to_json).transpose()?),
        ("contact", contact.as_ref().map(to_json).transpose()?),
    ];
    let mut parts = texts
        .into_iter()
        .filter_map(|(name, v)| Some(FormPart::Text(name, v?)))
        .collect::<Vec<_>>();

    if let Some(images) = images {
        let mut existing = Vec::new();
        for image in images {
            match image {
                ImageInput::Existing(image) => existing.push(image),
                ImageInput::New(new) => parts.push(FormPart::File(new)),
            }
        }
        if with_existing {
            parts.push(FormPart::Text("existingImages", to_json(&existing)?));
        }
    }
    Ok(parts)
}

/// Encodes the provided `value` as JSON text.
fn to_json(value: &impl Serialize) -> Result<String, Error> {
    serde_json::to_string(value)
        .map_err(|e| Error::Validation(Some(e.to_string())))
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::model::{
        Image, ImageInput, Location, NewImage, PropertyInput,
    };

    use super::{parts, FormPart};

    fn existing(url: &str) -> ImageInput {
        ImageInput::Existing(Image {
            url: url.to_owned(),
            caption: None,
        })
    }

    fn new(file_name: &str) -> NewImage {
        NewImage {
            file_name: file_name.to_owned(),
            mime: "image/png".to_owned(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn names(parts: &[FormPart]) -> Vec<&str> {
        parts
            .iter()
            .map(|p| match p {
                FormPart::Text(name, _) => *name,
                FormPart::File(_) => "images",
            })
            .collect()
    }

    fn text<'p>(parts: &'p [FormPart], field: &str) -> Option<&'p str> {
        parts.iter().find_map(|p| match p {
            FormPart::Text(name, v) if *name == field => Some(v.as_str()),
            FormPart::Text(..) | FormPart::File(_) => None,
        })
    }

    #[test]
    fn update_splits_existing_from_new_images() {
        let input = PropertyInput {
            images: Some(vec![
                existing("/uploads/a.png"),
                ImageInput::New(new("garden.png")),
                existing("/uploads/b.png"),
                ImageInput::New(new("kitchen.png")),
            ]),
            ..PropertyInput::default()
        };

        let parts = parts(input, true).unwrap();

        assert_eq!(names(&parts), ["images", "images", "existingImages"]);
        assert_eq!(
            parts[..2],
            [
                FormPart::File(new("garden.png")),
                FormPart::File(new("kitchen.png")),
            ],
        );
        let kept: serde_json::Value =
            serde_json::from_str(text(&parts, "existingImages").unwrap())
                .unwrap();
        assert_eq!(
            kept,
            serde_json::json!([
                {"url": "/uploads/a.png", "caption": null},
                {"url": "/uploads/b.png", "caption": null},
            ]),
        );
    }

    #[test]
    fn creation_sends_no_existing_images() {
        let input = PropertyInput {
            title: Some("Flat".to_owned()),
            images: Some(vec![
                existing("/uploads/a.png"),
                ImageInput::New(new("garden.png")),
            ]),
            ..PropertyInput::default()
        };

        let parts = parts(input, false).unwrap();

        assert_eq!(names(&parts), ["title", "images"]);
        assert_eq!(text(&parts, "existingImages"), None);
    }

    #[test]
    fn update_of_kept_images_uploads_nothing() {
        let input = PropertyInput {
            images: Some(vec![existing("/uploads/a.png")]),
            ..PropertyInput::default()
        };

        let parts = parts(input, true).unwrap();

        assert_eq!(names(&parts), ["existingImages"]);
    }

    #[test]
    fn update_without_images_keeps_them() {
        let parts = parts(PropertyInput::default(), true).unwrap();

        assert!(parts.is_empty());
    }

    #[test]
    fn nested_fields_are_json_and_scalars_are_text() {
        let input = PropertyInput {
            title: Some("Flat".to_owned()),
            price: Some(Decimal::new(150_000, 0)),
            is_featured: Some(true),
            location: Some(Location {
                city: "Karachi".to_owned(),
                area: "Clifton".to_owned(),
                address: None,
            }),
            ..PropertyInput::default()
        };

        let parts = parts(input, true).unwrap();

        assert_eq!(names(&parts), ["title", "price", "isFeatured", "location"]);
        assert_eq!(text(&parts, "title"), Some("Flat"));
        assert_eq!(text(&parts, "price"), Some("150000"));
        assert_eq!(text(&parts, "isFeatured"), Some("true"));
        let location: serde_json::Value =
            serde_json::from_str(text(&parts, "location").unwrap()).unwrap();
        assert_eq!(
            location,
            serde_json::json!({"city": "Karachi", "area": "Clifton"}),
        );
    }
}
