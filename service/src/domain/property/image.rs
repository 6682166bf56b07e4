//! [`Image`] definitions.

use common::define_text;

#[cfg(doc)]
use crate::domain::Property;

/// Image of a [`Property`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
    /// Public [`Url`] the [`Image`] is served at.
    pub url: Url,

    /// [`Caption`] of the [`Image`], usually its original file name.
    pub caption: Option<Caption>,
}

define_text! {
    #[doc = "Public URL (or absolute path) an [`Image`] is served at."]
    struct Url(max = 2048);
}

impl Url {
    /// Returns the file name part of this [`Url`].
    #[must_use]
    pub fn file_name(&self) -> &str {
        let url = self.as_ref();
        url.rsplit_once('/').map_or(url, |(_, name)| name)
    }
}

define_text! {
    #[doc = "Caption of an [`Image`]."]
    struct Caption(max = 256);
}

/// Accepted file format of an uploaded [`Image`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    /// JPEG image.
    Jpeg,

    /// PNG image.
    Png,

    /// WebP image.
    Webp,

    /// GIF image.
    Gif,
}

impl Format {
    /// Recognizes a [`Format`] by the provided MIME type, ignoring any
    /// parameters.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Returns the MIME type of this [`Format`].
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Returns the file extension of this [`Format`].
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Format, Url};

    #[test]
    fn accepted_formats() {
        assert_eq!(Format::from_mime("image/jpeg"), Some(Format::Jpeg));
        assert_eq!(Format::from_mime("IMAGE/PNG"), Some(Format::Png));
        assert_eq!(
            Format::from_mime("image/webp; charset=binary"),
            Some(Format::Webp),
        );
        assert_eq!(Format::from_mime("image/svg+xml"), None);
        assert_eq!(Format::from_mime("application/pdf"), None);
        assert_eq!(Format::Gif.extension(), "gif");
    }

    #[test]
    fn file_name() {
        let url = Url::new("/uploads/properties/abc.jpg").unwrap();
        assert_eq!(url.file_name(), "abc.jpg");

        let url = Url::new("abc.jpg").unwrap();
        assert_eq!(url.file_name(), "abc.jpg");
    }
}
