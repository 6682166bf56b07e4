//! Models of the server resources.

use common::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::domain::{property, user};

/// Property listing as returned by the server.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// ID of this [`Property`].
    pub id: property::Id,

    /// Title of this [`Property`].
    pub title: String,

    /// Description of this [`Property`].
    pub description: String,

    /// Kind of this [`Property`].
    pub property_type: property::Kind,

    /// Category this [`Property`] is listed in.
    pub category: property::Category,

    /// Price (or rent) of this [`Property`].
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Period the rent is charged for.
    #[serde(default)]
    pub rent_period: Option<property::RentPeriod>,

    /// Since when this [`Property`] is available.
    #[serde(default)]
    pub available_from: Option<DateTime>,

    /// [`Location`] of this [`Property`].
    pub location: Location,

    /// [`Specifications`] of this [`Property`].
    #[serde(default)]
    pub specifications: Specifications,

    /// [`Size`] of this [`Property`].
    #[serde(default)]
    pub size: Option<Size>,

    /// [`Features`] of this [`Property`].
    #[serde(default)]
    pub features: Features,

    /// Lifecycle status of this [`Property`].
    pub status: property::Status,

    /// ID of the user owning this [`Property`].
    pub owner_id: user::Id,

    /// [`Contact`] information of this [`Property`].
    #[serde(default)]
    pub contact: Contact,

    /// [`Image`]s of this [`Property`], in display order.
    #[serde(default)]
    pub images: Vec<Image>,

    /// Indicator whether this [`Property`] is featured.
    #[serde(default)]
    pub is_featured: bool,

    /// When this [`Property`] was created.
    pub created_at: DateTime,

    /// When this [`Property`] was modified the last time.
    pub updated_at: DateTime,
}

/// Location of a [`Property`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Location {
    /// City.
    pub city: String,

    /// Area of the city.
    pub area: String,

    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Specifications of a [`Property`].
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct Specifications {
    /// Number of bedrooms.
    pub bedrooms: Option<property::Rooms>,

    /// Number of bathrooms.
    pub bathrooms: Option<property::Rooms>,
}

/// Size of a [`Property`].
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Size {
    /// Positive value.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,

    /// Unit the value is measured in.
    pub unit: property::SizeUnit,
}

/// Features of a [`Property`].
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct Features {
    /// Furnishing.
    pub furnishing: Option<property::Furnishing>,

    /// Condition.
    pub condition: Option<property::Condition>,
}

/// Contact information of a [`Property`] listing.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Contact {
    /// Name of the person to contact.
    pub name: Option<String>,

    /// Phone to contact by.
    pub phone: Option<String>,

    /// Email to contact by.
    pub email: Option<String>,
}

/// Stored image of a [`Property`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Image {
    /// URL the image is served at.
    pub url: String,

    /// Caption of the image.
    #[serde(default)]
    pub caption: Option<String>,
}

/// Page of [`Property`] listings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Page {
    /// Listings on this [`Page`].
    pub properties: Vec<Property>,

    /// [`Pagination`] metadata of this [`Page`].
    pub pagination: Pagination,
}

/// Pagination metadata of a [`Page`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based number of the page.
    pub page: u32,

    /// Maximum number of listings on the page.
    pub limit: u32,

    /// Total number of listings across all the pages.
    pub total: u64,

    /// Total number of pages.
    pub pages: u64,

    /// Indicator whether there is a next page.
    pub has_next: bool,

    /// Indicator whether there is a previous page.
    pub has_prev: bool,
}

/// Listings without pagination, like the featured or the saved ones.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct List {
    /// Listings.
    pub(crate) properties: Vec<Property>,
}

/// Input of a [`Property`] creation or update.
///
/// [`None`] fields are not sent, so an update leaves them unchanged.
#[derive(Clone, Debug, Default)]
pub struct PropertyInput {
    /// Title.
    pub title: Option<String>,

    /// Description.
    pub description: Option<String>,

    /// Kind of the property.
    pub property_type: Option<property::Kind>,

    /// Category.
    pub category: Option<property::Category>,

    /// Price (or rent).
    pub price: Option<Decimal>,

    /// Period the rent is charged for.
    pub rent_period: Option<property::RentPeriod>,

    /// Since when the property is available.
    pub available_from: Option<DateTime>,

    /// [`Location`].
    pub location: Option<Location>,

    /// [`Specifications`].
    pub specifications: Option<Specifications>,

    /// [`Size`].
    pub size: Option<Size>,

    /// [`Features`].
    pub features: Option<Features>,

    /// Lifecycle status.
    pub status: Option<property::Status>,

    /// [`Contact`] information.
    pub contact: Option<Contact>,

    /// Indicator whether the listing should be featured.
    pub is_featured: Option<bool>,

    /// Images of the listing, in display order.
    ///
    /// [`None`] keeps the current images on update.
    pub images: Option<Vec<ImageInput>>,
}

/// Image of a [`PropertyInput`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImageInput {
    /// Already stored [`Image`] to keep.
    Existing(Image),

    /// New image file to upload.
    New(NewImage),
}

/// Image file to upload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewImage {
    /// Original file name, sent as the caption too.
    pub file_name: String,

    /// MIME type of the file.
    pub mime: String,

    /// Content of the file.
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod spec {
    use super::Page;

    #[test]
    fn decodes_server_page() {
        let page: Page = serde_json::from_str(
            r#"{
                "properties": [{
                    "id": "4d1b4b19-3bd5-4b0e-9c59-f6a0bd4c3a1e",
                    "title": "Sea view flat",
                    "description": "Two bedrooms near the beach",
                    "propertyType": "APARTMENT",
                    "category": "RENT",
                    "price": 85000.0,
                    "rentPeriod": "MONTHLY",
                    "location": {"city": "Karachi", "area": "Clifton"},
                    "specifications": {"bedrooms": 2, "bathrooms": 2},
                    "size": {"value": 1100.0, "unit": "SQFT"},
                    "features": {"furnishing": "SEMI_FURNISHED"},
                    "status": "AVAILABLE",
                    "ownerId": "0b8a3f7e-6a0a-4b73-9d2e-1a2f3b4c5d6e",
                    "contact": {"name": "Ayesha"},
                    "images": [{"url": "/uploads/a.jpg", "caption": "a.jpg"}],
                    "isFeatured": false,
                    "createdAt": "2024-05-01T10:00:00Z",
                    "updatedAt": "2024-05-02T10:00:00Z"
                }],
                "pagination": {
                    "page": 1, "limit": 12, "total": 1, "pages": 1,
                    "hasNext": false, "hasPrev": false
                }
            }"#,
        )
        .unwrap();

        let p = &page.properties[0];
        assert_eq!(p.location.city, "Karachi");
        assert_eq!(p.specifications.bedrooms, Some(2));
        assert_eq!(p.images.len(), 1);
        assert!(p.available_from.is_none());
        assert!(!page.pagination.has_next);
    }
}
