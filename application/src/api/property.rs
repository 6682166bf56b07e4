//! [`Property`]-related REST API definitions.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query,
    },
    http::StatusCode,
    Json,
};
use common::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, update_property::ImagesUpdate, Command as _},
    domain::{self, property, user},
    query,
    read::property::{list, owned},
    Query as _,
};

use crate::{AsError, Context, Error};

use super::{
    form::ImageError, parse, required, Form, NotFoundError, PaginationError,
    PrivilegeError,
};

/// [`Property`] listing representation.
///
/// [`Property`]: domain::Property
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// ID of the listing.
    pub id: property::Id,

    /// Title of the listing.
    pub title: String,

    /// Description of the listing.
    pub description: String,

    /// Kind of the property.
    pub property_type: property::Kind,

    /// Category of the listing.
    pub category: property::Category,

    /// Price (or rent) of the property.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Period the rent is charged for.
    pub rent_period: Option<property::RentPeriod>,

    /// Since when the property is available.
    pub available_from: Option<DateTime>,

    /// Location of the property.
    pub location: Location,

    /// Specifications of the property.
    pub specifications: Specifications,

    /// Size of the property.
    pub size: Option<Size>,

    /// Features of the property.
    pub features: Features,

    /// Lifecycle status of the listing.
    pub status: property::Status,

    /// ID of the user owning the listing.
    pub owner_id: user::Id,

    /// Contact information of the listing.
    pub contact: Contact,

    /// Images of the property.
    pub images: Vec<Image>,

    /// Indicator whether the listing is featured.
    pub is_featured: bool,

    /// When the listing was created.
    pub created_at: DateTime,

    /// When the listing was modified the last time.
    pub updated_at: DateTime,
}

impl From<domain::Property> for Property {
    fn from(p: domain::Property) -> Self {
        Self {
            id: p.id,
            title: p.title.into_inner(),
            description: p.description.into_inner(),
            property_type: p.kind,
            category: p.category,
            price: p.price.amount(),
            rent_period: p.rent_period,
            available_from: p.available_from.map(|at| at.coerce()),
            location: p.location.into(),
            specifications: p.specifications.into(),
            size: p.size.map(Into::into),
            features: p.features.into(),
            status: p.status,
            owner_id: p.owner_id,
            contact: p.contact.into(),
            images: p.images.into_iter().map(Into::into).collect(),
            is_featured: p.is_featured,
            created_at: p.created_at.coerce(),
            updated_at: p.updated_at.coerce(),
        }
    }
}

/// Location of a [`Property`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Location {
    /// City the property is located in.
    pub city: String,

    /// Area of the city.
    pub area: String,

    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<property::Location> for Location {
    fn from(l: property::Location) -> Self {
        Self {
            city: l.city.into_inner(),
            area: l.area.into_inner(),
            address: l.address.map(property::Address::into_inner),
        }
    }
}

impl TryFrom<Location> for property::Location {
    type Error = Error;

    fn try_from(l: Location) -> Result<Self, Self::Error> {
        let city = parse("location.city", Some(&l.city))?;
        let area = parse("location.area", Some(&l.area))?;
        Ok(Self {
            city: required("location.city", city)?,
            area: required("location.area", area)?,
            address: parse("location.address", l.address.as_deref())?,
        })
    }
}

/// Specifications of a [`Property`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct Specifications {
    /// Number of bedrooms.
    #[serde(default)]
    pub bedrooms: Option<property::Rooms>,

    /// Number of bathrooms.
    #[serde(default)]
    pub bathrooms: Option<property::Rooms>,
}

impl From<property::Specifications> for Specifications {
    fn from(s: property::Specifications) -> Self {
        let property::Specifications {
            bedrooms,
            bathrooms,
        } = s;
        Self {
            bedrooms,
            bathrooms,
        }
    }
}

impl From<Specifications> for property::Specifications {
    fn from(s: Specifications) -> Self {
        let Specifications {
            bedrooms,
            bathrooms,
        } = s;
        Self {
            bedrooms,
            bathrooms,
        }
    }
}

/// Size of a [`Property`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Size {
    /// Positive value of the size.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,

    /// Unit the value is measured in.
    pub unit: property::SizeUnit,
}

impl From<property::Size> for Size {
    fn from(s: property::Size) -> Self {
        Self {
            value: s.value.into(),
            unit: s.unit,
        }
    }
}

impl TryFrom<Size> for property::Size {
    type Error = Error;

    fn try_from(s: Size) -> Result<Self, Self::Error> {
        Ok(Self {
            value: property::SizeValue::new(s.value).ok_or_else(|| {
                Error::validation("`size.value` must be positive")
            })?,
            unit: s.unit,
        })
    }
}

/// Features of a [`Property`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct Features {
    /// Furnishing of the property.
    #[serde(default)]
    pub furnishing: Option<property::Furnishing>,

    /// Condition of the property.
    #[serde(default)]
    pub condition: Option<property::Condition>,
}

impl From<property::Features> for Features {
    fn from(f: property::Features) -> Self {
        Self {
            furnishing: f.furnishing,
            condition: f.condition,
        }
    }
}

impl From<Features> for property::Features {
    fn from(f: Features) -> Self {
        Self {
            furnishing: f.furnishing,
            condition: f.condition,
        }
    }
}

/// Contact information of a [`Property`] listing.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Contact {
    /// Name of the person to contact.
    #[serde(default)]
    pub name: Option<String>,

    /// Phone to contact by.
    #[serde(default)]
    pub phone: Option<String>,

    /// Email to contact by.
    #[serde(default)]
    pub email: Option<String>,
}

impl From<property::Contact> for Contact {
    fn from(c: property::Contact) -> Self {
        Self {
            name: c.name.map(property::ContactName::into_inner),
            phone: c.phone.map(|p| p.to_string()),
            email: c.email.map(|e| e.to_string()),
        }
    }
}

impl TryFrom<Contact> for property::Contact {
    type Error = Error;

    fn try_from(c: Contact) -> Result<Self, Self::Error> {
        Ok(Self {
            name: parse("contact.name", c.name.as_deref())?,
            phone: parse("contact.phone", c.phone.as_deref())?,
            email: parse("contact.email", c.email.as_deref())?,
        })
    }
}

/// Image of a [`Property`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Image {
    /// URL the image is served at.
    pub url: String,

    /// Caption of the image.
    #[serde(default)]
    pub caption: Option<String>,
}

impl From<property::Image> for Image {
    fn from(i: property::Image) -> Self {
        Self {
            url: i.url.into_inner(),
            caption: i.caption.map(property::Caption::into_inner),
        }
    }
}

/// Page of [`Property`] listings.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    /// [`Property`] listings on this [`Page`].
    pub properties: Vec<Property>,

    /// [`Pagination`] metadata of this [`Page`].
    pub pagination: Pagination,
}

impl From<common::pagination::Page<domain::Property>> for Page {
    fn from(page: common::pagination::Page<domain::Property>) -> Self {
        let info = page.info();
        Self {
            properties: page.items.into_iter().map(Into::into).collect(),
            pagination: Pagination {
                page: info.page,
                limit: info.limit,
                total: info.total,
                pages: info.pages,
                has_next: info.has_next_page,
                has_prev: info.has_previous_page,
            },
        }
    }
}

/// Pagination metadata of a [`Page`].
#[derive(Clone, Copy, Debug, Serialize)]
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

/// List of [`Property`] listings.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`Property`] listings.
    pub properties: Vec<Property>,
}

impl From<Vec<domain::Property>> for List {
    fn from(properties: Vec<domain::Property>) -> Self {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query parameters of a [`Property`] listings request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// City to match.
    pub city: Option<String>,

    /// Area to match.
    pub area: Option<String>,

    /// Kind of the property to match.
    pub property_type: Option<String>,

    /// Category to match.
    pub category: Option<String>,

    /// Minimal price.
    pub min_price: Option<String>,

    /// Maximal price.
    pub max_price: Option<String>,

    /// Minimal number of bedrooms.
    pub bedrooms: Option<String>,

    /// Minimal number of bathrooms.
    pub bathrooms: Option<String>,

    /// Furnishing to match.
    pub furnishing: Option<String>,

    /// Status to match.
    pub status: Option<String>,

    /// Sort order.
    pub sort: Option<String>,

    /// Text to search for.
    pub search: Option<String>,

    /// 1-based number of the page.
    pub page: Option<String>,

    /// Size of the page.
    pub limit: Option<String>,
}

impl ListParams {
    /// Parses the [`list::Selector`] out of these [`ListParams`].
    ///
    /// # Errors
    ///
    /// If any of the parameters is malformed or out of range.
    pub fn selector(&self) -> Result<list::Selector, Error> {
        let filter = list::Filter {
            city: parse("city", self.city.as_deref())?,
            area: parse("area", self.area.as_deref())?,
            kind: parse("propertyType", self.property_type.as_deref())?,
            category: parse("category", self.category.as_deref())?,
            furnishing: parse("furnishing", self.furnishing.as_deref())?,
            min_price: parse("minPrice", self.min_price.as_deref())?,
            max_price: parse("maxPrice", self.max_price.as_deref())?,
            bedrooms: parse("bedrooms", self.bedrooms.as_deref())?,
            bathrooms: parse("bathrooms", self.bathrooms.as_deref())?,
            search: parse("search", self.search.as_deref())?,
            status: parse("status", self.status.as_deref())?,
            sort: parse("sort", self.sort.as_deref())?.unwrap_or_default(),
        };
        Ok(list::Selector {
            arguments: self.arguments(list::DEFAULT_LIMIT, list::MAX_LIMIT)?,
            filter,
        })
    }

    /// Parses the pagination [`list::Arguments`] out of these
    /// [`ListParams`].
    ///
    /// # Errors
    ///
    /// If the `page` or the `limit` is malformed or out of range.
    pub fn arguments(
        &self,
        default: u32,
        max: u32,
    ) -> Result<list::Arguments, Error> {
        list::Arguments::new(
            parse("page", self.page.as_deref())?,
            parse("limit", self.limit.as_deref())?,
            default,
            max,
        )
        .ok_or_else(|| PaginationError::OutOfRange.into())
    }
}

/// Lists the public [`Property`] listings matching the provided filters.
///
/// # Errors
///
/// If the filters are invalid.
#[tracing::instrument(skip_all, fields(http.route = "/api/properties"))]
pub async fn list(
    ctx: Context,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page>, Error> {
    let Query(params) = params.map_err(AsError::into_error)?;
    let selector = params.selector()?;
    let page = ctx
        .service()
        .execute(query::properties::List::by(selector))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(page.into()))
}

/// Lists the featured [`Property`] listings.
///
/// # Errors
///
/// If the [`Service`] fails.
///
/// [`Service`]: crate::Service
#[tracing::instrument(skip_all)]
pub async fn featured(ctx: Context) -> Result<Json<List>, Error> {
    let list = ctx
        .service()
        .execute(query::properties::Featured::by(()))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(Vec::from(list).into()))
}

/// Lists the [`Property`] listings of the authenticated user, in any status.
///
/// # Errors
///
/// If the request is not authenticated, or the pagination is invalid.
#[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty))]
pub async fn owned(
    ctx: Context,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page>, Error> {
    let session = ctx.current_session().await?;
    _ = tracing::Span::current().record("user_id", session.user_id.to_string());

    let Query(params) = params.map_err(AsError::into_error)?;
    let page = ctx
        .service()
        .execute(query::properties::Owned::by(owned::Selector {
            arguments: params.arguments(list::DEFAULT_LIMIT, list::MAX_LIMIT)?,
            filter: session.user_id,
        }))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(page.into()))
}

/// Returns a single [`Property`] listing.
///
/// # Errors
///
/// If the [`Property`] doesn't exist.
#[tracing::instrument(skip_all, fields(property_id = tracing::field::Empty))]
pub async fn get(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
) -> Result<Json<Property>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("property_id", id.to_string());

    ctx.service()
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|p| Json(p.into()))
        .ok_or_else(|| NotFoundError::Property.into())
}

/// Lists a new [`Property`] out of a `multipart/form-data` request.
///
/// # Errors
///
/// If the request is not authenticated, or is malformed, or the
/// authenticated user is not allowed to list properties.
#[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty))]
pub async fn create(
    ctx: Context,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Property>), Error> {
    let session = ctx.current_session().await?;
    _ = tracing::Span::current().record("user_id", session.user_id.to_string());

    let mut form =
        Form::read(multipart.map_err(AsError::into_error)?).await?;
    let cmd = command::CreateProperty {
        by: session.user_id,
        title: required("title", form.text("title")?)?,
        description: required("description", form.text("description")?)?,
        kind: required("propertyType", form.text("propertyType")?)?,
        category: required("category", form.text("category")?)?,
        price: required("price", form.text("price")?)?,
        rent_period: form.text("rentPeriod")?,
        available_from: form
            .text::<DateTime>("availableFrom")?
            .map(|at| at.coerce()),
        location: property::Location::try_from(required(
            "location",
            form.json::<Location>("location")?,
        )?)?,
        specifications: form
            .json::<Specifications>("specifications")?
            .map(Into::into)
            .unwrap_or_default(),
        size: form
            .json::<Size>("size")?
            .map(property::Size::try_from)
            .transpose()?,
        features: form
            .json::<Features>("features")?
            .map(Into::into)
            .unwrap_or_default(),
        status: form.text("status")?,
        contact: form
            .json::<Contact>("contact")?
            .map(property::Contact::try_from)
            .transpose()?
            .unwrap_or_default(),
        is_featured: form.text("isFeatured")?.unwrap_or(false),
        images: form.uploads,
    };

    let property = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;
    Ok((StatusCode::CREATED, Json(property.into())))
}

/// Updates a [`Property`] out of a `multipart/form-data` request.
///
/// # Errors
///
/// If the request is not authenticated, or is malformed, or the
/// authenticated user is not allowed to manage the [`Property`].
#[tracing::instrument(skip_all, fields(property_id = tracing::field::Empty))]
pub async fn update(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Property>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("property_id", id.to_string());
    let session = ctx.current_session().await?;

    let mut form =
        Form::read(multipart.map_err(AsError::into_error)?).await?;
    let existing = form
        .json::<Vec<Image>>("existingImages")?
        .map(|images| {
            images
                .iter()
                .map(|i| {
                    let url = parse("existingImages.url", Some(&i.url))?;
                    required("existingImages.url", url)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;
    let cmd = command::UpdateProperty {
        id,
        by: session.user_id,
        role: session.role,
        title: form.text("title")?,
        description: form.text("description")?,
        kind: form.text("propertyType")?,
        category: form.text("category")?,
        price: form.text("price")?,
        rent_period: form.text("rentPeriod")?,
        available_from: form
            .text::<DateTime>("availableFrom")?
            .map(|at| at.coerce()),
        location: form
            .json::<Location>("location")?
            .map(property::Location::try_from)
            .transpose()?,
        specifications: form
            .json::<Specifications>("specifications")?
            .map(Into::into),
        size: form
            .json::<Size>("size")?
            .map(property::Size::try_from)
            .transpose()?,
        features: form.json::<Features>("features")?.map(Into::into),
        status: form.text("status")?,
        contact: form
            .json::<Contact>("contact")?
            .map(property::Contact::try_from)
            .transpose()?,
        is_featured: form.text("isFeatured")?,
        images: ImagesUpdate {
            existing,
            uploads: form.uploads,
        },
    };

    let property = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(property.into()))
}

/// Body of a [`Property`] status change request.
#[derive(Clone, Debug, Deserialize)]
pub struct StatusChange {
    /// New status.
    pub status: String,
}

/// Changes the status of a [`Property`].
///
/// # Errors
///
/// If the request is not authenticated, or the status is not a known one,
/// or the authenticated user is not allowed to manage the [`Property`].
#[tracing::instrument(
    skip_all,
    fields(property_id = tracing::field::Empty, status = tracing::field::Empty),
)]
pub async fn update_status(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
    body: Result<Json<StatusChange>, JsonRejection>,
) -> Result<Json<Property>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    let span = tracing::Span::current();
    _ = span.record("property_id", id.to_string());
    let Json(StatusChange { status }) = body.map_err(AsError::into_error)?;
    let status = required("status", parse("status", Some(&status))?)?;
    _ = span.record("status", tracing::field::display(status));

    let session = ctx.current_session().await?;

    let property = ctx
        .service()
        .execute(command::UpdatePropertyStatus {
            id,
            by: session.user_id,
            role: session.role,
            status,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(property.into()))
}

/// Deletes a [`Property`] along with its images.
///
/// # Errors
///
/// If the request is not authenticated, or the authenticated user is not
/// allowed to manage the [`Property`].
#[tracing::instrument(skip_all, fields(property_id = tracing::field::Empty))]
pub async fn delete(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("property_id", id.to_string());
    let session = ctx.current_session().await?;

    _ = ctx
        .service()
        .execute(command::DeleteProperty {
            id,
            by: session.user_id,
            role: session.role,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(StatusCode::NO_CONTENT)
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::Storage(e) => return e.try_as_error(),
            Self::UserNotExists(_) => NotFoundError::User.into(),
            Self::NotAllowed(_) | Self::FeaturingNotAllowed(_) => {
                PrivilegeError::Role.into()
            }
            Self::TooManyImages(_) => ImageError::TooMany.into(),
            Self::ImageTooLarge(_) => ImageError::TooLarge.into(),
        })
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::Storage(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => NotFoundError::Property.into(),
            Self::NotAllowed(_) => PrivilegeError::NotOwner.into(),
            Self::FeaturingNotAllowed(_) => PrivilegeError::Role.into(),
            Self::UnknownImage(_) => ImageError::Unknown.into(),
            Self::TooManyImages(_) => ImageError::TooMany.into(),
            Self::ImageTooLarge(_) => ImageError::TooLarge.into(),
        })
    }
}

impl AsError for command::update_property_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => NotFoundError::Property.into(),
            Self::NotAllowed(_) => PrivilegeError::NotOwner.into(),
        })
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => NotFoundError::Property.into(),
            Self::NotAllowed(_) => PrivilegeError::NotOwner.into(),
        })
    }
}

#[cfg(test)]
mod spec {
    use axum::{
        body::Body,
        routing::{get, patch},
        Extension, Router,
    };
    use http_body_util::BodyExt as _;
    use service::{
        domain::property,
        read::property::list::{self, Sort},
    };
    use tower::ServiceExt as _;

    use super::ListParams;

    fn params(query: &str) -> ListParams {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn parses_filters() {
        let selector = params(
            "city=Karachi&propertyType=apartment&minPrice=1000&bedrooms=3\
             &sort=price_asc&page=2&limit=20&search=sea%20view",
        )
        .selector()
        .unwrap();

        let f = &selector.filter;
        assert_eq!(f.city.as_ref().map(AsRef::as_ref), Some("Karachi"));
        assert_eq!(f.kind, Some(property::Kind::Apartment));
        assert_eq!(f.min_price.map(|p| p.amount()), Some(1000.into()));
        assert_eq!(f.bedrooms, Some(3));
        assert_eq!(f.sort, Sort::PriceAsc);
        assert_eq!(f.search.as_ref().map(AsRef::as_ref), Some("sea view"));
        assert_eq!(selector.arguments.page(), 2);
        assert_eq!(selector.arguments.limit(), 20);
    }

    #[test]
    fn empty_values_are_omitted() {
        let selector = params("city=&area=&sort=&page=").selector().unwrap();

        assert!(selector.filter.city.is_none());
        assert!(selector.filter.area.is_none());
        assert_eq!(selector.filter.sort, Sort::Newest);
        assert_eq!(selector.arguments.page(), 1);
        assert_eq!(selector.arguments.limit(), list::DEFAULT_LIMIT);
    }

    #[test]
    fn rejects_malformed_values() {
        for query in [
            "status=DEMOLISHED",
            "propertyType=castle",
            "minPrice=-5",
            "bedrooms=many",
            "sort=random",
            "page=0",
            "limit=101",
            "limit=0",
        ] {
            let err = params(query).selector().unwrap_err();
            let status = err.status_code;
            assert_eq!(status, http::StatusCode::BAD_REQUEST, "{query}");
        }
    }

    #[tokio::test]
    async fn invalid_query_renders_validation_error() {
        async fn handler(
            params: Result<
                axum::extract::Query<ListParams>,
                axum::extract::rejection::QueryRejection,
            >,
        ) -> Result<String, crate::Error> {
            let axum::extract::Query(params) =
                params.map_err(crate::AsError::into_error)?;
            params.selector().map(|s| s.arguments.page().to_string())
        }

        let app = Router::new().route("/", get(handler));

        let resp = app
            .clone()
            .oneshot(
                http::Request::get("/?page=3").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"3");

        let resp = app
            .oneshot(
                http::Request::get("/?status=gone")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    fn lazy_service() -> crate::Service {
        let conf = crate::Config::default();
        crate::Service::new(
            conf.service.into(),
            service::infra::Postgres::new(&conf.postgres.into()).unwrap(),
            conf.storage.into(),
        )
    }

    async fn error_code(resp: axum::response::Response) -> String {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["code"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn unknown_status_is_validation_error() {
        let app = Router::new()
            .route("/properties/:id/status", patch(super::update_status))
            .layer(Extension(lazy_service()));
        let uri = format!("/properties/{}/status", property::Id::new());
        let request = |body: &'static str| {
            http::Request::patch(&uri)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let resp = app
            .clone()
            .oneshot(request(r#"{"status":"DEMOLISHED"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(error_code(resp).await, "VALIDATION_ERROR");

        let resp = app
            .clone()
            .oneshot(request(r#"{"status":""}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(request(r#"{"status":"RENTED"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(resp).await, "AUTHORIZATION_REQUIRED");
    }
}
