//! [`Command`] for updating a [`Property`].

use common::{
    operations::{
        By, Commit, Delete, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::property::Image;
use crate::{
    domain::{
        property::{self, ImageUrl},
        user::{self, Capability},
        Property,
    },
    infra::{
        database,
        storage::{self, Upload},
        Database, Storage,
    },
    Service,
};

use super::{oversized, remove_images, store_images, Command};

/// [`Command`] for updating a [`Property`].
///
/// Only the provided fields are changed. Nested values (like
/// [`property::Location`]) are replaced as a whole.
#[derive(Debug)]
pub struct UpdateProperty {
    /// ID of the [`Property`] to update.
    pub id: property::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,

    /// [`user::Role`] of the [`User`] performing the update.
    ///
    /// [`User`]: crate::domain::User
    pub role: user::Role,

    /// New [`property::Title`].
    pub title: Option<property::Title>,

    /// New [`property::Description`].
    pub description: Option<property::Description>,

    /// New [`property::Kind`].
    pub kind: Option<property::Kind>,

    /// New [`property::Category`].
    pub category: Option<property::Category>,

    /// New [`property::Price`].
    pub price: Option<property::Price>,

    /// New [`property::RentPeriod`].
    pub rent_period: Option<property::RentPeriod>,

    /// New availability [`DateTime`].
    ///
    /// [`DateTime`]: common::DateTime
    pub available_from: Option<property::AvailabilityDateTime>,

    /// New [`property::Location`].
    pub location: Option<property::Location>,

    /// New [`property::Specifications`].
    pub specifications: Option<property::Specifications>,

    /// New [`property::Size`].
    pub size: Option<property::Size>,

    /// New [`property::Features`].
    pub features: Option<property::Features>,

    /// New [`property::Status`].
    pub status: Option<property::Status>,

    /// New [`property::Contact`].
    pub contact: Option<property::Contact>,

    /// New featured indicator.
    pub is_featured: Option<bool>,

    /// Changes of the [`Image`]s.
    pub images: ImagesUpdate,
}

/// Changes of [`Property`] [`Image`]s.
#[derive(Debug, Default)]
pub struct ImagesUpdate {
    /// [`ImageUrl`]s of the already stored [`Image`]s to keep, in the new
    /// order.
    ///
    /// [`None`] keeps all the current [`Image`]s.
    pub existing: Option<Vec<ImageUrl>>,

    /// New images to upload and append.
    pub uploads: Vec<Upload>,
}

impl<Db, St> Command<UpdateProperty> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    St: Storage<Insert<Upload>, Ok = ImageUrl, Err = Traced<storage::Error>>
        + Storage<Delete<ImageUrl>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty {
            id,
            by,
            role,
            title,
            description,
            kind,
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
            images: ImagesUpdate { existing, uploads },
        } = cmd;

        if let Some(size) = oversized(&uploads, self.config().max_image_size) {
            return Err(tracerr::new!(E::ImageTooLarge(size)));
        }

        let added = store_images(self.storage(), uploads)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let updated = async {
            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tx.execute(Lock(By::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            let mut property = tx
                .execute(Select(By::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::PropertyNotExists(id))
                .map_err(tracerr::wrap!())?;

            if !property.is_manageable_by(by, role) {
                return Err(tracerr::new!(E::NotAllowed(by)));
            }
            if let Some(featured) = is_featured {
                if featured != property.is_featured
                    && !role.can(Capability::FeatureProperty)
                {
                    return Err(tracerr::new!(E::FeaturingNotAllowed(role)));
                }
                property.is_featured = featured;
            }

            let kept = match existing {
                None => property.images.clone(),
                Some(urls) => urls
                    .into_iter()
                    .map(|url| {
                        property
                            .images
                            .iter()
                            .find(|i| i.url == url)
                            .cloned()
                            .ok_or(E::UnknownImage(url))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(tracerr::wrap!())?,
            };
            let total = kept.len() + added.len();
            if total > Property::MAX_IMAGES {
                return Err(tracerr::new!(E::TooManyImages(total)));
            }
            let dropped = property
                .images
                .iter()
                .filter(|i| !kept.iter().any(|k| k.url == i.url))
                .cloned()
                .collect::<Vec<_>>();

            if let Some(title) = title {
                property.title = title;
            }
            if let Some(description) = description {
                property.description = description;
            }
            if let Some(kind) = kind {
                property.kind = kind;
            }
            if let Some(category) = category {
                property.category = category;
            }
            if let Some(price) = price {
                property.price = price;
            }
            if rent_period.is_some() {
                property.rent_period = rent_period;
            }
            if property.category == property::Category::Sale {
                property.rent_period = None;
            }
            if available_from.is_some() {
                property.available_from = available_from;
            }
            if let Some(location) = location {
                property.location = location;
            }
            if let Some(specifications) = specifications {
                property.specifications = specifications;
            }
            if size.is_some() {
                property.size = size;
            }
            if let Some(features) = features {
                property.features = features;
            }
            if let Some(status) = status {
                property.status = status;
            }
            if let Some(contact) = contact {
                property.contact = contact;
            }
            property.images =
                kept.into_iter().chain(added.iter().cloned()).collect();
            property.updated_at = DateTime::now().coerce();

            tx.execute(Update(property.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok::<_, Traced<E>>((property, dropped))
        }
        .await;
        let (property, dropped) = match updated {
            Ok(updated) => updated,
            Err(e) => {
                remove_images(self.storage(), added).await;
                return Err(e);
            }
        };
        remove_images(self.storage(), dropped).await;

        tracing::info!(property_id = %property.id, "property updated");

        Ok(property)
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`User`] is neither the owner of the [`Property`] nor allowed to
    /// manage any.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` cannot manage the `Property`")]
    #[from(ignore)]
    NotAllowed(#[error(not(source))] user::Id),

    /// [`user::Role`] doesn't allow featuring properties.
    #[display("`{_0}` role cannot feature properties")]
    #[from(ignore)]
    FeaturingNotAllowed(#[error(not(source))] user::Role),

    /// [`Image`] to keep doesn't belong to the [`Property`].
    #[display("`{_0}` is not an image of the `Property`")]
    #[from(ignore)]
    UnknownImage(#[error(not(source))] ImageUrl),

    /// Too many images would be attached.
    #[display(
        "{_0} images exceed the limit of {}",
        Property::MAX_IMAGES
    )]
    #[from(ignore)]
    TooManyImages(#[error(not(source))] usize),

    /// Uploaded image exceeds the size limit.
    #[display("Image of {_0} bytes exceeds the size limit")]
    #[from(ignore)]
    ImageTooLarge(#[error(not(source))] usize),
}
