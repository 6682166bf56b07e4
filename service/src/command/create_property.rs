//! [`Command`] for listing a new [`Property`].

use common::{
    operations::{By, Commit, Delete, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, ImageUrl},
        user::{self, Capability},
        Property, User,
    },
    infra::{
        database,
        storage::{self, Upload},
        Database, Storage,
    },
    Service,
};

use super::{oversized, remove_images, store_images, Command};

/// [`Command`] for listing a new [`Property`].
#[derive(Debug)]
pub struct CreateProperty {
    /// ID of the [`User`] listing the [`Property`].
    ///
    /// Becomes the [`Property::owner_id`].
    pub by: user::Id,

    /// [`property::Title`] of the [`Property`].
    pub title: property::Title,

    /// [`property::Description`] of the [`Property`].
    pub description: property::Description,

    /// [`property::Kind`] of the [`Property`].
    pub kind: property::Kind,

    /// [`property::Category`] of the [`Property`].
    pub category: property::Category,

    /// [`property::Price`] of the [`Property`].
    pub price: property::Price,

    /// [`property::RentPeriod`] of the [`Property`].
    ///
    /// Ignored for a [`property::Category::Sale`].
    pub rent_period: Option<property::RentPeriod>,

    /// Since when the [`Property`] is available.
    pub available_from: Option<property::AvailabilityDateTime>,

    /// [`property::Location`] of the [`Property`].
    pub location: property::Location,

    /// [`property::Specifications`] of the [`Property`].
    pub specifications: property::Specifications,

    /// [`property::Size`] of the [`Property`].
    pub size: Option<property::Size>,

    /// [`property::Features`] of the [`Property`].
    pub features: property::Features,

    /// Initial [`property::Status`] of the [`Property`].
    ///
    /// [`property::Status::Available`] if [`None`].
    pub status: Option<property::Status>,

    /// [`property::Contact`] of the [`Property`] listing.
    ///
    /// Missing details are taken from the [`User`] listing it.
    pub contact: property::Contact,

    /// Images of the [`Property`] to be uploaded.
    pub images: Vec<Upload>,

    /// Indicator whether the [`Property`] should be featured.
    pub is_featured: bool,
}

impl<Db, St> Command<CreateProperty> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    St: Storage<Insert<Upload>, Ok = ImageUrl, Err = Traced<storage::Error>>
        + Storage<Delete<ImageUrl>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty {
            by,
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
            images,
            is_featured,
        } = cmd;

        if images.len() > Property::MAX_IMAGES {
            return Err(tracerr::new!(E::TooManyImages(images.len())));
        }
        if let Some(size) = oversized(&images, self.config().max_image_size) {
            return Err(tracerr::new!(E::ImageTooLarge(size)));
        }

        let user = self
            .database()
            .execute(Select(By::new(by)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(by))
            .map_err(tracerr::wrap!())?;
        if !user.role.can(Capability::CreateProperty) {
            return Err(tracerr::new!(E::NotAllowed(user.role)));
        }
        if is_featured && !user.role.can(Capability::FeatureProperty) {
            return Err(tracerr::new!(E::FeaturingNotAllowed(user.role)));
        }

        let contact = property::Contact {
            name: contact.name.or_else(|| {
                property::ContactName::new(user.name.clone().into_inner())
            }),
            phone: contact.phone.or_else(|| user.phone.clone()),
            email: contact.email.or_else(|| Some(user.email.clone())),
        };

        let images = store_images(self.storage(), images)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let now = DateTime::now();
        let property = Property {
            id: property::Id::new(),
            title,
            description,
            kind,
            rent_period: (category == property::Category::Rent)
                .then_some(rent_period)
                .flatten(),
            category,
            price,
            available_from,
            location,
            specifications,
            size,
            features,
            status: status.unwrap_or(property::Status::Available),
            owner_id: user.id,
            contact,
            images,
            is_featured,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let persisted = async {
            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tx.execute(Insert(property.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok::<_, Traced<E>>(())
        };
        if let Err(e) = persisted.await {
            remove_images(self.storage(), property.images).await;
            return Err(e);
        }

        tracing::info!(
            property_id = %property.id,
            owner_id = %property.owner_id,
            "property created",
        );

        Ok(property)
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`user::Role`] doesn't allow listing properties.
    #[display("`{_0}` role cannot list properties")]
    #[from(ignore)]
    NotAllowed(#[error(not(source))] user::Role),

    /// [`user::Role`] doesn't allow featuring properties.
    #[display("`{_0}` role cannot feature properties")]
    #[from(ignore)]
    FeaturingNotAllowed(#[error(not(source))] user::Role),

    /// Too many images are uploaded.
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
