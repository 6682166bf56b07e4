//! [`Property`] definitions.

mod image;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, define_text, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::{self, Capability, Role};

pub use self::image::{Caption, Format as ImageFormat, Image, Url as ImageUrl};

/// Property listed for rent or sale.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// [`Title`] of this [`Property`].
    pub title: Title,

    /// [`Description`] of this [`Property`].
    pub description: Description,

    /// [`Kind`] of this [`Property`].
    pub kind: Kind,

    /// [`Category`] this [`Property`] is listed in.
    pub category: Category,

    /// [`Price`] (or rent) of this [`Property`].
    pub price: Price,

    /// [`RentPeriod`] the [`Price`] is charged for, if rented.
    pub rent_period: Option<RentPeriod>,

    /// [`DateTime`] since when this [`Property`] is available.
    pub available_from: Option<AvailabilityDateTime>,

    /// [`Location`] of this [`Property`].
    pub location: Location,

    /// [`Specifications`] of this [`Property`].
    pub specifications: Specifications,

    /// [`Size`] of this [`Property`], if known.
    pub size: Option<Size>,

    /// [`Features`] of this [`Property`].
    pub features: Features,

    /// Current [`Status`] of this [`Property`].
    pub status: Status,

    /// ID of the [`User`] owning this [`Property`].
    ///
    /// Never changes after the creation.
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// [`Contact`] information of this [`Property`] listing.
    pub contact: Contact,

    /// [`Image`]s of this [`Property`], in display order.
    pub images: Vec<Image>,

    /// Indicator whether this [`Property`] is promoted to the featured
    /// listings.
    pub is_featured: bool,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Property`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

impl Property {
    /// Maximum number of [`Image`]s a [`Property`] may have.
    pub const MAX_IMAGES: usize = 10;

    /// Checks whether the [`User`] with the provided ID and [`Role`] may
    /// modify or delete this [`Property`].
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn is_manageable_by(&self, user_id: user::Id, role: Role) -> bool {
        self.owner_id == user_id || role.can(Capability::ManageAnyProperty)
    }
}

/// ID of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Title of a [`Property`] listing."]
    struct Title(max = 200);
}

define_text! {
    #[doc = "Description of a [`Property`] listing."]
    struct Description(max = 5000);
}

define_kind! {
    #[doc = "Kind of a [`Property`]."]
    enum Kind {
        #[doc = "A standalone house."]
        House = 1,

        #[doc = "An apartment in a building."]
        Apartment = 2,

        #[doc = "A portion (floor) of a house."]
        Portion = 3,

        #[doc = "A single room."]
        Room = 4,

        #[doc = "A plot of land."]
        Plot = 5,

        #[doc = "An office space."]
        Office = 6,

        #[doc = "A shop."]
        Shop = 7,
    }
}

define_kind! {
    #[doc = "Category a [`Property`] is listed in."]
    enum Category {
        #[doc = "Listed for rent."]
        Rent = 1,

        #[doc = "Listed for sale."]
        Sale = 2,
    }
}

define_kind! {
    #[doc = "Period a rent [`Price`] is charged for."]
    enum RentPeriod {
        #[doc = "Charged monthly."]
        Monthly = 1,

        #[doc = "Charged yearly."]
        Yearly = 2,
    }
}

define_kind! {
    #[doc = "Lifecycle status of a [`Property`] listing."]
    enum Status {
        #[doc = "Open for renting or buying."]
        Available = 1,

        #[doc = "A deal is being negotiated."]
        Pending = 2,

        #[doc = "Rented out."]
        Rented = 3,

        #[doc = "Sold."]
        Sold = 4,

        #[doc = "Hidden from the listings by its owner."]
        Inactive = 5,
    }
}

/// Price (or rent) of a [`Property`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is not negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Price`")
    }
}

/// Location of a [`Property`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// [`City`] the [`Property`] is located in.
    pub city: City,

    /// [`Area`] of the [`City`] the [`Property`] is located in.
    pub area: Area,

    /// Street [`Address`] of the [`Property`], if disclosed.
    pub address: Option<Address>,
}

define_text! {
    #[doc = "City of a [`Property`]."]
    struct City(max = 128);
}

define_text! {
    #[doc = "Area (district) of a [`City`]."]
    struct Area(max = 128);
}

define_text! {
    #[doc = "Street address of a [`Property`]."]
    struct Address(max = 512);
}

/// Specifications of a [`Property`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Specifications {
    /// Number of bedrooms, if applicable.
    pub bedrooms: Option<Rooms>,

    /// Number of bathrooms, if applicable.
    pub bathrooms: Option<Rooms>,
}

/// Number of rooms of some type in a [`Property`].
pub type Rooms = u8;

/// Size of a [`Property`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Size {
    /// [`SizeValue`] measured in [`Size::unit`]s.
    pub value: SizeValue,

    /// [`SizeUnit`] the [`Size::value`] is measured in.
    pub unit: SizeUnit,
}

/// Positive numeric value of a [`Size`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct SizeValue(Decimal);

impl SizeValue {
    /// Creates a new [`SizeValue`] if the given `value` is positive.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }
}

define_kind! {
    #[doc = "Unit a [`Size`] is measured in."]
    enum SizeUnit {
        #[doc = "Square feet."]
        Sqft = 1,

        #[doc = "Square meters."]
        Sqm = 2,

        #[doc = "Marla (272.25 square feet)."]
        Marla = 3,

        #[doc = "Kanal (20 marla)."]
        Kanal = 4,
    }
}

/// Features of a [`Property`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Features {
    /// [`Furnishing`] of the [`Property`], if specified.
    pub furnishing: Option<Furnishing>,

    /// [`Condition`] of the [`Property`], if specified.
    pub condition: Option<Condition>,
}

define_kind! {
    #[doc = "Furnishing of a [`Property`]."]
    enum Furnishing {
        #[doc = "Fully furnished."]
        Furnished = 1,

        #[doc = "Partially furnished."]
        SemiFurnished = 2,

        #[doc = "Not furnished."]
        Unfurnished = 3,
    }
}

define_kind! {
    #[doc = "Condition of a [`Property`]."]
    enum Condition {
        #[doc = "Newly built."]
        New = 1,

        #[doc = "In a good condition."]
        Good = 2,

        #[doc = "In a fair condition."]
        Fair = 3,

        #[doc = "Requires renovation."]
        NeedsRenovation = 4,
    }
}

/// Contact information of a [`Property`] listing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Contact {
    /// Name of the person to contact.
    pub name: Option<ContactName>,

    /// Phone to contact by.
    pub phone: Option<user::Phone>,

    /// Email to contact by.
    pub email: Option<user::Email>,
}

define_text! {
    #[doc = "Name of a [`Contact`] person."]
    struct ContactName(max = 128);
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] when a [`Property`] was modified.
pub type ModificationDateTime = DateTimeOf<(Property, unit::Modification)>;

/// [`DateTime`] since when a [`Property`] is available.
pub type AvailabilityDateTime = DateTimeOf<(Property, unit::Availability)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{Price, Status};

    #[test]
    fn price_is_not_negative() {
        assert!(Price::from_str("0").is_ok());
        assert!(Price::from_str("25000.50").is_ok());
        assert!(Price::from_str("-1").is_err());
        assert!(Price::from_str("lots").is_err());
    }

    #[test]
    fn status_is_closed_set() {
        for s in ["available", "PENDING", "Rented", "sold", "inactive"] {
            assert!(Status::from_str(s).is_ok(), "{s}");
        }
        assert!(Status::from_str("demolished").is_err());
        assert!(Status::from_str("").is_err());
    }
}
