//! [`Property`]-related read definitions.

#[cfg(doc)]
use crate::domain::Property;

pub mod list {
    //! [`Property`] list definitions.

    use std::cmp::Ordering;

    use common::{define_pagination, define_text, pagination::Order};
    use strum::{Display, EnumString, IntoStaticStr};

    use crate::domain::{property, Property};

    define_pagination!(Property, Filter);

    /// Default number of [`Property`] listings on a [`Page`].
    pub const DEFAULT_LIMIT: u32 = 12;

    /// Maximum number of [`Property`] listings on a [`Page`].
    pub const MAX_LIMIT: u32 = 100;

    /// Filter for [`Selector`].
    ///
    /// All the provided criteria must match at once.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`property::City`] to match case-insensitively.
        pub city: Option<property::City>,

        /// [`property::Area`] to match case-insensitively.
        pub area: Option<property::Area>,

        /// [`property::Kind`] to match.
        pub kind: Option<property::Kind>,

        /// [`property::Category`] to match.
        pub category: Option<property::Category>,

        /// [`property::Furnishing`] to match.
        pub furnishing: Option<property::Furnishing>,

        /// Minimal [`property::Price`] (inclusive).
        pub min_price: Option<property::Price>,

        /// Maximal [`property::Price`] (inclusive).
        pub max_price: Option<property::Price>,

        /// Minimal number of bedrooms.
        pub bedrooms: Option<property::Rooms>,

        /// Minimal number of bathrooms.
        pub bathrooms: Option<property::Rooms>,

        /// [`Search`] text to look for in a title or a description.
        pub search: Option<Search>,

        /// [`property::Status`] to match, any if [`None`].
        pub status: Option<property::Status>,

        /// [`Sort`] order of the matching [`Property`] listings.
        pub sort: Sort,
    }

    impl Filter {
        /// Checks whether the provided [`Property`] matches this [`Filter`].
        #[must_use]
        pub fn matches(&self, p: &Property) -> bool {
            let Self {
                city,
                area,
                kind,
                category,
                furnishing,
                min_price,
                max_price,
                bedrooms,
                bathrooms,
                search,
                status,
                sort: _,
            } = self;

            let eq_ignore_case =
                |a: &str, b: &str| a.to_lowercase() == b.to_lowercase();
            let at_least = |have: Option<property::Rooms>, min| {
                have.is_some_and(|have| have >= min)
            };

            status.map_or(true, |s| p.status == s)
                && city.as_ref().map_or(true, |c| {
                    eq_ignore_case(c.as_ref(), p.location.city.as_ref())
                })
                && area.as_ref().map_or(true, |a| {
                    eq_ignore_case(a.as_ref(), p.location.area.as_ref())
                })
                && kind.map_or(true, |k| p.kind == k)
                && category.map_or(true, |c| p.category == c)
                && furnishing.map_or(true, |f| p.features.furnishing == Some(f))
                && min_price.map_or(true, |min| p.price >= min)
                && max_price.map_or(true, |max| p.price <= max)
                && bedrooms.map_or(true, |min| {
                    at_least(p.specifications.bedrooms, min)
                })
                && bathrooms.map_or(true, |min| {
                    at_least(p.specifications.bathrooms, min)
                })
                && search.as_ref().map_or(true, |s| s.is_found_in(p))
        }
    }

    define_text! {
        #[doc = "Free text searched in [`Property`] listings."]
        struct Search(max = 200);
    }

    impl Search {
        /// Checks whether this [`Search`] text is a case-insensitive
        /// substring of the [`Property`] title or description.
        #[must_use]
        pub fn is_found_in(&self, p: &Property) -> bool {
            let needle = self.as_ref().to_lowercase();
            p.title.as_ref().to_lowercase().contains(&needle)
                || p.description.as_ref().to_lowercase().contains(&needle)
        }
    }

    /// Sort order of [`Property`] listings.
    ///
    /// Ties are always resolved by [`property::Id`].
    #[derive(
        Clone,
        Copy,
        Debug,
        Default,
        Display,
        EnumString,
        Eq,
        Hash,
        IntoStaticStr,
        PartialEq,
    )]
    #[strum(serialize_all = "snake_case", ascii_case_insensitive)]
    pub enum Sort {
        /// Most recently created first.
        #[default]
        Newest,

        /// Least recently created first.
        Oldest,

        /// Cheapest first.
        PriceAsc,

        /// Most expensive first.
        PriceDesc,
    }

    impl Sort {
        /// Returns the [`Order`] this [`Sort`] applies to its key.
        #[must_use]
        pub const fn order(self) -> Order {
            match self {
                Self::Newest | Self::PriceDesc => Order::Descending,
                Self::Oldest | Self::PriceAsc => Order::Ascending,
            }
        }

        /// Compares the provided [`Property`] listings according to this
        /// [`Sort`].
        #[must_use]
        pub fn compare(self, a: &Property, b: &Property) -> Ordering {
            let key = match self {
                Self::Newest | Self::Oldest => a.created_at.cmp(&b.created_at),
                Self::PriceAsc | Self::PriceDesc => a.price.cmp(&b.price),
            };
            self.order().apply(key).then_with(|| a.id.cmp(&b.id))
        }
    }
}

pub mod owned {
    //! Definitions of [`Property`] listings owned by a single [`User`].
    //!
    //! [`User`]: crate::domain::User

    use common::define_pagination;

    use crate::domain::{user, Property};

    define_pagination!(Property, user::Id);
}

pub mod featured {
    //! Featured [`Property`] listings definitions.

    use derive_more::{Deref, From, Into};

    use crate::domain::Property;

    /// Maximum number of the featured [`Property`] listings.
    pub const LIMIT: usize = 8;

    /// Featured [`Property`] listings, newest first.
    ///
    /// Contains only [`Available`] ones.
    ///
    /// [`Available`]: crate::domain::property::Status::Available
    #[derive(Clone, Debug, Default, Deref, From, Into)]
    pub struct List(Vec<Property>);
}

pub mod saved {
    //! Definitions of [`Property`] listings saved by a single [`User`].
    //!
    //! [`User`]: crate::domain::User

    use derive_more::{Deref, From, Into};

    use crate::domain::Property;

    /// [`Property`] listings saved by a [`User`], most recently saved first.
    ///
    /// [`User`]: crate::domain::User
    #[derive(Clone, Debug, Default, Deref, From, Into)]
    pub struct List(Vec<Property>);
}
