//! [`SearchFilters`] definitions.

use rust_decimal::Decimal;
use service::{domain::property, read::property::list::Sort};
use smart_default::SmartDefault;

/// Default [`SearchFilters::limit`].
pub const DEFAULT_LIMIT: u32 = 12;

/// Criteria of a [`Property`] listings search.
///
/// [`Property`]: crate::model::Property
#[derive(Clone, Debug, Eq, PartialEq, SmartDefault)]
pub struct SearchFilters {
    /// City to match case-insensitively.
    pub city: Option<String>,

    /// Area to match case-insensitively.
    pub area: Option<String>,

    /// Kind of the property to match.
    pub property_type: Option<property::Kind>,

    /// Category to match.
    pub category: Option<property::Category>,

    /// Minimal price (inclusive).
    pub min_price: Option<Decimal>,

    /// Maximal price (inclusive).
    pub max_price: Option<Decimal>,

    /// Minimal number of bedrooms.
    pub bedrooms: Option<property::Rooms>,

    /// Minimal number of bathrooms.
    pub bathrooms: Option<property::Rooms>,

    /// Furnishing to match.
    pub furnishing: Option<property::Furnishing>,

    /// Sort order.
    pub sort: Sort,

    /// 1-based number of the page.
    #[default(1)]
    pub page: u32,

    /// Size of the page.
    #[default(DEFAULT_LIMIT)]
    pub limit: u32,

    /// Free text to search for.
    pub search: Option<String>,
}

impl SearchFilters {
    /// Merges the provided [`FiltersUpdate`] into these [`SearchFilters`],
    /// resetting the [`SearchFilters::page`] to the first one.
    pub fn apply(&mut self, update: FiltersUpdate) {
        let FiltersUpdate {
            city,
            area,
            property_type,
            category,
            min_price,
            max_price,
            bedrooms,
            bathrooms,
            furnishing,
            sort,
            limit,
            search,
        } = update;

        city.apply_to(&mut self.city);
        area.apply_to(&mut self.area);
        property_type.apply_to(&mut self.property_type);
        category.apply_to(&mut self.category);
        min_price.apply_to(&mut self.min_price);
        max_price.apply_to(&mut self.max_price);
        bedrooms.apply_to(&mut self.bedrooms);
        bathrooms.apply_to(&mut self.bathrooms);
        furnishing.apply_to(&mut self.furnishing);
        search.apply_to(&mut self.search);
        match sort {
            Patch::Keep => {}
            Patch::Set(s) => self.sort = s,
            Patch::Clear => self.sort = Sort::default(),
        }
        match limit {
            Patch::Keep => {}
            Patch::Set(l) => self.limit = l,
            Patch::Clear => self.limit = DEFAULT_LIMIT,
        }
        self.page = 1;
    }

    /// Returns the query parameters of these [`SearchFilters`].
    ///
    /// Absent and blank criteria are omitted, the order of parameters is
    /// fixed, so equal [`SearchFilters`] always give equal parameters.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let Self {
            city,
            area,
            property_type,
            category,
            min_price,
            max_price,
            bedrooms,
            bathrooms,
            furnishing,
            sort,
            page,
            limit,
            search,
        } = self;

        let text = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToOwned::to_owned)
        };
        [
            ("city", text(city)),
            ("area", text(area)),
            ("propertyType", property_type.map(|k| k.to_string())),
            ("category", category.map(|c| c.to_string())),
            ("minPrice", min_price.map(|p| p.to_string())),
            ("maxPrice", max_price.map(|p| p.to_string())),
            ("bedrooms", bedrooms.map(|b| b.to_string())),
            ("bathrooms", bathrooms.map(|b| b.to_string())),
            ("furnishing", furnishing.map(|f| f.to_string())),
            ("sort", Some(sort.to_string())),
            ("page", Some(page.to_string())),
            ("limit", Some(limit.to_string())),
            ("search", text(search)),
        ]
        .into_iter()
        .filter_map(|(name, v)| Some((name, v?)))
        .collect()
    }

    /// Returns the canonical cache key of these [`SearchFilters`].
    #[must_use]
    pub fn key(&self) -> String {
        self.query()
            .into_iter()
            .map(|(name, v)| format!("{name}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Change of a single [`SearchFilters`] field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Patch<T> {
    /// Leave the field as is.
    Keep,

    /// Set the field to the provided value.
    Set(T),

    /// Clear the field to its default.
    Clear,
}

impl<T> Patch<T> {
    /// Applies this [`Patch`] to the provided optional `field`.
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Set(v) => *field = Some(v),
            Self::Clear => *field = None,
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> From<T> for Patch<T> {
    fn from(v: T) -> Self {
        Self::Set(v)
    }
}

/// Partial update of [`SearchFilters`].
///
/// The [`SearchFilters::page`] cannot be updated this way, as any update
/// resets it to the first one.
#[derive(Clone, Debug, Default)]
pub struct FiltersUpdate {
    /// [`SearchFilters::city`] change.
    pub city: Patch<String>,

    /// [`SearchFilters::area`] change.
    pub area: Patch<String>,

    /// [`SearchFilters::property_type`] change.
    pub property_type: Patch<property::Kind>,

    /// [`SearchFilters::category`] change.
    pub category: Patch<property::Category>,

    /// [`SearchFilters::min_price`] change.
    pub min_price: Patch<Decimal>,

    /// [`SearchFilters::max_price`] change.
    pub max_price: Patch<Decimal>,

    /// [`SearchFilters::bedrooms`] change.
    pub bedrooms: Patch<property::Rooms>,

    /// [`SearchFilters::bathrooms`] change.
    pub bathrooms: Patch<property::Rooms>,

    /// [`SearchFilters::furnishing`] change.
    pub furnishing: Patch<property::Furnishing>,

    /// [`SearchFilters::sort`] change.
    pub sort: Patch<Sort>,

    /// [`SearchFilters::limit`] change.
    pub limit: Patch<u32>,

    /// [`SearchFilters::search`] change.
    pub search: Patch<String>,
}

#[cfg(test)]
mod spec {
    use service::{domain::property, read::property::list::Sort};

    use super::{FiltersUpdate, Patch, SearchFilters};

    fn paged(page: u32) -> SearchFilters {
        SearchFilters {
            page,
            ..SearchFilters::default()
        }
    }

    #[test]
    fn defaults() {
        let f = SearchFilters::default();

        assert_eq!(f.page, 1);
        assert_eq!(f.limit, 12);
        assert_eq!(f.sort, Sort::Newest);
        assert!(f.city.is_none() && f.search.is_none());
    }

    #[test]
    fn updates_accumulate_and_reset_page() {
        let mut f = paged(4);
        f.apply(FiltersUpdate {
            city: "Karachi".to_owned().into(),
            ..FiltersUpdate::default()
        });
        assert_eq!(f.page, 1);

        f.page = 3;
        f.apply(FiltersUpdate {
            bedrooms: 3.into(),
            ..FiltersUpdate::default()
        });

        assert_eq!(f.city.as_deref(), Some("Karachi"));
        assert_eq!(f.bedrooms, Some(3));
        assert_eq!(f.page, 1);
    }

    #[test]
    fn clears_explicitly() {
        let mut f = SearchFilters::default();
        f.apply(FiltersUpdate {
            furnishing: property::Furnishing::Furnished.into(),
            sort: Sort::PriceDesc.into(),
            limit: 24.into(),
            ..FiltersUpdate::default()
        });
        f.apply(FiltersUpdate {
            furnishing: Patch::Clear,
            sort: Patch::Clear,
            limit: Patch::Clear,
            ..FiltersUpdate::default()
        });

        assert_eq!(f, SearchFilters::default());
    }

    #[test]
    fn empty_update_still_resets_page() {
        let mut f = paged(7);
        f.apply(FiltersUpdate::default());

        assert_eq!(f, SearchFilters::default());
    }

    #[test]
    fn query_omits_absent_and_blank_values() {
        let f = SearchFilters {
            city: Some("Lahore".into()),
            area: Some("  ".into()),
            property_type: Some(property::Kind::House),
            bedrooms: Some(2),
            sort: Sort::PriceAsc,
            ..SearchFilters::default()
        };

        assert_eq!(
            f.key(),
            "city=Lahore&propertyType=HOUSE&bedrooms=2&sort=price_asc\
             &page=1&limit=12",
        );
        assert_eq!(
            SearchFilters::default().key(),
            "sort=newest&page=1&limit=12",
        );
    }
}
