//! Abstractions for page-based pagination.

/// Pagination arguments: 1-based page number and a page size.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// 1-based number of the requested page.
    page: u32,

    /// Maximum number of items on a page.
    limit: u32,
}

impl Arguments {
    /// Creates new [`Arguments`].
    ///
    /// Missing `page` means the first one, missing `limit` means the
    /// `default` one. [`None`] is returned if the `page` is zero, or the
    /// `limit` is zero or exceeds the `max` one.
    #[must_use]
    pub fn new(
        page: Option<u32>,
        limit: Option<u32>,
        default: u32,
        max: u32,
    ) -> Option<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default);
        (page >= 1 && limit >= 1 && limit <= max)
            .then_some(Self { page, limit })
    }

    /// Returns the 1-based number of the requested page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the maximum number of items on the requested page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of items to skip before the requested page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// A page of items.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// Total number of items across all the pages.
    pub total: u64,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] out of already selected items.
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = impl Into<I>>,
        total: u64,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            total,
            arguments,
        }
    }

    /// Cuts a [`Page`] out of all the (already ordered) items.
    #[must_use]
    pub fn slice(arguments: Arguments, all: Vec<I>) -> Self {
        let total = all.len() as u64;
        let offset = usize::try_from(arguments.offset()).unwrap_or(usize::MAX);
        let items = all
            .into_iter()
            .skip(offset)
            .take(arguments.limit as usize)
            .collect();
        Self {
            items,
            total,
            arguments,
        }
    }

    /// Converts items of this [`Page`] with the provided function.
    #[must_use]
    pub fn map<T>(self, f: impl FnMut(I) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            arguments: self.arguments,
        }
    }

    /// Returns [`PageInfo`] of this [`Page`].
    #[must_use]
    pub fn info(&self) -> PageInfo {
        let limit = u64::from(self.arguments.limit);
        let pages = self.total.div_ceil(limit);
        let page = u64::from(self.arguments.page);
        PageInfo {
            page: self.arguments.page,
            limit: self.arguments.limit,
            total: self.total,
            pages,
            has_next_page: page < pages,
            has_previous_page: page > 1,
        }
    }
}

/// Information about a [`Page`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageInfo {
    /// 1-based number of the page.
    pub page: u32,

    /// Maximum number of items on the page.
    pub limit: u32,

    /// Total number of items across all the pages.
    pub total: u64,

    /// Total number of pages.
    pub pages: u64,

    /// Indicator whether there is a page after this one.
    pub has_next_page: bool,

    /// Indicator whether there is a page before this one.
    pub has_previous_page: bool,
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Order of items.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    Descending,
}

impl Order {
    /// Returns SQL keyword representing this [`Order`].
    #[cfg(feature = "postgres")]
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    /// Applies this [`Order`] to an ascending [`Ordering`].
    ///
    /// [`Ordering`]: std::cmp::Ordering
    #[must_use]
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}
