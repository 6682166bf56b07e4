//! Macros for defining validated text values.

/// Macro for defining a newtype over [`String`] which must be non-empty,
/// have no surrounding whitespace and fit into the provided length (in
/// characters).
///
/// # Example
///
/// ```rust
/// use common::define_text;
///
/// define_text! {
///     #[doc = "Nickname of a pet."]
///     struct Nickname(max = 16);
/// }
///
/// assert!(Nickname::new("Rex").is_some());
/// assert!(Nickname::new(" Rex").is_none());
/// assert!(Nickname::new("").is_none());
/// ```
#[macro_export]
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        struct $name:ident(max = $max:literal);
    ) => {
        #[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[cfg_attr(
            feature = "postgres",
            derive(
                $crate::private::postgres_types::FromSql,
                $crate::private::postgres_types::ToSql,
            ),
            postgres(transparent),
        )]
        #[doc = $doc]
        pub struct $name(String);

        impl $name {
            /// Maximum length (in characters) of this value.
            pub const MAX_LEN: usize = $max;

            /// Creates a new value without checking its format.
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `value` matches the
            /// format.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Creates a new value if the given `value` is valid.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            /// Checks whether the given `value` is valid.
            fn check(value: &str) -> bool {
                value.trim() == value
                    && !value.is_empty()
                    && value.chars().count() <= Self::MAX_LEN
            }

            /// Consumes this value returning the inner [`String`].
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut ::core::fmt::Formatter<'_>,
            ) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(::core::concat!(
                    "invalid `",
                    ::core::stringify!($name),
                    "`",
                ))
            }
        }
    };
}
