//! Macros for defining kind enums.

use derive_more::{Display, Error};

/// Macro for defining a closed kind enum.
///
/// Generated enum is parsed case-insensitively from its
/// `SCREAMING_SNAKE_CASE` representation, which is also its [`Display`] and
/// Serde form. In PostgreSQL it's stored as an `INT2` discriminant.
///
/// # Example
///
/// ```rust
/// use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
///
/// assert_eq!("cube".parse::<Kind>().unwrap(), Kind::Cube);
/// assert_eq!(Kind::Sphere.to_string(), "SPHERE");
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::IntoStaticStr,
            Eq,
            Hash,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// All the variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Returns the textual representation of this value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                self.into()
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| $crate::UnknownVariant {
                        kind: ::core::stringify!($name),
                        value: s.to_owned(),
                    })
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                match u8::try_from(i16::from_sql(ty, raw)?)? {
                    $(
                        v if Self::$variant.u8() == v => Ok(Self::$variant),
                    )*
                    v => Err(::std::format!(
                        "invalid `{}` value: {v}",
                        ::core::stringify!($name),
                    ).into()),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                i16::from(self.u8()).to_sql(ty, w)
            }
        }
    };
}

/// Error of parsing a kind enum from an unknown value.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("unknown `{kind}` value: `{value}`")]
pub struct UnknownVariant {
    /// Name of the kind enum.
    pub kind: &'static str,

    /// Value failed to be parsed.
    pub value: String,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    crate::define_kind! {
        #[doc = "Test kind."]
        enum Shape {
            #[doc = "Cube."]
            Cube = 1,

            #[doc = "Semi sphere."]
            SemiSphere = 2,
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Shape::from_str("CUBE").unwrap(), Shape::Cube);
        assert_eq!(Shape::from_str("semi_sphere").unwrap(), Shape::SemiSphere);
        assert_eq!(Shape::from_str(" Cube ").unwrap(), Shape::Cube);
    }

    #[test]
    fn rejects_unknown() {
        let err = Shape::from_str("pyramid").unwrap_err();
        assert_eq!(err.kind, "Shape");
        assert_eq!(err.value, "pyramid");
    }

    #[test]
    fn displays_screaming_snake_case() {
        assert_eq!(Shape::SemiSphere.to_string(), "SEMI_SPHERE");
        assert_eq!(Shape::SemiSphere.as_str(), "SEMI_SPHERE");
        assert_eq!(Shape::ALL, &[Shape::Cube, Shape::SemiSphere]);
    }
}
