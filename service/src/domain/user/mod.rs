//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

use argon2::{
    password_hash::{self, PasswordHasher as _, PasswordVerifier as _},
    Argon2,
};
#[cfg(doc)]
use common::DateTime;
use common::{define_kind, define_text, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Platform user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`]
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`], used as a login.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Phone`] of this [`User`].
    pub phone: Option<Phone>,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
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
    #[doc = "Name of a [`User`]."]
    struct Name(max = 128);
}

define_kind! {
    #[doc = "Role of a [`User`] on the platform."]
    enum Role {
        #[doc = "Looks for a property to rent or buy."]
        User = 1,

        #[doc = "Lists own properties."]
        Owner = 2,

        #[doc = "Lists properties on behalf of their owners."]
        Agent = 3,

        #[doc = "Administers the platform."]
        Admin = 4,
    }
}

/// Action requiring a specific [`Role`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Capability {
    /// Listing a new property.
    CreateProperty,

    /// Modifying or deleting a property listed by someone else.
    ManageAnyProperty,

    /// Promoting a property to the featured listings.
    FeatureProperty,

    /// Bookmarking a property.
    SaveProperty,

    /// Registering with this [`Role`] without any approval.
    SelfAssign,
}

impl Role {
    /// Checks whether this [`Role`] grants the provided [`Capability`].
    #[must_use]
    pub const fn can(self, capability: Capability) -> bool {
        use Capability as C;

        match capability {
            C::CreateProperty => {
                matches!(self, Self::Owner | Self::Agent | Self::Admin)
            }
            C::ManageAnyProperty | C::FeatureProperty => {
                matches!(self, Self::Admin)
            }
            C::SaveProperty => true,
            C::SelfAssign => !matches!(self, Self::Admin),
        }
    }
}

/// Password of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.len() >= 6 && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [Argon2] hash of a [`User`]'s [`Password`] in a [PHC string format].
///
/// [Argon2]: https://en.wikipedia.org/wiki/Argon2
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the given [`Password`] with a random salt.
    ///
    /// # Errors
    ///
    /// If the hashing fails.
    pub fn new(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = password_hash::SaltString::generate(&mut rand_core::OsRng);
        Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .map(|h| Self(h.to_string()))
    }

    /// Checks whether the given [`Password`] matches this [`PasswordHash`].
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &hash)
                .is_ok()
        })
    }
}

/// Email address of a [`User`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    ///
    /// The address is lowercased, so [`Email`]s compare case-insensitively.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into().to_lowercase();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        address.as_ref().len() <= 320 && REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format: an optional
        /// international prefix followed by 7 to 15 digits, optionally
        /// separated by single spaces or dashes.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d(?:[-\s]?\d){6,14}$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Capability, Email, Password, PasswordHash, Phone, Role};

    #[test]
    fn email_is_normalized() {
        let email = Email::new("Owner@Example.COM").unwrap();
        assert_eq!(AsRef::<str>::as_ref(&email), "owner@example.com");
        assert!(Email::new("not an email").is_none());
    }

    #[test]
    fn phone_format() {
        assert!(Phone::new("+92 300 1234567").is_some());
        assert!(Phone::new("0300-1234567").is_some());
        assert!(Phone::new("12345").is_none());
        assert!(Phone::new("call me").is_none());
    }

    #[test]
    fn password_hash_verifies() {
        let password = Password::new("hunter42").unwrap();
        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.to_string().starts_with("$argon2"));
        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("hunter43").unwrap()));
    }

    #[test]
    fn role_capabilities() {
        use Capability as C;

        assert!(!Role::User.can(C::CreateProperty));
        assert!(Role::Owner.can(C::CreateProperty));
        assert!(Role::Agent.can(C::CreateProperty));
        assert!(Role::Admin.can(C::CreateProperty));

        assert!(!Role::Owner.can(C::ManageAnyProperty));
        assert!(!Role::Agent.can(C::ManageAnyProperty));
        assert!(Role::Admin.can(C::ManageAnyProperty));

        assert!(Role::ALL.iter().all(|r| r.can(C::SaveProperty)));
        assert!(!Role::Admin.can(C::SelfAssign));
        assert!(Role::Owner.can(C::SelfAssign));
    }
}
