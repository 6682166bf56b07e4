//! Helpers shared by the [`Service`] integration tests.

#![allow(dead_code, reason = "not every test uses every helper")]

use std::str::FromStr as _;

use rust_decimal::Decimal;
use secrecy::SecretBox;
use service::{
    command::{CreateProperty, CreateUser},
    domain::{property, user, Property, User},
    infra::{database, storage},
    Command as _, Config, Service,
};

/// [`Service`] backed by in-memory infrastructure.
pub type TestService = Service<database::Memory, storage::Memory>;

/// Creates a new [`TestService`] with empty stores.
pub fn service() -> TestService {
    Service::new(
        Config::from_secret(b"test-secret"),
        database::Memory::new(),
        storage::Memory::default(),
    )
}

/// Registers a new [`User`] with the provided `role`.
pub async fn register(
    svc: &TestService,
    email: &str,
    role: user::Role,
) -> User {
    svc.execute(CreateUser {
        name: user::Name::new("Test User").unwrap(),
        email: user::Email::new(email).unwrap(),
        password: password("secret-password"),
        phone: user::Phone::new("+92 300 1234567"),
        role,
    })
    .await
    .unwrap()
}

/// Wraps the provided `raw` password into a secret.
pub fn password(raw: &str) -> SecretBox<user::Password> {
    SecretBox::new(Box::new(user::Password::new(raw).unwrap()))
}

/// Returns a [`CreateProperty`] command for an apartment in the provided
/// `city`.
pub fn apartment(by: user::Id, city: &str, price: i64) -> CreateProperty {
    CreateProperty {
        by,
        title: property::Title::new(format!("Apartment in {city}")).unwrap(),
        description: property::Description::new("Sunny, close to a park")
            .unwrap(),
        kind: property::Kind::Apartment,
        category: property::Category::Rent,
        price: property::Price::new(Decimal::from(price)).unwrap(),
        rent_period: Some(property::RentPeriod::Monthly),
        available_from: None,
        location: property::Location {
            city: property::City::new(city).unwrap(),
            area: property::Area::new("Clifton").unwrap(),
            address: None,
        },
        specifications: property::Specifications {
            bedrooms: Some(2),
            bathrooms: Some(1),
        },
        size: Some(property::Size {
            value: property::SizeValue::new(Decimal::from(950)).unwrap(),
            unit: property::SizeUnit::Sqft,
        }),
        features: property::Features {
            furnishing: Some(property::Furnishing::Unfurnished),
            condition: Some(property::Condition::Good),
        },
        status: None,
        contact: property::Contact::default(),
        images: vec![],
        is_featured: false,
    }
}

/// Lists a new [`Property`] out of the provided [`CreateProperty`].
pub async fn create(svc: &TestService, cmd: CreateProperty) -> Property {
    svc.execute(cmd).await.unwrap()
}

/// Returns an [`storage::Upload`] of a PNG image with the provided name.
pub fn png(name: &str) -> storage::Upload {
    storage::Upload {
        file_name: Some(name.to_owned()),
        format: property::ImageFormat::Png,
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

/// Parses a [`property::Status`] from the provided string.
pub fn status(s: &str) -> property::Status {
    property::Status::from_str(s).unwrap()
}

/// Checks whether the provided [`property::ImageUrl`] is stored.
pub async fn is_stored(svc: &TestService, url: &property::ImageUrl) -> bool {
    svc.storage().contains(url).await
}
