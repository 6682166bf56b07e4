mod support;

use std::collections::HashSet;

use rust_decimal::Decimal;
use service::{
    command::{
        create_property, delete_property, update_property,
        update_property_status, DeleteProperty, UpdateProperty,
        UpdatePropertyStatus,
    },
    domain::{property, user},
    query, read,
    read::property::list,
    Command as _,
};

use self::support::{
    apartment, create, is_stored, png, register, service, status,
};

fn selector(filter: list::Filter) -> list::Selector {
    list::Selector {
        arguments: list::Arguments::new(
            None,
            Some(list::MAX_LIMIT),
            list::DEFAULT_LIMIT,
            list::MAX_LIMIT,
        )
        .unwrap(),
        filter,
    }
}

async fn ids(
    svc: &support::TestService,
    filter: list::Filter,
) -> HashSet<property::Id> {
    svc.execute(query::properties::List::by(selector(filter)))
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.id)
        .collect()
}

#[tokio::test]
async fn owner_changes_status_and_stranger_is_refused() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let other = register(&svc, "other@example.com", user::Role::Owner).await;
    let p = create(&svc, apartment(owner.id, "Karachi", 50_000)).await;
    assert_eq!(p.status, property::Status::Available);
    assert_eq!(p.owner_id, owner.id);

    let err = svc
        .execute(UpdatePropertyStatus {
            id: p.id,
            by: other.id,
            role: other.role,
            status: property::Status::Rented,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        update_property_status::ExecutionError::NotAllowed(_),
    ));
    let stored = svc
        .execute(query::property::ById::by(p.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, property::Status::Available);

    let updated = svc
        .execute(UpdatePropertyStatus {
            id: p.id,
            by: owner.id,
            role: owner.role,
            status: property::Status::Rented,
        })
        .await
        .unwrap();
    assert_eq!(updated.status, property::Status::Rented);
    let stored = svc
        .execute(query::property::ById::by(p.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, property::Status::Rented);
    assert_eq!(stored.owner_id, owner.id);
}

#[tokio::test]
async fn admin_manages_any_property() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let p = create(&svc, apartment(owner.id, "Lahore", 30_000)).await;

    let admin = user::Id::new();
    let updated = svc
        .execute(UpdatePropertyStatus {
            id: p.id,
            by: admin,
            role: user::Role::Admin,
            status: property::Status::Inactive,
        })
        .await
        .unwrap();
    assert_eq!(updated.status, property::Status::Inactive);
}

#[tokio::test]
async fn every_status_is_persisted() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Agent).await;
    let p = create(&svc, apartment(owner.id, "Karachi", 50_000)).await;

    for raw in ["PENDING", "rented", "Sold", "inactive", "available"] {
        let status = status(raw);
        _ = svc
            .execute(UpdatePropertyStatus {
                id: p.id,
                by: owner.id,
                role: owner.role,
                status,
            })
            .await
            .unwrap();
        let stored = svc
            .execute(query::property::ById::by(p.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, status);
    }

    assert!("archived".parse::<property::Status>().is_err());
    let stored = svc
        .execute(query::property::ById::by(p.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, property::Status::Available);
}

#[tokio::test]
async fn unknown_property_status_change_fails() {
    let svc = service();
    let err = svc
        .execute(UpdatePropertyStatus {
            id: property::Id::new(),
            by: user::Id::new(),
            role: user::Role::Admin,
            status: property::Status::Sold,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        update_property_status::ExecutionError::PropertyNotExists(_),
    ));
}

#[tokio::test]
async fn single_filters_narrow_listings() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;

    let cheap = create(&svc, apartment(owner.id, "Karachi", 20_000)).await;
    let mut cmd = apartment(owner.id, "Lahore", 80_000);
    cmd.specifications.bedrooms = Some(4);
    cmd.kind = property::Kind::House;
    let house = create(&svc, cmd).await;
    let mut cmd = apartment(owner.id, "karachi", 120_000);
    cmd.category = property::Category::Sale;
    cmd.title = property::Title::new("Penthouse with a sea view").unwrap();
    let sale = create(&svc, cmd).await;
    assert_eq!(sale.rent_period, None);

    let all = ids(&svc, list::Filter::default()).await;
    assert_eq!(all.len(), 3);

    let filters = [
        list::Filter {
            city: property::City::new("KARACHI"),
            ..list::Filter::default()
        },
        list::Filter {
            kind: Some(property::Kind::House),
            ..list::Filter::default()
        },
        list::Filter {
            category: Some(property::Category::Sale),
            ..list::Filter::default()
        },
        list::Filter {
            min_price: property::Price::new(Decimal::from(50_000)),
            ..list::Filter::default()
        },
        list::Filter {
            max_price: property::Price::new(Decimal::from(20_000)),
            ..list::Filter::default()
        },
        list::Filter {
            bedrooms: Some(3),
            ..list::Filter::default()
        },
        list::Filter {
            search: list::Search::new("SEA VIEW"),
            ..list::Filter::default()
        },
        list::Filter {
            furnishing: Some(property::Furnishing::Furnished),
            ..list::Filter::default()
        },
    ];
    for filter in filters {
        let found = ids(&svc, filter.clone()).await;
        assert!(found.is_subset(&all), "{filter:?}");
    }

    let karachi = ids(
        &svc,
        list::Filter {
            city: property::City::new("karachi"),
            ..list::Filter::default()
        },
    )
    .await;
    assert_eq!(karachi, HashSet::from([cheap.id, sale.id]));

    let big = ids(
        &svc,
        list::Filter {
            bedrooms: Some(3),
            ..list::Filter::default()
        },
    )
    .await;
    assert_eq!(big, HashSet::from([house.id]));
}

#[tokio::test]
async fn listings_without_filters_include_every_status() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let available = create(&svc, apartment(owner.id, "Karachi", 20_000)).await;
    let mut all = HashSet::from([available.id]);
    for st in [
        property::Status::Pending,
        property::Status::Rented,
        property::Status::Sold,
        property::Status::Inactive,
    ] {
        let p = create(&svc, apartment(owner.id, "Karachi", 25_000)).await;
        _ = svc
            .execute(UpdatePropertyStatus {
                id: p.id,
                by: owner.id,
                role: owner.role,
                status: st,
            })
            .await
            .unwrap();
        _ = all.insert(p.id);
    }

    assert_eq!(ids(&svc, list::Filter::default()).await, all);
    assert_eq!(
        ids(
            &svc,
            list::Filter {
                status: Some(property::Status::Available),
                ..list::Filter::default()
            },
        )
        .await,
        HashSet::from([available.id]),
    );

    let selector = read::property::owned::Selector {
        arguments: read::property::owned::Arguments::new(None, None, 12, 100)
            .unwrap(),
        filter: owner.id,
    };
    let owned = svc
        .execute(query::properties::Owned::by(selector))
        .await
        .unwrap();
    assert_eq!(owned.total, 5);
}

#[tokio::test]
async fn listings_are_sorted_and_paginated() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    for price in [30_000, 10_000, 20_000] {
        _ = create(&svc, apartment(owner.id, "Karachi", price)).await;
    }

    let page = svc
        .execute(query::properties::List::by(list::Selector {
            arguments: list::Arguments::new(Some(1), Some(2), 12, 100).unwrap(),
            filter: list::Filter {
                sort: list::Sort::PriceAsc,
                ..list::Filter::default()
            },
        }))
        .await
        .unwrap();
    let prices = page
        .items
        .iter()
        .map(|p| p.price.amount())
        .collect::<Vec<_>>();
    assert_eq!(prices, [Decimal::from(10_000), Decimal::from(20_000)]);

    let info = page.info();
    assert_eq!(info.total, 3);
    assert_eq!(info.pages, 2);
    assert!(info.has_next_page);
    assert!(!info.has_previous_page);
}

#[tokio::test]
async fn featured_listings() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;

    let mut cmd = apartment(owner.id, "Karachi", 20_000);
    cmd.is_featured = true;
    let err = svc.execute(cmd).await.unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_property::ExecutionError::FeaturingNotAllowed(_),
    ));

    let p = create(&svc, apartment(owner.id, "Karachi", 20_000)).await;
    let admin = user::Id::new();
    let featured = svc
        .execute(UpdateProperty {
            is_featured: Some(true),
            ..update(p.id, admin, user::Role::Admin)
        })
        .await
        .unwrap();
    assert!(featured.is_featured);

    let list = svc
        .execute(query::properties::Featured::by(()))
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn plain_users_cannot_list_properties() {
    let svc = service();
    let buyer = register(&svc, "buyer@example.com", user::Role::User).await;
    let err = svc
        .execute(apartment(buyer.id, "Karachi", 20_000))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_property::ExecutionError::NotAllowed(_),
    ));
}

#[tokio::test]
async fn contact_defaults_to_owner() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let p = create(&svc, apartment(owner.id, "Karachi", 20_000)).await;

    assert_eq!(p.contact.email.as_ref(), Some(&owner.email));
    assert_eq!(p.contact.phone, owner.phone);
    assert_eq!(
        p.contact.name.as_ref().map(AsRef::as_ref),
        Some(owner.name.as_ref()),
    );
}

fn update(
    id: property::Id,
    by: user::Id,
    role: user::Role,
) -> UpdateProperty {
    UpdateProperty {
        id,
        by,
        role,
        title: None,
        description: None,
        kind: None,
        category: None,
        price: None,
        rent_period: None,
        available_from: None,
        location: None,
        specifications: None,
        size: None,
        features: None,
        status: None,
        contact: None,
        is_featured: None,
        images: update_property::ImagesUpdate::default(),
    }
}

#[tokio::test]
async fn update_merges_fields_and_keeps_owner() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let p = create(&svc, apartment(owner.id, "Karachi", 20_000)).await;

    let updated = svc
        .execute(UpdateProperty {
            price: property::Price::new(Decimal::from(22_000)),
            category: Some(property::Category::Sale),
            ..update(p.id, owner.id, owner.role)
        })
        .await
        .unwrap();
    assert_eq!(updated.price.amount(), Decimal::from(22_000));
    assert_eq!(updated.rent_period, None);
    assert_eq!(updated.title, p.title);
    assert_eq!(updated.location, p.location);
    assert_eq!(updated.owner_id, owner.id);
    assert!(updated.updated_at >= p.updated_at);

    let stranger = register(&svc, "x@example.com", user::Role::Agent).await;
    let err = svc
        .execute(update(p.id, stranger.id, stranger.role))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        update_property::ExecutionError::NotAllowed(_),
    ));
}

#[tokio::test]
async fn update_replaces_images() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let mut cmd = apartment(owner.id, "Karachi", 20_000);
    cmd.images = vec![png("front.png"), png("kitchen.png")];
    let p = create(&svc, cmd).await;
    assert_eq!(p.images.len(), 2);
    assert_eq!(
        p.images[0].caption.as_ref().map(AsRef::as_ref),
        Some("front.png"),
    );
    let (front, kitchen) = (p.images[0].clone(), p.images[1].clone());

    let updated = svc
        .execute(UpdateProperty {
            images: update_property::ImagesUpdate {
                existing: Some(vec![kitchen.url.clone()]),
                uploads: vec![png("garden.png")],
            },
            ..update(p.id, owner.id, owner.role)
        })
        .await
        .unwrap();
    assert_eq!(updated.images.len(), 2);
    assert_eq!(updated.images[0], kitchen);
    assert!(is_stored(&svc, &updated.images[1].url).await);
    assert!(!is_stored(&svc, &front.url).await);

    let err = svc
        .execute(UpdateProperty {
            images: update_property::ImagesUpdate {
                existing: Some(vec![front.url]),
                uploads: vec![],
            },
            ..update(p.id, owner.id, owner.role)
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        update_property::ExecutionError::UnknownImage(_),
    ));
}

#[tokio::test]
async fn refused_update_leaves_no_uploaded_images() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let stranger = register(&svc, "x@example.com", user::Role::Owner).await;
    let p = create(&svc, apartment(owner.id, "Karachi", 20_000)).await;

    let err = svc
        .execute(UpdateProperty {
            images: update_property::ImagesUpdate {
                existing: None,
                uploads: vec![png("garden.png")],
            },
            ..update(p.id, stranger.id, stranger.role)
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        update_property::ExecutionError::NotAllowed(_),
    ));
    assert!(svc.storage().is_empty().await);

    let err = svc
        .execute(UpdateProperty {
            images: update_property::ImagesUpdate {
                existing: None,
                uploads: (0..=property::Property::MAX_IMAGES)
                    .map(|i| png(&format!("{i}.png")))
                    .collect(),
            },
            ..update(p.id, owner.id, owner.role)
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        update_property::ExecutionError::TooManyImages(11),
    ));
    assert!(svc.storage().is_empty().await);
}

#[tokio::test]
async fn too_many_images_are_rejected() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let mut cmd = apartment(owner.id, "Karachi", 20_000);
    cmd.images = (0..=property::Property::MAX_IMAGES)
        .map(|i| png(&format!("{i}.png")))
        .collect();

    let err = svc.execute(cmd).await.unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_property::ExecutionError::TooManyImages(11),
    ));
    assert!(svc.storage().is_empty().await);
}

#[tokio::test]
async fn delete_removes_property_and_images() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let mut cmd = apartment(owner.id, "Karachi", 20_000);
    cmd.images = vec![png("front.png")];
    let p = create(&svc, cmd).await;

    let stranger = register(&svc, "x@example.com", user::Role::Owner).await;
    let err = svc
        .execute(DeleteProperty {
            id: p.id,
            by: stranger.id,
            role: stranger.role,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        delete_property::ExecutionError::NotAllowed(_),
    ));

    _ = svc
        .execute(DeleteProperty {
            id: p.id,
            by: owner.id,
            role: owner.role,
        })
        .await
        .unwrap();
    assert!(svc
        .execute(query::property::ById::by(p.id))
        .await
        .unwrap()
        .is_none());
    assert!(svc.storage().is_empty().await);
}
