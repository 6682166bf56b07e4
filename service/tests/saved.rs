mod support;

use service::{
    command::{save_property, DeleteProperty, SaveProperty, UnsaveProperty},
    domain::{property, user},
    query, read, Command as _,
};

use self::support::{apartment, create, register, service};

fn is_saved(saved: &read::property::saved::List, id: property::Id) -> bool {
    saved.iter().any(|p| p.id == id)
}

#[tokio::test]
async fn saving_is_idempotent() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let buyer = register(&svc, "buyer@example.com", user::Role::User).await;
    let p = create(&svc, apartment(owner.id, "Karachi", 20_000)).await;

    let save = SaveProperty {
        by: buyer.id,
        property_id: p.id,
    };
    svc.execute(save).await.unwrap();
    svc.execute(save).await.unwrap();

    let saved = svc
        .execute(query::properties::Saved::by(buyer.id))
        .await
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert!(is_saved(&saved, p.id));

    let unsave = UnsaveProperty {
        by: buyer.id,
        property_id: p.id,
    };
    svc.execute(unsave).await.unwrap();
    svc.execute(unsave).await.unwrap();

    let saved = svc
        .execute(query::properties::Saved::by(buyer.id))
        .await
        .unwrap();
    assert!(!is_saved(&saved, p.id));
}

#[tokio::test]
async fn saving_unknown_property_fails() {
    let svc = service();
    let buyer = register(&svc, "buyer@example.com", user::Role::User).await;

    let err = svc
        .execute(SaveProperty {
            by: buyer.id,
            property_id: property::Id::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        save_property::ExecutionError::PropertyNotExists(_),
    ));
}

#[tokio::test]
async fn deleting_property_drops_associations() {
    let svc = service();
    let owner = register(&svc, "owner@example.com", user::Role::Owner).await;
    let buyer = register(&svc, "buyer@example.com", user::Role::User).await;
    let p = create(&svc, apartment(owner.id, "Karachi", 20_000)).await;
    let kept = create(&svc, apartment(owner.id, "Lahore", 30_000)).await;

    for id in [p.id, kept.id] {
        svc.execute(SaveProperty {
            by: buyer.id,
            property_id: id,
        })
        .await
        .unwrap();
    }
    _ = svc
        .execute(DeleteProperty {
            id: p.id,
            by: owner.id,
            role: owner.role,
        })
        .await
        .unwrap();

    let saved = svc
        .execute(query::properties::Saved::by(buyer.id))
        .await
        .unwrap();
    assert!(!is_saved(&saved, p.id));
    assert!(is_saved(&saved, kept.id));
}
