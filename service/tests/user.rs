mod support;

use service::{
    command::{
        create_user, create_user_session, AuthorizeUserSession, CreateUser,
        CreateUserSession,
    },
    domain::user,
    query, Command as _,
};

use self::support::{password, register, service};

#[tokio::test]
async fn registers_and_logs_in() {
    let svc = service();
    let created = register(&svc, "Owner@Example.com", user::Role::Owner).await;
    assert_eq!(AsRef::<str>::as_ref(&created.email), "owner@example.com");

    let fetched = svc
        .execute(query::user::ById::by(created.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.email, created.email);

    let out = svc
        .execute(CreateUserSession::ByCredentials {
            email: user::Email::new("OWNER@example.com").unwrap(),
            password: password("secret-password"),
        })
        .await
        .unwrap();
    assert_eq!(out.user.id, created.id);

    let session = svc
        .execute(AuthorizeUserSession { token: out.token })
        .await
        .unwrap();
    assert_eq!(session.user_id, created.id);
    assert_eq!(session.role, user::Role::Owner);
    assert_eq!(
        session.expires_at.unix_timestamp(),
        out.expires_at.unix_timestamp(),
    );
}

#[tokio::test]
async fn wrong_credentials_are_rejected() {
    let svc = service();
    _ = register(&svc, "owner@example.com", user::Role::Owner).await;

    for (email, pass) in [
        ("owner@example.com", "wrong-password"),
        ("nobody@example.com", "secret-password"),
    ] {
        let err = svc
            .execute(CreateUserSession::ByCredentials {
                email: user::Email::new(email).unwrap(),
                password: password(pass),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            create_user_session::ExecutionError::WrongCredentials,
        ));
    }
}

#[tokio::test]
async fn email_is_unique() {
    let svc = service();
    _ = register(&svc, "owner@example.com", user::Role::Owner).await;

    let err = svc
        .execute(CreateUser {
            name: user::Name::new("Another").unwrap(),
            email: user::Email::new("OWNER@example.com").unwrap(),
            password: password("another-password"),
            phone: None,
            role: user::Role::User,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_user::ExecutionError::EmailOccupied(_),
    ));
}

#[tokio::test]
async fn admin_cannot_be_self_assigned() {
    let svc = service();
    let err = svc
        .execute(CreateUser {
            name: user::Name::new("Mallory").unwrap(),
            email: user::Email::new("mallory@example.com").unwrap(),
            password: password("mallory-password"),
            phone: None,
            role: user::Role::Admin,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_user::ExecutionError::RoleNotAssignable(user::Role::Admin),
    ));
}

#[tokio::test]
async fn foreign_tokens_are_rejected() {
    let svc = service();
    let created = register(&svc, "owner@example.com", user::Role::Owner).await;

    let token = svc
        .execute(CreateUserSession::ByUserId(created.id))
        .await
        .unwrap()
        .token;
    let other = service::Service::new(
        service::Config::from_secret(b"another-secret"),
        service::infra::database::Memory::new(),
        service::infra::storage::Memory::default(),
    );
    assert!(other
        .execute(AuthorizeUserSession { token })
        .await
        .is_err());
}
