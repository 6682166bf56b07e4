use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use client::{
    confirm::Always,
    model::{
        Contact, Features, Location, Page, Pagination, Property,
        PropertyInput, Specifications,
    },
    notify::Level,
    Api, Config, Deletion, Error, FiltersUpdate, SearchFilters, Store,
};
use common::DateTime;
use rust_decimal::Decimal;
use service::domain::{property, user};
use tokio::time;

#[derive(Clone, Debug, Eq, PartialEq)]
struct Call {
    name: &'static str,
    token: Option<String>,
}

#[derive(Debug, Default)]
struct Fake {
    calls: Mutex<Vec<Call>>,
    delays: Mutex<VecDeque<Duration>>,
    failure: Mutex<Option<Error>>,
    saved: Mutex<Vec<property::Id>>,
}

impl Fake {
    fn calls(&self, name: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.name == name).count()
    }

    fn delay(&self, delays: impl IntoIterator<Item = Duration>) {
        lock(&self.delays).extend(delays);
    }

    fn fail(&self, error: Option<Error>) {
        *lock(&self.failure) = error;
    }

    /// Records the call, returning its number among the calls of the same
    /// name.
    async fn call(
        &self,
        name: &'static str,
        token: Option<&str>,
    ) -> Result<usize, Error> {
        let (n, delay, failure) = {
            let mut calls = lock(&self.calls);
            calls.push(Call {
                name,
                token: token.map(ToOwned::to_owned),
            });
            let n = calls.iter().filter(|c| c.name == name).count();
            let delay = lock(&self.delays).pop_front();
            (n, delay, lock(&self.failure).clone())
        };
        if let Some(d) = delay {
            time::sleep(d).await;
        }
        failure.map_or(Ok(n), Err)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn listing(id: property::Id, title: &str) -> Property {
    Property {
        id,
        title: title.to_owned(),
        description: "Bright and quiet".to_owned(),
        property_type: property::Kind::Apartment,
        category: property::Category::Rent,
        price: Decimal::from(50_000),
        rent_period: Some(property::RentPeriod::Monthly),
        available_from: None,
        location: Location {
            city: "Karachi".to_owned(),
            area: "Clifton".to_owned(),
            address: None,
        },
        specifications: Specifications::default(),
        size: None,
        features: Features::default(),
        status: property::Status::Available,
        owner_id: user::Id::new(),
        contact: Contact::default(),
        images: vec![],
        is_featured: false,
        created_at: DateTime::now(),
        updated_at: DateTime::now(),
    }
}

/// [`Page`] whose total is the number of the call it was returned by.
fn page(n: usize, page: u32) -> Page {
    Page {
        properties: vec![listing(property::Id::new(), "Flat")],
        pagination: Pagination {
            page,
            limit: 12,
            total: n as u64,
            pages: 1,
            has_next: false,
            has_prev: page > 1,
        },
    }
}

impl Api for Fake {
    async fn list(
        &self,
        token: Option<&str>,
        filters: &SearchFilters,
    ) -> Result<Page, Error> {
        let n = self.call("list", token).await?;
        Ok(page(n, filters.page))
    }

    async fn featured(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<Property>, Error> {
        _ = self.call("featured", token).await?;
        Ok(vec![listing(property::Id::new(), "Featured")])
    }

    async fn my(&self, token: Option<&str>, p: u32) -> Result<Page, Error> {
        let n = self.call("my", token).await?;
        Ok(page(n, p))
    }

    async fn saved(&self, token: Option<&str>) -> Result<Vec<Property>, Error> {
        _ = self.call("saved", token).await?;
        Ok(lock(&self.saved)
            .iter()
            .map(|id| listing(*id, "Saved"))
            .collect())
    }

    async fn property(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> Result<Property, Error> {
        _ = self.call("property", token).await?;
        Ok(listing(id, "Single"))
    }

    async fn save(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> Result<(), Error> {
        _ = self.call("save", token).await?;
        lock(&self.saved).push(id);
        Ok(())
    }

    async fn unsave(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> Result<(), Error> {
        _ = self.call("unsave", token).await?;
        lock(&self.saved).retain(|s| *s != id);
        Ok(())
    }

    async fn create(
        &self,
        token: Option<&str>,
        input: PropertyInput,
    ) -> Result<Property, Error> {
        _ = self.call("create", token).await?;
        let title = input.title.unwrap_or_default();
        Ok(listing(property::Id::new(), &title))
    }

    async fn update(
        &self,
        token: Option<&str>,
        id: property::Id,
        input: PropertyInput,
    ) -> Result<Property, Error> {
        _ = self.call("update", token).await?;
        Ok(listing(id, &input.title.unwrap_or_default()))
    }

    async fn update_status(
        &self,
        token: Option<&str>,
        id: property::Id,
        status: property::Status,
    ) -> Result<Property, Error> {
        _ = self.call("update_status", token).await?;
        Ok(Property {
            status,
            ..listing(id, "Updated")
        })
    }

    async fn delete(
        &self,
        token: Option<&str>,
        id: property::Id,
    ) -> Result<(), Error> {
        _ = self.call("delete", token).await?;
        lock(&self.saved).retain(|s| *s != id);
        Ok(())
    }
}

fn store() -> Store<Fake> {
    Store::new(Fake::default(), &Config::default())
}

const MINUTE: Duration = Duration::from_secs(60);

#[tokio::test(start_paused = true)]
async fn serves_fresh_listings_from_cache() {
    let store = store();

    _ = store.list_properties().await.unwrap();
    time::advance(4 * MINUTE).await;
    _ = store.list_properties().await.unwrap();
    assert_eq!(store.api().calls("list"), 1);

    time::advance(MINUTE).await;
    _ = store.list_properties().await.unwrap();
    assert_eq!(store.api().calls("list"), 2);
}

#[tokio::test(start_paused = true)]
async fn featured_listings_stay_fresh_longer() {
    let store = store();

    _ = store.featured_properties().await.unwrap();
    time::advance(9 * MINUTE).await;
    _ = store.featured_properties().await.unwrap();
    assert_eq!(store.api().calls("featured"), 1);

    time::advance(MINUTE).await;
    _ = store.featured_properties().await.unwrap();
    assert_eq!(store.api().calls("featured"), 2);
}

#[tokio::test(start_paused = true)]
async fn different_filters_are_cached_separately() {
    let store = store();

    _ = store.list_properties().await.unwrap();
    store.update_filters(FiltersUpdate {
        city: "Lahore".to_owned().into(),
        ..FiltersUpdate::default()
    });
    _ = store.list_properties().await.unwrap();
    assert_eq!(store.api().calls("list"), 2);

    store.reset_filters();
    _ = store.list_properties().await.unwrap();
    assert_eq!(store.api().calls("list"), 2);
}

#[tokio::test(start_paused = true)]
async fn filter_updates_accumulate_on_first_page() {
    let store = store();

    store.set_page(3);
    store.update_filters(FiltersUpdate {
        city: "Islamabad".to_owned().into(),
        ..FiltersUpdate::default()
    });
    store.set_page(2);
    store.update_filters(FiltersUpdate {
        bedrooms: 2.into(),
        ..FiltersUpdate::default()
    });

    let f = store.filters();
    assert_eq!(f.city.as_deref(), Some("Islamabad"));
    assert_eq!(f.bedrooms, Some(2));
    assert_eq!(f.page, 1);

    store.set_page(2);
    let page = store.list_properties().await.unwrap();
    assert_eq!(page.pagination.page, 2);
    assert_eq!(store.filters().city.as_deref(), Some("Islamabad"));
}

#[tokio::test(start_paused = true)]
async fn later_issued_read_wins() {
    let store = store();
    store
        .api()
        .delay([Duration::from_millis(500), Duration::from_millis(10)]);

    let (first, second) =
        tokio::join!(store.list_properties(), store.list_properties());
    assert_eq!(first.unwrap().pagination.total, 1);
    assert_eq!(second.unwrap().pagination.total, 2);

    let cached = store.list_properties().await.unwrap();
    assert_eq!(cached.pagination.total, 2);
    assert_eq!(store.api().calls("list"), 2);
}

#[tokio::test(start_paused = true)]
async fn mutation_invalidates_listings() {
    let store = store();
    let id = property::Id::new();

    _ = store.list_properties().await.unwrap();
    _ = store.featured_properties().await.unwrap();
    _ = store.property(id).await.unwrap();
    _ = store.my_properties(1).await.unwrap();

    let updated = store
        .update_property_status(id, property::Status::Rented)
        .await
        .unwrap();
    assert_eq!(updated.status, property::Status::Rented);

    _ = store.list_properties().await.unwrap();
    _ = store.featured_properties().await.unwrap();
    _ = store.property(id).await.unwrap();
    _ = store.my_properties(1).await.unwrap();
    for name in ["list", "featured", "property", "my"] {
        assert_eq!(store.api().calls(name), 2, "{name} is not refetched");
    }

    let notes = store.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, Level::Success);
    assert!(store.take_notifications().is_empty());
}

#[tokio::test(start_paused = true)]
async fn read_in_flight_during_mutation_is_stored_stale() {
    let store = store();
    let id = property::Id::new();
    store.api().delay([Duration::from_millis(500)]);

    let (read, mutation) = tokio::join!(store.list_properties(), async {
        time::sleep(Duration::from_millis(100)).await;
        store.create_property(PropertyInput::default()).await
    });
    _ = read.unwrap();
    _ = mutation.unwrap();

    _ = store.list_properties().await.unwrap();
    assert_eq!(store.api().calls("list"), 2);

    _ = store.update_property(id, PropertyInput::default()).await.unwrap();
    _ = store.list_properties().await.unwrap();
    assert_eq!(store.api().calls("list"), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_read_keeps_cached_value() {
    let store = store();

    let page = store.list_properties().await.unwrap();
    time::advance(6 * MINUTE).await;
    store.api().fail(Some(Error::TransientNetwork("reset".into())));

    let failed = store.list_properties().await.unwrap_err();
    assert_eq!(failed.error, Error::TransientNetwork("reset".into()));
    assert_eq!(failed.cached, Some(page));

    let failed = store.featured_properties().await.unwrap_err();
    assert!(failed.cached.is_none());
}

#[tokio::test(start_paused = true)]
async fn save_and_unsave() {
    let store = store();
    let id = property::Id::new();

    assert!(!store.is_property_saved(id));
    store.save_property(id).await.unwrap();
    assert!(!store.is_property_saved(id), "saved listings are not loaded");

    _ = store.saved_properties().await.unwrap();
    assert!(store.is_property_saved(id));

    store.remove_saved_property(id).await.unwrap();
    _ = store.saved_properties().await.unwrap();
    assert!(!store.is_property_saved(id));
    assert_eq!(store.api().calls("saved"), 2);

    let notes = store.take_notifications();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.level == Level::Success));
}

#[tokio::test(start_paused = true)]
async fn failed_mutation_notifies_with_server_message() {
    let store = store();
    let id = property::Id::new();

    store.api().fail(Some(Error::NotFound(Some(
        "`Property` with the provided ID doesn't exist".into(),
    ))));
    let err = store.save_property(id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    store.api().fail(Some(Error::Internal(None)));
    _ = store.save_property(id).await.unwrap_err();

    let notes = store.take_notifications();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.level == Level::Error));
    assert_eq!(
        notes[0].message,
        "`Property` with the provided ID doesn't exist",
    );
    assert_eq!(notes[1].message, Error::GENERIC_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn declined_deletion_sends_nothing() {
    let store = store();
    let id = property::Id::new();

    let mut prompts = vec![];
    let outcome = store
        .delete_property(id, &mut |p: &str| {
            prompts.push(p.to_owned());
            false
        })
        .await
        .unwrap();

    assert_eq!(outcome, Deletion::Declined);
    assert_eq!(prompts.len(), 1);
    assert_eq!(store.api().calls("delete"), 0);
    assert!(store.take_notifications().is_empty());
}

#[tokio::test(start_paused = true)]
async fn confirmed_deletion_invalidates_saved() {
    let store = store();
    let id = property::Id::new();

    store.save_property(id).await.unwrap();
    _ = store.saved_properties().await.unwrap();
    assert!(store.is_property_saved(id));

    let outcome = store.delete_property(id, &mut Always(true)).await;
    assert_eq!(outcome, Ok(Deletion::Deleted));

    _ = store.saved_properties().await.unwrap();
    assert!(!store.is_property_saved(id));
    assert_eq!(store.api().calls("saved"), 2);
}

#[tokio::test(start_paused = true)]
async fn token_is_sent_and_dropped_with_user_caches() {
    let store = store();
    let id = property::Id::new();
    store.set_token("secret");

    store.save_property(id).await.unwrap();
    _ = store.saved_properties().await.unwrap();
    _ = store.my_properties(1).await.unwrap();
    assert!(store.is_property_saved(id));
    assert!(lock(&store.api().calls)
        .iter()
        .all(|c| c.token.as_deref() == Some("secret")));

    store.clear_token();
    assert!(!store.is_property_saved(id));

    _ = store.my_properties(1).await;
    assert_eq!(store.api().calls("my"), 2);
    let last = lock(&store.api().calls).last().cloned().unwrap();
    assert_eq!(last.token, None);
}
