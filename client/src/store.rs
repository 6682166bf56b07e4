//! [`Store`] of the client state.

use std::{
    future::Future,
    mem,
    sync::{Mutex, MutexGuard, PoisonError},
};

use service::domain::property;

use crate::{
    api::{Api, Http},
    cache::{Cache, Commit},
    confirm::Confirm,
    model::{Page, Property, PropertyInput},
    Config, Error, FiltersUpdate, Notification, SearchFilters,
};

/// Prompt of the [`Store::delete_property()`] confirmation.
pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this property? This cannot be undone.";

/// Key of the queries having no parameters.
const ALL: &str = "*";

/// Owned state of a browsing session: [`SearchFilters`], cached query
/// results and pending [`Notification`]s.
///
/// All the operations take `&self`, so reads may overlap. A later-issued
/// read of a query always supersedes an earlier one.
#[derive(Debug)]
pub struct Store<A> {
    /// [`Api`] transport to the server.
    api: A,

    /// Mutable [`State`].
    state: Mutex<State>,
}

/// Mutable state of a [`Store`].
#[derive(Debug)]
struct State {
    /// Bearer token of the current user.
    token: Option<String>,

    /// Current [`SearchFilters`].
    filters: SearchFilters,

    /// [`Cache`] of [`Query::List`].
    lists: Cache<Page>,

    /// [`Cache`] of [`Query::Featured`].
    featured: Cache<Vec<Property>>,

    /// [`Cache`] of [`Query::Property`].
    properties: Cache<Property>,

    /// [`Cache`] of [`Query::My`].
    my: Cache<Page>,

    /// [`Cache`] of [`Query::Saved`].
    saved: Cache<Vec<Property>>,

    /// Pending [`Notification`]s.
    notifications: Vec<Notification>,
}

impl State {
    /// Marks the results of the provided [`Query`]s as stale.
    fn invalidate(&mut self, queries: &[Query]) {
        for q in queries {
            tracing::debug!(query = ?q, "cache invalidated");
            match q {
                Query::List => self.lists.invalidate(),
                Query::Featured => self.featured.invalidate(),
                Query::Property => self.properties.invalidate(),
                Query::My => self.my.invalidate(),
                Query::Saved => self.saved.invalidate(),
            }
        }
    }

    /// Drops the results of the queries scoped to the current user.
    fn forget_user(&mut self) {
        self.my.clear();
        self.saved.clear();
    }
}

/// Cached query of a [`Store`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Query {
    /// Listings matching the current [`SearchFilters`].
    List,

    /// Featured listings.
    Featured,

    /// Single [`Property`].
    Property,

    /// Listings of the current user.
    My,

    /// Listings saved by the current user.
    Saved,
}

/// [`Query`]s affected by a change of a [`Property`].
const LISTINGS: &[Query] =
    &[Query::List, Query::Featured, Query::Property, Query::My];

/// [`Query`]s affected by a deletion of a [`Property`].
const LISTINGS_AND_SAVED: &[Query] = &[
    Query::List,
    Query::Featured,
    Query::Property,
    Query::My,
    Query::Saved,
];

/// Failed read of a [`Store`].
#[derive(Clone, Debug)]
pub struct Failed<V> {
    /// [`Error`] the read failed with.
    pub error: Error,

    /// Last successfully read value, possibly a stale one.
    pub cached: Option<V>,
}

/// Outcome of a [`Store::delete_property()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Deletion {
    /// [`Property`] is deleted.
    Deleted,

    /// Deletion is declined by the user, so nothing was requested.
    Declined,
}

impl Store<Http> {
    /// Creates a new [`Store`] talking to the server over HTTP.
    #[must_use]
    pub fn http(config: &Config) -> Self {
        Self::new(Http::new(config.base_url.clone()), config)
    }
}

impl<A: Api> Store<A> {
    /// Creates a new [`Store`] with the provided [`Api`] transport.
    #[must_use]
    pub fn new(api: A, config: &Config) -> Self {
        let w = config.freshness;
        Self {
            api,
            state: Mutex::new(State {
                token: None,
                filters: SearchFilters::default(),
                lists: Cache::new(w.list),
                featured: Cache::new(w.featured),
                properties: Cache::new(w.property),
                my: Cache::new(w.my),
                saved: Cache::new(w.saved),
                notifications: Vec::new(),
            }),
        }
    }

    /// Returns the [`Api`] transport of this [`Store`].
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Locks the [`State`] of this [`Store`].
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current [`SearchFilters`].
    #[must_use]
    pub fn filters(&self) -> SearchFilters {
        self.state().filters.clone()
    }

    /// Merges the provided [`FiltersUpdate`] into the current
    /// [`SearchFilters`], returning to the first page.
    pub fn update_filters(&self, update: FiltersUpdate) {
        self.state().filters.apply(update);
    }

    /// Switches the current [`SearchFilters`] to the provided `page`,
    /// leaving all the criteria intact.
    pub fn set_page(&self, page: u32) {
        self.state().filters.page = page.max(1);
    }

    /// Restores the default [`SearchFilters`].
    pub fn reset_filters(&self) {
        self.state().filters = SearchFilters::default();
    }

    /// Sets the bearer `token` of the current user.
    ///
    /// Cached results of another user are dropped.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        let mut state = self.state();
        if state.token.as_ref() != Some(&token) {
            state.forget_user();
        }
        state.token = Some(token);
    }

    /// Clears the bearer token, dropping the cached results of the user.
    pub fn clear_token(&self) {
        let mut state = self.state();
        state.token = None;
        state.forget_user();
    }

    /// Takes all the pending [`Notification`]s.
    pub fn take_notifications(&self) -> Vec<Notification> {
        mem::take(&mut self.state().notifications)
    }

    /// Checks whether the [`Property`] is in the loaded saved listings.
    ///
    /// Always `false` until the saved listings are loaded.
    #[must_use]
    pub fn is_property_saved(&self, id: property::Id) -> bool {
        self.state()
            .saved
            .get(ALL)
            .is_some_and(|e| e.value.iter().any(|p| p.id == id))
    }

    /// Reads a [`Page`] of the listings matching the current
    /// [`SearchFilters`].
    ///
    /// # Errors
    ///
    /// If the request fails, along with the last read [`Page`] for the same
    /// [`SearchFilters`], if any.
    pub async fn list_properties(&self) -> Result<Page, Failed<Page>> {
        let filters = self.filters();
        self.read(
            Query::List,
            |s| &mut s.lists,
            filters.key(),
            |token| async move {
                self.api.list(token.as_deref(), &filters).await
            },
        )
        .await
    }

    /// Reads the featured listings.
    ///
    /// # Errors
    ///
    /// If the request fails, along with the last read listings, if any.
    pub async fn featured_properties(
        &self,
    ) -> Result<Vec<Property>, Failed<Vec<Property>>> {
        self.read(
            Query::Featured,
            |s| &mut s.featured,
            ALL.to_owned(),
            |token| async move { self.api.featured(token.as_deref()).await },
        )
        .await
    }

    /// Reads the provided `page` of the listings of the current user.
    ///
    /// # Errors
    ///
    /// If the request fails, along with the last read [`Page`], if any.
    pub async fn my_properties(&self, page: u32) -> Result<Page, Failed<Page>> {
        let page = page.max(1);
        self.read(
            Query::My,
            |s| &mut s.my,
            format!("page={page}"),
            |token| async move { self.api.my(token.as_deref(), page).await },
        )
        .await
    }

    /// Reads the listings saved by the current user.
    ///
    /// # Errors
    ///
    /// If the request fails, along with the last read listings, if any.
    pub async fn saved_properties(
        &self,
    ) -> Result<Vec<Property>, Failed<Vec<Property>>> {
        self.read(
            Query::Saved,
            |s| &mut s.saved,
            ALL.to_owned(),
            |token| async move { self.api.saved(token.as_deref()).await },
        )
        .await
    }

    /// Reads a single [`Property`].
    ///
    /// # Errors
    ///
    /// If the request fails, along with the last read [`Property`], if any.
    pub async fn property(
        &self,
        id: property::Id,
    ) -> Result<Property, Failed<Property>> {
        self.read(
            Query::Property,
            |s| &mut s.properties,
            id.to_string(),
            |token| async move {
                self.api.property(token.as_deref(), id).await
            },
        )
        .await
    }

    /// Saves the [`Property`] for the current user.
    ///
    /// # Errors
    ///
    /// If the request fails.
    pub async fn save_property(&self, id: property::Id) -> Result<(), Error> {
        self.mutate(
            &[Query::Saved],
            "Property saved",
            |token| async move { self.api.save(token.as_deref(), id).await },
        )
        .await
    }

    /// Removes the [`Property`] from the saved ones of the current user.
    ///
    /// # Errors
    ///
    /// If the request fails.
    pub async fn remove_saved_property(
        &self,
        id: property::Id,
    ) -> Result<(), Error> {
        self.mutate(
            &[Query::Saved],
            "Property removed from saved",
            |token| async move { self.api.unsave(token.as_deref(), id).await },
        )
        .await
    }

    /// Lists a new [`Property`].
    ///
    /// # Errors
    ///
    /// If the request fails.
    pub async fn create_property(
        &self,
        input: PropertyInput,
    ) -> Result<Property, Error> {
        self.mutate(LISTINGS, "Property listed", |token| async move {
            self.api.create(token.as_deref(), input).await
        })
        .await
    }

    /// Updates the [`Property`].
    ///
    /// # Errors
    ///
    /// If the request fails.
    pub async fn update_property(
        &self,
        id: property::Id,
        input: PropertyInput,
    ) -> Result<Property, Error> {
        self.mutate(LISTINGS, "Property updated", |token| async move {
            self.api.update(token.as_deref(), id, input).await
        })
        .await
    }

    /// Changes the status of the [`Property`].
    ///
    /// # Errors
    ///
    /// If the request fails.
    pub async fn update_property_status(
        &self,
        id: property::Id,
        status: property::Status,
    ) -> Result<Property, Error> {
        self.mutate(LISTINGS, "Status updated", |token| async move {
            self.api.update_status(token.as_deref(), id, status).await
        })
        .await
    }

    /// Deletes the [`Property`], if the user confirms it.
    ///
    /// # Errors
    ///
    /// If the request fails.
    pub async fn delete_property(
        &self,
        id: property::Id,
        confirm: &mut impl Confirm,
    ) -> Result<Deletion, Error> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(Deletion::Declined);
        }
        self.mutate(LISTINGS_AND_SAVED, "Property deleted", |token| async move {
            self.api.delete(token.as_deref(), id).await
        })
        .await
        .map(|()| Deletion::Deleted)
    }

    /// Reads a value of the provided [`Query`] under the provided `key`,
    /// serving it from the selected [`Cache`] while it's fresh.
    async fn read<V, F, Fut>(
        &self,
        query: Query,
        cache: fn(&mut State) -> &mut Cache<V>,
        key: String,
        fetch: F,
    ) -> Result<V, Failed<V>>
    where
        V: Clone,
        F: FnOnce(Option<String>) -> Fut,
        Fut: Future<Output = Result<V, Error>>,
    {
        let (ticket, token) = {
            let mut state = self.state();
            if let Some(v) = cache(&mut state).fresh(&key) {
                tracing::debug!(?query, %key, "cache hit");
                return Ok(v.clone());
            }
            let ticket = cache(&mut state).issue(key.clone());
            (ticket, state.token.clone())
        };

        let res = fetch(token).await;

        let mut state = self.state();
        let cache = cache(&mut state);
        match res {
            Ok(v) => {
                if cache.commit(ticket, v.clone()) == Commit::Superseded {
                    tracing::debug!(?query, %key, "response superseded");
                }
                Ok(v)
            }
            Err(error) => Err(Failed {
                error,
                cached: cache.get(&key).map(|e| e.value.clone()),
            }),
        }
    }

    /// Performs a mutation, invalidating the provided [`Query`]s on
    /// success.
    ///
    /// Either the `success` message, or the [`Error::user_message()`] is
    /// pushed as a [`Notification`].
    async fn mutate<T, F, Fut>(
        &self,
        invalidates: &[Query],
        success: &str,
        request: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(Option<String>) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let token = self.state().token.clone();
        let res = request(token).await;

        let mut state = self.state();
        match &res {
            Ok(_) => {
                state.invalidate(invalidates);
                state.notifications.push(Notification::success(success));
            }
            Err(e) => {
                tracing::debug!(error = %e, "mutation failed");
                state
                    .notifications
                    .push(Notification::error(e.user_message()));
            }
        }
        res
    }
}
