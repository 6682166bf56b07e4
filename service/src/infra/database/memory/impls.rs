//! [`Database`] implementations of a [`Memory`] store.

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property, SavedProperty, User},
    infra::{database, Database},
    read,
};

use super::{Access, Documents, Error, Memory, NonTx, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::begin(&self.0).await))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await.map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Select<By<Option<User>, user::Id>>> for Memory<T> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|docs| docs.users.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<'l, T: Access> Database<Select<By<Option<User>, &'l user::Email>>>
    for Memory<T>
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        self.read(|docs| {
            docs.users.values().find(|u| &u.email == email).cloned()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Insert<User>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Update<User>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|docs| {
            if docs
                .users
                .values()
                .any(|u| u.id != user.id && u.email == user.email)
            {
                return Err(Error::UniqueViolation(
                    database::constraint::USERS_EMAIL,
                ));
            }
            drop(docs.users.insert(user.id, user));
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Select<By<Option<Property>, property::Id>>>
    for Memory<T>
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|docs| docs.properties.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Insert<Property>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Update<Property>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|docs| {
            drop(docs.properties.insert(property.id, property));
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Lock<By<Property, property::Id>>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(_): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transaction already holds the whole store exclusively.
        Ok(())
    }
}

impl<T: Access> Database<Delete<By<Property, property::Id>>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|docs| {
            drop(docs.properties.remove(&id));
            docs.saved.retain(|(_, property_id), _| *property_id != id);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<T: Access>
    Database<
        Select<By<read::property::list::Page, read::property::list::Selector>>,
    > for Memory<T>
{
    type Ok = read::property::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::list::Selector { arguments, filter } =
            by.into_inner();

        self.read(|docs| {
            let mut found = docs
                .properties
                .values()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect::<Vec<_>>();
            found.sort_by(|a, b| filter.sort.compare(a, b));
            read::property::list::Page::slice(arguments, found)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<T: Access>
    Database<
        Select<
            By<read::property::owned::Page, read::property::owned::Selector>,
        >,
    > for Memory<T>
{
    type Ok = read::property::owned::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::owned::Page, read::property::owned::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::owned::Selector {
            arguments,
            filter: owner_id,
        } = by.into_inner();

        self.read(|docs| {
            let mut owned = docs
                .properties
                .values()
                .filter(|p| p.owner_id == owner_id)
                .cloned()
                .collect::<Vec<_>>();
            owned.sort_by(newest_first);
            read::property::owned::Page::slice(arguments, owned)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Select<By<read::property::featured::List, ()>>>
    for Memory<T>
{
    type Ok = read::property::featured::List;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::property::featured::List, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|docs| {
            let mut featured = docs
                .properties
                .values()
                .filter(|p| {
                    p.is_featured && p.status == property::Status::Available
                })
                .cloned()
                .collect::<Vec<_>>();
            featured.sort_by(newest_first);
            featured.truncate(read::property::featured::LIMIT);
            featured.into()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Select<By<read::property::saved::List, user::Id>>>
    for Memory<T>
{
    type Ok = read::property::saved::List;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::property::saved::List, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        self.read(|docs| saved_by(docs, user_id).into())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Access> Database<Insert<SavedProperty>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(saved): Insert<SavedProperty>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|docs| {
            _ = docs
                .saved
                .entry((saved.user_id, saved.property_id))
                .or_insert(saved);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<T: Access>
    Database<Delete<By<SavedProperty, (user::Id, property::Id)>>>
    for Memory<T>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<SavedProperty, (user::Id, property::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        self.write(|docs| {
            drop(docs.saved.remove(&key));
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

/// Compares [`Property`] listings placing the most recently created first.
fn newest_first(a: &Property, b: &Property) -> std::cmp::Ordering {
    read::property::list::Sort::Newest.compare(a, b)
}

/// Collects [`Property`] listings saved by the provided [`User`], most
/// recently saved first.
fn saved_by(docs: &Documents, user_id: user::Id) -> Vec<Property> {
    let mut saved = docs
        .saved
        .values()
        .filter(|s| s.user_id == user_id)
        .collect::<Vec<_>>();
    saved.sort_by(|a, b| {
        b.saved_at
            .cmp(&a.saved_at)
            .then_with(|| a.property_id.cmp(&b.property_id))
    });
    saved
        .into_iter()
        .filter_map(|s| docs.properties.get(&s.property_id).cloned())
        .collect()
}
