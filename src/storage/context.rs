//! Per-request persistence context
//!
//! A `DbContext` wraps exclusive access to the store for one unit of work.
//! Writes staged through `add`/`update`/`remove` run inside one transaction
//! that `save_changes` commits; a context dropped with staged writes rolls
//! them back.

use std::marker::PhantomData;
use std::ops::DerefMut;
use crate::Result;
use crate::model::{Interest, Link, Person};
use super::entity::Entity;
use super::SqliteStore;

pub struct DbContext<S>
where
    S: DerefMut<Target = SqliteStore>,
{
    store: S,
    pending: bool,
}

impl<S> DbContext<S>
where
    S: DerefMut<Target = SqliteStore>,
{
    pub fn new(store: S) -> Self {
        Self { store, pending: false }
    }

    /// Read access to the underlying store
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// The table holding `E`
    pub fn set<E: Entity>(&self) -> EntitySet<'_, E> {
        EntitySet::new(&self.store)
    }

    pub fn people(&self) -> EntitySet<'_, Person> {
        self.set()
    }

    pub fn interests(&self) -> EntitySet<'_, Interest> {
        self.set()
    }

    pub fn links(&self) -> EntitySet<'_, Link> {
        self.set()
    }

    /// Whether writes are waiting for `save_changes`
    pub fn has_changes(&self) -> bool {
        self.pending
    }

    /// Stage an insert. The store-assigned key is written back into `entity`.
    pub fn add<E: Entity>(&mut self, entity: &mut E) -> Result<()> {
        self.begin()?;
        let key = self.store.insert(&*entity)?;
        entity.set_key(key);
        Ok(())
    }

    /// Stage an overwrite of the row keyed by `entity.key()`
    pub fn update<E: Entity>(&mut self, entity: &E) -> Result<()> {
        self.begin()?;
        self.store.update(entity)?;
        Ok(())
    }

    /// Stage removal of the row keyed by `entity.key()`
    pub fn remove<E: Entity>(&mut self, entity: &E) -> Result<()> {
        self.begin()?;
        self.store.delete::<E>(entity.key())?;
        Ok(())
    }

    /// Commit every staged write at once
    pub fn save_changes(&mut self) -> Result<()> {
        if self.pending {
            self.store.commit()?;
            self.pending = false;
        }
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        if !self.pending {
            self.store.begin_transaction()?;
            self.pending = true;
        }
        Ok(())
    }
}

impl<S> Drop for DbContext<S>
where
    S: DerefMut<Target = SqliteStore>,
{
    fn drop(&mut self) {
        if self.pending {
            if let Err(e) = self.store.rollback() {
                tracing::error!("Failed to roll back unsaved changes: {}", e);
            } else {
                tracing::debug!("Rolled back unsaved changes");
            }
        }
    }
}

/// Read-only view of one table
pub struct EntitySet<'a, E> {
    store: &'a SqliteStore,
    _entity: PhantomData<E>,
}

impl<'a, E: Entity> EntitySet<'a, E> {
    fn new(store: &'a SqliteStore) -> Self {
        Self { store, _entity: PhantomData }
    }

    pub fn find(&self, key: i64) -> Result<Option<E>> {
        self.store.find(key)
    }
}

impl EntitySet<'_, Person> {
    /// People with their interests attached
    pub fn include_interests(&self) -> Result<Vec<Person>> {
        self.store.people_with_interests()
    }
}

impl EntitySet<'_, Interest> {
    /// Interests with their owning person attached
    pub fn include_person(&self) -> Result<Vec<Interest>> {
        self.store.interests_with_person()
    }
}

impl EntitySet<'_, Link> {
    /// Links with their interest, and that interest's person, attached
    pub fn include_interest(&self) -> Result<Vec<Link>> {
        self.store.links_with_interest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_key() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut ctx = DbContext::new(&mut store);

        let mut person = Person::new("Ada", "1");
        ctx.add(&mut person).unwrap();
        assert!(person.person_id > 0);
        assert!(ctx.has_changes());

        ctx.save_changes().unwrap();
        assert!(!ctx.has_changes());
        assert_eq!(ctx.people().find(person.person_id).unwrap().unwrap().name, "Ada");
    }

    #[test]
    fn test_drop_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        {
            let mut ctx = DbContext::new(&mut store);
            ctx.add(&mut Person::new("Ada", "1")).unwrap();
            ctx.add(&mut Person::new("Grace", "2")).unwrap();
        }
        assert_eq!(store.count::<Person>().unwrap(), 0);
    }

    #[test]
    fn test_save_is_atomic_per_call() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut ctx = DbContext::new(&mut store);

        let mut person = Person::new("Ada", "1");
        ctx.add(&mut person).unwrap();
        let mut interest = Interest::new("Chess", "Openings", person.person_id);
        ctx.add(&mut interest).unwrap();
        ctx.save_changes().unwrap();

        ctx.remove(&interest).unwrap();
        person.name = "Grace".into();
        ctx.update(&person).unwrap();
        drop(ctx);

        assert_eq!(store.count::<Interest>().unwrap(), 1);
        assert_eq!(store.find::<Person>(person.person_id).unwrap().unwrap().name, "Ada");
    }

    #[test]
    fn test_context_usable_after_failed_write() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        {
            let mut ctx = DbContext::new(&mut store);
            assert!(ctx.add(&mut Interest::new("Chess", "Openings", 7)).is_err());
        }
        let mut ctx = DbContext::new(&mut store);
        ctx.add(&mut Person::new("Ada", "1")).unwrap();
        ctx.save_changes().unwrap();
        assert_eq!(ctx.store().count::<Person>().unwrap(), 1);
    }

    #[test]
    fn test_include_on_sets() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut ctx = DbContext::new(&mut store);
        let mut person = Person::new("Ada", "1");
        ctx.add(&mut person).unwrap();
        let mut interest = Interest::new("Chess", "Openings", person.person_id);
        ctx.add(&mut interest).unwrap();
        ctx.add(&mut Link::new("https://lichess.org", interest.interest_id)).unwrap();
        ctx.save_changes().unwrap();

        assert_eq!(ctx.people().include_interests().unwrap()[0].interests.len(), 1);
        assert!(ctx.interests().include_person().unwrap()[0].person.is_some());
        assert!(ctx.links().include_interest().unwrap()[0].interest.is_some());
    }
}
