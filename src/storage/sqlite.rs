//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OptionalExtension, params_from_iter};
use crate::Result;
use crate::model::{Interest, Link, Person};
use super::entity::Entity;
use super::schema;

/// SQLite-backed storage for people, interests and links
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Enable foreign keys and create the tables
    fn initialize_schema(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Entity Operations ==========

    /// Insert a record and return the key the store assigned to it
    pub fn insert<E: Entity>(&self, entity: &E) -> Result<i64> {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders,
        );
        self.conn.execute(&sql, params_from_iter(entity.values()))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a record by key
    pub fn find<E: Entity>(&self, key: i64) -> Result<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} t WHERE t.{} = ?1",
            E::projection("t"),
            E::TABLE,
            E::KEY,
        );
        self.conn
            .query_row(&sql, [key], |row| E::from_row(row, 0))
            .optional()
            .map_err(Into::into)
    }

    /// Overwrite every value column of the row with the record's key.
    /// Returns the number of rows changed (0 or 1).
    pub fn update<E: Entity>(&self, entity: &E) -> Result<usize> {
        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            E::TABLE,
            assignments,
            E::KEY,
            E::COLUMNS.len() + 1,
        );
        let mut values = entity.values();
        values.push(entity.key().into());
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        Ok(changed)
    }

    /// Delete a record by key. Returns the number of rows removed (0 or 1).
    pub fn delete<E: Entity>(&self, key: i64) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1", E::TABLE, E::KEY);
        let removed = self.conn.execute(&sql, [key])?;
        Ok(removed)
    }

    /// Count the rows of a table
    pub fn count<E: Entity>(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Eager Loads ==========

    /// All people, each with the interests that reference them
    pub fn people_with_interests(&self) -> Result<Vec<Person>> {
        let sql = format!(
            "SELECT {}, {} FROM people p
             LEFT JOIN interests i ON i.fk_person_id = p.person_id
             ORDER BY p.person_id, i.interest_id",
            Person::projection("p"),
            Interest::projection("i"),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut people: Vec<Person> = Vec::new();
        while let Some(row) = rows.next()? {
            let person_id: i64 = row.get(0)?;
            if people.last().map(|p| p.person_id) != Some(person_id) {
                people.push(Person::from_row(row, 0)?);
            }

            let interest_offset = Person::width();
            let interest_id: Option<i64> = row.get(interest_offset)?;
            if interest_id.is_some() {
                let interest = Interest::from_row(row, interest_offset)?;
                if let Some(person) = people.last_mut() {
                    person.interests.push(interest);
                }
            }
        }

        Ok(people)
    }

    /// All interests, each with its owning person
    pub fn interests_with_person(&self) -> Result<Vec<Interest>> {
        let sql = format!(
            "SELECT {}, {} FROM interests i
             JOIN people p ON p.person_id = i.fk_person_id
             ORDER BY i.interest_id",
            Interest::projection("i"),
            Person::projection("p"),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let interests = stmt
            .query_map([], |row| {
                let person = Person::from_row(row, Interest::width())?;
                Ok(Interest::from_row(row, 0)?.with_person(person))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(interests)
    }

    /// All links, each with its interest and that interest's person
    pub fn links_with_interest(&self) -> Result<Vec<Link>> {
        let sql = format!(
            "SELECT {}, {}, {} FROM links l
             JOIN interests i ON i.interest_id = l.fk_interest_id
             JOIN people p ON p.person_id = i.fk_person_id
             ORDER BY l.link_id",
            Link::projection("l"),
            Interest::projection("i"),
            Person::projection("p"),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let links = stmt
            .query_map([], |row| {
                let interest_offset = Link::width();
                let person = Person::from_row(row, interest_offset + Interest::width())?;
                let interest = Interest::from_row(row, interest_offset)?.with_person(person);
                Ok(Link::from_row(row, 0)?.with_interest(interest))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            people: self.count::<Person>()?,
            interests: self.count::<Interest>()?,
            links: self.count::<Link>()?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub people: usize,
    pub interests: usize,
    pub links: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  People: {}", self.people)?;
        writeln!(f, "  Interests: {}", self.interests)?;
        writeln!(f, "  Links: {}", self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (SqliteStore, i64, i64) {
        let store = SqliteStore::open_in_memory().unwrap();
        let person_id = store.insert(&Person::new("Ada", "0701234567")).unwrap();
        let interest_id = store.insert(&Interest::new("Chess", "Openings", person_id)).unwrap();
        (store, person_id, interest_id)
    }

    #[test]
    fn test_person_crud() {
        let store = SqliteStore::open_in_memory().unwrap();

        let id = store.insert(&Person::new("Ada", "0701234567")).unwrap();
        let mut person: Person = store.find(id).unwrap().unwrap();
        assert_eq!(person.name, "Ada");
        assert_eq!(person.phone_number, "0701234567");

        person.name = "Grace".to_string();
        assert_eq!(store.update(&person).unwrap(), 1);
        assert_eq!(store.find::<Person>(id).unwrap().unwrap().name, "Grace");

        assert_eq!(store.delete::<Person>(id).unwrap(), 1);
        assert!(store.find::<Person>(id).unwrap().is_none());
        assert_eq!(store.delete::<Person>(id).unwrap(), 0);
    }

    #[test]
    fn test_keys_not_reused() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.insert(&Person::new("Ada", "1")).unwrap();
        store.delete::<Person>(first).unwrap();
        let second = store.insert(&Person::new("Grace", "2")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_update_missing_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ghost = Person { person_id: 42, ..Person::new("Nobody", "0") };
        assert_eq!(store.update(&ghost).unwrap(), 0);
        assert_eq!(store.count::<Person>().unwrap(), 0);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.insert(&Interest::new("Chess", "Openings", 99)).is_err());
        assert!(store.insert(&Link::new("https://example.com", 99)).is_err());
    }

    #[test]
    fn test_delete_owner_with_dependents_fails() {
        let (store, person_id, _) = seeded();
        assert!(store.delete::<Person>(person_id).is_err());
        assert!(store.find::<Person>(person_id).unwrap().is_some());
    }

    #[test]
    fn test_length_limits() {
        let store = SqliteStore::open_in_memory().unwrap();
        let name = "x".repeat(Person::NAME_MAX_LEN);
        assert!(store.insert(&Person::new(name.as_str(), "1")).is_ok());

        let too_long = "x".repeat(Person::NAME_MAX_LEN + 1);
        assert!(store.insert(&Person::new(too_long.as_str(), "1")).is_err());

        let phone = "1".repeat(Person::PHONE_NUMBER_MAX_LEN + 1);
        assert!(store.insert(&Person::new("Ada", phone.as_str())).is_err());
    }

    #[test]
    fn test_interest_length_limits() {
        let store = SqliteStore::open_in_memory().unwrap();
        let person_id = store.insert(&Person::new("Ada", "1")).unwrap();

        let title = "t".repeat(Interest::TITLE_MAX_LEN);
        let description = "d".repeat(Interest::DESCRIPTION_MAX_LEN);
        assert!(store.insert(&Interest::new(title.as_str(), description.as_str(), person_id)).is_ok());

        let long_title = "t".repeat(Interest::TITLE_MAX_LEN + 1);
        assert!(store.insert(&Interest::new(long_title.as_str(), "ok", person_id)).is_err());

        let long_description = "d".repeat(Interest::DESCRIPTION_MAX_LEN + 1);
        assert!(store.insert(&Interest::new("ok", long_description.as_str(), person_id)).is_err());

        assert_eq!(store.count::<Interest>().unwrap(), 1);
    }

    #[test]
    fn test_link_length_limit() {
        let (store, _, interest_id) = seeded();

        let url = "u".repeat(Link::URL_MAX_LEN);
        assert!(store.insert(&Link::new(url.as_str(), interest_id)).is_ok());

        let long_url = "u".repeat(Link::URL_MAX_LEN + 1);
        assert!(store.insert(&Link::new(long_url.as_str(), interest_id)).is_err());

        assert_eq!(store.count::<Link>().unwrap(), 1);
    }

    #[test]
    fn test_update_respects_length_limits() {
        let (store, _, interest_id) = seeded();
        let mut interest: Interest = store.find(interest_id).unwrap().unwrap();
        interest.title = "t".repeat(Interest::TITLE_MAX_LEN + 1);
        assert!(store.update(&interest).is_err());
        assert_eq!(store.find::<Interest>(interest_id).unwrap().unwrap().title, "Chess");
    }

    #[test]
    fn test_people_with_interests() {
        let (store, person_id, interest_id) = seeded();
        store.insert(&Interest::new("Go", "Joseki", person_id)).unwrap();
        store.insert(&Person::new("Grace", "2")).unwrap();

        let people = store.people_with_interests().unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].interests.len(), 2);
        assert_eq!(people[0].interests[0].interest_id, interest_id);
        assert!(people[1].interests.is_empty());
    }

    #[test]
    fn test_links_with_interest() {
        let (store, _, interest_id) = seeded();
        store.insert(&Link::new("https://lichess.org", interest_id)).unwrap();

        let interests = store.interests_with_person().unwrap();
        assert_eq!(interests[0].person.as_ref().unwrap().name, "Ada");

        let links = store.links_with_interest().unwrap();
        assert_eq!(links.len(), 1);
        let interest = links[0].interest.as_ref().unwrap();
        assert_eq!(interest.title, "Chess");
        assert_eq!(interest.person.as_ref().unwrap().phone_number, "0701234567");
    }

    #[test]
    fn test_stats() {
        let (store, _, interest_id) = seeded();
        store.insert(&Link::new("https://lichess.org", interest_id)).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!((stats.people, stats.interests, stats.links), (1, 1, 1));
    }
}
