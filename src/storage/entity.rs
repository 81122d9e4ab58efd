//! Table mapping for entity records
//!
//! Each record names its table, its integer key column and the value columns
//! in bind order. Rows are decoded from an offset so joined rows can carry
//! several records side by side.

use rusqlite::Row;
use rusqlite::types::Value;
use crate::model::{Interest, Link, Person};

/// A record stored in a table with an integer primary key.
pub trait Entity: Sized {
    const TABLE: &'static str;
    const KEY: &'static str;
    /// Non-key columns, in the order `values()` yields them
    const COLUMNS: &'static [&'static str];

    fn key(&self) -> i64;

    fn set_key(&mut self, key: i64);

    fn values(&self) -> Vec<Value>;

    /// Decode from `row`, reading the key at `offset` and the columns after it.
    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self>;

    /// Number of columns this entity occupies in a row
    fn width() -> usize {
        1 + Self::COLUMNS.len()
    }

    /// Key plus value columns, qualified with a table alias
    fn projection(alias: &str) -> String {
        std::iter::once(Self::KEY)
            .chain(Self::COLUMNS.iter().copied())
            .map(|column| format!("{alias}.{column}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Entity for Person {
    const TABLE: &'static str = "people";
    const KEY: &'static str = "person_id";
    const COLUMNS: &'static [&'static str] = &["name", "phone_number"];

    fn key(&self) -> i64 {
        self.person_id
    }

    fn set_key(&mut self, key: i64) {
        self.person_id = key;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.phone_number.clone()),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Person {
            person_id: row.get(offset)?,
            name: row.get(offset + 1)?,
            phone_number: row.get(offset + 2)?,
            interests: Vec::new(),
        })
    }
}

impl Entity for Interest {
    const TABLE: &'static str = "interests";
    const KEY: &'static str = "interest_id";
    const COLUMNS: &'static [&'static str] = &["title", "description", "fk_person_id"];

    fn key(&self) -> i64 {
        self.interest_id
    }

    fn set_key(&mut self, key: i64) {
        self.interest_id = key;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Text(self.description.clone()),
            Value::Integer(self.fk_person_id),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Interest {
            interest_id: row.get(offset)?,
            title: row.get(offset + 1)?,
            description: row.get(offset + 2)?,
            fk_person_id: row.get(offset + 3)?,
            person: None,
            links: Vec::new(),
        })
    }
}

impl Entity for Link {
    const TABLE: &'static str = "links";
    const KEY: &'static str = "link_id";
    const COLUMNS: &'static [&'static str] = &["url", "fk_interest_id"];

    fn key(&self) -> i64 {
        self.link_id
    }

    fn set_key(&mut self, key: i64) {
        self.link_id = key;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.url.clone()),
            Value::Integer(self.fk_interest_id),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Link {
            link_id: row.get(offset)?,
            url: row.get(offset + 1)?,
            fk_interest_id: row.get(offset + 2)?,
            interest: None,
        })
    }
}
