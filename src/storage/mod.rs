//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - people(person_id, name, phone_number)
//! - interests(interest_id, title, description, fk_person_id -> people)
//! - links(link_id, url, fk_interest_id -> interests)

pub mod schema;
pub mod entity;
pub mod sqlite;
pub mod projection;
pub mod context;

pub use sqlite::{SqliteStore, DbStats};
pub use entity::Entity;
pub use context::{DbContext, EntitySet};
pub use projection::{
    InterestLinks, InterestSummary, InterestTree, LinkSummary, PersonInterests, PersonLinks,
    PersonTree,
};
