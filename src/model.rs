//! Entity records - people, their interests and interest links
//!
//! Ownership runs one way:
//! - `Person` owns zero or more `Interest`s (via `Interest::fk_person_id`)
//! - `Interest` owns zero or more `Link`s (via `Link::fk_interest_id`)
//!
//! Collections on the owning side are never serialized. The owner reference on
//! the dependent side is only serialized when a query eager-loaded it.

use serde::{Deserialize, Serialize};

/// A person and their contact number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Assigned by the store on insert; ignored in request bodies.
    #[serde(default)]
    pub person_id: i64,
    pub name: String,
    pub phone_number: String,
    /// Filled by the `people` eager-load query only.
    #[serde(skip)]
    pub interests: Vec<Interest>,
}

impl Person {
    pub const NAME_MAX_LEN: usize = 60;
    pub const PHONE_NUMBER_MAX_LEN: usize = 15;

    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            person_id: 0,
            name: name.into(),
            phone_number: phone_number.into(),
            interests: Vec::new(),
        }
    }
}

/// Something a person is interested in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    #[serde(default)]
    pub interest_id: i64,
    pub title: String,
    pub description: String,
    pub fk_person_id: i64,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip)]
    pub links: Vec<Link>,
}

impl Interest {
    pub const TITLE_MAX_LEN: usize = 35;
    pub const DESCRIPTION_MAX_LEN: usize = 100;

    pub fn new(title: impl Into<String>, description: impl Into<String>, fk_person_id: i64) -> Self {
        Self {
            interest_id: 0,
            title: title.into(),
            description: description.into(),
            fk_person_id,
            person: None,
            links: Vec::new(),
        }
    }

    /// Attach the owning person (eager load)
    pub fn with_person(mut self, person: Person) -> Self {
        self.person = Some(person);
        self
    }
}

/// A URL filed under an interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default)]
    pub link_id: i64,
    pub url: String,
    pub fk_interest_id: i64,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub interest: Option<Interest>,
}

impl Link {
    pub const URL_MAX_LEN: usize = 100;

    pub fn new(url: impl Into<String>, fk_interest_id: i64) -> Self {
        Self {
            link_id: 0,
            url: url.into(),
            fk_interest_id,
            interest: None,
        }
    }

    /// Attach the owning interest (eager load)
    pub fn with_interest(mut self, interest: Interest) -> Self {
        self.interest = Some(interest);
        self
    }
}
