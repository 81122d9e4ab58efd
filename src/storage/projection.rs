//! Composed read models
//!
//! Each level is fetched with its own sub-query (people, then the interests of
//! each person, then the links of each interest) rather than through the
//! eager-load joins. Results are plain arrays; a key that matches nothing
//! yields an empty array.

use serde::Serialize;
use crate::Result;
use super::SqliteStore;

/// `/peopleWithInterestsAndLinks` entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTree {
    pub person_id: i64,
    pub name: String,
    pub phone_number: String,
    pub interest: Vec<InterestTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestTree {
    pub interest_id: i64,
    pub title: String,
    pub description: String,
    pub link: Vec<LinkSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub link_id: i64,
    pub url: String,
}

/// `/personWithInterests/{id}` entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInterests {
    pub person_id: i64,
    pub name: String,
    pub interest: Vec<InterestSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestSummary {
    pub interest_id: i64,
    pub title: String,
    pub description: String,
}

/// `/personWithLinks/{id}` entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonLinks {
    pub name: String,
    pub interest: Vec<InterestLinks>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestLinks {
    pub interest_id: i64,
    pub link: Vec<LinkSummary>,
}

impl SqliteStore {
    /// Every person with their interests, and every interest with its links
    pub fn people_with_interests_and_links(&self) -> Result<Vec<PersonTree>> {
        let mut stmt = self.connection().prepare(
            "SELECT person_id, name, phone_number FROM people ORDER BY person_id",
        )?;
        let people = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<rusqlite::Result<Vec<(i64, String, String)>>>()?;

        let mut trees = Vec::with_capacity(people.len());
        for (person_id, name, phone_number) in people {
            let mut interest = Vec::new();
            for summary in self.interests_of(person_id)? {
                interest.push(InterestTree {
                    link: self.links_of(summary.interest_id)?,
                    interest_id: summary.interest_id,
                    title: summary.title,
                    description: summary.description,
                });
            }
            trees.push(PersonTree { person_id, name, phone_number, interest });
        }
        Ok(trees)
    }

    /// The person with `person_id` and the title/description of their interests
    pub fn person_with_interests(&self, person_id: i64) -> Result<Vec<PersonInterests>> {
        let mut stmt = self.connection().prepare(
            "SELECT person_id, name FROM people WHERE person_id = ?1",
        )?;
        let people = stmt
            .query_map([person_id], |row| Ok((row.get::<_, i64>(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;

        people
            .into_iter()
            .map(|(person_id, name)| -> Result<PersonInterests> {
                Ok(PersonInterests {
                    person_id,
                    name,
                    interest: self.interests_of(person_id)?,
                })
            })
            .collect()
    }

    /// The person with `person_id`, their interest ids and each interest's links
    pub fn person_with_links(&self, person_id: i64) -> Result<Vec<PersonLinks>> {
        let mut stmt = self.connection().prepare(
            "SELECT person_id, name FROM people WHERE person_id = ?1",
        )?;
        let people = stmt
            .query_map([person_id], |row| Ok((row.get::<_, i64>(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;

        let mut result = Vec::with_capacity(people.len());
        for (person_id, name) in people {
            let mut interest = Vec::new();
            for summary in self.interests_of(person_id)? {
                interest.push(InterestLinks {
                    interest_id: summary.interest_id,
                    link: self.links_of(summary.interest_id)?,
                });
            }
            result.push(PersonLinks { name, interest });
        }
        Ok(result)
    }

    fn interests_of(&self, person_id: i64) -> Result<Vec<InterestSummary>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT interest_id, title, description FROM interests
             WHERE fk_person_id = ?1 ORDER BY interest_id",
        )?;
        let interests = stmt
            .query_map([person_id], |row| {
                Ok(InterestSummary {
                    interest_id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(interests)
    }

    fn links_of(&self, interest_id: i64) -> Result<Vec<LinkSummary>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT link_id, url FROM links WHERE fk_interest_id = ?1 ORDER BY link_id",
        )?;
        let links = stmt
            .query_map([interest_id], |row| {
                Ok(LinkSummary {
                    link_id: row.get(0)?,
                    url: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interest, Link, Person};
    use serde_json::json;

    #[test]
    fn test_people_with_interests_and_links() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ada = store.insert(&Person::new("Ada", "1")).unwrap();
        let grace = store.insert(&Person::new("Grace", "2")).unwrap();
        let chess = store.insert(&Interest::new("Chess", "Openings", ada)).unwrap();
        store.insert(&Interest::new("Navy", "Ships", grace)).unwrap();
        store.insert(&Link::new("https://lichess.org", chess)).unwrap();

        let trees = store.people_with_interests_and_links().unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].interest.len(), 1);
        assert_eq!(trees[0].interest[0].link, vec![LinkSummary { link_id: 1, url: "https://lichess.org".into() }]);
        assert!(trees[1].interest[0].link.is_empty());
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.people_with_interests_and_links().unwrap().is_empty());
        assert!(store.person_with_interests(1).unwrap().is_empty());
        assert!(store.person_with_links(1).unwrap().is_empty());
    }

    #[test]
    fn test_person_with_interests_shape() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ada = store.insert(&Person::new("Ada", "1")).unwrap();
        store.insert(&Interest::new("Chess", "Openings", ada)).unwrap();

        let value = serde_json::to_value(store.person_with_interests(ada).unwrap()).unwrap();
        assert_eq!(value, json!([{
            "personId": ada,
            "name": "Ada",
            "interest": [{"interestId": 1, "title": "Chess", "description": "Openings"}]
        }]));
    }

    #[test]
    fn test_person_with_links_shape() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ada = store.insert(&Person::new("Ada", "1")).unwrap();
        let chess = store.insert(&Interest::new("Chess", "Openings", ada)).unwrap();
        store.insert(&Link::new("https://lichess.org", chess)).unwrap();

        let value = serde_json::to_value(store.person_with_links(ada).unwrap()).unwrap();
        assert_eq!(value, json!([{
            "name": "Ada",
            "interest": [{"interestId": chess, "link": [{"linkId": 1, "url": "https://lichess.org"}]}]
        }]));
    }
}
