use axum::{
    extract::Path,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use crate::model::{Interest, Link, Person};
use crate::server::Db;
use crate::storage::{Entity, PersonInterests, PersonLinks, PersonTree};
use crate::{Error, Result};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound(message) => (StatusCode::NOT_FOUND, Json(message)).into_response(),
            other => {
                tracing::error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { error: other.to_string() }),
                )
                    .into_response()
            }
        }
    }
}

/// An entity exposed under its own collection route
pub trait Resource: Entity + Serialize + DeserializeOwned + Send + 'static {
    /// Collection path, e.g. `/people`
    const ROUTE: &'static str;
    const LABEL: &'static str;

    /// Copy the fields a PUT may change from `changes` into `self`
    fn apply_update(&mut self, changes: Self);
}

impl Resource for Person {
    const ROUTE: &'static str = "/people";
    const LABEL: &'static str = "Person";

    fn apply_update(&mut self, changes: Self) {
        self.name = changes.name;
        self.phone_number = changes.phone_number;
    }
}

impl Resource for Interest {
    const ROUTE: &'static str = "/interests";
    const LABEL: &'static str = "Interest";

    fn apply_update(&mut self, changes: Self) {
        self.title = changes.title;
        self.description = changes.description;
        self.fk_person_id = changes.fk_person_id;
    }
}

impl Resource for Link {
    const ROUTE: &'static str = "/links";
    const LABEL: &'static str = "Link";

    fn apply_update(&mut self, changes: Self) {
        self.url = changes.url;
        self.fk_interest_id = changes.fk_interest_id;
    }
}

fn not_found<R: Resource>() -> Error {
    Error::not_found(format!("{} not found", R::LABEL))
}

// ========== Collections ==========

pub async fn list_people(db: Db) -> Result<Json<Vec<Person>>> {
    let ctx = db.context().await;
    let people = ctx.people().include_interests()?;
    if people.is_empty() {
        return Err(Error::not_found("Couldn't find any people"));
    }
    tracing::debug!("Listing {} people", people.len());
    Ok(Json(people))
}

pub async fn list_interests(db: Db) -> Result<Json<Vec<Interest>>> {
    let ctx = db.context().await;
    let interests = ctx.interests().include_person()?;
    if interests.is_empty() {
        return Err(Error::not_found("No interests in database"));
    }
    tracing::debug!("Listing {} interests", interests.len());
    Ok(Json(interests))
}

pub async fn list_links(db: Db) -> Result<Json<Vec<Link>>> {
    let ctx = db.context().await;
    let links = ctx.links().include_interest()?;
    if links.is_empty() {
        return Err(Error::not_found("No links in database"));
    }
    tracing::debug!("Listing {} links", links.len());
    Ok(Json(links))
}

// ========== Single Entities ==========
//
// The store is locked only once the path and body have been extracted.

pub async fn create<R: Resource>(
    db: Db,
    Json(mut entity): Json<R>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<R>)> {
    let mut ctx = db.context().await;
    ctx.add(&mut entity)?;
    ctx.save_changes()?;

    let location = format!("{}/{}", R::ROUTE, entity.key());
    tracing::info!("Created {} at {}", R::LABEL, location);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(entity)))
}

pub async fn find<R: Resource>(db: Db, Path(id): Path<i64>) -> Result<Json<R>> {
    let ctx = db.context().await;
    let entity = ctx.set::<R>().find(id)?.ok_or_else(not_found::<R>)?;
    Ok(Json(entity))
}

pub async fn update<R: Resource>(
    db: Db,
    Path(id): Path<i64>,
    Json(changes): Json<R>,
) -> Result<Json<R>> {
    let mut ctx = db.context().await;
    let mut entity = ctx.set::<R>().find(id)?.ok_or_else(not_found::<R>)?;
    entity.apply_update(changes);
    ctx.update(&entity)?;
    ctx.save_changes()?;

    tracing::info!("Updated {} {}", R::LABEL, id);
    Ok(Json(entity))
}

pub async fn remove<R: Resource>(db: Db, Path(id): Path<i64>) -> Result<Json<String>> {
    let mut ctx = db.context().await;
    let entity = ctx.set::<R>().find(id)?.ok_or_else(not_found::<R>)?;
    ctx.remove(&entity)?;
    ctx.save_changes()?;

    tracing::info!("Deleted {} {}", R::LABEL, id);
    Ok(Json(format!("{} with id: {} is deleted", R::LABEL, id)))
}

// ========== Composed Reads ==========
//
// These never answer 404: an unknown id is an empty array.

pub async fn people_with_interests_and_links(db: Db) -> Result<Json<Vec<PersonTree>>> {
    let ctx = db.context().await;
    let trees = tokio::task::spawn_blocking(move || ctx.store().people_with_interests_and_links())
        .await??;
    Ok(Json(trees))
}

pub async fn person_with_interests(db: Db, Path(id): Path<i64>) -> Result<Json<Vec<PersonInterests>>> {
    let ctx = db.context().await;
    let people = tokio::task::spawn_blocking(move || ctx.store().person_with_interests(id))
        .await??;
    Ok(Json(people))
}

pub async fn person_with_links(db: Db, Path(id): Path<i64>) -> Result<Json<Vec<PersonLinks>>> {
    let ctx = db.context().await;
    let people = tokio::task::spawn_blocking(move || ctx.store().person_with_links(id))
        .await??;
    Ok(Json(people))
}
