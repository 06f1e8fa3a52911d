use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::db::models::{Cat, CatChanges, CatSummary, NewCat};
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::validation::{validate_cat_age, validate_not_blank};
use crate::AppState;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

const CAT_NOT_FOUND: &str = "Cat not found";

/// Raw query values; anything unparsable falls back to the defaults.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn resolve(&self) -> (i64, i64) {
        let parse = |v: &Option<String>, default: i64| {
            v.as_deref()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(default)
        };
        (
            parse(&self.page, DEFAULT_PAGE),
            parse(&self.limit, DEFAULT_LIMIT).min(MAX_LIMIT),
        )
    }
}

/// Rows to skip for a 1-based page. Pages past `i64` range saturate and read as empty.
fn page_offset(page: i64, limit: i64) -> i64 {
    (page - 1).checked_mul(limit).unwrap_or(i64::MAX)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatPage {
    pub error: bool,
    pub message: String,
    pub data: Vec<CatSummary>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub next_page: bool,
    pub prev_page: bool,
}

impl CatPage {
    fn new(cats: Vec<Cat>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = (total + limit - 1) / limit;
        Self {
            error: false,
            message: "Cats found successfully".to_string(),
            data: cats.into_iter().map(CatSummary::from).collect(),
            total,
            page,
            total_pages,
            next_page: page < total_pages,
            prev_page: page > 1,
        }
    }
}

fn validate_new_cat(cat: &NewCat) -> Result<(), AppError> {
    validate_not_blank("name", &cat.name)?;
    validate_cat_age(cat.age)?;
    validate_not_blank("breed", &cat.breed)?;
    Ok(())
}

fn validate_changes(changes: &CatChanges) -> Result<(), AppError> {
    if let Some(name) = &changes.name {
        validate_not_blank("name", name)?;
    }
    if let Some(age) = changes.age {
        validate_cat_age(age)?;
    }
    if let Some(breed) = &changes.breed {
        validate_not_blank("breed", breed)?;
    }
    Ok(())
}

pub async fn list_cats(
    query: web::Query<PageQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (page, limit) = query.resolve();
    let (cats, total) = state.cats.list_cats(page_offset(page, limit), limit).await?;

    Ok(HttpResponse::Ok().json(CatPage::new(cats, total, page, limit)))
}

pub async fn get_cat(
    id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = match state.cats.find_cat(id.into_inner()).await? {
        Some(cat) => ApiResponse {
            error: false,
            message: "Cat found successfully".to_string(),
            data: Some(Some(CatSummary::from(cat))),
        },
        None => ApiResponse {
            error: false,
            message: CAT_NOT_FOUND.to_string(),
            data: Some(None),
        },
    };

    Ok(HttpResponse::Ok().json(body))
}

pub async fn create_cat(
    user: AuthenticatedUser,
    body: web::Json<NewCat>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut new = body.into_inner();
    validate_new_cat(&new)?;
    new.name = new.name.trim().to_string();
    new.breed = new.breed.trim().to_string();

    let cat = state.cats.create_cat(new, user.0.subject_id).await?;
    info!(cat_id = %cat.id, user_id = %user.0.subject_id, "cat created");

    Ok(HttpResponse::Created().json(ApiResponse::success("Cat created successfully", cat)))
}

pub async fn update_cat(
    user: AuthenticatedUser,
    id: web::Path<Uuid>,
    body: web::Json<CatChanges>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut changes = body.into_inner();
    validate_changes(&changes)?;
    changes.name = changes.name.map(|n| n.trim().to_string());
    changes.breed = changes.breed.map(|b| b.trim().to_string());

    let cat = state
        .cats
        .update_owned_cat(id.into_inner(), user.0.subject_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(CAT_NOT_FOUND.into()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Cat updated successfully", cat)))
}

pub async fn delete_cat(
    user: AuthenticatedUser,
    id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    if !state.cats.delete_owned_cat(id, user.0.subject_id).await? {
        return Err(AppError::NotFound(CAT_NOT_FOUND.into()));
    }

    info!(cat_id = %id, user_id = %user.0.subject_id, "cat deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn test_page_query_defaults() {
        assert_eq!(query(None, None).resolve(), (1, 10));
        assert_eq!(query(Some("abc"), Some("-3")).resolve(), (1, 10));
        assert_eq!(query(Some("0"), Some("0")).resolve(), (1, 10));
        assert_eq!(query(Some("3"), Some("25")).resolve(), (3, 25));
        assert_eq!(query(Some("2"), Some("1000")).resolve(), (2, MAX_LIMIT));
    }

    #[test]
    fn test_page_offset_saturates() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 25), 50);
        assert_eq!(page_offset(i64::MAX, MAX_LIMIT), i64::MAX);
        assert_eq!(page_offset(i64::MAX, 1), i64::MAX - 1);
    }

    #[test]
    fn test_page_metadata() {
        let page = CatPage::new(Vec::new(), 21, 2, 10);
        assert_eq!(page.total_pages, 3);
        assert!(page.next_page);
        assert!(page.prev_page);

        let page = CatPage::new(Vec::new(), 0, 1, 10);
        assert_eq!(page.total_pages, 0);
        assert!(!page.next_page);
        assert!(!page.prev_page);
    }

    #[test]
    fn test_change_validation() {
        assert!(validate_changes(&CatChanges::default()).is_ok());
        assert!(validate_changes(&CatChanges { age: Some(31), ..Default::default() }).is_err());
        assert!(validate_changes(&CatChanges { name: Some(" ".into()), ..Default::default() }).is_err());
    }
}
