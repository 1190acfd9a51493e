//! Categories API endpoints.

use api_types::category::{Categories, CategoriesQuery};
use axum::{Json, extract::Query};

use crate::transactions::engine_type;

/// Categories a transaction of the requested type may use.
pub async fn list(Query(query): Query<CategoriesQuery>) -> Json<Categories> {
    let categories = engine_type(query.kind)
        .categories()
        .iter()
        .map(|c| c.to_string())
        .collect();

    Json(Categories {
        kind: query.kind,
        categories,
    })
}
