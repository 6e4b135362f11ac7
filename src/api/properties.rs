//! Dataset-backed property endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{count_param, AppState};
use crate::error::ApiError;
use crate::ingestion::utils::{parse_int, parse_num};
use crate::ingestion::{City, NormalizedProperty, RawRow};
use crate::query::{
    self, CitySummary, ListingFilter, DEFAULT_LIST_LIMIT, DEFAULT_SHOWCASE_LIMIT,
};

/// Query values arrive as text and are parsed leniently: junk falls back to
/// the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub city: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub accommodates: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CityParams {
    pub city: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CitiesParams {
    #[serde(rename = "withCounts")]
    pub with_counts: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub city: City,
    pub total: usize,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
    pub items: Vec<NormalizedProperty>,
}

#[derive(Debug, Serialize)]
pub struct ShowcaseResponse {
    pub city: City,
    pub count: usize,
    pub items: Vec<NormalizedProperty>,
}

#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    pub count: usize,
    pub items: Vec<CitySummary>,
}

/// Missing or blank city means the default city
fn resolve_city(param: Option<&str>) -> Result<City, ApiError> {
    match param.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(City::default()),
        Some(key) => key
            .parse()
            .map_err(|_| ApiError::UnsupportedCity(key.to_string())),
    }
}

fn text_param(param: Option<String>) -> Option<String> {
    param
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

async fn city_rows(state: &AppState, city: City) -> Result<Arc<Vec<RawRow>>, ApiError> {
    state
        .cache
        .get(city)
        .await
        .map_err(|source| ApiError::Upstream { city, source })
}

/// GET /properties
pub async fn list_properties(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let city = resolve_city(params.city.as_deref())?;
    let limit = count_param(params.limit.as_deref(), DEFAULT_LIST_LIMIT);
    let offset = count_param(params.offset.as_deref(), 0);
    let filter = ListingFilter {
        min_guests: params.accommodates.as_deref().and_then(parse_int),
        price_min: params.price_min.as_deref().and_then(parse_num),
        price_max: params.price_max.as_deref().and_then(parse_num),
        neighbourhood: text_param(params.neighbourhood),
        room_type: text_param(params.room_type),
    };

    let rows = city_rows(&state, city).await?;
    let page = query::list(&rows, city, &filter, offset, limit);

    Ok(Json(ListResponse {
        city,
        total: page.total,
        count: page.items.len(),
        offset,
        limit,
        items: page.items,
    }))
}

/// GET /properties/:id
pub async fn property_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CityParams>,
) -> Result<Json<NormalizedProperty>, ApiError> {
    let city = resolve_city(params.city.as_deref())?;
    let rows = city_rows(&state, city).await?;

    query::find_by_id(&rows, city, &id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("property {} in {}", id, city)))
}

/// GET /properties/popular
pub async fn popular_properties(
    State(state): State<AppState>,
    Query(params): Query<CityParams>,
) -> Result<Json<ShowcaseResponse>, ApiError> {
    let city = resolve_city(params.city.as_deref())?;
    let limit = count_param(params.limit.as_deref(), DEFAULT_SHOWCASE_LIMIT);

    let rows = city_rows(&state, city).await?;
    let items = query::popular(&rows, city, limit);

    Ok(Json(ShowcaseResponse {
        city,
        count: items.len(),
        items,
    }))
}

/// GET /properties/next-month
pub async fn next_month_properties(
    State(state): State<AppState>,
    Query(params): Query<CityParams>,
) -> Result<Json<ShowcaseResponse>, ApiError> {
    let city = resolve_city(params.city.as_deref())?;
    let limit = count_param(params.limit.as_deref(), DEFAULT_SHOWCASE_LIMIT);

    let rows = city_rows(&state, city).await?;
    let items = query::available_next_month(&rows, city, limit);

    Ok(Json(ShowcaseResponse {
        city,
        count: items.len(),
        items,
    }))
}

/// GET /properties/cities
pub async fn list_cities(
    State(state): State<AppState>,
    Query(params): Query<CitiesParams>,
) -> Json<CitiesResponse> {
    let with_counts = matches!(
        params.with_counts.as_deref().map(str::trim),
        Some("1") | Some("true")
    );

    let items = query::city_summaries(&state.cache, with_counts).await;

    Json(CitiesResponse {
        count: items.len(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_city() {
        assert_eq!(resolve_city(None).unwrap(), City::Asheville);
        assert_eq!(resolve_city(Some("  ")).unwrap(), City::Asheville);
        assert_eq!(resolve_city(Some("Austin")).unwrap(), City::Austin);
        assert!(matches!(
            resolve_city(Some("paris")),
            Err(ApiError::UnsupportedCity(c)) if c == "paris"
        ));
    }
}
