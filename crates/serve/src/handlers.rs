//! HTTP handlers for the agency endpoints

use crate::error::ApiError;
use agency_core::{AgencyRecord, ListingService, PageResult};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub listing: Arc<ListingService>,
}

impl AppState {
    pub fn new(listing: Arc<ListingService>) -> Self {
        Self { listing }
    }
}

/// Query parameters for `GET /agencies`
///
/// All values are kept as raw text; the listing service validates them.
/// When a parameter repeats, the first occurrence wins.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub services: Option<String>,
    pub location: Option<String>,
    pub page: Option<String>,
}

impl ListingQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "services" => &mut query.services,
                "location" => &mut query.location,
                "page" => &mut query.page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Body of a successful listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse<'a> {
    pub success: bool,
    pub agencies: &'a [AgencyRecord],
    pub current_page: u32,
    pub total_pages: u64,
    pub total_agencies: u64,
}

impl<'a> From<&'a PageResult> for ListingResponse<'a> {
    fn from(page: &'a PageResult) -> Self {
        Self {
            success: true,
            agencies: &page.records,
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_agencies: page.total_records,
        }
    }
}

/// Body of a successful detail response
#[derive(Debug, Serialize)]
pub struct AgencyResponse {
    pub success: bool,
    pub agency: AgencyRecord,
}

/// Handler for listing agencies
pub async fn handle_list_agencies(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let params = ListingQuery::from_pairs(pairs);
    let page = state
        .listing
        .list(
            params.services.as_deref(),
            params.location.as_deref(),
            params.page.as_deref(),
        )
        .await?;

    Ok(Json(ListingResponse::from(page.as_ref())).into_response())
}

/// Handler for getting one agency
pub async fn handle_get_agency(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgencyResponse>, ApiError> {
    tracing::debug!("Getting agency: {}", id);

    let agency = state.listing.get_by_id(&id).await?;
    Ok(Json(AgencyResponse {
        success: true,
        agency,
    }))
}
