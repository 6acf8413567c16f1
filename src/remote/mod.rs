//! HTTP clients for the remote favorites API and the tip-lookup endpoint.
//!
//! The favorites client is a pure request/response component: one round trip
//! per query, no caching, no state. Caching, merging, and retry policy all
//! belong to the controller.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::controller::{RemoteFavorites, TipLookup};
use crate::errors::AppError;
use crate::models::{FavoritePage, FilterDescriptor, TipSummary};

/// Client for the server-side favorites collection of an authenticated
/// identity.
#[derive(Clone)]
pub struct RemoteFavoritesClient {
    http: reqwest::Client,
    base_url: Arc<String>,
}

impl RemoteFavoritesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Arc::new(base_url.into().trim_end_matches('/').to_string()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map an HTTP status to the engine's error taxonomy.
///
/// Auth failures are a distinct, user-actionable kind so the controller can
/// prompt re-authentication instead of offering a generic retry.
fn status_error(status: StatusCode, context: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::AuthRequired(format!("{}: authentication required ({})", context, status))
        }
        _ => AppError::Server(format!("{} failed with status {}", context, status)),
    }
}

#[async_trait]
impl RemoteFavorites for RemoteFavoritesClient {
    async fn query(
        &self,
        filter: &FilterDescriptor,
        page_number: u32,
        page_size: u32,
        auth_token: &str,
    ) -> Result<FavoritePage, AppError> {
        let mut request = self
            .http
            .get(self.url("/favorites"))
            .bearer_auth(auth_token)
            .query(&[
                ("orderBy", filter.sort.order_by().as_str()),
                ("sortDirection", filter.sort.sort_direction().as_str()),
            ])
            .query(&[("pageNumber", page_number), ("pageSize", page_size)]);

        if !filter.search_query.is_empty() {
            request = request.query(&[("q", filter.search_query.as_str())]);
        }
        if let Some(category_id) = &filter.category_id {
            request = request.query(&[("categoryId", category_id.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "favorites query"));
        }

        Ok(response.json::<FavoritePage>().await?)
    }

    async fn add(&self, id: &str, auth_token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.url(&format!("/favorites/{}", id)))
            .bearer_auth(auth_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "favorite add"));
        }
        Ok(())
    }

    async fn remove(&self, id: &str, auth_token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .delete(self.url(&format!("/favorites/{}", id)))
            .bearer_auth(auth_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "favorite remove"));
        }
        Ok(())
    }
}

/// Client for the public tip-lookup endpoint used to resolve anonymous
/// favorite ids into display records.
#[derive(Clone)]
pub struct TipLookupClient {
    http: reqwest::Client,
    base_url: Arc<String>,
}

impl TipLookupClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Arc::new(base_url.into().trim_end_matches('/').to_string()),
        }
    }
}

#[async_trait]
impl TipLookup for TipLookupClient {
    async fn fetch_tip_by_id(&self, id: &str) -> Result<TipSummary, AppError> {
        let response = self
            .http
            .get(format!("{}/tips/{}", self.base_url, id))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("tip {} not found", id)));
        }
        if !status.is_success() {
            return Err(status_error(status, "tip lookup"));
        }

        Ok(response.json::<TipSummary>().await?)
    }
}
