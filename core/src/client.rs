//! Stateless HTTP request builder and response parser for the post API.
//!
//! # Design
//! `PostClient` holds only a `base_url` and carries no mutable state between
//! calls. Each CRUD operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Both halves go through the route table in `routes::api::posts`.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::routes::api::posts;
use crate::routes::Route;
use crate::types::{InsertPost, Post, UpdatePost};

/// Synchronous, stateless client for the post API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct PostClient {
    base_url: String,
}

impl PostClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_posts(&self) -> Result<HttpRequest, ApiError> {
        self.request(&posts::LIST, &[], None)
    }

    pub fn build_get_post(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.request(&posts::GET, &[("id", &id)], None)
    }

    pub fn build_create_post(&self, input: &InsertPost) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.request(&posts::CREATE, &[], Some(body))
    }

    /// The id addresses the resource; it never appears in the body.
    pub fn build_update_post(&self, id: i64, changes: &UpdatePost) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(changes).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.request(&posts::UPDATE, &[("id", &id)], Some(body))
    }

    pub fn build_delete_post(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.request(&posts::DELETE, &[("id", &id)], None)
    }

    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        posts::LIST.parse(&response)
    }

    /// A 404 means the post does not exist and yields `Ok(None)`.
    pub fn parse_get_post(&self, response: HttpResponse) -> Result<Option<Post>, ApiError> {
        if response.status == 404 {
            return Ok(None);
        }
        posts::GET.parse(&response).map(Some)
    }

    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        posts::CREATE.parse(&response)
    }

    pub fn parse_update_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        posts::UPDATE.parse(&response)
    }

    pub fn parse_delete_post(&self, response: HttpResponse) -> Result<(), ApiError> {
        posts::DELETE.parse(&response).map(|_| ())
    }

    fn request<S: crate::routes::Schema>(
        &self,
        route: &Route<S>,
        params: &[(&str, &dyn std::fmt::Display)],
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        let headers = if body.is_some() {
            vec![("content-type".to_string(), "application/json".to_string())]
        } else {
            Vec::new()
        };
        Ok(HttpRequest {
            method: route.method,
            path: route.url(&self.base_url, params)?,
            headers,
            body,
            credentials: true,
        })
    }
}
