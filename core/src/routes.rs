//! Route table for the post API.
//!
//! # Design
//! Each endpoint is a `Route<S>` descriptor: method, path template, the
//! status codes whose body must validate against schema `S`, and how a
//! failure message is derived. `PostClient` consumes every route through the
//! same `url` / `parse` pair, so adding an endpoint needs a new constant and
//! no new parsing code.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse};
use crate::types::Post;

/// A response body shape that a route validates against.
pub trait Schema: Sized {
    fn parse(route: &'static str, body: &str) -> Result<Self, ApiError>;
}

impl Schema for Post {
    fn parse(route: &'static str, body: &str) -> Result<Self, ApiError> {
        parse_json(route, body)
    }
}

impl Schema for Vec<Post> {
    fn parse(route: &'static str, body: &str) -> Result<Self, ApiError> {
        parse_json(route, body)
    }
}

/// Schema for endpoints whose body carries nothing the client needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoContent;

impl Schema for NoContent {
    fn parse(_route: &'static str, _body: &str) -> Result<Self, ApiError> {
        Ok(NoContent)
    }
}

fn parse_json<T: DeserializeOwned>(route: &'static str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Validation {
        route,
        reason: e.to_string(),
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Pull a non-empty `message` string out of a JSON error body.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}

/// Descriptor for one endpoint of the contract.
pub struct Route<S> {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    /// Expected success codes; each one's body is validated by `S`.
    pub responses: &'static [u16],
    /// Message used when a failure carries no usable `message`.
    pub fallback: &'static str,
    /// Whether a failure's body is consulted for a `message` field.
    pub message_from_body: bool,
    schema: PhantomData<fn() -> S>,
}

impl<S> Clone for Route<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Route<S> {}

impl<S> fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("responses", &self.responses)
            .finish()
    }
}

impl<S: Schema> Route<S> {
    pub const fn new(
        name: &'static str,
        method: HttpMethod,
        path: &'static str,
        responses: &'static [u16],
        fallback: &'static str,
        message_from_body: bool,
    ) -> Self {
        Self {
            name,
            method,
            path,
            responses,
            fallback,
            message_from_body,
            schema: PhantomData,
        }
    }

    /// Absolute URL for this route under `base_url`.
    pub fn url(&self, base_url: &str, params: &[(&str, &dyn fmt::Display)]) -> Result<String, ApiError> {
        Ok(format!("{base_url}{}", build_url(self.path, params)?))
    }

    /// Validate a response: any 2xx is parsed with `S`, anything else is a
    /// `Request` failure.
    pub fn parse(&self, response: &HttpResponse) -> Result<S, ApiError> {
        if !response.is_success() {
            return Err(self.failure(response));
        }
        if !self.responses.contains(&response.status) {
            tracing::warn!(
                route = self.name,
                status = response.status,
                expected = ?self.responses,
                "undeclared success status"
            );
        }
        S::parse(self.name, &response.body)
    }

    pub fn failure(&self, response: &HttpResponse) -> ApiError {
        let message = if self.message_from_body {
            error_message(&response.body)
        } else {
            None
        };
        ApiError::Request {
            status: response.status,
            message: message.unwrap_or_else(|| self.fallback.to_string()),
        }
    }
}

/// Substitute `:name` placeholders in `template`. A placeholder without a
/// value, or whose value renders empty, is an error rather than a hole in
/// the URL.
pub fn build_url(template: &str, params: &[(&str, &dyn fmt::Display)]) -> Result<String, ApiError> {
    template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::MissingParam(name.to_string())),
            None => Ok(segment.to_string()),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|segments| segments.join("/"))
}

pub mod api {
    pub mod posts {
        use crate::http::HttpMethod;
        use crate::routes::{NoContent, Route};
        use crate::types::Post;

        pub const LIST: Route<Vec<Post>> =
            Route::new("list", HttpMethod::Get, "/posts", &[200], "Failed to fetch posts", false);

        pub const GET: Route<Post> =
            Route::new("get", HttpMethod::Get, "/posts/:id", &[200], "Failed to fetch post", false);

        pub const CREATE: Route<Post> =
            Route::new("create", HttpMethod::Post, "/posts", &[201], "Failed to create post", true);

        pub const UPDATE: Route<Post> =
            Route::new("update", HttpMethod::Patch, "/posts/:id", &[200], "Failed to update post", true);

        pub const DELETE: Route<NoContent> = Route::new(
            "delete",
            HttpMethod::Delete,
            "/posts/:id",
            &[204, 200],
            "Failed to delete post",
            false,
        );
    }
}
