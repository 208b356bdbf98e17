//! Client core for the post scheduling API.
//!
//! # Overview
//! Two layers:
//! - the contract: post DTOs (`types`) and the route table (`routes`), with
//!   a stateless request builder / response parser (`PostClient`) that never
//!   touches the network;
//! - the data-access layer: `PostStore`, which executes requests through a
//!   `Transport`, caches reads in a `QueryCache`, invalidates on successful
//!   mutations and reports outcomes through a `Notifier`.
//!
//! # Design
//! - `PostClient` is stateless; it holds only `base_url`.
//! - Cache keys are explicit (`QueryKey`), and each mutation declares the
//!   keys it invalidates.
//! - Deleting requires a `DeleteConfirmation`, obtained from a `Confirm`
//!   prompt, instead of an inline dialog.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cache;
pub mod client;
pub mod config;
pub mod confirm;
pub mod draft;
pub mod error;
pub mod http;
pub mod mutation;
pub mod notify;
pub mod routes;
pub mod store;
pub mod transport;
pub mod types;
pub mod views;

pub use cache::{CachedData, Generation, QueryCache, QueryKey};
pub use client::PostClient;
pub use config::{ClientConfig, ConfigError};
pub use confirm::{Confirm, DeleteConfirmation, DeleteRequest};
pub use draft::PostDraft;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mutation::{MutationKind, MutationState};
pub use notify::{ChannelNotifier, Notification, Notifier, TracingNotifier, Variant};
pub use routes::{api, build_url, Route};
pub use store::PostStore;
pub use transport::{ReqwestTransport, Transport};
pub use types::{InsertPost, Post, PostStatus, UpdatePost};
pub use views::{CalendarMonth, StatusCounts};

/// A `PostStore` wired from `ClientConfig` with the reqwest transport.
pub fn connect<N: Notifier>(config: &ClientConfig, notifier: N) -> Result<PostStore<ReqwestTransport, N>, ApiError> {
    let transport = ReqwestTransport::new(config.timeout)?;
    Ok(PostStore::new(
        PostClient::new(&config.base_url),
        transport,
        notifier,
        QueryCache::new(config.stale_after),
    ))
}
