use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub const PLATFORMS: [&str; 2] = ["instagram", "linkedin"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub media_url: Option<String>,
    pub platforms: Vec<String>,
    pub scheduled_time: DateTime<Utc>,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub content: String,
    pub platforms: Vec<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    pub content: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub media_url: Option<Option<String>>,
    pub platforms: Option<Vec<String>>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

fn explicit_null<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(d).map(Some)
}

#[derive(Debug, Default)]
pub struct Store {
    last_id: i64,
    posts: BTreeMap<i64, Post>,
}

pub type Db = Arc<RwLock<Store>>;

/// A failure rendered as `{"message": ...}`.
#[derive(Debug)]
pub struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "message": self.1 }))).into_response()
    }
}

pub fn app() -> Router {
    app_with_state(Db::default())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .patch(update_post)
                .put(update_post)
                .delete(delete_post),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn check_platforms(platforms: &[String]) -> Result<(), Failure> {
    if platforms.is_empty() {
        return Err(Failure(StatusCode::BAD_REQUEST, "At least one platform is required"));
    }
    if platforms.iter().any(|p| !PLATFORMS.contains(&p.as_str())) {
        return Err(Failure(StatusCode::BAD_REQUEST, "Invalid platform"));
    }
    Ok(())
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(store.posts.values().cloned().collect())
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<CreatePost>,
) -> Result<(StatusCode, Json<Post>), Failure> {
    check_platforms(&input.platforms)?;

    let mut store = db.write().await;
    store.last_id += 1;
    let post = Post {
        id: store.last_id,
        content: input.content,
        media_url: input.media_url,
        platforms: input.platforms,
        scheduled_time: input.scheduled_time,
        status: input.status.unwrap_or_else(|| "scheduled".to_string()),
    };
    store.posts.insert(post.id, post.clone());
    tracing::debug!(id = post.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_post(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Post>, Failure> {
    let store = db.read().await;
    store
        .posts
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Post not found"))
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePost>,
) -> Result<Json<Post>, Failure> {
    if let Some(platforms) = &input.platforms {
        check_platforms(platforms)?;
    }

    let mut store = db.write().await;
    let post = store
        .posts
        .get_mut(&id)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Post not found"))?;
    if let Some(content) = input.content {
        post.content = content;
    }
    if let Some(media_url) = input.media_url {
        post.media_url = media_url;
    }
    if let Some(platforms) = input.platforms {
        post.platforms = platforms;
    }
    if let Some(scheduled_time) = input.scheduled_time {
        post.scheduled_time = scheduled_time;
    }
    if let Some(status) = input.status {
        post.status = status;
    }
    Ok(Json(post.clone()))
}

async fn delete_post(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    store
        .posts
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Post not found"))
}
