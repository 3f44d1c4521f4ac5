//! In-process fake of the Stride REST backend.
//!
//! Only the routes the integration tests touch are served. State is plain
//! JSON so responses look like what the real backend sends (camelCase,
//! naive timestamps, sparse optional fields).

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Default)]
pub struct Backend {
    next_id: i64,
    pub users: Vec<Value>,
    pub posts: Vec<Value>,
    pub messages: Vec<Value>,
    pub challenges: Vec<Value>,
    pub user_challenges: Vec<Value>,
    pub groups: Vec<Value>,
    pub workout: HashMap<i64, Value>,
    pub fail_likes: bool,
    /// Authorization headers seen, in request order.
    pub auth_headers: Vec<Option<String>>,
}

pub type Shared = Arc<Mutex<Backend>>;

impl Backend {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_user(&mut self, id: i64, username: &str) {
        self.next_id = self.next_id.max(id);
        self.users.push(json!({
            "id": id,
            "username": username,
            "name": username.to_uppercase(),
            "profilePicture": format!("avatars/{username}.png"),
            "lastMeasurementUpdate": "2024-01-01T08:00:00"
        }));
    }

    pub fn add_post(&mut self, author: i64, description: &str, likes: i64) -> i64 {
        let id = self.id();
        let user = self.summary(author);
        self.posts.insert(
            0,
            json!({
                "id": id,
                "author": user,
                "description": description,
                "photoUrl": null,
                "publicationDate": "2024-05-01T10:00:00",
                "likeCount": likes,
                "commentCount": 0,
                "isLiked": false,
                "comments": [],
                "originalPost": null
            }),
        );
        id
    }

    pub fn add_challenge(&mut self, title: &str, target: i64) -> i64 {
        let id = self.id();
        self.challenges.push(json!({
            "id": id,
            "title": title,
            "description": "",
            "category": "running",
            "duration": "30 dias",
            "totalTarget": target,
            "reward": "",
            "participantsCount": 0
        }));
        id
    }

    pub fn add_group(&mut self, name: &str, category: &str, members: u32) -> i64 {
        let id = self.id();
        self.groups.push(json!({
            "id": id,
            "name": name,
            "description": "",
            "category": category,
            "membersCount": members,
            "member": false
        }));
        id
    }

    fn summary(&self, user: i64) -> Value {
        self.users
            .iter()
            .find(|u| u["id"] == user)
            .map(|u| {
                json!({
                    "id": u["id"],
                    "username": u["username"],
                    "name": u["name"],
                    "profilePicture": u["profilePicture"]
                })
            })
            .unwrap_or_else(|| json!({ "id": user }))
    }

    fn post_index(&self, id: i64) -> Option<usize> {
        self.posts.iter().position(|p| p["id"] == id)
    }
}

fn record(state: &Shared, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().auth_headers.push(auth);
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
}

// ---------------------------------------------------------------------------
// Auth & users
// ---------------------------------------------------------------------------

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let backend = state.lock().unwrap();
    let user = backend
        .users
        .iter()
        .find(|u| u["username"] == body["username"])
        .cloned();
    match user {
        Some(user) if body["password"] == "secret" => {
            Json(json!({ "token": format!("token-{}", user["id"]), "user": user })).into_response()
        }
        _ => (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response(),
    }
}

async fn user(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let backend = state.lock().unwrap();
    match backend.users.iter().find(|u| u["id"] == id) {
        Some(u) => Json(u.clone()).into_response(),
        None => not_found("user"),
    }
}

async fn search_users(
    State(state): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    let needle = q.get("query").cloned().unwrap_or_default().to_lowercase();
    let backend = state.lock().unwrap();
    let hits: Vec<Value> = backend
        .users
        .iter()
        .filter(|u| {
            u["username"]
                .as_str()
                .map(|n| n.contains(&needle))
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    Json(Value::Array(hits))
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

async fn list_posts(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    record(&state, &headers);
    Json(Value::Array(state.lock().unwrap().posts.clone()))
}

async fn create_post(
    State(state): State<Shared>,
    Path(author): Path<i64>,
    mut form: Multipart,
) -> Response {
    let mut description = String::new();
    let mut image = None;
    while let Ok(Some(field)) = form.next_field().await {
        match field.name() {
            Some("description") => description = field.text().await.unwrap_or_default(),
            Some("imageFile") => image = field.file_name().map(|f| format!("posts/{f}")),
            _ => {}
        }
    }
    let mut backend = state.lock().unwrap();
    backend.add_post(author, &description, 0);
    if let Some(image) = image {
        backend.posts[0]["photoUrl"] = json!(image);
    }
    Json(backend.posts[0].clone()).into_response()
}

async fn like_post(
    State(state): State<Shared>,
    Path(id): Path<i64>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.fail_likes {
        return (StatusCode::INTERNAL_SERVER_ERROR, "like failed").into_response();
    }
    let Some(i) = backend.post_index(id) else {
        return not_found("post");
    };
    let post = &mut backend.posts[i];
    let liked = !post["isLiked"].as_bool().unwrap_or(false);
    let likes = post["likeCount"].as_i64().unwrap_or(0) + if liked { 1 } else { -1 };
    post["isLiked"] = json!(liked);
    post["likeCount"] = json!(likes);
    StatusCode::OK.into_response()
}

async fn comment_post(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Query(q): Query<HashMap<String, String>>,
    text: String,
) -> Response {
    let mut backend = state.lock().unwrap();
    let Some(i) = backend.post_index(id) else {
        return not_found("post");
    };
    let user_id: i64 = q.get("userId").and_then(|v| v.parse().ok()).unwrap_or(0);
    let comment = json!({
        "id": backend.id(),
        "text": text.trim(),
        "timestamp": "2024-05-01T11:00:00",
        "author": backend.summary(user_id)
    });
    if let Some(list) = backend.posts[i]["comments"].as_array_mut() {
        list.push(comment.clone());
    }
    let count = backend.posts[i]["commentCount"].as_i64().unwrap_or(0) + 1;
    backend.posts[i]["commentCount"] = json!(count);
    Json(comment).into_response()
}

async fn delete_post(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let Some(i) = backend.post_index(id) else {
        return not_found("post");
    };
    let caller: i64 = q.get("userId").and_then(|v| v.parse().ok()).unwrap_or(0);
    if backend.posts[i]["author"]["id"] != caller {
        return (StatusCode::FORBIDDEN, "Not your post").into_response();
    }
    backend.posts.remove(i);
    (StatusCode::OK, "Post deleted").into_response()
}

async fn repost(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Query(q): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let mut backend = state.lock().unwrap();
    let Some(i) = backend.post_index(id) else {
        return not_found("post");
    };
    let original = backend.posts[i].clone();
    let quote = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["content"].as_str().map(str::to_string));
    let user_id: i64 = q.get("userId").and_then(|v| v.parse().ok()).unwrap_or(0);
    let new_id = backend.id();
    let post = json!({
        "id": new_id,
        "description": quote,
        "photoUrl": null,
        "publicationDate": "2024-05-01T12:00:00",
        "author": backend.summary(user_id),
        "likeCount": 0,
        "commentCount": 0,
        "isLiked": false,
        "comments": [],
        "originalPost": original
    });
    backend.posts.insert(0, post.clone());
    Json(post).into_response()
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

async fn conversation(
    State(state): State<Shared>,
    Path((a, b)): Path<(i64, i64)>,
) -> Json<Value> {
    let backend = state.lock().unwrap();
    let list: Vec<Value> = backend
        .messages
        .iter()
        .filter(|m| {
            (m["senderId"] == a && m["receiverId"] == b) || (m["senderId"] == b && m["receiverId"] == a)
        })
        .cloned()
        .collect();
    Json(Value::Array(list))
}

async fn send_message(State(state): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    let mut backend = state.lock().unwrap();
    let id = backend.id();
    backend.messages.push(json!({
        "id": id,
        "senderId": body["senderId"],
        "receiverId": body["receiverId"],
        "content": body["content"],
        "timestamp": "2024-05-01T13:00:00"
    }));
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Challenges
// ---------------------------------------------------------------------------

async fn list_challenges(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().challenges.clone()))
}

/// Binds only the fields the challenge record has; anything else is dropped.
async fn create_challenge(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut backend = state.lock().unwrap();
    let id = backend.id();
    let challenge = json!({
        "id": id,
        "title": body["title"],
        "description": body["description"],
        "category": body["category"],
        "duration": body["duration"],
        "totalTarget": body["totalTarget"],
        "reward": body["reward"],
        "participantsCount": 0
    });
    backend.challenges.push(challenge.clone());
    Json(challenge)
}

async fn user_challenges(State(state): State<Shared>, Path(user): Path<i64>) -> Json<Value> {
    let backend = state.lock().unwrap();
    let list: Vec<Value> = backend
        .user_challenges
        .iter()
        .filter(|uc| uc["userId"] == user)
        .cloned()
        .collect();
    Json(Value::Array(list))
}

async fn accept_challenge(
    State(state): State<Shared>,
    Path((id, user)): Path<(i64, i64)>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let Some(challenge) = backend.challenges.iter().find(|c| c["id"] == id).cloned() else {
        return not_found("challenge");
    };
    let uc = json!({
        "id": backend.id(),
        "userId": user,
        "challenge": challenge,
        "status": "active",
        "progress": 0
    });
    backend.user_challenges.push(uc.clone());
    Json(uc).into_response()
}

/// Completion is decided here; progress is allowed to overshoot the target.
async fn update_progress(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let Some(uc) = backend.user_challenges.iter_mut().find(|uc| uc["id"] == id) else {
        return not_found("user challenge");
    };
    let progress = uc["progress"].as_f64().unwrap_or(0.0) + body["increment"].as_f64().unwrap_or(0.0);
    let target = uc["challenge"]["totalTarget"].as_f64().unwrap_or(0.0);
    uc["progress"] = json!(progress);
    if progress >= target {
        uc["status"] = json!("completed");
    }
    Json(uc.clone()).into_response()
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

async fn list_groups(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().groups.clone()))
}

async fn toggle_member(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut backend = state.lock().unwrap();
    let Some(group) = backend.groups.iter_mut().find(|g| g["id"] == id) else {
        return not_found("group");
    };
    let member = !group["member"].as_bool().unwrap_or(false);
    let count = group["membersCount"].as_i64().unwrap_or(0) + if member { 1 } else { -1 };
    group["member"] = json!(member);
    group["membersCount"] = json!(count);
    Json(group.clone()).into_response()
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

async fn get_workout(State(state): State<Shared>, Path(user): Path<i64>) -> Response {
    match state.lock().unwrap().workout.get(&user) {
        Some(blob) => Json(blob.clone()).into_response(),
        None => StatusCode::OK.into_response(),
    }
}

async fn put_workout(
    State(state): State<Shared>,
    Path(user): Path<i64>,
    Json(blob): Json<Value>,
) -> StatusCode {
    state.lock().unwrap().workout.insert(user, blob);
    StatusCode::OK
}

pub fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/api/users/search", get(search_users))
        .route("/api/users/:id", get(user))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/user/:id", post(create_post))
        .route("/api/posts/:id", axum::routing::delete(delete_post))
        .route("/api/posts/:id/like", post(like_post))
        .route("/api/posts/:id/comments", post(comment_post))
        .route("/api/posts/:id/repost", post(repost))
        .route("/api/messages", post(send_message))
        .route("/api/messages/:a/:b", get(conversation))
        .route("/api/challenges", get(list_challenges).post(create_challenge))
        .route("/api/challenges/user/:id", get(user_challenges))
        .route("/api/challenges/:id/accept/:user", post(accept_challenge))
        .route("/api/challenges/:id/progress", put(update_progress))
        .route("/api/groups", get(list_groups))
        .route("/api/groups/:id/toggle-member", post(toggle_member))
        .route("/api/workout/:id", get(get_workout).put(put_workout))
        .with_state(state)
}

/// Serve `state` on an ephemeral port and return the base URL.
pub async fn spawn(state: Shared) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Backend with two users (1 = mia, 2 = bo) and one post by bo.
pub fn seeded() -> Shared {
    let mut backend = Backend::default();
    backend.add_user(1, "mia");
    backend.add_user(2, "bo");
    backend.add_post(2, "long run today", 5);
    Arc::new(Mutex::new(backend))
}
