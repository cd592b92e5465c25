//! In-memory stand-in for the Cozi REST surface.
//!
//! Serves the login, list and item endpoints the client talks to, seeded with
//! a single fixture account. Every request that reaches the router is recorded
//! (method, path, authorization header, JSON body) so tests can assert on
//! exactly what went over the wire.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const FIXTURE_USERNAME: &str = "a@b.com";
pub const FIXTURE_PASSWORD: &str = "pw";
pub const FIXTURE_ACCOUNT_ID: &str = "A1";
pub const FIXTURE_PERSON_ID: &str = "P1";
pub const FIXTURE_TOKEN: &str = "T1";
pub const FIXTURE_EXPIRES_IN: u64 = 3600;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub list_id: String,
    pub title: String,
    pub list_type: String,
    pub items: Vec<Item>,
    pub version: u64,
    pub notes: Option<String>,
    pub owner: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_id: String,
    pub text: String,
    pub status: String,
    pub item_type: Option<String>,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    pub owner: Option<String>,
    pub version: u64,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub account_id: String,
    pub account_person_id: String,
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Deserialize)]
pub struct CreateList {
    pub title: String,
    #[serde(rename = "type")]
    pub list_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedList {
    pub list_id: String,
}

#[derive(Deserialize)]
pub struct ReorderList {
    pub order: usize,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub text: String,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub text: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// One request as the router saw it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
struct Store {
    lists: Vec<List>,
    requests: Vec<RecordedRequest>,
}

impl Store {
    fn list(&self, list_id: &str) -> Result<&List, Rejection> {
        self.lists
            .iter()
            .find(|list| list.list_id == list_id)
            .ok_or_else(|| reject(StatusCode::NOT_FOUND, "list not found"))
    }

    fn list_mut(&mut self, list_id: &str) -> Result<&mut List, Rejection> {
        self.lists
            .iter_mut()
            .find(|list| list.list_id == list_id)
            .ok_or_else(|| reject(StatusCode::NOT_FOUND, "list not found"))
    }
}

/// Shared handle on the server's lists and request log.
#[derive(Clone, Default)]
pub struct MockState {
    store: Arc<RwLock<Store>>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.store.read().await.requests.clone()
    }

    pub async fn lists(&self) -> Vec<List> {
        self.store.read().await.lists.clone()
    }

    pub async fn seed_list(&self, list_id: &str, title: &str, list_type: &str) {
        self.store.write().await.lists.push(List {
            list_id: list_id.to_string(),
            title: title.to_string(),
            list_type: list_type.to_string(),
            items: Vec::new(),
            version: 1,
            notes: None,
            owner: None,
        });
    }

    /// Append an incomplete item to an existing list. Returns false if the list is unknown.
    pub async fn seed_item(&self, list_id: &str, item_id: &str, text: &str) -> bool {
        let mut store = self.store.write().await;
        match store.list_mut(list_id) {
            Ok(list) => {
                list.items.push(new_item(item_id.to_string(), text.to_string()));
                true
            }
            Err(_) => false,
        }
    }
}

type Rejection = (StatusCode, Json<ErrorBody>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

fn new_item(item_id: String, text: String) -> Item {
    Item {
        item_id,
        text,
        status: "incomplete".to_string(),
        item_type: None,
        due_date: None,
        notes: None,
        owner: None,
        version: 1,
    }
}

pub fn app() -> Router {
    router(MockState::new())
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/api/ext/2004/{account_id}/list/", get(list_lists))
        .route("/api/ext/2004/{account_id}/list/{list_id}", get(get_list))
        .route(
            "/api/ext/2004/{account_id}/list/{list_id}/item/",
            post(create_item),
        )
        .route(
            "/api/ext/2004/{account_id}/list/{list_id}/item/{item_id}",
            put(update_item).delete(delete_item),
        )
        .route("/lists", post(create_list))
        .route("/lists/{list_id}", delete(delete_list))
        .route("/lists/{list_id}/order", patch(reorder_list))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, MockState::new()).await
}

pub async fn serve(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

async fn record_request(
    State(state): State<MockState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let authorization = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body_json = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(&bytes).ok()
    };

    state.store.write().await.requests.push(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        authorization,
        body: body_json,
    });

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn authorize(headers: &HeaderMap) -> Result<(), Rejection> {
    let expected = format!("Bearer {FIXTURE_TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(reject(
            StatusCode::UNAUTHORIZED,
            "invalid or missing access token",
        )),
    }
}

fn authorize_account(headers: &HeaderMap, account_id: &str) -> Result<(), Rejection> {
    authorize(headers)?;
    if account_id != FIXTURE_ACCOUNT_ID {
        return Err(reject(StatusCode::FORBIDDEN, "account mismatch"));
    }
    Ok(())
}

async fn login(Json(input): Json<LoginRequest>) -> Result<Json<AuthResponse>, Rejection> {
    if input.username != FIXTURE_USERNAME || input.password != FIXTURE_PASSWORD {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "invalid username or password",
        ));
    }
    Ok(Json(AuthResponse {
        account_id: FIXTURE_ACCOUNT_ID.to_string(),
        account_person_id: FIXTURE_PERSON_ID.to_string(),
        access_token: FIXTURE_TOKEN.to_string(),
        expires_in: FIXTURE_EXPIRES_IN,
    }))
}

async fn list_lists(
    State(state): State<MockState>,
    Path(account_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<List>>, Rejection> {
    authorize_account(&headers, &account_id)?;
    Ok(Json(state.store.read().await.lists.clone()))
}

async fn get_list(
    State(state): State<MockState>,
    Path((account_id, list_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<List>, Rejection> {
    authorize_account(&headers, &account_id)?;
    let store = state.store.read().await;
    store.list(&list_id).map(|list| Json(list.clone()))
}

async fn create_list(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(input): Json<CreateList>,
) -> Result<(StatusCode, Json<CreatedList>), Rejection> {
    authorize(&headers)?;
    if input.list_type != "shopping" && input.list_type != "todo" {
        return Err(reject(StatusCode::BAD_REQUEST, "unknown list type"));
    }
    let list_id = Uuid::new_v4().to_string();
    state.store.write().await.lists.push(List {
        list_id: list_id.clone(),
        title: input.title,
        list_type: input.list_type,
        items: Vec::new(),
        version: 1,
        notes: None,
        owner: None,
    });
    Ok((StatusCode::CREATED, Json(CreatedList { list_id })))
}

async fn delete_list(
    State(state): State<MockState>,
    Path(list_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, Rejection> {
    authorize(&headers)?;
    let mut store = state.store.write().await;
    let index = store
        .lists
        .iter()
        .position(|list| list.list_id == list_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "list not found"))?;
    store.lists.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder_list(
    State(state): State<MockState>,
    Path(list_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<ReorderList>,
) -> Result<StatusCode, Rejection> {
    authorize(&headers)?;
    let mut store = state.store.write().await;
    let index = store
        .lists
        .iter()
        .position(|list| list.list_id == list_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "list not found"))?;
    let list = store.lists.remove(index);
    let target = input.order.min(store.lists.len());
    store.lists.insert(target, list);
    Ok(StatusCode::NO_CONTENT)
}

async fn create_item(
    State(state): State<MockState>,
    Path((account_id, list_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<CreateItem>,
) -> Result<(StatusCode, Json<Item>), Rejection> {
    authorize_account(&headers, &account_id)?;
    let mut store = state.store.write().await;
    let list = store.list_mut(&list_id)?;
    let item = new_item(Uuid::new_v4().to_string(), input.text);
    list.items.push(item.clone());
    list.version += 1;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<MockState>,
    Path((account_id, list_id, item_id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(input): Json<UpdateItem>,
) -> Result<Json<Item>, Rejection> {
    authorize_account(&headers, &account_id)?;
    if let Some(status) = &input.status {
        if status != "complete" && status != "incomplete" {
            return Err(reject(StatusCode::BAD_REQUEST, "unknown item status"));
        }
    }
    let mut store = state.store.write().await;
    let list = store.list_mut(&list_id)?;
    list.version += 1;
    let item = list
        .items
        .iter_mut()
        .find(|item| item.item_id == item_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "item not found"))?;
    if let Some(text) = input.text {
        item.text = text;
    }
    if let Some(status) = input.status {
        item.status = status;
    }
    item.version += 1;
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(state): State<MockState>,
    Path((account_id, list_id, item_id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, Rejection> {
    authorize_account(&headers, &account_id)?;
    let mut store = state.store.write().await;
    let list = store.list_mut(&list_id)?;
    let index = list
        .items
        .iter()
        .position(|item| item.item_id == item_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "item not found"))?;
    list.items.remove(index);
    list.version += 1;
    Ok(StatusCode::NO_CONTENT)
}
