//! Authenticated async client for the Cozi list API.
//!
//! # Design
//! `CoziClient` owns a `reqwest::Client` configured with the user agent, JSON
//! content type and timeout, plus the session (token and account id). Each
//! operation is split into a pure `build_*` method that produces an
//! `HttpRequest` and an async method that sends it. All sends route through
//! one helper that attaches `Authorization: Bearer <token>` when a non-empty
//! token is held and normalizes any failure into `ApiError`.
//!
//! An empty token or account id counts as absent.
//!
//! Account-scoped operations (`get_lists`, `get_list` and the item calls)
//! refuse to build a request without a stored account id. `add_list`,
//! `remove_list` and `reorder_list` do not check it; their endpoints are not
//! account-scoped.
//!
//! Session mutation (`authenticate`, `set_session_token`, `resume`) takes
//! `&mut self`, so callers sharing a client must serialize those calls.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, CoziError};
use crate::http::{HttpMethod, HttpRequest};
use crate::session::{AuthResponse, Credentials, Session, SessionState};
use crate::types::{
    AddItemRequest, AddListRequest, CoziList, CreatedList, EditItemRequest, ItemStatus,
    MarkItemRequest, RemoveItemRequest, ReorderListRequest,
};

#[derive(Debug, Clone)]
pub struct CoziClient {
    http: reqwest::Client,
    base_url: String,
    debug: bool,
    session: SessionState,
}

impl CoziClient {
    /// Build a client from `config`. Fails only if the user agent is not a
    /// valid header value or the TLS backend cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, CoziError> {
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| CoziError::Config(format!("invalid user agent: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CoziError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            debug: config.debug,
            session: SessionState::default(),
        })
    }

    /// Use a previously obtained token without logging in.
    ///
    /// A missing or empty `account_id` leaves the stored one in place. Nothing
    /// is validated; a bad token shows up as a 401 on the next call.
    pub fn set_session_token(&mut self, token: impl Into<String>, account_id: Option<&str>) {
        let account_id = account_id.filter(|id| !id.is_empty()).map(str::to_string);
        self.session.assign(token.into(), account_id);
        if self.debug {
            debug!(
                operation = "set_session_token",
                account_id = self.session.account_id.as_deref().unwrap_or("<none>"),
                "session token set"
            );
        }
    }

    /// Restore a stored session. Expiry is not checked.
    pub fn resume(&mut self, session: &Session) {
        self.set_session_token(session.access_token.clone(), Some(&session.account_id));
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_authenticate(&self, credentials: &Credentials) -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, format!("{}/auth/login", self.base_url)).with_body(
            json!({ "username": credentials.username, "password": credentials.password }),
        )
    }

    pub fn build_get_lists(&self) -> Result<HttpRequest, CoziError> {
        Ok(HttpRequest::new(HttpMethod::Get, self.account_lists_url()?))
    }

    pub fn build_get_list(&self, list_id: &str) -> Result<HttpRequest, CoziError> {
        let url = format!("{}{list_id}", self.account_lists_url()?);
        Ok(HttpRequest::new(HttpMethod::Get, url))
    }

    pub fn build_add_list(&self, request: &AddListRequest) -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, format!("{}/lists", self.base_url))
            .with_body(json!({ "title": request.title, "type": request.list_type }))
    }

    pub fn build_remove_list(&self, list_id: &str) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Delete,
            format!("{}/lists/{list_id}", self.base_url),
        )
    }

    pub fn build_reorder_list(&self, request: &ReorderListRequest) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Patch,
            format!("{}/lists/{}/order", self.base_url, request.list_id),
        )
        .with_body(json!({ "order": request.new_order }))
    }

    pub fn build_add_item(&self, request: &AddItemRequest) -> Result<HttpRequest, CoziError> {
        let url = format!("{}{}/item/", self.account_lists_url()?, request.list_id);
        Ok(HttpRequest::new(HttpMethod::Post, url).with_body(json!({ "text": request.text })))
    }

    pub fn build_edit_item(&self, request: &EditItemRequest) -> Result<HttpRequest, CoziError> {
        let url = self.item_url(&request.list_id, &request.item_id)?;
        Ok(HttpRequest::new(HttpMethod::Put, url).with_body(json!({ "text": request.text })))
    }

    pub fn build_mark_item(&self, request: &MarkItemRequest) -> Result<HttpRequest, CoziError> {
        let url = self.item_url(&request.list_id, &request.item_id)?;
        let status = ItemStatus::from(request.completed);
        Ok(HttpRequest::new(HttpMethod::Put, url).with_body(json!({ "status": status })))
    }

    pub fn build_remove_item(&self, request: &RemoveItemRequest) -> Result<HttpRequest, CoziError> {
        let url = self.item_url(&request.list_id, &request.item_id)?;
        Ok(HttpRequest::new(HttpMethod::Delete, url))
    }

    /// `{base}/api/ext/2004/{accountId}/list/`, or `NotAuthenticated`.
    fn account_lists_url(&self) -> Result<String, CoziError> {
        let account_id = self
            .session
            .account_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(CoziError::NotAuthenticated)?;
        Ok(format!("{}/api/ext/2004/{account_id}/list/", self.base_url))
    }

    fn item_url(&self, list_id: &str, item_id: &str) -> Result<String, CoziError> {
        Ok(format!("{}{list_id}/item/{item_id}", self.account_lists_url()?))
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Log in and keep the returned token and account id.
    ///
    /// On failure the stored session is left exactly as it was.
    pub async fn authenticate(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, CoziError> {
        let request = self.build_authenticate(&Credentials::new(username, password));
        if self.debug {
            debug!(operation = "authenticate", "authenticating");
        }

        let result = self.send_json::<AuthResponse>(request).await;
        let auth = self.finish("authenticate", result)?;

        self.session
            .assign(auth.access_token.clone(), Some(auth.account_id.clone()));
        if self.debug {
            debug!(
                operation = "authenticate",
                account_id = %auth.account_id,
                expires_in = auth.expires_in,
                "authentication successful"
            );
        }
        Ok(auth)
    }

    /// Every list on the account, in server order.
    pub async fn get_lists(&self) -> Result<Vec<CoziList>, CoziError> {
        let request = self.build_get_lists()?;
        if self.debug {
            debug!(operation = "get_lists", "fetching lists");
        }

        let result = self.send_json::<Vec<CoziList>>(request).await;
        let lists = self.finish("get_lists", result)?;
        if self.debug {
            debug!(operation = "get_lists", count = lists.len(), "fetched lists");
        }
        Ok(lists)
    }

    pub async fn get_list(&self, list_id: &str) -> Result<CoziList, CoziError> {
        let request = self.build_get_list(list_id)?;
        if self.debug {
            debug!(operation = "get_list", list_id, "fetching list");
        }

        let result = self.send_json::<CoziList>(request).await;
        let list = self.finish("get_list", result)?;
        if self.debug {
            debug!(
                operation = "get_list",
                list_id,
                title = %list.title,
                count = list.items.len(),
                "fetched list"
            );
        }
        Ok(list)
    }

    /// Create a list and return only its id; fetch it with `get_list`.
    pub async fn add_list(&self, request: &AddListRequest) -> Result<String, CoziError> {
        let http_request = self.build_add_list(request);
        if self.debug {
            debug!(
                operation = "add_list",
                title = %request.title,
                list_type = request.list_type.as_str(),
                "adding list"
            );
        }

        let result = self.send_json::<CreatedList>(http_request).await;
        let created = self.finish("add_list", result)?;
        if self.debug {
            debug!(operation = "add_list", list_id = %created.list_id, "created list");
        }
        Ok(created.list_id)
    }

    pub async fn remove_list(&self, list_id: &str) -> Result<(), CoziError> {
        let request = self.build_remove_list(list_id);
        if self.debug {
            debug!(operation = "remove_list", list_id, "removing list");
        }

        let result = self.send(request).await.map(drop);
        self.finish("remove_list", result)?;
        if self.debug {
            debug!(operation = "remove_list", list_id, "list removed");
        }
        Ok(())
    }

    /// Ask the server to move a list; the resulting order is whatever it decides.
    pub async fn reorder_list(&self, request: &ReorderListRequest) -> Result<(), CoziError> {
        let http_request = self.build_reorder_list(request);
        if self.debug {
            debug!(
                operation = "reorder_list",
                list_id = %request.list_id,
                order = request.new_order,
                "reordering list"
            );
        }

        let result = self.send(http_request).await.map(drop);
        self.finish("reorder_list", result)?;
        if self.debug {
            debug!(operation = "reorder_list", list_id = %request.list_id, "list reordered");
        }
        Ok(())
    }

    /// Append an item. The new item's id is not returned; re-fetch the list.
    pub async fn add_item(&self, request: &AddItemRequest) -> Result<(), CoziError> {
        let http_request = self.build_add_item(request)?;
        if self.debug {
            debug!(operation = "add_item", list_id = %request.list_id, "adding item");
        }

        let result = self.send(http_request).await.map(drop);
        self.finish("add_item", result)?;
        if self.debug {
            debug!(operation = "add_item", list_id = %request.list_id, "item added");
        }
        Ok(())
    }

    pub async fn edit_item(&self, request: &EditItemRequest) -> Result<(), CoziError> {
        let http_request = self.build_edit_item(request)?;
        if self.debug {
            debug!(
                operation = "edit_item",
                list_id = %request.list_id,
                item_id = %request.item_id,
                "editing item"
            );
        }

        let result = self.send(http_request).await.map(drop);
        self.finish("edit_item", result)?;
        if self.debug {
            debug!(operation = "edit_item", item_id = %request.item_id, "item edited");
        }
        Ok(())
    }

    pub async fn mark_item(&self, request: &MarkItemRequest) -> Result<(), CoziError> {
        let http_request = self.build_mark_item(request)?;
        let status = ItemStatus::from(request.completed).as_str();
        if self.debug {
            debug!(
                operation = "mark_item",
                list_id = %request.list_id,
                item_id = %request.item_id,
                status,
                "marking item"
            );
        }

        let result = self.send(http_request).await.map(drop);
        self.finish("mark_item", result)?;
        if self.debug {
            debug!(operation = "mark_item", item_id = %request.item_id, status, "item marked");
        }
        Ok(())
    }

    pub async fn remove_item(&self, request: &RemoveItemRequest) -> Result<(), CoziError> {
        let http_request = self.build_remove_item(request)?;
        if self.debug {
            debug!(
                operation = "remove_item",
                list_id = %request.list_id,
                item_id = %request.item_id,
                "removing item"
            );
        }

        let result = self.send(http_request).await.map(drop);
        self.finish("remove_item", result)?;
        if self.debug {
            debug!(operation = "remove_item", item_id = %request.item_id, "item removed");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Send `request` and return the response body text.
    async fn send(&self, request: HttpRequest) -> Result<String, ApiError> {
        let mut builder = self
            .http
            .request(request.method.to_reqwest(), request.url.as_str());
        if let Some(token) = self.session.token.as_deref().filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        if let Some(error) = response.error_for_status_ref().err() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(&error, body));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(&e))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::undecodable(&e, body))
    }

    fn finish<T>(&self, operation: &'static str, result: Result<T, ApiError>) -> Result<T, CoziError> {
        result.map_err(|error| {
            if self.debug {
                warn!(
                    operation,
                    code = %error.code,
                    error = %error.message,
                    "request failed"
                );
            }
            CoziError::Api(error)
        })
    }
}
