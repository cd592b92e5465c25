//! Verify `build_*` methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names the session the client holds, the operation input, and
//! either the expected request (method, path relative to the base URL, JSON
//! body) or the expected local error. Bodies are compared as parsed JSON so
//! field order does not matter.

use cozi_core::{
    AddItemRequest, AddListRequest, ClientConfig, CoziClient, CoziError, Credentials,
    EditItemRequest, HttpMethod, HttpRequest, MarkItemRequest, RemoveItemRequest,
    ReorderListRequest,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Client carrying the case's `session`, if any.
fn client(session: &Value) -> CoziClient {
    let mut client = CoziClient::new(ClientConfig::default().with_base_url(BASE_URL)).unwrap();
    if let Some(token) = session["token"].as_str() {
        client.set_session_token(token, session["account_id"].as_str());
    }
    client
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn input<T: serde::de::DeserializeOwned>(case: &Value) -> T {
    serde_json::from_value(case["input"].clone()).unwrap()
}

fn build(client: &CoziClient, case: &Value) -> Result<HttpRequest, CoziError> {
    let operation = case["operation"].as_str().unwrap();
    match operation {
        "get_lists" => client.build_get_lists(),
        "get_list" => client.build_get_list(case["input"]["listId"].as_str().unwrap()),
        "add_list" => Ok(client.build_add_list(&input::<AddListRequest>(case))),
        "remove_list" => Ok(client.build_remove_list(case["input"]["listId"].as_str().unwrap())),
        "reorder_list" => Ok(client.build_reorder_list(&input::<ReorderListRequest>(case))),
        "add_item" => client.build_add_item(&input::<AddItemRequest>(case)),
        "edit_item" => client.build_edit_item(&input::<EditItemRequest>(case)),
        "mark_item" => client.build_mark_item(&input::<MarkItemRequest>(case)),
        "remove_item" => client.build_remove_item(&input::<RemoveItemRequest>(case)),
        other => panic!("unknown operation: {other}"),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    match &req.body {
        Some(body) => assert_eq!(body, &expected["body"], "{name}: body"),
        None => assert!(expected["body"].is_null(), "{name}: body should be None"),
    }
}

fn run_cases(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = build(&client(&case["session"]), case);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "NotAuthenticated" => {
                    assert!(matches!(err, CoziError::NotAuthenticated), "{name}: expected NotAuthenticated")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let req = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
            assert_request(name, &req, &case["expected_request"]);
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[test]
fn auth_test_vectors() {
    let raw = include_str!("../../test-vectors/auth.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let c = client(&case["session"]);
        let credentials = Credentials::new(
            case["input"]["username"].as_str().unwrap(),
            case["input"]["password"].as_str().unwrap(),
        );
        let req = c.build_authenticate(&credentials);
        assert_request(name, &req, &case["expected_request"]);
    }
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    run_cases(include_str!("../../test-vectors/lists.json"));
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[test]
fn item_test_vectors() {
    run_cases(include_str!("../../test-vectors/items.json"));
}
