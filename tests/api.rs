use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use inventory_api::extractors::TENANT_ID_HEADER;
use inventory_api::{app, AppState, Repositories};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn router() -> Router {
    app(AppState::new(Repositories::memory()), 10240)
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, tenant: Option<Uuid>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(t) = tenant {
        builder = builder.header(TENANT_ID_HEADER, t.to_string());
    }
    let body = if body.is_null() { String::new() } else { body.to_string() };
    builder.body(Body::from(body)).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, tenant: Uuid, body: Value) -> Response {
    app.clone()
        .oneshot(json_request(method, uri, Some(tenant), &body))
        .await
        .unwrap()
}

async fn create(app: &Router, tenant: Uuid, resource: &str, body: Value) -> Value {
    let resp = send(app, "POST", &format!("/v1/{}", resource), tenant, body).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

fn id_of(v: &Value) -> String {
    v["id"].as_str().unwrap().to_string()
}

fn ids(list: &Value) -> Vec<String> {
    list["data"].as_array().unwrap().iter().map(id_of).collect()
}

// --- create / retrieve ---

#[tokio::test]
async fn create_group_returns_201() {
    let app = router();
    let tenant = Uuid::new_v4();
    let group = create(&app, tenant, "groups", json!({ "name": "Tools", "description": "Hand tools" })).await;
    assert_eq!(group["name"], "Tools");
    assert_eq!(group["description"], "Hand tools");
    assert!(group["parent_group"].is_null());
    assert!(group["created_at"].is_string());
    assert!(group.get("updated_at").is_none());
}

#[tokio::test]
async fn missing_required_field_yields_one_error() {
    let app = router();
    let resp = send(&app, "POST", "/v1/groups", Uuid::new_v4(), json!({ "description": "no name" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["code"], "parameter_missing");
    assert_eq!(errors[0]["param"], "name");
    assert_eq!(errors[0]["type"], "invalid_request_error");
    assert_eq!(errors[0]["message"], "Missing required param: 'name'.");
}

#[tokio::test]
async fn every_violation_is_reported() {
    let app = router();
    let body = json!({ "name": "x".repeat(65), "description": "y".repeat(1025), "expand": ["owner"] });
    let resp = send(&app, "POST", "/v1/groups", Uuid::new_v4(), body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let params: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["param"].as_str().unwrap())
        .collect();
    assert_eq!(params, vec!["description", "name", "expand[0]"]);
}

#[tokio::test]
async fn expand_returns_nested_parent() {
    let app = router();
    let tenant = Uuid::new_v4();
    let parent = create(&app, tenant, "groups", json!({ "name": "Hardware" })).await;
    let child = create(
        &app,
        tenant,
        "groups",
        json!({ "name": "Screws", "parent_group": id_of(&parent), "expand": ["parent_group"] }),
    )
    .await;
    assert_eq!(child["parent_group"]["id"], parent["id"]);
    assert_eq!(child["parent_group"]["name"], "Hardware");

    let resp = send(&app, "GET", &format!("/v1/groups/{}", id_of(&child)), tenant, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let plain = body_json(resp).await;
    assert_eq!(plain["parent_group"], parent["id"]);
}

#[tokio::test]
async fn expanding_dangling_reference_is_not_found() {
    let app = router();
    let tenant = Uuid::new_v4();
    let missing = Uuid::new_v4();
    let resp = send(
        &app,
        "POST",
        "/v1/groups",
        tenant,
        json!({ "name": "Orphan", "parent_group": missing, "expand": ["parent_group"] }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], format!("No such group: '{}'", missing));
}

#[tokio::test]
async fn other_tenant_sees_not_found() {
    let app = router();
    let owner = Uuid::new_v4();
    let group = create(&app, owner, "groups", json!({ "name": "Private" })).await;
    let uri = format!("/v1/groups/{}", id_of(&group));

    let resp = send(&app, "GET", &uri, Uuid::new_v4(), Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["param"], "id");
    assert_eq!(body["error"]["message"], format!("No such group: '{}'", id_of(&group)));

    let resp = send(&app, "GET", &uri, owner, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_tenant_is_unauthorized() {
    let app = router();
    let resp = app
        .clone()
        .oneshot(json_request("GET", "/v1/groups", None, &Value::Null))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_path_id_is_bad_request() {
    let app = router();
    let resp = send(&app, "GET", "/v1/groups/not-a-uuid", Uuid::new_v4(), Value::Null).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "Invalid group id: 'not-a-uuid'.");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = router();
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/groups")
                .header(TENANT_ID_HEADER, Uuid::new_v4().to_string())
                .body(Body::from("{\"name\":"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(
        body["error"]["message"],
        "Invalid request body. Make sure that the body is in format application/json."
    );
}

// --- list / pagination ---

#[tokio::test]
async fn list_limit_two_over_three_rows_has_more() {
    let app = router();
    let tenant = Uuid::new_v4();
    for name in ["a", "b", "c"] {
        create(&app, tenant, "groups", json!({ "name": name })).await;
    }
    let resp = send(&app, "GET", "/v1/groups", tenant, json!({ "limit": 2 })).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["has_more"], true);
    assert_eq!(body["url"], "/v1/groups");
    assert_eq!(body["data"][0]["name"], "c");
    assert_eq!(body["data"][1]["name"], "b");
}

#[tokio::test]
async fn empty_list_has_no_more() {
    let app = router();
    let resp = send(&app, "GET", "/v1/groups", Uuid::new_v4(), Value::Null).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn paging_forward_then_back_returns_original_page() {
    let app = router();
    let tenant = Uuid::new_v4();
    for i in 0..5 {
        create(&app, tenant, "groups", json!({ "name": format!("g{}", i) })).await;
    }
    let first = body_json(send(&app, "GET", "/v1/groups", tenant, json!({ "limit": 2 })).await).await;
    let first_ids = ids(&first);
    assert_eq!(first["has_more"], true);

    let second = body_json(
        send(&app, "GET", "/v1/groups", tenant, json!({ "limit": 2, "starting_after": first_ids[1] })).await,
    )
    .await;
    let second_ids = ids(&second);
    assert_eq!(second_ids.len(), 2);
    assert_eq!(second["has_more"], true);
    assert_eq!(second["data"][0]["name"], "g2");

    let back = body_json(
        send(&app, "GET", "/v1/groups", tenant, json!({ "limit": 2, "ending_before": second_ids[0] })).await,
    )
    .await;
    assert_eq!(ids(&back), first_ids);
    assert_eq!(back["has_more"], false);

    let back_one = body_json(
        send(&app, "GET", "/v1/groups", tenant, json!({ "limit": 1, "ending_before": second_ids[0] })).await,
    )
    .await;
    assert_eq!(ids(&back_one), vec![first_ids[1].clone()]);
    assert_eq!(back_one["has_more"], true);
}

#[tokio::test]
async fn both_cursors_fail_validation() {
    let app = router();
    let tenant = Uuid::new_v4();
    let body = json!({ "starting_after": Uuid::new_v4(), "ending_before": Uuid::new_v4() });
    let resp = send(&app, "GET", "/v1/groups", tenant, body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["code"], "parameter_invalid");
    assert!(errors[0].get("param").is_none());
    assert_eq!(
        errors[0]["message"],
        "Received both 'starting_after' and 'ending_before' parameters. Pass one at a time."
    );
}

#[tokio::test]
async fn unknown_cursor_names_resource() {
    let app = router();
    let cursor = Uuid::new_v4();
    let resp = send(&app, "GET", "/v1/inventories", Uuid::new_v4(), json!({ "starting_after": cursor })).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], format!("No such inventory: '{}'", cursor));
}

#[tokio::test]
async fn limit_out_of_bounds() {
    let app = router();
    let resp = send(&app, "GET", "/v1/groups", Uuid::new_v4(), json!({ "limit": 101 })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(
        body["errors"][0]["message"],
        "Value of 'limit' must be less than or equal to '100'."
    );
}

#[tokio::test]
async fn list_filters_and_batch_expands() {
    let app = router();
    let tenant = Uuid::new_v4();
    let parent = create(&app, tenant, "groups", json!({ "name": "Parent" })).await;
    for name in ["x", "y"] {
        create(&app, tenant, "groups", json!({ "name": name, "parent_group": id_of(&parent) })).await;
    }
    let body = body_json(
        send(
            &app,
            "GET",
            "/v1/groups",
            tenant,
            json!({ "parent_group": id_of(&parent), "expand": ["parent_group"] }),
        )
        .await,
    )
    .await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    for g in data {
        assert_eq!(g["parent_group"]["name"], "Parent");
    }
}

// --- update / delete ---

#[tokio::test]
async fn update_sets_fields_and_updated_at() {
    let app = router();
    let tenant = Uuid::new_v4();
    let inv = create(&app, tenant, "inventories", json!({ "in_stock": 3 })).await;
    let resp = send(
        &app,
        "PUT",
        &format!("/v1/inventories/{}", id_of(&inv)),
        tenant,
        json!({ "orderable": 7 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["in_stock"], 3);
    assert_eq!(body["orderable"], 7);
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn update_of_missing_row_is_not_found_before_validation() {
    let app = router();
    let uri = format!("/v1/inventories/{}", Uuid::new_v4());
    let resp = send(&app, "PUT", &uri, Uuid::new_v4(), json!({ "in_stock": -1 })).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = router();
    let tenant = Uuid::new_v4();
    let group = create(&app, tenant, "groups", json!({ "name": "Temp" })).await;
    let uri = format!("/v1/groups/{}", id_of(&group));

    let resp = send(&app, "DELETE", &uri, tenant, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.into_body().collect().await.unwrap().to_bytes().is_empty());

    let resp = send(&app, "GET", &uri, tenant, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = send(&app, "DELETE", &uri, tenant, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- items ---

#[tokio::test]
async fn item_with_nested_group_and_inventory() {
    let app = router();
    let tenant = Uuid::new_v4();
    let item = create(
        &app,
        tenant,
        "items",
        json!({
            "name": "Hammer",
            "type": "PRODUCT",
            "group_data": { "name": "Tools" },
            "inventory_data": { "in_stock": 12 },
            "expand": ["group", "inventory"]
        }),
    )
    .await;
    assert_eq!(item["group"]["name"], "Tools");
    assert_eq!(item["inventory"]["in_stock"], 12);
    assert_eq!(item["active"], true);
    assert_eq!(item["variant"], false);
    assert_eq!(item["type"], "PRODUCT");
}

#[tokio::test]
async fn item_rejects_group_and_group_data_together() {
    let app = router();
    let body = json!({
        "name": "Saw",
        "type": "TOOL",
        "group": Uuid::new_v4(),
        "group_data": { "name": "y".repeat(70) }
    });
    let resp = send(&app, "POST", "/v1/items", Uuid::new_v4(), body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0]["message"], "Received both 'group' and 'group_data' parameters. Pass one at a time.");
    assert_eq!(errors[1]["param"], "group_data[name]");
    assert_eq!(errors[2]["param"], "type");
}

#[tokio::test]
async fn item_identifiers_link_back_to_item() {
    let app = router();
    let tenant = Uuid::new_v4();
    let item = create(&app, tenant, "items", json!({ "name": "Drill", "type": "PRODUCT" })).await;
    assert!(item["identifiers"].is_null());

    let resp = send(
        &app,
        "POST",
        "/v1/item_identifiers",
        tenant,
        json!({ "item": id_of(&item), "ean": "123" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["param"], "ean");
    assert_eq!(body["errors"][0]["message"], "Parameter invalid: 'ean'.");

    let identifiers = create(
        &app,
        tenant,
        "item_identifiers",
        json!({ "item": id_of(&item), "ean": "12345678", "sku": "DR-1", "expand": ["item"] }),
    )
    .await;
    assert_eq!(identifiers["item"]["name"], "Drill");

    let resp = send(
        &app,
        "GET",
        &format!("/v1/items/{}", id_of(&item)),
        tenant,
        json!({ "expand": ["identifiers"] }),
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["identifiers"]["sku"], "DR-1");
}

#[tokio::test]
async fn item_create_writes_nested_identifiers_and_price() {
    let app = router();
    let tenant = Uuid::new_v4();
    let item = create(
        &app,
        tenant,
        "items",
        json!({
            "name": "Hammer",
            "type": "PRODUCT",
            "identifiers_data": { "sku": "HM-1" },
            "price_data": { "amount": 5, "currency": "EUR" },
            "expand": ["identifiers"]
        }),
    )
    .await;
    assert_eq!(item["identifiers"]["sku"], "HM-1");
    assert_eq!(item["identifiers"]["item"], item["id"]);

    let prices = body_json(send(&app, "GET", "/v1/prices", tenant, json!({ "item": id_of(&item) })).await).await;
    let data = prices["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["amount"], 5);
    assert_eq!(data[0]["currency"], "EUR");

    let resp = send(&app, "GET", &format!("/v1/items/{}", id_of(&item)), tenant, Value::Null).await;
    let plain = body_json(resp).await;
    assert_eq!(plain["identifiers"], item["identifiers"]["id"]);
}

#[tokio::test]
async fn nested_identifiers_and_price_are_validated() {
    let app = router();
    let tenant = Uuid::new_v4();
    let body = json!({
        "name": "Level",
        "type": "PRODUCT",
        "identifiers_data": { "ean": "123" },
        "price_data": { "amount": 5, "currency": "ABC" }
    });
    let resp = send(&app, "POST", "/v1/items", tenant, body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let params: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["param"].as_str().unwrap())
        .collect();
    assert_eq!(params, vec!["identifiers_data[ean]", "price_data[currency]"]);

    let items = body_json(send(&app, "GET", "/v1/items", tenant, Value::Null).await).await;
    assert!(items["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn price_accepts_currency_beyond_majors() {
    let app = router();
    let tenant = Uuid::new_v4();
    let item = create(&app, tenant, "items", json!({ "name": "Tea", "type": "PRODUCT" })).await;
    let price = create(
        &app,
        tenant,
        "prices",
        json!({ "amount": 1200, "currency": "AED", "item": id_of(&item) }),
    )
    .await;
    assert_eq!(price["currency"], "AED");
}

#[tokio::test]
async fn inventory_items_are_scoped_to_inventory() {
    let app = router();
    let tenant = Uuid::new_v4();
    let inv = create(&app, tenant, "inventories", json!({ "in_stock": 1 })).await;
    create(&app, tenant, "items", json!({ "name": "In", "type": "PRODUCT", "inventory": id_of(&inv) })).await;
    create(&app, tenant, "items", json!({ "name": "Out", "type": "SERVICE" })).await;

    let uri = format!("/v1/inventories/{}/items", id_of(&inv));
    let body = body_json(send(&app, "GET", &uri, tenant, Value::Null).await).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "In");
    assert_eq!(body["url"], uri);

    let resp = send(&app, "GET", &format!("/v1/inventories/{}/items", Uuid::new_v4()), tenant, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- prices ---

#[tokio::test]
async fn price_validation_and_expand() {
    let app = router();
    let tenant = Uuid::new_v4();
    let item = create(&app, tenant, "items", json!({ "name": "Glue", "type": "PRODUCT" })).await;

    let resp = send(
        &app,
        "POST",
        "/v1/prices",
        tenant,
        json!({ "amount": -5, "currency": "eur", "item": id_of(&item) }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let params: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["param"].as_str().unwrap())
        .collect();
    assert_eq!(params, vec!["amount", "currency"]);

    let price = create(
        &app,
        tenant,
        "prices",
        json!({ "amount": 499, "currency": "EUR", "item": id_of(&item), "expand": ["item"] }),
    )
    .await;
    assert_eq!(price["amount"], 499);
    assert_eq!(price["item"]["name"], "Glue");
}

// --- misc ---

#[tokio::test]
async fn unknown_route_is_404() {
    let app = router();
    let resp = send(&app, "GET", "/v1/widgets", Uuid::new_v4(), Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "Request to unknown route (GET: /v1/widgets).");
}

#[tokio::test]
async fn health_needs_no_tenant() {
    let app = router();
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");
}
