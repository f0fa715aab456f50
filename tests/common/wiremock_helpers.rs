use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use contactfinder::config::ProviderConfig;
use contactfinder::provider::ProviderClient;

/// Provider responses share an envelope of `{results, totalCost,
/// resultCount}`.
pub fn envelope(results: Value, total_cost: f64) -> Value {
    let result_count = results.as_array().map(|r| r.len()).unwrap_or(0);
    json!({
        "results": results,
        "totalCost": total_cost,
        "resultCount": result_count,
    })
}

/// Build a `ProviderClient` pointed at a mock server's `/v1` prefix.
pub fn provider_for(server: &MockServer) -> ProviderClient {
    let config = ProviderConfig {
        base_url: format!("{}/v1", server.uri()),
        api_token: "test-token".to_string(),
        timeout_secs: 5,
        user_agent: "contactfinder-tests".to_string(),
    };
    ProviderClient::new(
        &config,
        vec!["".to_string(), "contact".to_string(), "contacts".to_string()],
    )
}

/// Mounts the property search endpoint returning the given results.
pub async fn mount_property_search(server: &MockServer, results: Value) {
    Mock::given(method("POST"))
        .and(path("/v1/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(results, 0.0)))
        .mount(server)
        .await;
}

/// Mounts the owner resolution endpoint for one property.
pub async fn mount_owners(server: &MockServer, radar_id: &str, results: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/properties/{}/persons", radar_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(results, 0.0)))
        .mount(server)
        .await;
}

/// Mounts one contact endpoint (segment "Phone" or "Email") for the given
/// purchase mode ("0" or "1").
pub async fn mount_contact(
    server: &MockServer,
    person_key: &str,
    segment: &str,
    purchase: &str,
    body: Value,
) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/persons/{}/{}", person_key, segment)))
        .and(query_param("Purchase", purchase))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Asserts (on server drop) that no paid call ever reaches this contact
/// endpoint.
pub async fn forbid_contact_purchase(server: &MockServer, person_key: &str, segment: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/persons/{}/{}", person_key, segment)))
        .and(query_param("Purchase", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]), 0.0)))
        .expect(0)
        .mount(server)
        .await;
}

/// Mounts a 400 "already purchased" conflict on a paid contact call.
pub async fn mount_contact_conflict(server: &MockServer, person_key: &str, segment: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/persons/{}/{}", person_key, segment)))
        .and(query_param("Purchase", "1"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string("this data was already purchased and is not available for purchase"),
        )
        .mount(server)
        .await;
}

/// Mounts the three read-only alternate endpoints with empty bodies.
pub async fn mount_empty_alternates(server: &MockServer, person_key: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/persons/{}", person_key)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
    for suffix in ["contact", "contacts"] {
        Mock::given(method("GET"))
            .and(path(format!("/v1/persons/{}/{}", person_key, suffix)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(server)
            .await;
    }
}

/// Asserts (on server drop) that no owner or contact endpoint is ever
/// called.
pub async fn forbid_owner_and_contact_calls(server: &MockServer) {
    Mock::given(path_regex(r"^/v1/properties/.+/persons$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]), 0.0)))
        .expect(0)
        .mount(server)
        .await;
    Mock::given(path_regex(r"^/v1/persons/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(server)
        .await;
}

/// Creates a mock board server answering the GraphQL items query with the
/// given items.
pub async fn mock_board_server(items: Value) -> MockServer {
    let server = MockServer::start().await;
    let body = json!({
        "data": {
            "boards": [
                {
                    "name": "Leads",
                    "items_page": { "items": items }
                }
            ]
        }
    });
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}
