mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::wiremock_helpers::*;
use contactfinder::boundary::CostMode;
use contactfinder::logger::{RunLogger, VerbosityLevel};
use contactfinder::report::{export_json, ReportStatus, RunSummary};
use contactfinder::Pipeline;

const ADDRESS: &str = "12 Oak St, Springfield, IL 62704";

fn quiet_logger() -> RunLogger {
    RunLogger::new(VerbosityLevel::Silent)
}

async fn run_one(server: &MockServer, address: &str) -> contactfinder::ReportRecord {
    let provider = provider_for(server);
    let logger = quiet_logger();
    let pipeline = Pipeline::new(&provider, &logger, Duration::ZERO, CostMode::CachedOnly);
    let mut records = pipeline.run(&[address.to_string()]).await;
    assert_eq!(records.len(), 1);
    records.remove(0)
}

#[tokio::test]
async fn property_not_found_issues_no_owner_or_contact_calls() {
    let server = MockServer::start().await;
    mount_property_search(&server, json!([])).await;
    forbid_owner_and_contact_calls(&server).await;

    let record = run_one(&server, ADDRESS).await;
    assert_eq!(record.status, ReportStatus::PropertyNotFound);
    assert!(record.owners.is_empty());
    assert!(record.phones.is_empty());
    assert!(record.emails.is_empty());
}

#[tokio::test]
async fn unparseable_address_reports_no_address() {
    let server = MockServer::start().await;
    forbid_owner_and_contact_calls(&server).await;

    let record = run_one(&server, "somewhere with no commas").await;
    assert_eq!(record.status, ReportStatus::NoAddress);
    assert!(record.owners.is_empty());
}

#[tokio::test]
async fn no_owners_is_terminal() {
    let server = MockServer::start().await;
    mount_property_search(&server, json!([{"RadarID": "R1"}])).await;
    mount_owners(&server, "R1", json!([])).await;

    let record = run_one(&server, ADDRESS).await;
    assert_eq!(record.status, ReportStatus::NoOwnersFound);
}

#[tokio::test]
async fn cached_phone_hit_prevents_purchase() {
    let server = MockServer::start().await;
    mount_property_search(&server, json!([{"RadarID": "R1"}])).await;
    mount_owners(
        &server,
        "R1",
        json!([{"PersonKey": "P1", "Name": "JANE DOE", "PersonType": "Person"}]),
    )
    .await;
    // Cached phone data exists; the paid endpoint must never be hit
    mount_contact(
        &server,
        "P1",
        "Phone",
        "0",
        envelope(json!([{"PhoneNumber": "(555) 123-4567"}]), 0.0),
    )
    .await;
    forbid_contact_purchase(&server, "P1", "Phone").await;
    // No email data anywhere; the email purchase comes back billed
    mount_contact(&server, "P1", "Email", "0", envelope(json!([]), 0.0)).await;
    mount_empty_alternates(&server, "P1").await;
    mount_contact(
        &server,
        "P1",
        "Email",
        "1",
        envelope(json!([{"EmailAddress": "jane@example.com"}]), 2.0),
    )
    .await;

    let record = run_one(&server, ADDRESS).await;
    assert_eq!(record.status, ReportStatus::Success);
    assert!(record.phones.contains("(555) 123-4567"));
    assert!(record.emails.contains("jane@example.com"));

    let owner = &record.owners[0];
    assert_eq!(owner.name, "JANE DOE");
    assert_eq!(owner.phone_cost, 0.0);
    assert_eq!(owner.email_cost, 2.0);
}

#[tokio::test]
async fn alternate_endpoint_supplies_purchased_data_at_zero_cost() {
    let server = MockServer::start().await;
    mount_property_search(&server, json!([{"RadarID": "R1"}])).await;
    mount_owners(&server, "R1", json!([{"PersonKey": "P1", "Name": "JANE DOE"}])).await;
    // Primary endpoints have nothing cached
    mount_contact(&server, "P1", "Phone", "0", envelope(json!([]), 0.0)).await;
    mount_contact(&server, "P1", "Email", "0", envelope(json!([]), 0.0)).await;
    forbid_contact_purchase(&server, "P1", "Phone").await;
    // The person-details alternate exposes a previously purchased phone
    Mock::given(method("GET"))
        .and(path("/v1/persons/P1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Person": {"MobilePhone": "555-987-6543"}
        })))
        .mount(&server)
        .await;
    for suffix in ["contact", "contacts"] {
        Mock::given(method("GET"))
            .and(path(format!("/v1/persons/P1/{}", suffix)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
    }
    mount_contact(&server, "P1", "Email", "1", envelope(json!([]), 0.0)).await;

    let record = run_one(&server, ADDRESS).await;
    assert_eq!(record.status, ReportStatus::Success);
    assert!(record.phones.contains("(555) 987-6543"));
    assert_eq!(record.owners[0].phone_cost, 0.0);
}

#[tokio::test]
async fn already_purchased_conflict_is_a_soft_failure() {
    let server = MockServer::start().await;
    mount_property_search(&server, json!([{"RadarID": "R1"}])).await;
    mount_owners(&server, "R1", json!([{"PersonKey": "P1", "Name": "JANE DOE"}])).await;
    mount_contact(&server, "P1", "Phone", "0", envelope(json!([]), 0.0)).await;
    mount_contact(&server, "P1", "Email", "0", envelope(json!([]), 0.0)).await;
    mount_empty_alternates(&server, "P1").await;
    mount_contact_conflict(&server, "P1", "Phone").await;
    mount_contact(&server, "P1", "Email", "1", envelope(json!([]), 0.0)).await;

    let record = run_one(&server, ADDRESS).await;
    assert_eq!(record.status, ReportStatus::NoContactInfo);
    let owner = &record.owners[0];
    assert!(owner.phones.is_empty());
    assert_eq!(owner.phone_cost, 0.0);
}

#[tokio::test]
async fn owner_without_person_key_skips_contact_lookup() {
    let server = MockServer::start().await;
    mount_property_search(&server, json!([{"RadarID": "R1"}])).await;
    // A legal entity with no person key; also exercises EntityName fallback
    mount_owners(
        &server,
        "R1",
        json!([{"EntityName": "ACME HOLDINGS LLC", "PersonType": "Entity"}]),
    )
    .await;
    Mock::given(path("/v1/persons/P1/Phone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let record = run_one(&server, ADDRESS).await;
    assert_eq!(record.status, ReportStatus::NoContactInfo);
    assert_eq!(record.owners.len(), 1);
    assert_eq!(record.owners[0].name, "ACME HOLDINGS LLC");
    assert!(record.owners[0].person_key.is_none());
}

#[tokio::test]
async fn boundary_failures_never_abort_the_run() {
    let server = MockServer::start().await;
    // The provider is down hard; every search 500s
    Mock::given(method("POST"))
        .and(path("/v1/properties"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let logger = quiet_logger();
    let pipeline = Pipeline::new(&provider, &logger, Duration::ZERO, CostMode::CachedOnly);
    let addresses = vec![ADDRESS.to_string(), "77 Pine Rd, Austin, TX 78701".to_string()];
    let records = pipeline.run(&addresses).await;

    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.status == ReportStatus::PropertyNotFound));
}

#[tokio::test]
async fn malformed_response_body_degrades_to_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let record = run_one(&server, ADDRESS).await;
    assert_eq!(record.status, ReportStatus::PropertyNotFound);
}

#[tokio::test]
async fn report_is_dumped_as_an_ordered_json_array() {
    let server = MockServer::start().await;
    mount_property_search(&server, json!([])).await;

    let provider = provider_for(&server);
    let logger = quiet_logger();
    let pipeline = Pipeline::new(&provider, &logger, Duration::ZERO, CostMode::CachedOnly);
    let addresses = vec!["no commas here".to_string(), ADDRESS.to_string()];
    let records = pipeline.run(&addresses).await;

    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("contact_report.json");
    export_json(&records, &output_path).unwrap();

    let dumped: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    let array = dumped.as_array().expect("report must be a JSON array");
    assert_eq!(array.len(), 2);
    assert_eq!(array[0]["status"], "no address");
    assert_eq!(array[1]["status"], "property not found");
    assert_eq!(array[1]["address"], ADDRESS);

    let summary = RunSummary::from_records(&records);
    assert_eq!(summary.total_addresses, 2);
    assert_eq!(summary.total_cost, 0.0);
}
