//! Client tests against a mocked strata service.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use strata_client::{ClientError, GoldTable, StrataClient};

async fn mock_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_round_trips() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/health",
        json!({"status": "ok", "service": "strata", "version": "0.1.0"}),
    )
    .await;

    let client = StrataClient::new(server.uri());
    let health = client.health().await.unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "strata");
}

#[tokio::test]
async fn kpis_deserialize_from_the_data_envelope() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/kpis",
        json!({"data": [{
            "revenue_total": 375.0,
            "purchase_count": 4,
            "basket_mean": 93.75,
            "unique_customers": 3,
            "revenue_per_customer_mean": 125.0,
            "growth_rate_pct": null,
            "amount_median": 75.0,
            "amount_stddev": 65.14,
            "amount_min": 25.0,
            "amount_max": 200.0,
        }]}),
    )
    .await;

    let client = StrataClient::new(server.uri());
    let kpis = client.kpis().await.unwrap();

    assert_eq!(kpis.len(), 1);
    assert_eq!(kpis[0].revenue_total, 375.0);
    assert_eq!(kpis[0].purchase_count, 4);
    assert_eq!(kpis[0].growth_rate_pct, None);
}

#[tokio::test]
async fn fact_achats_sends_pagination_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fact_achats"))
        .and(query_param("limit", "5"))
        .and(query_param("skip", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{
            "purchase_id": 11,
            "customer_id": 2,
            "purchase_date": "2024-03-01",
            "amount": 50.0,
            "product": "pen",
            "customer_name": "Bob",
            "email": "bob@example.com",
            "registration_date": "2023-01-15",
            "country": "Germany",
        }]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = StrataClient::new(server.uri());
    let rows = client.fact_achats(5, 10).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].purchase_id, 11);
    assert_eq!(rows[0].customer_name.as_deref(), Some("Bob"));
}

#[tokio::test]
async fn unmatched_fact_rows_deserialize_with_nulls() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/fact_achats",
        json!({"data": [{
            "purchase_id": 4,
            "customer_id": 9,
            "purchase_date": "2024-03-02",
            "amount": 25.0,
            "product": "lamp",
            "customer_name": null,
            "email": null,
            "registration_date": null,
            "country": null,
        }]}),
    )
    .await;

    let client = StrataClient::new(server.uri());
    let rows = client.fact_achats(1000, 0).await.unwrap();

    assert_eq!(rows[0].customer_name, None);
    assert_eq!(rows[0].country, None);
}

#[tokio::test]
async fn dimension_rows_are_typed() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/dim_produits",
        json!({"data": [
            {"product_key": 1, "product": "book"},
            {"product_key": 2, "product": "pen"},
        ]}),
    )
    .await;

    let client = StrataClient::new(server.uri());
    let products = client.dim_produits().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product_key, 1);
    assert_eq!(products[1].product, "pen");
}

#[tokio::test]
async fn refresh_time_hits_the_basename_route() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/refresh_time/kpis",
        json!({
            "status": "measured",
            "collection": "gold_kpis",
            "refresh_time_seconds": 42.5,
            "read_duration_seconds": 0.002,
            "write_duration_seconds": 1.2,
            "record_count": 1,
            "write_end": "2024-06-01T12:00:00Z",
            "read_start": "2024-06-01T12:00:42.5Z",
        }),
    )
    .await;

    let client = StrataClient::new(server.uri());
    let report = client.refresh_time(GoldTable::Kpis).await.unwrap();

    assert_eq!(report.refresh_time_seconds(), Some(42.5));
}

#[tokio::test]
async fn latency_summary_probes_all_nine_tables() {
    let server = MockServer::start().await;

    for table in GoldTable::ALL {
        let body = match table {
            GoldTable::Kpis => json!({
                "status": "measured",
                "collection": "gold_kpis",
                "refresh_time_seconds": 10.0,
                "read_duration_seconds": 0.001,
                "write_duration_seconds": 0.5,
                "record_count": 1,
                "write_end": "2024-06-01T12:00:00Z",
                "read_start": "2024-06-01T12:00:10Z",
            }),
            GoldTable::FactAchats => json!({
                "status": "measured",
                "collection": "gold_fact_achats",
                "refresh_time_seconds": 30.0,
                "read_duration_seconds": 0.001,
                "write_duration_seconds": 2.0,
                "record_count": 400,
                "write_end": "2024-06-01T12:00:00Z",
                "read_start": "2024-06-01T12:00:30Z",
            }),
            _ => json!({
                "status": "no_write_metadata",
                "collection": table.collection_name("gold_"),
                "read_duration_seconds": 0.001,
                "document_count": 0,
            }),
        };

        Mock::given(method("GET"))
            .and(path(format!("/refresh_time/{}", table.basename())))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = StrataClient::new(server.uri());
    let summary = client.refresh_latency_summary().await.unwrap();

    assert_eq!(summary.reports.len(), 9);
    assert_eq!(summary.measured_count(), 2);
    assert_eq!(summary.avg_refresh_seconds, Some(20.0));
    assert_eq!(summary.min_refresh_seconds, Some(10.0));
    assert_eq!(summary.max_refresh_seconds, Some(30.0));
}

#[tokio::test]
async fn structured_error_bodies_become_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dim_clients"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": "internal_error", "message": "An internal error occurred"}
        })))
        .mount(&server)
        .await;

    let client = StrataClient::new(server.uri());
    let err = client.dim_clients().await.unwrap_err();

    match err {
        ClientError::Api {
            code,
            message,
            status,
        } => {
            assert_eq!(code, "internal_error");
            assert_eq!(message, "An internal error occurred");
            assert_eq!(status, 500);
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_error_bodies_fall_back_to_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agg_jour"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = StrataClient::new(server.uri());
    let err = client.agg_jour().await.unwrap_err();

    match err {
        ClientError::Api { code, status, .. } => {
            assert_eq!(code, "unknown");
            assert_eq!(status, 503);
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}
