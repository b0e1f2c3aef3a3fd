//! DaData binding against a local mock server.

use locus_core::{Address, ProviderError};
use locus_provider::{DadataConfig, DadataProvider, GeoProvider};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUGGEST: &str = "/suggestions/api/4_1/rs/suggest/address";
const GEOLOCATE: &str = "/suggestions/api/4_1/rs/geolocate/address";

fn provider(server: &MockServer) -> Result<DadataProvider, ProviderError> {
    DadataProvider::new(
        DadataConfig::new("test-token", "test-secret")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(2)),
    )
}

fn sukharevskaya() -> serde_json::Value {
    json!({
        "suggestions": [{
            "value": "г Москва, ул Сухаревская М., д 11",
            "data": {
                "city": "Москва",
                "settlement": null,
                "street": "Сухаревская",
                "house": "11",
                "geo_lat": "55.77412",
                "geo_lon": "37.624065"
            }
        }]
    })
}

#[tokio::test]
async fn search_sends_credentials_and_query() -> Result<(), ProviderError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SUGGEST))
        .and(header("Authorization", "Token test-token"))
        .and(header("X-Secret", "test-secret"))
        .and(body_json(json!({"query": "сухаревская 11"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(sukharevskaya()))
        .expect(1)
        .mount(&server)
        .await;

    let addresses = provider(&server)?.address_search("сухаревская 11").await?;
    assert_eq!(
        addresses,
        vec![Address::new("Москва", "Сухаревская", "11", "55.77412", "37.624065")]
    );
    Ok(())
}

#[tokio::test]
async fn geocode_sends_numeric_coordinates() -> Result<(), ProviderError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEOLOCATE))
        .and(body_json(json!({"lat": 55.77412, "lon": 37.624065})))
        .respond_with(ResponseTemplate::new(200).set_body_json(sukharevskaya()))
        .expect(1)
        .mount(&server)
        .await;

    let addresses = provider(&server)?.geocode("55.77412", "37.624065").await?;
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].city, "Москва");
    Ok(())
}

#[tokio::test]
async fn settlement_fills_missing_city_and_order_is_kept() -> Result<(), ProviderError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SUGGEST))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "suggestions": [
                {"data": {"city": null, "settlement": "Коммунарка", "street": "Липовый парк"}},
                {"data": {"city": "Москва", "street": "Арбат", "house": "1"}}
            ]
        })))
        .mount(&server)
        .await;

    let addresses = provider(&server)?.address_search("парк").await?;
    assert_eq!(
        addresses,
        vec![
            Address::new("Коммунарка", "Липовый парк", "", "", ""),
            Address::new("Москва", "Арбат", "1", "", ""),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn empty_suggestions_are_not_an_error() -> Result<(), ProviderError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEOLOCATE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"suggestions": []})))
        .mount(&server)
        .await;

    assert!(provider(&server)?.geocode("0", "0").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_a_provider_error() -> Result<(), ProviderError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = provider(&server)?.address_search("x").await.err();
    assert_eq!(
        err,
        Some(ProviderError::Status {
            provider: "dadata".to_string(),
            status: 403,
            body: "Forbidden".to_string(),
        })
    );
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_provider_error() -> Result<(), ProviderError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server)?.address_search("x").await.err();
    assert!(matches!(err, Some(ProviderError::InvalidResponse { .. })));
    Ok(())
}

#[tokio::test]
async fn unparseable_coordinate_never_reaches_the_network() -> Result<(), ProviderError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sukharevskaya()))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server)?.geocode("north", "37.6").await.err();
    assert!(matches!(err, Some(ProviderError::InvalidRequest { .. })));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() -> Result<(), ProviderError> {
    let provider = DadataProvider::new(
        DadataConfig::new("k", "s")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_millis(500)),
    )?;
    let err = provider.address_search("x").await.err();
    assert!(matches!(err, Some(ProviderError::Transport { .. })));
    Ok(())
}
