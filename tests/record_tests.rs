use anyhow::Result;
use serde_json::json;
use sync_service::{
    clients::{catalog::CatalogClient, storefront::StorefrontClient},
    error::SyncError,
    utils::process_record,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

fn catalog_client(server: &MockServer) -> CatalogClient {
    CatalogClient::from_parts(&server.uri(), "test-api-key").unwrap()
}

fn storefront_client(server: &MockServer) -> StorefrontClient {
    StorefrontClient::from_parts(
        format!("{}/admin/api/2024-04/graphql.json", server.uri()),
        "test-access-token",
        10,
        5,
    )
    .unwrap()
}

fn template_with_images() -> serde_json::Value {
    json!({
        "id": "cat-9",
        "name": "Wall Sconce",
        "description_sale": "<p>Matte black sconce.</p>",
        "attributes": [],
        "variants": [
            {"default_code": "SKU-9", "attributes": [{"name": "Finish", "value": "Matte"}]}
        ],
        "main_image": "https://img.example.com/main.jpg",
        "images": [
            {"url": "https://img.example.com/alt-1.jpg"}
        ]
    })
}

fn product_set_success(product_id: &str) -> serde_json::Value {
    json!({
        "data": {
            "productSet": {
                "product": {"id": product_id},
                "productSetOperation": null,
                "userErrors": []
            }
        }
    })
}

fn media_success() -> serde_json::Value {
    json!({
        "data": {
            "productCreateMedia": {
                "media": [{"alt": "Image", "mediaContentType": "IMAGE", "status": "UPLOADED"}],
                "mediaUserErrors": [],
                "product": {"id": "gid://shopify/Product/9"}
            }
        }
    })
}

/// Test: Ad-hoc sync by record id creates the product and its media
#[tokio::test]
async fn test_ad_hoc_record_sync() -> Result<()> {
    let catalog_server = MockServer::start().await;
    let storefront_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/products/cat-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(template_with_images()))
        .expect(1)
        .mount(&catalog_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2024-04/graphql.json"))
        .and(body_string_contains("productSet("))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(product_set_success("gid://shopify/Product/9")),
        )
        .expect(1)
        .mount(&storefront_server)
        .await;

    // One main image plus one additional image.
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-04/graphql.json"))
        .and(body_string_contains("productCreateMedia("))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_success()))
        .expect(2)
        .mount(&storefront_server)
        .await;

    let product_id = process_record(
        "cat-9",
        &catalog_client(&catalog_server),
        &storefront_client(&storefront_server),
    )
    .await?;

    assert_eq!(product_id, "gid://shopify/Product/9");

    Ok(())
}

/// Test: An unknown record id maps to NotFound
#[tokio::test]
async fn test_ad_hoc_unknown_record_is_not_found() -> Result<()> {
    let catalog_server = MockServer::start().await;
    let storefront_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/products/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&catalog_server)
        .await;

    let result = process_record(
        "missing",
        &catalog_client(&catalog_server),
        &storefront_client(&storefront_server),
    )
    .await;

    match result {
        Err(SyncError::NotFound(record_id)) => assert_eq!(record_id, "missing"),
        other => panic!("expected not found, got {:?}", other.map(|_| ())),
    }
    assert!(storefront_server.received_requests().await.unwrap().is_empty());

    Ok(())
}

/// Test: Media attachment failures do not fail the sync
#[tokio::test]
async fn test_media_failures_do_not_fail_sync() -> Result<()> {
    let catalog_server = MockServer::start().await;
    let storefront_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/products/cat-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(template_with_images()))
        .mount(&catalog_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2024-04/graphql.json"))
        .and(body_string_contains("productSet("))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(product_set_success("gid://shopify/Product/9")),
        )
        .mount(&storefront_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2024-04/graphql.json"))
        .and(body_string_contains("productCreateMedia("))
        .respond_with(ResponseTemplate::new(500))
        .mount(&storefront_server)
        .await;

    let product_id = process_record(
        "cat-9",
        &catalog_client(&catalog_server),
        &storefront_client(&storefront_server),
    )
    .await?;

    assert_eq!(product_id, "gid://shopify/Product/9");

    Ok(())
}
