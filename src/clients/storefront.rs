use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::{Client, Response, StatusCode, header::RETRY_AFTER};
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::SyncError,
    models::{
        catalog::ProductTemplate,
        storefront::{
            GraphqlResponse, ProductOperationData, ProductSetData, ProductSetInput, UserError,
        },
    },
};

const PRODUCT_SET_MUTATION: &str = r#"
    mutation setProduct($input: ProductSetInput!) {
        productSet(input: $input, synchronous: false) {
            product {
                id
            }
            productSetOperation {
                id
                status
                userErrors {
                    code
                    field
                    message
                }
            }
            userErrors {
                field
                message
            }
        }
    }
"#;

const PRODUCT_OPERATION_QUERY: &str = r#"
    query productOperationStatus($id: ID!) {
        productOperation(id: $id) {
            ... on ProductSetOperation {
                id
                status
                product {
                    id
                }
                userErrors {
                    code
                    field
                    message
                }
            }
        }
    }
"#;

const CREATE_MEDIA_MUTATION: &str = r#"
    mutation productCreateMedia($media: [CreateMediaInput!]!, $productId: ID!) {
        productCreateMedia(media: $media, productId: $productId) {
            media {
                alt
                mediaContentType
                status
            }
            mediaUserErrors {
                field
                message
            }
            product {
                id
            }
        }
    }
"#;

pub struct StorefrontClient {
    http_client: Client,
    graphql_url: String,
    access_token: String,
    poll_interval_ms: u64,
    poll_max_attempts: u32,
}

impl StorefrontClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = Self::from_parts(
            config.storefront_graphql_url(),
            &config.storefront_access_token,
            config.operation_poll_interval_ms,
            config.operation_poll_max_attempts,
        )?;

        info!(store = %config.storefront_store, "Storefront client initialized");

        Ok(client)
    }

    pub fn from_parts(
        graphql_url: String,
        access_token: &str,
        poll_interval_ms: u64,
        poll_max_attempts: u32,
    ) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        Ok(Self {
            http_client,
            graphql_url,
            access_token: access_token.to_string(),
            poll_interval_ms,
            poll_max_attempts,
        })
    }

    /// Submits the `productSet` mutation and waits for the resulting
    /// product operation to complete, returning the created product id.
    pub async fn create_product(&self, input: &ProductSetInput) -> Result<String, SyncError> {
        debug!(title = %input.title, "Submitting productSet mutation");

        let response = self
            .post_graphql(json!({
                "query": PRODUCT_SET_MUTATION,
                "variables": { "input": input },
            }))
            .await?;

        let body: GraphqlResponse<ProductSetData> = response.json().await.map_err(|e| {
            SyncError::UpstreamUnavailable(format!("invalid storefront response: {}", e))
        })?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            return Err(SyncError::UpstreamUnavailable(format!(
                "storefront GraphQL error: {}",
                errors[0].message
            )));
        }

        let result = body
            .data
            .map(|data| data.product_set)
            .ok_or_else(|| SyncError::UpstreamUnavailable("empty storefront response".into()))?;

        if !result.user_errors.is_empty() {
            return Err(validation_error(&result.user_errors));
        }

        // The mutation resolves the product directly when the operation
        // finishes inline; otherwise we poll the operation handle.
        if let Some(product) = result.product {
            return Ok(product.id);
        }

        let operation = result.product_set_operation.ok_or_else(|| {
            SyncError::UpstreamUnavailable("storefront returned neither product nor operation".into())
        })?;

        if !operation.user_errors.is_empty() {
            return Err(validation_error(&operation.user_errors));
        }

        self.await_operation(&operation.id).await
    }

    /// Polls the product operation until COMPLETE, bounded by the
    /// configured attempt limit.
    async fn await_operation(&self, operation_id: &str) -> Result<String, SyncError> {
        for attempt in 1..=self.poll_max_attempts {
            let response = self
                .post_graphql(json!({
                    "query": PRODUCT_OPERATION_QUERY,
                    "variables": { "id": operation_id },
                }))
                .await?;

            let body: GraphqlResponse<ProductOperationData> =
                response.json().await.map_err(|e| {
                    SyncError::UpstreamUnavailable(format!("invalid operation response: {}", e))
                })?;

            let operation = body
                .data
                .and_then(|data| data.product_operation)
                .ok_or_else(|| {
                    SyncError::UpstreamUnavailable(format!(
                        "operation {} not found in storefront response",
                        operation_id
                    ))
                })?;

            if !operation.user_errors.is_empty() {
                return Err(validation_error(&operation.user_errors));
            }

            if operation.status == "COMPLETE" {
                return operation.product.map(|product| product.id).ok_or_else(|| {
                    SyncError::Validation("operation completed without a product".into())
                });
            }

            debug!(
                operation_id,
                attempt,
                status = %operation.status,
                "Product operation still running"
            );

            sleep(Duration::from_millis(self.poll_interval_ms)).await;
        }

        Err(SyncError::UpstreamUnavailable(format!(
            "operation {} did not complete after {} polls",
            operation_id, self.poll_max_attempts
        )))
    }

    /// Attaches the template's images to the created product. Best
    /// effort: individual media failures are logged and skipped so they
    /// never fail the sync invocation.
    pub async fn attach_media(&self, product_id: &str, template: &ProductTemplate) {
        let mut sources: Vec<(&str, &str)> = Vec::new();

        if let Some(main_image) = &template.main_image {
            sources.push(("Main Image", main_image.as_str()));
        }
        for image in &template.images {
            sources.push(("Image", image.url.as_str()));
        }

        for (alt, url) in sources {
            let result = self
                .post_graphql(json!({
                    "query": CREATE_MEDIA_MUTATION,
                    "variables": {
                        "media": [{
                            "alt": alt,
                            "mediaContentType": "IMAGE",
                            "originalSource": url,
                        }],
                        "productId": product_id,
                    },
                }))
                .await;

            match result {
                Ok(_) => debug!(product_id, url, "Media attached"),
                Err(e) => warn!(product_id, url, error = %e, "Failed to attach media, skipping"),
            }
        }
    }

    async fn post_graphql(&self, body: serde_json::Value) -> Result<Response, SyncError> {
        let response = self
            .http_client
            .post(&self.graphql_url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                SyncError::UpstreamUnavailable(format!("storefront request failed: {}", e))
            })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());

            return Err(SyncError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::UpstreamUnavailable(format!(
                "storefront returned status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

fn validation_error(user_errors: &[UserError]) -> SyncError {
    let messages: Vec<&str> = user_errors
        .iter()
        .map(|error| error.message.as_str())
        .collect();

    SyncError::Validation(messages.join("; "))
}
