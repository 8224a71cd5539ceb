use tracing::info;

use crate::{
    clients::{catalog::CatalogClient, rbmq::OffsetPublisher, storefront::StorefrontClient},
    error::SyncError,
    models::{message::parse_offset_payload, status::SyncOutcome},
    transform::to_product_set_input,
};

/// Processes one offset message: fetch the template at that offset,
/// transform it, create the storefront product, publish the successor
/// offset. One record per invocation; iteration happens across queue
/// messages, not in-process.
///
/// Not idempotent: redelivery of an already-processed offset creates a
/// duplicate storefront product.
pub async fn process_message(
    payload: &[u8],
    catalog_client: &CatalogClient,
    storefront_client: &StorefrontClient,
    publisher: &impl OffsetPublisher,
) -> Result<SyncOutcome, SyncError> {
    let offset = parse_offset_payload(payload)?;

    info!(offset, "Processing sync message");

    let template = match catalog_client.fetch_by_offset(offset).await? {
        Some(template) => template,
        None => {
            info!(offset, "End of catalog reached, sync chain complete");
            return Ok(SyncOutcome::Complete { offset });
        }
    };

    let input = to_product_set_input(&template)?;

    let product_id = storefront_client.create_product(&input).await?;

    info!(
        offset,
        catalog_id = %template.id,
        product_id = %product_id,
        "Storefront product created"
    );

    storefront_client.attach_media(&product_id, &template).await;

    publisher.publish_offset(offset + 1).await?;

    Ok(SyncOutcome::Advanced { offset, product_id })
}

/// Ad-hoc single-record processing, keyed by catalog record id. Never
/// publishes a successor offset.
pub async fn process_record(
    record_id: &str,
    catalog_client: &CatalogClient,
    storefront_client: &StorefrontClient,
) -> Result<String, SyncError> {
    info!(record_id, "Processing ad-hoc sync request");

    let template = catalog_client.fetch_by_id(record_id).await?;

    let input = to_product_set_input(&template)?;

    let product_id = storefront_client.create_product(&input).await?;

    info!(record_id, product_id = %product_id, "Ad-hoc storefront product created");

    storefront_client.attach_media(&product_id, &template).await;

    Ok(product_id)
}

/// Completion hook for the end of the sync chain. Email delivery itself
/// lives outside this service; when a notification key is configured we
/// only record that the chain finished.
pub fn notify_completion(offset: u64, notification_api_key: Option<&str>) {
    if notification_api_key.is_some() {
        info!(offset, "Catalog sync complete, notification hook configured");
    } else {
        info!(offset, "Catalog sync complete");
    }
}
