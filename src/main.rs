use anyhow::{Error, Result};
use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use sync_service::{
    api::run_api_server,
    clients::{catalog::CatalogClient, rbmq::RabbitMqClient, storefront::StorefrontClient},
    config::Config,
    error::SyncError,
    models::{message::DlqMessage, status::SyncOutcome},
    utils::{notify_completion, process_message},
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let api_config = config.clone();
    tokio::spawn(async move {
        if let Err(e) = run_api_server(api_config).await {
            error!(error = %e, "API server exited");
        }
    });

    let rabbitmq = RabbitMqClient::connect(&config).await?;
    let catalog_client = CatalogClient::new(&config)?;
    let storefront_client = StorefrontClient::new(&config)?;

    let mut consumer = rabbitmq.create_consumer().await?;

    info!("Sync worker started");

    // Deliveries are handled strictly one at a time; offset ordering
    // depends on it.
    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                warn!(error = %e, "Failed to receive delivery");
                continue;
            }
        };

        let span = info_span!("delivery", trace_id = %Uuid::new_v4());

        handle_delivery(
            &delivery.data,
            delivery.delivery_tag,
            &rabbitmq,
            &catalog_client,
            &storefront_client,
            &config,
        )
        .instrument(span)
        .await;
    }

    Ok(())
}

async fn handle_delivery(
    payload: &[u8],
    delivery_tag: u64,
    rabbitmq: &RabbitMqClient,
    catalog_client: &CatalogClient,
    storefront_client: &StorefrontClient,
    config: &Config,
) {
    match process_message(payload, catalog_client, storefront_client, rabbitmq).await {
        Ok(SyncOutcome::Advanced { offset, product_id }) => {
            info!(offset, product_id = %product_id, "Sync invocation succeeded");

            if let Err(e) = rabbitmq.acknowledge(delivery_tag).await {
                error!(error = %e, "Failed to acknowledge delivery");
            }
        }
        Ok(SyncOutcome::Complete { offset }) => {
            notify_completion(offset, config.notification_api_key.as_deref());

            if let Err(e) = rabbitmq.acknowledge(delivery_tag).await {
                error!(error = %e, "Failed to acknowledge delivery");
            }
        }
        Err(e @ SyncError::Publish(_)) => {
            // The product was already created; redelivery will recreate
            // it. Without redelivery the chain stalls here for good.
            error!(
                error = %e,
                "Successor offset not published, chain halts unless this delivery is retried"
            );

            if let Err(reject_err) = rabbitmq.reject(delivery_tag, true).await {
                error!(error = %reject_err, "Failed to reject delivery");
            }
        }
        Err(e) if e.is_retryable() => {
            warn!(error = %e, "Transient failure, leaving message for redelivery");

            if let Err(reject_err) = rabbitmq.reject(delivery_tag, true).await {
                error!(error = %reject_err, "Failed to reject delivery");
            }
        }
        Err(e) => {
            warn!(error = %e, "Non-retryable failure, dead-lettering message");

            let dlq_message = DlqMessage {
                payload: String::from_utf8_lossy(payload).into_owned(),
                failure_reason: e.to_string(),
                failed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            };

            if let Err(dlq_err) = rabbitmq.publish_to_dlq(&dlq_message).await {
                error!(error = %dlq_err, "Failed to publish message to dlq");
            }

            if let Err(ack_err) = rabbitmq.acknowledge(delivery_tag).await {
                error!(error = %ack_err, "Failed to acknowledge delivery");
            }
        }
    }
}
