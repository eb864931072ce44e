//! AMQP 0.9.1 broker channel backed by lapin.

use futures::StreamExt;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tokio::sync::Mutex;

use crate::config::BrokerConfig;
use crate::messaging::broker::{BrokerChannel, DeliveryStream};
use crate::messaging::MessagingResult;

/// Broker channel holding one long-lived connection and one shared channel.
///
/// Lapin channel operations are not meant to interleave from unsynchronized
/// callers, so every operation takes the channel mutex. Topology operations
/// are rare and publishes are short, so a single lock is sufficient.
pub struct AmqpBroker {
    channel: Mutex<Channel>,
    // Dropping the connection tears down the channel, so it is kept alive
    // for the lifetime of the broker handle.
    _connection: Connection,
}

impl AmqpBroker {
    /// Connects to the broker and opens the shared channel.
    pub async fn connect(config: &BrokerConfig) -> MessagingResult<Self> {
        let uri = config.url();
        tracing::debug!(host = %config.host, port = config.port, "Connecting to message broker");

        let connection = Connection::connect(&uri, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        tracing::debug!("Broker connection established");
        Ok(Self {
            channel: Mutex::new(channel),
            _connection: connection,
        })
    }
}

#[async_trait::async_trait]
impl BrokerChannel for AmqpBroker {
    async fn declare_exchange(&self, name: &str) -> MessagingResult<()> {
        let channel = self.channel.lock().await;
        channel
            .exchange_declare(
                name,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(())
    }

    async fn declare_queue(&self) -> MessagingResult<String> {
        let channel = self.channel.lock().await;
        // Empty name asks the broker to generate one.
        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    durable: false,
                    auto_delete: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(queue.name().as_str().to_string())
    }

    async fn bind_queue(&self, queue: &str, key: &str, exchange: &str) -> MessagingResult<()> {
        let channel = self.channel.lock().await;
        channel
            .queue_bind(
                queue,
                exchange,
                key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;
        Ok(())
    }

    async fn publish(&self, exchange: &str, key: &str, body: &[u8]) -> MessagingResult<()> {
        let channel = self.channel.lock().await;
        channel
            .basic_publish(
                exchange,
                key,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await?;
        Ok(())
    }

    async fn consume(&self, queue: &str) -> MessagingResult<DeliveryStream> {
        let channel = self.channel.lock().await;
        let consumer = channel
            .basic_consume(
                queue,
                "",
                BasicConsumeOptions {
                    // Auto-ack: the broker considers the message delivered
                    // before any handler runs.
                    no_ack: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        let stream = consumer.filter_map(|delivery| async move {
            match delivery {
                Ok(delivery) => Some(delivery.data),
                Err(e) => {
                    tracing::warn!(error = %e, "Consumer stream error, skipping delivery");
                    None
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
