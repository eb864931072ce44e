//! Asynchronous event dispatch over a fanout message broker.
//!
//! Application code talks to the [`EventRouter`] façade only:
//! `publish` serializes versioned envelopes onto a named exchange, and
//! `subscribe` registers a long-lived background consumer with its own
//! private queue. Topology (exchanges, queues, bindings) is created lazily
//! on first use and lives for the broker-connection lifetime.
//!
//! Delivery is effectively at-most-once: messages are acknowledged when
//! delivered, before the handler runs, so handler failures are logged and
//! the message is lost to that subscriber.

pub mod amqp;
pub mod broker;
pub mod envelope;
pub mod error;
pub mod memory;
pub mod publisher;
pub mod router;
pub mod subscription;
pub mod topology;

pub use amqp::AmqpBroker;
pub use broker::{BrokerChannel, DeliveryStream};
pub use envelope::Envelope;
pub use error::{MessagingError, MessagingResult};
pub use memory::InMemoryBroker;
pub use router::EventRouter;
pub use subscription::EventHandler;
pub use topology::TopologyManager;
