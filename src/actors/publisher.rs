use kameo::actor::ActorRef;
use kameo::error::Infallible;
use kameo::mailbox;
use kameo::message::{Context, Message};
use kameo::Actor;
use std::sync::Arc;
use uuid::Uuid;

use crate::messaging::{EventPublisher, PublishError};
use crate::metrics::Metrics;

// ============================================================================
// Publisher Actor - background publishing of order events
// ============================================================================
//
// The choreographed flow hands each serialized order to this actor with
// `tell` and returns immediately. The actor owns the wait on the broker and
// logs failures; nothing flows back to the request.
//
// ============================================================================

// ============================================================================
// Messages
// ============================================================================

pub struct PublishOrderEvent {
    pub order_id: Uuid,
    pub payload: Vec<u8>,
}

// ============================================================================
// Publisher Actor
// ============================================================================

pub struct PublisherActor {
    publisher: Arc<dyn EventPublisher>,
    metrics: Arc<Metrics>,
}

impl PublisherActor {
    pub fn new(publisher: Arc<dyn EventPublisher>, metrics: Arc<Metrics>) -> Self {
        Self { publisher, metrics }
    }
}

impl Actor for PublisherActor {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(state: Self::Args, _actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        tracing::info!(topic = %state.publisher.topic(), "PublisherActor started");
        Ok(state)
    }
}

impl Message<PublishOrderEvent> for PublisherActor {
    type Reply = ();

    async fn handle(&mut self, msg: PublishOrderEvent, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let key = msg.order_id.to_string();

        match self.publisher.publish(&key, &msg.payload).await {
            Ok(()) => {
                tracing::debug!(order_id = %msg.order_id, topic = %self.publisher.topic(), "Order event published");
                self.metrics.record_publish(true);
            }
            Err(e) => {
                // At-least-once redelivery is left to the broker and consumers.
                tracing::error!(
                    order_id = %msg.order_id,
                    topic = %self.publisher.topic(),
                    error = %e,
                    "Failed to publish order event"
                );
                self.metrics.record_publish(false);
            }
        }
    }
}

// ============================================================================
// Dispatcher - the handle the order flow holds
// ============================================================================

#[derive(Clone)]
pub struct EventDispatcher {
    actor: ActorRef<PublisherActor>,
}

impl EventDispatcher {
    /// The mailbox is unbounded: a slow broker grows the queue instead of
    /// holding up the requests that enqueue into it.
    pub fn spawn(publisher: Arc<dyn EventPublisher>, metrics: Arc<Metrics>) -> Self {
        let actor = PublisherActor::spawn_with_mailbox(
            PublisherActor::new(publisher, metrics),
            mailbox::unbounded(),
        );
        Self { actor }
    }

    /// Enqueues the event. Resolves once the actor's mailbox has accepted it,
    /// not when the broker acknowledges it.
    pub async fn dispatch(&self, order_id: Uuid, payload: Vec<u8>) -> Result<(), PublishError> {
        self.actor
            .tell(PublishOrderEvent { order_id, payload })
            .send()
            .await
            .map_err(|_| PublishError::MailboxClosed)
    }

    #[cfg(test)]
    pub(crate) async fn shutdown(&self) {
        let _ = self.actor.stop_gracefully().await;
        self.actor.wait_for_shutdown().await;
    }
}
