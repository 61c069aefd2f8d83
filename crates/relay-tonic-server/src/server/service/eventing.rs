//! The `Eventing` gRPC service.
//!
//! Every handler delegates to the shared [`EventQueue`]; the queue's own
//! guarantees (global FIFO, exactly-one-delivery per item) carry the
//! protocol's ordering and no-loss contracts. Queue operations complete
//! without suspending, so no lock is ever held across an `await`.

use crate::server::config::ServerConfig;
use core::pin::Pin;
use relay_tonic_core::proto::{
    Ack, AckWithCount, Event, EventList, PullRequest, SingleEvent, eventing_server::Eventing,
};
use relay_tonic_core::relay_queue::EventQueue;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tonic::{Request, Response, Status, Streaming};

/// Handler for the `relay.v1.Eventing` service.
///
/// The queue is injected at construction and shared across all concurrent
/// calls; handlers are reentrant and hold no other state.
#[derive(Clone)]
pub struct EventingService {
    config: ServerConfig,
    queue: Arc<EventQueue<Event>>,
}

impl EventingService {
    pub fn new(config: ServerConfig, queue: Arc<EventQueue<Event>>) -> Self {
        Self { config, queue }
    }
}

#[tonic::async_trait]
impl Eventing for EventingService {
    type PullManyStreamStream = Pin<Box<dyn Stream<Item = Result<Event, Status>> + Send>>;

    #[tracing::instrument(skip_all, fields(id = %req.get_ref().id))]
    async fn push(&self, req: Request<Event>) -> Result<Response<Ack>, Status> {
        let event = req.into_inner();
        tracing::info!(event_type = %event.r#type, "saved event");
        self.queue.push(event);

        Ok(Response::new(Ack {}))
    }

    #[tracing::instrument(skip_all)]
    async fn pull(&self, _req: Request<PullRequest>) -> Result<Response<SingleEvent>, Status> {
        let event = self.queue.pull();

        match &event {
            Some(event) => tracing::info!(id = %event.id, event_type = %event.r#type, "sent event"),
            None => tracing::info!("no events in queue"),
        }

        Ok(Response::new(SingleEvent { event }))
    }

    /// Removes and returns the entire backlog as one message.
    ///
    /// The response grows with the backlog and can exceed the transport's
    /// per-message size ceiling; callers with unbounded backlogs should use
    /// `PullManyStream` instead.
    #[tracing::instrument(skip_all)]
    async fn pull_many(&self, _req: Request<PullRequest>) -> Result<Response<EventList>, Status> {
        let events = self.queue.pull_all();
        tracing::info!(count = events.len(), "sent events");

        Ok(Response::new(EventList { events }))
    }

    /// Streams a drain of the queue, one message per event, in queue order.
    ///
    /// The drain runs in a spawned task feeding a bounded channel, so a slow
    /// client applies backpressure to the drain without the queue lock ever
    /// being held across a send. If the client disconnects mid-stream, the
    /// drain stops; events already removed are not re-enqueued.
    #[tracing::instrument(skip_all)]
    async fn pull_many_stream(
        &self,
        _req: Request<PullRequest>,
    ) -> Result<Response<Self::PullManyStreamStream>, Status> {
        let queue = Arc::clone(&self.queue);
        let (tx, rx) = mpsc::channel(self.config.stream_buffer_size);

        tokio::spawn(async move {
            let mut sent = 0u64;
            for event in queue.drain() {
                if tx.send(Ok(event)).await.is_err() {
                    tracing::debug!(sent, "client disconnected mid-drain");
                    return;
                }
                sent += 1;
            }
            tracing::info!(sent, "sent events as stream");
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    #[tracing::instrument(skip_all)]
    async fn push_many_stream(
        &self,
        req: Request<Streaming<Event>>,
    ) -> Result<Response<AckWithCount>, Status> {
        let mut inbound = req.into_inner();
        let mut count = 0u64;

        // Events are enqueued one by one as they arrive; the inbound stream
        // may be unbounded, so nothing is collected first. An abort
        // mid-stream leaves the events already enqueued in place.
        while let Some(event) = inbound.message().await? {
            self.queue.push(event);
            count += 1;
        }

        tracing::info!(count, "saved events from stream");
        Ok(Response::new(AckWithCount { count }))
    }
}
