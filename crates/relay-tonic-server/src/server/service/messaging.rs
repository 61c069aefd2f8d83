//! The `Messaging` gRPC service.
//!
//! Implements the free-form half of the demo protocol: a unary send, a
//! unary send with a constructed reply, a client-stream consumed
//! incrementally, and a bidi stream that pairs each inbound request with at
//! most one outbound reply.

use crate::server::config::ServerConfig;
use core::pin::Pin;
use relay_tonic_core::proto::{Ack, Message, messaging_server::Messaging};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tonic::{Request, Response, Status, Streaming};
use uuid::Uuid;

/// Handler for the `relay.v1.Messaging` service.
///
/// Stateless apart from configuration: messages exist only for the duration
/// of one RPC exchange and are never persisted.
#[derive(Clone)]
pub struct MessagingService {
    config: ServerConfig,
}

impl MessagingService {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Constructs a fresh server-minted reply to `request`.
    fn reply_to(request: &Message) -> Message {
        Message {
            id: Uuid::new_v4().simple().to_string(),
            user: "server".to_owned(),
            content: format!("Hello from server, {}!", request.user),
        }
    }
}

#[tonic::async_trait]
impl Messaging for MessagingService {
    type SendStreamWithReplyStreamStream =
        Pin<Box<dyn Stream<Item = Result<Message, Status>> + Send>>;

    #[tracing::instrument(skip_all, fields(id = %req.get_ref().id))]
    async fn send(&self, req: Request<Message>) -> Result<Response<Ack>, Status> {
        let message = req.into_inner();
        tracing::info!(user = %message.user, content = %message.content, "received message");

        Ok(Response::new(Ack {}))
    }

    #[tracing::instrument(skip_all, fields(id = %req.get_ref().id))]
    async fn send_with_reply(&self, req: Request<Message>) -> Result<Response<Message>, Status> {
        let message = req.into_inner();
        tracing::info!(user = %message.user, content = %message.content, "received message, sending reply");

        Ok(Response::new(Self::reply_to(&message)))
    }

    #[tracing::instrument(skip_all)]
    async fn send_stream(&self, req: Request<Streaming<Message>>) -> Result<Response<Ack>, Status> {
        let mut inbound = req.into_inner();
        let mut received = 0u64;

        // The stream is not assumed to be bounded: each message is handled
        // as it arrives, in the order the client wrote it.
        while let Some(message) = inbound.message().await? {
            received += 1;
            tracing::debug!(id = %message.id, user = %message.user, "message in stream");
        }

        tracing::info!(received, "messages stream completed");
        Ok(Response::new(Ack {}))
    }

    /// Pairs each inbound message with one reply, written after that
    /// message is read and before the next one is taken from the stream.
    ///
    /// The reply stream ends when the client half-closes. Pairing is a
    /// property of this handler, not of the wire contract: a client is free
    /// to write several requests before reading any replies.
    #[tracing::instrument(skip_all)]
    async fn send_stream_with_reply_stream(
        &self,
        req: Request<Streaming<Message>>,
    ) -> Result<Response<Self::SendStreamWithReplyStreamStream>, Status> {
        let mut inbound = req.into_inner();
        let (tx, rx) = mpsc::channel(self.config.stream_buffer_size);

        tokio::spawn(async move {
            loop {
                match inbound.message().await {
                    Ok(Some(message)) => {
                        tracing::debug!(id = %message.id, user = %message.user, "message in stream");
                        let reply = Self::reply_to(&message);
                        if tx.send(Ok(reply)).await.is_err() {
                            // Client stopped reading replies; abandon the call.
                            break;
                        }
                    }
                    // Half-close: the client is done writing, so we are done
                    // replying.
                    Ok(None) => break,
                    Err(status) => {
                        let _ = tx.send(Err(status)).await;
                        break;
                    }
                }
            }
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}
