//! gRPC service implementations.
//!
//! Both services are thin: they translate the wire protocol into operations
//! on the shared [`EventQueue`](relay_tonic_core::relay_queue::EventQueue)
//! and the envelope types, and keep strict per-call message ordering for
//! every streaming shape.
//!
//! ## Structure
//!
//! - [`messaging`] - the free-form `Messaging` service (unary,
//!   client-stream, bidi-stream).
//! - [`eventing`] - the `Eventing` service over the shared queue (unary
//!   push/pull, server-stream drain, client-stream bulk push).

mod eventing;
mod messaging;

pub use eventing::EventingService;
pub use messaging::MessagingService;
