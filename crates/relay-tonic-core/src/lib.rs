#![doc = include_str!("../README.md")]

mod common;
pub use common::*;
// Public re-export so downstream crates can access the queue via
// `relay_tonic_core::relay_queue`
pub use relay_queue;

/// Generated protobuf types and gRPC bindings for `relay.v1`.
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/relay.v1.rs"));

    /// Encoded file descriptor set, served via gRPC reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        include_bytes!(concat!(env!("OUT_DIR"), "/relay_descriptor.bin"));
}
