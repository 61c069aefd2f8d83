//! Builds the gRPC client and server bindings for `relay.proto` using
//! `tonic-prost-build`.
//!
//! The `data` field of the `Event` message is explicitly mapped to `Bytes`
//! (from the `bytes` crate) instead of the default `Vec<u8>`, so envelope
//! payloads move through the queue and the wire without copies.
//!
//! A file descriptor set is also emitted into `OUT_DIR` for the server's
//! gRPC reflection endpoint.

use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("relay_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();

    // Ensure the opaque payload field is treated as `Bytes`, not `Vec<u8>`
    config
        .bytes([".relay.v1.Event.data"])
        .file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/relay.proto"], &["proto"])
        .unwrap();
}
