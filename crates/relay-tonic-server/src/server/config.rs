use anyhow::bail;
use clap::Parser;

/// Runtime configuration for the `relay-tonic-server` binary.
///
/// All values are parsed from CLI arguments or environment variables, with
/// defaults suitable for a local demo deployment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "relay-tonic-server",
    version,
    about = "A gRPC demo service: messaging and eventing over a shared FIFO queue"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/relay-uds.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// Capacity of the buffer between a streaming handler and the gRPC
    /// response stream.
    ///
    /// Applies to `PullManyStream` drains and bidi replies. Lower values
    /// increase backpressure responsiveness; higher values enable deeper
    /// pipelining.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub stream_buffer_size: usize,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.server_addr.is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            stream_buffer_size: args.stream_buffer_size,
        })
    }
}
