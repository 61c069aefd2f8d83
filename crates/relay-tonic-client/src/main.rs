#![doc = include_str!("../README.md")]

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::Rng;
use relay_tonic_core::envelope::{self, MessageSent, Payload, PayloadRegistry, UserCreated};
use relay_tonic_core::proto::{
    Event, Message, PullRequest, eventing_client::EventingClient,
    messaging_client::MessagingClient,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Channel;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "relay-tonic-client",
    version,
    about = "Command-line driver for the relay demo service"
)]
struct CliArgs {
    /// Server endpoint to connect to.
    ///
    /// Environment variable: `SERVER_URL`
    #[arg(long, env = "SERVER_URL", default_value_t = String::from("http://127.0.0.1:50051"))]
    server_url: String,

    /// Compress request payloads with zstd.
    #[arg(long, default_value_t = false)]
    compress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message (unary, empty acknowledgement).
    Send,
    /// Send one message and print the server's reply.
    SendWithReply,
    /// Stream messages to the server, then half-close.
    SendStream {
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Delay between writes, in milliseconds (0 disables pacing).
        #[arg(long, default_value_t = 200)]
        pace_ms: u64,
    },
    /// Stream messages, reading the paired reply after each write.
    SendStreamWithReplyStream {
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Delay between writes, in milliseconds (0 disables pacing).
        #[arg(long, default_value_t = 200)]
        pace_ms: u64,
    },
    /// Push one random demo event.
    Push,
    /// Pull one event and decode its payload.
    Pull,
    /// Stream many random demo events to the queue.
    PushManyStream {
        #[arg(long, default_value_t = 10_000)]
        count: usize,
    },
    /// Pull the whole backlog as one message (beware the transport's
    /// message-size ceiling on large backlogs).
    PullMany,
    /// Pull the whole backlog as a stream.
    PullManyStream,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    let channel = Channel::from_shared(args.server_url.clone())
        .context("invalid server URL")?
        .connect()
        .await
        .with_context(|| format!("failed to connect to {}", args.server_url))?;

    let mut messaging = MessagingClient::new(channel.clone());
    let mut eventing = EventingClient::new(channel);
    if args.compress {
        messaging = messaging
            .send_compressed(CompressionEncoding::Zstd)
            .accept_compressed(CompressionEncoding::Zstd);
        eventing = eventing
            .send_compressed(CompressionEncoding::Zstd)
            .accept_compressed(CompressionEncoding::Zstd);
    }

    // Decoders are registered once at startup; pulls query the registry.
    let registry = PayloadRegistry::with_demo_payloads();

    match args.command {
        Command::Send => send(&mut messaging).await,
        Command::SendWithReply => send_with_reply(&mut messaging).await,
        Command::SendStream { count, pace_ms } => send_stream(&mut messaging, count, pace_ms).await,
        Command::SendStreamWithReplyStream { count, pace_ms } => {
            send_stream_with_reply_stream(&mut messaging, count, pace_ms).await
        }
        Command::Push => push(&mut eventing).await,
        Command::Pull => pull(&mut eventing, &registry).await,
        Command::PushManyStream { count } => push_many_stream(&mut eventing, count).await,
        Command::PullMany => pull_many(&mut eventing).await,
        Command::PullManyStream => pull_many_stream(&mut eventing).await,
    }
}

async fn send(client: &mut MessagingClient<Channel>) -> anyhow::Result<()> {
    client.send(create_message()).await?;
    println!("+ Message sent +");

    Ok(())
}

async fn send_with_reply(client: &mut MessagingClient<Channel>) -> anyhow::Result<()> {
    let reply = client.send_with_reply(create_message()).await?.into_inner();
    println!("+ Message with reply sent +");
    println!("{}", message_text(&reply));

    Ok(())
}

async fn send_stream(
    client: &mut MessagingClient<Channel>,
    count: usize,
    pace_ms: u64,
) -> anyhow::Result<()> {
    println!("* Sending messages stream *");

    let (tx, rx) = mpsc::channel(1);
    let writer = tokio::spawn(async move {
        for _ in 0..count {
            if tx.send(create_message()).await.is_err() {
                break;
            }
            println!("+ Message in stream sent +");
            pace(pace_ms).await;
        }
    });

    client.send_stream(ReceiverStream::new(rx)).await?;
    writer.await?;

    println!("* Messages stream sent *");
    Ok(())
}

async fn send_stream_with_reply_stream(
    client: &mut MessagingClient<Channel>,
    count: usize,
    pace_ms: u64,
) -> anyhow::Result<()> {
    println!("* Sending messages stream with reply stream *");

    let (tx, rx) = mpsc::channel(1);
    let mut inbound = client
        .send_stream_with_reply_stream(ReceiverStream::new(rx))
        .await?
        .into_inner();

    for _ in 0..count {
        tx.send(create_message())
            .await
            .map_err(|_| anyhow::anyhow!("server closed the call early"))?;
        println!("+ Message in stream sent +");

        if let Some(reply) = inbound.message().await? {
            println!("{}", message_text(&reply));
        }
        pace(pace_ms).await;
    }

    // Half-close our side, then drain any replies still in flight.
    drop(tx);
    while inbound.message().await?.is_some() {}

    println!("* Messages stream with reply stream completed *");
    Ok(())
}

async fn push(client: &mut EventingClient<Channel>) -> anyhow::Result<()> {
    let event = create_random_event()?;
    let (id, event_type) = (event.id.clone(), event.r#type.clone());
    println!("+ Pushing an event of type '{event_type}', with id: '{id}' +");

    client.push(event).await?;

    println!("+ Pushed an event of type '{event_type}', with id: '{id}' +");
    Ok(())
}

async fn pull(
    client: &mut EventingClient<Channel>,
    registry: &PayloadRegistry,
) -> anyhow::Result<()> {
    println!("- Pulling an event -");

    let pulled = client.pull(PullRequest {}).await?.into_inner();
    let Some(event) = pulled.event else {
        println!("* No events available *");
        return Ok(());
    };

    println!("- Pulled an event of type '{}' -", event.r#type);
    process_event(registry, &event);

    Ok(())
}

async fn push_many_stream(client: &mut EventingClient<Channel>, count: usize) -> anyhow::Result<()> {
    println!("+ Pushing {count} event(s) as stream +");

    let events = (0..count)
        .map(|_| create_random_event())
        .collect::<anyhow::Result<Vec<_>>>()?;

    let start = Instant::now();
    let ack = client
        .push_many_stream(tokio_stream::iter(events))
        .await?
        .into_inner();

    println!(
        "+ Pushed {} event(s) as stream in {} ms +",
        ack.count,
        start.elapsed().as_millis()
    );
    Ok(())
}

async fn pull_many(client: &mut EventingClient<Channel>) -> anyhow::Result<()> {
    println!("- Pulling events -");

    let start = Instant::now();
    let events = client.pull_many(PullRequest {}).await?.into_inner().events;
    if events.is_empty() {
        println!("* No events available *");
        return Ok(());
    }

    println!(
        "- Pulled {} events in {} ms -",
        events.len(),
        start.elapsed().as_millis()
    );
    Ok(())
}

async fn pull_many_stream(client: &mut EventingClient<Channel>) -> anyhow::Result<()> {
    println!("- Pulling events as stream -");

    let start = Instant::now();
    let mut stream = client.pull_many_stream(PullRequest {}).await?.into_inner();

    let mut count = 0usize;
    while let Some(_event) = stream.message().await? {
        count += 1;
    }

    if count == 0 {
        println!("* No events available *");
        return Ok(());
    }

    println!(
        "- Pulled {count} events as stream in {} ms -",
        start.elapsed().as_millis()
    );
    Ok(())
}

fn process_event(registry: &PayloadRegistry, event: &Event) {
    println!("- Processing event: '{}' -", event.r#type);
    match registry.decode_event(event) {
        Ok(Payload::MessageSent(payload)) => {
            println!(
                "- Data -> id: '{}', content: '{}' -",
                payload.id, payload.content
            );
        }
        Ok(Payload::UserCreated(payload)) => {
            println!("- Data -> id: '{}', name: '{}' -", payload.id, payload.name);
        }
        // Unknown or malformed payloads are reported, not fatal: the event
        // itself was still delivered.
        Err(err) => println!("! {err} !"),
    }
}

async fn pace(pace_ms: u64) {
    if pace_ms > 0 {
        tokio::time::sleep(Duration::from_millis(pace_ms)).await;
    }
}

fn create_message() -> Message {
    Message {
        id: Uuid::new_v4().simple().to_string(),
        user: "client".to_owned(),
        content: "Hello from relay client!".to_owned(),
    }
}

fn create_random_event() -> anyhow::Result<Event> {
    let id = Uuid::new_v4().simple().to_string();

    let event = if rand::rng().random_bool(0.5) {
        envelope::envelope(
            id,
            &MessageSent {
                id: Uuid::new_v4().simple().to_string(),
                from: "sender".to_owned(),
                to: "receiver".to_owned(),
                content: "hello".to_owned(),
                created_at: Utc::now(),
            },
        )?
    } else {
        envelope::envelope(
            id,
            &UserCreated {
                id: Uuid::new_v4().simple().to_string(),
                name: "user".to_owned(),
                email: "user@user.com".to_owned(),
            },
        )?
    };

    Ok(event)
}

fn message_text(message: &Message) -> String {
    format!(
        "- Received message -> id: '{}', user: '{}', content: '{}' -",
        message.id, message.user, message.content
    )
}
