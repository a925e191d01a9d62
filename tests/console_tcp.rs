//! End-to-end console tests over loopback TCP.

#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use shade_console::config::ConsoleConfig;
use shade_console::console::Console;
use shade_console::domain::{MemoryRegistry, ShadeController, ShadeId};
use shade_console::server;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    registry: Arc<MemoryRegistry>,
    addr: std::net::SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Harness {
    async fn start(config: ConsoleConfig) -> Self {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind loopback");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("local addr");
        };
        let registry = Arc::new(MemoryRegistry::demo());
        let controller: Arc<dyn ShadeController> = Arc::clone(&registry) as _;
        let console = Console::new(controller, &config);
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(server::serve(
            listener,
            console,
            config.poll_interval,
            async move {
                let _ = stopped.await;
            },
        ));
        Self {
            registry,
            addr,
            stop: Some(stop),
            task,
        }
    }

    async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = tokio::time::timeout(WAIT, self.task).await;
    }
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let Ok(stream) = tokio::net::TcpStream::connect(addr).await else {
            panic!("connect to console");
        };
        let (read, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        let payload = format!("{line}\r\n");
        let Ok(()) = self.writer.write_all(payload.as_bytes()).await else {
            panic!("write to console");
        };
    }

    /// Next line with its CRLF stripped, or `None` at EOF.
    async fn line(&mut self) -> Option<String> {
        let mut buf = String::new();
        let Ok(read) = tokio::time::timeout(WAIT, self.reader.read_line(&mut buf)).await else {
            panic!("timed out waiting for console output");
        };
        match read {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(buf.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    async fn record(&mut self) -> Option<Value> {
        let line = self.line().await?;
        let Ok(value) = serde_json::from_str(&line) else {
            panic!("not a JSON record: {line}");
        };
        Some(value)
    }

    /// Skips records until one satisfies `pred`.
    async fn expect(&mut self, pred: impl Fn(&Value) -> bool) -> Value {
        loop {
            let Some(record) = self.record().await else {
                panic!("connection closed before expected record");
            };
            if pred(&record) {
                return record;
            }
        }
    }
}

fn config() -> ConsoleConfig {
    ConsoleConfig {
        poll_interval: Duration::from_millis(10),
        broadcast_interval: Duration::from_millis(20),
        max_sessions: 2,
        ..ConsoleConfig::default()
    }
}

fn event(record: &Value) -> &str {
    record.get("event").and_then(Value::as_str).unwrap_or_default()
}

#[tokio::test]
async fn greets_with_welcome_and_listing() {
    let harness = Harness::start(config()).await;
    let mut client = Client::connect(harness.addr).await;

    let Some(welcome) = client.record().await else {
        panic!("expected welcome");
    };
    assert_eq!(event(&welcome), "welcome");
    for _ in 0..3 {
        let Some(state) = client.record().await else {
            panic!("expected state record");
        };
        assert_eq!(event(&state), "state");
    }
    harness.stop().await;
}

#[tokio::test]
async fn command_is_acknowledged_and_external_change_broadcast() {
    let harness = Harness::start(config()).await;
    let mut client = Client::connect(harness.addr).await;

    client.send("target 1 40").await;
    let ack = client.expect(|r| event(r) == "command").await;
    assert_eq!(ack.get("id").and_then(Value::as_u64), Some(1));
    assert_eq!(ack.get("target").and_then(Value::as_u64), Some(40));

    let Some(id) = ShadeId::new(2) else {
        panic!("valid id");
    };
    let _ = harness.registry.update(id, |s| s.position = 77);
    let update = client
        .expect(|r| {
            event(r) == "update"
                && r.get("id").and_then(Value::as_u64) == Some(2)
                && r.get("pos").and_then(Value::as_u64) == Some(77)
        })
        .await;
    assert_eq!(update.get("name").and_then(Value::as_str), Some("Bedroom"));
    harness.stop().await;
}

#[tokio::test]
async fn errors_do_not_close_the_session() {
    let harness = Harness::start(config()).await;
    let mut client = Client::connect(harness.addr).await;

    client.send("frobnicate").await;
    let err = client.expect(|r| event(r) == "error").await;
    assert_eq!(err.get("code").and_then(Value::as_u64), Some(1002));

    client.send("shade 2").await;
    let state = client
        .expect(|r| event(r) == "state" && r.get("id").and_then(Value::as_u64) == Some(2))
        .await;
    assert_eq!(state.get("name").and_then(Value::as_str), Some("Bedroom"));
    harness.stop().await;
}

#[tokio::test]
async fn quit_says_bye_and_closes() {
    let harness = Harness::start(config()).await;
    let mut client = Client::connect(harness.addr).await;

    client.send("quit").await;
    let bye = client.expect(|r| event(r) == "bye").await;
    assert!(bye.get("reason").is_none());
    assert!(client.line().await.is_none());
    harness.stop().await;
}

#[tokio::test]
async fn full_console_turns_connections_away() {
    let harness = Harness::start(config()).await;
    let mut first = Client::connect(harness.addr).await;
    let mut second = Client::connect(harness.addr).await;
    let _ = first.expect(|r| event(r) == "welcome").await;
    let _ = second.expect(|r| event(r) == "welcome").await;

    let mut third = Client::connect(harness.addr).await;
    let rejection = third.expect(|r| event(r) == "error").await;
    assert_eq!(rejection.get("code").and_then(Value::as_u64), Some(3006));
    assert!(third.line().await.is_none());

    first.send("list").await;
    let _ = first.expect(|r| event(r) == "state").await;
    harness.stop().await;
}

#[tokio::test]
async fn shutdown_says_goodbye() {
    let harness = Harness::start(config()).await;
    let mut client = Client::connect(harness.addr).await;
    let _ = client.expect(|r| event(r) == "welcome").await;

    harness.stop().await;
    let bye = client.expect(|r| event(r) == "bye").await;
    assert_eq!(bye.get("reason").and_then(Value::as_str), Some("shutdown"));
}

#[tokio::test]
async fn rejected_connection_burst_does_not_stall_broadcasts() {
    let harness = Harness::start(ConsoleConfig {
        max_sessions: 1,
        ..config()
    })
    .await;
    let mut client = Client::connect(harness.addr).await;
    let _ = client.expect(|r| event(r) == "welcome").await;

    let addr = harness.addr;
    let burst = tokio::spawn(async move {
        for _ in 0..200 {
            let _ = tokio::net::TcpStream::connect(addr).await;
        }
    });

    let Some(id) = ShadeId::new(1) else {
        panic!("valid id");
    };
    let _ = harness.registry.update(id, |s| s.position = 33);
    let _ = client
        .expect(|r| {
            event(r) == "update"
                && r.get("id").and_then(Value::as_u64) == Some(1)
                && r.get("pos").and_then(Value::as_u64) == Some(33)
        })
        .await;

    let _ = burst.await;
    harness.stop().await;
}
