//! End-to-end tests: real sockets, real HTTP and WebSocket clients.

#![allow(clippy::panic, missing_docs)]

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use mopidy_http::config::FrontendConfig;
use mopidy_http::discovery::{
    DiscoveryTransport, HTTP_SERVICE_TYPE, MOPIDY_HTTP_SERVICE_TYPE, RegistrationHandle,
    ServiceRegistration,
};
use mopidy_http::domain::{Album, Artist, DomainEvent, EventBus, Track};
use mopidy_http::error::Result;
use mopidy_http::frontend::{Frontend, FrontendHandle};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Default)]
struct RecordingTransport {
    live: Mutex<Vec<ServiceRegistration>>,
}

impl RecordingTransport {
    fn live(&self) -> Vec<ServiceRegistration> {
        self.live.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl DiscoveryTransport for RecordingTransport {
    fn publish(&self, registration: &ServiceRegistration) -> Result<RegistrationHandle> {
        if let Ok(mut live) = self.live.lock() {
            live.push(registration.clone());
        }
        Ok(RegistrationHandle::new(registration.service_type.clone()))
    }

    fn unpublish(&self, handle: RegistrationHandle) -> Result<()> {
        if let Ok(mut live) = self.live.lock() {
            live.retain(|r| r.service_type != handle.as_str());
        }
        Ok(())
    }
}

fn free_port() -> u32 {
    let Ok(listener) = std::net::TcpListener::bind("127.0.0.1:0") else {
        panic!("loopback bind must work");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("bound listener has an address");
    };
    u32::from(addr.port())
}

fn http() -> reqwest::Client {
    let Ok(client) = reqwest::Client::builder().no_proxy().build() else {
        panic!("http client must build");
    };
    client
}

async fn get(url: &str) -> (u16, String) {
    let Ok(response) = http().get(url).send().await else {
        panic!("GET {url} failed");
    };
    let status = response.status().as_u16();
    let Ok(body) = response.text().await else {
        panic!("GET {url} body failed");
    };
    (status, body)
}

async fn connect(port: u32) -> WsClient {
    let url = format!("ws://127.0.0.1:{port}/mopidy/ws");
    let Ok((ws, _)) = tokio_tungstenite::connect_async(url.as_str()).await else {
        panic!("websocket connect to {url} failed");
    };
    ws
}

async fn next_json(ws: &mut WsClient) -> Value {
    let Ok(Some(Ok(message))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await
    else {
        panic!("no websocket message within 5s");
    };
    let Ok(text) = message.to_text() else {
        panic!("expected a text frame, got {message:?}");
    };
    let Ok(value) = serde_json::from_str(text) else {
        panic!("websocket frame is not JSON: {text}");
    };
    value
}

fn start_frontend(config: FrontendConfig) -> (FrontendHandle, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let frontend = Frontend::builder(config)
        .discovery(Arc::clone(&transport) as Arc<dyn DiscoveryTransport>)
        .spawn();
    (frontend, transport)
}

#[tokio::test]
async fn scenario_serves_broadcasts_and_advertises() {
    let port = free_port();
    let config = FrontendConfig::new("0.0.0.0", port).with_zeroconf_name("Test");
    let (frontend, transport) = start_frontend(config);

    let Ok(addr) = frontend.start().await else {
        panic!("start must succeed");
    };
    assert_eq!(u32::from(addr.port()), port);

    let live = transport.live();
    assert_eq!(live.len(), 2);
    assert!(live.iter().all(|r| r.name == "Test" && u32::from(r.port) == port));
    let types: BTreeSet<&str> = live.iter().map(|r| r.service_type.as_str()).collect();
    assert_eq!(types, BTreeSet::from([HTTP_SERVICE_TYPE, MOPIDY_HTTP_SERVICE_TYPE]));

    let base = format!("http://127.0.0.1:{port}");
    let (status, body) = get(&format!("{base}/")).await;
    assert_eq!(status, 200);
    assert!(body.contains("<h1>Mopidy</h1>"));

    let (status, body) = get(&format!("{base}/mopidy")).await;
    assert_eq!(status, 200);
    assert!(body.contains("Mopidy HTTP"));

    let (status, _) = get(&format!("{base}/mopidy/mopidy.css")).await;
    assert_eq!(status, 200);

    let (status, _) = get(&format!("{base}/mopidy/nope.js")).await;
    assert_eq!(status, 404);

    let Ok(favicon) = http().get(format!("{base}/favicon.ico")).send().await else {
        panic!("favicon request failed");
    };
    assert_eq!(favicon.status().as_u16(), 200);
    assert_eq!(
        favicon
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("image/png")
    );

    let mut ws = connect(port).await;
    let track = Track {
        uri: Some("local:track:intro.mp3".to_string()),
        name: Some("Intro".to_string()),
        artists: vec![Artist {
            name: Some("Band".to_string()),
            ..Artist::default()
        }],
        album: Some(Album {
            name: Some("Debut".to_string()),
            ..Album::default()
        }),
        length: Some(61_000),
        ..Track::default()
    };
    frontend.on_event(DomainEvent::new("track_playback_started").with_field("track", track));

    let message = next_json(&mut ws).await;
    assert_eq!(
        message,
        json!({
            "event": "track_playback_started",
            "track": {
                "__model__": "Track",
                "uri": "local:track:intro.mp3",
                "name": "Intro",
                "artists": [{"__model__": "Artist", "name": "Band"}],
                "album": {"__model__": "Album", "name": "Debut"},
                "length": 61_000
            }
        })
    );

    assert!(frontend.stop().await.is_ok());
    assert!(transport.live().is_empty());
    assert!(std::net::TcpListener::bind(addr).is_ok(), "socket must be released");
}

#[tokio::test]
async fn every_connection_receives_each_broadcast() {
    let port = free_port();
    let (frontend, _) = start_frontend(FrontendConfig::new("127.0.0.1", port));
    assert!(frontend.start().await.is_ok());

    let mut first = connect(port).await;
    let mut second = connect(port).await;
    frontend.on_event(DomainEvent::volume_changed(42));

    let expected = json!({"event": "volume_changed", "volume": 42});
    assert_eq!(next_json(&mut first).await, expected);
    assert_eq!(next_json(&mut second).await, expected);

    assert!(frontend.stop().await.is_ok());
}

#[tokio::test]
async fn unencodable_event_drops_only_itself() {
    let port = free_port();
    let (frontend, _) = start_frontend(FrontendConfig::new("127.0.0.1", port));
    assert!(frontend.start().await.is_ok());

    let mut ws = connect(port).await;
    frontend.on_event(DomainEvent::new("bad").with_field("value", f64::NAN));
    frontend.on_event(DomainEvent::mute_changed(true));

    assert_eq!(next_json(&mut ws).await, json!({"event": "mute_changed", "mute": true}));
    assert!(frontend.stop().await.is_ok());
}

#[tokio::test]
async fn event_bus_events_reach_websocket_clients() {
    let port = free_port();
    let bus = EventBus::new(16);
    let frontend = Frontend::builder(FrontendConfig::new("127.0.0.1", port))
        .discovery(Arc::new(RecordingTransport::default()) as Arc<dyn DiscoveryTransport>)
        .event_bus(bus.clone())
        .spawn();
    assert!(frontend.start().await.is_ok());

    let mut ws = connect(port).await;
    bus.publish(DomainEvent::seeked(30_000));

    assert_eq!(
        next_json(&mut ws).await,
        json!({"event": "seeked", "time_position": 30_000})
    );
    assert!(frontend.stop().await.is_ok());
}

#[tokio::test]
async fn stop_closes_open_connections_and_later_events_are_dropped() {
    let port = free_port();
    let (frontend, _) = start_frontend(FrontendConfig::new("127.0.0.1", port));
    assert!(frontend.start().await.is_ok());
    let mut ws = connect(port).await;

    assert!(frontend.stop().await.is_ok());

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "connection must be closed by stop");

    frontend.on_event(DomainEvent::tracklist_changed());
    assert!(frontend.stop().await.is_ok());
}

#[tokio::test]
async fn websocket_requests_are_answered() {
    let port = free_port();
    let (frontend, _) = start_frontend(FrontendConfig::new("127.0.0.1", port));
    assert!(frontend.start().await.is_ok());
    let mut ws = connect(port).await;

    let request = json!({"jsonrpc": "2.0", "id": 1, "method": "core.get_version"});
    assert!(ws.send(Message::text(request.to_string())).await.is_ok());
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["id"], 1);
    assert_eq!(reply["error"]["code"], -32601);

    assert!(ws.send(Message::text("not json")).await.is_ok());
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(reply["error"]["code"], -32700);

    assert!(frontend.stop().await.is_ok());
}

#[tokio::test]
async fn custom_static_dir_is_served_at_root() {
    let port = free_port();
    let dir: PathBuf = std::env::temp_dir().join(format!("mopidy-http-static-{port}"));
    assert!(std::fs::create_dir_all(&dir).is_ok());
    assert!(std::fs::write(dir.join("index.html"), "<p>custom client</p>").is_ok());

    let config = FrontendConfig::new("127.0.0.1", port).with_static_dir(&dir);
    let (frontend, _) = start_frontend(config);
    assert!(frontend.start().await.is_ok());

    let (status, body) = get(&format!("http://127.0.0.1:{port}/")).await;
    assert_eq!(status, 200);
    assert!(body.contains("custom client"));

    let (status, body) = get(&format!("http://127.0.0.1:{port}/mopidy/")).await;
    assert_eq!(status, 200);
    assert!(body.contains("Mopidy HTTP"));

    assert!(frontend.stop().await.is_ok());
    let _ = std::fs::remove_dir_all(&dir);
}
