use super::*;

use std::{env, fs, time::Duration};

use axum::{
    body,
    body::Body,
    http::{Request, StatusCode},
};
use futures::{SinkExt, StreamExt};
use shared::protocol::HistoryPayload;
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

fn test_state() -> Arc<AppState> {
    let (events, _) = broadcast::channel(32);
    Arc::new(AppState { events })
}

async fn spawn_relay() -> SocketAddr {
    let app = build_router(test_state(), "public");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (stream, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect");
    stream
}

fn sample_payload() -> HistoryPayload {
    HistoryPayload {
        result: 14.0,
        expression_text: "3 x 4 + 2".to_string(),
        tokens: vec![
            "3".to_string(),
            "multiply".to_string(),
            "4".to_string(),
            "add".to_string(),
            "2".to_string(),
        ],
    }
}

async fn publish(client: &mut WsClient, payload: &HistoryPayload) {
    let frame =
        serde_json::to_string(&ClientMessage::History(payload.clone())).expect("serialize");
    client
        .send(tungstenite::Message::Text(frame))
        .await
        .expect("send");
}

async fn expect_history_logged(client: &mut WsClient) -> HistoryPayload {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("echo within deadline")
            .expect("stream open")
            .expect("frame");
        if let tungstenite::Message::Text(text) = frame {
            match serde_json::from_str::<ServerEvent>(&text).expect("server event") {
                ServerEvent::HistoryLogged(payload) => return payload,
            }
        }
    }
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = build_router(test_state(), "public");
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(bytes.as_ref(), b"ok");
}

#[tokio::test]
async fn root_serves_the_client_application() {
    let assets = env::temp_dir().join(format!("calc_relay_assets_{}", std::process::id()));
    fs::create_dir_all(&assets).expect("assets dir");
    fs::write(assets.join("index.html"), "<html>calculator</html>").expect("index");

    let app = build_router(test_state(), assets.to_string_lossy().as_ref());
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert!(bytes.as_ref().starts_with(b"<html>"));

    fs::remove_dir_all(assets).expect("cleanup");
}

#[tokio::test]
async fn history_is_echoed_to_every_connected_client_including_the_sender() {
    let addr = spawn_relay().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    // Give the server a beat to register both subscriptions.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let payload = sample_payload();
    publish(&mut alice, &payload).await;

    assert_eq!(expect_history_logged(&mut alice).await, payload);
    assert_eq!(expect_history_logged(&mut bob).await, payload);
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_killing_the_connection() {
    let addr = spawn_relay().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    alice
        .send(tungstenite::Message::Text("not json".to_string()))
        .await
        .expect("send garbage");

    let payload = sample_payload();
    publish(&mut alice, &payload).await;
    assert_eq!(expect_history_logged(&mut alice).await, payload);
    assert_eq!(expect_history_logged(&mut bob).await, payload);
}

#[tokio::test]
async fn relay_retains_nothing_for_late_joiners() {
    let addr = spawn_relay().await;
    let mut alice = connect(addr).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let payload = sample_payload();
    publish(&mut alice, &payload).await;
    assert_eq!(expect_history_logged(&mut alice).await, payload);

    // A client connecting after the broadcast sees nothing until the next
    // publish.
    let mut carol = connect(addr).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = HistoryPayload {
        result: 7.0,
        expression_text: "7".to_string(),
        tokens: vec!["7".to_string()],
    };
    publish(&mut alice, &second).await;
    assert_eq!(expect_history_logged(&mut carol).await, second);
}

#[tokio::test]
async fn full_client_stack_round_trips_through_the_relay() {
    use client_core::{CalcClient, Command, OpId, SessionEvent, WsRelay};

    let addr = spawn_relay().await;
    let relay = Arc::new(
        WsRelay::connect(&format!("http://{addr}"))
            .await
            .expect("relay client"),
    );
    let client = CalcClient::new(relay);
    let mut events = client.subscribe_events();
    tokio::time::sleep(Duration::from_millis(100)).await;

    for command in [
        Command::Digit('3'),
        Command::Op(OpId::Multiply),
        Command::Digit('4'),
        Command::Op(OpId::Add),
        Command::Digit('2'),
        Command::Equals,
    ] {
        client.handle_input(command).await.expect("command");
    }

    let display = loop {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("echo within deadline")
            .expect("event stream open");
        match event {
            SessionEvent::HistoryLogged { display } => break display,
            SessionEvent::Error(message) => panic!("unexpected error: {message}"),
        }
    };
    assert_eq!(display, "14");

    let history = client.history_snapshot().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].expression_text, "3 x 4 + 2");
}
