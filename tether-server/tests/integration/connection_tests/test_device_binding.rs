use tether_core::{DeviceId, ErrorCode, SERVER_ORIGIN, SignalMessage};

use crate::integration::{create_test_server, init_tracing};

#[tokio::test]
async fn test_errors_are_addressed_to_bound_device() {
    init_tracing();

    let server = create_test_server();
    let conn = server.connect().await.unwrap();

    // Not in a room yet, so the offer bounces back.
    server
        .offer(conn, "cam-5", "hub-5", serde_json::json!({}))
        .await
        .unwrap();
    server.sync().await.unwrap();

    let sent = server.signaling.messages_for(&conn).await;
    assert_eq!(sent.len(), 1);

    let envelope = &sent[0];
    assert_eq!(envelope.from, SERVER_ORIGIN);
    assert_eq!(envelope.to, "cam-5");
    assert_eq!(envelope.device_id, DeviceId::from("cam-5"));
    assert!(envelope.time.is_some());
    match &envelope.message {
        SignalMessage::Error(report) => {
            assert_eq!(report.error_code, ErrorCode::RoomNotExists);
            assert_eq!(report.error_message, "not in a room");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_device_id_sticks() {
    init_tracing();

    let server = create_test_server();
    let conn = server.connect().await.unwrap();

    server.leave(conn, "cam-5").await.unwrap();
    // A later frame claiming another id does not rebind the connection.
    server.send_raw(conn, r#"{"type":"bogus","device_id":"hub-9","from":"hub-9","to":"x"}"#).await.unwrap();
    server.sync().await.unwrap();

    let sent = server.signaling.messages_for(&conn).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "cam-5");
}

#[tokio::test]
async fn test_unknown_type_still_binds_device() {
    init_tracing();

    let server = create_test_server();
    let conn = server.connect().await.unwrap();

    server
        .send_raw(conn, r#"{"type":"hello","device_id":"cam-3","from":"cam-3","to":"cam-3"}"#)
        .await
        .unwrap();
    server.sync().await.unwrap();

    let sent = server.signaling.messages_for(&conn).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "cam-3");
    assert_eq!(
        server.signaling.error_codes_for(&conn).await,
        vec![ErrorCode::MessageFormatError]
    );
}
