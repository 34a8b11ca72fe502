use tether_core::ErrorCode;

use crate::integration::{create_test_server, init_tracing};

#[tokio::test]
async fn test_third_device_is_refused() {
    init_tracing();

    let server = create_test_server();
    let a = server.connect_and_join("cam-12").await.unwrap();
    let b = server.connect_and_join("hub-12").await.unwrap();
    let c = server.connect_and_join("tv-12").await.unwrap();

    let stats = server.sync().await.unwrap();
    assert_eq!(stats.total_rooms, 1);
    assert_eq!(stats.rooms[0].connection_count, 2);
    assert_eq!(stats.total_connections, 3);

    let errors = server.signaling.errors_for(&c).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_code, ErrorCode::RoomFull);
    assert_eq!(errors[0].error_message, "room is full");

    // The pair already in the room is left alone.
    assert!(server.signaling.errors_for(&a).await.is_empty());
    assert!(server.signaling.errors_for(&b).await.is_empty());
    assert!(server.signaling.roles_for(&c).await.is_empty());
}

#[tokio::test]
async fn test_refused_device_can_take_freed_slot() {
    init_tracing();

    let server = create_test_server();
    let a = server.connect_and_join("cam-12").await.unwrap();
    server.connect_and_join("hub-12").await.unwrap();
    let c = server.connect_and_join("tv-12").await.unwrap();
    server.sync().await.unwrap();

    server.disconnect(a).await.unwrap();
    server.join(c, "tv-12").await.unwrap();
    let stats = server.sync().await.unwrap();

    assert_eq!(stats.paired_rooms, 1);
    assert_eq!(server.signaling.roles_for(&c).await.len(), 1);
}
