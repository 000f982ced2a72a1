use warehouse_api::{response::Status, routes::health::health_check};

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");
    assert_eq!(response.0.status, Status::Success);
    assert!(response.0.data.is_some());
}
