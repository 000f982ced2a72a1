use warehouse_api::{
    entity::sale_orders::OrderStatus,
    error::AppError,
    services::stock_ledger::{NO_CHANGES, NOT_ENOUGH_STOCK, line_total, rebalance, release, reserve},
};

#[tokio::test]
async fn reserve_takes_requested_units() {
    assert_eq!(reserve(10, 3).unwrap(), -3);
    assert_eq!(reserve(10, 10).unwrap(), -10);
}

#[tokio::test]
async fn reserve_rejects_more_than_available() {
    let err = reserve(4, 5).unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m == NOT_ENOUGH_STOCK));
}

#[tokio::test]
async fn rebalance_counts_units_already_held() {
    // stock 7 after selling 3; raising the line to 5 takes two more
    assert_eq!(rebalance(7, 3, 5).unwrap(), -2);
    // the line may grow up to what is on the shelf plus what it holds
    assert_eq!(rebalance(7, 3, 10).unwrap(), -7);
    // shrinking gives stock back
    assert_eq!(rebalance(0, 10, 1).unwrap(), 9);
}

#[tokio::test]
async fn rebalance_rejects_no_change_and_overdraw() {
    let same = rebalance(7, 3, 3).unwrap_err();
    assert!(matches!(same, AppError::Conflict(ref m) if m == NO_CHANGES));

    let over = rebalance(7, 3, 11).unwrap_err();
    assert!(matches!(over, AppError::Conflict(ref m) if m.contains("Only 7 more units")));
}

#[tokio::test]
async fn release_returns_stock_only_for_undelivered_orders() {
    assert_eq!(release(OrderStatus::Placed, 4), 4);
    assert_eq!(release(OrderStatus::Delivered, 4), 0);
}

#[tokio::test]
async fn line_total_multiplies_and_guards_overflow() {
    assert_eq!(line_total(5, 3).unwrap(), 15);
    assert!(matches!(
        line_total(i64::MAX, 2).unwrap_err(),
        AppError::BadRequest(_)
    ));
}

#[tokio::test]
async fn status_toggle_is_bidirectional() {
    assert_eq!(OrderStatus::Placed.toggled(), OrderStatus::Delivered);
    assert_eq!(OrderStatus::Delivered.toggled(), OrderStatus::Placed);
    assert_eq!(
        OrderStatus::from_label(OrderStatus::Delivered.label()),
        Some(OrderStatus::Delivered)
    );
    assert_eq!(OrderStatus::from_label("Shipped"), None);
}
