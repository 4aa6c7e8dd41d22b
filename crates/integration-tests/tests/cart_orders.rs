//! Database tests for the cart and order placement.
//!
//! Each test runs against a fresh database created by `#[sqlx::test]` with
//! the API migrations applied. Requires `DATABASE_URL` pointing at a
//! `PostgreSQL` server the tests may create databases on.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use amork_api::db::FoodRepository;
use amork_api::db::foods::FoodChanges;
use amork_api::services::orders::{OrderLineInput, PlaceOrder};
use amork_api::services::{CartService, OrderService, ServiceError};
use amork_core::order_number::is_order_number;
use amork_core::{MAX_LINE_QUANTITY, OrderStatus, PaymentMethod, PaymentStatus};
use amork_integration_tests::{count_rows, create_category, create_food, create_user, dec, pricing};
use sqlx::PgPool;

// =============================================================================
// Cart
// =============================================================================

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_adding_same_food_twice_merges_lines(pool: PgPool) {
    let user = create_user(&pool, "Merge Tester").await;
    let category = create_category(&pool, "Food").await;
    let wings = create_food(&pool, category, "Spicy Wings", "3.00").await;

    let cart = CartService::new(&pool);
    cart.add_item(user.id, wings.id, 2, None).await.unwrap();
    let line = cart
        .add_item(user.id, wings.id, 3, Some("extra hot"))
        .await
        .unwrap();

    assert_eq!(line.quantity, 5);
    assert_eq!(line.special_instructions.as_deref(), Some("extra hot"));

    let view = cart.get(user.id).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.item_count, 5);
    assert_eq!(view.total, dec("15.00"));
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_add_clamps_quantity_and_rejects_unknown_food(pool: PgPool) {
    let user = create_user(&pool, "Clamp Tester").await;
    let category = create_category(&pool, "Drinks").await;
    let coffee = create_food(&pool, category, "Iced Coffee", "1.75").await;

    let cart = CartService::new(&pool);
    let line = cart.add_item(user.id, coffee.id, 0, None).await.unwrap();
    assert_eq!(line.quantity, 1);

    let missing = amork_core::FoodId::generate();
    let err = cart.add_item(user.id, missing, 1, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("food")));
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_line_quantity_is_bounded(pool: PgPool) {
    let user = create_user(&pool, "Bulk Buyer").await;
    let category = create_category(&pool, "Snacks").await;
    let nuggets = create_food(&pool, category, "Chicken Nuggets", "2.00").await;

    let cart = CartService::new(&pool);
    let err = cart
        .add_item(user.id, nuggets.id, MAX_LINE_QUANTITY + 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));
    assert_eq!(count_rows(&pool, "cart_items").await, 0);

    cart.add_item(user.id, nuggets.id, 60, None).await.unwrap();
    let line = cart.add_item(user.id, nuggets.id, 60, None).await.unwrap();
    assert_eq!(line.quantity, MAX_LINE_QUANTITY);

    for quantity in [0, MAX_LINE_QUANTITY + 1, i32::MAX] {
        let err = cart
            .update_quantity(user.id, line.id, quantity)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }
    let line = cart.update_quantity(user.id, line.id, 7).await.unwrap();
    assert_eq!(line.quantity, 7);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cart_lines_are_private(pool: PgPool) {
    let owner = create_user(&pool, "Owner").await;
    let other = create_user(&pool, "Other").await;
    let category = create_category(&pool, "Snacks").await;
    let fries = create_food(&pool, category, "Crispy Fries", "1.50").await;

    let cart = CartService::new(&pool);
    let line = cart.add_item(owner.id, fries.id, 1, None).await.unwrap();

    let err = cart.update_quantity(other.id, line.id, 4).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    let err = cart.remove_item(other.id, line.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    assert_eq!(cart.clear(owner.id).await.unwrap(), 1);
}

// =============================================================================
// Placement
// =============================================================================

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cart_checkout_totals_and_empties_cart(pool: PgPool) {
    let user = create_user(&pool, "Burger Fan").await;
    let category = create_category(&pool, "Food").await;
    let burger = create_food(&pool, category, "Beef Burger", "5.50").await;

    let cart = CartService::new(&pool);
    cart.add_item(user.id, burger.id, 2, None).await.unwrap();

    let detail = OrderService::new(&pool, pricing())
        .place(user.id, PlaceOrder::default())
        .await
        .unwrap();

    assert_eq!(detail.order.subtotal, dec("11.00"));
    assert_eq!(detail.order.delivery_fee, dec("1.00"));
    assert_eq!(detail.order.discount, dec("0"));
    assert_eq!(detail.order.total, dec("12.00"));
    assert_eq!(detail.order.status, OrderStatus::Confirmed);
    assert_eq!(detail.order.payment_status, PaymentStatus::Paid);
    assert_eq!(detail.order.payment_method, PaymentMethod::CashOnDelivery);
    assert!(is_order_number(&detail.order.order_number));

    assert_eq!(detail.items.len(), 1);
    let line = &detail.items[0];
    assert_eq!(line.line_number, 1);
    assert_eq!(line.food_name, "Beef Burger");
    assert_eq!(line.unit_price, dec("5.50"));
    assert_eq!(line.subtotal, dec("11.00"));

    let view = cart.get(user.id).await.unwrap();
    assert!(view.items.is_empty());
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_empty_checkout_persists_nothing(pool: PgPool) {
    let user = create_user(&pool, "Window Shopper").await;

    let err = OrderService::new(&pool, pricing())
        .place(user.id, PlaceOrder::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::FailedPrecondition(_)));
    assert_eq!(count_rows(&pool, "orders").await, 0);
    assert_eq!(count_rows(&pool, "order_items").await, 0);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_invalid_promo_rolls_back_and_keeps_cart(pool: PgPool) {
    let user = create_user(&pool, "Promo Hopeful").await;
    let category = create_category(&pool, "Food").await;
    let rice = create_food(&pool, category, "Fried Rice", "2.50").await;
    CartService::new(&pool)
        .add_item(user.id, rice.id, 1, None)
        .await
        .unwrap();

    let err = OrderService::new(&pool, pricing())
        .place(
            user.id,
            PlaceOrder {
                promo_code: Some("NOPE".to_string()),
                ..PlaceOrder::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::FailedPrecondition(_)));
    assert_eq!(count_rows(&pool, "orders").await, 0);
    assert_eq!(count_rows(&pool, "cart_items").await, 1);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_failure_after_order_insert_rolls_everything_back(pool: PgPool) {
    let user = create_user(&pool, "Unlucky Diner").await;
    let category = create_category(&pool, "Food").await;
    let burger = create_food(&pool, category, "Beef Burger", "5.50").await;
    let pie = create_food(&pool, category, "Poison Pie", "4.00").await;

    let cart = CartService::new(&pool);
    cart.add_item(user.id, burger.id, 1, None).await.unwrap();
    cart.add_item(user.id, pie.id, 1, None).await.unwrap();

    // The order header and the burger line insert fine; the pie line does not.
    sqlx::query(
        "ALTER TABLE order_items ADD CONSTRAINT no_poison CHECK (food_name NOT LIKE 'Poison%')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = OrderService::new(&pool, pricing())
        .place(user.id, PlaceOrder::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Repository(_)));
    assert_eq!(count_rows(&pool, "orders").await, 0);
    assert_eq!(count_rows(&pool, "order_items").await, 0);
    assert_eq!(count_rows(&pool, "cart_items").await, 2);
    assert_eq!(cart.get(user.id).await.unwrap().item_count, 2);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_explicit_lines_out_of_range_are_invalid(pool: PgPool) {
    let user = create_user(&pool, "Big Spender").await;
    let category = create_category(&pool, "Food").await;
    let burger = create_food(&pool, category, "Beef Burger", "5.50").await;
    let service = OrderService::new(&pool, pricing());

    let line = |quantity: i32, unit_price: Option<&str>| OrderLineInput {
        food_id: burger.id,
        food_name: None,
        quantity,
        unit_price: unit_price.map(dec),
        special_instructions: None,
    };

    for bad in [
        line(MAX_LINE_QUANTITY + 1, None),
        line(1, Some("79228162514264337593543950335")),
        line(1, Some("100000000.00")),
        // Each price fits, the line subtotal does not.
        line(2, Some("99999999.99")),
    ] {
        let err = service
            .place(
                user.id,
                PlaceOrder {
                    items: Some(vec![bad]),
                    ..PlaceOrder::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)), "{err:?}");
    }

    assert_eq!(count_rows(&pool, "orders").await, 0);
    assert_eq!(count_rows(&pool, "order_items").await, 0);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_explicit_lines_leave_cart_alone(pool: PgPool) {
    let user = create_user(&pool, "Direct Buyer").await;
    let category = create_category(&pool, "Food").await;
    let wings = create_food(&pool, category, "Spicy Wings", "3.00").await;
    let fries = create_food(&pool, category, "Crispy Fries", "1.50").await;
    CartService::new(&pool)
        .add_item(user.id, fries.id, 1, None)
        .await
        .unwrap();

    let detail = OrderService::new(&pool, pricing())
        .place(
            user.id,
            PlaceOrder {
                items: Some(vec![OrderLineInput {
                    food_id: wings.id,
                    food_name: None,
                    quantity: 3,
                    unit_price: None,
                    special_instructions: None,
                }]),
                ..PlaceOrder::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(detail.items[0].food_name, "Spicy Wings");
    assert_eq!(detail.order.subtotal, dec("9.00"));
    assert_eq!(count_rows(&pool, "cart_items").await, 1);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_explicit_line_with_unknown_food_is_not_found(pool: PgPool) {
    let user = create_user(&pool, "Lost Buyer").await;

    let err = OrderService::new(&pool, pricing())
        .place(
            user.id,
            PlaceOrder {
                items: Some(vec![OrderLineInput {
                    food_id: amork_core::FoodId::generate(),
                    food_name: None,
                    quantity: 1,
                    unit_price: None,
                    special_instructions: None,
                }]),
                ..PlaceOrder::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound("food")));
    assert_eq!(count_rows(&pool, "orders").await, 0);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_order_lines_survive_price_change_and_deletion(pool: PgPool) {
    let user = create_user(&pool, "Snapshot Tester").await;
    let category = create_category(&pool, "Food").await;
    let burger = create_food(&pool, category, "Beef Burger", "5.50").await;
    CartService::new(&pool)
        .add_item(user.id, burger.id, 1, None)
        .await
        .unwrap();

    let orders = OrderService::new(&pool, pricing());
    let placed = orders.place(user.id, PlaceOrder::default()).await.unwrap();

    let foods = FoodRepository::new(&pool);
    foods
        .update(
            burger.id,
            &FoodChanges {
                name: Some("Mega Burger"),
                price: Some(dec("9.99")),
                ..FoodChanges::default()
            },
        )
        .await
        .unwrap();

    let after_update = orders.get(user.id, placed.order.id).await.unwrap();
    assert_eq!(after_update.items[0].food_name, "Beef Burger");
    assert_eq!(after_update.items[0].unit_price, dec("5.50"));
    assert_eq!(after_update.order.total, dec("6.50"));

    foods.delete(burger.id).await.unwrap();

    let after_delete = orders.get(user.id, placed.order.id).await.unwrap();
    assert_eq!(after_delete.items[0].food_id, None);
    assert_eq!(after_delete.items[0].food_name, "Beef Burger");
    assert_eq!(after_delete.items[0].unit_price, dec("5.50"));
}

// =============================================================================
// Status
// =============================================================================

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cancel_rules(pool: PgPool) {
    let user = create_user(&pool, "Status Tester").await;
    let category = create_category(&pool, "Food").await;
    let burger = create_food(&pool, category, "Beef Burger", "5.50").await;
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool, pricing());

    cart.add_item(user.id, burger.id, 1, None).await.unwrap();
    let first = orders.place(user.id, PlaceOrder::default()).await.unwrap();
    let cancelled = orders.cancel(user.id, first.order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    cart.add_item(user.id, burger.id, 1, None).await.unwrap();
    let second = orders.place(user.id, PlaceOrder::default()).await.unwrap();
    let id = second.order.id;
    orders
        .update_status(user.id, id, OrderStatus::Preparing)
        .await
        .unwrap();
    orders
        .update_status(user.id, id, OrderStatus::Delivering)
        .await
        .unwrap();

    let err = orders.cancel(user.id, id).await.unwrap_err();
    assert!(matches!(err, ServiceError::FailedPrecondition(_)));

    let err = orders
        .update_status(user.id, id, OrderStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::FailedPrecondition(_)));

    let done = orders
        .update_status(user.id, id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_orders_are_private_and_newest_first(pool: PgPool) {
    let user = create_user(&pool, "History Tester").await;
    let other = create_user(&pool, "Stranger").await;
    let category = create_category(&pool, "Food").await;
    let burger = create_food(&pool, category, "Beef Burger", "5.50").await;
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool, pricing());

    cart.add_item(user.id, burger.id, 1, None).await.unwrap();
    let older = orders.place(user.id, PlaceOrder::default()).await.unwrap();
    cart.add_item(user.id, burger.id, 2, None).await.unwrap();
    let newer = orders.place(user.id, PlaceOrder::default()).await.unwrap();

    let history = orders.list(user.id).await.unwrap();
    let ids: Vec<_> = history.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![newer.order.id, older.order.id]);

    let err = orders.get(other.id, older.order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("order")));
    let err = orders.cancel(other.id, older.order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("order")));
}
