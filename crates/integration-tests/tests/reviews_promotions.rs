//! Database tests for reviews, promotion codes and favorites.
//!
//! Requires `DATABASE_URL`; see the crate docs.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use amork_api::db::{FavoriteRepository, FoodRepository};
use amork_api::services::orders::PlaceOrder;
use amork_api::services::promotions::PromotionDraft;
use amork_api::services::{CartService, OrderService, PromotionService, ReviewService, ServiceError};
use amork_integration_tests::{create_category, create_food, create_user, dec, pricing};
use chrono::{Duration, Utc};
use sqlx::PgPool;

// =============================================================================
// Reviews
// =============================================================================

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_food_rating_follows_reviews(pool: PgPool) {
    let alice = create_user(&pool, "Alice").await;
    let bob = create_user(&pool, "Bob").await;
    let category = create_category(&pool, "Food").await;
    let wings = create_food(&pool, category, "Spicy Wings", "3.00").await;

    let reviews = ReviewService::new(&pool);
    let foods = FoodRepository::new(&pool);

    let first = reviews
        .upsert(alice.id, wings.id, 5, Some("great"))
        .await
        .unwrap();
    assert_eq!(first.reviewer_name, "Alice");
    reviews.upsert(bob.id, wings.id, 4, None).await.unwrap();
    assert_eq!(foods.get(wings.id).await.unwrap().unwrap().rating, dec("4.50"));

    // A second review from the same user replaces the first.
    let again = reviews.upsert(alice.id, wings.id, 3, None).await.unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.comment, None);
    assert_eq!(foods.get(wings.id).await.unwrap().unwrap().rating, dec("3.50"));

    let listing = reviews.list_for_food(wings.id).await.unwrap();
    assert_eq!(listing.review_count, 2);
    assert_eq!(listing.average_rating, dec("3.50"));

    let bobs = listing.reviews.iter().find(|r| r.user_id == bob.id).unwrap();
    reviews.delete(bob.id, bobs.id).await.unwrap();
    assert_eq!(foods.get(wings.id).await.unwrap().unwrap().rating, dec("3.00"));
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_review_validation_and_ownership(pool: PgPool) {
    let author = create_user(&pool, "Author").await;
    let other = create_user(&pool, "Other").await;
    let category = create_category(&pool, "Desserts").await;
    let food = create_food(&pool, category, "Lava Cake", "4.00").await;
    let reviews = ReviewService::new(&pool);

    let err = reviews.upsert(author.id, food.id, 6, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let err = reviews
        .upsert(author.id, amork_core::FoodId::generate(), 4, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("food")));

    let review = reviews.upsert(author.id, food.id, 4, None).await.unwrap();
    let err = reviews.delete(other.id, review.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("review")));

    let err = reviews
        .list_for_food(amork_core::FoodId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("food")));
}

// =============================================================================
// Promotions
// =============================================================================

fn draft<'a>(code: &'a str, percent: &str) -> PromotionDraft<'a> {
    PromotionDraft {
        code,
        description: None,
        discount_percent: dec(percent),
        is_active: true,
        valid_until: None,
    }
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_promotion_quote(pool: PgPool) {
    let promotions = PromotionService::new(&pool);
    let created = promotions.create(&draft(" SAVE10 ", "10")).await.unwrap();
    assert_eq!(created.code, "SAVE10");

    let quote = promotions.validate("SAVE10", dec("20.00")).await.unwrap();
    assert_eq!(quote.discount_percent, dec("10"));
    assert_eq!(quote.discount_amount, dec("2.00"));
    assert_eq!(quote.new_total, dec("18.00"));

    // Codes are case-sensitive.
    let err = promotions.validate("save10", dec("20.00")).await.unwrap_err();
    assert!(matches!(err, ServiceError::FailedPrecondition(_)));

    let err = promotions.create(&draft("SAVE10", "5")).await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists(_)));

    let err = promotions.create(&draft("TOOMUCH", "150")).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_expired_and_inactive_promotions(pool: PgPool) {
    let promotions = PromotionService::new(&pool);
    promotions
        .create(&PromotionDraft {
            valid_until: Some(Utc::now() - Duration::days(1)),
            ..draft("OLD", "10")
        })
        .await
        .unwrap();
    promotions
        .create(&PromotionDraft {
            is_active: false,
            ..draft("OFF", "10")
        })
        .await
        .unwrap();
    promotions.create(&draft("LIVE", "15")).await.unwrap();

    for code in ["OLD", "OFF"] {
        let err = promotions.validate(code, dec("10.00")).await.unwrap_err();
        assert!(matches!(err, ServiceError::FailedPrecondition(_)), "{code}");
    }

    let active = promotions.list_active().await.unwrap();
    let codes: Vec<_> = active.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["LIVE"]);
}

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_order_with_promo_code(pool: PgPool) {
    let user = create_user(&pool, "Saver").await;
    let category = create_category(&pool, "Food").await;
    let burger = create_food(&pool, category, "Beef Burger", "5.50").await;
    PromotionService::new(&pool)
        .create(&draft("SAVE10", "10"))
        .await
        .unwrap();
    CartService::new(&pool)
        .add_item(user.id, burger.id, 2, None)
        .await
        .unwrap();

    let detail = OrderService::new(&pool, pricing())
        .place(
            user.id,
            PlaceOrder {
                promo_code: Some("SAVE10".to_string()),
                ..PlaceOrder::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(detail.order.subtotal, dec("11.00"));
    assert_eq!(detail.order.discount, dec("1.10"));
    assert_eq!(detail.order.total, dec("10.90"));
    assert_eq!(detail.order.promo_code.as_deref(), Some("SAVE10"));
}

// =============================================================================
// Favorites
// =============================================================================

#[sqlx::test(migrations = "../api/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_favorites_are_idempotent(pool: PgPool) {
    let user = create_user(&pool, "Fan").await;
    let category = create_category(&pool, "Snacks").await;
    let fries = create_food(&pool, category, "Crispy Fries", "1.50").await;
    let favorites = FavoriteRepository::new(&pool);

    assert!(favorites.add(user.id, fries.id).await.unwrap());
    assert!(!favorites.add(user.id, fries.id).await.unwrap());
    assert!(favorites.contains(user.id, fries.id).await.unwrap());
    assert_eq!(favorites.list(user.id).await.unwrap().len(), 1);

    favorites.remove(user.id, fries.id).await.unwrap();
    assert!(!favorites.contains(user.id, fries.id).await.unwrap());
    assert!(favorites.remove(user.id, fries.id).await.is_err());
}
