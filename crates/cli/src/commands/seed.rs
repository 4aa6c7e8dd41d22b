//! Demo catalog seeding.
//!
//! Inserts four categories and five foods, but only when the `foods` table
//! is empty, so running it twice is harmless. Ratings start at zero; they are
//! derived from reviews.

use amork_api::db::categories::CategoryFields;
use amork_api::db::foods::{FoodFilter, NewFood};
use amork_api::db::{CategoryRepository, FoodRepository, RepositoryError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insert failed.
    #[error("Seed failed: {0}")]
    Repository(#[from] RepositoryError),

    /// A hard-coded price failed to parse.
    #[error("Invalid seed price: {0}")]
    Price(#[from] rust_decimal::Error),
}

struct SeedCategory {
    name: &'static str,
    icon: &'static str,
    color: &'static str,
}

struct SeedFood {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    original_price: Option<&'static str>,
    calories: i32,
    cooking_time: &'static str,
    image_url: &'static str,
    is_popular: bool,
    /// Index into `CATEGORIES`.
    category: usize,
}

const CATEGORIES: [SeedCategory; 4] = [
    SeedCategory {
        name: "Food",
        icon: "restaurant",
        color: "#FF6B35",
    },
    SeedCategory {
        name: "Drinks",
        icon: "local_cafe",
        color: "#4A90D9",
    },
    SeedCategory {
        name: "Desserts",
        icon: "icecream",
        color: "#E91E63",
    },
    SeedCategory {
        name: "Snacks",
        icon: "fastfood",
        color: "#FFC107",
    },
];

const FOODS: [SeedFood; 5] = [
    SeedFood {
        name: "Spicy Wings",
        description: "Hot and spicy chicken wings",
        price: "3.00",
        original_price: Some("6.00"),
        calories: 400,
        cooking_time: "15 min",
        image_url: "assets/images/wings grill.png",
        is_popular: true,
        category: 0,
    },
    SeedFood {
        name: "Fried Rice",
        description: "Pork fried rice with egg",
        price: "2.50",
        original_price: Some("5.00"),
        calories: 450,
        cooking_time: "20 min",
        image_url: "assets/images/Bay cha.png",
        is_popular: true,
        category: 0,
    },
    SeedFood {
        name: "Beef Burger",
        description: "Double beef with extra cheese",
        price: "5.50",
        original_price: None,
        calories: 600,
        cooking_time: "15 min",
        image_url: "assets/images/Burger.png",
        is_popular: true,
        category: 0,
    },
    SeedFood {
        name: "Iced Coffee",
        description: "Sweet iced coffee",
        price: "1.75",
        original_price: Some("3.50"),
        calories: 200,
        cooking_time: "3 min",
        image_url: "assets/images/iced latte.png",
        is_popular: false,
        category: 1,
    },
    SeedFood {
        name: "Crispy Fries",
        description: "Hot salty french fries",
        price: "1.50",
        original_price: Some("3.00"),
        calories: 300,
        cooking_time: "10 min",
        image_url: "assets/images/fries.png",
        is_popular: false,
        category: 3,
    },
];

/// Seed the demo catalog.
///
/// # Errors
///
/// Returns `SeedError` if the URL is missing or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    let url = super::database_url().map_err(SeedError::MissingEnvVar)?;
    let pool = super::connect(&url).await?;

    let foods = FoodRepository::new(&pool);
    let (_, existing) = foods
        .list(&FoodFilter {
            include_unavailable: true,
            limit: 1,
            ..FoodFilter::default()
        })
        .await?;
    if existing > 0 {
        tracing::info!(existing, "Menu already has foods, skipping seed");
        return Ok(());
    }

    let categories = CategoryRepository::new(&pool);
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for seed in &CATEGORIES {
        let category = categories
            .create(
                seed.name,
                &CategoryFields {
                    icon: Some(seed.icon),
                    color: Some(seed.color),
                    ..CategoryFields::default()
                },
            )
            .await?;
        tracing::info!(name = seed.name, id = %category.id, "Category created");
        category_ids.push(category.id);
    }

    for seed in &FOODS {
        let Some(&category_id) = category_ids.get(seed.category) else {
            continue;
        };
        let original_price = seed
            .original_price
            .map(str::parse::<Decimal>)
            .transpose()?;

        let food = foods
            .create(&NewFood {
                name: seed.name,
                description: Some(seed.description),
                price: seed.price.parse()?,
                original_price,
                image_url: seed.image_url,
                category_id,
                calories: seed.calories,
                cooking_time: seed.cooking_time,
                is_popular: seed.is_popular,
                is_available: true,
            })
            .await?;
        tracing::info!(name = seed.name, id = %food.id, "Food created");
    }

    tracing::info!(
        categories = CATEGORIES.len(),
        foods = FOODS.len(),
        "Seed complete"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_prices_parse() {
        for food in &FOODS {
            assert!(food.price.parse::<Decimal>().is_ok(), "{}", food.name);
            if let Some(original) = food.original_price {
                assert!(original.parse::<Decimal>().is_ok(), "{}", food.name);
            }
        }
    }

    #[test]
    fn test_seed_categories_exist() {
        assert!(FOODS.iter().all(|f| f.category < CATEGORIES.len()));
    }

    #[test]
    fn test_burger_is_five_fifty() {
        let burger = FOODS.iter().find(|f| f.name == "Beef Burger").unwrap();
        assert_eq!(burger.price, "5.50");
    }
}
