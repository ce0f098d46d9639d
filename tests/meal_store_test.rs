// ABOUTME: Integration tests for the meal persistence gateway
// ABOUTME: Transactional writes, best-effort failure writes, cascade deletes, and queries
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Mealsnap Contributors

mod common;

use anyhow::Result;
use common::{break_database, count_rows, create_test_database};
use mealsnap::models::{
    ConfidenceTier, MealStatus, NutritionFacts, NutritionLookupResult, RecognizedItem,
};
use mealsnap::store::{MealStore, NewMeal};
use uuid::Uuid;

fn rice_item(quantity: &str) -> RecognizedItem {
    let mut item = RecognizedItem::new("rice");
    item.quantity = quantity.to_owned();
    item
}

fn rice_entry() -> NutritionLookupResult {
    NutritionLookupResult::estimated(NutritionFacts {
        calories: 260.0,
        protein_g: 5.4,
        carbs_g: 56.0,
        fat_g: 0.6,
        fiber_g: 0.8,
        sugar_g: 0.2,
        sodium_mg: 2.0,
    })
}

#[tokio::test]
async fn test_completed_meal_round_trip() -> Result<()> {
    let database = create_test_database().await?;
    let store = MealStore::new(database.clone());

    let user_id = Uuid::new_v4();
    let day_id = Uuid::new_v4();
    let items = vec![rice_item("200")];
    let entries = vec![rice_entry()];
    let meal_id = store
        .create_completed_meal(&NewMeal {
            user_id,
            day_id,
            category: "dinner",
            photo_ref: Some("photos/rice.jpg"),
            totals: entries[0].facts,
            confidence: ConfidenceTier::High,
            recognized_items: &items,
            entries: &entries,
            fallback_needed: &[],
        })
        .await?;

    let meal = store.get_meal(meal_id).await?.expect("meal row");
    assert_eq!(meal.status, MealStatus::Completed);
    assert_eq!(meal.category, "dinner");
    assert_eq!(meal.photo_ref.as_deref(), Some("photos/rice.jpg"));
    assert_eq!(meal.confidence, ConfidenceTier::High);
    assert!((meal.totals.calories - 260.0).abs() < f64::EPSILON);
    assert!(meal.error.is_none());

    // Raw recognized-items payload survives as a JSON array
    let raw = meal.raw_items.expect("raw payload");
    assert_eq!(raw.as_array().map(Vec::len), Some(1));

    let meal_items = store.get_meal_items(meal_id).await?;
    assert_eq!(meal_items.len(), 1);
    assert_eq!(meal_items[0].unit, "grams");
    assert!((meal_items[0].facts.carbs_g - 56.0).abs() < f64::EPSILON);

    Ok(())
}

#[tokio::test]
async fn test_unparseable_quantity_defaults_to_100() -> Result<()> {
    let database = create_test_database().await?;
    let store = MealStore::new(database);

    let items = vec![rice_item("a generous helping")];
    let entries = vec![rice_entry()];
    let meal_id = store
        .create_completed_meal(&NewMeal {
            user_id: Uuid::new_v4(),
            day_id: Uuid::new_v4(),
            category: "snack",
            photo_ref: None,
            totals: NutritionFacts::zero(),
            confidence: ConfidenceTier::Low,
            recognized_items: &items,
            entries: &entries,
            fallback_needed: &[],
        })
        .await?;

    let meal_items = store.get_meal_items(meal_id).await?;
    assert!((meal_items[0].quantity - 100.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_failed_meal_flags_every_item_for_review() -> Result<()> {
    let database = create_test_database().await?;
    let store = MealStore::new(database);

    let items = vec![rice_item("200"), RecognizedItem::new("beans")];
    let entries = vec![rice_entry()]; // second item never resolved
    let meal_id = store
        .create_failed_meal(
            &NewMeal {
                user_id: Uuid::new_v4(),
                day_id: Uuid::new_v4(),
                category: "snack",
                photo_ref: None,
                totals: NutritionFacts::zero(),
                confidence: ConfidenceTier::Low,
                recognized_items: &items,
                entries: &entries,
                fallback_needed: &[],
            },
            "aggregation failed: state corrupted",
        )
        .await
        .expect("best-effort write succeeded");

    let meal = store.get_meal(meal_id).await?.expect("meal row");
    assert_eq!(meal.status, MealStatus::Failed);
    assert_eq!(meal.error.as_deref(), Some("aggregation failed: state corrupted"));

    let meal_items = store.get_meal_items(meal_id).await?;
    assert_eq!(meal_items.len(), 2);
    assert!(meal_items.iter().all(|i| i.needs_review));
    // The unresolved second item was padded with the zero placeholder
    let beans = meal_items.iter().find(|i| i.name == "beans").expect("beans row");
    assert!(beans.facts.is_zero());
    assert_eq!(beans.source, "none");

    Ok(())
}

#[tokio::test]
async fn test_failed_meal_write_failure_returns_none() -> Result<()> {
    let database = create_test_database().await?;
    break_database(&database).await?;
    let store = MealStore::new(database);

    let items = vec![rice_item("200")];
    let result = store
        .create_failed_meal(
            &NewMeal {
                user_id: Uuid::new_v4(),
                day_id: Uuid::new_v4(),
                category: "snack",
                photo_ref: None,
                totals: NutritionFacts::zero(),
                confidence: ConfidenceTier::Low,
                recognized_items: &items,
                entries: &[],
                fallback_needed: &[],
            },
            "original error",
        )
        .await;

    assert!(result.is_none());
    Ok(())
}

#[tokio::test]
async fn test_parent_failure_leaves_no_partial_write() -> Result<()> {
    let database = create_test_database().await?;
    break_database(&database).await?;
    let store = MealStore::new(database.clone());

    let items = vec![rice_item("200")];
    let entries = vec![rice_entry()];
    let result = store
        .create_completed_meal(&NewMeal {
            user_id: Uuid::new_v4(),
            day_id: Uuid::new_v4(),
            category: "snack",
            photo_ref: None,
            totals: NutritionFacts::zero(),
            confidence: ConfidenceTier::Low,
            recognized_items: &items,
            entries: &entries,
            fallback_needed: &[],
        })
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_delete_meal_cascades_to_items() -> Result<()> {
    let database = create_test_database().await?;
    let store = MealStore::new(database.clone());

    let items = vec![rice_item("200")];
    let entries = vec![rice_entry()];
    let meal_id = store
        .create_completed_meal(&NewMeal {
            user_id: Uuid::new_v4(),
            day_id: Uuid::new_v4(),
            category: "snack",
            photo_ref: None,
            totals: NutritionFacts::zero(),
            confidence: ConfidenceTier::Low,
            recognized_items: &items,
            entries: &entries,
            fallback_needed: &[],
        })
        .await?;

    assert_eq!(count_rows(&database, "meal_items").await?, 1);
    assert!(store.delete_meal(meal_id).await?);
    assert_eq!(count_rows(&database, "meals").await?, 0);
    assert_eq!(count_rows(&database, "meal_items").await?, 0);
    assert!(store.get_meal(meal_id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_list_meals_filters_by_user_and_day() -> Result<()> {
    let database = create_test_database().await?;
    let store = MealStore::new(database);

    let user_id = Uuid::new_v4();
    let day_id = Uuid::new_v4();
    let items = vec![rice_item("200")];
    let entries = vec![rice_entry()];

    for (user, day) in [
        (user_id, day_id),
        (user_id, Uuid::new_v4()),
        (Uuid::new_v4(), day_id),
    ] {
        store
            .create_completed_meal(&NewMeal {
                user_id: user,
                day_id: day,
                category: "snack",
                photo_ref: None,
                totals: NutritionFacts::zero(),
                confidence: ConfidenceTier::Low,
                recognized_items: &items,
                entries: &entries,
                fallback_needed: &[],
            })
            .await?;
    }

    let meals = store.list_meals_for_day(user_id, day_id).await?;
    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].user_id, user_id);
    assert_eq!(meals[0].day_id, day_id);

    Ok(())
}

#[tokio::test]
async fn test_file_backed_database_round_trip() -> Result<()> {
    common::init_test_logging();
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}/meals.db", dir.path().display());
    let database = std::sync::Arc::new(mealsnap::database::Database::new(&url).await?);
    let store = MealStore::new(database);

    let items = vec![rice_item("200")];
    let entries = vec![rice_entry()];
    let meal_id = store
        .create_completed_meal(&NewMeal {
            user_id: Uuid::new_v4(),
            day_id: Uuid::new_v4(),
            category: "snack",
            photo_ref: None,
            totals: rice_entry().facts,
            confidence: ConfidenceTier::Low,
            recognized_items: &items,
            entries: &entries,
            fallback_needed: &[],
        })
        .await?;

    assert!(store.get_meal(meal_id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_fallback_needed_marks_specific_items() -> Result<()> {
    let database = create_test_database().await?;
    let store = MealStore::new(database);

    let items = vec![rice_item("200"), RecognizedItem::new("mystery stew")];
    let entries = vec![rice_entry(), NutritionLookupResult::unresolved()];
    let fallback = vec!["mystery stew".to_owned()];
    let meal_id = store
        .create_completed_meal(&NewMeal {
            user_id: Uuid::new_v4(),
            day_id: Uuid::new_v4(),
            category: "snack",
            photo_ref: None,
            totals: rice_entry().facts,
            confidence: ConfidenceTier::Medium,
            recognized_items: &items,
            entries: &entries,
            fallback_needed: &fallback,
        })
        .await?;

    let meal_items = store.get_meal_items(meal_id).await?;
    let rice = meal_items.iter().find(|i| i.name == "rice").expect("rice row");
    let stew = meal_items.iter().find(|i| i.name == "mystery stew").expect("stew row");
    assert!(!rice.needs_review);
    assert!(stew.needs_review);

    Ok(())
}
