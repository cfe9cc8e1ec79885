//! Round-trip tests against a live PostgreSQL database
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p bazaar-store -- --ignored
//!
//! Every test drops and recreates the marketplace tables, so point
//! DATABASE_URL at a scratch database.

use std::str::FromStr;

use bazaar_core::{Country, Currency, Item, PhoneNumber};
use bazaar_store::{migrations, CountryDao, CountryRepo, Dao, DaoError, ItemDao, ItemRepo, Operation};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

/// Tests share one schema, so they take turns.
static SCHEMA_LOCK: Mutex<()> = Mutex::const_new(());

async fn setup() -> (MutexGuard<'static, ()>, PgPool) {
    let guard = SCHEMA_LOCK.lock().await;
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = bazaar_store::create_pool(&url).await.expect("pool creation failed");

    migrations::drop_all(&pool).await.expect("drop failed");
    migrations::run(&pool).await.expect("migrations failed");

    for (id, name) in [(1, "EUR"), (2, "USD"), (3, "PLN")] {
        sqlx::query("INSERT INTO is_currency (currency_id, currency_name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&pool)
            .await
            .expect("seed currency");
    }
    for (id, number) in [(1_i64, "+48 555 0100"), (2, "+49 555 0200")] {
        sqlx::query("INSERT INTO is_phone_number (phone_number_id, phone_number) VALUES ($1, $2)")
            .bind(id)
            .bind(number)
            .execute(&pool)
            .await
            .expect("seed phone number");
    }

    (guard, pool)
}

fn poland() -> Country {
    Country::new(10, "Poland").with_currencies(vec![Currency::new(3, "PLN"), Currency::new(1, "EUR")])
}

fn bicycle(country: Option<Country>) -> Item {
    Item {
        id: 100,
        name: "Bicycle".to_owned(),
        amount: 2,
        price_for_one: Decimal::from_str("349.99").unwrap(),
        currency: Currency::new(3, "PLN"),
        image_url: Some("https://img.example/bike.png".to_owned()),
        description: Some("City bike, 28 inch".to_owned()),
        put_up_for_sale: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        phone_number: PhoneNumber::new(1, "+48 555 0100"),
        country,
    }
}

// === Country ===

#[tokio::test]
#[ignore = "requires database"]
async fn country_save_then_get_by_id() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);

    dao.save(&poland()).await.expect("save");
    let fetched = dao.get_by_id(10).await.expect("get");

    assert_eq!(fetched.name, "Poland");
    // Currencies come back ordered by id
    assert_eq!(fetched.currencies, vec![Currency::new(1, "EUR"), Currency::new(3, "PLN")]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_save_ignore_id_resolves_currencies_by_name() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);

    let country = Country::new(0, "Germany").with_currencies(vec![Currency::new(0, "EUR")]);
    dao.save_ignore_id(&country).await.expect("save");

    let fetched = dao.get_by_name("Germany").await.expect("get by name");
    assert_ne!(fetched.id, 0);
    assert_eq!(fetched.currencies, vec![Currency::new(1, "EUR")]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_save_ignore_id_rolls_back_on_unknown_currency() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);

    let country = Country::new(0, "Narnia").with_currencies(vec![Currency::new(0, "EUR"), Currency::new(0, "XXX")]);
    let err = dao.save_ignore_id(&country).await.unwrap_err();
    assert_eq!(err.kind(), Operation::Store);

    // No half-written country remains
    let err = dao.get_by_name("Narnia").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_get_by_name_is_case_sensitive() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);

    dao.save(&poland()).await.expect("save");
    assert!(dao.get_by_name("poland").await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_update_replaces_name_and_currencies() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);
    dao.save(&poland()).await.expect("save");

    // The id inside the entity is ignored
    let replacement = Country::new(999, "Polska").with_currencies(vec![Currency::new(2, "USD")]);
    dao.update(10, &replacement).await.expect("update");

    let fetched = dao.get_by_id(10).await.expect("get");
    assert_eq!(fetched.name, "Polska");
    assert_eq!(fetched.currencies, vec![Currency::new(2, "USD")]);
    assert_eq!(replacement.id, 999);
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_update_of_missing_row_is_update_error() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);

    let err = dao.update(404, &poland()).await.unwrap_err();
    assert_eq!(err.kind(), Operation::Update);
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_delete_then_get_is_not_found() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);
    dao.save(&poland()).await.expect("save");

    dao.delete(10).await.expect("delete");
    let err = dao.get_by_id(10).await.unwrap_err();
    assert!(matches!(err, DaoError::NotFound { resource: "country", .. }));

    // Deleting again is not an error
    dao.delete(10).await.expect("second delete");
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_delete_by_name() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);
    dao.save(&poland()).await.expect("save");

    dao.delete_by_name("Poland").await.expect("delete");
    assert!(dao.all_entities().await.expect("list").is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_all_entities_includes_countries_without_currencies() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);

    dao.save(&poland()).await.expect("save");
    dao.save(&Country::new(5, "Antarctica")).await.expect("save");

    let all = dao.all_entities().await.expect("list");
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Antarctica", "Poland"]);
    assert!(all[0].currencies.is_empty());
    assert_eq!(all[1].currencies.len(), 2);
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_generated_id_follows_explicit_ids() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);

    dao.save(&Country::new(1, "Poland")).await.expect("save");
    dao.save(&Country::new(2, "Czechia")).await.expect("save");
    dao.save_ignore_id(&Country::new(0, "Germany")).await.expect("save with generated id");

    let germany = dao.get_by_name("Germany").await.expect("get by name");
    assert_eq!(germany.id, 3);
}

#[tokio::test]
#[ignore = "requires database"]
async fn country_duplicate_name_is_store_error() {
    let (_guard, pool) = setup().await;
    let dao = CountryRepo::new(&pool);
    dao.save(&poland()).await.expect("save");

    let err = dao.save_ignore_id(&Country::new(0, "Poland")).await.unwrap_err();
    assert_eq!(err.kind(), Operation::Store);
}

// === Item ===

#[tokio::test]
#[ignore = "requires database"]
async fn item_save_then_get_by_id() {
    let (_guard, pool) = setup().await;
    CountryRepo::new(&pool).save(&poland()).await.expect("save country");
    let dao = ItemRepo::new(&pool);

    let item = bicycle(Some(Country::new(0, "Poland")));
    dao.save(&item).await.expect("save");
    let fetched = dao.get_by_id(100).await.expect("get");

    assert_eq!(fetched.name, item.name);
    assert_eq!(fetched.amount, 2);
    assert_eq!(fetched.price_for_one, item.price_for_one);
    assert_eq!(fetched.currency, Currency::new(3, "PLN"));
    assert_eq!(fetched.phone_number, PhoneNumber::new(1, "+48 555 0100"));
    assert_eq!(fetched.put_up_for_sale, item.put_up_for_sale);
    assert_eq!(fetched.image_url, item.image_url);
    // Countries joined onto an item carry no currencies
    assert_eq!(fetched.country, Some(Country::new(10, "Poland")));
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_without_country_round_trips() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);

    dao.save(&bicycle(None)).await.expect("save");
    assert_eq!(dao.get_by_id(100).await.expect("get").country, None);
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_save_ignore_id_assigns_id() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);

    dao.save_ignore_id(&bicycle(None)).await.expect("save");
    dao.save_ignore_id(&bicycle(None)).await.expect("save");

    let all = dao.all_entities().await.expect("list");
    assert_eq!(all.len(), 2);
    assert_ne!(all[0].id, all[1].id);
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_generated_id_follows_explicit_ids() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);

    let mut first = bicycle(None);
    first.id = 1;
    dao.save(&first).await.expect("save");
    dao.save(&bicycle(None)).await.expect("save id 100");
    dao.save_ignore_id(&bicycle(None)).await.expect("save with generated id");

    let ids: Vec<i64> = dao.all_entities().await.expect("list").iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 100, 101]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_with_unknown_country_stores_none() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);

    dao.save(&bicycle(Some(Country::new(0, "Atlantis")))).await.expect("save");
    assert_eq!(dao.get_by_id(100).await.expect("get").country, None);

    let mut moved = bicycle(Some(Country::new(0, "Lemuria")));
    moved.name = "Old bicycle".to_owned();
    dao.update(100, &moved).await.expect("update");
    let fetched = dao.get_by_id(100).await.expect("get");
    assert_eq!(fetched.name, "Old bicycle");
    assert_eq!(fetched.country, None);
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_with_unknown_phone_number_fails_with_operation_kind() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);

    let mut item = bicycle(None);
    item.phone_number = PhoneNumber::new(0, "+1 555 9999");

    let err = dao.save(&item).await.unwrap_err();
    assert_eq!(err.kind(), Operation::Store);
    assert!(matches!(err, DaoError::Database { .. }));

    let err = dao.save_ignore_id(&item).await.unwrap_err();
    assert_eq!(err.kind(), Operation::Store);

    dao.save(&bicycle(None)).await.expect("save");
    let err = dao.update(100, &item).await.unwrap_err();
    assert_eq!(err.kind(), Operation::Update);

    // The stored row is untouched
    let fetched = dao.get_by_id(100).await.expect("get");
    assert_eq!(fetched.phone_number, PhoneNumber::new(1, "+48 555 0100"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_with_unknown_currency_is_store_error() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);

    let mut item = bicycle(None);
    item.currency = Currency::new(0, "GBP");
    let err = dao.save(&item).await.unwrap_err();
    assert_eq!(err.kind(), Operation::Store);
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_update_overwrites_fields() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);
    dao.save(&bicycle(None)).await.expect("save");

    let mut changed = bicycle(None);
    changed.name = "Tandem bicycle".to_owned();
    changed.currency = Currency::new(0, "EUR");
    changed.phone_number = PhoneNumber::new(0, "+49 555 0200");
    changed.description = None;
    dao.update(100, &changed).await.expect("update");

    let fetched = dao.get_by_id(100).await.expect("get");
    assert_eq!(fetched.name, "Tandem bicycle");
    assert_eq!(fetched.currency, Currency::new(1, "EUR"));
    assert_eq!(fetched.phone_number.id, 2);
    assert_eq!(fetched.description, None);

    let err = dao.update(7, &changed).await.unwrap_err();
    assert_eq!(err.kind(), Operation::Update);
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_delete_then_get_is_not_found() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);
    dao.save(&bicycle(None)).await.expect("save");

    dao.delete(100).await.expect("delete");
    let err = dao.get_by_id(100).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.kind(), Operation::Fetch);
}

#[tokio::test]
#[ignore = "requires database"]
async fn similar_name_tolerates_one_typo() {
    let (_guard, pool) = setup().await;
    let dao = ItemRepo::new(&pool);

    let mut lamp = bicycle(None);
    lamp.id = 200;
    lamp.name = "Desk lamp".to_owned();
    dao.save(&bicycle(None)).await.expect("save bike");
    dao.save(&lamp).await.expect("save lamp");

    let found = dao.items_with_similar_name("bicicle").await.expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 100);

    // Matched by several patterns, returned once
    let found = dao.items_with_similar_name("LAMP").await.expect("search");
    assert_eq!(found.iter().map(|i| i.id).collect::<Vec<_>>(), vec![200]);

    assert!(dao.items_with_similar_name("   ").await.expect("search").is_empty());
    assert!(dao.items_with_similar_name(&"b".repeat(2000)).await.expect("search").is_empty());
}
