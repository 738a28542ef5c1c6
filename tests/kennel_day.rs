use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use kennel::config::KennelConfig;
use kennel::engine::{BookingRequest, Engine, EngineError};
use kennel::model::*;
use kennel::notify::NotifyHub;
use kennel::publisher;

// ── Test infrastructure ──────────────────────────────────────

fn data_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("kennel_int_test").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn start(name: &str) -> (KennelConfig, Arc<Engine>) {
    let config = KennelConfig {
        data_dir: data_dir(name),
        ..KennelConfig::default()
    };
    let engine = Arc::new(Engine::open(&config, Arc::new(NotifyHub::new())).unwrap());
    (config, engine)
}

fn date(day: u8, month: u8, year: i32) -> Date {
    Date::new(day, month, year).unwrap()
}

fn stay(customer: &str, pet: &str, class: PetClass, start: Date, end: Date) -> BookingRequest {
    BookingRequest {
        customer: CustomerRef::new(customer, "+40 721 000 000"),
        pet: PetRef::new(pet, class, PetPurpose::Kennel),
        start,
        end,
        price: Price::from_decimal(30.0).unwrap(),
    }
}

async fn wait_for_file(path: &Path, want: &str) -> bool {
    for _ in 0..200 {
        if std::fs::read_to_string(path).ok().as_deref() == Some(want) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

// ── Scenarios ────────────────────────────────────────────────

#[tokio::test]
async fn holiday_season_fills_up_and_recovers() {
    let (config, engine) = start("holiday_season");

    // Ten guests over New Year, staggered departures
    for i in 0..10u8 {
        let req = stay(
            &format!("Customer {i}"),
            &format!("Pet {i}"),
            PetClass::Dog,
            date(28, 12, 2026),
            date(1 + i, 1, 2027),
        );
        engine.add_booking(req).await.unwrap();
    }
    assert_eq!(engine.free_space(date(31, 12, 2026)).await, 0);
    assert_eq!(engine.free_space(date(1, 1, 2027)).await, 1);
    assert_eq!(engine.free_space(date(10, 1, 2027)).await, 10);

    let full = engine
        .saturated_ranges(date(1, 12, 2026), date(1, 2, 2027))
        .await
        .unwrap();
    assert_eq!(full, vec![DateRange::new(date(28, 12, 2026), date(1, 1, 2027))]);

    let late = stay("Late", "Whiskers", PetClass::Cat, date(31, 12, 2026), date(3, 1, 2027));
    match engine.add_booking(late.clone()).await {
        Err(EngineError::CapacityExceeded(c)) => assert_eq!(c.date, date(31, 12, 2026)),
        other => panic!("expected conflict, got {other:?}"),
    }

    // One guest leaves a night early, which frees New Year's Eve for the cat
    let first = engine.list_bookings().await[0].clone();
    let shortened = BookingRequest {
        end: date(31, 12, 2026),
        ..BookingRequest::from(&first)
    };
    engine.edit_booking(&first, shortened).await.unwrap();
    engine.add_booking(late).await.unwrap();
    assert_eq!(engine.free_space(date(31, 12, 2026)).await, 0);
    assert_eq!(engine.free_space(date(2, 1, 2027)).await, 1);

    // Everything survives a restart
    let expected = engine.list_bookings().await;
    engine.shutdown().await.unwrap();
    drop(engine);
    let engine = Engine::open(&config, Arc::new(NotifyHub::new())).unwrap();
    assert_eq!(engine.list_bookings().await, expected);
}

#[tokio::test]
async fn leap_day_stays() {
    let (_config, engine) = start("leap_day");
    let across = stay("Ana", "Fluffy", PetClass::Rodent, date(28, 2, 2028), date(1, 3, 2028));
    engine.add_booking(across).await.unwrap();

    let daily = engine
        .daily_free_space(date(27, 2, 2028), date(2, 3, 2028))
        .await
        .unwrap();
    let days: Vec<String> = daily.iter().map(|(d, _)| d.to_string()).collect();
    assert_eq!(days, vec!["27.2.2028", "28.2.2028", "29.2.2028", "1.3.2028"]);
    assert_eq!(daily[2].1, 9);
    assert_eq!(daily[3].1, 10);

    assert!(Date::new(29, 2, 2027).is_err());
}

#[tokio::test]
async fn booking_form_checks() {
    let (_config, engine) = start("form_checks");

    let mut parrot = stay("Ana", "Polly", PetClass::Bird, date(5, 5, 2027), date(9, 5, 2027));
    parrot.pet.purpose = PetPurpose::ForSale;
    assert!(matches!(
        engine.add_booking(parrot).await,
        Err(EngineError::InvalidRequest(_))
    ));

    let backwards = stay("Ana", "Nemo", PetClass::Fish, date(9, 5, 2027), date(5, 5, 2027));
    assert!(matches!(
        engine.add_booking(backwards).await,
        Err(EngineError::InvalidRequest(_))
    ));

    assert!(engine.list_bookings().await.is_empty());
    assert!(Price::from_decimal(-1.0).is_err());
}

#[tokio::test]
async fn free_space_file_follows_changes() {
    let (config, engine) = start("free_space_file");
    let path = config.free_space_path();
    let today = date(24, 12, 2027);
    let task = tokio::spawn(publisher::run_publisher_with_clock(
        engine.clone(),
        path.clone(),
        Duration::from_secs(3600),
        move || today,
    ));

    assert!(wait_for_file(&path, "10\n").await);

    let tomorrow = today.next_day().unwrap();
    let b = engine
        .add_booking(stay("Ana", "Rex", PetClass::Dog, today, tomorrow))
        .await
        .unwrap();
    assert!(wait_for_file(&path, "9\n").await);

    engine.remove_booking(&b).await.unwrap();
    assert!(wait_for_file(&path, "10\n").await);
    task.abort();
}
