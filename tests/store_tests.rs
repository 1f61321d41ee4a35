// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, TimeZone, Utc};
use homescope::db;
use homescope::models::{Property, PropertyDraft, PropertyError, PropertyPatch, PropertyStatus};
use homescope::store::{
    JsonFileRepository, MemoryRepository, PropertyFilter, PropertyQuery, PropertyRepository,
    PropertySort, PropertyStore, SortDirection, SortField, SqliteRepository,
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tempfile::tempdir;

fn draft(
    address: &str,
    price: i64,
    beds: u32,
    sqft: u32,
    acres: f64,
    status: PropertyStatus,
) -> PropertyDraft {
    PropertyDraft {
        address: address.to_string(),
        price: Decimal::from(price),
        beds,
        baths: 2.0,
        square_feet: sqft,
        acreage: acres,
        status,
        notes: String::new(),
    }
}

fn seeded<R: PropertyRepository>(repo: R) -> PropertyStore<R> {
    let store = PropertyStore::new(repo);
    store
        .add(draft("123 Main St, Anytown", 450_000, 4, 2400, 0.25, PropertyStatus::Interested))
        .unwrap();
    store
        .add(draft("456 Oak Ave, Somewhere", 525_000, 3, 2100, 0.15, PropertyStatus::Viewed))
        .unwrap();
    store
        .add(draft("789 Pine Rd, Elsewhere", 310_000, 2, 1500, 1.5, PropertyStatus::Passed))
        .unwrap();
    store
}

fn ids(store: &PropertyStore<MemoryRepository>, query: &PropertyQuery) -> Vec<i64> {
    store
        .list(query)
        .unwrap()
        .properties
        .iter()
        .map(|p| p.id)
        .collect()
}

#[test]
fn add_assigns_ids_and_price_per_sqft() {
    let store = seeded(MemoryRepository::new());
    let all = store.all().unwrap();
    assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(all[0].price_per_sqft, Decimal::new(18750, 2));
    assert_eq!(all[1].price_per_sqft, Decimal::from(250));
    // 310000 / 1500 = 206.666.. -> 206.67
    assert_eq!(all[2].price_per_sqft, Decimal::new(20667, 2));
}

#[test]
fn add_rejects_invalid_drafts() {
    let store = PropertyStore::new(MemoryRepository::new());
    let err = store
        .add(draft("1 Nowhere", 100_000, 1, 0, 0.0, PropertyStatus::Interested))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<PropertyError>(),
        Some(&PropertyError::InvalidSquareFeet)
    );

    let err = store
        .add(draft("   ", 100_000, 1, 900, 0.0, PropertyStatus::Interested))
        .unwrap_err();
    assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::EmptyAddress));
    assert!(store.all().unwrap().is_empty());
}

#[test]
fn filter_by_status_search_and_bounds() {
    let store = seeded(MemoryRepository::new());
    let mut q = PropertyQuery {
        page_size: 0,
        ..PropertyQuery::default()
    };
    q.sort = PropertySort {
        field: SortField::Price,
        direction: SortDirection::Asc,
    };

    q.filter = PropertyFilter {
        statuses: vec![PropertyStatus::Interested, PropertyStatus::Viewed],
        ..PropertyFilter::default()
    };
    assert_eq!(ids(&store, &q), vec![1, 2]);

    q.filter = PropertyFilter {
        search: Some("OAK".into()),
        ..PropertyFilter::default()
    };
    assert_eq!(ids(&store, &q), vec![2]);

    q.filter = PropertyFilter {
        min_price: Some(Decimal::from(310_000)),
        max_price: Some(Decimal::from(450_000)),
        ..PropertyFilter::default()
    };
    assert_eq!(ids(&store, &q), vec![3, 1]);

    q.filter = PropertyFilter {
        min_beds: Some(3),
        max_price_per_sqft: Some(Decimal::new(18750, 2)),
        ..PropertyFilter::default()
    };
    assert_eq!(ids(&store, &q), vec![1]);

    q.filter = PropertyFilter {
        min_sqft: Some(2000),
        max_sqft: Some(2200),
        ..PropertyFilter::default()
    };
    assert_eq!(ids(&store, &q), vec![2]);
}

#[test]
fn sort_parsing_and_ordering() {
    let store = seeded(MemoryRepository::new());
    let mut q = PropertyQuery::default();

    q.sort = "acreage-desc".parse().unwrap();
    assert_eq!(ids(&store, &q), vec![3, 1, 2]);

    q.sort = "price-per-sqft-asc".parse().unwrap();
    assert_eq!(ids(&store, &q), vec![1, 3, 2]);

    q.sort = "square_feet".parse().unwrap();
    assert_eq!(q.sort.direction, SortDirection::Desc);
    assert_eq!(ids(&store, &q), vec![1, 2, 3]);

    let err = "bedrooms".parse::<PropertySort>().unwrap_err();
    assert_eq!(err, PropertyError::UnknownSortField("bedrooms".into()));
}

#[test]
fn pagination_reports_total() {
    let store = seeded(MemoryRepository::new());
    let mut q = PropertyQuery {
        page: 1,
        page_size: 2,
        sort: "price-asc".parse().unwrap(),
        ..PropertyQuery::default()
    };
    let page = store.list(&q).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.properties.len(), 2);

    q.page = 2;
    assert_eq!(ids(&store, &q), vec![2]);

    q.page = 3;
    let page = store.list(&q).unwrap();
    assert!(page.properties.is_empty());
    assert_eq!(page.total, 3);
}

#[test]
fn update_recomputes_derived_field() {
    let store = seeded(MemoryRepository::new());
    let p = store
        .update(
            1,
            PropertyPatch {
                price: Some(Decimal::from(480_000)),
                notes: Some("Price dropped".into()),
                ..PropertyPatch::default()
            },
        )
        .unwrap();
    assert_eq!(p.price_per_sqft, Decimal::from(200));
    assert_eq!(p.notes, "Price dropped");
    assert_eq!(store.get(1).unwrap().unwrap(), p);

    let err = store
        .update(
            1,
            PropertyPatch {
                square_feet: Some(0),
                ..PropertyPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<PropertyError>(),
        Some(&PropertyError::InvalidSquareFeet)
    );
    assert_eq!(store.get(1).unwrap().unwrap().square_feet, 2400);
}

#[test]
fn status_viewings_and_removal() {
    let store = seeded(MemoryRepository::new());
    let p = store.set_status(2, PropertyStatus::Contacted, None).unwrap();
    assert_eq!(p.status, PropertyStatus::Contacted);
    assert_eq!(p.notes, "");

    let date = NaiveDate::from_ymd_opt(2025, 1, 25).unwrap();
    store.add_viewing(2, date, "Open house").unwrap();
    let p = store.add_viewing(2, date, "Second look").unwrap();
    assert_eq!(p.viewings.len(), 2);
    assert_eq!(p.viewings[1].notes, "Second look");

    let removed = store.remove(2).unwrap();
    assert_eq!(removed.id, 2);
    assert!(store.get(2).unwrap().is_none());
    let err = store.remove(2).unwrap_err();
    assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::NotFound(2)));

    // ids are never reused while a higher id exists
    let p = store
        .add(draft("10 New St", 200_000, 2, 1000, 0.1, PropertyStatus::Interested))
        .unwrap();
    assert_eq!(p.id, 4);
}

#[test]
fn sqlite_repository_round_trip() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let store = seeded(SqliteRepository::new(&conn));
    let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    store.add_viewing(1, date, "Walkthrough").unwrap();

    let reopened = PropertyStore::new(SqliteRepository::new(&conn));
    let all = reopened.all().unwrap();
    assert_eq!(all, store.all().unwrap());
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].viewings[0].date, date);
    assert_eq!(all[2].acreage, 1.5);

    reopened.remove(1).unwrap();
    let viewings: i64 = conn
        .query_row("SELECT COUNT(*) FROM property_viewings", [], |r| r.get(0))
        .unwrap();
    assert_eq!(viewings, 0);
}

#[test]
fn sqlite_skips_rows_with_unknown_status() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let store = seeded(SqliteRepository::new(&conn));
    conn.execute("UPDATE properties SET status='archived' WHERE id=3", [])
        .unwrap();
    let ids: Vec<i64> = store.all().unwrap().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn json_file_repository_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("properties.json");
    let repo = JsonFileRepository::new(&path);
    assert_eq!(repo.path(), path.as_path());
    assert!(repo.load().unwrap().is_empty());

    let store = seeded(repo);
    assert!(path.exists());
    let again = PropertyStore::new(JsonFileRepository::new(&path));
    assert_eq!(again.all().unwrap(), store.all().unwrap());
}

#[test]
fn memory_repository_seeded_with_existing_rows() {
    let source = seeded(MemoryRepository::new());
    let store = PropertyStore::new(MemoryRepository::with_properties(source.all().unwrap()));
    let p = store
        .add(draft("1 Cedar Ct", 280_000, 2, 1400, 0.1, PropertyStatus::Interested))
        .unwrap();
    assert_eq!(p.id, 4);
    assert_eq!(store.repository().load().unwrap().len(), 4);
}

#[test]
fn sqlite_write_keeps_skipped_rows_and_their_ids() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let store = seeded(SqliteRepository::new(&conn));
    let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    store.add_viewing(2, date, "Second showing").unwrap();
    conn.execute("UPDATE properties SET status='archived' WHERE id=2", [])
        .unwrap();

    let p = store
        .add(draft("9 Birch Ln", 275_000, 2, 1100, 0.2, PropertyStatus::Interested))
        .unwrap();
    assert_eq!(p.id, 4);
    store
        .update(
            1,
            PropertyPatch {
                notes: Some("Offer ready".into()),
                ..PropertyPatch::default()
            },
        )
        .unwrap();
    store.set_status(3, PropertyStatus::Viewed, None).unwrap();
    store.add_viewing(1, date, "Walkthrough").unwrap();
    store.remove(3).unwrap();

    let (address, status): (String, String) = conn
        .query_row("SELECT address, status FROM properties WHERE id=2", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(address, "456 Oak Ave, Somewhere");
    assert_eq!(status, "archived");
    let viewings: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM property_viewings WHERE property_id=2",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(viewings, 1);

    let ids: Vec<i64> = store.all().unwrap().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 4]);
    assert_eq!(store.get(1).unwrap().unwrap().notes, "Offer ready");
    assert_eq!(store.get(1).unwrap().unwrap().viewings.len(), 1);
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM properties", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 3);
}

#[test]
fn add_rejects_negative_or_nan_baths_and_acreage() {
    let store = PropertyStore::new(MemoryRepository::new());
    let mut bad = draft("2 Elm St", 200_000, 2, 1000, 0.1, PropertyStatus::Interested);
    bad.baths = -2.0;
    let err = store.add(bad.clone()).unwrap_err();
    assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::InvalidBaths));

    bad.baths = f64::NAN;
    let err = store.add(bad.clone()).unwrap_err();
    assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::InvalidBaths));

    bad.baths = 1.5;
    bad.acreage = -5.0;
    let err = store.add(bad.clone()).unwrap_err();
    assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::InvalidAcreage));

    bad.acreage = f64::INFINITY;
    assert!(store.add(bad).is_err());
    assert!(store.all().unwrap().is_empty());

    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let store = seeded(SqliteRepository::new(&conn));
    let err = store
        .update(
            1,
            PropertyPatch {
                baths: Some(f64::NAN),
                ..PropertyPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::InvalidBaths));
    assert_eq!(store.get(1).unwrap().unwrap().baths, 2.0);
}

fn dated(id: i64, address: &str, day: u32) -> Property {
    let mut p = Property {
        id,
        address: address.to_string(),
        price: Decimal::from(300_000),
        beds: 3,
        baths: 2.0,
        square_feet: 1500,
        acreage: 0.2,
        status: PropertyStatus::Interested,
        notes: String::new(),
        date_added: Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap(),
        price_per_sqft: Decimal::from(200),
        viewings: Vec::new(),
    };
    p.price_per_sqft.rescale(2);
    p
}

#[test]
fn default_listing_is_newest_first_with_stable_ties() {
    let store = PropertyStore::new(MemoryRepository::with_properties(vec![
        dated(1, "1 First St", 5),
        dated(2, "2 Second St", 12),
        dated(3, "3 Third St", 8),
        dated(4, "4 Fourth St", 12),
        dated(5, "5 Fifth St", 1),
    ]));
    let query = PropertyQuery::default();
    assert_eq!(query.sort.field, SortField::DateAdded);
    assert_eq!(query.sort.direction, SortDirection::Desc);
    assert_eq!(ids(&store, &query), vec![2, 4, 3, 1, 5]);

    let oldest = PropertyQuery {
        sort: "date-added-asc".parse().unwrap(),
        ..PropertyQuery::default()
    };
    assert_eq!(ids(&store, &oldest), vec![5, 1, 3, 2, 4]);
}
