// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Property, PropertyDraft, PropertyError, PropertyPatch, PropertyStatus};
use crate::store::{
    Page, PropertyFilter, PropertyQuery, PropertyRepository, PropertySort, PropertyStore,
    SqliteRepository,
};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_money, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = PropertyStore::new(SqliteRepository::new(conn));
    match m.subcommand() {
        Some(("add", sub)) => add(&store, sub)?,
        Some(("list", sub)) => list(&store, sub)?,
        Some(("show", sub)) => show(&store, sub)?,
        Some(("edit", sub)) => edit(&store, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(sub)?;
            let removed = store.remove(id)?;
            println!("Removed property {} '{}'", removed.id, removed.address);
        }
        Some(("status", sub)) => {
            let id = parse_id(sub)?;
            let status = sub
                .get_one::<String>("status")
                .unwrap()
                .parse::<PropertyStatus>()?;
            let notes = sub.get_one::<String>("notes").map(|s| s.trim().to_string());
            let p = store.set_status(id, status, notes)?;
            println!("Property {} is now {}", p.id, p.status);
        }
        Some(("view", sub)) => {
            let id = parse_id(sub)?;
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            let notes = sub.get_one::<String>("notes").map(|s| s.trim()).unwrap_or("");
            let p = store.add_viewing(id, date, notes)?;
            println!(
                "Recorded viewing on {} for '{}' ({} total)",
                date,
                p.address,
                p.viewings.len()
            );
        }
        Some(("export", sub)) => crate::commands::exporter::export_properties(&store, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid property id '{}'", raw))
}

fn parse_opt<T>(sub: &clap::ArgMatches, key: &str, what: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match sub.get_one::<String>(key) {
        Some(raw) => {
            let v = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("Invalid {} '{}'", what, raw))?;
            Ok(Some(v))
        }
        None => Ok(None),
    }
}

fn parse_opt_money(sub: &clap::ArgMatches, key: &str) -> Result<Option<Decimal>> {
    sub.get_one::<String>(key).map(|s| parse_money(s)).transpose()
}

fn patch_from(sub: &clap::ArgMatches) -> Result<PropertyPatch> {
    Ok(PropertyPatch {
        address: sub.get_one::<String>("address").map(|s| s.trim().to_string()),
        price: parse_opt_money(sub, "price")?,
        beds: parse_opt(sub, "beds", "bed count")?,
        baths: parse_opt(sub, "baths", "bath count")?,
        square_feet: parse_opt(sub, "sqft", "square feet")?,
        acreage: parse_opt(sub, "acres", "acreage")?,
        status: parse_opt(sub, "status", "status")?,
        notes: sub.get_one::<String>("notes").map(|s| s.trim().to_string()),
    })
}

/// Builds a draft from the `property add` arguments.
pub fn draft_from(sub: &clap::ArgMatches) -> Result<PropertyDraft> {
    let patch = patch_from(sub)?;
    Ok(PropertyDraft {
        address: patch.address.unwrap_or_default(),
        price: patch.price.unwrap_or_default(),
        beds: patch.beds.unwrap_or_default(),
        baths: patch.baths.unwrap_or_default(),
        square_feet: patch.square_feet.unwrap_or_default(),
        acreage: patch.acreage.unwrap_or_default(),
        status: patch.status.unwrap_or_default(),
        notes: patch.notes.unwrap_or_default(),
    })
}

fn add<R: PropertyRepository>(store: &PropertyStore<R>, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from(sub)?;
    let p = store.add(draft)?;
    println!(
        "Saved property {} '{}' at {} ({}/sqft)",
        p.id,
        p.address,
        fmt_money(&p.price),
        p.price_per_sqft
    );
    Ok(())
}

fn edit<R: PropertyRepository>(store: &PropertyStore<R>, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let patch = patch_from(sub)?;
    let p = store.update(id, patch)?;
    println!("Updated property {} '{}'", p.id, p.address);
    Ok(())
}

/// Translates `property list` arguments into a store query.
pub fn query_from(sub: &clap::ArgMatches) -> Result<PropertyQuery> {
    let statuses = match sub.get_many::<String>("status") {
        Some(vals) => vals
            .map(|s| s.parse::<PropertyStatus>())
            .collect::<Result<Vec<_>, PropertyError>>()?,
        None => Vec::new(),
    };
    let filter = PropertyFilter {
        search: sub
            .get_one::<String>("search")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        statuses,
        min_price: parse_opt_money(sub, "min_price")?,
        max_price: parse_opt_money(sub, "max_price")?,
        min_beds: parse_opt(sub, "min_beds", "bed count")?,
        min_baths: parse_opt(sub, "min_baths", "bath count")?,
        min_sqft: parse_opt(sub, "min_sqft", "square feet")?,
        max_sqft: parse_opt(sub, "max_sqft", "square feet")?,
        max_price_per_sqft: parse_opt_money(sub, "max_ppsf")?,
    };
    let sort = match sub.get_one::<String>("sort") {
        Some(s) => s.parse::<PropertySort>()?,
        None => PropertySort::default(),
    };
    Ok(PropertyQuery {
        filter,
        sort,
        page: *sub.get_one::<usize>("page").unwrap_or(&1),
        page_size: *sub
            .get_one::<usize>("page_size")
            .unwrap_or(&crate::store::DEFAULT_PAGE_SIZE),
    })
}

pub fn query_rows<R: PropertyRepository>(
    store: &PropertyStore<R>,
    sub: &clap::ArgMatches,
) -> Result<Page> {
    let query = query_from(sub)?;
    store.list(&query)
}

fn row_of(p: &Property) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.address.clone(),
        fmt_money(&p.price),
        format!("{:.2}", p.price_per_sqft),
        p.beds.to_string(),
        p.baths.to_string(),
        p.square_feet.to_string(),
        format!("{:.2}", p.acreage),
        p.status.to_string(),
        p.date_added.format("%Y-%m-%d").to_string(),
        p.notes.clone(),
    ]
}

const HEADERS: [&str; 11] = [
    "ID", "Address", "Price", "$/SqFt", "Beds", "Baths", "SqFt", "Acres", "Status", "Added",
    "Notes",
];

fn list<R: PropertyRepository>(store: &PropertyStore<R>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = query_rows(store, sub)?;
    // --json keeps the page total; --jsonl streams one property per line.
    if json_flag {
        maybe_print_json(true, false, &page)?;
        return Ok(());
    }
    if maybe_print_json(false, jsonl_flag, &page.properties)? {
        return Ok(());
    }
    if page.total == 0 {
        println!("No properties found");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = page.properties.iter().map(row_of).collect();
    println!("{}", pretty_table(&HEADERS, rows));
    println!("Showing {} of {} properties", page.properties.len(), page.total);
    Ok(())
}

fn show<R: PropertyRepository>(store: &PropertyStore<R>, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let p = store.get(id)?.ok_or(PropertyError::NotFound(id))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
        return Ok(());
    }
    println!("{}", pretty_table(&HEADERS, vec![row_of(&p)]));
    if !p.viewings.is_empty() {
        let rows = p
            .viewings
            .iter()
            .map(|v| vec![v.date.to_string(), v.notes.clone()])
            .collect();
        println!("{}", pretty_table(&["Viewed", "Notes"], rows));
    }
    Ok(())
}
