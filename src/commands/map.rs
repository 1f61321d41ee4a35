// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::geo::{DEFAULT_ZOOM, MAP_CENTER, markers, to_geojson};
use crate::store::{PropertyStore, SqliteRepository};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = PropertyStore::new(SqliteRepository::new(conn));
    let mut properties = store.all()?;
    properties.sort_by_key(|p| p.id);
    let points = markers(&properties);

    match m.subcommand() {
        Some(("markers", sub)) => {
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
                return Ok(());
            }
            println!(
                "Centre {:.4}, {:.4} (zoom {})",
                MAP_CENTER.lat, MAP_CENTER.lng, DEFAULT_ZOOM
            );
            let rows = points
                .iter()
                .map(|mk| {
                    vec![
                        mk.id.to_string(),
                        mk.address.clone(),
                        fmt_money(&mk.price),
                        format!("{} bd / {} ba", mk.beds, mk.baths),
                        mk.square_feet.to_string(),
                        format!("{:.2}", mk.acreage),
                        mk.status.to_string(),
                        format!("{:.4}", mk.position.lat),
                        format!("{:.4}", mk.position.lng),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["ID", "Address", "Price", "Rooms", "SqFt", "Acres", "Status", "Lat", "Lng"],
                    rows
                )
            );
        }
        Some(("geojson", sub)) => {
            let doc = serde_json::to_string_pretty(&to_geojson(&points))?;
            match sub.get_one::<String>("out") {
                Some(out) => {
                    let out = out.trim();
                    std::fs::write(out, doc).with_context(|| format!("Write {}", out))?;
                    println!("Wrote {} markers to {}", points.len(), out);
                }
                None => println!("{}", doc),
            }
        }
        _ => {}
    }
    Ok(())
}
