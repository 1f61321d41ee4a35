// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{PropertyRepository, PropertyStore};
use anyhow::{Context, Result, anyhow};
use serde_json::json;

pub fn export_properties<R: PropertyRepository>(
    store: &PropertyStore<R>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let mut properties = store.all()?;
    properties.sort_by_key(|p| p.id);

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record([
                "id",
                "address",
                "price",
                "beds",
                "baths",
                "square_feet",
                "acreage",
                "price_per_sqft",
                "status",
                "date_added",
                "viewings",
                "notes",
            ])?;
            for p in &properties {
                wtr.write_record([
                    p.id.to_string(),
                    p.address.clone(),
                    p.price.to_string(),
                    p.beds.to_string(),
                    p.baths.to_string(),
                    p.square_feet.to_string(),
                    p.acreage.to_string(),
                    p.price_per_sqft.to_string(),
                    p.status.to_string(),
                    p.date_added.to_rfc3339(),
                    p.viewings.len().to_string(),
                    p.notes.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = properties
                .iter()
                .map(|p| {
                    json!({
                        "id": p.id,
                        "address": p.address,
                        "price": p.price.to_string(),
                        "beds": p.beds,
                        "baths": p.baths,
                        "square_feet": p.square_feet,
                        "acreage": p.acreage,
                        "price_per_sqft": p.price_per_sqft.to_string(),
                        "status": p.status.as_str(),
                        "date_added": p.date_added.to_rfc3339(),
                        "viewings": p.viewings,
                        "notes": p.notes,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    println!("Exported {} properties to {}", properties.len(), out);
    Ok(())
}
