// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Simulated geocoding for the property map.
//!
//! Addresses are not resolved. Each property is scattered around the centre
//! of the contiguous US using an RNG seeded with its id, so a property keeps
//! its spot across runs.

use crate::models::{Property, PropertyStatus};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

pub const MAP_CENTER: LatLng = LatLng {
    lat: 39.8283,
    lng: -98.5795,
};
pub const DEFAULT_ZOOM: u8 = 4;
pub const JITTER_DEGREES: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: i64,
    pub address: String,
    pub price: Decimal,
    pub beds: u32,
    pub baths: f64,
    pub square_feet: u32,
    pub acreage: f64,
    pub status: PropertyStatus,
    pub position: LatLng,
}

pub fn geocode(property: &Property, jitter_degrees: f64) -> LatLng {
    let mut rng = ChaCha8Rng::seed_from_u64(property.id as u64);
    let lat = MAP_CENTER.lat + (rng.gen_range(0.0..1.0) - 0.5) * jitter_degrees;
    let lng = MAP_CENTER.lng + (rng.gen_range(0.0..1.0) - 0.5) * jitter_degrees;
    LatLng { lat, lng }
}

pub fn markers(properties: &[Property]) -> Vec<MapMarker> {
    properties
        .iter()
        .map(|p| MapMarker {
            id: p.id,
            address: p.address.clone(),
            price: p.price,
            beds: p.beds,
            baths: p.baths,
            square_feet: p.square_feet,
            acreage: p.acreage,
            status: p.status,
            position: geocode(p, JITTER_DEGREES),
        })
        .collect()
}

pub fn to_geojson(markers: &[MapMarker]) -> Value {
    let features: Vec<Value> = markers
        .iter()
        .map(|m| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.position.lng, m.position.lat],
                },
                "properties": {
                    "id": m.id,
                    "address": m.address,
                    "price": m.price.to_string(),
                    "beds": m.beds,
                    "baths": m.baths,
                    "square_feet": m.square_feet,
                    "acreage": m.acreage,
                    "status": m.status.as_str(),
                },
            })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
