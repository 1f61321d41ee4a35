// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PropertyError {
    #[error("Property {0} not found")]
    NotFound(i64),
    #[error("Square feet must be greater than zero")]
    InvalidSquareFeet,
    #[error("Address must not be empty")]
    EmptyAddress,
    #[error("Price must not be negative")]
    InvalidPrice,
    #[error("Baths must be a non-negative number")]
    InvalidBaths,
    #[error("Acreage must be a non-negative number")]
    InvalidAcreage,
    #[error("Unknown status '{0}', expected interested|viewed|contacted|passed")]
    UnknownStatus(String),
    #[error("Unknown sort '{0}'")]
    UnknownSortField(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Interested,
    Viewed,
    Contacted,
    Passed,
}

impl PropertyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyStatus::Interested => "interested",
            PropertyStatus::Viewed => "viewed",
            PropertyStatus::Contacted => "contacted",
            PropertyStatus::Passed => "passed",
        }
    }
}

impl FromStr for PropertyStatus {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "interested" => Ok(PropertyStatus::Interested),
            "viewed" => Ok(PropertyStatus::Viewed),
            "contacted" => Ok(PropertyStatus::Contacted),
            "passed" => Ok(PropertyStatus::Passed),
            _ => Err(PropertyError::UnknownStatus(s.trim().to_string())),
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewing {
    pub date: NaiveDate,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub address: String,
    pub price: Decimal,
    pub beds: u32,
    pub baths: f64,
    pub square_feet: u32,
    pub acreage: f64,
    pub status: PropertyStatus,
    pub notes: String,
    pub date_added: DateTime<Utc>,
    pub price_per_sqft: Decimal,
    #[serde(default)]
    pub viewings: Vec<Viewing>,
}

/// The fields a user fills in when saving a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub address: String,
    pub price: Decimal,
    pub beds: u32,
    pub baths: f64,
    pub square_feet: u32,
    pub acreage: f64,
    pub status: PropertyStatus,
    pub notes: String,
}

impl PropertyDraft {
    pub fn validate(&self) -> Result<(), PropertyError> {
        if self.address.trim().is_empty() {
            return Err(PropertyError::EmptyAddress);
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(PropertyError::InvalidPrice);
        }
        if self.square_feet == 0 {
            return Err(PropertyError::InvalidSquareFeet);
        }
        if !is_non_negative(self.baths) {
            return Err(PropertyError::InvalidBaths);
        }
        if !is_non_negative(self.acreage) {
            return Err(PropertyError::InvalidAcreage);
        }
        Ok(())
    }
}

fn is_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub address: Option<String>,
    pub price: Option<Decimal>,
    pub beds: Option<u32>,
    pub baths: Option<f64>,
    pub square_feet: Option<u32>,
    pub acreage: Option<f64>,
    pub status: Option<PropertyStatus>,
    pub notes: Option<String>,
}

impl Property {
    pub fn draft(&self) -> PropertyDraft {
        PropertyDraft {
            address: self.address.clone(),
            price: self.price,
            beds: self.beds,
            baths: self.baths,
            square_feet: self.square_feet,
            acreage: self.acreage,
            status: self.status,
            notes: self.notes.clone(),
        }
    }

    /// Overwrites the editable fields and refreshes the derived price per sq ft.
    pub fn apply_draft(&mut self, draft: PropertyDraft) -> Result<(), PropertyError> {
        draft.validate()?;
        self.price_per_sqft = price_per_sqft(draft.price, draft.square_feet)?;
        self.address = draft.address.trim().to_string();
        self.price = draft.price;
        self.beds = draft.beds;
        self.baths = draft.baths;
        self.square_feet = draft.square_feet;
        self.acreage = draft.acreage;
        self.status = draft.status;
        self.notes = draft.notes;
        Ok(())
    }

    pub fn apply_patch(&mut self, patch: PropertyPatch) -> Result<(), PropertyError> {
        let mut draft = self.draft();
        if let Some(v) = patch.address {
            draft.address = v;
        }
        if let Some(v) = patch.price {
            draft.price = v;
        }
        if let Some(v) = patch.beds {
            draft.beds = v;
        }
        if let Some(v) = patch.baths {
            draft.baths = v;
        }
        if let Some(v) = patch.square_feet {
            draft.square_feet = v;
        }
        if let Some(v) = patch.acreage {
            draft.acreage = v;
        }
        if let Some(v) = patch.status {
            draft.status = v;
        }
        if let Some(v) = patch.notes {
            draft.notes = v;
        }
        self.apply_draft(draft)
    }
}

pub fn price_per_sqft(price: Decimal, square_feet: u32) -> Result<Decimal, PropertyError> {
    if square_feet == 0 {
        return Err(PropertyError::InvalidSquareFeet);
    }
    let mut v = (price / Decimal::from(square_feet))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    v.rescale(2);
    Ok(v)
}
