// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    Property, PropertyDraft, PropertyError, PropertyPatch, PropertyStatus, Viewing,
    price_per_sqft,
};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Loads and saves the complete set of saved properties. Saving replaces
/// whatever the backend held before.
pub trait PropertyRepository {
    fn load(&self) -> Result<Vec<Property>>;
    fn save(&self, properties: &[Property]) -> Result<()>;

    /// Id for the next new property, given the set `load` just returned.
    fn next_id(&self, loaded: &[Property]) -> Result<i64> {
        Ok(loaded.iter().map(|p| p.id).max().unwrap_or(0) + 1)
    }
}

pub struct SqliteRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl PropertyRepository for SqliteRepository<'_> {
    fn load(&self) -> Result<Vec<Property>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, address, price, beds, baths, square_feet, acreage, status, notes, date_added
             FROM properties ORDER BY id",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, u32>(3)?,
                r.get::<_, f64>(4)?,
                r.get::<_, u32>(5)?,
                r.get::<_, f64>(6)?,
                r.get::<_, String>(7)?,
                r.get::<_, Option<String>>(8)?,
                r.get::<_, String>(9)?,
            ))
        })?;

        let mut properties = Vec::new();
        let mut index_by_id = HashMap::new();
        for row in rows {
            let (
                id,
                address,
                price_s,
                beds,
                baths,
                square_feet,
                acreage,
                status_s,
                notes,
                added_s,
            ) = row?;
            let status = match status_s.parse::<PropertyStatus>() {
                Ok(s) => s,
                Err(err) => {
                    warn!("skipping property {}: {}", id, err);
                    continue;
                }
            };
            let price = price_s
                .parse::<Decimal>()
                .with_context(|| format!("Invalid price '{}' for property {}", price_s, id))?;
            let date_added = DateTime::parse_from_rfc3339(&added_s)
                .with_context(|| format!("Invalid date_added '{}' for property {}", added_s, id))?
                .with_timezone(&Utc);
            let price_per_sqft = price_per_sqft(price, square_feet)
                .with_context(|| format!("Property {} has no square footage", id))?;
            index_by_id.insert(id, properties.len());
            properties.push(Property {
                id,
                address,
                price,
                beds,
                baths,
                square_feet,
                acreage,
                status,
                notes: notes.unwrap_or_default(),
                date_added,
                price_per_sqft,
                viewings: Vec::new(),
            });
        }

        let mut vstmt = self
            .conn
            .prepare("SELECT property_id, date, notes FROM property_viewings ORDER BY id")?;
        let mut cur = vstmt.query([])?;
        while let Some(r) = cur.next()? {
            let property_id: i64 = r.get(0)?;
            let d: String = r.get(1)?;
            let notes: String = r.get(2)?;
            let date = NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .with_context(|| format!("Invalid viewing date '{}'", d))?;
            if let Some(&idx) = index_by_id.get(&property_id) {
                properties[idx].viewings.push(Viewing { date, notes });
            }
        }

        debug!("loaded {} properties from sqlite", properties.len());
        Ok(properties)
    }

    /// Upserts `properties` and deletes only rows that `load` would have
    /// returned, so rows skipped on load survive a write.
    fn save(&self, properties: &[Property]) -> Result<()> {
        let keep: HashSet<i64> = properties.iter().map(|p| p.id).collect();
        let tx = self.conn.unchecked_transaction()?;

        let stale: Vec<i64> = {
            let mut stmt = tx.prepare("SELECT id, status FROM properties")?;
            let rows = stmt.query_map([], |r| {
                Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
            })?;
            let mut stale = Vec::new();
            for row in rows {
                let (id, status_s) = row?;
                if !keep.contains(&id) && status_s.parse::<PropertyStatus>().is_ok() {
                    stale.push(id);
                }
            }
            stale
        };
        for id in &stale {
            tx.execute("DELETE FROM property_viewings WHERE property_id=?1", params![id])?;
            tx.execute("DELETE FROM properties WHERE id=?1", params![id])?;
        }

        {
            let mut upsert = tx.prepare(
                "INSERT INTO properties(id, address, price, beds, baths, square_feet, acreage, status, notes, date_added, price_per_sqft)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)
                 ON CONFLICT(id) DO UPDATE SET
                    address=excluded.address, price=excluded.price, beds=excluded.beds,
                    baths=excluded.baths, square_feet=excluded.square_feet,
                    acreage=excluded.acreage, status=excluded.status, notes=excluded.notes,
                    date_added=excluded.date_added, price_per_sqft=excluded.price_per_sqft",
            )?;
            let mut clear_viewings =
                tx.prepare("DELETE FROM property_viewings WHERE property_id=?1")?;
            let mut insert_viewing = tx.prepare(
                "INSERT INTO property_viewings(property_id, date, notes) VALUES (?1,?2,?3)",
            )?;
            for p in properties {
                upsert.execute(params![
                    p.id,
                    p.address,
                    p.price.to_string(),
                    p.beds,
                    p.baths,
                    p.square_feet,
                    p.acreage,
                    p.status.as_str(),
                    p.notes,
                    p.date_added.to_rfc3339(),
                    p.price_per_sqft.to_string(),
                ])?;
                clear_viewings.execute(params![p.id])?;
                for v in &p.viewings {
                    insert_viewing.execute(params![p.id, v.date.to_string(), v.notes])?;
                }
            }
        }
        tx.commit()?;
        debug!(
            "saved {} properties to sqlite, deleted {}",
            properties.len(),
            stale.len()
        );
        Ok(())
    }

    // Skipped rows still own their ids.
    fn next_id(&self, loaded: &[Property]) -> Result<i64> {
        let stored: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(id), 0) FROM properties",
            [],
            |r| r.get(0),
        )?;
        let seen = loaded.iter().map(|p| p.id).max().unwrap_or(0);
        Ok(stored.max(seen) + 1)
    }
}

pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PropertyRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<Property>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let properties: Vec<Property> = serde_json::from_str(&raw)
            .with_context(|| format!("Parse properties from {}", self.path.display()))?;
        Ok(properties)
    }

    fn save(&self, properties: &[Property]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Create directory {}", parent.display()))?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(properties)?)
            .with_context(|| format!("Write {}", self.path.display()))?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    properties: RefCell<Vec<Property>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(properties: Vec<Property>) -> Self {
        Self {
            properties: RefCell::new(properties),
        }
    }
}

impl PropertyRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<Property>> {
        Ok(self.properties.borrow().clone())
    }

    fn save(&self, properties: &[Property]) -> Result<()> {
        *self.properties.borrow_mut() = properties.to_vec();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub search: Option<String>,
    pub statuses: Vec<PropertyStatus>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_beds: Option<u32>,
    pub min_baths: Option<f64>,
    pub min_sqft: Option<u32>,
    pub max_sqft: Option<u32>,
    pub max_price_per_sqft: Option<Decimal>,
}

impl PropertyFilter {
    pub fn matches(&self, p: &Property) -> bool {
        if let Some(ref needle) = self.search {
            let needle = needle.trim().to_lowercase();
            if !needle.is_empty() && !p.address.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&p.status) {
            return false;
        }
        if self.min_price.is_some_and(|min| p.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| p.price > max) {
            return false;
        }
        if self.min_beds.is_some_and(|min| p.beds < min) {
            return false;
        }
        if self.min_baths.is_some_and(|min| p.baths < min) {
            return false;
        }
        if self.min_sqft.is_some_and(|min| p.square_feet < min) {
            return false;
        }
        if self.max_sqft.is_some_and(|max| p.square_feet > max) {
            return false;
        }
        if self.max_price_per_sqft.is_some_and(|max| p.price_per_sqft > max) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    DateAdded,
    Price,
    PricePerSqft,
    SquareFeet,
    Acreage,
}

impl SortField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "date-added" | "dateadded" | "date" => Some(SortField::DateAdded),
            "price" => Some(SortField::Price),
            "price-per-sqft" | "pricepersqft" | "ppsf" => Some(SortField::PricePerSqft),
            "square-feet" | "squarefeet" | "sqft" => Some(SortField::SquareFeet),
            "acreage" | "acres" | "lotsize" => Some(SortField::Acreage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertySort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl PropertySort {
    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        let ord = match self.field {
            SortField::DateAdded => a.date_added.cmp(&b.date_added),
            SortField::Price => a.price.cmp(&b.price),
            SortField::PricePerSqft => a.price_per_sqft.cmp(&b.price_per_sqft),
            SortField::SquareFeet => a.square_feet.cmp(&b.square_feet),
            SortField::Acreage => a.acreage.total_cmp(&b.acreage),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

impl FromStr for PropertySort {
    type Err = PropertyError;

    /// Accepts `field` or `field-asc` / `field-desc`, e.g. `price-asc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace('_', "-");
        let (field_s, direction) = if let Some(f) = norm.strip_suffix("-asc") {
            (f, SortDirection::Asc)
        } else if let Some(f) = norm.strip_suffix("-desc") {
            (f, SortDirection::Desc)
        } else {
            (norm.as_str(), SortDirection::Desc)
        };
        let field = SortField::parse(field_s)
            .ok_or_else(|| PropertyError::UnknownSortField(s.to_string()))?;
        Ok(PropertySort { field, direction })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyQuery {
    pub filter: PropertyFilter,
    pub sort: PropertySort,
    pub page: usize,
    /// Zero returns every matching property on a single page.
    pub page_size: usize,
}

impl Default for PropertyQuery {
    fn default() -> Self {
        Self {
            filter: PropertyFilter::default(),
            sort: PropertySort::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub properties: Vec<Property>,
    pub total: usize,
}

pub struct PropertyStore<R: PropertyRepository> {
    repo: R,
}

impl<R: PropertyRepository> PropertyStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn all(&self) -> Result<Vec<Property>> {
        self.repo.load()
    }

    pub fn add(&self, draft: PropertyDraft) -> Result<Property> {
        draft.validate()?;
        let mut properties = self.repo.load()?;
        let id = self.repo.next_id(&properties)?;
        let property = Property {
            id,
            address: draft.address.trim().to_string(),
            price: draft.price,
            beds: draft.beds,
            baths: draft.baths,
            square_feet: draft.square_feet,
            acreage: draft.acreage,
            status: draft.status,
            notes: draft.notes,
            date_added: Utc::now(),
            price_per_sqft: price_per_sqft(draft.price, draft.square_feet)?,
            viewings: Vec::new(),
        };
        properties.push(property.clone());
        self.repo.save(&properties)?;
        info!("added property {} ({})", property.id, property.address);
        Ok(property)
    }

    pub fn get(&self, id: i64) -> Result<Option<Property>> {
        Ok(self.repo.load()?.into_iter().find(|p| p.id == id))
    }

    pub fn update(&self, id: i64, patch: PropertyPatch) -> Result<Property> {
        self.modify(id, |p| p.apply_patch(patch))
    }

    pub fn set_status(
        &self,
        id: i64,
        status: PropertyStatus,
        notes: Option<String>,
    ) -> Result<Property> {
        self.modify(id, |p| {
            p.status = status;
            if let Some(n) = notes {
                p.notes = n;
            }
            Ok(())
        })
    }

    pub fn add_viewing(&self, id: i64, date: NaiveDate, notes: &str) -> Result<Property> {
        self.modify(id, |p| {
            p.viewings.push(Viewing {
                date,
                notes: notes.to_string(),
            });
            Ok(())
        })
    }

    pub fn remove(&self, id: i64) -> Result<Property> {
        let mut properties = self.repo.load()?;
        let idx = properties
            .iter()
            .position(|p| p.id == id)
            .ok_or(PropertyError::NotFound(id))?;
        let removed = properties.remove(idx);
        self.repo.save(&properties)?;
        info!("removed property {} ({})", removed.id, removed.address);
        Ok(removed)
    }

    pub fn list(&self, query: &PropertyQuery) -> Result<Page> {
        let mut matched: Vec<Property> = self
            .repo
            .load()?
            .into_iter()
            .filter(|p| query.filter.matches(p))
            .collect();
        matched.sort_by(|a, b| query.sort.compare(a, b));
        let total = matched.len();

        let properties = if query.page_size == 0 {
            matched
        } else {
            let start = query.page.max(1).saturating_sub(1).saturating_mul(query.page_size);
            matched.into_iter().skip(start).take(query.page_size).collect()
        };
        debug!("listed {} of {} matching properties", properties.len(), total);
        Ok(Page { properties, total })
    }

    fn modify<F>(&self, id: i64, f: F) -> Result<Property>
    where
        F: FnOnce(&mut Property) -> Result<(), PropertyError>,
    {
        let mut properties = self.repo.load()?;
        let property = properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PropertyError::NotFound(id))?;
        f(property)?;
        let updated = property.clone();
        self.repo.save(&properties)?;
        info!("updated property {}", id);
        Ok(updated)
    }
}
