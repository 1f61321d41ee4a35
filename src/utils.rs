// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

// "$450,000.00", "450000", " 1,250 "
static MONEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$?\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?$").expect("valid regex"));

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parses a non-negative dollar amount, tolerating a `$` prefix and
/// thousands separators.
pub fn parse_money(s: &str) -> Result<Decimal> {
    let raw = s.trim();
    let caps = MONEY_RE
        .captures(raw)
        .ok_or_else(|| anyhow!("Invalid amount '{}', expected e.g. 450000 or $450,000", s))?;
    let whole = caps[1].replace(',', "");
    let frac = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    parse_decimal(&format!("{}{}", whole, frac))
}

pub fn parse_money_f64(s: &str) -> Result<f64> {
    let d = parse_money(s)?;
    decimal_to_f64(d)
}

pub fn parse_percent(s: &str) -> Result<f64> {
    let raw = s.trim().trim_end_matches('%').trim();
    let v: f64 = raw
        .parse()
        .with_context(|| format!("Invalid percentage '{}'", s))?;
    if !v.is_finite() || v < 0.0 {
        return Err(anyhow!("Percentage must be non-negative, got '{}'", s));
    }
    Ok(v)
}

pub fn decimal_to_f64(d: Decimal) -> Result<f64> {
    d.to_f64()
        .with_context(|| format!("Amount '{}' is out of range", d))
}

/// `$` prefix, rounded to whole dollars, comma thousands separators.
pub fn fmt_currency(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

pub fn fmt_money(d: &Decimal) -> String {
    let whole = d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    fmt_currency(whole.to_f64().unwrap_or_default())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
