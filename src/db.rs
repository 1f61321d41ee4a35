// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::affordability::{FinancialInputs, LoanTerm};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{debug, info};
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.homescope", "Homescope", "homescope"));

pub const DB_ENV: &str = "HOMESCOPE_DB";

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("homescope.sqlite"))
}

/// `--db` wins over `HOMESCOPE_DB`, which wins over the platform data dir.
pub fn db_path(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = override_path {
        return Ok(p.to_path_buf());
    }
    match std::env::var_os(DB_ENV) {
        Some(p) if !p.is_empty() => Ok(PathBuf::from(p)),
        _ => default_db_path(),
    }
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Create directory {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!("opened database at {}", path.display());
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS properties(
        id INTEGER PRIMARY KEY,
        address TEXT NOT NULL,
        price TEXT NOT NULL,
        beds INTEGER NOT NULL DEFAULT 0,
        baths REAL NOT NULL DEFAULT 0,
        square_feet INTEGER NOT NULL CHECK(square_feet > 0),
        acreage REAL NOT NULL DEFAULT 0,
        status TEXT NOT NULL,
        notes TEXT,
        date_added TEXT NOT NULL,
        price_per_sqft TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_properties_status ON properties(status);

    CREATE TABLE IF NOT EXISTS property_viewings(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        property_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        notes TEXT NOT NULL DEFAULT '',
        FOREIGN KEY(property_id) REFERENCES properties(id) ON DELETE CASCADE
    );
    "#,
    )?;
    info!("database schema ready");
    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub const KEY_DOWN_PAYMENT: &str = "calc.down_payment";
pub const KEY_LOAN_TERM: &str = "calc.loan_term";
pub const KEY_TAX_RATE: &str = "calc.tax_rate";
pub const KEY_PMI_RATE: &str = "calc.pmi_rate";
pub const KEY_INCOME: &str = "calc.monthly_income";
pub const KEY_DEBTS: &str = "calc.monthly_debts";

fn setting_f64(conn: &Connection, key: &str, fallback: f64) -> Result<f64> {
    match get_setting(conn, key)? {
        Some(s) => s
            .parse::<f64>()
            .with_context(|| format!("Invalid value '{}' for setting {}", s, key)),
        None => Ok(fallback),
    }
}

/// Stored calculator defaults; unset keys take the built-in defaults.
pub fn load_calc_defaults(conn: &Connection) -> Result<FinancialInputs> {
    let fallback = FinancialInputs::default();
    let loan_term = match get_setting(conn, KEY_LOAN_TERM)? {
        Some(s) => s.parse::<LoanTerm>()?,
        None => fallback.loan_term,
    };
    Ok(FinancialInputs {
        down_payment: setting_f64(conn, KEY_DOWN_PAYMENT, fallback.down_payment)?,
        loan_term,
        annual_tax_rate_percent: setting_f64(conn, KEY_TAX_RATE, fallback.annual_tax_rate_percent)?,
        annual_pmi_rate_percent: setting_f64(conn, KEY_PMI_RATE, fallback.annual_pmi_rate_percent)?,
        monthly_gross_income: setting_f64(conn, KEY_INCOME, fallback.monthly_gross_income)?,
        monthly_other_debts: setting_f64(conn, KEY_DEBTS, fallback.monthly_other_debts)?,
    })
}

pub fn save_calc_defaults(conn: &Connection, inputs: &FinancialInputs) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    set_setting(&tx, KEY_DOWN_PAYMENT, &inputs.down_payment.to_string())?;
    set_setting(&tx, KEY_LOAN_TERM, &inputs.loan_term.to_string())?;
    set_setting(&tx, KEY_TAX_RATE, &inputs.annual_tax_rate_percent.to_string())?;
    set_setting(&tx, KEY_PMI_RATE, &inputs.annual_pmi_rate_percent.to_string())?;
    set_setting(&tx, KEY_INCOME, &inputs.monthly_gross_income.to_string())?;
    set_setting(&tx, KEY_DEBTS, &inputs.monthly_other_debts.to_string())?;
    tx.commit()?;
    Ok(())
}
