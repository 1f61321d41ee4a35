// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::affordability::{
    AffordabilityTier, FinancialInputs, LoanTerm, PaymentCell, RATE_GRID, build_grid,
    classify_affordability, max_affordable_price, payment_breakdown,
};
use crate::db::{load_calc_defaults, save_calc_defaults};
use crate::utils::{fmt_currency, maybe_print_json, parse_money_f64, parse_percent, pretty_table};
use anyhow::Result;
use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("grid", sub)) => grid(conn, sub)?,
        Some(("payment", sub)) => payment(conn, sub)?,
        Some(("defaults", sub)) => match sub.subcommand() {
            Some(("show", _)) => show_defaults(conn)?,
            Some(("set", set_m)) => set_defaults(conn, set_m)?,
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

/// Stored defaults with any calculator flags on `sub` laid over them.
pub fn resolve_inputs(conn: &Connection, sub: &clap::ArgMatches) -> Result<FinancialInputs> {
    let mut inputs = load_calc_defaults(conn)?;
    if let Some(v) = sub.get_one::<String>("down_payment") {
        inputs.down_payment = parse_money_f64(v)?;
    }
    if let Some(v) = sub.get_one::<String>("term") {
        inputs.loan_term = v.parse::<LoanTerm>()?;
    }
    if let Some(v) = sub.get_one::<String>("tax_rate") {
        inputs.annual_tax_rate_percent = parse_percent(v)?;
    }
    if let Some(v) = sub.get_one::<String>("pmi_rate") {
        inputs.annual_pmi_rate_percent = parse_percent(v)?;
    }
    if let Some(v) = sub.get_one::<String>("income") {
        inputs.monthly_gross_income = parse_money_f64(v)?;
    }
    if let Some(v) = sub.get_one::<String>("debts") {
        inputs.monthly_other_debts = parse_money_f64(v)?;
    }
    Ok(inputs)
}

fn tier_cell(text: String, tier: AffordabilityTier) -> Cell {
    let (r, g, b) = tier.rgb();
    let fg = if tier.uses_light_text() {
        Color::White
    } else {
        Color::Black
    };
    Cell::new(text).bg(Color::Rgb { r, g, b }).fg(fg)
}

fn tier_initial(tier: AffordabilityTier) -> char {
    tier.label().chars().next().unwrap_or('?')
}

pub fn grid_table(cells: &[PaymentCell]) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    let mut header = vec![Cell::new("Home Price/Interest")];
    header.extend(RATE_GRID.iter().map(|r| Cell::new(format!("{}%", r))));
    t.set_header(header);

    for row in cells.chunks(RATE_GRID.len()) {
        let Some(first) = row.first() else { continue };
        let mut out = vec![Cell::new(fmt_currency(first.home_price))];
        out.extend(row.iter().map(|c| {
            tier_cell(
                format!("{} {}", fmt_currency(c.monthly_payment), tier_initial(c.tier)),
                c.tier,
            )
        }));
        t.add_row(out);
    }
    t
}

/// Resolved inputs and the full grid for a `calc grid` invocation.
pub fn grid_cells(
    conn: &Connection,
    sub: &clap::ArgMatches,
) -> Result<(FinancialInputs, Vec<PaymentCell>)> {
    let inputs = resolve_inputs(conn, sub)?;
    Ok((inputs, build_grid(&inputs)))
}

fn grid(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let (inputs, cells) = grid_cells(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &cells)? {
        return Ok(());
    }

    println!(
        "Down payment {} | {}-year term | tax {}% | PMI {}% | income {}/mo | debts {}/mo",
        fmt_currency(inputs.down_payment),
        inputs.loan_term,
        inputs.annual_tax_rate_percent,
        inputs.annual_pmi_rate_percent,
        fmt_currency(inputs.monthly_gross_income),
        fmt_currency(inputs.monthly_other_debts),
    );
    println!("{}", grid_table(&cells));
    let legend: Vec<String> = AffordabilityTier::ALL
        .iter()
        .map(|t| format!("{} = {}", tier_initial(*t), t))
        .collect();
    println!("{}", legend.join("  "));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PaymentReport {
    pub home_price: f64,
    pub interest_rate: f64,
    pub principal: f64,
    pub base_payment: f64,
    pub monthly_tax: f64,
    pub monthly_pmi: f64,
    pub monthly_payment: f64,
    pub front_end_ratio: Option<f64>,
    pub back_end_ratio: Option<f64>,
    pub tier: AffordabilityTier,
    pub max_affordable_price: Option<f64>,
}

pub fn payment_report(
    home_price: f64,
    interest_rate: f64,
    inputs: &FinancialInputs,
) -> PaymentReport {
    let b = payment_breakdown(home_price, interest_rate, inputs);
    let total = b.total();
    let income = inputs.monthly_gross_income;
    let (front, back) = if income > 0.0 {
        (
            Some(total / income),
            Some((total + inputs.monthly_other_debts) / income),
        )
    } else {
        (None, None)
    };
    PaymentReport {
        home_price,
        interest_rate,
        principal: b.principal,
        base_payment: b.base_payment,
        monthly_tax: b.monthly_tax,
        monthly_pmi: b.monthly_pmi,
        monthly_payment: total,
        front_end_ratio: front,
        back_end_ratio: back,
        tier: classify_affordability(total, inputs),
        max_affordable_price: max_affordable_price(interest_rate, inputs),
    }
}

fn fmt_ratio(r: Option<f64>) -> String {
    r.map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| "n/a".into())
}

/// Parses `--price`/`--rate` and builds the report for `calc payment`.
pub fn payment_from(conn: &Connection, sub: &clap::ArgMatches) -> Result<PaymentReport> {
    let price = parse_money_f64(sub.get_one::<String>("price").unwrap())?;
    let rate = parse_percent(sub.get_one::<String>("rate").unwrap())?;
    let inputs = resolve_inputs(conn, sub)?;
    Ok(payment_report(price, rate, &inputs))
}

fn payment(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let report = payment_from(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }

    let rate = report.interest_rate;
    let rows = vec![
        vec!["Principal & interest".into(), fmt_currency(report.base_payment)],
        vec!["Property tax".into(), fmt_currency(report.monthly_tax)],
        vec!["PMI".into(), fmt_currency(report.monthly_pmi)],
        vec!["Monthly payment".into(), fmt_currency(report.monthly_payment)],
        vec!["Front-end DTI".into(), fmt_ratio(report.front_end_ratio)],
        vec!["Back-end DTI".into(), fmt_ratio(report.back_end_ratio)],
        vec!["Affordability".into(), report.tier.to_string()],
        vec![
            format!("Max grid price at {}%", rate),
            report
                .max_affordable_price
                .map(fmt_currency)
                .unwrap_or_else(|| "none".into()),
        ],
    ];
    println!(
        "{} at {}%, loan amount {}",
        fmt_currency(report.home_price),
        rate,
        fmt_currency(report.principal)
    );
    println!("{}", pretty_table(&["Item", "Value"], rows));
    Ok(())
}

fn show_defaults(conn: &Connection) -> Result<()> {
    let inputs = load_calc_defaults(conn)?;
    let rows = vec![
        vec!["Down payment".into(), fmt_currency(inputs.down_payment)],
        vec!["Loan term".into(), format!("{} years", inputs.loan_term)],
        vec!["Property tax rate".into(), format!("{}%", inputs.annual_tax_rate_percent)],
        vec!["PMI rate".into(), format!("{}%", inputs.annual_pmi_rate_percent)],
        vec!["Monthly income".into(), fmt_currency(inputs.monthly_gross_income)],
        vec!["Monthly debts".into(), fmt_currency(inputs.monthly_other_debts)],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}

fn set_defaults(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let inputs = resolve_inputs(conn, sub)?;
    save_calc_defaults(conn, &inputs)?;
    println!("Calculator defaults saved");
    Ok(())
}
