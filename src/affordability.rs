// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PRICE_GRID_START: u32 = 250_000;
pub const PRICE_GRID_END: u32 = 675_000;
pub const PRICE_GRID_STEP: u32 = 25_000;

pub const RATE_GRID: [f64; 11] = [3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0];

pub const FRONT_END_RATIO: f64 = 0.28;
pub const BACK_END_RATIO: f64 = 0.43;
pub const PMI_DOWN_PAYMENT_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanTerm {
    #[serde(rename = "15")]
    Fifteen,
    #[serde(rename = "30")]
    Thirty,
}

impl LoanTerm {
    pub fn years(self) -> u32 {
        match self {
            LoanTerm::Fifteen => 15,
            LoanTerm::Thirty => 30,
        }
    }

    pub fn payments(self) -> u32 {
        self.years() * 12
    }
}

impl FromStr for LoanTerm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "15" => Ok(LoanTerm::Fifteen),
            "30" => Ok(LoanTerm::Thirty),
            other => Err(anyhow!("Invalid loan term '{}', expected 15 or 30", other)),
        }
    }
}

impl fmt::Display for LoanTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.years())
    }
}

/// Buyer-side parameters shared by every cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputs {
    pub down_payment: f64,
    pub loan_term: LoanTerm,
    pub annual_tax_rate_percent: f64,
    pub annual_pmi_rate_percent: f64,
    pub monthly_gross_income: f64,
    pub monthly_other_debts: f64,
}

impl Default for FinancialInputs {
    fn default() -> Self {
        Self {
            down_payment: 80_000.0,
            loan_term: LoanTerm::Thirty,
            annual_tax_rate_percent: 1.2,
            annual_pmi_rate_percent: 0.5,
            monthly_gross_income: 10_000.0,
            monthly_other_debts: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffordabilityTier {
    Comfortable,
    Moderate,
    Stretched,
    Unaffordable,
}

impl AffordabilityTier {
    pub const ALL: [AffordabilityTier; 4] = [
        AffordabilityTier::Comfortable,
        AffordabilityTier::Moderate,
        AffordabilityTier::Stretched,
        AffordabilityTier::Unaffordable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AffordabilityTier::Comfortable => "Comfortable",
            AffordabilityTier::Moderate => "Moderate",
            AffordabilityTier::Stretched => "Stretched",
            AffordabilityTier::Unaffordable => "Unaffordable",
        }
    }

    /// Background colour used when the grid is rendered.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            AffordabilityTier::Comfortable => (200, 255, 200),
            AffordabilityTier::Moderate => (255, 255, 200),
            AffordabilityTier::Stretched => (255, 200, 200),
            AffordabilityTier::Unaffordable => (139, 0, 0),
        }
    }

    // Dark red background needs white text.
    pub fn uses_light_text(self) -> bool {
        matches!(self, AffordabilityTier::Unaffordable)
    }
}

impl fmt::Display for AffordabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    pub principal: f64,
    pub base_payment: f64,
    pub monthly_tax: f64,
    pub monthly_pmi: f64,
}

impl PaymentBreakdown {
    pub fn total(&self) -> f64 {
        self.base_payment + self.monthly_tax + self.monthly_pmi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaymentCell {
    pub home_price: f64,
    pub interest_rate: f64,
    pub monthly_payment: f64,
    pub tier: AffordabilityTier,
}

pub fn price_grid() -> Vec<f64> {
    (PRICE_GRID_START..=PRICE_GRID_END)
        .step_by(PRICE_GRID_STEP as usize)
        .map(f64::from)
        .collect()
}

pub fn payment_breakdown(
    home_price: f64,
    interest_rate: f64,
    inputs: &FinancialInputs,
) -> PaymentBreakdown {
    let principal = (home_price - inputs.down_payment).max(0.0);
    let monthly_rate = interest_rate / 100.0 / 12.0;
    let num_payments = inputs.loan_term.payments();

    let base_payment = if monthly_rate == 0.0 {
        principal / f64::from(num_payments)
    } else {
        let growth = (1.0 + monthly_rate).powi(num_payments as i32);
        principal * (monthly_rate * growth) / (growth - 1.0)
    };

    let monthly_tax = home_price * (inputs.annual_tax_rate_percent / 100.0) / 12.0;

    let down_payment_percent = if home_price > 0.0 {
        inputs.down_payment / home_price * 100.0
    } else {
        100.0
    };
    let monthly_pmi = if down_payment_percent < PMI_DOWN_PAYMENT_THRESHOLD {
        principal * (inputs.annual_pmi_rate_percent / 100.0) / 12.0
    } else {
        0.0
    };

    PaymentBreakdown {
        principal,
        base_payment,
        monthly_tax,
        monthly_pmi,
    }
}

/// Estimated monthly housing cost: amortized principal and interest, property
/// tax, and PMI when the down payment is under 20% of the price. Not rounded.
pub fn compute_monthly_payment(
    home_price: f64,
    interest_rate: f64,
    inputs: &FinancialInputs,
) -> f64 {
    payment_breakdown(home_price, interest_rate, inputs).total()
}

pub fn classify_affordability(
    monthly_payment: f64,
    inputs: &FinancialInputs,
) -> AffordabilityTier {
    let income = inputs.monthly_gross_income;
    if income <= 0.0 {
        return AffordabilityTier::Unaffordable;
    }

    let total_monthly_debt = monthly_payment + inputs.monthly_other_debts;
    if total_monthly_debt / income > BACK_END_RATIO {
        return AffordabilityTier::Unaffordable;
    }

    let max_front_end = income * FRONT_END_RATIO;
    if monthly_payment <= max_front_end * 0.8 {
        AffordabilityTier::Comfortable
    } else if monthly_payment <= max_front_end {
        AffordabilityTier::Moderate
    } else if monthly_payment <= max_front_end * 1.2 {
        AffordabilityTier::Stretched
    } else {
        AffordabilityTier::Unaffordable
    }
}

/// Every price/rate combination, price-major then rate, both ascending.
pub fn build_grid(inputs: &FinancialInputs) -> Vec<PaymentCell> {
    let prices = price_grid();
    let mut cells = Vec::with_capacity(prices.len() * RATE_GRID.len());
    for &home_price in &prices {
        for &interest_rate in RATE_GRID.iter() {
            let monthly_payment = compute_monthly_payment(home_price, interest_rate, inputs);
            cells.push(PaymentCell {
                home_price,
                interest_rate,
                monthly_payment,
                tier: classify_affordability(monthly_payment, inputs),
            });
        }
    }
    debug!("built affordability grid with {} cells", cells.len());
    cells
}

pub fn max_affordable_price(interest_rate: f64, inputs: &FinancialInputs) -> Option<f64> {
    price_grid()
        .into_iter()
        .filter(|&price| {
            let payment = compute_monthly_payment(price, interest_rate, inputs);
            classify_affordability(payment, inputs) != AffordabilityTier::Unaffordable
        })
        .last()
}
