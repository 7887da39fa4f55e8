//! Closed-form financial formulas.
//!
//! Every formula works with a periodic rate `r = annual_rate /
//! periods_per_year` and a period count `n = periods_per_year * years`.
//! A loan with a zero rate is paid off in equal parts: `principal / n`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::*;

/// Named numeric inputs of a financial calculation
pub type FinancialParameters = BTreeMap<String, f64>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    CompoundInterest,
    LoanPayment,
    PresentValue,
}

impl CalculationType {
    pub fn as_str(self) -> &'static str {
        match self {
            CalculationType::CompoundInterest => "compound_interest",
            CalculationType::LoanPayment => "loan_payment",
            CalculationType::PresentValue => "present_value",
        }
    }

    // name of the money amount the formula starts from
    fn amount_name(self) -> &'static str {
        match self {
            CalculationType::PresentValue => "future_value",
            _ => "principal",
        }
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CalculationType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "compound_interest" => Ok(CalculationType::CompoundInterest),
            "loan_payment" => Ok(CalculationType::LoanPayment),
            "present_value" => Ok(CalculationType::PresentValue),
            other => Err(CalcError::invalid_parameters(format!(
                "Unsupported calculation type: {}",
                other
            ))),
        }
    }
}

/// Validated inputs shared by all formulas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Terms {
    pub amount: f64,
    pub annual_rate: f64,
    pub periods_per_year: f64,
    pub years: f64,
}

fn check_positive(name: &str, v: f64) -> CalcResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(CalcError::invalid_parameters(format!("'{}' must be a positive number, got {}", name, v)));
    }
    Ok(())
}

fn checked_result(v: f64, kind: CalculationType) -> CalcResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CalcError::overflow(format!("{} result is too large", kind)))
    }
}

impl Terms {
    pub fn new(amount: f64, annual_rate: f64, periods_per_year: f64, years: f64) -> Self {
        Terms {
            amount,
            annual_rate,
            periods_per_year,
            years,
        }
    }

    pub fn validate(&self, kind: CalculationType) -> CalcResult<()> {
        check_positive(kind.amount_name(), self.amount)?;
        if !self.annual_rate.is_finite() || self.annual_rate < 0.0 {
            return Err(CalcError::invalid_parameters(format!(
                "'annual_rate' must be a non-negative number, got {}",
                self.annual_rate
            )));
        }
        check_positive("periods_per_year", self.periods_per_year)?;
        check_positive("years", self.years)
    }

    /// Interest rate of one period
    pub fn rate(&self) -> f64 {
        self.annual_rate / self.periods_per_year
    }

    /// Total number of periods
    pub fn periods(&self) -> f64 {
        self.periods_per_year * self.years
    }

    /// Reads terms from named parameters. Besides the canonical names the
    /// short ones are accepted: `rate`, `time`, `n`, and `periods` for a
    /// total period count.
    pub fn from_parameters(kind: CalculationType, params: &FinancialParameters) -> CalcResult<Self> {
        let lookup = |names: &[&str]| names.iter().find_map(|n| params.get(*n).copied());
        let required = |names: &[&str]| match lookup(names) {
            Some(v) => Ok(v),
            None => Err(CalcError::invalid_parameters(format!(
                "Missing parameter '{}' for {}",
                names[0], kind
            ))),
        };

        let amount = required(&[kind.amount_name()])?;
        let annual_rate = required(&["annual_rate", "rate"])?;
        let periods_per_year = lookup(&["periods_per_year", "n"]).unwrap_or(1.0);
        let years = match (lookup(&["years", "time"]), params.get("periods")) {
            (Some(y), _) => y,
            (None, Some(total)) => *total / periods_per_year,
            (None, None) => required(&["years", "time"])?,
        };

        let terms = Terms::new(amount, annual_rate, periods_per_year, years);
        terms.validate(kind)?;
        Ok(terms)
    }
}

/// `principal * (1 + r)^n`
pub fn compound_interest(principal: f64, annual_rate: f64, periods_per_year: f64, years: f64) -> CalcResult<f64> {
    let kind = CalculationType::CompoundInterest;
    let t = Terms::new(principal, annual_rate, periods_per_year, years);
    t.validate(kind)?;
    checked_result(t.amount * (1.0 + t.rate()).powf(t.periods()), kind)
}

/// Periodic payment of an amortized loan: `principal * r / (1 - (1 + r)^-n)`
pub fn loan_payment(principal: f64, annual_rate: f64, periods_per_year: f64, years: f64) -> CalcResult<f64> {
    let kind = CalculationType::LoanPayment;
    let t = Terms::new(principal, annual_rate, periods_per_year, years);
    t.validate(kind)?;
    let r = t.rate();
    let n = t.periods();
    if r == 0.0 {
        return checked_result(t.amount / n, kind);
    }
    checked_result(t.amount * r / (1.0 - (1.0 + r).powf(-n)), kind)
}

/// `future_value / (1 + r)^n`
pub fn present_value(future_value: f64, annual_rate: f64, periods_per_year: f64, years: f64) -> CalcResult<f64> {
    let kind = CalculationType::PresentValue;
    let t = Terms::new(future_value, annual_rate, periods_per_year, years);
    t.validate(kind)?;
    checked_result(t.amount / (1.0 + t.rate()).powf(t.periods()), kind)
}

/// Runs the formula of `kind` on named parameters
pub fn calculate(kind: CalculationType, params: &FinancialParameters) -> CalcResult<f64> {
    let t = Terms::from_parameters(kind, params)?;
    match kind {
        CalculationType::CompoundInterest => {
            compound_interest(t.amount, t.annual_rate, t.periods_per_year, t.years)
        }
        CalculationType::LoanPayment => loan_payment(t.amount, t.annual_rate, t.periods_per_year, t.years),
        CalculationType::PresentValue => present_value(t.amount, t.annual_rate, t.periods_per_year, t.years),
    }
}

/// Money amount with a fixed number of decimals and no currency symbol
pub fn format_money(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v);
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        return s[1..].to_string();
    }
    s
}
