//! Derived performance ratios
//!
//! Every ratio is rounded to four decimals and is exactly `0.0` when its
//! denominator is zero.

use serde::{Deserialize, Serialize};

/// `numerator / denominator`, or 0.0 for a zero denominator
pub fn calc_rate(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    round4(numerator / denominator)
}

/// Click-through rate
pub fn calc_ctr(clicks: i64, impressions: i64) -> f64 {
    calc_rate(clicks as f64, impressions as f64)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// ctr / cpc / cpa / roas computed from summed metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
}

impl DerivedRatios {
    pub fn compute(impressions: i64, clicks: i64, spend: f64, conversions: i64, revenue: f64) -> Self {
        Self {
            ctr: calc_ctr(clicks, impressions),
            cpc: calc_rate(spend, clicks as f64),
            cpa: calc_rate(spend, conversions as f64),
            roas: calc_rate(revenue, spend),
        }
    }
}
