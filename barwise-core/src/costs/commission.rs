//! Commission models: pure functions from (units, price) to a non-negative cost.
//!
//! Commission is charged symmetrically on buys and sells. The unit count is
//! taken in absolute value, so callers may pass signed units.

use serde::{Deserialize, Serialize};

/// Pluggable transaction-cost model.
pub trait CommissionModel: Send + Sync + std::fmt::Debug {
    /// Human-readable name for logging and manifests.
    fn name(&self) -> &str;

    /// Raw cost for a fill. May be called with `units == 0`.
    fn raw_commission(&self, units: u64, price: f64) -> f64;

    /// Cost of trading `units` at `price`. Never negative; zero-unit fills are free.
    fn commission(&self, units: i64, price: f64) -> f64 {
        let units = units.unsigned_abs();
        if units == 0 {
            return 0.0;
        }
        let c = self.raw_commission(units, price);
        if c.is_nan() {
            0.0
        } else {
            c.max(0.0)
        }
    }
}

/// No transaction costs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommission;

impl CommissionModel for NoCommission {
    fn name(&self) -> &str {
        "none"
    }

    fn raw_commission(&self, _units: u64, _price: f64) -> f64 {
        0.0
    }
}

/// Fixed fee per trade plus a proportional fraction of traded value.
///
/// `commission = fixed + units * price * rate`
#[derive(Debug, Clone, Copy)]
pub struct FixedPlusProportional {
    pub fixed: f64,
    pub rate: f64,
}

impl FixedPlusProportional {
    pub fn new(fixed: f64, rate: f64) -> Self {
        Self { fixed, rate }
    }
}

impl CommissionModel for FixedPlusProportional {
    fn name(&self) -> &str {
        "fixed"
    }

    fn raw_commission(&self, units: u64, price: f64) -> f64 {
        self.fixed + units as f64 * price * self.rate
    }
}

/// Per-unit rate with a minimum ticket and a cap at a fraction of trade value.
///
/// Two-stage clamp, in this order:
/// 1. `floored = max(units * per_unit, min_commission)`
/// 2. `commission = min(floored, units * price * max_commission_pct)`
///
/// The cap is applied last, so on small trades where the minimum ticket
/// exceeds the percentage cap, the cap wins.
#[derive(Debug, Clone, Copy)]
pub struct TieredCommission {
    pub per_unit: f64,
    pub min_commission: f64,
    pub max_commission_pct: f64,
}

impl TieredCommission {
    pub fn new(per_unit: f64, min_commission: f64, max_commission_pct: f64) -> Self {
        Self {
            per_unit,
            min_commission,
            max_commission_pct,
        }
    }
}

impl CommissionModel for TieredCommission {
    fn name(&self) -> &str {
        "tiered"
    }

    fn raw_commission(&self, units: u64, price: f64) -> f64 {
        let basic = units as f64 * self.per_unit;
        let floored = basic.max(self.min_commission);
        let trade_value = units as f64 * price;
        floored.min(trade_value * self.max_commission_pct)
    }
}

/// Serializable commission model selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommissionConfig {
    #[default]
    None,
    Fixed {
        #[serde(default)]
        fixed: f64,
        #[serde(default)]
        rate: f64,
    },
    Tiered {
        per_unit: f64,
        min_commission: f64,
        max_commission_pct: f64,
    },
}

impl CommissionConfig {
    pub fn build(&self) -> Box<dyn CommissionModel> {
        match *self {
            CommissionConfig::None => Box::new(NoCommission),
            CommissionConfig::Fixed { fixed, rate } => {
                Box::new(FixedPlusProportional::new(fixed, rate))
            }
            CommissionConfig::Tiered {
                per_unit,
                min_commission,
                max_commission_pct,
            } => Box::new(TieredCommission::new(
                per_unit,
                min_commission,
                max_commission_pct,
            )),
        }
    }

    /// Names of parameters that are negative, if any.
    pub fn negative_params(&self) -> Vec<&'static str> {
        let mut bad = Vec::new();
        match *self {
            CommissionConfig::None => {}
            CommissionConfig::Fixed { fixed, rate } => {
                if fixed < 0.0 {
                    bad.push("fixed");
                }
                if rate < 0.0 {
                    bad.push("rate");
                }
            }
            CommissionConfig::Tiered {
                per_unit,
                min_commission,
                max_commission_pct,
            } => {
                if per_unit < 0.0 {
                    bad.push("per_unit");
                }
                if min_commission < 0.0 {
                    bad.push("min_commission");
                }
                if max_commission_pct < 0.0 {
                    bad.push("max_commission_pct");
                }
            }
        }
        bad
    }
}
