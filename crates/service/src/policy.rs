use serde_json::Value;

use crate::errors::ServiceError;
use crate::storage::fmt_float;

/// Rating rules for meals. The two services disagree on purpose and the
/// difference is part of the observable contract, so the rule set is
/// injected into the shared meal validation instead of being unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatePolicy {
    /// 公开端：[0.5, 5]，以 0.5 为步长，入库前量化到半星。
    HalfStep,
    /// 管理端：[1, 5] 的整数。
    Integer,
}

impl RatePolicy {
    /// Validate a rating from a request payload and return the value that
    /// will be stored. Each policy keeps its own error wording.
    pub fn validate(self, raw: &Value) -> Result<f64, ServiceError> {
        match self {
            RatePolicy::HalfStep => {
                let r = coerce_f64(raw)
                    .ok_or_else(|| ServiceError::Validation("评价必须是数字".into()))?;
                if !(0.5..=5.0).contains(&r) || (r * 2.0 - (r * 2.0).round()).abs() > 1e-6 {
                    return Err(ServiceError::Validation(
                        "评价必须在0.5-5之间，且以0.5为步长".into(),
                    ));
                }
                Ok((r * 2.0).round() / 2.0)
            }
            RatePolicy::Integer => {
                let r = raw
                    .as_f64()
                    .filter(|r| (1.0..=5.0).contains(r))
                    .ok_or_else(|| ServiceError::Validation("评价必须在1-5之间".into()))?;
                // in-range fractional input is accepted and truncated on store
                Ok(r.trunc())
            }
        }
    }

    /// Parse a stored rating field. Malformed or empty values fall back to
    /// the policy default instead of failing the whole read.
    pub fn parse_stored(self, raw: &str) -> f64 {
        let raw = raw.trim();
        match self {
            RatePolicy::HalfStep => {
                let r = if raw.is_empty() {
                    1.0
                } else {
                    raw.parse::<f64>().unwrap_or(1.0)
                };
                // out-of-range stored values are clamped, not defaulted
                f64::max(0.5, f64::min((r * 2.0).round() / 2.0, 5.0))
            }
            RatePolicy::Integer => {
                if raw.is_empty() {
                    1.0
                } else {
                    raw.parse::<i64>().map(|r| r as f64).unwrap_or(1.0)
                }
            }
        }
    }

    /// Format a rating for storage.
    pub fn format_stored(self, rate: f64) -> String {
        match self {
            RatePolicy::HalfStep => fmt_float((rate * 2.0).round() / 2.0),
            RatePolicy::Integer => (rate as i64).to_string(),
        }
    }
}

fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
