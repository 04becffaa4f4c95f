use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;
use crate::utils::parse_bigint;

/// Aggregate statistic tracked per chain and in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Volume,
    Fees,
    UniqueUsers,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] =
        [MetricKind::Volume, MetricKind::Fees, MetricKind::UniqueUsers];

    /// JSON field carrying the value in a stats endpoint response.
    pub fn field(&self) -> &'static str {
        match self {
            MetricKind::Volume => "totalVolume",
            MetricKind::Fees => "totalFees",
            MetricKind::UniqueUsers => "totalUniqueUsers",
        }
    }

    /// Path segment appended to a chain's stats base URL.
    pub fn path(&self) -> &'static str {
        match self {
            MetricKind::Volume => "volume",
            MetricKind::Fees => "fees",
            MetricKind::UniqueUsers => "users",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Volume => "volume",
            MetricKind::Fees => "fees",
            MetricKind::UniqueUsers => "unique_users",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{ "totalVolume": "..." }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeResult {
    pub total_volume: BigInt,
}

/// `{ "totalFees": "..." }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeesResult {
    pub total_fees: BigInt,
}

/// `{ "totalUniqueUsers": 123 }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCountResult {
    pub total_unique_users: BigInt,
}

/// A validated stats payload, one variant per metric kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricPayload {
    Volume(VolumeResult),
    Fees(FeesResult),
    UserCount(UserCountResult),
}

impl MetricPayload {
    /// Validate a decoded JSON body for `kind`.
    ///
    /// The value field may be a decimal string or a JSON integer. A body with
    /// no data at all (`null` or `[]`) counts as zero.
    pub fn parse(kind: MetricKind, value: &Value) -> Result<Self, ParseError> {
        let amount = match value {
            Value::Null => BigInt::zero(),
            Value::Array(items) if items.is_empty() => BigInt::zero(),
            Value::Object(map) => {
                let field = kind.field();
                let raw = map.get(field).ok_or(ParseError::MissingField(field))?;
                integer_field(field, raw)?
            },
            other => return Err(ParseError::NotAnObject(json_type(other))),
        };

        Ok(Self::from_amount(kind, amount))
    }

    pub fn from_amount(kind: MetricKind, amount: BigInt) -> Self {
        match kind {
            MetricKind::Volume => MetricPayload::Volume(VolumeResult {
                total_volume: amount,
            }),
            MetricKind::Fees => MetricPayload::Fees(FeesResult { total_fees: amount }),
            MetricKind::UniqueUsers => MetricPayload::UserCount(UserCountResult {
                total_unique_users: amount,
            }),
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            MetricPayload::Volume(_) => MetricKind::Volume,
            MetricPayload::Fees(_) => MetricKind::Fees,
            MetricPayload::UserCount(_) => MetricKind::UniqueUsers,
        }
    }

    pub fn amount(&self) -> &BigInt {
        match self {
            MetricPayload::Volume(v) => &v.total_volume,
            MetricPayload::Fees(f) => &f.total_fees,
            MetricPayload::UserCount(u) => &u.total_unique_users,
        }
    }

    pub fn into_amount(self) -> BigInt {
        match self {
            MetricPayload::Volume(v) => v.total_volume,
            MetricPayload::Fees(f) => f.total_fees,
            MetricPayload::UserCount(u) => u.total_unique_users,
        }
    }
}

fn integer_field(field: &'static str, raw: &Value) -> Result<BigInt, ParseError> {
    let not_an_integer = || ParseError::NotAnInteger {
        field,
        value: raw.to_string(),
    };

    match raw {
        Value::String(s) => parse_bigint(s).ok_or_else(not_an_integer),
        // Integers beyond i64/u64 range arrive as f64 and are rejected
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(BigInt::from(u))
            } else if let Some(i) = n.as_i64() {
                Ok(BigInt::from(i))
            } else {
                Err(not_an_integer())
            }
        },
        _ => Err(not_an_integer()),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
