//! Recruitment parts and per-part head counts.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One of the five fixed recruitment categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Planning,
    Design,
    FrontendWeb,
    FrontendMobile,
    Backend,
}

impl Part {
    /// All parts in display order.
    pub const ALL: [Part; 5] = [
        Part::Planning,
        Part::Design,
        Part::FrontendWeb,
        Part::FrontendMobile,
        Part::Backend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Part::Planning => "planning",
            Part::Design => "design",
            Part::FrontendWeb => "frontendWeb",
            Part::FrontendMobile => "frontendMobile",
            Part::Backend => "backend",
        }
    }

    /// Label shown on the board.
    pub fn label(&self) -> &'static str {
        match self {
            Part::Planning => "기획",
            Part::Design => "디자인",
            Part::FrontendWeb => "프론트엔드(웹)",
            Part::FrontendMobile => "프론트엔드(모바일)",
            Part::Backend => "백엔드",
        }
    }
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Head counts keyed by part. Used both for capacities and for filled seats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamCounts {
    #[serde(deserialize_with = "lenient_count")]
    pub planning: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub design: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub frontend_web: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub frontend_mobile: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub backend: u32,
}

impl TeamCounts {
    pub fn get(&self, part: Part) -> u32 {
        match part {
            Part::Planning => self.planning,
            Part::Design => self.design,
            Part::FrontendWeb => self.frontend_web,
            Part::FrontendMobile => self.frontend_mobile,
            Part::Backend => self.backend,
        }
    }

    pub fn set(&mut self, part: Part, value: u32) {
        let slot = match part {
            Part::Planning => &mut self.planning,
            Part::Design => &mut self.design,
            Part::FrontendWeb => &mut self.frontend_web,
            Part::FrontendMobile => &mut self.frontend_mobile,
            Part::Backend => &mut self.backend,
        };
        *slot = value;
    }

    /// Total head count across every part.
    pub fn total(&self) -> u32 {
        Part::ALL
            .iter()
            .fold(0u32, |sum, part| sum.saturating_add(self.get(*part)))
    }

    /// Clamp each count to the matching limit. Parts with a zero limit are forced to zero.
    pub fn clamped_to(&self, limits: &TeamCounts) -> TeamCounts {
        let mut clamped = TeamCounts::default();
        for part in Part::ALL {
            let limit = limits.get(part);
            if limit > 0 {
                clamped.set(part, self.get(part).min(limit));
            }
        }
        clamped
    }
}

/// Interpret a loosely-typed JSON value as a head count.
///
/// Numbers and numeric strings are accepted; fractions are truncated. Anything
/// negative, non-finite or non-numeric becomes 0.
pub fn count_from_value(value: &Value) -> u32 {
    let number = match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).unwrap_or(u32::MAX);
            }
            n.as_f64()
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };

    match number {
        Some(v) if v.is_finite() && v > 0.0 => {
            if v >= u32::MAX as f64 {
                u32::MAX
            } else {
                v.trunc() as u32
            }
        }
        _ => 0,
    }
}

/// Serde helper: a head count that never fails to parse.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

/// Serde helper: an optional head count. `null` stays absent.
pub fn lenient_count_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(count_from_value(&other)),
    })
}
