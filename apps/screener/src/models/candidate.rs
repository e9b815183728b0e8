use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candidate identifier as issued by the analysis service.
/// The service uses integer row ids; string ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateId::Number(n) => write!(f, "{n}"),
            CandidateId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for CandidateId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(n) => CandidateId::Number(n),
            Err(_) => CandidateId::Text(s.to_string()),
        })
    }
}

impl CandidateId {
    /// Reads an id out of an arbitrary JSON value, treating null, blank
    /// strings and non-id shapes as absent.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match serde_json::from_value::<CandidateId>(value.clone()).ok()? {
            CandidateId::Text(s) if s.trim().is_empty() => None,
            id => Some(id),
        }
    }
}

/// Coarse AI verdict bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Highly Qualified")]
    HighlyQualified,
    #[serde(rename = "Qualified")]
    Qualified,
    #[serde(rename = "Not a Fit")]
    NotAFit,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::HighlyQualified,
        Category::Qualified,
        Category::NotAFit,
    ];

    /// Exact, case-sensitive match against the service's labels.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::HighlyQualified => "Highly Qualified",
            Category::Qualified => "Qualified",
            Category::NotAFit => "Not a Fit",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
}

/// AI evaluation attached to a candidate. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    /// Kept as the raw label so unknown verdicts survive deserialization.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::score")]
    pub overall_score: Option<f64>,
    #[serde(deserialize_with = "lenient::object")]
    pub contact_info: Option<ContactInfo>,
}

impl Analysis {
    pub fn category(&self) -> Option<Category> {
        self.category.as_deref().and_then(Category::parse)
    }
}

/// One previously analyzed (or still pending) resume.
///
/// Decoding never fails on a single bad field: a mistyped or null value
/// reads as absent, so one malformed row cannot sink the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: Option<CandidateId>,
    #[serde(deserialize_with = "lenient::string")]
    pub filename: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub upload_date: Option<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub analysis: Option<Analysis>,
}

impl CandidateRecord {
    /// Reads one entry of a candidate list. Entries that are not objects
    /// become an empty record so they still count toward the total.
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn category(&self) -> Option<Category> {
        self.analysis.as_ref().and_then(Analysis::category)
    }

    /// Overall score, 0 when the analysis or the score is missing.
    pub fn overall_score(&self) -> f64 {
        self.analysis
            .as_ref()
            .and_then(|a| a.overall_score)
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
    }

    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.upload_date.as_deref().and_then(parse_timestamp)
    }

    /// Contact name when the analysis found one, otherwise the filename.
    pub fn display_name(&self) -> &str {
        self.analysis
            .as_ref()
            .and_then(|a| a.contact_info.as_ref())
            .and_then(|c| c.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.filename)
    }

    /// Raw category label, or "Pending" while the analysis is outstanding.
    pub fn category_label(&self) -> &str {
        self.analysis
            .as_ref()
            .and_then(|a| a.category.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or("Pending")
    }
}

/// Parses the service's upload timestamps.
///
/// Accepts RFC 3339 with an offset, or a naive ISO-8601 date-time (or bare
/// date) which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// Field decoders that map a null or mistyped value to "absent".
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::CandidateId;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            _ => String::new(),
        })
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    /// Numbers and numeric strings ("85") are scores; anything else is not.
    pub fn score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let score = match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(score.filter(|s| s.is_finite()))
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<CandidateId>, D::Error> {
        Ok(CandidateId::from_json(&Value::deserialize(d)?))
    }

    pub fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }
}
