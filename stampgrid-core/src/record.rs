use std::cmp::Ordering;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::RecordError;

/// One catalogued stamp. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampRecord {
    pub id: String,
    pub year: i32,
    pub main_topic: String,
    pub sub_topic: Option<String>,
    pub denomination: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    /// Path of the stamp image, relative to the catalog document.
    pub image_path: String,
    search_text: String,
}

impl StampRecord {
    pub fn new(id: impl Into<String>, year: i32, main_topic: impl Into<String>) -> Self {
        let mut record = Self {
            id: id.into(),
            year,
            main_topic: main_topic.into(),
            sub_topic: None,
            denomination: None,
            color: None,
            notes: None,
            image_path: String::new(),
            search_text: String::new(),
        };
        record.refresh_search_text();
        record
    }

    pub fn with_sub_topic(mut self, sub_topic: impl Into<String>) -> Self {
        self.sub_topic = Some(sub_topic.into());
        self.refresh_search_text();
        self
    }

    pub fn with_denomination(mut self, denomination: impl Into<String>) -> Self {
        self.denomination = Some(denomination.into());
        self.refresh_search_text();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self.refresh_search_text();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self.refresh_search_text();
        self
    }

    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = image_path.into();
        self
    }

    /// Lowercase concatenation of every textual field.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// First year of the decade this record belongs to (1851 → 1850).
    pub fn decade(&self) -> i32 {
        self.year - self.year.rem_euclid(10)
    }

    /// Chronological catalog order: year, then identifier compared numerically-aware.
    ///
    /// The remaining fields break any further tie, so the order is total
    /// and never depends on input order.
    pub fn catalog_cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| natural_cmp(&self.id, &other.id))
            .then_with(|| self.main_topic.cmp(&other.main_topic))
            .then_with(|| self.sub_topic.cmp(&other.sub_topic))
            .then_with(|| self.denomination.cmp(&other.denomination))
            .then_with(|| self.color.cmp(&other.color))
            .then_with(|| self.notes.cmp(&other.notes))
            .then_with(|| self.image_path.cmp(&other.image_path))
    }

    fn refresh_search_text(&mut self) {
        let year = self.year.to_string();
        let parts = [
            Some(self.main_topic.as_str()),
            self.sub_topic.as_deref(),
            self.color.as_deref(),
            self.denomination.as_deref(),
            self.notes.as_deref(),
            Some(self.id.as_str()),
            Some(year.as_str()),
        ];
        self.search_text = parts
            .iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
    }
}

/// Compare identifiers so that embedded digit runs order by value:
/// `"A2" < "A10"`, `"9" < "10"`.
///
/// Digit runs equal in value but differing in leading zeros are ordered by
/// length so the comparison stays total and deterministic.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let run_a = take_digits(&mut ai);
                let run_b = take_digits(&mut bi);
                let ta = run_a.trim_start_matches('0');
                let tb = run_b.trim_start_matches('0');
                let ord = ta
                    .len()
                    .cmp(&tb.len())
                    .then_with(|| ta.cmp(tb))
                    .then_with(|| run_a.len().cmp(&run_b.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                let ord = ca
                    .to_ascii_lowercase()
                    .cmp(&cb.to_ascii_lowercase())
                    .then_with(|| ca.cmp(&cb));
                if ord != Ordering::Equal {
                    return ord;
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = it.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        it.next();
    }
    run
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Record as it appears in the catalog document, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawRecord {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    year: Option<i32>,
    #[serde(alias = "main_topic", alias = "topic", deserialize_with = "lenient_string")]
    main_topic: Option<String>,
    #[serde(alias = "sub_topic", deserialize_with = "lenient_string")]
    sub_topic: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    denomination: Option<String>,
    #[serde(alias = "colour", deserialize_with = "lenient_string")]
    color: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    notes: Option<String>,
    #[serde(alias = "imagePath", alias = "image_path", deserialize_with = "lenient_string")]
    image: Option<String>,
}

/// Strings, numbers, and null are all accepted for textual fields.
fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Integers and integral strings (`"1935"`) are accepted; anything else is absent.
fn lenient_year<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i32>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Validate one entry of the catalog list.
pub(crate) fn record_from_value(position: usize, value: Value) -> Result<StampRecord, RecordError> {
    if !value.is_object() {
        return Err(RecordError::NotAnObject { position });
    }
    let raw: RawRecord =
        serde_json::from_value(value).map_err(|_| RecordError::NotAnObject { position })?;
    let id = raw.id.unwrap_or_else(|| format!("#{position}"));
    let Some(year) = raw.year else {
        return Err(RecordError::MissingYear { position, id });
    };
    let mut record = StampRecord {
        id,
        year,
        main_topic: raw.main_topic.unwrap_or_default(),
        sub_topic: raw.sub_topic.filter(|s| !s.is_empty()),
        denomination: raw.denomination.filter(|s| !s.is_empty()),
        color: raw.color.filter(|s| !s.is_empty()),
        notes: raw.notes.filter(|s| !s.is_empty()),
        image_path: raw.image.unwrap_or_default(),
        search_text: String::new(),
    };
    record.refresh_search_text();
    Ok(record)
}
