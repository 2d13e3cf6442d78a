//! Core data model types for gradelens.
//!
//! A test has exactly [`ITEM_COUNT`] binary-scored items. Item numbers,
//! outcomes, and score thresholds are small validated newtypes so that an
//! out-of-range value can never reach the arithmetic in the query engines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AnalyticsError, Result};

/// Number of scored items on the test.
pub const ITEM_COUNT: usize = 10;

/// Highest achievable total score.
pub const MAX_TOTAL: u8 = ITEM_COUNT as u8;

/// A 1-based item number in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemIndex(u8);

impl ItemIndex {
    /// Build an item index, rejecting anything outside `1..=10`.
    pub fn new(number: u8) -> Result<Self> {
        if (1..=MAX_TOTAL).contains(&number) {
            Ok(Self(number))
        } else {
            Err(AnalyticsError::invalid(
                "item",
                format!("item number must be between 1 and {ITEM_COUNT}, got {number}"),
            ))
        }
    }

    /// Parse `"3"`, `"q3"` or `"Q3"`, reporting failures against `name`.
    pub fn parse_named(name: &str, raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('q')
            .or_else(|| trimmed.strip_prefix('Q'))
            .unwrap_or(trimmed);
        let number: u8 = digits.parse().map_err(|_| {
            AnalyticsError::invalid(name, format!("'{raw}' is not an item (expected 1-10 or q1-q10)"))
        })?;
        Self::new(number).map_err(|_| {
            AnalyticsError::invalid(
                name,
                format!("item number must be between 1 and {ITEM_COUNT}, got {number}"),
            )
        })
    }

    /// The 1-based item number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position in a response vector.
    pub fn offset(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Upper-case display label, e.g. `Q3`.
    pub fn label(self) -> String {
        format!("Q{}", self.0)
    }

    /// All items in ascending order.
    pub fn all() -> impl Iterator<Item = ItemIndex> {
        (1..=MAX_TOTAL).map(ItemIndex)
    }
}

impl fmt::Display for ItemIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl FromStr for ItemIndex {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_named("item", s)
    }
}

// Serialized as "q3" so it can key JSON objects.
impl Serialize for ItemIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A binary item outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Outcome {
    Incorrect,
    Correct,
}

impl Outcome {
    pub fn as_u8(self) -> u8 {
        match self {
            Outcome::Incorrect => 0,
            Outcome::Correct => 1,
        }
    }

    pub fn is_correct(self) -> bool {
        self == Outcome::Correct
    }

    /// Parse `"0"` or `"1"`, reporting failures against `name`.
    pub fn parse_named(name: &str, raw: &str) -> Result<Self> {
        match raw.trim() {
            "0" => Ok(Outcome::Incorrect),
            "1" => Ok(Outcome::Correct),
            other => Err(AnalyticsError::invalid(
                name,
                format!("'{other}' is not a binary outcome (expected 0 or 1)"),
            )),
        }
    }
}

impl From<Outcome> for u8 {
    fn from(outcome: Outcome) -> u8 {
        outcome.as_u8()
    }
}

impl TryFrom<u8> for Outcome {
    type Error = AnalyticsError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Outcome::Incorrect),
            1 => Ok(Outcome::Correct),
            other => Err(AnalyticsError::invalid(
                "value",
                format!("outcome must be 0 or 1, got {other}"),
            )),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A total-score threshold in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct Threshold(u8);

impl Threshold {
    pub fn new(value: u8) -> Result<Self> {
        if value <= MAX_TOTAL {
            Ok(Self(value))
        } else {
            Err(AnalyticsError::invalid(
                "threshold",
                format!("threshold must be between 0 and {MAX_TOTAL}, got {value}"),
            ))
        }
    }

    /// Parse a decimal threshold, reporting failures against `name`.
    pub fn parse_named(name: &str, raw: &str) -> Result<Self> {
        let value: i64 = raw.trim().parse().map_err(|_| {
            AnalyticsError::invalid(name, format!("'{raw}' is not an integer"))
        })?;
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_TOTAL)
            .map(Self)
            .ok_or_else(|| {
                AnalyticsError::invalid(
                    name,
                    format!("threshold must be between 0 and {MAX_TOTAL}, got {value}"),
                )
            })
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether `total` reaches this threshold.
    pub fn is_met_by(self, total: u8) -> bool {
        total >= self.0
    }
}

impl From<Threshold> for u8 {
    fn from(threshold: Threshold) -> u8 {
        threshold.0
    }
}

impl TryFrom<u8> for Threshold {
    type Error = AnalyticsError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

/// One student's scored responses.
///
/// Serializes to the flat `{student_id, q1..q10, total}` shape used by the
/// grades listing; deserialization re-checks `total == sum(responses)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "GradeRow", try_from = "GradeRow")]
pub struct StudentRecord {
    /// Unique key of the record within a dataset.
    pub student_id: u32,
    /// Item outcomes, index 0 is item 1.
    pub responses: [Outcome; ITEM_COUNT],
    /// Number of correct responses.
    pub total: u8,
}

impl StudentRecord {
    /// Build a record whose total is derived from the responses.
    pub fn new(student_id: u32, responses: [Outcome; ITEM_COUNT]) -> Self {
        let total = responses.iter().filter(|r| r.is_correct()).count() as u8;
        Self {
            student_id,
            responses,
            total,
        }
    }

    /// Build a record from raw integers as they appear in a source file,
    /// checking that each response is binary and the stated total matches.
    pub fn from_raw(student_id: u32, responses: &[i64], total: i64) -> Result<Self> {
        if responses.len() != ITEM_COUNT {
            return Err(AnalyticsError::InvariantViolation {
                student_id,
                reason: format!(
                    "expected {ITEM_COUNT} responses, found {}",
                    responses.len()
                ),
            });
        }
        let mut outcomes = [Outcome::Incorrect; ITEM_COUNT];
        for (i, raw) in responses.iter().enumerate() {
            outcomes[i] = match raw {
                0 => Outcome::Incorrect,
                1 => Outcome::Correct,
                other => {
                    return Err(AnalyticsError::InvariantViolation {
                        student_id,
                        reason: format!("response to Q{} is {other}, expected 0 or 1", i + 1),
                    })
                }
            };
        }
        let record = Self::new(student_id, outcomes);
        if i64::from(record.total) != total {
            return Err(AnalyticsError::InvariantViolation {
                student_id,
                reason: format!(
                    "stated total {total} does not match sum of responses {}",
                    record.total
                ),
            });
        }
        Ok(record)
    }

    /// Check `total == sum(responses)`.
    pub fn validate(&self) -> Result<()> {
        let sum = self.responses.iter().filter(|r| r.is_correct()).count() as u8;
        if sum != self.total {
            return Err(AnalyticsError::InvariantViolation {
                student_id: self.student_id,
                reason: format!(
                    "stated total {} does not match sum of responses {sum}",
                    self.total
                ),
            });
        }
        Ok(())
    }

    pub fn response(&self, item: ItemIndex) -> Outcome {
        self.responses[item.offset()]
    }

    pub fn is_correct(&self, item: ItemIndex) -> bool {
        self.response(item).is_correct()
    }
}

/// Flat wire representation of a [`StudentRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GradeRow {
    student_id: u32,
    q1: u8,
    q2: u8,
    q3: u8,
    q4: u8,
    q5: u8,
    q6: u8,
    q7: u8,
    q8: u8,
    q9: u8,
    q10: u8,
    total: u8,
}

impl From<StudentRecord> for GradeRow {
    fn from(r: StudentRecord) -> Self {
        let q = r.responses.map(Outcome::as_u8);
        GradeRow {
            student_id: r.student_id,
            q1: q[0],
            q2: q[1],
            q3: q[2],
            q4: q[3],
            q5: q[4],
            q6: q[5],
            q7: q[6],
            q8: q[7],
            q9: q[8],
            q10: q[9],
            total: r.total,
        }
    }
}

impl TryFrom<GradeRow> for StudentRecord {
    type Error = AnalyticsError;

    fn try_from(row: GradeRow) -> Result<Self> {
        let raw = [
            row.q1, row.q2, row.q3, row.q4, row.q5, row.q6, row.q7, row.q8, row.q9, row.q10,
        ]
        .map(i64::from);
        StudentRecord::from_raw(row.student_id, &raw, i64::from(row.total))
    }
}

/// Build a record from a `[0/1; 10]` literal. Intended for tests and fixtures.
pub fn record_from_bits(student_id: u32, bits: [u8; ITEM_COUNT]) -> Result<StudentRecord> {
    let raw = bits.map(i64::from);
    let total = raw.iter().sum();
    StudentRecord::from_raw(student_id, &raw, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_index_parse_and_display() {
        assert_eq!("3".parse::<ItemIndex>().unwrap().number(), 3);
        assert_eq!("q10".parse::<ItemIndex>().unwrap().number(), 10);
        assert_eq!(" Q1 ".parse::<ItemIndex>().unwrap().number(), 1);
        assert_eq!(ItemIndex::new(7).unwrap().to_string(), "q7");
        assert_eq!(ItemIndex::new(7).unwrap().label(), "Q7");
        assert!("0".parse::<ItemIndex>().is_err());
        assert!("q11".parse::<ItemIndex>().is_err());
        assert!("x3".parse::<ItemIndex>().is_err());
        assert!("".parse::<ItemIndex>().is_err());
    }

    #[test]
    fn item_index_all_is_ordered() {
        let all: Vec<u8> = ItemIndex::all().map(ItemIndex::number).collect();
        assert_eq!(all, (1..=10).collect::<Vec<_>>());
        assert_eq!(ItemIndex::new(1).unwrap().offset(), 0);
    }

    #[test]
    fn parse_errors_name_the_parameter() {
        let err = ItemIndex::parse_named("given", "12").unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter { ref name, .. } if name == "given"));
        let err = Outcome::parse_named("value", "2").unwrap_err();
        assert!(err.is_client_error());
        assert!(Threshold::parse_named("threshold", "-1").is_err());
        assert!(Threshold::parse_named("threshold", "11").is_err());
        assert!(Threshold::parse_named("threshold", "abc").is_err());
        assert_eq!(Threshold::parse_named("threshold", "0").unwrap().value(), 0);
        assert_eq!(Threshold::parse_named("threshold", "10").unwrap().value(), 10);
    }

    #[test]
    fn from_raw_rejects_bad_total() {
        let err = StudentRecord::from_raw(4, &[1, 1, 0, 0, 0, 0, 0, 0, 0, 0], 3).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvariantViolation { student_id: 4, .. }));
    }

    #[test]
    fn from_raw_rejects_non_binary() {
        let err = StudentRecord::from_raw(1, &[2, 0, 0, 0, 0, 0, 0, 0, 0, 0], 2).unwrap_err();
        assert!(err.to_string().contains("Q1"));
    }

    #[test]
    fn record_json_uses_flat_item_fields() {
        let record = record_from_bits(1, [1, 1, 1, 1, 1, 1, 1, 0, 0, 0]).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["student_id"], 1);
        assert_eq!(json["q1"], 1);
        assert_eq!(json["q8"], 0);
        assert_eq!(json["total"], 7);

        let back: StudentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_json_with_wrong_total_is_rejected() {
        let json = r#"{"student_id":1,"q1":1,"q2":0,"q3":0,"q4":0,"q5":0,
            "q6":0,"q7":0,"q8":0,"q9":0,"q10":0,"total":5}"#;
        assert!(serde_json::from_str::<StudentRecord>(json).is_err());
    }

    #[test]
    fn validate_catches_hand_built_records() {
        let mut record = record_from_bits(9, [1; ITEM_COUNT]).unwrap();
        assert!(record.validate().is_ok());
        record.total = 3;
        assert!(record.validate().is_err());
    }
}
