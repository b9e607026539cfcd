use crate::model::Amount;
use crate::Result;
use anyhow::{ensure, Context};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifies a transaction for its whole lifetime.
///
/// Older data files used millisecond timestamps as IDs, stored as JSON numbers. Those are still
/// accepted and are treated as their decimal string form, so `1718000000000` and
/// `"1718000000000"` refer to the same record.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generates a fresh, collision-resistant ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TransactionId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        ensure!(!trimmed.is_empty(), "A transaction ID cannot be empty");
        Ok(Self(trimmed.to_string()))
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = TransactionId;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer transaction ID")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<TransactionId, E> {
        Ok(TransactionId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<TransactionId, E> {
        Ok(TransactionId(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<TransactionId, E> {
        TransactionId::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }
}

/// Whether money came in as a loan or went out as an expense.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Loan,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Loan => "loan",
            TransactionType::Expense => "expense",
        }
    }
}

/// The date of a transaction as it was stored, along with the calendar date it parses to.
///
/// A date that cannot be parsed is kept as-is rather than rejected. Such a transaction still shows
/// up in listings, but never matches a month or year filter and never lands in a monthly bucket.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TransactionDate {
    raw: String,
    parsed: Option<NaiveDate>,
}

impl TransactionDate {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_date(&raw);
        Self { raw, parsed }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The calendar date, or `None` if the stored string is not a recognizable date.
    pub fn date(&self) -> Option<NaiveDate> {
        self.parsed
    }

    pub fn year(&self) -> Option<i32> {
        self.parsed.map(|d| d.year())
    }

    /// The 1-indexed month.
    pub fn month(&self) -> Option<u32> {
        self.parsed.map(|d| d.month())
    }
}

impl From<NaiveDate> for TransactionDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            raw: date.format("%Y-%m-%d").to_string(),
            parsed: Some(date),
        }
    }
}

impl Display for TransactionDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for TransactionDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for TransactionDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(TransactionDate::new)
    }
}

/// Accepts `YYYY-MM-DD`, which is what date inputs produce, as well as ISO-8601 date-times, in
/// which case only the date part is used.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|d| d.date())
        })
}

/// The user-supplied fields of a transaction: everything except the ID.
///
/// This is the payload for creating a transaction and for replacing one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub amount: Amount,
    pub date: TransactionDate,
    #[serde(default)]
    pub description: String,
}

impl NewTransaction {
    pub fn new(kind: TransactionType, amount: impl Into<Amount>, date: &str) -> Self {
        Self {
            kind,
            category: None,
            amount: amount.into(),
            date: TransactionDate::new(date),
            description: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks the invariants that every stored transaction must satisfy.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.amount.is_negative(),
            "The amount must not be negative, got {}",
            self.amount
        );
        ensure!(
            !self.date.raw().trim().is_empty(),
            "A transaction must have a date"
        );
        Ok(())
    }
}

/// A single loan or expense record.
///
/// A `Transaction` is never edited in place; an update replaces every field except `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    amount: Amount,
    date: TransactionDate,
    #[serde(default)]
    description: String,
}

impl Transaction {
    /// Creates a transaction from its fields after validating them.
    pub fn new(id: TransactionId, fields: NewTransaction) -> Result<Self> {
        fields.validate()?;
        let NewTransaction {
            kind,
            category,
            amount,
            date,
            description,
        } = fields;
        Ok(Self {
            id,
            kind,
            category,
            amount,
            date,
            description,
        })
    }

    /// Parses a raw record from the data file. Records that are missing a required field, or
    /// whose fields are of the wrong shape, are rejected here instead of being allowed to flow
    /// into the arithmetic.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let transaction: Transaction =
            serde_json::from_value(value).context("The record is not a valid transaction")?;
        transaction.fields().validate()?;
        Ok(transaction)
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    /// The category, if one was given and is not blank.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> &TransactionDate {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the user-supplied fields, e.g. to pre-fill an edit.
    pub fn fields(&self) -> NewTransaction {
        NewTransaction {
            kind: self.kind,
            category: self.category.clone(),
            amount: self.amount,
            date: self.date.clone(),
            description: self.description.clone(),
        }
    }
}
