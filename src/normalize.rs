//! Flattens a parsed [`Statement`] into one [`NormalizedRecord`] per transaction.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::types::{Account, Statement, Transaction};

/// Output columns, in the order both writers emit them.
pub const COLUMNS: [&str; 9] = [
    "account_id",
    "account_type",
    "bank_id",
    "dtposted",
    "fitid",
    "memo",
    "name",
    "trnamt",
    "trntype",
];

/// Flat transaction row. Absent optional values are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub account_id: String,
    pub account_type: String,
    pub bank_id: String,
    pub dtposted: String,
    pub fitid: String,
    pub memo: String,
    pub name: String,
    #[serde(serialize_with = "serialize_amount")]
    pub trnamt: Decimal,
    pub trntype: String,
}

impl NormalizedRecord {
    fn new(account: &Account, transaction: &Transaction) -> Self {
        NormalizedRecord {
            account_id: account.account_id.clone(),
            account_type: account.account_type.clone().unwrap_or_default(),
            bank_id: account.bank_id.clone().unwrap_or_default(),
            dtposted: format_timestamp(&transaction.posted),
            fitid: transaction.fitid.clone().unwrap_or_default(),
            memo: transaction.memo.as_deref().map(transliterate).unwrap_or_default(),
            name: transaction.name.as_deref().map(transliterate).unwrap_or_default(),
            trnamt: transaction.amount,
            trntype: transaction.transaction_type.clone(),
        }
    }

    /// Field values in [`COLUMNS`] order.
    pub fn fields(&self) -> [String; 9] {
        [
            self.account_id.clone(),
            self.account_type.clone(),
            self.bank_id.clone(),
            self.dtposted.clone(),
            self.fitid.clone(),
            self.memo.clone(),
            self.name.clone(),
            self.trnamt.to_string(),
            self.trntype.clone(),
        ]
    }
}

// Emits the amount as a JSON number with its literal digits (`-50.00`, not `-50.0`).
fn serialize_amount<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let number: serde_json::Number = amount
        .to_string()
        .parse()
        .map_err(serde::ser::Error::custom)?;
    number.serialize(serializer)
}

/// One record per transaction, accounts and transactions in source order.
pub fn normalize(statement: &Statement) -> Vec<NormalizedRecord> {
    statement
        .accounts
        .iter()
        .flat_map(|entry| {
            entry
                .transactions
                .iter()
                .map(|txn| NormalizedRecord::new(&entry.account, txn))
        })
        .collect()
}

/// Maps text to ASCII: compatibility decomposition, combining marks removed,
/// anything still outside ASCII dropped.
pub fn transliterate(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii)
        .collect::<String>()
        .trim()
        .to_string()
}

/// ISO-8601 with an explicit `±HH:MM` offset; fractional seconds only when present.
pub fn format_timestamp(posted: &DateTime<FixedOffset>) -> String {
    posted.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}
