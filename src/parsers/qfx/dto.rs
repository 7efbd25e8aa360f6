use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::QfxDate;

#[derive(Debug, Deserialize)]
pub(super) struct OfxXml {
    #[serde(rename = "BANKMSGSRSV1", default)]
    pub(super) bank_msgs: Option<QfxBankMsgsRsV1>,
    #[serde(rename = "CREDITCARDMSGSRSV1", default)]
    pub(super) cc_msgs: Option<QfxCreditCardMsgsRsV1>,
    #[serde(rename = "INVSTMTMSGSRSV1", default)]
    pub(super) inv_msgs: Option<QfxInvStmtMsgsRsV1>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxBankMsgsRsV1 {
    #[serde(rename = "STMTTRNRS", default)]
    pub(super) stmt_trn_rs: Vec<QfxStmtTrnRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxCreditCardMsgsRsV1 {
    #[serde(rename = "CCSTMTTRNRS", default)]
    pub(super) cc_stmt_trn_rs: Vec<QfxCcStmtTrnRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxInvStmtMsgsRsV1 {
    #[serde(rename = "INVSTMTTRNRS", default)]
    pub(super) inv_stmt_trn_rs: Vec<QfxInvStmtTrnRs>,
}

// Error responses carry a STATUS but no statement body.
#[derive(Debug, Deserialize)]
pub(super) struct QfxStmtTrnRs {
    #[serde(rename = "STMTRS", default)]
    pub(super) stmt_rs: Option<QfxStmtRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxCcStmtTrnRs {
    #[serde(rename = "CCSTMTRS", default)]
    pub(super) cc_stmt_rs: Option<QfxCcStmtRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxInvStmtTrnRs {
    #[serde(rename = "INVSTMTRS", default)]
    pub(super) inv_stmt_rs: Option<QfxInvStmtRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxStmtRs {
    #[serde(rename = "BANKACCTFROM")]
    pub(super) account: QfxBankAcctFrom,
    #[serde(rename = "BANKTRANLIST", default)]
    pub(super) bank_transaction_list: Option<QfxBankTransactionList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxCcStmtRs {
    #[serde(rename = "CCACCTFROM")]
    pub(super) account: QfxCcAcctFrom,
    #[serde(rename = "BANKTRANLIST", default)]
    pub(super) bank_transaction_list: Option<QfxBankTransactionList>,
}

// Only the cash side of an investment statement is read; trades, income and
// positions are skipped.
#[derive(Debug, Deserialize)]
pub(super) struct QfxInvStmtRs {
    #[serde(rename = "INVACCTFROM")]
    pub(super) account: QfxInvAcctFrom,
    #[serde(rename = "INVTRANLIST", default)]
    pub(super) inv_transaction_list: Option<QfxInvTransactionList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxBankAcctFrom {
    #[serde(rename = "BANKID", default)]
    bank_id: Option<String>,
    #[serde(rename = "ACCTID")]
    acct_id: String,
    #[serde(rename = "ACCTTYPE", default)]
    acct_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxCcAcctFrom {
    #[serde(rename = "ACCTID")]
    acct_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxInvAcctFrom {
    #[serde(rename = "BROKERID", default)]
    broker_id: Option<String>,
    #[serde(rename = "ACCTID")]
    acct_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxBankTransactionList {
    #[serde(rename = "STMTTRN", default)]
    pub(super) transactions: Vec<QfxTransactionRaw>,
}

/// `INVBANKTRAN` entries may sit between trades and income records.
#[derive(Debug, Deserialize)]
pub(super) struct QfxInvTransactionList {
    #[serde(rename = "INVBANKTRAN", default)]
    bank_transactions: Vec<QfxInvBankTran>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxInvBankTran {
    #[serde(rename = "STMTTRN")]
    transaction: QfxTransactionRaw,
}

impl From<QfxInvTransactionList> for QfxBankTransactionList {
    fn from(list: QfxInvTransactionList) -> Self {
        QfxBankTransactionList {
            transactions: list
                .bank_transactions
                .into_iter()
                .map(|entry| entry.transaction)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxTransactionRaw {
    #[serde(rename = "TRNTYPE")]
    trn_type: String,
    #[serde(rename = "DTPOSTED")]
    dt_posted: QfxDate,
    #[serde(rename = "TRNAMT")]
    amount: String,
    #[serde(rename = "FITID", default)]
    fitid: Option<String>,
    #[serde(rename = "NAME", default)]
    name: Option<String>,
    #[serde(rename = "MEMO", default)]
    memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QfxAccount {
    #[serde(rename = "ACCTID")]
    pub acct_id: String,
    #[serde(rename = "ACCTTYPE")]
    pub acct_type: Option<String>,
    #[serde(rename = "BANKID")]
    pub bank_id: Option<String>,
}

impl From<QfxBankAcctFrom> for QfxAccount {
    fn from(raw: QfxBankAcctFrom) -> Self {
        QfxAccount {
            acct_id: raw.acct_id,
            acct_type: raw.acct_type,
            bank_id: raw.bank_id,
        }
    }
}

impl From<QfxCcAcctFrom> for QfxAccount {
    fn from(raw: QfxCcAcctFrom) -> Self {
        QfxAccount {
            acct_id: raw.acct_id,
            acct_type: None,
            bank_id: None,
        }
    }
}

impl From<QfxInvAcctFrom> for QfxAccount {
    fn from(raw: QfxInvAcctFrom) -> Self {
        QfxAccount {
            acct_id: raw.acct_id,
            acct_type: None,
            bank_id: raw.broker_id,
        }
    }
}

/// One statement response: an account and its transactions in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QfxStatement {
    pub account: QfxAccount,
    pub transactions: Vec<QfxTransaction>,
}

impl QfxStatement {
    pub(super) fn from_raw(
        account: impl Into<QfxAccount>,
        list: Option<QfxBankTransactionList>,
    ) -> Result<Self, String> {
        let transactions = list
            .map(|l| l.transactions)
            .unwrap_or_default()
            .into_iter()
            .map(QfxTransaction::from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QfxStatement {
            account: account.into(),
            transactions,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QfxTransaction {
    #[serde(rename = "TRNTYPE")]
    pub trn_type: String,
    #[serde(rename = "DTPOSTED")]
    pub dt_posted: QfxDate,
    #[serde(rename = "TRNAMT")]
    pub amount: Decimal,
    #[serde(rename = "FITID")]
    pub fitid: Option<String>,
    #[serde(rename = "NAME")]
    pub name: Option<String>,
    #[serde(rename = "MEMO")]
    pub memo: Option<String>,
}

impl QfxTransaction {
    /// Amounts that do not fit a `Decimal` without rounding are rejected.
    pub(super) fn from_raw(raw: QfxTransactionRaw) -> Result<Self, String> {
        let amount = raw.amount.trim();
        let amount = amount.strip_prefix('+').unwrap_or(amount);
        Ok(QfxTransaction {
            trn_type: raw.trn_type.trim().to_string(),
            dt_posted: raw.dt_posted,
            amount: Decimal::from_str_exact(amount)
                .map_err(|e| format!("Invalid amount '{}': {}", raw.amount, e))?,
            fitid: raw.fitid,
            name: raw.name,
            memo: raw.memo,
        })
    }
}
