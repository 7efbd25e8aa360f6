use crate::{errors::StatementParseError, parsers::prelude::*};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

/// One parsed input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub accounts: Vec<AccountStatement>,
}

impl Statement {
    pub fn transaction_count(&self) -> usize {
        self.accounts.iter().map(|a| a.transactions.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountStatement {
    pub account: Account,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub account_id: String,
    /// CHECKING, SAVINGS, CREDITLINE, ...; absent for credit card accounts
    pub account_type: Option<String>,
    pub bank_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub posted: DateTime<FixedOffset>,
    pub amount: Decimal,
    pub transaction_type: String,
    pub fitid: Option<String>,
    pub name: Option<String>,
    pub memo: Option<String>,
}

impl TryFrom<Vec<QfxStatement>> for Statement {
    type Error = StatementParseError;

    fn try_from(statements: Vec<QfxStatement>) -> Result<Self, Self::Error> {
        Ok(Statement {
            accounts: statements
                .into_iter()
                .map(AccountStatement::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<QfxStatement> for AccountStatement {
    type Error = StatementParseError;

    fn try_from(stmt: QfxStatement) -> Result<Self, Self::Error> {
        Ok(AccountStatement {
            account: stmt.account.into(),
            transactions: stmt
                .transactions
                .into_iter()
                .map(Transaction::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<QfxAccount> for Account {
    fn from(account: QfxAccount) -> Self {
        Account {
            account_id: account.acct_id.trim().to_string(),
            account_type: account.acct_type,
            bank_id: account.bank_id,
        }
    }
}

impl TryFrom<QfxTransaction> for Transaction {
    type Error = StatementParseError;

    fn try_from(stmt: QfxTransaction) -> Result<Self, Self::Error> {
        Ok(Transaction {
            posted: stmt.dt_posted.try_into()?,
            amount: stmt.amount,
            transaction_type: stmt.trn_type,
            fitid: stmt.fitid,
            name: stmt.name,
            memo: stmt.memo,
        })
    }
}
