use crate::error::Result;
use crate::schema::{AccountGroup, AccountType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Balances for one fiscal year, keyed by account type, in fixed-point cents.
///
/// Debits are positive and credits negative, as on a trial balance. Keys are
/// restricted to the [`AccountType`] vocabulary: any string key is validated on
/// the way in, including during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>", into = "BTreeMap<String, i64>")]
pub struct AccountMap {
    balances: BTreeMap<AccountType, i64>,
}

impl AccountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from string keys, rejecting the first key outside the vocabulary.
    pub fn from_entries<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        let mut map = Self::new();
        for (key, balance) in entries {
            map.set(key.as_ref(), balance)?;
        }
        Ok(map)
    }

    pub fn get(&self, account_type: &str) -> Result<i64> {
        let account: AccountType = account_type.parse()?;
        Ok(self.balance(account))
    }

    pub fn set(&mut self, account_type: &str, balance: i64) -> Result<()> {
        let account: AccountType = account_type.parse()?;
        self.set_balance(account, balance);
        Ok(())
    }

    pub fn balance(&self, account: AccountType) -> i64 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    pub fn set_balance(&mut self, account: AccountType, balance: i64) {
        self.balances.insert(account, balance);
    }

    pub fn add_to_balance(&mut self, account: AccountType, amount: i64) {
        *self.balances.entry(account).or_insert(0) += amount;
    }

    /// Sums every account whose type starts with `prefix` (`ASSET`, `LIABILITY`,
    /// `EQUITY`, `INCOME_STATEMENT` or `OTHER`).
    pub fn get_total_for_group(&self, prefix: &str) -> Result<i64> {
        let group: AccountGroup = prefix.parse()?;
        Ok(self.total_for(group))
    }

    pub fn total_for(&self, group: AccountGroup) -> i64 {
        self.balances
            .iter()
            .filter(|(account, _)| account.group() == Some(group))
            .map(|(_, balance)| *balance)
            .sum()
    }

    /// Sum of every balance. A balanced trial balance totals zero.
    pub fn total(&self) -> i64 {
        self.balances.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AccountType, i64)> + '_ {
        self.balances.iter().map(|(account, balance)| (*account, *balance))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl TryFrom<BTreeMap<String, i64>> for AccountMap {
    type Error = crate::error::StatementError;

    fn try_from(entries: BTreeMap<String, i64>) -> Result<Self> {
        AccountMap::from_entries(entries)
    }
}

impl From<AccountMap> for BTreeMap<String, i64> {
    fn from(map: AccountMap) -> Self {
        map.balances
            .into_iter()
            .map(|(account, balance)| (account.as_str().to_string(), balance))
            .collect()
    }
}

impl FromIterator<(AccountType, i64)> for AccountMap {
    fn from_iter<T: IntoIterator<Item = (AccountType, i64)>>(iter: T) -> Self {
        let mut map = AccountMap::new();
        for (account, balance) in iter {
            map.add_to_balance(account, balance);
        }
        map
    }
}
