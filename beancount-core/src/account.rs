use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use typed_builder::TypedBuilder;

use super::account_types::AccountType;

/// Represents an account.
///
/// Beancount accumulates commodities in accounts.  An account name is a
/// colon-separated list of capitalized words which begin with a letter, and whose first word must
/// be one of the five acceptable account types.
///
/// Some example accounts:
///
/// ```text
/// Assets:US:BofA:Checking
/// Liabilities:CA:RBC:CreditCard
/// Equity:Retained-Earnings
/// Income:US:Acme:Salary
/// Expenses:Food:Groceries
/// ```
///
/// <https://docs.google.com/document/d/1wAMVrKIA2qtRGmoVDSUBJGmYZSygUaR0uOMW1GV3YE0/edit#heading=h.17ry42rqbuiu>
#[derive(Clone, Debug, Eq, PartialEq, Hash, TypedBuilder)]
pub struct Account<'a> {
    /// Type of the account.
    pub ty: AccountType,

    /// Optional parts of the account following the account type.
    #[builder(default)]
    pub parts: Vec<Cow<'a, str>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AccountParseError {
    #[error("account name is empty")]
    Empty,
    #[error("unknown account type '{0}'")]
    UnknownType(String),
    #[error("invalid account component '{0}'")]
    InvalidComponent(String),
}

impl<'a> Account<'a> {
    /// Name components, root type first.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.ty.default_name()).chain(self.parts.iter().map(|p| p.as_ref()))
    }
}

fn valid_component(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() || c.is_ascii_digit() || !c.is_ascii() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || (!c.is_ascii() && !c.is_whitespace()))
}

impl FromStr for Account<'static> {
    type Err = AccountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AccountParseError::Empty);
        }
        let mut pieces = s.split(':');
        let root = pieces.next().unwrap_or_default();
        let ty = AccountType::try_from(root)
            .map_err(|t| AccountParseError::UnknownType(t.to_string()))?;
        let parts = pieces
            .map(|p| {
                if valid_component(p) {
                    Ok(Cow::Owned(p.to_string()))
                } else {
                    Err(AccountParseError::InvalidComponent(p.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Account { ty, parts })
    }
}

impl fmt::Display for Account<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty.default_name())?;
        for part in &self.parts {
            write!(f, ":{}", part)?;
        }
        Ok(())
    }
}
