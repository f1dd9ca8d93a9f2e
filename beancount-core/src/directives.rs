use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::convert::TryFrom;

use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use super::amount::Amount;
use super::flags::Flag;
use super::metadata::{Link, Meta, Tag};
use super::posting::Posting;
use super::{Currency, Date};

/// An entry in a ledger.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive<'a> {
    Transaction(Transaction<'a>),
}

impl<'a> Directive<'a> {
    pub fn date(&self) -> &Date<'a> {
        match self {
            Directive::Transaction(txn) => &txn.date,
        }
    }
}

impl<'a> From<Transaction<'a>> for Directive<'a> {
    fn from(txn: Transaction<'a>) -> Self {
        Directive::Transaction(txn)
    }
}

/// Transactions are the most common type of directive: a dated movement of commodities between
/// two or more accounts.
///
/// ```text
/// 2014-05-05 * "Cafe Mogador" "Lamb tagine with wine"
///     Liabilities:CreditCard:CapitalOne         -37.45 USD
///     Expenses:Restaurant
/// ```
///
/// <https://docs.google.com/document/d/1wAMVrKIA2qtRGmoVDSUBJGmYZSygUaR0uOMW1GV3YE0/edit#heading=h.up4dj751q84w>
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Transaction<'a> {
    /// Date the transaction occurred.
    pub date: Date<'a>,

    /// Whether the transaction is complete (`*`) or needs review (`!`).
    #[builder(default)]
    pub flag: Flag<'a>,

    /// Payee of this transaction.
    #[builder(default)]
    pub payee: Option<Cow<'a, str>>,

    /// Narration of this transaction.
    pub narration: Cow<'a, str>,

    /// Tags associated with the transaction.
    #[builder(default)]
    pub tags: HashSet<Tag<'a>>,

    /// Links associated with the transactions.
    #[builder(default)]
    pub links: HashSet<Link<'a>>,

    /// Postings belonging to this transaction.
    pub postings: Vec<Posting<'a>>,

    /// Metadata attached to the transaction.
    #[builder(default)]
    pub meta: Meta<'a>,
}

impl<'a> Transaction<'a> {
    /// Sum of the weights of all postings with known units, per currency.
    ///
    /// The weight of a posting is its units, converted through its cost or price when one is
    /// given.
    pub fn residual(&self) -> BTreeMap<Currency<'a>, Decimal> {
        let mut sums = BTreeMap::new();
        for posting in &self.postings {
            if let Some(weight) = weight(posting) {
                *sums.entry(weight.currency).or_insert(Decimal::ZERO) += weight.num;
            }
        }
        sums
    }

    /// Whether Beancount can balance this transaction: at most one posting may omit its units
    /// and absorb the residual, otherwise every currency must sum to zero.
    pub fn is_balanceable(&self) -> bool {
        match self.postings.iter().filter(|p| p.is_auto()).count() {
            0 => self.residual().values().all(|v| v.is_zero()),
            1 => true,
            _ => false,
        }
    }
}

fn weight<'a>(posting: &Posting<'a>) -> Option<Amount<'a>> {
    let units = Amount::try_from(posting.units.clone()).ok()?;
    let (num, currency) = match (&posting.cost, &posting.price) {
        (Some(cost), _) if cost.currency.is_some() => {
            let currency = cost.currency.clone()?;
            match (cost.number_total, cost.number_per) {
                (Some(total), _) if units.num.is_sign_negative() => (-total, currency),
                (Some(total), _) => (total, currency),
                (None, Some(per)) => (units.num * per, currency),
                (None, None) => return Some(units),
            }
        }
        (_, Some(price)) => match (price.num, &price.currency) {
            (Some(per), Some(currency)) => (units.num * per, currency.clone()),
            _ => return Some(units),
        },
        _ => return Some(units),
    };
    Some(Amount { num, currency })
}
