use typed_builder::TypedBuilder;

use super::account::Account;
use super::amount::IncompleteAmount;
use super::flags::Flag;
use super::metadata::Meta;
use super::position::CostSpec;

/// Represents a transaction posting.  Postings represent a single amount being deposited to or
/// withdrawn from an account.
///
/// A posting may leave its units out entirely, in which case Beancount fills in the amount that
/// balances the transaction:
///
/// ```text
/// 2023-03-05 * "ATM-WITHDRAWAL"
///     Assets:BJBank            -500.00 CNY
///     Expenses:TODO
/// ```
///
/// Postings can optionally have either a cost or a price, where the price is the amount and
/// commodity following the `@`:
///
/// ```text
/// 2012-11-03 * "Transfer to account in Canada"
///     Assets:MyBank:Checking            -400.00 USD @ 1.09 CAD
///     Assets:FR:SocGen:Checking          436.01 CAD
/// ```
///
/// <https://docs.google.com/document/d/1wAMVrKIA2qtRGmoVDSUBJGmYZSygUaR0uOMW1GV3YE0/edit#heading=h.mtqrwt24wnzs>
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Posting<'a> {
    /// Account being posted to.
    pub account: Account<'a>,

    /// The amount being posted.
    #[builder(default)]
    pub units: IncompleteAmount<'a>,

    /// The cost of this posting.
    #[builder(default)]
    pub cost: Option<CostSpec<'a>>,

    /// The price of this posting.
    #[builder(default)]
    pub price: Option<IncompleteAmount<'a>>,

    #[builder(default)]
    pub flag: Option<Flag<'a>>,

    #[builder(default)]
    pub meta: Meta<'a>,
}

impl Posting<'_> {
    /// Whether the posting leaves its units for interpolation.
    pub fn is_auto(&self) -> bool {
        self.units.num.is_none()
    }
}
