use std::borrow::Cow;
use std::collections::HashMap;

use rust_decimal::Decimal;

/// Metadata that can be attached to other Beancount information.
pub type Meta<'a> = HashMap<Cow<'a, str>, MetaValue<'a>>;

/// Key under which an entry records the file it was read or imported from.
pub const FILENAME_KEY: &str = "filename";

/// Key under which an entry records its line in the originating file.
pub const LINENO_KEY: &str = "lineno";

/// An enum of the valid values in a metadata map.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum MetaValue<'a> {
    Text(Cow<'a, str>),
    Account(super::account::Account<'a>),
    Date(super::Date<'a>),
    Currency(super::Currency<'a>),
    Bool(bool),
    Amount(super::amount::Amount<'a>),
    Number(Decimal),
}

/// Builds the location metadata every imported entry carries.
pub fn new_metadata<'a>(filename: impl Into<Cow<'a, str>>, lineno: u32) -> Meta<'a> {
    let mut meta = Meta::new();
    meta.insert(FILENAME_KEY.into(), MetaValue::Text(filename.into()));
    meta.insert(LINENO_KEY.into(), MetaValue::Number(Decimal::from(lineno)));
    meta
}

/// Tag associated with a transaction directive.  Tags allow you to mark a subset of transactions,
/// enabling filtering on a tag(s) when generating a report.
///
/// In the below transaction, #berlin-trip-2014 is the tag:
///
/// ```text
///
/// 2014-04-23 * "Flight to Berlin" #berlin-trip-2014
///     Expenses:Flights              -1230.27 USD
///     Liabilities:CreditCard
/// ```
///
/// <https://docs.google.com/document/d/1wAMVrKIA2qtRGmoVDSUBJGmYZSygUaR0uOMW1GV3YE0/edit#heading=h.oivvp5olom2v>
pub type Tag<'a> = Cow<'a, str>;

/// Links provide a way to link transactions together, a special kind of tag used to group
/// financially related transactions over time.
///
/// <https://docs.google.com/document/d/1wAMVrKIA2qtRGmoVDSUBJGmYZSygUaR0uOMW1GV3YE0/edit#heading=h.k4v5vkjukel7>
pub type Link<'a> = Cow<'a, str>;
