use std::borrow::Cow;
use std::fmt;

#[cfg(feature = "chrono")]
use chrono::NaiveDate;

/// A `YYYY-MM-DD` date as written in the ledger.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Clone)]
pub struct Date<'a> {
    s: Cow<'a, str>,
}

impl<'a> From<Cow<'a, str>> for Date<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Date { s }
    }
}

impl<'a> From<&'a str> for Date<'a> {
    fn from(s: &'a str) -> Self {
        Cow::from(s).into()
    }
}

#[cfg(feature = "chrono")]
impl From<NaiveDate> for Date<'static> {
    fn from(d: NaiveDate) -> Self {
        Cow::from(d.format("%Y-%m-%d").to_string()).into()
    }
}

impl fmt::Display for Date<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.s)
    }
}

#[cfg(feature = "chrono")]
#[test]
fn test_date_from_chrono() {
    assert_eq!(
        Date::from(chrono::NaiveDate::from_ymd_opt(2020, 5, 5).unwrap()),
        Date::from("2020-05-05")
    );
}
