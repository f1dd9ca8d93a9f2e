//! Bank of Beijing (北京银行) personal account statement.
//!
//! Expected text after `pdftotext -layout`:
//!
//! ```text
//!                          北京银行个人客户交易流水清单
//!   日期范围：2023-03-01—2023-03-31
//!   交易日期    币种    钞汇  摘要              交易金额      余额         对方户名    对方账号
//!   2023-03-05  人民币  钞    ATM-WITHDRAWAL   -500.00      12,345.67    JOHN DOE    1234
//!   2023-03-10  人民币  钞    SALARY           +8000.00     20,345.67
//! ```

use std::borrow::Cow;
use std::str::FromStr;

use beancount_core::metadata::new_metadata;
use beancount_core::{
    Account, AccountType, Amount, Date, Directive, Flag, IncompleteAmount, Posting, Transaction,
};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use crate::convert::{Converter, PdfToText};
use crate::error::{ImportError, Result};
use crate::file::{ImportFile, PDF_MIMETYPE};
use crate::importer::Importer;

/// Title printed at the top of every statement.
pub const HEADER: &str = "北京银行个人客户交易流水清单";
pub const DEFAULT_ACCOUNT: &str = "Assets:BJBank";
pub const FILE_NAME: &str = "bjbank.pdf";
pub const CURRENCY: &str = "CNY";

lazy_static! {
    static ref PERIOD_RE: Regex = Regex::new(
        r"日期范围[：:]\s*\d{4}-\d{2}-\d{2}\s*[—–~\-]\s*(?P<date>\d{4}-\d{2}-\d{2})"
    )
    .unwrap();
    static ref ROW_RE: Regex = Regex::new(concat!(
        r"(?P<date>\d{4}-\d{2}-\d{2})\s+人民币\s+钞\s+",
        r"(?P<narration>\S+)\s+",
        r"(?P<amount>[+\-.\d]+)\s+",
        r"(?P<balance>[\d,.]+)",
        r"(?:\s+(?P<payee>\S+(?:\s+\S+)*?))?",
        r"(?:\s+(?P<payee_id>\S+))?\s*$"
    ))
    .unwrap();
    static ref DATED_LINE_RE: Regex = Regex::new(r"^\s*\d{4}-\d{2}-\d{2}\s").unwrap();
}

/// One transaction row of a statement.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct StatementRow {
    /// 1-based line in the extracted text.
    pub line: usize,
    pub date: NaiveDate,
    pub narration: String,
    /// Signed amount in CNY.
    pub amount: Decimal,
    /// Running balance after the transaction, as printed.
    pub balance: String,
    #[builder(default)]
    pub payee: Option<String>,
    #[builder(default)]
    pub payee_id: Option<String>,
}

pub fn is_statement(text: &str) -> bool {
    text.contains(HEADER)
}

/// End date of the statement period.
pub fn parse_statement_date(text: &str) -> Result<NaiveDate> {
    let caps = PERIOD_RE
        .captures(text)
        .ok_or(ImportError::NotFound { what: "statement period" })?;
    let raw = &caps["date"];
    let start = caps.get(0).map_or(0, |m| m.start());
    let line = text[..start].matches('\n').count() + 1;
    parse_date(raw, line)
}

fn parse_date(raw: &str, line: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| ImportError::conversion("date", raw, line, e))
}

fn parse_decimal(field: &'static str, raw: &str, line: usize) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| ImportError::conversion(field, raw, line, e))
}

fn non_empty(s: Option<regex::Match<'_>>) -> Option<String> {
    s.map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse extracted statement text into rows, in the order they appear.
///
/// Lines that are not transaction rows are skipped. A row whose values cannot be converted fails
/// the whole statement.
pub fn parse_bjbank_text(text: &str) -> Result<Vec<StatementRow>> {
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let caps = match ROW_RE.captures(line) {
            Some(caps) => caps,
            None => {
                if line.trim().is_empty() {
                    continue;
                }
                skipped += 1;
                if DATED_LINE_RE.is_match(line) {
                    debug!(line = lineno, text = line.trim(), "skipping dated line");
                } else {
                    trace!(line = lineno, text = line.trim(), "skipping line");
                }
                continue;
            }
        };

        let date = parse_date(&caps["date"], lineno)?;
        let amount = parse_decimal("amount", caps["amount"].trim_start_matches('+'), lineno)?;

        out.push(
            StatementRow::builder()
                .line(lineno)
                .date(date)
                .narration(caps["narration"].to_string())
                .amount(amount)
                .balance(caps["balance"].to_string())
                .payee(non_empty(caps.name("payee")))
                .payee_id(non_empty(caps.name("payee_id")))
                .build(),
        );
    }

    debug!(rows = out.len(), skipped, "parsed statement");
    Ok(out)
}

/// Imports Bank of Beijing statements, booking every row against one account and leaving the
/// other side on `Expenses:TODO` for later classification.
#[derive(Clone, Debug)]
pub struct BJBankImporter<C = PdfToText> {
    account: Account<'static>,
    placeholder: Account<'static>,
    converter: C,
}

fn placeholder_account() -> Account<'static> {
    Account::builder()
        .ty(AccountType::Expenses)
        .parts(vec![Cow::Borrowed("TODO")])
        .build()
}

impl Default for BJBankImporter<PdfToText> {
    fn default() -> Self {
        BJBankImporter {
            account: Account::builder()
                .ty(AccountType::Assets)
                .parts(vec![Cow::Borrowed("BJBank")])
                .build(),
            placeholder: placeholder_account(),
            converter: PdfToText::new(),
        }
    }
}

impl BJBankImporter<PdfToText> {
    pub fn new(account: &str) -> Result<Self> {
        Self::with_converter(account, PdfToText::new())
    }
}

impl<C: Converter> BJBankImporter<C> {
    pub fn with_converter(account: &str, converter: C) -> Result<Self> {
        let account = account
            .parse::<Account<'static>>()
            .map_err(|source| ImportError::InvalidAccount {
                name: account.to_string(),
                source,
            })?;
        Ok(BJBankImporter {
            account,
            placeholder: placeholder_account(),
            converter,
        })
    }

    pub fn account(&self) -> &Account<'static> {
        &self.account
    }

    fn text<'f>(&self, file: &'f ImportFile) -> Result<&'f str> {
        file.convert(&self.converter)
    }

    fn entry(&self, row: StatementRow, filename: &str) -> Transaction<'static> {
        let units = IncompleteAmount::from(Amount {
            num: row.amount,
            currency: Cow::Borrowed(CURRENCY),
        });
        Transaction::builder()
            .date(Date::from(row.date))
            .flag(Flag::Okay)
            .payee(row.payee.map(Cow::Owned))
            .narration(Cow::Owned(row.narration))
            .meta(new_metadata(filename.to_string(), 1))
            .postings(vec![
                Posting::builder()
                    .account(self.account.clone())
                    .units(units)
                    .build(),
                Posting::builder().account(self.placeholder.clone()).build(),
            ])
            .build()
    }
}

impl<C: Converter> Importer for BJBankImporter<C> {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("bjbank")
    }

    fn identify(&self, file: &ImportFile) -> Result<bool> {
        if file.mimetype()? != PDF_MIMETYPE {
            return Ok(false);
        }
        Ok(is_statement(self.text(file)?))
    }

    fn extract(&self, file: &ImportFile) -> Result<Vec<Directive<'static>>> {
        let rows = parse_bjbank_text(self.text(file)?)?;
        let filename = file.name();
        Ok(rows
            .into_iter()
            .map(|row| self.entry(row, &filename).into())
            .collect())
    }

    fn file_account(&self, _file: &ImportFile) -> Account<'static> {
        self.account.clone()
    }

    fn file_name(&self, _file: &ImportFile) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed(FILE_NAME))
    }

    fn file_date(&self, file: &ImportFile) -> Result<Option<NaiveDate>> {
        parse_statement_date(self.text(file)?).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beancount_core::metadata::{MetaValue, FILENAME_KEY, LINENO_KEY};
    use indoc::indoc;
    use std::cell::Cell;
    use std::path::Path;

    const STATEMENT: &str = indoc! {"
                                 北京银行个人客户交易流水清单
        户名：张三                 账号：6214 **** **** 1234
        日期范围：2023-03-01—2023-03-31
        交易日期    币种    钞汇  摘要              交易金额      余额         对方户名    对方账号
        2023-03-05  人民币  钞    ATM-WITHDRAWAL   -500.00      12,345.67    JOHN DOE    1234
        2023-03-10  人民币  钞    SALARY           +8000.00     20,345.67
                                                              第 1 页 共 2 页
        2023-03-12  人民币  钞    TRANSFER         -45.10       20,300.57    LISI
        合计：2 笔支出，1 笔收入
    "};

    fn txn<'d>(d: &'d Directive<'static>) -> &'d Transaction<'static> {
        match d {
            Directive::Transaction(t) => t,
        }
    }

    fn importer_with_text(text: &'static str) -> BJBankImporter<impl Converter> {
        BJBankImporter::with_converter(DEFAULT_ACCOUNT, move |_: &Path| -> Result<String> {
            Ok(text.to_string())
        })
        .unwrap()
    }

    fn pdf() -> ImportFile {
        ImportFile::with_mimetype("/statements/march.pdf", PDF_MIMETYPE)
    }

    #[test]
    fn identifies_by_header() {
        assert!(is_statement(STATEMENT));
        assert!(!is_statement("招商银行个人客户交易流水"));
        assert!(!is_statement(""));
    }

    #[test]
    fn non_pdf_is_rejected_without_conversion() {
        let calls = Cell::new(0);
        let convert = |_: &Path| -> Result<String> {
            calls.set(calls.get() + 1);
            Ok(STATEMENT.to_string())
        };
        let importer = BJBankImporter::with_converter(DEFAULT_ACCOUNT, convert).unwrap();
        let file = ImportFile::with_mimetype("/statements/march.csv", "text/csv");
        assert!(!importer.identify(&file).unwrap());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn identify_pdf() {
        assert!(importer_with_text(STATEMENT).identify(&pdf()).unwrap());
        assert!(!importer_with_text("some other bank").identify(&pdf()).unwrap());
    }

    #[test]
    fn statement_date_is_period_end() {
        assert_eq!(
            parse_statement_date("日期范围：2023-01-01—2023-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()
        );
        assert_eq!(
            parse_statement_date("日期范围: 2023-01-01 - 2023-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert_eq!(
            importer_with_text(STATEMENT).file_date(&pdf()).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 31)
        );
    }

    #[test]
    fn missing_period_is_not_found() {
        let err = parse_statement_date("北京银行个人客户交易流水清单\n").unwrap_err();
        assert!(matches!(err, ImportError::NotFound { .. }));
    }

    #[test]
    fn impossible_period_date_is_a_conversion_error() {
        let err = parse_statement_date("\n日期范围：2023-02-01—2023-02-30").unwrap_err();
        assert!(matches!(err, ImportError::Conversion { field: "date", line: 2, .. }));
    }

    #[test]
    fn parses_rows_in_order() {
        let rows = parse_bjbank_text(STATEMENT).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().map(|r| r.narration.as_str()).collect::<Vec<_>>(),
            vec!["ATM-WITHDRAWAL", "SALARY", "TRANSFER"]
        );
        assert_eq!(rows.iter().map(|r| r.line).collect::<Vec<_>>(), vec![5, 6, 8]);
    }

    #[test]
    fn parses_example_row() {
        let rows = parse_bjbank_text(
            "2023-03-05 人民币 钞 ATM-WITHDRAWAL -500.00 12,345.67 JOHN DOE 1234",
        )
        .unwrap();
        assert_eq!(
            rows,
            vec![StatementRow::builder()
                .line(1)
                .date(NaiveDate::from_ymd_opt(2023, 3, 5).unwrap())
                .narration("ATM-WITHDRAWAL".to_string())
                .amount(Decimal::new(-50000, 2))
                .balance("12,345.67".to_string())
                .payee(Some("JOHN DOE".to_string()))
                .payee_id(Some("1234".to_string()))
                .build()]
        );
    }

    #[test]
    fn optional_trailing_fields() {
        let rows = parse_bjbank_text(indoc! {"
            2023-03-10 人民币 钞 SALARY +8000.00 20,345.67
            2023-03-12 人民币 钞 TRANSFER -45.10 20,300.57 LISI
            2023-03-13 人民币 钞 TRANSFER -1.00 20,299.57 WANGWU 6222
        "})
        .unwrap();
        assert_eq!(rows[0].payee, None);
        assert_eq!(rows[0].payee_id, None);
        assert_eq!(rows[1].payee.as_deref(), Some("LISI"));
        assert_eq!(rows[1].payee_id, None);
        assert_eq!(rows[2].payee.as_deref(), Some("WANGWU"));
        assert_eq!(rows[2].payee_id.as_deref(), Some("6222"));
    }

    #[test]
    fn plus_sign_is_stripped_exactly() {
        let rows = parse_bjbank_text("2023-03-10 人民币 钞 SALARY +1200.50 20,345.67").unwrap();
        let expected = Decimal::new(120050, 2);
        assert_eq!(rows[0].amount, expected);
        assert_eq!(rows[0].amount.to_string(), "1200.50");
        let mut sum = rows[0].amount;
        for _ in 0..1000 {
            sum += Decimal::new(0, 2);
        }
        assert_eq!(sum, expected);
    }

    #[test]
    fn interleaved_lines_are_skipped() {
        let text = indoc! {"
            header
            2023-03-01 人民币 钞 A 1.00 1.00
            2023-03-01 美元 汇 FOREIGN 1.00 1.00
            -- page break --
            2023-03-02 人民币 钞 B -2.00 0.00 PAYEE
            summary 3.00
            2023-03-03 人民币 钞 C +3.00 3.00 PAYEE 99
        "};
        let rows = parse_bjbank_text(text).unwrap();
        assert_eq!(
            rows.iter().map(|r| r.narration.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn garbage_amount_fails_whole_statement() {
        let text = indoc! {"
            2023-03-01 人民币 钞 A 1.00 1.00
            2023-03-02 人民币 钞 B 1.2.3 1.00
            2023-03-03 人民币 钞 C 3.00 4.00
        "};
        let err = parse_bjbank_text(text).unwrap_err();
        match err {
            ImportError::Conversion {
                field, value, line, ..
            } => {
                assert_eq!(field, "amount");
                assert_eq!(value, "1.2.3");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(importer_with_text(text).extract(&pdf()).is_err());
    }

    #[test]
    fn malformed_balance_is_kept_verbatim() {
        let rows = parse_bjbank_text("2023-03-05 人民币 钞 X -1.00 1.2.3").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Decimal::new(-100, 2));
        assert_eq!(rows[0].balance, "1.2.3");
    }

    #[test]
    fn payee_words_may_be_padded() {
        let rows =
            parse_bjbank_text("2023-03-05  人民币  钞  X  -1.00  2.00  JOHN  DOE  1234  ").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].payee.as_deref(), Some("JOHN  DOE"));
        assert_eq!(rows[0].payee_id.as_deref(), Some("1234"));
    }

    #[test]
    fn impossible_row_date_fails() {
        let err = parse_bjbank_text("2023-13-01 人民币 钞 A 1.00 1.00").unwrap_err();
        assert!(matches!(err, ImportError::Conversion { field: "date", .. }));
    }

    #[test]
    fn extracts_ledger_entries() {
        let entries = importer_with_text(STATEMENT).extract(&pdf()).unwrap();
        assert_eq!(entries.len(), 3);

        let first = txn(&entries[0]);
        assert_eq!(first.date, Date::from("2023-03-05"));
        assert_eq!(first.payee.as_deref(), Some("JOHN DOE"));
        assert_eq!(first.narration, "ATM-WITHDRAWAL");
        assert_eq!(first.flag, Flag::Okay);
        assert!(first.tags.is_empty());
        assert!(first.links.is_empty());
        assert_eq!(
            first.meta.get(FILENAME_KEY),
            Some(&MetaValue::Text("/statements/march.pdf".into()))
        );
        assert_eq!(
            first.meta.get(LINENO_KEY),
            Some(&MetaValue::Number(Decimal::from(1)))
        );

        assert_eq!(first.postings.len(), 2);
        let bank = &first.postings[0];
        assert_eq!(bank.account.to_string(), "Assets:BJBank");
        assert_eq!(bank.units.num, Some(Decimal::new(-50000, 2)));
        assert_eq!(bank.units.currency.as_deref(), Some("CNY"));
        let other = &first.postings[1];
        assert_eq!(other.account.to_string(), "Expenses:TODO");
        assert!(other.units.is_empty());
        assert!(other.cost.is_none());
        assert!(other.price.is_none());
        assert!(other.flag.is_none());

        let salary = txn(&entries[1]);
        assert_eq!(salary.payee, None);
        assert_eq!(salary.postings[0].units.num, Some(Decimal::new(800000, 2)));

        assert!(entries.iter().all(|d| txn(d).is_balanceable()));
    }

    #[test]
    fn conversion_runs_once_per_file() {
        let calls = Cell::new(0);
        let convert = |_: &Path| -> Result<String> {
            calls.set(calls.get() + 1);
            Ok(STATEMENT.to_string())
        };
        let importer = BJBankImporter::with_converter(DEFAULT_ACCOUNT, convert).unwrap();
        let file = pdf();
        assert!(importer.identify(&file).unwrap());
        importer.file_date(&file).unwrap();
        importer.extract(&file).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn file_name_and_account_are_static() {
        let convert = |_: &Path| -> Result<String> { Ok(String::new()) };
        let importer = BJBankImporter::with_converter("Assets:CN:BJBank:Debit", convert).unwrap();
        let a = pdf();
        let b = ImportFile::with_mimetype("/elsewhere/other.pdf", PDF_MIMETYPE);
        assert_eq!(importer.file_name(&a).as_deref(), Some("bjbank.pdf"));
        assert_eq!(importer.file_name(&b).as_deref(), Some("bjbank.pdf"));
        assert_eq!(importer.file_account(&a).to_string(), "Assets:CN:BJBank:Debit");
        assert_eq!(importer.file_account(&b), importer.file_account(&a));
        assert_eq!(
            BJBankImporter::<PdfToText>::default().account().to_string(),
            DEFAULT_ACCOUNT
        );
    }

    #[test]
    fn invalid_account_is_rejected() {
        let err = BJBankImporter::new("assets:bjbank").unwrap_err();
        assert!(matches!(err, ImportError::InvalidAccount { .. }));
    }

    #[test]
    fn extraction_failure_surfaces() {
        let convert = |_: &Path| -> Result<String> {
            Err(crate::error::ExtractionError::Spawn {
                program: "pdftotext".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            }
            .into())
        };
        let importer = BJBankImporter::with_converter(DEFAULT_ACCOUNT, convert).unwrap();
        assert!(matches!(
            importer.identify(&pdf()).unwrap_err(),
            ImportError::Extraction(_)
        ));
        assert!(matches!(
            importer.extract(&pdf()).unwrap_err(),
            ImportError::Extraction(_)
        ));
    }
}
