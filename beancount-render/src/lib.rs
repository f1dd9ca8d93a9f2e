use beancount_core::metadata::{FILENAME_KEY, LINENO_KEY};
use beancount_core::*;
use std::{io, io::Write};
use thiserror::Error;


#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct BasicRenderer {}

impl BasicRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn render<W: Write>(w: &mut W, ledger: &Ledger<'_>) -> Result<(), BasicRendererError> {
    BasicRenderer::default().render(ledger, w)
}

#[derive(Error, Debug)]
pub enum BasicRendererError {
    #[error("an io error occurred")]
    Io(#[from] io::Error),
}

pub trait Renderer<T, W: Write> {
    type Error;
    fn render(&self, renderable: T, write: &mut W) -> Result<(), Self::Error>;
}

impl<'a, W: Write> Renderer<&'a Ledger<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(&self, ledger: &'a Ledger<'_>, write: &mut W) -> Result<(), Self::Error> {
        for directive in &ledger.directives {
            self.render(directive, write)?;
            writeln!(write)?;
        }
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Directive<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(&self, directive: &'a Directive<'_>, write: &mut W) -> Result<(), Self::Error> {
        match directive {
            Directive::Transaction(transaction) => self.render(transaction, write),
        }
    }
}

/// Quotes a string, escaping backslashes and double quotes.
fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Location metadata is implied by where an entry is printed.
fn is_hidden_key(key: &str) -> bool {
    key == FILENAME_KEY || key == LINENO_KEY || key.starts_with("__")
}

fn render_key_value<W: Write>(
    renderer: &BasicRenderer,
    w: &mut W,
    indent: &str,
    kv: &Meta<'_>,
) -> Result<(), BasicRendererError> {
    let mut keys: Vec<_> = kv.keys().filter(|k| !is_hidden_key(k)).collect();
    keys.sort();
    for key in keys {
        write!(w, "{}{}: ", indent, key)?;
        renderer.render(&kv[key], w)?;
        writeln!(w)?;
    }
    Ok(())
}

impl<'a, W: Write> Renderer<&'a MetaValue<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(&self, mv: &'a MetaValue<'_>, w: &mut W) -> Result<(), Self::Error> {
        match mv {
            MetaValue::Account(account) => self.render(account, w)?,
            MetaValue::Amount(amount) => self.render(amount, w)?,
            MetaValue::Bool(b) => write!(w, "{}", if *b { "TRUE" } else { "FALSE" })?,
            MetaValue::Currency(curr) => write!(w, "{}", curr)?,
            MetaValue::Date(date) => write!(w, "{}", date)?,
            MetaValue::Number(num) => write!(w, "{}", num)?,
            MetaValue::Text(t) => write!(w, "{}", quoted(t))?,
        }
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Account<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(&self, account: &'a Account<'_>, write: &mut W) -> Result<(), Self::Error> {
        write!(write, "{}", account)?;
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Amount<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(&self, amount: &'a Amount<'_>, w: &mut W) -> Result<(), Self::Error> {
        write!(w, "{} {}", amount.num, amount.currency)?;
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Transaction<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(&self, transaction: &'a Transaction<'_>, w: &mut W) -> Result<(), Self::Error> {
        write!(w, "{} {}", transaction.date, transaction.flag)?;
        if let Some(payee) = &transaction.payee {
            write!(w, " {}", quoted(payee))?;
        }
        write!(w, " {}", quoted(&transaction.narration))?;
        let mut tags: Vec<_> = transaction.tags.iter().collect();
        tags.sort();
        for tag in tags {
            write!(w, " #{}", tag)?;
        }
        let mut links: Vec<_> = transaction.links.iter().collect();
        links.sort();
        for link in links {
            write!(w, " ^{}", link)?;
        }
        writeln!(w)?;
        render_key_value(self, w, "\t", &transaction.meta)?;
        for posting in &transaction.postings {
            self.render(posting, w)?;
        }
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Posting<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(&self, posting: &'a Posting<'_>, w: &mut W) -> Result<(), Self::Error> {
        write!(w, "\t")?;
        if let Some(flag) = &posting.flag {
            write!(w, "{} ", flag)?;
        }
        self.render(&posting.account, w)?;
        if !posting.units.is_empty() {
            write!(w, "\t")?;
            self.render(&posting.units, w)?;
        }
        if let Some(cost) = &posting.cost {
            write!(w, " ")?;
            self.render(cost, w)?;
        }
        if let Some(price) = &posting.price {
            write!(w, " @ ")?;
            self.render(price, w)?;
        }
        writeln!(w)?;
        render_key_value(self, w, "\t\t", &posting.meta)
    }
}

impl<'a, W: Write> Renderer<&'a CostSpec<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(&self, cost: &'a CostSpec<'_>, w: &mut W) -> Result<(), Self::Error> {
        let double_brackets = cost.number_total.is_some();
        if double_brackets {
            write!(w, "{{{{")?;
        } else {
            write!(w, "{{")?;
        }
        let mut first = true;

        if let (Some(cost), Some(currency)) =
            (&cost.number_total.or(cost.number_per), &cost.currency)
        {
            write!(w, "{} {}", cost, currency)?;
            first = false;
        }

        if let Some(date) = &cost.date {
            if !first {
                write!(w, ", ")?;
            }
            write!(w, "{}", date)?;
            first = false;
        }

        if let Some(label) = &cost.label {
            if !first {
                write!(w, ", ")?;
            }
            write!(w, "{}", quoted(label))?;
        }

        if double_brackets {
            write!(w, "}}}}")?;
        } else {
            write!(w, "}}")?;
        }
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a IncompleteAmount<'_>, W> for BasicRenderer {
    type Error = BasicRendererError;
    fn render(
        &self,
        incomplete_amount: &'a IncompleteAmount<'_>,
        w: &mut W,
    ) -> Result<(), Self::Error> {
        match (&incomplete_amount.num, &incomplete_amount.currency) {
            (Some(num), Some(currency)) => write!(w, "{} {}", num, currency),
            (None, Some(currency)) => write!(w, "{}", currency),
            (Some(num), None) => write!(w, "{}", num),
            _ => write!(w, ""),
        }?;
        Ok(())
    }
}
