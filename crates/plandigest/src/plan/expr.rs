//! Scalar expressions, datums, and sort/aggregate items carried in operator info.
//!
//! Every type renders two ways: the display form keeps literals verbatim, the
//! normalized form replaces each literal with `?` while keeping function names
//! and column references. Range bounds also keep `NULL`, `-inf` and `+inf`.

use crate::config::InListPolicy;
use std::fmt::{self, Write as _};

/// Placeholder that replaces a literal in normalized output.
pub(crate) const PLACEHOLDER: &str = "?";

/// Marker that replaces the tail of a collapsed list in normalized output.
pub(crate) const ELIDED: &str = "...";

///
/// Datum
///

#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Null,
    Int(i64),
    Uint(u64),
    Float(f64),
    Decimal(String),
    String(String),
    Bytes(Vec<u8>),
    /// Lower sentinel of a range (`-inf`).
    MinNotNull,
    /// Upper sentinel of a range (`+inf`).
    MaxValue,
}

impl Datum {
    /// Write the literal-free form of a range bound: sentinels and `NULL`
    /// survive, values do not.
    pub(crate) fn write_normalized_bound(&self, out: &mut String) {
        match self {
            Self::Null => out.push_str("NULL"),
            Self::MinNotNull => out.push_str("-inf"),
            Self::MaxValue => out.push_str("+inf"),
            _ => out.push_str(PLACEHOLDER),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Decimal(value) => f.write_str(value),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Bytes(value) => {
                f.write_str("0x")?;
                for byte in value {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
            Self::MinNotNull => f.write_str("-inf"),
            Self::MaxValue => f.write_str("+inf"),
        }
    }
}

impl From<i32> for Datum {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Datum {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

///
/// Column
///
/// A column reference. Table columns display schema-qualified
/// (`test.t1.a`); optimizer-generated columns display as `Column#<id>`.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Column {
    unique_id: u64,
    name: Option<ColumnName>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct ColumnName {
    db: String,
    table: String,
    column: String,
}

impl Column {
    #[must_use]
    pub fn named(
        unique_id: u64,
        db: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            unique_id,
            name: Some(ColumnName {
                db: db.into(),
                table: table.into(),
                column: column.into(),
            }),
        }
    }

    #[must_use]
    pub const fn generated(unique_id: u64) -> Self {
        Self {
            unique_id,
            name: None,
        }
    }

    #[must_use]
    pub const fn unique_id(&self) -> u64 {
        self.unique_id
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}.{}.{}", name.db, name.table, name.column),
            None => write!(f, "Column#{}", self.unique_id),
        }
    }
}

///
/// Expr
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Column(Column),
    /// Outer-query column referenced from an `Apply` inner side.
    Correlated(Column),
    Constant(Datum),
    Func(ScalarFunc),
}

///
/// ScalarFunc
///
/// Function call in the engine's explain vocabulary (`eq`, `lt`, `in`, `plus`, ...).
///

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarFunc {
    pub name: String,
    pub args: Vec<Expr>,
}

impl ScalarFunc {
    fn is_list_membership(&self) -> bool {
        self.name == "in"
    }
}

impl Expr {
    #[must_use]
    pub const fn column(column: Column) -> Self {
        Self::Column(column)
    }

    #[must_use]
    pub fn constant(value: impl Into<Datum>) -> Self {
        Self::Constant(value.into())
    }

    #[must_use]
    pub fn func(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Func(ScalarFunc {
            name: name.into(),
            args,
        })
    }

    #[must_use]
    pub fn eq(left: Self, right: Self) -> Self {
        Self::func("eq", vec![left, right])
    }

    #[must_use]
    pub fn ne(left: Self, right: Self) -> Self {
        Self::func("ne", vec![left, right])
    }

    #[must_use]
    pub fn lt(left: Self, right: Self) -> Self {
        Self::func("lt", vec![left, right])
    }

    #[must_use]
    pub fn le(left: Self, right: Self) -> Self {
        Self::func("le", vec![left, right])
    }

    #[must_use]
    pub fn gt(left: Self, right: Self) -> Self {
        Self::func("gt", vec![left, right])
    }

    #[must_use]
    pub fn ge(left: Self, right: Self) -> Self {
        Self::func("ge", vec![left, right])
    }

    /// `target IN (items...)`.
    #[must_use]
    pub fn in_list(target: Self, items: Vec<Self>) -> Self {
        let mut args = Vec::with_capacity(items.len() + 1);
        args.push(target);
        args.extend(items);
        Self::func("in", args)
    }

    pub(crate) fn write_normalized(&self, out: &mut String, policy: InListPolicy) {
        match self {
            Self::Column(column) | Self::Correlated(column) => {
                let _ = write!(out, "{column}");
            }
            // `NULL` included: `eq(a, NULL)` is the same statement shape as `eq(a, 1)`.
            Self::Constant(_) => out.push_str(PLACEHOLDER),
            Self::Func(func) => {
                out.push_str(&func.name);
                out.push('(');
                if func.is_list_membership() && policy == InListPolicy::Collapse {
                    if let Some((target, items)) = func.args.split_first() {
                        target.write_normalized(out, policy);
                        if !items.is_empty() {
                            out.push_str(", ");
                            out.push_str(ELIDED);
                        }
                    }
                } else {
                    write_joined(out, &func.args, ", ", |out, arg| {
                        arg.write_normalized(out, policy);
                    });
                }
                out.push(')');
            }
        }
    }

    pub(crate) fn normalized(&self, policy: InListPolicy) -> String {
        let mut out = String::new();
        self.write_normalized(&mut out, policy);
        out
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(column) | Self::Correlated(column) => write!(f, "{column}"),
            Self::Constant(datum) => write!(f, "{datum}"),
            Self::Func(func) => {
                write!(f, "{}(", func.name)?;
                for (idx, arg) in func.args.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

///
/// SortItem
///

#[derive(Clone, Debug, PartialEq)]
pub struct SortItem {
    pub expr: Expr,
    pub desc: bool,
}

impl SortItem {
    #[must_use]
    pub const fn asc(expr: Expr) -> Self {
        Self { expr, desc: false }
    }

    #[must_use]
    pub const fn desc(expr: Expr) -> Self {
        Self { expr, desc: true }
    }

    pub(crate) fn write_normalized(&self, out: &mut String, policy: InListPolicy) {
        self.expr.write_normalized(out, policy);
        if self.desc {
            out.push_str(":desc");
        }
    }
}

impl fmt::Display for SortItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.desc {
            f.write_str(":desc")?;
        }
        Ok(())
    }
}

///
/// AggFunc
///

#[derive(Clone, Debug, PartialEq)]
pub struct AggFunc {
    pub name: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
    pub output: Option<Column>,
}

impl AggFunc {
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            distinct: false,
            output: None,
        }
    }

    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn into_column(mut self, output: Column) -> Self {
        self.output = Some(output);
        self
    }

    pub(crate) fn write_normalized(&self, out: &mut String, policy: InListPolicy) {
        out.push_str(&self.name);
        out.push('(');
        if self.distinct {
            out.push_str("distinct ");
        }
        write_joined(out, &self.args, ", ", |out, arg| {
            arg.write_normalized(out, policy);
        });
        out.push(')');
        if let Some(output) = &self.output {
            let _ = write!(out, "->{output}");
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.distinct {
            f.write_str("distinct ")?;
        }
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")?;
        if let Some(output) = &self.output {
            write!(f, "->{output}")?;
        }
        Ok(())
    }
}

/// Write `items` separated by `sep`, rendering each with `render`.
pub(crate) fn write_joined<T>(
    out: &mut String,
    items: &[T],
    sep: &str,
    mut render: impl FnMut(&mut String, &T),
) {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            out.push_str(sep);
        }
        render(out, item);
    }
}

/// Write `items` with `Display`, separated by `sep`.
pub(crate) fn write_display_joined<T: fmt::Display>(out: &mut String, items: &[T], sep: &str) {
    write_joined(out, items, sep, |out, item| {
        let _ = write!(out, "{item}");
    });
}

/// Normalize a predicate list into a canonical, order-independent sequence.
///
/// Conjunct order never contributes: equal condition sets normalize identically.
pub(crate) fn normalized_conditions(conditions: &[Expr], policy: InListPolicy) -> Vec<String> {
    let mut normalized: Vec<String> = conditions
        .iter()
        .map(|condition| condition.normalized(policy))
        .collect();
    normalized.sort_unstable();
    normalized
}
