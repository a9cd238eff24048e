use std::fmt::{self, Write as _};

///
/// TableRef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableRef {
    pub db: String,
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    #[must_use]
    pub fn new(db: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            name: name.into(),
            alias: None,
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name shown to users: the alias when present.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

///
/// IndexRef
///
/// Index identity plus its ordered key parts. Expression key parts are kept
/// verbatim (`` `a` + 1 ``).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexRef {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexRef {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for IndexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.columns.join(", "))
    }
}

///
/// AccessObject
///
/// Physical object an operator touches, borrowed from its payload.
///

#[derive(Clone, Copy, Debug)]
pub enum AccessObject<'a> {
    Table {
        table: &'a TableRef,
        partitions: &'a [String],
        index: Option<&'a IndexRef>,
    },
    Cte {
        name: &'a str,
    },
}

impl AccessObject<'_> {
    /// Display form: `table:t1, partition:p0, index:k1(a, b)`.
    pub(crate) fn write_display(&self, out: &mut String) {
        match self {
            Self::Table {
                table,
                partitions,
                index,
            } => {
                let _ = write!(out, "table:{}", table.display_name());
                if !partitions.is_empty() {
                    let _ = write!(out, ", partition:{}", partitions.join(","));
                }
                if let Some(index) = index {
                    let _ = write!(out, ", index:{index}");
                }
            }
            Self::Cte { name } => {
                let _ = write!(out, "CTE:{name}");
            }
        }
    }

    /// Normalized form: schema-qualified identity; pruned partitions collapse
    /// to a single marker.
    pub(crate) fn write_normalized(&self, out: &mut String) {
        match self {
            Self::Table {
                table,
                partitions,
                index,
            } => {
                let _ = write!(out, "table:{}.{}", table.db, table.name);
                if !partitions.is_empty() {
                    out.push_str(", partition:?");
                }
                if let Some(index) = index {
                    let _ = write!(out, ", index:{index}");
                }
            }
            Self::Cte { name } => {
                let _ = write!(out, "CTE:{name}");
            }
        }
    }
}
