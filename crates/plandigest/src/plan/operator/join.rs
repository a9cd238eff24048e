use super::{ChildShape, ExplainOperator, OperatorContext};
use crate::{
    config::InListPolicy,
    normalize::NormalizeError,
    plan::{
        ChildRole, Column, Expr,
        expr::{normalized_conditions, write_display_joined},
    },
};
use std::fmt;

///
/// JoinType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    Semi,
    AntiSemi,
    LeftOuterSemi,
    AntiLeftOuterSemi,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "inner join",
            Self::LeftOuter => "left outer join",
            Self::RightOuter => "right outer join",
            Self::Semi => "semi join",
            Self::AntiSemi => "anti semi join",
            Self::LeftOuterSemi => "left outer semi join",
            Self::AntiLeftOuterSemi => "anti left outer semi join",
        })
    }
}

///
/// Conditions
///
/// Renders one labelled condition list in either form. Normalized lists are
/// sorted so conjunct order never reaches the digest.
///

struct Conditions<'a> {
    label: &'static str,
    exprs: &'a [Expr],
    bracketed: bool,
}

impl<'a> Conditions<'a> {
    const fn bracketed(label: &'static str, exprs: &'a [Expr]) -> Self {
        Self {
            label,
            exprs,
            bracketed: true,
        }
    }

    const fn bare(label: &'static str, exprs: &'a [Expr]) -> Self {
        Self {
            label,
            exprs,
            bracketed: false,
        }
    }

    fn write(&self, out: &mut String, normalize: Option<InListPolicy>) {
        if self.exprs.is_empty() {
            return;
        }
        out.push_str(", ");
        out.push_str(self.label);
        out.push(':');
        if self.bracketed {
            out.push('[');
        }
        match normalize {
            Some(policy) => out.push_str(&normalized_conditions(self.exprs, policy).join(", ")),
            None => write_display_joined(out, self.exprs, ", "),
        }
        if self.bracketed {
            out.push(']');
        }
    }
}

fn write_keys(out: &mut String, label: &str, keys: &[Column]) {
    if keys.is_empty() {
        return;
    }
    out.push_str(", ");
    out.push_str(label);
    out.push(':');
    write_display_joined(out, keys, ", ");
}

///
/// HashJoin
///

#[derive(Clone, Debug, PartialEq)]
pub struct HashJoin {
    pub join_type: JoinType,
    pub equal: Vec<Expr>,
    pub left_conditions: Vec<Expr>,
    pub right_conditions: Vec<Expr>,
    pub other_conditions: Vec<Expr>,
}

impl HashJoin {
    #[must_use]
    pub const fn new(join_type: JoinType, equal: Vec<Expr>) -> Self {
        Self {
            join_type,
            equal,
            left_conditions: Vec::new(),
            right_conditions: Vec::new(),
            other_conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_left_conditions(mut self, conditions: Vec<Expr>) -> Self {
        self.left_conditions = conditions;
        self
    }

    #[must_use]
    pub fn with_right_conditions(mut self, conditions: Vec<Expr>) -> Self {
        self.right_conditions = conditions;
        self
    }

    #[must_use]
    pub fn with_other_conditions(mut self, conditions: Vec<Expr>) -> Self {
        self.other_conditions = conditions;
        self
    }

    fn write(&self, out: &mut String, normalize: Option<InListPolicy>) {
        out.push_str(&self.join_type.to_string());
        Conditions::bracketed("equal", &self.equal).write(out, normalize);
        Conditions::bracketed("left cond", &self.left_conditions).write(out, normalize);
        Conditions::bracketed("right cond", &self.right_conditions).write(out, normalize);
        Conditions::bare("other cond", &self.other_conditions).write(out, normalize);
    }
}

impl ExplainOperator for HashJoin {
    fn name(&self) -> &'static str {
        "HashJoin"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        self.write(out, None);
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        self.write(out, Some(cx.in_list));

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Joined
    }
}

///
/// MergeJoin
///

#[derive(Clone, Debug, PartialEq)]
pub struct MergeJoin {
    pub join_type: JoinType,
    pub left_keys: Vec<Column>,
    pub right_keys: Vec<Column>,
    pub other_conditions: Vec<Expr>,
}

impl MergeJoin {
    #[must_use]
    pub const fn new(join_type: JoinType, left_keys: Vec<Column>, right_keys: Vec<Column>) -> Self {
        Self {
            join_type,
            left_keys,
            right_keys,
            other_conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_other_conditions(mut self, conditions: Vec<Expr>) -> Self {
        self.other_conditions = conditions;
        self
    }

    fn write(&self, out: &mut String, normalize: Option<InListPolicy>) {
        out.push_str(&self.join_type.to_string());
        write_keys(out, "left key", &self.left_keys);
        write_keys(out, "right key", &self.right_keys);
        Conditions::bare("other cond", &self.other_conditions).write(out, normalize);
    }
}

impl ExplainOperator for MergeJoin {
    fn name(&self) -> &'static str {
        "MergeJoin"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        self.write(out, None);
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        self.write(out, Some(cx.in_list));

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Joined
    }
}

///
/// IndexJoinKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexJoinKind {
    Lookup,
    Hash,
    Merge,
}

///
/// IndexJoin
///
/// The `Probe` child is the inner side read through an index per outer row.
///

#[derive(Clone, Debug, PartialEq)]
pub struct IndexJoin {
    pub kind: IndexJoinKind,
    pub join_type: JoinType,
    pub outer_keys: Vec<Column>,
    pub inner_keys: Vec<Column>,
    pub other_conditions: Vec<Expr>,
}

impl IndexJoin {
    #[must_use]
    pub const fn new(
        kind: IndexJoinKind,
        join_type: JoinType,
        outer_keys: Vec<Column>,
        inner_keys: Vec<Column>,
    ) -> Self {
        Self {
            kind,
            join_type,
            outer_keys,
            inner_keys,
            other_conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_other_conditions(mut self, conditions: Vec<Expr>) -> Self {
        self.other_conditions = conditions;
        self
    }

    fn write(&self, cx: &OperatorContext<'_>, out: &mut String, normalize: Option<InListPolicy>) {
        out.push_str(&self.join_type.to_string());
        let inner = cx
            .children
            .iter()
            .position(|child| child.role == Some(ChildRole::Probe))
            .and_then(|index| cx.child_label(index));
        if let Some(inner) = inner {
            out.push_str(", inner:");
            out.push_str(&inner);
        }
        write_keys(out, "outer key", &self.outer_keys);
        write_keys(out, "inner key", &self.inner_keys);
        Conditions::bare("other cond", &self.other_conditions).write(out, normalize);
    }
}

impl ExplainOperator for IndexJoin {
    fn name(&self) -> &'static str {
        match self.kind {
            IndexJoinKind::Lookup => "IndexJoin",
            IndexJoinKind::Hash => "IndexHashJoin",
            IndexJoinKind::Merge => "IndexMergeJoin",
        }
    }

    fn write_info(&self, cx: &OperatorContext<'_>, out: &mut String) {
        self.write(cx, out, None);
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        self.write(cx, out, Some(cx.in_list));

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Joined
    }
}

///
/// Apply
///
/// Correlated nested loop: the `Probe` side is re-run per `Build` row.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Apply {
    pub join_type: JoinType,
    pub equal: Vec<Expr>,
    pub other_conditions: Vec<Expr>,
}

impl Apply {
    #[must_use]
    pub const fn new(join_type: JoinType) -> Self {
        Self {
            join_type,
            equal: Vec::new(),
            other_conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_equal(mut self, conditions: Vec<Expr>) -> Self {
        self.equal = conditions;
        self
    }

    #[must_use]
    pub fn with_other_conditions(mut self, conditions: Vec<Expr>) -> Self {
        self.other_conditions = conditions;
        self
    }

    fn write(&self, out: &mut String, normalize: Option<InListPolicy>) {
        if self.equal.is_empty() {
            out.push_str("CARTESIAN ");
        }
        out.push_str(&self.join_type.to_string());
        Conditions::bracketed("equal", &self.equal).write(out, normalize);
        Conditions::bare("other cond", &self.other_conditions).write(out, normalize);
    }
}

impl ExplainOperator for Apply {
    fn name(&self) -> &'static str {
        "Apply"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        self.write(out, None);
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        self.write(out, Some(cx.in_list));

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Joined
    }
}
