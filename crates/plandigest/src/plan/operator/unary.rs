use super::{ChildShape, ExplainOperator, OperatorContext};
use crate::{
    normalize::NormalizeError,
    plan::{
        AggFunc, Column, Expr, SortItem,
        expr::{normalized_conditions, write_display_joined, write_joined},
    },
};
use std::fmt::Write as _;

///
/// Selection
///

#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub conditions: Vec<Expr>,
}

impl Selection {
    #[must_use]
    pub const fn new(conditions: Vec<Expr>) -> Self {
        Self { conditions }
    }
}

impl ExplainOperator for Selection {
    fn name(&self) -> &'static str {
        "Selection"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        write_display_joined(out, &self.conditions, ", ");
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        out.push_str(&normalized_conditions(&self.conditions, cx.in_list).join(", "));

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// ProjectionItem
///
/// One output expression; `output` names the generated column it lands in
/// (`1->Column#1`). Plain column pass-through leaves it unset.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionItem {
    pub expr: Expr,
    pub output: Option<Column>,
}

impl ProjectionItem {
    #[must_use]
    pub const fn pass(expr: Expr) -> Self {
        Self { expr, output: None }
    }

    #[must_use]
    pub const fn into_column(expr: Expr, output: Column) -> Self {
        Self {
            expr,
            output: Some(output),
        }
    }
}

///
/// Projection
///

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub items: Vec<ProjectionItem>,
}

impl Projection {
    #[must_use]
    pub const fn new(items: Vec<ProjectionItem>) -> Self {
        Self { items }
    }
}

impl ExplainOperator for Projection {
    fn name(&self) -> &'static str {
        "Projection"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        write_joined(out, &self.items, ", ", |out, item| {
            let _ = write!(out, "{}", item.expr);
            if let Some(output) = &item.output {
                let _ = write!(out, "->{output}");
            }
        });
    }

    // Output order is structural: projections are never sorted.
    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        write_joined(out, &self.items, ", ", |out, item| {
            item.expr.write_normalized(out, cx.in_list);
            if let Some(output) = &item.output {
                let _ = write!(out, "->{output}");
            }
        });

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// AggMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggMode {
    Hash,
    Stream,
}

///
/// Aggregation
///

#[derive(Clone, Debug, PartialEq)]
pub struct Aggregation {
    pub mode: AggMode,
    pub group_by: Vec<Expr>,
    pub funcs: Vec<AggFunc>,
}

impl Aggregation {
    #[must_use]
    pub const fn new(mode: AggMode, group_by: Vec<Expr>, funcs: Vec<AggFunc>) -> Self {
        Self {
            mode,
            group_by,
            funcs,
        }
    }
}

impl ExplainOperator for Aggregation {
    fn name(&self) -> &'static str {
        match self.mode {
            AggMode::Hash => "HashAgg",
            AggMode::Stream => "StreamAgg",
        }
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        if !self.group_by.is_empty() {
            out.push_str("group by:");
            write_display_joined(out, &self.group_by, ", ");
            out.push_str(", ");
        }
        out.push_str("funcs:");
        write_display_joined(out, &self.funcs, ", ");
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        if !self.group_by.is_empty() {
            out.push_str("group by:");
            write_joined(out, &self.group_by, ", ", |out, expr| {
                expr.write_normalized(out, cx.in_list);
            });
            out.push_str(", ");
        }
        out.push_str("funcs:");
        write_joined(out, &self.funcs, ", ", |out, func| {
            func.write_normalized(out, cx.in_list);
        });

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// TopN
///

#[derive(Clone, Debug, PartialEq)]
pub struct TopN {
    pub by: Vec<SortItem>,
    pub offset: u64,
    pub count: u64,
}

impl TopN {
    #[must_use]
    pub const fn new(by: Vec<SortItem>, offset: u64, count: u64) -> Self {
        Self { by, offset, count }
    }
}

impl ExplainOperator for TopN {
    fn name(&self) -> &'static str {
        "TopN"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        write_display_joined(out, &self.by, ", ");
        let _ = write!(out, ", offset:{}, count:{}", self.offset, self.count);
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        write_joined(out, &self.by, ", ", |out, item| {
            item.write_normalized(out, cx.in_list);
        });
        out.push_str(", offset:?, count:?");

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// Limit
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Limit {
    pub offset: u64,
    pub count: u64,
}

impl Limit {
    #[must_use]
    pub const fn new(offset: u64, count: u64) -> Self {
        Self { offset, count }
    }
}

impl ExplainOperator for Limit {
    fn name(&self) -> &'static str {
        "Limit"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        let _ = write!(out, "offset:{}, count:{}", self.offset, self.count);
    }

    fn write_normalized_info(
        &self,
        _cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        out.push_str("offset:?, count:?");

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// Sort
///

#[derive(Clone, Debug, PartialEq)]
pub struct Sort {
    pub by: Vec<SortItem>,
}

impl Sort {
    #[must_use]
    pub const fn new(by: Vec<SortItem>) -> Self {
        Self { by }
    }
}

impl ExplainOperator for Sort {
    fn name(&self) -> &'static str {
        "Sort"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        write_display_joined(out, &self.by, ", ");
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        write_joined(out, &self.by, ", ", |out, item| {
            item.write_normalized(out, cx.in_list);
        });

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// MaxOneRow
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MaxOneRow;

impl ExplainOperator for MaxOneRow {
    fn name(&self) -> &'static str {
        "MaxOneRow"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, _out: &mut String) {}

    fn write_normalized_info(
        &self,
        _cx: &OperatorContext<'_>,
        _out: &mut String,
    ) -> Result<(), NormalizeError> {
        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// Union
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Union;

impl ExplainOperator for Union {
    fn name(&self) -> &'static str {
        "Union"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, _out: &mut String) {}

    fn write_normalized_info(
        &self,
        _cx: &OperatorContext<'_>,
        _out: &mut String,
    ) -> Result<(), NormalizeError> {
        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::AtLeastOne
    }
}
