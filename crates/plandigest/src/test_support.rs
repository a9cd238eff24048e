//! Plan fixtures shared by unit tests across modules.

use crate::plan::*;
use std::time::Duration;

pub(crate) const COP: TaskType = TaskType::Cop(StoreType::TiKv);

pub(crate) fn t1() -> TableRef {
    TableRef::new("test", "t1")
}

pub(crate) fn col(table: &str, column: &str, id: u64) -> Expr {
    Expr::column(Column::named(id, "test", table, column))
}

/// `select * from t1 where <predicate>` as a table reader over a pushed-down
/// selection on a full scan.
pub(crate) fn filtered_scan(predicate: Expr) -> PlanTree {
    PlanTree::new(filtered_reader(t1(), predicate, 10_000.0)).expect("fixture should build")
}

pub(crate) fn filtered_reader(table: TableRef, predicate: Expr, rows: f64) -> PlanNode {
    PlanNode::new(TableReader::new())
        .with_est_rows(rows / 3.0)
        .with_child(
            PlanNode::new(Selection::new(vec![predicate]))
                .with_task(COP)
                .with_est_rows(rows / 3.0)
                .with_child(
                    PlanNode::new(TableScan::full(table).with_pseudo_stats())
                        .with_task(COP)
                        .with_est_rows(rows),
                ),
        )
}

///
/// JoinAlgo
///

#[derive(Clone, Copy, Debug)]
pub(crate) enum JoinAlgo {
    Hash,
    Merge,
}

/// `t1 join t2 on t1.a = t2.a where t1.c > <literal>`.
pub(crate) fn join_plan(literal: i64, algo: JoinAlgo, swap_sides: bool) -> PlanTree {
    let left = filtered_reader(
        t1(),
        Expr::gt(col("t1", "c", 3), Expr::constant(literal)),
        10_000.0,
    );
    let right = PlanNode::new(TableReader::new())
        .with_est_rows(10_000.0)
        .with_child(
            PlanNode::new(TableScan::full(TableRef::new("test", "t2")))
                .with_task(COP)
                .with_est_rows(10_000.0),
        );

    let join = match algo {
        JoinAlgo::Hash => PlanNode::new(HashJoin::new(
            JoinType::Inner,
            vec![Expr::eq(col("t1", "a", 1), col("t2", "a", 4))],
        )),
        JoinAlgo::Merge => PlanNode::new(MergeJoin::new(
            JoinType::Inner,
            vec![Column::named(1, "test", "t1", "a")],
            vec![Column::named(4, "test", "t2", "a")],
        )),
    }
    .with_est_rows(12_487.5);

    let join = if swap_sides {
        join.with_build(right).with_probe(left)
    } else {
        join.with_build(left).with_probe(right)
    };

    PlanTree::new(join).expect("fixture should build")
}

/// The index-lookup plan a `limit` query picks when the storage layer pages.
pub(crate) fn paging_plan(limit: u64, paging: bool) -> PlanTree {
    let table = TableRef::new("test", "t");
    let index = IndexRef::new("i", ["c1"]);
    let id = col("t", "id", 1);
    let c2 = col("t", "c2", 3);

    let lookup = PlanNode::new(IndexLookUp::new().with_paging(paging))
        .with_est_rows(4.0)
        .with_build(
            PlanNode::new(Selection::new(vec![Expr::le(id, Expr::constant(1024))]))
                .with_task(COP)
                .with_est_rows(1024.0)
                .with_child(
                    PlanNode::new(
                        IndexScan::range(
                            table.clone(),
                            index,
                            vec![Range::closed(vec![Datum::Int(0)], vec![Datum::Int(1024)])],
                        )
                        .keep_order(false),
                    )
                    .with_task(COP)
                    .with_est_rows(1024.0),
                ),
        )
        .with_probe(
            PlanNode::new(Selection::new(vec![Expr::in_list(
                c2,
                vec![
                    Expr::constant(2),
                    Expr::constant(4),
                    Expr::constant(6),
                    Expr::constant(8),
                ],
            )]))
            .with_task(COP)
            .with_est_rows(4.0)
            .with_child(
                PlanNode::new(TableScan::row_id(table))
                    .with_task(COP)
                    .with_est_rows(1024.0),
            ),
        );

    let root = PlanNode::new(Limit::new(0, limit))
        .with_est_rows(4.0)
        .with_child(lookup);

    PlanTree::new(root).expect("fixture should build")
}

/// `with cte(a) as (select <value>) select * from cte`, optionally read from
/// two sites.
pub(crate) fn cte_plan(value: i64, references: usize) -> PlanTree {
    let mut builder = PlanTreeBuilder::new();
    let body = PlanNode::new(Projection::new(vec![ProjectionItem::into_column(
        Expr::constant(value),
        Column::generated(1),
    )]))
    .with_est_rows(1.0)
    .with_runtime(RuntimeStats::new(Duration::from_micros(35), 1, 1))
    .with_child(
        PlanNode::new(TableDual::new(1))
            .with_est_rows(1.0)
            .with_runtime(RuntimeStats::new(Duration::from_micros(3), 1, 1)),
    );
    let cte = builder.register_cte(CteDefinition::new(body));

    let reader = |position: usize| {
        PlanNode::new(
            CteReader::new(cte, "cte")
                .with_remap(vec![ColumnRemap::new(position, Column::generated(1))]),
        )
        .with_est_rows(1.0)
        .with_runtime(RuntimeStats::new(Duration::from_micros(120), 1, 1).with_memory(244))
    };

    let root = if references < 2 {
        reader(1)
    } else {
        let mut union = PlanNode::new(Union).with_est_rows(2.0);
        for position in 1..=references {
            union = union.with_child(reader(position));
        }
        union
    };

    builder.finish(root).expect("fixture should build")
}

/// `insert into t1 values (1,1,1)` after execution.
pub(crate) fn insert_plan() -> PlanTree {
    let root = PlanNode::new(Dml::new(DmlKind::Insert, t1()))
        .with_runtime(RuntimeStats::new(Duration::from_micros(410), 1, 0).with_memory(1_638));

    PlanTree::new(root).expect("fixture should build")
}

/// `select max(a) from t1 where a > 0` after execution.
pub(crate) fn executed_agg_plan() -> PlanTree {
    let a = Column::named(1, "test", "t1", "a");
    let root = PlanNode::new(Aggregation::new(
        AggMode::Stream,
        Vec::new(),
        vec![AggFunc::new("max", vec![Expr::column(a.clone())]).into_column(Column::generated(4))],
    ))
    .with_est_rows(1.0)
    .with_runtime(RuntimeStats::new(Duration::from_micros(1_250), 2, 1))
    .with_child(
        PlanNode::new(TableReader::new())
            .with_est_rows(3.0)
            .with_runtime(
                RuntimeStats::new(Duration::from_micros(980), 2, 3)
                    .with_memory(312)
                    .with_detail("cop_task: {num: 1, max: 880µs}"),
            )
            .with_child(
                PlanNode::new(TableScan::range(t1(), vec![Range::greater_than(0_i64)]))
                    .with_task(COP)
                    .with_est_rows(3.0)
                    .with_runtime(RuntimeStats::new(Duration::from_micros(410), 1, 3)),
            ),
    );

    PlanTree::new(root).expect("fixture should build")
}

/// `select * from tt where a+1 = <key> and b = <b>` served by the expression
/// index `k1((a+1), b)`.
pub(crate) fn expression_index_lookup(key: i64, b: i64) -> PlanTree {
    let table = TableRef::new("test", "tt");
    let index = IndexRef::new("k1", ["`a` + 1", "b"]);
    let bound = vec![Datum::Int(key), Datum::Int(b)];

    let lookup = PlanNode::new(IndexLookUp::new())
        .with_est_rows(0.1)
        .with_build(
            PlanNode::new(
                IndexScan::range(table.clone(), index, vec![Range::closed(bound.clone(), bound)])
                    .with_pseudo_stats(),
            )
            .with_task(COP)
            .with_est_rows(0.1),
        )
        .with_probe(
            PlanNode::new(TableScan::row_id(table).with_pseudo_stats())
                .with_task(COP)
                .with_est_rows(0.1),
        );

    let root = PlanNode::new(Projection::new(vec![
        ProjectionItem::pass(col("tt", "a", 1)),
        ProjectionItem::pass(col("tt", "b", 2)),
    ]))
    .with_est_rows(0.1)
    .with_child(lookup);

    PlanTree::new(root).expect("fixture should build")
}

/// `select b from t1 where concat(a, b) >= <low> and a = <a>` covered by
/// `idx2(a, (concat(a, b)), b)`.
pub(crate) fn expression_index_reader(a: &str, low: &str) -> PlanTree {
    let index = IndexRef::new("idx2", ["a", "concat(`a`, `b`)", "b"]);
    let range = Range::closed(
        vec![Datum::from(a), Datum::from(low)],
        vec![Datum::from(a), Datum::MaxValue],
    );

    let root = PlanNode::new(Projection::new(vec![ProjectionItem::pass(col("t1", "b", 2))]))
        .with_est_rows(33.33)
        .with_child(
            PlanNode::new(IndexReader).with_est_rows(33.33).with_child(
                PlanNode::new(IndexScan::range(t1(), index, vec![range]).with_pseudo_stats())
                    .with_task(COP)
                    .with_est_rows(33.33),
            ),
        );

    PlanTree::new(root).expect("fixture should build")
}
