use super::{ExplainFormat, explain_plan};
use crate::{
    config::Config,
    plan::{ChildRole, Explain, PlanNode, PlanTree},
    test_support::{
        cte_plan, executed_agg_plan, expression_index_lookup, expression_index_reader,
        paging_plan,
    },
};

fn brief(tree: &PlanTree) -> Vec<String> {
    explain_plan(tree, ExplainFormat::Brief, &Config::default())
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn brief_explain_marks_paging_lookups() {
    assert_eq!(
        brief(&paging_plan(960, true)),
        [
            "Limit 4.00 root  offset:0, count:960",
            "└─IndexLookUp 4.00 root  paging:true",
            "  ├─Selection(Build) 1024.00 cop[tikv]  le(test.t.id, 1024)",
            "  │ └─IndexRangeScan 1024.00 cop[tikv] table:t, index:i(c1) range:[0,1024], keep order:true",
            "  └─Selection(Probe) 4.00 cop[tikv]  in(test.t.c2, 2, 4, 6, 8)",
            "    └─TableRowIDScan 1024.00 cop[tikv] table:t keep order:false",
        ]
    );
}

#[test]
fn brief_explain_leaves_unpaged_lookup_info_empty() {
    assert_eq!(
        brief(&paging_plan(961, false)),
        [
            "Limit 4.00 root  offset:0, count:961",
            "└─IndexLookUp 4.00 root  ",
            "  ├─Selection(Build) 1024.00 cop[tikv]  le(test.t.id, 1024)",
            "  │ └─IndexRangeScan 1024.00 cop[tikv] table:t, index:i(c1) range:[0,1024], keep order:true",
            "  └─Selection(Probe) 4.00 cop[tikv]  in(test.t.c2, 2, 4, 6, 8)",
            "    └─TableRowIDScan 1024.00 cop[tikv] table:t keep order:false",
        ]
    );
}

#[test]
fn row_format_numbers_nodes_in_pre_order() {
    let out = explain_plan(&paging_plan(960, true), ExplainFormat::Row, &Config::default());
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "id\testRows\ttask\taccess object\toperator info");
    assert!(lines[1].starts_with("Limit_1\t4.00\troot"), "{}", lines[1]);
    assert!(lines[2].starts_with("└─IndexLookUp_2\t"), "{}", lines[2]);
    assert!(
        lines[6].starts_with("    └─TableRowIDScan_6\t"),
        "{}",
        lines[6]
    );
}

#[test]
fn verbose_format_adds_cost_column() {
    let out = explain_plan(&paging_plan(960, true), ExplainFormat::Verbose, &Config::default());
    let header = out.lines().next().expect("verbose output should have a header");

    assert_eq!(
        header,
        "id\testRows\testCost\ttask\taccess object\toperator info"
    );
}

#[test]
fn runtime_columns_appear_once_any_node_ran() {
    let out = explain_plan(&executed_agg_plan(), ExplainFormat::Row, &Config::default());
    let mut lines = out.lines();

    let header = lines.next().expect("row output should have a header");
    assert!(header.ends_with("actRows\texecution info\tmemory\tdisk"), "{header}");

    let reader = lines.nth(1).expect("reader row should exist");
    assert!(reader.contains("data:TableRangeScan_3"), "{reader}");
    assert!(reader.contains("time:980.0µs, loops:2"), "{reader}");
    assert!(reader.contains("312 Bytes"), "{reader}");
}

#[test]
fn cte_body_renders_once_after_main_tree() {
    let tree = cte_plan(1, 2);
    let rows = brief(&tree);

    assert!(rows[0].starts_with("Union 2.00 root  "), "{}", rows[0]);
    assert!(rows[1].starts_with("├─CTEFullScan 1.00 root CTE:cte data:CTE_0, remap:1->Column#1"));
    assert!(rows[2].starts_with("└─CTEFullScan 1.00 root CTE:cte data:CTE_0, remap:2->Column#1"));
    assert!(rows[3].starts_with("CTE_0 1.00 root  Non-Recursive CTE"), "{}", rows[3]);
    assert!(rows[4].starts_with("└─Projection(Seed Part) 1.00 root  1->Column#1"), "{}", rows[4]);
    assert_eq!(rows.iter().filter(|row| row.starts_with("CTE_")).count(), 1);
}

#[test]
fn explain_renders_the_wrapped_target() {
    let inner = paging_plan(960, true);
    let root = PlanNode::new(Explain::new(false)).with_child(inner.root().clone());
    let wrapped = PlanTree::new(root).expect("explain wrapper should build");

    let rows = brief(&wrapped);
    assert_eq!(rows[0], "Limit 4.00 root  offset:0, count:960");
    assert_eq!(rows.len(), 6);
}

#[test]
fn display_tree_keeps_roles_and_nesting() {
    let tree = paging_plan(960, true);
    let view = super::display_tree(tree.root(), tree.ctes(), &Config::default(), true);

    let lookup = &view.roots[0].children[0];
    assert_eq!(lookup.name, "IndexLookUp");
    assert_eq!(lookup.children[0].role, Some(ChildRole::Build));
    assert_eq!(lookup.children[1].role, Some(ChildRole::Probe));
    assert_eq!(lookup.children[1].children[0].name, "TableRowIDScan");
    assert_eq!(view.nodes().len(), 6);
}

#[test]
fn brief_explain_lists_expression_index_key_parts() {
    assert_eq!(
        brief(&expression_index_lookup(5, 3)),
        [
            "Projection 0.10 root  test.tt.a, test.tt.b",
            "└─IndexLookUp 0.10 root  ",
            "  ├─IndexRangeScan(Build) 0.10 cop[tikv] table:tt, index:k1(`a` + 1, b) range:[5 3,5 3], keep order:false, stats:pseudo",
            "  └─TableRowIDScan(Probe) 0.10 cop[tikv] table:tt keep order:false, stats:pseudo",
        ]
    );

    assert_eq!(
        brief(&expression_index_reader("b", "aa")),
        [
            "Projection 33.33 root  test.t1.b",
            "└─IndexReader 33.33 root  index:IndexRangeScan",
            "  └─IndexRangeScan 33.33 cop[tikv] table:t1, index:idx2(a, concat(`a`, `b`), b) range:[\"b\" \"aa\",\"b\" +inf], keep order:false, stats:pseudo",
        ]
    );
}

#[test]
fn undefined_cte_renders_as_a_bodiless_root() {
    let tree = cte_plan(1, 2);
    let view = super::display_tree(tree.root(), &[], &Config::default(), true);

    assert_eq!(view.roots.len(), 2);
    assert_eq!(view.roots[1].name, "CTE_0");
    assert_eq!(view.roots[1].operator_info, "definition missing");
    assert!(view.roots[1].children.is_empty());
}
