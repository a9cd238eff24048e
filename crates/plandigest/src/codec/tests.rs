use super::{
    DecodeError, EncodeError, decode_normalized_plan, decode_plan, encode::encode_display,
    encode_plan,
};
use crate::{
    config::Config,
    plan::*,
    test_support::{
        JoinAlgo, col, cte_plan, executed_agg_plan, filtered_scan, insert_plan, join_plan,
        paging_plan,
    },
    view::{DisplayNode, DisplayRuntime, DisplayTree, display_tree},
};
use proptest::prelude::*;

fn encode(tree: &PlanTree) -> String {
    encode_plan(tree, &Config::default()).expect("plan should encode")
}

fn decode(text: &str) -> Result<DisplayTree, DecodeError> {
    decode_plan(text, &Config::default())
}

fn decoded_text(tree: &PlanTree) -> String {
    decode(&encode(tree))
        .expect("encoded plan should decode")
        .to_string()
}

fn expected_view(tree: &PlanTree) -> DisplayTree {
    display_tree(tree.root(), tree.ctes(), &Config::default(), true)
}

//
// Round trip
//

#[test]
fn decode_inverts_encode() {
    let trees = [
        paging_plan(960, true),
        join_plan(5, JoinAlgo::Hash, false),
        join_plan(5, JoinAlgo::Merge, true),
        cte_plan(1, 2),
        executed_agg_plan(),
        insert_plan(),
    ];

    for tree in &trees {
        let decoded = decode(&encode(tree)).expect("encoded plan should decode");
        assert_eq!(decoded, expected_view(tree));
    }
}

#[test]
fn encoded_plan_is_a_single_line() {
    let encoded = encode(&executed_agg_plan());

    assert!(encoded.starts_with("PD1;0||StreamAgg|1|root|1.00|"), "{encoded}");
    assert!(!encoded.contains('\n'), "{encoded}");
}

#[test]
fn decoded_executed_plan_keeps_runtime_stats() {
    let text = decoded_text(&executed_agg_plan());

    assert!(text.contains("time"), "{text}");
    assert!(text.contains("loops"), "{text}");
    assert!(text.contains("cop_task: {num: 1, max: 880µs}"), "{text}");
}

#[test]
fn decoded_insert_keeps_kind_and_runtime_stats() {
    let text = decoded_text(&insert_plan());

    assert!(text.contains("Insert"), "{text}");
    assert!(text.contains("time"), "{text}");
    assert!(text.contains("loops"), "{text}");
}

#[test]
fn decoded_cte_plan_shows_definition_and_remap() {
    let text = decoded_text(&cte_plan(1, 1));
    assert!(text.contains("CTE"), "{text}");
    assert!(text.contains("1->Column#1"), "{text}");
    assert!(text.contains("time"), "{text}");
    assert!(text.contains("loops"), "{text}");

    let text = decoded_text(&cte_plan(2, 1));
    assert!(text.contains("CTE"), "{text}");
    assert!(text.contains("2->Column#1"), "{text}");
}

#[test]
fn shared_cte_is_encoded_once_with_two_references() {
    let encoded = encode(&cte_plan(1, 2));

    assert_eq!(encoded.matches("|CTE_0|").count(), 1, "{encoded}");
    assert_eq!(encoded.matches("data:CTE_0").count(), 2, "{encoded}");
    assert!(encoded.contains("remap:1->Column#1"), "{encoded}");
    assert!(encoded.contains("remap:2->Column#1"), "{encoded}");

    let decoded = decode(&encoded).expect("encoded plan should decode");
    assert_eq!(decoded.roots.len(), 2);
    assert_eq!(decoded.roots[1].name, "CTE_0");
    assert_eq!(decoded.roots[1].children[0].role, Some(ChildRole::SeedPart));
}

#[test]
fn separators_inside_fields_survive() {
    let tricky = Expr::eq(
        col("t1", "name", 2),
        Expr::constant(Datum::String("a|b;c\\d".to_string())),
    );
    let tree = filtered_scan(tricky);
    let encoded = encode(&tree);

    assert!(encoded.contains("\\|b\\;c"), "{encoded}");
    assert_eq!(decode(&encoded).expect("decode"), expected_view(&tree));
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let encoded = format!("  {}\n", encode(&paging_plan(960, true)));

    assert!(decode(&encoded).is_ok());
}

#[test]
fn trailing_spaces_in_the_last_field_survive() {
    let tree = decode_normalized_plan("PN1;0||TableDual|root||rows:1  \r\n", &Config::default())
        .expect("normalized record should decode");
    assert_eq!(tree.roots[0].operator_info, "rows:1  ");

    let mut spilled = single_node("spill".to_string());
    spilled.roots[0].runtime = Some(DisplayRuntime {
        act_rows: "1".to_string(),
        disk: "8 Bytes ".to_string(),
        ..DisplayRuntime::default()
    });
    let encoded = encode_display(&spilled, &Config::default()).expect("small plan should encode");
    assert!(encoded.ends_with("8 Bytes "), "{encoded}");
    assert_eq!(decode(&encoded).expect("encoded plan should decode"), spilled);
}

//
// Encoder errors
//

#[test]
fn explain_wrapper_cannot_be_encoded() {
    let inner = paging_plan(960, true);
    let wrapped = PlanTree::new(PlanNode::new(Explain::new(true)).with_child(inner.root().clone()))
        .expect("wrapper should build");

    let err = encode_plan(&wrapped, &Config::default()).expect_err("wrapper should be rejected");
    assert_eq!(err, EncodeError::UnsupportedNodeKind { kind: "Explain" });

    assert!(encode_plan(&wrapped.into_target(), &Config::default()).is_ok());
}

#[test]
fn oversized_field_is_an_error_not_a_truncation() {
    let config = Config {
        max_field_bytes: 16,
        ..Config::default()
    };

    let err = encode_plan(&paging_plan(960, true), &config).expect_err("info exceeds 16 bytes");
    let EncodeError::EscapeOverflow(overflow) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(overflow.field, "operator info");
    assert_eq!(overflow.max, 16);
    assert!(overflow.len > 16);
}

// `nodes` operators in a single chain: limits over a one-row dual table.
fn limit_chain(nodes: usize) -> PlanTree {
    let mut node = PlanNode::new(TableDual::new(1)).with_est_rows(1.0);
    for _ in 1..nodes {
        node = PlanNode::new(Limit::new(0, 1))
            .with_est_rows(1.0)
            .with_child(node);
    }

    PlanTree::new(node).expect("chain should build")
}

#[test]
fn encoder_refuses_what_the_decoder_would_reject() {
    let shallow = Config {
        max_depth: 4,
        ..Config::default()
    };

    let deepest = encode_plan(&limit_chain(4), &shallow).expect("depth 3 is within the bound");
    assert!(decode_plan(&deepest, &shallow).is_ok());

    let err = encode_plan(&limit_chain(5), &shallow).expect_err("depth 4 exceeds the bound");
    assert_eq!(err, EncodeError::TooDeep { depth: 4, max: 4 });

    let err = encode_plan(&limit_chain(300), &Config::default()).expect_err("deep chain");
    assert_eq!(err, EncodeError::TooDeep { depth: 256, max: 256 });

    let small = Config {
        max_plan_bytes: 32,
        ..Config::default()
    };
    let err = encode_plan(&paging_plan(960, true), &small).expect_err("plan exceeds 32 bytes");
    assert_eq!(err, EncodeError::TooLong { max: 32 });
}

//
// Decoder errors
//

#[test]
fn truncated_input_is_rejected() {
    let encoded = encode(&paging_plan(960, true));
    let last = encoded.rfind(';').expect("plan has records");

    let err = decode(&encoded[..last + 4]).expect_err("cut record should fail");
    assert!(
        matches!(err, DecodeError::FieldCount { expected: 13, .. }),
        "unexpected error: {err:?}"
    );

    let err = decode("PD1").expect_err("header only should fail");
    assert_eq!(err, DecodeError::NoRecords);

    let err = decode("   ").expect_err("blank should fail");
    assert_eq!(err, DecodeError::Empty);
}

#[test]
fn every_prefix_decodes_or_fails_cleanly() {
    let encoded = encode(&cte_plan(1, 2));

    for (cut, _) in encoded.char_indices() {
        let _ = decode(&encoded[..cut]);
    }
}

#[test]
fn headers_are_checked() {
    let encoded = encode(&paging_plan(960, true));

    let err = decode(&encoded.replacen("PD1", "PD9", 1)).expect_err("future version");
    assert!(
        matches!(err, DecodeError::UnsupportedVersion { ref found, .. } if found == "PD9"),
        "unexpected error: {err:?}"
    );

    let err = decode(&encoded.replacen("PD1", "XYZ", 1)).expect_err("no header");
    assert_eq!(err, DecodeError::MissingHeader);

    let normalized = crate::normalize::normalize_plan(&paging_plan(960, true), &Config::default())
        .expect("plan should normalize");
    let err = decode(normalized.text()).expect_err("normalized text is not a concrete plan");
    assert!(
        matches!(err, DecodeError::UnsupportedVersion { .. }),
        "unexpected error: {err:?}"
    );
}

// One concrete record with empty runtime columns.
fn record(depth: &str, role: &str, name: &str, id: &str, est_rows: &str) -> String {
    format!(";{depth}|{role}|{name}|{id}|root|{est_rows}|||||||")
}

#[test]
fn garbled_records_are_rejected() {
    let root = record("0", "", "Limit", "1", "4.00");
    let cases = [
        (format!("PD1{root}{}", record("1", "Sideways", "Limit", "2", "")), "role"),
        (format!("PD1{root}{}", record("2", "", "Limit", "2", "")), "jump"),
        (format!("PD1{}", record("1", "", "Limit", "1", "")), "jump"),
        (format!("PD1{}", record("x", "", "Limit", "1", "")), "number"),
        (format!("PD1{}", record("0", "Build", "Limit", "1", "")), "root role"),
        (format!("PD1{}", record("0", "", "", "1", "")), "name"),
        (format!("PD1{}", record("0", "", "Limit", "one", "")), "number"),
        (format!("PD1{}", record("0", "", "Limit", "1", "many")), "number"),
        (format!("PD1{}", record("0", "", "Lim\\qit", "1", "")), "escape"),
        (format!("PD1{root}\\x4"), "unterminated"),
        (format!("PD1{root}\\"), "unterminated"),
        (format!("PD1{root}\\x41"), "escape"),
    ];

    for (input, what) in &cases {
        let err = decode(input).expect_err(what);
        let ok = match *what {
            "role" => matches!(err, DecodeError::UnknownRole { record: 2, .. }),
            "jump" => matches!(err, DecodeError::DepthJump { .. }),
            "number" => matches!(err, DecodeError::InvalidNumber { .. }),
            "root role" => matches!(err, DecodeError::RootWithRole { record: 1 }),
            "name" => matches!(err, DecodeError::MissingName { record: 1 }),
            "escape" => matches!(err, DecodeError::InvalidEscape { .. }),
            "unterminated" => matches!(err, DecodeError::UnterminatedEscape),
            _ => false,
        };
        assert!(ok, "{what}: unexpected error {err:?} for {input}");
    }

    let valid = format!("PD1{root}{}", record("1", "", "TableDual", "2", "1.00"));
    assert!(decode(&valid).is_ok());
}

#[test]
fn configured_bounds_are_enforced() {
    let encoded = encode(&paging_plan(960, true));

    let shallow = Config {
        max_depth: 2,
        ..Config::default()
    };
    let err = decode_plan(&encoded, &shallow).expect_err("depth 3 exceeds 2");
    assert!(
        matches!(err, DecodeError::TooDeep { depth: 2, max: 2, .. }),
        "unexpected error: {err:?}"
    );

    let small = Config {
        max_plan_bytes: 32,
        ..Config::default()
    };
    let err = decode_plan(&encoded, &small).expect_err("plan exceeds 32 bytes");
    assert!(matches!(err, DecodeError::TooLong { max: 32, .. }), "unexpected error: {err:?}");

    let narrow = Config {
        max_field_bytes: 8,
        ..Config::default()
    };
    let err = decode_plan(&encoded, &narrow).expect_err("info exceeds 8 bytes");
    assert!(matches!(err, DecodeError::FieldTooLong { max: 8, .. }), "unexpected error: {err:?}");
}

#[test]
fn normalized_decoder_rejects_concrete_plans() {
    let encoded = encode(&paging_plan(960, true));

    let err = decode_normalized_plan(&encoded, &Config::default()).expect_err("wrong layout");
    assert!(
        matches!(err, DecodeError::UnsupportedVersion { expected: "PN1", .. }),
        "unexpected error: {err:?}"
    );
}

//
// Properties
//

fn single_node(info: String) -> DisplayTree {
    let mut node = DisplayNode::new("Selection", None);
    node.id = Some(1);
    node.task = "root".to_string();
    node.est_rows = "1.00".to_string();
    node.operator_info = info;

    DisplayTree { roots: vec![node] }
}

proptest! {
    #[test]
    fn arbitrary_input_never_panics(input in ".{0,256}") {
        let _ = decode(&input);
        let _ = decode_normalized_plan(&input, &Config::default());
    }

    #[test]
    fn arbitrary_records_never_panic(body in "[0-9a-zA-Z|;\\\\ ]{0,128}") {
        let _ = decode(&format!("PD1;{body}"));
    }

    #[test]
    fn any_field_text_round_trips(info in any::<String>()) {
        let tree = single_node(info);
        let encoded = encode_display(&tree, &Config::default()).expect("small plan should encode");
        let decoded = decode(&encoded).expect("encoded plan should decode");

        prop_assert_eq!(decoded, tree);
    }
}
