//! Tests for start-node selection, branch resolution, cycle truncation and the tree wire format.
mod common;
use common::*;
use keyweave::action::{ActionElement, Branch};
use keyweave::compiler::{MAX_PATH_DEPTH, compile};
use keyweave::prelude::*;
use serde_json::json;

fn compile_snapshot(snapshot: GraphSnapshot) -> Compilation {
    Compiler::builder(snapshot)
        .build()
        .compile_with_diagnostics()
        .expect("Failed to compile")
}

#[test]
fn test_single_key_element_has_null_children() {
    let snapshot = snapshot(vec![node("a", key(65, "A"))], vec![]);
    let compilation = compile_snapshot(snapshot);

    assert_eq!(compilation.tree.header.elements_key, "A");
    assert_eq!(compilation.tree.header.elements_code, 65);
    assert!(compilation.tree.children.is_none());
    assert!(compilation.warnings.is_empty());

    let value = serde_json::to_value(&compilation.tree).expect("Failed to serialize");
    assert_eq!(value["children"], serde_json::Value::Null);
}

#[test]
fn test_empty_graph_fails() {
    let result = compile(&GraphSnapshot::default());
    assert_eq!(result.err(), Some(CompileError::EmptyGraph));
}

#[test]
fn test_skill_start_node_fails() {
    let snapshot = snapshot(
        vec![node("s", skill("Fireball")), node("a", key(65, "A"))],
        vec![yes("e1", "s", "a")],
    );
    let result = Compiler::builder(snapshot).build().compile();

    match result.err().unwrap() {
        CompileError::StartNotKeyElement { node_id, found } => {
            assert_eq!(node_id, "s");
            assert_eq!(found, "skill");
        }
        _ => panic!("Expected StartNotKeyElement error"),
    }
}

#[test]
fn test_two_cycle_is_truncated() {
    // A --y--> B --n--> A
    let snapshot = snapshot(
        vec![node("a", key(65, "A")), node("b", skill("Heal"))],
        vec![yes("e1", "a", "b"), no("e2", "b", "a")],
    );
    let compilation = compile_snapshot(snapshot);

    assert_eq!(compilation.tree.header.elements_key, "A");
    let children = compilation.tree.children.expect("A should have children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].branch, Branch::Yes);
    assert!(children[0].children.is_none());
    match &children[0].element {
        ActionElement::Skill(s) => assert_eq!(s.skill_name, "Heal"),
        other => panic!("Expected a skill action, got {:?}", other),
    }

    assert!(compilation.warnings.contains(&CompileWarning::NoStartCandidate {
        chosen: "a".to_string()
    }));
    assert!(compilation.warnings.contains(&CompileWarning::CycleTruncated {
        edge_id: "e2".to_string(),
        from: "b".to_string(),
        to: "a".to_string(),
    }));
}

#[test]
fn test_branch_follows_source_port() {
    let snapshot = snapshot(
        vec![
            node("a", key(65, "A")),
            node("c", sampled_color("100,200", Rgb::new(1, 2, 3))),
            node("hit", skill("Strike")),
            node("miss", time(TimeKind::Delay, Some(50))),
        ],
        vec![
            yes("e1", "a", "c"),
            yes("e2", "c", "hit"),
            no("e3", "c", "miss"),
        ],
    );
    let tree = compile_snapshot(snapshot).tree;

    let color = &tree.children.as_ref().unwrap()[0];
    let branches: Vec<Branch> = color
        .children
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.branch)
        .collect();
    assert_eq!(branches, vec![Branch::Yes, Branch::No]);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn test_multiple_start_candidates_pick_first_in_node_order() {
    let snapshot = snapshot(
        vec![node("first", key(1, "F1")), node("second", key(2, "F2"))],
        vec![],
    );
    let compilation = compile_snapshot(snapshot);

    assert_eq!(compilation.tree.header.elements_key, "F1");
    assert_eq!(
        compilation.warnings,
        vec![CompileWarning::MultipleStartCandidates {
            chosen: "first".to_string(),
            candidates: vec!["first".to_string(), "second".to_string()],
        }]
    );
}

#[test]
fn test_dangling_edge_is_skipped() {
    let snapshot = snapshot(
        vec![node("a", key(65, "A"))],
        vec![yes("ghost", "a", "missing")],
    );
    let compilation = compile_snapshot(snapshot);

    assert!(compilation.tree.children.is_none());
    assert!(matches!(
        compilation.warnings.as_slice(),
        [CompileWarning::DanglingEdge { edge_id, .. }] if edge_id == "ghost"
    ));
}

#[test]
fn test_shared_successor_appears_on_every_path() {
    // a -> b -> d and a -> c -> d
    let snapshot = snapshot(
        vec![
            node("a", key(65, "A")),
            node("b", skill("B")),
            node("c", skill("C")),
            node("d", key(68, "D")),
        ],
        vec![
            yes("e1", "a", "b"),
            yes("e2", "a", "c"),
            yes("e3", "b", "d"),
            yes("e4", "c", "d"),
        ],
    );
    let compilation = compile_snapshot(snapshot);

    assert!(compilation.warnings.is_empty());
    assert_eq!(compilation.tree.len(), 5);
}

#[test]
fn test_stacked_diamonds_duplicate_each_shared_tail() {
    // a -> b|c -> d -> e|f -> g
    let snapshot = snapshot(
        vec![
            node("a", key(65, "A")),
            node("b", skill("B")),
            node("c", skill("C")),
            node("d", key(68, "D")),
            node("e", skill("E")),
            node("f", skill("F")),
            node("g", key(71, "G")),
        ],
        vec![
            yes("e1", "a", "b"),
            no("e2", "a", "c"),
            yes("e3", "b", "d"),
            yes("e4", "c", "d"),
            yes("e5", "d", "e"),
            no("e6", "d", "f"),
            yes("e7", "e", "g"),
            yes("e8", "f", "g"),
        ],
    );
    let tree = compile_snapshot(snapshot).tree;

    // One header, b and c, d twice, e and f under each d, g under each of those.
    assert_eq!(tree.len(), 1 + 2 + 2 + 4 + 4);
    assert_eq!(tree.depth(), 5);
}

fn chain(length: usize) -> GraphSnapshot {
    let nodes = (0..length)
        .map(|i| node(&format!("n{}", i), key(65, "A")))
        .collect();
    let edges = (1..length)
        .map(|i| yes(&format!("e{}", i), &format!("n{}", i - 1), &format!("n{}", i)))
        .collect();
    snapshot(nodes, edges)
}

#[test]
fn test_long_chain_compiles_up_to_depth_limit() {
    let tree = compile(&chain(MAX_PATH_DEPTH)).expect("Failed to compile chain");

    assert_eq!(tree.len(), MAX_PATH_DEPTH);
    assert_eq!(tree.depth(), MAX_PATH_DEPTH);
}

#[test]
fn test_chain_past_depth_limit_fails() {
    let result = compile(&chain(5000));

    assert!(result.is_err());
    match result.err().unwrap() {
        CompileError::PathTooDeep { node_id, limit } => {
            assert_eq!(limit, MAX_PATH_DEPTH);
            assert_eq!(node_id, format!("n{}", MAX_PATH_DEPTH));
        }
        other => panic!("Expected PathTooDeep error, got {:?}", other),
    }
}

#[test]
fn test_time_actions_carry_engine_codes() {
    let reset = Payload::TimeEvent(TimeEvent {
        kind: TimeKind::ResetTimer,
        amount: None,
        timer_name: Some("buff".to_string()),
        timer_id: Some("t1".to_string()),
        initializes: None,
    });
    let snapshot = snapshot(
        vec![
            node("a", key(65, "A")),
            node("timer", configured_timer("buff", "t1", 3000)),
            node("reset", reset),
            node("stamina", time(TimeKind::Stamina, Some(40))),
        ],
        vec![
            yes("e1", "a", "timer"),
            yes("e2", "timer", "reset"),
            yes("e3", "reset", "stamina"),
        ],
    );
    let tree = compile_snapshot(snapshot).tree;
    let value = serde_json::to_value(&tree).expect("Failed to serialize");

    let timer = &value["children"][0];
    assert_eq!(
        timer["element"],
        json!({"id": "t1", "name": "buff", "t": 2, "n": 3000, "init": false})
    );
    assert_eq!(timer["iyn"], "y");
    let reset = &timer["children"][0];
    assert_eq!(reset["element"], json!({"id": "t1", "name": "buff", "t": 4, "n": 0}));
    assert_eq!(reset["children"][0]["element"]["t"], 3);
    assert_eq!(reset["children"][0]["element"]["n"], 40);
}

#[test]
fn test_tree_wire_format() {
    let tree = compile(&create_simple_snapshot()).expect("Failed to compile");
    let value = serde_json::to_value(&tree).expect("Failed to serialize");

    assert_eq!(
        value,
        json!({
            "header": {"elements_key": "A", "elements_code": 65, "key_up_delay": 0},
            "children": [{
                "element": {"id": "", "t": 1, "n": 1000},
                "iyn": "y",
                "children": null
            }]
        })
    );

    let parsed: ActionTree = serde_json::from_value(value).expect("Failed to parse tree");
    assert_eq!(parsed, tree);
}

/// The record shapes the automation engine parses a tree into.
mod engine {
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub struct Element {
        pub elements_key: String,
        pub elements_code: u32,
    }

    #[derive(Deserialize)]
    pub struct Skill {
        pub skill_code: u32,
    }

    #[derive(Deserialize)]
    pub struct TimeOrNama {
        pub id: String,
        pub t: u32,
        pub n: u32,
    }

    #[derive(Deserialize)]
    pub struct Color {
        pub coordinate: String,
        pub rgb: String,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub enum ElementEnum {
        Element(Element),
        Skill(Skill),
        TimeOrNama(TimeOrNama),
        Color(Color),
    }

    #[derive(Deserialize)]
    pub struct Children {
        pub element: ElementEnum,
        pub iyn: String,
        pub children: Option<Vec<Children>>,
    }

    #[derive(Deserialize)]
    pub struct Elements {
        pub header: Element,
        pub children: Option<Vec<Children>>,
    }
}

#[test]
fn test_engine_parses_compiled_tree() {
    let heal = Payload::Skill(Skill {
        name: "Heal".to_string(),
        code: vec![7],
        skill_type: 1,
        offset: 0,
    });
    let snapshot = snapshot(
        vec![
            node("a", key(65, "A")),
            node("d", time(TimeKind::Delay, Some(500))),
            node("s", time(TimeKind::Stamina, None)),
            node("h", heal),
            node("c", sampled_color("10,20", Rgb::new(255, 0, 0))),
        ],
        vec![
            yes("e1", "a", "d"),
            yes("e2", "d", "s"),
            no("e3", "s", "h"),
            yes("e4", "s", "c"),
        ],
    );
    let json = compile(&snapshot)
        .expect("Failed to compile")
        .to_json()
        .expect("Failed to serialize");

    let parsed: Vec<engine::Elements> =
        serde_json::from_str(&format!("[{}]", json)).expect("Failed to parse as engine records");
    assert_eq!(parsed[0].header.elements_key, "A");
    assert_eq!(parsed[0].header.elements_code, 65);

    let delay = &parsed[0].children.as_deref().expect("Failed to find delay")[0];
    assert_eq!(delay.iyn, "y");
    match &delay.element {
        engine::ElementEnum::TimeOrNama(t) => assert_eq!((t.id.as_str(), t.t, t.n), ("", 1, 500)),
        _ => panic!("Expected a time record for the delay"),
    }

    let stamina = &delay.children.as_deref().expect("Failed to find stamina")[0];
    match &stamina.element {
        engine::ElementEnum::TimeOrNama(t) => assert_eq!((t.t, t.n), (3, 0)),
        _ => panic!("Expected a time record for the stamina check"),
    }

    let branches = stamina.children.as_deref().expect("Failed to find branches");
    assert_eq!(branches.len(), 2);
    for branch in branches {
        match (&branch.element, branch.iyn.as_str()) {
            (engine::ElementEnum::Skill(s), "n") => assert_eq!(s.skill_code, 7),
            (engine::ElementEnum::Color(c), "y") => {
                assert_eq!(c.coordinate, "10,20");
                assert_eq!(c.rgb, "255,0,0");
            }
            _ => panic!("Unexpected branch under the stamina check"),
        }
    }
}

#[test]
fn test_compilation_is_deterministic() {
    let snapshot = snapshot(
        vec![node("a", key(65, "A")), node("b", skill("B")), node("c", skill("C"))],
        vec![yes("e1", "a", "b"), no("e2", "a", "c"), yes("e3", "b", "a")],
    );
    let compiler = Compiler::builder(snapshot).build();

    let first = compiler.compile_with_diagnostics().expect("Failed to compile");
    let second = compiler.compile_with_diagnostics().expect("Failed to compile");
    assert_eq!(first, second);
}

#[test]
fn test_display_tree() {
    let tree = compile(&create_simple_snapshot()).expect("Failed to compile");
    let rendered = DisplayTree::new(&tree).to_string();

    assert!(rendered.starts_with("Header: A (code 65)\n"));
    assert!(rendered.contains("└── [y] Time t=1 n=1000"));
}

#[test]
fn test_builder_from_json_source() {
    let json = r#"{"nodes":[{"id":"a","data":{"type":"keyElement","code":65,"key":"A"}}],"edges":[]}"#;
    let compiler = keyweave::compiler::CompilerBuilder::from_source(json)
        .expect("Failed to read snapshot")
        .build();

    assert_eq!(compiler.snapshot().nodes.len(), 1);
    assert_eq!(compiler.compile().expect("Failed to compile").header.elements_key, "A");
}
