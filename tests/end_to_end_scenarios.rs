//! End-to-end interpreter scenarios driven through the public API exactly
//! as a host would: `uo_steam::register()`, `start_script`, repeated
//! `evaluator::step()` calls. Each test mirrors one of the worked scenarios
//! the crate's behaviour was specified against.

use uo_steam::ast::{AstBuilder, NodeKind};
use uo_steam::evaluator;
use uo_steam::host::mock::MockHost;
use uo_steam::runtime::Runtime;
use uo_steam::value::Serial;

fn run_to_completion(rt: &mut Runtime<MockHost>, host: &mut MockHost) {
    for _ in 0..1_000 {
        if !rt.is_running() {
            return;
        }
        evaluator::step(rt, host).unwrap();
    }
    panic!("script did not terminate within 1000 steps");
}

#[test]
fn setalias_then_msg_then_stop() {
    let mut rt: Runtime<MockHost> = uo_steam::register();
    let mut host = MockHost::new();

    let mut b = AstBuilder::new();
    let root = b.root();
    b.command(root, "setalias", &["foo", "0x40000001"]);
    b.command(root, "msg", &["hi"]);
    // `attack foo` exercises `foo` through the same alias-resolution path a
    // real script would use, since the runtime's resolver is not part of
    // the public surface a host embeds against.
    b.command(root, "attack", &["foo"]);
    b.node(root, NodeKind::Stop);
    rt.start_script(b.build());

    run_to_completion(&mut rt, &mut host);

    assert_eq!(host.attacked, vec![Serial(0x40000001)]);
    assert_eq!(host.said, vec![("hi".to_string(), 0)]);
    assert!(!rt.is_running());
}

#[test]
fn for_loop_prints_three_times_and_restores_scope_depth() {
    let mut rt: Runtime<MockHost> = uo_steam::register();
    let mut host = MockHost::new();

    let mut b = AstBuilder::new();
    let root = b.root();
    b.leaf(root, NodeKind::For, "3");
    b.command(root, "msg", &["x"]);
    b.node(root, NodeKind::EndFor);
    rt.start_script(b.build());

    run_to_completion(&mut rt, &mut host);

    assert_eq!(host.said, vec![("x".to_string(), 0), ("x".to_string(), 0), ("x".to_string(), 0)]);
    assert_eq!(rt.scope_depth(), 0);
}

#[test]
fn createlist_pushlist_foreach_reports_each_value_and_final_length() {
    let mut rt: Runtime<MockHost> = uo_steam::register();
    let mut host = MockHost::new();

    let mut b = AstBuilder::new();
    let root = b.root();
    b.command(root, "createlist", &["l"]);
    b.command(root, "pushlist", &["l", "1"]);
    b.command(root, "pushlist", &["l", "2"]);
    let foreach = b.leaf(root, NodeKind::Foreach, "l");
    b.leaf(foreach, NodeKind::Operand, "v");
    b.command(root, "msg", &["v"]);
    b.node(root, NodeKind::EndFor);
    rt.start_script(b.build());

    run_to_completion(&mut rt, &mut host);

    assert_eq!(host.said, vec![("1".to_string(), 0), ("2".to_string(), 0)]);
    assert_eq!(rt.lists.len("l"), 2);
}

#[test]
fn moveitem_while_already_holding_prints_the_exact_error_and_clears_the_hold() {
    let mut rt: Runtime<MockHost> = uo_steam::register();
    let mut host = MockHost::new();
    host.holding = Some(Serial(99));

    let mut b = AstBuilder::new();
    let root = b.root();
    b.command(root, "moveitem", &["0x1", "0x2", "0", "0", "0", "1"]);
    b.node(root, NodeKind::Stop);
    rt.start_script(b.build());

    run_to_completion(&mut rt, &mut host);

    assert_eq!(host.system_printed, vec!["moveitem: You are already holding an item".to_string()]);
    assert_eq!(host.holding, None);
}

#[test]
fn walk_comma_list_delivers_each_direction_at_least_wait_ms_apart() {
    let mut rt: Runtime<MockHost> = uo_steam::register();
    let mut host = MockHost::new();

    let mut b = AstBuilder::new();
    let root = b.root();
    b.command(root, "walk", &["North,East,East"]);
    rt.start_script(b.build());

    evaluator::step(&mut rt, &mut host).unwrap();
    assert_eq!(host.walked, vec!["north".to_string()]);

    host.advance_clock(900);
    evaluator::step(&mut rt, &mut host).unwrap();
    assert_eq!(host.walked, vec!["north".to_string(), "east".to_string()]);

    host.advance_clock(900);
    evaluator::step(&mut rt, &mut host).unwrap();
    assert_eq!(host.walked, vec!["north".to_string(), "east".to_string(), "east".to_string()]);
}

fn hits_below_threshold_script() -> uo_steam::ast::Ast {
    let mut b = AstBuilder::new();
    let root = b.root();
    let if_node = b.node(root, NodeKind::If);
    let cmp = b.node(if_node, NodeKind::BinaryExpression);
    b.leaf(cmp, NodeKind::UnaryExpression, "hits");
    b.node(cmp, NodeKind::LessThan);
    b.leaf(cmp, NodeKind::Integer, "30");
    b.command(root, "bandageself", &[]);
    b.node(root, NodeKind::EndIf);
    b.build()
}

#[test]
fn low_hits_triggers_bandageself() {
    let mut rt: Runtime<MockHost> = uo_steam::register();
    let mut host = MockHost::new();
    host.stats.hits = 20;
    host.items.insert(
        Serial(0xBEEF),
        uo_steam::host::ItemInfo {
            serial: Serial(0xBEEF),
            graphic: 0x0E21,
            color: 0,
            amount: 1,
            container: Serial::ANY,
            layer: None,
        },
    );

    rt.start_script(hits_below_threshold_script());
    run_to_completion(&mut rt, &mut host);

    assert_eq!(host.double_clicked, vec![Serial(0xBEEF)]);
    assert_eq!(rt.scope_depth(), 0);
}

#[test]
fn full_hits_does_not_trigger_bandageself() {
    let mut rt: Runtime<MockHost> = uo_steam::register();
    let mut host = MockHost::new();
    host.stats.hits = 100;

    rt.start_script(hits_below_threshold_script());
    run_to_completion(&mut rt, &mut host);

    assert!(host.double_clicked.is_empty());
    assert_eq!(rt.scope_depth(), 0);
}
