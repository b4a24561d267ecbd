//! Property-based tests for the interpreter core, in the style of
//! `neo-vm`'s `property_tests.rs`: each invariant from the specification's
//! testable-properties list gets its own `proptest!` block rather than one
//! do-everything property.

use proptest::prelude::*;

use uo_steam::alias::AliasStore;
use uo_steam::argument::Argument;
use uo_steam::ast::{AstBuilder, NodeKind};
use uo_steam::dispatch::{parse_usage, Dispatch, Group};
use uo_steam::evaluator;
use uo_steam::host::mock::MockHost;
use uo_steam::list::List;
use uo_steam::runtime::Runtime;
use uo_steam::timer::TimerStore;

fn run_to_completion(rt: &mut Runtime<MockHost>, host: &mut MockHost, max_steps: u32) -> bool {
    for _ in 0..max_steps {
        if !rt.is_running() {
            return true;
        }
        evaluator::step(rt, host).unwrap();
    }
    !rt.is_running()
}

proptest! {
    /// A `for N` loop always terminates within a bounded number of `step()`
    /// calls and restores the scope stack to its pre-loop depth.
    #[test]
    fn for_loop_terminates_and_restores_scope_depth(count in 0u32..50) {
        let mut rt: Runtime<MockHost> = uo_steam::register();
        let mut host = MockHost::new();

        let mut b = AstBuilder::new();
        let root = b.root();
        b.leaf(root, NodeKind::For, &count.to_string());
        b.command(root, "msg", &["x"]);
        b.node(root, NodeKind::EndFor);
        rt.start_script(b.build());

        let terminated = run_to_completion(&mut rt, &mut host, count * 2 + 20);
        prop_assert!(terminated);
        prop_assert_eq!(rt.scope_depth(), 0);
        prop_assert_eq!(host.said.len(), count as usize);
    }

    /// List length is never negative by construction (`usize`), `pop` on an
    /// empty list is a no-op, and `push(unique = true)` never duplicates.
    #[test]
    fn list_length_and_uniqueness_invariants(values in prop::collection::vec(0i32..20, 0..30)) {
        let mut list = List::default();
        prop_assert_eq!(list.len(), 0);
        prop_assert!(list.pop_front().is_none());
        prop_assert!(list.pop_back().is_none());

        for v in &values {
            list.push_back(Argument::literal(v.to_string()), true);
        }
        let unique_count = values.iter().collect::<std::collections::HashSet<_>>().len();
        prop_assert_eq!(list.len(), unique_count);
    }

    /// `timer.set(ms)` followed immediately by `get()` at the same instant
    /// reads back exactly `ms` (ε = 0 since both calls share one `now`).
    #[test]
    fn timer_set_then_get_round_trips(ms in 0u64..1_000_000, now in 0u64..1_000_000) {
        let mut store = TimerStore::new();
        store.set("t", ms, now);
        prop_assert_eq!(store.get("t", now), ms);
    }

    /// Alias resolution is idempotent: two consecutive reads in the same
    /// tick return the same value.
    #[test]
    fn alias_resolution_is_idempotent(value in 0u32..u32::MAX) {
        let mut store: AliasStore<()> = AliasStore::new();
        store.set_static("gold", value);
        let a = store.resolve_static::<u32>("gold");
        let b = store.resolve_static::<u32>("gold");
        prop_assert_eq!(a, b);
        prop_assert_eq!(a, Some(value));
    }

    /// A usage string `"kw (a) [b] [c] ..."` always parses to the keyword
    /// as its first token, one mandatory argument per `(name)` token, and
    /// the full ordered name list regardless of how many optional tokens
    /// follow.
    #[test]
    fn usage_string_parsing_matches_mandatory_count(optional_count in 0usize..8) {
        let mut usage = "kw (a)".to_string();
        let mut expected_names = vec!["a".to_string()];
        for i in 0..optional_count {
            let name = format!("opt{i}");
            usage.push_str(&format!(" [{name}]"));
            expected_names.push(name);
        }
        let (keyword, mandatory, names) = parse_usage(&usage);
        prop_assert_eq!(keyword, "kw");
        prop_assert_eq!(mandatory, 1);
        prop_assert_eq!(names, expected_names);
    }

    /// Within `wait_ms` of a successful dispatch, re-attempting the same
    /// command returns `Retry` without running the handler again; once
    /// `wait_ms` has elapsed it runs.
    #[test]
    fn cooldown_blocks_until_wait_elapses(wait_ms in 1u64..2_000, delay in 0u64..2_000) {
        let mut rt: Runtime<MockHost> = Runtime::new();
        rt.register_command("ping", wait_ms, Group::None, |_rt, host, _args, _flags| {
            host.print("pinged", uo_steam::host::PrintKind::Regular);
            Ok(Dispatch::Consumed)
        });
        let mut host = MockHost::new();

        let first = uo_steam::dispatch::dispatch(&mut rt, &mut host, "ping", &[], Default::default()).unwrap();
        prop_assert_eq!(first, Dispatch::Consumed);
        prop_assert_eq!(host.printed.len(), 1);

        host.advance_clock(delay);
        let second = uo_steam::dispatch::dispatch(&mut rt, &mut host, "ping", &[], Default::default()).unwrap();
        if delay > wait_ms {
            prop_assert_eq!(second, Dispatch::Consumed);
            prop_assert_eq!(host.printed.len(), 2);
        } else {
            prop_assert_eq!(second, Dispatch::Retry);
            prop_assert_eq!(host.printed.len(), 1);
        }
    }
}
