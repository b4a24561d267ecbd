//! Built-in expression handlers: player stat/flag readouts plus a handful
//! of list/timer introspection expressions referenced by spec §8's
//! end-to-end scenarios (`hits`, `listlength`). Thin adapters over the
//! same [`Host`] surface the commands in [`super`] use.

use crate::argument::ArgumentList;
use crate::dispatch::resolve_ctx;
use crate::error::ScriptResult;
use crate::host::Host;
use crate::runtime::Runtime;
use crate::value::Value;

pub fn register_all<H: Host>(rt: &mut Runtime<H>) {
    rt.register_expression("hits", |_rt, host, _args, _quiet| Ok(Value::Int(host.stats().hits)));
    rt.register_expression("maxhits", |_rt, host, _args, _quiet| {
        Ok(Value::Int(host.stats().max_hits))
    });
    rt.register_expression("stamina", |_rt, host, _args, _quiet| {
        Ok(Value::Int(host.stats().stamina))
    });
    rt.register_expression("maxstamina", |_rt, host, _args, _quiet| {
        Ok(Value::Int(host.stats().max_stamina))
    });
    rt.register_expression("mana", |_rt, host, _args, _quiet| Ok(Value::Int(host.stats().mana)));
    rt.register_expression("maxmana", |_rt, host, _args, _quiet| {
        Ok(Value::Int(host.stats().max_mana))
    });
    rt.register_expression("gold", |_rt, host, _args, _quiet| Ok(Value::Uint(host.stats().gold)));
    rt.register_expression("followers", |_rt, host, _args, _quiet| {
        Ok(Value::Int(host.stats().followers))
    });
    rt.register_expression("x", |_rt, host, _args, _quiet| Ok(Value::Int(host.stats().x)));
    rt.register_expression("y", |_rt, host, _args, _quiet| Ok(Value::Int(host.stats().y)));
    rt.register_expression("z", |_rt, host, _args, _quiet| Ok(Value::Int(host.stats().z)));

    rt.register_expression("dead", |_rt, host, _args, _quiet| Ok(Value::Bool(host.is_dead())));
    rt.register_expression("hidden", |_rt, host, _args, _quiet| Ok(Value::Bool(host.is_hidden())));
    rt.register_expression("paralyzed", |_rt, host, _args, _quiet| {
        Ok(Value::Bool(host.is_paralyzed()))
    });
    rt.register_expression("poisoned", |_rt, host, _args, _quiet| {
        Ok(Value::Bool(host.is_poisoned()))
    });
    rt.register_expression("warmode", |_rt, host, _args, _quiet| {
        Ok(Value::Bool(host.in_war_mode()))
    });
    rt.register_expression("mounted", |_rt, host, _args, _quiet| {
        Ok(Value::Bool(host.is_mounted()))
    });

    rt.register_expression("timer", timer);
    rt.register_expression("listexists", listexists);
    rt.register_expression("listlength", listlength);
}

fn timer<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _quiet: bool,
) -> ScriptResult<Value> {
    use crate::host::Clock;
    let name: String = args.next_as(&resolve_ctx(rt, host))?;
    let now = host.now_ticks();
    Ok(Value::Uint(rt.timers.get(&name, now) as u32))
}

fn listexists<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _quiet: bool,
) -> ScriptResult<Value> {
    let name: String = args.next_as(&resolve_ctx(rt, host))?;
    Ok(Value::Bool(rt.lists.get(&name).is_some()))
}

fn listlength<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _quiet: bool,
) -> ScriptResult<Value> {
    let name: String = args.next_as(&resolve_ctx(rt, host))?;
    Ok(Value::Uint(rt.lists.len(&name) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, NodeKind};
    use crate::dispatch::Group;
    use crate::host::mock::MockHost;

    #[test]
    fn hits_expression_reads_player_stats() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        register_all(&mut rt);
        rt.register_command("msg (text)", 0, Group::None, |r, h, a, _f| {
            let text: String = a.next_as(&resolve_ctx(r, h))?;
            h.print(&text, crate::host::PrintKind::Regular);
            Ok(crate::dispatch::Dispatch::Consumed)
        });
        let mut host = MockHost::new();
        host.stats.hits = 20;

        let mut b = AstBuilder::new();
        let root = b.root();
        let if_node = b.node(root, NodeKind::If);
        let cmp = b.node(if_node, NodeKind::BinaryExpression);
        b.leaf(cmp, NodeKind::UnaryExpression, "hits");
        b.node(cmp, NodeKind::LessThan);
        b.leaf(cmp, NodeKind::Integer, "30");
        b.command(root, "msg", &["low"]);
        b.node(root, NodeKind::EndIf);
        rt.start_script(b.build());

        for _ in 0..10 {
            if !rt.is_running() {
                break;
            }
            crate::evaluator::step(&mut rt, &mut host).unwrap();
        }
        assert_eq!(host.printed, vec!["low"]);
    }
}
