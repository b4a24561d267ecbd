//! Built-in command handlers (spec §4.7): thin adapters translating a
//! resolved [`ArgumentList`] into calls against the [`Host`] capability
//! surface. Every handler here has the signature
//! `fn(&mut Runtime<H>, &mut H, &mut ArgumentList, Flags) -> ScriptResult<Dispatch>`
//! required by [`crate::dispatch::CommandHandler`].

use crate::alias;
use crate::argument::{Argument, ArgumentList};
use crate::dispatch::{resolve_ctx, Dispatch, Flags, Group};
use crate::error::{ScriptError, ScriptResult};
use crate::host::{AbilityKind, Hand, Host, Layer, PromptKind};
use crate::runtime::Runtime;
use crate::value::Serial;

pub mod expressions;

/// Registers every built-in command and expression on `rt` (spec §4.7, §6).
pub fn register_all<H: Host>(rt: &mut Runtime<H>) {
    rt.set_group_wait(Group::PickUp, 1000);
    rt.set_group_wait(Group::DClick, 600);
    expressions::register_all(rt);
    alias::register_boot_aliases(rt);

    rt.register_command("setability (which)", 0, Group::None, setability);
    rt.register_command("attack (serial)", 0, Group::None, attack);
    rt.register_command("clearhands (hand)", 0, Group::None, clearhands);
    rt.register_command("clickobject (serial)", 600, Group::DClick, clickobject);
    rt.register_command("bandageself", 0, Group::None, bandageself);
    rt.register_command(
        "usetype (graphic) [color] [container] [range]",
        600,
        Group::DClick,
        usetype,
    );
    rt.register_command("useobject (serial)", 600, Group::DClick, useobject);
    rt.register_command("useonce (graphic) [color]", 600, Group::DClick, useonce);
    rt.register_command(
        "moveitem (serial) (destination) [x] [y] [z] [amount]",
        1000,
        Group::PickUp,
        moveitem,
    );
    rt.register_command(
        "moveitemoffset (serial) (destination) (x) (y) (z) [amount]",
        1000,
        Group::PickUp,
        moveitemoffset,
    );
    rt.register_command(
        "movetype (graphic) (destination) [color] [amount] [range]",
        1000,
        Group::PickUp,
        movetype,
    );
    rt.register_command(
        "movetypeoffset (graphic) (destination) (x) (y) (z) [color] [range]",
        1000,
        Group::PickUp,
        movetypeoffset,
    );
    rt.register_command("walk (direction)", 800, Group::None, walk);
    rt.register_command("turn (direction)", 800, Group::None, turn);
    rt.register_command("run (direction)", 800, Group::None, run);
    rt.register_command("useskill (index)", 0, Group::None, useskill);
    rt.register_command("feed (serial) [graphic]", 0, Group::None, feed);
    rt.register_command("rename (serial) (name)", 0, Group::None, rename);
    rt.register_command("shownames [kind]", 0, Group::None, shownames);
    rt.register_command("togglehands (hand)", 0, Group::None, togglehands);
    rt.register_command(
        "equipitem (serial) (layer)",
        1000,
        Group::PickUp,
        equipitem,
    );
    rt.register_command(
        "findobject (serial) [color] [container] [range]",
        0,
        Group::None,
        findobject,
    );
    rt.register_command(
        "findtype (graphic) [color] [container] [amount] [range]",
        0,
        Group::None,
        findtype,
    );
    rt.register_command("poplist (list) (position)", 0, Group::None, poplist);
    rt.register_command(
        "pushlist (list) (value) [position] [unique]",
        0,
        Group::None,
        pushlist,
    );
    rt.register_command("createlist (list)", 0, Group::None, createlist);
    rt.register_command("removelist (list)", 0, Group::None, removelist);
    rt.register_command("clearlist (list)", 0, Group::None, clearlist);
    rt.register_command("msg (text) [hue]", 0, Group::None, msg);
    rt.register_command("setalias (name) (serial)", 0, Group::None, setalias);
    rt.register_command("unsetalias (name)", 0, Group::None, unsetalias);
    rt.register_command("promptalias (name)", 0, Group::None, promptalias);
    rt.register_command("pause (ms)", 0, Group::None, pause);
}

fn parse_ability(token: &str) -> ScriptResult<AbilityKind> {
    match token.to_ascii_lowercase().as_str() {
        "primary" => Ok(AbilityKind::Primary),
        "secondary" => Ok(AbilityKind::Secondary),
        "stun" => Ok(AbilityKind::Stun),
        "disarm" => Ok(AbilityKind::Disarm),
        "clear" => Ok(AbilityKind::Clear),
        other => Err(ScriptError::command(format!("unknown ability '{other}'"))),
    }
}

fn parse_hand(token: &str) -> ScriptResult<Hand> {
    match token.to_ascii_lowercase().as_str() {
        "left" => Ok(Hand::Left),
        "right" => Ok(Hand::Right),
        other => Err(ScriptError::command(format!("unknown hand '{other}'"))),
    }
}

fn parse_layer(token: &str) -> ScriptResult<Layer> {
    match token.to_ascii_lowercase().as_str() {
        "righthand" => Ok(Layer::RightHand),
        "lefthand" => Ok(Layer::LeftHand),
        "mount" => Ok(Layer::Mount),
        "backpack" => Ok(Layer::Backpack),
        "bank" => Ok(Layer::Bank),
        other => other
            .parse::<u8>()
            .map(Layer::Other)
            .map_err(|_| ScriptError::command(format!("unknown layer '{other}'"))),
    }
}

fn setability<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let which: String = args.next_as(&resolve_ctx(rt, host))?;
    host.ability(parse_ability(&which)?);
    Ok(Dispatch::Consumed)
}

fn attack<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let serial: Serial = args.next_as(&resolve_ctx(rt, host))?;
    host.attack(serial);
    Ok(Dispatch::Consumed)
}

fn clearhands<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let hand: String = args.next_as(&resolve_ctx(rt, host))?;
    match hand.to_ascii_lowercase().as_str() {
        "both" => {
            host.clear_hands(Hand::Left);
            host.clear_hands(Hand::Right);
        }
        _ => host.clear_hands(parse_hand(&hand)?),
    }
    Ok(Dispatch::Consumed)
}

fn clickobject<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let serial: Serial = args.next_as(&resolve_ctx(rt, host))?;
    host.single_click(serial);
    Ok(Dispatch::Consumed)
}

/// The bandage graphic UO Steam's own defaults table uses; this crate has
/// no item database, so it is hard-coded the same way the teacher's
/// default alias table hard-codes sentinels (spec §4.7, glossary `Source`).
const BANDAGE_GRAPHIC: u16 = 0x0E21;

fn bandageself<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    _args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let backpack: Option<Serial> = rt.resolve_token(host, "container", "backpack").ok();
    let container = backpack.unwrap_or(Serial::ANY);
    match host.find_item_by_graphic(BANDAGE_GRAPHIC, 0xFFFF, container, 0, 0) {
        Some(bandage) => {
            host.double_click(bandage);
            Ok(Dispatch::Consumed)
        }
        None => Err(ScriptError::command("no bandages")),
    }
}

fn usetype<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let graphic: u16 = args.next_as(&ctx)?;
    let color: u16 = args.next_as(&ctx)?;
    let container: Serial = args.next_as(&ctx)?;
    let range: i32 = args.next_as(&ctx)?;
    match host.find_item_by_graphic(graphic, color, container, 0, range) {
        Some(serial) => {
            host.double_click(serial);
            Ok(Dispatch::Consumed)
        }
        None => Err(ScriptError::command("item not found")),
    }
}

fn useobject<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let serial: Serial = args.next_as(&resolve_ctx(rt, host))?;
    host.double_click(serial);
    Ok(Dispatch::Consumed)
}

fn useonce<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let graphic: u16 = args.next_as(&ctx)?;
    let color: u16 = args.next_as(&ctx)?;
    match host.find_item_by_graphic(graphic, color, Serial::ANY, 0, i32::MAX) {
        Some(serial) => {
            host.double_click(serial);
            Ok(Dispatch::Consumed)
        }
        None => Err(ScriptError::command("item not found")),
    }
}

/// Shared `moveitem`/`moveitemoffset` core (spec §4.6): one-shot per
/// Design Note §9 — `Interacting` is entered and exited within this call.
fn move_item_core<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    serial: Serial,
    container: Serial,
    x: i32,
    y: i32,
    z: i32,
    amount: u32,
) -> ScriptResult<Dispatch> {
    if let Some(busy) = rt.move_item.busy_with() {
        if busy != serial {
            return Err(ScriptError::command(format!("already moving {}", busy.0)));
        }
    }
    if let Some(held) = host.holding_item() {
        let _ = host.drop(held, x, y, z, container);
        return Err(ScriptError::command("You are already holding an item"));
    }

    rt.move_item.begin(serial);
    host.pick_up(serial, amount)?;
    let result = host.drop(serial, x, y, z, container);
    rt.move_item.finish();
    result?;
    Ok(Dispatch::Consumed)
}

fn moveitem<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let serial: Serial = args.next_as(&ctx)?;
    let destination: Serial = args.next_as(&ctx)?;
    let x: i32 = args.next_as(&ctx)?;
    let y: i32 = args.next_as(&ctx)?;
    let z: i32 = args.next_as(&ctx)?;
    let amount: u32 = args.next_as(&ctx)?;
    move_item_core(rt, host, serial, destination, x, y, z, amount)
}

fn moveitemoffset<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let serial: Serial = args.next_as(&ctx)?;
    let destination: Serial = args.next_as(&ctx)?;
    let dx: i32 = args.next_as(&ctx)?;
    let dy: i32 = args.next_as(&ctx)?;
    let dz: i32 = args.next_as(&ctx)?;
    let amount: u32 = args.next_as(&ctx)?;
    let stats = host.stats();
    move_item_core(rt, host, serial, destination, stats.x + dx, stats.y + dy, stats.z + dz, amount)
}

fn movetype<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let graphic: u16 = args.next_as(&ctx)?;
    let destination: Serial = args.next_as(&ctx)?;
    let color: u16 = args.next_as(&ctx)?;
    let amount: u32 = args.next_as(&ctx)?;
    let range: i32 = args.next_as(&ctx)?;
    let serial = host
        .find_item_by_graphic(graphic, color, Serial::ANY, amount, range)
        .ok_or_else(|| ScriptError::command("item not found"))?;
    move_item_core(rt, host, serial, destination, 0, 0, 0, amount)
}

fn movetypeoffset<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let graphic: u16 = args.next_as(&ctx)?;
    let destination: Serial = args.next_as(&ctx)?;
    let dx: i32 = args.next_as(&ctx)?;
    let dy: i32 = args.next_as(&ctx)?;
    let dz: i32 = args.next_as(&ctx)?;
    let color: u16 = args.next_as(&ctx)?;
    let range: i32 = args.next_as(&ctx)?;
    let serial = host
        .find_item_by_graphic(graphic, color, Serial::ANY, 0, range)
        .ok_or_else(|| ScriptError::command("item not found"))?;
    let stats = host.stats();
    move_item_core(rt, host, serial, destination, stats.x + dx, stats.y + dy, stats.z + dz, 0)
}

/// Shared core for `walk`/`turn`/`run` (spec §4.7): resolves the
/// comma-separated direction list, acts on the first direction, and
/// re-enqueues the rest as virtual single-direction statements.
fn directional<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    keyword: &str,
    act: fn(&mut H, &str),
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let directions: Vec<String> = args.next_as_array(&ctx)?;
    let mut iter = directions.into_iter();
    let Some(first) = iter.next() else {
        return Err(ScriptError::syntax("direction missing"));
    };
    act(host, &first);
    for direction in iter {
        rt.enqueue_virtual(keyword, vec![Argument::literal(direction)]);
    }
    Ok(Dispatch::Consumed)
}

fn walk<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    directional(rt, host, args, "walk", H::walk)
}

fn turn<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    directional(rt, host, args, "turn", H::turn)
}

fn run<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    directional(rt, host, args, "run", H::run)
}

fn useskill<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let index: u32 = args.next_as(&resolve_ctx(rt, host))?;
    host.use_skill(index);
    Ok(Dispatch::Consumed)
}

fn feed<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let serial: Serial = args.next_as(&ctx)?;
    let graphic: u16 = args.next_as(&ctx)?;
    host.feed(serial, graphic);
    Ok(Dispatch::Consumed)
}

fn rename<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let serial: Serial = args.next_as(&ctx)?;
    let name: String = args.next_as(&ctx)?;
    host.rename(serial, &name);
    Ok(Dispatch::Consumed)
}

fn shownames<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let kind: String = args.next_as(&resolve_ctx(rt, host))?;
    host.print(&format!("shownames {kind}"), crate::host::PrintKind::System);
    Ok(Dispatch::Consumed)
}

fn togglehands<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let hand: String = args.next_as(&resolve_ctx(rt, host))?;
    host.toggle_hands(parse_hand(&hand)?);
    Ok(Dispatch::Consumed)
}

fn equipitem<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let serial: Serial = args.next_as(&ctx)?;
    let layer_name: String = args.next_as(&ctx)?;
    let layer = parse_layer(&layer_name)?;

    if let Some(busy) = rt.equip_item.busy_with() {
        if busy != serial {
            return Err(ScriptError::command(format!("already moving {}", busy.0)));
        }
    }
    rt.equip_item.begin(serial);
    let result = host.equip(serial, layer, Serial::ANY);
    rt.equip_item.finish();
    result?;
    Ok(Dispatch::Consumed)
}

fn findobject<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let serial: Serial = args.next_as(&resolve_ctx(rt, host))?;
    let found = host.get_item(serial).is_some();
    rt.set_static_alias("found", if found { serial } else { Serial(0) });
    Ok(Dispatch::Consumed)
}

fn findtype<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let graphic: u16 = args.next_as(&ctx)?;
    let color: u16 = args.next_as(&ctx)?;
    let container: Serial = args.next_as(&ctx)?;
    let amount: u32 = args.next_as(&ctx)?;
    let range: i32 = args.next_as(&ctx)?;
    let found = host.find_item_by_graphic(graphic, color, container, amount, range);
    rt.set_static_alias("found", found.unwrap_or(Serial(0)));
    Ok(Dispatch::Consumed)
}

fn poplist<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let list_name: String = args.next_as(&ctx)?;
    let raw_position = args.index_get(1).map(|a| a.lexeme.clone()).unwrap_or_default();

    let Some(list) = rt.lists.get_mut(&list_name) else {
        return Ok(Dispatch::Consumed);
    };
    if flags.force {
        list.clear();
        return Ok(Dispatch::Consumed);
    }
    match raw_position.to_ascii_lowercase().as_str() {
        "front" => {
            list.pop_front();
        }
        "back" | "" => {
            list.pop_back();
        }
        _ => {
            let value = Argument::literal(raw_position);
            list.pop_value(&value);
        }
    }
    Ok(Dispatch::Consumed)
}

fn pushlist<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let list_name: String = args.next_as(&ctx)?;
    let value: String = args.next_as(&ctx)?;
    let position: String = args.next_as(&ctx)?;
    let unique: bool = args.next_as(&ctx)?;

    if rt.lists.len(&list_name) >= rt.limits.max_list_len {
        return Err(ScriptError::runtime(format!(
            "list '{list_name}' exceeds the configured limit of {} entries",
            rt.limits.max_list_len
        )));
    }

    let list = rt.lists.get_or_create_mut(&list_name);
    let arg = Argument::literal(value);
    if position.eq_ignore_ascii_case("front") {
        list.push_front(arg, unique);
    } else {
        list.push_back(arg, unique);
    }
    Ok(Dispatch::Consumed)
}

fn createlist<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let name: String = args.next_as(&resolve_ctx(rt, host))?;
    rt.lists.create(&name);
    Ok(Dispatch::Consumed)
}

fn removelist<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let name: String = args.next_as(&resolve_ctx(rt, host))?;
    rt.lists.destroy(&name);
    Ok(Dispatch::Consumed)
}

fn clearlist<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let name: String = args.next_as(&resolve_ctx(rt, host))?;
    if let Some(list) = rt.lists.get_mut(&name) {
        list.clear();
    }
    Ok(Dispatch::Consumed)
}

fn msg<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let text: String = args.next_as(&ctx)?;
    let hue: u16 = args.next_as(&ctx)?;
    host.say(&text, hue);
    Ok(Dispatch::Consumed)
}

fn setalias<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ctx = resolve_ctx(rt, host);
    let name: String = args.next_as(&ctx)?;
    let serial: Serial = args.next_as(&ctx)?;
    rt.set_static_alias(&name, serial);
    Ok(Dispatch::Consumed)
}

fn unsetalias<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let name: String = args.next_as(&resolve_ctx(rt, host))?;
    rt.clear_alias(&name);
    Ok(Dispatch::Consumed)
}

fn promptalias<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let name: String = args.next_as(&resolve_ctx(rt, host))?;

    if let Some((token, pending_name)) = rt.pending_prompt() {
        if pending_name == name {
            return match host.poll_prompt(token) {
                Some(serial) => {
                    rt.set_static_alias(&name, serial);
                    rt.clear_pending_prompt();
                    Ok(Dispatch::Consumed)
                }
                None => Ok(Dispatch::Retry),
            };
        }
    }

    let token = host.begin_prompt(PromptKind::Object);
    rt.set_pending_prompt(token, name);
    Ok(Dispatch::Retry)
}

fn pause<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    args: &mut ArgumentList,
    _flags: Flags,
) -> ScriptResult<Dispatch> {
    let ms: u64 = args.next_as(&resolve_ctx(rt, host))?;
    rt.pause(host, ms);
    Ok(Dispatch::Consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use crate::ast::NodeKind;
    use crate::host::mock::MockHost;
    use crate::value::Serial;

    #[test]
    fn msg_prints_with_default_hue() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        register_all(&mut rt);
        let mut host = MockHost::new();

        let mut b = AstBuilder::new();
        let root = b.root();
        b.command(root, "msg", &["hi"]);
        b.node(root, NodeKind::Stop);
        rt.start_script(b.build());

        crate::evaluator::step(&mut rt, &mut host).unwrap();
        assert_eq!(host.said, vec![("hi".to_string(), 0)]);
    }

    #[test]
    fn moveitem_rejects_when_already_holding() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        register_all(&mut rt);
        let mut host = MockHost::new();
        host.holding = Some(Serial(99));

        let mut b = AstBuilder::new();
        let root = b.root();
        b.command(root, "moveitem", &["0x1", "0x2", "0", "0", "0", "1"]);
        rt.start_script(b.build());

        crate::evaluator::step(&mut rt, &mut host).unwrap();
        assert!(host.system_printed[0].contains("already holding an item"));
        assert_eq!(host.holding, None);
    }

    #[test]
    fn walk_explodes_comma_list_into_virtual_statements() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        register_all(&mut rt);
        let mut host = MockHost::new();

        let mut b = AstBuilder::new();
        let root = b.root();
        b.command(root, "walk", &["North,East,East"]);
        rt.start_script(b.build());

        for _ in 0..3 {
            crate::evaluator::step(&mut rt, &mut host).unwrap();
            host.advance_clock(900);
        }

        assert_eq!(host.walked, vec!["north", "east", "east"]);
    }

    #[test]
    fn bandageself_resolves_backpack_through_the_boot_alias() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        register_all(&mut rt);
        let mut host = MockHost::new();
        let backpack = Serial(0x1234);
        host.layers.insert(crate::host::Layer::Backpack, backpack);
        host.items.insert(
            Serial(0xBEEF),
            crate::host::ItemInfo {
                serial: Serial(0xBEEF),
                graphic: BANDAGE_GRAPHIC,
                color: 0,
                amount: 1,
                container: backpack,
                layer: None,
            },
        );

        let mut b = AstBuilder::new();
        let root = b.root();
        b.command(root, "bandageself", &[]);
        rt.start_script(b.build());

        crate::evaluator::step(&mut rt, &mut host).unwrap();
        assert_eq!(host.double_clicked, vec![Serial(0xBEEF)]);
    }

    #[test]
    fn pushlist_past_the_configured_limit_errors() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        register_all(&mut rt);
        rt.limits.max_list_len = 1;
        let mut host = MockHost::new();

        let mut b = AstBuilder::new();
        let root = b.root();
        b.command(root, "pushlist", &["l", "1", "back", "0"]);
        rt.start_script(b.build());
        crate::evaluator::step(&mut rt, &mut host).unwrap();
        assert_eq!(rt.lists.len("l"), 1);

        let mut b = AstBuilder::new();
        let root = b.root();
        b.command(root, "pushlist", &["l", "2", "back", "0"]);
        rt.start_script(b.build());
        let err = crate::evaluator::step(&mut rt, &mut host);
        assert!(err.is_err(), "pushing past max_list_len should error");
        assert_eq!(rt.lists.len("l"), 1);
    }
}
