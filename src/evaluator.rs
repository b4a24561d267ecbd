//! The tree-walking evaluator (spec §4.4): `step()` advances the active
//! script by exactly one statement of forward progress.
//!
//! Statement-level nodes form a single flat sibling chain rooted at the
//! AST's `STATEMENT` node — control constructs are markers in that chain
//! rather than containers, so `IF`'s body is simply the run of sibling
//! statements between the `IF` node and its `ELSEIF`/`ELSE`/`ENDIF`, found
//! by scanning forward/backward and tracking nesting depth (spec §4.4).
//! This module documents the two node-shape conventions this crate's AST
//! fixtures use for the constructs spec.md leaves to the external parser:
//! `IF`/`WHILE`'s condition expression is their sole child; `FOR`'s lexeme
//! is its literal iteration count; `FOREACH`'s lexeme is the list name and
//! its sole child is an `OPERAND` carrying the loop variable's name.

use crate::argument::Argument;
use crate::ast::{Ast, NodeId, NodeKind};
use crate::dispatch::{self, Dispatch, Flags};
use crate::error::{ScriptError, ScriptResult};
use crate::expression::eval_condition;
use crate::host::Host;
use crate::runtime::Runtime;
use crate::scope::Scope;
use crate::value::ScriptType;

/// Advances the active script by one statement (spec §4.4, §5). A no-op
/// if no script is loaded or the runtime is paused/timing out.
pub fn step<H: Host>(rt: &mut Runtime<H>, host: &mut H) -> ScriptResult<()> {
    if rt.service_suspension(host) {
        return Ok(());
    }
    // Serviced ahead of (and independent from) the active script slot: a
    // `walk "N,E,E"` on the script's last line must still drain its
    // exploded directions after the AST itself has reached its end.
    if rt.has_pending_virtual() {
        return step_virtual(rt, host);
    }
    let Some(ast) = rt.ast() else {
        return Ok(());
    };
    let Some(node) = rt.current_node() else {
        return Ok(());
    };

    let result = execute_statement(rt, host, &ast, node, Flags::default());
    if let Err(ref err) = result {
        log::warn!("script terminated: {err}");
        rt.set_current_node(None);
    }
    result
}

/// Dispatches the front of the virtual-statement queue (spec §4.7's
/// exploded `walk`/`turn`/`run` direction lists). Left in place on
/// `Retry` so the next tick observes the same cooldown a real statement
/// would.
fn step_virtual<H: Host>(rt: &mut Runtime<H>, host: &mut H) -> ScriptResult<()> {
    let Some((keyword, args)) = rt.peek_virtual() else {
        return Ok(());
    };
    match dispatch::dispatch(rt, host, &keyword, &args, Flags::default())? {
        Dispatch::Consumed => {
            rt.pop_virtual();
            Ok(())
        }
        Dispatch::Retry => Ok(()),
    }
}

fn execute_statement<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    ast: &Ast,
    node: NodeId,
    flags: Flags,
) -> ScriptResult<()> {
    match ast.kind(node) {
        NodeKind::Quiet | NodeKind::Force => execute_modifier_chain(rt, host, ast, node, flags),
        NodeKind::Command => {
            run_and_advance(rt, host, ast, node, node, flags)
        }
        NodeKind::If => {
            let is_reentry = rt.scopes().is_some_and(|s| s.is_reentry(node));
            if !is_reentry {
                rt.push_scope(Scope::for_node(node))?;
            }
            let next = resolve_if_chain(rt, host, ast, node, flags)?;
            rt.set_current_node(next);
            Ok(())
        }
        NodeKind::ElseIf | NodeKind::Else => {
            // Reached only via natural forward advance: an earlier branch
            // in this chain ran its body to completion.
            let endif = scan_to_endif_from(ast, node)?;
            rt.set_current_node(Some(endif));
            Ok(())
        }
        NodeKind::EndIf => {
            if let Some(scopes) = rt.scopes_mut() {
                scopes.pop();
            }
            rt.set_current_node(ast.next_sibling(node));
            Ok(())
        }
        NodeKind::While => {
            let is_reentry = rt.scopes().is_some_and(|s| s.is_reentry(node));
            if !is_reentry {
                rt.push_scope(Scope::for_node(node))?;
            }
            let condition = ast
                .first_child(node)
                .ok_or_else(|| ScriptError::runtime("WHILE with no condition"))?;
            if eval_condition(rt, host, ast, condition, flags.quiet)? {
                rt.set_current_node(ast.next_sibling(node));
            } else {
                let endwhile = scan_forward_past_loop(ast, node, NodeKind::EndWhile)?;
                if let Some(scopes) = rt.scopes_mut() {
                    scopes.pop();
                }
                rt.set_current_node(ast.next_sibling(endwhile));
            }
            Ok(())
        }
        NodeKind::EndWhile => {
            let while_node = scan_backward_to_opener(ast, node, NodeKind::EndWhile)?;
            rt.set_current_node(Some(while_node));
            Ok(())
        }
        NodeKind::For => {
            let lexeme = ast.lexeme(node).unwrap_or_default();
            let limit = i32::from_literal(lexeme)? as i64;
            let is_reentry = rt.scopes().is_some_and(|s| s.is_reentry(node));
            if !is_reentry {
                rt.push_scope(Scope::for_node(node))?;
            } else if let Some(scopes) = rt.scopes_mut() {
                scopes.current_mut().for_counter += 1;
            }
            let counter = rt.scopes().map_or(0, |s| s.current().for_counter);
            if counter < limit {
                rt.set_current_node(ast.next_sibling(node));
            } else {
                let endfor = scan_forward_past_loop(ast, node, NodeKind::EndFor)?;
                if let Some(scopes) = rt.scopes_mut() {
                    scopes.pop();
                }
                rt.set_current_node(ast.next_sibling(endfor));
            }
            Ok(())
        }
        NodeKind::Foreach => {
            let list_name = ast.lexeme(node).unwrap_or_default().to_string();
            let var_node = ast
                .first_child(node)
                .ok_or_else(|| ScriptError::runtime("FOREACH with no loop variable"))?;
            let var_name = ast.lexeme(var_node).unwrap_or_default().to_string();

            let is_reentry = rt.scopes().is_some_and(|s| s.is_reentry(node));
            if !is_reentry {
                rt.push_scope(Scope::for_node(node))?;
            } else if let Some(scopes) = rt.scopes_mut() {
                scopes.current_mut().foreach_index += 1;
            }
            let index = rt.scopes().map_or(0, |s| s.current().foreach_index);
            let item = rt.lists.get(&list_name).and_then(|l| l.get(index)).cloned();

            match item {
                Some(arg) => {
                    if let Some(scopes) = rt.scopes_mut() {
                        scopes.bind(&var_name, arg);
                    }
                    rt.set_current_node(ast.next_sibling(node));
                }
                None => {
                    let endfor = scan_forward_past_loop(ast, node, NodeKind::EndFor)?;
                    if let Some(scopes) = rt.scopes_mut() {
                        scopes.pop();
                    }
                    rt.set_current_node(ast.next_sibling(endfor));
                }
            }
            Ok(())
        }
        NodeKind::EndFor => {
            let opener = scan_backward_to_opener(ast, node, NodeKind::EndFor)?;
            rt.set_current_node(Some(opener));
            Ok(())
        }
        NodeKind::Break => {
            let terminator = scan_forward_past_any_loop(ast, node)?;
            if let Some(scopes) = rt.scopes_mut() {
                scopes.pop();
            }
            rt.set_current_node(ast.next_sibling(terminator));
            Ok(())
        }
        NodeKind::Continue => {
            let opener = scan_backward_to_any_loop(ast, node)?;
            rt.set_current_node(Some(opener));
            Ok(())
        }
        NodeKind::Stop => {
            rt.set_current_node(None);
            Ok(())
        }
        NodeKind::Replay => {
            let first = ast.root().and_then(|r| ast.first_child(r));
            rt.set_current_node(first);
            Ok(())
        }
        other => Err(ScriptError::runtime(format!(
            "{other:?} cannot appear at statement level"
        ))),
    }
}

/// Unwraps a `QUIET`/`FORCE` chain (e.g. `@!command`) down to the `COMMAND`
/// node it wraps, accumulating flags, then dispatches it — advancing past
/// the outermost modifier node on success, exactly as a bare command would.
fn execute_modifier_chain<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    ast: &Ast,
    outer: NodeId,
    mut flags: Flags,
) -> ScriptResult<()> {
    let mut cur = outer;
    loop {
        match ast.kind(cur) {
            NodeKind::Quiet => flags.quiet = true,
            NodeKind::Force => flags.force = true,
            NodeKind::Command => break,
            other => {
                return Err(ScriptError::runtime(format!(
                    "modifier wraps unsupported node {other:?}"
                )))
            }
        }
        cur = ast
            .first_child(cur)
            .ok_or_else(|| ScriptError::runtime("modifier with no command"))?;
    }
    run_and_advance(rt, host, ast, outer, cur, flags)
}

/// Dispatches the `COMMAND` node at `command_node` and, on success,
/// advances the cursor past `advance_from` (the outermost statement node —
/// itself or an enclosing modifier).
fn run_and_advance<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    ast: &Ast,
    advance_from: NodeId,
    command_node: NodeId,
    flags: Flags,
) -> ScriptResult<()> {
    let keyword = ast.lexeme(command_node).unwrap_or_default().to_string();
    let raw_args: Vec<Argument> = ast.children(command_node).map(|c| Argument::from_node(ast, c)).collect();

    match dispatch::dispatch(rt, host, &keyword, &raw_args, flags)? {
        Dispatch::Consumed => {
            rt.set_current_node(ast.next_sibling(advance_from));
            Ok(())
        }
        Dispatch::Retry => Ok(()),
    }
}

/// `IF`/`ELSEIF` evaluated synchronously within one tick: false branches
/// fall through to the next `ELSEIF`, `ELSE`, or `ENDIF` without consuming
/// an extra `step()` call (spec §4.4).
fn resolve_if_chain<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    ast: &Ast,
    node: NodeId,
    flags: Flags,
) -> ScriptResult<Option<NodeId>> {
    let condition = ast
        .first_child(node)
        .ok_or_else(|| ScriptError::runtime("IF/ELSEIF with no condition"))?;
    if eval_condition(rt, host, ast, condition, flags.quiet)? {
        return Ok(ast.next_sibling(node));
    }
    match scan_if_alternative(ast, node)? {
        IfTarget::ElseIf(n) => resolve_if_chain(rt, host, ast, n, flags),
        IfTarget::Else(n) => Ok(ast.next_sibling(n)),
        IfTarget::EndIf(n) => {
            if let Some(scopes) = rt.scopes_mut() {
                scopes.pop();
            }
            Ok(ast.next_sibling(n))
        }
    }
}

enum IfTarget {
    ElseIf(NodeId),
    Else(NodeId),
    EndIf(NodeId),
}

fn scan_if_alternative(ast: &Ast, from: NodeId) -> ScriptResult<IfTarget> {
    let mut depth = 0u32;
    let mut cur = from;
    loop {
        cur = ast
            .next_sibling(cur)
            .ok_or_else(|| ScriptError::runtime("unmatched IF (missing ENDIF)"))?;
        match ast.kind(cur) {
            NodeKind::If => depth += 1,
            NodeKind::EndIf if depth > 0 => depth -= 1,
            NodeKind::EndIf => return Ok(IfTarget::EndIf(cur)),
            NodeKind::ElseIf if depth == 0 => return Ok(IfTarget::ElseIf(cur)),
            NodeKind::Else if depth == 0 => return Ok(IfTarget::Else(cur)),
            _ => {}
        }
    }
}

fn scan_to_endif_from(ast: &Ast, from: NodeId) -> ScriptResult<NodeId> {
    let mut depth = 0u32;
    let mut cur = from;
    loop {
        cur = ast
            .next_sibling(cur)
            .ok_or_else(|| ScriptError::runtime("unmatched IF (missing ENDIF)"))?;
        match ast.kind(cur) {
            NodeKind::If => depth += 1,
            NodeKind::EndIf if depth > 0 => depth -= 1,
            NodeKind::EndIf => return Ok(cur),
            _ => {}
        }
    }
}

/// Scans forward from a `WHILE`/`FOR`/`FOREACH` opener to its matching
/// terminator, skipping over any unrelated nested construct.
fn scan_forward_past_loop(ast: &Ast, from: NodeId, terminator: NodeKind) -> ScriptResult<NodeId> {
    let mut depth = 0u32;
    let mut cur = from;
    loop {
        cur = ast
            .next_sibling(cur)
            .ok_or_else(|| ScriptError::runtime("unmatched loop terminator"))?;
        let kind = ast.kind(cur);
        if kind.matching_terminator() == Some(terminator) {
            depth += 1;
        } else if kind == terminator {
            if depth == 0 {
                return Ok(cur);
            }
            depth -= 1;
        }
    }
}

fn scan_backward_to_opener(ast: &Ast, from: NodeId, terminator: NodeKind) -> ScriptResult<NodeId> {
    let mut depth = 0u32;
    let mut cur = from;
    loop {
        cur = ast
            .prev_sibling(cur)
            .ok_or_else(|| ScriptError::runtime("unmatched loop terminator"))?;
        let kind = ast.kind(cur);
        if kind == terminator {
            depth += 1;
        } else if kind.matching_terminator() == Some(terminator) {
            if depth == 0 {
                return Ok(cur);
            }
            depth -= 1;
        }
    }
}

/// `BREAK` doesn't know ahead of time whether it's inside a `WHILE`, `FOR`
/// or `FOREACH`, so it tracks any loop opener/closer generically.
fn scan_forward_past_any_loop(ast: &Ast, from: NodeId) -> ScriptResult<NodeId> {
    let mut depth = 0u32;
    let mut cur = from;
    loop {
        cur = ast
            .next_sibling(cur)
            .ok_or_else(|| ScriptError::runtime("BREAK outside a loop"))?;
        let kind = ast.kind(cur);
        if matches!(kind, NodeKind::While | NodeKind::For | NodeKind::Foreach) {
            depth += 1;
        } else if matches!(kind, NodeKind::EndWhile | NodeKind::EndFor) {
            if depth == 0 {
                return Ok(cur);
            }
            depth -= 1;
        }
    }
}

fn scan_backward_to_any_loop(ast: &Ast, from: NodeId) -> ScriptResult<NodeId> {
    let mut depth = 0u32;
    let mut cur = from;
    loop {
        cur = ast
            .prev_sibling(cur)
            .ok_or_else(|| ScriptError::runtime("CONTINUE outside a loop"))?;
        let kind = ast.kind(cur);
        if matches!(kind, NodeKind::EndWhile | NodeKind::EndFor) {
            depth += 1;
        } else if matches!(kind, NodeKind::While | NodeKind::For | NodeKind::Foreach) {
            if depth == 0 {
                return Ok(cur);
            }
            depth -= 1;
        }
    }
}
