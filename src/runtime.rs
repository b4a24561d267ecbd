//! The process-wide interpreter runtime (spec §3's "Interpreter runtime"):
//! the active script slot, the pause/timeout scheduler, and the registries
//! every built-in reads from. Modelled on `neo-vm`'s `ExecutionEngine` —
//! an explicit state enum, a resumable `execute_next`, and a jump-table
//! style handler registry — generalised from a single-script bytecode
//! engine to a host-driven, named-command tree walker.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::alias::AliasStore;
use crate::argument::{Argument, LocalValueMap, Resolver};
use crate::ast::Ast;
use crate::dispatch::CommandRegistry;
use crate::error::{ScriptError, ScriptResult};
use crate::expression::ExpressionRegistry;
use crate::host::{Host, TargetToken};
use crate::list::ListStore;
use crate::multistep::{EquipItemState, MoveItemState};
use crate::scope::ScopeStack;
use crate::timer::TimerStore;
use crate::value::ScriptType;

use std::collections::HashMap;

use crate::ast::NodeId;
use crate::dispatch::Group;

/// The interpreter's coarse execution phase (spec §3, §5). Spec.md leaves
/// these states anonymous ("RUNNING | PAUSED | TIMING_OUT"); this enum
/// names them and adds the terminal `Halted` state so a host can tell
/// "finished" apart from "never started".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Paused,
    TimingOut,
    Halted,
}

/// Host-tunable execution limits (§2.3 of `SPEC_FULL.md`). Both fields are
/// enforced, not advisory: `max_scope_depth` by [`Runtime::push_scope`],
/// `max_list_len` by the `pushlist` command handler.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionLimits {
    pub max_scope_depth: usize,
    pub max_list_len: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_scope_depth: 256,
            max_list_len: 100_000,
        }
    }
}

struct ScriptState {
    ast: Rc<Ast>,
    current: Option<NodeId>,
    scopes: ScopeStack,
}

/// A timeout armed via [`Runtime::timeout`]: a deadline (in host clock
/// ticks) and a callback run when the deadline elapses (spec §5).
struct TimeoutState<H> {
    deadline: u64,
    callback: Box<dyn FnMut(&mut Runtime<H>, &mut H) -> bool>,
}

/// The process-wide interpreter state (spec §3). Generic over the host
/// capability bundle `H` so alias handlers and command handlers can read
/// world/player state without the runtime owning the host.
pub struct Runtime<H> {
    phase: Phase,
    pause_until: Option<u64>,
    timeout: Option<TimeoutState<H>>,
    active: Option<ScriptState>,

    pub(crate) aliases: AliasStore<H>,
    pub(crate) local_values: LocalValueMap,
    pub lists: ListStore,
    pub timers: TimerStore,
    pub(crate) commands: CommandRegistry<H>,
    pub(crate) expressions: ExpressionRegistry<H>,

    pub(crate) last_cmd_exec: HashMap<String, u64>,
    pub(crate) last_group_exec: HashMap<Group, u64>,

    pub move_item: MoveItemState,
    pub equip_item: EquipItemState,

    /// The target cursor `promptalias` is waiting on, if any: the token it
    /// was issued plus the alias name it will bind once resolved (spec
    /// §4.7).
    pending_prompt: Option<(TargetToken, String)>,

    /// Commands like `walk`/`turn`/`run` explode a comma-separated
    /// direction list into one virtual single-direction statement per
    /// extra direction (spec §4.7). Serviced ahead of the AST on every
    /// `step()` so each still observes the command's cooldown.
    virtual_queue: VecDeque<(String, Vec<Argument>)>,

    pub limits: ExecutionLimits,
}

impl<H> Default for Runtime<H> {
    fn default() -> Self {
        Self {
            phase: Phase::Halted,
            pause_until: None,
            timeout: None,
            active: None,
            aliases: AliasStore::new(),
            local_values: LocalValueMap::with_builtins(),
            lists: ListStore::new(),
            timers: TimerStore::new(),
            commands: CommandRegistry::new(),
            expressions: ExpressionRegistry::new(),
            last_cmd_exec: HashMap::new(),
            last_group_exec: HashMap::new(),
            move_item: MoveItemState::default(),
            equip_item: EquipItemState::default(),
            pending_prompt: None,
            virtual_queue: VecDeque::new(),
            limits: ExecutionLimits::default(),
        }
    }
}

impl<H: Host> Runtime<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn scope_depth(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.scopes.depth())
    }

    /// Loads `ast` as the active script (spec §3: "Created from an AST
    /// root with current_statement = root.first_child() and an empty
    /// root scope"). Replaces whatever script was previously active.
    pub fn start_script(&mut self, ast: Ast) {
        let ast = Rc::new(ast);
        let current = ast.root().and_then(|root| ast.first_child(root));
        self.active = Some(ScriptState {
            ast,
            current,
            scopes: ScopeStack::new(),
        });
        self.phase = Phase::Running;
        self.pause_until = None;
        self.timeout = None;
    }

    /// Drops the active script slot (spec §5's `stop_script`). Any armed
    /// timeout is cleared.
    pub fn stop_script(&mut self) {
        self.active = None;
        self.phase = Phase::Halted;
        self.timeout = None;
        self.pause_until = None;
    }

    /// Suspends the script for `ms` host-clock milliseconds (spec §5).
    pub fn pause(&mut self, host: &H, ms: u64) {
        use crate::host::Clock;
        self.pause_until = Some(host.now_ticks() + ms);
        self.phase = Phase::Paused;
    }

    pub fn unpause(&mut self) {
        self.pause_until = None;
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
        }
    }

    /// Arms a timeout: if `callback` has not already cleared it by the
    /// time `ms` elapses, it runs once and the script advances or
    /// terminates depending on its return value (spec §5).
    pub fn timeout<F>(&mut self, host: &H, ms: u64, callback: F)
    where
        F: FnMut(&mut Runtime<H>, &mut H) -> bool + 'static,
    {
        use crate::host::Clock;
        self.timeout = Some(TimeoutState {
            deadline: host.now_ticks() + ms,
            callback: Box::new(callback),
        });
        self.phase = Phase::TimingOut;
    }

    pub fn clear_timeout(&mut self) {
        self.timeout = None;
    }

    pub fn has_timeout(&self) -> bool {
        self.timeout.is_some()
    }

    /// Services the armed pause/timeout, if any. Returns `true` if the
    /// caller should suspend this tick without attempting to advance the
    /// evaluator.
    pub(crate) fn service_suspension(&mut self, host: &mut H) -> bool {
        use crate::host::Clock;
        let now = host.now_ticks();

        if let Some(deadline) = self.pause_until {
            if now < deadline {
                return true;
            }
            self.pause_until = None;
            if self.phase == Phase::Paused {
                self.phase = Phase::Running;
            }
        }

        if let Some(mut state) = self.timeout.take() {
            if now < state.deadline {
                self.timeout = Some(state);
                return true;
            }
            let should_advance = (state.callback)(self, host);
            self.phase = Phase::Running;
            if !should_advance {
                self.stop_script();
                return true;
            }
            return false;
        }

        false
    }

    pub(crate) fn ast(&self) -> Option<Rc<Ast>> {
        self.active.as_ref().map(|s| Rc::clone(&s.ast))
    }

    pub(crate) fn current_node(&self) -> Option<NodeId> {
        self.active.as_ref().and_then(|s| s.current)
    }

    pub(crate) fn set_current_node(&mut self, node: Option<NodeId>) {
        if let Some(state) = self.active.as_mut() {
            state.current = node;
        }
        if node.is_none() {
            self.phase = Phase::Halted;
            self.active = None;
        }
    }

    pub(crate) fn scopes(&self) -> Option<&ScopeStack> {
        self.active.as_ref().map(|s| &s.scopes)
    }

    pub(crate) fn scopes_mut(&mut self) -> Option<&mut ScopeStack> {
        self.active.as_mut().map(|s| &mut s.scopes)
    }

    /// Pushes a new control-block scope, enforcing `limits.max_scope_depth`
    /// (§2.3): a no-op if no script is active, a `RunTime` error instead of
    /// an unbounded push if the script nests deeper than the configured
    /// ceiling.
    pub(crate) fn push_scope(&mut self, scope: crate::scope::Scope) -> ScriptResult<()> {
        let limit = self.limits.max_scope_depth;
        if let Some(scopes) = self.scopes_mut() {
            if scopes.depth() >= limit {
                return Err(ScriptError::runtime(format!(
                    "scope nesting exceeds the configured limit of {limit}"
                )));
            }
            scopes.push(scope);
        }
        Ok(())
    }

    /// Queues a virtual single-direction (or otherwise synthetic) command
    /// statement with no owning AST node (spec §3, §4.7).
    pub fn enqueue_virtual(&mut self, keyword: impl Into<String>, args: Vec<Argument>) {
        self.virtual_queue.push_back((keyword.into(), args));
    }

    pub(crate) fn has_pending_virtual(&self) -> bool {
        !self.virtual_queue.is_empty()
    }

    pub(crate) fn peek_virtual(&self) -> Option<(String, Vec<Argument>)> {
        self.virtual_queue.front().cloned()
    }

    pub(crate) fn pop_virtual(&mut self) {
        self.virtual_queue.pop_front();
    }

    /// Registers a built-in or host-specific command.
    pub fn register_command(
        &mut self,
        usage: &str,
        wait_ms: u64,
        group: Group,
        handler: crate::dispatch::CommandHandler<H>,
    ) {
        self.commands.register(usage, wait_ms, group, handler);
    }

    pub fn set_group_wait(&mut self, group: Group, wait_ms: u64) {
        self.commands.set_group_wait(group, wait_ms);
    }

    /// Registers a named expression handler.
    pub fn register_expression(&mut self, name: &str, handler: crate::expression::ExpressionHandler<H>) {
        self.expressions.register(name, handler);
    }

    pub fn set_static_alias<T: ScriptType>(&mut self, name: &str, value: T) {
        self.aliases.set_static(name, value);
    }

    pub fn set_alias_handler<T, F>(&mut self, name: &str, handler: F)
    where
        T: ScriptType,
        F: Fn(&H) -> Option<T> + 'static,
    {
        self.aliases.set_handler(name, handler);
    }

    /// Unbinds `name` from every alias bucket (spec §4.7's `unsetalias`).
    pub fn clear_alias(&mut self, name: &str) {
        self.aliases.unset(name);
    }

    pub(crate) fn pending_prompt(&self) -> Option<(TargetToken, String)> {
        self.pending_prompt.clone()
    }

    pub(crate) fn set_pending_prompt(&mut self, token: TargetToken, name: impl Into<String>) {
        self.pending_prompt = Some((token, name.into()));
    }

    pub(crate) fn clear_pending_prompt(&mut self) {
        self.pending_prompt = None;
    }

    /// The full §4.2/§4.3 resolution chain for a raw token under the given
    /// argument-definition name.
    pub(crate) fn resolve_token<T: ScriptType>(
        &self,
        host: &H,
        arg_name: &str,
        token: &str,
    ) -> ScriptResult<T> {
        self.resolve_token_depth(host, arg_name, token, 0)
    }

    fn resolve_token_depth<T: ScriptType>(
        &self,
        host: &H,
        arg_name: &str,
        token: &str,
        depth: u8,
    ) -> ScriptResult<T> {
        if depth > 16 {
            return Err(ScriptError::runtime(format!(
                "alias resolution cycle while resolving '{token}'"
            )));
        }

        if let Some(scopes) = self.scopes() {
            if let Some(bound) = scopes.lookup(token) {
                let next_token = bound.lexeme.clone();
                return self.resolve_token_depth(host, arg_name, &next_token, depth + 1);
            }
        }

        if T::IS_STRING {
            // Strings resolve the raw argument first, then the local-value
            // map is applied to the *resolved* string (so a bound/aliased
            // direction name still gets rewritten), per spec §4.3.
            let resolved = self.resolve_raw::<T>(host, token)?;
            let as_str = resolved.clone().into_value().to_display_string();
            if let Some(mapped) = self.local_values.rewrite(arg_name, &as_str) {
                return T::from_literal(mapped);
            }
            return Ok(resolved);
        }

        // Non-string types consult the local-value map before resolving the
        // raw argument, short-circuiting straight to a literal parse of the
        // rewritten value (`color "any"` -> `0xFFFF`), per spec §4.3.
        if let Some(mapped) = self.local_values.rewrite(arg_name, token) {
            return T::from_literal(mapped);
        }
        self.resolve_raw::<T>(host, token)
    }

    /// The shared tail of §4.2's chain once scope/local-map short-circuits
    /// have been ruled out: alias handler, then alias static, then literal.
    fn resolve_raw<T: ScriptType>(&self, host: &H, token: &str) -> ScriptResult<T> {
        if let Some(v) = self.aliases.resolve_handler::<T>(token, host) {
            return Ok(v);
        }
        if let Some(v) = self.aliases.resolve_static::<T>(token) {
            return Ok(v);
        }
        T::from_literal(token)
    }
}

/// Bundles a `Runtime` and its host for one [`Resolver`] call, so command
/// and expression handlers can call `args.next_as(&ctx)` without naming the
/// host type parameter twice.
pub struct ResolveCtx<'a, H> {
    pub runtime: &'a Runtime<H>,
    pub host: &'a H,
}

impl<'a, H: Host> Resolver for ResolveCtx<'a, H> {
    fn resolve<T: ScriptType>(&self, arg_name: &str, token: &str) -> ScriptResult<T> {
        self.runtime.resolve_token(self.host, arg_name, token)
    }

    fn local_values(&self) -> &LocalValueMap {
        &self.runtime.local_values
    }
}

pub fn resolve_ctx<'a, H>(runtime: &'a Runtime<H>, host: &'a H) -> ResolveCtx<'a, H> {
    ResolveCtx { runtime, host }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, NodeKind};
    use crate::host::mock::MockHost;
    use crate::value::Serial;

    #[test]
    fn scope_push_past_limit_raises_runtime_error() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        rt.limits.max_scope_depth = 1;
        let mut host = MockHost::new();

        let mut b = AstBuilder::new();
        let root = b.root();
        let outer_if = b.node(root, NodeKind::If);
        let outer_cond = b.node(outer_if, NodeKind::BinaryExpression);
        b.leaf(outer_cond, NodeKind::Integer, "1");
        b.node(outer_cond, NodeKind::Equal);
        b.leaf(outer_cond, NodeKind::Integer, "1");

        // Sibling of `outer_if`: part of its body, per the flat sibling-chain
        // AST convention.
        let inner_if = b.node(root, NodeKind::If);
        let inner_cond = b.node(inner_if, NodeKind::BinaryExpression);
        b.leaf(inner_cond, NodeKind::Integer, "1");
        b.node(inner_cond, NodeKind::Equal);
        b.leaf(inner_cond, NodeKind::Integer, "1");

        b.node(root, NodeKind::EndIf); // inner's
        b.node(root, NodeKind::EndIf); // outer's
        rt.start_script(b.build());

        // Step 1: enters `outer_if`, pushes the first (allowed) scope.
        crate::evaluator::step(&mut rt, &mut host).unwrap();
        // Step 2: enters `inner_if` while already at max_scope_depth.
        let err = crate::evaluator::step(&mut rt, &mut host);
        assert!(err.is_err(), "nesting past max_scope_depth should error");
    }

    #[test]
    fn non_string_rewrite_short_circuits_before_alias_lookup() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        rt.set_static_alias("any", Serial(0xDEAD));
        let host = MockHost::new();
        // `color "any"` is a non-string local-value rewrite (§4.3) and must
        // win over whatever "any" would otherwise resolve to as an alias.
        let color: u16 = rt.resolve_token(&host, "color", "any").unwrap();
        assert_eq!(color, 0xFFFF);
    }

    #[test]
    fn string_argument_resolves_then_applies_local_value_map() {
        let mut rt: Runtime<MockHost> = Runtime::new();
        let host = MockHost::new();
        // "southeast" is not an alias/scope binding, so it resolves to
        // itself first, then the local-value map rewrites the resolved
        // string (§4.3's string-specific ordering).
        let dir: String = rt.resolve_token(&host, "direction", "southeast").unwrap();
        assert_eq!(dir, "down");
    }
}
