//! Command registry and dispatch (spec §4.5): usage-string parsing,
//! per-command and per-group cooldowns, and the eight-step dispatch
//! algorithm. Modelled on `neo-vm`'s `JumpTable` (a keyword → handler
//! registry invoked from the execution loop) generalised from a 256-entry
//! opcode array to a keyword-keyed map, since UO Steam commands are named
//! rather than numbered.

use std::collections::HashMap;

use crate::argument::{Argument, ArgumentList};
use crate::error::{ScriptError, ScriptResult};
use crate::host::{Host, PrintKind};
use crate::runtime::{ResolveCtx, Runtime};

/// Cooldown bucket shared by semantically related commands (spec glossary).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    None,
    PickUp,
    DClick,
}

/// `@`/`!` statement modifiers (spec glossary).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub quiet: bool,
    pub force: bool,
}

/// Outcome of one dispatch attempt (Design Note §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Forward progress was made; the evaluator may advance past the
    /// statement.
    Consumed,
    /// No progress yet (cooldown not elapsed); retry this same statement
    /// on the next tick.
    Retry,
}

/// A registered command's handler. Takes the runtime, the host capability
/// bundle, the materialised argument list and the statement's modifiers.
pub type CommandHandler<H> =
    fn(&mut Runtime<H>, &mut H, &mut ArgumentList, Flags) -> ScriptResult<Dispatch>;

#[derive(Clone)]
pub struct CommandDef<H> {
    pub keyword: String,
    pub usage: String,
    pub mandatory_arg_count: usize,
    pub expected_arg_names: Vec<String>,
    pub wait_ms: u64,
    pub group: Group,
    pub handler: CommandHandler<H>,
}

/// Parses a usage string into `(keyword, mandatory_count, expected_names)`
/// per spec §4.5: the first token is the keyword; `(name)` tokens count as
/// mandatory, `[name]` tokens are optional; brackets are stripped either way.
pub fn parse_usage(usage: &str) -> (String, usize, Vec<String>) {
    let mut tokens = usage.split_whitespace();
    let keyword = tokens.next().unwrap_or_default().to_string();
    let mut mandatory = 0;
    let mut names = Vec::new();
    for token in tokens {
        if token.starts_with('(') {
            mandatory += 1;
        }
        let stripped: String = token.chars().filter(|c| !"()[]".contains(*c)).collect();
        names.push(stripped);
    }
    (keyword, mandatory, names)
}

/// Registry of every command the interpreter knows about.
pub struct CommandRegistry<H> {
    commands: HashMap<String, CommandDef<H>>,
    group_wait_ms: HashMap<Group, u64>,
}

impl<H> Default for CommandRegistry<H> {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
            group_wait_ms: HashMap::new(),
        }
    }
}

impl<H> CommandRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command from its usage string (spec §4.5).
    pub fn register(&mut self, usage: &str, wait_ms: u64, group: Group, handler: CommandHandler<H>) {
        let (keyword, mandatory, names) = parse_usage(usage);
        self.commands.insert(
            keyword.to_lowercase(),
            CommandDef {
                keyword,
                usage: usage.to_string(),
                mandatory_arg_count: mandatory,
                expected_arg_names: names,
                wait_ms,
                group,
                handler,
            },
        );
    }

    pub fn set_group_wait(&mut self, group: Group, wait_ms: u64) {
        self.group_wait_ms.insert(group, wait_ms);
    }

    pub fn group_wait(&self, group: Group) -> u64 {
        self.group_wait_ms.get(&group).copied().unwrap_or(0)
    }

    pub fn get(&self, keyword: &str) -> Option<&CommandDef<H>> {
        self.commands.get(&keyword.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

/// Runs the eight-step dispatch algorithm of spec §4.5 for one `COMMAND`
/// node's already-split keyword and raw argument tokens.
pub fn dispatch<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    keyword: &str,
    raw_args: &[Argument],
    flags: Flags,
) -> ScriptResult<Dispatch> {
    use crate::host::Clock;

    let def = match rt.commands.get(keyword) {
        Some(def) => def.clone(),
        None => {
            let err = ScriptError::runtime(format!("Command is not defined: {keyword}"));
            return if flags.quiet { Ok(Dispatch::Consumed) } else { Err(err) };
        }
    };

    if raw_args.len() < def.mandatory_arg_count {
        host.print(&def.usage, PrintKind::System);
        return Ok(Dispatch::Consumed);
    }

    let now = host.now_ticks();
    let cmd_last = rt.last_cmd_exec.get(&def.keyword.to_lowercase()).copied();
    let group_last = rt.last_group_exec.get(&def.group).copied();
    let group_wait = rt.commands.group_wait(def.group).max(def.wait_ms);

    let cmd_ready = cmd_last.map_or(true, |t| now.saturating_sub(t) > def.wait_ms);
    let group_ready =
        def.group == Group::None || group_last.map_or(true, |t| now.saturating_sub(t) > group_wait);

    if !cmd_ready || !group_ready {
        log::trace!("dispatch: {} not ready (cooldown)", def.keyword);
        return Ok(Dispatch::Retry);
    }

    let mut arglist = ArgumentList::new(raw_args, def.mandatory_arg_count, &def.expected_arg_names);
    let result = (def.handler)(rt, host, &mut arglist, flags);
    rt.clear_timeout();

    match result {
        Ok(Dispatch::Consumed) => {
            rt.last_cmd_exec.insert(def.keyword.to_lowercase(), now);
            if def.group != Group::None {
                rt.last_group_exec.insert(def.group, now);
            }
            Ok(Dispatch::Consumed)
        }
        Ok(Dispatch::Retry) => Ok(Dispatch::Retry),
        Err(ScriptError::Command { message }) => {
            host.print(&format!("{}: {message}", def.keyword), PrintKind::System);
            Ok(Dispatch::Consumed)
        }
        Err(ScriptError::Syntax { .. }) => {
            host.print(&def.usage, PrintKind::System);
            Ok(Dispatch::Consumed)
        }
        Err(err) if flags.quiet && err.is_quietable() => {
            log::debug!("dispatch: {} swallowed under @: {err}", def.keyword);
            Ok(Dispatch::Consumed)
        }
        Err(err) => Err(err),
    }
}

/// Builds a [`ResolveCtx`] for resolving a dispatched command's arguments.
/// Exists so command handlers can call `args.next_as(&ctx)` without naming
/// `Runtime`'s host type parameter twice.
pub fn resolve_ctx<'a, H>(rt: &'a Runtime<H>, host: &'a H) -> ResolveCtx<'a, H> {
    ResolveCtx { runtime: rt, host }
}
