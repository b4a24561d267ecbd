//! An embedded, host-driven interpreter for UO Steam: a small imperative
//! scripting language for automating game-client actions.
//!
//! The crate owns the tree-walking evaluator, the alias/list/timer
//! stores and the command/expression dispatcher; it knows nothing about
//! networking, rendering or the lexer/parser that produces the [`ast::Ast`]
//! it walks. A host embeds this crate by implementing [`host::Host`],
//! calling [`register`] once, loading a parsed script with
//! [`runtime::Runtime::start_script`], and driving it forward with
//! [`evaluator::step`] on whatever cadence its own main loop uses — never
//! blocking, always one statement of forward progress per call.

pub mod alias;
pub mod argument;
pub mod ast;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod host;
pub mod itemext;
pub mod list;
pub mod multistep;
pub mod runtime;
pub mod scope;
pub mod timer;
pub mod value;

pub use error::{ScriptError, ScriptResult};
pub use host::Host;
pub use runtime::Runtime;

/// Boots a fresh [`Runtime`] with every built-in command and expression
/// registered (spec §5: "initialised once at `register()`"). Hosts that
/// need additional host-specific commands or aliases should call
/// [`Runtime::register_command`]/[`Runtime::set_static_alias`] afterward.
pub fn register<H: Host>() -> Runtime<H> {
    let mut rt = Runtime::new();
    commands::register_all(&mut rt);
    rt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, NodeKind};
    use crate::host::mock::MockHost;

    #[test]
    fn register_wires_up_a_runtime_that_can_run_a_script() {
        let mut rt: Runtime<MockHost> = register();
        let mut host = MockHost::new();

        let mut b = AstBuilder::new();
        let root = b.root();
        b.command(root, "msg", &["hi"]);
        b.node(root, NodeKind::Stop);
        rt.start_script(b.build());

        for _ in 0..5 {
            if !rt.is_running() {
                break;
            }
            evaluator::step(&mut rt, &mut host).unwrap();
        }

        assert_eq!(host.said, vec![("hi".to_string(), 0)]);
        assert!(!rt.is_running());
    }
}
