//! Lazy typed arguments (spec §3, §4.3) and the local-value map used to
//! rewrite argument-local aliases (`color "any"` → `0xFFFF`, direction
//! names → UO's eight movement keywords) ahead of type coercion.

use std::collections::HashMap;

use crate::ast::{Ast, NodeId};
use crate::error::{ScriptError, ScriptResult};
use crate::value::ScriptType;

/// A lazy typed view over a token. Two arguments are equal iff their
/// lexemes match (spec §3) — this holds whether the argument came from an
/// AST `OPERAND` node or was synthesised by the evaluator as a "virtual"
/// argument (e.g. exploding `walk "N,E"` into per-direction statements).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub lexeme: String,
}

impl Argument {
    /// A virtual argument: a literal with no owning AST node.
    pub fn literal(lexeme: impl Into<String>) -> Self {
        Self {
            lexeme: lexeme.into(),
        }
    }

    pub fn from_node(ast: &Ast, node: NodeId) -> Self {
        Self::literal(ast.lexeme(node).unwrap_or_default())
    }
}

/// Per-`(argument_name, literal)` rewrites plus per-`argument_name`
/// defaults for missing optional arguments (spec §4.3, §4.7).
#[derive(Clone, Debug, Default)]
pub struct LocalValueMap {
    rewrites: HashMap<(String, String), String>,
    defaults: HashMap<String, String>,
}

impl LocalValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_rewrite(
        &mut self,
        arg_name: impl Into<String>,
        literal: impl Into<String>,
        replacement: impl Into<String>,
    ) {
        self.rewrites.insert(
            (arg_name.into().to_lowercase(), literal.into().to_lowercase()),
            replacement.into(),
        );
    }

    pub fn register_default(&mut self, arg_name: impl Into<String>, literal: impl Into<String>) {
        self.defaults.insert(arg_name.into().to_lowercase(), literal.into());
    }

    /// Looks up a rewrite for `literal` under `arg_name`. Case-insensitive.
    pub fn rewrite(&self, arg_name: &str, literal: &str) -> Option<&str> {
        self.rewrites
            .get(&(arg_name.to_lowercase(), literal.to_lowercase()))
            .map(|s| s.as_str())
    }

    pub fn default_literal(&self, arg_name: &str) -> Option<&str> {
        self.defaults.get(&arg_name.to_lowercase()).map(|s| s.as_str())
    }

    /// Installs the UO direction aliases (`southeast` → `down`, etc.) and
    /// the per-command defaults spec §4.7 calls out by name.
    pub fn with_builtins() -> Self {
        let mut map = Self::new();
        let directions = [
            ("north", "north"),
            ("northeast", "right"),
            ("right", "right"),
            ("east", "east"),
            ("southeast", "down"),
            ("down", "down"),
            ("south", "south"),
            ("southwest", "left"),
            ("left", "left"),
            ("west", "west"),
            ("northwest", "up"),
            ("up", "up"),
        ];
        for (name, canonical) in directions {
            map.register_rewrite("direction", name, canonical);
        }
        map.register_rewrite("color", "any", "0xFFFF");
        map.register_default("color", "0xFFFF");
        map.register_rewrite("source", "any", "0");
        map.register_rewrite("source", "ground", &u32::MAX.to_string());
        map.register_default("range", &i32::MAX.to_string());
        map
    }
}

/// Something that can resolve a raw token to `T`, implemented by
/// [`crate::runtime::Runtime`]. Kept as a trait so [`ArgumentList`] does
/// not need to name `Runtime`'s host type parameter.
pub trait Resolver {
    fn resolve<T: ScriptType>(&self, arg_name: &str, token: &str) -> ScriptResult<T>;
    fn local_values(&self) -> &LocalValueMap;
}

/// A command or expression's materialised argument list (spec §4.3).
pub struct ArgumentList<'a> {
    args: &'a [Argument],
    mandatory: usize,
    expected_names: &'a [String],
    cursor: usize,
}

impl<'a> ArgumentList<'a> {
    pub fn new(args: &'a [Argument], mandatory: usize, expected_names: &'a [String]) -> Self {
        Self {
            args,
            mandatory,
            expected_names,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.args.len()
    }

    /// Random access to the raw, unresolved argument at `i`.
    pub fn index_get(&self, i: usize) -> Option<&Argument> {
        self.args.get(i)
    }

    fn name_for(&self, idx: usize) -> String {
        self.expected_names.get(idx).cloned().unwrap_or_default()
    }

    /// Advances the cursor and resolves the next argument to `T`.
    pub fn next_as<T: ScriptType, R: Resolver>(&mut self, resolver: &R) -> ScriptResult<T> {
        let idx = self.cursor;
        self.cursor += 1;

        if idx >= self.args.len() {
            if idx >= self.mandatory {
                return Ok(self.default_value::<T, R>(idx, resolver));
            }
            return Err(ScriptError::syntax(format!("argument {} missing", idx + 1)));
        }

        let arg_name = self.name_for(idx);
        resolver.resolve::<T>(&arg_name, &self.args[idx].lexeme)
    }

    fn default_value<T: ScriptType, R: Resolver>(&self, idx: usize, resolver: &R) -> T {
        let arg_name = self.name_for(idx);
        match resolver
            .local_values()
            .default_literal(&arg_name)
            .and_then(|lit| T::from_literal(lit).ok())
        {
            Some(value) => value,
            None => T::zero_default(),
        }
    }

    /// Advances the cursor, splits the argument's string form on commas and
    /// resolves each piece to `T` (spec §4.3). A missing optional argument
    /// returns a one-element array containing the default.
    pub fn next_as_array<T: ScriptType, R: Resolver>(
        &mut self,
        resolver: &R,
    ) -> ScriptResult<Vec<T>> {
        let idx = self.cursor;
        self.cursor += 1;

        if idx >= self.args.len() {
            if idx >= self.mandatory {
                return Ok(vec![self.default_value::<T, R>(idx, resolver)]);
            }
            return Err(ScriptError::syntax(format!("argument {} missing", idx + 1)));
        }

        let arg_name = self.name_for(idx);
        let text: String = resolver.resolve::<String>(&arg_name, &self.args[idx].lexeme)?;

        let mut out = Vec::new();
        for piece in text.split(',') {
            let piece = piece.trim();
            let mapped = resolver.local_values().rewrite(&arg_name, piece);
            let literal = mapped.unwrap_or(piece);
            out.push(T::from_literal(literal)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubResolver(LocalValueMap);

    impl Resolver for StubResolver {
        fn resolve<T: ScriptType>(&self, arg_name: &str, token: &str) -> ScriptResult<T> {
            if let Some(mapped) = self.0.rewrite(arg_name, token) {
                return T::from_literal(mapped);
            }
            T::from_literal(token)
        }

        fn local_values(&self) -> &LocalValueMap {
            &self.0
        }
    }

    #[test]
    fn color_any_short_circuits_to_ffff() {
        let resolver = StubResolver(LocalValueMap::with_builtins());
        let names = vec!["color".to_string()];
        let args = vec![Argument::literal("any")];
        let mut list = ArgumentList::new(&args, 1, &names);
        let color: u16 = list.next_as(&resolver).unwrap();
        assert_eq!(color, 0xFFFF);
    }

    #[test]
    fn missing_optional_returns_default() {
        let resolver = StubResolver(LocalValueMap::with_builtins());
        let names = vec!["color".to_string()];
        let args: Vec<Argument> = vec![];
        let mut list = ArgumentList::new(&args, 0, &names);
        let color: u16 = list.next_as(&resolver).unwrap();
        assert_eq!(color, 0xFFFF);
    }

    #[test]
    fn missing_mandatory_is_syntax_error() {
        let resolver = StubResolver(LocalValueMap::with_builtins());
        let names = vec!["serial".to_string()];
        let args: Vec<Argument> = vec![];
        let mut list = ArgumentList::new(&args, 1, &names);
        let result: ScriptResult<u32> = list.next_as(&resolver);
        assert!(matches!(result, Err(ScriptError::Syntax { .. })));
    }

    #[test]
    fn array_argument_splits_on_comma() {
        let resolver = StubResolver(LocalValueMap::with_builtins());
        let names = vec!["direction".to_string()];
        let args = vec![Argument::literal("North,East,East")];
        let mut list = ArgumentList::new(&args, 1, &names);
        let dirs: Vec<String> = list.next_as_array(&resolver).unwrap();
        assert_eq!(dirs, vec!["north", "east", "east"]);
    }
}
