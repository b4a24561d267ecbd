//! The global alias store (spec §3, §4.2): per-type static values and
//! handler callbacks, keyed by lowercase name. Handlers take precedence
//! over statics. Modelled as a single tagged [`Value`] bucketed by
//! [`TypeTag`] rather than a runtime-generic `map[Type]→map`, per Design
//! Note §9.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::host::{Hand, Host, Layer, Player};
use crate::runtime::Runtime;
use crate::value::{ScriptType, Serial, TypeTag, Value};

type Handler<H> = Rc<dyn Fn(&H) -> Option<Value>>;

/// Process-wide (per the host's `Runtime`) alias store.
pub struct AliasStore<H> {
    statics: HashMap<(TypeTag, String), Value>,
    handlers: HashMap<(TypeTag, String), Handler<H>>,
}

impl<H> Default for AliasStore<H> {
    fn default() -> Self {
        Self {
            statics: HashMap::new(),
            handlers: HashMap::new(),
        }
    }
}

impl<H> AliasStore<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or overwrites) a static value for `name` under `T`'s tag.
    pub fn set_static<T: ScriptType>(&mut self, name: &str, value: T) {
        self.statics
            .insert((T::TAG, name.to_lowercase()), value.into_value());
    }

    /// Registers (or overwrites) a handler for `name` under `T`'s tag. The
    /// handler receives the host context (whatever `H` is — typically a
    /// reference bundle of the capability traits of spec §6) and may
    /// decline to resolve by returning `None`.
    pub fn set_handler<T, F>(&mut self, name: &str, handler: F)
    where
        T: ScriptType,
        F: Fn(&H) -> Option<T> + 'static,
    {
        let wrapped: Handler<H> = Rc::new(move |host| handler(host).map(ScriptType::into_value));
        self.handlers.insert((T::TAG, name.to_lowercase()), wrapped);
    }

    /// Step (ii) of §4.2: a registered handler for `T` + `name`.
    pub fn resolve_handler<T: ScriptType>(&self, name: &str, host: &H) -> Option<T> {
        let key = (T::TAG, name.to_lowercase());
        self.handlers.get(&key).and_then(|f| f(host)).and_then(|v| T::from_value(&v))
    }

    /// Step (iii) of §4.2: a static value for `T` + `name`.
    pub fn resolve_static<T: ScriptType>(&self, name: &str) -> Option<T> {
        let key = (T::TAG, name.to_lowercase());
        self.statics.get(&key).and_then(|v| T::from_value(v))
    }

    /// Every registered name for `T`'s bucket (handlers ∪ statics), for
    /// host-side introspection/diagnostics.
    pub fn names_for(&self, tag: TypeTag) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .statics
            .keys()
            .chain(self.handlers.keys())
            .filter(|(t, _)| *t == tag)
            .map(|(_, n)| n.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn clear(&mut self) {
        self.statics.clear();
        self.handlers.clear();
    }

    /// Removes every entry for `name`, across all type tags (spec §4.2's
    /// `unsetalias`: the name is unbound regardless of which bucket it
    /// lives in).
    pub fn unset(&mut self, name: &str) {
        let name = name.to_lowercase();
        self.statics.retain(|(_, n), _| n != &name);
        self.handlers.retain(|(_, n), _| n != &name);
    }
}

/// Registers the boot-time aliases spec §4.2 requires at minimum:
/// `backpack`, `bank`, `lefthand`, `righthand`, `mount`, `self`, `last`,
/// `lasttarget`, `lastobject`, `enemy`, `friend`, `ground`, `any`.
///
/// The container/hand/mount/self aliases are handler-backed against the
/// live `Host`; `ground`/`any` are the fixed §3 source sentinels. `last`,
/// `lasttarget`, `lastobject`, `enemy` and `friend` have no host primitive
/// to compute them from (target acquisition and notoriety-based targeting
/// are outside this crate's capability surface) — they're registered as
/// the neutral `any` sentinel so resolving them before a script ever binds
/// them (e.g. via `setalias`/`promptalias`) fails closed instead of erroring.
pub fn register_boot_aliases<H: Host>(rt: &mut Runtime<H>) {
    rt.set_alias_handler::<Serial, _>("self", |host: &H| Some(host.serial()));
    rt.set_alias_handler::<Serial, _>("backpack", |host: &H| host.find_item_by_layer(Layer::Backpack));
    rt.set_alias_handler::<Serial, _>("bank", |host: &H| host.find_item_by_layer(Layer::Bank));
    rt.set_alias_handler::<Serial, _>("lefthand", |host: &H| host.find_item_by_hand(Hand::Left));
    rt.set_alias_handler::<Serial, _>("righthand", |host: &H| host.find_item_by_hand(Hand::Right));

    // `mount` is sticky (spec §4.2): while mounted it resolves from the
    // player's mount layer; while unmounted it returns the last known
    // value, tracked in this `Cell` shared into the handler closure.
    let last_mount: Rc<Cell<Option<Serial>>> = Rc::new(Cell::new(None));
    rt.set_alias_handler::<Serial, _>("mount", move |host: &H| match host.mount_serial() {
        Some(serial) => {
            last_mount.set(Some(serial));
            Some(serial)
        }
        None => last_mount.get(),
    });

    rt.set_static_alias("ground", Serial::GROUND);
    rt.set_static_alias("any", Serial::ANY);

    for name in ["last", "lasttarget", "lastobject", "enemy", "friend"] {
        rt.set_static_alias(name, Serial::ANY);
    }
}

impl<H> std::fmt::Debug for AliasStore<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasStore")
            .field("statics", &self.statics)
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Serial;

    #[test]
    fn handler_takes_precedence_over_static() {
        let mut store: AliasStore<()> = AliasStore::new();
        store.set_static("self", Serial(1));
        store.set_handler::<Serial, _>("self", |_| Some(Serial(2)));
        assert_eq!(store.resolve_handler::<Serial>("self", &()), Some(Serial(2)));
        assert_eq!(store.resolve_static::<Serial>("self"), Some(Serial(1)));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut store: AliasStore<()> = AliasStore::new();
        store.set_static("Backpack", Serial(7));
        assert_eq!(store.resolve_static::<Serial>("backpack"), Some(Serial(7)));
    }

    #[test]
    fn resolution_is_idempotent_within_a_tick() {
        let mut store: AliasStore<()> = AliasStore::new();
        store.set_static("gold", 100u32);
        let a = store.resolve_static::<u32>("gold");
        let b = store.resolve_static::<u32>("gold");
        assert_eq!(a, b);
    }
}
