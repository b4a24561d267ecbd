//! The capability surface the core consumes from its embedder (spec §6).
//! Every built-in command and expression is written against these traits
//! and nothing else; the lexer/parser, world model, network path and UI
//! sink are all external collaborators.

use crate::error::ScriptResult;
use crate::value::Serial;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

/// Sink message classification (spec §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrintKind {
    System,
    Regular,
}

/// Monotonic clock the runtime polls for cooldowns, pauses and timeouts.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch fixed for the process.
    fn now_ticks(&self) -> u64;
}

/// The host's print/log surface.
pub trait Sink {
    fn print(&mut self, text: &str, kind: PrintKind);
}

/// Resistances snapshot (spec §6).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Resistances {
    pub physical: i32,
    pub fire: i32,
    pub cold: i32,
    pub poison: i32,
    pub energy: i32,
}

/// A read of the player's numeric stats at the instant it's requested.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerStats {
    pub hits: i32,
    pub max_hits: i32,
    pub stamina: i32,
    pub max_stamina: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub gold: u32,
    pub followers: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub resistances: Resistances,
}

/// Paperdoll equipment layer (subset needed by `equipitem`/`findtype`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    RightHand,
    LeftHand,
    Mount,
    Backpack,
    Bank,
    Other(u8),
}

/// Which hand a `usetype`-style lookup addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

/// Primary/secondary ability slot, per spec §6's `Actions::ability`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbilityKind {
    Primary,
    Secondary,
    Stun,
    Disarm,
    Clear,
}

/// The host-side player model.
pub trait Player {
    fn serial(&self) -> Serial;
    fn stats(&self) -> PlayerStats;
    fn is_dead(&self) -> bool;
    fn is_hidden(&self) -> bool;
    fn is_paralyzed(&self) -> bool;
    fn is_poisoned(&self) -> bool;
    fn in_war_mode(&self) -> bool;
    fn is_mounted(&self) -> bool;
    /// The serial of the player's mount, when mounted.
    fn mount_serial(&self) -> Option<Serial>;
    fn find_item_by_layer(&self, layer: Layer) -> Option<Serial>;
    fn find_item_by_hand(&self, hand: Hand) -> Option<Serial>;
    /// The item currently held on the drag cursor, if any (spec §4.6:
    /// `moveitem`'s "already holding an item" check).
    fn holding_item(&self) -> Option<Serial>;
}

/// A snapshot of a mobile (NPC/player) in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct MobileInfo {
    pub serial: Serial,
    pub name: String,
    pub hits: i32,
    pub max_hits: i32,
    pub notoriety: u8,
}

/// A snapshot of an item in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemInfo {
    pub serial: Serial,
    pub graphic: u16,
    pub color: u16,
    pub amount: u32,
    pub container: Serial,
    pub layer: Option<Layer>,
}

/// Read-only access to the world model.
pub trait World {
    fn get_mobile(&self, serial: Serial) -> Option<MobileInfo>;
    fn get_item(&self, serial: Serial) -> Option<ItemInfo>;
    fn find_item_by_graphic(
        &self,
        graphic: u16,
        color: u16,
        container: Serial,
        amount: u32,
        range: i32,
    ) -> Option<Serial>;
    fn find_item_on_ground(&self, graphic: u16, color: u16, range: i32) -> Option<Serial>;
}

/// The mutating, network-facing side of the capability contract.
///
/// `pick_up`/`drop`/`equip` return a [`ScriptResult`] so domain failures
/// ("item not found", "already holding an item") surface as
/// [`crate::error::ScriptError::Command`] the way spec §4.6 describes;
/// the fire-and-forget actions below them have no failure mode the core
/// needs to observe.
pub trait Actions {
    fn pick_up(&mut self, serial: Serial, amount: u32) -> ScriptResult<()>;
    fn drop(&mut self, serial: Serial, x: i32, y: i32, z: i32, container: Serial) -> ScriptResult<()>;
    fn equip(&mut self, serial: Serial, layer: Layer, container: Serial) -> ScriptResult<()>;
    fn double_click(&mut self, serial: Serial);
    fn single_click(&mut self, serial: Serial);
    fn attack(&mut self, serial: Serial);
    fn rename(&mut self, serial: Serial, name: &str);
    fn say(&mut self, text: &str, hue: u16);
    fn use_skill(&mut self, index: u32);
    fn ability(&mut self, which: AbilityKind);
    fn use_ability_setting(&mut self, name: &str);
    fn feed(&mut self, serial: Serial, graphic: u16);
    fn walk(&mut self, direction: &str);
    fn turn(&mut self, direction: &str);
    fn run(&mut self, direction: &str);
    fn toggle_hands(&mut self, hand: Hand);
    fn clear_hands(&mut self, hand: Hand);
}

/// Opaque handle to an in-flight target prompt (spec §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetToken(pub u64);

/// What kind of target cursor `promptalias` should raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Object,
    Ground,
}

/// The (asynchronous, from the host's perspective) targeting cursor.
pub trait TargetPrompt {
    fn begin_prompt(&mut self, kind: PromptKind) -> TargetToken;
    fn poll_prompt(&mut self, token: TargetToken) -> Option<Serial>;
}

/// Convenience supertrait bundling the full capability surface. Built-in
/// commands and expressions are generic over any `H: Host`.
pub trait Host: Clock + Sink + Player + World + Actions + TargetPrompt {}

impl<T> Host for T where T: Clock + Sink + Player + World + Actions + TargetPrompt {}
