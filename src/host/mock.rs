//! A hand-rolled double implementing every [`super::Host`] capability
//! trait against in-memory state, in the spirit of `neo-vm`'s
//! `tests/mock_io.rs` — a plain struct, not a mocking-framework proxy,
//! since the capability surface here is small enough that a typed double
//! reads closer to the teacher's own tests than a generated one would.

use std::collections::HashMap;

use crate::error::{ScriptError, ScriptResult};
use crate::value::Serial;

use super::{
    AbilityKind, Actions, Clock, Hand, ItemInfo, Layer, MobileInfo, Player, PlayerStats,
    PrintKind, PromptKind, Sink, TargetPrompt, TargetToken, World,
};

/// In-memory host double for tests and benchmarks.
#[derive(Default)]
pub struct MockHost {
    pub now: u64,
    pub printed: Vec<String>,
    pub system_printed: Vec<String>,

    pub serial: Serial,
    pub stats: PlayerStats,
    pub dead: bool,
    pub hidden: bool,
    pub paralyzed: bool,
    pub poisoned: bool,
    pub war_mode: bool,
    pub mounted: bool,
    pub mount_serial: Option<Serial>,
    pub holding: Option<Serial>,
    pub layers: HashMap<Layer, Serial>,
    pub hands: HashMap<Hand, Serial>,

    pub mobiles: HashMap<Serial, MobileInfo>,
    pub items: HashMap<Serial, ItemInfo>,

    pub picked_up: Vec<(Serial, u32)>,
    pub dropped: Vec<(Serial, i32, i32, i32, Serial)>,
    pub equipped: Vec<(Serial, Layer, Serial)>,
    pub double_clicked: Vec<Serial>,
    pub single_clicked: Vec<Serial>,
    pub attacked: Vec<Serial>,
    pub renamed: Vec<(Serial, String)>,
    pub said: Vec<(String, u16)>,
    pub skills_used: Vec<u32>,
    pub abilities_used: Vec<AbilityKind>,
    pub ability_settings_used: Vec<String>,
    pub fed: Vec<(Serial, u16)>,
    pub walked: Vec<String>,
    pub turned: Vec<String>,
    pub ran: Vec<String>,
    pub toggled_hands: Vec<Hand>,
    pub cleared_hands: Vec<Hand>,

    pub next_prompt_token: u64,
    pub pending_prompts: HashMap<TargetToken, Option<Serial>>,

    /// When set, `pick_up`/`drop`/`equip` fail with this message instead of
    /// succeeding — lets a test exercise the `CommandError` path.
    pub fail_actions_with: Option<String>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_clock(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl Clock for MockHost {
    fn now_ticks(&self) -> u64 {
        self.now
    }
}

impl Sink for MockHost {
    fn print(&mut self, text: &str, kind: PrintKind) {
        match kind {
            PrintKind::System => self.system_printed.push(text.to_string()),
            PrintKind::Regular => self.printed.push(text.to_string()),
        }
    }
}

impl Player for MockHost {
    fn serial(&self) -> Serial {
        self.serial
    }

    fn stats(&self) -> PlayerStats {
        self.stats
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn is_paralyzed(&self) -> bool {
        self.paralyzed
    }

    fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn in_war_mode(&self) -> bool {
        self.war_mode
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn mount_serial(&self) -> Option<Serial> {
        self.mount_serial
    }

    fn find_item_by_layer(&self, layer: Layer) -> Option<Serial> {
        self.layers.get(&layer).copied()
    }

    fn find_item_by_hand(&self, hand: Hand) -> Option<Serial> {
        self.hands.get(&hand).copied()
    }

    fn holding_item(&self) -> Option<Serial> {
        self.holding
    }
}

impl World for MockHost {
    fn get_mobile(&self, serial: Serial) -> Option<MobileInfo> {
        self.mobiles.get(&serial).cloned()
    }

    fn get_item(&self, serial: Serial) -> Option<ItemInfo> {
        self.items.get(&serial).cloned()
    }

    fn find_item_by_graphic(
        &self,
        graphic: u16,
        color: u16,
        container: Serial,
        _amount: u32,
        _range: i32,
    ) -> Option<Serial> {
        self.items
            .values()
            .find(|item| {
                item.graphic == graphic
                    && (color == 0xFFFF || item.color == color)
                    && (container == Serial::ANY || item.container == container)
            })
            .map(|item| item.serial)
    }

    fn find_item_on_ground(&self, graphic: u16, color: u16, _range: i32) -> Option<Serial> {
        self.items
            .values()
            .find(|item| item.graphic == graphic && (color == 0xFFFF || item.color == color) && item.container == Serial::GROUND)
            .map(|item| item.serial)
    }
}

impl Actions for MockHost {
    fn pick_up(&mut self, serial: Serial, amount: u32) -> ScriptResult<()> {
        if let Some(message) = &self.fail_actions_with {
            return Err(ScriptError::command(message.clone()));
        }
        self.picked_up.push((serial, amount));
        self.holding = Some(serial);
        Ok(())
    }

    fn drop(&mut self, serial: Serial, x: i32, y: i32, z: i32, container: Serial) -> ScriptResult<()> {
        if let Some(message) = &self.fail_actions_with {
            return Err(ScriptError::command(message.clone()));
        }
        self.dropped.push((serial, x, y, z, container));
        self.holding = None;
        Ok(())
    }

    fn equip(&mut self, serial: Serial, layer: Layer, container: Serial) -> ScriptResult<()> {
        if let Some(message) = &self.fail_actions_with {
            return Err(ScriptError::command(message.clone()));
        }
        self.equipped.push((serial, layer, container));
        self.layers.insert(layer, serial);
        Ok(())
    }

    fn double_click(&mut self, serial: Serial) {
        self.double_clicked.push(serial);
    }

    fn single_click(&mut self, serial: Serial) {
        self.single_clicked.push(serial);
    }

    fn attack(&mut self, serial: Serial) {
        self.attacked.push(serial);
    }

    fn rename(&mut self, serial: Serial, name: &str) {
        self.renamed.push((serial, name.to_string()));
    }

    fn say(&mut self, text: &str, hue: u16) {
        self.said.push((text.to_string(), hue));
    }

    fn use_skill(&mut self, index: u32) {
        self.skills_used.push(index);
    }

    fn ability(&mut self, which: AbilityKind) {
        self.abilities_used.push(which);
    }

    fn use_ability_setting(&mut self, name: &str) {
        self.ability_settings_used.push(name.to_string());
    }

    fn feed(&mut self, serial: Serial, graphic: u16) {
        self.fed.push((serial, graphic));
    }

    fn walk(&mut self, direction: &str) {
        self.walked.push(direction.to_string());
    }

    fn turn(&mut self, direction: &str) {
        self.turned.push(direction.to_string());
    }

    fn run(&mut self, direction: &str) {
        self.ran.push(direction.to_string());
    }

    fn toggle_hands(&mut self, hand: Hand) {
        self.toggled_hands.push(hand);
    }

    fn clear_hands(&mut self, hand: Hand) {
        self.cleared_hands.push(hand);
    }
}

impl TargetPrompt for MockHost {
    fn begin_prompt(&mut self, _kind: PromptKind) -> TargetToken {
        let token = TargetToken(self.next_prompt_token);
        self.next_prompt_token += 1;
        self.pending_prompts.insert(token, None);
        token
    }

    fn poll_prompt(&mut self, token: TargetToken) -> Option<Serial> {
        self.pending_prompts.get(&token).copied().flatten()
    }
}
