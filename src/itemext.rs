//! `ItemExt` table loading (spec §6): a `graphic, paperdoll_appearance,
//! required_hands` table that informs `equipitem`'s conflict resolution.
//! Loaded once by the host and handed to the runtime; this module owns
//! only the parsing.

use crate::host::Layer;

/// Where an item sits once worn, for the subset of layers `ItemExt` cares
/// about (spec §6: `paperdoll_appearance ∈ {Invalid, Left, Right}`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaperdollAppearance {
    Invalid,
    Left,
    Right,
}

/// How many hands wielding the item occupies (spec §6:
/// `required_hands ∈ {Invalid, One, Two}`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredHands {
    Invalid,
    One,
    Two,
}

/// One parsed `ItemExt` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemExtRow {
    pub graphic: u16,
    pub appearance: PaperdollAppearance,
    pub required_hands: RequiredHands,
}

impl ItemExtRow {
    /// Graphics with no table entry default to `Invalid`/`Invalid` (spec §6).
    pub fn unknown(graphic: u16) -> Self {
        Self {
            graphic,
            appearance: PaperdollAppearance::Invalid,
            required_hands: RequiredHands::Invalid,
        }
    }

    /// Whether this item occupies a two-handed grip, used by `equipitem`
    /// to decide whether the other hand's current item must be unequipped
    /// first.
    pub fn is_two_handed(&self) -> bool {
        matches!(self.required_hands, RequiredHands::Two)
    }

    /// The paperdoll layer this row's appearance maps to, for the hand
    /// layers only (`Invalid` rows carry no layer opinion).
    pub fn layer(&self) -> Option<Layer> {
        match self.appearance {
            PaperdollAppearance::Left => Some(Layer::LeftHand),
            PaperdollAppearance::Right => Some(Layer::RightHand),
            PaperdollAppearance::Invalid => None,
        }
    }
}

fn parse_appearance(token: &str) -> Option<PaperdollAppearance> {
    match token.trim().to_ascii_lowercase().as_str() {
        "invalid" => Some(PaperdollAppearance::Invalid),
        "left" => Some(PaperdollAppearance::Left),
        "right" => Some(PaperdollAppearance::Right),
        _ => None,
    }
}

fn parse_hands(token: &str) -> Option<RequiredHands> {
    match token.trim().to_ascii_lowercase().as_str() {
        "invalid" => Some(RequiredHands::Invalid),
        "one" => Some(RequiredHands::One),
        "two" => Some(RequiredHands::Two),
        _ => None,
    }
}

/// Parses the full `ItemExt` table text. A malformed line (wrong column
/// count, an unparseable graphic, or an unrecognised enum word) is
/// skipped with a logged warning rather than failing the whole load —
/// the source data ships from the game client's own export and a bad row
/// should not take down every `equipitem` call (Open Question, see
/// `DESIGN.md`).
pub fn parse_item_ext(text: &str) -> Vec<ItemExtRow> {
    let mut rows = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [graphic, appearance, required_hands] = fields[..] else {
            log::warn!("itemext: line {} has {} fields, expected 3", lineno + 1, fields.len());
            continue;
        };
        let Some(graphic) = parse_graphic(graphic) else {
            log::warn!("itemext: line {} has an unparseable graphic '{graphic}'", lineno + 1);
            continue;
        };
        let Some(appearance) = parse_appearance(appearance) else {
            log::warn!("itemext: line {} has an unknown appearance '{appearance}'", lineno + 1);
            continue;
        };
        let Some(required_hands) = parse_hands(required_hands) else {
            log::warn!("itemext: line {} has an unknown hand requirement '{required_hands}'", lineno + 1);
            continue;
        };
        rows.push(ItemExtRow {
            graphic,
            appearance,
            required_hands,
        });
    }
    rows
}

fn parse_graphic(token: &str) -> Option<u16> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else {
        token.parse::<u16>().ok()
    }
}

/// Looks up a graphic's row, falling back to [`ItemExtRow::unknown`].
pub fn lookup(table: &[ItemExtRow], graphic: u16) -> ItemExtRow {
    table
        .iter()
        .find(|row| row.graphic == graphic)
        .copied()
        .unwrap_or_else(|| ItemExtRow::unknown(graphic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_rows() {
        let table = parse_item_ext("0x0F0E, Right, Two\n0x1F01, Left, One\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].graphic, 0x0F0E);
        assert_eq!(table[0].appearance, PaperdollAppearance::Right);
        assert!(table[0].is_two_handed());
    }

    #[test]
    fn skips_malformed_lines_and_keeps_the_rest() {
        let table = parse_item_ext("not,enough\n0x1F01, Left, One\ngarbage, Left, One\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].graphic, 0x1F01);
    }

    #[test]
    fn unknown_graphic_defaults_to_invalid() {
        let row = lookup(&[], 0x9999);
        assert_eq!(row.appearance, PaperdollAppearance::Invalid);
        assert_eq!(row.required_hands, RequiredHands::Invalid);
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let table = parse_item_ext("# comment\n\n0x1, Left, One\n");
        assert_eq!(table.len(), 1);
    }
}
