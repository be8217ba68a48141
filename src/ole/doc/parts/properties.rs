/// Property exceptions (CHPX, PAPX, SEPX, TAPX) and their application.
///
/// An exception is an ordered list of SPRMs recorded against a base style.
/// Applying it replays the list; each SPRM overwrites the logical property
/// its opcode maps to, so older and newer encodings of one property
/// (for example `sprmPDxaLeft80` and `sprmPDxaLeft`) replace each other.
use crate::common::error::{Error, Result};
use crate::ole::sprm::{Sprm, SprmKind, parse_grpprl, property_of};
use crate::ole::sprm_operations::*;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Logical property a SPRM sets; the canonical opcode for that property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(u16);

impl PropertyKey {
    /// Key for the property `opcode` sets.
    #[inline]
    pub fn for_opcode(opcode: u16) -> Self {
        Self(property_of(opcode))
    }

    #[inline]
    pub fn opcode(self) -> u16 {
        self.0
    }
}

/// Character booleans whose operand may toggle the base value.
const TOGGLE_PROPERTIES: &[u16] = &[
    SPRM_C_F_BOLD,
    SPRM_C_F_ITALIC,
    SPRM_C_F_STRIKE,
    SPRM_C_F_OUTLINE,
    SPRM_C_F_SHADOW,
    SPRM_C_F_SMALL_CAPS,
    SPRM_C_F_CAPS,
    SPRM_C_F_VANISH,
    SPRM_C_F_BOLD_BI,
    SPRM_C_F_ITALIC_BI,
];

/// Operand value meaning "same as the base style".
const TOGGLE_KEEP: u8 = 0x80;
/// Operand value meaning "opposite of the base style".
const TOGGLE_INVERT: u8 = 0x81;

/// Resolved property values, one SPRM per logical property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    properties: BTreeMap<PropertyKey, Sprm>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The SPRM currently holding the property set by `opcode`.
    pub fn get(&self, opcode: u16) -> Option<&Sprm> {
        self.properties.get(&PropertyKey::for_opcode(opcode))
    }

    pub fn contains(&self, opcode: u16) -> bool {
        self.get(opcode).is_some()
    }

    /// Raw operand bytes of the property.
    pub fn operand(&self, opcode: u16) -> Option<&[u8]> {
        self.get(opcode).map(|sprm| sprm.operand.as_slice())
    }

    /// Boolean property; any non-zero first operand byte is true.
    pub fn flag(&self, opcode: u16) -> Option<bool> {
        self.get(opcode)?.operand_byte().map(|b| b != 0)
    }

    pub fn byte(&self, opcode: u16) -> Option<u8> {
        self.get(opcode)?.operand_byte()
    }

    pub fn word(&self, opcode: u16) -> Option<u16> {
        self.get(opcode)?.operand_word()
    }

    pub fn signed_word(&self, opcode: u16) -> Option<i16> {
        self.get(opcode)?.operand_i16()
    }

    pub fn dword(&self, opcode: u16) -> Option<u32> {
        self.get(opcode)?.operand_dword()
    }

    /// Paragraph style index, 0 (Normal) when unset.
    pub fn istd(&self) -> u16 {
        self.word(SPRM_P_ISTD).unwrap_or(0)
    }

    /// Iterate over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &Sprm)> {
        self.properties.iter().map(|(k, v)| (*k, v))
    }

    /// Overwrite the property `sprm` sets.
    pub fn set(&mut self, sprm: Sprm) {
        self.properties.insert(PropertyKey::for_opcode(sprm.opcode), sprm);
    }

    fn remove_kind(&mut self, kind: SprmKind) {
        self.properties.retain(|_, sprm| sprm.kind != kind);
    }
}

impl FromIterator<Sprm> for Style {
    fn from_iter<I: IntoIterator<Item = Sprm>>(iter: I) -> Self {
        let mut style = Style::new();
        for sprm in iter {
            style.set(sprm);
        }
        style
    }
}

/// Formatting recorded against a base style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyExceptions {
    /// CHPX
    Character(Vec<Sprm>),
    /// PAPX: paragraph style index plus overrides
    Paragraph { istd: u16, sprms: Vec<Sprm> },
    /// SEPX
    Section(Vec<Sprm>),
    /// TAPX
    Table(Vec<Sprm>),
}

impl PropertyExceptions {
    /// Character exceptions from a bare grpprl.
    pub fn character(grpprl: &[u8]) -> Result<Self> {
        Ok(Self::Character(parse_grpprl(grpprl)?))
    }

    /// Paragraph exceptions from `istd` followed by a grpprl.
    pub fn paragraph(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::truncated(2, data.len() as u64));
        }
        let istd = u16::from_le_bytes([data[0], data[1]]);
        Ok(Self::Paragraph {
            istd,
            sprms: parse_grpprl(&data[2..])?,
        })
    }

    pub fn section(grpprl: &[u8]) -> Result<Self> {
        Ok(Self::Section(parse_grpprl(grpprl)?))
    }

    pub fn table(grpprl: &[u8]) -> Result<Self> {
        Ok(Self::Table(parse_grpprl(grpprl)?))
    }

    pub fn sprms(&self) -> &[Sprm] {
        match self {
            Self::Character(sprms) | Self::Section(sprms) | Self::Table(sprms) => sprms,
            Self::Paragraph { sprms, .. } => sprms,
        }
    }

    /// Paragraph style index for PAPX exceptions.
    pub fn istd(&self) -> Option<u16> {
        match self {
            Self::Paragraph { istd, .. } => Some(*istd),
            _ => None,
        }
    }

    /// Replay the exceptions on top of `base`.
    ///
    /// Later SPRMs win over earlier ones for the same logical property,
    /// independent of their kind.
    pub fn apply(&self, base: &Style) -> Style {
        let mut style = base.clone();

        if let Self::Paragraph { istd, .. } = self {
            style.set(Sprm {
                opcode: SPRM_P_ISTD,
                kind: SprmKind::Paragraph,
                special: false,
                operand: SmallVec::from_slice(&istd.to_le_bytes()),
            });
        }

        for sprm in self.sprms() {
            if sprm.opcode == SPRM_C_PLAIN {
                reset_character(&mut style, base);
                continue;
            }
            style.set(resolve_toggle(sprm, base));
        }
        style
    }
}

/// Drop character formatting back to what `base` defines.
fn reset_character(style: &mut Style, base: &Style) {
    style.remove_kind(SprmKind::Character);
    for (_, sprm) in base.iter() {
        if sprm.kind == SprmKind::Character {
            style.set(sprm.clone());
        }
    }
}

/// Turn a toggle operand (0x80/0x81) into an absolute 0/1 against `base`.
fn resolve_toggle(sprm: &Sprm, base: &Style) -> Sprm {
    let property = property_of(sprm.opcode);
    let operand = match sprm.operand_byte() {
        Some(op @ (TOGGLE_KEEP | TOGGLE_INVERT)) if TOGGLE_PROPERTIES.contains(&property) => op,
        _ => return sprm.clone(),
    };

    let inherited = base.flag(property).unwrap_or(false);
    let value = if operand == TOGGLE_INVERT {
        !inherited
    } else {
        inherited
    };

    let mut resolved = sprm.clone();
    resolved.operand = SmallVec::from_slice(&[value as u8]);
    resolved
}
