//! Single Property Modifier (SPRM) decoding.
//!
//! A SPRM is a 16-bit opcode followed by an operand whose length comes from
//! the opcode's size class. Lists of SPRMs (grpprls) describe character,
//! paragraph, section, table and picture formatting in Word binary files.

use super::reader::PayloadReader;
use super::sprm_operations::*;
use crate::common::binary::{read_i16_le, read_u16_le, read_u32_le};
use crate::common::error::{Error, Result};
use phf::phf_map;
use smallvec::SmallVec;

/// Marker returned by [`operand_size`] for variable-length operands.
pub const VARIABLE_OPERAND_SIZE: u8 = 255;

const OPERAND_SIZES: [u8; 8] = [1, 1, 2, 4, 2, 2, VARIABLE_OPERAND_SIZE, 3];

/// Operand length in bytes for a size class.
///
/// Classes above 7 cannot come from a 3-bit field; they return 0, which
/// callers must treat as a decode failure.
#[inline]
pub const fn operand_size(size_class: u8) -> u8 {
    if size_class as usize >= OPERAND_SIZES.len() {
        return 0;
    }
    OPERAND_SIZES[size_class as usize]
}

/// Structure a SPRM modifies (the sgc field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SprmKind {
    Paragraph,
    Character,
    Picture,
    Section,
    Table,
}

/// Decoded opcode fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprmOpcode {
    pub raw: u16,
    /// Property index within its kind
    pub ispmd: u16,
    pub special: bool,
    pub kind: SprmKind,
    pub size_class: u8,
}

impl SprmOpcode {
    pub fn decode(opcode: u16) -> Result<Self> {
        let kind = match (opcode >> 10) & 0x07 {
            1 => SprmKind::Paragraph,
            2 => SprmKind::Character,
            3 => SprmKind::Picture,
            4 => SprmKind::Section,
            5 => SprmKind::Table,
            _ => return Err(Error::InvalidSprm { opcode }),
        };
        Ok(Self {
            raw: opcode,
            ispmd: opcode & 0x01FF,
            special: opcode & 0x0200 != 0,
            kind,
            size_class: (opcode >> 13) as u8,
        })
    }
}

/// Static facts about a known opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprmDefinition {
    /// Name used by the file format documentation
    pub name: &'static str,
    /// Canonical opcode of the logical property this opcode sets
    pub property: u16,
}

/// Known opcodes. Older encodings of a property point at the newer opcode.
pub static SPRM_TABLE: phf::Map<u16, SprmDefinition> = phf_map! {
    // Character
    0x0800u16 => SprmDefinition { name: "sprmCFRMarkDel", property: 0x0800 },
    0x0801u16 => SprmDefinition { name: "sprmCFRMarkIns", property: 0x0801 },
    0x0802u16 => SprmDefinition { name: "sprmCFFldVanish", property: 0x0802 },
    0x6A03u16 => SprmDefinition { name: "sprmCPicLocation", property: 0x6A03 },
    0x0806u16 => SprmDefinition { name: "sprmCFData", property: 0x0806 },
    0x6A09u16 => SprmDefinition { name: "sprmCSymbol", property: 0x6A09 },
    0x080Au16 => SprmDefinition { name: "sprmCFOle2", property: 0x080A },
    0x2A0Cu16 => SprmDefinition { name: "sprmCHighlight", property: 0x2A0C },
    0x0818u16 => SprmDefinition { name: "sprmCFSpecVanish", property: 0x0818 },
    0x4A30u16 => SprmDefinition { name: "sprmCIstd", property: 0x4A30 },
    0x2A33u16 => SprmDefinition { name: "sprmCPlain", property: 0x2A33 },
    0x0835u16 => SprmDefinition { name: "sprmCFBold", property: 0x0835 },
    0x0836u16 => SprmDefinition { name: "sprmCFItalic", property: 0x0836 },
    0x0837u16 => SprmDefinition { name: "sprmCFStrike", property: 0x0837 },
    0x0838u16 => SprmDefinition { name: "sprmCFOutline", property: 0x0838 },
    0x0839u16 => SprmDefinition { name: "sprmCFShadow", property: 0x0839 },
    0x083Au16 => SprmDefinition { name: "sprmCFSmallCaps", property: 0x083A },
    0x083Bu16 => SprmDefinition { name: "sprmCFCaps", property: 0x083B },
    0x083Cu16 => SprmDefinition { name: "sprmCFVanish", property: 0x083C },
    0x2A3Eu16 => SprmDefinition { name: "sprmCKul", property: 0x2A3E },
    0x8840u16 => SprmDefinition { name: "sprmCDxaSpace", property: 0x8840 },
    0x2A42u16 => SprmDefinition { name: "sprmCIco", property: 0x2A42 },
    0x4A43u16 => SprmDefinition { name: "sprmCHps", property: 0x4A43 },
    0x4845u16 => SprmDefinition { name: "sprmCHpsPos", property: 0x4845 },
    0x2A48u16 => SprmDefinition { name: "sprmCIss", property: 0x2A48 },
    0x484Bu16 => SprmDefinition { name: "sprmCHpsKern", property: 0x484B },
    0x4A4Fu16 => SprmDefinition { name: "sprmCRgFtc0", property: 0x4A4F },
    0x4A50u16 => SprmDefinition { name: "sprmCRgFtc1", property: 0x4A50 },
    0x4A51u16 => SprmDefinition { name: "sprmCRgFtc2", property: 0x4A51 },
    0x4852u16 => SprmDefinition { name: "sprmCCharScale", property: 0x4852 },
    0x2A53u16 => SprmDefinition { name: "sprmCFDStrike", property: 0x2A53 },
    0x0854u16 => SprmDefinition { name: "sprmCFImprint", property: 0x0854 },
    0x0855u16 => SprmDefinition { name: "sprmCFSpec", property: 0x0855 },
    0x0856u16 => SprmDefinition { name: "sprmCFObj", property: 0x0856 },
    0x0858u16 => SprmDefinition { name: "sprmCFEmboss", property: 0x0858 },
    0x085Au16 => SprmDefinition { name: "sprmCFBiDi", property: 0x085A },
    0x085Cu16 => SprmDefinition { name: "sprmCFBoldBi", property: 0x085C },
    0x085Du16 => SprmDefinition { name: "sprmCFItalicBi", property: 0x085D },
    0x4A5Eu16 => SprmDefinition { name: "sprmCFtcBi", property: 0x4A5E },
    0x485Fu16 => SprmDefinition { name: "sprmCLidBi", property: 0x485F },
    0x4A61u16 => SprmDefinition { name: "sprmCHpsBi", property: 0x4A61 },
    0x4866u16 => SprmDefinition { name: "sprmCShd80", property: 0xCA71 },
    0x486Du16 => SprmDefinition { name: "sprmCRgLid0", property: 0x486D },
    0x486Eu16 => SprmDefinition { name: "sprmCRgLid1", property: 0x486E },
    0x6870u16 => SprmDefinition { name: "sprmCCv", property: 0x6870 },
    0xCA71u16 => SprmDefinition { name: "sprmCShd", property: 0xCA71 },
    0x6865u16 => SprmDefinition { name: "sprmCBrc80", property: 0xCA72 },
    0xCA72u16 => SprmDefinition { name: "sprmCBrc", property: 0xCA72 },
    0x4873u16 => SprmDefinition { name: "sprmCRgLid0_80", property: 0x486D },
    0x4874u16 => SprmDefinition { name: "sprmCRgLid1_80", property: 0x486E },
    0x0875u16 => SprmDefinition { name: "sprmCFNoProof", property: 0x0875 },

    // Paragraph
    0x4600u16 => SprmDefinition { name: "sprmPIstd", property: 0x4600 },
    0x2602u16 => SprmDefinition { name: "sprmPIncLvl", property: 0x2602 },
    0x2403u16 => SprmDefinition { name: "sprmPJc80", property: 0x2461 },
    0x2405u16 => SprmDefinition { name: "sprmPFKeep", property: 0x2405 },
    0x2406u16 => SprmDefinition { name: "sprmPFKeepFollow", property: 0x2406 },
    0x2407u16 => SprmDefinition { name: "sprmPFPageBreakBefore", property: 0x2407 },
    0x260Au16 => SprmDefinition { name: "sprmPIlvl", property: 0x260A },
    0x460Bu16 => SprmDefinition { name: "sprmPIlfo", property: 0x460B },
    0x240Cu16 => SprmDefinition { name: "sprmPFNoLineNumb", property: 0x240C },
    0xC60Du16 => SprmDefinition { name: "sprmPChgTabsPapx", property: 0xC60D },
    0x840Eu16 => SprmDefinition { name: "sprmPDxaRight80", property: 0x845D },
    0x840Fu16 => SprmDefinition { name: "sprmPDxaLeft80", property: 0x845E },
    0x4610u16 => SprmDefinition { name: "sprmPNest80", property: 0x465F },
    0x8411u16 => SprmDefinition { name: "sprmPDxaLeft180", property: 0x8460 },
    0x6412u16 => SprmDefinition { name: "sprmPDyaLine", property: 0x6412 },
    0xA413u16 => SprmDefinition { name: "sprmPDyaBefore", property: 0xA413 },
    0xA414u16 => SprmDefinition { name: "sprmPDyaAfter", property: 0xA414 },
    0xC615u16 => SprmDefinition { name: "sprmPChgTabs", property: 0xC615 },
    0x2416u16 => SprmDefinition { name: "sprmPFInTable", property: 0x2416 },
    0x2417u16 => SprmDefinition { name: "sprmPFTtp", property: 0x2417 },
    0x8418u16 => SprmDefinition { name: "sprmPDxaAbs", property: 0x8418 },
    0x8419u16 => SprmDefinition { name: "sprmPDyaAbs", property: 0x8419 },
    0x841Au16 => SprmDefinition { name: "sprmPDxaWidth", property: 0x841A },
    0x261Bu16 => SprmDefinition { name: "sprmPPc", property: 0x261B },
    0x2423u16 => SprmDefinition { name: "sprmPWr", property: 0x2423 },
    0x242Au16 => SprmDefinition { name: "sprmPFNoAutoHyph", property: 0x242A },
    0x442Du16 => SprmDefinition { name: "sprmPShd80", property: 0xC64D },
    0x2431u16 => SprmDefinition { name: "sprmPFWidowControl", property: 0x2431 },
    0x2640u16 => SprmDefinition { name: "sprmPOutLvl", property: 0x2640 },
    0x2441u16 => SprmDefinition { name: "sprmPFBiDi", property: 0x2441 },
    0x6646u16 => SprmDefinition { name: "sprmPHugePapx", property: 0x6646 },
    0x6649u16 => SprmDefinition { name: "sprmPItap", property: 0x6649 },
    0x244Bu16 => SprmDefinition { name: "sprmPFInnerTableCell", property: 0x244B },
    0x244Cu16 => SprmDefinition { name: "sprmPFInnerTtp", property: 0x244C },
    0xC64Du16 => SprmDefinition { name: "sprmPShd", property: 0xC64D },
    0x6424u16 => SprmDefinition { name: "sprmPBrcTop80", property: 0xC64E },
    0x6425u16 => SprmDefinition { name: "sprmPBrcLeft80", property: 0xC64F },
    0x6426u16 => SprmDefinition { name: "sprmPBrcBottom80", property: 0xC650 },
    0x6427u16 => SprmDefinition { name: "sprmPBrcRight80", property: 0xC651 },
    0xC64Eu16 => SprmDefinition { name: "sprmPBrcTop", property: 0xC64E },
    0xC64Fu16 => SprmDefinition { name: "sprmPBrcLeft", property: 0xC64F },
    0xC650u16 => SprmDefinition { name: "sprmPBrcBottom", property: 0xC650 },
    0xC651u16 => SprmDefinition { name: "sprmPBrcRight", property: 0xC651 },
    0x845Du16 => SprmDefinition { name: "sprmPDxaRight", property: 0x845D },
    0x845Eu16 => SprmDefinition { name: "sprmPDxaLeft", property: 0x845E },
    0x465Fu16 => SprmDefinition { name: "sprmPNest", property: 0x465F },
    0x8460u16 => SprmDefinition { name: "sprmPDxaLeft1", property: 0x8460 },
    0x2461u16 => SprmDefinition { name: "sprmPJc", property: 0x2461 },
    0x246Du16 => SprmDefinition { name: "sprmPFContextualSpacing", property: 0x246D },

    // Table
    0x5400u16 => SprmDefinition { name: "sprmTJc90", property: 0x548A },
    0x9601u16 => SprmDefinition { name: "sprmTDxaLeft", property: 0x9601 },
    0x9602u16 => SprmDefinition { name: "sprmTDxaGapHalf", property: 0x9602 },
    0x3403u16 => SprmDefinition { name: "sprmTFCantSplit90", property: 0x3644 },
    0x3404u16 => SprmDefinition { name: "sprmTTableHeader", property: 0x3404 },
    0xD605u16 => SprmDefinition { name: "sprmTTableBorders80", property: 0xD613 },
    0x9407u16 => SprmDefinition { name: "sprmTDyaRowHeight", property: 0x9407 },
    0xD608u16 => SprmDefinition { name: "sprmTDefTable", property: 0xD608 },
    0xD609u16 => SprmDefinition { name: "sprmTDefTableShd80", property: 0xD609 },
    0x740Au16 => SprmDefinition { name: "sprmTTlp", property: 0x740A },
    0x560Bu16 => SprmDefinition { name: "sprmTFBiDi", property: 0x560B },
    0x3644u16 => SprmDefinition { name: "sprmTFCantSplit", property: 0x3644 },
    0xD613u16 => SprmDefinition { name: "sprmTTableBorders", property: 0xD613 },
    0x548Au16 => SprmDefinition { name: "sprmTJc", property: 0x548A },

    // Section
    0x3009u16 => SprmDefinition { name: "sprmSBkc", property: 0x3009 },
    0x300Au16 => SprmDefinition { name: "sprmSFTitlePage", property: 0x300A },
    0x500Bu16 => SprmDefinition { name: "sprmSCcolumns", property: 0x500B },
    0x900Cu16 => SprmDefinition { name: "sprmSDxaColumns", property: 0x900C },
    0x300Eu16 => SprmDefinition { name: "sprmSNfcPgn", property: 0x300E },
    0x3011u16 => SprmDefinition { name: "sprmSFPgnRestart", property: 0x3011 },
    0x3012u16 => SprmDefinition { name: "sprmSFEndnote", property: 0x3012 },
    0x3013u16 => SprmDefinition { name: "sprmSLnc", property: 0x3013 },
    0xB017u16 => SprmDefinition { name: "sprmSDyaHdrTop", property: 0xB017 },
    0xB018u16 => SprmDefinition { name: "sprmSDyaHdrBottom", property: 0xB018 },
    0x301Au16 => SprmDefinition { name: "sprmSVjc", property: 0x301A },
    0x501Cu16 => SprmDefinition { name: "sprmSPgnStart97", property: 0x7044 },
    0x301Du16 => SprmDefinition { name: "sprmSBOrientation", property: 0x301D },
    0xB01Fu16 => SprmDefinition { name: "sprmSXaPage", property: 0xB01F },
    0xB020u16 => SprmDefinition { name: "sprmSYaPage", property: 0xB020 },
    0xB021u16 => SprmDefinition { name: "sprmSDxaLeft", property: 0xB021 },
    0xB022u16 => SprmDefinition { name: "sprmSDxaRight", property: 0xB022 },
    0x9023u16 => SprmDefinition { name: "sprmSDyaTop", property: 0x9023 },
    0x9024u16 => SprmDefinition { name: "sprmSDyaBottom", property: 0x9024 },
    0xB025u16 => SprmDefinition { name: "sprmSDzaGutter", property: 0xB025 },
    0x7044u16 => SprmDefinition { name: "sprmSPgnStart", property: 0x7044 },

    // Picture
    0x6C02u16 => SprmDefinition { name: "sprmPicBrcTop80", property: 0xCE08 },
    0x6C03u16 => SprmDefinition { name: "sprmPicBrcLeft80", property: 0xCE09 },
    0x6C04u16 => SprmDefinition { name: "sprmPicBrcBottom80", property: 0xCE0A },
    0x6C05u16 => SprmDefinition { name: "sprmPicBrcRight80", property: 0xCE0B },
    0xCE08u16 => SprmDefinition { name: "sprmPicBrcTop", property: 0xCE08 },
    0xCE09u16 => SprmDefinition { name: "sprmPicBrcLeft", property: 0xCE09 },
    0xCE0Au16 => SprmDefinition { name: "sprmPicBrcBottom", property: 0xCE0A },
    0xCE0Bu16 => SprmDefinition { name: "sprmPicBrcRight", property: 0xCE0B },
};

/// Definition of `opcode`, if known.
#[inline]
pub fn definition(opcode: u16) -> Option<&'static SprmDefinition> {
    SPRM_TABLE.get(&opcode)
}

/// Canonical opcode of the property `opcode` sets; unknown opcodes are their own property.
#[inline]
pub fn property_of(opcode: u16) -> u16 {
    definition(opcode).map_or(opcode, |def| def.property)
}

/// One decoded property modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprm {
    pub opcode: u16,
    pub kind: SprmKind,
    pub special: bool,
    /// Operand bytes, excluding any length prefix
    pub operand: SmallVec<[u8; 4]>,
}

impl Sprm {
    /// Decode one SPRM at the reader position.
    pub fn read(reader: &mut PayloadReader<'_>) -> Result<Self> {
        let opcode = reader.read_u16()?;
        let decoded = SprmOpcode::decode(opcode)?;

        let operand = match operand_size(decoded.size_class) {
            // Only reachable for classes above 7, which a 3-bit field cannot encode.
            0 => return Err(Error::OperandSizeUnknown { opcode }),
            VARIABLE_OPERAND_SIZE => match opcode {
                SPRM_T_DEF_TABLE => {
                    // The 2-byte length counts itself minus one.
                    let cb = reader.read_u16()? as usize;
                    reader.read_bytes(cb.saturating_sub(1))?
                },
                SPRM_P_CHG_TABS => {
                    let cb = reader.read_u8()? as usize;
                    if cb == 255 {
                        let len = chg_tabs_length(reader)?;
                        reader.read_bytes(len)?
                    } else {
                        reader.read_bytes(cb)?
                    }
                },
                _ => {
                    let cb = reader.read_u8()? as usize;
                    reader.read_bytes(cb)?
                },
            },
            size => reader.read_bytes(size as usize)?,
        };

        Ok(Self {
            opcode,
            kind: decoded.kind,
            special: decoded.special,
            operand: SmallVec::from_vec(operand),
        })
    }

    pub fn definition(&self) -> Option<&'static SprmDefinition> {
        definition(self.opcode)
    }

    /// Canonical opcode of the logical property this SPRM sets.
    pub fn property(&self) -> u16 {
        property_of(self.opcode)
    }

    /// Size class from the opcode's top three bits.
    pub fn size_class(&self) -> u8 {
        (self.opcode >> 13) as u8
    }

    #[inline]
    pub fn operand_byte(&self) -> Option<u8> {
        self.operand.first().copied()
    }

    #[inline]
    pub fn operand_word(&self) -> Option<u16> {
        read_u16_le(&self.operand, 0).ok()
    }

    #[inline]
    pub fn operand_i16(&self) -> Option<i16> {
        read_i16_le(&self.operand, 0).ok()
    }

    #[inline]
    pub fn operand_dword(&self) -> Option<u32> {
        read_u32_le(&self.operand, 0).ok()
    }
}

/// Operand length of sprmPChgTabs when its length byte is 255.
///
/// The operand holds itbdDelMax, 4 bytes per deleted tab, itbdAddMax and
/// 3 bytes per added tab.
fn chg_tabs_length(reader: &mut PayloadReader<'_>) -> Result<usize> {
    let del = reader.peek_bytes(1)?[0] as usize;
    let head = reader.peek_bytes(2 + 4 * del)?;
    let add = head[1 + 4 * del] as usize;
    Ok(2 + 4 * del + 3 * add)
}

/// Decode a group of SPRMs. A single trailing byte is padding.
pub fn parse_grpprl(grpprl: &[u8]) -> Result<Vec<Sprm>> {
    let mut reader = PayloadReader::from_slice(grpprl);
    let mut sprms = Vec::new();
    while reader.remaining() >= 2 {
        sprms.push(Sprm::read(&mut reader)?);
    }
    Ok(sprms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_operand_size_table() {
        let sizes: Vec<u8> = (0..8).map(operand_size).collect();
        assert_eq!(sizes, vec![1, 1, 2, 4, 2, 2, VARIABLE_OPERAND_SIZE, 3]);
        assert_eq!(operand_size(8), 0);
        assert_eq!(operand_size(255), 0);
    }

    #[test]
    fn test_decode_opcode_fields() {
        let bold = SprmOpcode::decode(SPRM_C_F_BOLD).unwrap();
        assert_eq!(bold.kind, SprmKind::Character);
        assert_eq!(bold.ispmd, 0x35);
        assert_eq!(bold.size_class, 0);
        assert!(!bold.special);

        let plain = SprmOpcode::decode(SPRM_C_PLAIN).unwrap();
        assert!(plain.special);

        assert_eq!(SprmOpcode::decode(SPRM_T_JC).unwrap().kind, SprmKind::Table);
        assert_eq!(
            SprmOpcode::decode(SPRM_S_BKC).unwrap().kind,
            SprmKind::Section
        );
        assert_eq!(
            SprmOpcode::decode(SPRM_PIC_BRC_TOP).unwrap().kind,
            SprmKind::Picture
        );
    }

    #[test]
    fn test_invalid_kind() {
        assert!(matches!(
            SprmOpcode::decode(0x0035),
            Err(Error::InvalidSprm { opcode: 0x0035 })
        ));
        assert!(matches!(
            SprmOpcode::decode(0x1835),
            Err(Error::InvalidSprm { .. })
        ));
    }

    #[test]
    fn test_fixed_operands() {
        let grpprl = [
            0x35, 0x08, 0x01, // sprmCFBold = 1
            0x43, 0x4A, 0x18, 0x00, // sprmCHps = 24
            0x70, 0x68, 0x11, 0x22, 0x33, 0x44, // sprmCCv
            0x25, 0xF6, 0xAA, 0xBB, 0xCC, // table opcode, size class 7
        ];
        let sprms = parse_grpprl(&grpprl).unwrap();
        assert_eq!(sprms.len(), 4);
        assert_eq!(sprms[0].operand_byte(), Some(1));
        assert_eq!(sprms[1].operand_word(), Some(24));
        assert_eq!(sprms[2].operand_dword(), Some(0x44332211));
        assert_eq!(sprms[3].operand.as_slice(), &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_variable_operand() {
        // 0xCA47: character kind, size class 6
        let grpprl = [0x47, 0xCA, 0x03, 1, 2, 3, 0x35, 0x08, 0x00];
        let sprms = parse_grpprl(&grpprl).unwrap();
        assert_eq!(sprms[0].operand.as_slice(), &[1, 2, 3]);
        assert_eq!(sprms[1].opcode, SPRM_C_F_BOLD);
    }

    #[test]
    fn test_def_table_two_byte_length() {
        let mut grpprl = SPRM_T_DEF_TABLE.to_le_bytes().to_vec();
        grpprl.extend_from_slice(&5u16.to_le_bytes());
        grpprl.extend_from_slice(&[9, 8, 7, 6]);
        grpprl.extend_from_slice(&[0x35, 0x08, 0x01]);
        let sprms = parse_grpprl(&grpprl).unwrap();
        assert_eq!(sprms.len(), 2);
        assert_eq!(sprms[0].operand.as_slice(), &[9, 8, 7, 6]);
    }

    #[test]
    fn test_chg_tabs_long_form() {
        let mut grpprl = SPRM_P_CHG_TABS.to_le_bytes().to_vec();
        grpprl.push(255);
        // one deleted tab (position + close), two added tabs (positions + descriptors)
        grpprl.push(1);
        grpprl.extend_from_slice(&[0x10, 0x00, 0x20, 0x00]);
        grpprl.push(2);
        grpprl.extend_from_slice(&[0x30, 0x00, 0x40, 0x00, 0x01, 0x02]);
        grpprl.extend_from_slice(&[0x35, 0x08, 0x01]);
        let sprms = parse_grpprl(&grpprl).unwrap();
        assert_eq!(sprms.len(), 2);
        assert_eq!(sprms[0].operand.len(), 2 + 4 + 6);
        assert_eq!(sprms[1].opcode, SPRM_C_F_BOLD);
    }

    #[test]
    fn test_chg_tabs_short_form() {
        let grpprl = [0x15, 0xC6, 0x02, 0x00, 0x00];
        let sprms = parse_grpprl(&grpprl).unwrap();
        assert_eq!(sprms[0].operand.len(), 2);
    }

    #[test]
    fn test_truncated_operand_fails() {
        assert!(matches!(
            parse_grpprl(&[0x43, 0x4A, 0x18]),
            Err(Error::TruncatedStream { .. })
        ));
        // A lone trailing byte is padding.
        assert_eq!(parse_grpprl(&[0x35, 0x08, 0x01, 0x00]).unwrap().len(), 1);
    }

    #[test]
    fn test_property_aliases() {
        assert_eq!(property_of(SPRM_P_DXA_LEFT80), SPRM_P_DXA_LEFT);
        assert_eq!(property_of(SPRM_P_DXA_LEFT), SPRM_P_DXA_LEFT);
        assert_eq!(property_of(SPRM_P_JC80), SPRM_P_JC);
        assert_eq!(property_of(0x2A99), 0x2A99);
        assert_eq!(definition(SPRM_C_F_BOLD).unwrap().name, "sprmCFBold");
    }

    #[test]
    fn test_table_kinds_match_opcodes() {
        for (&opcode, def) in SPRM_TABLE.entries() {
            let own = SprmOpcode::decode(opcode).unwrap();
            let canonical = SprmOpcode::decode(def.property).unwrap();
            assert_eq!(own.kind, canonical.kind, "{}", def.name);
            assert!(SPRM_TABLE.contains_key(&def.property), "{}", def.name);
        }
    }

    proptest! {
        #[test]
        fn prop_operand_size_is_table_lookup(class in 0u8..=255) {
            let size = operand_size(class);
            if class < 8 {
                prop_assert_eq!(size, OPERAND_SIZES[class as usize]);
            } else {
                prop_assert_eq!(size, 0);
            }
        }

        #[test]
        fn prop_grpprl_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let _ = parse_grpprl(&bytes);
        }
    }
}
