//! Word property modifier opcodes.
//!
//! Opcode layout (16 bits):
//! - bits 0-8: ispmd, the property within its kind
//! - bit 9: fSpec, special handling flag
//! - bits 10-12: sgc, the kind (1 paragraph, 2 character, 3 picture, 4 section, 5 table)
//! - bits 13-15: spra, the operand size class
//!
//! Several properties exist in an older and a newer encoding (the `80`
//! suffix marks the Word 97 form). Both spellings describe one logical
//! property; see `sprm::SPRM_TABLE` for the canonical mapping.

// Character properties

pub const SPRM_C_F_RMARK_DEL: u16 = 0x0800;
pub const SPRM_C_F_RMARK: u16 = 0x0801;
pub const SPRM_C_F_FLD_VANISH: u16 = 0x0802;
/// Offset of the picture in the Data stream
pub const SPRM_C_PIC_LOCATION: u16 = 0x6A03;
pub const SPRM_C_F_DATA: u16 = 0x0806;
pub const SPRM_C_SYMBOL: u16 = 0x6A09;
pub const SPRM_C_F_OLE2: u16 = 0x080A;
pub const SPRM_C_HIGHLIGHT: u16 = 0x2A0C;
pub const SPRM_C_F_SPEC_VANISH: u16 = 0x0818;
pub const SPRM_C_ISTD: u16 = 0x4A30;
/// Reset character properties to those of the paragraph style
pub const SPRM_C_PLAIN: u16 = 0x2A33;
pub const SPRM_C_F_BOLD: u16 = 0x0835;
pub const SPRM_C_F_ITALIC: u16 = 0x0836;
pub const SPRM_C_F_STRIKE: u16 = 0x0837;
pub const SPRM_C_F_OUTLINE: u16 = 0x0838;
pub const SPRM_C_F_SHADOW: u16 = 0x0839;
pub const SPRM_C_F_SMALL_CAPS: u16 = 0x083A;
pub const SPRM_C_F_CAPS: u16 = 0x083B;
pub const SPRM_C_F_VANISH: u16 = 0x083C;
pub const SPRM_C_KUL: u16 = 0x2A3E;
pub const SPRM_C_DXA_SPACE: u16 = 0x8840;
pub const SPRM_C_ICO: u16 = 0x2A42;
/// Font size in half-points
pub const SPRM_C_HPS: u16 = 0x4A43;
pub const SPRM_C_HPS_POS: u16 = 0x4845;
pub const SPRM_C_ISS: u16 = 0x2A48;
pub const SPRM_C_HPS_KERN: u16 = 0x484B;
pub const SPRM_C_RG_FTC0: u16 = 0x4A4F;
pub const SPRM_C_RG_FTC1: u16 = 0x4A50;
pub const SPRM_C_RG_FTC2: u16 = 0x4A51;
pub const SPRM_C_CHAR_SCALE: u16 = 0x4852;
pub const SPRM_C_F_D_STRIKE: u16 = 0x2A53;
pub const SPRM_C_F_IMPRINT: u16 = 0x0854;
pub const SPRM_C_F_SPEC: u16 = 0x0855;
pub const SPRM_C_F_OBJ: u16 = 0x0856;
pub const SPRM_C_F_EMBOSS: u16 = 0x0858;
pub const SPRM_C_F_BI_DI: u16 = 0x085A;
pub const SPRM_C_F_BOLD_BI: u16 = 0x085C;
pub const SPRM_C_F_ITALIC_BI: u16 = 0x085D;
pub const SPRM_C_FTC_BI: u16 = 0x4A5E;
pub const SPRM_C_LID_BI: u16 = 0x485F;
pub const SPRM_C_HPS_BI: u16 = 0x4A61;
pub const SPRM_C_SHD80: u16 = 0x4866;
pub const SPRM_C_RG_LID0: u16 = 0x486D;
pub const SPRM_C_RG_LID1: u16 = 0x486E;
pub const SPRM_C_CV: u16 = 0x6870;
pub const SPRM_C_SHD: u16 = 0xCA71;
pub const SPRM_C_BRC80: u16 = 0x6865;
pub const SPRM_C_BRC: u16 = 0xCA72;
pub const SPRM_C_RG_LID0_80: u16 = 0x4873;
pub const SPRM_C_RG_LID1_80: u16 = 0x4874;
pub const SPRM_C_F_NO_PROOF: u16 = 0x0875;

// Paragraph properties

/// Paragraph style index
pub const SPRM_P_ISTD: u16 = 0x4600;
pub const SPRM_P_INC_LVL: u16 = 0x2602;
pub const SPRM_P_JC80: u16 = 0x2403;
pub const SPRM_P_F_KEEP: u16 = 0x2405;
pub const SPRM_P_F_KEEP_FOLLOW: u16 = 0x2406;
pub const SPRM_P_F_PAGE_BREAK_BEFORE: u16 = 0x2407;
pub const SPRM_P_ILVL: u16 = 0x260A;
pub const SPRM_P_ILFO: u16 = 0x460B;
pub const SPRM_P_F_NO_LINE_NUMB: u16 = 0x240C;
pub const SPRM_P_CHG_TABS_PAPX: u16 = 0xC60D;
pub const SPRM_P_DXA_RIGHT80: u16 = 0x840E;
pub const SPRM_P_DXA_LEFT80: u16 = 0x840F;
pub const SPRM_P_NEST80: u16 = 0x4610;
pub const SPRM_P_DXA_LEFT1_80: u16 = 0x8411;
pub const SPRM_P_DYA_LINE: u16 = 0x6412;
pub const SPRM_P_DYA_BEFORE: u16 = 0xA413;
pub const SPRM_P_DYA_AFTER: u16 = 0xA414;
/// Tab stop changes; variable operand with a computed length when cb is 255
pub const SPRM_P_CHG_TABS: u16 = 0xC615;
pub const SPRM_P_F_IN_TABLE: u16 = 0x2416;
pub const SPRM_P_F_TTP: u16 = 0x2417;
pub const SPRM_P_DXA_ABS: u16 = 0x8418;
pub const SPRM_P_DYA_ABS: u16 = 0x8419;
pub const SPRM_P_DXA_WIDTH: u16 = 0x841A;
pub const SPRM_P_PC: u16 = 0x261B;
pub const SPRM_P_WR: u16 = 0x2423;
pub const SPRM_P_F_NO_AUTO_HYPH: u16 = 0x242A;
pub const SPRM_P_SHD80: u16 = 0x442D;
pub const SPRM_P_F_WIDOW_CONTROL: u16 = 0x2431;
pub const SPRM_P_OUT_LVL: u16 = 0x2640;
pub const SPRM_P_F_BI_DI: u16 = 0x2441;
pub const SPRM_P_HUGE_PAPX: u16 = 0x6646;
pub const SPRM_P_ITAP: u16 = 0x6649;
pub const SPRM_P_F_INNER_TABLE_CELL: u16 = 0x244B;
pub const SPRM_P_F_INNER_TTP: u16 = 0x244C;
pub const SPRM_P_SHD: u16 = 0xC64D;
pub const SPRM_P_BRC_TOP80: u16 = 0x6424;
pub const SPRM_P_BRC_LEFT80: u16 = 0x6425;
pub const SPRM_P_BRC_BOTTOM80: u16 = 0x6426;
pub const SPRM_P_BRC_RIGHT80: u16 = 0x6427;
pub const SPRM_P_BRC_TOP: u16 = 0xC64E;
pub const SPRM_P_BRC_LEFT: u16 = 0xC64F;
pub const SPRM_P_BRC_BOTTOM: u16 = 0xC650;
pub const SPRM_P_BRC_RIGHT: u16 = 0xC651;
pub const SPRM_P_DXA_RIGHT: u16 = 0x845D;
pub const SPRM_P_DXA_LEFT: u16 = 0x845E;
pub const SPRM_P_NEST: u16 = 0x465F;
pub const SPRM_P_DXA_LEFT1: u16 = 0x8460;
pub const SPRM_P_JC: u16 = 0x2461;
pub const SPRM_P_F_CONTEXTUAL_SPACING: u16 = 0x246D;

// Table properties

pub const SPRM_T_JC90: u16 = 0x5400;
pub const SPRM_T_DXA_LEFT: u16 = 0x9601;
pub const SPRM_T_DXA_GAP_HALF: u16 = 0x9602;
pub const SPRM_T_F_CANT_SPLIT90: u16 = 0x3403;
pub const SPRM_T_TABLE_HEADER: u16 = 0x3404;
pub const SPRM_T_TABLE_BORDERS80: u16 = 0xD605;
pub const SPRM_T_DYA_ROW_HEIGHT: u16 = 0x9407;
/// Cell layout of a table row; 2-byte length prefix
pub const SPRM_T_DEF_TABLE: u16 = 0xD608;
pub const SPRM_T_DEF_TABLE_SHD80: u16 = 0xD609;
pub const SPRM_T_TLP: u16 = 0x740A;
pub const SPRM_T_F_BI_DI: u16 = 0x560B;
pub const SPRM_T_F_CANT_SPLIT: u16 = 0x3644;
pub const SPRM_T_TABLE_BORDERS: u16 = 0xD613;
pub const SPRM_T_JC: u16 = 0x548A;

// Section properties

pub const SPRM_S_BKC: u16 = 0x3009;
pub const SPRM_S_F_TITLE_PAGE: u16 = 0x300A;
pub const SPRM_S_CCOLUMNS: u16 = 0x500B;
pub const SPRM_S_DXA_COLUMNS: u16 = 0x900C;
pub const SPRM_S_NFC_PGN: u16 = 0x300E;
pub const SPRM_S_F_PGN_RESTART: u16 = 0x3011;
pub const SPRM_S_F_ENDNOTE: u16 = 0x3012;
pub const SPRM_S_LNC: u16 = 0x3013;
pub const SPRM_S_DYA_HDR_TOP: u16 = 0xB017;
pub const SPRM_S_DYA_HDR_BOTTOM: u16 = 0xB018;
pub const SPRM_S_VJC: u16 = 0x301A;
pub const SPRM_S_PGN_START97: u16 = 0x501C;
pub const SPRM_S_BOR_ORIENT: u16 = 0x301D;
pub const SPRM_S_XA_PAGE: u16 = 0xB01F;
pub const SPRM_S_YA_PAGE: u16 = 0xB020;
pub const SPRM_S_DXA_LEFT: u16 = 0xB021;
pub const SPRM_S_DXA_RIGHT: u16 = 0xB022;
pub const SPRM_S_DYA_TOP: u16 = 0x9023;
pub const SPRM_S_DYA_BOTTOM: u16 = 0x9024;
pub const SPRM_S_DZA_GUTTER: u16 = 0xB025;
pub const SPRM_S_PGN_START: u16 = 0x7044;

// Picture properties

pub const SPRM_PIC_BRC_TOP80: u16 = 0x6C02;
pub const SPRM_PIC_BRC_LEFT80: u16 = 0x6C03;
pub const SPRM_PIC_BRC_BOTTOM80: u16 = 0x6C04;
pub const SPRM_PIC_BRC_RIGHT80: u16 = 0x6C05;
pub const SPRM_PIC_BRC_TOP: u16 = 0xCE08;
pub const SPRM_PIC_BRC_LEFT: u16 = 0xCE09;
pub const SPRM_PIC_BRC_BOTTOM: u16 = 0xCE0A;
pub const SPRM_PIC_BRC_RIGHT: u16 = 0xCE0B;
