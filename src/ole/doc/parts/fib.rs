/// File Information Block (FIB) parser for DOC files.
///
/// The FIB sits at offset 0 of the WordDocument stream. It is made of a fixed
/// 32-byte base followed by counted arrays:
///
/// - `csw` + FibRgW (16-bit values)
/// - `cslw` + FibRgLw (32-bit values, including the text character counts)
/// - `cbRgFcLcb` + FibRgFcLcb ((offset, length) pairs locating other structures)
/// - `cswNew` + FibRgCswNew (the newer nFib, when present)
use crate::common::error::{Error, Result};
use crate::ole::reader::{PayloadReader, VirtualStreamReader};
use bitflags::bitflags;
use std::io::{Read, Seek};
use std::ops::Range;
use zerocopy::{FromBytes, LE, U16, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Size of FibBase in bytes
pub const FIB_BASE_SIZE: usize = 32;

/// wIdent of Word 97 and later documents
pub const WORD97_IDENT: u16 = 0xA5EC;
/// wIdent of Word 6.0/95 documents
pub const WORD6_IDENT: u16 = 0xA5DC;

bitflags! {
    /// Flag word at offset 0x0A of FibBase.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FibFlags: u16 {
        const DOT = 0x0001;
        const GLSY = 0x0002;
        const COMPLEX = 0x0004;
        const HAS_PIC = 0x0008;
        /// cQuickSaves (4 bits)
        const QUICK_SAVES = 0x00F0;
        const ENCRYPTED = 0x0100;
        /// Set when the table stream is 1Table
        const WHICH_TBL_STM = 0x0200;
        const READ_ONLY_RECOMMENDED = 0x0400;
        const WRITE_RESERVATION = 0x0800;
        const EXT_CHAR = 0x1000;
        const LOAD_OVERRIDE = 0x2000;
        const FAR_EAST = 0x4000;
        const OBFUSCATED = 0x8000;
    }
}

/// FibBase as stored on disk.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawFibBase {
    w_ident: U16<LE>,
    n_fib: U16<LE>,
    unused: U16<LE>,
    lid: U16<LE>,
    pn_next: U16<LE>,
    flags: U16<LE>,
    n_fib_back: U16<LE>,
    l_key: U32<LE>,
    envr: u8,
    flags2: u8,
    reserved3: U16<LE>,
    reserved4: U16<LE>,
    reserved5: U32<LE>,
    reserved6: U32<LE>,
}

/// An (offset, length) pair from FibRgFcLcb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FcLcb {
    pub fc: u32,
    pub lcb: u32,
}

impl FcLcb {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lcb == 0
    }
}

/// Named entries of FibRgFcLcb97, by position in the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum FibPointer {
    StshfOrig = 0,
    Stshf = 1,
    PlcffndRef = 2,
    PlcffndTxt = 3,
    PlcfandRef = 4,
    PlcfandTxt = 5,
    PlcfSed = 6,
    PlcPad = 7,
    PlcfPhe = 8,
    SttbfGlsy = 9,
    PlcfGlsy = 10,
    PlcfHdd = 11,
    PlcfBteChpx = 12,
    PlcfBtePapx = 13,
    PlcfSea = 14,
    SttbfFfn = 15,
    PlcfFldMom = 16,
    PlcfFldHdr = 17,
    PlcfFldFtn = 18,
    PlcfFldAtn = 19,
    PlcfFldMcr = 20,
    SttbfBkmk = 21,
    PlcfBkf = 22,
    PlcfBkl = 23,
    Cmds = 24,
    SttbfMcr = 26,
    PrDrvr = 27,
    PrEnvPort = 28,
    PrEnvLand = 29,
    Wss = 30,
    Dop = 31,
    SttbfAssoc = 32,
    Clx = 33,
    PlcfPgdFtn = 34,
    AutosaveSource = 35,
    GrpXstAtnOwners = 36,
    SttbfAtnBkmk = 37,
    PlcSpaMom = 38,
    PlcSpaHdr = 39,
    PlcfAtnBkf = 40,
    PlcfAtnBkl = 41,
    Pms = 42,
    FormFldSttbs = 43,
    PlcfendRef = 44,
    PlcfendTxt = 45,
    PlcfFldEdn = 46,
    DggInfo = 48,
    SttbfRMark = 49,
    SttbfCaption = 50,
    SttbfAutoCaption = 51,
    PlcfWkb = 52,
    PlcfSpl = 53,
    PlcftxbxTxt = 54,
    PlcfFldTxbx = 55,
    PlcfHdrtxbxTxt = 56,
    PlcffldHdrTxbx = 57,
    StwUser = 58,
    SttbTtmbd = 59,
}

impl FibPointer {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Field name, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::StshfOrig => "fcStshfOrig",
            Self::Stshf => "fcStshf",
            Self::PlcffndRef => "fcPlcffndRef",
            Self::PlcffndTxt => "fcPlcffndTxt",
            Self::PlcfandRef => "fcPlcfandRef",
            Self::PlcfandTxt => "fcPlcfandTxt",
            Self::PlcfSed => "fcPlcfSed",
            Self::PlcPad => "fcPlcPad",
            Self::PlcfPhe => "fcPlcfPhe",
            Self::SttbfGlsy => "fcSttbfGlsy",
            Self::PlcfGlsy => "fcPlcfGlsy",
            Self::PlcfHdd => "fcPlcfHdd",
            Self::PlcfBteChpx => "fcPlcfBteChpx",
            Self::PlcfBtePapx => "fcPlcfBtePapx",
            Self::PlcfSea => "fcPlcfSea",
            Self::SttbfFfn => "fcSttbfFfn",
            Self::PlcfFldMom => "fcPlcfFldMom",
            Self::PlcfFldHdr => "fcPlcfFldHdr",
            Self::PlcfFldFtn => "fcPlcfFldFtn",
            Self::PlcfFldAtn => "fcPlcfFldAtn",
            Self::PlcfFldMcr => "fcPlcfFldMcr",
            Self::SttbfBkmk => "fcSttbfBkmk",
            Self::PlcfBkf => "fcPlcfBkf",
            Self::PlcfBkl => "fcPlcfBkl",
            Self::Cmds => "fcCmds",
            Self::SttbfMcr => "fcSttbfMcr",
            Self::PrDrvr => "fcPrDrvr",
            Self::PrEnvPort => "fcPrEnvPort",
            Self::PrEnvLand => "fcPrEnvLand",
            Self::Wss => "fcWss",
            Self::Dop => "fcDop",
            Self::SttbfAssoc => "fcSttbfAssoc",
            Self::Clx => "fcClx",
            Self::PlcfPgdFtn => "fcPlcfPgdFtn",
            Self::AutosaveSource => "fcAutosaveSource",
            Self::GrpXstAtnOwners => "fcGrpXstAtnOwners",
            Self::SttbfAtnBkmk => "fcSttbfAtnBkmk",
            Self::PlcSpaMom => "fcPlcSpaMom",
            Self::PlcSpaHdr => "fcPlcSpaHdr",
            Self::PlcfAtnBkf => "fcPlcfAtnBkf",
            Self::PlcfAtnBkl => "fcPlcfAtnBkl",
            Self::Pms => "fcPms",
            Self::FormFldSttbs => "fcFormFldSttbs",
            Self::PlcfendRef => "fcPlcfendRef",
            Self::PlcfendTxt => "fcPlcfendTxt",
            Self::PlcfFldEdn => "fcPlcfFldEdn",
            Self::DggInfo => "fcDggInfo",
            Self::SttbfRMark => "fcSttbfRMark",
            Self::SttbfCaption => "fcSttbfCaption",
            Self::SttbfAutoCaption => "fcSttbfAutoCaption",
            Self::PlcfWkb => "fcPlcfWkb",
            Self::PlcfSpl => "fcPlcfSpl",
            Self::PlcftxbxTxt => "fcPlcftxbxTxt",
            Self::PlcfFldTxbx => "fcPlcfFldTxbx",
            Self::PlcfHdrtxbxTxt => "fcPlcfHdrtxbxTxt",
            Self::PlcffldHdrTxbx => "fcPlcffldHdrTxbx",
            Self::StwUser => "fcStwUser",
            Self::SttbTtmbd => "fcSttbTtmbd",
        }
    }
}

/// Positions of the character counts inside FibRgLw97.
mod rg_lw {
    pub const CB_MAC: usize = 0;
    pub const CCP_TEXT: usize = 3;
    pub const CCP_FTN: usize = 4;
    pub const CCP_HDD: usize = 5;
    pub const CCP_ATN: usize = 7;
    pub const CCP_EDN: usize = 8;
    pub const CCP_TXBX: usize = 9;
    pub const CCP_HDR_TXBX: usize = 10;
}

/// Position of lidFE inside FibRgW97.
const RG_W_LID_FE: usize = 13;

/// File Information Block.
#[derive(Debug, Clone)]
pub struct FileInformationBlock {
    w_ident: u16,
    n_fib: u16,
    lid: u16,
    pn_next: u16,
    flags: FibFlags,
    n_fib_back: u16,
    l_key: u32,
    rg_w: Vec<u16>,
    rg_lw: Vec<u32>,
    rg_fc_lcb: Vec<FcLcb>,
    n_fib_new: Option<u16>,
}

impl FileInformationBlock {
    /// Parse a FIB from the start of a WordDocument stream.
    pub fn parse(word_document: &[u8]) -> Result<Self> {
        Self::read(&mut PayloadReader::from_slice(word_document))
    }

    /// Read a FIB at the reader's position.
    ///
    /// Word 6/95 files only get their FibBase decoded; the counted arrays
    /// that follow have a different layout there.
    pub fn read<S: Read + Seek>(reader: &mut VirtualStreamReader<S>) -> Result<Self> {
        let base_bytes = reader.read_array::<FIB_BASE_SIZE>()?;
        let raw = RawFibBase::read_from_bytes(&base_bytes)
            .map_err(|_| Error::InvalidFormat("unreadable FibBase".to_string()))?;

        let w_ident = raw.w_ident.get();
        if w_ident != WORD97_IDENT && w_ident != WORD6_IDENT {
            return Err(Error::InvalidFormat(format!(
                "Invalid FIB magic number: 0x{:04X}",
                w_ident
            )));
        }

        let mut fib = Self {
            w_ident,
            n_fib: raw.n_fib.get(),
            lid: raw.lid.get(),
            pn_next: raw.pn_next.get(),
            flags: FibFlags::from_bits_retain(raw.flags.get()),
            n_fib_back: raw.n_fib_back.get(),
            l_key: raw.l_key.get(),
            rg_w: Vec::new(),
            rg_lw: Vec::new(),
            rg_fc_lcb: Vec::new(),
            n_fib_new: None,
        };
        if w_ident == WORD6_IDENT {
            return Ok(fib);
        }

        let csw = reader.read_u16()? as usize;
        fib.rg_w = (0..csw)
            .map(|_| reader.read_u16())
            .collect::<Result<_>>()?;

        let cslw = reader.read_u16()? as usize;
        fib.rg_lw = (0..cslw)
            .map(|_| reader.read_u32())
            .collect::<Result<_>>()?;

        let cb_rg_fc_lcb = reader.read_u16()? as usize;
        fib.rg_fc_lcb = (0..cb_rg_fc_lcb)
            .map(|_| -> Result<FcLcb> {
                Ok(FcLcb {
                    fc: reader.read_u32()?,
                    lcb: reader.read_u32()?,
                })
            })
            .collect::<Result<_>>()?;

        // Files written before Word 2000 may end the FIB here.
        if reader.remaining() >= 2 {
            let csw_new = reader.read_u16()? as usize;
            if csw_new > 0 {
                fib.n_fib_new = Some(reader.read_u16()?);
                reader.skip((csw_new as u64 - 1) * 2)?;
            }
        }

        Ok(fib)
    }

    /// wIdent magic number.
    #[inline]
    pub fn ident(&self) -> u16 {
        self.w_ident
    }

    /// True for Word 97 and later layouts.
    #[inline]
    pub fn is_word97(&self) -> bool {
        self.w_ident == WORD97_IDENT
    }

    /// nFib from FibBase.
    #[inline]
    pub fn n_fib(&self) -> u16 {
        self.n_fib
    }

    /// Effective format version: nFibNew when present, otherwise nFib.
    ///
    /// Common values:
    /// - 0x00C1 (193): Word 97 through Word 2003
    /// - 0x00D9 (217): Word 2000
    /// - 0x0101 (257): Word 2002
    /// - 0x010C (268): Word 2003
    /// - 0x0112 (274): Word 2007
    #[inline]
    pub fn version(&self) -> u16 {
        self.n_fib_new.unwrap_or(self.n_fib)
    }

    #[inline]
    pub fn n_fib_back(&self) -> u16 {
        self.n_fib_back
    }

    #[inline]
    pub fn flags(&self) -> FibFlags {
        self.flags
    }

    /// Number of incremental saves since the last full save.
    #[inline]
    pub fn quick_saves(&self) -> u8 {
        ((self.flags.bits() & FibFlags::QUICK_SAVES.bits()) >> 4) as u8
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.flags.contains(FibFlags::ENCRYPTED)
    }

    /// XOR obfuscation; only meaningful together with `is_encrypted`.
    #[inline]
    pub fn is_obfuscated(&self) -> bool {
        self.flags.contains(FibFlags::OBFUSCATED)
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        self.flags.contains(FibFlags::COMPLEX)
    }

    /// Name of the table stream this document uses.
    #[inline]
    pub fn table_stream_name(&self) -> &'static str {
        if self.flags.contains(FibFlags::WHICH_TBL_STM) {
            "1Table"
        } else {
            "0Table"
        }
    }

    /// Language ID.
    #[inline]
    pub fn language_id(&self) -> u16 {
        self.lid
    }

    /// Far East language ID from FibRgW.
    pub fn far_east_language_id(&self) -> Option<u16> {
        self.rg_w.get(RG_W_LID_FE).copied()
    }

    #[inline]
    pub fn pn_next(&self) -> u16 {
        self.pn_next
    }

    /// Encryption key or header size, depending on the encryption flags.
    #[inline]
    pub fn l_key(&self) -> u32 {
        self.l_key
    }

    /// Count of meaningful bytes in the WordDocument stream.
    pub fn cb_mac(&self) -> Option<u32> {
        self.rg_lw.get(rg_lw::CB_MAC).copied()
    }

    /// Characters in the main document.
    pub fn ccp_text(&self) -> u32 {
        self.lw(rg_lw::CCP_TEXT)
    }

    pub fn ccp_ftn(&self) -> u32 {
        self.lw(rg_lw::CCP_FTN)
    }

    pub fn ccp_hdd(&self) -> u32 {
        self.lw(rg_lw::CCP_HDD)
    }

    pub fn ccp_atn(&self) -> u32 {
        self.lw(rg_lw::CCP_ATN)
    }

    pub fn ccp_edn(&self) -> u32 {
        self.lw(rg_lw::CCP_EDN)
    }

    pub fn ccp_txbx(&self) -> u32 {
        self.lw(rg_lw::CCP_TXBX)
    }

    pub fn ccp_hdr_txbx(&self) -> u32 {
        self.lw(rg_lw::CCP_HDR_TXBX)
    }

    fn lw(&self, index: usize) -> u32 {
        self.rg_lw.get(index).copied().unwrap_or(0)
    }

    /// Number of (offset, length) pairs present.
    #[inline]
    pub fn fc_lcb_count(&self) -> usize {
        self.rg_fc_lcb.len()
    }

    /// (offset, length) pair for `pointer`, if the FIB is long enough to hold it.
    pub fn pointer(&self, pointer: FibPointer) -> Option<FcLcb> {
        self.rg_fc_lcb.get(pointer.index()).copied()
    }

    /// Byte range of `pointer` inside a stream of `stream_len` bytes.
    ///
    /// Absent and zero-length pointers yield `None`; a pair that extends past
    /// the end of the stream is an error.
    pub fn locate(&self, pointer: FibPointer, stream_len: u64) -> Result<Option<Range<u64>>> {
        let Some(pair) = self.pointer(pointer).filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        let start = pair.fc as u64;
        let end = start + pair.lcb as u64;
        if end > stream_len {
            return Err(Error::FibPointerOutOfBounds {
                pointer: pointer.name(),
                offset: pair.fc,
                length: pair.lcb,
                stream_len,
            });
        }
        Ok(Some(start..end))
    }
}

/// Word 97 FIB bytes with the given flags and pointers.
#[cfg(test)]
pub(crate) fn fib_bytes(flags: FibFlags, ccp_text: u32, pointers: &[(FibPointer, u32, u32)]) -> Vec<u8> {
    const CSW: u16 = 14;
    const CSLW: u16 = 22;
    const CB_RG_FC_LCB: u16 = 93;

    let mut data = vec![0u8; FIB_BASE_SIZE];
    data[0..2].copy_from_slice(&WORD97_IDENT.to_le_bytes());
    data[2..4].copy_from_slice(&0x00C1u16.to_le_bytes());
    data[6..8].copy_from_slice(&0x0409u16.to_le_bytes());
    data[10..12].copy_from_slice(&flags.bits().to_le_bytes());

    data.extend_from_slice(&CSW.to_le_bytes());
    data.extend(std::iter::repeat_n(0u8, CSW as usize * 2));

    data.extend_from_slice(&CSLW.to_le_bytes());
    let mut rg_lw = vec![0u32; CSLW as usize];
    rg_lw[rg_lw::CCP_TEXT] = ccp_text;
    data.extend(rg_lw.iter().flat_map(|v| v.to_le_bytes()));

    data.extend_from_slice(&CB_RG_FC_LCB.to_le_bytes());
    let mut pairs = vec![FcLcb::default(); CB_RG_FC_LCB as usize];
    for &(pointer, fc, lcb) in pointers {
        pairs[pointer.index()] = FcLcb { fc, lcb };
    }
    for pair in pairs {
        data.extend_from_slice(&pair.fc.to_le_bytes());
        data.extend_from_slice(&pair.lcb.to_le_bytes());
    }

    data.extend_from_slice(&0u16.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fib_min_size() {
        let result = FileInformationBlock::parse(&[0u8; 16]);
        assert!(matches!(result, Err(Error::TruncatedStream { .. })));
    }

    #[test]
    fn test_fib_magic_validation() {
        let mut data = vec![0u8; 512];
        data[0] = 0xFF;
        data[1] = 0xFF;
        assert!(matches!(
            FileInformationBlock::parse(&data),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_fib_word97() {
        let data = fib_bytes(
            FibFlags::WHICH_TBL_STM | FibFlags::COMPLEX,
            1234,
            &[(FibPointer::Clx, 0x400, 0x20), (FibPointer::PlcfBteChpx, 0x100, 12)],
        );
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert!(fib.is_word97());
        assert_eq!(fib.version(), 0x00C1);
        assert_eq!(fib.language_id(), 0x0409);
        assert_eq!(fib.table_stream_name(), "1Table");
        assert!(fib.is_complex());
        assert!(!fib.is_encrypted());
        assert_eq!(fib.ccp_text(), 1234);
        assert_eq!(fib.fc_lcb_count(), 93);
        assert_eq!(
            fib.pointer(FibPointer::Clx),
            Some(FcLcb { fc: 0x400, lcb: 0x20 })
        );
        assert_eq!(fib.pointer(FibPointer::Dop), Some(FcLcb::default()));
    }

    #[test]
    fn test_fib_new_version() {
        let mut data = fib_bytes(FibFlags::empty(), 0, &[]);
        let len = data.len();
        data[len - 2..].copy_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&0x0112u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert_eq!(fib.n_fib(), 0x00C1);
        assert_eq!(fib.version(), 0x0112);
        assert_eq!(fib.table_stream_name(), "0Table");
    }

    #[test]
    fn test_flags_and_quick_saves() {
        let flags = FibFlags::from_bits_retain(0x0030) | FibFlags::ENCRYPTED | FibFlags::OBFUSCATED;
        let fib = FileInformationBlock::parse(&fib_bytes(flags, 0, &[])).unwrap();
        assert_eq!(fib.quick_saves(), 3);
        assert!(fib.is_encrypted());
        assert!(fib.is_obfuscated());
    }

    #[test]
    fn test_locate_bounds() {
        let data = fib_bytes(
            FibFlags::empty(),
            0,
            &[(FibPointer::Clx, 100, 50), (FibPointer::PlcfSed, 4000, 200)],
        );
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert_eq!(fib.locate(FibPointer::Clx, 150).unwrap(), Some(100..150));
        assert_eq!(fib.locate(FibPointer::Dop, 150).unwrap(), None);
        assert!(matches!(
            fib.locate(FibPointer::PlcfSed, 1024),
            Err(Error::FibPointerOutOfBounds {
                pointer: "fcPlcfSed",
                offset: 4000,
                length: 200,
                stream_len: 1024,
            })
        ));
    }

    #[test]
    fn test_word6_base_only() {
        let mut data = vec![0u8; 64];
        data[0..2].copy_from_slice(&WORD6_IDENT.to_le_bytes());
        data[2..4].copy_from_slice(&0x0065u16.to_le_bytes());
        let fib = FileInformationBlock::parse(&data).unwrap();
        assert!(!fib.is_word97());
        assert_eq!(fib.version(), 0x0065);
        assert_eq!(fib.pointer(FibPointer::Clx), None);
    }

    #[test]
    fn test_truncated_fc_lcb() {
        let data = fib_bytes(FibFlags::empty(), 0, &[]);
        assert!(matches!(
            FileInformationBlock::parse(&data[..300]),
            Err(Error::TruncatedStream { .. })
        ));
    }
}
