/// Entry point for legacy Word documents (.doc).
///
/// A `WordFile` holds the FIB together with the WordDocument and table
/// streams, and decodes the property structures the FIB points at.
use super::parts::fib::{FibPointer, FileInformationBlock};
use super::parts::fkp::{FKP_PAGE_SIZE, FkpKind, FkpRun, parse_page};
use super::parts::plcf::Plcf;
use super::parts::properties::PropertyExceptions;
use crate::common::binary::{read_i16_le, read_u32_le};
use crate::common::error::{Error, Result};
use crate::ole::OleFile;
use crate::ole::reader::VirtualStreamReader;
use bytes::Bytes;

/// Name of the main document stream
pub const WORD_DOCUMENT_STREAM: &str = "WordDocument";

/// PnFkpChpx / PnFkpPapx: page number in the low 22 bits
const PN_MASK: u32 = 0x003F_FFFF;
/// Size of a SED element in PlcfSed
const SED_SIZE: usize = 12;
/// fcSepx value meaning "no SEPX"
const NO_SEPX: u32 = 0xFFFF_FFFF;

/// A section: character-position range and its SEPX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub start_cp: u32,
    pub end_cp: u32,
    pub exceptions: PropertyExceptions,
}

/// A parsed Word 97+ binary document.
///
/// # Examples
///
/// ```rust,no_run
/// use oleparse::ole::OleFile;
/// use oleparse::ole::doc::WordFile;
///
/// let ole = OleFile::open_path("document.doc")?;
/// let word = WordFile::open(&ole)?;
/// println!("{} characters of main text", word.fib().ccp_text());
/// for run in word.character_runs()? {
///     println!("{:#x}..{:#x}: {} sprms", run.start_fc, run.end_fc, run.exceptions.sprms().len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct WordFile {
    fib: FileInformationBlock,
    word_document: Bytes,
    table: Bytes,
}

impl WordFile {
    /// Read the FIB and the streams it selects.
    ///
    /// Encrypted and obfuscated documents are rejected, as are Word 6/95
    /// files whose FIB layout predates the 97 format.
    pub fn open(ole: &OleFile) -> Result<Self> {
        let stream = ole.open_stream(&[WORD_DOCUMENT_STREAM])?;
        let mut reader = VirtualStreamReader::new(stream)?;
        let fib = FileInformationBlock::read(&mut reader)?;

        if fib.is_encrypted() {
            let what = if fib.is_obfuscated() {
                "XOR-obfuscated Word documents"
            } else {
                "encrypted Word documents"
            };
            return Err(Error::Unsupported(what.to_string()));
        }
        if !fib.is_word97() {
            return Err(Error::Unsupported(format!(
                "Word 6/95 documents (nFib 0x{:04X})",
                fib.n_fib()
            )));
        }

        reader.seek_to(0)?;
        let len = reader.len() as usize;
        let word_document = Bytes::from(reader.read_bytes(len)?);
        let table = Bytes::from(ole.read_stream(&[fib.table_stream_name()])?);

        log::debug!(
            "opened Word document nFib 0x{:04X}, table stream {} ({} bytes)",
            fib.version(),
            fib.table_stream_name(),
            table.len()
        );

        Ok(Self {
            fib,
            word_document,
            table,
        })
    }

    #[inline]
    pub fn fib(&self) -> &FileInformationBlock {
        &self.fib
    }

    #[inline]
    pub fn word_document(&self) -> &Bytes {
        &self.word_document
    }

    /// The 0Table or 1Table stream.
    #[inline]
    pub fn table_stream(&self) -> &Bytes {
        &self.table
    }

    /// Bytes of a structure stored in the table stream.
    pub fn table_bytes(&self, pointer: FibPointer) -> Result<Option<&[u8]>> {
        let range = self.fib.locate(pointer, self.table.len() as u64)?;
        Ok(range.map(|r| &self.table[r.start as usize..r.end as usize]))
    }

    /// A PLC stored in the table stream, `None` when the FIB leaves it empty.
    pub fn plcf(&self, pointer: FibPointer, element_size: usize) -> Result<Option<Plcf>> {
        self.table_bytes(pointer)?
            .map(|bytes| Plcf::parse(bytes, element_size))
            .transpose()
    }

    /// Character exceptions from every CHPX FKP, in file order.
    pub fn character_runs(&self) -> Result<Vec<FkpRun>> {
        self.fkp_runs(FibPointer::PlcfBteChpx, FkpKind::Character)
    }

    /// Paragraph exceptions from every PAPX FKP, in file order.
    pub fn paragraph_runs(&self) -> Result<Vec<FkpRun>> {
        self.fkp_runs(FibPointer::PlcfBtePapx, FkpKind::Paragraph)
    }

    fn fkp_runs(&self, pointer: FibPointer, kind: FkpKind) -> Result<Vec<FkpRun>> {
        let Some(bin_table) = self.plcf(pointer, 4)? else {
            return Ok(Vec::new());
        };

        let mut runs = Vec::new();
        for (_, _, element) in bin_table.iter() {
            let pn = read_u32_le(element, 0)? & PN_MASK;
            let page = self.page(pn)?;
            runs.extend(parse_page(page, kind)?);
        }
        Ok(runs)
    }

    fn page(&self, pn: u32) -> Result<&[u8]> {
        let start = pn as usize * FKP_PAGE_SIZE;
        self.word_document
            .get(start..start + FKP_PAGE_SIZE)
            .ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "FKP page {} lies outside the {}-byte WordDocument stream",
                    pn,
                    self.word_document.len()
                ))
            })
    }

    /// Sections from PlcfSed with their SEPX.
    pub fn sections(&self) -> Result<Vec<Section>> {
        let Some(plcf) = self.plcf(FibPointer::PlcfSed, SED_SIZE)? else {
            return Ok(Vec::new());
        };

        plcf.iter()
            .map(|(start_cp, end_cp, sed)| -> Result<Section> {
                let fc_sepx = read_u32_le(sed, 2)?;
                let exceptions = if fc_sepx == NO_SEPX {
                    PropertyExceptions::Section(Vec::new())
                } else {
                    PropertyExceptions::section(self.sepx(fc_sepx as usize)?)?
                };
                Ok(Section {
                    start_cp,
                    end_cp,
                    exceptions,
                })
            })
            .collect()
    }

    /// SEPX grpprl at `fc`: a signed 16-bit byte count and the SPRMs.
    fn sepx(&self, fc: usize) -> Result<&[u8]> {
        let cb = read_i16_le(&self.word_document, fc)?;
        let cb = usize::try_from(cb)
            .map_err(|_| Error::InvalidFormat(format!("negative SEPX length at {}", fc)))?;
        let start = fc + 2;
        self.word_document
            .get(start..start + cb)
            .ok_or_else(|| {
                let available = self.word_document.len().saturating_sub(start);
                Error::truncated(cb as u64, available as u64)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::cfb::test_image::ImageBuilder;
    use crate::ole::doc::parts::fib::{FibFlags, fib_bytes};
    use crate::ole::doc::parts::fkp::test_pages::{chpx_page, papx_page};
    use crate::ole::doc::parts::properties::Style;
    use crate::ole::sprm_operations::*;

    const CHPX_PN: u32 = 2;
    const PAPX_PN: u32 = 3;
    const SEPX_FC: u32 = 2048;

    fn plc(cps: &[u32], elements: &[&[u8]]) -> Vec<u8> {
        let mut data: Vec<u8> = cps.iter().flat_map(|cp| cp.to_le_bytes()).collect();
        for element in elements {
            data.extend_from_slice(element);
        }
        data
    }

    fn sed(fc_sepx: u32) -> Vec<u8> {
        let mut sed = vec![0u8; SED_SIZE];
        sed[2..6].copy_from_slice(&fc_sepx.to_le_bytes());
        sed
    }

    /// WordDocument and 1Table streams for a small document.
    fn streams(flags: FibFlags) -> (Vec<u8>, Vec<u8>) {
        let bte_chpx = plc(&[0x400, 0x440], &[&CHPX_PN.to_le_bytes()]);
        let bte_papx = plc(&[0x400, 0x480], &[&PAPX_PN.to_le_bytes()]);
        let plcf_sed = plc(&[0, 40, 64], &[&sed(SEPX_FC), &sed(NO_SEPX)]);

        let mut table = Vec::new();
        let chpx_at = table.len() as u32;
        table.extend_from_slice(&bte_chpx);
        let papx_at = table.len() as u32;
        table.extend_from_slice(&bte_papx);
        let sed_at = table.len() as u32;
        table.extend_from_slice(&plcf_sed);

        let mut word = fib_bytes(
            flags | FibFlags::WHICH_TBL_STM,
            64,
            &[
                (FibPointer::PlcfBteChpx, chpx_at, bte_chpx.len() as u32),
                (FibPointer::PlcfBtePapx, papx_at, bte_papx.len() as u32),
                (FibPointer::PlcfSed, sed_at, plcf_sed.len() as u32),
            ],
        );
        word.resize(CHPX_PN as usize * FKP_PAGE_SIZE, 0);
        word.extend(chpx_page(&[
            (0x400, 0x420, &[0x35, 0x08, 0x01]),
            (0x420, 0x440, &[0x36, 0x08, 0x01]),
        ]));
        word.extend(papx_page(&[(0x400, 0x480, 5, &[0x61, 0x24, 0x02])]));
        assert_eq!(word.len(), SEPX_FC as usize);
        word.extend_from_slice(&3i16.to_le_bytes());
        word.extend_from_slice(&[0x09, 0x30, 0x02]); // sprmSBkc = 2

        (word, table)
    }

    fn open(flags: FibFlags) -> Result<WordFile> {
        let (word, table) = streams(flags);
        let image = ImageBuilder::new(512)
            .stream(WORD_DOCUMENT_STREAM, &word)
            .stream("1Table", &table)
            .build();
        WordFile::open(&OleFile::from_bytes(image)?)
    }

    #[test]
    fn test_open_selects_table_stream() {
        let word = open(FibFlags::empty()).unwrap();
        assert_eq!(word.fib().table_stream_name(), "1Table");
        assert_eq!(word.fib().ccp_text(), 64);
        assert_eq!(word.word_document().len(), SEPX_FC as usize + 5);
        assert_eq!(word.table_stream().len(), 12 + 12 + 36);
    }

    #[test]
    fn test_character_runs() {
        let word = open(FibFlags::empty()).unwrap();
        let runs = word.character_runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[1].start_fc, runs[1].end_fc), (0x420, 0x440));
        let style = runs[1].exceptions.apply(&Style::new());
        assert_eq!(style.flag(SPRM_C_F_ITALIC), Some(true));
        assert!(!style.contains(SPRM_C_F_BOLD));
    }

    #[test]
    fn test_paragraph_runs() {
        let word = open(FibFlags::empty()).unwrap();
        let runs = word.paragraph_runs().unwrap();
        assert_eq!(runs.len(), 1);
        let style = runs[0].exceptions.apply(&Style::new());
        assert_eq!(style.istd(), 5);
        assert_eq!(style.byte(SPRM_P_JC), Some(2));
    }

    #[test]
    fn test_sections() {
        let word = open(FibFlags::empty()).unwrap();
        let sections = word.sections().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!((sections[0].start_cp, sections[0].end_cp), (0, 40));
        let style = sections[0].exceptions.apply(&Style::new());
        assert_eq!(style.byte(SPRM_S_BKC), Some(2));
        assert!(sections[1].exceptions.sprms().is_empty());
    }

    #[test]
    fn test_encrypted_is_unsupported() {
        assert!(matches!(
            open(FibFlags::ENCRYPTED),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            open(FibFlags::ENCRYPTED | FibFlags::OBFUSCATED),
            Err(Error::Unsupported(msg)) if msg.contains("obfuscated")
        ));
    }

    #[test]
    fn test_missing_table_stream() {
        let (word, _) = streams(FibFlags::empty());
        let image = ImageBuilder::new(512)
            .stream(WORD_DOCUMENT_STREAM, &word)
            .stream("0Table", b"unused")
            .build();
        let ole = OleFile::from_bytes(image).unwrap();
        assert!(matches!(
            WordFile::open(&ole),
            Err(Error::StreamNotFound(_))
        ));
    }

    #[test]
    fn test_pointer_outside_table_stream() {
        let word = fib_bytes(
            FibFlags::empty(),
            0,
            &[(FibPointer::PlcfBteChpx, 0, 4096)],
        );
        let image = ImageBuilder::new(512)
            .stream(WORD_DOCUMENT_STREAM, &word)
            .stream("0Table", &[0u8; 16])
            .build();
        let word = WordFile::open(&OleFile::from_bytes(image).unwrap()).unwrap();
        assert!(matches!(
            word.character_runs(),
            Err(Error::FibPointerOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_fkp_page_outside_stream() {
        let bte = plc(&[0, 10], &[&100u32.to_le_bytes()]);
        let word = fib_bytes(
            FibFlags::empty(),
            0,
            &[(FibPointer::PlcfBteChpx, 0, bte.len() as u32)],
        );
        let image = ImageBuilder::new(512)
            .stream(WORD_DOCUMENT_STREAM, &word)
            .stream("0Table", &bte)
            .build();
        let word = WordFile::open(&OleFile::from_bytes(image).unwrap()).unwrap();
        assert!(matches!(
            word.character_runs(),
            Err(Error::InvalidFormat(_))
        ));
    }
}
