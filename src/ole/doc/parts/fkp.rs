/// FKP (Formatted Disk Page) parser for DOC files.
///
/// FKPs are 512-byte pages in the WordDocument stream holding character
/// (CHPX) or paragraph (PAPX) exceptions for consecutive file-character
/// ranges. Each page starts with `n + 1` file offsets, is followed by `n`
/// offset bytes (plus a 12-byte PHE for PAPX pages) and ends with the run
/// count in its last byte; the exceptions themselves grow backwards from the
/// end of the page.
use super::properties::PropertyExceptions;
use crate::common::binary::read_u32_le;
use crate::common::error::{Error, Result};

/// Size of an FKP page in bytes
pub const FKP_PAGE_SIZE: usize = 512;

/// Largest run count a CHPX page can hold
const MAX_CHPX_RUNS: usize = 0x65;
/// Largest run count a PAPX page can hold
const MAX_PAPX_RUNS: usize = 0x1D;
/// BxPap: one offset byte plus a 12-byte PHE
const BX_PAP_SIZE: usize = 13;

/// Exceptions covering the file-character range `[start_fc, end_fc)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FkpRun {
    pub start_fc: u32,
    pub end_fc: u32,
    pub exceptions: PropertyExceptions,
}

/// Kind of a formatted disk page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkpKind {
    Character,
    Paragraph,
}

/// Decode every run of a CHPX or PAPX page.
pub fn parse_page(page: &[u8], kind: FkpKind) -> Result<Vec<FkpRun>> {
    if page.len() != FKP_PAGE_SIZE {
        return Err(Error::InvalidFormat(format!(
            "FKP page is {} bytes, expected {}",
            page.len(),
            FKP_PAGE_SIZE
        )));
    }

    let runs = page[FKP_PAGE_SIZE - 1] as usize;
    let (max_runs, entry_size) = match kind {
        FkpKind::Character => (MAX_CHPX_RUNS, 1),
        FkpKind::Paragraph => (MAX_PAPX_RUNS, BX_PAP_SIZE),
    };
    if runs == 0 || runs > max_runs {
        return Err(Error::InvalidFormat(format!(
            "FKP run count {} outside 1..={}",
            runs, max_runs
        )));
    }

    let fcs = (0..=runs)
        .map(|i| read_u32_le(page, i * 4))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let offsets_start = (runs + 1) * 4;

    (0..runs)
        .map(|i| -> Result<FkpRun> {
            let word_offset = page[offsets_start + i * entry_size] as usize;
            let exceptions = match kind {
                FkpKind::Character => chpx(page, word_offset)?,
                FkpKind::Paragraph => papx(page, word_offset)?,
            };
            Ok(FkpRun {
                start_fc: fcs[i],
                end_fc: fcs[i + 1],
                exceptions,
            })
        })
        .collect()
}

/// CHPX at `word_offset * 2`: a length byte and a grpprl. Offset 0 means no exceptions.
fn chpx(page: &[u8], word_offset: usize) -> Result<PropertyExceptions> {
    if word_offset == 0 {
        return Ok(PropertyExceptions::Character(Vec::new()));
    }
    let at = word_offset * 2;
    let cb = page[at] as usize;
    let grpprl = slice(page, at + 1, cb)?;
    PropertyExceptions::character(grpprl)
}

/// PAPX at `word_offset * 2`.
///
/// A non-zero length byte counts words minus one byte; a zero length byte is
/// followed by a second byte counting words.
fn papx(page: &[u8], word_offset: usize) -> Result<PropertyExceptions> {
    if word_offset == 0 {
        return Ok(PropertyExceptions::Paragraph {
            istd: 0,
            sprms: Vec::new(),
        });
    }
    let at = word_offset * 2;
    let cb = page[at] as usize;
    let (start, len) = if cb == 0 {
        let cb_prime = *page
            .get(at + 1)
            .ok_or_else(|| Error::InvalidFormat("PAPX length outside FKP page".to_string()))?
            as usize;
        (at + 2, cb_prime * 2)
    } else {
        (at + 1, cb * 2 - 1)
    };
    PropertyExceptions::paragraph(slice(page, start, len)?)
}

fn slice(page: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    // The run count byte is never part of an exception.
    page.get(start..start + len)
        .filter(|_| start + len < FKP_PAGE_SIZE)
        .ok_or_else(|| {
            Error::InvalidFormat(format!(
                "FKP exception at {} with {} bytes overruns the page",
                start, len
            ))
        })
}


#[cfg(test)]
mod tests {
    use super::test_pages::*;
    use super::*;
    use crate::ole::sprm_operations::*;

    #[test]
    fn test_chpx_page() {
        let page = chpx_page(&[
            (0x400, 0x410, &[0x35, 0x08, 0x01]),
            (0x410, 0x420, &[]),
            (0x420, 0x440, &[0x43, 0x4A, 0x20, 0x00]),
        ]);
        let runs = parse_page(&page, FkpKind::Character).unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!((runs[0].start_fc, runs[0].end_fc), (0x400, 0x410));
        assert_eq!(runs[0].exceptions.sprms()[0].opcode, SPRM_C_F_BOLD);
        assert!(runs[1].exceptions.sprms().is_empty());
        assert_eq!(runs[2].exceptions.sprms()[0].operand_word(), Some(32));
        assert_eq!(runs[2].end_fc, 0x440);
    }

    #[test]
    fn test_papx_page_both_length_forms() {
        let page = papx_page(&[
            (0x400, 0x420, 1, &[0x16, 0x24, 0x01]), // odd body
            (0x420, 0x480, 2, &[0x61, 0x24, 0x01, 0x00]), // even body, trailing pad
        ]);
        let runs = parse_page(&page, FkpKind::Paragraph).unwrap();
        assert_eq!(runs[0].exceptions.istd(), Some(1));
        assert_eq!(runs[0].exceptions.sprms()[0].opcode, SPRM_P_F_IN_TABLE);
        assert_eq!(runs[1].exceptions.istd(), Some(2));
        assert_eq!(runs[1].exceptions.sprms().len(), 1);
        assert_eq!(runs[1].exceptions.sprms()[0].opcode, SPRM_P_JC);
    }

    #[test]
    fn test_bad_pages() {
        assert!(parse_page(&[0u8; 100], FkpKind::Character).is_err());

        let empty = vec![0u8; FKP_PAGE_SIZE];
        assert!(matches!(
            parse_page(&empty, FkpKind::Character),
            Err(Error::InvalidFormat(_))
        ));

        let mut too_many = vec![0u8; FKP_PAGE_SIZE];
        too_many[FKP_PAGE_SIZE - 1] = 0x1E;
        assert!(parse_page(&too_many, FkpKind::Paragraph).is_err());

        let mut overrun = chpx_page(&[(0, 2, &[0x35, 0x08, 0x01])]);
        let offsets_start = 8;
        let at = overrun[offsets_start] as usize * 2;
        overrun[at] = 200;
        assert!(parse_page(&overrun, FkpKind::Character).is_err());
    }
}
