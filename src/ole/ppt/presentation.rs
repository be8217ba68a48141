/// Presentation - decoded content of a PowerPoint (.ppt) file.
///
/// Opening a presentation walks the incremental-save structures: the
/// CurrentUserAtom points at the newest UserEditAtom, each UserEditAtom
/// points at its PersistDirectoryAtom and at the previous edit. Merging the
/// directories (newer saves shadow older ones) maps persist ids to stream
/// offsets, through which the Document container and every slide are found.
use super::current_user::CurrentUser;
use super::records::{
    Container, DocumentAtom, PptRecord, SlidePersistAtom, TextType, UserEditAtom, tags,
};
use crate::common::error::{Error, Result};
use crate::ole::OleFile;
use crate::ole::cfb::VirtualStream;
use crate::ole::context::ParseContext;
use crate::ole::reader::VirtualStreamReader;
use crate::ole::record::read_record;
use fixedbitset::FixedBitSet;
use std::collections::BTreeMap;

/// Name of the main presentation stream
pub const DOCUMENT_STREAM: &str = "PowerPoint Document";

/// SlideListWithText instance holding presentation slides
const SLIDE_LIST_SLIDES: u16 = 0;

/// One placeholder text of a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideText {
    pub text_type: TextType,
    pub text: String,
}

/// A slide with its outline text and decoded container.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub persist: SlidePersistAtom,
    /// Texts stored for the slide in the document's SlideListWithText
    pub texts: Vec<SlideText>,
    /// The Slide container the persist id resolves to
    pub record: Container,
}

impl Slide {
    /// Slide text with paragraph and line breaks turned into newlines.
    pub fn text(&self) -> String {
        self.texts
            .iter()
            .map(|t| normalize_breaks(&t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn normalize_breaks(text: &str) -> String {
    text.replace(['\r', '\u{000B}'], "\n")
}

/// A decoded PowerPoint presentation.
///
/// # Example
///
/// ```rust,no_run
/// use oleparse::ole::OleFile;
/// use oleparse::ole::ppt::Presentation;
///
/// let ole = OleFile::open_path("presentation.ppt")?;
/// let pres = Presentation::open(&ole)?;
/// for (i, slide) in pres.slides().iter().enumerate() {
///     println!("slide {}: {}", i + 1, slide.text());
/// }
/// # Ok::<(), oleparse::common::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Presentation {
    current_user: CurrentUser,
    /// Newest first
    user_edits: Vec<UserEditAtom>,
    persist_offsets: BTreeMap<u32, u32>,
    document: Container,
    slides: Vec<Slide>,
}

impl Presentation {
    pub fn open(ole: &OleFile) -> Result<Self> {
        let current_user = CurrentUser::read(ole)?;
        if current_user.is_encrypted() {
            return Err(Error::Unsupported("encrypted presentations".to_string()));
        }

        let mut reader = VirtualStreamReader::new(ole.open_stream(&[DOCUMENT_STREAM])?)?;
        let mut ctx = ParseContext::new();

        let (user_edits, persist_offsets) =
            read_edit_chain(&mut reader, &mut ctx, current_user.offset_to_current_edit)?;
        let newest = user_edits
            .first()
            .ok_or_else(|| Error::InvalidFormat("no UserEditAtom".to_string()))?;

        let document = match read_persist(&mut reader, &mut ctx, &persist_offsets, newest.doc_persist_id_ref)? {
            PptRecord::Container(c) if c.tag == tags::DOCUMENT => c,
            other => {
                return Err(Error::InvalidFormat(format!(
                    "document persist id resolves to record 0x{:04X}",
                    other.tag()
                )));
            },
        };

        let mut slides = Vec::new();
        if let Some(list) = document.child_container(tags::SLIDE_LIST_WITH_TEXT, SLIDE_LIST_SLIDES) {
            for (persist, texts) in slide_outline(list) {
                let record = match read_persist(&mut reader, &mut ctx, &persist_offsets, persist.persist_id_ref)? {
                    PptRecord::Container(c) if c.tag == tags::SLIDE => c,
                    other => {
                        return Err(Error::InvalidFormat(format!(
                            "slide {} resolves to record 0x{:04X}",
                            persist.slide_id,
                            other.tag()
                        )));
                    },
                };
                slides.push(Slide {
                    persist,
                    texts,
                    record,
                });
            }
        }

        log::debug!(
            "decoded presentation: {} edits, {} persist objects, {} slides",
            user_edits.len(),
            persist_offsets.len(),
            slides.len()
        );

        Ok(Self {
            current_user,
            user_edits,
            persist_offsets,
            document,
            slides,
        })
    }

    pub fn current_user(&self) -> &CurrentUser {
        &self.current_user
    }

    /// Every save of the document, newest first.
    pub fn user_edits(&self) -> &[UserEditAtom] {
        &self.user_edits
    }

    /// Stream offset of the newest version of persist object `id`.
    pub fn persist_offset(&self, id: u32) -> Option<u32> {
        self.persist_offsets.get(&id).copied()
    }

    pub fn document(&self) -> &Container {
        &self.document
    }

    pub fn document_atom(&self) -> Option<&DocumentAtom> {
        self.document.children.iter().find_map(|child| match child {
            PptRecord::Document(atom) => Some(atom),
            _ => None,
        })
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Text of every slide, one slide per paragraph.
    pub fn text(&self) -> String {
        self.slides
            .iter()
            .map(Slide::text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn read_at(
    reader: &mut VirtualStreamReader<VirtualStream>,
    ctx: &mut ParseContext,
    offset: u32,
) -> Result<PptRecord> {
    if offset as u64 >= reader.len() {
        return Err(Error::InvalidFormat(format!(
            "record offset {} beyond the {}-byte document stream",
            offset,
            reader.len()
        )));
    }
    reader.seek_to(offset as u64)?;
    read_record::<PptRecord, _>(reader, ctx)
}

fn read_persist(
    reader: &mut VirtualStreamReader<VirtualStream>,
    ctx: &mut ParseContext,
    offsets: &BTreeMap<u32, u32>,
    id: u32,
) -> Result<PptRecord> {
    let offset = offsets
        .get(&id)
        .copied()
        .ok_or_else(|| Error::InvalidFormat(format!("persist id {} has no offset", id)))?;
    read_at(reader, ctx, offset)
}

/// Walk UserEditAtoms from `start` back to the first save.
///
/// Returns the edits newest first and the merged persist directory, where an
/// id keeps the offset from the newest save that wrote it.
fn read_edit_chain(
    reader: &mut VirtualStreamReader<VirtualStream>,
    ctx: &mut ParseContext,
    start: u32,
) -> Result<(Vec<UserEditAtom>, BTreeMap<u32, u32>)> {
    let mut visited = FixedBitSet::with_capacity(reader.len() as usize);
    let mut edits = Vec::new();
    let mut offsets = BTreeMap::new();
    let mut next = Some(start);

    while let Some(offset) = next {
        if (offset as usize) < visited.len() && visited.put(offset as usize) {
            return Err(Error::InvalidFormat(format!(
                "UserEditAtom chain revisits offset {}",
                offset
            )));
        }
        let edit = match read_at(reader, ctx, offset)? {
            PptRecord::UserEdit(edit) => edit,
            other => {
                return Err(Error::InvalidFormat(format!(
                    "expected UserEditAtom at {}, found record 0x{:04X}",
                    offset,
                    other.tag()
                )));
            },
        };

        let entries = match read_at(reader, ctx, edit.offset_persist_directory)? {
            PptRecord::PersistDirectory(entries) => entries,
            other => {
                return Err(Error::InvalidFormat(format!(
                    "expected PersistDirectoryAtom at {}, found record 0x{:04X}",
                    edit.offset_persist_directory,
                    other.tag()
                )));
            },
        };
        for entry in entries {
            for (id, stream_offset) in (entry.first_persist_id..).zip(entry.offsets) {
                offsets.entry(id).or_insert(stream_offset);
            }
        }

        next = (edit.offset_last_edit != 0).then_some(edit.offset_last_edit);
        edits.push(edit);
    }
    Ok((edits, offsets))
}

/// Group a SlideListWithText into per-slide texts.
fn slide_outline(list: &Container) -> Vec<(SlidePersistAtom, Vec<SlideText>)> {
    let mut slides: Vec<(SlidePersistAtom, Vec<SlideText>)> = Vec::new();
    let mut text_type = TextType::Other;
    for child in &list.children {
        match child {
            PptRecord::SlidePersist(atom) => {
                slides.push((*atom, Vec::new()));
                text_type = TextType::Other;
            },
            PptRecord::TextHeader(t) => text_type = *t,
            PptRecord::TextChars(text) | PptRecord::TextBytes(text) => {
                if let Some((_, texts)) = slides.last_mut() {
                    texts.push(SlideText {
                        text_type,
                        text: text.clone(),
                    });
                }
            },
            _ => {},
        }
    }
    slides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::cfb::test_image::ImageBuilder;
    use crate::ole::ppt::current_user::{
        CURRENT_USER_STREAM, TOKEN_ENCRYPTED, TOKEN_PLAIN, current_user_stream,
    };
    use crate::ole::ppt::records::{container, office_record};

    fn document_atom() -> Vec<u8> {
        let mut payload = Vec::new();
        for v in [5760i32, 4320, 4320, 5760, 1, 2] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&1u16.to_le_bytes());
        payload.extend_from_slice(&0u16.to_le_bytes());
        payload.extend_from_slice(&[0, 0, 0, 1]);
        office_record(tags::DOCUMENT_ATOM, 1, 1, &payload)
    }

    fn slide_persist(persist_id: u32, slide_id: u32) -> Vec<u8> {
        let mut payload = persist_id.to_le_bytes().to_vec();
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&2i32.to_le_bytes());
        payload.extend_from_slice(&slide_id.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        office_record(tags::SLIDE_PERSIST_ATOM, 0, 0, &payload)
    }

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn persist_dir(entries: &[(u32, &[u32])]) -> Vec<u8> {
        let mut payload = Vec::new();
        for (first, offsets) in entries {
            payload.extend_from_slice(&(((offsets.len() as u32) << 20) | first).to_le_bytes());
            for offset in offsets.iter() {
                payload.extend_from_slice(&offset.to_le_bytes());
            }
        }
        office_record(tags::PERSIST_DIRECTORY_ATOM, 0, 0, &payload)
    }

    fn user_edit(last_edit: u32, persist_dir: u32) -> Vec<u8> {
        let mut payload = 256u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&0u16.to_le_bytes());
        payload.extend_from_slice(&[0, 3]);
        payload.extend_from_slice(&last_edit.to_le_bytes());
        payload.extend_from_slice(&persist_dir.to_le_bytes());
        payload.extend_from_slice(&1u32.to_le_bytes());
        payload.extend_from_slice(&3u32.to_le_bytes());
        payload.extend_from_slice(&1u16.to_le_bytes());
        payload.extend_from_slice(&0u16.to_le_bytes());
        office_record(tags::USER_EDIT_ATOM, 0, 0, &payload)
    }

    fn slide(marker: &str) -> Vec<u8> {
        container(
            tags::SLIDE,
            0,
            &[
                office_record(tags::SLIDE_ATOM, 2, 2, &[0; 24]),
                office_record(tags::CSTRING, 0, 0, &utf16(marker)),
            ],
        )
    }

    /// Two saves: the second rewrites slide persist id 2.
    /// Returns the stream and the offset of the newest UserEditAtom.
    fn document_stream(self_loop: bool) -> (Vec<u8>, u32) {
        let doc = container(
            tags::DOCUMENT,
            0,
            &[
                document_atom(),
                container(tags::ENVIRONMENT, 0, &[]),
                container(
                    tags::SLIDE_LIST_WITH_TEXT,
                    0,
                    &[
                        slide_persist(2, 256),
                        office_record(tags::TEXT_HEADER_ATOM, 0, 0, &0u32.to_le_bytes()),
                        office_record(tags::TEXT_CHARS_ATOM, 0, 0, &utf16("Hello")),
                        office_record(tags::TEXT_HEADER_ATOM, 0, 0, &1u32.to_le_bytes()),
                        office_record(tags::TEXT_BYTES_ATOM, 0, 0, b"one\rtwo"),
                        office_record(tags::STYLE_TEXT_PROP_ATOM, 0, 0, &[0; 10]),
                    ],
                ),
            ],
        );
        let old_slide = slide("old");
        let new_slide = slide("new");

        let off_old = doc.len() as u32;
        let off_new = off_old + old_slide.len() as u32;
        let off_p1 = off_new + new_slide.len() as u32;
        let p1 = persist_dir(&[(1, &[0, off_old])]);
        let off_u1 = off_p1 + p1.len() as u32;
        let u1 = user_edit(0, off_p1);
        let off_p2 = off_u1 + u1.len() as u32;
        let p2 = persist_dir(&[(2, &[off_new])]);
        let off_u2 = off_p2 + p2.len() as u32;
        let u2 = user_edit(if self_loop { off_u2 } else { off_u1 }, off_p2);

        let data = [doc, old_slide, new_slide, p1, u1, p2, u2].concat();
        (data, off_u2)
    }

    fn open_with(token: u32, self_loop: bool) -> Result<Presentation> {
        let (data, edit) = document_stream(self_loop);
        let image = ImageBuilder::new(512)
            .stream(CURRENT_USER_STREAM, &current_user_stream(token, edit, "dave"))
            .stream(DOCUMENT_STREAM, &data)
            .build();
        Presentation::open(&OleFile::from_bytes(image)?)
    }

    #[test]
    fn test_open_presentation() {
        let pres = open_with(TOKEN_PLAIN, false).unwrap();
        assert_eq!(pres.current_user().user_name, "dave");
        assert_eq!(pres.user_edits().len(), 2);
        assert_eq!(pres.persist_offset(1), Some(0));
        assert_eq!(pres.document().tag, tags::DOCUMENT);

        let atom = pres.document_atom().unwrap();
        assert_eq!(atom.slide_size, (5760, 4320));
        assert_eq!(atom.first_slide_number, 1);
        assert!(atom.show_comments);

        let slides = pres.slides();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].persist.slide_id, 256);
        assert_eq!(slides[0].texts[0].text_type, TextType::Title);
        assert_eq!(slides[0].texts[1].text_type, TextType::Body);
        assert_eq!(slides[0].text(), "Hello\none\ntwo");
        assert_eq!(pres.text(), "Hello\none\ntwo");
    }

    #[test]
    fn test_newest_persist_entry_wins() {
        let pres = open_with(TOKEN_PLAIN, false).unwrap();
        let slide = &pres.slides()[0];
        assert!(
            slide
                .record
                .children
                .contains(&PptRecord::CString("new".to_string()))
        );
        assert_eq!(pres.user_edits()[1].offset_last_edit, 0);
    }

    #[test]
    fn test_cyclic_edit_chain() {
        assert!(matches!(
            open_with(TOKEN_PLAIN, true),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_encrypted_presentation() {
        assert!(matches!(
            open_with(TOKEN_ENCRYPTED, false),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_edit_offset_out_of_range() {
        let (data, _) = document_stream(false);
        let image = ImageBuilder::new(512)
            .stream(CURRENT_USER_STREAM, &current_user_stream(TOKEN_PLAIN, 0xFFFF, "x"))
            .stream(DOCUMENT_STREAM, &data)
            .build();
        let ole = OleFile::from_bytes(image).unwrap();
        assert!(matches!(Presentation::open(&ole), Err(Error::InvalidFormat(_))));
    }
}
