/// Word (.doc) binary document support.
///
/// A .doc file is an OLE2 structured storage containing several streams:
/// - **WordDocument**: the FIB, the text and the formatted disk pages
/// - **1Table** or **0Table**: PLCs, style sheet and other tables located by the FIB
/// - **Data**: embedded objects and pictures
///
/// [`WordFile`] opens the streams; the structures live in [`parts`].
///
/// # Example
///
/// ```rust,no_run
/// use oleparse::ole::OleFile;
/// use oleparse::ole::doc::WordFile;
/// use oleparse::ole::doc::parts::properties::Style;
///
/// let ole = OleFile::open_path("document.doc")?;
/// let word = WordFile::open(&ole)?;
///
/// for paragraph in word.paragraph_runs()? {
///     let style = paragraph.exceptions.apply(&Style::new());
///     println!("paragraph style {} at {:#x}", style.istd(), paragraph.start_fc);
/// }
/// for section in word.sections()? {
///     println!("section {}..{}", section.start_cp, section.end_cp);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod package;
pub mod parts;

pub use package::{Section, WordFile};
pub use parts::fib::{FcLcb, FibFlags, FibPointer, FileInformationBlock};
pub use parts::properties::{PropertyExceptions, PropertyKey, Style};
