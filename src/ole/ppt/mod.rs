/// PowerPoint (.ppt) presentation support.
///
/// A .ppt file is an OLE2 structured storage containing several streams:
/// - **Current User**: the CurrentUserAtom pointing at the newest save
/// - **PowerPoint Document**: every record of every save, appended
/// - **Pictures**: embedded pictures (not decoded)
///
/// [`Presentation::open`] resolves the newest version of the document and
/// its slides; [`records`] holds the record family it is built on.
///
/// # Example
///
/// ```rust,no_run
/// use oleparse::ole::OleFile;
/// use oleparse::ole::ppt::Presentation;
///
/// let ole = OleFile::open_path("presentation.ppt")?;
/// let pres = Presentation::open(&ole)?;
/// println!("{}", pres.text());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod current_user;
pub mod presentation;
pub mod records;

pub use current_user::CurrentUser;
pub use presentation::{Presentation, Slide, SlideText};
pub use records::{Container, PptRecord, TextType};
