pub mod editor;
pub mod file_io;
pub mod history;
pub mod images;
pub mod insertion;
pub mod layout;
pub mod markdown;
pub mod session;
pub mod store;
pub mod templates;

pub use editor::EditorBuffer;
pub use file_io::{
    ChosenPathSaver, DirectoryDownloads, DownloadSink, ExportError, ExportOutcome, FileIoError,
    NativeSaver, SaveError, derive_filename, export, read_text_file,
};
pub use history::{History, MAX_HISTORY_ENTRIES};
pub use images::{ImageError, ImageLibrary, StoredImage, image_markdown, is_image_path};
pub use insertion::{
    CursorPosition, EditingSurface, InsertPath, InsertTarget, InsertionCoordinator,
    SelectionRange, apply_template,
};
pub use layout::{
    Breakpoints, ContainerSpan, DeviceClass, DeviceProbe, DragState, LayoutController,
    LayoutState, UserAgentProbe, Viewport, ViewportProbe,
};
pub use markdown::{LineKind, PreviewLine, render_preview, render_preview_lines};
pub use session::Session;
pub use store::{FileStore, MemoryStore, PersistentStore, STORAGE_KEY, StoreError};
pub use templates::{DEFAULT_DOCUMENT, ToolbarAction};
