pub mod announce;
pub mod dom;
pub mod geometry;
pub mod matcher;
pub mod namespace;
pub mod placement;
pub mod popup;
pub mod scanner;
pub mod selector;
pub mod styles;

pub use dom::Document;
pub use geometry::{Layout, StaticLayout};
pub use matcher::{Segment, TermIndex, TermMatch};
pub use namespace::Namespace;
pub use popup::{Deferred, PopupController, PopupState};
pub use scanner::{ScanReport, Scanner};
pub use selector::{Selector, SelectorError};
