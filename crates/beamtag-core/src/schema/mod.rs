pub mod convert;
pub mod label;
pub mod tag;

pub use convert::convert;
pub use label::Label;
pub use tag::{Scheme, Tag};
