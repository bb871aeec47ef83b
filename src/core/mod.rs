pub mod projection;
pub mod reconciler;
pub mod store;
pub mod workspace;

pub use crate::domain::model::{Sequence, Step};
pub use crate::domain::ports::{ConfigProvider, SequenceService};
pub use crate::utils::error::Result;
