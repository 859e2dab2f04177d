pub mod pagination;
pub mod slug;

pub use pagination::{PageMeta, PageRequest, Pagination};
