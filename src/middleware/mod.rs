pub mod auth;
pub mod response;
pub mod roles;
pub mod validate;

pub use auth::authenticate;
pub use response::{ApiResponse, ApiResult, PageResult, Paginated, DEGRADED_MESSAGE};
pub use roles::require_roles;
pub use validate::{parse_id, ValidatedJson};
