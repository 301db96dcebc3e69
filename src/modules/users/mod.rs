pub mod model;
pub mod store;

pub use model::{User, UserSummary};
pub use store::{MemoryUserStore, PgUserStore, UserStore};
