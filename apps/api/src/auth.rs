mod bootstrap;
mod session;

pub use bootstrap::bootstrap_handler;
pub use session::{logout_handler, me_handler, session_state};

pub const SESSION_USER_KEY: &str = "user_identity";
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";
