mod auth;
mod store;

pub use auth::TokenManager;
pub use store::MemoryTokenStore;
pub use store::TokenStore;
