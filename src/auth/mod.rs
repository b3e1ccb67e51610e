pub mod events;
pub mod provider;
pub mod session;

pub use events::SessionEvent;
pub use provider::{provider_fn, AccessTokenProvider, FnProvider, StaticTokenProvider};
pub use session::AuthSession;
