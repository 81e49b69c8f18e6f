pub mod clock;
pub mod composer;
pub mod errors;
pub mod models;
pub mod overview;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod store;

pub use clock::*;
pub use composer::*;
pub use errors::*;
pub use models::*;
pub use overview::*;
pub use progress::*;
pub use scheduler::*;
pub use session::*;
pub use storage::*;
pub use store::*;
