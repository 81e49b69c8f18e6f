pub mod backend;
pub mod debounce;
pub mod gateway;
pub mod paths;
pub mod snapshot;

pub use backend::FileBackend;
pub use debounce::{ManualScheduler, SaveScheduler, TimerScheduler};
pub use gateway::{LoadedProfile, ProfileStore, SAVE_DEBOUNCE};
pub use snapshot::SnapshotStore;
