//! The four periodic tasks driven by the [`TaskScheduler`](crate::scheduler::TaskScheduler).

pub mod acquisition;
pub mod cloud;
pub mod display;
pub mod relays;

pub use acquisition::AcquisitionTask;
pub use cloud::CloudSyncTask;
pub use display::DisplayTask;
pub use relays::RelayTask;
