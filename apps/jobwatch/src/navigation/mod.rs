pub mod adapter;
pub mod patterns;

pub use adapter::{NavigationAdapter, NavigationSignal, SignalSource};
pub use patterns::{is_job_page, is_launcher_page};
