pub mod debounce;
pub mod mutation;
pub mod navigation;

pub use debounce::Debouncer;
pub use mutation::MutationWatcher;
pub use navigation::{NavigationDecision, NavigationWatcher};
