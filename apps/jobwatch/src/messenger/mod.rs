pub mod broadcast;
pub mod handle;
pub mod protocol;

pub use broadcast::{Broadcaster, Publisher};
pub use handle::{MessengerError, PullClient, PullEnvelope};
pub use protocol::{PanelCommand, PullRequest, PullResponse, PushEvent};
