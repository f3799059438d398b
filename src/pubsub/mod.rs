pub mod message;
pub mod topic;
pub mod subscriber;
pub mod bus;

pub use message::Message;
pub use topic::Topic;
pub use subscriber::Subscriber;
pub use bus::TelemetryBus;
