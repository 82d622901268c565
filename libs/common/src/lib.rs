pub mod feed;
pub mod protocol;

pub use feed::GroupFeed;
pub use protocol::{ChannelEvent, ChatMessage};
