//! Live feeds pushed to the dashboard over WebSockets.
//!
//! A connection names its topic with the request path and carries its token
//! and filters in the query string. The [`Publisher`] checks the token, then
//! polls the topic's snapshot every tick and forwards it only when it changed.

pub mod error;
pub mod providers;
pub mod publisher;
pub mod topics;

pub use error::StreamError;
pub use providers::{PgSnapshotSource, SnapshotQuery, SnapshotSource};
pub use publisher::{
    ChangeDetector, Frame, Inbound, Publisher, PublisherSettings, SessionEnd, SubscribeRequest,
};
pub use topics::{Topic, route};
