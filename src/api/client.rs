use crate::api::events::{RingEventStream, RingStateListener};
use crate::api::handle::RingHandle;

/// RingNode bundles everything the application gets for one running node.
pub struct RingNode {
    pub handle: RingHandle,
    pub events: RingEventStream,
    pub state: RingStateListener,
}
