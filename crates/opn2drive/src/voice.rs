//! Voice channel bookkeeping.
//!
//! - **Channel**: one hardware voice and the note it is sounding
//! - **ChannelAllocator**: the fixed pool of six channels and the
//!   allocate/release policy (lowest free index first, no stealing)
pub mod allocator;
pub mod channel;

pub use allocator::{ChannelAllocator, NUM_CHANNELS};
pub use channel::{ActiveNote, Channel, ChannelIndex, KeyState};
