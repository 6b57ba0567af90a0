//! Presentation notices
//!
//! - Notice types raised by the capture workflow
//! - Broadcast bus delivering them to any number of subscribers

mod bus;
mod notice;

pub use bus::{NoticeBus, NoticeSubscriber, DEFAULT_CAPACITY, MIN_CAPACITY};
pub use notice::Notice;
