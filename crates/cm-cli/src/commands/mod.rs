pub mod activity;
pub mod analytics;
pub mod credits;
pub mod dispatch;
pub mod factors;
pub mod gaps;
pub mod org;
pub mod shared;
