pub mod credits;
pub mod gaps;
pub mod org;

pub use credits::CreditCommands;
pub use gaps::GapCommands;
pub use org::OrgCommands;
