//! Group statistics, summaries and leaderboards over filtered views.
//!
//! Every routine takes a borrowed view (`&[&CommuneRecord]`) and returns a
//! freshly built result; the view itself is never modified.

pub mod aggregate;
pub mod leaderboard;
pub mod types;
pub mod utility;
