pub mod double_elim;
pub mod seeding;
pub mod types;

pub use double_elim::{generate, generate_ordered, generate_unordered, Match};
pub use seeding::{seed_order, SeededShuffle, Shuffle};
pub use types::{BracketError, BracketOptions, MatchRef, MatchSlot, PlayerId, DEFAULT_STARTING_ROUND};
