pub use self::{
    difficulty::{Difficulty, ModsDependent},
    hitresult_generator::{HitResultGenerator, HitResultPriority},
    score_state::ScoreState,
};

/// Hitresult generators that implement [`HitResultGenerator`].
pub mod hitresult_generator;

pub(crate) mod difficulty;
mod score_state;
