use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const ACTION_COUNT: usize = 11;

/// The fixed action enumeration every intent vector is indexed by. Order is
/// part of the contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Shoot,
    ThroughBall,
    Pass,
    Cross,
    Tackle,
    Intercept,
    Slide,
    Run,
    Sprint,
    Cleared,
    Boot,
}

pub const ACTIONS: [Action; ACTION_COUNT] = [
    Action::Shoot,
    Action::ThroughBall,
    Action::Pass,
    Action::Cross,
    Action::Tackle,
    Action::Intercept,
    Action::Slide,
    Action::Run,
    Action::Sprint,
    Action::Cleared,
    Action::Boot,
];

/// Draws one action with probability proportional to its slot weight.
/// Zero-weight slots are never drawn; a vector with a single nonzero slot is
/// deterministic regardless of the rng state.
pub fn select_action(weights: &[u32; ACTION_COUNT], rng: &mut impl Rng) -> Action {
    ACTIONS
        .choose_weighted(rng, |action| weights[*action as usize])
        .copied()
        .unwrap_or(Action::Run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_single_slot_is_deterministic() {
        let mut weights = [0u32; ACTION_COUNT];
        weights[Action::Pass as usize] = 7;

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert_eq!(select_action(&weights, &mut rng), Action::Pass);
        }
    }

    #[test]
    fn test_zero_slots_are_never_drawn() {
        let mut weights = [0u32; ACTION_COUNT];
        weights[Action::Run as usize] = 10;
        weights[Action::Sprint as usize] = 10;

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let action = select_action(&weights, &mut rng);
            assert!(matches!(action, Action::Run | Action::Sprint));
        }
    }

    #[test]
    fn test_all_zero_vector_falls_back() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(select_action(&[0; ACTION_COUNT], &mut rng), Action::Run);
    }
}
