use alloc::vec::Vec;
use rand::rngs::SmallRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// Scores every action of the flat action space. Implemented by trained networks outside this
/// crate; the output must have one value per action.
pub trait Policy {
    fn action_values(&mut self, tensor: &FeatureTensor) -> Vec<f32>;
}

impl<P: Policy + ?Sized> Policy for &mut P {
    fn action_values(&mut self, tensor: &FeatureTensor) -> Vec<f32> {
        (**self).action_values(tensor)
    }
}

/// Stand-in when no trained network is available: uniform scores on reveals, never flags.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn action_values(&mut self, tensor: &FeatureTensor) -> Vec<f32> {
        (0..action_space_size(tensor.size()))
            .map(|index| {
                if index % 2 == ActionKind::Reveal as usize {
                    self.rng.random::<f32>()
                } else {
                    f32::NEG_INFINITY
                }
            })
            .collect()
    }
}

/// Which tier produced a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Solver,
    Policy,
    Random,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub source: Source,
}

/// Picks moves for autonomous play: certain moves first, then the policy, with a random reveal
/// whenever the same action would be chosen twice in a row.
#[derive(Clone, Debug)]
pub struct Agent<P> {
    policy: P,
    rng: SmallRng,
    last_action: Option<Action>,
}

impl<P: Policy> Agent<P> {
    pub fn new(policy: P, seed: u64) -> Self {
        Self {
            policy,
            rng: SmallRng::seed_from_u64(seed),
            last_action: None,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Forgets the previous move. Call between games.
    pub fn reset(&mut self) {
        self.last_action = None;
    }

    pub fn choose(
        &mut self,
        tensor: &FeatureTensor,
        observation: &Observation,
    ) -> Result<Option<Decision>> {
        let decision = match find_certain_move(observation) {
            Some(hint) => Decision {
                action: hint.action(),
                source: Source::Solver,
            },
            None => {
                let mask = ActionMask::from_tensor(tensor);
                let values = self.policy.action_values(tensor);
                match mask.argmax(&values)? {
                    Some(action) => Decision {
                        action,
                        source: Source::Policy,
                    },
                    None => return Ok(None),
                }
            }
        };

        let decision = if self.last_action == Some(decision.action) {
            log::debug!("Repeated {:?}, falling back to a random reveal", decision.action);
            self.random_reveal(tensor).unwrap_or(decision)
        } else {
            decision
        };

        self.last_action = Some(decision.action);
        Ok(Some(decision))
    }

    fn random_reveal(&mut self, tensor: &FeatureTensor) -> Option<Decision> {
        iter_coords(tensor.size())
            .filter(|&coords| tensor.is_set(coords, HIDDEN_PLANE))
            .choose(&mut self.rng)
            .map(|coords| Decision {
                action: Action::reveal(coords),
                source: Source::Random,
            })
    }
}
