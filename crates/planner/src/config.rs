use serde::{Deserialize, Serialize};
use spirebot_core::Stage;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub kill_bonus: f64,
    pub damage: f64,
    /// Block that actually covers declared incoming damage.
    pub block_needed: f64,
    /// Block stacked past what the incoming hit requires.
    pub block_wasted: f64,
    pub energy: f64,
    pub hp_loss: f64,
    pub danger_penalty: f64,
    pub exhaust_synergy: f64,
    pub draw_synergy: f64,
    pub energy_synergy: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            kill_bonus: 100.0,
            damage: 2.0,
            block_needed: 5.0,
            block_wasted: 0.5,
            energy: 2.0,
            hp_loss: 8.0,
            danger_penalty: 50.0,
            exhaust_synergy: 3.0,
            draw_synergy: 2.0,
            energy_synergy: 2.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FastScoreWeights {
    pub zero_cost: f64,
    pub attack: f64,
    pub low_hp_block: f64,
    pub damage: f64,
    /// Hp fraction under which block starts earning the emergency bonus.
    pub low_hp_fraction: f64,
}

impl Default for FastScoreWeights {
    fn default() -> Self {
        Self {
            zero_cost: 20.0,
            attack: 10.0,
            low_hp_block: 15.0,
            damage: 2.0,
            low_hp_fraction: 0.35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub beam_width_act1: usize,
    pub beam_width_act2: usize,
    pub beam_width_act3: usize,
    pub max_depth_cap: usize,
    /// Per-depth cap on fast-filtered candidates; wide early, narrow late.
    pub candidate_caps: Vec<usize>,
    pub timeout_ms: u64,
    pub lethal_margin: f64,
    pub weights: ScoreWeights,
    pub fast: FastScoreWeights,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            beam_width_act1: 12,
            beam_width_act2: 18,
            beam_width_act3: 25,
            max_depth_cap: 5,
            candidate_caps: vec![12, 10, 7, 5, 4],
            timeout_ms: 80,
            lethal_margin: 1.2,
            weights: ScoreWeights::default(),
            fast: FastScoreWeights::default(),
        }
    }
}

impl PlannerConfig {
    pub fn beam_width(&self, stage: Stage) -> usize {
        match stage {
            Stage::Act1 => self.beam_width_act1,
            Stage::Act2 => self.beam_width_act2,
            Stage::Act3 => self.beam_width_act3,
        }
        .max(1)
    }

    pub fn candidate_cap(&self, depth: usize) -> usize {
        self.candidate_caps
            .get(depth)
            .or(self.candidate_caps.last())
            .copied()
            .unwrap_or(4)
            .max(1)
    }

    /// Lookahead depth for this hand: deeper with spare energy and free
    /// cards, never past the playable count or the hard cap.
    pub fn depth_cap(&self, playable: usize, zero_cost: usize, energy: i32) -> usize {
        let extra_energy = energy as i64 - 3;
        let depth = 3 + extra_energy + (zero_cost as i64) / 2;
        let depth = depth.clamp(1, playable.max(1) as i64);
        (depth as usize).min(self.max_depth_cap.max(1))
    }
}
