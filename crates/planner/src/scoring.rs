use crate::{FastScoreWeights, ScoreWeights, SimState};
use spirebot_core::{Action, EffectBook, Stage};

/// O(1) candidate ranking used before the expensive simulate-and-score
/// step. Never the final word on a sequence.
pub fn fast_score(
    action: &Action,
    state: &SimState,
    book: &EffectBook,
    weights: &FastScoreWeights,
) -> f64 {
    let profile = match action {
        Action::PlayCard { card, .. } => book.resolve_card(card).profile,
        Action::UsePotion { potion, .. } => book.resolve_potion(&potion.id).profile,
    };
    let living = state.snapshot.alive_count();

    let mut score = 0.0;
    if action.energy_cost() == 0 {
        score += weights.zero_cost;
    }
    if profile.damage > 0 && living > 0 {
        score += weights.attack;
    }
    if profile.block > 0 && state.snapshot.player.hp_fraction() < weights.low_hp_fraction {
        score += weights.low_hp_block;
    }
    let mut estimated = (profile.damage + state.snapshot.player.strength).max(0);
    if profile.aoe {
        estimated *= living as i32;
    }
    score += weights.damage * estimated as f64;
    score
}

/// Projected hp after the surviving monsters' declared hits land on
/// whatever block the sequence left standing.
pub fn projected_hp(state: &SimState) -> i32 {
    let incoming = state.snapshot.incoming_damage();
    let unblocked = (incoming - state.snapshot.player.block.max(0)).max(0);
    state.snapshot.player.hp - unblocked
}

/// Full evaluation of a simulated future. Strategy object so play-styles
/// can swap the evaluation without touching the search.
pub trait OutcomeScorer {
    /// Returns `f64::NEG_INFINITY` exactly when the projected next-turn hp
    /// is zero or below; finite otherwise.
    fn score(&self, initial: &SimState, outcome: &SimState, weights: &ScoreWeights) -> f64;
}

/// Default scorer: survival first, then kills, damage, useful block,
/// energy efficiency and engine synergy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurvivalScorer;

impl OutcomeScorer for SurvivalScorer {
    fn score(&self, initial: &SimState, outcome: &SimState, weights: &ScoreWeights) -> f64 {
        let stage: Stage = outcome.snapshot.stage;

        let projected = projected_hp(outcome);
        if projected <= 0 {
            // the dominant invariant: never walk into lethal damage
            return f64::NEG_INFINITY;
        }

        let kills = (outcome.counters.kills - initial.counters.kills).max(0);
        let damage = (outcome.counters.damage_dealt - initial.counters.damage_dealt).max(0);
        let energy = (outcome.counters.energy_spent - initial.counters.energy_spent).max(0);
        let hp_lost = (initial.snapshot.player.hp - outcome.snapshot.player.hp).max(0);

        let mut score = 0.0;
        score += kills as f64 * weights.kill_bonus;
        score += damage as f64 * weights.damage;

        let block_gained =
            (outcome.snapshot.player.block - initial.snapshot.player.block).max(0);
        let incoming = outcome.snapshot.incoming_damage();
        if incoming > initial.snapshot.player.block {
            score += block_gained.min(incoming) as f64 * weights.block_needed;
        } else {
            // already covered; further block is mostly waste
            score += block_gained as f64 * weights.block_wasted;
        }

        score += energy as f64 * weights.energy;
        score -= hp_lost as f64 * weights.hp_loss;

        if projected < stage.danger_threshold() {
            score -= weights.danger_penalty;
        }

        let synergy = outcome.counters.exhaust_events as f64 * weights.exhaust_synergy
            + outcome.counters.draw_events as f64 * weights.draw_synergy
            + outcome.counters.energy_gained as f64 * weights.energy_synergy;
        score + synergy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spirebot_core::{
        CardInstance, CardKind, CombatSnapshot, Intent, MonsterState, PlayerState,
    };

    fn base_state(hp: i32, monsters: Vec<MonsterState>) -> SimState {
        let snapshot = CombatSnapshot::new(PlayerState::new(hp, 80, 3), monsters, Stage::Act1);
        SimState::seed(&snapshot)
    }

    #[test]
    fn projected_death_scores_exactly_negative_infinity() {
        let initial = base_state(
            8,
            vec![MonsterState::new(
                "Jaw Worm",
                30,
                Intent::Attack { damage: 12, hits: 1 },
            )],
        );
        let outcome = initial.clone();
        let score = SurvivalScorer.score(&initial, &outcome, &ScoreWeights::default());
        assert_eq!(score, f64::NEG_INFINITY);
    }

    #[test]
    fn surviving_outcome_is_finite() {
        let initial = base_state(
            40,
            vec![MonsterState::new(
                "Jaw Worm",
                30,
                Intent::Attack { damage: 12, hits: 1 },
            )],
        );
        let score = SurvivalScorer.score(&initial, &initial.clone(), &ScoreWeights::default());
        assert!(score.is_finite());
    }

    #[test]
    fn danger_zone_costs_a_flat_penalty() {
        let weights = ScoreWeights::default();
        let comfortable = base_state(
            60,
            vec![MonsterState::new(
                "Jaw Worm",
                30,
                Intent::Attack { damage: 10, hits: 1 },
            )],
        );
        let shaky = base_state(
            22,
            vec![MonsterState::new(
                "Jaw Worm",
                30,
                Intent::Attack { damage: 10, hits: 1 },
            )],
        );
        let safe = SurvivalScorer.score(&comfortable, &comfortable.clone(), &weights);
        let risky = SurvivalScorer.score(&shaky, &shaky.clone(), &weights);
        // projected 12 < Act1 threshold 20 while 50 is comfortably above
        assert_eq!(safe - risky, weights.danger_penalty);
    }

    #[test]
    fn kills_dominate_chip_damage() {
        let initial = base_state(60, vec![MonsterState::new("Louse", 10, Intent::Defend)]);
        let mut killed = initial.clone();
        killed.counters.kills = 1;
        killed.counters.damage_dealt = 10;
        killed.snapshot.monsters[0].hp = 0;
        killed.snapshot.monsters[0].is_gone = true;
        let mut chipped = initial.clone();
        chipped.counters.damage_dealt = 9;
        chipped.snapshot.monsters[0].hp = 1;
        let weights = ScoreWeights::default();
        assert!(
            SurvivalScorer.score(&initial, &killed, &weights)
                > SurvivalScorer.score(&initial, &chipped, &weights)
        );
    }

    #[test]
    fn wasted_block_earns_less_than_needed_block() {
        let threatened = base_state(
            60,
            vec![MonsterState::new(
                "Jaw Worm",
                30,
                Intent::Attack { damage: 10, hits: 1 },
            )],
        );
        let mut blocked = threatened.clone();
        blocked.snapshot.player.block = 8;

        let mut already_safe = threatened.clone();
        already_safe.snapshot.player.block = 30;
        let mut overstacked = already_safe.clone();
        overstacked.snapshot.player.block = 38;

        let weights = ScoreWeights::default();
        let useful = SurvivalScorer.score(&threatened, &blocked, &weights);
        let base = SurvivalScorer.score(&threatened, &threatened.clone(), &weights);
        let waste =
            SurvivalScorer.score(&already_safe, &overstacked, &weights);
        let waste_base = SurvivalScorer.score(&already_safe, &already_safe.clone(), &weights);
        assert!(useful - base > waste - waste_base);
    }

    #[test]
    fn fast_score_rewards_free_cards_and_reach() {
        let state = base_state(
            60,
            vec![
                MonsterState::new("Louse", 10, Intent::Unknown),
                MonsterState::new("Louse", 10, Intent::Unknown),
            ],
        );
        let book = EffectBook::builtin();
        let weights = FastScoreWeights::default();

        let mut free_strike = CardInstance::new(1, "Strike", CardKind::Attack, 1);
        free_strike.cost_for_turn = Some(0);
        let paid_strike = CardInstance::new(2, "Strike", CardKind::Attack, 1);
        let free = fast_score(
            &Action::PlayCard { card: free_strike, target: Some(0) },
            &state,
            &book,
            &weights,
        );
        let paid = fast_score(
            &Action::PlayCard { card: paid_strike, target: Some(0) },
            &state,
            &book,
            &weights,
        );
        assert_eq!(free - paid, weights.zero_cost);

        // aoe reach scales with the living-target count
        let cleave = CardInstance::new(3, "Cleave", CardKind::Attack, 1);
        let aoe = fast_score(
            &Action::PlayCard { card: cleave, target: None },
            &state,
            &book,
            &weights,
        );
        assert!(aoe > paid);
    }

    #[test]
    fn fast_score_boosts_block_only_at_critical_hp() {
        let book = EffectBook::builtin();
        let weights = FastScoreWeights::default();
        let defend = CardInstance::new(1, "Defend", CardKind::Skill, 1);
        let action = Action::PlayCard { card: defend, target: None };

        let healthy = base_state(60, vec![MonsterState::new("Louse", 10, Intent::Unknown)]);
        let hurting = base_state(20, vec![MonsterState::new("Louse", 10, Intent::Unknown)]);
        let calm = fast_score(&action, &healthy, &book, &weights);
        let urgent = fast_score(&action, &hurting, &book, &weights);
        assert_eq!(urgent - calm, weights.low_hp_block);
    }
}
