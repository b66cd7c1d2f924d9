use crate::{
    fast_score, projected_hp, simulate, LethalDetector, OutcomeScorer, PlanTrace, PlannerConfig,
    RoundStats, SimState, SurvivalScorer, TargetingPolicy, ThreatTargeting,
};
use spirebot_core::{Action, CombatSnapshot, EffectBook, PlannedSequence, Stage, TargetKind};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Canonical, order-independent summary of a search state. Two action
/// orders that land on the same position collapse to the same key; only
/// the best-scoring path per key survives a round.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranspositionKey(String);

impl TranspositionKey {
    pub fn of(state: &SimState) -> Self {
        let player = &state.snapshot.player;
        let mut key = format!(
            "p{}:{}:{}:{}:{}{}{}",
            player.hp,
            player.block,
            player.energy,
            player.strength,
            player.weak as u8,
            player.frail as u8,
            player.vulnerable as u8
        );

        let mut monsters: Vec<String> = state
            .snapshot
            .alive_monsters()
            .map(|(_, monster)| {
                format!(
                    "{}:{}:{}:{}:{}",
                    monster.hp, monster.block, monster.vulnerable, monster.weak, monster.thorns
                )
            })
            .collect();
        monsters.sort_unstable();
        key.push_str("|m");
        key.push_str(&monsters.join(","));

        // remaining playables as a multiset of identities, so two copies of
        // the same card are interchangeable
        let mut remaining: Vec<String> = state
            .snapshot
            .hand
            .iter()
            .filter(|card| !state.is_played(card.uuid))
            .map(|card| format!("{}:{}", card.id, card.effective_cost()))
            .chain(
                state
                    .snapshot
                    .potions
                    .iter()
                    .filter(|potion| !state.is_played(potion.uuid))
                    .map(|potion| format!("pot:{}", potion.id)),
            )
            .collect();
        remaining.sort_unstable();
        key.push_str("|r");
        key.push_str(&remaining.join(","));
        Self(key)
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    actions: Vec<Action>,
    state: SimState,
    score: f64,
}

/// Beam search over card/potion sequences for one turn. Built once per
/// play-style; holds no per-turn state, so a single instance serves the
/// whole run.
pub struct Planner {
    config: PlannerConfig,
    book: EffectBook,
    scorer: Box<dyn OutcomeScorer + Send + Sync>,
    targeting: Box<dyn TargetingPolicy + Send + Sync>,
}

impl Planner {
    pub fn new(config: PlannerConfig, book: EffectBook) -> Self {
        Self::with_strategies(
            config,
            book,
            Box::new(SurvivalScorer),
            Box::new(ThreatTargeting),
        )
    }

    pub fn with_strategies(
        config: PlannerConfig,
        book: EffectBook,
        scorer: Box<dyn OutcomeScorer + Send + Sync>,
        targeting: Box<dyn TargetingPolicy + Send + Sync>,
    ) -> Self {
        Self {
            config,
            book,
            scorer,
            targeting,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The sole public entry point: an ordered action sequence for this
    /// turn. Empty means "end turn" and is a legitimate answer.
    pub fn plan_turn(&self, snapshot: &CombatSnapshot) -> PlannedSequence {
        self.plan_turn_traced(snapshot).0
    }

    pub fn plan_turn_traced(&self, snapshot: &CombatSnapshot) -> (PlannedSequence, PlanTrace) {
        let started = Instant::now();
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let mut trace = PlanTrace::default();

        let root = SimState::seed(snapshot);
        let legal = self.legal_actions(&root, &mut trace);
        trace.legal_actions = legal.len();
        if legal.is_empty() {
            let mut sequence = PlannedSequence::end_turn();
            sequence.projected_hp = projected_hp(&root);
            trace.wall_time_ms = started.elapsed().as_millis() as u64;
            return (sequence, trace);
        }

        // killing everything this turn dominates every other outcome
        let detector = LethalDetector::new(self.config.lethal_margin);
        if let Some(actions) = detector.find_lethal_sequence(snapshot, &self.book) {
            if !actions.is_empty() {
                trace.lethal = true;
                let sequence = self.replay_sequence(actions, &root, true);
                trace.wall_time_ms = started.elapsed().as_millis() as u64;
                return (sequence, trace);
            }
        }

        let zero_cost = snapshot
            .hand
            .iter()
            .filter(|card| card.effective_cost() == 0)
            .count();
        let depth_cap = self
            .config
            .depth_cap(legal.len(), zero_cost, snapshot.player.energy);
        let beam_width = self.config.beam_width(snapshot.stage);

        let mut beam = vec![Candidate {
            actions: Vec::new(),
            state: root.clone(),
            score: 0.0,
        }];
        let mut best: Option<Candidate> = None;

        for depth in 0..depth_cap {
            if depth > 0 && started.elapsed() >= timeout {
                trace.timed_out = true;
                break;
            }
            let cap = self.config.candidate_cap(depth);

            let mut expanded: Vec<Candidate> = Vec::new();
            for entry in &beam {
                let mut candidates: Vec<(f64, Action)> = self
                    .legal_actions(&entry.state, &mut trace)
                    .into_iter()
                    .map(|action| {
                        let rank = fast_score(&action, &entry.state, &self.book, &self.config.fast);
                        (rank, action)
                    })
                    .collect();
                candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
                candidates.truncate(cap);

                for (_, action) in candidates {
                    let Ok(next) = simulate(&entry.state, &action, &self.book) else {
                        continue;
                    };
                    let score = self.scorer.score(&root, &next, &self.config.weights);
                    let mut actions = entry.actions.clone();
                    actions.push(action);
                    expanded.push(Candidate {
                        actions,
                        state: next,
                        score,
                    });
                }
            }
            if expanded.is_empty() {
                break;
            }
            let expanded_count = expanded.len();

            // collapse transpositions, first-discovered order preserved
            let mut slots: HashMap<TranspositionKey, usize> = HashMap::new();
            let mut survivors: Vec<Candidate> = Vec::new();
            for candidate in expanded {
                let key = TranspositionKey::of(&candidate.state);
                match slots.get(&key) {
                    Some(&slot) => {
                        if candidate.score > survivors[slot].score {
                            survivors[slot] = candidate;
                        }
                    }
                    None => {
                        slots.insert(key, survivors.len());
                        survivors.push(candidate);
                    }
                }
            }
            let deduped_count = survivors.len();

            survivors.sort_by(|a, b| b.score.total_cmp(&a.score));
            survivors.truncate(beam_width);

            if let Some(top) = survivors.first() {
                let improved = best
                    .as_ref()
                    .map(|held| top.score > held.score)
                    .unwrap_or(true);
                if improved {
                    best = Some(top.clone());
                }
            }
            trace.rounds.push(RoundStats {
                depth,
                expanded: expanded_count,
                deduped: deduped_count,
                beam: survivors.len(),
                best_score: survivors.first().map(|c| c.score).unwrap_or(f64::NEG_INFINITY),
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
            beam = survivors;
        }

        let sequence = match best {
            Some(candidate) if candidate.score > 0.0 && !candidate.actions.is_empty() => {
                PlannedSequence {
                    actions: candidate.actions,
                    score: candidate.score,
                    energy_spent: candidate.state.counters.energy_spent,
                    projected_hp: projected_hp(&candidate.state),
                    lethal: false,
                }
            }
            _ => {
                // nothing beat a zero score; fall back to the single best
                // action by fast score rather than doing nothing useful
                trace.fallback_used = true;
                let mut ranked: Vec<(f64, Action)> = legal
                    .into_iter()
                    .map(|action| {
                        let rank = fast_score(&action, &root, &self.book, &self.config.fast);
                        (rank, action)
                    })
                    .collect();
                ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
                match ranked.into_iter().next() {
                    Some((_, action)) => self.replay_sequence(vec![action], &root, false),
                    None => PlannedSequence::end_turn(),
                }
            }
        };
        trace.wall_time_ms = started.elapsed().as_millis() as u64;
        (sequence, trace)
    }

    /// Self-assessed certainty in [0,1]; callers may fall back to a simpler
    /// policy when it runs low.
    pub fn get_confidence(&self, snapshot: &CombatSnapshot) -> f64 {
        let mut confidence: f64 = 0.7;
        if snapshot.player.energy >= 3 {
            confidence += 0.1;
        } else if snapshot.player.energy <= 1 {
            confidence -= 0.2;
        }
        let hp = snapshot.player.hp_fraction();
        if hp > 0.7 {
            confidence += 0.1;
        } else if hp < 0.3 {
            confidence -= 0.2;
        }
        if snapshot.stage == Stage::Act1 {
            confidence += 0.1;
        }
        let detector = LethalDetector::new(self.config.lethal_margin);
        if detector.can_kill_all(snapshot, &self.book) {
            confidence += 0.2;
        }
        confidence.clamp(0.0, 1.0)
    }

    /// Unplayed, affordable actions with concrete targets resolved. Cards
    /// that need a target nobody can provide are not legal.
    fn legal_actions(&self, state: &SimState, trace: &mut PlanTrace) -> Vec<Action> {
        let snapshot = &state.snapshot;
        if snapshot.alive_count() == 0 {
            return Vec::new();
        }
        let energy = snapshot.player.energy;
        let mut out = Vec::new();
        for card in &snapshot.hand {
            if state.is_played(card.uuid) || card.effective_cost() > energy {
                continue;
            }
            let action = Action::PlayCard {
                card: card.clone(),
                target: None,
            };
            if self.book.resolve_card(card).estimated {
                trace.note_missing(action.stable_key(), card.id.clone());
            }
            let target = self.targeting.choose_target(&action, state, &self.book);
            if card.target == TargetKind::Single && target.is_none() {
                continue;
            }
            out.push(action.with_target(target));
        }
        for potion in &snapshot.potions {
            if state.is_played(potion.uuid) {
                continue;
            }
            let action = Action::UsePotion {
                potion: potion.clone(),
                target: None,
            };
            if self.book.resolve_potion(&potion.id).estimated {
                trace.note_missing(action.stable_key(), potion.id.clone());
            }
            let target = self.targeting.choose_target(&action, state, &self.book);
            if potion.target == TargetKind::Single && target.is_none() {
                continue;
            }
            out.push(action.with_target(target));
        }
        out
    }

    /// Re-run a pre-built sequence through the simulator to price it,
    /// dropping any step invalidated by an earlier kill.
    fn replay_sequence(
        &self,
        actions: Vec<Action>,
        root: &SimState,
        lethal: bool,
    ) -> PlannedSequence {
        let mut state = root.clone();
        let mut kept = Vec::new();
        for action in actions {
            if action.energy_cost() > state.snapshot.player.energy {
                continue;
            }
            if let Some(idx) = action.target() {
                let alive = state
                    .snapshot
                    .monsters
                    .get(idx)
                    .is_some_and(|monster| monster.alive());
                if !alive {
                    continue;
                }
            }
            let Ok(next) = simulate(&state, &action, &self.book) else {
                continue;
            };
            state = next;
            kept.push(action);
        }
        let score = self.scorer.score(root, &state, &self.config.weights);
        PlannedSequence {
            actions: kept,
            score,
            energy_spent: state.counters.energy_spent,
            projected_hp: projected_hp(&state),
            lethal,
        }
    }
}
