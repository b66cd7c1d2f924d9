use crate::PlannerError;
use spirebot_core::{Action, CombatSnapshot, EffectBook, TargetKind};
use std::collections::BTreeSet;

/// Fraction of unblocked damage a thorny monster returns to the player.
/// A heuristic stand-in for the exact per-stack rule; capped by the stack
/// count so it stays conservative.
const THORNS_RETURN_FRACTION: f64 = 0.3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimCounters {
    pub energy_spent: i32,
    pub damage_dealt: i32,
    pub kills: i32,
    pub draw_events: i32,
    pub exhaust_events: i32,
    pub energy_gained: i32,
}

/// One node of the search: a snapshot plus what got us here. Cloned per
/// candidate; nothing is shared between beam entries.
#[derive(Debug, Clone)]
pub struct SimState {
    pub snapshot: CombatSnapshot,
    pub played: BTreeSet<u64>,
    pub counters: SimCounters,
}

impl SimState {
    pub fn seed(snapshot: &CombatSnapshot) -> Self {
        Self {
            snapshot: snapshot.clone(),
            played: BTreeSet::new(),
            counters: SimCounters::default(),
        }
    }

    pub fn is_played(&self, uuid: u64) -> bool {
        self.played.contains(&uuid)
    }
}

/// Damage one attack instance lands: base plus strength, then the binary
/// vulnerable (x1.5) and weak (x0.75) multipliers, in that order.
pub fn attack_damage(base: i32, strength: i32, target_vulnerable: bool, player_weak: bool) -> i32 {
    let mut damage = (base + strength).max(0) as f64;
    if target_vulnerable {
        damage *= 1.5;
    }
    if player_weak {
        damage *= 0.75;
    }
    damage as i32
}

/// Pure forward step: apply one action to a state, producing a new state.
/// Never mutates the input; safe to call many times per turn.
pub fn simulate(state: &SimState, action: &Action, book: &EffectBook) -> Result<SimState, PlannerError> {
    let cost = action.energy_cost();
    if cost > state.snapshot.player.energy {
        debug_assert!(false, "simulated an unaffordable action: {}", action.stable_key());
        return Err(PlannerError::Precondition(format!(
            "cost {cost} exceeds energy {} for {}",
            state.snapshot.player.energy,
            action.stable_key()
        )));
    }

    let resolved = match action {
        Action::PlayCard { card, .. } => book.resolve_card(card),
        Action::UsePotion { potion, .. } => book.resolve_potion(&potion.id),
    };
    let profile = resolved.profile;

    let mut next = state.clone();
    next.snapshot.player.energy -= cost;
    next.counters.energy_spent += cost;
    next.played.insert(action.uuid());

    if profile.damage > 0 {
        if profile.aoe || action.target_kind() == TargetKind::AllEnemies {
            let living: Vec<usize> = next
                .snapshot
                .alive_monsters()
                .map(|(idx, _)| idx)
                .collect();
            for idx in living {
                deal_damage(&mut next, idx, profile.damage);
                apply_debuffs(&mut next, idx, profile.apply_vulnerable, profile.apply_weak);
            }
        } else {
            let idx = action.target().ok_or_else(|| {
                PlannerError::Precondition(format!("untargeted attack {}", action.stable_key()))
            })?;
            let alive = next
                .snapshot
                .monsters
                .get(idx)
                .is_some_and(|monster| monster.alive());
            if !alive {
                debug_assert!(false, "simulated attack on dead target {idx}");
                return Err(PlannerError::Precondition(format!(
                    "dead or missing target {idx} for {}",
                    action.stable_key()
                )));
            }
            deal_damage(&mut next, idx, profile.damage);
            apply_debuffs(&mut next, idx, profile.apply_vulnerable, profile.apply_weak);
            if next.snapshot.primary_target.is_none() {
                next.snapshot.primary_target = Some(idx);
            }
        }
    } else if let Some(idx) = action.target() {
        // pure debuff with an explicit target
        apply_debuffs(&mut next, idx, profile.apply_vulnerable, profile.apply_weak);
    }

    if profile.block > 0 {
        let gained = if next.snapshot.player.frail {
            (profile.block as f64 * 0.75) as i32
        } else {
            profile.block
        };
        next.snapshot.player.block += gained;
    }

    // persistent modifiers from power effects
    next.snapshot.player.strength += profile.strength;

    if profile.energy > 0 {
        next.snapshot.player.energy += profile.energy;
        next.counters.energy_gained += profile.energy;
    }
    if profile.draw > 0 {
        // draws are not materialized during lookahead, only credited
        next.counters.draw_events += profile.draw;
    }
    if profile.exhaust {
        next.counters.exhaust_events += 1;
    }

    Ok(next)
}

fn deal_damage(state: &mut SimState, idx: usize, base: i32) {
    let player_weak = state.snapshot.player.weak;
    let strength = state.snapshot.player.strength;
    let monster = &mut state.snapshot.monsters[idx];
    if !monster.alive() {
        return;
    }
    let damage = attack_damage(base, strength, monster.vulnerable > 0, player_weak);
    let blocked = damage.min(monster.block);
    monster.block -= blocked;
    let hp_damage = damage - blocked;
    let landed = hp_damage.min(monster.hp);
    monster.hp -= landed;
    state.counters.damage_dealt += landed;
    if monster.hp <= 0 {
        monster.hp = 0;
        monster.is_gone = true;
        state.counters.kills += 1;
    } else if monster.thorns > 0 && hp_damage > 0 {
        let returned = ((hp_damage as f64 * THORNS_RETURN_FRACTION) as i32).min(monster.thorns);
        state.snapshot.player.hp = (state.snapshot.player.hp - returned).max(0);
    }
}

fn apply_debuffs(state: &mut SimState, idx: usize, vulnerable: i32, weak: i32) {
    let Some(monster) = state.snapshot.monsters.get_mut(idx) else {
        return;
    };
    if !monster.alive() {
        return;
    }
    monster.vulnerable += vulnerable.max(0);
    monster.weak += weak.max(0);
}
