use crate::attack_damage;
use spirebot_core::{Action, CombatSnapshot, EffectBook};
use std::collections::HashSet;

/// One candidate attack the detector can spend: the action, its base
/// damage, whether it splashes every enemy, and its energy cost.
#[derive(Debug, Clone)]
struct AttackOption {
    action: Action,
    damage: i32,
    aoe: bool,
    cost: i32,
}

/// Decides whether the current hand can end the combat outright, and if so
/// assembles the kill sequence greedily.
#[derive(Debug, Clone, Copy)]
pub struct LethalDetector {
    /// Required headroom over raw effective hp. A tuned heuristic, not a
    /// derived bound.
    pub margin: f64,
}

impl Default for LethalDetector {
    fn default() -> Self {
        Self { margin: 1.2 }
    }
}

impl LethalDetector {
    pub fn new(margin: f64) -> Self {
        Self {
            margin: margin.max(1.0),
        }
    }

    /// Conservative check: theoretical maximum attack damage against total
    /// effective hp with the safety margin. One-sided by design; never true
    /// below the margin.
    pub fn can_kill_all(&self, snapshot: &CombatSnapshot, book: &EffectBook) -> bool {
        let total_hp = snapshot.total_effective_hp();
        if total_hp <= 0 {
            return true;
        }
        let max_damage = self.max_damage(snapshot, book);
        max_damage as f64 >= total_hp as f64 * self.margin
    }

    /// Greedy assembly: weakest monster first, strongest unused attack
    /// first, cumulative energy respected. None when any monster cannot be
    /// provably finished.
    pub fn find_lethal_sequence(
        &self,
        snapshot: &CombatSnapshot,
        book: &EffectBook,
    ) -> Option<Vec<Action>> {
        if !self.can_kill_all(snapshot, book) {
            return None;
        }
        let mut targets: Vec<(usize, i32, bool)> = snapshot
            .alive_monsters()
            .map(|(idx, monster)| (idx, monster.effective_hp(), monster.vulnerable > 0))
            .collect();
        if targets.is_empty() {
            return Some(Vec::new());
        }
        targets.sort_by_key(|(idx, hp, _)| (*hp, *idx));

        let mut attacks = self.attack_options(snapshot, book);
        attacks.sort_by(|a, b| {
            b.damage
                .cmp(&a.damage)
                .then_with(|| a.action.stable_key().cmp(&b.action.stable_key()))
        });

        let strength = snapshot.player.strength;
        let weak = snapshot.player.weak;
        let mut energy = snapshot.player.energy;
        let mut used: HashSet<u64> = HashSet::new();
        let mut sequence = Vec::new();

        for (idx, effective_hp, vulnerable) in targets {
            let mut remaining = effective_hp;
            for attack in &attacks {
                if remaining <= 0 {
                    break;
                }
                if used.contains(&attack.action.uuid()) || attack.cost > energy {
                    continue;
                }
                let landed = attack_damage(attack.damage, strength, vulnerable, weak);
                if landed <= 0 {
                    continue;
                }
                let target = if attack.aoe { None } else { Some(idx) };
                sequence.push(attack.action.with_target(target));
                used.insert(attack.action.uuid());
                energy -= attack.cost;
                remaining -= landed;
            }
            if remaining > 0 {
                // margin passed but the assignment cannot prove the kill
                return None;
            }
        }
        Some(sequence)
    }

    fn max_damage(&self, snapshot: &CombatSnapshot, book: &EffectBook) -> i32 {
        let living = snapshot.alive_count() as i32;
        let strength = snapshot.player.strength;
        let weak = snapshot.player.weak;
        self.attack_options(snapshot, book)
            .iter()
            .map(|attack| {
                let per_hit = attack_damage(attack.damage, strength, false, weak);
                if attack.aoe {
                    per_hit * living
                } else {
                    per_hit
                }
            })
            .sum()
    }

    fn attack_options(&self, snapshot: &CombatSnapshot, book: &EffectBook) -> Vec<AttackOption> {
        let mut options = Vec::new();
        for card in &snapshot.hand {
            let profile = book.resolve_card(card).profile;
            if profile.damage <= 0 {
                continue;
            }
            options.push(AttackOption {
                action: Action::PlayCard {
                    card: card.clone(),
                    target: None,
                },
                damage: profile.damage,
                aoe: profile.aoe,
                cost: card.effective_cost(),
            });
        }
        for potion in &snapshot.potions {
            let profile = book.resolve_potion(&potion.id).profile;
            if profile.damage <= 0 {
                continue;
            }
            options.push(AttackOption {
                action: Action::UsePotion {
                    potion: potion.clone(),
                    target: None,
                },
                damage: profile.damage,
                aoe: profile.aoe,
                cost: 0,
            });
        }
        options
    }
}
