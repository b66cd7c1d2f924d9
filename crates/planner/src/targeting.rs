use crate::{attack_damage, SimState};
use spirebot_core::{monster_traits, Action, EffectBook, MonsterState, Stage, TargetKind};

/// Resolves an action's targeting requirement against the current state.
/// Strategy object so play-styles can swap the threat model.
pub trait TargetingPolicy {
    fn choose_target(&self, action: &Action, state: &SimState, book: &EffectBook)
        -> Option<usize>;
}

/// How dangerous a monster is to leave standing: its declared (or
/// estimated) hit, plus weight for staying power and for scaling or boss
/// behavior.
pub fn threat(monster: &MonsterState, stage: Stage) -> i32 {
    let traits = monster_traits(&monster.id);
    let mut value = monster.declared_damage(stage);
    value += monster.hp.max(0) / 10;
    if monster.boss || traits.boss {
        value += 20;
    }
    if monster.scaling || traits.scaling {
        value += 15;
    }
    value
}

/// Default policy: keep focus fire on a pinned target, otherwise finish
/// the most dangerous monster this action can plausibly kill, otherwise
/// hit the most dangerous monster standing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreatTargeting;

impl TargetingPolicy for ThreatTargeting {
    fn choose_target(
        &self,
        action: &Action,
        state: &SimState,
        book: &EffectBook,
    ) -> Option<usize> {
        if action.target_kind() != TargetKind::Single {
            return None;
        }
        let profile = match action {
            Action::PlayCard { card, .. } => book.resolve_card(card).profile,
            Action::UsePotion { potion, .. } => book.resolve_potion(&potion.id).profile,
        };
        let snapshot = &state.snapshot;
        let stage = snapshot.stage;

        if profile.damage > 0 {
            if let Some(pinned) = snapshot.pinned_target() {
                return Some(pinned);
            }
            let strength = snapshot.player.strength;
            let weak = snapshot.player.weak;
            let finishable = snapshot
                .alive_monsters()
                .filter(|(_, monster)| {
                    attack_damage(profile.damage, strength, monster.vulnerable > 0, weak)
                        >= monster.effective_hp()
                })
                .max_by_key(|(idx, monster)| (threat(monster, stage), usize::MAX - idx));
            if let Some((idx, _)) = finishable {
                return Some(idx);
            }
        }

        snapshot
            .alive_monsters()
            .max_by_key(|(idx, monster)| (threat(monster, stage), usize::MAX - idx))
            .map(|(idx, _)| idx)
    }
}
