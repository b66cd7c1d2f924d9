use crate::{CardInstance, CardKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Estimate used for an attack whose magnitude cannot be determined from the
/// instance or the book. Deliberately low.
pub const FALLBACK_DAMAGE: i32 = 6;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Best-effort parsed magnitudes for one card or potion id.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardProfile {
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub block: i32,
    #[serde(default)]
    pub strength: i32,
    #[serde(default)]
    pub apply_vulnerable: i32,
    #[serde(default)]
    pub apply_weak: i32,
    #[serde(default)]
    pub draw: i32,
    #[serde(default)]
    pub energy: i32,
    #[serde(default)]
    pub exhaust: bool,
    #[serde(default)]
    pub aoe: bool,
}

/// Profile after merging instance-attached magnitudes over book data.
/// `estimated` marks that a conservative fallback filled the gap.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedProfile {
    pub profile: CardProfile,
    pub estimated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectBook {
    pub profiles: HashMap<String, CardProfile>,
}

impl EffectBook {
    pub fn from_json(body: &str) -> Result<Self, RulesError> {
        let profiles: HashMap<String, CardProfile> = serde_json::from_str(body)?;
        Ok(Self { profiles })
    }

    /// The card set the bot has magnitudes for out of the box.
    pub fn builtin() -> Self {
        let mut profiles = HashMap::new();
        let mut put = |id: &str, profile: CardProfile| {
            profiles.insert(id.to_string(), profile);
        };
        put(
            "Strike",
            CardProfile {
                damage: 6,
                ..Default::default()
            },
        );
        put(
            "Defend",
            CardProfile {
                block: 5,
                ..Default::default()
            },
        );
        put(
            "Bash",
            CardProfile {
                damage: 8,
                apply_vulnerable: 2,
                ..Default::default()
            },
        );
        put(
            "Cleave",
            CardProfile {
                damage: 8,
                aoe: true,
                ..Default::default()
            },
        );
        put(
            "Whirlwind",
            CardProfile {
                damage: 5,
                aoe: true,
                ..Default::default()
            },
        );
        put(
            "Immolate",
            CardProfile {
                damage: 21,
                aoe: true,
                exhaust: true,
                ..Default::default()
            },
        );
        put(
            "Thunderclap",
            CardProfile {
                damage: 4,
                apply_vulnerable: 1,
                aoe: true,
                ..Default::default()
            },
        );
        put(
            "Pommel Strike",
            CardProfile {
                damage: 9,
                draw: 1,
                ..Default::default()
            },
        );
        put(
            "Shrug It Off",
            CardProfile {
                block: 8,
                draw: 1,
                ..Default::default()
            },
        );
        put(
            "Iron Wave",
            CardProfile {
                damage: 5,
                block: 5,
                ..Default::default()
            },
        );
        put(
            "Carnage",
            CardProfile {
                damage: 20,
                exhaust: true,
                ..Default::default()
            },
        );
        put(
            "Clothesline",
            CardProfile {
                damage: 12,
                apply_weak: 2,
                ..Default::default()
            },
        );
        put(
            "Inflame",
            CardProfile {
                strength: 2,
                ..Default::default()
            },
        );
        put(
            "Demon Form",
            CardProfile {
                strength: 2,
                ..Default::default()
            },
        );
        put(
            "Limit Break",
            CardProfile {
                exhaust: true,
                ..Default::default()
            },
        );
        put(
            "Battle Trance",
            CardProfile {
                draw: 3,
                ..Default::default()
            },
        );
        put(
            "Adrenaline",
            CardProfile {
                draw: 2,
                energy: 1,
                exhaust: true,
                ..Default::default()
            },
        );
        put(
            "Fire Potion",
            CardProfile {
                damage: 20,
                ..Default::default()
            },
        );
        put(
            "Block Potion",
            CardProfile {
                block: 12,
                ..Default::default()
            },
        );
        put(
            "Strength Potion",
            CardProfile {
                strength: 2,
                ..Default::default()
            },
        );
        put(
            "Explosive Potion",
            CardProfile {
                damage: 10,
                aoe: true,
                ..Default::default()
            },
        );
        Self { profiles }
    }

    pub fn get(&self, id: &str) -> Option<&CardProfile> {
        self.profiles.get(id)
    }

    /// Resolve a card's magnitudes: instance-attached values win, then book
    /// data, then (for attacks only) the conservative fallback estimate.
    pub fn resolve_card(&self, card: &CardInstance) -> ResolvedProfile {
        let mut profile = self.get(&card.id).copied().unwrap_or_default();
        if let Some(damage) = card.damage {
            profile.damage = damage;
        }
        if let Some(block) = card.block {
            profile.block = block;
        }
        let mut estimated = false;
        if card.kind == CardKind::Attack && profile.damage == 0 {
            profile.damage = FALLBACK_DAMAGE;
            estimated = true;
        }
        ResolvedProfile { profile, estimated }
    }

    pub fn resolve_potion(&self, id: &str) -> ResolvedProfile {
        match self.get(id) {
            Some(profile) => ResolvedProfile {
                profile: *profile,
                estimated: false,
            },
            None => ResolvedProfile {
                profile: CardProfile::default(),
                estimated: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonsterTraits {
    pub threat_level: i32,
    pub boss: bool,
    pub scaling: bool,
}

/// Known-monster lookup; anything else gets a neutral mid-tier entry.
pub fn monster_traits(id: &str) -> MonsterTraits {
    let (threat_level, boss, scaling) = match id {
        "Louse" | "Gremlin Looter" => (1, false, false),
        "Jaw Worm" | "Sentry" => (2, false, false),
        "Fungi Beast" => (2, false, true),
        "Gremlin Nob" => (3, false, true),
        "Gremlin Leader" => (3, false, false),
        "Hexaghost" | "Slime Boss" => (3, true, false),
        "Lagavulin" | "Slaver Blue" | "Slaver Red" | "Gremlin Giant" => (4, false, false),
        "Centurion" => (4, false, true),
        "Champ" => (5, true, true),
        _ => (2, false, false),
    };
    MonsterTraits {
        threat_level,
        boss,
        scaling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_damage_wins_over_book() {
        let book = EffectBook::builtin();
        let mut card = CardInstance::new(1, "Strike", CardKind::Attack, 1);
        card.damage = Some(9);
        let resolved = book.resolve_card(&card);
        assert_eq!(resolved.profile.damage, 9);
        assert!(!resolved.estimated);
    }

    #[test]
    fn unknown_attack_gets_fallback_and_is_flagged() {
        let book = EffectBook::builtin();
        let card = CardInstance::new(1, "Sword Boomerang", CardKind::Attack, 1);
        let resolved = book.resolve_card(&card);
        assert_eq!(resolved.profile.damage, FALLBACK_DAMAGE);
        assert!(resolved.estimated);
    }

    #[test]
    fn unknown_skill_is_not_estimated() {
        let book = EffectBook::builtin();
        let card = CardInstance::new(1, "True Grit", CardKind::Skill, 1);
        let resolved = book.resolve_card(&card);
        assert_eq!(resolved.profile.damage, 0);
        assert!(!resolved.estimated);
    }

    #[test]
    fn book_round_trips_through_json() {
        let book = EffectBook::builtin();
        let body = serde_json::to_string(&book.profiles).unwrap();
        let loaded = EffectBook::from_json(&body).unwrap();
        assert_eq!(loaded.get("Bash"), book.get("Bash"));
    }

    #[test]
    fn unknown_monster_defaults_neutral() {
        let traits = monster_traits("Shelled Parasite");
        assert_eq!(traits.threat_level, 2);
        assert!(!traits.boss);
        assert!(!traits.scaling);
    }
}
