use crate::{CardInstance, PotionInstance};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Act1,
    Act2,
    Act3,
}

impl Stage {
    pub fn index(self) -> i32 {
        match self {
            Stage::Act1 => 1,
            Stage::Act2 => 2,
            Stage::Act3 => 3,
        }
    }

    /// Conservative estimate for a monster whose intent is unreadable.
    pub fn unknown_intent_damage(self) -> i32 {
        5 * self.index()
    }

    pub fn danger_threshold(self) -> i32 {
        15 + 5 * self.index()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Intent {
    Attack { damage: i32, hits: i32 },
    AttackBuff { damage: i32, hits: i32 },
    Buff,
    Debuff,
    Defend,
    Unknown,
}

impl Intent {
    pub fn declared_damage(self) -> Option<i32> {
        match self {
            Intent::Attack { damage, hits } | Intent::AttackBuff { damage, hits } => {
                Some(damage.max(0) * hits.max(1))
            }
            Intent::Buff | Intent::Debuff | Intent::Defend => Some(0),
            Intent::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerState {
    pub hp: i32,
    pub max_hp: i32,
    pub block: i32,
    pub energy: i32,
    pub strength: i32,
    #[serde(default)]
    pub weak: bool,
    #[serde(default)]
    pub frail: bool,
    #[serde(default)]
    pub vulnerable: bool,
}

impl PlayerState {
    pub fn new(hp: i32, max_hp: i32, energy: i32) -> Self {
        Self {
            hp: hp.max(0),
            max_hp: max_hp.max(1),
            block: 0,
            energy: energy.max(0),
            strength: 0,
            weak: false,
            frail: false,
            vulnerable: false,
        }
    }

    pub fn hp_fraction(&self) -> f64 {
        self.hp.max(0) as f64 / self.max_hp.max(1) as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonsterState {
    pub id: String,
    pub hp: i32,
    pub max_hp: i32,
    pub block: i32,
    #[serde(default)]
    pub vulnerable: i32,
    #[serde(default)]
    pub weak: i32,
    #[serde(default)]
    pub thorns: i32,
    pub intent: Intent,
    #[serde(default)]
    pub is_gone: bool,
    #[serde(default)]
    pub boss: bool,
    #[serde(default)]
    pub scaling: bool,
}

impl MonsterState {
    pub fn new(id: impl Into<String>, hp: i32, intent: Intent) -> Self {
        Self {
            id: id.into(),
            hp: hp.max(0),
            max_hp: hp.max(1),
            block: 0,
            vulnerable: 0,
            weak: 0,
            thorns: 0,
            intent,
            is_gone: false,
            boss: false,
            scaling: false,
        }
    }

    pub fn alive(&self) -> bool {
        !self.is_gone && self.hp > 0
    }

    pub fn effective_hp(&self) -> i32 {
        self.hp.max(0) + self.block.max(0)
    }

    pub fn declared_damage(&self, stage: Stage) -> i32 {
        self.intent
            .declared_damage()
            .unwrap_or_else(|| stage.unknown_intent_damage())
    }
}

/// One turn of combat, captured as a value. Simulation never mutates a
/// snapshot in place; every applied action produces a fresh copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombatSnapshot {
    pub player: PlayerState,
    pub monsters: Vec<MonsterState>,
    pub hand: Vec<CardInstance>,
    #[serde(default)]
    pub potions: Vec<PotionInstance>,
    pub stage: Stage,
    #[serde(default)]
    pub turn: u32,
    #[serde(default)]
    pub primary_target: Option<usize>,
}

impl CombatSnapshot {
    pub fn new(player: PlayerState, monsters: Vec<MonsterState>, stage: Stage) -> Self {
        Self {
            player,
            monsters,
            hand: Vec::new(),
            potions: Vec::new(),
            stage,
            turn: 1,
            primary_target: None,
        }
    }

    pub fn alive_monsters(&self) -> impl Iterator<Item = (usize, &MonsterState)> {
        self.monsters
            .iter()
            .enumerate()
            .filter(|(_, monster)| monster.alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive_monsters().count()
    }

    pub fn total_effective_hp(&self) -> i32 {
        self.alive_monsters()
            .map(|(_, monster)| monster.effective_hp())
            .sum()
    }

    /// Declared damage headed at the player next turn, summed over living
    /// monsters, with the stage fallback for unreadable intents.
    pub fn incoming_damage(&self) -> i32 {
        self.alive_monsters()
            .map(|(_, monster)| monster.declared_damage(self.stage))
            .sum()
    }

    pub fn pinned_target(&self) -> Option<usize> {
        self.primary_target
            .filter(|idx| self.monsters.get(*idx).is_some_and(MonsterState::alive))
    }
}
