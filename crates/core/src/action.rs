use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardKind {
    Attack,
    Skill,
    Power,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TargetKind {
    None,
    Single,
    AllEnemies,
}

/// One card as it sits in the hand this turn. Magnitudes attached by the
/// state provider win over rules-book data; either may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardInstance {
    pub uuid: u64,
    pub id: String,
    pub kind: CardKind,
    pub cost: i32,
    /// Cost after per-turn modifiers (cost-randomizing relics and the like).
    #[serde(default)]
    pub cost_for_turn: Option<i32>,
    pub target: TargetKind,
    #[serde(default)]
    pub damage: Option<i32>,
    #[serde(default)]
    pub block: Option<i32>,
    #[serde(default)]
    pub upgrades: u32,
}

impl CardInstance {
    pub fn new(uuid: u64, id: impl Into<String>, kind: CardKind, cost: i32) -> Self {
        let target = match kind {
            CardKind::Attack => TargetKind::Single,
            CardKind::Skill | CardKind::Power => TargetKind::None,
        };
        Self {
            uuid,
            id: id.into(),
            kind,
            cost,
            cost_for_turn: None,
            target,
            damage: None,
            block: None,
            upgrades: 0,
        }
    }

    pub fn effective_cost(&self) -> i32 {
        self.cost_for_turn.unwrap_or(self.cost).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PotionInstance {
    pub uuid: u64,
    pub id: String,
    pub target: TargetKind,
}

impl PotionInstance {
    pub fn new(uuid: u64, id: impl Into<String>, target: TargetKind) -> Self {
        Self {
            uuid,
            id: id.into(),
            target,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    PlayCard {
        card: CardInstance,
        target: Option<usize>,
    },
    UsePotion {
        potion: PotionInstance,
        target: Option<usize>,
    },
}

impl Action {
    pub fn uuid(&self) -> u64 {
        match self {
            Self::PlayCard { card, .. } => card.uuid,
            Self::UsePotion { potion, .. } => potion.uuid,
        }
    }

    /// Potions are free; cards pay their per-turn cost.
    pub fn energy_cost(&self) -> i32 {
        match self {
            Self::PlayCard { card, .. } => card.effective_cost(),
            Self::UsePotion { .. } => 0,
        }
    }

    pub fn target(&self) -> Option<usize> {
        match self {
            Self::PlayCard { target, .. } | Self::UsePotion { target, .. } => *target,
        }
    }

    pub fn target_kind(&self) -> TargetKind {
        match self {
            Self::PlayCard { card, .. } => card.target,
            Self::UsePotion { potion, .. } => potion.target,
        }
    }

    pub fn with_target(&self, target: Option<usize>) -> Self {
        match self {
            Self::PlayCard { card, .. } => Self::PlayCard {
                card: card.clone(),
                target,
            },
            Self::UsePotion { potion, .. } => Self::UsePotion {
                potion: potion.clone(),
                target,
            },
        }
    }

    pub fn stable_key(&self) -> String {
        match self {
            Self::PlayCard { card, target } => {
                format!("card:{}:{}:{target:?}", card.uuid, card.id)
            }
            Self::UsePotion { potion, target } => {
                format!("potion:{}:{}:{target:?}", potion.uuid, potion.id)
            }
        }
    }

    pub fn short_label(&self) -> String {
        match self {
            Self::PlayCard { card, target } => match target {
                Some(idx) => format!("play {} -> {idx}", card.id),
                None => format!("play {}", card.id),
            },
            Self::UsePotion { potion, target } => match target {
                Some(idx) => format!("quaff {} -> {idx}", potion.id),
                None => format!("quaff {}", potion.id),
            },
        }
    }
}

/// Final product of a planning call: actions in play order plus the score
/// and the survival projection that justified them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedSequence {
    pub actions: Vec<Action>,
    pub score: f64,
    pub energy_spent: i32,
    pub projected_hp: i32,
    pub lethal: bool,
}

impl PlannedSequence {
    pub fn end_turn() -> Self {
        Self {
            actions: Vec::new(),
            score: 0.0,
            energy_spent: 0,
            projected_hp: 0,
            lethal: false,
        }
    }

    pub fn is_end_turn(&self) -> bool {
        self.actions.is_empty()
    }
}
