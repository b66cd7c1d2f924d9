use spirebot_core::{
    Action, CardInstance, CardKind, CombatSnapshot, EffectBook, Intent, MonsterState, PlayerState,
    Stage,
};
use spirebot_planner::{Planner, PlannerConfig};

fn card(uuid: u64, id: &str, kind: CardKind, cost: i32) -> CardInstance {
    CardInstance::new(uuid, id, kind, cost)
}

fn snapshot(
    player: PlayerState,
    hand: Vec<CardInstance>,
    monsters: Vec<MonsterState>,
    stage: Stage,
) -> CombatSnapshot {
    let mut snap = CombatSnapshot::new(player, monsters, stage);
    snap.hand = hand;
    snap
}

fn planner() -> Planner {
    Planner::new(PlannerConfig::default(), EffectBook::builtin())
}

fn card_id(action: &Action) -> &str {
    match action {
        Action::PlayCard { card, .. } => &card.id,
        Action::UsePotion { potion, .. } => &potion.id,
    }
}

macro_rules! confidence_case {
    ($name:ident, $energy:expr, $hp:expr, $stage:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let snap = snapshot(
                PlayerState::new($hp, 80, $energy),
                Vec::new(),
                vec![MonsterState::new("Cultist", 100, Intent::Unknown)],
                $stage,
            );
            let confidence = planner().get_confidence(&snap);
            assert!(
                (confidence - $expected).abs() < 1e-9,
                "got {confidence}, expected {}",
                $expected
            );
        }
    };
}

confidence_case!(confidence_flush_act1, 3, 80, Stage::Act1, 1.0);
confidence_case!(confidence_flush_act2, 3, 80, Stage::Act2, 0.9);
confidence_case!(confidence_neutral_act2, 2, 40, Stage::Act2, 0.7);
confidence_case!(confidence_starved_act3, 1, 20, Stage::Act3, 0.3);
confidence_case!(confidence_low_hp_only, 2, 20, Stage::Act2, 0.5);

#[test]
fn confidence_rises_when_lethal_is_in_hand() {
    let base = snapshot(
        PlayerState::new(40, 80, 2),
        Vec::new(),
        vec![MonsterState::new("Louse", 4, Intent::Unknown)],
        Stage::Act2,
    );
    let without = planner().get_confidence(&base);

    let mut armed = base.clone();
    armed.hand = vec![card(1, "Strike", CardKind::Attack, 1)];
    let with = planner().get_confidence(&armed);
    assert!((with - without - 0.2).abs() < 1e-9);
}

#[test]
fn blocks_when_survival_is_on_the_line() {
    let mut defend = card(1, "Defend", CardKind::Skill, 0);
    defend.block = Some(8);
    let snap = snapshot(
        PlayerState::new(10, 80, 3),
        vec![defend],
        vec![MonsterState::new(
            "Jaw Worm",
            44,
            Intent::Attack { damage: 12, hits: 1 },
        )],
        Stage::Act1,
    );
    let sequence = planner().plan_turn(&snap);
    assert_eq!(sequence.actions.len(), 1);
    assert_eq!(card_id(&sequence.actions[0]), "Defend");
    assert_eq!(sequence.projected_hp, 6);
}

#[test]
fn lethal_spends_the_minimum_cards() {
    let snap = snapshot(
        PlayerState::new(60, 80, 2),
        vec![
            card(1, "Strike", CardKind::Attack, 1),
            card(2, "Strike", CardKind::Attack, 1),
        ],
        vec![MonsterState::new(
            "Louse",
            5,
            Intent::Attack { damage: 6, hits: 1 },
        )],
        Stage::Act1,
    );
    let (sequence, trace) = planner().plan_turn_traced(&snap);
    assert!(trace.lethal);
    assert!(sequence.lethal);
    assert_eq!(sequence.actions.len(), 1);
    assert_eq!(sequence.energy_spent, 1);
    assert_eq!(card_id(&sequence.actions[0]), "Strike");
}

#[test]
fn finishes_the_weak_monster_over_the_big_threat() {
    let snap = snapshot(
        PlayerState::new(60, 80, 3),
        vec![card(1, "Strike", CardKind::Attack, 1)],
        vec![
            MonsterState::new(
                "Gremlin Nob",
                50,
                Intent::Attack { damage: 14, hits: 1 },
            ),
            MonsterState::new("Louse", 5, Intent::Unknown),
        ],
        Stage::Act1,
    );
    let sequence = planner().plan_turn(&snap);
    assert!(!sequence.actions.is_empty());
    assert_eq!(sequence.actions[0].target(), Some(1));
}

#[test]
fn aoe_sweeps_a_pack() {
    let pack = || MonsterState::new("Louse", 8, Intent::Attack { damage: 5, hits: 1 });
    let snap = snapshot(
        PlayerState::new(60, 80, 3),
        vec![
            card(1, "Cleave", CardKind::Attack, 1),
            card(2, "Strike", CardKind::Attack, 1),
        ],
        vec![pack(), pack(), pack()],
        Stage::Act1,
    );
    let sequence = planner().plan_turn(&snap);
    assert!(sequence
        .actions
        .iter()
        .any(|action| card_id(action) == "Cleave"));
}

#[test]
fn plans_are_deterministic() {
    let snap = snapshot(
        PlayerState::new(50, 80, 3),
        vec![
            card(1, "Strike", CardKind::Attack, 1),
            card(2, "Strike", CardKind::Attack, 1),
            card(3, "Defend", CardKind::Skill, 1),
            card(4, "Bash", CardKind::Attack, 2),
            card(5, "Pommel Strike", CardKind::Attack, 1),
        ],
        vec![
            MonsterState::new("Cultist", 48, Intent::Attack { damage: 6, hits: 1 }),
            MonsterState::new(
                "Jaw Worm",
                42,
                Intent::Attack { damage: 11, hits: 1 },
            ),
        ],
        Stage::Act2,
    );
    let planner = planner();
    let first = planner.plan_turn(&snap);
    let second = planner.plan_turn(&snap);
    let keys = |sequence: &spirebot_core::PlannedSequence| {
        sequence
            .actions
            .iter()
            .map(|action| action.stable_key())
            .collect::<Vec<_>>()
    };
    assert_eq!(keys(&first), keys(&second));
    assert_eq!(first.score, second.score);
    assert_eq!(first.energy_spent, second.energy_spent);
}

#[test]
fn plan_never_overspends_energy() {
    let snap = snapshot(
        PlayerState::new(50, 80, 3),
        vec![
            card(1, "Strike", CardKind::Attack, 1),
            card(2, "Bash", CardKind::Attack, 2),
            card(3, "Carnage", CardKind::Attack, 2),
            card(4, "Clothesline", CardKind::Attack, 2),
            card(5, "Iron Wave", CardKind::Attack, 1),
        ],
        vec![MonsterState::new(
            "Champ",
            200,
            Intent::Attack { damage: 16, hits: 1 },
        )],
        Stage::Act3,
    );
    let sequence = planner().plan_turn(&snap);
    assert!(sequence.energy_spent <= 3);
    let total: i32 = sequence
        .actions
        .iter()
        .map(|action| action.energy_cost())
        .sum();
    assert_eq!(total, sequence.energy_spent);
}

#[test]
fn plan_only_references_held_cards() {
    let hand = vec![
        card(10, "Strike", CardKind::Attack, 1),
        card(11, "Defend", CardKind::Skill, 1),
        card(12, "Bash", CardKind::Attack, 2),
    ];
    let held: Vec<u64> = hand.iter().map(|c| c.uuid).collect();
    let snap = snapshot(
        PlayerState::new(50, 80, 3),
        hand,
        vec![MonsterState::new(
            "Cultist",
            60,
            Intent::Attack { damage: 6, hits: 1 },
        )],
        Stage::Act2,
    );
    let sequence = planner().plan_turn(&snap);
    let mut seen = std::collections::HashSet::new();
    for action in &sequence.actions {
        assert!(held.contains(&action.uuid()));
        assert!(seen.insert(action.uuid()), "card played twice");
    }
}

#[test]
fn zero_timeout_still_returns_a_plan() {
    let mut config = PlannerConfig::default();
    config.timeout_ms = 0;
    let planner = Planner::new(config, EffectBook::builtin());
    let snap = snapshot(
        PlayerState::new(50, 80, 3),
        vec![
            card(1, "Strike", CardKind::Attack, 1),
            card(2, "Strike", CardKind::Attack, 1),
            card(3, "Defend", CardKind::Skill, 1),
        ],
        vec![MonsterState::new(
            "Cultist",
            60,
            Intent::Attack { damage: 6, hits: 1 },
        )],
        Stage::Act2,
    );
    let (sequence, trace) = planner.plan_turn_traced(&snap);
    assert!(trace.timed_out);
    assert!(!sequence.actions.is_empty());
}

#[test]
fn unknown_cards_are_recorded_for_tuning() {
    let snap = snapshot(
        PlayerState::new(50, 80, 3),
        vec![card(1, "Sever Soul", CardKind::Attack, 2)],
        vec![MonsterState::new(
            "Cultist",
            60,
            Intent::Attack { damage: 6, hits: 1 },
        )],
        Stage::Act2,
    );
    let (_, trace) = planner().plan_turn_traced(&snap);
    assert!(trace
        .missing_effects
        .iter()
        .any(|record| record.id == "Sever Soul"));
}
