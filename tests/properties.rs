//! Board invariants under arbitrary tick sequences and tunings

use proptest::prelude::*;

use pulpit_run::consts::*;
use pulpit_run::sim::{Cell, PulpitManager, PulpitPrototype, SpawnTuning};
use pulpit_run::{ScoreKeeper, Scoring};

fn tuning_strategy() -> impl Strategy<Value = SpawnTuning> {
    (0.1f32..8.0, 0.0f32..4.0, 0.0f32..5.0, 0.0f32..2.0, any::<bool>(), 0.0f32..3.0).prop_map(
        |(min, span, lead, safe, enforce, cooldown)| SpawnTuning {
            min_destroy: min,
            max_destroy: min + span,
            spawn_lead: lead,
            min_safe_lifetime: safe,
            enforce_min_safe_lifetime: enforce,
            vacated_cooldown: cooldown,
            grid_step: GRID_STEP,
        },
    )
}

fn started(tuning: SpawnTuning, seed: u64) -> PulpitManager {
    let mut mgr = PulpitManager::new(tuning, Some(PulpitPrototype::default()), seed);
    mgr.start().expect("prototype is set");
    mgr
}

fn distinct_cells(mgr: &PulpitManager) -> bool {
    let mut cells: Vec<Cell> = mgr.active().iter().map(|p| p.cell()).collect();
    let n = cells.len();
    cells.sort();
    cells.dedup();
    cells.len() == n
}

proptest! {
    #[test]
    fn population_stays_capped_and_cells_distinct(
        tuning in tuning_strategy(),
        seed in any::<u64>(),
        dts in prop::collection::vec(0.0f32..0.5, 1..400),
    ) {
        let score = ScoreKeeper::new();
        let mut mgr = started(tuning, seed);

        for dt in dts {
            mgr.tick(dt, &score);
            prop_assert!(mgr.active_count() <= TARGET_POPULATION);
            prop_assert!(mgr.active_count() >= 1);
            prop_assert!(distinct_cells(&mgr));
            prop_assert_eq!(
                mgr.spawned_total() - mgr.destroyed_total(),
                mgr.active_count() as u64
            );
        }
    }

    #[test]
    fn spawned_timings_are_ordered(tuning in tuning_strategy(), seed in any::<u64>()) {
        let score = ScoreKeeper::new();
        let mut mgr = started(tuning, seed);
        for _ in 0..200 {
            mgr.tick(0.1, &score);
            for pulpit in mgr.active() {
                prop_assert!(pulpit.spawn_trigger() >= 0.0);
                prop_assert!(pulpit.spawn_trigger() < pulpit.destroy_time());
            }
        }
    }

    #[test]
    fn double_unregister_matches_single(seed in any::<u64>(), ticks in 0usize..600) {
        let score = ScoreKeeper::new();
        let mut mgr = started(SpawnTuning::default(), seed);
        for _ in 0..ticks {
            mgr.tick(SIM_DT, &score);
        }

        let victim = mgr.active()[0].id();
        mgr.unregister(victim, &score);
        let once = mgr.clone();
        mgr.unregister(victim, &score);
        prop_assert_eq!(mgr, once);
    }

    #[test]
    fn player_anchor_keeps_successors_adjacent(seed in any::<u64>()) {
        let mut score = ScoreKeeper::new();
        let mut mgr = started(SpawnTuning::default(), seed);
        let first = mgr.active()[0].id();
        mgr.player_enter(first, &mut score);

        for _ in 0..(20.0 / SIM_DT) as usize {
            mgr.tick(SIM_DT, &score);
            if let Some(current) = score.current_pulpit().and_then(|id| mgr.get(id)) {
                let cell = current.cell();
                for other in mgr.active() {
                    prop_assert!(other.cell().manhattan(cell) <= 2);
                }
            }
            let newest = mgr.active().last().map(|p| p.id());
            if let Some(id) = newest {
                if Some(id) != score.current_pulpit() {
                    mgr.player_enter(id, &mut score);
                }
            }
        }
        prop_assert!(score.current_pulpit().is_some());
    }
}
