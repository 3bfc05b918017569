use arcade_physics_core::config::{ArenaConfig, ModifierBounds};
use arcade_physics_core::entity::Energy;
use arcade_physics_core::genetics::GeneticModifierResolver;
use arcade_physics_core::space::ToroidalSpace;
use arcade_physics_core::{
    replay, FrameInput, Genome, LimbShape, Rotation, SimConfig, Terrain, Vec2,
};
use proptest::prelude::*;

fn arb_input() -> impl Strategy<Value = FrameInput> {
    (
        0.0f64..0.1,
        any::<bool>(),
        prop_oneof![
            Just(Rotation::Left),
            Just(Rotation::Neutral),
            Just(Rotation::Right)
        ],
        any::<bool>(),
    )
        .prop_map(|(frame_delta, thrust, rotation, fire)| FrameInput {
            frame_delta,
            thrust,
            rotation,
            fire,
        })
}

fn arb_genome() -> impl Strategy<Value = Genome> {
    (0usize..3, 0.5f64..1.5, 0.7f64..1.3, 0.5f64..1.5).prop_map(
        |(limb, leg_length, leg_thickness, shell_size)| Genome {
            limb_shape: LimbShape::ALL[limb],
            leg_length,
            leg_thickness,
            shell_size,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wrapped_positions_stay_inside_the_arena(
        x in -10_000.0f64..10_000.0,
        y in -10_000.0f64..10_000.0,
    ) {
        let space = ToroidalSpace::new(&ArenaConfig::default());
        let wrapped = space.wrap(Vec2::new(x, y));
        prop_assert!(space.contains(wrapped), "{:?} -> {:?}", (x, y), wrapped);
    }

    #[test]
    fn shortest_delta_never_exceeds_half_the_arena(
        ax in 0.0f64..160.0, ay in 0.0f64..144.0,
        bx in 0.0f64..160.0, by in 0.0f64..144.0,
    ) {
        let space = ToroidalSpace::new(&ArenaConfig::default());
        let delta = space.shortest_delta(Vec2::new(ax, ay), Vec2::new(bx, by));
        prop_assert!(delta.x.abs() <= 80.0 + 1e-9);
        prop_assert!(delta.y.abs() <= 72.0 + 1e-9);
    }

    #[test]
    fn energy_stays_in_range(writes in proptest::collection::vec(-500.0f64..500.0, 1..50)) {
        let mut energy = Energy::FULL;
        for amount in writes {
            energy.add(amount);
            prop_assert!((0.0..=100.0).contains(&energy.get()));
        }
    }

    #[test]
    fn modifiers_respect_their_bounds(genome in arb_genome(), terrain in 0usize..8) {
        let bounds = ModifierBounds::default();
        let resolver = GeneticModifierResolver::new(&bounds);
        let modifiers = resolver.resolve(&genome, Terrain::ALL[terrain]);
        prop_assert!((bounds.speed.min..=bounds.speed.max).contains(&modifiers.speed));
        prop_assert!((bounds.drain.min..=bounds.drain.max).contains(&modifiers.drain));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn random_sessions_keep_every_invariant(
        seed in any::<u32>(),
        inputs in proptest::collection::vec(arb_input(), 1..300),
    ) {
        let snapshots = replay(&SimConfig::default(), seed, &inputs)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        for snapshot in &snapshots {
            prop_assert!((0.0..=100.0).contains(&snapshot.energy));
            prop_assert!(snapshot.sub_steps <= 4);
            let mut previous = None;
            for entity in &snapshot.entities {
                prop_assert!((0.0..160.0).contains(&entity.position.x));
                prop_assert!((0.0..144.0).contains(&entity.position.y));
                prop_assert!(previous < Some(entity.id));
                previous = Some(entity.id);
            }
        }
    }
}
