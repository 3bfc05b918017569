use crate::config::ArenaConfig;
use crate::economy::EnergyEconomy;
use crate::entity::{Entity, EntityId, EntityKind, FragmentTier, ResourceTier};
use crate::fragmentation::FragmentationRule;
use crate::pool::EntityPool;
use crate::rng::SeededRng;
use crate::space::ToroidalSpace;

/// Collaborators a collision pass may call into.
pub struct CollisionContext<'a> {
    pub fragmentation: &'a FragmentationRule,
    pub economy: &'a mut EnergyEconomy,
    pub rng: &'a mut SeededRng,
    pub craft_invulnerable: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CollisionEvent {
    FragmentDestroyed {
        projectile: EntityId,
        fragment: EntityId,
        tier: FragmentTier,
        score: u32,
        spawned: Vec<(EntityId, EntityKind)>,
    },
    CraftDestroyed {
        craft: EntityId,
        fragment: EntityId,
    },
    ResourceCollected {
        resource: EntityId,
        tier: ResourceTier,
        credits: u32,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionReport {
    pub score: u32,
    pub fragments_destroyed: u32,
    pub craft_destroyed: bool,
    pub events: Vec<CollisionEvent>,
}

/// Circle-overlap tests between typed groups. Each group is walked in
/// ascending id order and only bodies active when the pass starts take part,
/// so a pass is fully determined by the pool and the RNG state.
#[derive(Clone, Debug)]
pub struct CollisionDetector {
    space: ToroidalSpace,
}

impl CollisionDetector {
    pub fn new(arena: &ArenaConfig) -> Self {
        Self {
            space: ToroidalSpace::new(arena),
        }
    }

    pub fn overlaps(&self, a: &Entity, b: &Entity) -> bool {
        let reach = a.radius + b.radius;
        self.space.shortest_delta(a.position, b.position).length_sq() < reach * reach
    }

    pub fn detect_and_resolve(
        &self,
        pool: &mut EntityPool,
        ctx: CollisionContext<'_>,
    ) -> CollisionReport {
        let CollisionContext {
            fragmentation,
            economy,
            rng,
            craft_invulnerable,
        } = ctx;
        let mut report = CollisionReport::default();

        let projectiles = pool.active_ids(|entity| entity.kind() == EntityKind::Projectile);
        let fragments = pool.active_ids(|entity| entity.fragment_tier().is_some());
        let resources = pool.active_ids(|entity| entity.resource_tier().is_some());
        let crafts = pool.active_ids(Entity::is_craft);

        for projectile_id in projectiles {
            let Some(hit) = self.first_hit(pool, projectile_id, &fragments) else {
                continue;
            };
            let Some(fragment) = pool.get(hit).cloned() else {
                continue;
            };
            let Some(tier) = fragment.fragment_tier() else {
                continue;
            };

            pool.deactivate(projectile_id);
            pool.deactivate(hit);

            let mut spawned = Vec::new();
            for request in fragmentation.split(&fragment, rng).into_requests() {
                let kind = request.body.kind();
                if let Some(id) = pool.spawn(request) {
                    spawned.push((id, kind));
                }
            }

            let score = tier.score();
            report.score += score;
            report.fragments_destroyed += 1;
            tracing::debug!(
                projectile = %projectile_id,
                fragment = %hit,
                tier = ?tier,
                score,
                children = spawned.len(),
                "fragment destroyed"
            );
            report.events.push(CollisionEvent::FragmentDestroyed {
                projectile: projectile_id,
                fragment: hit,
                tier,
                score,
                spawned,
            });
        }

        for craft_id in crafts {
            if !craft_invulnerable {
                if let Some(hit) = self.first_hit(pool, craft_id, &fragments) {
                    pool.deactivate(craft_id);
                    report.craft_destroyed = true;
                    tracing::debug!(craft = %craft_id, fragment = %hit, "craft destroyed");
                    report.events.push(CollisionEvent::CraftDestroyed {
                        craft: craft_id,
                        fragment: hit,
                    });
                    continue;
                }
            }

            for resource_id in &resources {
                let touching = match (pool.get(craft_id), pool.get(*resource_id)) {
                    (Some(craft), Some(resource)) => resource.active && self.overlaps(craft, resource),
                    _ => false,
                };
                if !touching {
                    continue;
                }
                let Some(tier) = pool.get(*resource_id).and_then(Entity::resource_tier) else {
                    continue;
                };
                pool.deactivate(*resource_id);
                let credits = economy.collect(tier);
                report.events.push(CollisionEvent::ResourceCollected {
                    resource: *resource_id,
                    tier,
                    credits,
                });
            }
        }

        report
    }

    /// First still-active candidate overlapping `subject`, by ascending id.
    fn first_hit(
        &self,
        pool: &EntityPool,
        subject: EntityId,
        candidates: &[EntityId],
    ) -> Option<EntityId> {
        let subject = pool.get(subject).filter(|entity| entity.active)?;
        candidates.iter().copied().find(|id| {
            pool.get(*id)
                .is_some_and(|other| other.active && self.overlaps(subject, other))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnergyConfig, FragmentationConfig};
    use crate::math::Vec2;
    use crate::pool::SpawnRequest;

    struct Rig {
        pool: EntityPool,
        detector: CollisionDetector,
        fragmentation: FragmentationRule,
        economy: EnergyEconomy,
        rng: SeededRng,
    }

    impl Rig {
        fn new() -> Self {
            let arena = ArenaConfig::default();
            Self {
                pool: EntityPool::new(ToroidalSpace::new(&arena)),
                detector: CollisionDetector::new(&arena),
                fragmentation: FragmentationRule::new(&FragmentationConfig {
                    resource_chance: 0.0,
                    ..FragmentationConfig::default()
                }),
                economy: EnergyEconomy::new(&EnergyConfig::default()),
                rng: SeededRng::new(11),
            }
        }

        fn spawn(&mut self, kind: EntityKind, x: f64, y: f64) -> EntityId {
            self.pool
                .spawn(SpawnRequest::new(kind, Vec2::new(x, y), Vec2::ZERO, 0.0))
                .expect("valid spawn")
        }

        fn run(&mut self, craft_invulnerable: bool) -> CollisionReport {
            self.detector.detect_and_resolve(
                &mut self.pool,
                CollisionContext {
                    fragmentation: &self.fragmentation,
                    economy: &mut self.economy,
                    rng: &mut self.rng,
                    craft_invulnerable,
                },
            )
        }
    }

    #[test]
    fn projectile_is_consumed_by_lowest_id_fragment() {
        let mut rig = Rig::new();
        let a = rig.spawn(EntityKind::FragmentSmall, 50.0, 50.0);
        let b = rig.spawn(EntityKind::FragmentSmall, 51.0, 50.0);
        let shot = rig.spawn(EntityKind::Projectile, 50.5, 50.0);

        let report = rig.run(false);
        assert_eq!(report.score, 100);
        assert_eq!(report.fragments_destroyed, 1);
        assert!(!rig.pool.get(a).unwrap().active);
        assert!(rig.pool.get(b).unwrap().active);
        assert!(!rig.pool.get(shot).unwrap().active);
    }

    #[test]
    fn two_projectiles_on_one_fragment_only_score_once() {
        let mut rig = Rig::new();
        let rock = rig.spawn(EntityKind::FragmentSmall, 50.0, 50.0);
        let first = rig.spawn(EntityKind::Projectile, 50.0, 50.0);
        let second = rig.spawn(EntityKind::Projectile, 50.0, 50.0);

        let report = rig.run(false);
        assert_eq!(report.score, 100);
        assert!(!rig.pool.get(rock).unwrap().active);
        assert!(!rig.pool.get(first).unwrap().active);
        assert!(rig.pool.get(second).unwrap().active);
    }

    #[test]
    fn children_are_not_hit_in_the_same_pass() {
        let mut rig = Rig::new();
        rig.spawn(EntityKind::FragmentLarge, 80.0, 72.0);
        rig.spawn(EntityKind::Projectile, 80.0, 72.0);
        let late_shot = rig.spawn(EntityKind::Projectile, 80.0, 72.0);

        let report = rig.run(false);
        assert_eq!(report.score, 20);
        assert_eq!(rig.pool.count(EntityKind::FragmentMedium), 2);
        assert!(rig.pool.get(late_shot).unwrap().active);
    }

    #[test]
    fn overlap_is_measured_across_the_seam() {
        let mut rig = Rig::new();
        let rock = rig.spawn(EntityKind::FragmentSmall, 159.0, 72.0);
        rig.spawn(EntityKind::Projectile, 1.0, 72.0);
        rig.run(false);
        assert!(!rig.pool.get(rock).unwrap().active);
    }

    #[test]
    fn touching_circles_do_not_collide() {
        let mut rig = Rig::new();
        let rock = rig.spawn(EntityKind::FragmentSmall, 50.0, 50.0);
        rig.spawn(EntityKind::Projectile, 55.0, 50.0);
        let report = rig.run(false);
        assert_eq!(report.score, 0);
        assert!(rig.pool.get(rock).unwrap().active);
    }

    #[test]
    fn craft_dies_to_fragment_unless_invulnerable() {
        let mut rig = Rig::new();
        let craft = rig.spawn(EntityKind::PlayerCraft, 30.0, 30.0);
        rig.spawn(EntityKind::FragmentMedium, 35.0, 30.0);

        let report = rig.run(true);
        assert!(!report.craft_destroyed);
        assert!(rig.pool.get(craft).unwrap().active);

        let report = rig.run(false);
        assert!(report.craft_destroyed);
        assert!(!rig.pool.get(craft).unwrap().active);
    }

    #[test]
    fn craft_collects_overlapping_resources() {
        let mut rig = Rig::new();
        rig.spawn(EntityKind::PlayerCraft, 30.0, 30.0);
        let epic = rig.spawn(EntityKind::ResourceEpic, 32.0, 30.0);
        let far = rig.spawn(EntityKind::ResourceCommon, 90.0, 30.0);

        let report = rig.run(false);
        assert_eq!(
            report.events,
            vec![CollisionEvent::ResourceCollected {
                resource: epic,
                tier: ResourceTier::Epic,
                credits: 5,
            }]
        );
        assert!(!rig.pool.get(epic).unwrap().active);
        assert!(rig.pool.get(far).unwrap().active);
        assert_eq!(rig.economy.ledger().epic, 5);
    }

    #[test]
    fn destroyed_craft_collects_nothing() {
        let mut rig = Rig::new();
        rig.spawn(EntityKind::PlayerCraft, 30.0, 30.0);
        rig.spawn(EntityKind::FragmentSmall, 31.0, 30.0);
        let gem = rig.spawn(EntityKind::ResourceRare, 29.0, 30.0);

        let report = rig.run(false);
        assert!(report.craft_destroyed);
        assert!(rig.pool.get(gem).unwrap().active);
        assert_eq!(rig.economy.ledger().total, 0);
    }
}
