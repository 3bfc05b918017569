use std::collections::VecDeque;

use super::*;
use crate::collision::{CollisionContext, CollisionDetector, CollisionEvent};
use crate::constants::SPAWN_MAX_ATTEMPTS;
use crate::economy::{Cooldown, EnergyEconomy, ResourceLedger};
use crate::entity::Energy;
use crate::fragmentation::FragmentationRule;
use crate::genetics::{GeneticModifierResolver, Modifiers};
use crate::kinematics::{Kinematics, Propulsion};
use crate::pool::{EntityPool, SpawnRequest};
use crate::rng::SeededRng;
use crate::scheduler::FixedStepScheduler;
use crate::space::ToroidalSpace;

const EVENT_BACKLOG: usize = 1_024;

#[derive(Clone, Copy, Debug, Default)]
struct Controls {
    thrust: bool,
    rotation: Rotation,
}

/// One asteroids-style session: a craft, drifting fragments, projectiles
/// and resource pickups in a toroidal arena.
///
/// All state lives in this value. Callers own it, drive it with [`tick`],
/// and must serialize access themselves if they share it across threads.
///
/// [`tick`]: Simulation::tick
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimConfig,
    seed: u32,
    space: ToroidalSpace,
    kinematics: Kinematics,
    pool: EntityPool,
    scheduler: FixedStepScheduler,
    resolver: GeneticModifierResolver,
    economy: EnergyEconomy,
    fragmentation: FragmentationRule,
    collisions: CollisionDetector,
    rng: SeededRng,
    controls: Controls,
    craft: Option<EntityId>,
    craft_state: CraftState,
    fire_cooldown: Cooldown,
    invulnerable_for: f64,
    score: u32,
    fragments_destroyed: u32,
    frame: u64,
    elapsed: f64,
    last_sub_steps: u32,
    events: VecDeque<SimEvent>,
}

impl Simulation {
    pub fn new(config: &SimConfig, seed: u32) -> Result<Self, SimError> {
        config.validate()?;
        let space = ToroidalSpace::new(&config.arena);
        let mut sim = Self {
            config: config.clone(),
            seed,
            space,
            kinematics: Kinematics::new(config),
            pool: EntityPool::new(space),
            scheduler: FixedStepScheduler::new(&config.scheduler),
            resolver: GeneticModifierResolver::new(&config.modifiers),
            economy: EnergyEconomy::new(&config.energy),
            fragmentation: FragmentationRule::new(&config.fragmentation),
            collisions: CollisionDetector::new(&config.arena),
            rng: SeededRng::new(seed),
            controls: Controls::default(),
            craft: None,
            craft_state: CraftState::Idle,
            fire_cooldown: Cooldown::new(config.craft.fire_cooldown),
            invulnerable_for: 0.0,
            score: 0,
            fragments_destroyed: 0,
            frame: 0,
            elapsed: 0.0,
            last_sub_steps: 0,
            events: VecDeque::new(),
        };
        sim.populate();
        Ok(sim)
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn space(&self) -> &ToroidalSpace {
        &self.space
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn craft_state(&self) -> CraftState {
        self.craft_state
    }

    pub fn craft_id(&self) -> Option<EntityId> {
        self.craft
    }

    pub fn is_over(&self) -> bool {
        self.craft_state.is_terminal()
    }

    pub fn ledger(&self) -> &ResourceLedger {
        self.economy.ledger()
    }

    /// Modifiers the craft currently moves under.
    pub fn craft_modifiers(&self) -> Modifiers {
        self.craft_entity()
            .and_then(Entity::genome)
            .map_or(Modifiers::NEUTRAL, |genome| {
                self.resolver.resolve(genome, self.config.medium)
            })
    }

    /// Clears the pool and rebuilds the opening population from the session
    /// seed. The resource ledger is cumulative and survives.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.rng = SeededRng::new(self.seed);
        self.scheduler.reset();
        self.controls = Controls::default();
        self.craft = None;
        self.craft_state = CraftState::Idle;
        self.fire_cooldown.clear();
        self.invulnerable_for = 0.0;
        self.score = 0;
        self.fragments_destroyed = 0;
        self.frame = 0;
        self.elapsed = 0.0;
        self.last_sub_steps = 0;
        self.events.clear();
        self.populate();
        tracing::info!(seed = self.seed, entities = self.pool.len(), "session reset");
    }

    /// Places a fresh craft, replacing any existing one. Returns `None` if
    /// the position is unusable, leaving the current craft in place.
    pub fn spawn_craft(&mut self, position: Vec2) -> Option<EntityId> {
        let request = SpawnRequest::craft(position, 0.0, self.config.genome);
        let id = self.pool.spawn(request)?;
        if let Some(previous) = self.craft.replace(id) {
            self.pool.deactivate(previous);
            self.pool.compact();
        }
        self.craft_state = CraftState::Idle;
        self.fire_cooldown.clear();
        self.invulnerable_for = self.config.craft.spawn_invulnerability;
        self.apply_rotation();
        Some(id)
    }

    pub fn set_thrust(&mut self, active: bool) {
        self.controls.thrust = active;
        self.update_craft_state();
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.controls.rotation = rotation;
        self.apply_rotation();
    }

    /// Fires one projectile along the craft's heading. False while on
    /// cooldown, without enough energy, or with no live craft.
    pub fn fire_weapon(&mut self) -> bool {
        if self.craft_state.is_terminal() || !self.fire_cooldown.ready() {
            return false;
        }
        let Some(craft) = self.craft.and_then(|id| self.pool.get_mut(id)) else {
            return false;
        };
        if !craft.active {
            return false;
        }
        let Some(energy) = craft.energy_mut() else {
            return false;
        };
        if !self.economy.try_fire_weapon(energy) {
            return false;
        }

        let heading = craft.heading;
        let (muzzle_radius, _) = EntityKind::Projectile.default_shape();
        let muzzle = craft.position + Vec2::from_angle(heading, craft.radius + muzzle_radius);
        let request = SpawnRequest::new(EntityKind::Projectile, muzzle, Vec2::ZERO, heading);
        self.fire_cooldown.trigger();
        self.pool.spawn(request).is_some()
    }

    pub fn apply_input(&mut self, input: &FrameInput) {
        self.set_thrust(input.thrust);
        self.set_rotation(input.rotation);
        if input.fire {
            self.fire_weapon();
        }
    }

    /// Feeds one frame of wall time through the fixed-step pipeline.
    ///
    /// The only error is a population integrity violation, which means the
    /// session state can no longer be trusted.
    pub fn tick(&mut self, frame_delta: f64) -> Result<SimulationSnapshot, SimError> {
        let mut scheduler = core::mem::replace(
            &mut self.scheduler,
            FixedStepScheduler::new(&self.config.scheduler),
        );
        let result = scheduler.advance(frame_delta, |dt| self.substep(dt));
        self.scheduler = scheduler;
        self.last_sub_steps = result?;
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            frame: self.frame,
            score: self.score,
            energy: self.craft_energy().map_or(0.0, Energy::get),
            elapsed_time: self.elapsed,
            sub_steps: self.last_sub_steps,
            craft_state: self.craft_state,
            game_over: self.craft_state == CraftState::Destroyed,
            fragments_destroyed: self.fragments_destroyed,
            entities: self.pool.active().map(EntitySnapshot::from).collect(),
        }
    }

    /// Render-only wrap duplicates for one snapshot entry.
    pub fn ghost_positions(&self, entity: &EntitySnapshot, margin: f64) -> Vec<Vec2> {
        self.space
            .ghost_positions(entity.position, entity.radius, margin)
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }

    /// Interpolation factor between the last two sub-steps.
    pub fn alpha(&self) -> f64 {
        self.scheduler.alpha()
    }

    fn substep(&mut self, dt: f64) -> Result<(), SimError> {
        self.frame += 1;
        self.elapsed += dt;
        self.fire_cooldown.tick(dt);
        self.invulnerable_for = (self.invulnerable_for - dt).max(0.0);

        self.update_craft_state();
        let modifiers = self.craft_modifiers();
        let propulsion = Propulsion {
            thrust: self.craft_state.is_thrusting(),
            speed_multiplier: modifiers.speed,
        };

        for entity in self.pool.iter_mut() {
            let control = if entity.is_craft() {
                propulsion
            } else {
                Propulsion::COAST
            };
            self.kinematics.integrate(entity, dt, control);
        }

        self.resolve_collisions();
        self.account_energy(dt, modifiers.drain);

        self.pool.compact();
        if self.craft.is_some_and(|id| self.pool.get(id).is_none()) {
            self.craft = None;
        }

        self.pool.validate(self.frame).map_err(|err| {
            tracing::error!(error = %err, frame = self.frame, "population integrity violated");
            err
        })
    }

    fn resolve_collisions(&mut self) {
        let report = self.collisions.detect_and_resolve(
            &mut self.pool,
            CollisionContext {
                fragmentation: &self.fragmentation,
                economy: &mut self.economy,
                rng: &mut self.rng,
                craft_invulnerable: self.invulnerable_for > 0.0,
            },
        );

        self.score = self.score.saturating_add(report.score);
        self.fragments_destroyed += report.fragments_destroyed;

        for event in report.events {
            match event {
                CollisionEvent::FragmentDestroyed {
                    fragment,
                    tier,
                    score,
                    spawned,
                    ..
                } => {
                    self.push_event(SimEvent::FragmentDestroyed {
                        id: fragment,
                        tier,
                        score,
                    });
                    for (id, kind) in spawned {
                        if let Some(tier) = kind.resource_tier() {
                            self.push_event(SimEvent::ResourceSpawned { id, tier });
                        }
                    }
                }
                CollisionEvent::CraftDestroyed { craft, .. } => {
                    self.push_event(SimEvent::CraftDestroyed { id: craft });
                    self.transition(self.craft_state.destroyed());
                    tracing::info!(craft = %craft, score = self.score, frame = self.frame, "session over");
                }
                CollisionEvent::ResourceCollected { tier, credits, .. } => {
                    let new_total = self.economy.ledger().total;
                    self.push_event(SimEvent::ResourceCollected {
                        tier,
                        credits,
                        new_total,
                    });
                }
            }
        }
    }

    fn account_energy(&mut self, dt: f64, drain: f64) {
        if self.craft_state.is_terminal() {
            return;
        }
        let thrusting = self.craft_state.is_thrusting();
        let Some(energy) = self
            .craft
            .and_then(|id| self.pool.get_mut(id))
            .filter(|craft| craft.active)
            .and_then(Entity::energy_mut)
        else {
            return;
        };
        if thrusting {
            self.economy.apply_thrust_cost(energy, dt, drain);
        } else {
            self.economy.apply_regen(energy, dt);
        }
        self.update_craft_state();
    }

    fn update_craft_state(&mut self) {
        let Some(energy) = self.craft_energy() else {
            return;
        };
        let next = self
            .economy
            .next_state(self.craft_state, self.controls.thrust, energy);
        self.transition(next);
    }

    fn transition(&mut self, next: CraftState) {
        let from = self.craft_state;
        if from == next {
            return;
        }
        self.craft_state = next;
        tracing::debug!(from = %from, to = %next, "craft state changed");
        self.push_event(SimEvent::StateChanged { from, to: next });
    }

    fn apply_rotation(&mut self) {
        let rate = self.controls.rotation.sign() * self.config.craft.rotation_speed;
        let terminal = self.craft_state.is_terminal();
        if let Some(craft) = self.craft.and_then(|id| self.pool.get_mut(id)) {
            craft.angular_velocity = if terminal { 0.0 } else { rate };
        }
    }

    fn craft_entity(&self) -> Option<&Entity> {
        self.craft
            .and_then(|id| self.pool.get(id))
            .filter(|craft| craft.active)
    }

    fn craft_energy(&self) -> Option<Energy> {
        self.craft_entity().and_then(Entity::energy)
    }

    fn populate(&mut self) {
        let population = self.config.population.clone();
        if population.spawn_craft {
            self.spawn_craft(self.space.center());
        }
        for _ in 0..population.large_fragments {
            let position = self.pick_fragment_position(&population);
            let request = SpawnRequest::drifting(FragmentTier::Large, position, &mut self.rng);
            self.pool.spawn(request);
        }
    }

    /// Uniform spot inside the padded arena, re-rolled while it is too close
    /// to the craft. Gives up after a bounded number of tries and keeps the
    /// last roll.
    fn pick_fragment_position(&mut self, population: &crate::config::PopulationConfig) -> Vec2 {
        let pad = population.edge_padding;
        let craft_position = self.craft_entity().map(|craft| craft.position);
        let mut position = self.space.center();
        for _ in 0..SPAWN_MAX_ATTEMPTS {
            position = Vec2::new(
                self.rng.range_f64(pad, self.space.width() - pad),
                self.rng.range_f64(pad, self.space.height() - pad),
            );
            match craft_position {
                Some(craft) if self.space.distance(craft, position) <= population.craft_clearance => {}
                _ => break,
            }
        }
        position
    }

    fn push_event(&mut self, event: SimEvent) {
        if self.events.len() >= EVENT_BACKLOG {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    #[cfg(test)]
    pub(crate) fn pool_mut(&mut self) -> &mut EntityPool {
        &mut self.pool
    }
}
