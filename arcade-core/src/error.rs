use core::fmt;

use crate::entity::{EntityId, EntityKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegrityRule {
    DuplicateId,
    OutOfOrderId,
    PositionOutOfBounds,
    NonFiniteState,
    NonPositiveShape,
}

impl fmt::Display for IntegrityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId => write!(f, "DUPLICATE_ID"),
            Self::OutOfOrderId => write!(f, "OUT_OF_ORDER_ID"),
            Self::PositionOutOfBounds => write!(f, "POSITION_OUT_OF_BOUNDS"),
            Self::NonFiniteState => write!(f, "NON_FINITE_STATE"),
            Self::NonPositiveShape => write!(f, "NON_POSITIVE_SHAPE"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    InvalidSpawnParameters {
        kind: EntityKind,
        radius: f64,
        mass: f64,
    },
    PopulationIntegrity {
        frame: u64,
        entity: EntityId,
        rule: IntegrityRule,
    },
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}

impl SimError {
    /// Only integrity violations are unrecoverable; everything else is
    /// handled where it is raised.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PopulationIntegrity { .. })
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpawnParameters { kind, radius, mass } => write!(
                f,
                "invalid spawn parameters for {kind}: radius={radius}, mass={mass}"
            ),
            Self::PopulationIntegrity {
                frame,
                entity,
                rule,
            } => write!(
                f,
                "population integrity violation at frame {frame}: {rule} (entity {entity})"
            ),
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid config field `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for SimError {}
