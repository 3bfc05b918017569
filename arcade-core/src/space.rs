use crate::config::ArenaConfig;
use crate::math::Vec2;

/// Fixed-size toroidal arena: leaving one edge re-enters at the opposite one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToroidalSpace {
    width: f64,
    height: f64,
}

impl ToroidalSpace {
    pub fn new(arena: &ArenaConfig) -> Self {
        Self {
            width: arena.width,
            height: arena.height,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn contains(&self, position: Vec2) -> bool {
        (0.0..self.width).contains(&position.x) && (0.0..self.height).contains(&position.y)
    }

    pub fn wrap(&self, position: Vec2) -> Vec2 {
        Vec2::new(wrap_axis(position.x, self.width), wrap_axis(position.y, self.height))
    }

    /// Minimum-image displacement from `from` to `to`.
    pub fn shortest_delta(&self, from: Vec2, to: Vec2) -> Vec2 {
        Vec2::new(
            shortest_axis(to.x - from.x, self.width),
            shortest_axis(to.y - from.y, self.height),
        )
    }

    pub fn distance(&self, a: Vec2, b: Vec2) -> f64 {
        self.shortest_delta(a, b).length()
    }

    /// Render-only duplicates of a body whose extent (`radius + margin`)
    /// crosses an edge. At most two offsets per axis plus their diagonal
    /// combinations, so never more than eight.
    pub fn ghost_positions(&self, position: Vec2, radius: f64, margin: f64) -> Vec<Vec2> {
        let reach = radius + margin;
        let x_shifts = edge_shifts(position.x, reach, self.width);
        let y_shifts = edge_shifts(position.y, reach, self.height);

        let mut ghosts = Vec::with_capacity(x_shifts.len() + y_shifts.len() * (1 + x_shifts.len()));
        for dx in &x_shifts {
            ghosts.push(Vec2::new(position.x + dx, position.y));
        }
        for dy in &y_shifts {
            ghosts.push(Vec2::new(position.x, position.y + dy));
        }
        for dx in &x_shifts {
            for dy in &y_shifts {
                ghosts.push(Vec2::new(position.x + dx, position.y + dy));
            }
        }
        ghosts
    }
}

#[inline]
fn wrap_axis(value: f64, dimension: f64) -> f64 {
    let wrapped = value.rem_euclid(dimension);
    // rem_euclid rounds to `dimension` for values a hair below zero.
    if wrapped >= dimension {
        0.0
    } else {
        wrapped
    }
}

#[inline]
fn shortest_axis(delta: f64, dimension: f64) -> f64 {
    let half = dimension * 0.5;
    let mut d = delta.rem_euclid(dimension);
    if d > half {
        d -= dimension;
    }
    d
}

fn edge_shifts(coord: f64, reach: f64, dimension: f64) -> Vec<f64> {
    let mut shifts = Vec::with_capacity(2);
    if coord < reach {
        shifts.push(dimension);
    }
    if coord > dimension - reach {
        shifts.push(-dimension);
    }
    shifts
}
