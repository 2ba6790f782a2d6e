//! Axis-aligned boxes and the narrow-phase test

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// How a body's position and size map onto its box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Position is the top-left corner
    #[default]
    Box,
    /// Position is the centre, size is the full extent
    Circle,
}

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CollisionBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl CollisionBox {
    pub const ZERO: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    /// Build a box, rejecting non-finite corners and `min > max` on either axis
    pub fn new(min: Vec2, max: Vec2) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min.x > max.x || min.y > max.y {
            return Err(RuntimeError::InvalidBox { min, max });
        }
        Ok(Self { min, max })
    }

    /// The region covered by one tick of motion at `velocity`.
    ///
    /// Each axis spans `[0, v]` for positive components and `[v, 0]` otherwise.
    pub fn swept(velocity: Vec2) -> Self {
        Self {
            min: velocity.min(Vec2::ZERO),
            max: velocity.max(Vec2::ZERO),
        }
    }

    /// Component-wise sum: mins add, maxes add
    pub fn offset_by(&self, other: &CollisionBox) -> Self {
        Self {
            min: self.min + other.min,
            max: self.max + other.max,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Broad-phase sort key: distance of the min corner from the origin
    #[inline]
    pub fn broad_phase_key(&self) -> f32 {
        self.min.length()
    }
}

/// Result of an overlap test between two boxes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub intersects: bool,
    /// `|b.min - a.max|` per axis, reported whether or not the boxes overlap
    pub distance: Vec2,
}

/// Narrow-phase overlap test.
///
/// Boxes that exactly touch on an edge intersect; only a strictly positive gap
/// on some axis separates them.
pub fn check_intersection(a: &CollisionBox, b: &CollisionBox) -> Intersection {
    let d1 = b.min - a.max;
    let d2 = a.min - b.max;
    let separated = d1.x > 0.0 || d1.y > 0.0 || d2.x > 0.0 || d2.y > 0.0;
    Intersection {
        intersects: !separated,
        distance: d1.abs(),
    }
}

/// Geometry of a registrant for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBody {
    pub shape: ShapeKind,
    pub position: Vec2,
    /// Width and height
    pub size: Vec2,
    pub velocity: Vec2,
    /// Extra box summed into the body box, for hit areas that differ from the drawn shape
    pub offset: CollisionBox,
}

impl CollisionBody {
    pub fn new(shape: ShapeKind, position: Vec2, size: Vec2) -> Self {
        Self {
            shape,
            position,
            size,
            velocity: Vec2::ZERO,
            offset: CollisionBox::ZERO,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_offset(mut self, offset: CollisionBox) -> Self {
        self.offset = offset;
        self
    }

    /// Box of the shape alone, before offset and sweep
    pub fn body_box(&self) -> Result<CollisionBox> {
        match self.shape {
            ShapeKind::Box => CollisionBox::new(self.position, self.position + self.size),
            ShapeKind::Circle => {
                let half = self.size / 2.0;
                CollisionBox::new(self.position - half, self.position + half)
            }
        }
    }

    /// Box used by the collision pass: shape box + offset + swept motion
    pub fn bounds(&self) -> Result<CollisionBox> {
        let shaped = self.body_box()?.offset_by(&self.offset);
        let swept = shaped.offset_by(&CollisionBox::swept(self.velocity));
        CollisionBox::new(swept.min, swept.max)
    }
}
