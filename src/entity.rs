//! Entity descriptor tree returned by tree-builders
//!
//! Entities carry a kind tag and a flat attribute set. The tree is rebuilt
//! from scratch every tick and handed to the drawing backend as-is; there is
//! no diffing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, RuntimeError};

/// Kind tag of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Root drawing surface; its size is used when the surface is created
    Canvas,
    /// Fills the whole surface
    Background,
    Box,
    /// Position is the centre, `size.x` the diameter
    Circle,
    /// Draws its text and number children as one string
    Text,
    /// Groups children without drawing anything
    Fragment,
}

/// Drawing attributes; `None` falls back to the per-kind default
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Style {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub line_width: Option<f32>,
    pub font: Option<String>,
}

impl Style {
    /// Per-kind defaults for unset attributes
    pub fn defaults_for(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Background => Self {
                fill: Some(DEFAULT_BACKGROUND.to_owned()),
                ..Self::default()
            },
            EntityKind::Text => Self {
                fill: Some(DEFAULT_TEXT_FILL.to_owned()),
                line_width: Some(DEFAULT_LINE_WIDTH),
                font: Some(DEFAULT_FONT.to_owned()),
                ..Self::default()
            },
            EntityKind::Box | EntityKind::Circle => Self {
                line_width: Some(DEFAULT_LINE_WIDTH),
                ..Self::default()
            },
            EntityKind::Canvas | EntityKind::Fragment => Self::default(),
        }
    }

    /// Fill unset attributes from `defaults`
    pub fn or(&self, defaults: &Style) -> Self {
        Self {
            fill: self.fill.clone().or_else(|| defaults.fill.clone()),
            stroke: self.stroke.clone().or_else(|| defaults.stroke.clone()),
            line_width: self.line_width.or(defaults.line_width),
            font: self.font.clone().or_else(|| defaults.font.clone()),
        }
    }
}

/// A child of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Entity(Entity),
    Text(String),
    Number(f64),
}

impl From<Entity> for Node {
    fn from(entity: Entity) -> Self {
        Node::Entity(entity)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_owned())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

macro_rules! number_node {
    ($($t:ty),*) => {
        $(impl From<$t> for Node {
            fn from(n: $t) -> Self {
                Node::Number(n as f64)
            }
        })*
    };
}

number_node!(i32, i64, u32, u64, usize, f32, f64);

/// One node of the tree a builder returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Vec2,
    pub size: Vec2,
    pub style: Style,
    pub children: Vec<Node>,
}

impl Entity {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            style: Style::default(),
            children: Vec::new(),
        }
    }

    pub fn canvas(width: u32, height: u32) -> Self {
        let mut canvas = Self::new(EntityKind::Canvas);
        canvas.size = Vec2::new(width as f32, height as f32);
        canvas
    }

    pub fn background(color: impl Into<String>) -> Self {
        Self::new(EntityKind::Background).fill(color)
    }

    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut rect = Self::new(EntityKind::Box);
        rect.position = Vec2::new(x, y);
        rect.size = Vec2::new(width, height);
        rect
    }

    pub fn circle(x: f32, y: f32, diameter: f32) -> Self {
        let mut circle = Self::new(EntityKind::Circle);
        circle.position = Vec2::new(x, y);
        circle.size = Vec2::splat(diameter);
        circle
    }

    pub fn text(x: f32, y: f32) -> Self {
        let mut text = Self::new(EntityKind::Text);
        text.position = Vec2::new(x, y);
        text
    }

    pub fn fragment() -> Self {
        Self::new(EntityKind::Fragment)
    }

    pub fn fill(mut self, color: impl Into<String>) -> Self {
        self.style.fill = Some(color.into());
        self
    }

    pub fn stroke(mut self, color: impl Into<String>) -> Self {
        self.style.stroke = Some(color.into());
        self
    }

    pub fn line_width(mut self, width: f32) -> Self {
        self.style.line_width = Some(width);
        self
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.style.font = Some(font.into());
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Style with the per-kind defaults applied
    pub fn resolved_style(&self) -> Style {
        self.style.or(&Style::defaults_for(self.kind))
    }

    /// Concatenated text and number children
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                Node::Text(s) => text.push_str(s),
                Node::Number(n) => text.push_str(&n.to_string()),
                Node::Entity(_) => {}
            }
        }
        text
    }

    /// Entity children, skipping text and numbers
    pub fn child_entities(&self) -> impl Iterator<Item = &Entity> {
        self.children.iter().filter_map(|child| match child {
            Node::Entity(entity) => Some(entity),
            _ => None,
        })
    }

    /// Depth-first search for the first entity of `kind`, including `self`
    pub fn find(&self, kind: EntityKind) -> Option<&Entity> {
        if self.kind == kind {
            return Some(self);
        }
        self.child_entities().find_map(|child| child.find(kind))
    }

    /// Number of entities in the tree, including `self`
    pub fn count(&self) -> usize {
        1 + self.child_entities().map(Entity::count).sum::<usize>()
    }

    /// Check content shape: text entities may only hold text and numbers
    pub fn validate(&self) -> Result<()> {
        if self.kind == EntityKind::Text {
            if let Some(found) = self.child_entities().next() {
                return Err(RuntimeError::TextContent { found: found.kind });
            }
            return Ok(());
        }
        self.child_entities().try_for_each(Entity::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_joins_children() {
        let text = Entity::text(26.0, 30.0).children(["Time: "]).child(42).child(" s");
        assert_eq!(text.text_content(), "Time: 42 s");
        assert_eq!(Entity::text(0.0, 0.0).child(1.5).text_content(), "1.5");
    }

    #[test]
    fn test_text_rejects_entity_children() {
        let bad = Entity::canvas(450, 650).child(
            Entity::background("#dadada").child(Entity::text(0.0, 0.0).child(Entity::rect(0.0, 0.0, 1.0, 1.0))),
        );
        assert_eq!(
            bad.validate(),
            Err(RuntimeError::TextContent {
                found: EntityKind::Box
            })
        );

        let good = Entity::canvas(450, 650).child(Entity::text(0.0, 0.0).child("ok"));
        assert_eq!(good.validate(), Ok(()));
    }

    #[test]
    fn test_default_styles() {
        let text = Entity::text(0.0, 0.0).fill("red").resolved_style();
        assert_eq!(text.fill.as_deref(), Some("red"));
        assert_eq!(text.font.as_deref(), Some(DEFAULT_FONT));
        assert_eq!(text.line_width, Some(DEFAULT_LINE_WIDTH));

        let background = Entity::new(EntityKind::Background).resolved_style();
        assert_eq!(background.fill.as_deref(), Some(DEFAULT_BACKGROUND));

        let rect = Entity::rect(0.0, 0.0, 1.0, 1.0).line_width(4.0).resolved_style();
        assert_eq!(rect.line_width, Some(4.0));
        assert_eq!(rect.fill, None);
    }

    #[test]
    fn test_find_and_count() {
        let tree = Entity::fragment().child(
            Entity::canvas(300, 200)
                .child(Entity::circle(1.0, 1.0, 2.0))
                .child(Entity::text(0.0, 0.0).child("x")),
        );
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.find(EntityKind::Canvas).map(|c| c.size), Some(Vec2::new(300.0, 200.0)));
        assert!(tree.find(EntityKind::Background).is_none());
    }

    #[test]
    fn test_serializes_to_json() {
        let tree = Entity::canvas(10, 10).child(Entity::rect(1.0, 2.0, 3.0, 4.0).fill("black"));
        let json = serde_json::to_string(&tree).unwrap();
        let back: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
