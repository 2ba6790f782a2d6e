//! Draw command generation for entity primitives

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionEntry;
use crate::entity::{Entity, EntityKind};

/// One primitive a backend knows how to paint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Fill the whole surface
    FillBackground { color: String },
    FillRect { min: Vec2, size: Vec2, color: String },
    StrokeRect {
        min: Vec2,
        size: Vec2,
        color: String,
        line_width: f32,
    },
    FillCircle { center: Vec2, radius: f32, color: String },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: String,
        line_width: f32,
    },
    Text {
        position: Vec2,
        text: String,
        font: String,
        color: String,
    },
}

/// Append the commands for `entity` alone, not its children
pub fn entity_commands(entity: &Entity, out: &mut Vec<DrawCommand>) {
    let style = entity.resolved_style();
    let line_width = style.line_width.unwrap_or(crate::consts::DEFAULT_LINE_WIDTH);

    match entity.kind {
        EntityKind::Canvas | EntityKind::Fragment => {}
        EntityKind::Background => {
            if let Some(color) = style.fill {
                out.push(DrawCommand::FillBackground { color });
            }
        }
        EntityKind::Text => {
            out.push(DrawCommand::Text {
                position: entity.position,
                text: entity.text_content(),
                font: style.font.unwrap_or_default(),
                color: style.fill.unwrap_or_default(),
            });
        }
        EntityKind::Box => {
            if let Some(color) = style.fill {
                out.push(DrawCommand::FillRect {
                    min: entity.position,
                    size: entity.size,
                    color,
                });
            }
            if let Some(color) = style.stroke {
                out.push(DrawCommand::StrokeRect {
                    min: entity.position,
                    size: entity.size,
                    color,
                    line_width,
                });
            }
        }
        EntityKind::Circle => {
            let radius = entity.size.x / 2.0;
            if let Some(color) = style.fill {
                out.push(DrawCommand::FillCircle {
                    center: entity.position,
                    radius,
                    color,
                });
            }
            if let Some(color) = style.stroke {
                out.push(DrawCommand::StrokeCircle {
                    center: entity.position,
                    radius,
                    color,
                    line_width,
                });
            }
        }
    }
}

/// Commands for the whole tree, parents before children.
///
/// Text children are consumed by their text entity and not visited.
pub fn tree_commands(root: &Entity) -> Vec<DrawCommand> {
    fn walk(entity: &Entity, out: &mut Vec<DrawCommand>) {
        entity_commands(entity, out);
        if entity.kind == EntityKind::Text {
            return;
        }
        for child in entity.child_entities() {
            walk(child, out);
        }
    }

    let mut out = Vec::with_capacity(root.count());
    walk(root, &mut out);
    out
}

/// Outline every registered collision box (debug overlay)
pub fn collision_bound_commands(entries: &[CollisionEntry], color: &str, line_width: f32) -> Vec<DrawCommand> {
    entries
        .iter()
        .map(|entry| DrawCommand::StrokeRect {
            min: entry.bounds.min,
            size: entry.bounds.size(),
            color: color.to_owned(),
            line_width,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionBox, CollisionDetail, EntryId, ShapeKind};

    #[test]
    fn test_box_fill_and_stroke() {
        let mut out = Vec::new();
        entity_commands(
            &Entity::rect(1.0, 2.0, 3.0, 4.0).fill("black").stroke("#FFF").line_width(4.0),
            &mut out,
        );
        assert_eq!(
            out,
            vec![
                DrawCommand::FillRect {
                    min: Vec2::new(1.0, 2.0),
                    size: Vec2::new(3.0, 4.0),
                    color: "black".into()
                },
                DrawCommand::StrokeRect {
                    min: Vec2::new(1.0, 2.0),
                    size: Vec2::new(3.0, 4.0),
                    color: "#FFF".into(),
                    line_width: 4.0
                },
            ]
        );
    }

    #[test]
    fn test_circle_uses_half_size() {
        let mut out = Vec::new();
        entity_commands(&Entity::circle(10.0, 10.0, 24.0).fill("#000"), &mut out);
        assert_eq!(
            out,
            vec![DrawCommand::FillCircle {
                center: Vec2::new(10.0, 10.0),
                radius: 12.0,
                color: "#000".into()
            }]
        );
    }

    #[test]
    fn test_tree_order_and_text() {
        let tree = Entity::canvas(450, 650).child(
            Entity::background("#dadada")
                .child(Entity::text(26.0, 30.0).fill("red").child("Time: ").child(0))
                .child(Entity::fragment().child(Entity::rect(0.0, 0.0, 1.0, 1.0).fill("black"))),
        );
        let commands = tree_commands(&tree);
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0],
            DrawCommand::FillBackground {
                color: "#dadada".into()
            }
        );
        assert_eq!(
            commands[1],
            DrawCommand::Text {
                position: Vec2::new(26.0, 30.0),
                text: "Time: 0".into(),
                font: crate::consts::DEFAULT_FONT.into(),
                color: "red".into(),
            }
        );
        assert!(matches!(commands[2], DrawCommand::FillRect { .. }));
    }

    #[test]
    fn test_collision_bounds_outline() {
        let entries = [CollisionEntry {
            id: EntryId(0),
            bounds: CollisionBox::new(Vec2::new(1.0, 1.0), Vec2::new(4.0, 3.0)).unwrap(),
            detail: CollisionDetail::new("bar", ShapeKind::Box),
        }];
        let commands = collision_bound_commands(&entries, "blue", 2.0);
        assert_eq!(
            commands,
            vec![DrawCommand::StrokeRect {
                min: Vec2::new(1.0, 1.0),
                size: Vec2::new(3.0, 2.0),
                color: "blue".into(),
                line_width: 2.0
            }]
        );
    }
}
