//! Redraw demo entry point
//!
//! Plays a headless brick-breaker scene through the driver. Pass a settings
//! JSON path as the first argument; `"target_fps": 0` runs unpaced.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use redraw::collision::{CollisionEventData, CollisionHandler};
use redraw::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use redraw::{
    Animator, AnimatorParams, BoundingBox, CollisionBody, CollisionDetail, Driver, Entity, FixedRateScheduler,
    FrameScheduler, Handle, Hooks, ImmediateScheduler, RecordingBackend, Result, Settings, ShapeKind, StateSetter,
    StopHandle, deps, use_animator, use_camera_bound,
};

const SEED: u64 = 0x5EED;
/// Ticks to play when the settings leave it open
const DEFAULT_TICKS: u64 = 600;

const WIDTH: f32 = DEFAULT_CANVAS_WIDTH as f32;
const HEIGHT: f32 = DEFAULT_CANVAS_HEIGHT as f32;

const START_LIVES: u32 = 3;

const BALL_DIAMETER: f32 = 12.0;
const BALL_SPEED: f32 = 300.0;
const BALL_START: Vec2 = Vec2::new(WIDTH / 2.0, 560.0);

const PADDLE_WIDTH: f32 = 80.0;
const PADDLE_HEIGHT: f32 = 12.0;
const PADDLE_Y: f32 = 610.0;
const PADDLE_SPEED: f32 = 400.0;
/// Paddle velocity per pixel of distance to the ball
const PADDLE_CATCH_UP: f32 = 10.0;

const BRICK_ROWS: usize = 6;
const BRICK_COLS: usize = 10;
const BRICK_WIDTH: f32 = 40.0;
const BRICK_HEIGHT: f32 = 16.0;
const BRICK_GAP: f32 = 4.0;
const BRICK_LEFT: f32 = 7.0;
const BRICK_TOP: f32 = 80.0;
const ROW_COLORS: [&str; 6] = ["#e74c3c", "#e67e22", "#f1c40f", "#2ecc71", "#3498db", "#9b59b6"];

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Redraw demo starting...");

    let mut settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if settings.max_ticks.is_none() {
        settings.max_ticks = Some(DEFAULT_TICKS);
    }

    let result = if settings.target_fps == 0 {
        play(ImmediateScheduler::default(), settings)
    } else {
        play(FixedRateScheduler::from_fps(settings.target_fps), settings)
    };

    if let Err(e) = result {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn play<S: FrameScheduler>(scheduler: S, settings: Settings) -> Result<()> {
    let mut driver = Driver::new(RecordingBackend::new(), scheduler, settings);
    let stop = driver.stop_handle();
    let ticks = driver.run(|rt| scene(rt, &stop))?;

    log::info!("Played {} ticks", ticks);
    match driver.backend().frame_json() {
        Ok(json) => log::debug!("Last frame: {}", json),
        Err(e) => log::warn!("Could not dump last frame: {}", e),
    }
    Ok(())
}

fn scene<H: Hooks>(rt: &mut H, stop: &StopHandle) -> Result<Entity> {
    let dt = rt.tick_info().delta.as_secs_f32();

    let (lives, set_lives) = rt.use_state(START_LIVES)?;
    let (score, set_score) = rt.use_state(0u32)?;

    let rng = rt.use_handle::<Pcg32>()?;
    if !rng.is_set() {
        rng.set(Pcg32::seed_from_u64(SEED));
    }

    let (ball, ball_x) = ball(rt, &rng, dt, &set_lives)?;
    let paddle = paddle(rt, ball_x)?;

    let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLS);
    for row in 0..BRICK_ROWS {
        for col in 0..BRICK_COLS {
            if let Some(brick) = brick(rt, row, col, &set_score)? {
                bricks.push(brick);
            }
        }
    }

    let over = lives == 0 || score as usize == BRICK_ROWS * BRICK_COLS;
    let stop = stop.clone();
    rt.use_effect(&deps![over], move || {
        if over {
            log::info!("Game over: score {}, lives {}", score, lives);
            stop.stop();
        }
    })?;

    let label = rt.use_memo(&deps![score, lives], || format!("Score: {}  Lives: {}", score, lives))?;

    Ok(Entity::canvas(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT).child(
        Entity::background("#dadada")
            .child(Entity::text(12.0, 24.0).fill("#333").child(label))
            .child(ball)
            .child(paddle)
            .children(bricks),
    ))
}

/// Returns the ball entity and its x position
fn ball<H: Hooks>(
    rt: &mut H,
    rng: &Handle<Pcg32>,
    dt: f32,
    set_lives: &StateSetter<u32>,
) -> Result<(Entity, f32)> {
    let radius = BALL_DIAMETER / 2.0;
    // Open at the bottom so a missed ball drops out of view
    let walls = BoundingBox::new(Some((radius, WIDTH - radius)), Some((radius, f32::INFINITY))).bounce();
    let ball = use_animator(rt, AnimatorParams::new(BALL_START).with_bounds(walls))?;
    if ball.velocity == Vec2::ZERO {
        ball.set_velocity(serve(rng));
    }

    let on_hit = {
        let ball = ball.clone();
        rt.use_callback(&[], move |event: &CollisionEventData| bounce(&ball, event))?
    };
    let handler: CollisionHandler = on_hit;
    rt.use_collision(
        CollisionBody::new(ShapeKind::Circle, ball.position, Vec2::splat(BALL_DIAMETER))
            .with_velocity(ball.velocity * dt),
        CollisionDetail::new("ball", ShapeKind::Circle).with_handler(handler),
    )?;

    use_camera_bound(rt, ball.position, Vec2::new(WIDTH, HEIGHT + radius), |edges| {
        if edges.bottom {
            set_lives.update(|n| n.saturating_sub(1));
            ball.set_position(BALL_START);
            ball.set_velocity(serve(rng));
        }
    })?;

    let pos = ball.position;
    Ok((Entity::circle(pos.x, pos.y, BALL_DIAMETER).fill("#222"), pos.x))
}

fn serve(rng: &Handle<Pcg32>) -> Vec2 {
    let angle = rng.with(|rng| rng.map_or(0.0, |rng| rng.random_range(-0.5f32..0.5)));
    Vec2::new(angle.sin(), -angle.cos()) * BALL_SPEED
}

fn bounce(ball: &Animator, event: &CollisionEventData) {
    let bounds = event.source.bounds;
    let other = event.target.bounds;
    let ball_center = (bounds.min + bounds.max) / 2.0;
    let other_center = (other.min + other.max) / 2.0;

    match event.target.detail.name.as_str() {
        "paddle" => ball.update_velocity(|v| {
            // Steer by where the ball lands on the paddle
            let offset = ((ball_center.x - other_center.x) / (PADDLE_WIDTH / 2.0)).clamp(-1.0, 1.0);
            Vec2::new(offset * 0.7, -1.0).normalize() * v.length().max(BALL_SPEED)
        }),
        "brick" => {
            if ball_center.x >= other.min.x && ball_center.x <= other.max.x {
                if ball_center.y < other_center.y {
                    ball.bounce_up();
                } else {
                    ball.bounce_down();
                }
            } else if ball_center.x < other_center.x {
                ball.bounce_left();
            } else {
                ball.bounce_right();
            }
        }
        _ => {}
    }
}

/// Follows the ball at a capped speed
fn paddle<H: Hooks>(rt: &mut H, target_x: f32) -> Result<Entity> {
    let half = PADDLE_WIDTH / 2.0;
    let paddle = use_animator(
        rt,
        AnimatorParams::new(Vec2::new(WIDTH / 2.0, PADDLE_Y))
            .with_max_speed(PADDLE_SPEED)
            .with_bounds(BoundingBox::new(Some((half, WIDTH - half)), None)),
    )?;
    let x = paddle.position.x;
    paddle.set_velocity(Vec2::new((target_x - x) * PADDLE_CATCH_UP, 0.0));

    let left = x - half;
    let size = Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT);
    let hit = rt.use_collision(
        CollisionBody::new(ShapeKind::Box, Vec2::new(left, PADDLE_Y), size),
        CollisionDetail::new("paddle", ShapeKind::Box),
    )?;

    let fill = if hit.is_collided() { "#c0392b" } else { "#333" };
    Ok(Entity::rect(left, PADDLE_Y, size.x, size.y).fill(fill))
}

fn brick<H: Hooks>(rt: &mut H, row: usize, col: usize, set_score: &StateSetter<u32>) -> Result<Option<Entity>> {
    let (alive, set_alive) = rt.use_state(true)?;
    let position = Vec2::new(
        BRICK_LEFT + col as f32 * (BRICK_WIDTH + BRICK_GAP),
        BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
    );
    let size = Vec2::new(BRICK_WIDTH, BRICK_HEIGHT);

    let hit = rt.use_collision_when(
        alive,
        CollisionBody::new(ShapeKind::Box, position, size),
        CollisionDetail::new("brick", ShapeKind::Box),
    )?;
    let color = rt.use_memo(&deps![row], || ROW_COLORS[row % ROW_COLORS.len()].to_owned())?;

    if !alive {
        return Ok(None);
    }
    if !hit.collided_with("ball").is_empty() {
        log::debug!("Brick ({}, {}) destroyed", row, col);
        set_alive.set(false);
        set_score.update(|s| s + 1);
    }

    Ok(Some(
        Entity::rect(position.x, position.y, size.x, size.y).fill(color).stroke("#fff"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraw::DrawCommand;

    fn headless(max_ticks: u64) -> Driver<RecordingBackend, ImmediateScheduler> {
        Driver::new(
            RecordingBackend::new(),
            ImmediateScheduler::default(),
            Settings {
                max_ticks: Some(max_ticks),
                ..Settings::default()
            },
        )
    }

    #[test]
    fn test_first_frame_layout() {
        let mut driver = headless(1);
        let stop = driver.stop_handle();
        let report = driver.tick(|rt| scene(rt, &stop)).unwrap();

        // background, label, ball, paddle, then fill and stroke per brick
        assert_eq!(report.commands, 4 + 2 * BRICK_ROWS * BRICK_COLS);
        let label = driver.backend().frame().iter().find_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.clone()),
            _ => None,
        });
        assert_eq!(label.as_deref(), Some("Score: 0  Lives: 3"));
    }

    #[test]
    fn test_scene_keeps_call_order() {
        let mut driver = headless(300);
        let stop = driver.stop_handle();
        let slots = {
            driver.tick(|rt| scene(rt, &stop)).unwrap();
            driver.runtime().slot_count()
        };
        driver.run(|rt| scene(rt, &stop)).unwrap();
        assert!(driver.ticks() > 1);
        // scene 3, ball 5, paddle 3, three per brick, effect and label
        assert_eq!(slots, 3 + 5 + 3 + BRICK_ROWS * BRICK_COLS * 3 + 2);
    }
}
