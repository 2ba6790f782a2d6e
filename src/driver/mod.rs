//! Frame loop
//!
//! Each tick rebuilds the whole entity tree, resolves collisions and redraws
//! every entity. There is no diffing; the backend surface is created lazily
//! from the first tree's canvas entity.

pub mod scheduler;

pub use scheduler::{FixedRateScheduler, FrameScheduler, ImmediateScheduler};

use std::cell::Cell;
use std::rc::Rc;

use crate::draw::{DrawBackend, collision_bound_commands, tree_commands};
use crate::entity::{Entity, EntityKind};
use crate::error::Result;
use crate::runtime::{Hooks, Runtime};
use crate::settings::Settings;

/// Cooperative stop flag; clones share the same flag
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub index: u64,
    /// Entities in the built tree
    pub entities: usize,
    /// Draw commands sent to the backend
    pub commands: usize,
    /// Intersecting pairs dispatched to handlers
    pub collisions: usize,
    /// Commands the backend failed to draw
    pub draw_errors: usize,
}

/// Runs a tree-builder against a backend, one tick per frame
pub struct Driver<B: DrawBackend, S: FrameScheduler> {
    runtime: Runtime,
    backend: B,
    scheduler: S,
    settings: Settings,
    stop: StopHandle,
    ticks: u64,
}

impl<B: DrawBackend, S: FrameScheduler> Driver<B, S> {
    pub fn new(backend: B, scheduler: S, settings: Settings) -> Self {
        Self {
            runtime: Runtime::new(),
            backend,
            scheduler,
            settings,
            stop: StopHandle::new(),
            ticks: 0,
        }
    }

    /// Handle that ends [`Driver::run`] before the next tick
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ticks completed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Build, resolve and draw one frame.
    ///
    /// Builder and validation errors abort the tick before anything is drawn.
    pub fn tick<F>(&mut self, builder: F) -> Result<TickReport>
    where
        F: FnOnce(&mut Runtime) -> Result<Entity>,
    {
        let delta = self.scheduler.next_frame();
        self.runtime.begin_tick(delta);

        let tree = builder(&mut self.runtime)?;
        tree.validate()?;
        let collisions = self.runtime.end_tick();

        let mut commands = tree_commands(&tree);
        if self.settings.draw_collision_bounds {
            commands.extend(collision_bound_commands(
                self.runtime.collisions().entries(),
                &self.settings.collision_bound_color,
                self.settings.collision_bound_line_width,
            ));
        }

        if !self.backend.has_surface() {
            let (width, height) = match tree.find(EntityKind::Canvas) {
                Some(canvas) => (canvas.size.x as u32, canvas.size.y as u32),
                None => (self.settings.canvas_width, self.settings.canvas_height),
            };
            log::info!("Creating {}x{} drawing surface", width, height);
            self.backend.create_surface(width, height);
        }

        self.backend.begin_frame();
        let mut draw_errors = 0;
        for command in &commands {
            if let Err(e) = self.backend.draw(command) {
                log::warn!("Draw failed on tick {}: {:?}", self.runtime.tick_info().index, e);
                draw_errors += 1;
            }
        }
        self.backend.end_frame();

        self.ticks += 1;
        Ok(TickReport {
            index: self.runtime.tick_info().index,
            entities: tree.count(),
            commands: commands.len(),
            collisions,
            draw_errors,
        })
    }

    /// Tick until stopped, `max_ticks` is reached or the builder fails.
    ///
    /// Effect cleanups run on the way out either way.
    pub fn run<F>(&mut self, mut builder: F) -> Result<u64>
    where
        F: FnMut(&mut Runtime) -> Result<Entity>,
    {
        log::info!("Driver starting");
        let result = self.run_loop(&mut builder);
        self.runtime.teardown();

        match &result {
            Ok(ticks) => log::info!("Driver stopped after {} ticks", ticks),
            Err(e) => log::error!("Driver aborted on tick {}: {}", self.runtime.tick_info().index, e),
        }
        result
    }

    fn run_loop<F>(&mut self, builder: &mut F) -> Result<u64>
    where
        F: FnMut(&mut Runtime) -> Result<Entity>,
    {
        let start = self.ticks;
        loop {
            if self.stop.is_stopped() {
                break;
            }
            if let Some(max) = self.settings.max_ticks {
                if self.ticks - start >= max {
                    break;
                }
            }

            let report = self.tick(&mut *builder)?;
            if report.collisions > 0 {
                log::debug!("Tick {}: {} collision pairs dispatched", report.index, report.collisions);
            }
            log::trace!("{:?}", report);
        }
        Ok(self.ticks - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionBody, CollisionDetail, ShapeKind};
    use crate::draw::{DrawCommand, RecordingBackend};
    use crate::error::RuntimeError;
    use crate::runtime::cleanup;
    use glam::Vec2;
    use std::time::Duration;

    fn driver(settings: Settings) -> Driver<RecordingBackend, ImmediateScheduler> {
        Driver::new(RecordingBackend::new(), ImmediateScheduler::default(), settings)
    }

    fn counter_scene(rt: &mut Runtime) -> Result<Entity> {
        let (n, set_n) = rt.use_state(0)?;
        set_n.update(|n| n + 1);
        Ok(Entity::canvas(300, 200).child(
            Entity::background("#dadada")
                .child(Entity::text(10.0, 10.0).child("n=").child(n))
                .child(Entity::rect(0.0, 0.0, 5.0, 5.0).fill("black")),
        ))
    }

    /// Fails on every filled rectangle
    #[derive(Default)]
    struct FlakyBackend {
        surfaces: usize,
        drawn: usize,
    }

    impl DrawBackend for FlakyBackend {
        type Error = String;

        fn has_surface(&self) -> bool {
            self.surfaces > 0
        }

        fn create_surface(&mut self, _width: u32, _height: u32) {
            self.surfaces += 1;
        }

        fn begin_frame(&mut self) {}

        fn draw(&mut self, command: &DrawCommand) -> std::result::Result<(), String> {
            if matches!(command, DrawCommand::FillRect { .. }) {
                return Err("rect unsupported".into());
            }
            self.drawn += 1;
            Ok(())
        }
    }

    #[test]
    fn test_tick_draws_tree() {
        let mut driver = driver(Settings::default());
        let report = driver.tick(counter_scene).unwrap();
        assert_eq!(report.index, 1);
        assert_eq!(report.entities, 4);
        assert_eq!(report.commands, 3);
        assert_eq!(driver.backend().surface(), Some((300, 200)));

        driver.tick(counter_scene).unwrap();
        let text = driver.backend().frame().iter().find_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.clone()),
            _ => None,
        });
        assert_eq!(text.as_deref(), Some("n=1"));
    }

    #[test]
    fn test_surface_falls_back_to_settings() {
        let mut driver = driver(Settings::default());
        driver.tick(|_| Ok(Entity::fragment())).unwrap();
        assert_eq!(driver.backend().surface(), Some((450, 650)));
    }

    #[test]
    fn test_draw_errors_are_not_fatal() {
        let mut driver = Driver::new(FlakyBackend::default(), ImmediateScheduler::default(), Settings::default());
        for _ in 0..3 {
            let report = driver.tick(counter_scene).unwrap();
            assert_eq!(report.draw_errors, 1);
        }
        assert_eq!(driver.backend().surfaces, 1);
        assert_eq!(driver.backend().drawn, 6);
    }

    #[test]
    fn test_invalid_tree_aborts_before_drawing() {
        let mut driver = driver(Settings::default());
        let err = driver
            .tick(|_| Ok(Entity::canvas(10, 10).child(Entity::text(0.0, 0.0).child(Entity::fragment()))))
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::TextContent {
                found: EntityKind::Fragment
            }
        );
        assert_eq!(driver.backend().frames(), 0);
        assert!(!driver.backend().has_surface());
    }

    #[test]
    fn test_invalid_tree_skips_collision_handlers() {
        let fired = Rc::new(Cell::new(false));
        let mut driver = driver(Settings::default());
        let flag = fired.clone();
        let err = driver
            .tick(move |rt| {
                let body = CollisionBody::new(ShapeKind::Box, Vec2::ZERO, Vec2::splat(4.0));
                rt.use_collision(
                    body,
                    CollisionDetail::new("a", ShapeKind::Box).on_collision(move |_| flag.set(true)),
                )?;
                rt.use_collision(body, CollisionDetail::new("b", ShapeKind::Box))?;
                Ok(Entity::canvas(10, 10).child(Entity::text(0.0, 0.0).child(Entity::rect(0.0, 0.0, 1.0, 1.0))))
            })
            .unwrap_err();

        assert!(matches!(err, RuntimeError::TextContent { found: EntityKind::Box }));
        assert!(!fired.get());
        assert_eq!(driver.runtime().collisions().dispatched_pairs(), 0);
    }

    #[test]
    fn test_run_honours_max_ticks_and_tears_down() {
        let cleaned = Rc::new(Cell::new(false));
        let flag = cleaned.clone();
        let mut driver = driver(Settings {
            max_ticks: Some(4),
            ..Settings::default()
        });

        let ticks = driver
            .run(move |rt| {
                let flag = flag.clone();
                rt.use_effect(&[], move || cleanup(move || flag.set(true)))?;
                counter_scene(rt)
            })
            .unwrap();
        assert_eq!(ticks, 4);
        assert_eq!(driver.ticks(), 4);
        assert!(cleaned.get());
    }

    #[test]
    fn test_stop_from_effect() {
        let mut driver = driver(Settings::default());
        let stop = driver.stop_handle();
        let ticks = driver
            .run(move |rt| {
                let (n, set_n) = rt.use_state(0u32)?;
                set_n.set(n + 1);
                let stop = stop.clone();
                rt.use_effect(&crate::deps![n >= 5], move || {
                    if n >= 5 {
                        stop.stop();
                    }
                })?;
                Ok(Entity::canvas(10, 10))
            })
            .unwrap();
        assert_eq!(ticks, 6);
    }

    #[test]
    fn test_fatal_error_ends_run() {
        let cleaned = Rc::new(Cell::new(false));
        let flag = cleaned.clone();
        let mut driver = driver(Settings::default());
        let err = driver
            .run(move |rt| {
                let (n, set_n) = rt.use_state(0)?;
                set_n.set(n + 1);
                let flag = flag.clone();
                rt.use_effect(&[], move || cleanup(move || flag.set(true)))?;
                if n == 2 {
                    // A different dependency count at the same position
                    rt.use_memo(&crate::deps![1, 2], || 0)?;
                } else {
                    rt.use_memo(&crate::deps![1], || 0)?;
                }
                Ok(Entity::canvas(10, 10))
            })
            .unwrap_err();
        assert!(matches!(err, RuntimeError::DependencyArity { expected: 1, found: 2, .. }));
        assert_eq!(driver.ticks(), 2);
        assert!(cleaned.get());
    }

    #[test]
    fn test_collision_bounds_overlay() {
        let mut driver = driver(Settings {
            draw_collision_bounds: true,
            ..Settings::default()
        });
        let scene = |rt: &mut Runtime| {
            rt.use_collision(
                CollisionBody::new(ShapeKind::Box, Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)),
                CollisionDetail::new("a", ShapeKind::Box),
            )?;
            Ok(Entity::canvas(10, 10))
        };
        let report = driver.tick(scene).unwrap();
        assert_eq!(report.commands, 1);
        assert_eq!(
            driver.backend().frame(),
            &[DrawCommand::StrokeRect {
                min: Vec2::new(1.0, 1.0),
                size: Vec2::new(2.0, 2.0),
                color: "blue".into(),
                line_width: 4.0,
            }]
        );
    }

    #[test]
    fn test_tick_info_tracks_scheduler() {
        let mut driver = Driver::new(
            RecordingBackend::new(),
            ImmediateScheduler::new(Duration::from_millis(10)),
            Settings::default(),
        );
        let mut deltas = Vec::new();
        for _ in 0..3 {
            driver
                .tick(|rt| {
                    deltas.push(rt.tick_info().delta);
                    Ok(Entity::canvas(1, 1))
                })
                .unwrap();
        }
        assert_eq!(deltas, vec![Duration::ZERO, Duration::from_millis(10), Duration::from_millis(10)]);
    }
}
