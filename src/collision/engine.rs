//! Per-tick collision registry, broad phase and event dispatch
//!
//! The registry is emptied at the start of every tick. After all bodies are
//! registered, [`CollisionEngine::resolve`] sorts them by the distance of their
//! min corner from the origin and tests only neighbours in that order. Two
//! overlapping bodies that do not end up adjacent are never tested; this keeps
//! the pass at O(n log n) and scenes rely on the resulting pairing order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{CollisionBox, ShapeKind, check_intersection};
use crate::error::{Result, RuntimeError};

/// Identity of a registrant, stable across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

/// Called with the event oriented so that `source` is the subscriber
pub type CollisionHandler = Rc<dyn Fn(&CollisionEventData)>;

/// Descriptive half of an entry
#[derive(Clone)]
pub struct CollisionDetail {
    pub name: String,
    pub shape: ShapeKind,
    pub on_collision: Option<CollisionHandler>,
}

impl CollisionDetail {
    pub fn new(name: impl Into<String>, shape: ShapeKind) -> Self {
        Self {
            name: name.into(),
            shape,
            on_collision: None,
        }
    }

    pub fn on_collision(mut self, handler: impl Fn(&CollisionEventData) + 'static) -> Self {
        self.on_collision = Some(Rc::new(handler));
        self
    }

    /// Use an already shared handler, e.g. one memoized with `use_callback`
    pub fn with_handler(mut self, handler: CollisionHandler) -> Self {
        self.on_collision = Some(handler);
        self
    }
}

impl fmt::Debug for CollisionDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionDetail")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("on_collision", &self.on_collision.is_some())
            .finish()
    }
}

/// One registered body for the current tick
#[derive(Debug, Clone)]
pub struct CollisionEntry {
    pub id: EntryId,
    /// Offset and swept box
    pub bounds: CollisionBox,
    pub detail: CollisionDetail,
}

/// An intersecting pair as seen from `source`
#[derive(Debug, Clone)]
pub struct CollisionEventData {
    pub source: CollisionEntry,
    pub target: CollisionEntry,
    pub distance: Vec2,
}

/// Events per registrant from the last resolve
pub type CollisionResults = HashMap<EntryId, Vec<CollisionEventData>>;

/// Keep only the events whose other side is called `name`
pub fn query_by_name<'a>(events: &'a [CollisionEventData], name: &str) -> Vec<&'a CollisionEventData> {
    events.iter().filter(|e| e.target.detail.name == name).collect()
}

/// What a registrant sees through `use_collision`
#[derive(Debug, Clone)]
pub struct CollisionState {
    pub id: EntryId,
    /// Bounds registered this tick
    pub bounds: CollisionBox,
    /// Events resolved at the end of the previous tick
    pub events: Vec<CollisionEventData>,
}

impl CollisionState {
    pub fn is_collided(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn collided_with(&self, name: &str) -> Vec<&CollisionEventData> {
        query_by_name(&self.events, name)
    }
}

/// Registry of the current tick plus results of the last resolve
#[derive(Debug, Default)]
pub struct CollisionEngine {
    entries: Vec<CollisionEntry>,
    registered: HashSet<EntryId>,
    results: CollisionResults,
    dispatched: usize,
    next_id: u64,
}

impl CollisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an id no other registrant of this engine holds
    pub fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Forget last tick's registrations. Results stay readable until the next resolve.
    pub fn begin_tick(&mut self) {
        self.entries.clear();
        self.registered.clear();
    }

    /// Add a body to this tick's pass; at most once per id per tick
    pub fn register(&mut self, entry: CollisionEntry) -> Result<()> {
        if !self.registered.insert(entry.id) {
            return Err(RuntimeError::DuplicateRegistration {
                id: entry.id,
                name: entry.detail.name,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[CollisionEntry] {
        &self.entries
    }

    /// Events from the last resolve in which `id` took part
    pub fn results_for(&self, id: EntryId) -> &[CollisionEventData] {
        self.results.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn results(&self) -> &CollisionResults {
        &self.results
    }

    /// Intersecting pairs dispatched by the last resolve
    pub fn dispatched_pairs(&self) -> usize {
        self.dispatched
    }

    /// Test adjacent pairs in broad-phase order and dispatch handlers
    pub fn resolve(&mut self) -> &CollisionResults {
        let mut order: Vec<&CollisionEntry> = self.entries.iter().collect();
        order.sort_by(|a, b| a.bounds.broad_phase_key().total_cmp(&b.bounds.broad_phase_key()));

        let mut results = CollisionResults::new();
        let mut dispatched = 0;
        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.detail.on_collision.is_none() && b.detail.on_collision.is_none() {
                continue;
            }
            let hit = check_intersection(&a.bounds, &b.bounds);
            if !hit.intersects {
                continue;
            }

            log::debug!(
                "collision {} ({:?}) <-> {} ({:?}), distance {}",
                a.detail.name,
                a.id,
                b.detail.name,
                b.id,
                hit.distance
            );
            dispatched += 1;

            for (source, target) in [(a, b), (b, a)] {
                let event = CollisionEventData {
                    source: source.clone(),
                    target: target.clone(),
                    distance: hit.distance,
                };
                if let Some(handler) = &source.detail.on_collision {
                    handler(&event);
                }
                results.entry(source.id).or_default().push(event);
            }
        }

        self.results = results;
        self.dispatched = dispatched;
        &self.results
    }
}
