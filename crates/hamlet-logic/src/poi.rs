//! Points of interest and the category index agents query them through.
//!
//! The registry does not own POI lifetime. Whatever spawns the inn or the
//! market calls [`PoiRegistry::register`] when it becomes active and
//! [`PoiRegistry::unregister`] when it goes away.
//!
//! Each category list sits behind its own lock so a reader can never see a
//! half-applied add or remove. Writes are rare (a building placed or torn
//! down), so a plain read/write lock per category is enough.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::WorldPos;

/// POI category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoiKind {
    #[default]
    None,
    Inn,
    Blacksmith,
    Shrine,
    Market,
    GuardPost,
}

impl PoiKind {
    /// Every category that can hold POIs (excludes `None`).
    pub const ALL: [PoiKind; 5] = [
        PoiKind::Inn,
        PoiKind::Blacksmith,
        PoiKind::Shrine,
        PoiKind::Market,
        PoiKind::GuardPost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PoiKind::None => "None",
            PoiKind::Inn => "Inn",
            PoiKind::Blacksmith => "Blacksmith",
            PoiKind::Shrine => "Shrine",
            PoiKind::Market => "Market",
            PoiKind::GuardPost => "GuardPost",
        }
    }
}

/// Stable identity of a POI, assigned by the owning scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoiId(pub u32);

/// A named place agents can be scheduled to visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: PoiId,
    pub kind: PoiKind,
    /// Where visitors actually walk to.
    pub entry: WorldPos,
}

impl Poi {
    pub fn new(id: u32, kind: PoiKind, entry: WorldPos) -> Self {
        Self {
            id: PoiId(id),
            kind,
            entry,
        }
    }
}

/// Category → POI list index.
#[derive(Debug)]
pub struct PoiRegistry {
    categories: HashMap<PoiKind, RwLock<Vec<Poi>>>,
    /// Held across a whole register or unregister so an id is only ever in
    /// one category.
    writer: Mutex<()>,
}

impl Default for PoiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PoiRegistry {
    pub fn new() -> Self {
        let categories = PoiKind::ALL
            .iter()
            .chain(std::iter::once(&PoiKind::None))
            .map(|kind| (*kind, RwLock::new(Vec::new())))
            .collect();
        Self {
            categories,
            writer: Mutex::new(()),
        }
    }

    fn list(&self, kind: PoiKind) -> Option<&RwLock<Vec<Poi>>> {
        self.categories.get(&kind)
    }

    /// Add a POI. Registering an id that is already present replaces the old
    /// record in place, so repeated activation never produces duplicates.
    pub fn register(&self, poi: Poi) {
        let _writer = self.writer.lock();
        // A POI whose kind changed must leave its previous category first
        for (kind, list) in &self.categories {
            if *kind != poi.kind {
                list.write().retain(|p| p.id != poi.id);
            }
        }
        let Some(list) = self.list(poi.kind) else {
            return;
        };
        let mut list = list.write();
        match list.iter_mut().find(|p| p.id == poi.id) {
            Some(existing) => *existing = poi,
            None => list.push(poi),
        }
    }

    /// Remove a POI. Unknown ids are ignored.
    pub fn unregister(&self, id: PoiId) {
        let _writer = self.writer.lock();
        for list in self.categories.values() {
            list.write().retain(|p| p.id != id);
        }
    }

    /// Closest POI of `kind` to `from` by straight-line distance to its entry.
    /// On equal distance the earliest registered wins.
    pub fn closest(&self, kind: PoiKind, from: WorldPos) -> Option<Poi> {
        let list = self.list(kind)?.read();
        list.iter()
            .min_by(|a, b| {
                a.entry
                    .distance_squared(&from)
                    .partial_cmp(&b.entry.distance_squared(&from))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied()
    }

    /// Uniformly chosen POI of `kind`.
    pub fn random(&self, kind: PoiKind, rng: &mut impl Rng) -> Option<Poi> {
        let list = self.list(kind)?.read();
        if list.is_empty() {
            return None;
        }
        Some(list[rng.gen_range(0..list.len())])
    }

    pub fn get(&self, id: PoiId) -> Option<Poi> {
        self.categories
            .values()
            .find_map(|list| list.read().iter().find(|p| p.id == id).copied())
    }

    pub fn count(&self, kind: PoiKind) -> usize {
        self.list(kind).map(|l| l.read().len()).unwrap_or(0)
    }

    pub fn has_any(&self, kind: PoiKind) -> bool {
        self.count(kind) > 0
    }

    /// Total registered POIs across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(|l| l.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_closest_picks_nearest() {
        let registry = PoiRegistry::new();
        let from = WorldPos::new(0.0, 0.0);
        registry.register(Poi::new(1, PoiKind::Market, WorldPos::new(5.0, 0.0)));
        registry.register(Poi::new(2, PoiKind::Market, WorldPos::new(0.0, 1.0)));
        registry.register(Poi::new(3, PoiKind::Market, WorldPos::new(-3.0, 0.0)));

        let closest = registry.closest(PoiKind::Market, from).unwrap();
        assert_eq!(closest.id, PoiId(2));
    }

    #[test]
    fn test_closest_tie_goes_to_first_registered() {
        let registry = PoiRegistry::new();
        registry.register(Poi::new(9, PoiKind::Shrine, WorldPos::new(2.0, 0.0)));
        registry.register(Poi::new(4, PoiKind::Shrine, WorldPos::new(-2.0, 0.0)));
        let closest = registry.closest(PoiKind::Shrine, WorldPos::ZERO).unwrap();
        assert_eq!(closest.id, PoiId(9));
    }

    #[test]
    fn test_empty_category() {
        let registry = PoiRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(registry.closest(PoiKind::Inn, WorldPos::ZERO).is_none());
        assert!(registry.random(PoiKind::Inn, &mut rng).is_none());
        assert!(!registry.has_any(PoiKind::Inn));
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = PoiRegistry::new();
        let poi = Poi::new(1, PoiKind::Inn, WorldPos::new(1.0, 1.0));
        registry.register(poi);
        registry.register(poi);
        assert_eq!(registry.count(PoiKind::Inn), 1);

        registry.unregister(poi.id);
        assert!(registry.closest(PoiKind::Inn, WorldPos::ZERO).is_none());
        let mut rng = StdRng::seed_from_u64(3);
        assert!(registry.random(PoiKind::Inn, &mut rng).is_none());
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let registry = PoiRegistry::new();
        registry.register(Poi::new(1, PoiKind::Inn, WorldPos::ZERO));
        registry.unregister(PoiId(77));
        registry.unregister(PoiId(77));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregister_with_new_kind_moves_category() {
        let registry = PoiRegistry::new();
        registry.register(Poi::new(5, PoiKind::Market, WorldPos::ZERO));
        registry.register(Poi::new(5, PoiKind::Blacksmith, WorldPos::ZERO));
        assert_eq!(registry.count(PoiKind::Market), 0);
        assert_eq!(registry.count(PoiKind::Blacksmith), 1);
    }

    #[test]
    fn test_random_is_member() {
        let registry = PoiRegistry::new();
        for i in 0..4 {
            registry.register(Poi::new(i, PoiKind::GuardPost, WorldPos::new(i as f32, 0.0)));
        }
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let poi = registry.random(PoiKind::GuardPost, &mut rng).unwrap();
            assert_eq!(poi.kind, PoiKind::GuardPost);
            seen.insert(poi.id);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(PoiRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        registry.register(Poi::new(t * 100 + i, PoiKind::Market, WorldPos::ZERO));
                        let _ = registry.closest(PoiKind::Market, WorldPos::ZERO);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.count(PoiKind::Market), 200);
    }

    #[test]
    fn test_concurrent_kind_changes_keep_one_category() {
        let registry = Arc::new(PoiRegistry::new());
        let kinds = [PoiKind::Market, PoiKind::Inn, PoiKind::Shrine, PoiKind::Blacksmith];
        let handles: Vec<_> = kinds
            .into_iter()
            .map(|kind| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for id in 0..200 {
                        registry.register(Poi::new(id % 10, kind, WorldPos::ZERO));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let total: usize = kinds.iter().map(|k| registry.count(*k)).sum();
        assert_eq!(total, 10);
    }
}
