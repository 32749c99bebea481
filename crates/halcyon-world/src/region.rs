//! Per-region object tables and the region registry.
//!
//! Each region owns a single mutex guarding both id-space tables plus
//! the region's time dilation. Update application, property merges,
//! kill cascades, and the interpolation pass all take that one lock;
//! nothing in this module ever holds two region locks at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rustc_hash::{FxHashMap, FxHashSet};

use halcyon_types::id::ObjectId;

use crate::object::{Avatar, Prim};

// ---------------------------------------------------------------------------
// RegionTables
// ---------------------------------------------------------------------------

/// The mutable per-region state: primitive and avatar tables (separate
/// id spaces) plus the simulator's reported time dilation.
#[derive(Debug, Default)]
pub struct RegionTables {
    /// Primitives keyed by local id.
    pub objects: FxHashMap<u32, Prim>,
    /// Avatars keyed by local id.
    pub avatars: FxHashMap<u32, Avatar>,
    /// Simulation slowdown scalar, 0..1. Scales extrapolation time.
    pub time_dilation: f32,
}

impl RegionTables {
    /// Returns the tracked prim for `local_id`, inserting a placeholder
    /// if this is the first reference. Idempotent: the same id always
    /// yields the same logical object.
    pub fn prim_entry(&mut self, local_id: u32, full_id: ObjectId) -> &mut Prim {
        self.objects
            .entry(local_id)
            .or_insert_with(|| Prim::placeholder(local_id, full_id))
    }

    /// Returns the tracked avatar for `local_id`, inserting a
    /// placeholder if this is the first reference.
    pub fn avatar_entry(&mut self, local_id: u32, full_id: ObjectId) -> &mut Avatar {
        self.avatars
            .entry(local_id)
            .or_insert_with(|| Avatar::placeholder(local_id, full_id))
    }

    /// Finds a tracked prim by global id. Linear scan: local id is the
    /// only index, and property merges are rare relative to updates.
    pub fn prim_by_full_id(&mut self, full_id: ObjectId) -> Option<&mut Prim> {
        self.objects.values_mut().find(|p| p.full_id == full_id)
    }

    /// Removes `local_id` and everything seated on or linked to it.
    ///
    /// Direct prim children always cascade. When the removed object is
    /// a tracked avatar, prims parented to the avatar's root child
    /// prims cascade too (sit chains). `notify` runs for every cascaded
    /// child before any table mutation, so callers can still observe
    /// the doomed entries; the removed batch id itself is the caller's
    /// notification responsibility. Returns every removed local id.
    pub fn remove_cascade(
        &mut self,
        local_id: u32,
        track_objects: bool,
        track_avatars: bool,
        mut notify: impl FnMut(u32),
    ) -> Vec<u32> {
        let mut doomed_prims: Vec<u32> = Vec::new();
        let mut doomed_avatar = None;
        let mut seen: FxHashSet<u32> = FxHashSet::default();

        if track_objects {
            if self.objects.contains_key(&local_id) {
                seen.insert(local_id);
                doomed_prims.push(local_id);
            }
            for (&child_id, prim) in &self.objects {
                if prim.parent_local_id == local_id && seen.insert(child_id) {
                    notify(child_id);
                    doomed_prims.push(child_id);
                }
            }
        }

        if track_avatars && self.avatars.contains_key(&local_id) {
            doomed_avatar = Some(local_id);

            let root_children: Vec<u32> = self
                .objects
                .iter()
                .filter(|(_, prim)| prim.parent_local_id == local_id)
                .map(|(&id, _)| id)
                .collect();
            for &child_id in &root_children {
                if seen.insert(child_id) {
                    notify(child_id);
                    doomed_prims.push(child_id);
                }
            }
            for (&grandchild_id, prim) in &self.objects {
                if root_children.contains(&prim.parent_local_id) && seen.insert(grandchild_id) {
                    notify(grandchild_id);
                    doomed_prims.push(grandchild_id);
                }
            }
        }

        for id in &doomed_prims {
            self.objects.remove(id);
        }
        let mut removed = doomed_prims;
        if let Some(avatar_id) = doomed_avatar {
            self.avatars.remove(&avatar_id);
            if !removed.contains(&avatar_id) {
                removed.push(avatar_id);
            }
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// One simulator region: a handle plus its locked tables.
#[derive(Debug)]
pub struct Region {
    handle: u64,
    tables: Mutex<RegionTables>,
}

impl Region {
    /// Creates an empty region for `handle`.
    pub fn new(handle: u64) -> Self {
        Self {
            handle,
            tables: Mutex::new(RegionTables::default()),
        }
    }

    /// The region's handle.
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// Runs `f` with the region's tables locked. Keep the closure to
    /// the table mutation itself; decode work belongs outside.
    pub fn with_tables<R>(&self, f: impl FnOnce(&mut RegionTables) -> R) -> R {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut tables)
    }

    /// Updates the region's time dilation from a wire scalar.
    pub fn set_time_dilation(&self, dilation: f32) {
        self.with_tables(|t| t.time_dilation = dilation);
    }

    /// Current time dilation.
    pub fn time_dilation(&self) -> f32 {
        self.with_tables(|t| t.time_dilation)
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Registry of all connected regions, plus which one the client's own
/// agent currently occupies.
#[derive(Debug, Default)]
pub struct World {
    regions: Mutex<FxHashMap<u64, Arc<Region>>>,
    current_region: AtomicU64,
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the region for `handle`, creating it on first reference.
    pub fn region(&self, handle: u64) -> Arc<Region> {
        let mut regions = self.regions.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            regions
                .entry(handle)
                .or_insert_with(|| Arc::new(Region::new(handle))),
        )
    }

    /// Drops a region and all of its tracked objects (disconnect).
    pub fn remove_region(&self, handle: u64) {
        let mut regions = self.regions.lock().unwrap_or_else(|e| e.into_inner());
        regions.remove(&handle);
    }

    /// Snapshot of all regions, for iteration without holding the
    /// registry lock.
    pub fn regions(&self) -> Vec<Arc<Region>> {
        let regions = self.regions.lock().unwrap_or_else(|e| e.into_inner());
        regions.values().cloned().collect()
    }

    /// Marks the region the client's agent currently occupies.
    pub fn set_current_region(&self, handle: u64) {
        self.current_region.store(handle, Ordering::Relaxed);
    }

    /// Handle of the agent's current region (0 before the first
    /// region connect).
    pub fn current_region(&self) -> u64 {
        self.current_region.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_tables() -> RegionTables {
        let mut tables = RegionTables::default();
        // A: root prim; B: child of A; C: child of B.
        tables.prim_entry(1, ObjectId::from_bytes([1; 16]));
        tables.prim_entry(2, ObjectId::from_bytes([2; 16])).parent_local_id = 1;
        tables.prim_entry(3, ObjectId::from_bytes([3; 16])).parent_local_id = 2;
        tables
    }

    #[test]
    fn test_prim_entry_is_idempotent() {
        let mut tables = RegionTables::default();
        let id = ObjectId::from_bytes([9; 16]);
        tables.prim_entry(5, id).text = "first".to_owned();
        // Second reference must return the same logical object.
        assert_eq!(tables.prim_entry(5, ObjectId::ZERO).text, "first");
        assert_eq!(tables.objects.len(), 1);
        // And the original full id survives.
        assert_eq!(tables.prim_entry(5, ObjectId::ZERO).full_id, id);
    }

    #[test]
    fn test_remove_prim_cascades_to_direct_children_only() {
        let mut tables = seeded_tables();
        let mut notified = Vec::new();
        let removed = tables.remove_cascade(2, true, true, |id| notified.push(id));

        // Removing B removes B and C; A is untouched.
        assert_eq!(removed, vec![2, 3]);
        assert_eq!(notified, vec![3]);
        assert!(tables.objects.contains_key(&1));
        assert!(!tables.objects.contains_key(&2));
        assert!(!tables.objects.contains_key(&3));
    }

    #[test]
    fn test_remove_avatar_cascades_to_grandchildren() {
        let mut tables = RegionTables::default();
        tables.avatar_entry(10, ObjectId::from_bytes([10; 16]));
        // Seat prim parented to the avatar, with its own child prim.
        tables.prim_entry(20, ObjectId::from_bytes([20; 16])).parent_local_id = 10;
        tables.prim_entry(21, ObjectId::from_bytes([21; 16])).parent_local_id = 20;

        let mut notified = Vec::new();
        let removed = tables.remove_cascade(10, true, true, |id| notified.push(id));

        assert!(removed.contains(&10));
        assert!(removed.contains(&20));
        assert!(removed.contains(&21));
        assert!(notified.contains(&20));
        assert!(notified.contains(&21));
        assert!(tables.avatars.is_empty());
        assert!(tables.objects.is_empty());
    }

    #[test]
    fn test_remove_unknown_parent_reference_is_noop() {
        let mut tables = seeded_tables();
        let removed = tables.remove_cascade(77, true, true, |_| {});
        assert!(removed.is_empty());
        assert_eq!(tables.objects.len(), 3);
    }

    #[test]
    fn test_tracking_disabled_skips_cascade() {
        let mut tables = seeded_tables();
        let removed = tables.remove_cascade(2, false, true, |_| {});
        assert!(removed.is_empty());
        assert_eq!(tables.objects.len(), 3);
    }

    #[test]
    fn test_world_region_get_or_create() {
        let world = World::new();
        let a = world.region(1001);
        let b = world.region(1001);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(world.regions().len(), 1);

        world.remove_region(1001);
        assert!(world.regions().is_empty());
    }

    #[test]
    fn test_current_region_tracking() {
        let world = World::new();
        assert_eq!(world.current_region(), 0);
        world.set_current_region(42);
        assert_eq!(world.current_region(), 42);
    }
}
