//! Outbound request seam toward the network collaborator.
//!
//! The synchronization core triggers a handful of fire-and-forget
//! requests (auto-select of freshly rezzed objects, full-data requests
//! for cache misses). The transport implements [`RequestSink`]; the
//! core never waits on a request's completion.

use halcyon_types::id::ObjectId;

/// Fire-and-forget request channel toward the simulator.
pub trait RequestSink: Send + Sync {
    /// Selects objects, prompting the simulator to send their
    /// properties payloads.
    fn select_objects(&self, region_handle: u64, local_ids: &[u32]);

    /// Deselects previously selected objects.
    fn deselect_objects(&self, region_handle: u64, local_ids: &[u32]);

    /// Requests full object data for stale or missing entries.
    fn request_objects(&self, region_handle: u64, local_ids: &[u32]);

    /// Requests the family properties subset for an object.
    fn request_object_properties_family(
        &self,
        region_handle: u64,
        object_id: ObjectId,
        request_flags: u32,
    );
}

/// A sink that drops every request. Useful for tests and for consumers
/// that only observe updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRequestSink;

impl RequestSink for NullRequestSink {
    fn select_objects(&self, _region_handle: u64, _local_ids: &[u32]) {}
    fn deselect_objects(&self, _region_handle: u64, _local_ids: &[u32]) {}
    fn request_objects(&self, _region_handle: u64, _local_ids: &[u32]) {}
    fn request_object_properties_family(
        &self,
        _region_handle: u64,
        _object_id: ObjectId,
        _request_flags: u32,
    ) {
    }
}
