//! The client's own avatar mirror.
//!
//! Movement prediction outside this library needs the agent's latest
//! kinematics without walking the region tables, so updates whose
//! global id matches the session's agent id are mirrored here. Only
//! updates from the agent's current region apply.

use glam::{Quat, Vec3, Vec4};
use std::sync::Mutex;

use halcyon_types::id::ObjectId;

/// Snapshot of the agent's own movement state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSelf {
    /// Region-local id in the current region; needed to recognize
    /// terse updates for the agent.
    pub local_id: u32,
    /// The session's agent id.
    pub agent_id: ObjectId,
    pub collision_plane: Vec4,
    /// Position relative to the seat when sitting, region otherwise.
    pub relative_position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub relative_rotation: Quat,
    pub angular_velocity: Vec3,
    /// Seat local id; 0 when standing.
    pub sitting_on: u32,
}

impl AgentSelf {
    fn new(agent_id: ObjectId) -> Self {
        Self {
            local_id: 0,
            agent_id,
            collision_plane: Vec4::ZERO,
            relative_position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            relative_rotation: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            sitting_on: 0,
        }
    }
}

/// Synchronized holder for [`AgentSelf`].
#[derive(Debug)]
pub struct AgentState {
    inner: Mutex<AgentSelf>,
}

impl AgentState {
    /// Creates agent state for the given session agent id.
    pub fn new(agent_id: ObjectId) -> Self {
        Self {
            inner: Mutex::new(AgentSelf::new(agent_id)),
        }
    }

    /// The session's agent id.
    pub fn agent_id(&self) -> ObjectId {
        self.snapshot().agent_id
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AgentSelf {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` with the state locked for mutation.
    pub fn update(&self, f: impl FnOnce(&mut AgentSelf)) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_and_snapshot() {
        let state = AgentState::new(ObjectId::from_bytes([5; 16]));
        state.update(|s| {
            s.local_id = 31;
            s.velocity = Vec3::new(1.0, 0.0, 0.0);
        });

        let snap = state.snapshot();
        assert_eq!(snap.local_id, 31);
        assert_eq!(snap.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(snap.agent_id, ObjectId::from_bytes([5; 16]));
    }
}
