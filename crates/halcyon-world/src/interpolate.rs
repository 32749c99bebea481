//! Dead-reckoning between authoritative updates.
//!
//! A periodic pass advances tracked positions and rotations from their
//! last-known velocity, acceleration, and angular velocity, scaled by
//! the region's time dilation. Linear extrapolation applies only when
//! acceleration is nonzero and velocity is zero: the simulator sends
//! explicit terse updates whenever velocity is nonzero, so the client
//! predicts only the acceleration-driven case (falling objects)
//! between them.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use glam::Quat;
use tracing::debug;

use halcyon_types::enums::JointType;

use crate::object::Kinematics;
use crate::region::{Region, World};

/// Physics engine timestep the extrapolation formula is calibrated
/// against.
pub const HAVOK_TIMESTEP: f32 = 1.0 / 45.0;

/// Default interval between interpolation passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Floor on the reschedule delay, bounding CPU under load.
pub const MIN_INTERVAL: Duration = Duration::from_millis(50);

/// Angular speed squared below which rotation is left untouched.
const ANGULAR_EPSILON: f32 = 1e-5;

// ---------------------------------------------------------------------------
// Extrapolation math
// ---------------------------------------------------------------------------

/// Advances position and velocity by `adj_seconds` of dilated time.
/// Applies only in the acceleration-without-velocity case.
pub fn extrapolate_linear(kin: &mut Kinematics, adj_seconds: f32) {
    if kin.acceleration != glam::Vec3::ZERO && kin.velocity == glam::Vec3::ZERO {
        kin.position +=
            (kin.velocity + kin.acceleration * (0.5 * (adj_seconds - HAVOK_TIMESTEP))) * adj_seconds;
        kin.velocity += kin.acceleration * adj_seconds;
    }
}

/// Composes the rotation implied by the angular velocity over
/// `adj_seconds` onto the current rotation.
pub fn extrapolate_angular(kin: &mut Kinematics, adj_seconds: f32) {
    let omega_sq = kin.angular_velocity.length_squared();
    if omega_sq > ANGULAR_EPSILON {
        let omega = omega_sq.sqrt();
        let angle = omega * adj_seconds;
        let axis = kin.angular_velocity / omega;
        kin.rotation *= Quat::from_axis_angle(axis, angle);
    }
}

/// Runs one interpolation pass over a region, under its table lock.
/// Avatars get linear extrapolation; prims without a joint get linear
/// plus angular. Jointed prims are not extrapolated client-side.
pub fn interpolate_region(region: &Region, elapsed: Duration) {
    region.with_tables(|tables| {
        let adj_seconds = elapsed.as_secs_f32() * tables.time_dilation;

        for avatar in tables.avatars.values_mut() {
            extrapolate_linear(&mut avatar.kinematics, adj_seconds);
        }

        for prim in tables.objects.values_mut() {
            if prim.joint == JointType::None {
                extrapolate_angular(&mut prim.kinematics, adj_seconds);
                extrapolate_linear(&mut prim.kinematics, adj_seconds);
            }
            // Hinge and point joint motion is simulated server-side
            // only; those prims keep their last authoritative state.
        }
    });
}

/// Runs one pass over every region in the world.
pub fn interpolate_world(world: &World, elapsed: Duration) {
    for region in world.regions() {
        interpolate_region(&region, elapsed);
    }
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Dedicated interpolation thread. Each tick is atomic per region; the
/// timer is safe to stop between ticks.
#[derive(Debug)]
pub struct InterpolationTimer {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl InterpolationTimer {
    /// Starts the timer with the given pass interval. Intervals below
    /// the enforced floor are clamped up to it.
    pub fn start(world: Arc<World>, interval: Duration) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = std::thread::spawn(move || {
            let mut last_tick = Instant::now();
            let mut delay = interval;
            loop {
                match stop_rx.recv_timeout(delay) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let tick_start = Instant::now();
                interpolate_world(&world, tick_start - last_tick);
                last_tick = tick_start;

                // Self-reschedule, deducting our own processing time
                // but never below the floor.
                delay = interval.saturating_sub(tick_start.elapsed()).max(MIN_INTERVAL);
            }
            debug!("interpolation timer stopped");
        });

        Self {
            stop: stop_tx,
            handle,
        }
    }

    /// Stops the timer. Blocks until the thread exits; any tick in
    /// flight completes first.
    pub fn stop(self) {
        let _ = self.stop.try_send(());
        let _ = self.handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn kinematics(velocity: Vec3, acceleration: Vec3) -> Kinematics {
        Kinematics {
            velocity,
            acceleration,
            ..Kinematics::default()
        }
    }

    #[test]
    fn test_no_extrapolation_with_nonzero_velocity() {
        // Nonzero velocity means the simulator is streaming terse
        // updates; the client must not also extrapolate.
        let mut kin = kinematics(Vec3::new(1.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0));
        let before = kin.position;
        extrapolate_linear(&mut kin, 0.1);
        assert_eq!(kin.position, before);
        assert_eq!(kin.velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_falling_object_advances_downward() {
        let mut kin = kinematics(Vec3::ZERO, Vec3::new(0.0, 0.0, -9.8));
        extrapolate_linear(&mut kin, 0.1);
        assert!(kin.position.z < 0.0, "position should drop, got {}", kin.position.z);
        assert!(kin.velocity.z < 0.0, "velocity should grow downward");
    }

    #[test]
    fn test_extrapolation_formula() {
        let accel = Vec3::new(0.0, 0.0, -9.8);
        let mut kin = kinematics(Vec3::ZERO, accel);
        let dt = 0.25;
        extrapolate_linear(&mut kin, dt);

        let expected = (accel * (0.5 * (dt - HAVOK_TIMESTEP))) * dt;
        assert!((kin.position.z - expected.z).abs() < 1e-6);
        assert!((kin.velocity.z - accel.z * dt).abs() < 1e-6);
    }

    #[test]
    fn test_angular_extrapolation_rotates() {
        let mut kin = Kinematics {
            angular_velocity: Vec3::new(0.0, 0.0, std::f32::consts::PI),
            ..Kinematics::default()
        };
        // Half a second at pi rad/s: quarter turn around Z.
        extrapolate_angular(&mut kin, 0.5);
        let expected = Quat::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2);
        assert!(kin.rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_negligible_spin_is_ignored() {
        let mut kin = Kinematics {
            angular_velocity: Vec3::new(1e-4, 0.0, 0.0),
            ..Kinematics::default()
        };
        extrapolate_angular(&mut kin, 1.0);
        assert_eq!(kin.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_time_dilation_scales_extrapolation() {
        use halcyon_types::id::ObjectId;

        let run = |dilation: f32| -> f32 {
            let region = Region::new(1);
            region.with_tables(|t| {
                t.time_dilation = dilation;
                let prim = t.prim_entry(1, ObjectId::ZERO);
                prim.kinematics.acceleration = Vec3::new(0.0, 0.0, -9.8);
            });
            interpolate_region(&region, Duration::from_millis(200));
            region.with_tables(|t| t.objects[&1].kinematics.velocity.z)
        };

        let half = run(0.5);
        let full = run(1.0);
        // Doubling dilation doubles the effective elapsed time.
        assert!((full - 2.0 * half).abs() < 1e-5, "full {full}, half {half}");
    }

    #[test]
    fn test_jointed_prims_are_not_extrapolated() {
        use halcyon_types::id::ObjectId;

        let region = Region::new(1);
        region.with_tables(|t| {
            let prim = t.prim_entry(1, ObjectId::ZERO);
            prim.joint = JointType::Hinge;
            prim.kinematics.acceleration = Vec3::new(0.0, 0.0, -9.8);
            prim.kinematics.angular_velocity = Vec3::new(0.0, 0.0, 3.0);
            t.time_dilation = 1.0;
        });
        interpolate_region(&region, Duration::from_millis(100));

        region.with_tables(|t| {
            let kin = &t.objects[&1].kinematics;
            assert_eq!(kin.position, Vec3::ZERO);
            assert_eq!(kin.velocity, Vec3::ZERO);
            assert_eq!(kin.rotation, Quat::IDENTITY);
        });
    }

    #[test]
    fn test_timer_stops_cleanly() {
        let world = Arc::new(World::new());
        world.region(1);
        let timer = InterpolationTimer::start(Arc::clone(&world), Duration::from_millis(50));
        std::thread::sleep(Duration::from_millis(120));
        timer.stop();
    }
}
