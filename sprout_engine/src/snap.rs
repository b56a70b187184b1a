//! Ruler snap controller for the chapter 3 measuring step.
//!
//! Six snap zones sit beside the pea plants. When the ruler's body enters
//! a zone it glides onto the zone's target pose (critically damped
//! position, slerped rotation) and hard-locks once within the epsilons.
//! Grabbing the ruler, yanking it off the target, or leaving the zone
//! releases it. Visits are remembered; once every zone has been visited
//! the controller reports the milestone exactly once.

use glam::{Quat, Vec3};

use crate::signals::{Ch3Signal, SignalSender};
use crate::stage::StageContext;
use sprout_script::RulerConfig;

pub const ZONE_COUNT: usize = 6;

/// Prop id for the shared pea-height readout root.
pub const PEA_HEIGHT_ROOT: &str = "pea_height.root";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Pose { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Pose {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// The ruler's simulated body, owned by the caller and mutated in place
/// while snapped.
#[derive(Debug, Clone, Copy)]
pub struct RulerBody {
    pub pose: Pose,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl RulerBody {
    pub fn at_rest(pose: Pose) -> Self {
        RulerBody {
            pose,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }
}

/// One measurement spot. A zone without a target pose is inert; entering
/// it warns and does nothing.
#[derive(Debug, Clone)]
pub struct SnapZone {
    pub name: String,
    pub target: Option<Pose>,
}

impl SnapZone {
    pub fn new(name: &str, target: Pose) -> Self {
        SnapZone {
            name: name.to_string(),
            target: Some(target),
        }
    }

    pub fn unset(name: &str) -> Self {
        SnapZone {
            name: name.to_string(),
            target: None,
        }
    }
}

/// Critically damped spring toward `target`, with overshoot clamped to
/// the target itself.
fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + change * omega) * dt;
    *velocity = (*velocity - temp * omega) * exp;
    let mut output = target + (change + temp) * exp;
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }
    output
}

#[derive(Debug, Clone, Copy)]
struct SnapState {
    zone: usize,
    locked: bool,
    /// Set when the zone reported an exit; resolved one tick later so a
    /// grazing contact does not release a ruler still over the target.
    exit_pending: bool,
}

#[derive(Debug)]
pub struct RulerSnapController {
    config: RulerConfig,
    zones: Vec<SnapZone>,
    visited: [bool; ZONE_COUNT],
    snap: Option<SnapState>,
    smooth_velocity: Vec3,
    grabbed: bool,
    milestone_sent: bool,
    sender: Option<SignalSender<Ch3Signal>>,
}

impl RulerSnapController {
    pub fn new(config: RulerConfig, zones: Vec<SnapZone>) -> Self {
        assert_eq!(zones.len(), ZONE_COUNT, "expected {ZONE_COUNT} snap zones");
        RulerSnapController {
            config,
            zones,
            visited: [false; ZONE_COUNT],
            snap: None,
            smooth_velocity: Vec3::ZERO,
            grabbed: false,
            milestone_sent: false,
            sender: None,
        }
    }

    pub fn bind(&mut self, sender: SignalSender<Ch3Signal>) {
        self.sender = Some(sender);
    }

    pub fn snapped_zone(&self) -> Option<usize> {
        self.snap.map(|s| s.zone)
    }

    pub fn visited(&self) -> &[bool; ZONE_COUNT] {
        &self.visited
    }

    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|v| **v).count()
    }

    fn zone_label(zone: usize) -> String {
        format!("pea_height.zone_{zone}")
    }

    pub fn on_grab_pressed(&mut self, stage: &mut StageContext) {
        self.grabbed = true;
        if self.config.unsnap_on_grab && self.snap.is_some() {
            self.release(stage, "grab");
        }
    }

    pub fn on_grab_released(&mut self) {
        self.grabbed = false;
    }

    pub fn on_zone_enter(&mut self, zone: usize, stage: &mut StageContext) {
        if zone >= self.zones.len() {
            return;
        }
        if self.zones[zone].target.is_none() {
            eprintln!(
                "[sprout_engine] snap zone '{}' has no target pose, ignoring",
                self.zones[zone].name
            );
            return;
        }
        // Re-entering the active zone cancels a pending exit.
        if let Some(snap) = self.snap.as_mut() {
            if snap.zone == zone {
                snap.exit_pending = false;
                return;
            }
        }
        self.smooth_velocity = Vec3::ZERO;
        self.snap = Some(SnapState {
            zone,
            locked: false,
            exit_pending: false,
        });
        stage.log_event(format!("ruler.snap {}", self.zones[zone].name));
        if !self.visited[zone] {
            self.visited[zone] = true;
            stage.set_visible(PEA_HEIGHT_ROOT, true);
            stage.set_visible(&Self::zone_label(zone), true);
            if self.visited_count() == ZONE_COUNT && !self.milestone_sent {
                self.milestone_sent = true;
                if let Some(sender) = self.sender.as_ref() {
                    sender.send(Ch3Signal::AllZonesMeasured);
                }
            }
        }
    }

    pub fn on_zone_exit(&mut self, zone: usize) {
        if let Some(snap) = self.snap.as_mut() {
            if snap.zone == zone {
                snap.exit_pending = true;
            }
        }
    }

    fn release(&mut self, stage: &mut StageContext, reason: &str) {
        if let Some(snap) = self.snap.take() {
            stage.log_event(format!(
                "ruler.release {} ({reason})",
                self.zones[snap.zone].name
            ));
        }
        self.smooth_velocity = Vec3::ZERO;
    }

    pub fn advance(&mut self, dt: f32, body: &mut RulerBody, stage: &mut StageContext) {
        let Some(snap) = self.snap else {
            return;
        };
        let Some(target) = self.zones[snap.zone].target else {
            self.snap = None;
            return;
        };

        if snap.exit_pending {
            let still_over =
                body.pose.position.distance(target.position) <= self.config.overlap_radius;
            if still_over {
                if let Some(state) = self.snap.as_mut() {
                    state.exit_pending = false;
                }
            } else {
                self.release(stage, "zone exit");
                return;
            }
        }

        if snap.locked && self.config.enable_motion_unsnap {
            let drift = body.pose.position.distance(target.position);
            if drift > self.config.unsnap_distance
                || body.linear_velocity.length() > self.config.unsnap_linear_speed
                || body.angular_velocity.length() > self.config.unsnap_angular_speed
            {
                self.release(stage, "motion");
                return;
            }
        }

        let pos_close =
            body.pose.position.distance(target.position) <= self.config.hard_lock_pos_epsilon;
        let rot_close = body.pose.rotation.angle_between(target.rotation)
            <= self.config.hard_lock_rot_epsilon_deg.to_radians();
        if pos_close && rot_close {
            body.pose = target;
            if let Some(state) = self.snap.as_mut() {
                state.locked = true;
            }
        } else {
            body.pose.position = smooth_damp(
                body.pose.position,
                target.position,
                &mut self.smooth_velocity,
                self.config.snap_pos_smooth_time,
                dt,
            );
            body.pose.rotation = body
                .pose
                .rotation
                .slerp(target.rotation, self.config.snap_rot_lerp);
        }
        body.linear_velocity = Vec3::ZERO;
        body.angular_velocity = Vec3::ZERO;
    }

    /// Hides the whole pea-height readout.
    pub fn hide_pea_height_ui(&self, stage: &mut StageContext) {
        stage.set_visible(PEA_HEIGHT_ROOT, false);
        for zone in 0..ZONE_COUNT {
            stage.set_visible(&Self::zone_label(zone), false);
        }
    }

    /// Shows the readout again, but only the labels for zones already
    /// measured.
    pub fn show_pea_height_ui(&self, stage: &mut StageContext) {
        stage.set_visible(PEA_HEIGHT_ROOT, true);
        for zone in 0..ZONE_COUNT {
            if self.visited[zone] {
                stage.set_visible(&Self::zone_label(zone), true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalQueue;

    fn test_zones() -> Vec<SnapZone> {
        (0..ZONE_COUNT)
            .map(|i| SnapZone::new(&format!("zone_{i}"), Pose::at(Vec3::new(i as f32, 0.0, 0.0))))
            .collect()
    }

    fn controller() -> (RulerSnapController, SignalQueue<Ch3Signal>) {
        let queue = SignalQueue::new();
        let mut ctrl = RulerSnapController::new(RulerConfig::default(), test_zones());
        ctrl.bind(queue.sender());
        (ctrl, queue)
    }

    #[test]
    fn ruler_glides_onto_target_and_locks() {
        let (mut ctrl, _queue) = controller();
        let mut stage = StageContext::new(false);
        let mut body = RulerBody::at_rest(Pose::at(Vec3::new(0.05, 0.0, 0.0)));

        ctrl.on_zone_enter(0, &mut stage);
        for _ in 0..120 {
            ctrl.advance(1.0 / 60.0, &mut body, &mut stage);
        }
        assert_eq!(body.pose.position, Vec3::ZERO);
        assert_eq!(body.linear_velocity, Vec3::ZERO);
        assert_eq!(ctrl.snapped_zone(), Some(0));
    }

    #[test]
    fn grab_releases_the_snap() {
        let (mut ctrl, _queue) = controller();
        let mut stage = StageContext::new(false);
        ctrl.on_zone_enter(3, &mut stage);
        assert_eq!(ctrl.snapped_zone(), Some(3));
        ctrl.on_grab_pressed(&mut stage);
        assert_eq!(ctrl.snapped_zone(), None);
        assert!(stage.events().iter().any(|e| e.starts_with("ruler.release")));
    }

    #[test]
    fn zone_exit_debounce_cancels_when_still_over_target() {
        let (mut ctrl, _queue) = controller();
        let mut stage = StageContext::new(false);
        let mut body = RulerBody::at_rest(Pose::at(Vec3::new(2.0, 0.0, 0.0)));

        ctrl.on_zone_enter(2, &mut stage);
        ctrl.on_zone_exit(2);
        // Body still sits on the target, so the exit is spurious.
        ctrl.advance(1.0 / 60.0, &mut body, &mut stage);
        assert_eq!(ctrl.snapped_zone(), Some(2));

        ctrl.on_zone_exit(2);
        body.pose.position = Vec3::new(2.5, 0.0, 0.0);
        ctrl.advance(1.0 / 60.0, &mut body, &mut stage);
        assert_eq!(ctrl.snapped_zone(), None);
    }

    #[test]
    fn all_zones_report_once() {
        let (mut ctrl, queue) = controller();
        let mut stage = StageContext::new(false);
        for zone in 0..ZONE_COUNT {
            ctrl.on_zone_enter(zone, &mut stage);
        }
        assert_eq!(queue.drain(), vec![Ch3Signal::AllZonesMeasured]);

        // Revisits never report again.
        ctrl.on_grab_pressed(&mut stage);
        ctrl.on_zone_enter(0, &mut stage);
        assert!(queue.is_empty());
        assert_eq!(ctrl.visited_count(), ZONE_COUNT);
    }

    #[test]
    fn unset_zone_is_ignored() {
        let queue = SignalQueue::new();
        let mut zones = test_zones();
        zones[4] = SnapZone::unset("zone_4");
        let mut ctrl = RulerSnapController::new(RulerConfig::default(), zones);
        ctrl.bind(queue.sender());
        let mut stage = StageContext::new(false);
        ctrl.on_zone_enter(4, &mut stage);
        assert_eq!(ctrl.snapped_zone(), None);
        assert_eq!(ctrl.visited_count(), 0);
    }

    #[test]
    fn pea_height_ui_restores_only_visited_labels() {
        let (mut ctrl, _queue) = controller();
        let mut stage = StageContext::new(false);
        ctrl.on_zone_enter(0, &mut stage);
        ctrl.on_grab_pressed(&mut stage);
        ctrl.on_zone_enter(1, &mut stage);

        ctrl.hide_pea_height_ui(&mut stage);
        assert!(!stage.is_visible(PEA_HEIGHT_ROOT));

        ctrl.show_pea_height_ui(&mut stage);
        assert!(stage.is_visible(PEA_HEIGHT_ROOT));
        assert!(stage.is_visible("pea_height.zone_0"));
        assert!(stage.is_visible("pea_height.zone_1"));
        assert!(!stage.is_visible("pea_height.zone_5"));
    }
}
