//! World triggers that request dialog lines.
//!
//! Triggers queue `PlayRequest`s; they never talk to a sequencer directly,
//! so the strict-order gate stays in one place. Shared one-shot groups are
//! scoped to a `SceneTriggerContext` rather than process-wide state, so
//! replaying a scene re-arms them.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::signals::{PlayRequest, SignalSender};
use crate::stage::StageContext;
use crate::trackers::MembershipPotTracker;

/// Scene-lifetime bookkeeping for trigger groups that share a single shot.
#[derive(Debug)]
pub struct SceneTriggerContext {
    scene_name: String,
    fired_groups: HashSet<String>,
}

impl SceneTriggerContext {
    pub fn new(scene_name: &str) -> Self {
        SceneTriggerContext {
            scene_name: scene_name.to_string(),
            fired_groups: HashSet::new(),
        }
    }

    pub fn scene_name(&self) -> &str {
        &self.scene_name
    }

    /// Re-arms every shared group for a fresh scene.
    pub fn enter_scene(&mut self, scene_name: &str) {
        self.scene_name = scene_name.to_string();
        self.fired_groups.clear();
    }

    /// Returns true exactly once per group per scene.
    pub fn claim_group(&mut self, group: &str) -> bool {
        self.fired_groups.insert(group.to_string())
    }
}

/// Fires a dialog line when a matching body wanders in, or when the
/// player's ray grab lands on it. Optionally gated on every listed pot
/// being satisfied; a blocked trigger stays armed.
#[derive(Debug)]
pub struct ProximityDialogTrigger {
    name: String,
    index: usize,
    force: bool,
    /// Tag the entering body must carry. `None` accepts any body.
    tag_filter: Option<String>,
    one_shot: bool,
    fired: bool,
    gate_pots: Vec<Rc<RefCell<MembershipPotTracker>>>,
    sender: Option<SignalSender<PlayRequest>>,
}

impl ProximityDialogTrigger {
    pub fn new(name: &str, index: usize) -> Self {
        ProximityDialogTrigger {
            name: name.to_string(),
            index,
            force: false,
            tag_filter: None,
            one_shot: true,
            fired: false,
            gate_pots: Vec::new(),
            sender: None,
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag_filter = Some(tag.to_string());
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn repeating(mut self) -> Self {
        self.one_shot = false;
        self
    }

    pub fn gated_on(mut self, pots: Vec<Rc<RefCell<MembershipPotTracker>>>) -> Self {
        self.gate_pots = pots;
        self
    }

    pub fn bind(&mut self, sender: SignalSender<PlayRequest>) {
        self.sender = Some(sender);
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    fn gate_open(&self) -> bool {
        self.gate_pots.iter().all(|pot| pot.borrow().is_satisfied())
    }

    fn fire(&mut self, stage: &mut StageContext) {
        let Some(sender) = self.sender.as_ref() else {
            eprintln!(
                "[sprout_engine] trigger '{}' fired before binding, dropping",
                self.name
            );
            return;
        };
        if !self.gate_open() {
            stage.log_event(format!("trigger.blocked {}", self.name));
            return;
        }
        if self.one_shot {
            self.fired = true;
        }
        stage.log_event(format!("trigger.fire {} -> {}", self.name, self.index));
        sender.send(PlayRequest {
            index: self.index,
            force: self.force,
        });
    }

    pub fn on_body_enter(&mut self, tag: &str, stage: &mut StageContext) {
        if self.fired {
            return;
        }
        if let Some(filter) = self.tag_filter.as_deref() {
            if filter != tag {
                return;
            }
        }
        self.fire(stage);
    }

    pub fn on_ray_grab(&mut self, stage: &mut StageContext) {
        if self.fired {
            return;
        }
        self.fire(stage);
    }
}

/// Fires a dialog line the first time its item is grabbed. Triggers that
/// share a `group` share one shot per scene.
#[derive(Debug)]
pub struct GrabDialogTrigger {
    item_name: String,
    index: usize,
    force: bool,
    group: Option<String>,
    fired: bool,
    sender: Option<SignalSender<PlayRequest>>,
}

impl GrabDialogTrigger {
    pub fn new(item_name: &str, index: usize) -> Self {
        GrabDialogTrigger {
            item_name: item_name.to_string(),
            index,
            force: false,
            group: None,
            fired: false,
            sender: None,
        }
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn bind(&mut self, sender: SignalSender<PlayRequest>) {
        self.sender = Some(sender);
    }

    pub fn on_grabbed(&mut self, scene: &mut SceneTriggerContext, stage: &mut StageContext) {
        if self.fired {
            return;
        }
        let Some(sender) = self.sender.as_ref() else {
            eprintln!(
                "[sprout_engine] grab trigger '{}' fired before binding, dropping",
                self.item_name
            );
            return;
        };
        if let Some(group) = self.group.as_deref() {
            if !scene.claim_group(group) {
                self.fired = true;
                return;
            }
        }
        self.fired = true;
        stage.log_event(format!("trigger.grab {} -> {}", self.item_name, self.index));
        sender.send(PlayRequest {
            index: self.index,
            force: self.force,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalQueue;

    #[test]
    fn proximity_trigger_filters_tags_and_fires_once() {
        let queue = SignalQueue::new();
        let mut stage = StageContext::new(false);
        let mut trigger = ProximityDialogTrigger::new("near_pots", 10).with_tag("Player");
        trigger.bind(queue.sender());

        trigger.on_body_enter("Seed", &mut stage);
        assert!(queue.is_empty());
        trigger.on_body_enter("Player", &mut stage);
        trigger.on_body_enter("Player", &mut stage);
        assert_eq!(queue.drain(), vec![PlayRequest::ordered(10)]);
        assert!(trigger.has_fired());
    }

    #[test]
    fn gated_trigger_stays_armed_until_pots_satisfied() {
        let queue = SignalQueue::new();
        let pot_queue = SignalQueue::new();
        let mut stage = StageContext::new(false);

        let pot = Rc::new(RefCell::new(MembershipPotTracker::new(0, "CompoundX", 1)));
        pot.borrow_mut().bind(pot_queue.sender());

        let mut trigger =
            ProximityDialogTrigger::new("refill_done", 10).gated_on(vec![Rc::clone(&pot)]);
        trigger.bind(queue.sender());

        trigger.on_body_enter("Player", &mut stage);
        assert!(queue.is_empty());
        assert!(!trigger.has_fired());

        pot.borrow_mut().force_satisfied();
        trigger.on_body_enter("Player", &mut stage);
        assert_eq!(queue.drain(), vec![PlayRequest::ordered(10)]);
    }

    #[test]
    fn grab_group_shares_a_single_shot_per_scene() {
        let queue = SignalQueue::new();
        let mut stage = StageContext::new(false);
        let mut scene = SceneTriggerContext::new("chapter_1");

        let mut seed_a = GrabDialogTrigger::new("seed_a", 5).in_group("seed_intro");
        let mut seed_b = GrabDialogTrigger::new("seed_b", 5).in_group("seed_intro");
        seed_a.bind(queue.sender());
        seed_b.bind(queue.sender());

        seed_a.on_grabbed(&mut scene, &mut stage);
        seed_b.on_grabbed(&mut scene, &mut stage);
        assert_eq!(queue.drain(), vec![PlayRequest::ordered(5)]);

        // A fresh scene re-arms the group.
        scene.enter_scene("chapter_1");
        let mut seed_c = GrabDialogTrigger::new("seed_c", 5).in_group("seed_intro");
        seed_c.bind(queue.sender());
        seed_c.on_grabbed(&mut scene, &mut stage);
        assert_eq!(queue.drain(), vec![PlayRequest::ordered(5)]);
    }

    #[test]
    fn ray_grab_ignores_tag_filter() {
        let queue = SignalQueue::new();
        let mut stage = StageContext::new(false);
        let mut trigger = ProximityDialogTrigger::new("poster", 18).with_tag("Player").forced();
        trigger.bind(queue.sender());
        trigger.on_ray_grab(&mut stage);
        assert_eq!(queue.drain(), vec![PlayRequest::forced(18)]);
    }
}
