//! Pot condition trackers.
//!
//! Three flavours of "did the learner put the right thing in the pot":
//! seed pots (chapter 1, first qualifying deposit only), dosing pots
//! (chapter 3, accumulate grams of compound X), and membership pots
//! (chapter 3, count distinct objects currently inside). Each tracker is
//! bound to a sequencer's signal queue before the world starts ticking;
//! an unbound tracker drops the contact with a diagnostic.

use std::collections::HashSet;

use crate::signals::{Ch1Signal, Ch3Signal, SignalSender};
use crate::stage::StageContext;

/// An object making or breaking contact with a pot's trigger volume.
#[derive(Debug, Clone)]
pub struct DepositItem {
    /// Scene-unique identity, used for membership dedupe.
    pub object_id: String,
    pub tag: String,
    /// Whether the object is a simulated body. Seed pots ignore
    /// tag-matching decals and UI ghosts that carry no body.
    pub has_body: bool,
    /// Grams carried, for dosing deposits. `None` means the default dose.
    pub amount: Option<f32>,
}

impl DepositItem {
    pub fn new(object_id: &str, tag: &str) -> Self {
        DepositItem {
            object_id: object_id.to_string(),
            tag: tag.to_string(),
            has_body: true,
            amount: None,
        }
    }

    pub fn without_body(mut self) -> Self {
        self.has_body = false;
        self
    }

    pub fn with_amount(mut self, amount: f32) -> Self {
        self.amount = Some(amount);
        self
    }
}

const DEFAULT_DOSE: f32 = 1.0;

/// Chapter 1 seed pot: reports the first qualifying seed and then goes
/// quiet for the rest of the scene.
#[derive(Debug)]
pub struct SeedPotTracker {
    pot: usize,
    seed_tag: String,
    has_seed: bool,
    sender: Option<SignalSender<Ch1Signal>>,
}

impl SeedPotTracker {
    pub fn new(pot: usize, seed_tag: &str) -> Self {
        SeedPotTracker {
            pot,
            seed_tag: seed_tag.to_string(),
            has_seed: false,
            sender: None,
        }
    }

    pub fn bind(&mut self, sender: SignalSender<Ch1Signal>) {
        self.sender = Some(sender);
    }

    pub fn pot(&self) -> usize {
        self.pot
    }

    pub fn has_seed(&self) -> bool {
        self.has_seed
    }

    pub fn on_item_enter(&mut self, item: &DepositItem, stage: &mut StageContext) {
        if self.has_seed || item.tag != self.seed_tag || !item.has_body {
            return;
        }
        let Some(sender) = self.sender.as_ref() else {
            eprintln!(
                "[sprout_engine] seed pot {} contacted before binding, dropping {}",
                self.pot, item.object_id
            );
            return;
        };
        self.has_seed = true;
        stage.log_event(format!("pot.seed {} {}", self.pot, item.object_id));
        sender.send(Ch1Signal::SeedPlaced(self.pot));
    }
}

/// Chapter 3 dosing pot: accumulates compound X without ever decrementing.
/// Satisfaction is a monotonic edge once the running total reaches the
/// requirement.
#[derive(Debug)]
pub struct AmountPotTracker {
    pot: usize,
    dose_tag: String,
    required: f32,
    accumulated: f32,
    satisfied: bool,
    sender: Option<SignalSender<Ch3Signal>>,
}

impl AmountPotTracker {
    pub fn new(pot: usize, dose_tag: &str, required: f32) -> Self {
        AmountPotTracker {
            pot,
            dose_tag: dose_tag.to_string(),
            required,
            accumulated: 0.0,
            satisfied: false,
            sender: None,
        }
    }

    pub fn bind(&mut self, sender: SignalSender<Ch3Signal>) {
        self.sender = Some(sender);
        // A zero requirement is met before anything is poured.
        self.refresh_satisfaction();
    }

    pub fn pot(&self) -> usize {
        self.pot
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// Reports the satisfaction edge exactly once; deposits below the
    /// requirement stay silent apart from the event-log line.
    fn refresh_satisfaction(&mut self) {
        if self.satisfied || self.accumulated < self.required {
            return;
        }
        self.satisfied = true;
        if let Some(sender) = self.sender.as_ref() {
            sender.send(Ch3Signal::DoseSatisfied { pot: self.pot });
        }
    }

    pub fn on_item_enter(&mut self, item: &DepositItem, stage: &mut StageContext) {
        if item.tag != self.dose_tag {
            return;
        }
        if self.sender.is_none() {
            eprintln!(
                "[sprout_engine] dosing pot {} contacted before binding, dropping {}",
                self.pot, item.object_id
            );
            return;
        }
        let dose = item.amount.unwrap_or(DEFAULT_DOSE);
        self.accumulated += dose;
        stage.log_event(format!(
            "pot.dose {} +{:.1} (total {:.1}/{:.1})",
            self.pot, dose, self.accumulated, self.required
        ));
        self.refresh_satisfaction();
    }
}

/// Chapter 3 membership pot: counts the distinct tagged objects currently
/// inside. Satisfaction can flip both ways as objects leave, unless it
/// has been forced.
#[derive(Debug)]
pub struct MembershipPotTracker {
    pot: usize,
    tag: String,
    required: usize,
    members: HashSet<String>,
    satisfied: bool,
    forced: bool,
    sender: Option<SignalSender<Ch3Signal>>,
}

impl MembershipPotTracker {
    pub fn new(pot: usize, tag: &str, required: usize) -> Self {
        MembershipPotTracker {
            pot,
            tag: tag.to_string(),
            required,
            members: HashSet::new(),
            satisfied: false,
            forced: false,
            sender: None,
        }
    }

    pub fn bind(&mut self, sender: SignalSender<Ch3Signal>) {
        self.sender = Some(sender);
        // A pot requiring nothing is satisfied from the start; report the
        // edge immediately so the checks UI can show it.
        if self.required == 0 {
            self.set_satisfied(true);
        }
    }

    pub fn pot(&self) -> usize {
        self.pot
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// Pins the pot satisfied regardless of later departures.
    pub fn force_satisfied(&mut self) {
        self.forced = true;
        self.set_satisfied(true);
    }

    fn set_satisfied(&mut self, satisfied: bool) {
        if self.satisfied == satisfied {
            return;
        }
        self.satisfied = satisfied;
        if let Some(sender) = self.sender.as_ref() {
            sender.send(Ch3Signal::PotStatusChanged {
                pot: self.pot,
                satisfied,
            });
        }
    }

    fn reevaluate(&mut self) {
        let now = self.forced || self.members.len() >= self.required;
        self.set_satisfied(now);
    }

    pub fn on_item_enter(&mut self, item: &DepositItem, stage: &mut StageContext) {
        if item.tag != self.tag {
            return;
        }
        if self.sender.is_none() {
            eprintln!(
                "[sprout_engine] membership pot {} contacted before binding, dropping {}",
                self.pot, item.object_id
            );
            return;
        }
        if self.members.insert(item.object_id.clone()) {
            stage.log_event(format!(
                "pot.enter {} {} ({}/{})",
                self.pot,
                item.object_id,
                self.members.len(),
                self.required
            ));
            self.reevaluate();
        }
    }

    pub fn on_item_exit(&mut self, item: &DepositItem, stage: &mut StageContext) {
        if item.tag != self.tag {
            return;
        }
        if self.members.remove(&item.object_id) {
            stage.log_event(format!(
                "pot.exit {} {} ({}/{})",
                self.pot,
                item.object_id,
                self.members.len(),
                self.required
            ));
            self.reevaluate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalQueue;

    #[test]
    fn seed_pot_reports_first_qualifying_seed_only() {
        let queue = SignalQueue::new();
        let mut stage = StageContext::new(false);
        let mut pot = SeedPotTracker::new(2, "Seed");
        pot.bind(queue.sender());

        pot.on_item_enter(&DepositItem::new("decal", "Seed").without_body(), &mut stage);
        pot.on_item_enter(&DepositItem::new("rock_1", "Rock"), &mut stage);
        assert!(queue.is_empty());

        pot.on_item_enter(&DepositItem::new("seed_1", "Seed"), &mut stage);
        pot.on_item_enter(&DepositItem::new("seed_2", "Seed"), &mut stage);
        assert_eq!(queue.drain(), vec![Ch1Signal::SeedPlaced(2)]);
        assert!(pot.has_seed());
    }

    #[test]
    fn dosing_pot_accumulates_and_never_decrements() {
        let queue = SignalQueue::new();
        let mut stage = StageContext::new(false);
        let mut pot = AmountPotTracker::new(3, "X", 4.0);
        pot.bind(queue.sender());

        pot.on_item_enter(&DepositItem::new("x_1", "X").with_amount(2.0), &mut stage);
        assert!(!pot.is_satisfied());
        pot.on_item_enter(&DepositItem::new("x_2", "X"), &mut stage);
        assert_eq!(pot.accumulated(), 3.0);
        // Deposits below the requirement stay silent.
        assert!(queue.is_empty());

        pot.on_item_enter(&DepositItem::new("x_3", "X").with_amount(5.0), &mut stage);
        assert!(pot.is_satisfied());
        assert_eq!(pot.accumulated(), 8.0);
        assert_eq!(queue.drain(), vec![Ch3Signal::DoseSatisfied { pot: 3 }]);

        // Further pours keep accumulating without a second report.
        pot.on_item_enter(&DepositItem::new("x_4", "X"), &mut stage);
        assert_eq!(pot.accumulated(), 9.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn zero_dose_requirement_is_satisfied_at_bind() {
        let queue = SignalQueue::new();
        let mut pot = AmountPotTracker::new(0, "X", 0.0);
        pot.bind(queue.sender());
        assert!(pot.is_satisfied());
        assert_eq!(queue.drain(), vec![Ch3Signal::DoseSatisfied { pot: 0 }]);
    }

    #[test]
    fn membership_pot_edges_both_ways() {
        let queue = SignalQueue::new();
        let mut stage = StageContext::new(false);
        let mut pot = MembershipPotTracker::new(1, "CompoundX", 2);
        pot.bind(queue.sender());

        let a = DepositItem::new("cube_a", "CompoundX");
        let b = DepositItem::new("cube_b", "CompoundX");
        pot.on_item_enter(&a, &mut stage);
        assert!(queue.is_empty());
        pot.on_item_enter(&b, &mut stage);
        assert_eq!(
            queue.drain(),
            vec![Ch3Signal::PotStatusChanged {
                pot: 1,
                satisfied: true
            }]
        );
        // Re-entry of a known member is not a change.
        pot.on_item_enter(&a, &mut stage);
        assert!(queue.is_empty());

        pot.on_item_exit(&a, &mut stage);
        assert_eq!(
            queue.drain(),
            vec![Ch3Signal::PotStatusChanged {
                pot: 1,
                satisfied: false
            }]
        );
    }

    #[test]
    fn forced_pot_survives_departures() {
        let queue = SignalQueue::new();
        let mut stage = StageContext::new(false);
        let mut pot = MembershipPotTracker::new(0, "CompoundX", 3);
        pot.bind(queue.sender());
        pot.force_satisfied();
        assert_eq!(queue.drain().len(), 1);

        let a = DepositItem::new("cube_a", "CompoundX");
        pot.on_item_enter(&a, &mut stage);
        pot.on_item_exit(&a, &mut stage);
        assert!(pot.is_satisfied());
        assert!(queue.is_empty());
    }

    #[test]
    fn zero_requirement_is_satisfied_at_bind() {
        let queue = SignalQueue::new();
        let mut pot = MembershipPotTracker::new(0, "CompoundX", 0);
        pot.bind(queue.sender());
        assert!(pot.is_satisfied());
        assert_eq!(
            queue.drain(),
            vec![Ch3Signal::PotStatusChanged {
                pot: 0,
                satisfied: true
            }]
        );
    }
}
