//! Chapter 1 sequencer: strictly ordered dialog with seed and water gates.
//!
//! The first `first_auto_count` lines autoplay back to back. After that,
//! lines are requested by world triggers and must arrive in order: a
//! request beyond `next_allowed` is dropped. Line 10 opens the seeding
//! phase (six unique pots), the watering zone closes it (possibly via the
//! early-watering latch), and line 11 hands the scene off to chapter 3.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use sprout_script::{ChapterOneConfig, Script, SCRIPT_LEN};

use crate::sequencer::line::{LineProgress, LineTask};
use crate::signals::{Ch1Signal, PlayRequest, SignalQueue, SignalSender};
use crate::stage::StageContext;
use crate::trackers::SeedPotTracker;

pub const CONTINUE_BUTTON: &str = "ui.continue_button";

/// Outline slot for the watering can, the last entry in the configured
/// outline prop list.
const WATER_CAN_SLOT: usize = 4;

#[derive(Debug)]
pub struct ChapterOneSequencer {
    config: ChapterOneConfig,
    played: [bool; SCRIPT_LEN],
    next_allowed: usize,
    current: Option<LineTask>,
    /// Next index the start-of-scene autoplay will run, while active.
    autoplay_next: Option<usize>,
    waiting_for_seeds: bool,
    waiting_for_water: bool,
    water_done_early: bool,
    seeded_pots: BTreeSet<usize>,
    pots: Vec<Rc<RefCell<SeedPotTracker>>>,
    outline_slot: Option<usize>,
    scene_countdown: Option<f32>,
    play_requests: SignalQueue<PlayRequest>,
    world: SignalQueue<Ch1Signal>,
    chain_sender: SignalSender<PlayRequest>,
}

impl ChapterOneSequencer {
    pub fn new(config: ChapterOneConfig) -> Self {
        let play_requests = SignalQueue::new();
        let world = SignalQueue::new();
        let pots: Vec<_> = (0..config.required_seed_pots)
            .map(|pot| {
                let tracker = SeedPotTracker::new(pot, &config.seed_tag);
                Rc::new(RefCell::new(tracker))
            })
            .collect();
        for pot in &pots {
            pot.borrow_mut().bind(world.sender());
        }
        let chain_sender = play_requests.sender();
        ChapterOneSequencer {
            config,
            played: [false; SCRIPT_LEN],
            next_allowed: 0,
            current: None,
            autoplay_next: Some(0),
            waiting_for_seeds: false,
            waiting_for_water: false,
            water_done_early: false,
            seeded_pots: BTreeSet::new(),
            pots,
            outline_slot: None,
            scene_countdown: None,
            play_requests,
            world,
            chain_sender,
        }
    }

    /// Sender for triggers and UI that want to request lines.
    pub fn play_sender(&self) -> SignalSender<PlayRequest> {
        self.play_requests.sender()
    }

    /// The seed pot trackers this sequencer listens to. The world routes
    /// deposit contacts to these.
    pub fn pots(&self) -> &[Rc<RefCell<SeedPotTracker>>] {
        &self.pots
    }

    pub fn has_played(&self, index: usize) -> bool {
        Script::is_valid_index(index) && self.played[index]
    }

    pub fn next_allowed(&self) -> usize {
        self.next_allowed
    }

    pub fn is_waiting_for_seeds(&self) -> bool {
        self.waiting_for_seeds
    }

    pub fn is_waiting_for_water(&self) -> bool {
        self.waiting_for_water
    }

    pub fn seeded_count(&self) -> usize {
        self.seeded_pots.len()
    }

    /// Watering-zone notification, the `water_tag` contact path.
    pub fn notify_watering_done(&mut self, stage: &mut StageContext) {
        if self.seeded_pots.len() >= self.config.required_seed_pots {
            self.waiting_for_water = false;
            self.waiting_for_seeds = false;
            stage.log_event("chapter1.watered");
            self.handle_request(PlayRequest::ordered(11), stage);
        } else if self.waiting_for_seeds {
            self.water_done_early = true;
            stage.log_event(format!(
                "chapter1.water_early ({}/{} pots seeded)",
                self.seeded_pots.len(),
                self.config.required_seed_pots
            ));
        } else {
            eprintln!(
                "[sprout_engine] watering reported with {}/{} pots seeded and no seed phase open",
                self.seeded_pots.len(),
                self.config.required_seed_pots
            );
        }
    }

    /// Grabbing the watering can clears its outline highlight.
    pub fn notify_water_can_grabbed(&mut self, stage: &mut StageContext) {
        if let Some(prop) = self.config.outline_props.get(WATER_CAN_SLOT) {
            stage.set_visible(prop, false);
            if self.outline_slot == Some(WATER_CAN_SLOT) {
                self.outline_slot = None;
            }
        }
    }

    pub fn advance(&mut self, dt: f32, stage: &mut StageContext) {
        for request in self.play_requests.drain() {
            self.handle_request(request, stage);
        }
        for signal in self.world.drain() {
            match signal {
                Ch1Signal::SeedPlaced(pot) => self.on_seed_placed(pot, stage),
                Ch1Signal::WateringDone => self.notify_watering_done(stage),
            }
        }

        if let Some(remaining) = self.scene_countdown.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.scene_countdown = None;
                self.switch_scene(stage);
            }
        }

        let mut finished = None;
        if let Some(task) = self.current.as_mut() {
            if task.advance(dt, stage) == LineProgress::Finished {
                finished = Some(task.index());
            }
        }
        if let Some(index) = finished {
            self.current = None;
            self.post_line(index, stage);
        }

        if self.current.is_none() {
            if let Some(next) = self.autoplay_next {
                if next < self.config.first_auto_count.min(SCRIPT_LEN) {
                    self.autoplay_next = Some(next + 1);
                    self.start_line(next, stage);
                } else {
                    self.autoplay_next = None;
                }
            }
        }
    }

    fn handle_request(&mut self, request: PlayRequest, stage: &mut StageContext) {
        let index = request.index;
        if !Script::is_valid_index(index) {
            stage.log_event(format!("dialog.reject {index} (out of range)"));
            return;
        }
        if self.played[index] {
            stage.log_event(format!("dialog.reject {index} (already played)"));
            return;
        }
        if !request.force && index > self.next_allowed {
            stage.log_event(format!(
                "dialog.reject {index} (next allowed {})",
                self.next_allowed
            ));
            return;
        }
        self.autoplay_next = None;
        if let Some(task) = self.current.take() {
            task.abandon(stage);
        }
        self.start_line(index, stage);
    }

    fn start_line(&mut self, index: usize, stage: &mut StageContext) {
        self.played[index] = true;
        if (4..=9).contains(&index) {
            self.switch_outline(index - 4, stage);
        }
        let line = self.config.script.line(index);
        let post_delay = line.post_delay_secs;
        self.current = Some(LineTask::start(index, line, post_delay, stage));
    }

    fn post_line(&mut self, index: usize, stage: &mut StageContext) {
        match index {
            8 => self.chain_sender.send(PlayRequest::ordered(9)),
            9 => self.chain_sender.send(PlayRequest::ordered(10)),
            10 => self.open_seed_phase(stage),
            11 => {
                stage.log_event(format!(
                    "chapter1.scene_countdown {:.1}s",
                    self.config.scene_switch_delay
                ));
                self.scene_countdown = Some(self.config.scene_switch_delay);
            }
            i if i > 11 && i < SCRIPT_LEN - 1 => {
                self.chain_sender.send(PlayRequest::ordered(i + 1));
            }
            _ => {}
        }
        if index == SCRIPT_LEN - 1 {
            stage.set_visible(CONTINUE_BUTTON, true);
        }
        if index + 1 > self.next_allowed {
            self.next_allowed = index + 1;
        }
    }

    /// Line 10 has asked for the seeds. Pots seeded ahead of time count.
    fn open_seed_phase(&mut self, stage: &mut StageContext) {
        self.waiting_for_seeds = true;
        self.seeded_pots.clear();
        for pot in &self.pots {
            let pot = pot.borrow();
            if pot.has_seed() {
                self.seeded_pots.insert(pot.pot());
            }
        }
        stage.log_event(format!(
            "chapter1.seed_phase ({}/{} already seeded)",
            self.seeded_pots.len(),
            self.config.required_seed_pots
        ));
        if self.seeded_pots.len() >= self.config.required_seed_pots {
            self.waiting_for_seeds = false;
            self.waiting_for_water = true;
        }
    }

    fn on_seed_placed(&mut self, pot: usize, stage: &mut StageContext) {
        if !self.waiting_for_seeds {
            stage.log_event(format!("chapter1.seed_ignored {pot}"));
            return;
        }
        if pot >= self.pots.len() {
            eprintln!("[sprout_engine] seed report from unknown pot {pot}");
            return;
        }
        if !self.seeded_pots.insert(pot) {
            return;
        }
        stage.log_event(format!(
            "chapter1.seeded {}/{}",
            self.seeded_pots.len(),
            self.config.required_seed_pots
        ));
        if self.seeded_pots.len() >= self.config.required_seed_pots {
            self.waiting_for_seeds = false;
            self.waiting_for_water = true;
            if self.water_done_early {
                self.water_done_early = false;
                self.waiting_for_water = false;
                self.handle_request(PlayRequest::ordered(11), stage);
            }
        }
    }

    fn switch_outline(&mut self, slot: usize, stage: &mut StageContext) {
        if let Some(previous) = self.outline_slot.take() {
            if let Some(prop) = self.config.outline_props.get(previous) {
                stage.set_visible(prop, false);
            }
        }
        self.outline_slot = Some(slot);
        if let Some(prop) = self.config.outline_props.get(slot) {
            stage.set_visible(prop, true);
        }
    }

    fn switch_scene(&mut self, stage: &mut StageContext) {
        let name = self.config.next_scene_name.clone();
        if let Err(err) = stage.request_scene(&name) {
            eprintln!("[sprout_engine] chapter 1 scene switch failed: {err}");
            stage.log_event(format!("scene.abort {err}"));
        }
    }
}
