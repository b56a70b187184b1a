//! Chapter 3 sequencer: results review, growth time-skip, graphs, quiz.
//!
//! Lines 0..=11 autoplay with inter-line delays, pausing at line 9 until
//! every compound-X pot is satisfied. The five-weeks button runs the
//! growth sequence around line 12 and auto-continues 13..=16. Measuring
//! all six plants forces line 17, which opens the graph and quiz flow
//! driven by UI buttons. Requests are reentrancy-guarded rather than
//! strictly ordered: a line can start only when no line is in flight.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use sprout_script::chapter::CH3_POT_COUNT;
use sprout_script::{ChapterThreeConfig, Script, SCRIPT_LEN};

use crate::sequencer::line::{LineProgress, LineTask};
use crate::signals::{Ch3Signal, PlayRequest, SignalQueue, SignalSender};
use crate::snap::{Pose, RulerSnapController, SnapZone, ZONE_COUNT};
use crate::stage::StageContext;
use crate::trackers::{AmountPotTracker, MembershipPotTracker};

pub const FIVE_WEEKS_BUTTON: &str = "ui.five_weeks_button";
pub const CONTINUE_BUTTON: &str = "ui.continue_button";
const DIALOG_PANEL: &str = "ui.dialog_panel";
const CHART: &str = "ui.chart";
const NUMBER_UI: &str = "ui.numbers";
const TABLE: &str = "prop.table";
const COMPOUND_X: &str = "prop.compound_x";
const SEED_UI: &str = "ui.seeds";
const RULER: &str = "prop.ruler";
const SNAP_AREA: &str = "prop.snap_area";
const GRAPH_PANEL: &str = "ui.graph_panel";
const LINE_GRAPH_BUTTON: &str = "ui.line_graph_button";
const BAR_GRAPH_BUTTON: &str = "ui.bar_graph_button";
const LINE_GRAPH: &str = "ui.line_graph";
const BAR_GRAPH: &str = "ui.bar_graph";
const QUIZ_PANEL: &str = "ui.quiz_panel";
const CORRECT_PANEL: &str = "ui.correct_panel";
const TRY_AGAIN_PANEL: &str = "ui.try_again_panel";
const VISIBLE_ROOT: &str = "stage.visible_root";
const PLANTS: &str = "prop.plants";
const GROW_SFX: &str = "sfx.grow";
const WINNING_SFX: &str = "sfx.winning";
const CHECK_SFX: &str = "sfx.check";

/// Where the fairy hovers while the plants shoot up.
const FAIRY_GROWTH_TARGET: Vec3 = Vec3::new(0.0, 1.4, 2.0);

fn check_prop(pot: usize) -> String {
    format!("ui.check_{pot}")
}

/// Demo layout for the six measurement zones, one per pot along the
/// table edge.
fn measurement_zones() -> Vec<SnapZone> {
    (0..ZONE_COUNT)
        .map(|i| {
            SnapZone::new(
                &format!("measure_pot_{i}"),
                Pose::at(Vec3::new(-0.75 + 0.3 * i as f32, 0.85, 0.4)),
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum GrowthPhase {
    InitialDelay { remaining: f32 },
    FairyMove { elapsed: f32, start: Vec3 },
    MidWait { remaining: f32 },
    SkyboxFade { elapsed: f32 },
}

#[derive(Debug, Clone, Copy)]
enum Flow {
    /// Playing `next` after `delay` runs out.
    Autoplay { next: usize, delay: f32 },
    AwaitFiveWeeks,
    /// Blackout hold between the five-weeks press and line 12.
    PreGrowth { remaining: f32 },
    /// Line 12 in flight; the growth sequence starts when it finishes.
    Line12,
    Growth(GrowthPhase),
    /// Auto-continue through `end` with inter-line delays.
    ContinueRange { next: usize, end: usize, delay: f32 },
    Idle,
}

#[derive(Debug)]
pub struct ChapterThreeSequencer {
    config: ChapterThreeConfig,
    played: [bool; SCRIPT_LEN],
    current: Option<LineTask>,
    flow: Flow,
    /// The first tick blacks out the skybox; the growth fade restores it.
    scene_started: bool,
    reached_index9: bool,
    /// Line 9 finished but the pots have not; polled until they have.
    gate_waiting: bool,
    checks_shown: [bool; CH3_POT_COUNT],
    membership_pots: Vec<Rc<RefCell<MembershipPotTracker>>>,
    dose_pots: Vec<Rc<RefCell<AmountPotTracker>>>,
    ruler: Rc<RefCell<RulerSnapController>>,
    play_requests: SignalQueue<PlayRequest>,
    world: SignalQueue<Ch3Signal>,
}

impl ChapterThreeSequencer {
    pub fn new(config: ChapterThreeConfig) -> Self {
        let play_requests = SignalQueue::new();
        let world = SignalQueue::new();

        let membership_pots: Vec<_> = config
            .pot_required_counts
            .iter()
            .enumerate()
            .map(|(pot, required)| {
                let tracker = MembershipPotTracker::new(pot, &config.compound_tag, *required);
                Rc::new(RefCell::new(tracker))
            })
            .collect();
        let dose_pots: Vec<_> = config
            .dose_required_amounts
            .iter()
            .enumerate()
            .map(|(pot, required)| {
                let tracker = AmountPotTracker::new(pot, &config.dose_tag, *required);
                Rc::new(RefCell::new(tracker))
            })
            .collect();
        let mut ruler = RulerSnapController::new(config.ruler.clone(), measurement_zones());
        ruler.bind(world.sender());
        for pot in &membership_pots {
            pot.borrow_mut().bind(world.sender());
        }
        for pot in &dose_pots {
            pot.borrow_mut().bind(world.sender());
        }

        ChapterThreeSequencer {
            config,
            played: [false; SCRIPT_LEN],
            current: None,
            flow: Flow::Autoplay {
                next: 0,
                delay: 0.0,
            },
            scene_started: false,
            reached_index9: false,
            gate_waiting: false,
            checks_shown: [false; CH3_POT_COUNT],
            membership_pots,
            dose_pots,
            ruler: Rc::new(RefCell::new(ruler)),
            play_requests,
            world,
        }
    }

    pub fn play_sender(&self) -> SignalSender<PlayRequest> {
        self.play_requests.sender()
    }

    pub fn membership_pots(&self) -> &[Rc<RefCell<MembershipPotTracker>>] {
        &self.membership_pots
    }

    pub fn dose_pots(&self) -> &[Rc<RefCell<AmountPotTracker>>] {
        &self.dose_pots
    }

    pub fn ruler(&self) -> Rc<RefCell<RulerSnapController>> {
        Rc::clone(&self.ruler)
    }

    pub fn has_played(&self, index: usize) -> bool {
        Script::is_valid_index(index) && self.played[index]
    }

    pub fn is_awaiting_five_weeks(&self) -> bool {
        matches!(self.flow, Flow::AwaitFiveWeeks)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.flow, Flow::Idle) && self.current.is_none()
    }

    pub fn is_gate_waiting(&self) -> bool {
        self.gate_waiting
    }

    pub fn reached_index9(&self) -> bool {
        self.reached_index9
    }

    fn busy(&self) -> bool {
        self.current.is_some() || self.gate_waiting
    }

    fn all_pots_satisfied(&self) -> bool {
        self.membership_pots
            .iter()
            .all(|pot| pot.borrow().is_satisfied())
    }

    pub fn advance(&mut self, dt: f32, stage: &mut StageContext) {
        if !self.scene_started {
            self.scene_started = true;
            stage.skybox_set_black();
        }
        for request in self.play_requests.drain() {
            self.handle_request(request, stage);
        }
        for signal in self.world.drain() {
            match signal {
                Ch3Signal::PotStatusChanged { .. } => self.update_checks_ui(stage),
                Ch3Signal::DoseSatisfied { .. } => self.update_checks_ui(stage),
                Ch3Signal::AllZonesMeasured => {
                    stage.log_event("chapter3.all_measured");
                    self.handle_request(PlayRequest::forced(17), stage);
                }
            }
        }

        if self.gate_waiting && self.all_pots_satisfied() {
            self.gate_waiting = false;
            stage.log_event("chapter3.gate_open");
            self.update_checks_ui(stage);
            self.flow = Flow::Autoplay {
                next: 10,
                delay: self.config.delay_after(9),
            };
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
            self.on_line_finished(index, stage);
        }

        if self.current.is_none() && !self.gate_waiting {
            self.step_flow(dt, stage);
        }
    }

    fn step_flow(&mut self, dt: f32, stage: &mut StageContext) {
        match self.flow {
            Flow::Autoplay { next, delay } => {
                let delay = delay - dt;
                if delay <= 0.0 {
                    self.start_line(next, stage);
                } else {
                    self.flow = Flow::Autoplay { next, delay };
                }
            }
            Flow::PreGrowth { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    stage.set_visible(DIALOG_PANEL, true);
                    self.flow = Flow::Line12;
                    self.start_line(12, stage);
                } else {
                    self.flow = Flow::PreGrowth { remaining };
                }
            }
            Flow::Growth(phase) => self.step_growth(phase, dt, stage),
            Flow::ContinueRange { next, end, delay } => {
                let delay = delay - dt;
                if delay <= 0.0 {
                    self.start_line(next, stage);
                } else {
                    self.flow = Flow::ContinueRange { next, end, delay };
                }
            }
            Flow::AwaitFiveWeeks | Flow::Line12 | Flow::Idle => {}
        }
    }

    fn step_growth(&mut self, phase: GrowthPhase, dt: f32, stage: &mut StageContext) {
        match phase {
            GrowthPhase::InitialDelay { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    stage.set_visible(VISIBLE_ROOT, false);
                    stage.play_cue(GROW_SFX);
                    stage.set_visible(PLANTS, true);
                    stage.set_visible(COMPOUND_X, false);
                    stage.set_visible(SEED_UI, false);
                    self.flow = Flow::Growth(GrowthPhase::FairyMove {
                        elapsed: 0.0,
                        start: stage.fairy_position(),
                    });
                } else {
                    self.flow = Flow::Growth(GrowthPhase::InitialDelay { remaining });
                }
            }
            GrowthPhase::FairyMove { elapsed, start } => {
                let elapsed = elapsed + dt;
                let t = (elapsed / self.config.fairy_move_duration).clamp(0.0, 1.0);
                let eased = t * t * (3.0 - 2.0 * t);
                stage.set_fairy_position(start.lerp(FAIRY_GROWTH_TARGET, eased));
                if t >= 1.0 {
                    stage.fairy_arrived(FAIRY_GROWTH_TARGET);
                    self.flow = Flow::Growth(GrowthPhase::MidWait {
                        remaining: self.config.index12_mid_wait,
                    });
                } else {
                    self.flow = Flow::Growth(GrowthPhase::FairyMove { elapsed, start });
                }
            }
            GrowthPhase::MidWait { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    stage.set_visible(VISIBLE_ROOT, true);
                    self.flow = Flow::Growth(GrowthPhase::SkyboxFade { elapsed: 0.0 });
                } else {
                    self.flow = Flow::Growth(GrowthPhase::MidWait { remaining });
                }
            }
            GrowthPhase::SkyboxFade { elapsed } => {
                let elapsed = elapsed + dt;
                let t = (elapsed / self.config.skybox_fade_duration).clamp(0.0, 1.0);
                stage.skybox_blend_to_original(t);
                if t >= 1.0 {
                    self.flow = Flow::ContinueRange {
                        next: 13,
                        end: 16,
                        delay: self.config.delay_after(12),
                    };
                } else {
                    self.flow = Flow::Growth(GrowthPhase::SkyboxFade { elapsed });
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
        if request.force {
            if let Some(task) = self.current.take() {
                task.abandon(stage);
            }
        } else if self.busy() {
            stage.log_event(format!("dialog.reject {index} (line in flight)"));
            return;
        }
        self.flow = Flow::Idle;
        self.start_line(index, stage);
    }

    fn start_line(&mut self, index: usize, stage: &mut StageContext) {
        self.played[index] = true;
        let line = self.config.script.line(index);
        // Inter-line delays live in the flow, not the line task.
        self.current = Some(LineTask::start(index, line, 0.0, stage));
    }

    fn post_line(&mut self, index: usize, stage: &mut StageContext) {
        match index {
            7 => stage.set_visible(CHART, true),
            9 => {
                stage.set_visible(CHART, false);
                stage.set_visible(NUMBER_UI, true);
                self.reached_index9 = true;
                if let Some(first) = self.membership_pots.first() {
                    let needs_force = first.borrow().required() == 0;
                    if needs_force {
                        first.borrow_mut().force_satisfied();
                    }
                }
                if self.all_pots_satisfied() {
                    self.update_checks_ui(stage);
                } else {
                    self.gate_waiting = true;
                    stage.log_event("chapter3.pot_gate");
                }
            }
            10 => stage.play_cue(WINNING_SFX),
            12 => {
                stage.set_visible(NUMBER_UI, false);
                stage.set_visible(TABLE, false);
                stage.set_visible(COMPOUND_X, false);
                stage.set_visible(SEED_UI, false);
                for pot in 0..CH3_POT_COUNT {
                    stage.set_visible(&check_prop(pot), false);
                    self.checks_shown[pot] = false;
                }
            }
            15 => {
                stage.set_visible(RULER, true);
                stage.set_visible(SNAP_AREA, true);
            }
            17 => {
                stage.set_visible(RULER, false);
                stage.set_visible(SNAP_AREA, false);
                stage.set_visible(GRAPH_PANEL, true);
                stage.set_visible(LINE_GRAPH_BUTTON, true);
                stage.set_visible(BAR_GRAPH_BUTTON, true);
            }
            _ => {}
        }
        if index == SCRIPT_LEN - 1 {
            stage.set_visible(CONTINUE_BUTTON, true);
        }
    }

    fn on_line_finished(&mut self, index: usize, stage: &mut StageContext) {
        match self.flow {
            Flow::Autoplay { .. } => {
                if self.gate_waiting {
                    // Resumption is decided when the gate opens.
                } else if index >= 11 {
                    self.flow = Flow::AwaitFiveWeeks;
                    stage.set_visible(FIVE_WEEKS_BUTTON, true);
                    stage.log_event("chapter3.autoplay_done");
                } else {
                    self.flow = Flow::Autoplay {
                        next: index + 1,
                        delay: self.config.delay_after(index),
                    };
                }
            }
            Flow::Line12 => {
                self.flow = Flow::Growth(GrowthPhase::InitialDelay {
                    remaining: self.config.index12_initial_delay,
                });
            }
            Flow::ContinueRange { end, .. } => {
                if index >= end {
                    self.flow = Flow::Idle;
                } else {
                    self.flow = Flow::ContinueRange {
                        next: index + 1,
                        end,
                        delay: self.config.delay_after(index),
                    };
                }
            }
            _ => {}
        }
    }

    fn update_checks_ui(&mut self, stage: &mut StageContext) {
        for pot in 0..CH3_POT_COUNT {
            let satisfied = self
                .membership_pots
                .get(pot)
                .map(|p| p.borrow().is_satisfied())
                .unwrap_or(false);
            let show = satisfied && (pot != 0 || self.reached_index9);
            if show && !self.checks_shown[pot] {
                stage.play_cue(CHECK_SFX);
            }
            self.checks_shown[pot] = show;
            stage.set_visible(&check_prop(pot), show);
        }
    }

    // UI buttons.

    pub fn on_five_weeks_pressed(&mut self, stage: &mut StageContext) {
        if !matches!(self.flow, Flow::AwaitFiveWeeks) {
            stage.log_event("chapter3.five_weeks_ignored");
            return;
        }
        stage.log_event("chapter3.five_weeks");
        stage.set_visible(FIVE_WEEKS_BUTTON, false);
        stage.set_visible(DIALOG_PANEL, false);
        stage.skybox_set_black();
        stage.set_visible(VISIBLE_ROOT, false);
        self.flow = Flow::PreGrowth {
            remaining: self.config.pre_growth_wait,
        };
    }

    /// The final continue button replays the growth sound.
    pub fn on_continue_pressed(&mut self, stage: &mut StageContext) {
        stage.play_cue(GROW_SFX);
    }

    pub fn on_line_graph_pressed(&mut self, stage: &mut StageContext) {
        stage.set_visible(LINE_GRAPH, true);
        stage.set_visible(BAR_GRAPH, false);
        self.ruler.borrow().hide_pea_height_ui(stage);
        self.handle_request(PlayRequest::forced(19), stage);
    }

    pub fn on_bar_graph_pressed(&mut self, stage: &mut StageContext) {
        stage.set_visible(BAR_GRAPH, true);
        stage.set_visible(LINE_GRAPH, false);
        self.ruler.borrow().show_pea_height_ui(stage);
        self.handle_request(PlayRequest::forced(20), stage);
    }

    pub fn on_quiz_pressed(&mut self, stage: &mut StageContext) {
        stage.set_visible(QUIZ_PANEL, true);
        stage.set_visible(GRAPH_PANEL, false);
        stage.set_visible(LINE_GRAPH, false);
        stage.set_visible(BAR_GRAPH, false);
        self.handle_request(PlayRequest::forced(21), stage);
    }

    pub fn on_quiz_line_answer(&mut self, stage: &mut StageContext) {
        stage.set_visible(CORRECT_PANEL, true);
        stage.set_visible(QUIZ_PANEL, false);
        stage.set_visible(LINE_GRAPH, true);
        self.handle_request(PlayRequest::forced(22), stage);
    }

    pub fn on_quiz_bar_answer(&mut self, stage: &mut StageContext) {
        stage.set_visible(TRY_AGAIN_PANEL, true);
        stage.set_visible(QUIZ_PANEL, false);
        stage.set_visible(BAR_GRAPH, true);
        self.handle_request(PlayRequest::forced(23), stage);
    }

    pub fn on_correct_next_pressed(&mut self, stage: &mut StageContext) {
        stage.set_visible(CORRECT_PANEL, false);
        self.handle_request(PlayRequest::forced(24), stage);
    }

    /// Returning to the quiz re-requests line 21, which is dropped as
    /// already played; only the panels change.
    pub fn on_back_to_quiz_pressed(&mut self, stage: &mut StageContext) {
        stage.set_visible(QUIZ_PANEL, true);
        stage.set_visible(TRY_AGAIN_PANEL, false);
        self.handle_request(PlayRequest::forced(21), stage);
    }
}
