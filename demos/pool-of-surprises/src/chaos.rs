//! Chaos effects: one at a time, swapped at random intervals.

use cue_engine::Rng;

use crate::balls::Ball;
use crate::config::ChaosTuning;
use crate::physics::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChaosEffect {
    PlainJane,
    StickySituation,
    HoverHavoc,
    BiggieSmalls,
    FrictionAffliction,
    TiltATable,
    GetGaslit,
}

impl ChaosEffect {
    pub const ALL: [ChaosEffect; 7] = [
        ChaosEffect::PlainJane,
        ChaosEffect::StickySituation,
        ChaosEffect::HoverHavoc,
        ChaosEffect::BiggieSmalls,
        ChaosEffect::FrictionAffliction,
        ChaosEffect::TiltATable,
        ChaosEffect::GetGaslit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChaosEffect::PlainJane => "Plain Jane",
            ChaosEffect::StickySituation => "Sticky Situation",
            ChaosEffect::HoverHavoc => "Hover Havoc",
            ChaosEffect::BiggieSmalls => "Biggie Smalls",
            ChaosEffect::FrictionAffliction => "Friction Affliction",
            ChaosEffect::TiltATable => "Tilt-a-Table",
            ChaosEffect::GetGaslit => "Get Gaslit",
        }
    }

    /// Position in `ALL`, sent to the host with chaos events.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Which effect is on. Holding a single effect keeps exactly one active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaosStatus {
    active: ChaosEffect,
}

impl Default for ChaosStatus {
    fn default() -> Self {
        Self { active: ChaosEffect::PlainJane }
    }
}

impl ChaosStatus {
    pub fn current(&self) -> ChaosEffect {
        self.active
    }

    pub fn is_active(&self, effect: ChaosEffect) -> bool {
        self.active == effect
    }

    /// Every effect paired with its on/off flag.
    pub fn entries(&self) -> impl Iterator<Item = (ChaosEffect, bool)> + '_ {
        ChaosEffect::ALL.iter().map(move |&e| (e, e == self.active))
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            sticky_walls: self.active == ChaosEffect::StickySituation,
            heavy_friction: self.active == ChaosEffect::FrictionAffliction,
            tilted: self.active == ChaosEffect::TiltATable,
        }
    }
}

/// Counts ticks and swaps the active effect when the countdown runs out.
#[derive(Debug, Clone)]
pub struct ChaosMachine {
    status: ChaosStatus,
    frames: u32,
    threshold: u32,
    /// Balls lifted by Hover Havoc, by index.
    hovering: Vec<usize>,
    /// Ball size restored when Biggie Smalls ends.
    default_size: f32,
}

impl ChaosMachine {
    pub fn new(tuning: &ChaosTuning, default_size: f32, rng: &mut Rng) -> Self {
        Self {
            status: ChaosStatus::default(),
            frames: 0,
            threshold: draw_period(tuning, rng),
            hovering: Vec::new(),
            default_size,
        }
    }

    pub fn status(&self) -> &ChaosStatus {
        &self.status
    }

    pub fn current(&self) -> ChaosEffect {
        self.status.current()
    }

    #[cfg(test)]
    pub fn hovering(&self) -> &[usize] {
        &self.hovering
    }

    /// Per-tick update. `t` is elapsed seconds, driving the hover bob.
    /// Returns the new effect when a transition happened.
    pub fn update(
        &mut self,
        balls: &mut [Ball],
        tuning: &ChaosTuning,
        rng: &mut Rng,
        t: f32,
    ) -> Option<ChaosEffect> {
        if !tuning.enabled {
            return None;
        }

        if self.status.is_active(ChaosEffect::HoverHavoc) {
            let z = hover_z(tuning, t);
            for &i in &self.hovering {
                if let Some(ball) = balls.get_mut(i).filter(|b| b.is_rolling()) {
                    ball.pos.z = z;
                }
            }
        }

        self.frames += 1;
        if self.frames < self.threshold {
            return None;
        }

        self.frames = 0;
        self.threshold = draw_period(tuning, rng);
        let next = self.pick_next(rng);
        self.transition_to(next, balls, tuning, rng, t);
        Some(next)
    }

    /// Run the exit hook of the current effect, then the enter hook of `next`.
    pub fn transition_to(
        &mut self,
        next: ChaosEffect,
        balls: &mut [Ball],
        tuning: &ChaosTuning,
        rng: &mut Rng,
        t: f32,
    ) {
        let previous = self.status.current();
        self.exit(previous, balls);
        self.status.active = next;
        self.enter(next, balls, tuning, rng, t);
        log::info!("Chaos: {} -> {}", previous.name(), next.name());
    }

    /// Undo whatever the current effect did to the balls and go back to
    /// Plain Jane without a transition event.
    pub fn reset(&mut self, balls: &mut [Ball], tuning: &ChaosTuning, rng: &mut Rng) {
        let previous = self.status.current();
        self.exit(previous, balls);
        self.status = ChaosStatus::default();
        self.frames = 0;
        self.threshold = draw_period(tuning, rng);
    }

    fn pick_next(&self, rng: &mut Rng) -> ChaosEffect {
        let others: Vec<ChaosEffect> = ChaosEffect::ALL
            .iter()
            .copied()
            .filter(|&e| e != self.status.current())
            .collect();
        others[rng.next_int(others.len() as u32) as usize]
    }

    fn enter(&mut self, effect: ChaosEffect, balls: &mut [Ball], tuning: &ChaosTuning, rng: &mut Rng, t: f32) {
        match effect {
            ChaosEffect::HoverHavoc => {
                let z = hover_z(tuning, t);
                self.hovering.clear();
                for (i, ball) in balls.iter_mut().enumerate() {
                    if ball.is_rolling() && rng.one_in(tuning.selection_odds) {
                        ball.pos.z = z;
                        self.hovering.push(i);
                    }
                }
            }
            ChaosEffect::BiggieSmalls => {
                for ball in balls.iter_mut().filter(|b| b.is_rolling()) {
                    if rng.one_in(tuning.selection_odds) {
                        let factor = if rng.next_int(2) == 0 { tuning.grow_factor } else { tuning.shrink_factor };
                        ball.resize(ball.size * factor);
                    }
                }
            }
            _ => {}
        }
    }

    fn exit(&mut self, effect: ChaosEffect, balls: &mut [Ball]) {
        match effect {
            ChaosEffect::HoverHavoc => {
                for ball in balls.iter_mut().filter(|b| b.is_rolling()) {
                    ball.pos.z = 0.0;
                }
                self.hovering.clear();
            }
            ChaosEffect::BiggieSmalls => {
                for ball in balls.iter_mut().filter(|b| b.is_rolling()) {
                    ball.resize(self.default_size);
                }
            }
            _ => {}
        }
    }
}

fn hover_z(tuning: &ChaosTuning, t: f32) -> f32 {
    tuning.hover_height + tuning.hover_amplitude * t.sin()
}

fn draw_period(tuning: &ChaosTuning, rng: &mut Rng) -> u32 {
    rng.range_int(tuning.period_min_frames, tuning.period_max_frames)
}
