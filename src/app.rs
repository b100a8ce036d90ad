//! Interaction state and turn logic for the pocket cube.
//!
//! This module ties the puzzle state, camera, projection and renderer
//! together and runs the state machine that turns pointer input, keyboard
//! requests and animation ticks into puzzle changes.

use std::f32::consts::FRAC_PI_2;

use image::RgbaImage;
use nalgebra::{Matrix4, Point2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::{Camera, Projection};
use crate::config::Config;
use crate::cube::PocketCube;
use crate::error::SetupError;
use crate::input::{InputEvent, InputHandler, InputState, PointerButton};
use crate::math;
use crate::picking::{self, PickEntry};
use crate::renderer::{RenderStats, Renderer, Scene};
use crate::topology::{CUBIE_COUNT, GroupIndex, Orientation, ROTATION_GROUPS, group_for};

/// Length of the debug axis line in puzzle units.
const INDICATOR_LENGTH: f32 = 80.0;

/// A quarter turn of one layer, possibly still animating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Turn {
    group: GroupIndex,
    orientation: Orientation,
    /// Angle turned so far, from 0 up to a quarter turn.
    angle: f32,
}

impl Turn {
    /// Starts a turn of `group` about `orientation`, at angle zero.
    pub(crate) fn new(group: GroupIndex, orientation: Orientation) -> Self {
        Self {
            group,
            orientation,
            angle: 0.0,
        }
    }

    pub(crate) fn group(&self) -> GroupIndex {
        self.group
    }

    pub(crate) fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Slots whose cubies take part in the turn.
    pub(crate) fn slots(&self) -> [usize; 4] {
        ROTATION_GROUPS[self.group]
    }

    /// Rotation for the angle reached so far.
    pub(crate) fn rotation(&self) -> Matrix4<f32> {
        math::rotation_about(self.orientation.axis(), self.orientation.sign(), self.angle)
    }

    /// Advances the animation and returns whether the quarter turn is done.
    pub(crate) fn advance(&mut self, step: f32) -> bool {
        self.angle += step;
        self.angle >= FRAC_PI_2
    }
}

/// What the user (or the scrambler) is doing right now.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Interaction {
    Idle,
    /// Primary button held; `anchor` is the press point on the arcball.
    FreeRotating { anchor: Vector3<f32> },
    /// Secondary button held on a face; `anchor` is the press point in
    /// puzzle space.
    PickedFace {
        picked: PickEntry,
        anchor: Vector3<f32>,
    },
    /// A turn started by a drag, animating to completion.
    TurningAnimated {
        turn: Turn,
        flagged: Option<PickEntry>,
    },
    /// Random turns still to play; `turn` is `None` between two turns.
    Scrambling { remaining: u32, turn: Option<Turn> },
}

impl Interaction {
    /// Whether a turn is running, which locks out pointer input.
    pub(crate) fn is_turning(&self) -> bool {
        matches!(
            self,
            Interaction::TurningAnimated { .. } | Interaction::Scrambling { .. }
        )
    }

    /// Turn to draw mid-animation.
    pub(crate) fn turn(&self) -> Option<&Turn> {
        match self {
            Interaction::TurningAnimated { turn, .. } => Some(turn),
            Interaction::Scrambling { turn, .. } => turn.as_ref(),
            _ => None,
        }
    }

    /// Face to highlight.
    pub(crate) fn flagged(&self) -> Option<PickEntry> {
        match self {
            Interaction::PickedFace { picked, .. } => Some(*picked),
            Interaction::TurningAnimated { flagged, .. } => *flagged,
            _ => None,
        }
    }
}

/// Works out which turn a drag across a face asks for.
///
/// Both the face normal and the drag are snapped to their dominant axis;
/// the turn axis is their cross product. Dragging along the normal gives no
/// axis and no turn.
pub(crate) fn infer_turn(face_normal: &Vector3<f32>, drag: &Vector3<f32>) -> Option<Orientation> {
    let normal = math::snap_to_axis(face_normal)?;
    let drag = math::snap_to_axis(drag)?;
    Orientation::from_direction(&normal.cross(&drag))
}

fn random_turn(rng: &mut StdRng) -> Turn {
    let orientation = Orientation::ALL[rng.random_range(0..Orientation::ALL.len())];
    let slot = rng.random_range(0..CUBIE_COUNT);
    Turn::new(group_for(orientation.axis(), slot), orientation)
}

/// The puzzle together with everything needed to show and manipulate it.
pub(crate) struct App {
    config: Config,
    /// Puzzle state at rest, without any turn in progress.
    cube: PocketCube,
    /// Free rotation of the whole puzzle.
    camera: Camera,
    projection: Projection,
    /// Framebuffer, z-buffer and picking mask of the last frame.
    renderer: Renderer,
    interaction: Interaction,
    /// Button currently held, deciding what motion does.
    input: InputState,
    /// Puzzle-space tip of the debug axis line.
    indicator_tip: Vector3<f32>,
    show_indicator: bool,
    rng: StdRng,
}

impl App {
    /// Creates a solved puzzle with an OS-seeded scrambler.
    pub(crate) fn new(config: Config) -> Result<Self, SetupError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates a solved puzzle that scrambles with the given generator.
    ///
    /// # Arguments
    /// * `config` - Window size, view volume and interaction tuning
    /// * `rng` - Source of scramble turns; seed it for reproducible runs
    ///
    /// # Errors
    /// Fails when the configured viewport cannot be projected onto.
    pub(crate) fn with_rng(config: Config, rng: StdRng) -> Result<Self, SetupError> {
        let projection = Projection::new(
            config.width,
            config.height,
            config.view_extent,
            config.near,
            config.far,
        )?;
        Ok(Self {
            cube: PocketCube::new(),
            camera: Camera::new(config.camera_distance),
            projection,
            renderer: Renderer::new(&config),
            interaction: Interaction::Idle,
            input: InputState::new(),
            indicator_tip: Vector3::y() * INDICATOR_LENGTH,
            show_indicator: config.show_axis_indicator,
            rng,
            config,
        })
    }

    pub(crate) fn cube(&self) -> &PocketCube {
        &self.cube
    }

    pub(crate) fn is_turning(&self) -> bool {
        self.interaction.is_turning()
    }

    /// The most recently rendered frame.
    pub(crate) fn frame(&self) -> &RgbaImage {
        self.renderer.pixels()
    }

    /// Renders the current state into the framebuffer and picking mask.
    pub(crate) fn render(&mut self) -> RenderStats {
        let scene = Scene {
            cube: &self.cube,
            camera: &self.camera,
            turn: self.interaction.turn(),
            flagged: self.interaction.flagged(),
            indicator: self.show_indicator.then_some(self.indicator_tip),
        };
        self.renderer.render(&scene, &self.projection)
    }

    /// Advances any running turn by one animation step.
    ///
    /// Returns whether anything changed.
    pub(crate) fn tick(&mut self) -> bool {
        let step = self.config.turn_step;
        match self.interaction {
            Interaction::TurningAnimated { ref mut turn, .. } => {
                if turn.advance(step) {
                    let turn = *turn;
                    self.finish_turn(&turn);
                    self.interaction = Interaction::Idle;
                }
            }
            Interaction::Scrambling { remaining: 0, .. } => {
                log::debug!("scramble finished");
                self.interaction = Interaction::Idle;
            }
            Interaction::Scrambling {
                ref mut remaining,
                ref mut turn,
            } => match turn {
                None => {
                    let next = random_turn(&mut self.rng);
                    log::debug!(
                        "scramble: turning group {} about {:?}, {} left",
                        next.group(),
                        next.orientation(),
                        remaining
                    );
                    self.indicator_tip = next.orientation().direction() * INDICATOR_LENGTH;
                    *turn = Some(next);
                }
                Some(current) => {
                    if current.advance(step) {
                        let done = *current;
                        *turn = None;
                        *remaining -= 1;
                        self.finish_turn(&done);
                    }
                }
            },
            _ => return false,
        }
        true
    }

    /// Starts a scramble of `scramble_turns` random quarter turns.
    ///
    /// Ignored while a turn is already running.
    pub(crate) fn start_scramble(&mut self) -> bool {
        match self.interaction {
            Interaction::TurningAnimated { .. } | Interaction::Scrambling { .. } => {
                log::debug!("ignoring scramble request while turning");
                return false;
            }
            Interaction::FreeRotating { .. } => self.camera.commit(),
            _ => {}
        }
        log::info!("scrambling with {} turns", self.config.scramble_turns);
        self.interaction = Interaction::Scrambling {
            remaining: self.config.scramble_turns,
            turn: None,
        };
        true
    }

    fn finish_turn(&mut self, turn: &Turn) {
        self.cube.apply_turn(turn.group(), turn.orientation());
        let cubies = self.cube.cubies();
        log::debug!(
            "turned group {} about {:?}, slots now hold cubies {:?} ({} turns so far)",
            turn.group(),
            turn.orientation(),
            turn.slots().map(|slot| cubies[slot].id),
            self.cube.turns_applied()
        );
    }

    /// Lifts a cursor position into puzzle space through the last frame's
    /// depth buffer.
    fn unproject(&self, position: Point2<f32>) -> Option<Vector3<f32>> {
        let (x, y) = picking::pixel_at(position.x, position.y)?;
        let depth = self.renderer.depth_at(x, y)?;
        picking::unproject(&self.projection, &self.camera, x, y, depth)
    }

    fn press_primary(&mut self, position: Point2<f32>) -> bool {
        if self.is_turning() {
            return false;
        }
        let had_flag = self.interaction.flagged().is_some();
        let anchor = self.projection.project_to_sphere(position.x, position.y);
        self.interaction = Interaction::FreeRotating { anchor };
        had_flag
    }

    fn drag_primary(&mut self, position: Point2<f32>) -> bool {
        let Interaction::FreeRotating { anchor } = self.interaction else {
            return false;
        };
        let current = self.projection.project_to_sphere(position.x, position.y);
        self.camera.drag(&anchor, &current);
        true
    }

    fn release_primary(&mut self) -> bool {
        if !matches!(self.interaction, Interaction::FreeRotating { .. }) {
            return false;
        }
        self.camera.commit();
        log::debug!("committed free rotation {:?}", self.camera.orientation());
        self.interaction = Interaction::Idle;
        false
    }

    fn press_secondary(&mut self, position: Point2<f32>) -> bool {
        match self.interaction {
            _ if self.is_turning() => return false,
            Interaction::FreeRotating { .. } => self.camera.commit(),
            _ => {}
        }

        let picked = picking::pixel_at(position.x, position.y)
            .and_then(|(x, y)| self.renderer.mask().get(x, y));
        let (Some(picked), Some(anchor)) = (picked, self.unproject(position)) else {
            log::trace!("secondary press at {position} hit the background");
            self.interaction = Interaction::Idle;
            return true;
        };

        log::debug!("picked {:?} of slot {}", picked.face, picked.slot);
        self.interaction = Interaction::PickedFace { picked, anchor };
        true
    }

    fn drag_secondary(&mut self, position: Point2<f32>) -> bool {
        let Interaction::PickedFace { picked, anchor } = self.interaction else {
            return false;
        };
        let Some(current) = self.unproject(position) else {
            return false;
        };

        let drag = current - anchor;
        if drag.norm() < self.config.drag_threshold {
            return false;
        }

        let normal = self.cube.face_normal(picked.slot, picked.face);
        let Some(orientation) = infer_turn(&normal, &drag) else {
            log::debug!("drag {drag:?} runs along the face normal; no turn");
            return false;
        };

        let group = group_for(orientation.axis(), picked.slot);
        log::debug!("drag turns group {group} about {orientation:?}");
        self.indicator_tip = orientation.direction() * INDICATOR_LENGTH;
        self.interaction = Interaction::TurningAnimated {
            turn: Turn::new(group, orientation),
            flagged: Some(picked),
        };
        true
    }

    fn release_secondary(&mut self) -> bool {
        if !matches!(self.interaction, Interaction::PickedFace { .. }) {
            return false;
        }
        self.interaction = Interaction::Idle;
        true
    }
}

impl InputHandler for App {
    fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Pressed { button, position } => {
                self.input.update_button(button, true);
                match button {
                    PointerButton::Primary => self.press_primary(position),
                    PointerButton::Secondary => self.press_secondary(position),
                }
            }
            InputEvent::Released { button, .. } => {
                self.input.update_button(button, false);
                match button {
                    PointerButton::Primary => self.release_primary(),
                    PointerButton::Secondary => self.release_secondary(),
                }
            }
            InputEvent::Moved { position } => match self.input.held() {
                Some(PointerButton::Primary) => self.drag_primary(position),
                Some(PointerButton::Secondary) => self.drag_secondary(position),
                None => false,
            },
            InputEvent::Scramble => self.start_scramble(),
            InputEvent::ToggleAxisIndicator => {
                self.show_indicator = !self.show_indicator;
                true
            }
        }
    }
}
