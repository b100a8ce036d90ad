//! Tunable constants for the puzzle view.

use nalgebra::Vector3;

use crate::cube::Color;

const SCREEN_WIDTH: u32 = 600;
const SCREEN_HEIGHT: u32 = 600;
/// Half-width of the orthographic view volume in puzzle units.
const VIEW_EXTENT: f32 = 120.0;
const Z_NEAR: f32 = 0.0;
const Z_FAR: f32 = 200.0;
const CAMERA_DISTANCE: f32 = 100.0;
/// Angle advanced per animation tick, in radians.
const TURN_STEP: f32 = 0.1;
const SCRAMBLE_TURNS: u32 = 10;
/// Drags shorter than this, in puzzle units, are treated as jitter.
const DRAG_THRESHOLD: f32 = 0.1;

/// Settings for one puzzle window.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// Framebuffer and window width in pixels.
    pub(crate) width: u32,
    /// Framebuffer and window height in pixels.
    pub(crate) height: u32,
    /// Half-width of the orthographic view volume.
    pub(crate) view_extent: f32,
    /// Near plane of the orthographic view volume.
    pub(crate) near: f32,
    /// Far plane of the orthographic view volume.
    pub(crate) far: f32,
    /// Distance from the viewer to the puzzle center.
    pub(crate) camera_distance: f32,
    /// Unit vector pointing from the puzzle towards the light, in view space.
    pub(crate) light_direction: Vector3<f32>,
    /// Radians a turning layer advances per animation tick.
    pub(crate) turn_step: f32,
    /// Number of random quarter turns in a scramble.
    pub(crate) scramble_turns: u32,
    /// Shortest face drag, in puzzle units, that starts a turn.
    pub(crate) drag_threshold: f32,
    /// Clear color. Cubie faces of this color are never drawn.
    pub(crate) background: Color,
    /// Draw a line along the most recent turn axis.
    pub(crate) show_axis_indicator: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            view_extent: VIEW_EXTENT,
            near: Z_NEAR,
            far: Z_FAR,
            camera_distance: CAMERA_DISTANCE,
            // Light comes from behind the screen, towards the viewer.
            light_direction: Vector3::z(),
            turn_step: TURN_STEP,
            scramble_turns: SCRAMBLE_TURNS,
            drag_threshold: DRAG_THRESHOLD,
            background: Color::Black,
            show_axis_indicator: false,
        }
    }
}
