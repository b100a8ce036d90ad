//! Software rendering of the puzzle.
//!
//! Everything happens on the CPU: cubie meshes are transformed into puzzle
//! space, lit, culled, projected and scan converted into an RGBA framebuffer
//! with a z-buffer, while a picking mask records which face ended up on each
//! pixel.

use image::{Rgba, RgbaImage};
use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

use crate::app::Turn;
use crate::camera::{Camera, Projection};
use crate::config::Config;
use crate::cube::{
    CUBE_TRIANGLES, Color, PocketCube, TRIANGLE_COUNT, mesh_vertex, surface_normal, triangle_face,
};
use crate::picking::{PickEntry, PickMask};
use crate::rasterizer;
use crate::topology::CUBIE_COUNT;

/// Color of the debug axis indicator.
const INDICATOR_COLOR: Color = Color::Red;

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scene<'a> {
    pub(crate) cube: &'a PocketCube,
    pub(crate) camera: &'a Camera,
    /// Layer turn being animated, if any.
    pub(crate) turn: Option<&'a Turn>,
    /// Face drawn highlighted.
    pub(crate) flagged: Option<PickEntry>,
    /// Puzzle-space tip of the debug axis line, when enabled.
    pub(crate) indicator: Option<Vector3<f32>>,
}

/// Triangle counts for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RenderStats {
    pub(crate) drawn: usize,
    pub(crate) culled: usize,
}

/// CPU framebuffer, z-buffer and picking mask for the puzzle view.
#[derive(Debug)]
pub(crate) struct Renderer {
    width: u32,
    height: u32,
    pixels: RgbaImage,
    /// Reciprocal screen depth per pixel; larger is nearer, zero is empty.
    depth: Vec<f32>,
    mask: PickMask,
    /// Puzzle-space triangle corners, indexed by `slot * TRIANGLE_COUNT + triangle`.
    scratch: Vec<[Vector4<f32>; 3]>,
    light: Vector3<f32>,
    background: Color,
}

impl Renderer {
    /// Allocates the framebuffer, z-buffer, picking mask and vertex scratch
    /// for the configured window size.
    ///
    /// # Arguments
    /// * `config` - Supplies the size, light direction and background color
    pub(crate) fn new(config: &Config) -> Self {
        let (width, height) = (config.width, config.height);
        Self {
            width,
            height,
            pixels: RgbaImage::from_pixel(width, height, config.background.into()),
            depth: vec![0.0; width as usize * height as usize],
            mask: PickMask::new(width, height),
            scratch: vec![[Vector4::zeros(); 3]; CUBIE_COUNT * TRIANGLE_COUNT],
            light: config.light_direction.normalize(),
            background: config.background,
        }
    }

    /// The last rendered frame.
    pub(crate) fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Picking mask of the last rendered frame.
    pub(crate) fn mask(&self) -> &PickMask {
        &self.mask
    }

    /// Stored depth at a pixel, or `None` where nothing was drawn.
    pub(crate) fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let depth = self.depth[y as usize * self.width as usize + x as usize];
        (depth > 0.0).then_some(depth)
    }

    /// Draws a full frame, replacing the previous pixels, depths and mask.
    pub(crate) fn render(&mut self, scene: &Scene<'_>, projection: &Projection) -> RenderStats {
        let clear: Rgba<u8> = self.background.into();
        self.pixels.pixels_mut().for_each(|pixel| *pixel = clear);
        self.depth.fill(0.0);
        self.mask.clear();

        self.transform_cubies(scene.cube, scene.turn);

        let model = scene.camera.model_matrix();
        let mut stats = RenderStats::default();
        let light = self.light;

        for (slot, cubie) in scene.cube.cubies().iter().enumerate() {
            for triangle in 0..TRIANGLE_COUNT {
                let face = triangle_face(triangle);
                let color = cubie.color(face);
                // Inner faces match the background and can never be seen.
                if color == self.background {
                    stats.culled += 1;
                    continue;
                }

                let view = self.scratch[slot * TRIANGLE_COUNT + triangle].map(|v| model * v);
                let normal = surface_normal(&view[0].xyz(), &view[1].xyz(), &view[2].xyz());
                let luminance = normal.dot(&light);
                // Faces turned away from the light are turned away from the
                // viewer too.
                if !(luminance > 0.0) {
                    stats.culled += 1;
                    continue;
                }

                let screen = view.map(|v| projection.to_screen(&v));
                let entry = PickEntry { face, slot };
                let mut rgba: Rgba<u8> = color.into();
                if scene.flagged == Some(entry) {
                    rgba = contrast(rgba);
                }
                self.draw_triangle(screen, shade(rgba, luminance), entry);
                stats.drawn += 1;
            }
        }

        if let Some(tip) = scene.indicator {
            let origin = projection.to_screen(&(model * Vector4::new(0.0, 0.0, 0.0, 1.0)));
            let tip = projection.to_screen(&(model * tip.push(1.0)));
            let rgba: Rgba<u8> = INDICATOR_COLOR.into();
            let pixels = &mut self.pixels;
            rasterizer::draw_line(
                Vector2::new(origin.x, origin.y),
                Vector2::new(tip.x, tip.y),
                self.width,
                self.height,
                |x, y| pixels.put_pixel(x, y, rgba),
            );
        }

        log::trace!(
            "rendered frame: {} triangles drawn, {} culled",
            stats.drawn,
            stats.culled
        );
        stats
    }

    /// Scan converts one screen-space triangle through the z-buffer.
    ///
    /// A pixel is replaced only when the triangle is strictly nearer than
    /// what the pixel already holds, so on equal depth the earlier triangle
    /// stays. Every replaced pixel is stamped with `entry` in the mask.
    ///
    /// # Arguments
    /// * `screen` - Corners in pixel x, pixel y and positive screen depth
    /// * `rgba` - Final, already shaded color
    /// * `entry` - Face and slot recorded for picking
    fn draw_triangle(&mut self, screen: [Vector3<f32>; 3], rgba: Rgba<u8>, entry: PickEntry) {
        let (width, height) = (self.width, self.height);
        let Self {
            pixels,
            depth,
            mask,
            ..
        } = self;
        rasterizer::fill_triangle(screen, rgba, width, height, |x, y, z, rgba| {
            let offset = y as usize * width as usize + x as usize;
            if z > depth[offset] {
                depth[offset] = z;
                pixels.put_pixel(x, y, rgba);
                mask.stamp(x, y, entry);
            }
        });
    }

    /// Moves every cubie's triangles into puzzle space, spinning the layer
    /// that is mid-turn.
    fn transform_cubies(&mut self, cube: &PocketCube, turn: Option<&Turn>) {
        let spin = turn.map(|turn| (turn.slots(), turn.rotation()));

        for (slot, cubie) in cube.cubies().iter().enumerate() {
            let transform: Matrix4<f32> = match &spin {
                Some((slots, rotation)) if slots.contains(&slot) => rotation * cubie.transform,
                _ => cubie.transform,
            };
            for (triangle, indices) in CUBE_TRIANGLES.iter().enumerate() {
                self.scratch[slot * TRIANGLE_COUNT + triangle] =
                    indices.map(|v| transform * mesh_vertex(v));
            }
        }
    }
}

/// Scales the color channels by the light intensity.
fn shade(color: Rgba<u8>, luminance: f32) -> Rgba<u8> {
    let [r, g, b, a] = color.0;
    let scale = |c: u8| (c as f32 * luminance.min(1.0)).round() as u8;
    Rgba([scale(r), scale(g), scale(b), a])
}

/// Inverted color used to highlight the flagged face.
fn contrast(color: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = color.0;
    Rgba([255 - r, 255 - g, 255 - b, a])
}
