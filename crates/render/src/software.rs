use crate::renderer::{RenderView, Renderer};
use crate::shield::{ShadingInput, ShieldSample, shade};
use borgshield_common::OrientedBox;
use borgshield_kernel::ShieldScene;
use glam::Vec2;

/// Characters from empty to opaque, used by [`ShieldFrame::to_ascii`].
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// CPU rasterizer for the shield shell alone.
///
/// Casts one ray per pixel at the shield box and shades the nearest
/// front-facing hit. It evaluates the same function the GPU shader does, so
/// it doubles as a reference image.
#[derive(Debug, Clone, Copy)]
pub struct SoftwareShieldRenderer {
    pub width: u32,
    pub height: u32,
    /// Width / height of a single pixel; terminal cells are roughly 0.5.
    pub pixel_aspect: f32,
}

impl SoftwareShieldRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_aspect: 1.0,
        }
    }

    /// Sized for terminal output, where cells are about twice as tall as wide.
    pub fn for_terminal(columns: u32, rows: u32) -> Self {
        Self {
            width: columns,
            height: rows,
            pixel_aspect: 0.5,
        }
    }

    fn aspect(&self) -> f32 {
        self.width as f32 * self.pixel_aspect / self.height.max(1) as f32
    }
}

/// Shaded pixels, row-major from the top-left corner.
#[derive(Debug, Clone)]
pub struct ShieldFrame {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<ShieldSample>,
}

impl ShieldFrame {
    pub fn sample(&self, x: u32, y: u32) -> Option<&ShieldSample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y as usize * self.width as usize + x as usize)
    }

    /// Number of pixels with any opacity.
    pub fn covered(&self) -> usize {
        self.samples.iter().filter(|s| s.alpha > 0.0).count()
    }

    pub fn max_alpha(&self) -> f32 {
        self.samples.iter().map(|s| s.alpha).fold(0.0, f32::max)
    }

    /// Map alpha onto a character ramp, one line per row.
    pub fn to_ascii(&self) -> String {
        let last = (ASCII_RAMP.len() - 1) as f32;
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in self.samples.chunks(self.width.max(1) as usize) {
            for s in row {
                let idx = (s.alpha.clamp(0.0, 1.0) * last).round() as usize;
                out.push(ASCII_RAMP[idx] as char);
            }
            out.push('\n');
        }
        out
    }
}

impl Renderer for SoftwareShieldRenderer {
    type Output = ShieldFrame;

    fn render(&self, scene: &ShieldScene, view: &RenderView) -> ShieldFrame {
        let _span = tracing::debug_span!("software_render", w = self.width, h = self.height).entered();
        let params = scene.parameters();
        let shell = OrientedBox::cube(scene.config().shield_edge, &scene.shield_transform());
        let aspect = self.aspect();
        let (w, h) = (self.width.max(1) as f32, self.height.max(1) as f32);

        let mut samples = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let ndc = Vec2::new(
                    (x as f32 + 0.5) / w * 2.0 - 1.0,
                    1.0 - (y as f32 + 0.5) / h * 2.0,
                );
                let ray = view.ray(ndc, aspect);
                let sample = match shell.intersect(&ray) {
                    // Back faces are culled, as on the GPU.
                    Some(hit) if hit.normal.dot(-ray.direction) > 0.0 => shade(
                        &ShadingInput {
                            position: hit.point,
                            view_dir: view.eye - hit.point,
                            normal: hit.normal,
                            uv: hit.uv,
                        },
                        &params,
                    ),
                    _ => ShieldSample::TRANSPARENT,
                };
                samples.push(sample);
            }
        }

        ShieldFrame {
            width: self.width,
            height: self.height,
            samples,
        }
    }
}
