/// Linear RGBA color, straight alpha.
///
/// sRGB conversion is handled by render targets depending on pipeline
/// policy.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Creates an opaque color from hue (degrees), saturation and lightness
    /// in `[0, 1]`.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h / 60.0;
        let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match hp {
            hp if hp < 1.0 => (c, x, 0.0),
            hp if hp < 2.0 => (x, c, 0.0),
            hp if hp < 3.0 => (0.0, c, x),
            hp if hp < 4.0 => (0.0, x, c),
            hp if hp < 5.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self::new(r + m, g + m, b + m, 1.0)
    }
}

/// How the rendered scene composites against what is behind it.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BlendMode {
    #[default]
    Opaque,
    Translucent,
}

/// Edge anti-aliasing applied as a post filter.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum AntiAliasing {
    #[default]
    None,
    Fxaa,
}

/// Multi-sample anti-aliasing toggle.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MsaaOptions {
    pub enabled: bool,
}

/// Ambient occlusion toggle.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct AmbientOcclusionOptions {
    pub enabled: bool,
}

/// Clear behavior for the scene pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearOptions {
    /// When false the previous target contents are loaded instead.
    pub clear: bool,
    pub color: Color,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            clear: true,
            color: Color::black(),
        }
    }
}

/// Render configuration applied to the viewer.
///
/// Applying the same options twice resolves to the same pipeline parameters;
/// there is no accumulation across applications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerOptions {
    pub blend_mode: BlendMode,
    pub anti_aliasing: AntiAliasing,
    pub msaa: MsaaOptions,
    pub ambient_occlusion: AmbientOcclusionOptions,
    pub clear: ClearOptions,
}

/// Concrete pipeline parameters resolved from [`ViewerOptions`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResolvedOptions {
    /// 4 when MSAA is enabled, otherwise 1.
    pub sample_count: u32,
    /// Premultiplied-alpha blending and a non-opaque surface alpha mode.
    pub translucent: bool,
    /// Post-filter edge anti-aliasing.
    pub fxaa: bool,
    pub ambient_occlusion: bool,
    pub load_op_clear: bool,
    pub clear_color: Color,
}

impl ViewerOptions {
    /// Resolves the option set to pipeline parameters.
    ///
    /// Pure function of the options.
    pub fn resolve(&self) -> ResolvedOptions {
        ResolvedOptions {
            sample_count: if self.msaa.enabled { 4 } else { 1 },
            translucent: self.blend_mode == BlendMode::Translucent,
            fxaa: self.anti_aliasing == AntiAliasing::Fxaa,
            ambient_occlusion: self.ambient_occlusion.enabled,
            load_op_clear: self.clear.clear,
            clear_color: self.clear.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_options() -> ViewerOptions {
        ViewerOptions {
            blend_mode: BlendMode::Translucent,
            anti_aliasing: AntiAliasing::Fxaa,
            msaa: MsaaOptions { enabled: true },
            ambient_occlusion: AmbientOcclusionOptions { enabled: true },
            clear: ClearOptions {
                clear: true,
                color: Color::new(0.1, 0.2, 0.3, 1.0),
            },
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let options = full_options();
        assert_eq!(options.resolve(), options.resolve());
    }

    #[test]
    fn resolution_does_not_accumulate() {
        // Resolving through a second options application yields the same
        // parameters as resolving once.
        let options = full_options();
        let first = options.resolve();
        let again = options.clone();
        assert_eq!(again.resolve(), first);
    }

    #[test]
    fn msaa_controls_sample_count() {
        let mut options = ViewerOptions::default();
        assert_eq!(options.resolve().sample_count, 1);
        options.msaa.enabled = true;
        assert_eq!(options.resolve().sample_count, 4);
    }

    #[test]
    fn defaults_are_opaque_and_clearing() {
        let resolved = ViewerOptions::default().resolve();
        assert!(!resolved.translucent);
        assert!(!resolved.fxaa);
        assert!(!resolved.ambient_occlusion);
        assert!(resolved.load_op_clear);
    }

    #[test]
    fn hsl_primaries() {
        let red = Color::from_hsl(0.0, 1.0, 0.5);
        assert!((red.r - 1.0).abs() < 1e-5 && red.g.abs() < 1e-5);

        let green = Color::from_hsl(120.0, 1.0, 0.5);
        assert!((green.g - 1.0).abs() < 1e-5 && green.r.abs() < 1e-5);

        // Desaturated slate used as the default background.
        let slate = Color::from_hsl(192.0, 0.04, 0.24);
        assert!(slate.b > slate.r);
        assert!((slate.a - 1.0).abs() < 1e-6);
    }
}
