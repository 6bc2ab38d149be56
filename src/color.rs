use palette::{Srgb, Srgba, WithAlpha};

/// Colour with opacity, components in `0.0..=1.0`.
pub type Color = Srgba<f32>;

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// Matplotlib "tab:" colours used by the regression chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tableau {
    Blue,
    Red,
}

impl Tableau {
    /// 8-bit sRGB value.
    pub fn rgb(self) -> Srgb<u8> {
        match self {
            Tableau::Blue => Srgb::new(0x1f, 0x77, 0xb4),
            Tableau::Red => Srgb::new(0xd6, 0x27, 0x28),
        }
    }

    /// Opaque colour.
    pub fn color(self) -> Color {
        self.rgb().into_format::<f32>().with_alpha(1.0)
    }
}

pub fn black() -> Color {
    Srgb::new(0.0, 0.0, 0.0).with_alpha(1.0)
}

pub fn white() -> Color {
    Srgb::new(1.0, 1.0, 1.0).with_alpha(1.0)
}

/// Light gray used for legend frames.
pub fn frame_gray() -> Color {
    Srgb::new(0.8, 0.8, 0.8).with_alpha(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn float_components() {
        let c = Tableau::Blue.color();
        assert_abs_diff_eq!(c.red, 31.0 / 255.0, epsilon = 1e-6);
        assert_abs_diff_eq!(c.blue, 180.0 / 255.0, epsilon = 1e-6);
        assert_eq!(c.alpha, 1.0);

        let r = Tableau::Red.color();
        assert_abs_diff_eq!(r.red, 214.0 / 255.0, epsilon = 1e-6);
        assert_abs_diff_eq!(r.green, 39.0 / 255.0, epsilon = 1e-6);
    }
}
