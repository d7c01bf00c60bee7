//! Slide geometry in English Metric Units (914400 EMU = 1 inch).

/// EMUs per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMUs per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Width of the reference canvas the layouts are drawn for (10 inches).
pub const REFERENCE_WIDTH: i64 = 9_144_000;

/// Height of the reference canvas the layouts are drawn for (7.5 inches).
pub const REFERENCE_HEIGHT: i64 = 6_858_000;

/// Convert inches to EMUs.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// Convert points to EMUs.
pub fn points(value: f64) -> i64 {
    (value * EMU_PER_POINT as f64).round() as i64
}

/// An axis-aligned box on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    /// Create a rectangle from EMU values.
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from inch values.
    pub fn from_inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(inches(x), inches(y), inches(width), inches(height))
    }

    /// Shrink by `inset` EMUs on every side.
    pub fn inset(&self, inset: i64) -> Self {
        Self::new(
            self.x + inset,
            self.y + inset,
            (self.width - 2 * inset).max(0),
            (self.height - 2 * inset).max(0),
        )
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// Scale an image to fit entirely inside `container`, preserving its aspect
/// ratio, centred on both axes.
///
/// Returns `None` for degenerate image sizes.
pub fn fit_contain(container: Rect, image_width: u32, image_height: u32) -> Option<Rect> {
    if image_width == 0 || image_height == 0 || container.width <= 0 || container.height <= 0 {
        return None;
    }
    let (iw, ih) = (image_width as f64, image_height as f64);
    let scale = (container.width as f64 / iw).min(container.height as f64 / ih);

    let width = ((iw * scale).round() as i64).clamp(1, container.width);
    let height = ((ih * scale).round() as i64).clamp(1, container.height);
    let x = container.x + (container.width - width) / 2;
    let y = container.y + (container.height - height) / 2;

    Some(Rect::new(x, y, width, height))
}

/// Scale an image to cover all of `container`, preserving its aspect ratio,
/// centred so the overflow is split evenly.
pub fn fit_cover(container: Rect, image_width: u32, image_height: u32) -> Option<Rect> {
    if image_width == 0 || image_height == 0 || container.width <= 0 || container.height <= 0 {
        return None;
    }
    let (iw, ih) = (image_width as f64, image_height as f64);
    let scale = (container.width as f64 / iw).max(container.height as f64 / ih);

    let width = ((iw * scale).ceil() as i64).max(container.width);
    let height = ((ih * scale).ceil() as i64).max(container.height);
    let x = container.x - (width - container.width) / 2;
    let y = container.y - (height - container.height) / 2;

    Some(Rect::new(x, y, width, height))
}

/// The actual slide size, mapping reference-canvas coordinates onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: i64,
    pub height: i64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: REFERENCE_WIDTH,
            height: REFERENCE_HEIGHT,
        }
    }
}

impl Canvas {
    /// Create a canvas of the given EMU size.
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// The whole slide.
    pub fn full(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Map a rectangle given in reference-canvas inches onto this slide.
    pub fn place(&self, x: f64, y: f64, width: f64, height: f64) -> Rect {
        let sx = self.width as f64 / REFERENCE_WIDTH as f64;
        let sy = self.height as f64 / REFERENCE_HEIGHT as f64;
        Rect::new(
            (inches(x) as f64 * sx).round() as i64,
            (inches(y) as f64 * sy).round() as i64,
            (inches(width) as f64 * sx).round() as i64,
            (inches(height) as f64 * sy).round() as i64,
        )
    }
}
