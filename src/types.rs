/// 2D point in the drawing's user coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned export window derived from a marker rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportWindow {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl ExportWindow {
    /// Build a window from a marker's `x`, `y`, `width` and `height`
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x_min: x,
            y_min: y,
            x_max: x + width,
            y_max: y + height,
        }
    }

    pub fn width(&self) -> f64 {
        (self.x_max - self.x_min).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y_max - self.y_min).abs()
    }

    /// Membership test used by the planner.
    ///
    /// A point with a zero coordinate on either axis counts as "no position"
    /// and is never inside. Bounds are inclusive on all four sides.
    pub fn contains(&self, point: Point) -> bool {
        if point.x == 0.0 || point.y == 0.0 {
            return false;
        }

        self.x_min <= point.x
            && point.x <= self.x_max
            && self.y_min <= point.y
            && point.y <= self.y_max
    }

    /// `viewBox` attribute value for an output document
    pub fn view_box(&self) -> String {
        format!(
            "{} {} {} {}",
            self.x_min,
            self.y_min,
            self.width(),
            self.height()
        )
    }
}
