use super::{ARC_SAMPLES, CONTROL_X, PATH_END, PATH_START, VIEWBOX_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Quadratic Bézier with a sampled arc-length table, so text can be laid
/// out by distance along the curve.
#[derive(Debug, Clone)]
pub struct CurvePath {
    start: Point,
    control: Point,
    end: Point,
    /// Cumulative length at `t = i / ARC_SAMPLES`.
    lengths: Vec<f64>,
    /// Lowest and highest sampled y.
    y_bounds: (f64, f64),
}

impl CurvePath {
    pub fn new(start: Point, control: Point, end: Point) -> Self {
        let mut path = Self {
            start,
            control,
            end,
            lengths: Vec::with_capacity(ARC_SAMPLES + 1),
            y_bounds: (start.y, start.y),
        };

        let mut total = 0.0;
        let mut prev = path.point_at(0.0);
        path.lengths.push(0.0);
        for i in 1..=ARC_SAMPLES {
            let p = path.point_at(i as f64 / ARC_SAMPLES as f64);
            total += (p.x - prev.x).hypot(p.y - prev.y);
            path.lengths.push(total);
            path.y_bounds = (path.y_bounds.0.min(p.y), path.y_bounds.1.max(p.y));
            prev = p;
        }
        path
    }

    /// The banner curve; positive `curve_amount` bends downwards.
    pub fn for_bend(curve_amount: f64) -> Self {
        Self::new(
            PATH_START,
            Point::new(CONTROL_X, PATH_START.y + curve_amount),
            PATH_END,
        )
    }

    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let (a, b, c) = (u * u, 2.0 * u * t, t * t);
        Point::new(
            a * self.start.x + b * self.control.x + c * self.end.x,
            a * self.start.y + b * self.control.y + c * self.end.y,
        )
    }

    /// Tangent angle in radians (y grows downwards).
    pub fn angle_at(&self, t: f64) -> f64 {
        let u = 1.0 - t;
        let dx = 2.0 * u * (self.control.x - self.start.x) + 2.0 * t * (self.end.x - self.control.x);
        let dy = 2.0 * u * (self.control.y - self.start.y) + 2.0 * t * (self.end.y - self.control.y);
        dy.atan2(dx)
    }

    pub fn length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    pub fn y_bounds(&self) -> (f64, f64) {
        self.y_bounds
    }

    /// Height of the curve above view-box `x`. The banner curve runs strictly
    /// left to right, so there is at most one.
    pub fn y_at_x(&self, x: f64) -> Option<f64> {
        if !(self.start.x..=self.end.x).contains(&x) {
            return None;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..48 {
            let mid = (lo + hi) / 2.0;
            if self.point_at(mid).x < x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(self.point_at((lo + hi) / 2.0).y)
    }

    fn t_at_length(&self, distance: f64) -> Option<f64> {
        if !(0.0..=self.length()).contains(&distance) {
            return None;
        }

        let i = self.lengths.partition_point(|&l| l < distance);
        if i == 0 {
            return Some(0.0);
        }

        let (lo, hi) = (self.lengths[i - 1], self.lengths[i]);
        let frac = if hi > lo { (distance - lo) / (hi - lo) } else { 0.0 };
        Some(((i - 1) as f64 + frac) / ARC_SAMPLES as f64)
    }

    /// Position and tangent angle `distance` units along the curve, or `None`
    /// when the distance is off either end.
    pub fn locate(&self, distance: f64) -> Option<(Point, f64)> {
        self.t_at_length(distance)
            .map(|t| (self.point_at(t), self.angle_at(t)))
    }
}

/// Uniform view-box to widget transform that keeps a horizontal band of the
/// view box fully visible, centred in the widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFit {
    pub scale: f64,
    pub origin: Point,
}

impl ViewFit {
    /// Fits the band `top..bottom` and the view-box width into a widget.
    /// `None` for an empty widget or band.
    pub fn new(top: f64, bottom: f64, width: f64, height: f64) -> Option<Self> {
        let band = bottom - top;
        if !(width > 0.0) || !(height > 0.0) || !(band > 0.0) || !band.is_finite() {
            return None;
        }

        let scale = (width / VIEWBOX_WIDTH).min(height / band);
        Some(Self {
            scale,
            origin: Point::new(
                (width - VIEWBOX_WIDTH * scale) / 2.0,
                (height - band * scale) / 2.0 - top * scale,
            ),
        })
    }

    pub fn to_widget(&self, p: Point) -> Point {
        Point::new(
            self.origin.x + p.x * self.scale,
            self.origin.y + p.y * self.scale,
        )
    }

    pub fn to_view(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.origin.x) / self.scale,
            (p.y - self.origin.y) / self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_curve_is_straight() {
        let path = CurvePath::for_bend(0.0);
        assert!((path.length() - 1640.0).abs() < 1e-6);

        let (p, angle) = path.locate(820.0).unwrap();
        assert!((p.x - 720.0).abs() < 0.5, "x = {}", p.x);
        assert!((p.y - 40.0).abs() < 1e-9);
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn test_bend_pulls_midpoint_down() {
        let path = CurvePath::for_bend(400.0);
        assert_eq!(path.point_at(0.5).y, 240.0);
        assert!(path.length() > 1640.0);

        // Descends at the start, climbs back at the end.
        assert!(path.angle_at(0.0) > 0.0);
        assert!(path.angle_at(1.0) < 0.0);
    }

    #[test]
    fn test_locate_bounds() {
        let path = CurvePath::for_bend(400.0);
        assert_eq!(path.locate(0.0).map(|(p, _)| p), Some(PATH_START));
        assert!(path.locate(-0.1).is_none());
        assert!(path.locate(path.length() + 0.1).is_none());

        let (end, _) = path.locate(path.length()).unwrap();
        assert!((end.x - PATH_END.x).abs() < 1e-6);
        assert!((end.y - PATH_END.y).abs() < 1e-6);
    }

    #[test]
    fn test_y_bounds_and_height_at_x() {
        let path = CurvePath::for_bend(500.0);
        assert_eq!(path.y_bounds(), (40.0, 290.0));
        assert_eq!(CurvePath::for_bend(-200.0).y_bounds(), (-60.0, 40.0));

        let mid = path.point_at(0.5);
        assert!((path.y_at_x(mid.x).unwrap() - mid.y).abs() < 1e-6);
        assert!((path.y_at_x(PATH_START.x).unwrap() - PATH_START.y).abs() < 1e-6);
        assert!(path.y_at_x(PATH_START.x - 1.0).is_none());
        assert!(path.y_at_x(PATH_END.x + 1.0).is_none());
        assert!(path.y_at_x(f64::NAN).is_none());
    }

    #[test]
    fn test_view_fit_keeps_band_visible() {
        // Width-limited: the view box spans the widget edge to edge.
        let fit = ViewFit::new(-16.0, 346.0, 1440.0, 724.0).unwrap();
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.to_widget(Point::new(0.0, -16.0)).x, 0.0);
        assert_eq!(fit.to_widget(Point::new(0.0, -16.0)).y, 181.0);

        // Height-limited: the band fills the height, centred horizontally.
        let fit = ViewFit::new(-16.0, 346.0, 1440.0, 181.0).unwrap();
        assert_eq!(fit.scale, 0.5);
        assert_eq!(fit.to_widget(Point::new(0.0, -16.0)), Point::new(360.0, 0.0));
        assert_eq!(fit.to_widget(Point::new(1440.0, 346.0)), Point::new(1080.0, 181.0));

        let p = Point::new(123.0, 45.0);
        let back = fit.to_view(fit.to_widget(p));
        assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);

        assert!(ViewFit::new(0.0, 100.0, 0.0, 100.0).is_none());
        assert!(ViewFit::new(0.0, 100.0, 100.0, f64::NAN).is_none());
        assert!(ViewFit::new(100.0, 100.0, 100.0, 100.0).is_none());
    }

    #[test]
    fn test_locate_is_monotonic() {
        let path = CurvePath::for_bend(-250.0);
        let xs: Vec<f64> = (0..20)
            .map(|i| path.locate(path.length() * i as f64 / 19.0).unwrap().0.x)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }
}
