use ultraviolet::Vec2;

/// A position in simulation space. Screen coordinates: +x right, +y down.
pub type Point = Vec2;

/// Axis-aligned rectangle described by its center and half extents.
/// Used to define the bounds of quadtree nodes and query ranges.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    /// Half width.
    pub w: f32,
    /// Half height.
    pub h: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        debug_assert!(w >= 0.0 && h >= 0.0, "negative half extent");
        Self { x, y, w, h }
    }

    /// Rectangle spanning `[0, width) x [0, height)`.
    pub fn from_extent(width: f32, height: f32) -> Self {
        Self::new(width * 0.5, height * 0.5, width * 0.5, height * 0.5)
    }

    pub fn center(&self) -> Point {
        Vec2::new(self.x, self.y)
    }

    pub fn width(&self) -> f32 {
        self.w * 2.0
    }

    pub fn height(&self) -> f32 {
        self.h * 2.0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Half-open containment: left/top edges are inside, right/bottom edges are not.
    /// Sibling quadrants therefore never both contain the same point.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x - self.w
            && p.x < self.x + self.w
            && p.y >= self.y - self.h
            && p.y < self.y + self.h
    }

    /// Closed-interval overlap on both axes; touching edges count as intersecting.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        other.x - other.w <= self.x + self.w
            && other.x + other.w >= self.x - self.w
            && other.y - other.h <= self.y + self.h
            && other.y + other.h >= self.y - self.h
    }

    /// Returns the sub-rectangle for `quadrant`.
    pub fn quadrant(&self, quadrant: Quadrant) -> Self {
        let w = self.w * 0.5;
        let h = self.h * 0.5;
        let (sx, sy) = quadrant.signs();
        Self::new(self.x + sx * w, self.y + sy * h, w, h)
    }

    /// Divides the rectangle into 4 equal-area children, in [`Quadrant::ALL`] order.
    pub fn quadrants(&self) -> [Rectangle; 4] {
        Quadrant::ALL.map(|q| self.quadrant(q))
    }
}

/// Child slot of a subdivided node. North is toward smaller y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthEast,
        Quadrant::NorthWest,
        Quadrant::SouthEast,
        Quadrant::SouthWest,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::NorthEast => "NE",
            Quadrant::NorthWest => "NW",
            Quadrant::SouthEast => "SE",
            Quadrant::SouthWest => "SW",
        }
    }

    fn signs(self) -> (f32, f32) {
        match self {
            Quadrant::NorthEast => (1.0, -1.0),
            Quadrant::NorthWest => (-1.0, -1.0),
            Quadrant::SouthEast => (1.0, 1.0),
            Quadrant::SouthWest => (-1.0, 1.0),
        }
    }
}

/// Vector helpers missing from `ultraviolet`.
pub trait VecExt {
    /// Clamps the magnitude to at most `max`.
    fn limit(self, max: f32) -> Self;
    /// Scales to magnitude `mag`. The zero vector stays zero.
    fn set_mag(self, mag: f32) -> Self;
}

impl VecExt for Vec2 {
    fn limit(self, max: f32) -> Self {
        let mag_sq = self.mag_sq();
        if mag_sq > max * max && mag_sq > 0.0 {
            self * (max / mag_sq.sqrt())
        } else {
            self
        }
    }

    fn set_mag(self, mag: f32) -> Self {
        let len = self.mag();
        if len > 0.0 && len.is_finite() {
            self * (mag / len)
        } else {
            Vec2::zero()
        }
    }
}

/// Clamps `value` into `[low, high]`, applying the upper bound first.
/// Unlike [`f32::clamp`] this never panics: when `low > high` the result is `low`.
pub fn constrain(value: f32, low: f32, high: f32) -> f32 {
    value.min(high).max(low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        assert!(r.contains(Vec2::new(-1.0, -1.0)));
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(!r.contains(Vec2::new(1.0, 0.0)));
        assert!(!r.contains(Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn intersects_touching_edges() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let b = Rectangle::new(2.0, 0.0, 1.0, 1.0);
        let c = Rectangle::new(3.5, 0.0, 1.0, 1.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn quadrants_tile_parent() {
        let r = Rectangle::from_extent(600.0, 600.0);
        let [ne, nw, se, sw] = r.quadrants();
        assert_eq!(ne, Rectangle::new(450.0, 150.0, 150.0, 150.0));
        assert_eq!(nw, Rectangle::new(150.0, 150.0, 150.0, 150.0));
        assert_eq!(se, Rectangle::new(450.0, 450.0, 150.0, 150.0));
        assert_eq!(sw, Rectangle::new(150.0, 450.0, 150.0, 150.0));

        // The shared center belongs to exactly one child.
        let center = r.center();
        let hits = r.quadrants().iter().filter(|q| q.contains(center)).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn set_mag_and_limit() {
        let v = Vec2::new(3.0, 4.0);
        assert!((v.set_mag(10.0).mag() - 10.0).abs() < 1e-5);
        assert_eq!(Vec2::zero().set_mag(5.0), Vec2::zero());
        assert!((v.limit(1.0).mag() - 1.0).abs() < 1e-6);
        assert_eq!(v.limit(10.0), v);
    }

    #[test]
    fn constrain_with_inverted_bounds() {
        assert_eq!(constrain(5.0, 1.0, 10.0), 5.0);
        assert_eq!(constrain(0.5, 1.0, 10.0), 1.0);
        assert_eq!(constrain(50.0, 1.0, 10.0), 10.0);
        // The floor wins over the ceiling.
        assert_eq!(constrain(5.0, 100.0, 10.0), 100.0);
        assert_eq!(constrain(500.0, 100.0, 10.0), 100.0);
    }
}
