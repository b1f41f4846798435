//! Planar geometry in projected metres.
//!
//! Road networks are loaded in a metric projection (e.g. Web Mercator or a
//! local UTM zone), so distances are plain Euclidean and interpolation is a
//! straight lerp.  Coordinates are `f64`: trajectories are sampled at
//! sub-metre offsets and accumulate noise, where `f32` rounding would show.

use std::fmt;

/// A 2-D position in projected metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point at fraction `t` of the way from `self` to `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    #[inline]
    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point { x: self.x + dx, y: self.y + dy }
    }
}

/// WKT form, e.g. `POINT(1.5 2)`.
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.x, self.y)
    }
}

/// An ordered polyline.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineString(pub Vec<Point>);

impl LineString {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.0.last().copied()
    }

    /// Total length in metres.
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// The same line traversed in the opposite direction.
    pub fn reversed(&self) -> LineString {
        let mut pts = self.0.clone();
        pts.reverse();
        LineString(pts)
    }

    /// Parse a WKT `LINESTRING(x y, x y, …)`.  Returns `None` on malformed
    /// input or fewer than two vertices.
    pub fn parse_wkt(s: &str) -> Option<LineString> {
        let s = s.trim();
        let upper = s.get(..10)?.to_ascii_uppercase();
        if upper != "LINESTRING" {
            return None;
        }
        let body = s[10..].trim();
        let body = body.strip_prefix('(')?.strip_suffix(')')?;
        let points: Option<Vec<Point>> = body
            .split(',')
            .map(|pair| {
                let mut it = pair.split_whitespace();
                let x = it.next()?.parse().ok()?;
                let y = it.next()?.parse().ok()?;
                Some(Point::new(x, y))
            })
            .collect();
        points.filter(|p| p.len() >= 2).map(LineString)
    }
}

/// WKT form, e.g. `LINESTRING(0 0,1 1)`.  An empty line prints as
/// `LINESTRING EMPTY`.
impl fmt::Display for LineString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("LINESTRING EMPTY");
        }
        f.write_str("LINESTRING(")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{} {}", p.x, p.y)?;
        }
        f.write_str(")")
    }
}
