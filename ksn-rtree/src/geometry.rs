//! Integer grid geometry for the spatial index.
//!
//! Everything the tree knows about space goes through the [`Geometry`] trait:
//! a distance to a rectangle, a minimum bounding rectangle (MBR) and an
//! intersection test. [`Rectangle`] and [`Point`] are the two geometries the
//! crate ships; host applications may implement the trait for their own
//! shapes as long as the distance stays monotonic (see [`Geometry::distance`]).

use std::fmt::{self, Display};
use std::sync::Arc;

/// A geometrical region that represents an entry spatially.
///
/// The trait is object safe: search conditions receive `&dyn Geometry` so the
/// same predicate can be evaluated against node MBRs and entry geometries.
pub trait Geometry {
    /// Returns the distance to the given rectangle.
    ///
    /// Implementations must satisfy:
    ///
    /// - `distance(r) >= 0`
    /// - if `r1` contains `r2` then `distance(r1) <= distance(r2)`
    ///
    /// The second property is what lets distance-bounded searches prune whole
    /// subtrees by their MBR.
    fn distance(&self, r: &Rectangle) -> f64;

    /// Returns the minimum bounding rectangle of this geometry.
    fn mbr(&self) -> Rectangle;

    /// Returns true if this geometry intersects the rectangle.
    fn intersects(&self, r: &Rectangle) -> bool;
}

/// Anything with a minimum bounding rectangle: entries, nodes and geometries.
pub trait HasGeometry {
    /// The minimum bounding rectangle of this item.
    fn mbr(&self) -> Rectangle;
}

impl<T: HasGeometry + ?Sized> HasGeometry for Arc<T> {
    fn mbr(&self) -> Rectangle {
        (**self).mbr()
    }
}

/// An axis-aligned rectangle on the integer grid, inclusive on all sides.
///
/// # Examples
///
/// ```rust
/// use ksn_rtree::Rectangle;
///
/// let a = Rectangle::new(0, 0, 2, 2);
/// let b = Rectangle::new(5, 6, 7, 8);
///
/// assert_eq!(a.add(&b), Rectangle::new(0, 0, 7, 8));
/// assert_eq!(a.distance(&b), 5.0);
/// assert!(a.contains(1, 2));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Rectangle {
    /// Creates a rectangle from its lower (`x1`, `y1`) and upper (`x2`, `y2`) corners.
    ///
    /// Callers must pass `x1 <= x2` and `y1 <= y2`; debug builds assert it.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Rectangle {
        debug_assert!(
            x1 <= x2 && y1 <= y2,
            "inverted rectangle ({}, {}, {}, {})",
            x1,
            y1,
            x2,
            y2
        );
        Rectangle { x1, y1, x2, y2 }
    }

    /// The inverted rectangle that is the identity of [`Rectangle::add`].
    ///
    /// It intersects nothing (except rectangles touching the integer limits)
    /// and is not [valid](Rectangle::is_valid).
    pub const fn empty() -> Rectangle {
        Rectangle {
            x1: i32::MAX,
            y1: i32::MAX,
            x2: i32::MIN,
            y2: i32::MIN,
        }
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> i64 {
        self.x2 as i64 - self.x1 as i64
    }

    pub fn height(&self) -> i64 {
        self.y2 as i64 - self.y1 as i64
    }

    /// Area in grid units. A point or a line has zero area.
    ///
    /// Computed in `i128`: a full-range rectangle spans `u32::MAX` on each
    /// axis, which does not fit the product in `i64`.
    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    pub fn perimeter(&self) -> i64 {
        2 * self.width() + 2 * self.height()
    }

    /// Checks if this rectangle is well formed (`x1 <= x2` and `y1 <= y2`).
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// The union of the two rectangles (component-wise min/max).
    pub fn add(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Inclusive point containment.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.x1..=self.x2).contains(&x) && (self.y1..=self.y2).contains(&y)
    }

    /// Checks if `other` lies entirely inside this rectangle.
    pub fn contains_rectangle(&self, other: &Rectangle) -> bool {
        self.x1 <= other.x1 && other.x2 <= self.x2 && self.y1 <= other.y1 && other.y2 <= self.y2
    }

    /// Touching edges and corners count as intersecting.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    /// Area of the overlap of the two rectangles, 0 when they are disjoint.
    pub fn intersection_area(&self, other: &Rectangle) -> i128 {
        if !self.intersects(other) {
            return 0;
        }
        Rectangle {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        }
        .area()
    }

    /// Euclidean distance between the closest points of the two rectangles.
    pub fn distance(&self, other: &Rectangle) -> f64 {
        if self.intersects(other) {
            return 0.0;
        }
        let dx = axis_gap(self.x1, self.x2, other.x1, other.x2);
        let dy = axis_gap(self.y1, self.y2, other.y1, other.y2);
        (dx as f64).hypot(dy as f64)
    }

    /// Twice the x midpoint; used as an overflow-free sort key by bulk loading.
    pub(crate) fn mid_x2(&self) -> i64 {
        self.x1 as i64 + self.x2 as i64
    }

    /// Twice the y midpoint.
    pub(crate) fn mid_y2(&self) -> i64 {
        self.y1 as i64 + self.y2 as i64
    }
}

// positive separation of [a1, a2] and [b1, b2], 0 when they overlap
fn axis_gap(a1: i32, a2: i32, b1: i32, b2: i32) -> i64 {
    let before = b1 as i64 - a2 as i64;
    let after = a1 as i64 - b2 as i64;
    before.max(after).max(0)
}

impl Geometry for Rectangle {
    fn distance(&self, r: &Rectangle) -> f64 {
        Rectangle::distance(self, r)
    }

    fn mbr(&self) -> Rectangle {
        *self
    }

    fn intersects(&self, r: &Rectangle) -> bool {
        Rectangle::intersects(self, r)
    }
}

impl HasGeometry for Rectangle {
    fn mbr(&self) -> Rectangle {
        *self
    }
}

impl Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rectangle({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A point on the integer grid.
///
/// For every geometric operation a point behaves as the degenerate rectangle
/// `(x, y, x, y)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    fn rectangle(&self) -> Rectangle {
        Rectangle {
            x1: self.x,
            y1: self.y,
            x2: self.x,
            y2: self.y,
        }
    }
}

impl Geometry for Point {
    fn distance(&self, r: &Rectangle) -> f64 {
        self.rectangle().distance(r)
    }

    fn mbr(&self) -> Rectangle {
        self.rectangle()
    }

    fn intersects(&self, r: &Rectangle) -> bool {
        self.rectangle().intersects(r)
    }
}

impl HasGeometry for Point {
    fn mbr(&self) -> Rectangle {
        self.rectangle()
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

impl From<Point> for Rectangle {
    fn from(point: Point) -> Self {
        point.rectangle()
    }
}

/// The union of the MBRs of all items, [`Rectangle::empty`] for no items.
pub fn mbr_of<T: HasGeometry>(items: &[T]) -> Rectangle {
    items
        .iter()
        .fold(Rectangle::empty(), |acc, item| acc.add(&item.mbr()))
}
