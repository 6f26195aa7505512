use std::fmt::{self, Debug, Display};

use crate::geometry::{Geometry, HasGeometry, Rectangle};

/// A value paired with the geometry it is indexed under.
///
/// Entries are the unit stored in the tree. Two entries are the same entry
/// for deletion purposes when both the value and the geometry are equal, so a
/// tree may hold several equal entries at once.
///
/// # Examples
///
/// ```rust
/// use ksn_rtree::{Entry, Point};
///
/// let entry = Entry::new("anchor", Point::new(3, 4));
/// assert_eq!(*entry.value(), "anchor");
/// assert_eq!(entry.geometry(), &Point::new(3, 4));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry<V, G> {
    value: V,
    geometry: G,
}

impl<V, G> Entry<V, G> {
    pub fn new(value: V, geometry: G) -> Self {
        Entry { value, geometry }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Splits the entry back into its value and geometry.
    pub fn into_parts(self) -> (V, G) {
        (self.value, self.geometry)
    }
}

impl<V, G: Geometry> HasGeometry for Entry<V, G> {
    fn mbr(&self) -> Rectangle {
        self.geometry.mbr()
    }
}

impl<V: Debug, G: Display> Display for Entry<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry(value={:?}, geometry={})", self.value, self.geometry)
    }
}

impl<V, G> From<(V, G)> for Entry<V, G> {
    fn from((value, geometry): (V, G)) -> Self {
        Entry::new(value, geometry)
    }
}
