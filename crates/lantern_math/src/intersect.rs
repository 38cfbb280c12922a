//! Query shapes and exact shape/rectangle intersection

use crate::bounds::Rect;
use crate::vector::Vec2;

/// A shape used for spatial lookups
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Rect(Rect),
    /// Ellipse inscribed in the given bounds
    Ellipse(Rect),
    /// Closed polygon, points in order
    Polygon(Vec<Vec2>),
}

impl Shape {
    /// Axis-aligned bounding rectangle
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(r) | Shape::Ellipse(r) => *r,
            Shape::Polygon(points) => polygon_bounds(points),
        }
    }

    /// Whether this shape is its own bounding rectangle
    pub fn is_rect(&self) -> bool {
        matches!(self, Shape::Rect(_))
    }

    /// Exact intersection test against a rectangle
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if !self.bounds().intersects(rect) {
            return false;
        }

        match self {
            Shape::Rect(_) => true,
            Shape::Ellipse(bounds) => ellipse_intersects_rect(bounds, rect),
            Shape::Polygon(points) => polygon_intersects_rect(points, rect),
        }
    }
}

impl From<Rect> for Shape {
    fn from(rect: Rect) -> Self {
        Shape::Rect(rect)
    }
}

fn polygon_bounds(points: &[Vec2]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::EMPTY;
    };

    let (mut min, mut max) = (*first, *first);
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
}

fn ellipse_intersects_rect(bounds: &Rect, rect: &Rect) -> bool {
    let rx = bounds.width * 0.5;
    let ry = bounds.height * 0.5;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }

    let c = bounds.center();
    // closest point of the rectangle to the ellipse center
    let px = c.x.clamp(rect.x, rect.max_x());
    let py = c.y.clamp(rect.y, rect.max_y());
    let dx = (px - c.x) / rx;
    let dy = (py - c.y) / ry;
    dx * dx + dy * dy < 1.0
}

fn polygon_intersects_rect(points: &[Vec2], rect: &Rect) -> bool {
    if points.len() < 3 {
        return false;
    }

    // a polygon vertex inside the rectangle
    if points.iter().any(|p| rect.contains(*p)) {
        return true;
    }

    // a rectangle corner (or the whole rectangle) inside the polygon
    if rect.corners().iter().any(|c| polygon_contains(points, *c))
        || polygon_contains(points, rect.center())
    {
        return true;
    }

    // crossing edges
    let corners = rect.corners();
    let rect_edges = (0..4).map(|i| (corners[i], corners[(i + 1) % 4]));
    let rect_edges: Vec<_> = rect_edges.collect();
    edges(points).any(|(a, b)| {
        rect_edges
            .iter()
            .any(|&(c, d)| segments_intersect(a, b, c, d))
    })
}

fn edges(points: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    (0..points.len()).map(move |i| (points[i], points[(i + 1) % points.len()]))
}

/// Even-odd point in polygon test
fn polygon_contains(points: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    for (a, b) in edges(points) {
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Proper crossing of two segments (touching endpoints don't count)
fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_bounds() {
        let shape = Shape::Polygon(vec![
            Vec2::new(2.0, 1.0),
            Vec2::new(10.0, 4.0),
            Vec2::new(4.0, 12.0),
        ]);
        assert_eq!(shape.bounds(), Rect::new(2.0, 1.0, 8.0, 11.0));
    }

    #[test]
    fn test_ellipse_corner_miss() {
        let ellipse = Shape::Ellipse(Rect::new(0.0, 0.0, 10.0, 10.0));
        // inside the bounds but outside the circle
        assert!(!ellipse.intersects_rect(&Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(ellipse.intersects_rect(&Rect::new(4.0, 4.0, 2.0, 2.0)));
        assert!(ellipse.intersects_rect(&Rect::new(-5.0, 4.0, 6.0, 2.0)));
    }

    #[test]
    fn test_triangle() {
        // right triangle covering the lower-left half of a 10x10 square
        let tri = Shape::Polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 10.0),
        ]);
        assert!(tri.intersects_rect(&Rect::new(1.0, 7.0, 2.0, 2.0)));
        assert!(!tri.intersects_rect(&Rect::new(7.0, 1.0, 2.0, 2.0)));
        // rectangle straddling the hypotenuse without containing vertices
        assert!(tri.intersects_rect(&Rect::new(4.0, 4.0, 2.0, 2.0)));
    }

    #[test]
    fn test_polygon_inside_rect() {
        let tri = Shape::Polygon(vec![
            Vec2::new(4.0, 4.0),
            Vec2::new(6.0, 4.0),
            Vec2::new(5.0, 6.0),
        ]);
        assert!(tri.intersects_rect(&Rect::new(0.0, 0.0, 10.0, 10.0)));
    }
}
