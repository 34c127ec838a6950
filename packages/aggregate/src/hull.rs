//! Gift-wrapping convex hull.

use incident_map_geography_models::Coord;

/// Cross products smaller than this are treated as collinear.
pub const COLLINEAR_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn turn(p: Coord, q: Coord, r: Coord) -> Turn {
    let val = (q[1] - p[1]).mul_add(r[0] - q[0], -((q[0] - p[0]) * (r[1] - q[1])));
    if val.abs() < COLLINEAR_TOLERANCE {
        Turn::Collinear
    } else if val > 0.0 {
        Turn::Clockwise
    } else {
        Turn::CounterClockwise
    }
}

/// Convex hull of `points` by Jarvis march, counter-clockwise from the
/// leftmost point. The ring is not closed.
///
/// Exact duplicates are ignored. Fewer than three distinct points are
/// returned as-is.
#[must_use]
pub fn convex_hull(points: &[Coord]) -> Vec<Coord> {
    let mut distinct: Vec<Coord> = Vec::with_capacity(points.len());
    for p in points {
        if !distinct.contains(p) {
            distinct.push(*p);
        }
    }
    if distinct.len() < 3 {
        return distinct;
    }

    let n = distinct.len();
    let leftmost = (1..n).fold(0, |best, i| {
        if distinct[i][0] < distinct[best][0] {
            i
        } else {
            best
        }
    });

    let mut hull = Vec::new();
    let mut p = leftmost;
    loop {
        hull.push(distinct[p]);
        let mut q = (p + 1) % n;
        for i in 0..n {
            if turn(distinct[p], distinct[i], distinct[q]) == Turn::CounterClockwise {
                q = i;
            }
        }
        p = q;

        if p == leftmost {
            break;
        }
        if hull.len() > n {
            log::warn!("[hull] wrap did not close after {n} steps");
            break;
        }
    }

    hull
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{ConvexHull, MultiPoint};

    fn sorted(mut points: Vec<Coord>) -> Vec<Coord> {
        points.sort_by(|a, b| a.partial_cmp(b).unwrap());
        points
    }

    #[test]
    fn square_returns_its_corners_counter_clockwise() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert_eq!(
            convex_hull(&square),
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
        );
    }

    #[test]
    fn interior_points_are_dropped() {
        let points = [
            [0.5, 0.5],
            [0.0, 0.0],
            [0.2, 0.7],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.9, 0.1],
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&[0.5, 0.5]));
    }

    #[test]
    fn small_inputs_pass_through() {
        assert_eq!(convex_hull(&[[1.0, 2.0], [3.0, 4.0]]).len(), 2);
        assert_eq!(convex_hull(&[[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]]), vec![[1.0, 2.0]]);
        assert!(convex_hull(&[]).is_empty());
    }

    #[test]
    fn duplicates_do_not_stall_the_wrap() {
        let points = [[0.0, 0.0], [0.0, 0.0], [2.0, 0.0], [1.0, 2.0], [2.0, 0.0]];
        assert_eq!(convex_hull(&points).len(), 3);
    }

    #[test]
    fn agrees_with_geo_on_scattered_points() {
        let points: Vec<Coord> = vec![
            [-98.21, 19.04],
            [-98.05, 18.98],
            [-97.91, 19.10],
            [-98.30, 19.22],
            [-98.12, 19.31],
            [-98.15, 19.12],
            [-98.02, 19.07],
            [-97.88, 18.93],
        ];

        let ours = sorted(convex_hull(&points));

        let multi: MultiPoint<f64> = points.clone().into();
        let polygon = multi.convex_hull();
        let mut theirs: Vec<Coord> = polygon.exterior().coords().map(|c| [c.x, c.y]).collect();
        theirs.pop();

        assert_eq!(ours, sorted(theirs));
    }
}
