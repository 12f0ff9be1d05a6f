//! Delaunay triangulation of scattered (x, y) samples.
//!
//! Built by a lexicographic sweep followed by Lawson edge flips:
//!
//! 1. Sort samples by (x, y) and merge exact duplicates (values averaged).
//! 2. Fan-triangulate the leading collinear run against the first point off
//!    its line, then add each later point by connecting it to every hull edge
//!    it sees. Sorted insertion keeps each new point outside the current hull,
//!    so the triangles always tile the convex hull of the points seen so far.
//! 3. Flip every edge whose opposite vertex falls inside the circumcircle
//!    until none is left.
//!
//! Orientation and in-circle tests use relative tolerances, so cocircular
//! points (regular grids) never flip back and forth. Every step iterates in
//! index order, so identical input always yields identical triangles.

use std::collections::HashMap;

use crate::error::{self, IvSurfError};

/// Relative tolerance below which three points count as collinear.
const ORIENT_EPS: f64 = 1e-12;
/// Relative tolerance below which four points count as cocircular.
const INCIRCLE_EPS: f64 = 1e-10;
/// Barycentric slack for points on a triangle edge.
const BARY_EPS: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

/// Affine map of one axis onto [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisMap {
    offset: f64,
    scale: f64,
}

impl AxisMap {
    const IDENTITY: Self = Self {
        offset: 0.0,
        scale: 1.0,
    };

    fn fit(values: impl Iterator<Item = f64>) -> Self {
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let span = hi - lo;
        Self {
            offset: lo,
            scale: if span > 0.0 { span } else { 1.0 },
        }
    }

    fn apply(self, v: f64) -> f64 {
        (v - self.offset) / self.scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Bounds {
    fn of(a: Point, b: Point, c: Point) -> Self {
        let min_x = a.x.min(b.x).min(c.x);
        let max_x = a.x.max(b.x).max(c.x);
        let min_y = a.y.min(b.y).min(c.y);
        let max_y = a.y.max(b.y).max(c.y);
        let slack = BARY_EPS * ((max_x - min_x) + (max_y - min_y));
        Self {
            min_x: min_x - slack,
            max_x: max_x + slack,
            min_y: min_y - slack,
            max_y: max_y + slack,
        }
    }

    fn contains(&self, q: Point) -> bool {
        q.x >= self.min_x && q.x <= self.max_x && q.y >= self.min_y && q.y <= self.max_y
    }
}

/// Twice the signed area of (a, b, c): positive when counter-clockwise,
/// zero when collinear within tolerance.
fn orient(a: Point, b: Point, c: Point) -> f64 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let (acx, acy) = (c.x - a.x, c.y - a.y);
    let det = abx * acy - aby * acx;
    if det.abs() <= ORIENT_EPS * abx.hypot(aby) * acx.hypot(acy) {
        0.0
    } else {
        det
    }
}

/// Positive when `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle (a, b, c), zero when cocircular within tolerance.
fn incircle(a: Point, b: Point, c: Point, d: Point) -> f64 {
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);
    let (alift, blift, clift) = (
        adx * adx + ady * ady,
        bdx * bdx + bdy * bdy,
        cdx * cdx + cdy * cdy,
    );
    let det = alift * (bdx * cdy - cdx * bdy)
        + blift * (cdx * ady - adx * cdy)
        + clift * (adx * bdy - bdx * ady);
    let permanent = alift * ((bdx * cdy).abs() + (cdx * bdy).abs())
        + blift * ((cdx * ady).abs() + (adx * cdy).abs())
        + clift * ((adx * bdy).abs() + (bdx * ady).abs());
    if det.abs() <= INCIRCLE_EPS * permanent {
        0.0
    } else {
        det
    }
}

/// Directed edges of a counter-clockwise triangle.
fn tri_edges([a, b, c]: [usize; 3]) -> [(usize, usize); 3] {
    [(a, b), (b, c), (c, a)]
}

/// The vertex of `tri` that is neither `a` nor `b`.
fn opposite(tri: [usize; 3], a: usize, b: usize) -> usize {
    tri[0] + tri[1] + tri[2] - a - b
}

/// Piecewise-linear interpolant over a Delaunay triangulation.
#[derive(Debug, Clone)]
pub(crate) struct Triangulation {
    x_map: AxisMap,
    y_map: AxisMap,
    points: Vec<Point>,
    values: Vec<f64>,
    /// Counter-clockwise vertex triples.
    triangles: Vec<[usize; 3]>,
    bounds: Vec<Bounds>,
}

impl Triangulation {
    /// Triangulate `(x, y, value)` samples.
    ///
    /// With `rescale`, each axis is mapped onto [0, 1] before triangulating
    /// and queries go through the same map.
    ///
    /// # Errors
    /// - [`IvSurfError::InvalidInput`] if any coordinate or value is not finite.
    /// - [`IvSurfError::InsufficientData`] if fewer than 3 distinct points
    ///   remain after merging duplicates, or all points are collinear.
    pub(crate) fn new(samples: &[(f64, f64, f64)], rescale: bool) -> error::Result<Self> {
        if let Some(&(x, y, z)) = samples
            .iter()
            .find(|(x, y, z)| !(x.is_finite() && y.is_finite() && z.is_finite()))
        {
            return Err(IvSurfError::InvalidInput {
                message: format!("sample ({x}, {y}, {z}) is not finite"),
            });
        }

        let merged = merge_duplicates(samples);
        let n = merged.len();
        if n < 3 {
            return Err(IvSurfError::InsufficientData {
                message: format!("at least 3 distinct points required, got {n}"),
            });
        }

        let (x_map, y_map) = if rescale {
            (
                AxisMap::fit(merged.iter().map(|s| s.0)),
                AxisMap::fit(merged.iter().map(|s| s.1)),
            )
        } else {
            (AxisMap::IDENTITY, AxisMap::IDENTITY)
        };
        let points: Vec<Point> = merged
            .iter()
            .map(|&(x, y, _)| Point {
                x: x_map.apply(x),
                y: y_map.apply(y),
            })
            .collect();
        let values: Vec<f64> = merged.iter().map(|s| s.2).collect();

        let mut triangles = sweep(&points)?;
        let _flips = legalize(&points, &mut triangles);
        let bounds = triangles
            .iter()
            .map(|&[a, b, c]| Bounds::of(points[a], points[b], points[c]))
            .collect();

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_samples = samples.len(),
            n_points = n,
            n_triangles = triangles.len(),
            flips = _flips,
            rescale,
            "triangulation built"
        );

        Ok(Self {
            x_map,
            y_map,
            points,
            values,
            triangles,
            bounds,
        })
    }

    /// Number of distinct points.
    pub(crate) fn num_points(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Linear interpolation at `(x, y)`, or `None` outside the convex hull.
    ///
    /// Triangles are searched in index order; a point on a shared edge takes
    /// its value from the first triangle that contains it.
    pub(crate) fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let q = Point {
            x: self.x_map.apply(x),
            y: self.y_map.apply(y),
        };
        self.triangles
            .iter()
            .zip(&self.bounds)
            .filter(|(_, b)| b.contains(q))
            .find_map(|(&tri, _)| self.barycentric(tri, q))
            .filter(|v| v.is_finite())
    }

    fn barycentric(&self, [a, b, c]: [usize; 3], q: Point) -> Option<f64> {
        let (pa, pb, pc) = (self.points[a], self.points[b], self.points[c]);
        let det = (pb.y - pc.y) * (pa.x - pc.x) + (pc.x - pb.x) * (pa.y - pc.y);
        if det == 0.0 {
            return None;
        }
        let l0 = ((pb.y - pc.y) * (q.x - pc.x) + (pc.x - pb.x) * (q.y - pc.y)) / det;
        let l1 = ((pc.y - pa.y) * (q.x - pc.x) + (pa.x - pc.x) * (q.y - pc.y)) / det;
        let l2 = 1.0 - l0 - l1;
        if l0 < -BARY_EPS || l1 < -BARY_EPS || l2 < -BARY_EPS {
            return None;
        }
        Some(l0 * self.values[a] + l1 * self.values[b] + l2 * self.values[c])
    }
}

/// Sort lexicographically and average the values of coincident points.
fn merge_duplicates(samples: &[(f64, f64, f64)]) -> Vec<(f64, f64, f64)> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut groups: Vec<(f64, f64, f64, usize)> = Vec::with_capacity(sorted.len());
    for (x, y, z) in sorted {
        match groups.last_mut() {
            Some(g) if g.0 == x && g.1 == y => {
                g.2 += z;
                g.3 += 1;
            }
            _ => groups.push((x, y, z, 1)),
        }
    }
    groups
        .into_iter()
        .map(|(x, y, sum, count)| (x, y, sum / count as f64))
        .collect()
}

/// Lexicographic sweep triangulation of sorted, distinct points.
fn sweep(p: &[Point]) -> error::Result<Vec<[usize; 3]>> {
    let n = p.len();
    let Some(k) = (2..n).find(|&k| orient(p[0], p[1], p[k]) != 0.0) else {
        return Err(IvSurfError::InsufficientData {
            message: format!("all {n} points are collinear"),
        });
    };

    // Points 0..k lie on one line; fan them against p[k].
    let apex_left = orient(p[0], p[1], p[k]) > 0.0;
    let mut triangles = Vec::with_capacity(2 * n);
    for i in 0..k - 1 {
        triangles.push(if apex_left {
            [i, i + 1, k]
        } else {
            [i + 1, i, k]
        });
    }
    // Counter-clockwise hull.
    let mut hull: Vec<usize> = if apex_left {
        (0..=k).collect()
    } else {
        (0..k).rev().chain([k]).collect()
    };

    for j in k + 1..n {
        let h = hull.len();
        let visible: Vec<bool> = (0..h)
            .map(|i| orient(p[hull[i]], p[hull[(i + 1) % h]], p[j]) < 0.0)
            .collect();
        // Visible edges form one contiguous run; find where it starts.
        let Some(first) = (0..h).find(|&i| visible[i] && !visible[(i + h - 1) % h]) else {
            #[cfg(feature = "logging")]
            tracing::trace!(index = j, "point sees no hull edge, skipped");
            continue;
        };
        let mut last = first;
        while visible[(last + 1) % h] {
            last = (last + 1) % h;
        }

        let mut i = first;
        loop {
            triangles.push([hull[(i + 1) % h], hull[i], j]);
            if i == last {
                break;
            }
            i = (i + 1) % h;
        }

        let mut next = Vec::with_capacity(h + 1);
        let mut i = (last + 1) % h;
        loop {
            next.push(hull[i]);
            if i == first {
                break;
            }
            i = (i + 1) % h;
        }
        next.push(j);
        hull = next;
    }

    Ok(triangles)
}

/// Lawson flips until every interior edge is locally Delaunay.
/// Returns the number of flips performed.
fn legalize(p: &[Point], triangles: &mut [[usize; 3]]) -> usize {
    let mut edges: HashMap<(usize, usize), usize> = HashMap::with_capacity(3 * triangles.len());
    for (t, &tri) in triangles.iter().enumerate() {
        for e in tri_edges(tri) {
            edges.insert(e, t);
        }
    }

    let mut stack: Vec<(usize, usize)> = triangles.iter().flat_map(|&t| tri_edges(t)).collect();
    let flip_limit = 4 * p.len() * p.len() + 64;
    let mut flips = 0;

    while let Some((a, b)) = stack.pop() {
        let (Some(&t1), Some(&t2)) = (edges.get(&(a, b)), edges.get(&(b, a))) else {
            continue;
        };
        let c = opposite(triangles[t1], a, b);
        let d = opposite(triangles[t2], b, a);
        if incircle(p[a], p[b], p[c], p[d]) <= 0.0 {
            continue;
        }
        if orient(p[a], p[d], p[c]) <= 0.0 || orient(p[d], p[b], p[c]) <= 0.0 {
            continue;
        }

        for e in tri_edges(triangles[t1]).into_iter().chain(tri_edges(triangles[t2])) {
            edges.remove(&e);
        }
        triangles[t1] = [a, d, c];
        triangles[t2] = [d, b, c];
        for e in tri_edges(triangles[t1]) {
            edges.insert(e, t1);
        }
        for e in tri_edges(triangles[t2]) {
            edges.insert(e, t2);
        }
        stack.extend([(a, d), (d, b), (b, c), (c, a)]);

        flips += 1;
        if flips >= flip_limit {
            #[cfg(feature = "logging")]
            tracing::warn!(flips, "edge flip limit reached");
            break;
        }
    }
    flips
}
