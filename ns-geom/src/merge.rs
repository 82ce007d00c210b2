use crate::shape::{DiscreteVoxelShape, VoxelShape};

const MERGE_EPS: f32 = 1.0e-6;

/// Boolean operator applied per merged sub-cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    Or,
    And,
    /// Present in the first shape and not the second.
    OnlyFirst,
    /// Present in exactly one of the two.
    NotSame,
}

impl BoolOp {
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BoolOp::Or => a || b,
            BoolOp::And => a && b,
            BoolOp::OnlyFirst => a && !b,
            BoolOp::NotSame => a != b,
        }
    }
}

/// One merged breakpoint axis: the combined point list plus, per merged
/// interval, the source interval index in each input (`None` when the
/// interval lies outside that input).
struct MergedLine {
    points: Vec<f32>,
    first: Vec<Option<usize>>,
    second: Vec<Option<usize>>,
}

fn interval_of(points: &[f32], mid: f32) -> Option<usize> {
    if points.len() < 2 {
        return None;
    }
    if mid <= points[0] || mid >= points[points.len() - 1] {
        return None;
    }
    for i in 0..points.len() - 1 {
        if mid > points[i] && mid < points[i + 1] {
            return Some(i);
        }
    }
    None
}

fn merge_line(a: &[f32], b: &[f32]) -> MergedLine {
    // Identical lists are the common case (stacked full cubes); skip the
    // general merge.
    if a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).abs() <= MERGE_EPS)
    {
        let n = a.len().saturating_sub(1);
        return MergedLine {
            points: a.to_vec(),
            first: (0..n).map(Some).collect(),
            second: (0..n).map(Some).collect(),
        };
    }

    let mut points: Vec<f32> = Vec::with_capacity(a.len() + b.len());
    let mut ai = 0;
    let mut bi = 0;
    while ai < a.len() || bi < b.len() {
        let next = match (a.get(ai), b.get(bi)) {
            (Some(x), Some(y)) => {
                if (x - y).abs() <= MERGE_EPS {
                    ai += 1;
                    bi += 1;
                    *x
                } else if x < y {
                    ai += 1;
                    *x
                } else {
                    bi += 1;
                    *y
                }
            }
            (Some(x), None) => {
                ai += 1;
                *x
            }
            (None, Some(y)) => {
                bi += 1;
                *y
            }
            (None, None) => break,
        };
        if points
            .last()
            .is_none_or(|last| (next - last).abs() > MERGE_EPS)
        {
            points.push(next);
        }
    }

    let n = points.len().saturating_sub(1);
    let mut first = Vec::with_capacity(n);
    let mut second = Vec::with_capacity(n);
    for i in 0..n {
        let mid = (points[i] + points[i + 1]) * 0.5;
        first.push(interval_of(a, mid));
        second.push(interval_of(b, mid));
    }
    MergedLine {
        points,
        first,
        second,
    }
}

/// Boolean combination of two shapes over the merged breakpoint grid.
pub fn join(a: &VoxelShape, b: &VoxelShape, op: BoolOp) -> VoxelShape {
    if a.is_empty() && b.is_empty() {
        return VoxelShape::empty();
    }

    let mx = merge_line(&a.xs, &b.xs);
    let my = merge_line(&a.ys, &b.ys);
    let mz = merge_line(&a.zs, &b.zs);

    let sx = mx.first.len();
    let sy = my.first.len();
    let sz = mz.first.len();
    let mut grid = DiscreteVoxelShape::new(sx, sy, sz);
    for y in 0..sy {
        for z in 0..sz {
            for x in 0..sx {
                let in_a = match (mx.first[x], my.first[y], mz.first[z]) {
                    (Some(ix), Some(iy), Some(iz)) => a.grid.is_full(ix, iy, iz),
                    _ => false,
                };
                let in_b = match (mx.second[x], my.second[y], mz.second[z]) {
                    (Some(ix), Some(iy), Some(iz)) => b.grid.is_full(ix, iy, iz),
                    _ => false,
                };
                if op.apply(in_a, in_b) {
                    grid.fill(x, y, z);
                }
            }
        }
    }

    if grid.is_empty() {
        return VoxelShape::empty();
    }
    VoxelShape {
        grid,
        xs: mx.points,
        ys: my.points,
        zs: mz.points,
    }
}

/// Whether the two shapes share any volume. Equivalent to a non-empty
/// `And` join, but bails on the first overlapping sub-cell.
pub fn intersects(a: &VoxelShape, b: &VoxelShape) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let mx = merge_line(&a.xs, &b.xs);
    let my = merge_line(&a.ys, &b.ys);
    let mz = merge_line(&a.zs, &b.zs);
    for y in 0..my.first.len() {
        for z in 0..mz.first.len() {
            for x in 0..mx.first.len() {
                let in_a = match (mx.first[x], my.first[y], mz.first[z]) {
                    (Some(ix), Some(iy), Some(iz)) => a.grid.is_full(ix, iy, iz),
                    _ => false,
                };
                if !in_a {
                    continue;
                }
                let in_b = match (mx.second[x], my.second[y], mz.second[z]) {
                    (Some(ix), Some(iy), Some(iz)) => b.grid.is_full(ix, iy, iz),
                    _ => false,
                };
                if in_b {
                    return true;
                }
            }
        }
    }
    false
}
