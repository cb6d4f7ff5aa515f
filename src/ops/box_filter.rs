// ============================================================================
// BOX FILTER — sliding-window moving average along rows and columns
// ============================================================================
//
// Every output element is the mean of the 2r+1 elements centred on it, with
// indices past either end replicating the edge element. A running sum makes
// each step O(1), so a line costs O(len) whatever the radius.
//
// Rows are filtered straight into the destination, one rayon task per row.
// Columns are strided in memory, so each column task writes its own
// contiguous chunk of a column-major scratch plane, which is then transposed
// back row by row. Every task owns a disjoint `&mut` slice; every
// `for_each` returns only once all of its tasks are done.
// ============================================================================

use rayon::prelude::*;

use super::channels::ChannelBuffer;
use super::div_round_half_away;

/// Axis a 1-D filter runs along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Along each row (left to right).
    Horizontal,
    /// Along each column (top to bottom).
    Vertical,
}

/// Allocating 1-D box blur of a `width`×`height` plane along `direction`.
pub fn box_blur_1d(
    src: &[i32],
    width: usize,
    height: usize,
    direction: Direction,
    radius: usize,
) -> ChannelBuffer {
    let mut dst = vec![0; src.len()];
    match direction {
        Direction::Horizontal => box_blur_rows(src, &mut dst, width, radius),
        Direction::Vertical => {
            let mut scratch = vec![0; src.len()];
            box_blur_columns(src, &mut dst, &mut scratch, width, height, radius);
        }
    }
    dst
}

/// One separable pass: rows of `src` into `dst`, then columns of `dst` back
/// into `dst` by way of `scratch`. Radius 0 is a plain copy.
pub fn separable_pass(
    src: &[i32],
    dst: &mut [i32],
    scratch: &mut [i32],
    width: usize,
    height: usize,
    radius: usize,
) {
    if radius == 0 {
        dst.copy_from_slice(src);
        return;
    }
    box_blur_rows(src, dst, width, radius);
    // rows are complete here; the column pass reads what they wrote
    box_blur_columns_in_place(dst, scratch, width, height, radius);
}

/// Horizontal filter, one task per row.
pub fn box_blur_rows(src: &[i32], dst: &mut [i32], width: usize, radius: usize) {
    debug_assert_eq!(src.len(), dst.len());
    if width == 0 {
        return;
    }
    dst.par_chunks_mut(width)
        .zip(src.par_chunks(width))
        .for_each(|(row_out, row_in)| {
            filter_line(width, radius, |i| row_in[i], row_out);
        });
}

/// Vertical filter of `src` into `dst`. `scratch` must be as long as `src`.
pub fn box_blur_columns(
    src: &[i32],
    dst: &mut [i32],
    scratch: &mut [i32],
    width: usize,
    height: usize,
    radius: usize,
) {
    debug_assert_eq!(src.len(), dst.len());
    columns_to_scratch(src, scratch, width, height, radius);
    transpose_back(scratch, dst, width, height);
}

fn box_blur_columns_in_place(
    plane: &mut [i32],
    scratch: &mut [i32],
    width: usize,
    height: usize,
    radius: usize,
) {
    columns_to_scratch(plane, scratch, width, height, radius);
    transpose_back(scratch, plane, width, height);
}

/// Filter every column of `src`, writing column `x` to
/// `scratch[x * height..(x + 1) * height]`.
fn columns_to_scratch(src: &[i32], scratch: &mut [i32], width: usize, height: usize, radius: usize) {
    debug_assert_eq!(src.len(), scratch.len());
    if height == 0 {
        return;
    }
    scratch
        .par_chunks_mut(height)
        .enumerate()
        .for_each(|(x, col_out)| {
            filter_line(height, radius, |i| src[i * width + x], col_out);
        });
}

/// Gather the column-major `scratch` back into row-major `dst`.
fn transpose_back(scratch: &[i32], dst: &mut [i32], width: usize, height: usize) {
    if width == 0 {
        return;
    }
    dst.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row_out)| {
            for (x, v) in row_out.iter_mut().enumerate() {
                *v = scratch[x * height + y];
            }
        });
}

/// Sliding-window average of one line of `len` elements read through `get`.
///
/// The running sum starts as if the window sat one step left of index 0:
/// r+1 virtual copies of the first element plus elements `0..r` (indices past
/// the end read the last element). Each step
/// then adds the element entering at `i + r` (clamped to the last element)
/// and drops the one leaving at `i - r - 1` (the first element while that
/// index is still in the left padding).
#[inline]
fn filter_line<F>(len: usize, radius: usize, get: F, out: &mut [i32])
where
    F: Fn(usize) -> i32,
{
    debug_assert_eq!(out.len(), len);
    if len == 0 {
        return;
    }
    let last = len - 1;
    let div = (2 * radius + 1) as i64;
    let first = get(0) as i64;

    // padding beyond the right end is counted, not walked, so the seed
    // costs O(min(r, len))
    let mut val = (radius as i64 + 1) * first;
    let inside = radius.min(len);
    for j in 0..inside {
        val += get(j) as i64;
    }
    val += (radius - inside) as i64 * get(last) as i64;

    for (i, o) in out.iter_mut().enumerate() {
        let incoming = get(i.saturating_add(radius).min(last)) as i64;
        let outgoing = if i > radius {
            get(i - radius - 1) as i64
        } else {
            first
        };
        val += incoming - outgoing;
        *o = div_round_half_away(val, div) as i32;
    }
}
