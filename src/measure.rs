//! Measurements taken from the coordinate store.
//!
//! Precision and distance need exactly one ball on the table; anything else
//! is an operator error reported through [`MeasureError`], never guessed.

#[cfg(test)]
#[path = "measure_test.rs"]
mod measure_test;

use crate::state::coords::{Coordinate, CoordinateStore, Point, START_MARKER_ID};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MeasureError {
    #[error("No ball found. Please retry or manually place a ball on the screen.")]
    NoBall,
    #[error(
        "More than one ball found ({count}), please delete the other balls on the screen or remove them from the field and try again"
    )]
    MultipleBalls { count: usize },
    #[error("Place the start marker on the image before measuring a distance.")]
    MissingStartMarker,
}

/// The only ball in the primary layer.
///
/// # Errors
///
/// [`MeasureError::NoBall`] or [`MeasureError::MultipleBalls`].
pub fn single_ball(store: &CoordinateStore) -> Result<&Coordinate, MeasureError> {
    let mut balls = store.primary();
    match (balls.next(), store.primary_len()) {
        (Some(ball), 1) => Ok(ball),
        (None, _) => Err(MeasureError::NoBall),
        (Some(_), count) => Err(MeasureError::MultipleBalls { count }),
    }
}

/// Straight-line distance in mm from the single ball to `target`.
///
/// # Errors
///
/// See [`single_ball`].
pub fn precision_distance(store: &CoordinateStore, target: Point) -> Result<f64, MeasureError> {
    Ok(single_ball(store)?.real.distance_to(target))
}

/// Travel distance in mm along the long side, from the start marker over
/// `collisions` short-cushion contacts to the single ball.
///
/// The start marker fixes the starting half: from the left half the first
/// leg runs right, from the right half it runs left. Each collision adds one
/// table length; the parity decides which cushion the last leg starts from.
///
/// # Errors
///
/// [`MeasureError::MissingStartMarker`] or a [`single_ball`] error.
pub fn cushion_distance(store: &CoordinateStore, collisions: u32) -> Result<f64, MeasureError> {
    let ball = single_ball(store)?.pixel.x;
    let start = store.get(START_MARKER_ID).ok_or(MeasureError::MissingStartMarker)?.pixel.x;
    let scale = store.scale();
    let width = scale.rendered.width;
    let even = collisions % 2 == 0;

    let (offset, last_leg) = if start < width / 2.0 {
        (start, if even { ball } else { width - ball })
    } else {
        (width - start, if even { width - ball } else { ball })
    };
    Ok(scale.pixel_len_to_real(f64::from(collisions) * width - offset + last_leg))
}

/// Balls sunk out of `total`, given the balls still detected.
#[must_use]
pub fn sunk_count(total: u32, remaining: usize) -> u32 {
    let remaining = u32::try_from(remaining).unwrap_or(u32::MAX);
    total.saturating_sub(remaining)
}
