//! Error types for the layout engine

use thiserror::Error;

/// The surface cannot hold every element at its minimum size
///
/// Layout still produces clamped geometry; this value tells the caller
/// that boxes may be cramped or overlapping.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error(
    "surface {available_width}x{available_height} is smaller than the \
     {required_width}x{required_height} the circuit needs"
)]
pub struct DegenerateSurface {
    pub required_width: i32,
    pub required_height: i32,
    pub available_width: i32,
    pub available_height: i32,
}

impl DegenerateSurface {
    /// Check a surface against the required size
    pub fn check(
        required_width: i32,
        required_height: i32,
        available_width: i32,
        available_height: i32,
    ) -> Option<Self> {
        let cramped = available_width <= 0
            || available_height <= 0
            || required_width > available_width
            || required_height > available_height;

        cramped.then_some(Self {
            required_width,
            required_height,
            available_width,
            available_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits() {
        assert_eq!(DegenerateSurface::check(100, 50, 100, 50), None);
    }

    #[test]
    fn test_too_narrow() {
        let err = DegenerateSurface::check(120, 50, 100, 50).unwrap();
        assert_eq!(
            err.to_string(),
            "surface 100x50 is smaller than the 120x50 the circuit needs"
        );
    }

    #[test]
    fn test_empty_surface() {
        assert!(DegenerateSurface::check(0, 0, 0, 10).is_some());
    }
}
