//! Physical <-> logical coordinate mapping.
//!
//! The model works in the capture's physical pixel grid while the input
//! injector expects logical points. Both directions round half away from zero
//! so a point mapped down and back never drifts by more than the rounding unit.

use deskpilot_core_types::{LogicalPoint, PhysicalPoint, ScaleFactor};

pub fn to_logical(physical: i32, scale: ScaleFactor) -> i32 {
    (f64::from(physical) / scale.get()).round() as i32
}

pub fn to_physical(logical: i32, scale: ScaleFactor) -> i32 {
    (f64::from(logical) * scale.get()).round() as i32
}

pub fn point_to_logical(point: PhysicalPoint, scale: ScaleFactor) -> LogicalPoint {
    LogicalPoint::new(to_logical(point.x, scale), to_logical(point.y, scale))
}

pub fn point_to_physical(point: LogicalPoint, scale: ScaleFactor) -> PhysicalPoint {
    PhysicalPoint::new(to_physical(point.x, scale), to_physical(point.y, scale))
}
