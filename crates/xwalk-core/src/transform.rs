//! Geodetic <-> local planar conversion.
//!
//! Flat-earth approximation anchored at a [`ReferenceFrame`], valid for the
//! few-kilometre patch around the origin that telemetry and crossing data
//! cover.
//!
//! The forward direction applies no rotation while the inverse undoes the
//! frame's rotation and translation. The two are exact inverses only for a
//! frame without rotation or translation, which is how every deployment frame
//! is built. Stored results depend on this behaviour.

use std::fmt;

use thiserror::Error;

use crate::frame::{GeodeticPoint, PlanarPoint, ReferenceFrame};

/// Which inverse-projection argument left the asin domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionAxis {
    NorthSouth,
    EastWest,
}

impl fmt::Display for ProjectionAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionAxis::NorthSouth => f.write_str("north-south"),
            ProjectionAxis::EastWest => f.write_str("east-west"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TransformError {
    #[error("out-of-range projection on {axis} axis: asin argument {ratio} for planar point ({x}, {y})")]
    OutOfRangeProjection {
        axis: ProjectionAxis,
        ratio: f64,
        x: f64,
        y: f64,
    },
}

/// Project a geodetic point into the frame's planar coordinates.
pub fn to_planar(frame: &ReferenceFrame, point: GeodeticPoint) -> PlanarPoint {
    let dlat_rad = point.latitude.to_radians() - frame.lat0_rad();
    let dlon_rad = point.longitude.to_radians() - frame.lon0_rad();
    let y = dlat_rad.sin() * frame.radius_ns_m();
    let x = dlon_rad.sin() * frame.lat0_rad().cos() * frame.radius_ew_m();
    PlanarPoint { x, y }
}

/// Undo the frame rotation and translation on a planar point.
fn inverse_rotate(frame: &ReferenceFrame, point: PlanarPoint) -> PlanarPoint {
    let (x_inv, y_inv, t_inv) = frame.inverse_rotation();
    let (s, c) = t_inv.sin_cos();
    PlanarPoint {
        x: c * point.x - s * point.y + x_inv,
        y: s * point.x + c * point.y + y_inv,
    }
}

/// Convert a planar point back to latitude/longitude degrees.
///
/// Fails with [`TransformError::OutOfRangeProjection`] instead of returning
/// NaN when the point lies outside the projection's domain.
pub fn to_geodetic(
    frame: &ReferenceFrame,
    point: PlanarPoint,
) -> Result<GeodeticPoint, TransformError> {
    let local = inverse_rotate(frame, point);

    let ns_ratio = local.y / frame.radius_ns_m();
    let ew_ratio = local.x / (frame.radius_ew_m() * frame.lat0_rad().cos());

    let dlat_rad = checked_asin(ns_ratio, ProjectionAxis::NorthSouth, point)?;
    let dlon_rad = checked_asin(ew_ratio, ProjectionAxis::EastWest, point)?;

    Ok(GeodeticPoint {
        latitude: (dlat_rad + frame.lat0_rad()).to_degrees(),
        longitude: (dlon_rad + frame.lon0_rad()).to_degrees(),
    })
}

fn checked_asin(
    ratio: f64,
    axis: ProjectionAxis,
    point: PlanarPoint,
) -> Result<f64, TransformError> {
    if !ratio.is_finite() || ratio.abs() > 1.0 {
        return Err(TransformError::OutOfRangeProjection {
            axis,
            ratio,
            x: point.x,
            y: point.y,
        });
    }
    Ok(ratio.asin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParams;

    #[test]
    fn origin_maps_to_zero() {
        let frame = ReferenceFrame::ccta_martinez();
        let planar = to_planar(&frame, frame.origin());
        assert_eq!(planar, PlanarPoint::new(0.0, 0.0));
    }

    #[test]
    fn derived_origin_maps_to_exact_zero() {
        let frame = ReferenceFrame::new(FrameParams::from_origin(38.0, -122.0, 0.0));
        let planar = to_planar(&frame, frame.origin());
        assert_eq!(planar, PlanarPoint::new(0.0, 0.0));
    }

    #[test]
    fn round_trip_near_origin() {
        let frame = ReferenceFrame::ccta_martinez();
        let points = [
            GeodeticPoint::new(37.994154054077832, -122.12858376770639),
            GeodeticPoint::new(37.993740037830712, -122.12837294588802),
            GeodeticPoint::new(38.006, -122.12),
        ];
        for point in points {
            let back = to_geodetic(&frame, to_planar(&frame, point)).unwrap();
            assert!((back.latitude - point.latitude).abs() < 1e-6);
            assert!((back.longitude - point.longitude).abs() < 1e-6);
        }
    }

    #[test]
    fn golden_inverse_projection() {
        let frame = ReferenceFrame::ccta_martinez();
        let geo = to_geodetic(
            &frame,
            PlanarPoint::new(-384.3115471328425, -275.4964434083863),
        )
        .unwrap();
        assert!((geo.latitude - 37.99999752552321).abs() < 1e-9, "{}", geo.latitude);
        assert!((geo.longitude - -122.13107700932706).abs() < 1e-9, "{}", geo.longitude);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let frame = ReferenceFrame::ccta_martinez();
        let err = to_geodetic(&frame, PlanarPoint::new(0.0, 7_000_000.0)).unwrap_err();
        assert!(matches!(
            err,
            TransformError::OutOfRangeProjection {
                axis: ProjectionAxis::NorthSouth,
                ..
            }
        ));

        let err = to_geodetic(&frame, PlanarPoint::new(-6_000_000.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            TransformError::OutOfRangeProjection {
                axis: ProjectionAxis::EastWest,
                ..
            }
        ));
    }

    #[test]
    fn nan_input_is_an_error() {
        let frame = ReferenceFrame::ccta_martinez();
        assert!(to_geodetic(&frame, PlanarPoint::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn rotated_frame_is_not_symmetric() {
        let params = FrameParams::ccta_martinez().with_rotation(0.3);
        let frame = ReferenceFrame::new(params);
        let point = GeodeticPoint::new(37.9995, -122.128);
        let back = to_geodetic(&frame, to_planar(&frame, point)).unwrap();
        assert!((back.latitude - point.latitude).abs() > 1e-6);
    }
}
