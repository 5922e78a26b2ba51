use crate::error::IgrfError;
use crate::igrf::coefficients::{CoefficientMap, CoefficientStore};
use crate::igrf::synthesis::{synthesize_field, FieldVector};

type Result<T> = std::result::Result<T, IgrfError>;

/// Full main field at a point for a (fractional) year.
///
/// # Errors
/// Will return `Err` if `year` is outside `[1900, 2025]`.
pub fn main_field(
    store: &CoefficientStore,
    year: f64,
    latitude: f64,
    longitude: f64,
    altitude: f64,
) -> Result<FieldVector> {
    let (g, h) = store.resolve(year)?;
    let n_max = g.max_degree().unwrap_or(0);
    Ok(synthesize_field(&g, &h, latitude, longitude, altitude, n_max))
}

/// Dipole (degree 1) part of an already resolved coefficient set
pub fn dipole_from_coefficients(
    g: &CoefficientMap,
    h: &CoefficientMap,
    latitude: f64,
    longitude: f64,
    altitude: f64,
) -> FieldVector {
    let g_dipole = g.restrict_to_degree(1);
    let h_dipole = h.restrict_to_degree(1);
    synthesize_field(&g_dipole, &h_dipole, latitude, longitude, altitude, 1)
}

/// Full field minus its dipole part for an already resolved coefficient set
pub fn non_dipole_from_coefficients(
    g: &CoefficientMap,
    h: &CoefficientMap,
    latitude: f64,
    longitude: f64,
    altitude: f64,
) -> FieldVector {
    let n_max = g.max_degree().unwrap_or(0);
    let full = synthesize_field(g, h, latitude, longitude, altitude, n_max);
    let dipole = dipole_from_coefficients(g, h, latitude, longitude, altitude);
    full - dipole
}

/// Non-dipole field at a point: the full field less its degree-1 part.
///
/// # Errors
/// Will return `Err` if `year` is outside `[1900, 2025]`.
pub fn non_dipole_field(
    store: &CoefficientStore,
    year: f64,
    latitude: f64,
    longitude: f64,
    altitude: f64,
) -> Result<FieldVector> {
    let (g, h) = store.resolve(year)?;
    Ok(non_dipole_from_coefficients(
        &g, &h, latitude, longitude, altitude,
    ))
}
