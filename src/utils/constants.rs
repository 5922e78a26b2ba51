pub const REFERENCE_RADIUS_KM: f64 = 6371.2;

/// Below this |sin(colatitude)| the azimuthal (east) term is skipped.
pub const POLE_THRESHOLD: f64 = 1e-10;

pub const EPOCHS: [f64; 25] = [
    1900.0, 1905.0, 1910.0, 1915.0, 1920.0, 1925.0, 1930.0, 1935.0, 1940.0, 1945.0, 1950.0,
    1955.0, 1960.0, 1965.0, 1970.0, 1975.0, 1980.0, 1985.0, 1990.0, 1995.0, 2000.0, 2005.0,
    2010.0, 2015.0, 2020.0,
];

pub const FIRST_EPOCH: f64 = EPOCHS[0];
pub const LAST_EPOCH: f64 = EPOCHS[EPOCHS.len() - 1];

/// Latest year the secular-variation rate may be extrapolated to.
pub const MAX_EXTRAPOLATION_YEAR: f64 = 2025.0;

pub(crate) const SECULAR_VARIATION_HEADERS: [&str; 2] = ["2025-2030", "2025-30"];
