use crate::error::IgrfError;
use crate::igrf::coefficients::CoefficientStore;
use crate::igrf::non_dipole::non_dipole_from_coefficients;
use crate::igrf::synthesis::FieldComponent;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

type Result<T> = std::result::Result<T, GridError>;

#[derive(Error, Debug)]
pub enum GridError {
    /// Grid layout or year sequence cannot be scanned
    #[error("invalid grid specification: {0}")]
    InvalidSpec(String),

    /// A stored grid file is not in the expected layout
    #[error("unsupported grid file: {0}")]
    Format(String),

    #[error("{0}")]
    Igrf(#[from] IgrfError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "python")]
impl From<GridError> for pyo3::PyErr {
    fn from(value: GridError) -> Self {
        let msg = value.to_string();
        pyo3::exceptions::PyValueError::new_err(msg)
    }
}

/// Latitude/longitude layout of a scan, in degrees. Both axes include their end points.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lat_step: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub lon_step: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            lat_min: -90.0,
            lat_max: 90.0,
            lat_step: 5.0,
            lon_min: -180.0,
            lon_max: 180.0,
            lon_step: 10.0,
        }
    }
}

impl GridSpec {
    /// Checks that both axes are scannable and the latitudes are physical
    pub fn validate(&self) -> Result<()> {
        check_axis("latitude", self.lat_min, self.lat_max, self.lat_step)?;
        check_axis("longitude", self.lon_min, self.lon_max, self.lon_step)?;
        if self.lat_min < -90.0 || self.lat_max > 90.0 {
            return Err(GridError::InvalidSpec(format!(
                "latitudes [{}, {}] fall outside [-90, 90]",
                self.lat_min, self.lat_max
            )));
        }
        Ok(())
    }

    pub fn latitudes(&self) -> Vec<f64> {
        axis(self.lat_min, self.lat_max, self.lat_step)
    }

    pub fn longitudes(&self) -> Vec<f64> {
        axis(self.lon_min, self.lon_max, self.lon_step)
    }
}

fn check_axis(name: &str, min: f64, max: f64, step: f64) -> Result<()> {
    if !(step.is_finite() && step > 0.0) {
        return Err(GridError::InvalidSpec(format!(
            "{name} step must be positive, got {step}"
        )));
    }
    if !(min.is_finite() && max.is_finite() && min <= max) {
        return Err(GridError::InvalidSpec(format!(
            "{name} range [{min}, {max}] is empty"
        )));
    }
    Ok(())
}

fn axis(min: f64, max: f64, step: f64) -> Vec<f64> {
    let count = ((max - min) / step + 1e-9).floor() as usize + 1;
    (0..count).map(|k| min + k as f64 * step).collect()
}

/// One field component of the non-dipole field sampled over a lat/lon grid
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    pub year: f64,
    pub component: FieldComponent,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    /// Row-major, one row per latitude
    pub values: Vec<f64>,
}

impl FieldGrid {
    pub fn shape(&self) -> (usize, usize) {
        (self.latitudes.len(), self.longitudes.len())
    }

    pub fn get(&self, lat_index: usize, lon_index: usize) -> Option<f64> {
        if lat_index >= self.latitudes.len() || lon_index >= self.longitudes.len() {
            return None;
        }
        self.values
            .get(lat_index * self.longitudes.len() + lon_index)
            .copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.longitudes.len().max(1))
    }
}

/// Evaluates one component of the non-dipole field at every cell of `spec`.
///
/// The coefficients are resolved once for `year`, then latitude rows are
/// evaluated in parallel.
///
/// # Errors
/// Will return `Err` if `spec` is invalid or `year` is outside `[1900, 2025]`.
pub fn compute_grid(
    store: &CoefficientStore,
    year: f64,
    altitude: f64,
    spec: &GridSpec,
    component: FieldComponent,
) -> Result<FieldGrid> {
    spec.validate()?;
    let (g, h) = store.resolve(year)?;
    let (g, h) = (&g, &h);
    let latitudes = spec.latitudes();
    let longitudes = spec.longitudes();

    let values: Vec<f64> = latitudes
        .par_iter()
        .flat_map_iter(|&lat| {
            longitudes.iter().map(move |&lon| {
                non_dipole_from_coefficients(g, h, lat, lon, altitude).component(component)
            })
        })
        .collect();

    log::debug!(
        "Computed {}x{} {} grid for {}",
        latitudes.len(),
        longitudes.len(),
        component.tag(),
        year
    );
    Ok(FieldGrid {
        year,
        component,
        latitudes,
        longitudes,
        values,
    })
}

/// Years from `start` to `end` inclusive in increments of `step`
pub fn year_sequence(start: i32, end: i32, step: u32) -> Result<Vec<i32>> {
    if step == 0 {
        return Err(GridError::InvalidSpec("year step must be non-zero".to_string()));
    }
    if start > end {
        return Err(GridError::InvalidSpec(format!(
            "start year {start} is after end year {end}"
        )));
    }
    Ok((start..=end).step_by(step as usize).collect())
}

/// File name a grid of `component` for `year` is stored under
pub fn grid_file_name(component: FieldComponent, year: i32) -> String {
    format!("non_dipole_{}_{}.npy", component.tag(), year)
}

pub fn grid_path<P: AsRef<Path>>(dir: P, component: FieldComponent, year: i32) -> PathBuf {
    dir.as_ref().join(grid_file_name(component, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::igrf::coefficients::{CoefficientKind, CoefficientSeries};
    use crate::igrf::non_dipole::non_dipole_field;
    use crate::utils::constants::EPOCHS;

    fn quadrupole_store() -> CoefficientStore {
        let rows = [
            (CoefficientKind::G, 1, 0, -29404.8),
            (CoefficientKind::G, 1, 1, -1450.9),
            (CoefficientKind::H, 1, 1, 4652.5),
            (CoefficientKind::G, 2, 0, -2499.6),
            (CoefficientKind::G, 2, 1, 2982.0),
            (CoefficientKind::H, 2, 1, -2991.6),
            (CoefficientKind::G, 2, 2, 1677.0),
            (CoefficientKind::H, 2, 2, -734.6),
        ];
        let series = rows
            .into_iter()
            .map(|(kind, degree, order, value)| CoefficientSeries {
                kind,
                degree,
                order,
                values: (0..EPOCHS.len()).map(|i| value + i as f64).collect(),
                secular_variation: 1.0,
            })
            .collect();
        CoefficientStore::new(series).unwrap()
    }

    #[test]
    fn default_axes() {
        let spec = GridSpec::default();
        let lats = spec.latitudes();
        let lons = spec.longitudes();
        assert_eq!(lats.len(), 37);
        assert_eq!(lons.len(), 37);
        assert_eq!(lats[0], -90.0);
        assert_eq!(lats[36], 90.0);
        assert_eq!(lons[0], -180.0);
        assert_eq!(lons[36], 180.0);
    }

    #[test]
    fn uneven_axis_stops_before_max() {
        let spec = GridSpec {
            lat_min: 0.0,
            lat_max: 10.0,
            lat_step: 3.0,
            ..Default::default()
        };
        assert_eq!(spec.latitudes(), vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn invalid_specs() {
        let bad_step = GridSpec {
            lon_step: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad_step.validate(), Err(GridError::InvalidSpec(_))));

        let inverted = GridSpec {
            lat_min: 10.0,
            lat_max: -10.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let beyond_pole = GridSpec {
            lat_max: 95.0,
            ..Default::default()
        };
        assert!(beyond_pole.validate().is_err());
    }

    #[test]
    fn grid_matches_pointwise_evaluation() {
        let store = quadrupole_store();
        let spec = GridSpec {
            lat_min: -60.0,
            lat_max: 60.0,
            lat_step: 30.0,
            lon_min: 0.0,
            lon_max: 90.0,
            lon_step: 45.0,
        };
        let grid = compute_grid(&store, 1977.0, 0.0, &spec, FieldComponent::Down).unwrap();
        assert_eq!(grid.shape(), (5, 3));
        assert_eq!(grid.rows().count(), 5);

        for (i, &lat) in grid.latitudes.iter().enumerate() {
            for (j, &lon) in grid.longitudes.iter().enumerate() {
                let expected = non_dipole_field(&store, 1977.0, lat, lon, 0.0).unwrap().down;
                assert_eq!(grid.get(i, j), Some(expected));
            }
        }
        assert_eq!(grid.get(5, 0), None);
    }

    #[test]
    fn grid_rejects_out_of_range_year() {
        let store = quadrupole_store();
        let result = compute_grid(&store, 1850.0, 0.0, &GridSpec::default(), FieldComponent::Down);
        assert!(matches!(result, Err(GridError::Igrf(IgrfError::YearOutOfRange(_)))));
    }

    #[test]
    fn years() {
        assert_eq!(year_sequence(1900, 1930, 10).unwrap(), vec![1900, 1910, 1920, 1930]);
        assert_eq!(year_sequence(1900, 1925, 10).unwrap(), vec![1900, 1910, 1920]);
        assert!(year_sequence(1900, 2020, 0).is_err());
        assert!(year_sequence(2020, 1900, 5).is_err());
    }

    #[test]
    fn file_names() {
        assert_eq!(grid_file_name(FieldComponent::Down, 1960), "non_dipole_Z_1960.npy");
        assert_eq!(
            grid_path("out", FieldComponent::Total, 2020),
            PathBuf::from("out/non_dipole_F_2020.npy")
        );
    }
}
