use crate::gridding::grid::{compute_grid, GridSpec};
use crate::igrf::{self, CoefficientMap, CoefficientStore, FieldComponent};
use clap::ValueEnum;
use indexmap::IndexMap;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::PathBuf;

type PyCoefficients = IndexMap<(usize, usize), f64>;

/// Gauss coefficient table read from a CSV file.
#[pyclass(name = "CoefficientStore", frozen)]
struct PyCoefficientStore {
    inner: CoefficientStore,
}

#[pymethods]
impl PyCoefficientStore {
    #[new]
    fn new(path: PathBuf) -> PyResult<Self> {
        Ok(PyCoefficientStore {
            inner: CoefficientStore::from_path(path)?,
        })
    }

    #[getter]
    fn max_degree(&self) -> usize {
        self.inner.max_degree()
    }

    /// Resolves the g and h coefficients for a year, as dicts keyed by (n, m).
    fn resolve(&self, year: f64) -> PyResult<(PyCoefficients, PyCoefficients)> {
        let (g, h) = self.inner.resolve(year)?;
        Ok((g.into(), h.into()))
    }

    /// Non-dipole (X, Y, Z) in nT at a point.
    #[pyo3(signature = (year, latitude, longitude, altitude = 0.0))]
    fn non_dipole_field(
        &self,
        year: f64,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> PyResult<(f64, f64, f64)> {
        let field = igrf::non_dipole_field(&self.inner, year, latitude, longitude, altitude)?;
        Ok((field.north, field.east, field.down))
    }

    /// One non-dipole component over the default 5 x 10 degree grid, as a list of
    /// latitude rows.
    #[pyo3(signature = (year, component = "down", altitude = 0.0))]
    fn non_dipole_grid(&self, year: f64, component: &str, altitude: f64) -> PyResult<Vec<Vec<f64>>> {
        let component = FieldComponent::from_str(component, true).map_err(PyValueError::new_err)?;
        let grid = compute_grid(&self.inner, year, altitude, &GridSpec::default(), component)?;
        Ok(grid.rows().map(|row| row.to_vec()).collect())
    }
}

/// Synthesizes (X, Y, Z) in nT from coefficient dicts keyed by (n, m).
#[pyfunction]
#[pyo3(name = "synthesize_field")]
fn synthesize_field_py(
    g: PyCoefficients,
    h: PyCoefficients,
    latitude: f64,
    longitude: f64,
    altitude: f64,
    n_max: usize,
) -> (f64, f64, f64) {
    let field = igrf::synthesize_field(
        &CoefficientMap::from(g),
        &CoefficientMap::from(h),
        latitude,
        longitude,
        altitude,
        n_max,
    );
    (field.north, field.east, field.down)
}

/// Geomagnetic main field and its non-dipole part from IGRF coefficients.
#[pymodule]
fn igrf_nondipole(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCoefficientStore>()?;
    m.add_function(wrap_pyfunction!(synthesize_field_py, m)?)?;

    Ok(())
}
