//! Core geomagnetic model: coefficient resolution, Legendre evaluation, field synthesis
pub mod coefficients;
pub mod legendre;
pub mod non_dipole;
pub mod synthesis;

pub use coefficients::{CoefficientKind, CoefficientMap, CoefficientSeries, CoefficientStore};
pub use legendre::LegendreTable;
pub use non_dipole::{main_field, non_dipole_field};
pub use synthesis::{synthesize_field, FieldComponent, FieldVector};
