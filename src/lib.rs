//! Main geomagnetic field synthesis from IGRF Gauss coefficients, and extraction
//! of its non-dipole part.
pub mod error;
pub mod gridding;
pub mod igrf;
pub mod utils;

#[cfg(feature = "python")]
mod python;

pub use error::IgrfError;
pub use igrf::{
    main_field, non_dipole_field, synthesize_field, CoefficientMap, CoefficientStore,
    FieldComponent, FieldVector, LegendreTable,
};
