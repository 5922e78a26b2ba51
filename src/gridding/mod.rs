//! Scanning the non-dipole field over latitude/longitude grids, storing and summarizing them
pub mod grid;
pub mod npy;
pub mod statistics;
