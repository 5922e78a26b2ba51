use crate::igrf::coefficients::CoefficientMap;
use crate::igrf::legendre::LegendreTable;
use crate::utils::constants::{POLE_THRESHOLD, REFERENCE_RADIUS_KM};
use std::ops::Sub;

/// Geomagnetic field at one point, in nT
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldVector {
    pub north: f64, // X
    pub east: f64,  // Y
    pub down: f64,  // Z
}

impl FieldVector {
    pub fn new(north: f64, east: f64, down: f64) -> FieldVector {
        FieldVector { north, east, down }
    }

    /// H
    pub fn horizontal_intensity(&self) -> f64 {
        self.north.hypot(self.east)
    }

    /// F
    pub fn total_intensity(&self) -> f64 {
        self.horizontal_intensity().hypot(self.down)
    }

    /// D, degrees east of north
    pub fn declination(&self) -> f64 {
        self.east.atan2(self.north).to_degrees()
    }

    /// I, degrees below the horizontal
    pub fn inclination(&self) -> f64 {
        self.down.atan2(self.horizontal_intensity()).to_degrees()
    }

    pub fn component(&self, component: FieldComponent) -> f64 {
        match component {
            FieldComponent::North => self.north,
            FieldComponent::East => self.east,
            FieldComponent::Down => self.down,
            FieldComponent::Horizontal => self.horizontal_intensity(),
            FieldComponent::Total => self.total_intensity(),
        }
    }
}

impl Sub for FieldVector {
    type Output = FieldVector;

    fn sub(self, rhs: FieldVector) -> FieldVector {
        FieldVector {
            north: self.north - rhs.north,
            east: self.east - rhs.east,
            down: self.down - rhs.down,
        }
    }
}

/// Scalar quantity extracted from a `FieldVector`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum FieldComponent {
    North,
    East,
    Down,
    Horizontal,
    Total,
}

impl FieldComponent {
    /// Single-letter tag used in file names
    pub fn tag(&self) -> &'static str {
        match self {
            FieldComponent::North => "X",
            FieldComponent::East => "Y",
            FieldComponent::Down => "Z",
            FieldComponent::Horizontal => "H",
            FieldComponent::Total => "F",
        }
    }
}

/// Synthesizes the field from Gauss coefficients up to degree `n_max`.
///
/// `latitude` and `longitude` are geocentric degrees, `altitude` is km above the
/// 6371.2 km reference sphere. Terms missing from `g` or `h` count as zero.
///
/// At (or within 1e-10 of) a pole, where sin(colatitude) vanishes, the east
/// component terms are skipped rather than evaluated in the limit, so `east` is
/// incomplete there.
pub fn synthesize_field(
    g: &CoefficientMap,
    h: &CoefficientMap,
    latitude: f64,
    longitude: f64,
    altitude: f64,
    n_max: usize,
) -> FieldVector {
    let a = REFERENCE_RADIUS_KM;
    let r = altitude + a;
    let theta = (90.0 - latitude).to_radians();
    let phi = longitude.to_radians();

    let legendre = LegendreTable::evaluate(n_max, theta);

    let cos_m_phi: Vec<f64> = (0..=n_max).map(|m| (m as f64 * phi).cos()).collect();
    let sin_m_phi: Vec<f64> = (0..=n_max).map(|m| (m as f64 * phi).sin()).collect();
    let sin_theta = theta.sin();
    let at_pole = sin_theta.abs() < POLE_THRESHOLD;

    let mut field = FieldVector::default();
    for n in 1..=n_max {
        let ratio = (a / r).powi(n as i32 + 2);
        for m in 0..=n {
            let g_nm = g.get(n, m);
            let h_nm = h.get(n, m);
            let p = legendre.p(n, m);
            let in_phase = g_nm * cos_m_phi[m] + h_nm * sin_m_phi[m];

            field.down -= (n + 1) as f64 * ratio * in_phase * p;
            field.north += ratio * in_phase * legendre.dp(n, m);

            if m > 0 && !at_pole {
                field.east +=
                    ratio * m as f64 * (g_nm * sin_m_phi[m] - h_nm * cos_m_phi[m]) * p / sin_theta;
            }
        }
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dipole(g10: f64, g11: f64, h11: f64) -> (CoefficientMap, CoefficientMap) {
        let mut g = CoefficientMap::new();
        g.insert(1, 0, g10);
        g.insert(1, 1, g11);
        let mut h = CoefficientMap::new();
        h.insert(1, 1, h11);
        (g, h)
    }

    #[test]
    fn axial_dipole_at_equator() {
        let mut g = CoefficientMap::new();
        g.insert(1, 0, 100.0);
        let h = CoefficientMap::new();

        let field = synthesize_field(&g, &h, 0.0, 0.0, 0.0, 1);
        assert_abs_diff_eq!(field.down, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(field.north, -100.0, epsilon = 1e-12);
        assert_eq!(field.east, 0.0);
    }

    #[test]
    fn centred_dipole_at_equator() {
        let (g, h) = dipole(-29404.8, -1450.9, 4652.5);

        let field = synthesize_field(&g, &h, 0.0, 0.0, 0.0, 1);
        assert_abs_diff_eq!(field.north, 29404.8, epsilon = 1e-8);
        assert_abs_diff_eq!(field.east, -4652.5, epsilon = 1e-8);
        assert_abs_diff_eq!(field.down, 2.0 * 1450.9, epsilon = 1e-8);

        let field = synthesize_field(&g, &h, 0.0, 90.0, 0.0, 1);
        assert_abs_diff_eq!(field.north, 29404.8, epsilon = 1e-8);
        assert_abs_diff_eq!(field.east, -1450.9, epsilon = 1e-8);
        assert_abs_diff_eq!(field.down, -2.0 * 4652.5, epsilon = 1e-8);
    }

    #[test]
    fn centred_dipole_at_poles_skips_east_terms() {
        let (g, h) = dipole(-29404.8, -1450.9, 4652.5);

        let north_pole = synthesize_field(&g, &h, 90.0, 30.0, 0.0, 1);
        let phi = 30f64.to_radians();
        assert_abs_diff_eq!(
            north_pole.north,
            -1450.9 * phi.cos() + 4652.5 * phi.sin(),
            epsilon = 1e-8
        );
        assert_eq!(north_pole.east, 0.0);
        assert_abs_diff_eq!(north_pole.down, 2.0 * 29404.8, epsilon = 1e-8);

        let south_pole = synthesize_field(&g, &h, -90.0, 0.0, 0.0, 1);
        assert_eq!(south_pole.east, 0.0);
        assert_abs_diff_eq!(south_pole.down, -2.0 * 29404.8, epsilon = 1e-8);
    }

    #[test]
    fn field_decays_with_altitude() {
        let (g, h) = dipole(-29404.8, -1450.9, 4652.5);
        let surface = synthesize_field(&g, &h, 45.0, 10.0, 0.0, 1);
        let aloft = synthesize_field(&g, &h, 45.0, 10.0, REFERENCE_RADIUS_KM, 1);

        // dipole terms scale as (a / r)^3
        assert_abs_diff_eq!(aloft.north, surface.north / 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(aloft.east, surface.east / 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(aloft.down, surface.down / 8.0, epsilon = 1e-9);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let (g, h) = dipole(1.0, 2.0, 3.0);
        let (g_before, h_before) = (g.clone(), h.clone());
        let _ = synthesize_field(&g, &h, 12.0, 34.0, 0.0, 3);
        assert_eq!(g, g_before);
        assert_eq!(h, h_before);
    }

    #[test]
    fn derived_quantities() {
        let field = FieldVector::new(3.0, 4.0, 12.0);
        assert_eq!(field.horizontal_intensity(), 5.0);
        assert_eq!(field.total_intensity(), 13.0);
        assert_abs_diff_eq!(field.declination(), 4f64.atan2(3.0).to_degrees(), epsilon = 1e-12);
        assert_abs_diff_eq!(field.inclination(), 12f64.atan2(5.0).to_degrees(), epsilon = 1e-12);
        assert_eq!(field.component(FieldComponent::Down), 12.0);
        assert_eq!(FieldComponent::Down.tag(), "Z");

        let difference = field - FieldVector::new(1.0, 1.0, 1.0);
        assert_eq!(difference, FieldVector::new(2.0, 3.0, 11.0));
    }
}
