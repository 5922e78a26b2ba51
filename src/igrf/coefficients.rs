//! Gauss coefficient table and its resolution to a single year
use crate::error::IgrfError;
use crate::utils::constants::{
    EPOCHS, FIRST_EPOCH, LAST_EPOCH, MAX_EXTRAPOLATION_YEAR, SECULAR_VARIATION_HEADERS,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

type Result<T> = std::result::Result<T, IgrfError>;

/// Distinguishes cosine-type (g) from sine-type (h) Gauss coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoefficientKind {
    G,
    H,
}

impl CoefficientKind {
    fn from_tag(tag: &str) -> Option<CoefficientKind> {
        match tag {
            "g" => Some(CoefficientKind::G),
            "h" => Some(CoefficientKind::H),
            _ => None,
        }
    }
}

/// One row of the coefficient table: values at every epoch plus the trailing
/// secular-variation rate in nT/yr.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSeries {
    pub kind: CoefficientKind,
    pub degree: usize,
    pub order: usize,
    pub values: Vec<f64>,
    pub secular_variation: f64,
}

impl CoefficientSeries {
    fn value_at(&self, resolution: Resolution) -> f64 {
        match resolution {
            Resolution::Epoch(i) => self.values[i],
            Resolution::Interpolate { index, fraction } => {
                let c1 = self.values[index];
                let c2 = self.values[index + 1];
                c1 + fraction * (c2 - c1)
            }
            Resolution::Extrapolate { elapsed } => {
                self.values[self.values.len() - 1] + self.secular_variation * elapsed
            }
        }
    }
}

/// How a requested year maps onto the epoch table.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Resolution {
    /// Year coincides with a reference epoch
    Epoch(usize),
    /// Year lies strictly inside `[EPOCHS[index], EPOCHS[index + 1])`
    Interpolate { index: usize, fraction: f64 },
    /// Year lies past the final epoch, `elapsed` years beyond it
    Extrapolate { elapsed: f64 },
}

impl Resolution {
    fn locate(year: f64) -> Result<Resolution> {
        if !(FIRST_EPOCH..=MAX_EXTRAPOLATION_YEAR).contains(&year) {
            return Err(IgrfError::YearOutOfRange(year));
        }
        if year > LAST_EPOCH {
            return Ok(Resolution::Extrapolate {
                elapsed: year - LAST_EPOCH,
            });
        }

        let index = EPOCHS
            .windows(2)
            .position(|pair| pair[0] <= year && year < pair[1])
            .unwrap_or(EPOCHS.len() - 1);

        if year == EPOCHS[index] {
            Ok(Resolution::Epoch(index))
        } else {
            Ok(Resolution::Interpolate {
                index,
                fraction: (year - EPOCHS[index]) / (EPOCHS[index + 1] - EPOCHS[index]),
            })
        }
    }
}

/// Gauss coefficients for a single year, keyed by (degree, order).
///
/// Keys that are absent read as zero, so a map holding only a subset of the
/// expansion (e.g. the dipole terms) can be handed straight to the synthesizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientMap {
    inner: IndexMap<(usize, usize), f64>,
}

impl CoefficientMap {
    pub fn new() -> CoefficientMap {
        CoefficientMap::default()
    }

    pub fn insert(&mut self, degree: usize, order: usize, value: f64) -> Option<f64> {
        self.inner.insert((degree, order), value)
    }

    /// Coefficient for (degree, order), or 0.0 if the term is not present
    pub fn get(&self, degree: usize, order: usize) -> f64 {
        self.inner.get(&(degree, order)).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, degree: usize, order: usize) -> bool {
        self.inner.contains_key(&(degree, order))
    }

    /// Highest degree with an entry in the map
    pub fn max_degree(&self) -> Option<usize> {
        self.inner.keys().map(|&(n, _)| n).max()
    }

    /// Returns a new map holding only the terms of the given degree
    pub fn restrict_to_degree(&self, degree: usize) -> CoefficientMap {
        self.inner
            .iter()
            .filter(|((n, _), _)| *n == degree)
            .map(|(&key, &value)| (key, value))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.inner.iter().map(|(&key, &value)| (key, value))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<((usize, usize), f64)> for CoefficientMap {
    fn from_iter<I: IntoIterator<Item = ((usize, usize), f64)>>(iter: I) -> Self {
        CoefficientMap {
            inner: iter.into_iter().collect(),
        }
    }
}

impl From<IndexMap<(usize, usize), f64>> for CoefficientMap {
    fn from(inner: IndexMap<(usize, usize), f64>) -> Self {
        CoefficientMap { inner }
    }
}

impl From<CoefficientMap> for IndexMap<(usize, usize), f64> {
    fn from(value: CoefficientMap) -> Self {
        value.inner
    }
}

/// Immutable table of Gauss coefficients at the reference epochs.
///
/// Built once by the caller and shared by reference; every query is a pure
/// function of the table, so a store can be read from many threads at once.
#[derive(Debug, Clone)]
pub struct CoefficientStore {
    series: Vec<CoefficientSeries>,
    max_degree: usize,
}

impl CoefficientStore {
    /// Builds a store from already-parsed series.
    ///
    /// # Errors
    /// Will return `Err` if a series does not span every epoch, has an invalid
    /// (degree, order) pair, is duplicated, or if any g(n, m) with `0 <= m <= n`
    /// or h(n, m) with `1 <= m <= n` is missing up to the highest degree present.
    pub fn new(series: Vec<CoefficientSeries>) -> Result<CoefficientStore> {
        if series.is_empty() {
            return Err(IgrfError::CoefficientData(
                "coefficient table has no rows".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for s in series.iter() {
            if s.values.len() != EPOCHS.len() {
                return Err(IgrfError::CoefficientData(format!(
                    "{:?}({}, {}) has {} epoch values, expected {}",
                    s.kind,
                    s.degree,
                    s.order,
                    s.values.len(),
                    EPOCHS.len()
                )));
            }
            if s.degree == 0 || s.order > s.degree {
                return Err(IgrfError::CoefficientData(format!(
                    "invalid degree/order pair ({}, {})",
                    s.degree, s.order
                )));
            }
            if !seen.insert((s.kind, s.degree, s.order)) {
                return Err(IgrfError::CoefficientData(format!(
                    "duplicate entry for {:?}({}, {})",
                    s.kind, s.degree, s.order
                )));
            }
        }

        let max_degree = series.iter().map(|s| s.degree).max().unwrap_or(0);
        for n in 1..=max_degree {
            for m in 0..=n {
                if !seen.contains(&(CoefficientKind::G, n, m)) {
                    return Err(IgrfError::CoefficientData(format!("missing g({n}, {m})")));
                }
                // h(n, 0) multiplies sin(0) and may be omitted
                if m > 0 && !seen.contains(&(CoefficientKind::H, n, m)) {
                    return Err(IgrfError::CoefficientData(format!("missing h({n}, {m})")));
                }
            }
        }

        log::debug!(
            "Loaded {} coefficient series up to degree {}",
            series.len(),
            max_degree
        );
        Ok(CoefficientStore { series, max_degree })
    }

    /// Reads a coefficient table from a CSV file.
    ///
    /// # Errors
    /// Will return `Err` if the file cannot be read or does not hold a complete table.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<CoefficientStore> {
        let file = File::open(path)?;
        CoefficientStore::from_reader(BufReader::new(file))
    }

    /// Reads a coefficient table in CSV form.
    ///
    /// The header must name every epoch year (`1900` or `1900.0`, ..., `2020`) and
    /// the secular-variation column (`2025-2030`). Each following row is
    /// `kind, n, m, ...` with kind `g` or `h`.
    ///
    /// # Errors
    /// Will return `Err` if an expected column is missing, a cell cannot be
    /// parsed, or the resulting table is incomplete.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<CoefficientStore> {
        let mut lines = reader.lines().enumerate();

        let (header_index, header) = loop {
            match lines.next() {
                Some((i, line)) => {
                    let line = line?;
                    let trimmed = line.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    break (i, line);
                }
                None => {
                    return Err(IgrfError::CoefficientData(
                        "coefficient table is empty".to_string(),
                    ))
                }
            }
        };

        let columns = split_cells(&header, header_index + 1)?;
        let epoch_indices = EPOCHS
            .iter()
            .map(|&epoch| {
                columns
                    .iter()
                    .position(|c| c.parse::<f64>().map_or(false, |y| y == epoch))
                    .ok_or_else(|| {
                        IgrfError::CoefficientData(format!("missing column for epoch {epoch}"))
                    })
            })
            .collect::<Result<Vec<usize>>>()?;
        let sv_index = columns
            .iter()
            .position(|c| SECULAR_VARIATION_HEADERS.contains(&c.as_str()))
            .ok_or_else(|| {
                IgrfError::CoefficientData("missing secular variation column".to_string())
            })?;

        let mut series = vec![];
        for (i, line) in lines {
            let line = line?;
            let line_number = i + 1;
            if line.trim_start().starts_with('#') {
                continue;
            }
            let cells = split_cells(&line, line_number)?;
            if cells[0].is_empty() {
                continue;
            }

            let kind = CoefficientKind::from_tag(&cells[0]).ok_or_else(|| {
                IgrfError::CoefficientData(format!(
                    "line {line_number}: unknown coefficient kind '{}'",
                    cells[0]
                ))
            })?;
            let degree: usize = parse_cell(&cells, 1, line_number, "degree")?;
            let order: usize = parse_cell(&cells, 2, line_number, "order")?;
            let values = epoch_indices
                .iter()
                .map(|&idx| parse_cell(&cells, idx, line_number, "coefficient"))
                .collect::<Result<Vec<f64>>>()?;
            let secular_variation = parse_cell(&cells, sv_index, line_number, "secular variation")?;

            series.push(CoefficientSeries {
                kind,
                degree,
                order,
                values,
                secular_variation,
            });
        }

        CoefficientStore::new(series)
    }

    pub fn epochs(&self) -> &'static [f64] {
        &EPOCHS
    }

    /// Highest spherical-harmonic degree in the table
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Resolves the g and h coefficients for a (fractional) year.
    ///
    /// Years up to 2020 are interpolated linearly between the bracketing epochs,
    /// reproducing the table exactly at an epoch. Later years are extrapolated
    /// from 2020 with the secular-variation rate.
    ///
    /// # Errors
    /// Will return `Err` if `year` is outside `[1900, 2025]`.
    pub fn resolve(&self, year: f64) -> Result<(CoefficientMap, CoefficientMap)> {
        let resolution = Resolution::locate(year)?;

        let mut g = CoefficientMap::new();
        let mut h = CoefficientMap::new();
        for s in self.series.iter() {
            let value = s.value_at(resolution);
            match s.kind {
                CoefficientKind::G => g.insert(s.degree, s.order, value),
                CoefficientKind::H => h.insert(s.degree, s.order, value),
            };
        }
        Ok((g, h))
    }
}

/// Splits one CSV record into trimmed cells. Double-quoted cells may hold commas,
/// and `""` inside quotes is a literal quote.
fn split_cells(line: &str, line_number: usize) -> Result<Vec<String>> {
    let mut cells = vec![];
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    if quoted {
        return Err(IgrfError::CoefficientData(format!(
            "line {line_number}: unterminated quoted cell"
        )));
    }
    cells.push(cell.trim().to_string());
    Ok(cells)
}

fn parse_cell<T: FromStr>(cells: &[String], index: usize, line_number: usize, what: &str) -> Result<T> {
    let cell = cells.get(index).ok_or_else(|| {
        IgrfError::CoefficientData(format!("line {line_number}: missing {what} in column {index}"))
    })?;
    cell.parse::<T>().map_err(|_| {
        IgrfError::CoefficientData(format!("line {line_number}: unable to read {what} '{cell}'"))
    })
}
