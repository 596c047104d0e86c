//! Test case construction
//!
//! Combines resolved parameter sequences into the ordered list of test
//! cases. Parameters drawn from the same source file are row-aligned;
//! everything else combines as a cross product, rightmost unit varying
//! fastest. The enumeration is stable for a given configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

use crate::config::ConfigError;
use crate::models::{ParamValue, TestCase};
use crate::params::ResolvedParam;

/// One combination unit: either a row-aligned file group or a single
/// independent parameter.
struct Unit {
    param_indices: Vec<usize>,
    len: usize,
}

/// Build all test cases from the resolved parameters.
///
/// Zero parameters yield exactly one empty case; any empty value sequence
/// yields zero cases. Case parameter order is always the config order.
pub fn build_cases(params: &[ResolvedParam]) -> Result<Vec<TestCase>, ConfigError> {
    let units = build_units(params)?;

    if units.iter().any(|u| u.len == 0) {
        return Ok(Vec::new());
    }

    let total: usize = units.iter().map(|u| u.len).product();
    let mut cases = Vec::with_capacity(total);
    let mut odometer = vec![0usize; units.len()];

    loop {
        cases.push(case_at(params, &units, &odometer));

        // Advance rightmost-fastest; full wrap means enumeration is done.
        let mut j = units.len();
        loop {
            if j == 0 {
                return Ok(cases);
            }
            j -= 1;
            odometer[j] += 1;
            if odometer[j] < units[j].len {
                break;
            }
            odometer[j] = 0;
        }
    }
}

/// Group parameters into combination units, validating that row-aligned
/// columns agree on length.
fn build_units(params: &[ResolvedParam]) -> Result<Vec<Unit>, ConfigError> {
    let mut units: Vec<Unit> = Vec::new();
    let mut file_units: BTreeMap<PathBuf, usize> = BTreeMap::new();

    for (i, param) in params.iter().enumerate() {
        match &param.group {
            Some(path) => {
                if let Some(&u) = file_units.get(path) {
                    if units[u].len != param.values.len() {
                        return Err(ConfigError::RowCountMismatch {
                            path: path.clone(),
                            left: units[u].len,
                            right: param.values.len(),
                        });
                    }
                    units[u].param_indices.push(i);
                } else {
                    file_units.insert(path.clone(), units.len());
                    units.push(Unit {
                        param_indices: vec![i],
                        len: param.values.len(),
                    });
                }
            }
            None => units.push(Unit {
                param_indices: vec![i],
                len: param.values.len(),
            }),
        }
    }

    if file_units.len() > 1 {
        let files: Vec<String> = file_units.keys().map(|p| p.display().to_string()).collect();
        warn!(
            "parameters come from {} distinct files ({}); only same-file columns are \
             row-aligned, distinct files combine as a cross product",
            files.len(),
            files.join(", ")
        );
    }

    Ok(units)
}

/// Materialize the case for one odometer position, in config param order.
fn case_at(params: &[ResolvedParam], units: &[Unit], odometer: &[usize]) -> TestCase {
    let mut chosen = vec![0usize; params.len()];
    for (j, unit) in units.iter().enumerate() {
        for &pi in &unit.param_indices {
            chosen[pi] = odometer[j];
        }
    }

    let pairs: Vec<(String, ParamValue)> = params
        .iter()
        .enumerate()
        .map(|(pi, p)| (p.name.clone(), p.values[chosen[pi]].clone()))
        .collect();
    TestCase::new(pairs)
}
