//! Width consolidation
//!
//! Rendering every (breakpoint, density) pair independently produces
//! near-duplicate assets (799px next to 800px). The consolidation walk
//! merges widths within a caller-chosen tolerance onto one shared render,
//! always snapping up to an already-decided larger width so no slot ever
//! receives an under-sized asset.

use crate::error::{PicsetError, PicsetResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A layout threshold paired with the image width it wants at 1x density.
///
/// The breakpoint with `max_width = None` is the fallback; every request
/// must contain exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Max viewport width this breakpoint applies to (none = fallback)
    #[serde(default)]
    pub max_width: Option<u32>,

    /// Desired image width at 1x density
    pub image_width: u32,
}

impl Breakpoint {
    /// Whether this is the mandatory fallback breakpoint
    pub fn is_fallback(&self) -> bool {
        self.max_width.is_none()
    }
}

/// One (breakpoint, density) rendering target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSpec {
    /// Display pixel ratio multiplier
    pub density: f64,

    /// Breakpoint image width at 1x
    pub nominal_width: u32,

    /// Width to render; rewritten to a coarser shared value when absorbed
    pub actual_width: u32,
}

impl SizeSpec {
    fn new(nominal_width: u32, density: f64) -> Self {
        Self {
            density,
            nominal_width,
            actual_width: (f64::from(nominal_width) * density).round() as u32,
        }
    }
}

/// Lookup key for a (nominal width, density) pair, e.g. `"300@1.5"`
pub fn size_key(nominal_width: u32, density: f64) -> String {
    format!("{}@{}", nominal_width, density)
}

/// Consolidated rendering plan: every requested (nominal, density) pair
/// maps to exactly one spec, several of which may share an actual width.
#[derive(Debug, Clone, Default)]
pub struct ConsolidatedSizes {
    map: HashMap<String, SizeSpec>,
}

impl ConsolidatedSizes {
    /// Resolve the spec for a requested pair
    pub fn resolve(&self, nominal_width: u32, density: f64) -> Option<&SizeSpec> {
        self.map.get(&size_key(nominal_width, density))
    }

    /// Number of requested pairs
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the plan is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over all (key, spec) entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SizeSpec)> {
        self.map.iter()
    }

    /// Distinct widths that will actually be rendered
    pub fn distinct_widths(&self) -> Vec<u32> {
        let mut widths: Vec<u32> = self.map.values().map(|s| s.actual_width).collect();
        widths.sort_unstable();
        widths.dedup();
        widths
    }
}

/// Plan the set of widths to render for `breakpoints` x `densities`.
///
/// Specs are walked from largest to smallest actual width. A spec within
/// `threshold` of the last kept width is absorbed: recorded under its own
/// key but rewritten to render at the larger, already-decided width.
/// `threshold = 1.0` reproduces the unconsolidated set exactly.
pub fn consolidate(
    breakpoints: &[Breakpoint],
    densities: &[f64],
    threshold: f64,
) -> PicsetResult<ConsolidatedSizes> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(PicsetError::InvalidThreshold(threshold));
    }
    if let Some(&bad) = densities.iter().find(|d| !(**d > 0.0)) {
        return Err(PicsetError::InvalidDensity(bad));
    }

    let mut specs: Vec<SizeSpec> = breakpoints
        .iter()
        .flat_map(|bp| densities.iter().map(move |&d| SizeSpec::new(bp.image_width, d)))
        .collect();

    // Largest first, so absorbed widths only ever snap up
    specs.sort_by(|a, b| b.actual_width.cmp(&a.actual_width));

    let mut map = HashMap::with_capacity(specs.len());
    let mut last_used: Option<SizeSpec> = None;

    for spec in specs {
        let merged = match last_used {
            Some(last) if f64::from(last.actual_width) * threshold <= f64::from(spec.actual_width) => {
                SizeSpec {
                    actual_width: last.actual_width,
                    ..spec
                }
            }
            _ => {
                last_used = Some(spec);
                spec
            }
        };
        map.insert(size_key(merged.nominal_width, merged.density), merged);
    }

    let plan = ConsolidatedSizes { map };
    debug!(
        requested = plan.len(),
        rendered = plan.distinct_widths().len(),
        "Consolidated size plan"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(max_width: Option<u32>, image_width: u32) -> Breakpoint {
        Breakpoint {
            max_width,
            image_width,
        }
    }

    #[test]
    fn size_key_format() {
        assert_eq!(size_key(300, 1.0), "300@1");
        assert_eq!(size_key(300, 1.5), "300@1.5");
        assert_eq!(size_key(1200, 2.0), "1200@2");
    }

    #[test]
    fn every_pair_has_an_entry() {
        let plan = consolidate(
            &[bp(Some(600), 300), bp(None, 1200)],
            &[1.0, 2.0, 3.0],
            0.8,
        )
        .unwrap();

        assert_eq!(plan.len(), 6);
        for nominal in [300, 1200] {
            for density in [1.0, 2.0, 3.0] {
                assert!(plan.resolve(nominal, density).is_some());
            }
        }
    }

    #[test]
    fn threshold_one_is_identity() {
        let plan = consolidate(&[bp(Some(600), 300), bp(None, 1200)], &[1.0, 2.0], 1.0).unwrap();

        for (nominal, density, expected) in [
            (300, 1.0, 300),
            (300, 2.0, 600),
            (1200, 1.0, 1200),
            (1200, 2.0, 2400),
        ] {
            assert_eq!(plan.resolve(nominal, density).unwrap().actual_width, expected);
        }
    }

    #[test]
    fn no_merge_when_widths_far_apart() {
        // 2400, 1200, 600, 300 at threshold 0.8: each gap is too wide
        let plan = consolidate(&[bp(Some(600), 300), bp(None, 1200)], &[1.0, 2.0], 0.8).unwrap();

        assert_eq!(plan.distinct_widths(), vec![300, 600, 1200, 2400]);
    }

    #[test]
    fn near_duplicates_absorb_upward() {
        // 800 * 0.8 = 640 <= 799, so 799 renders as 800
        let plan = consolidate(&[bp(Some(500), 799), bp(None, 800)], &[1.0], 0.8).unwrap();

        assert_eq!(plan.resolve(799, 1.0).unwrap().actual_width, 800);
        assert_eq!(plan.resolve(800, 1.0).unwrap().actual_width, 800);
        assert_eq!(plan.distinct_widths(), vec![800]);
    }

    #[test]
    fn absorbed_spec_keeps_identity() {
        let plan = consolidate(&[bp(Some(500), 799), bp(None, 800)], &[1.0], 0.8).unwrap();

        let spec = plan.resolve(799, 1.0).unwrap();
        assert_eq!(spec.nominal_width, 799);
        assert_eq!(spec.density, 1.0);
    }

    #[test]
    fn consolidation_never_shrinks() {
        let breakpoints = [bp(Some(400), 360), bp(Some(800), 720), bp(None, 1440)];
        let densities = [1.0, 1.5, 2.0];
        let plan = consolidate(&breakpoints, &densities, 0.7).unwrap();

        for b in &breakpoints {
            for &d in &densities {
                let requested = (f64::from(b.image_width) * d).round() as u32;
                let spec = plan.resolve(b.image_width, d).unwrap();
                assert!(spec.actual_width >= requested);
            }
        }
    }

    #[test]
    fn fractional_density_rounds() {
        let plan = consolidate(&[bp(None, 333)], &[1.5], 1.0).unwrap();
        // 333 * 1.5 = 499.5 rounds to 500
        assert_eq!(plan.resolve(333, 1.5).unwrap().actual_width, 500);
    }

    #[test]
    fn rejects_bad_threshold() {
        assert!(matches!(
            consolidate(&[bp(None, 100)], &[1.0], 0.0),
            Err(PicsetError::InvalidThreshold(_))
        ));
        assert!(matches!(
            consolidate(&[bp(None, 100)], &[1.0], 1.2),
            Err(PicsetError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn rejects_bad_density() {
        assert!(matches!(
            consolidate(&[bp(None, 100)], &[1.0, -2.0], 0.8),
            Err(PicsetError::InvalidDensity(_))
        ));
    }

    #[test]
    fn breakpoint_fallback_detection() {
        assert!(bp(None, 1200).is_fallback());
        assert!(!bp(Some(600), 300).is_fallback());
    }
}
