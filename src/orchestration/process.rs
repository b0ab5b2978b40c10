//! The orchestrator
//!
//! Turns one [`ResizeRequest`] into an assembled [`ImageSet`]: plans the
//! widths to render, routes every (breakpoint, density) pair through the
//! dedup cache keyed by input hash and rendered width, and tallies how
//! many distinct assets were freshly generated versus served from cache.

use crate::error::{PicsetError, PicsetResult};
use crate::orchestration::image_set::{floor2, round5, ImageSet, ImageSetAsset, ImageSetSource, RenderedAsset};
use crate::orchestration::request::{ImageInput, ResizeRequest};
use crate::codec::TransformRequest;
use crate::sizes::consolidate;
use futures_util::future::join_all;
use futures_util::FutureExt;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::debug;

/// Result of one `process` call.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub image_set: ImageSet,

    /// Distinct assets rendered by this call
    pub generated: usize,

    /// Distinct assets served from the cache
    pub cached: usize,
}

/// Cache key for one rendered width of one input image.
pub(crate) fn cache_key(input_hash: &str, actual_width: u32, debug_text: &str) -> String {
    format!("{input_hash}@{actual_width}:{debug_text}")
}

struct Job {
    nominal_width: u32,
    density: f64,
    actual_width: u32,
    debug_text: String,
    key: String,
}

/// Generate the image set for `request`.
pub async fn process(request: &ResizeRequest) -> PicsetResult<ProcessOutcome> {
    if request.pixel_densities.is_empty() {
        return Err(PicsetError::NoPixelDensities);
    }
    match request.breakpoints.iter().filter(|b| b.is_fallback()).count() {
        1 => {}
        0 => return Err(PicsetError::MissingFallbackBreakpoint),
        n => return Err(PicsetError::MultipleFallbackBreakpoints(n)),
    }

    let input = Arc::new(read_input(request).await?);
    let input_hash = {
        let mut hasher = Sha256::new();
        hasher.update(input.as_slice());
        hex::encode(hasher.finalize())
    };

    let plan = consolidate(
        &request.breakpoints,
        &request.pixel_densities,
        request.size_threshold,
    )?;

    let mut jobs = Vec::with_capacity(request.breakpoints.len() * request.pixel_densities.len());
    for breakpoint in &request.breakpoints {
        for &density in &request.pixel_densities {
            let spec = plan.resolve(breakpoint.image_width, density).ok_or(
                PicsetError::ConsolidationMiss {
                    nominal_width: breakpoint.image_width,
                    density,
                },
            )?;
            let debug_text = if request.debug_labels {
                format!("{}w", spec.actual_width)
            } else {
                String::new()
            };
            jobs.push(Job {
                nominal_width: breakpoint.image_width,
                density,
                actual_width: spec.actual_width,
                key: cache_key(&input_hash, spec.actual_width, &debug_text),
                debug_text,
            });
        }
    }

    // Srcs whose factory ran during this call, for the hit/miss tally
    let generated_srcs = Mutex::new(HashSet::new());

    let mut results: Vec<RenderedAsset> = Vec::with_capacity(jobs.len());
    if request.sequential {
        for job in &jobs {
            results.push(run_job(request, job, &input, &generated_srcs).await?);
        }
    } else {
        let dispatched = jobs
            .iter()
            .map(|job| run_job(request, job, &input, &generated_srcs));
        for result in join_all(dispatched).await {
            results.push(result?);
        }
    }

    let generated_srcs = generated_srcs
        .into_inner()
        .map_err(|_| PicsetError::Internal("generation tally poisoned".to_string()))?;
    let distinct_srcs: HashSet<&str> = results.iter().map(|a| a.src.as_str()).collect();
    let generated = distinct_srcs
        .iter()
        .filter(|src| generated_srcs.contains(**src))
        .count();
    let cached = distinct_srcs.len() - generated;

    let image_set = assemble(request, &jobs, &results)?;

    debug!(
        generated,
        cached,
        requested = jobs.len(),
        "Assembled image set"
    );

    Ok(ProcessOutcome {
        image_set,
        generated,
        cached,
    })
}

async fn read_input(request: &ResizeRequest) -> PicsetResult<Vec<u8>> {
    match &request.input {
        ImageInput::Bytes(bytes) => Ok(bytes.clone()),
        ImageInput::Path(path) => request.storage.read(path).await.map_err(|err| match &err {
            PicsetError::Storage { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                PicsetError::InputImageMissing(path.clone())
            }
            _ => err,
        }),
    }
}

/// Resolve one job through the cache, rendering on miss.
async fn run_job(
    request: &ResizeRequest,
    job: &Job,
    input: &Arc<Vec<u8>>,
    generated_srcs: &Mutex<HashSet<String>>,
) -> PicsetResult<RenderedAsset> {
    let codec = request.codec.clone();
    let storage = request.storage.clone();
    let namer = request.namer.clone();
    let input = input.clone();
    let output_dir = request.output_dir.clone();
    let public_prefix = request.public_prefix.clone();
    let transform = TransformRequest {
        target_width: Some(job.actual_width),
        target_height: None,
        quality: request.quality,
        debug_overlay_text: (!job.debug_text.is_empty()).then(|| job.debug_text.clone()),
    };

    let factory = async move {
        let output = codec.transform(&input, &transform).await?;
        let name = namer.output_name(&output);
        storage.write(&output.bytes, &output_dir.join(&name)).await?;

        let asset = RenderedAsset {
            src: format!("{public_prefix}{name}"),
            width: output.width,
            height: output.height,
        };
        generated_srcs
            .lock()
            .map_err(|_| PicsetError::Internal("generation tally poisoned".to_string()))?
            .insert(asset.src.clone());
        Ok(serde_json::to_string(&asset)?)
    }
    .boxed();

    let value = request.cache.get_or_create(&job.key, factory).await?;
    let asset: RenderedAsset = serde_json::from_str(&value)?;
    Ok(asset)
}

/// Build the image set from per-job results. Jobs are enumerated
/// breakpoint-major, so results chunk evenly by density count.
fn assemble(request: &ResizeRequest, jobs: &[Job], results: &[RenderedAsset]) -> PicsetResult<ImageSet> {
    let per_breakpoint = request.pixel_densities.len();
    let mut sources = Vec::new();
    let mut img = Vec::new();

    for (index, breakpoint) in request.breakpoints.iter().enumerate() {
        let start = index * per_breakpoint;
        let mut srcset: Vec<ImageSetAsset> = Vec::with_capacity(per_breakpoint);

        for offset in 0..per_breakpoint {
            let job = &jobs[start + offset];
            let asset = &results[start + offset];
            // Consolidation can collapse several densities onto one
            // rendered asset; keep one srcset entry per distinct src
            if srcset.iter().any(|existing| existing.src == asset.src) {
                continue;
            }
            srcset.push(ImageSetAsset {
                src: asset.src.clone(),
                dpi: floor2(f64::from(asset.width) / f64::from(job.nominal_width)),
            });
        }

        match breakpoint.max_width {
            Some(w) => sources.push(ImageSetSource { w, srcset }),
            None => img = srcset,
        }
    }

    let widest = results
        .iter()
        .max_by_key(|asset| asset.width)
        .ok_or_else(|| PicsetError::Internal("no rendered assets".to_string()))?;
    if widest.height == 0 {
        return Err(PicsetError::codec("rendered asset has zero height"));
    }
    let aspect = round5(f64::from(widest.width) / f64::from(widest.height));

    Ok(ImageSet {
        sources,
        img,
        aspect,
    })
}
