//! Sample rate conversion using rubato sinc interpolation.

use anyhow::{Context, Result};
use rubato::{
    calculate_cutoff, Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
    WindowFunction,
};

const CHUNK_SIZE: usize = 1024;

/// Resample mono audio from `from_sr` to `to_sr`
pub fn resample(samples: &[f32], from_sr: u32, to_sr: u32) -> Result<Vec<f32>> {
    if from_sr == to_sr || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let sinc_len = 128;
    let window = WindowFunction::Blackman2;
    let params = SincInterpolationParameters {
        sinc_len,
        f_cutoff: calculate_cutoff(sinc_len, window),
        interpolation: SincInterpolationType::Quadratic,
        oversampling_factor: 256,
        window,
    };

    let ratio = to_sr as f64 / from_sr as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.1, params, CHUNK_SIZE, 1)
        .context("Failed to create resampler")?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio * 1.1) as usize);

    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let processed = resampler
            .process(&[chunk][..], None)
            .context("Resampling failed")?;
        if let Some(channel) = processed.into_iter().next() {
            output.extend(channel);
        }
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let processed = resampler
            .process_partial(Some(&[remainder][..]), None)
            .context("Resampling failed")?;
        if let Some(channel) = processed.into_iter().next() {
            output.extend(channel);
        }
    }

    Ok(output)
}
