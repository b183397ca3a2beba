//! Multilingual voice-cloning synthesis with the Chatterbox ONNX export.
//!
//! The export is split into four graphs:
//! - `speech_encoder`: reference clip -> conditioning embedding, prompt
//!   speech tokens, speaker embedding and speaker features
//! - `embed_tokens`: text/speech token ids -> input embeddings
//! - `language_model`: autoregressive speech token decoder with KV cache
//! - `conditional_decoder`: speech tokens + speaker -> 24 kHz waveform

use ndarray::{concatenate, s, Array1, Array2, Array3, Array4, ArrayD, Axis, Ix2, Ix3, Ix4};
use ort::inputs;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::time::Instant;
use tokenizers::Tokenizer;

use super::{argmax, build_session, InferenceError};
use crate::domain::tts::text::normalize_punctuation;
use crate::domain::tts::LanguageId;
use crate::infrastructure::audio::load_wav;

/// Output sample rate of the conditional decoder
pub const SAMPLE_RATE: u32 = 24000;

const START_SPEECH_TOKEN: i64 = 6561;
const STOP_SPEECH_TOKEN: i64 = 6562;

const NUM_HIDDEN_LAYERS: usize = 30;
const NUM_KEY_VALUE_HEADS: usize = 16;
const HEAD_DIM: usize = 64;

/// Longest reference clip the speech encoder is fed
const MAX_REFERENCE_SECONDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_new_tokens: usize,
    pub exaggeration: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_new_tokens: 1000,
            exaggeration: 0.5,
            repetition_penalty: 1.2,
        }
    }
}

/// Speaker conditioning extracted from a reference clip
struct SpeakerConditioning {
    cond_emb: Array3<f32>,
    prompt_token: Array2<i64>,
    speaker_embeddings: ArrayD<f32>,
    speaker_features: ArrayD<f32>,
}

pub struct ChatterboxModel {
    speech_encoder: Session,
    embed_tokens: Session,
    language_model: Session,
    conditional_decoder: Session,
    tokenizer: Tokenizer,
    settings: GenerationSettings,
}

impl ChatterboxModel {
    /// Load the four graphs from `<model_dir>/onnx/` and `<model_dir>/tokenizer.json`
    pub fn load(
        model_dir: &Path,
        num_threads: Option<usize>,
        settings: GenerationSettings,
    ) -> Result<Self, InferenceError> {
        let onnx_dir = model_dir.join("onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            InferenceError::Tokenizer(format!("{}: {}", tokenizer_path.display(), e))
        })?;

        Ok(Self {
            speech_encoder: build_session(&onnx_dir.join("speech_encoder.onnx"), num_threads)?,
            embed_tokens: build_session(&onnx_dir.join("embed_tokens.onnx"), num_threads)?,
            language_model: build_session(&onnx_dir.join("language_model.onnx"), num_threads)?,
            conditional_decoder: build_session(
                &onnx_dir.join("conditional_decoder.onnx"),
                num_threads,
            )?,
            tokenizer,
            settings,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    /// Synthesize `text` in `language` with the voice of the clip at `reference`
    pub fn generate(
        &mut self,
        text: &str,
        language: LanguageId,
        reference: &Path,
    ) -> Result<Vec<f32>, InferenceError> {
        let start = Instant::now();

        let conditioning = self.encode_speaker(reference)?;
        let input_ids = self.tokenize(text, language)?;
        let generated = self.generate_speech_tokens(&input_ids, &conditioning)?;

        tracing::debug!(
            text_tokens = input_ids.len(),
            speech_tokens = generated.len(),
            latency_ms = start.elapsed().as_millis(),
            "Speech tokens generated"
        );

        self.decode_waveform(&generated, &conditioning)
    }

    fn tokenize(&self, text: &str, language: LanguageId) -> Result<Vec<i64>, InferenceError> {
        let prompt = format!("{}{}", language.prompt_tag(), normalize_punctuation(text));
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().iter().map(|&id| id as i64).collect())
    }

    fn encode_speaker(&mut self, reference: &Path) -> Result<SpeakerConditioning, InferenceError> {
        let mut samples =
            load_wav(reference, SAMPLE_RATE).map_err(|e| InferenceError::Audio(e.to_string()))?;
        samples.truncate(MAX_REFERENCE_SECONDS * SAMPLE_RATE as usize);
        if samples.is_empty() {
            return Err(InferenceError::Audio("reference clip has no samples".to_string()));
        }

        let audio_values = Array2::from_shape_vec((1, samples.len()), samples)?;
        let outputs = self.speech_encoder.run(inputs![
            "audio_values" => TensorRef::from_array_view(audio_values.view())?,
        ])?;

        let values: Vec<_> = outputs.iter().map(|(_, value)| value).collect();
        if values.len() < 4 {
            return Err(InferenceError::MissingOutput(format!(
                "speech_encoder returned {} outputs, expected 4",
                values.len()
            )));
        }

        Ok(SpeakerConditioning {
            cond_emb: values[0]
                .try_extract_array::<f32>()?
                .into_dimensionality::<Ix3>()?
                .to_owned(),
            prompt_token: values[1]
                .try_extract_array::<i64>()?
                .into_dimensionality::<Ix2>()?
                .to_owned(),
            speaker_embeddings: values[2].try_extract_array::<f32>()?.to_owned(),
            speaker_features: values[3].try_extract_array::<f32>()?.to_owned(),
        })
    }

    /// Greedy decoding of speech tokens; returns the tokens after the start token
    fn generate_speech_tokens(
        &mut self,
        input_ids: &[i64],
        conditioning: &SpeakerConditioning,
    ) -> Result<Vec<i64>, InferenceError> {
        let exaggeration = Array1::from_vec(vec![self.settings.exaggeration]);
        let mut step_ids = Array2::from_shape_vec((1, input_ids.len()), input_ids.to_vec())?;
        let mut step_positions =
            Array2::from_shape_vec((1, input_ids.len()), text_position_ids(input_ids))?;

        let mut past_key_values: Vec<Array4<f32>> =
            vec![Array4::zeros((1, NUM_KEY_VALUE_HEADS, 0, HEAD_DIM)); NUM_HIDDEN_LAYERS * 2];
        let mut generated = vec![START_SPEECH_TOKEN];
        let mut attention_len = 0;

        for step in 0..self.settings.max_new_tokens {
            let embed_outputs = self.embed_tokens.run(inputs![
                "input_ids" => TensorRef::from_array_view(step_ids.view())?,
                "position_ids" => TensorRef::from_array_view(step_positions.view())?,
                "exaggeration" => TensorRef::from_array_view(exaggeration.view())?,
            ])?;
            let (_, embeds) = embed_outputs
                .iter()
                .next()
                .ok_or_else(|| InferenceError::MissingOutput("inputs_embeds".to_string()))?;
            let mut inputs_embeds = embeds
                .try_extract_array::<f32>()?
                .into_dimensionality::<Ix3>()?
                .to_owned();
            drop(embed_outputs);

            if step == 0 {
                inputs_embeds =
                    concatenate(Axis(1), &[conditioning.cond_emb.view(), inputs_embeds.view()])?;
                attention_len = inputs_embeds.shape()[1];
            }
            let attention_mask = Array2::<i64>::ones((1, attention_len));

            let mut model_inputs = inputs![
                "inputs_embeds" => TensorRef::from_array_view(inputs_embeds.view())?,
                "attention_mask" => TensorRef::from_array_view(attention_mask.view())?,
            ];
            for layer in 0..NUM_HIDDEN_LAYERS {
                model_inputs.push((
                    format!("past_key_values.{}.key", layer).into(),
                    TensorRef::from_array_view(past_key_values[layer * 2].view())?.into(),
                ));
                model_inputs.push((
                    format!("past_key_values.{}.value", layer).into(),
                    TensorRef::from_array_view(past_key_values[layer * 2 + 1].view())?.into(),
                ));
            }

            let outputs = self.language_model.run(model_inputs)?;
            let logits = outputs["logits"]
                .try_extract_array::<f32>()?
                .into_dimensionality::<Ix3>()?;
            let mut next_logits = logits.slice(s![0, -1, ..]).to_vec();
            apply_repetition_penalty(&mut next_logits, &generated, self.settings.repetition_penalty);
            let next_token = argmax(&next_logits) as i64;

            let mut present = Vec::with_capacity(NUM_HIDDEN_LAYERS * 2);
            for layer in 0..NUM_HIDDEN_LAYERS {
                for kind in ["key", "value"] {
                    let name = format!("present.{}.{}", layer, kind);
                    present.push(
                        outputs[name.as_str()]
                            .try_extract_array::<f32>()?
                            .into_dimensionality::<Ix4>()?
                            .to_owned(),
                    );
                }
            }
            drop(outputs);
            past_key_values = present;

            generated.push(next_token);
            if next_token == STOP_SPEECH_TOKEN {
                break;
            }

            step_ids = Array2::from_elem((1, 1), next_token);
            step_positions = Array2::from_elem((1, 1), step as i64 + 1);
            attention_len += 1;
        }

        if generated.last() != Some(&STOP_SPEECH_TOKEN) {
            tracing::warn!(
                max_new_tokens = self.settings.max_new_tokens,
                "Speech generation hit the token limit before the stop token"
            );
        }

        Ok(speech_tokens(&generated))
    }

    fn decode_waveform(
        &mut self,
        tokens: &[i64],
        conditioning: &SpeakerConditioning,
    ) -> Result<Vec<f32>, InferenceError> {
        let generated = Array2::from_shape_vec((1, tokens.len()), tokens.to_vec())?;
        let speech_tokens =
            concatenate(Axis(1), &[conditioning.prompt_token.view(), generated.view()])?;

        let outputs = self.conditional_decoder.run(inputs![
            "speech_tokens" => TensorRef::from_array_view(speech_tokens.view())?,
            "speaker_embeddings" => TensorRef::from_array_view(conditioning.speaker_embeddings.view())?,
            "speaker_features" => TensorRef::from_array_view(conditioning.speaker_features.view())?,
        ])?;

        let (_, waveform) = outputs
            .iter()
            .next()
            .ok_or_else(|| InferenceError::MissingOutput("waveform".to_string()))?;
        let samples = waveform.try_extract_array::<f32>()?;

        Ok(samples.iter().copied().collect())
    }
}

/// Position ids for the text prompt: speech tokens sit at 0, text counts from -1
pub(crate) fn text_position_ids(input_ids: &[i64]) -> Vec<i64> {
    input_ids
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            if id >= START_SPEECH_TOKEN {
                0
            } else {
                i as i64 - 1
            }
        })
        .collect()
}

/// Penalize tokens already generated: positive logits are divided by
/// `penalty`, negative ones multiplied
pub(crate) fn apply_repetition_penalty(logits: &mut [f32], previous: &[i64], penalty: f32) {
    if penalty == 1.0 {
        return;
    }
    let mut seen = previous.to_vec();
    seen.sort_unstable();
    seen.dedup();
    for token in seen {
        if let Some(logit) = usize::try_from(token).ok().and_then(|t| logits.get_mut(t)) {
            *logit = if *logit < 0.0 {
                *logit * penalty
            } else {
                *logit / penalty
            };
        }
    }
}

/// Strip the start token and a trailing stop token from the generated ids
pub(crate) fn speech_tokens(generated: &[i64]) -> Vec<i64> {
    let body = generated.strip_prefix(&[START_SPEECH_TOKEN]).unwrap_or(generated);
    body.strip_suffix(&[STOP_SPEECH_TOKEN])
        .unwrap_or(body)
        .to_vec()
}
