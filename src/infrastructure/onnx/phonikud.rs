//! Hebrew diacritization with the phonikud ONNX model.
//!
//! The model is a character-level BERT with three heads: niqqud class,
//! shin/sin dot, and three binary flags (stress, vocal shva, prefix).

use ndarray::{s, Array2, Ix3};
use ort::inputs;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use tokenizers::Tokenizer;

use super::{argmax, build_session, InferenceError};
use crate::domain::tts::text::{
    is_hebrew_letter, strip_hebrew_points, PREFIX_MARK, STRESS_MARK, VOCAL_SHVA_MARK,
};

/// Characters per inference window; the encoder accepts 2048 positions
const MAX_TOKENS: usize = 2000;

/// Niqqud class emitted for a letter acting as a vowel carrier
const MAT_LECT: &str = "<MAT_LECT>";
const SHVA: &str = "\u{05B0}";

const NIKUD_CLASSES: [&str; 16] = [
    "",
    MAT_LECT,
    SHVA,
    "\u{05B1}", // hataf segol
    "\u{05B2}", // hataf patah
    "\u{05B3}", // hataf qamats
    "\u{05B4}", // hiriq
    "\u{05B5}", // tsere
    "\u{05B6}", // segol
    "\u{05B7}", // patah
    "\u{05B8}", // qamats
    "\u{05B9}", // holam
    "\u{05BA}", // holam haser for vav
    "\u{05BB}", // qubuts
    "\u{05BC}", // dagesh
    "\u{05C7}", // qamats qatan
];

/// Shin dot and sin dot
const SHIN_CLASSES: [char; 2] = ['\u{05C1}', '\u{05C2}'];

/// Per-token decision taken from the three model heads
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TokenPrediction {
    pub nikud: usize,
    pub shin: usize,
    pub stress: bool,
    pub vocal_shva: bool,
    pub prefix: bool,
}

pub struct PhonikudModel {
    session: Session,
    tokenizer: Tokenizer,
}

impl PhonikudModel {
    pub fn load(
        model_path: &Path,
        tokenizer_path: &Path,
        num_threads: Option<usize>,
    ) -> Result<Self, InferenceError> {
        let session = build_session(model_path, num_threads)?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| InferenceError::Tokenizer(format!("{}: {}", tokenizer_path.display(), e)))?;

        Ok(Self { session, tokenizer })
    }

    /// Add niqqud and phonetic marks to Hebrew text.
    ///
    /// Existing points are removed first. Lines are diacritized independently
    /// and rejoined with `\n`.
    pub fn add_diacritics(&mut self, text: &str) -> Result<String, InferenceError> {
        let clean = strip_hebrew_points(text);
        map_lines(&clean, |line| self.diacritize_line(line))
    }

    fn diacritize_line(&mut self, line: &str) -> Result<String, InferenceError> {
        if !line.chars().any(is_hebrew_letter) {
            return Ok(line.to_string());
        }

        let mut output = String::with_capacity(line.len() * 2);
        for window in split_windows(line, MAX_TOKENS) {
            output.push_str(&self.diacritize_window(window)?);
        }
        Ok(output)
    }

    fn diacritize_window(&mut self, text: &str) -> Result<String, InferenceError> {
        let encoding = self
            .tokenizer
            .encode_char_offsets(text, true)
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;

        let seq_len = encoding.get_ids().len();
        let to_i64 = |values: &[u32]| values.iter().map(|&v| v as i64).collect::<Vec<_>>();
        let input_ids = Array2::from_shape_vec((1, seq_len), to_i64(encoding.get_ids()))?;
        let attention_mask =
            Array2::from_shape_vec((1, seq_len), to_i64(encoding.get_attention_mask()))?;
        let token_type_ids = Array2::from_shape_vec((1, seq_len), to_i64(encoding.get_type_ids()))?;

        let outputs = self.session.run(inputs![
            "input_ids" => TensorRef::from_array_view(input_ids.view())?,
            "attention_mask" => TensorRef::from_array_view(attention_mask.view())?,
            "token_type_ids" => TensorRef::from_array_view(token_type_ids.view())?,
        ])?;

        let nikud_logits = outputs["nikud_logits"]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix3>()?;
        let shin_logits = outputs["shin_logits"]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix3>()?;
        let additional_logits = outputs["additional_logits"]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix3>()?;

        let predictions: Vec<TokenPrediction> = (0..seq_len)
            .map(|i| TokenPrediction {
                nikud: argmax(&nikud_logits.slice(s![0, i, ..]).to_vec()),
                shin: argmax(&shin_logits.slice(s![0, i, ..]).to_vec()),
                stress: additional_logits[[0, i, 0]] > 0.0,
                vocal_shva: additional_logits[[0, i, 1]] > 0.0,
                prefix: additional_logits[[0, i, 2]] > 0.0,
            })
            .collect();

        Ok(decode_predictions(text, encoding.get_offsets(), &predictions))
    }
}

/// Apply `f` to every line and rejoin the results with `\n`
fn map_lines<E>(
    text: &str,
    mut f: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let lines = text.split('\n').map(&mut f).collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Split a line into windows of at most `max_chars` characters.
///
/// Windows end after the last whitespace that fits, so words stay whole;
/// a word longer than a window is cut. Concatenating the windows gives
/// back the line.
pub(crate) fn split_windows(line: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    let mut count = 0;
    let mut last_break: Option<usize> = None;

    for (idx, c) in line.char_indices() {
        if count == max_chars {
            let cut = last_break.unwrap_or(idx);
            windows.push(&line[start..cut]);
            count = line[cut..idx].chars().count();
            start = cut;
            last_break = None;
        }
        count += 1;
        if c.is_whitespace() {
            last_break = Some(idx + c.len_utf8());
        }
    }

    if start < line.len() {
        windows.push(&line[start..]);
    }
    windows
}

/// Rebuild text from per-token predictions.
///
/// Offsets are character offsets into `text`. Special tokens and tokens
/// spanning more than one character carry no marks; characters they cover
/// are copied through unchanged.
pub(crate) fn decode_predictions(
    text: &str,
    offsets: &[(usize, usize)],
    predictions: &[TokenPrediction],
) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut output = String::with_capacity(text.len() * 2);
    let mut prev = 0;

    for (&(start, end), prediction) in offsets.iter().zip(predictions) {
        if end != start + 1 || end > chars.len() || start < prev {
            continue;
        }

        output.extend(&chars[prev..start]);
        let letter = chars[start];
        output.push(letter);
        prev = end;

        if !is_hebrew_letter(letter) {
            continue;
        }

        if letter == 'ש' {
            if let Some(&dot) = SHIN_CLASSES.get(prediction.shin) {
                output.push(dot);
            }
        }

        let nikud = NIKUD_CLASSES.get(prediction.nikud).copied().unwrap_or("");
        if nikud != MAT_LECT {
            output.push_str(nikud);
        }
        if prediction.stress {
            output.push(STRESS_MARK);
        }
        if prediction.vocal_shva && nikud == SHVA {
            output.push(VOCAL_SHVA_MARK);
        }
        if prediction.prefix {
            output.push(PREFIX_MARK);
        }
    }

    if prev < chars.len() {
        output.extend(&chars[prev..]);
    }

    output
}
