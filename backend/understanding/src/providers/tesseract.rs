//! Local recognition through the system `tesseract` binary.

use std::collections::HashMap;

use async_trait::async_trait;
use image::DynamicImage;
use rusty_tesseract::{Args, Image};
use tracing::debug;

use wordbot_core::{RecognitionError, RecognitionMode, RecognitionRequest, TextRecognizer};
use wordbot_enhance::binarize;

use super::{BoundingBox, WordDetail, WordReport, WordReporter};
use crate::postprocess::clean_letters;

const PROVIDER: &str = "tesseract";
const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Page segmentation: one word, or one uniform block of text.
const PSM_SINGLE_WORD: i32 = 8;
const PSM_BLOCK: i32 = 6;
/// Default engine (LSTM when available).
const OEM_DEFAULT: i32 = 3;

pub struct TesseractRecognizer {
    lang: String,
    dpi: i32,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            dpi: 300,
        }
    }
}

impl TesseractRecognizer {
    pub fn new(lang: impl Into<String>, dpi: i32) -> Self {
        Self {
            lang: lang.into(),
            dpi,
        }
    }

    fn args(&self, mode: RecognitionMode) -> Args {
        let mut config_variables = HashMap::new();
        let psm = match mode {
            RecognitionMode::SingleWord => {
                config_variables.insert("tessedit_char_whitelist".to_string(), LETTERS.to_string());
                PSM_SINGLE_WORD
            }
            RecognitionMode::MultipleWords => PSM_BLOCK,
        };
        Args {
            lang: self.lang.clone(),
            config_variables,
            dpi: Some(self.dpi),
            psm: Some(psm),
            oem: Some(OEM_DEFAULT),
        }
    }

    /// Binarize and hand the image to tesseract on the blocking pool.
    async fn run<T, F>(&self, request: &RecognitionRequest, job: F) -> Result<T, RecognitionError>
    where
        T: Send + 'static,
        F: FnOnce(&Image, &Args) -> Result<T, String> + Send + 'static,
    {
        let pixels = wordbot_media::decode(&request.image)?;
        let args = self.args(request.mode);
        tokio::task::spawn_blocking(move || -> Result<T, RecognitionError> {
            let binary = DynamicImage::ImageLuma8(binarize(&pixels));
            let image = Image::from_dynamic_image(&binary)
                .map_err(|e| RecognitionError::Engine(e.to_string()))?;
            job(&image, &args).map_err(RecognitionError::Engine)
        })
        .await
        .map_err(|e| RecognitionError::Engine(format!("OCR task failed: {e}")))?
    }
}

/// Installed tesseract version, if the binary can be run.
pub fn tesseract_version() -> Result<String, RecognitionError> {
    rusty_tesseract::get_tesseract_version()
        .map(|v| v.lines().next().unwrap_or_default().trim().to_string())
        .map_err(|e| RecognitionError::Engine(e.to_string()))
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        PROVIDER
    }

    /// Cleaned text: letters and single spaces only.
    async fn recognize(&self, request: &RecognitionRequest) -> Result<String, RecognitionError> {
        let raw = self
            .run(request, |image, args| {
                rusty_tesseract::image_to_string(image, args).map_err(|e| e.to_string())
            })
            .await?;
        debug!(raw_chars = raw.len(), "Tesseract finished");
        Ok(clean_letters(&raw))
    }
}

#[async_trait]
impl WordReporter for TesseractRecognizer {
    /// Words with the confidences tesseract reports, and the cleaned text
    /// rebuilt from them line by line.
    async fn words(&self, request: &RecognitionRequest) -> Result<WordReport, RecognitionError> {
        let rows = self
            .run(request, |image, args| {
                let output = rusty_tesseract::image_to_data(image, args).map_err(|e| e.to_string())?;
                Ok(output
                    .data
                    .into_iter()
                    .map(|d| Row {
                        line: (d.block_num, d.par_num, d.line_num),
                        conf: d.conf,
                        text: d.text,
                        bbox: BoundingBox {
                            left: d.left,
                            top: d.top,
                            width: d.width,
                            height: d.height,
                        },
                    })
                    .collect::<Vec<_>>())
            })
            .await?;
        Ok(assemble(rows))
    }
}

/// One row of tesseract's TSV output.
struct Row {
    line: (i32, i32, i32),
    conf: f32,
    text: String,
    bbox: BoundingBox,
}

/// Rows at or below zero confidence are layout entries, not words.
fn assemble(rows: Vec<Row>) -> WordReport {
    let mut raw = String::new();
    let mut current_line = None;
    let mut words = Vec::new();
    for row in rows {
        let text = row.text.trim();
        if row.conf <= 0.0 || text.is_empty() {
            continue;
        }
        if !raw.is_empty() {
            raw.push(if current_line == Some(row.line) { ' ' } else { '\n' });
        }
        raw.push_str(text);
        current_line = Some(row.line);
        words.push(WordDetail {
            text: text.to_string(),
            confidence: Some(row.conf),
            bbox: Some(row.bbox),
        });
    }
    WordReport::new(clean_letters(&raw), words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_mode_restricts_to_letters() {
        let args = TesseractRecognizer::default().args(RecognitionMode::SingleWord);
        assert_eq!(args.psm, Some(8));
        assert_eq!(args.oem, Some(3));
        assert_eq!(
            args.config_variables.get("tessedit_char_whitelist").map(String::len),
            Some(52)
        );
    }

    #[test]
    fn block_mode_has_no_whitelist() {
        let args = TesseractRecognizer::new("deu", 150).args(RecognitionMode::MultipleWords);
        assert_eq!(args.psm, Some(6));
        assert_eq!(args.lang, "deu");
        assert_eq!(args.dpi, Some(150));
        assert!(args.config_variables.is_empty());
    }

    fn row(line: i32, conf: f32, text: &str) -> Row {
        Row {
            line: (1, 1, line),
            conf,
            text: text.into(),
            bbox: BoundingBox { left: 0, top: line * 10, width: 5, height: 8 },
        }
    }

    #[test]
    fn assembled_text_matches_the_words() {
        let report = assemble(vec![
            row(0, -1.0, ""),
            row(1, 91.0, "STOP"),
            row(1, 87.0, "HERE"),
            row(2, -1.0, ""),
            row(2, 60.0, "exit1"),
            row(2, 0.0, "noise"),
        ]);
        assert_eq!(report.text, "STOP HERE exit");
        let texts: Vec<&str> = report.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["STOP", "HERE", "exit1"]);
        assert_eq!(report.words[2].bbox.map(|b| b.top), Some(20));
        assert!(report.mean_confidence.is_some_and(|m| (m - 238.0 / 3.0).abs() < 1e-3));
    }

    #[tokio::test]
    async fn undecodable_input_is_an_image_error() {
        let mut input = crate::test_support::sample_image();
        input.data.truncate(16);
        let request = RecognitionRequest::new(input);
        let err = TesseractRecognizer::default().recognize(&request).await.unwrap_err();
        assert!(matches!(err, RecognitionError::Image(_)));
    }
}
