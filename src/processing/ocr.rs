use crate::config::PipelineConfig;
use crate::models::{NormalizedImage, OcrResult};
use crate::progress::ProgressReporter;
use crate::utils::PassportError;
use async_trait::async_trait;

/// Page layout assumption handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegmentation {
    /// Treat the image as one uniform block of text.
    SingleBlock,
    Auto,
}

/// Engine settings for MRZ recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    pub languages: String,
    pub page_segmentation: PageSegmentation,
    pub preserve_interword_spaces: bool,
    pub char_whitelist: String,
    pub tessdata_dir: Option<String>,
}

impl OcrConfig {
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        OcrConfig {
            languages: config.language_spec(),
            page_segmentation: PageSegmentation::SingleBlock,
            preserve_interword_spaces: true,
            char_whitelist: config.char_whitelist.clone(),
            tessdata_dir: config.tessdata_dir.clone(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_pipeline(&PipelineConfig::default())
    }
}

/// Text recognition backend.
///
/// Implementations report progress through `progress.engine_progress` with a
/// fraction between 0.0 and 1.0. Dropping the returned future abandons the
/// recognition.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(
        &self,
        image: &NormalizedImage,
        config: &OcrConfig,
        progress: &ProgressReporter,
    ) -> Result<OcrResult, PassportError>;
}

/// Engine that returns text recognized ahead of time, e.g. by an external OCR run.
#[derive(Debug, Clone)]
pub struct PrecomputedOcr {
    result: OcrResult,
}

impl PrecomputedOcr {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        PrecomputedOcr {
            result: OcrResult::new(text, confidence),
        }
    }
}

#[async_trait]
impl OcrEngine for PrecomputedOcr {
    async fn recognize(
        &self,
        _image: &NormalizedImage,
        _config: &OcrConfig,
        progress: &ProgressReporter,
    ) -> Result<OcrResult, PassportError> {
        progress.engine_progress(0.0);
        progress.engine_progress(1.0);
        Ok(self.result.clone())
    }
}

#[cfg(feature = "tesseract")]
pub use self::tesseract_engine::TesseractEngine;

#[cfg(feature = "tesseract")]
mod tesseract_engine {
    use super::*;
    use log::{debug, info};
    use tesseract::{PageSegMode, Tesseract};

    /// Tesseract-backed engine. Recognition runs on the blocking thread pool.
    ///
    /// Only the start and the end of recognition are reported: the `tesseract`
    /// bindings expose no progress monitor, so the state jumps from 10% to 90%.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TesseractEngine;

    impl TesseractEngine {
        pub fn new() -> Self {
            TesseractEngine
        }

        fn run(
            pixels: &[u8],
            width: u32,
            height: u32,
            config: &OcrConfig,
        ) -> Result<OcrResult, PassportError> {
            let mut tess = Tesseract::new(config.tessdata_dir.as_deref(), Some(&config.languages))
                .map_err(|e| PassportError::Unexpected(format!("Tesseract init error: {}", e)))?
                .set_variable("tessedit_char_whitelist", &config.char_whitelist)
                .map_err(|e| {
                    PassportError::Unexpected(format!("Tesseract set variable error: {}", e))
                })?
                .set_variable(
                    "preserve_interword_spaces",
                    if config.preserve_interword_spaces { "1" } else { "0" },
                )
                .map_err(|e| {
                    PassportError::Unexpected(format!("Tesseract set variable error: {}", e))
                })?;

            tess.set_page_seg_mode(match config.page_segmentation {
                PageSegmentation::SingleBlock => PageSegMode::PsmSingleBlock,
                PageSegmentation::Auto => PageSegMode::PsmAuto,
            });

            let mut tess = tess
                .set_frame(pixels, width as i32, height as i32, 4, width as i32 * 4)
                .map_err(|e| PassportError::Unexpected(format!("Tesseract set image error: {}", e)))?
                .recognize()
                .map_err(|e| PassportError::Unexpected(format!("Tesseract error: {}", e)))?;

            let text = tess
                .get_text()
                .map_err(|e| PassportError::Unexpected(format!("Tesseract error: {}", e)))?;
            let confidence = tess.mean_text_conf() as f32;
            debug!("OCR result ({} chars):\n{}", text.len(), text);

            Ok(OcrResult::new(text, confidence))
        }
    }

    #[async_trait]
    impl OcrEngine for TesseractEngine {
        async fn recognize(
            &self,
            image: &NormalizedImage,
            config: &OcrConfig,
            progress: &ProgressReporter,
        ) -> Result<OcrResult, PassportError> {
            info!(
                "Running Tesseract ({}) on {}x{} image",
                config.languages, image.width, image.height
            );
            progress.engine_progress(0.0);

            let pixels = image.pixels.clone();
            let (width, height) = (image.width, image.height);
            let config = config.clone();
            // The Tesseract handle lives and dies inside this closure.
            let result = tokio::task::spawn_blocking(move || Self::run(&pixels, width, height, &config))
                .await
                .map_err(|e| PassportError::Unexpected(format!("OCR task failed: {}", e)))?;

            progress.engine_progress(1.0);
            result
        }
    }
}
