pub mod field_processor;
pub mod formatters;
pub mod image;
pub mod mrz_decoder;
pub mod mrz_detector;
pub mod ocr;

pub use field_processor::FieldPostProcessor;
pub use self::image::ImageProcessor;
pub use mrz_decoder::{MrzDecoder, Td3Decoder};
pub use mrz_detector::MrzLineDetector;
pub use ocr::{OcrConfig, OcrEngine, PageSegmentation, PrecomputedOcr};
#[cfg(feature = "tesseract")]
pub use ocr::TesseractEngine;
