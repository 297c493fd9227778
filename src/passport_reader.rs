use crate::config::PipelineConfig;
use crate::models::*;
use crate::processing::formatters::current_year;
use crate::processing::*;
use crate::progress::{ProgressReporter, RECOGNITION_END};
use crate::utils::PassportError;
use crate::validation::ValidationGate;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// Runs one recognition attempt from a raw image to a `PassportRecord`.
pub struct PassportReader {
    config: PipelineConfig,
    ocr_config: OcrConfig,
    engine: Arc<dyn OcrEngine>,
    decoder: Arc<dyn MrzDecoder>,
    gate: ValidationGate,
}

impl PassportReader {
    pub fn new(config: PipelineConfig, engine: Arc<dyn OcrEngine>) -> Self {
        PassportReader {
            ocr_config: OcrConfig::from_pipeline(&config),
            decoder: Arc::new(Td3Decoder::new(config.check_digits)),
            gate: ValidationGate::new(config.min_confidence),
            config,
            engine,
        }
    }

    /// Replace the bundled TD3 decoder.
    pub fn with_decoder(mut self, decoder: Arc<dyn MrzDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn load_image(&self, image_path: &Path) -> Result<RawImage, PassportError> {
        ImageProcessor::open(image_path, self.config.max_image_bytes)
    }

    /// Full pipeline: normalize, OCR, then `read_recognition`. State changes go to `progress`.
    pub async fn recognize(
        &self,
        image: &RawImage,
        progress: &ProgressReporter,
    ) -> Result<PassportRecord, PassportError> {
        let result = self.run(image, progress).await;
        match &result {
            Ok(record) => {
                info!("Passport read with {} fields", record.fields.len());
                progress.done();
            }
            Err(err) => {
                warn!("Recognition failed: {}", err);
                progress.failed(err.to_string());
            }
        }
        result
    }

    async fn run(
        &self,
        image: &RawImage,
        progress: &ProgressReporter,
    ) -> Result<PassportRecord, PassportError> {
        progress.initializing();

        let normalized = ImageProcessor::normalize(image, self.config.contrast);
        let ocr = self
            .engine
            .recognize(&normalized, &self.ocr_config, progress)
            .await?;
        drop(normalized);

        progress.recognizing(RECOGNITION_END);
        self.read_recognition(&ocr)
    }

    /// Everything after OCR: validation, MRZ location, decoding and field processing.
    pub fn read_recognition(&self, ocr: &OcrResult) -> Result<PassportRecord, PassportError> {
        self.read_recognition_at(ocr, current_year())
    }

    /// Like `read_recognition`, resolving two-digit years against `current_year`.
    pub fn read_recognition_at(
        &self,
        ocr: &OcrResult,
        current_year: i32,
    ) -> Result<PassportRecord, PassportError> {
        self.gate.check_recognition(ocr)?;

        let lines = MrzLineDetector::detect(&ocr.text)?;
        let details = self.decoder.decode(&lines)?;
        if details.is_empty() {
            return Err(PassportError::InvalidMrz("no fields decoded".to_string()));
        }

        self.gate.check_fields(&details)?;

        let valid = FieldPostProcessor::process(&details);
        Ok(PassportRecord {
            fields: FieldPostProcessor::display_fields(&valid, current_year),
            mrz_lines: lines.into_lines(),
            text: ocr.text.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckDigitPolicy;

    const SCENARIO_TEXT: &str = "REPUBLIC OF EXAMPLAND\nP<EXAUSERNAME<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<<\nL898902C36EXA6908061F9406236ZE184226B<<<<<14\n";
    const SCENARIO_LINE1: &str = "P<EXAUSERNAME<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<<";
    // Same as the scenario's second line with a correct composite check digit.
    const VALID_LINE2: &str = "L898902C36EXA6908061F9406236ZE184226B<<<<<18";

    fn reader(policy: CheckDigitPolicy, text: &str, confidence: f32) -> PassportReader {
        let config = PipelineConfig {
            check_digits: policy,
            ..PipelineConfig::default()
        };
        PassportReader::new(config, Arc::new(PrecomputedOcr::new(text, confidence)))
    }

    struct EmptyDecoder;

    impl MrzDecoder for EmptyDecoder {
        fn decode(&self, _lines: &MrzLinePair) -> Result<Vec<MrzField>, PassportError> {
            Ok(Vec::new())
        }
    }

    fn blank_image() -> RawImage {
        RawImage::new(1, 1, vec![255, 255, 255, 255]).unwrap()
    }

    #[test]
    fn test_scenario_record_lenient() {
        let reader = reader(CheckDigitPolicy::Lenient, SCENARIO_TEXT, 85.0);
        let record = reader
            .read_recognition_at(&OcrResult::new(SCENARIO_TEXT, 85.0), 2026)
            .unwrap();

        assert_eq!(record.fields[0].field, MrzFieldName::FullName);
        assert_eq!(record.fields[0].value, "JOHN USERNAME");
        assert_eq!(
            record.get(MrzFieldName::DocumentNumber).unwrap().value,
            "L898902C3"
        );
        assert_eq!(
            record.mrz_lines,
            [
                SCENARIO_LINE1.to_string(),
                "L898902C36EXA6908061F9406236ZE184226B<<<<<14".to_string()
            ]
        );
        assert_eq!(record.text, SCENARIO_TEXT);
        assert_eq!(record.get(MrzFieldName::BirthDate).unwrap().value, "06 Aug 1969");
        assert_eq!(record.get(MrzFieldName::ExpirationDate).unwrap().value, "23 Jun 1994");
        assert_eq!(record.get(MrzFieldName::Sex).unwrap().value, "Female");
        assert_eq!(record.get(MrzFieldName::Nationality).unwrap().value, "EXA");
    }

    #[test]
    fn test_scenario_composite_mismatch_strict() {
        let reader = reader(CheckDigitPolicy::Strict, SCENARIO_TEXT, 85.0);
        let err = reader
            .read_recognition(&OcrResult::new(SCENARIO_TEXT, 85.0))
            .unwrap_err();
        assert!(matches!(err, PassportError::InvalidMrz(_)));
    }

    #[test]
    fn test_valid_check_digits_strict() {
        let text = format!("REPUBLIC OF EXAMPLAND\n{}\n{}\n", SCENARIO_LINE1, VALID_LINE2);
        let reader = reader(CheckDigitPolicy::Strict, &text, 85.0);
        let record = reader.read_recognition(&OcrResult::new(text.clone(), 85.0)).unwrap();
        assert_eq!(record.fields[0].value, "JOHN USERNAME");
        assert_eq!(record.mrz_lines[1], VALID_LINE2);
    }

    #[test]
    fn test_empty_decoder_result_is_invalid_mrz() {
        let text = format!("REPUBLIC OF EXAMPLAND\n{}\n{}\n", SCENARIO_LINE1, VALID_LINE2);
        let reader =
            reader(CheckDigitPolicy::Strict, &text, 85.0).with_decoder(Arc::new(EmptyDecoder));
        let err = reader.read_recognition(&OcrResult::new(text, 85.0)).unwrap_err();
        assert!(matches!(err, PassportError::InvalidMrz(_)));
    }

    #[test]
    fn test_calendar_invalid_birth_date_is_shown_raw() {
        let line2 = "L898902C36EXA6913451F9406236ZE184226B<<<<<18";
        let text = format!("REPUBLIC OF EXAMPLAND\n{}\n{}\n", SCENARIO_LINE1, line2);
        let reader = reader(CheckDigitPolicy::Lenient, &text, 85.0);
        let record = reader
            .read_recognition_at(&OcrResult::new(text.clone(), 85.0), 2026)
            .unwrap();
        assert_eq!(record.get(MrzFieldName::BirthDate).unwrap().value, "691345");
        assert_eq!(record.get(MrzFieldName::ExpirationDate).unwrap().value, "23 Jun 1994");
    }

    #[test]
    fn test_low_confidence_scenario() {
        let reader = reader(CheckDigitPolicy::Lenient, SCENARIO_TEXT, 20.0);
        let err = reader
            .read_recognition(&OcrResult::new(SCENARIO_TEXT, 20.0))
            .unwrap_err();
        assert!(matches!(err, PassportError::LowConfidence(c) if c == 20.0));
    }

    #[test]
    fn test_incomplete_mrz_scenario() {
        let text = format!("REPUBLIC OF EXAMPLAND\n{}\n", SCENARIO_LINE1);
        let reader = reader(CheckDigitPolicy::Lenient, &text, 85.0);
        let err = reader.read_recognition(&OcrResult::new(text, 85.0)).unwrap_err();
        assert!(matches!(err, PassportError::IncompleteMrz));
    }

    #[test]
    fn test_missing_first_name() {
        let line1 = "P<EXAUSERNAME<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";
        let text = format!("PASSPORT\n{}\n{}\n", line1, VALID_LINE2);
        let reader = reader(CheckDigitPolicy::Strict, &text, 85.0);
        match reader.read_recognition(&OcrResult::new(text, 85.0)) {
            Err(PassportError::MissingRequiredFields(missing)) => {
                assert_eq!(missing, vec!["First name".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recognize_reports_done() {
        let text = format!("{}\n{}", SCENARIO_LINE1, VALID_LINE2);
        let reader = reader(CheckDigitPolicy::Strict, &text, 85.0);
        let (progress, rx) = ProgressReporter::new();

        let record = reader.recognize(&blank_image(), &progress).await.unwrap();
        assert_eq!(record.fields[0].field, MrzFieldName::FullName);
        assert_eq!(*rx.borrow(), PipelineState::Done);
    }

    #[tokio::test]
    async fn test_recognize_reports_failure_reason() {
        let reader = reader(CheckDigitPolicy::Lenient, SCENARIO_TEXT, 20.0);
        let (progress, rx) = ProgressReporter::new();

        let err = reader.recognize(&blank_image(), &progress).await.unwrap_err();
        assert_eq!(
            *rx.borrow(),
            PipelineState::Failed {
                reason: err.to_string()
            }
        );
    }
}
