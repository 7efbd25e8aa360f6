use std::{fs, path::PathBuf};

use crate::{
    encoding,
    errors::{StatementParseError, StatementResult},
    parsers::prelude::*,
    types::Statement,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Qfx,
}

impl FileFormat {
    fn parse(&self, content: &str) -> StatementResult<Statement> {
        match self {
            FileFormat::Qfx => {
                let statements = QfxParser::parse(content).map_err(StatementParseError::ParseFailed)?;
                statements.try_into()
            }
        }
    }

    fn detect(filename: Option<&str>, content: Option<&str>) -> StatementResult<Self> {
        if let Some(content) = content {
            if QfxParser::is_supported(filename, content) {
                return Ok(FileFormat::Qfx);
            }
        }

        if let Some(filename) = filename {
            if let Some(ext) = filename.rsplit('.').next() {
                if matches!(ext.to_lowercase().as_str(), "qfx" | "ofx") {
                    return Ok(FileFormat::Qfx);
                }
            }
        }

        Err(StatementParseError::UnsupportedFormat)
    }
}

/// Reads one statement: raw bytes (or the file at `filename`) are decoded,
/// the format is detected unless given, and the result is parsed into a
/// [`Statement`].
#[derive(Default)]
pub struct ParserBuilder {
    content: Option<Vec<u8>>,
    filepath: Option<PathBuf>,
    format: Option<FileFormat>,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(self, content: &str) -> Self {
        self.bytes(content.as_bytes())
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.content = Some(bytes.to_vec());
        self
    }

    pub fn filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filepath = Some(filename.into());
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn parse(self) -> StatementResult<Statement> {
        let bytes = match self.content {
            Some(bytes) => bytes,
            None => {
                let path = self
                    .filepath
                    .as_ref()
                    .ok_or(StatementParseError::MissingContentAndFilepath)?;
                fs::read(path)?
            }
        };

        let (text, _) = encoding::decode(&bytes);
        let filename = self.filepath.as_ref().map(|p| p.to_string_lossy());

        let format = self
            .format
            .map(Ok)
            .unwrap_or_else(|| FileFormat::detect(filename.as_deref(), Some(&text)))?;

        format.parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE_QFX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OFX>
  <BANKMSGSRSV1>
    <STMTTRNRS>
      <STMTRS>
        <BANKACCTFROM>
          <BANKID>071000013</BANKID>
          <ACCTID>4471020</ACCTID>
          <ACCTTYPE>CHECKING</ACCTTYPE>
        </BANKACCTFROM>
        <BANKTRANLIST>
          <STMTTRN>
            <TRNTYPE>DEBIT</TRNTYPE>
            <DTPOSTED>20251226120000</DTPOSTED>
            <TRNAMT>-6.75</TRNAMT>
            <FITID>FT25360001</FITID>
            <NAME>Blue Bottle</NAME>
            <MEMO>Espresso x2</MEMO>
          </STMTTRN>
        </BANKTRANLIST>
      </STMTRS>
    </STMTTRNRS>
  </BANKMSGSRSV1>
</OFX>"#;

    #[test]
    fn test_builder_missing_content() {
        let result = ParserBuilder::new().parse();
        assert!(matches!(result, Err(StatementParseError::MissingContentAndFilepath)));
    }

    #[test]
    fn test_builder_new() {
        let builder = ParserBuilder::new();
        assert!(builder.content.is_none());
        assert!(builder.filepath.is_none());
        assert!(builder.format.is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let builder = ParserBuilder::new()
            .content("content")
            .filename("file.qfx")
            .format(FileFormat::Qfx);

        assert_eq!(builder.content.as_deref(), Some(b"content".as_slice()));
        assert_eq!(builder.filepath, Some(PathBuf::from("file.qfx")));
        assert_eq!(builder.format, Some(FileFormat::Qfx));
    }

    #[rstest]
    #[case(Some(FileFormat::Qfx), None)]
    #[case(None, None)]
    #[case(None, Some("statement.qfx"))]
    #[case(None, Some("statement.ofx"))]
    fn test_parse_with_different_detection_methods(
        #[case] format: Option<FileFormat>,
        #[case] filename: Option<&str>,
    ) {
        let mut builder = ParserBuilder::new().content(SAMPLE_QFX);

        if let Some(fmt) = format {
            builder = builder.format(fmt);
        }
        if let Some(fname) = filename {
            builder = builder.filename(fname);
        }

        let statement = builder.parse().unwrap();
        assert_eq!(statement.accounts.len(), 1);
        assert_eq!(statement.accounts[0].account.account_id, "4471020");
        assert_eq!(statement.accounts[0].transactions[0].transaction_type, "DEBIT");
    }

    #[test]
    fn test_parse_latin1_bytes() {
        let sgml = b"OFXHEADER:100\nDATA:OFXSGML\n\n<OFX><BANKMSGSRSV1><STMTTRNRS><STMTRS>\
<BANKACCTFROM><ACCTID>1</BANKACCTFROM><BANKTRANLIST><STMTTRN><TRNTYPE>DEBIT\
<DTPOSTED>20250101<TRNAMT>-4.50<NAME>Caf\xe9 Central</STMTTRN></BANKTRANLIST>\
</STMTRS></STMTTRNRS></BANKMSGSRSV1></OFX>";

        let statement = ParserBuilder::new().bytes(sgml).parse().unwrap();
        let txn = &statement.accounts[0].transactions[0];
        assert_eq!(txn.name.as_deref(), Some("Caf\u{e9} Central"));
    }

    #[test]
    fn test_parse_unsupported_format() {
        let result = ParserBuilder::new()
            .content("random content that's not OFX")
            .parse();

        assert!(matches!(result, Err(StatementParseError::UnsupportedFormat)));
    }

    #[test]
    fn test_parse_invalid_content() {
        let result = ParserBuilder::new()
            .content("invalid QFX content")
            .format(FileFormat::Qfx)
            .parse();

        assert!(matches!(result, Err(StatementParseError::ParseFailed(_))));
    }

    #[test]
    fn test_parse_missing_file() {
        let result = ParserBuilder::new()
            .filename("/definitely/not/here/statement.qfx")
            .parse();

        assert!(matches!(result, Err(StatementParseError::ReadContentFailed(_))));
    }

    #[rstest]
    #[case(None, Some(SAMPLE_QFX), true)] // Detect by content
    #[case(Some("statement.qfx"), None, true)] // Detect by .qfx extension
    #[case(Some("statement.ofx"), None, true)] // Detect by .ofx extension
    #[case(Some("statement.QFX"), None, true)] // Case insensitive extension
    #[case(Some("statement.csv"), Some("random content"), false)] // Unsupported
    #[case(None, None, false)] // No input
    #[case(Some("statement.txt"), Some("not ofx"), false)] // Unsupported content
    fn test_file_format_detect(
        #[case] filename: Option<&str>,
        #[case] content: Option<&str>,
        #[case] should_succeed: bool,
    ) {
        let result = FileFormat::detect(filename, content);
        if should_succeed {
            assert_eq!(result.unwrap(), FileFormat::Qfx);
        } else {
            assert!(matches!(result.unwrap_err(), StatementParseError::UnsupportedFormat));
        }
    }

    #[test]
    fn test_builder_parse_invalid_date() {
        let invalid_qfx = SAMPLE_QFX.replace("20251226120000", "2025-12-26");

        let result = ParserBuilder::new()
            .content(&invalid_qfx)
            .format(FileFormat::Qfx)
            .parse();

        assert!(matches!(result, Err(StatementParseError::QfxDateInvalidFormat)));
    }
}
