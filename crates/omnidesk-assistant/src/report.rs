// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handoff report extraction.
//!
//! The assistant embeds a hidden JSON block between fixed sentinel markers
//! when a conversation is ready for human attention. This module finds the
//! block, parses it, and strips it from text bound for the end user -- the
//! sentinel-delimited block must never leak to the contact.

use serde_json::Value;

/// Opening sentinel of the embedded report block.
pub const REPORT_START: &str = "[REPORT_START]";
/// Closing sentinel of the embedded report block.
pub const REPORT_END: &str = "[REPORT_END]";

/// Default ticket title when the report omits `tema`.
pub const DEFAULT_TITLE: &str = "Triagem finalizada";
/// Default ticket priority when the report omits `prioridade`.
pub const DEFAULT_PRIORITY: &str = "medium";

/// A parsed handoff report. The full field map is kept verbatim as the
/// ticket summary; `title`/`priority` are derived views with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct HandoffReport {
    pub fields: Value,
}

impl HandoffReport {
    /// Ticket title derived from the `tema` field.
    pub fn title(&self) -> String {
        self.fields
            .get("tema")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
            .to_string()
    }

    /// Ticket priority derived from the `prioridade` field.
    pub fn priority(&self) -> String {
        self.fields
            .get("prioridade")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PRIORITY)
            .to_string()
    }
}

/// Returns the raw text between the first sentinel pair, if both markers are
/// present in order.
pub fn extract_block(text: &str) -> Option<&str> {
    let start = text.find(REPORT_START)?;
    let after_start = start + REPORT_START.len();
    let end = text[after_start..].find(REPORT_END)?;
    Some(&text[after_start..after_start + end])
}

/// Parses the report block out of a raw assistant reply.
///
/// Returns `None` when no block is present; `Some(Err)` when a block exists
/// but is not valid JSON (callers log and treat the report as absent).
pub fn parse_report(text: &str) -> Option<Result<HandoffReport, serde_json::Error>> {
    let inner = extract_block(text)?;
    Some(serde_json::from_str::<Value>(inner).map(|fields| HandoffReport { fields }))
}

/// Removes the first sentinel-delimited block (well-formed or not) and trims
/// surrounding whitespace. Text without a complete block passes through
/// trimmed.
pub fn strip_block(text: &str) -> String {
    let Some(start) = text.find(REPORT_START) else {
        return text.trim().to_string();
    };
    let after_start = start + REPORT_START.len();
    let Some(end) = text[after_start..].find(REPORT_END) else {
        return text.trim().to_string();
    };
    let block_end = after_start + end + REPORT_END.len();
    format!("{}{}", &text[..start], &text[block_end..])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_report_with_trailing_text() {
        let raw = r#"[REPORT_START]{"tema":"X","prioridade":"high"}[REPORT_END] Hello"#;
        let report = parse_report(raw).unwrap().unwrap();
        assert_eq!(report.title(), "X");
        assert_eq!(report.priority(), "high");
        assert_eq!(strip_block(raw), "Hello");
    }

    #[test]
    fn malformed_block_is_parse_error_but_still_stripped() {
        let raw = "[REPORT_START]not-json[REPORT_END] Hi";
        assert!(parse_report(raw).unwrap().is_err());
        assert_eq!(strip_block(raw), "Hi");
    }

    #[test]
    fn missing_block_passes_through() {
        let raw = "Entendi, pode me contar mais?";
        assert!(parse_report(raw).is_none());
        assert_eq!(strip_block(raw), raw);
    }

    #[test]
    fn unterminated_block_is_left_intact() {
        let raw = "[REPORT_START]{\"tema\":\"X\"} sem fim";
        assert!(parse_report(raw).is_none());
        assert_eq!(strip_block(raw), raw.trim());
    }

    #[test]
    fn missing_fields_get_defaults() {
        let raw = "[REPORT_START]{}[REPORT_END]Tchau";
        let report = parse_report(raw).unwrap().unwrap();
        assert_eq!(report.title(), DEFAULT_TITLE);
        assert_eq!(report.priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn multiline_block_is_extracted() {
        let raw = "Despedida.\n[REPORT_START]\n{\n  \"tema\": \"LOAS\",\n  \"interpretacao\": \"caso\"\n}\n[REPORT_END]";
        let report = parse_report(raw).unwrap().unwrap();
        assert_eq!(report.title(), "LOAS");
        assert_eq!(report.fields["interpretacao"], "caso");
        assert_eq!(strip_block(raw), "Despedida.");
    }

    #[test]
    fn full_report_fields_are_preserved_for_summary() {
        let raw = r#"[REPORT_START]{"cliente":"Maria","tema":"Auxílio","interpretacao":"resumo","atencao":"urgente","sugestao":"Agendar Consulta","prioridade":"high"}[REPORT_END]"#;
        let report = parse_report(raw).unwrap().unwrap();
        assert_eq!(report.fields["cliente"], "Maria");
        assert_eq!(report.fields["sugestao"], "Agendar Consulta");
    }
}
