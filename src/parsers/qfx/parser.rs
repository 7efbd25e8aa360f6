use super::dto::{OfxXml, QfxStatement};
use crate::parsers::traits::Parser;
use serde_xml_rs::SerdeXml;

pub struct QfxParser;

impl Parser for QfxParser {
    type Output = QfxStatement;

    fn is_supported(filename: Option<&str>, content: &str) -> bool {
        if let Some(name) = filename {
            let ext = name.to_lowercase();
            if ext.ends_with(".qfx") || ext.ends_with(".ofx") {
                return true;
            }
        }

        let trimmed = content.trim();
        trimmed.contains("<OFX>")
            || trimmed.contains("OFXHEADER:")
            || trimmed.contains("DATA:OFXSGML")
    }

    fn parse(content: &str) -> Result<Vec<Self::Output>, String> {
        let xml_content = if content.trim().starts_with("<?xml") {
            content.to_string()
        } else {
            convert_sgml_to_xml(content)?
        };

        let ofx_start = xml_content.find("<OFX>").ok_or("Missing <OFX> tag")?;
        let ofx_end = xml_content.find("</OFX>").ok_or("Missing </OFX> tag")?;
        if ofx_end < ofx_start {
            return Err("Missing </OFX> tag".to_string());
        }
        let ofx_content = &xml_content[ofx_start..ofx_end + "</OFX>".len()];

        // INVBANKTRAN entries are interleaved with trades inside INVTRANLIST.
        let ofx: OfxXml = SerdeXml::new()
            .overlapping_sequences(true)
            .from_str(ofx_content)
            .map_err(|e| format!("XML parse error: {}", e))?;

        let mut statements = Vec::new();

        for response in ofx.bank_msgs.map(|b| b.stmt_trn_rs).unwrap_or_default() {
            match response.stmt_rs {
                Some(rs) => statements.push(QfxStatement::from_raw(rs.account, rs.bank_transaction_list)?),
                None => tracing::warn!("skipping bank statement response without STMTRS"),
            }
        }

        for response in ofx.cc_msgs.map(|c| c.cc_stmt_trn_rs).unwrap_or_default() {
            match response.cc_stmt_rs {
                Some(rs) => statements.push(QfxStatement::from_raw(rs.account, rs.bank_transaction_list)?),
                None => tracing::warn!("skipping credit card statement response without CCSTMTRS"),
            }
        }

        for response in ofx.inv_msgs.map(|i| i.inv_stmt_trn_rs).unwrap_or_default() {
            match response.inv_stmt_rs {
                Some(rs) => statements.push(QfxStatement::from_raw(
                    rs.account,
                    rs.inv_transaction_list.map(Into::into),
                )?),
                None => tracing::warn!("skipping investment statement response without INVSTMTRS"),
            }
        }

        if statements.is_empty() {
            tracing::debug!("OFX document carries no bank, credit card or investment statements");
        }

        Ok(statements)
    }
}

/// Elements that only ever hold text. In SGML they may appear with no value,
/// which has no XML equivalent; such empty elements are dropped.
const LEAF_ELEMENTS: &[&str] = &[
    "CODE", "SEVERITY", "MESSAGE", "DTSERVER", "LANGUAGE", "ORG", "FID", "TRNUID", "CURDEF",
    "BANKID", "BRANCHID", "ACCTID", "ACCTTYPE", "ACCTKEY", "DTSTART", "DTEND", "TRNTYPE",
    "DTPOSTED", "DTUSER", "DTAVAIL", "TRNAMT", "FITID", "CORRECTFITID", "CORRECTACTION",
    "SRVRTID", "CHECKNUM", "REFNUM", "SIC", "PAYEEID", "NAME", "MEMO", "INTU.BID",
    "INTU.USERID", "DTPROFUP", "DTACCTUP", "DTASOF", "BALAMT", "CLTCOOKIE", "BROKERID",
    "SUBACCTFUND", "EXTDNAME",
];

fn is_leaf(name: &str) -> bool {
    LEAF_ELEMENTS.contains(&name.to_uppercase().as_str())
}

/// Escapes `&` unless it starts one of the XML predefined or numeric entity
/// references. `<` cannot occur in text.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        if c == '&' && !starts_entity(&text[i + 1..]) {
            escaped.push_str("&amp;");
        } else {
            escaped.push(c);
        }
    }
    escaped
}

fn starts_entity(rest: &str) -> bool {
    let Some(end) = rest.find(';') else {
        return false;
    };
    let name = &rest[..end];
    match name.strip_prefix('#') {
        Some(num) => match num.strip_prefix(['x', 'X']) {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()),
        },
        None => matches!(name, "amp" | "lt" | "gt" | "quot" | "apos"),
    }
}

/// Rewrites SGML OFX (v1.x) into well-formed XML.
///
/// A start tag followed directly by text is a leaf element and gets its end
/// tag inserted, unless the source already closes it. Works whether elements
/// sit one per line or run together on a single line.
fn convert_sgml_to_xml(content: &str) -> Result<String, String> {
    let ofx_start = content.find("<OFX>").ok_or("Missing <OFX> tag")?;
    let mut rest = &content[ofx_start..];

    let mut result = String::with_capacity(rest.len() + rest.len() / 4);
    // Most recent start tag with nothing after it yet: (name, offset in `result`).
    let mut pending: Option<(&str, usize)> = None;

    while let Some(lt) = rest.find('<') {
        let gt = rest[lt..]
            .find('>')
            .map(|i| lt + i)
            .ok_or("Unterminated tag")?;
        let text = rest[..lt].trim();
        let tag = rest[lt + 1..gt].trim();
        rest = &rest[gt + 1..];

        if tag.starts_with('?') || tag.starts_with('!') {
            continue;
        }

        let closing = tag.strip_prefix('/').map(str::trim);
        let name = closing.unwrap_or_else(|| {
            tag.split(|c: char| c.is_whitespace())
                .next()
                .unwrap_or(tag)
        });

        if let Some((open, start)) = pending.take() {
            let closes_open = closing == Some(open);
            if !text.is_empty() {
                result.push_str(&escape_text(text));
                if !closes_open {
                    result.push_str(&format!("</{}>", open));
                }
            } else if is_leaf(open) || (closing.is_some() && !closes_open) {
                // Empty leaf: drop it along with any explicit end tag. An
                // unknown element directly followed by its parent's end tag
                // cannot be an aggregate.
                result.truncate(start);
                if closes_open {
                    continue;
                }
            }
        } else if !text.is_empty() {
            result.push_str(&escape_text(text));
        }

        let start = result.len();
        result.push('<');
        result.push_str(tag);
        result.push('>');
        match closing {
            Some(_) => result.push('\n'),
            None => pending = Some((name, start)),
        }
    }

    Ok(result)
}
