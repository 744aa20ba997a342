//! Compliance score extraction from the XCCDF results document
//!
//! Best effort: any read or parse problem is logged and yields `None`.

use std::path::Path;

/// Score of the first `score` element, normalized to end in `%`
pub async fn parse_audit_score(xml_path: &Path) -> Option<String> {
    let content = match tokio::fs::read_to_string(xml_path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(path = ?xml_path, error = %e, "Could not read audit results");
            return None;
        }
    };

    match extract_score(&content) {
        Ok(score) => score,
        Err(e) => {
            tracing::error!(path = ?xml_path, error = %e, "XML parsing failed");
            None
        }
    }
}

fn extract_score(content: &str) -> Result<Option<String>, roxmltree::Error> {
    let doc = roxmltree::Document::parse(content)?;

    let score = doc
        .descendants()
        .find(|node| node.is_element() && node.tag_name().name() == "score")
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| {
            if text.ends_with('%') {
                text.to_string()
            } else {
                format!("{text}%")
            }
        });

    Ok(score)
}
