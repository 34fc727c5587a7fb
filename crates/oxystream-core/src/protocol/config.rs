//! Channel-scaling extraction from the XML config sub-record.
//!
//! The scaling table is correlated with sample sub-records purely by
//! arrival order: the Nth sync/async sub-record of the session reads the
//! Nth entry appended here. No channel name or id ties the two together
//! on the wire, so the parse is strictly positional over the document
//! order of `<ChannelInfo>` children.

use tracing::warn;

use super::error::ProtocolError;
use crate::ScalingEntry;

/// Parse one channel config document into ordered scaling entries.
///
/// Each child of the `<ChannelInfo>` root describes one channel; the
/// child's first nested element may carry `factor` and `offset`
/// attributes, defaulting to 1.0 and 0.0 when absent. A root with another
/// tag contributes no entries. Malformed attribute text falls back to the
/// defaults with a warning so the positional table stays aligned.
///
/// # Errors
/// Returns `ProtocolError::ConfigXml` when the document is not
/// well-formed XML.
pub fn parse_channel_scaling(xml: &str) -> Result<Vec<ScalingEntry>, ProtocolError> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "ChannelInfo" {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for channel in root.children().filter(|node| node.is_element()) {
        let scaling = channel.children().find(|node| node.is_element());
        let entry = match scaling {
            Some(node) => ScalingEntry {
                factor: parse_attribute(node.attribute("factor"), 1.0, "factor"),
                offset: parse_attribute(node.attribute("offset"), 0.0, "offset"),
            },
            None => {
                warn!(
                    channel = channel.tag_name().name(),
                    "channel has no scaling element, using identity"
                );
                ScalingEntry::default()
            }
        };
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_attribute(value: Option<&str>, default: f64, name: &str) -> f64 {
    match value {
        None => default,
        Some(text) => text.parse().unwrap_or_else(|_| {
            warn!(attribute = name, text, "non-numeric scaling attribute, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_channel_scaling;

    #[test]
    fn entries_follow_document_order() {
        let xml = r#"<ChannelInfo>
            <Channel name="AI 1/1"><Scaling factor="2.5" offset="-1.0"/></Channel>
            <Channel name="AI 1/2"><Scaling factor="0.5" offset="3.0"/></Channel>
        </ChannelInfo>"#;
        let entries = parse_channel_scaling(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].factor, 2.5);
        assert_eq!(entries[0].offset, -1.0);
        assert_eq!(entries[1].factor, 0.5);
        assert_eq!(entries[1].offset, 3.0);
    }

    #[test]
    fn missing_attributes_default_to_identity() {
        let xml = r#"<ChannelInfo>
            <Channel><Scaling offset="4.0"/></Channel>
            <Channel><Scaling factor="7.0"/></Channel>
            <Channel><Scaling/></Channel>
        </ChannelInfo>"#;
        let entries = parse_channel_scaling(xml).unwrap();
        assert_eq!(entries[0].factor, 1.0);
        assert_eq!(entries[0].offset, 4.0);
        assert_eq!(entries[1].factor, 7.0);
        assert_eq!(entries[1].offset, 0.0);
        assert_eq!(entries[2].factor, 1.0);
        assert_eq!(entries[2].offset, 0.0);
    }

    #[test]
    fn channel_without_scaling_element_keeps_table_aligned() {
        let xml = r#"<ChannelInfo>
            <Channel/>
            <Channel><Scaling factor="2.0"/></Channel>
        </ChannelInfo>"#;
        let entries = parse_channel_scaling(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].factor, 1.0);
        assert_eq!(entries[1].factor, 2.0);
    }

    #[test]
    fn non_numeric_attribute_falls_back_to_default() {
        let xml = r#"<ChannelInfo><Channel><Scaling factor="abc"/></Channel></ChannelInfo>"#;
        let entries = parse_channel_scaling(xml).unwrap();
        assert_eq!(entries[0].factor, 1.0);
    }

    #[test]
    fn foreign_root_contributes_nothing() {
        let entries = parse_channel_scaling("<Other><Channel/></Other>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_channel_scaling("<ChannelInfo><unclosed>").is_err());
    }
}
