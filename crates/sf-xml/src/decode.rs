//! XML element → XmlValue decoding.

use crate::error::{Result, XmlError};
use crate::tree::{XmlElement, XmlNode};
use crate::value::{XmlMap, XmlValue};
use crate::TYPE_KEY;

/// Decode an element into an [`XmlValue`].
///
/// Same-named siblings are coalesced into a repeated field in document
/// order; SOAP responses always group them contiguously. Any child that is
/// neither character data nor an element fails with
/// [`XmlError::UnexpectedNode`].
pub fn decode(element: &XmlElement) -> Result<XmlValue> {
    if element.xsi_attribute("nil") == Some("true") {
        return Ok(XmlValue::Null);
    }

    let mut map = XmlMap::new();
    if let Some(type_name) = element.xsi_attribute("type") {
        map.insert(TYPE_KEY, XmlValue::Scalar(type_name.to_string()));
    }

    let mut text = String::new();
    let mut has_elements = false;

    for child in &element.children {
        match child {
            XmlNode::Text(data) => text.push_str(data),
            XmlNode::Element(inner) => {
                has_elements = true;
                map.push(inner.local_name.clone(), decode(inner)?);
            }
            XmlNode::Comment(_) => return Err(XmlError::UnexpectedNode("comment")),
            XmlNode::ProcessingInstruction(_) => {
                return Err(XmlError::UnexpectedNode("processing instruction"))
            }
        }
    }

    if has_elements {
        return Ok(XmlValue::Complex(map));
    }
    Ok(XmlValue::Scalar(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode, parse, XmlField};

    const NS: &str = r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns="urn:partner.soap.sforce.com""#;

    fn round_trip(value: &XmlValue) -> XmlValue {
        let xml = encode("root", NS, value).unwrap();
        decode(&parse(&xml).unwrap()).unwrap()
    }

    #[test]
    fn test_round_trip_nested_structure() {
        let value = XmlValue::from(
            XmlMap::new()
                .with("done", "true")
                .with("queryLocator", XmlValue::Null)
                .with(
                    "records",
                    XmlMap::new()
                        .with_type("sf:sObject")
                        .with("Id", "001xx000003DGb2AAG")
                        .with(
                            "Owner",
                            XmlMap::new().with_type("sf:sObject").with("Name", "Ada"),
                        ),
                )
                .with("size", "1"),
        );
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_repeated_tags_round_trip_as_array() {
        let items = vec![
            XmlValue::from("A"),
            XmlValue::from("B"),
            XmlValue::from("C"),
        ];
        let value = XmlValue::from(XmlMap::new().with("child", items.clone()));
        let decoded = round_trip(&value);
        assert_eq!(decoded.get("child"), Some(&XmlField::Many(items)));
    }

    #[test]
    fn test_single_child_is_not_wrapped() {
        let value = XmlValue::from(XmlMap::new().with("child", "A"));
        let decoded = round_trip(&value);
        assert_eq!(decoded.get("child"), Some(&XmlField::One("A".into())));
    }

    #[test]
    fn test_two_occurrences_become_pair() {
        let root = parse("<r><x>1</x><x>2</x></r>").unwrap();
        let decoded = decode(&root).unwrap();
        assert_eq!(
            decoded.get("x"),
            Some(&XmlField::Many(vec!["1".into(), "2".into()]))
        );
    }

    #[test]
    fn test_nil_wins_over_other_attributes() {
        let xml = r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="sf:sObject" xsi:nil="true"><Id>1</Id></r>"#;
        assert_eq!(decode(&parse(xml).unwrap()).unwrap(), XmlValue::Null);

        let encoded = encode("r", NS, &XmlValue::Null).unwrap();
        assert!(encoded.contains(r#"xsi:nil="true"/>"#));
        assert_eq!(decode(&parse(&encoded).unwrap()).unwrap(), XmlValue::Null);
    }

    #[test]
    fn test_nil_false_is_ignored() {
        let xml = r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="false">v</r>"#;
        assert_eq!(decode(&parse(xml).unwrap()).unwrap(), XmlValue::from("v"));
    }

    #[test]
    fn test_leaf_without_children_decodes_to_text() {
        assert_eq!(
            decode(&parse("<r></r>").unwrap()).unwrap(),
            XmlValue::from("")
        );
        assert_eq!(
            decode(&parse("<r>  spaced  </r>").unwrap()).unwrap(),
            XmlValue::from("  spaced  ")
        );
    }

    #[test]
    fn test_mixed_content_prefers_elements() {
        let decoded = decode(&parse("<r>\n  <a>1</a>\n</r>").unwrap()).unwrap();
        assert_eq!(decoded, XmlValue::from(XmlMap::new().with("a", "1")));
    }

    #[test]
    fn test_type_tagged_leaf_is_its_text() {
        let xml = r#"<records xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:sf="urn:sobject.partner.soap.sforce.com" xsi:type="sf:sObject"><sf:expr0 xsi:type="xsd:int">5</sf:expr0></records>"#;
        let decoded = decode(&parse(xml).unwrap()).unwrap();

        assert_eq!(decoded.type_tag(), Some("sf:sObject"));
        let expr = decoded.get("expr0").and_then(XmlField::as_value).unwrap();
        assert_eq!(expr, &XmlValue::from("5"));
        assert_eq!(expr.as_str(), Some("5"));

        let empty = parse(r#"<v xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="xsd:string"/>"#).unwrap();
        assert_eq!(decode(&empty).unwrap(), XmlValue::from(""));
    }

    #[test]
    fn test_child_keys_use_local_names() {
        let xml = r#"<r xmlns:sf="urn:sobject.partner.soap.sforce.com"><sf:Id>1</sf:Id><sf:Id>2</sf:Id></r>"#;
        let decoded = decode(&parse(xml).unwrap()).unwrap();
        assert_eq!(decoded.get("Id").map(XmlField::len), Some(2));
    }

    #[test]
    fn test_unexpected_node_is_fatal() {
        let root = parse("<r><a>1</a><!-- hidden --></r>").unwrap();
        assert_eq!(decode(&root), Err(XmlError::UnexpectedNode("comment")));

        let root = parse("<r><?target data?></r>").unwrap();
        assert_eq!(
            decode(&root),
            Err(XmlError::UnexpectedNode("processing instruction"))
        );
    }
}
