//! XmlValue → XML serialization.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, XmlError};
use crate::value::{XmlField, XmlMap, XmlValue};
use crate::{TEXT_KEY, TYPE_KEY, XSI_NAMESPACE};

/// Serialize `value` under a synthetic `root_tag` element.
///
/// `namespace_attrs` is copied verbatim into the root start tag and must
/// begin with whitespace, e.g. `r#" xmlns:xsi="...""#`. Child elements never
/// carry namespace declarations of their own, so whatever the root declares
/// (including a default namespace) stays in effect for the whole fragment.
/// When `namespace_attrs` does not declare the `xsi` prefix, it is added so
/// `xsi:nil` and `xsi:type` attributes always resolve.
pub fn encode(root_tag: &str, namespace_attrs: &str, value: &XmlValue) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut content = format!("{root_tag}{namespace_attrs}");
    if !namespace_attrs.contains("xmlns:xsi=") {
        content.push_str(&format!(r#" xmlns:xsi="{XSI_NAMESPACE}""#));
    }
    let root = BytesStart::from_content(content, root_tag.len());
    write_element(&mut writer, root, root_tag, value)?;

    String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    mut start: BytesStart<'_>,
    tag: &str,
    value: &XmlValue,
) -> Result<()> {
    match value {
        XmlValue::Null => {
            start.push_attribute(("xsi:nil", "true"));
            write(writer, Event::Empty(start))
        }
        XmlValue::Scalar(text) => {
            write(writer, Event::Start(start))?;
            write(writer, Event::Text(BytesText::new(text)))?;
            write(writer, Event::End(BytesEnd::new(tag)))
        }
        XmlValue::Complex(map) => write_complex(writer, start, tag, map),
    }
}

fn write_complex(
    writer: &mut Writer<Vec<u8>>,
    mut start: BytesStart<'_>,
    tag: &str,
    map: &XmlMap,
) -> Result<()> {
    let mut inline_text: Option<&str> = None;

    for (key, field) in map.iter() {
        match key {
            TYPE_KEY => match field.as_value() {
                Some(XmlValue::Scalar(type_name)) => {
                    start.push_attribute(("xsi:type", type_name.as_str()));
                }
                _ => return Err(XmlError::InvalidTypeTag(key.to_string())),
            },
            TEXT_KEY => match field.as_value() {
                Some(XmlValue::Null) => start.push_attribute(("xsi:nil", "true")),
                Some(XmlValue::Scalar(text)) => inline_text = Some(text),
                _ => return Err(XmlError::InvalidInlineValue(tag.to_string())),
            },
            _ => {}
        }
    }

    write(writer, Event::Start(start))?;
    if let Some(text) = inline_text {
        write(writer, Event::Text(BytesText::new(text)))?;
    }

    for (key, field) in map.iter() {
        if key == TYPE_KEY || key == TEXT_KEY {
            continue;
        }
        match field {
            XmlField::One(child) => write_element(writer, BytesStart::new(key), key, child)?,
            XmlField::Many(children) => {
                for child in children {
                    write_element(writer, BytesStart::new(key), key, child)?;
                }
            }
        }
    }

    write(writer, Event::End(BytesEnd::new(tag)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}
