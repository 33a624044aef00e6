//! Worksheet XML the model does not interpret, carried verbatim through a load/save cycle.
//!
//! Views, print settings, conditional formats, validations, filters and hyperlinks
//! are captured as raw XML when a sheet is read and written back at their schema
//! position. Elements that point at package parts which are not carried (drawings,
//! tables, comments, controls) are dropped.

use std::io::{BufRead, Cursor};

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::{Result, SheetfmtError};

/// Children of `<worksheet>` in CT_Worksheet sequence order.
pub const WORKSHEET_CHILD_ORDER: &[&str] = &[
    "sheetPr",
    "dimension",
    "sheetViews",
    "sheetFormatPr",
    "cols",
    "sheetData",
    "sheetCalcPr",
    "sheetProtection",
    "protectedRanges",
    "scenarios",
    "autoFilter",
    "sortState",
    "dataConsolidate",
    "customSheetViews",
    "mergeCells",
    "phoneticPr",
    "conditionalFormatting",
    "dataValidations",
    "hyperlinks",
    "printOptions",
    "pageMargins",
    "pageSetup",
    "headerFooter",
    "rowBreaks",
    "colBreaks",
    "customProperties",
    "cellWatches",
    "ignoredErrors",
    "smartTags",
    "drawing",
    "legacyDrawing",
    "legacyDrawingHF",
    "picture",
    "oleObjects",
    "controls",
    "webPublishItems",
    "tableParts",
    "extLst",
];

/// Worksheet children that are kept as raw XML.
const PRESERVED_CHILDREN: &[&[u8]] = &[
    b"sheetPr",
    b"sheetViews",
    b"sheetFormatPr",
    b"sheetCalcPr",
    b"sheetProtection",
    b"protectedRanges",
    b"scenarios",
    b"autoFilter",
    b"sortState",
    b"dataConsolidate",
    b"customSheetViews",
    b"phoneticPr",
    b"conditionalFormatting",
    b"dataValidations",
    b"hyperlinks",
    b"printOptions",
    b"pageMargins",
    b"pageSetup",
    b"headerFooter",
    b"rowBreaks",
    b"colBreaks",
    b"cellWatches",
    b"ignoredErrors",
    b"smartTags",
    b"webPublishItems",
];

/// styles.xml children kept as raw XML, in stylesheet order.
pub(crate) const PRESERVED_STYLE_CHILDREN: &[&[u8]] = &[b"dxfs", b"tableStyles", b"colors"];

pub(crate) fn is_preserved_child(local_name: &[u8]) -> bool {
    PRESERVED_CHILDREN.contains(&local_name)
}

/// One entry of a `.rels` part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `TargetMode="External"`, as used by hyperlinks.
    pub external: bool,
}

/// A worksheet child captured verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreservedElement {
    /// Local name, e.g. `pageSetup`.
    pub name: String,
    pub xml: String,
}

/// Everything about a worksheet part that is re-emitted as it was read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreservedXml {
    /// Attributes of the `<worksheet>` root other than the default and `r`
    /// namespace declarations, values still escaped.
    pub root_attributes: Vec<(String, String)>,
    pub elements: Vec<PreservedElement>,
    /// Sheet relationships the kept `<hyperlink>` elements point at.
    pub hyperlinks: Vec<Relationship>,
}

impl PreservedXml {
    pub fn contains(&self, name: &str) -> bool {
        self.elements.iter().any(|el| el.name == name)
    }

    /// Kept elements with this local name, in document order.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PreservedElement> {
        self.elements.iter().filter(move |el| el.name == name)
    }
}

/// Root attributes worth re-declaring: namespace prefixes used by kept elements,
/// `mc:Ignorable` and the like.
pub(crate) fn root_attributes(e: &BytesStart) -> Vec<(String, String)> {
    e.attributes()
        .flatten()
        .filter(|attr| !matches!(attr.key.as_ref(), b"xmlns" | b"xmlns:r"))
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect()
}

fn is_relationship_id(key: QName) -> bool {
    key.prefix().is_some() && key.local_name().as_ref() == b"id"
}

/// Copy of `e` without prefixed `id` attributes, which point into the sheet's
/// relationships. Hyperlinks keep theirs and report it through `rel_ids`.
fn without_relationship_ids(e: &BytesStart, rel_ids: &mut Vec<String>) -> BytesStart<'static> {
    if e.local_name().as_ref() == b"hyperlink" {
        for attr in e.attributes().flatten().filter(|attr| is_relationship_id(attr.key)) {
            rel_ids.push(String::from_utf8_lossy(&attr.value).into_owned());
        }
        return e.clone().into_owned();
    }
    let mut out = BytesStart::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    out.extend_attributes(e.attributes().flatten().filter(|attr| !is_relationship_id(attr.key)));
    out
}

/// Re-serialize `first` and everything up to its matching end tag.
pub(crate) fn capture_element<B: BufRead>(
    reader: &mut Reader<B>,
    first: Event<'static>,
    buf: &mut Vec<u8>,
    rel_ids: &mut Vec<String>,
) -> Result<PreservedElement> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let name = match &first {
        Event::Start(e) | Event::Empty(e) => String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        _ => String::new(),
    };
    match first {
        Event::Empty(e) => writer.write_event(Event::Empty(without_relationship_ids(&e, rel_ids)))?,
        Event::Start(e) => {
            writer.write_event(Event::Start(without_relationship_ids(&e, rel_ids)))?;
            let mut depth: usize = 0;
            loop {
                let event = reader.read_event_into(buf).map_err(|e| {
                    SheetfmtError::ParseError(format!("XML parsing error in <{}>: {}", name, e))
                })?;
                match event {
                    Event::Start(e) => {
                        depth += 1;
                        writer.write_event(Event::Start(without_relationship_ids(&e, rel_ids)))?;
                    }
                    Event::Empty(e) => {
                        writer.write_event(Event::Empty(without_relationship_ids(&e, rel_ids)))?;
                    }
                    Event::End(e) => {
                        writer.write_event(Event::End(e.into_owned()))?;
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                    Event::Eof => break,
                    other => writer.write_event(other.into_owned())?,
                }
                buf.clear();
            }
        }
        _ => {}
    }

    let bytes = writer.into_inner().into_inner();
    Ok(PreservedElement {
        name,
        xml: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture_first(xml: &str) -> (PreservedElement, Vec<String>) {
        let mut reader = Reader::from_reader(Cursor::new(xml.as_bytes()));
        let mut buf = Vec::new();
        let first = loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) => break Event::Start(e.into_owned()),
                Event::Empty(e) => break Event::Empty(e.into_owned()),
                Event::Eof => panic!("no element"),
                _ => {}
            }
        };
        buf.clear();
        let mut ids = Vec::new();
        let element = capture_element(&mut reader, first, &mut buf, &mut ids).unwrap();
        (element, ids)
    }

    #[test]
    fn test_capture_nested_element() {
        let (element, ids) = capture_first(
            r#"<sheetViews><sheetView workbookViewId="0"><pane ySplit="1" topLeftCell="A2" state="frozen"/><sheetView/></sheetView></sheetViews><after/>"#,
        );
        assert_eq!(element.name, "sheetViews");
        assert_eq!(
            element.xml,
            r#"<sheetViews><sheetView workbookViewId="0"><pane ySplit="1" topLeftCell="A2" state="frozen"/><sheetView/></sheetView></sheetViews>"#
        );
        assert!(ids.is_empty());
    }

    #[test]
    fn test_relationship_ids_dropped_except_hyperlinks() {
        let (element, ids) = capture_first(r#"<pageSetup orientation="landscape" r:id="rId3"/>"#);
        assert_eq!(element.xml, r#"<pageSetup orientation="landscape"/>"#);
        assert!(ids.is_empty());

        let (element, ids) = capture_first(
            r#"<hyperlinks><hyperlink ref="A1" r:id="rId2"/><hyperlink ref="A2" location="'Other'!A1"/></hyperlinks>"#,
        );
        assert!(element.xml.contains(r#"<hyperlink ref="A1" r:id="rId2"/>"#));
        assert_eq!(ids, vec!["rId2".to_string()]);
    }

    #[test]
    fn test_schema_order_covers_preserved_children() {
        for name in PRESERVED_CHILDREN {
            let name = std::str::from_utf8(name).unwrap();
            assert!(WORKSHEET_CHILD_ORDER.contains(&name), "{}", name);
        }
        assert!(is_preserved_child(b"pageSetup"));
        assert!(!is_preserved_child(b"drawing"));
        assert!(!is_preserved_child(b"sheetData"));
    }
}
