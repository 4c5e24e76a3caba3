//! XMP packet extraction.
//!
//! The packet is located by a fixed marker, parsed with a namespace-aware
//! streaming reader and searched for the properties listed in
//! [`ExtractedField`]. Properties may appear either as child elements of an
//! `rdf:Description` or as attributes on it.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{LocalName, Namespace, ResolveResult};
use tracing::{debug, warn};

use crate::image_pipeline::metadata::error::MetadataError;
use crate::image_pipeline::metadata::fields::{ExtractedField, XmpFields};

/// Opening marker of the embedded XMP document.
pub const XMP_START_MARKER: &str = "<x:xmpmeta";

/// Byte offset of the first occurrence of [`XMP_START_MARKER`], if any.
pub fn locate_xmp_start(text: &str) -> Option<usize> {
    text.find(XMP_START_MARKER)
}

/// Extracts the known fields from an optional metadata blob.
///
/// Never fails: an absent blob, a blob without the marker and a malformed
/// document all produce an empty mapping.
pub fn extract(blob: Option<&[u8]>) -> XmpFields {
    let Some(blob) = blob else {
        return XmpFields::new();
    };

    let text = String::from_utf8_lossy(blob);
    let Some(start) = locate_xmp_start(&text) else {
        debug!("Metadata blob of {} bytes has no XMP packet", blob.len());
        return XmpFields::new();
    };

    match parse_xmp(&text[start..]) {
        Ok(fields) => {
            debug!("Extracted {} XMP field(s)", fields.len());
            for (field, value) in fields.iter() {
                debug!("  {:?} = {:?}", field, value);
            }
            fields
        }
        Err(e) => {
            warn!("XMP parse failed: {}", e);
            XmpFields::new()
        }
    }
}

/// Element currently collecting text for a field.
struct Capture {
    field: ExtractedField,
    depth: usize,
    text: String,
}

/// Parses an XMP document starting at its root element.
pub fn parse_xmp(xml: &str) -> Result<XmpFields, MetadataError> {
    let mut reader = NsReader::from_str(xml);
    let mut fields = XmpFields::new();
    let mut depth = 0usize;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                depth += 1;
                collect_attributes(&reader, &start, &mut fields)?;

                if capture.is_none() {
                    let (resolved, local) = reader.resolve_element(start.name());
                    if let Some(field) = field_for(resolved, local) {
                        capture = Some(Capture {
                            field,
                            depth,
                            text: String::new(),
                        });
                    }
                }
            }
            Event::Empty(element) => {
                collect_attributes(&reader, &element, &mut fields)?;
            }
            Event::Text(text) => {
                if let Some(c) = capture.as_mut().filter(|c| c.depth == depth) {
                    c.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(c) = capture.as_mut().filter(|c| c.depth == depth) {
                    c.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if let Some(c) = capture.take_if(|c| c.depth == depth) {
                    fields.insert_first(c.field, &c.text);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(MetadataError::Unclosed(depth));
    }

    Ok(fields)
}

fn collect_attributes(
    reader: &NsReader<&[u8]>,
    element: &BytesStart<'_>,
    fields: &mut XmpFields,
) -> Result<(), MetadataError> {
    for attr in element.attributes() {
        let attr = attr?;
        let (resolved, local) = reader.resolve_attribute(attr.key);
        if let Some(field) = field_for(resolved, local) {
            fields.insert_first(field, &attr.unescape_value()?);
        }
    }
    Ok(())
}

fn field_for(resolved: ResolveResult<'_>, local: LocalName<'_>) -> Option<ExtractedField> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => ExtractedField::lookup(ns, local.into_inner()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    const ELEMENT_FORM: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/" x:xmptk="Adobe XMP Core 7.0">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:xmp="http://ns.adobe.com/xap/1.0/"
    xmlns:crs="http://ns.adobe.com/camera-raw-settings/1.0/">
   <xmp:CreateDate>2022-01-01T00:00:00</xmp:CreateDate>
   <xmp:ModifyDate>2022-01-02T00:00:00</xmp:ModifyDate>
   <crs:RawFileName>/Volumes/card/DCIM/DSC_0042.NEF</crs:RawFileName>
   <crs:CameraProfile>Adobe Standard</crs:CameraProfile>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

    const ATTRIBUTE_FORM: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:xmp="http://ns.adobe.com/xap/1.0/"
    xmlns:crs="http://ns.adobe.com/camera-raw-settings/1.0/"
    xmp:CreateDate="2021-06-15T08:00:00+02:00"
    crs:RawFileName="IMG_0001.CR3"/>
 </rdf:RDF>
</x:xmpmeta>"#;

    #[test]
    fn test_absent_blob_is_empty() {
        assert!(extract(None).is_empty());
    }

    #[test]
    fn test_blob_without_marker_is_empty() {
        assert!(extract(Some(b"Exif\0\0II*\0 no xml here")).is_empty());
    }

    #[test]
    fn test_locate_marker() {
        assert_eq!(locate_xmp_start("abc<x:xmpmeta xmlns:x=''/>"), Some(3));
        assert_eq!(locate_xmp_start("<rdf:RDF/>"), None);
    }

    #[test]
    fn test_extracts_element_form() {
        let fields = extract(Some(ELEMENT_FORM.as_bytes()));

        assert_eq!(fields.len(), 4);
        assert_eq!(fields.get(ExtractedField::CreateDate), Some("2022-01-01T00:00:00"));
        assert_eq!(fields.get(ExtractedField::ModifyDate), Some("2022-01-02T00:00:00"));
        assert_eq!(fields.get(ExtractedField::RawFileName), Some("DSC_0042.NEF"));
        assert_eq!(fields.get(ExtractedField::CameraProfileName), Some("Adobe Standard"));
    }

    #[test]
    fn test_extracts_attribute_form() {
        let fields = extract(Some(ATTRIBUTE_FORM.as_bytes()));

        assert_eq!(fields.get(ExtractedField::CreateDate), Some("2021-06-15T08:00:00+02:00"));
        assert_eq!(fields.get(ExtractedField::RawFileName), Some("IMG_0001.CR3"));
        assert_eq!(fields.get(ExtractedField::ModifyDate), None);
    }

    #[test]
    fn test_skips_leading_binary_noise() {
        let mut blob = vec![0xFF, 0xE1, 0x00, 0xC3, 0x80];
        blob.extend_from_slice(b"http://ns.adobe.com/xap/1.0/\0");
        blob.extend_from_slice(ELEMENT_FORM.as_bytes());

        let fields = extract(Some(&blob));
        assert_eq!(fields.get(ExtractedField::ModifyDate), Some("2022-01-02T00:00:00"));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_malformed_xml_is_reported_and_yields_empty() {
        let malformed = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF></x:xmpmeta>"#;

        assert!(parse_xmp(malformed).is_err());

        let log = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .finish();
        let fields = tracing::subscriber::with_default(subscriber, || {
            extract(Some(malformed.as_bytes()))
        });

        assert!(fields.is_empty());
        assert!(log.contents().contains("XMP parse failed"));
    }

    #[test]
    fn test_unclosed_document_is_malformed() {
        let truncated = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF>"#;

        assert!(parse_xmp(truncated).is_err());
        assert!(extract(Some(truncated.as_bytes())).is_empty());
    }

    #[test]
    fn test_empty_element_is_absent() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/" xmlns:xmp="http://ns.adobe.com/xap/1.0/"><xmp:CreateDate></xmp:CreateDate><xmp:ModifyDate/></x:xmpmeta>"#;

        let fields = parse_xmp(xml).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_wrong_namespace_is_ignored() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/" xmlns:xmp="http://example.com/other/"><xmp:CreateDate>2022-01-01T00:00:00</xmp:CreateDate></x:xmpmeta>"#;

        assert!(parse_xmp(xml).unwrap().is_empty());
    }

    #[test]
    fn test_nested_text_is_not_captured() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/" xmlns:crs="http://ns.adobe.com/camera-raw-settings/1.0/" xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><crs:CameraProfile><rdf:Alt><rdf:li>Nested</rdf:li></rdf:Alt></crs:CameraProfile></x:xmpmeta>"#;

        let fields = parse_xmp(xml).unwrap();
        assert_eq!(fields.get(ExtractedField::CameraProfileName), None);
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/" xmlns:crs="http://ns.adobe.com/camera-raw-settings/1.0/"><crs:CameraProfile>Camera &amp; Lens</crs:CameraProfile></x:xmpmeta>"#;

        let fields = parse_xmp(xml).unwrap();
        assert_eq!(fields.get(ExtractedField::CameraProfileName), Some("Camera & Lens"));
    }
}
