//! Small helpers over the quick-xml event reader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OgcError, OgcResult};

/// Local (namespace-stripped) element or attribute name.
pub(crate) fn local_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

/// Look up an attribute by local name, ignoring any namespace prefix.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name.as_bytes())
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Local name of the document's root element.
pub(crate) fn root_element(xml: &str, document: &'static str) -> OgcResult<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(local_name(e.local_name().as_ref()));
            }
            Ok(Event::Eof) => {
                return Err(OgcError::Xml {
                    document,
                    message: "document has no root element".to_string(),
                })
            }
            Err(e) => return Err(xml_error(document, &reader, e)),
            _ => {}
        }
    }
}

pub(crate) fn xml_error<R>(
    document: &'static str,
    reader: &Reader<R>,
    err: quick_xml::Error,
) -> OgcError {
    OgcError::Xml {
        document,
        message: format!("{} at position {}", err, reader.buffer_position()),
    }
}
