//! OGC exception report parsing.
//!
//! Handles both the WMS/WFS 1.0 `ServiceExceptionReport` layout and the OWS
//! `ExceptionReport` layout used by WFS 1.1.0 and later.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::OgcError;
use crate::xml::{attribute, local_name, root_element};

/// Exception code used when the server does not supply one.
pub const NO_APPLICABLE_CODE: &str = "NoApplicableCode";

/// Whether a root element name denotes an exception report.
pub fn is_exception_report(root: &str) -> bool {
    matches!(root, "ServiceExceptionReport" | "ExceptionReport")
}

/// Turn an exception report document into an `OgcError::ServiceException`.
///
/// Returns `None` when `xml` is not an exception report. Only the first
/// exception in the report is kept.
pub fn parse_exception_report(xml: &str) -> Option<OgcError> {
    let root = root_element(xml, "exception report").ok()?;
    if !is_exception_report(&root) {
        return None;
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut code: Option<String> = None;
    let mut message = String::new();
    let mut collecting = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.local_name().as_ref()).as_str() {
                "ServiceException" => {
                    code = attribute(&e, "code");
                    collecting = true;
                }
                "Exception" => {
                    code = attribute(&e, "exceptionCode");
                }
                "ExceptionText" => collecting = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                let name = local_name(e.local_name().as_ref());
                if name == "ServiceException" {
                    code = attribute(&e, "code");
                    break;
                }
                if name == "Exception" {
                    code = attribute(&e, "exceptionCode");
                    break;
                }
            }
            Ok(Event::Text(t)) if collecting => {
                if let Ok(text) = t.unescape() {
                    message.push_str(&text);
                }
            }
            Ok(Event::CData(c)) if collecting => {
                message.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.local_name().as_ref());
                if collecting && (name == "ServiceException" || name == "ExceptionText") {
                    break;
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    let message = message.trim();
    Some(OgcError::ServiceException {
        code: code.unwrap_or_else(|| NO_APPLICABLE_CODE.to_string()),
        message: if message.is_empty() {
            "exception report without message".to_string()
        } else {
            message.to_string()
        },
    })
}
