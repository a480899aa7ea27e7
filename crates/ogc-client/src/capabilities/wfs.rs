//! WFS GetCapabilities parsing.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::debug;

use super::expect_root;
use crate::error::OgcResult;
use crate::xml::{attribute, local_name, xml_error};

const DOCUMENT: &str = "WFS capabilities";

/// A feature type advertised in `FeatureTypeList`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureType {
    /// Type name as advertised, including any namespace prefix (e.g. "topp:states")
    pub name: String,
    pub title: Option<String>,
}

/// The parts of a WFS capabilities document the probe relies on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WfsCapabilities {
    /// `version` attribute of the root element
    pub version: Option<String>,
    /// Feature types keyed by name, in document order
    pub feature_types: Vec<FeatureType>,
}

impl WfsCapabilities {
    /// Number of distinct feature type names.
    pub fn layer_count(&self) -> usize {
        self.feature_types.len()
    }

    /// Exact, case-sensitive name lookup.
    pub fn contains(&self, name: &str) -> bool {
        self.feature_types.iter().any(|ft| ft.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.feature_types.iter().map(|ft| ft.name.as_str())
    }

    // Later duplicates replace earlier entries but keep the original position
    fn insert(&mut self, feature_type: FeatureType) {
        match self
            .feature_types
            .iter_mut()
            .find(|ft| ft.name == feature_type.name)
        {
            Some(existing) => *existing = feature_type,
            None => self.feature_types.push(feature_type),
        }
    }
}

/// Parse a WFS capabilities document (1.0.0, 1.1.0 or 2.0.0).
///
/// Namespace prefixes on element names are ignored. Exception reports are
/// returned as `OgcError::ServiceException`.
pub fn parse_wfs_capabilities(xml: &str) -> OgcResult<WfsCapabilities> {
    expect_root(xml, DOCUMENT, &["WFS_Capabilities"])?;

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut caps = WfsCapabilities::default();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<FeatureType> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(e.local_name().as_ref());
                if path.is_empty() {
                    caps.version = attribute(&e, "version");
                }
                if name == "FeatureType" {
                    current = Some(FeatureType {
                        name: String::new(),
                        title: None,
                    });
                }
                text.clear();
                path.push(name);
            }
            Ok(Event::Text(t)) => {
                text.push_str(&t.unescape().map_err(|e| xml_error(DOCUMENT, &reader, e))?);
            }
            Ok(Event::CData(c)) => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::End(_)) => {
                let name = path.pop().unwrap_or_default();
                let parent = path.last().map(String::as_str);

                match (name.as_str(), parent) {
                    ("Name", Some("FeatureType")) => {
                        if let Some(ft) = current.as_mut() {
                            ft.name = text.trim().to_string();
                        }
                    }
                    ("Title", Some("FeatureType")) => {
                        if let Some(ft) = current.as_mut() {
                            ft.title = Some(text.trim().to_string());
                        }
                    }
                    ("FeatureType", _) => {
                        if let Some(ft) = current.take() {
                            if !ft.name.is_empty() {
                                caps.insert(ft);
                            }
                        }
                    }
                    _ => {}
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(DOCUMENT, &reader, e)),
            _ => {}
        }
    }

    debug!(
        version = caps.version.as_deref().unwrap_or("unknown"),
        feature_types = caps.layer_count(),
        "Parsed WFS capabilities"
    );
    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OgcError;

    const WFS_110: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:WFS_Capabilities version="1.1.0" xmlns:wfs="http://www.opengis.net/wfs" xmlns:ows="http://www.opengis.net/ows">
  <ows:ServiceIdentification><ows:Title>Demo</ows:Title></ows:ServiceIdentification>
  <FeatureTypeList>
    <FeatureType>
      <Name>topp:states</Name>
      <Title>USA Population</Title>
    </FeatureType>
    <FeatureType>
      <Name>sf:roads</Name>
    </FeatureType>
    <FeatureType>
      <Name>tiger:poi</Name>
      <Title><![CDATA[Points & places]]></Title>
    </FeatureType>
  </FeatureTypeList>
</wfs:WFS_Capabilities>"#;

    #[test]
    fn test_parse_wfs_110() {
        let caps = parse_wfs_capabilities(WFS_110).unwrap();
        assert_eq!(caps.version.as_deref(), Some("1.1.0"));
        assert_eq!(caps.layer_count(), 3);
        assert_eq!(
            caps.names().collect::<Vec<_>>(),
            vec!["topp:states", "sf:roads", "tiger:poi"]
        );
        assert_eq!(caps.feature_types[0].title.as_deref(), Some("USA Population"));
        assert_eq!(caps.feature_types[2].title.as_deref(), Some("Points & places"));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let caps = parse_wfs_capabilities(WFS_110).unwrap();
        assert!(caps.contains("topp:states"));
        assert!(!caps.contains("TOPP:STATES"));
        assert!(!caps.contains("states"));
    }

    #[test]
    fn test_duplicate_names_count_once() {
        let xml = r#"<WFS_Capabilities version="1.0.0"><FeatureTypeList>
            <FeatureType><Name>a</Name><Title>first</Title></FeatureType>
            <FeatureType><Name>b</Name></FeatureType>
            <FeatureType><Name>a</Name><Title>second</Title></FeatureType>
        </FeatureTypeList></WFS_Capabilities>"#;

        let caps = parse_wfs_capabilities(xml).unwrap();
        assert_eq!(caps.layer_count(), 2);
        assert_eq!(caps.feature_types[0].title.as_deref(), Some("second"));
    }

    #[test]
    fn test_empty_feature_type_list() {
        let xml = r#"<WFS_Capabilities version="2.0.0"><FeatureTypeList/></WFS_Capabilities>"#;
        let caps = parse_wfs_capabilities(xml).unwrap();
        assert_eq!(caps.layer_count(), 0);
    }

    #[test]
    fn test_exception_report_becomes_error() {
        let xml = r#"<ServiceExceptionReport><ServiceException code="InvalidParameterValue">bad version</ServiceException></ServiceExceptionReport>"#;
        let err = parse_wfs_capabilities(xml).unwrap_err();
        assert_eq!(err.exception_code(), Some("InvalidParameterValue"));
    }

    #[test]
    fn test_wrong_document_type() {
        let err = parse_wfs_capabilities("<WMT_MS_Capabilities/>").unwrap_err();
        assert!(matches!(err, OgcError::UnexpectedDocument { .. }));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_wfs_capabilities("<WFS_Capabilities><FeatureTypeList></WFS_Capabilities>")
            .unwrap_err();
        assert!(matches!(err, OgcError::Xml { .. }));
    }
}
