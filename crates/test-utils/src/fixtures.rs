//! Canned OGC documents for tests.
//!
//! The documents are deliberately small but keep the element layout real
//! servers use, including namespace prefixes for WFS 1.1.0 and later.

/// Common CRS identifiers.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "EPSG:4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";
}

/// Common bounding boxes as (min_x, min_y, max_x, max_y).
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: [f64; 4] = [-180.0, -90.0, 180.0, 90.0];

    /// Continental United States bounding box
    pub const CONUS: [f64; 4] = [-130.0, 20.0, -60.0, 55.0];
}

/// A WMS layer to advertise in a mock capabilities document.
#[derive(Debug, Clone, PartialEq)]
pub struct MockLayer {
    pub name: String,
    pub crs: Vec<String>,
    pub bbox: Option<(String, [f64; 4])>,
}

impl MockLayer {
    /// Layer in EPSG:4326 covering the globe.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crs: vec![crs::EPSG_4326.to_string()],
            bbox: Some((crs::EPSG_4326.to_string(), bbox::GLOBAL)),
        }
    }

    pub fn with_crs(mut self, codes: &[&str]) -> Self {
        self.crs = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_bbox(mut self, crs: &str, edges: [f64; 4]) -> Self {
        self.bbox = Some((crs.to_string(), edges));
        self
    }

    pub fn without_bbox(mut self) -> Self {
        self.bbox = None;
        self
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// WFS capabilities advertising `names` as feature types.
pub fn wfs_capabilities_xml(version: &str, names: &[&str]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <wfs:WFS_Capabilities version=\"{}\" xmlns:wfs=\"http://www.opengis.net/wfs\" \
         xmlns:ows=\"http://www.opengis.net/ows\">\n\
         <ows:ServiceIdentification><ows:Title>Mock WFS</ows:Title></ows:ServiceIdentification>\n\
         <wfs:FeatureTypeList>\n",
        escape(version)
    );
    for name in names {
        xml.push_str(&format!(
            "  <wfs:FeatureType><wfs:Name>{0}</wfs:Name><wfs:Title>{0} title</wfs:Title>\
             <ows:WGS84BoundingBox><ows:LowerCorner>-180 -90</ows:LowerCorner>\
             <ows:UpperCorner>180 90</ows:UpperCorner></ows:WGS84BoundingBox></wfs:FeatureType>\n",
            escape(name)
        ));
    }
    xml.push_str("</wfs:FeatureTypeList>\n</wfs:WFS_Capabilities>\n");
    xml
}

/// WMS capabilities with one unnamed root layer holding `layers`.
///
/// Version "1.3.0" produces a `WMS_Capabilities` document with `CRS`
/// elements; anything else produces a 1.1.1 `WMT_MS_Capabilities` document.
/// `getmap_url` becomes the GetMap `OnlineResource` when given.
pub fn wms_capabilities_xml(
    version: &str,
    layers: &[MockLayer],
    formats: &[&str],
    getmap_url: Option<&str>,
) -> String {
    let (root, crs_tag) = if version == "1.3.0" {
        ("WMS_Capabilities", "CRS")
    } else {
        ("WMT_MS_Capabilities", "SRS")
    };

    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<{} version=\"{}\">\n\
         <Service><Name>OGC:WMS</Name><Title>Mock WMS</Title></Service>\n\
         <Capability>\n<Request>\n<GetMap>\n",
        root,
        escape(version)
    );
    for format in formats {
        xml.push_str(&format!("  <Format>{}</Format>\n", escape(format)));
    }
    if let Some(url) = getmap_url {
        xml.push_str(&format!(
            "  <DCPType><HTTP><Get><OnlineResource xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
             xlink:type=\"simple\" xlink:href=\"{}\"/></Get></HTTP></DCPType>\n",
            escape(url)
        ));
    }
    xml.push_str("</GetMap>\n</Request>\n<Layer>\n  <Title>Mock root</Title>\n");

    for layer in layers {
        xml.push_str(&format!(
            "  <Layer>\n    <Name>{}</Name>\n    <Title>{} title</Title>\n",
            escape(&layer.name),
            escape(&layer.name)
        ));
        for code in &layer.crs {
            xml.push_str(&format!("    <{0}>{1}</{0}>\n", crs_tag, escape(code)));
        }
        if let Some((code, [minx, miny, maxx, maxy])) = &layer.bbox {
            xml.push_str(&format!(
                "    <BoundingBox {}=\"{}\" minx=\"{}\" miny=\"{}\" maxx=\"{}\" maxy=\"{}\"/>\n",
                crs_tag,
                escape(code),
                minx,
                miny,
                maxx,
                maxy
            ));
        }
        xml.push_str("  </Layer>\n");
    }

    xml.push_str(&format!("</Layer>\n</Capability>\n</{}>\n", root));
    xml
}

/// WMS-style `ServiceExceptionReport`.
pub fn service_exception_xml(code: &str, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <ServiceExceptionReport version=\"1.1.1\">\n\
         <ServiceException code=\"{}\">{}</ServiceException>\n\
         </ServiceExceptionReport>\n",
        escape(code),
        escape(message)
    )
}
