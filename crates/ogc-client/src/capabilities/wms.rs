//! WMS GetCapabilities parsing.
//!
//! Layers are collected from the nested `Layer` tree. Only layers with a
//! `Name` are requestable and end up in `WmsCapabilities::layers`, but
//! unnamed layers still pass their CRS list and bounding boxes down to their
//! children, as WMS inheritance rules require.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use tracing::debug;

use ogc_common::BoundingBox;

use super::expect_root;
use crate::error::OgcResult;
use crate::xml::{attribute, local_name, xml_error};

const DOCUMENT: &str = "WMS capabilities";

/// A bounding box advertised for a layer, with its reference system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerBoundingBox {
    pub crs: String,
    pub bbox: BoundingBox,
}

/// A named (requestable) WMS layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsLayer {
    pub name: String,
    pub title: Option<String>,
    /// Own CRS declarations first, then inherited ones, without duplicates
    pub crs: Vec<String>,
    /// First `BoundingBox` declared on the layer, or inherited from its parent
    pub bounding_box: Option<LayerBoundingBox>,
    /// `LatLonBoundingBox` (1.1.1) or `EX_GeographicBoundingBox` (1.3.0)
    pub geographic_bbox: Option<BoundingBox>,
}

impl WmsLayer {
    pub fn first_crs(&self) -> Option<&str> {
        self.crs.first().map(String::as_str)
    }

    /// Extent to request a map for: the first bounding box, falling back to
    /// the geographic one.
    pub fn map_extent(&self) -> Option<BoundingBox> {
        self.bounding_box
            .as_ref()
            .map(|b| b.bbox)
            .or(self.geographic_bbox)
    }
}

/// The parts of a WMS capabilities document the probe relies on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WmsCapabilities {
    pub version: Option<String>,
    /// Named layers in document order
    pub layers: Vec<WmsLayer>,
    /// `Capability/Request/GetMap/Format` values in document order
    pub getmap_formats: Vec<String>,
    /// GetMap HTTP GET endpoint, when advertised
    pub getmap_url: Option<String>,
}

impl WmsCapabilities {
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Exact, case-sensitive name lookup.
    pub fn contains(&self, name: &str) -> bool {
        self.layer(name).is_some()
    }

    pub fn layer(&self, name: &str) -> Option<&WmsLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn first_getmap_format(&self) -> Option<&str> {
        self.getmap_formats.first().map(String::as_str)
    }
}

#[derive(Default)]
struct LayerFrame {
    order: usize,
    name: Option<String>,
    title: Option<String>,
    own_crs: Vec<String>,
    inherited_crs: Vec<String>,
    own_bbox: Option<LayerBoundingBox>,
    inherited_bbox: Option<LayerBoundingBox>,
    own_geo: Option<BoundingBox>,
    inherited_geo: Option<BoundingBox>,
    // west, east, south, north
    geo_parts: [Option<f64>; 4],
}

impl LayerFrame {
    fn child(&self, order: usize) -> Self {
        Self {
            order,
            inherited_crs: self.effective_crs(),
            inherited_bbox: self.effective_bbox(),
            inherited_geo: self.own_geo.or(self.inherited_geo),
            ..Default::default()
        }
    }

    fn effective_crs(&self) -> Vec<String> {
        let mut crs: Vec<String> = Vec::with_capacity(self.own_crs.len() + self.inherited_crs.len());
        for c in self.own_crs.iter().chain(self.inherited_crs.iter()) {
            if !crs.contains(c) {
                crs.push(c.clone());
            }
        }
        crs
    }

    fn effective_bbox(&self) -> Option<LayerBoundingBox> {
        self.own_bbox.clone().or_else(|| self.inherited_bbox.clone())
    }

    fn into_layer(self) -> Option<(usize, WmsLayer)> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return None;
        }
        Some((
            self.order,
            WmsLayer {
                name: name.to_string(),
                title: self.title.clone(),
                crs: self.effective_crs(),
                bounding_box: self.effective_bbox(),
                geographic_bbox: self.own_geo.or(self.inherited_geo),
            },
        ))
    }
}

/// Parse a WMS capabilities document (1.1.1 or 1.3.0).
pub fn parse_wms_capabilities(xml: &str) -> OgcResult<WmsCapabilities> {
    expect_root(xml, DOCUMENT, &["WMT_MS_Capabilities", "WMS_Capabilities"])?;

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut caps = WmsCapabilities::default();
    let mut path: Vec<String> = Vec::new();
    let mut frames: Vec<LayerFrame> = Vec::new();
    let mut finished: Vec<(usize, WmsLayer)> = Vec::new();
    let mut layer_counter = 0usize;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(e.local_name().as_ref());
                if path.is_empty() {
                    caps.version = attribute(&e, "version");
                }
                if name == "Layer" {
                    let frame = match frames.last() {
                        Some(parent) => parent.child(layer_counter),
                        None => LayerFrame {
                            order: layer_counter,
                            ..Default::default()
                        },
                    };
                    layer_counter += 1;
                    frames.push(frame);
                } else {
                    handle_attributes(&name, &e, &path, &mut frames, &mut caps);
                }
                text.clear();
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(e.local_name().as_ref());
                handle_attributes(&name, &e, &path, &mut frames, &mut caps);
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
                let value = text.trim();

                match (name.as_str(), parent) {
                    ("Layer", _) => {
                        if let Some(layer) = frames.pop().and_then(LayerFrame::into_layer) {
                            finished.push(layer);
                        }
                    }
                    ("Name", Some("Layer")) => {
                        if let Some(frame) = frames.last_mut() {
                            frame.name = Some(value.to_string());
                        }
                    }
                    ("Title", Some("Layer")) => {
                        if let Some(frame) = frames.last_mut() {
                            frame.title = Some(value.to_string());
                        }
                    }
                    // Some servers pack several codes into one whitespace-separated element
                    ("SRS", Some("Layer")) | ("CRS", Some("Layer")) => {
                        if let Some(frame) = frames.last_mut() {
                            frame
                                .own_crs
                                .extend(value.split_whitespace().map(str::to_string));
                        }
                    }
                    (edge, Some("EX_GeographicBoundingBox")) => {
                        let slot = match edge {
                            "westBoundLongitude" => Some(0),
                            "eastBoundLongitude" => Some(1),
                            "southBoundLatitude" => Some(2),
                            "northBoundLatitude" => Some(3),
                            _ => None,
                        };
                        if let (Some(slot), Some(frame)) = (slot, frames.last_mut()) {
                            frame.geo_parts[slot] = value.parse().ok();
                        }
                    }
                    ("EX_GeographicBoundingBox", Some("Layer")) => {
                        if let Some(frame) = frames.last_mut() {
                            if let [Some(w), Some(e), Some(s), Some(n)] = frame.geo_parts {
                                frame.own_geo = Some(BoundingBox::new(w, s, e, n));
                            }
                        }
                    }
                    ("Format", Some("GetMap")) => {
                        if !value.is_empty() {
                            caps.getmap_formats.push(value.to_string());
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

    finished.sort_by_key(|(order, _)| *order);
    for (_, layer) in finished {
        match caps.layers.iter_mut().find(|l| l.name == layer.name) {
            Some(existing) => *existing = layer,
            None => caps.layers.push(layer),
        }
    }

    debug!(
        version = caps.version.as_deref().unwrap_or("unknown"),
        layers = caps.layer_count(),
        formats = caps.getmap_formats.len(),
        "Parsed WMS capabilities"
    );
    Ok(caps)
}

/// Elements whose payload lives in attributes (and may be self-closing).
fn handle_attributes(
    name: &str,
    e: &BytesStart<'_>,
    path: &[String],
    frames: &mut [LayerFrame],
    caps: &mut WmsCapabilities,
) {
    let parent = path.last().map(String::as_str);

    match (name, parent) {
        ("BoundingBox", Some("Layer")) => {
            let Some(frame) = frames.last_mut() else {
                return;
            };
            if frame.own_bbox.is_some() {
                return;
            }
            let crs = attribute(e, "SRS").or_else(|| attribute(e, "CRS"));
            if let (Some(crs), Some(bbox)) = (crs, bbox_attributes(e)) {
                frame.own_bbox = Some(LayerBoundingBox { crs, bbox });
            }
        }
        ("LatLonBoundingBox", Some("Layer")) => {
            if let Some(frame) = frames.last_mut() {
                frame.own_geo = bbox_attributes(e);
            }
        }
        ("OnlineResource", Some("Get")) => {
            let in_getmap = path.len() >= 4 && path[path.len() - 4] == "GetMap";
            if in_getmap && caps.getmap_url.is_none() {
                caps.getmap_url = attribute(e, "href");
            }
        }
        _ => {}
    }
}

fn bbox_attributes(e: &BytesStart<'_>) -> Option<BoundingBox> {
    let edge = |name: &str| attribute(e, name).and_then(|v| v.trim().parse::<f64>().ok());
    Some(BoundingBox::new(
        edge("minx")?,
        edge("miny")?,
        edge("maxx")?,
        edge("maxy")?,
    ))
}
