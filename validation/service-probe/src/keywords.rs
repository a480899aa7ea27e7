//! Keyword vocabulary: the step names a suite can use and their dispatch.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use ogc_client::OgcClient;
use serde::Serialize;

use crate::error::{ProbeError, ProbeResult};
use crate::probe::ServiceProbe;

/// What a step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StepValue {
    None,
    Count(usize),
    Bool(bool),
    Kilobytes(u64),
}

impl fmt::Display for StepValue {
    /// Booleans render as `True`/`False` so existing suites keep matching.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepValue::None => Ok(()),
            StepValue::Count(n) => write!(f, "{}", n),
            StepValue::Bool(true) => f.write_str("True"),
            StepValue::Bool(false) => f.write_str("False"),
            StepValue::Kilobytes(kb) => write!(f, "{}", kb),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    SetProtocolVersion,
    ConnectToUrl,
    SetServiceUrl,
    GetNumberOfWfsLayers,
    CheckForWfsLayer,
    CheckForWmsLayer,
    CheckAdvertisedWmsLayers,
    GetWmsImageSize,
    ResultShouldBe,
    CheckGetPngImage,
}

impl Keyword {
    pub const ALL: [Keyword; 10] = [
        Keyword::SetProtocolVersion,
        Keyword::ConnectToUrl,
        Keyword::SetServiceUrl,
        Keyword::GetNumberOfWfsLayers,
        Keyword::CheckForWfsLayer,
        Keyword::CheckForWmsLayer,
        Keyword::CheckAdvertisedWmsLayers,
        Keyword::GetWmsImageSize,
        Keyword::ResultShouldBe,
        Keyword::CheckGetPngImage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Keyword::SetProtocolVersion => "Set Protocol Version",
            Keyword::ConnectToUrl => "Connect To Url",
            Keyword::SetServiceUrl => "Set Service Url",
            Keyword::GetNumberOfWfsLayers => "Get Number Of Wfs Layers",
            Keyword::CheckForWfsLayer => "Check For Wfs Layer",
            Keyword::CheckForWmsLayer => "Check For Wms Layer",
            Keyword::CheckAdvertisedWmsLayers => "Check Advertised Wms Layers",
            Keyword::GetWmsImageSize => "Get Wms Image Size",
            Keyword::ResultShouldBe => "Result Should Be",
            Keyword::CheckGetPngImage => "Check Get Png Image",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Keyword::SetProtocolVersion => &["Set Ogc Version"],
            _ => &[],
        }
    }

    /// Argument names; a trailing `=value` marks an optional argument.
    pub fn args(self) -> &'static [&'static str] {
        match self {
            Keyword::SetProtocolVersion => &["version"],
            Keyword::ConnectToUrl | Keyword::SetServiceUrl => &["url"],
            Keyword::CheckForWfsLayer | Keyword::CheckForWmsLayer => &["layer_name"],
            Keyword::GetWmsImageSize => &["layer", "srs", "min_x", "min_y", "max_x", "max_y"],
            Keyword::ResultShouldBe => &["expected=0"],
            Keyword::GetNumberOfWfsLayers
            | Keyword::CheckAdvertisedWmsLayers
            | Keyword::CheckGetPngImage => &[],
        }
    }

    pub fn arity(self) -> RangeInclusive<usize> {
        let args = self.args();
        let required = args.iter().filter(|a| !a.contains('=')).count();
        required..=args.len()
    }

    pub fn doc(self) -> &'static str {
        match self {
            Keyword::SetProtocolVersion => "Set the WFS version used by later queries (default 1.1.0)",
            Keyword::ConnectToUrl => "Fail unless GET on the url root answers 200",
            Keyword::SetServiceUrl => "Set the OGC endpoint used by later queries",
            Keyword::GetNumberOfWfsLayers => "Count the feature types in the WFS capabilities",
            Keyword::CheckForWfsLayer => "True if the WFS advertises this feature type",
            Keyword::CheckForWmsLayer => "True if the WMS advertises this named layer",
            Keyword::CheckAdvertisedWmsLayers => "GetMap every named WMS layer, stop at the first failure",
            Keyword::GetWmsImageSize => "Size in KB of a 300x300 PNG map of the layer",
            Keyword::ResultShouldBe => "Compare the last query result with the expected value",
            Keyword::CheckGetPngImage => "GetMap the first named WMS layer as PNG",
        }
    }

    /// Resolve a step name, ignoring case, spaces and underscores.
    pub fn lookup(name: &str) -> Option<Keyword> {
        let wanted = normalize(name);
        Keyword::ALL.into_iter().find(|kw| {
            normalize(kw.name()) == wanted || kw.aliases().iter().any(|a| normalize(a) == wanted)
        })
    }

    /// Fail unless `actual` arguments fit this keyword.
    pub fn check_arity(self, actual: usize) -> ProbeResult<()> {
        let arity = self.arity();
        if arity.contains(&actual) {
            return Ok(());
        }
        let expected = if arity.start() == arity.end() {
            arity.start().to_string()
        } else {
            format!("{} to {}", arity.start(), arity.end())
        };
        Err(ProbeError::ArgumentCount {
            keyword: self.name(),
            expected,
            actual,
        })
    }
}

impl FromStr for Keyword {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Keyword::lookup(s).ok_or_else(|| ProbeError::UnknownKeyword(s.trim().to_string()))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl<C: OgcClient> ServiceProbe<C> {
    /// Run the step named `name` with string arguments.
    pub async fn run_keyword(&mut self, name: &str, args: &[String]) -> ProbeResult<StepValue> {
        let keyword: Keyword = name.parse()?;
        self.execute(keyword, args).await
    }

    pub async fn execute(&mut self, keyword: Keyword, args: &[String]) -> ProbeResult<StepValue> {
        keyword.check_arity(args.len())?;
        let arg = |i: usize| args[i].as_str();

        match keyword {
            Keyword::SetProtocolVersion => {
                self.set_protocol_version(arg(0));
                Ok(StepValue::None)
            }
            Keyword::ConnectToUrl => {
                self.connect_to_url(arg(0)).await?;
                Ok(StepValue::None)
            }
            Keyword::SetServiceUrl => {
                self.set_service_url(arg(0));
                Ok(StepValue::None)
            }
            Keyword::GetNumberOfWfsLayers => {
                Ok(StepValue::Count(self.get_number_of_wfs_layers().await?))
            }
            Keyword::CheckForWfsLayer => Ok(StepValue::Bool(self.check_for_wfs_layer(arg(0)).await?)),
            Keyword::CheckForWmsLayer => Ok(StepValue::Bool(self.check_for_wms_layer(arg(0)).await?)),
            Keyword::CheckAdvertisedWmsLayers => {
                self.check_advertised_wms_layers().await?;
                Ok(StepValue::None)
            }
            Keyword::GetWmsImageSize => {
                let size = self
                    .get_wms_image_size(arg(0), arg(1), arg(2), arg(3), arg(4), arg(5))
                    .await?;
                Ok(StepValue::Kilobytes(size))
            }
            Keyword::ResultShouldBe => {
                self.result_should_be(args.first().map(String::as_str).unwrap_or("0"))?;
                Ok(StepValue::None)
            }
            Keyword::CheckGetPngImage => {
                self.check_get_png_image().await?;
                Ok(StepValue::None)
            }
        }
    }
}
