//! Parser for `gmm.xml`, the per-region model weight document.
//!
//! The document lists `<ModelSet>` blocks for every region. Parsing is done for
//! one requested region: blocks tagged with any other region are read and
//! dropped. The first matching block becomes the primary (near-field) set, the
//! second the secondary (far-field) set.
//!
//! ```xml
//! <GroundMotionModels>
//!   <ModelSet id="WUS" maxDistance="300.0">
//!     <Uncertainty values="-0.2 0.0 0.2" weights="0.2 0.6 0.2"/>
//!     <Model id="ASK_14" weight="0.5"/>
//!     <Model id="BSSA_14" weight="0.5"/>
//!   </ModelSet>
//! </GroundMotionModels>
//! ```
//!
//! [`WeightSetMachine`] consumes element enter/exit [`Event`]s and knows
//! nothing about XML; the [`xml`] adapter feeds it from a byte stream.

use std::{fmt, io::BufRead};

use tracing::{debug, warn};

use crate::{
    gmm::{Gmm, UnknownGmm},
    region::Region,
    weights::{ModelSet, Uncertainty, WeightError, WeightMapping, WeightedModelSet},
};

pub mod xml;

/// Resource name of the weight document.
pub const GMM_FILENAME: &str = "gmm.xml";

/// Attribute names used by the weight document.
pub mod attr {
    pub const ID: &str = "id";
    pub const WEIGHT: &str = "weight";
    pub const MAX_DISTANCE: &str = "maxDistance";
    pub const VALUES: &str = "values";
    pub const WEIGHTS: &str = "weights";
}

/// Position of an event in the source document (1-based).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The closed set of element names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GmmElement {
    GroundMotionModels,
    ModelSet,
    Model,
    Uncertainty,
}

impl GmmElement {
    pub fn as_str(&self) -> &'static str {
        match self {
            GmmElement::GroundMotionModels => "GroundMotionModels",
            GmmElement::ModelSet => "ModelSet",
            GmmElement::Model => "Model",
            GmmElement::Uncertainty => "Uncertainty",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GroundMotionModels" => Some(GmmElement::GroundMotionModels),
            "ModelSet" => Some(GmmElement::ModelSet),
            "Model" => Some(GmmElement::Model),
            "Uncertainty" => Some(GmmElement::Uncertainty),
            _ => None,
        }
    }
}

impl fmt::Display for GmmElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute list of an element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.push(key.to_string(), value.to_string());
        self
    }

    pub fn push(&mut self, key: String, value: String) {
        self.0.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Enter { name: String, attributes: Attributes, location: Location },
    Exit { name: String, location: Location },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read weight document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed weight document at {location}: {source}")]
    Xml {
        location: Location,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Invalid element <{name}> at {location}")]
    UnknownElement { name: String, location: Location },

    #[error("Unexpected <{element}> at {location}: {reason}")]
    Misplaced { element: String, location: Location, reason: &'static str },

    #[error("Missing attribute '{attribute}' on <{element}> at {location}")]
    MissingAttribute { element: GmmElement, attribute: &'static str, location: Location },

    #[error("Invalid number '{value}' for '{attribute}' on <{element}> at {location}")]
    InvalidNumber {
        element: GmmElement,
        attribute: &'static str,
        value: String,
        location: Location,
    },

    #[error("Error parsing <{element}> at {location}: {source}")]
    UnknownModel {
        element: GmmElement,
        location: Location,
        #[source]
        source: UnknownGmm,
    },

    #[error("Error parsing <{element}> at {location}: {source}")]
    Weights {
        element: GmmElement,
        location: Location,
        #[source]
        source: WeightError,
    },

    #[error("Only two ground motion model sets are allowed for {region}; third <ModelSet> at {location}")]
    TooManySets { region: Region, location: Location },

    #[error("Weight document ended inside <{0}>")]
    Truncated(GmmElement),

    #[error("Weight document has no <GroundMotionModels> element")]
    MissingRoot,

    #[error("This parser has expired")]
    ParserExpired,
}

/// Accumulator for a `<ModelSet>` that matches the requested region.
#[derive(Debug)]
struct SetBuilder {
    ordinal: usize,
    max_distance: f64,
    weights: WeightMapping,
    uncertainty: Option<Uncertainty>,
    location: Location,
}

#[derive(Debug)]
enum Frame {
    Root,
    Skipped { has_uncertainty: bool },
    Matched(SetBuilder),
    Leaf(GmmElement),
}

impl Frame {
    fn element(&self) -> GmmElement {
        match self {
            Frame::Root => GmmElement::GroundMotionModels,
            Frame::Skipped { .. } | Frame::Matched(_) => GmmElement::ModelSet,
            Frame::Leaf(element) => *element,
        }
    }
}

/// Finite-state machine building a [`WeightedModelSet`] for one region from
/// element events.
#[derive(Debug)]
pub struct WeightSetMachine {
    region: Region,
    stack: Vec<Frame>,
    matched: usize,
    primary: Option<ModelSet>,
    secondary: Option<ModelSet>,
    seen_root: bool,
}

impl WeightSetMachine {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            stack: Vec::new(),
            matched: 0,
            primary: None,
            secondary: None,
            seen_root: false,
        }
    }

    pub fn handle(&mut self, event: Event) -> Result<(), ConfigError> {
        match event {
            Event::Enter { name, attributes, location } => self.enter(&name, &attributes, location),
            Event::Exit { name, location } => self.exit(&name, location),
        }
    }

    /// Finish after the last event. Fails if the document was cut short or
    /// never opened the root element.
    pub fn finish(self) -> Result<WeightedModelSet, ConfigError> {
        if let Some(frame) = self.stack.last() {
            return Err(ConfigError::Truncated(frame.element()));
        }
        if !self.seen_root {
            return Err(ConfigError::MissingRoot);
        }
        Ok(WeightedModelSet::new(self.primary, self.secondary, self.matched))
    }

    fn enter(
        &mut self,
        name: &str,
        attributes: &Attributes,
        location: Location,
    ) -> Result<(), ConfigError> {
        let element = element(name, location)?;
        let misplaced =
            |reason| ConfigError::Misplaced { element: name.to_string(), location, reason };

        match (self.stack.last(), element) {
            (None, GmmElement::GroundMotionModels) if !self.seen_root => {
                self.seen_root = true;
                self.stack.push(Frame::Root);
                Ok(())
            }
            (None, _) if self.seen_root => Err(misplaced("content after </GroundMotionModels>")),
            (None, _) => Err(misplaced("expected <GroundMotionModels> as the root element")),
            (Some(Frame::Root), GmmElement::ModelSet) => self.enter_set(attributes, location),
            (Some(Frame::Root), _) => Err(misplaced("only <ModelSet> may appear here")),
            (Some(Frame::Leaf(_)), _) => Err(misplaced("<Model> and <Uncertainty> must be empty")),
            (Some(_), GmmElement::Model) => self.enter_model(attributes, location),
            (Some(_), GmmElement::Uncertainty) => self.enter_uncertainty(attributes, location),
            (Some(_), _) => Err(misplaced("<ModelSet> may only contain <Model> and <Uncertainty>")),
        }
    }

    fn enter_set(
        &mut self,
        attributes: &Attributes,
        location: Location,
    ) -> Result<(), ConfigError> {
        let element = GmmElement::ModelSet;
        let id = required(element, attributes, attr::ID, location)?;
        if id != self.region.as_str() {
            self.stack.push(Frame::Skipped { has_uncertainty: false });
            return Ok(());
        }

        self.matched += 1;
        if self.matched > 2 {
            return Err(ConfigError::TooManySets { region: self.region, location });
        }

        let max_distance = number(element, attributes, attr::MAX_DISTANCE, location)?;
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(ConfigError::Weights {
                element,
                location,
                source: WeightError::InvalidDistance(max_distance),
            });
        }
        debug!(region = %self.region, set = self.matched, max_distance, "model set");

        self.stack.push(Frame::Matched(SetBuilder {
            ordinal: self.matched,
            max_distance,
            weights: WeightMapping::new(),
            uncertainty: None,
            location,
        }));
        Ok(())
    }

    fn enter_model(
        &mut self,
        attributes: &Attributes,
        location: Location,
    ) -> Result<(), ConfigError> {
        let element = GmmElement::Model;
        if let Some(Frame::Matched(builder)) = self.stack.last_mut() {
            let id = required(element, attributes, attr::ID, location)?;
            let gmm: Gmm = id
                .parse()
                .map_err(|source| ConfigError::UnknownModel { element, location, source })?;
            let weight = number(element, attributes, attr::WEIGHT, location)?;
            builder
                .weights
                .insert(gmm, weight)
                .map_err(|source| ConfigError::Weights { element, location, source })?;
            debug!(model = %gmm, weight, "{}", gmm.name());
        }
        self.stack.push(Frame::Leaf(element));
        Ok(())
    }

    fn enter_uncertainty(
        &mut self,
        attributes: &Attributes,
        location: Location,
    ) -> Result<(), ConfigError> {
        let element = GmmElement::Uncertainty;
        let duplicate = || ConfigError::Misplaced {
            element: element.to_string(),
            location,
            reason: "only one <Uncertainty> is allowed per <ModelSet>",
        };

        match self.stack.last_mut() {
            Some(Frame::Skipped { has_uncertainty }) => {
                if *has_uncertainty {
                    return Err(duplicate());
                }
                *has_uncertainty = true;
            }
            Some(Frame::Matched(builder)) => {
                if builder.uncertainty.is_some() {
                    return Err(duplicate());
                }
                let values = numbers(element, attributes, attr::VALUES, location)?;
                let weights = numbers(element, attributes, attr::WEIGHTS, location)?;
                debug!(?values, ?weights, "uncertainty");
                let uncertainty = Uncertainty::new(values, weights)
                    .map_err(|source| ConfigError::Weights { element, location, source })?;
                builder.uncertainty = Some(uncertainty);
            }
            _ => {}
        }
        self.stack.push(Frame::Leaf(element));
        Ok(())
    }

    fn exit(&mut self, name: &str, location: Location) -> Result<(), ConfigError> {
        let element = element(name, location)?;
        let frame = match self.stack.pop() {
            Some(frame) if frame.element() == element => frame,
            Some(_) | None => {
                return Err(ConfigError::Misplaced {
                    element: name.to_string(),
                    location,
                    reason: "closing tag does not match the open element",
                });
            }
        };

        if let Frame::Matched(builder) = frame {
            self.close_set(builder)?;
        }
        Ok(())
    }

    fn close_set(&mut self, builder: SetBuilder) -> Result<(), ConfigError> {
        let SetBuilder { ordinal, max_distance, weights, uncertainty, location } = builder;
        if weights.is_empty() {
            warn!(region = %self.region, set = ordinal, %location, "model set lists no models");
            return Ok(());
        }

        let set = ModelSet::new(weights, max_distance, uncertainty).map_err(|source| {
            ConfigError::Weights { element: GmmElement::ModelSet, location, source }
        })?;
        if ordinal == 1 {
            self.primary = Some(set);
        } else {
            self.secondary = Some(set);
        }
        Ok(())
    }
}

fn element(name: &str, location: Location) -> Result<GmmElement, ConfigError> {
    GmmElement::from_name(name)
        .ok_or_else(|| ConfigError::UnknownElement { name: name.to_string(), location })
}

fn required<'a>(
    element: GmmElement,
    attributes: &'a Attributes,
    attribute: &'static str,
    location: Location,
) -> Result<&'a str, ConfigError> {
    attributes
        .get(attribute)
        .ok_or(ConfigError::MissingAttribute { element, attribute, location })
}

fn number(
    element: GmmElement,
    attributes: &Attributes,
    attribute: &'static str,
    location: Location,
) -> Result<f64, ConfigError> {
    let value = required(element, attributes, attribute, location)?;
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidNumber {
        element,
        attribute,
        value: value.to_string(),
        location,
    })
}

/// Accepts `"[a, b, c]"`, `"a, b, c"` and `"a b c"`.
fn numbers(
    element: GmmElement,
    attributes: &Attributes,
    attribute: &'static str,
    location: Location,
) -> Result<Vec<f64>, ConfigError> {
    let value = required(element, attributes, attribute, location)?;
    let invalid = || ConfigError::InvalidNumber {
        element,
        attribute,
        value: value.to_string(),
        location,
    };

    value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().filter(|n| n.is_finite()).ok_or_else(invalid))
        .collect()
}

/// Single-use parser for one region. A second call to [`GmmsParser::parse`]
/// fails with [`ConfigError::ParserExpired`]; build a new parser per document.
#[derive(Debug)]
pub struct GmmsParser {
    region: Region,
    used: bool,
}

impl GmmsParser {
    pub fn new(region: Region) -> Self {
        Self { region, used: false }
    }

    pub fn parse<R: BufRead>(&mut self, input: R) -> Result<WeightedModelSet, ConfigError> {
        if self.used {
            return Err(ConfigError::ParserExpired);
        }
        self.used = true;

        let mut machine = WeightSetMachine::new(self.region);
        xml::read_events(input, |event| machine.handle(event))?;
        let set = machine.finish()?;

        if set.set_count() == 0 {
            warn!(region = %self.region, "no map found");
        } else {
            debug!(region = %self.region, count = set.set_count(), "map count");
        }
        Ok(set)
    }

    pub fn parse_str(&mut self, document: &str) -> Result<WeightedModelSet, ConfigError> {
        self.parse(document.as_bytes())
    }
}

/// Parse `input` for `region` with a fresh parser and select the weights for
/// a source `distance` km away.
pub fn gmm_weight_map<R: BufRead>(
    region: Region,
    distance: f64,
    input: R,
) -> Result<WeightMapping, ConfigError> {
    let set = GmmsParser::new(region).parse(input)?;
    Ok(set.select(distance))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GroundMotionModels>
  <ModelSet id="CEUS" maxDistance="500.0">
    <Model id="AB_06_PRIME" weight="0.5"/>
    <Model id="TORO_97_MW" weight="0.5"/>
  </ModelSet>
  <ModelSet id="WUS" maxDistance="200.0">
    <Uncertainty values="[-0.2, 0.0, 0.2]" weights="[0.2, 0.6, 0.2]"/>
    <Model id="ASK_14" weight="0.6"/>
    <Model id="BSSA_14" weight="0.4"/>
  </ModelSet>
  <ModelSet id="WUS" maxDistance="1000.0">
    <Model id="CB_14" weight="1.0"/>
  </ModelSet>
</GroundMotionModels>
"#;

    fn enter(name: &str, attributes: Attributes) -> Event {
        Event::Enter { name: name.to_string(), attributes, location: Location::new(1, 1) }
    }

    fn exit(name: &str) -> Event {
        Event::Exit { name: name.to_string(), location: Location::new(1, 1) }
    }

    fn run(region: Region, events: Vec<Event>) -> Result<WeightedModelSet, ConfigError> {
        let mut machine = WeightSetMachine::new(region);
        for event in events {
            machine.handle(event)?;
        }
        machine.finish()
    }

    #[test]
    fn machine_builds_primary_from_events() {
        let set = run(
            Region::Wus,
            vec![
                enter("GroundMotionModels", Attributes::new()),
                enter("ModelSet", Attributes::new().with("id", "WUS").with("maxDistance", "200")),
                enter("Model", Attributes::new().with("id", "ASK_14").with("weight", "0.6")),
                exit("Model"),
                enter("Model", Attributes::new().with("id", "BSSA_14").with("weight", "0.4")),
                exit("Model"),
                exit("ModelSet"),
                exit("GroundMotionModels"),
            ],
        )
        .unwrap();

        let primary = set.primary().expect("primary set");
        assert_eq!(primary.max_distance(), 200.0);
        assert_eq!(primary.weights().len(), 2);
        assert!(set.secondary().is_none());
        assert_eq!(set.set_count(), 1);
    }

    #[test]
    fn machine_skips_other_regions_without_reading_attributes() {
        let set = run(
            Region::Ceus,
            vec![
                enter("GroundMotionModels", Attributes::new()),
                enter("ModelSet", Attributes::new().with("id", "WUS")),
                enter("Model", Attributes::new().with("id", "NOT_A_MODEL")),
                exit("Model"),
                exit("ModelSet"),
                exit("GroundMotionModels"),
            ],
        )
        .unwrap();
        assert!(set.is_empty());
        assert_eq!(set.set_count(), 0);
    }

    #[test]
    fn machine_rejects_truncated_stream() {
        let err = run(
            Region::Wus,
            vec![
                enter("GroundMotionModels", Attributes::new()),
                enter("ModelSet", Attributes::new().with("id", "CEUS")),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Truncated(GmmElement::ModelSet)));

        let err = run(Region::Wus, vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot));
    }

    #[test]
    fn machine_rejects_mismatched_exit() {
        let err = run(
            Region::Wus,
            vec![enter("GroundMotionModels", Attributes::new()), exit("ModelSet")],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Misplaced { .. }));
    }

    #[test]
    fn parses_primary_and_secondary_for_requested_region() {
        let set = GmmsParser::new(Region::Wus).parse_str(DOCUMENT).unwrap();

        let primary = set.primary().unwrap();
        assert_eq!(primary.max_distance(), 200.0);
        assert_eq!(primary.weights().get(Gmm::Ask14), Some(0.6));
        assert_eq!(primary.weights().get(Gmm::Ab06Prime), None);
        let unc = primary.uncertainty().unwrap();
        assert_eq!(unc.values(), &[-0.2, 0.0, 0.2]);
        assert_eq!(unc.weights(), &[0.2, 0.6, 0.2]);

        let secondary = set.secondary().unwrap();
        assert_eq!(secondary.max_distance(), 1000.0);
        assert_eq!(secondary.weights().get(Gmm::Cb14), Some(1.0));
        assert_eq!(set.set_count(), 2);
    }

    #[test]
    fn region_without_blocks_is_empty() {
        let set = GmmsParser::new(Region::Cous).parse_str(DOCUMENT).unwrap();
        assert!(set.is_empty());
        assert!(set.select(10.0).is_empty());
    }

    #[test]
    fn weight_map_by_distance() {
        let near = gmm_weight_map(Region::Wus, 50.0, DOCUMENT.as_bytes()).unwrap();
        assert_eq!(near.get(Gmm::Ask14), Some(0.6));
        assert_eq!(near.get(Gmm::Bssa14), Some(0.4));

        let far = gmm_weight_map(Region::Wus, 500.0, DOCUMENT.as_bytes()).unwrap();
        assert_eq!(far.get(Gmm::Cb14), Some(1.0));
        assert_eq!(far.len(), 1);
    }

    #[test]
    fn half_weight_sum_aborts_parse() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="WUS" maxDistance="200.0">
    <Model id="ASK_14" weight="0.25"/>
    <Model id="BSSA_14" weight="0.25"/>
  </ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(doc).unwrap_err();
        match err {
            ConfigError::Weights { element, location, source: WeightError::Sum { sum, .. } } => {
                assert_eq!(element, GmmElement::ModelSet);
                assert_eq!(location.line, 2);
                assert!((sum - 0.5).abs() < 1e-12);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn third_matching_block_is_fatal() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="CEUS" maxDistance="500.0"><Model id="FRANKEL_96" weight="1.0"/></ModelSet>
  <ModelSet id="CEUS" maxDistance="1000.0"><Model id="FRANKEL_96" weight="1.0"/></ModelSet>
  <ModelSet id="CEUS" maxDistance="2000.0"><Model id="FRANKEL_96" weight="1.0"/></ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Ceus).parse_str(doc).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooManySets { region: Region::Ceus, location } if location.line == 4
        ));
        assert!(err.to_string().contains("Only two ground motion model sets are allowed"));

        // WUS has no blocks here at all.
        assert!(GmmsParser::new(Region::Wus).parse_str(doc).is_ok());
    }

    #[test]
    fn parser_is_single_use() {
        let mut parser = GmmsParser::new(Region::Wus);
        parser.parse_str(DOCUMENT).unwrap();
        let err = parser.parse_str(DOCUMENT).unwrap_err();
        assert!(matches!(err, ConfigError::ParserExpired));
    }

    #[test]
    fn failed_parse_still_expires_parser() {
        let mut parser = GmmsParser::new(Region::Wus);
        assert!(parser.parse_str("<Bogus/>").is_err());
        assert!(matches!(parser.parse_str(DOCUMENT), Err(ConfigError::ParserExpired)));
    }

    #[test]
    fn unknown_element_is_fatal_even_when_skipped() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="CEUS" maxDistance="500.0">
    <Modle id="FRANKEL_96" weight="1.0"/>
  </ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(doc).unwrap_err();
        match err {
            ConfigError::UnknownElement { name, location } => {
                assert_eq!(name, "Modle");
                assert_eq!(location, Location::new(3, 5));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_model_is_fatal() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="WUS" maxDistance="200.0">
    <Model id="MADE_UP_99" weight="1.0"/>
  </ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModel { .. }));
        assert!(err.to_string().contains("MADE_UP_99"));
    }

    #[test]
    fn duplicate_model_is_fatal() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="WUS" maxDistance="200.0">
    <Model id="ASK_14" weight="0.5"/>
    <Model id="ASK_14" weight="0.5"/>
  </ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(doc).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Weights { source: WeightError::Duplicate(Gmm::Ask14), .. }
        ));
    }

    #[test]
    fn missing_and_invalid_attributes() {
        let missing = r#"<GroundMotionModels><ModelSet id="WUS"/></GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(missing).unwrap_err();
        assert!(matches!(err, ConfigError::MissingAttribute { attribute: attr::MAX_DISTANCE, .. }));

        let invalid = r#"<GroundMotionModels>
  <ModelSet id="WUS" maxDistance="200.0"><Model id="ASK_14" weight="heavy"/></ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(invalid).unwrap_err();
        match err {
            ConfigError::InvalidNumber { attribute, value, .. } => {
                assert_eq!(attribute, attr::WEIGHT);
                assert_eq!(value, "heavy");
            }
            other => panic!("unexpected error: {other}"),
        }

        let no_id = r#"<GroundMotionModels><ModelSet maxDistance="1"/></GroundMotionModels>"#;
        assert!(matches!(
            GmmsParser::new(Region::Wus).parse_str(no_id),
            Err(ConfigError::MissingAttribute { attribute: attr::ID, .. })
        ));
    }

    #[test]
    fn uncertainty_lengths_must_match() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="WUS" maxDistance="200.0">
    <Uncertainty values="-0.2 0.2" weights="1.0"/>
    <Model id="ASK_14" weight="1.0"/>
  </ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(doc).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Weights {
                element: GmmElement::Uncertainty,
                source: WeightError::UncertaintyLength { values: 2, weights: 1 },
                ..
            }
        ));
    }

    #[test]
    fn second_uncertainty_is_rejected() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="CEUS" maxDistance="500.0">
    <Uncertainty values="0.0" weights="1.0"/>
    <Uncertainty values="0.0" weights="1.0"/>
  </ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Misplaced { .. }));
    }

    #[test]
    fn structure_is_enforced() {
        let nested = r#"<GroundMotionModels><Model id="ASK_14" weight="1"/></GroundMotionModels>"#;
        assert!(matches!(
            GmmsParser::new(Region::Wus).parse_str(nested),
            Err(ConfigError::Misplaced { .. })
        ));

        let wrong_root = r#"<ModelSet id="WUS" maxDistance="1"/>"#;
        assert!(matches!(
            GmmsParser::new(Region::Wus).parse_str(wrong_root),
            Err(ConfigError::Misplaced { .. })
        ));

        let truncated = r#"<GroundMotionModels><ModelSet id="WUS" maxDistance="1">"#;
        assert!(GmmsParser::new(Region::Wus).parse_str(truncated).is_err());
    }

    #[test]
    fn empty_matching_block_consumes_its_ordinal() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="WUS" maxDistance="200.0"/>
  <ModelSet id="WUS" maxDistance="1000.0"><Model id="CB_14" weight="1.0"/></ModelSet>
</GroundMotionModels>"#;
        let set = GmmsParser::new(Region::Wus).parse_str(doc).unwrap();
        assert!(set.primary().is_none());
        assert!(set.secondary().is_some());
        assert_eq!(set.set_count(), 2);
        assert!(set.select(500.0).is_empty());
    }

    #[test]
    fn negative_distance_is_rejected() {
        let doc = r#"<GroundMotionModels>
  <ModelSet id="WUS" maxDistance="-5"><Model id="CB_14" weight="1.0"/></ModelSet>
</GroundMotionModels>"#;
        let err = GmmsParser::new(Region::Wus).parse_str(doc).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Weights { source: WeightError::InvalidDistance(_), .. }
        ));
    }
}
