//! End-to-end PGA calculation: classify, parse, select, evaluate, combine.

use tracing::{info, warn};

use crate::{
    config::Config,
    ensemble::{CombineError, combine_detailed},
    evaluator::{COEFFS_FILENAME, CoefficientTable, EvalError, MeanEvaluator, evaluate_all},
    geo::{distance_to_rupture, horizontal_distance_fast},
    gmm::GmmInput,
    logic_tree::{LogicTreeRegistry, TREES_FILENAME, TreeError},
    model::{PgaRequest, PgaResponse},
    parser::{ConfigError, GMM_FILENAME, GmmsParser},
    region::Region,
    resource::{ResourceError, ResourceLocator},
    validate::InputError,
    weights::SecondarySelection,
};

#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Combine(#[from] CombineError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("{0:#}")]
    Coefficients(anyhow::Error),
}

/// Regions with a weight configuration.
pub fn is_supported(region: Region) -> bool {
    matches!(region, Region::Wus | Region::Ceus | Region::Cous)
}

/// Load the logic-tree table through `locator`.
pub fn load_logic_trees(locator: &ResourceLocator) -> Result<LogicTreeRegistry, CalcError> {
    let resource = locator.open(TREES_FILENAME)?;
    Ok(LogicTreeRegistry::from_json_str(&resource.contents)?)
}

#[derive(Debug)]
pub struct Calculator {
    locator: ResourceLocator,
    evaluator: Box<dyn MeanEvaluator>,
    policy: SecondarySelection,
}

impl Calculator {
    pub fn new(locator: ResourceLocator, evaluator: Box<dyn MeanEvaluator>) -> Self {
        Self { locator, evaluator, policy: SecondarySelection::default() }
    }

    pub fn with_policy(mut self, policy: SecondarySelection) -> Self {
        self.policy = policy;
        self
    }

    /// Calculator backed by the coefficient table found through the
    /// configured resource directory.
    pub fn from_config(config: &Config) -> Result<Self, CalcError> {
        let locator = config.resource_locator();
        let resource = locator.open(COEFFS_FILENAME)?;
        let table =
            CoefficientTable::from_toml_str(&resource.contents).map_err(CalcError::Coefficients)?;
        Ok(Self::new(locator, Box::new(table)).with_policy(config.secondary_selection))
    }

    pub fn policy(&self) -> SecondarySelection {
        self.policy
    }

    pub fn calculate(&self, request: &PgaRequest) -> Result<PgaResponse, CalcError> {
        let region = request.region();
        if !is_supported(region) {
            return Err(InputError::UnsupportedRegion(region).into());
        }

        let distance = horizontal_distance_fast(&request.site, &request.source);
        let input = GmmInput {
            mag: request.magnitude,
            r_jb: distance,
            r_rup: distance_to_rupture(distance, request.source.depth),
            r_x: distance,
            z_top: request.source.depth,
            vs30: request.vs30,
        };

        let document = self.locator.open(GMM_FILENAME)?;
        let set = GmmsParser::new(region).parse(document.as_bytes())?.with_policy(self.policy);
        let weights = set.select(distance);

        info!(
            site = %request.site_name,
            %region,
            mag = input.mag,
            depth = request.source.depth,
            r_jb = input.r_jb,
            r_x = input.r_x,
            r_rup = input.r_rup,
            vs30 = input.vs30,
            "calculation input"
        );
        if weights.is_empty() {
            warn!(%region, distance, "no model set applies at this distance");
        }

        let means = evaluate_all(self.evaluator.as_ref(), &weights, &input)?;
        let combination = combine_detailed(&weights, &means)?;
        for contribution in &combination.contributions {
            info!(
                gmm = %contribution.gmm,
                weight = contribution.weight,
                mean = %format!("{:.10}", contribution.mean),
                "model contribution"
            );
        }

        Ok(PgaResponse {
            site_name: request.site_name.clone(),
            region,
            distance,
            input,
            weights,
            combination,
        })
    }
}
