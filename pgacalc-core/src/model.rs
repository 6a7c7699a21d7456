use crate::{
    ensemble::{Combination, Estimate},
    geo::Location,
    gmm::GmmInput,
    region::Region,
    validate::{self, InputError},
    weights::WeightMapping,
};

/// Positional arguments, in command-line order.
pub const ARGUMENT_NAMES: [&str; 8] =
    ["SITE_NAME", "SITE_LON", "SITE_LAT", "EQ_MAG", "EQ_LON", "EQ_LAT", "EQ_DEPTH", "VS30"];

/// A validated PGA request.
#[derive(Debug, Clone, PartialEq)]
pub struct PgaRequest {
    pub site_name: String,
    pub site: Location,
    /// Hypocenter, depth in km.
    pub source: Location,
    pub magnitude: f64,
    pub vs30: f64,
}

impl PgaRequest {
    /// Build a request from the raw positional arguments
    /// `site_name site_lon site_lat eq_mag eq_lon eq_lat eq_depth [vs30]`.
    /// `default_vs30` applies when the last one is absent.
    pub fn from_args<S: AsRef<str>>(args: &[S], default_vs30: f64) -> Result<Self, InputError> {
        let [site_name, site_lon, site_lat, eq_mag, eq_lon, eq_lat, eq_depth, rest @ ..] = args
        else {
            return Err(InputError::Arguments(args.len()));
        };
        let vs30 = match rest {
            [] => validate::check_vs30(default_vs30)?,
            [vs30] => validate::vs30(vs30.as_ref())?,
            _ => return Err(InputError::Arguments(args.len())),
        };

        let magnitude = validate::magnitude(eq_mag.as_ref())?;
        let site = Location::new(
            validate::latitude(site_lat.as_ref())?,
            validate::longitude(site_lon.as_ref())?,
        );
        let source = Location::with_depth(
            validate::latitude(eq_lat.as_ref())?,
            validate::longitude(eq_lon.as_ref())?,
            validate::depth(eq_depth.as_ref())?,
        );

        Ok(Self { site_name: site_name.as_ref().to_string(), site, source, magnitude, vs30 })
    }

    /// Region of the site.
    pub fn region(&self) -> Region {
        Region::classify(self.site.lat, self.site.lon)
    }
}

/// Result of a calculation, with the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PgaResponse {
    pub site_name: String,
    pub region: Region,
    /// Horizontal source-to-site distance (km).
    pub distance: f64,
    pub input: GmmInput,
    pub weights: WeightMapping,
    pub combination: Combination,
}

impl PgaResponse {
    pub fn estimate(&self) -> Estimate {
        self.combination.estimate()
    }
}
