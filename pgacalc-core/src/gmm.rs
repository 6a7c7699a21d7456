use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Ground motion model identifiers understood by the weight documents.
///
/// The catalog is closed: anything not listed here is rejected with
/// [`UnknownGmm`]. Declaration order doubles as the iteration order of every
/// weight map in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gmm {
    #[serde(rename = "ASK_14")]
    Ask14,
    #[serde(rename = "BSSA_14")]
    Bssa14,
    #[serde(rename = "CB_14")]
    Cb14,
    #[serde(rename = "CY_14")]
    Cy14,
    #[serde(rename = "IDRISS_14")]
    Idriss14,
    #[serde(rename = "AB_06_PRIME")]
    Ab06Prime,
    #[serde(rename = "ATKINSON_08_PRIME")]
    Atkinson08Prime,
    #[serde(rename = "CAMPBELL_03")]
    Campbell03,
    #[serde(rename = "FRANKEL_96")]
    Frankel96,
    #[serde(rename = "PEZESHK_11")]
    Pezeshk11,
    #[serde(rename = "SILVA_02")]
    Silva02,
    #[serde(rename = "SOMERVILLE_01")]
    Somerville01,
    #[serde(rename = "TAVAKOLI_05")]
    Tavakoli05,
    #[serde(rename = "TORO_97_MW")]
    Toro97Mw,
}

impl Gmm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gmm::Ask14 => "ASK_14",
            Gmm::Bssa14 => "BSSA_14",
            Gmm::Cb14 => "CB_14",
            Gmm::Cy14 => "CY_14",
            Gmm::Idriss14 => "IDRISS_14",
            Gmm::Ab06Prime => "AB_06_PRIME",
            Gmm::Atkinson08Prime => "ATKINSON_08_PRIME",
            Gmm::Campbell03 => "CAMPBELL_03",
            Gmm::Frankel96 => "FRANKEL_96",
            Gmm::Pezeshk11 => "PEZESHK_11",
            Gmm::Silva02 => "SILVA_02",
            Gmm::Somerville01 => "SOMERVILLE_01",
            Gmm::Tavakoli05 => "TAVAKOLI_05",
            Gmm::Toro97Mw => "TORO_97_MW",
        }
    }

    /// Human-readable model name, used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Gmm::Ask14 => "Abrahamson, Silva & Kamai (2014)",
            Gmm::Bssa14 => "Boore, Stewart, Seyhan & Atkinson (2014)",
            Gmm::Cb14 => "Campbell & Bozorgnia (2014)",
            Gmm::Cy14 => "Chiou & Youngs (2014)",
            Gmm::Idriss14 => "Idriss (2014)",
            Gmm::Ab06Prime => "Atkinson & Boore (2006): 140bar",
            Gmm::Atkinson08Prime => "Atkinson (2008) Prime",
            Gmm::Campbell03 => "Campbell (2003)",
            Gmm::Frankel96 => "Frankel et al. (1996)",
            Gmm::Pezeshk11 => "Pezeshk, Zandieh & Tavakoli (2011)",
            Gmm::Silva02 => "Silva et al. (2002)",
            Gmm::Somerville01 => "Somerville et al. (2001)",
            Gmm::Tavakoli05 => "Tavakoli & Pezeshk (2005)",
            Gmm::Toro97Mw => "Toro et al. (1997)",
        }
    }

    pub const fn all() -> &'static [Gmm] {
        &[
            Gmm::Ask14,
            Gmm::Bssa14,
            Gmm::Cb14,
            Gmm::Cy14,
            Gmm::Idriss14,
            Gmm::Ab06Prime,
            Gmm::Atkinson08Prime,
            Gmm::Campbell03,
            Gmm::Frankel96,
            Gmm::Pezeshk11,
            Gmm::Silva02,
            Gmm::Somerville01,
            Gmm::Tavakoli05,
            Gmm::Toro97Mw,
        ]
    }
}

impl fmt::Display for Gmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Identifier that is not part of the [`Gmm`] catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown ground motion model '{0}'")]
pub struct UnknownGmm(pub String);

impl FromStr for Gmm {
    type Err = UnknownGmm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gmm::all()
            .iter()
            .copied()
            .find(|gmm| gmm.as_str() == s)
            .ok_or_else(|| UnknownGmm(s.to_string()))
    }
}

impl TryFrom<&str> for Gmm {
    type Error = UnknownGmm;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Rupture and site parameters handed to a ground motion model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GmmInput {
    /// Moment magnitude.
    pub mag: f64,
    /// Joyner-Boore distance (km).
    pub r_jb: f64,
    /// Distance to rupture plane (km).
    pub r_rup: f64,
    /// Site coordinate (km).
    pub r_x: f64,
    /// Depth to top of rupture (km).
    pub z_top: f64,
    /// Average shear-wave velocity in the upper 30 m (m/s).
    pub vs30: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmm_as_str_roundtrip() {
        for gmm in Gmm::all() {
            let parsed: Gmm = gmm.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*gmm, parsed);
        }
    }

    #[test]
    fn unknown_gmm_error() {
        let err = Gmm::try_from("NOT_A_MODEL").unwrap_err();
        assert_eq!(err, UnknownGmm("NOT_A_MODEL".to_string()));
        assert!(err.to_string().contains("Unknown ground motion model"));
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        assert!("ask_14".parse::<Gmm>().is_err());
    }

    #[test]
    fn serde_uses_catalog_identifiers() {
        let json = serde_json::to_string(&Gmm::Toro97Mw).unwrap();
        assert_eq!(json, "\"TORO_97_MW\"");

        let gmm: Gmm = serde_json::from_str("\"CB_14\"").unwrap();
        assert_eq!(gmm, Gmm::Cb14);
    }

    #[test]
    fn ordering_follows_declaration() {
        let mut sorted = Gmm::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, Gmm::all());
    }
}
