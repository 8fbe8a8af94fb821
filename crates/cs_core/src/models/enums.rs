//! Enumerated values stored in case files.
//!
//! Every enum keeps the exact XML spelling the solver expects. Parsing an
//! unknown spelling yields [`ModelError::InvalidOption`].
//!
//! [`ModelError::InvalidOption`]: crate::models::ModelError::InvalidOption

/// Declares an enum whose variants map one-to-one to XML strings.
macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $xml:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $xml)] $variant ),+
        }

        impl $name {
            /// XML spelling of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $xml ),+
                }
            }

            /// All values, in the order the solver documents them.
            pub fn all() -> &'static [$name] {
                &[ $( Self::$variant ),+ ]
            }

            /// XML spellings of all values.
            pub fn names() -> Vec<&'static str> {
                Self::all().iter().map(|value| value.as_str()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::all()
                    .iter()
                    .copied()
                    .find(|value| value.as_str() == s)
                    .ok_or_else(|| $crate::models::ModelError::InvalidOption {
                        what: $what,
                        value: s.to_string(),
                        allowed: Self::names(),
                    })
            }
        }
    };
}

pub(crate) use xml_enum;

xml_enum! {
    /// Gas combustion model (`gas_combustion@model`).
    #[derive(Default)]
    GasCombustion, "gas combustion model" {
        #[default]
        Off => "off",
        /// Eddy break-up, premixed flame.
        Ebu => "ebu",
        /// Diffusion flame, 3-point chemistry.
        D3p => "d3p",
        /// Libby-Williams, partially premixed flame.
        Lwp => "lwp",
    }
}

xml_enum! {
    /// Gas combustion option (`gas_combustion@option`).
    CombustionOption, "gas combustion option" {
        Off => "off",
        Adiabatic => "adiabatic",
        Extended => "extended",
        Spalding => "spalding",
        EnthalpySt => "enthalpy_st",
        MixtureSt => "mixture_st",
        EnthalpyMixtureSt => "enthalpy_mixture_st",
        TwoPeakAdiabatic => "2-peak_adiabatic",
        TwoPeakEnthalpy => "2-peak_enthalpy",
        ThreePeakAdiabatic => "3-peak_adiabatic",
        ThreePeakEnthalpy => "3-peak_enthalpy",
        FourPeakAdiabatic => "4-peak_adiabatic",
        FourPeakEnthalpy => "4-peak_enthalpy",
    }
}

impl GasCombustion {
    /// Options available for this model. The first one is the default.
    pub fn options(&self) -> &'static [CombustionOption] {
        use CombustionOption::*;
        match self {
            Self::Off => &[Off],
            Self::D3p => &[Adiabatic, Extended],
            Self::Ebu => &[Spalding, EnthalpySt, MixtureSt, EnthalpyMixtureSt],
            Self::Lwp => &[
                TwoPeakAdiabatic,
                TwoPeakEnthalpy,
                ThreePeakAdiabatic,
                ThreePeakEnthalpy,
                FourPeakAdiabatic,
                FourPeakEnthalpy,
            ],
        }
    }

    /// Default option for this model.
    pub fn default_option(&self) -> CombustionOption {
        self.options()[0]
    }

    /// Whether `option` belongs to this model.
    pub fn accepts(&self, option: CombustionOption) -> bool {
        self.options().contains(&option)
    }
}

impl CombustionOption {
    /// Number of Dirac peaks for Libby-Williams options.
    pub fn n_dirac(&self) -> Option<u32> {
        match self {
            Self::TwoPeakAdiabatic | Self::TwoPeakEnthalpy => Some(2),
            Self::ThreePeakAdiabatic | Self::ThreePeakEnthalpy => Some(3),
            Self::FourPeakAdiabatic | Self::FourPeakEnthalpy => Some(4),
            _ => None,
        }
    }
}

xml_enum! {
    /// Soot model (`gas_combustion/soot_model@model`).
    #[derive(Default)]
    SootModel, "soot model" {
        #[default]
        Off => "off",
        SootProductFraction => "soot_product_fraction",
        Moss => "moss",
    }
}

xml_enum! {
    /// Thermal scalar model (`thermal_scalar@model`).
    #[derive(Default)]
    ThermalModel, "thermal model" {
        #[default]
        Off => "off",
        Enthalpy => "enthalpy",
        TemperatureCelsius => "temperature_celsius",
        TemperatureKelvin => "temperature_kelvin",
        TotalEnergy => "total_energy",
    }
}

impl ThermalModel {
    /// Name of the transported scalar, if any.
    pub fn scalar_name(&self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::Enthalpy => Some("enthalpy"),
            Self::TemperatureCelsius | Self::TemperatureKelvin => Some("temperature"),
            Self::TotalEnergy => Some("total_energy"),
        }
    }
}

xml_enum! {
    /// Radiative transfer model (`radiative_transfer@model`).
    #[derive(Default)]
    RadiativeModel, "radiative model" {
        #[default]
        Off => "off",
        Dom => "dom",
        P1 => "p-1",
    }
}

xml_enum! {
    /// Mesh partitioning algorithm.
    #[derive(Default)]
    PartitionType, "partition type" {
        #[default]
        Default => "default",
        Scotch => "scotch",
        Metis => "metis",
        MortonSfc => "morton sfc",
        MortonSfcCube => "morton sfc cube",
        HilbertSfc => "hilbert sfc",
        HilbertSfcCube => "hilbert sfc cube",
        Block => "block",
    }
}

xml_enum! {
    /// Whether the partitioning is written out.
    #[derive(Default)]
    PartitionOutput, "partition output" {
        No => "no",
        #[default]
        Default => "default",
        Yes => "yes",
    }
}

xml_enum! {
    /// Block IO access method.
    #[derive(Default)]
    BlockIoMethod, "block IO method" {
        #[default]
        Default => "default",
        StdioSerial => "stdio serial",
        StdioParallel => "stdio parallel",
        MpiIndependent => "mpi independent",
        MpiNoncollective => "mpi noncollective",
        MpiCollective => "mpi collective",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelError;

    #[test]
    fn parse_uses_xml_spelling() {
        assert_eq!("d3p".parse::<GasCombustion>().unwrap(), GasCombustion::D3p);
        assert_eq!(
            "4-peak_enthalpy".parse::<CombustionOption>().unwrap(),
            CombustionOption::FourPeakEnthalpy
        );
        assert_eq!(
            "hilbert sfc cube".parse::<PartitionType>().unwrap(),
            PartitionType::HilbertSfcCube
        );
    }

    #[test]
    fn invalid_option_lists_allowed_values() {
        let err = "coal".parse::<GasCombustion>().unwrap_err();
        match &err {
            ModelError::InvalidOption { what, value, allowed } => {
                assert_eq!(*what, "gas combustion model");
                assert_eq!(value, "coal");
                assert_eq!(allowed, &vec!["off", "ebu", "d3p", "lwp"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("off, ebu, d3p, lwp"));
    }

    #[test]
    fn default_options_per_model() {
        assert_eq!(GasCombustion::Off.default_option(), CombustionOption::Off);
        assert_eq!(GasCombustion::D3p.default_option(), CombustionOption::Adiabatic);
        assert_eq!(GasCombustion::Ebu.default_option(), CombustionOption::Spalding);
        assert_eq!(
            GasCombustion::Lwp.default_option(),
            CombustionOption::TwoPeakAdiabatic
        );
        assert!(!GasCombustion::D3p.accepts(CombustionOption::Spalding));
    }

    #[test]
    fn n_dirac_only_for_lwp_options() {
        assert_eq!(CombustionOption::ThreePeakEnthalpy.n_dirac(), Some(3));
        assert_eq!(CombustionOption::Extended.n_dirac(), None);
    }

    #[test]
    fn serde_uses_xml_spelling() {
        let json = serde_json::to_string(&BlockIoMethod::MpiCollective).unwrap();
        assert_eq!(json, "\"mpi collective\"");
        let parsed: RadiativeModel = serde_json::from_str("\"p-1\"").unwrap();
        assert_eq!(parsed, RadiativeModel::P1);
    }
}
