//! Unit categories and unit-string classification.
//!
//! A unit string such as `meV`, `m^-1` or `kg/m^3` is parsed into a
//! dimensional signature. Categories accept a fixed set of signatures, so
//! `Wavelength` accepts `Angstrom` and `nm` alike.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::NexusError;

// =============================================================================
// DIMENSIONAL SIGNATURES
// =============================================================================

/// Exponents over the base quantities a NeXus unit can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub current: i8,
    pub temperature: i8,
    pub amount: i8,
    pub angle: i8,
    pub solid_angle: i8,
}

impl Dimensions {
    const fn of(length: i8, mass: i8, time: i8, current: i8) -> Self {
        Self {
            length,
            mass,
            time,
            current,
            temperature: 0,
            amount: 0,
            angle: 0,
            solid_angle: 0,
        }
    }

    pub const DIMENSIONLESS: Dimensions = Dimensions::of(0, 0, 0, 0);
    pub const LENGTH: Dimensions = Dimensions::of(1, 0, 0, 0);
    pub const AREA: Dimensions = Dimensions::of(2, 0, 0, 0);
    pub const VOLUME: Dimensions = Dimensions::of(3, 0, 0, 0);
    pub const PER_LENGTH: Dimensions = Dimensions::of(-1, 0, 0, 0);
    pub const PER_AREA: Dimensions = Dimensions::of(-2, 0, 0, 0);
    pub const MASS: Dimensions = Dimensions::of(0, 1, 0, 0);
    pub const MASS_DENSITY: Dimensions = Dimensions::of(-3, 1, 0, 0);
    pub const TIME: Dimensions = Dimensions::of(0, 0, 1, 0);
    pub const FREQUENCY: Dimensions = Dimensions::of(0, 0, -1, 0);
    pub const FLUX: Dimensions = Dimensions::of(-2, 0, -1, 0);
    pub const ENERGY: Dimensions = Dimensions::of(2, 1, -2, 0);
    pub const POWER: Dimensions = Dimensions::of(2, 1, -3, 0);
    pub const PRESSURE: Dimensions = Dimensions::of(-1, 1, -2, 0);
    pub const CURRENT: Dimensions = Dimensions::of(0, 0, 0, 1);
    pub const CHARGE: Dimensions = Dimensions::of(0, 0, 1, 1);
    pub const VOLTAGE: Dimensions = Dimensions::of(2, 1, -3, -1);
    pub const TEMPERATURE: Dimensions = Dimensions {
        temperature: 1,
        ..Dimensions::DIMENSIONLESS
    };
    pub const AMOUNT: Dimensions = Dimensions {
        amount: 1,
        ..Dimensions::DIMENSIONLESS
    };
    pub const MOLAR_MASS: Dimensions = Dimensions {
        mass: 1,
        amount: -1,
        ..Dimensions::DIMENSIONLESS
    };
    pub const ANGLE: Dimensions = Dimensions {
        angle: 1,
        ..Dimensions::DIMENSIONLESS
    };
    pub const SOLID_ANGLE: Dimensions = Dimensions {
        solid_angle: 1,
        ..Dimensions::DIMENSIONLESS
    };
    pub const EMITTANCE: Dimensions = Dimensions {
        length: 1,
        angle: 1,
        ..Dimensions::DIMENSIONLESS
    };

    /// Product of two signatures, the right operand raised to `exponent`.
    fn combine(self, other: Dimensions, exponent: i8) -> Dimensions {
        let add = |a: i8, b: i8| a.saturating_add(b.saturating_mul(exponent));
        Dimensions {
            length: add(self.length, other.length),
            mass: add(self.mass, other.mass),
            time: add(self.time, other.time),
            current: add(self.current, other.current),
            temperature: add(self.temperature, other.temperature),
            amount: add(self.amount, other.amount),
            angle: add(self.angle, other.angle),
            solid_angle: add(self.solid_angle, other.solid_angle),
        }
    }
}

// =============================================================================
// UNIT SYMBOL TABLES
// =============================================================================

/// Symbols that accept an SI prefix (`k`, `m`, `µ`, ...).
static PREFIXABLE: Lazy<HashMap<&'static str, Dimensions>> = Lazy::new(|| {
    HashMap::from([
        ("m", Dimensions::LENGTH),
        ("s", Dimensions::TIME),
        ("g", Dimensions::MASS),
        ("eV", Dimensions::ENERGY),
        ("J", Dimensions::ENERGY),
        ("Hz", Dimensions::FREQUENCY),
        ("K", Dimensions::TEMPERATURE),
        ("A", Dimensions::CURRENT),
        ("C", Dimensions::CHARGE),
        ("V", Dimensions::VOLTAGE),
        ("W", Dimensions::POWER),
        ("Pa", Dimensions::PRESSURE),
        ("bar", Dimensions::PRESSURE),
        ("mol", Dimensions::AMOUNT),
        ("rad", Dimensions::ANGLE),
        ("sr", Dimensions::SOLID_ANGLE),
        ("b", Dimensions::AREA),
        ("L", Dimensions::VOLUME),
        ("l", Dimensions::VOLUME),
    ])
});

/// Symbols and spelled-out names that are never prefixed.
static NAMED: Lazy<HashMap<&'static str, Dimensions>> = Lazy::new(|| {
    HashMap::from([
        ("1", Dimensions::DIMENSIONLESS),
        ("%", Dimensions::DIMENSIONLESS),
        ("percent", Dimensions::DIMENSIONLESS),
        ("counts", Dimensions::DIMENSIONLESS),
        ("count", Dimensions::DIMENSIONLESS),
        ("pulses", Dimensions::DIMENSIONLESS),
        ("dimensionless", Dimensions::DIMENSIONLESS),
        ("metre", Dimensions::LENGTH),
        ("meter", Dimensions::LENGTH),
        ("metres", Dimensions::LENGTH),
        ("meters", Dimensions::LENGTH),
        ("Å", Dimensions::LENGTH),
        ("Angstrom", Dimensions::LENGTH),
        ("angstrom", Dimensions::LENGTH),
        ("Angstroms", Dimensions::LENGTH),
        ("angstroms", Dimensions::LENGTH),
        ("barn", Dimensions::AREA),
        ("barns", Dimensions::AREA),
        ("litre", Dimensions::VOLUME),
        ("liter", Dimensions::VOLUME),
        ("second", Dimensions::TIME),
        ("seconds", Dimensions::TIME),
        ("sec", Dimensions::TIME),
        ("min", Dimensions::TIME),
        ("minute", Dimensions::TIME),
        ("minutes", Dimensions::TIME),
        ("h", Dimensions::TIME),
        ("hr", Dimensions::TIME),
        ("hour", Dimensions::TIME),
        ("hours", Dimensions::TIME),
        ("d", Dimensions::TIME),
        ("day", Dimensions::TIME),
        ("days", Dimensions::TIME),
        ("rpm", Dimensions::FREQUENCY),
        ("hertz", Dimensions::FREQUENCY),
        ("joule", Dimensions::ENERGY),
        ("amu", Dimensions::MASS),
        ("Da", Dimensions::MASS),
        ("kelvin", Dimensions::TEMPERATURE),
        ("celsius", Dimensions::TEMPERATURE),
        ("degC", Dimensions::TEMPERATURE),
        ("°C", Dimensions::TEMPERATURE),
        ("atm", Dimensions::PRESSURE),
        ("torr", Dimensions::PRESSURE),
        ("Torr", Dimensions::PRESSURE),
        ("ampere", Dimensions::CURRENT),
        ("volt", Dimensions::VOLTAGE),
        ("watt", Dimensions::POWER),
        ("deg", Dimensions::ANGLE),
        ("degree", Dimensions::ANGLE),
        ("degrees", Dimensions::ANGLE),
        ("°", Dimensions::ANGLE),
        ("radian", Dimensions::ANGLE),
        ("radians", Dimensions::ANGLE),
        ("steradian", Dimensions::SOLID_ANGLE),
    ])
});

/// SI prefixes, two-character prefix first.
const PREFIXES: &[&str] = &[
    "da", "Y", "Z", "E", "P", "T", "G", "M", "k", "h", "d", "c", "m", "u", "µ", "μ", "n", "p",
    "f", "a", "z", "y",
];

// Symbol with an optional `^`-introduced or bare trailing exponent: m, m2, m^-1, s-1.
static TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<sym>[A-Za-zÅµμ°%]+|1)(?:\^?(?P<exp>[-+]?\d+))?$").unwrap()
});

fn lookup_symbol(symbol: &str) -> Option<Dimensions> {
    if let Some(dims) = NAMED.get(symbol).or_else(|| PREFIXABLE.get(symbol)) {
        return Some(*dims);
    }
    PREFIXES.iter().find_map(|prefix| {
        symbol
            .strip_prefix(prefix)
            .filter(|rest| !rest.is_empty())
            .and_then(|rest| PREFIXABLE.get(rest).copied())
    })
}

fn parse_term(term: &str) -> Option<Dimensions> {
    let caps = TERM.captures(term)?;
    let dims = lookup_symbol(&caps["sym"])?;
    let exponent = match caps.name("exp") {
        Some(m) => m.as_str().parse::<i8>().ok()?,
        None => 1,
    };
    Some(Dimensions::DIMENSIONLESS.combine(dims, exponent))
}

fn parse_product(part: &str) -> Option<Dimensions> {
    part.split(|c: char| c == '*' || c == '.' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .try_fold(Dimensions::DIMENSIONLESS, |acc, term| {
            parse_term(term).map(|dims| acc.combine(dims, 1))
        })
}

/// Parse a unit string into its dimensional signature.
///
/// Returns `None` for blank or unrecognized units. Parenthesised
/// sub-expressions are not supported.
pub fn parse_units(units: &str) -> Option<Dimensions> {
    let normalized = units.trim().replace("**", "^");
    if normalized.is_empty() || normalized.contains(['(', ')']) {
        return None;
    }

    let mut parts = normalized.split('/');
    let numerator = parse_product(parts.next()?)?;
    parts.try_fold(numerator, |acc, part| {
        let part = part.trim();
        if part.is_empty() {
            return None;
        }
        parse_product(part).map(|dims| acc.combine(dims, -1))
    })
}

// =============================================================================
// UNIT CATEGORIES
// =============================================================================

/// Unit category declared for a field in NXDL (`NX_ENERGY`, `NX_LENGTH`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UnitCategory {
    /// Any declared unit is acceptable.
    Any,
    Angle,
    Area,
    Charge,
    CrossSection,
    Current,
    Dimensionless,
    Emittance,
    Energy,
    Flux,
    Frequency,
    Length,
    Mass,
    MassDensity,
    MolecularWeight,
    Period,
    PerArea,
    PerLength,
    Power,
    Pressure,
    Pulses,
    ScatteringLengthDensity,
    SolidAngle,
    Temperature,
    Time,
    TimeOfFlight,
    /// Translation or rotation: length, angle or dimensionless.
    Transformation,
    Unitless,
    Voltage,
    Volume,
    Wavelength,
    Wavenumber,
    /// No unit is expected.
    None,
}

const ALL_CATEGORIES: &[UnitCategory] = &[
    UnitCategory::Any,
    UnitCategory::Angle,
    UnitCategory::Area,
    UnitCategory::Charge,
    UnitCategory::CrossSection,
    UnitCategory::Current,
    UnitCategory::Dimensionless,
    UnitCategory::Emittance,
    UnitCategory::Energy,
    UnitCategory::Flux,
    UnitCategory::Frequency,
    UnitCategory::Length,
    UnitCategory::Mass,
    UnitCategory::MassDensity,
    UnitCategory::MolecularWeight,
    UnitCategory::Period,
    UnitCategory::PerArea,
    UnitCategory::PerLength,
    UnitCategory::Power,
    UnitCategory::Pressure,
    UnitCategory::Pulses,
    UnitCategory::ScatteringLengthDensity,
    UnitCategory::SolidAngle,
    UnitCategory::Temperature,
    UnitCategory::Time,
    UnitCategory::TimeOfFlight,
    UnitCategory::Transformation,
    UnitCategory::Unitless,
    UnitCategory::Voltage,
    UnitCategory::Volume,
    UnitCategory::Wavelength,
    UnitCategory::Wavenumber,
    UnitCategory::None,
];

impl UnitCategory {
    /// Every category, in declaration order.
    pub fn all() -> &'static [UnitCategory] {
        ALL_CATEGORIES
    }

    /// NXDL spelling, e.g. `NX_TIME_OF_FLIGHT`.
    pub fn nxdl_name(&self) -> &'static str {
        match self {
            UnitCategory::Any => "NX_ANY",
            UnitCategory::Angle => "NX_ANGLE",
            UnitCategory::Area => "NX_AREA",
            UnitCategory::Charge => "NX_CHARGE",
            UnitCategory::CrossSection => "NX_CROSS_SECTION",
            UnitCategory::Current => "NX_CURRENT",
            UnitCategory::Dimensionless => "NX_DIMENSIONLESS",
            UnitCategory::Emittance => "NX_EMITTANCE",
            UnitCategory::Energy => "NX_ENERGY",
            UnitCategory::Flux => "NX_FLUX",
            UnitCategory::Frequency => "NX_FREQUENCY",
            UnitCategory::Length => "NX_LENGTH",
            UnitCategory::Mass => "NX_MASS",
            UnitCategory::MassDensity => "NX_MASS_DENSITY",
            UnitCategory::MolecularWeight => "NX_MOLECULAR_WEIGHT",
            UnitCategory::Period => "NX_PERIOD",
            UnitCategory::PerArea => "NX_PER_AREA",
            UnitCategory::PerLength => "NX_PER_LENGTH",
            UnitCategory::Power => "NX_POWER",
            UnitCategory::Pressure => "NX_PRESSURE",
            UnitCategory::Pulses => "NX_PULSES",
            UnitCategory::ScatteringLengthDensity => "NX_SCATTERING_LENGTH_DENSITY",
            UnitCategory::SolidAngle => "NX_SOLID_ANGLE",
            UnitCategory::Temperature => "NX_TEMPERATURE",
            UnitCategory::Time => "NX_TIME",
            UnitCategory::TimeOfFlight => "NX_TIME_OF_FLIGHT",
            UnitCategory::Transformation => "NX_TRANSFORMATION",
            UnitCategory::Unitless => "NX_UNITLESS",
            UnitCategory::Voltage => "NX_VOLTAGE",
            UnitCategory::Volume => "NX_VOLUME",
            UnitCategory::Wavelength => "NX_WAVELENGTH",
            UnitCategory::Wavenumber => "NX_WAVENUMBER",
            UnitCategory::None => "NONE",
        }
    }

    /// Signatures a unit must have to belong to this category.
    fn signatures(&self) -> &'static [Dimensions] {
        match self {
            UnitCategory::Angle => &[Dimensions::ANGLE],
            UnitCategory::Area | UnitCategory::CrossSection => &[Dimensions::AREA],
            UnitCategory::Charge => &[Dimensions::CHARGE],
            UnitCategory::Current => &[Dimensions::CURRENT],
            UnitCategory::Dimensionless | UnitCategory::Unitless | UnitCategory::Pulses => {
                &[Dimensions::DIMENSIONLESS]
            }
            UnitCategory::Emittance => &[Dimensions::EMITTANCE],
            UnitCategory::Energy => &[Dimensions::ENERGY],
            UnitCategory::Flux => &[Dimensions::FLUX],
            UnitCategory::Frequency => &[Dimensions::FREQUENCY],
            UnitCategory::Length | UnitCategory::Wavelength => &[Dimensions::LENGTH],
            UnitCategory::Mass => &[Dimensions::MASS],
            UnitCategory::MassDensity => &[Dimensions::MASS_DENSITY],
            UnitCategory::MolecularWeight => &[Dimensions::MOLAR_MASS, Dimensions::MASS],
            UnitCategory::Period | UnitCategory::Time | UnitCategory::TimeOfFlight => {
                &[Dimensions::TIME]
            }
            UnitCategory::PerArea | UnitCategory::ScatteringLengthDensity => {
                &[Dimensions::PER_AREA]
            }
            UnitCategory::PerLength | UnitCategory::Wavenumber => &[Dimensions::PER_LENGTH],
            UnitCategory::Power => &[Dimensions::POWER],
            UnitCategory::Pressure => &[Dimensions::PRESSURE],
            UnitCategory::SolidAngle => &[Dimensions::SOLID_ANGLE],
            UnitCategory::Temperature => &[Dimensions::TEMPERATURE],
            UnitCategory::Transformation => &[
                Dimensions::LENGTH,
                Dimensions::ANGLE,
                Dimensions::DIMENSIONLESS,
            ],
            UnitCategory::Voltage => &[Dimensions::VOLTAGE],
            UnitCategory::Volume => &[Dimensions::VOLUME],
            UnitCategory::Any | UnitCategory::None => &[],
        }
    }

    /// Whether a field declaring `units` conforms to this category.
    ///
    /// A field without units conforms only to [`UnitCategory::None`].
    pub fn accepts(&self, units: Option<&str>) -> bool {
        let units = units.map(str::trim).filter(|u| !u.is_empty());
        match (self, units) {
            (UnitCategory::None, declared) => declared.is_none(),
            (_, None) => false,
            (UnitCategory::Any, Some(_)) => true,
            (category, Some(units)) => parse_units(units)
                .is_some_and(|dims| category.signatures().contains(&dims)),
        }
    }

    /// Classify a declared unit into its primary category.
    ///
    /// Absent or unrecognized units classify as `None`; recognized units
    /// with no dedicated category classify as `Any`.
    pub fn classify(units: Option<&str>) -> UnitCategory {
        let Some(dims) = units.and_then(parse_units) else {
            return UnitCategory::None;
        };
        match dims {
            d if d == Dimensions::DIMENSIONLESS => UnitCategory::Dimensionless,
            d if d == Dimensions::LENGTH => UnitCategory::Length,
            d if d == Dimensions::AREA => UnitCategory::Area,
            d if d == Dimensions::VOLUME => UnitCategory::Volume,
            d if d == Dimensions::PER_LENGTH => UnitCategory::PerLength,
            d if d == Dimensions::PER_AREA => UnitCategory::PerArea,
            d if d == Dimensions::MASS => UnitCategory::Mass,
            d if d == Dimensions::MASS_DENSITY => UnitCategory::MassDensity,
            d if d == Dimensions::MOLAR_MASS => UnitCategory::MolecularWeight,
            d if d == Dimensions::TIME => UnitCategory::Time,
            d if d == Dimensions::FREQUENCY => UnitCategory::Frequency,
            d if d == Dimensions::FLUX => UnitCategory::Flux,
            d if d == Dimensions::ENERGY => UnitCategory::Energy,
            d if d == Dimensions::POWER => UnitCategory::Power,
            d if d == Dimensions::PRESSURE => UnitCategory::Pressure,
            d if d == Dimensions::CURRENT => UnitCategory::Current,
            d if d == Dimensions::CHARGE => UnitCategory::Charge,
            d if d == Dimensions::VOLTAGE => UnitCategory::Voltage,
            d if d == Dimensions::TEMPERATURE => UnitCategory::Temperature,
            d if d == Dimensions::ANGLE => UnitCategory::Angle,
            d if d == Dimensions::SOLID_ANGLE => UnitCategory::SolidAngle,
            d if d == Dimensions::EMITTANCE => UnitCategory::Emittance,
            _ => UnitCategory::Any,
        }
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nxdl_name())
    }
}

impl FromStr for UnitCategory {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_CATEGORIES
            .iter()
            .find(|c| c.nxdl_name() == s)
            .copied()
            .ok_or_else(|| NexusError::Schema(format!("unknown unit category '{}'", s)))
    }
}

impl TryFrom<String> for UnitCategory {
    type Error = NexusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UnitCategory> for String {
    fn from(category: UnitCategory) -> Self {
        category.nxdl_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed_units() {
        assert_eq!(parse_units("meV"), Some(Dimensions::ENERGY));
        assert_eq!(parse_units("mm"), Some(Dimensions::LENGTH));
        assert_eq!(parse_units("us"), Some(Dimensions::TIME));
        assert_eq!(parse_units("µs"), Some(Dimensions::TIME));
        assert_eq!(parse_units("kg"), Some(Dimensions::MASS));
        assert_eq!(parse_units("MHz"), Some(Dimensions::FREQUENCY));
    }

    #[test]
    fn test_parse_compound_units() {
        assert_eq!(parse_units("m^-1"), Some(Dimensions::PER_LENGTH));
        assert_eq!(parse_units("1/angstrom"), Some(Dimensions::PER_LENGTH));
        assert_eq!(parse_units("kg/m^3"), Some(Dimensions::MASS_DENSITY));
        assert_eq!(parse_units("g cm-3"), Some(Dimensions::MASS_DENSITY));
        assert_eq!(parse_units("m**2"), Some(Dimensions::AREA));
        assert_eq!(parse_units("1/s/cm^2"), Some(Dimensions::FLUX));
        assert_eq!(parse_units("mm.mrad"), Some(Dimensions::EMITTANCE));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_units(""), None);
        assert_eq!(parse_units("furlongs"), None);
        assert_eq!(parse_units("m/"), None);
        assert_eq!(parse_units("(m*s)"), None);
    }

    #[test]
    fn test_named_units_win_over_prefixes() {
        assert_eq!(parse_units("min"), Some(Dimensions::TIME));
        assert_eq!(parse_units("h"), Some(Dimensions::TIME));
        assert_eq!(parse_units("hPa"), Some(Dimensions::PRESSURE));
        assert_eq!(parse_units("mbar"), Some(Dimensions::PRESSURE));
    }

    #[test]
    fn test_category_accepts() {
        assert!(UnitCategory::Energy.accepts(Some("meV")));
        assert!(UnitCategory::Wavelength.accepts(Some("Angstrom")));
        assert!(UnitCategory::Frequency.accepts(Some("Hz")));
        assert!(UnitCategory::Frequency.accepts(Some("rpm")));
        assert!(UnitCategory::TimeOfFlight.accepts(Some("us")));
        assert!(UnitCategory::Angle.accepts(Some("degrees")));
        assert!(UnitCategory::Transformation.accepts(Some("mm")));
        assert!(UnitCategory::Transformation.accepts(Some("deg")));
        assert!(!UnitCategory::Energy.accepts(Some("mm")));
        assert!(!UnitCategory::Length.accepts(Some("s")));
    }

    #[test]
    fn test_missing_units_only_conform_to_none() {
        assert!(UnitCategory::None.accepts(None));
        assert!(UnitCategory::None.accepts(Some("  ")));
        assert!(!UnitCategory::None.accepts(Some("m")));
        assert!(!UnitCategory::Energy.accepts(None));
        assert!(!UnitCategory::Any.accepts(None));
        assert!(UnitCategory::Any.accepts(Some("furlongs")));
    }

    #[test]
    fn test_classify() {
        assert_eq!(UnitCategory::classify(Some("meV")), UnitCategory::Energy);
        assert_eq!(UnitCategory::classify(Some("nm")), UnitCategory::Length);
        assert_eq!(UnitCategory::classify(Some("sr")), UnitCategory::SolidAngle);
        assert_eq!(UnitCategory::classify(Some("m/s")), UnitCategory::Any);
        assert_eq!(UnitCategory::classify(Some("bogus")), UnitCategory::None);
        assert_eq!(UnitCategory::classify(None), UnitCategory::None);
    }

    #[test]
    fn test_nxdl_name_round_trip() {
        for category in ALL_CATEGORIES {
            assert_eq!(category.nxdl_name().parse::<UnitCategory>().unwrap(), *category);
        }
        assert!("NX_SPEED".parse::<UnitCategory>().is_err());
    }
}
