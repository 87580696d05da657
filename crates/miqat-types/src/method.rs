use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MiqatError;

/// Prayer time calculation method.
///
/// The standard methods are forwarded to the calculator. The `ie-*`
/// identifiers select an alternate published timetable and use
/// [`CalculationMethod::REFERENCE`] for their reference times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMethod {
    /// Shia Ithna-Ashari, Leva Institute, Qum.
    Jafari,
    /// University of Islamic Sciences, Karachi.
    Karachi,
    /// Islamic Society of North America.
    Isna,
    /// Muslim World League.
    Mwl,
    /// Umm Al-Qura University, Makkah.
    Makkah,
    /// Egyptian General Authority of Survey.
    Egypt,
    /// Institute of Geophysics, University of Tehran.
    Tehran,
    /// Gulf Region.
    Gulf,
    Kuwait,
    Qatar,
    /// Majlis Ugama Islam Singapura.
    Singapore,
    /// Union Organization Islamic de France.
    France,
    /// Diyanet İşleri Başkanlığı.
    Turkey,
    /// Spiritual Administration of Muslims of Russia.
    Russia,
    /// Islamic Cultural Centre of Ireland timetable.
    #[serde(rename = "ie-icci")]
    IeIcci,
    /// Muslim Community Northern Dublin (WordPress prayer time plugin).
    #[serde(rename = "ie-mcnd")]
    IeMcnd,
    /// Hamza Islamic Cultural Centre (WordPress prayer time plugin).
    #[serde(rename = "ie-hicc")]
    IeHicc,
}

/// Which kind of source provides the display prayer times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Standard,
    RegionalTimetable,
    /// WordPress "Daily Prayer Time" plugin; the site is the method suffix.
    WordPressPlugin { site: &'static str },
}

impl CalculationMethod {
    /// Method pinned for reference Maghrib/Midnight and Hijri data when the
    /// configured method is not a standard one.
    pub const REFERENCE: CalculationMethod = CalculationMethod::Isna;

    pub const ALL: [CalculationMethod; 17] = [
        CalculationMethod::Jafari,
        CalculationMethod::Karachi,
        CalculationMethod::Isna,
        CalculationMethod::Mwl,
        CalculationMethod::Makkah,
        CalculationMethod::Egypt,
        CalculationMethod::Tehran,
        CalculationMethod::Gulf,
        CalculationMethod::Kuwait,
        CalculationMethod::Qatar,
        CalculationMethod::Singapore,
        CalculationMethod::France,
        CalculationMethod::Turkey,
        CalculationMethod::Russia,
        CalculationMethod::IeIcci,
        CalculationMethod::IeMcnd,
        CalculationMethod::IeHicc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::Jafari => "jafari",
            CalculationMethod::Karachi => "karachi",
            CalculationMethod::Isna => "isna",
            CalculationMethod::Mwl => "mwl",
            CalculationMethod::Makkah => "makkah",
            CalculationMethod::Egypt => "egypt",
            CalculationMethod::Tehran => "tehran",
            CalculationMethod::Gulf => "gulf",
            CalculationMethod::Kuwait => "kuwait",
            CalculationMethod::Qatar => "qatar",
            CalculationMethod::Singapore => "singapore",
            CalculationMethod::France => "france",
            CalculationMethod::Turkey => "turkey",
            CalculationMethod::Russia => "russia",
            CalculationMethod::IeIcci => "ie-icci",
            CalculationMethod::IeMcnd => "ie-mcnd",
            CalculationMethod::IeHicc => "ie-hicc",
        }
    }

    /// Aladhan numeric method id, `None` for the alternate-source methods.
    pub fn aladhan_id(&self) -> Option<u8> {
        match self {
            CalculationMethod::Jafari => Some(0),
            CalculationMethod::Karachi => Some(1),
            CalculationMethod::Isna => Some(2),
            CalculationMethod::Mwl => Some(3),
            CalculationMethod::Makkah => Some(4),
            CalculationMethod::Egypt => Some(5),
            CalculationMethod::Tehran => Some(7),
            CalculationMethod::Gulf => Some(8),
            CalculationMethod::Kuwait => Some(9),
            CalculationMethod::Qatar => Some(10),
            CalculationMethod::Singapore => Some(11),
            CalculationMethod::France => Some(12),
            CalculationMethod::Turkey => Some(13),
            CalculationMethod::Russia => Some(14),
            CalculationMethod::IeIcci | CalculationMethod::IeMcnd | CalculationMethod::IeHicc => None,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        match self {
            CalculationMethod::IeIcci => SourceKind::RegionalTimetable,
            CalculationMethod::IeMcnd => SourceKind::WordPressPlugin { site: "mcnd" },
            CalculationMethod::IeHicc => SourceKind::WordPressPlugin { site: "hicc" },
            _ => SourceKind::Standard,
        }
    }

    pub fn is_standard(&self) -> bool {
        self.source_kind() == SourceKind::Standard
    }

    /// The method the standard calculator is called with for this cycle.
    pub fn standard_method(&self) -> CalculationMethod {
        if self.is_standard() { *self } else { Self::REFERENCE }
    }
}

impl Default for CalculationMethod {
    fn default() -> Self {
        Self::IeIcci
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationMethod {
    type Err = MiqatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| MiqatError::invalid_config(format!("Unknown calculation method '{}'", s)))
    }
}

/// How iqamah times are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IqamahMethod {
    /// Fixed minute offsets after each prayer.
    #[default]
    Offset,
    /// Times fetched from a custom endpoint.
    Api,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for method in CalculationMethod::ALL {
            assert_eq!(method.as_str().parse::<CalculationMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_default_is_icci() {
        assert_eq!(CalculationMethod::default(), CalculationMethod::IeIcci);
        assert_eq!(IqamahMethod::default(), IqamahMethod::Offset);
    }

    #[test]
    fn test_alternate_methods_use_reference() {
        assert_eq!(CalculationMethod::IeMcnd.standard_method(), CalculationMethod::Isna);
        assert_eq!(CalculationMethod::Egypt.standard_method(), CalculationMethod::Egypt);
        assert_eq!(CalculationMethod::IeHicc.aladhan_id(), None);
        assert_eq!(
            CalculationMethod::IeHicc.source_kind(),
            SourceKind::WordPressPlugin { site: "hicc" }
        );
    }

    #[test]
    fn test_unknown_method() {
        assert!(matches!(
            "umm-al-somewhere".parse::<CalculationMethod>(),
            Err(MiqatError::Configuration { .. })
        ));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&CalculationMethod::IeIcci).unwrap();
        assert_eq!(json, "\"ie-icci\"");
        let method: CalculationMethod = serde_json::from_str("\"mwl\"").unwrap();
        assert_eq!(method, CalculationMethod::Mwl);
    }
}
