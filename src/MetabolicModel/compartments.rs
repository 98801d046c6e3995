//! # Compartment resolver
//!
//! Metabolite identifiers of curated models carry their compartment as a suffix. Two
//! conventions are accepted:
//!
//! | convention   | example    | base  | compartment |
//! |--------------|------------|-------|-------------|
//! | `Bracket`    | `atp[c]`   | `atp` | `c`         |
//! | `Underscore` | `glc__D_e` | `glc__D` | `e`      |
//!
//! The convention is detected once from the first identifier and then applied to every
//! metabolite. Conventions live in the `SUFFIX_RULES` table, so a new one is a new row there.
use crate::errors::PhAdjustError;
use log::warn;
use regex::Regex;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixConvention {
    Bracket,
    Underscore,
}

// (convention, pattern with `base` and `comp` groups); detection order is table order
const SUFFIX_RULES: [(SuffixConvention, &str); 2] = [
    (
        SuffixConvention::Bracket,
        r"^(?P<base>.+)\[(?P<comp>[^\[\]]+)\]$",
    ),
    (SuffixConvention::Underscore, r"^(?P<base>.+)_(?P<comp>[^_]+)$"),
];

impl SuffixConvention {
    fn pattern(&self) -> &'static str {
        SUFFIX_RULES
            .iter()
            .find(|(convention, _)| convention == self)
            .map(|(_, pattern)| *pattern)
            .unwrap_or(SUFFIX_RULES[0].1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuffixConvention::Bracket => "bracket",
            SuffixConvention::Underscore => "underscore",
        }
    }

    /// first convention of the rule table that parses `id`
    pub fn detect(id: &str) -> Result<Self, PhAdjustError> {
        for (convention, _) in SUFFIX_RULES.iter() {
            if SuffixParser::new(*convention)?.split(id).is_some() {
                return Ok(*convention);
            }
        }
        Err(PhAdjustError::FormatError(format!(
            "cannot detect a compartment suffix in metabolite id '{}'",
            id
        )))
    }

    /// builds a compartment-tagged identifier, e.g. `h` + `c` -> `h[c]`
    pub fn tag(&self, base: &str, compartment: &str) -> String {
        match self {
            SuffixConvention::Bracket => format!("{}[{}]", base, compartment),
            SuffixConvention::Underscore => format!("{}_{}", base, compartment),
        }
    }
}

/// Compiled pattern of one suffix convention.
#[derive(Debug, Clone)]
pub struct SuffixParser {
    pub convention: SuffixConvention,
    re: Regex,
}

impl SuffixParser {
    pub fn new(convention: SuffixConvention) -> Result<Self, PhAdjustError> {
        let re = Regex::new(convention.pattern())
            .map_err(|e| PhAdjustError::FormatError(format!("bad suffix pattern: {}", e)))?;
        Ok(Self { convention, re })
    }

    /// (base name, compartment code) of an identifier
    pub fn split<'a>(&self, id: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.re.captures(id)?;
        let base = caps.name("base")?.as_str();
        let comp = caps.name("comp")?.as_str();
        Some((base, comp))
    }
}

/// Result of resolving the compartments of all metabolites.
#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentMap {
    pub convention: SuffixConvention,
    /// ordered compartment codes
    pub vocabulary: Vec<String>,
    /// compartment index of every metabolite
    pub met_compartment: Vec<usize>,
    /// the model declared no vocabulary and the resolved one was adopted
    pub adopted: bool,
}

impl CompartmentMap {
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn index_of(&self, compartment: &str) -> Option<usize> {
        self.vocabulary.iter().position(|c| c == compartment)
    }

    pub fn compartment_of(&self, met: usize) -> &str {
        &self.vocabulary[self.met_compartment[met]]
    }

    /// registers a metabolite appended to the model after resolution
    pub fn push_metabolite(&mut self, compartment: usize) {
        self.met_compartment.push(compartment);
    }
}

/// Resolves the compartment of every metabolite identifier.
///
/// With a declared vocabulary the resolved set must contain exactly the same codes; indices then
/// follow the declared order. Without one the resolved codes are adopted in order of first
/// appearance.
pub fn resolve_compartments(
    met_ids: &[String],
    declared: Option<&[String]>,
) -> Result<CompartmentMap, PhAdjustError> {
    let first = met_ids
        .first()
        .ok_or_else(|| PhAdjustError::FormatError("model has no metabolites".to_string()))?;
    let convention = SuffixConvention::detect(first)?;
    let parser = SuffixParser::new(convention)?;

    let mut resolved: Vec<String> = Vec::new();
    let mut codes: Vec<&str> = Vec::with_capacity(met_ids.len());
    for id in met_ids {
        let (_, comp) = parser.split(id).ok_or_else(|| {
            PhAdjustError::FormatError(format!(
                "metabolite id '{}' has no {} compartment suffix",
                id,
                convention.as_str()
            ))
        })?;
        if !resolved.iter().any(|c| c == comp) {
            resolved.push(comp.to_string());
        }
        codes.push(comp);
    }

    let (vocabulary, adopted) = match declared {
        Some(declared) => {
            let declared_set: HashSet<&String> = declared.iter().collect();
            let resolved_set: HashSet<&String> = resolved.iter().collect();
            if declared.len() != resolved.len() || declared_set != resolved_set {
                return Err(PhAdjustError::CompartmentMismatch {
                    declared: declared.to_vec(),
                    resolved,
                });
            }
            (declared.to_vec(), false)
        }
        None => {
            warn!(
                "model declares no compartments, adopting {:?} resolved from metabolite ids",
                resolved
            );
            (resolved, true)
        }
    };

    let met_compartment = codes
        .iter()
        .map(|code| {
            vocabulary
                .iter()
                .position(|c| c == code)
                .ok_or_else(|| PhAdjustError::FormatError(format!("unknown compartment '{}'", code)))
        })
        .collect::<Result<Vec<usize>, PhAdjustError>>()?;

    Ok(CompartmentMap {
        convention,
        vocabulary,
        met_compartment,
        adopted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_conventions() {
        let bracket = SuffixParser::new(SuffixConvention::Bracket).unwrap();
        assert_eq!(bracket.split("atp[c]"), Some(("atp", "c")));
        assert_eq!(bracket.split("h[im]"), Some(("h", "im")));
        assert_eq!(bracket.split("atp_c"), None);
        let underscore = SuffixParser::new(SuffixConvention::Underscore).unwrap();
        assert_eq!(underscore.split("glc__D_e"), Some(("glc__D", "e")));
        assert_eq!(underscore.split("atp"), None);
        assert_eq!(SuffixConvention::Underscore.tag("h", "p"), "h_p");
        assert_eq!(SuffixConvention::Bracket.tag("h", "p"), "h[p]");
    }

    #[test]
    fn test_detect_from_first_id() {
        assert_eq!(
            SuffixConvention::detect("atp[c]").unwrap(),
            SuffixConvention::Bracket
        );
        assert_eq!(
            SuffixConvention::detect("atp_c").unwrap(),
            SuffixConvention::Underscore
        );
        assert!(matches!(
            SuffixConvention::detect("atp"),
            Err(PhAdjustError::FormatError(_))
        ));
    }

    #[test]
    fn test_resolve_and_adopt() {
        let map = resolve_compartments(&ids(&["atp[c]", "glc[e]", "adp[c]", "h[m]"]), None).unwrap();
        assert_eq!(map.vocabulary, vec!["c", "e", "m"]);
        assert_eq!(map.met_compartment, vec![0, 1, 0, 2]);
        assert!(map.adopted);
        assert_eq!(map.compartment_of(3), "m");
    }

    #[test]
    fn test_declared_order_is_kept() {
        let declared = ids(&["e", "c"]);
        let map = resolve_compartments(&ids(&["atp_c", "glc_e"]), Some(&declared)).unwrap();
        assert_eq!(map.vocabulary, vec!["e", "c"]);
        assert_eq!(map.met_compartment, vec![1, 0]);
        assert!(!map.adopted);
    }

    #[test]
    fn test_mismatch() {
        let declared = ids(&["c", "e", "m"]);
        let err = resolve_compartments(&ids(&["atp[c]", "glc[e]"]), Some(&declared)).unwrap_err();
        assert!(matches!(err, PhAdjustError::CompartmentMismatch { .. }));
        let declared = ids(&["c", "x"]);
        let err = resolve_compartments(&ids(&["atp[c]", "glc[e]"]), Some(&declared)).unwrap_err();
        assert!(matches!(err, PhAdjustError::CompartmentMismatch { .. }));
    }

    #[test]
    fn test_mixed_conventions_fail() {
        let err = resolve_compartments(&ids(&["atp[c]", "glc_e"]), None).unwrap_err();
        assert!(matches!(err, PhAdjustError::FormatError(_)));
        let err = resolve_compartments(&[], None).unwrap_err();
        assert!(matches!(err, PhAdjustError::FormatError(_)));
    }
}
