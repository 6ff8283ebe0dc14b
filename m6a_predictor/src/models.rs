use std::fmt;

use serde::{Deserialize, Serialize};

pub const GC_CONTENT: &str = "gc_content";
pub const RNA_TYPE: &str = "RNA_type";
pub const RNA_REGION: &str = "RNA_region";
pub const EXON_LENGTH: &str = "exon_length";
pub const DISTANCE_TO_JUNCTION: &str = "distance_to_junction";
pub const EVOLUTIONARY_CONSERVATION: &str = "evolutionary_conservation";
pub const DNA_5MER: &str = "DNA_5mer";

pub const PREDICTED_PROB: &str = "predicted_m6A_prob";
pub const PREDICTED_STATUS: &str = "predicted_m6A_status";

/// Prefix of the per-position nucleotide columns (`nt_pos1`, `nt_pos2`, ...).
pub const NT_POS_PREFIX: &str = "nt_pos";

/// The seven columns every feature table has to provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    GC_CONTENT,
    RNA_TYPE,
    RNA_REGION,
    EXON_LENGTH,
    DISTANCE_TO_JUNCTION,
    EVOLUTIONARY_CONSERVATION,
    DNA_5MER,
];

pub const NUMERIC_COLUMNS: [&str; 4] = [
    GC_CONTENT,
    EXON_LENGTH,
    DISTANCE_TO_JUNCTION,
    EVOLUTIONARY_CONSERVATION,
];

/// A closed set of levels a categorical feature may take.
///
/// Values outside the set are unmapped and travel to the classifier as nulls.
pub trait CategoricalDomain: Sized + Copy + 'static {
    /// Levels in their canonical order.
    const LEVELS: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse_level(value: &str) -> Option<Self> {
        Self::LEVELS.iter().copied().find(|level| level.as_str() == value)
    }

    fn level_names() -> Vec<&'static str> {
        Self::LEVELS.iter().map(|level| level.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RnaType {
    MRna,
    LincRna,
    LncRna,
    Pseudogene,
}

impl CategoricalDomain for RnaType {
    const LEVELS: &'static [Self] = &[
        RnaType::MRna,
        RnaType::LincRna,
        RnaType::LncRna,
        RnaType::Pseudogene,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            RnaType::MRna => "mRNA",
            RnaType::LincRna => "lincRNA",
            RnaType::LncRna => "lncRNA",
            RnaType::Pseudogene => "pseudogene",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RnaRegion {
    Cds,
    Intron,
    ThreePrimeUtr,
    FivePrimeUtr,
}

impl CategoricalDomain for RnaRegion {
    const LEVELS: &'static [Self] = &[
        RnaRegion::Cds,
        RnaRegion::Intron,
        RnaRegion::ThreePrimeUtr,
        RnaRegion::FivePrimeUtr,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            RnaRegion::Cds => "CDS",
            RnaRegion::Intron => "intron",
            RnaRegion::ThreePrimeUtr => "3'UTR",
            RnaRegion::FivePrimeUtr => "5'UTR",
        }
    }
}

/// DNA alphabet used for the per-position columns. Case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    A,
    T,
    C,
    G,
}

impl Nucleotide {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Nucleotide::A),
            'T' => Some(Nucleotide::T),
            'C' => Some(Nucleotide::C),
            'G' => Some(Nucleotide::G),
            _ => None,
        }
    }
}

impl CategoricalDomain for Nucleotide {
    const LEVELS: &'static [Self] = &[Nucleotide::A, Nucleotide::T, Nucleotide::C, Nucleotide::G];

    fn as_str(&self) -> &'static str {
        match self {
            Nucleotide::A => "A",
            Nucleotide::T => "T",
            Nucleotide::C => "C",
            Nucleotide::G => "G",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum M6aStatus {
    Positive,
    Negative,
}

impl M6aStatus {
    /// Positive only when the probability is strictly above the threshold.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability > threshold {
            M6aStatus::Positive
        } else {
            M6aStatus::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            M6aStatus::Positive => "Positive",
            M6aStatus::Negative => "Negative",
        }
    }
}

impl fmt::Display for M6aStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One candidate site, with categoricals kept as raw text so unmapped values
/// can still be passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub gc_content: f64,
    #[serde(rename = "RNA_type")]
    pub rna_type: String,
    #[serde(rename = "RNA_region")]
    pub rna_region: String,
    pub exon_length: f64,
    pub distance_to_junction: f64,
    pub evolutionary_conservation: f64,
    #[serde(rename = "DNA_5mer")]
    pub dna_5mer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinglePrediction {
    #[serde(rename = "predicted_m6A_prob")]
    pub predicted_m6a_prob: f64,
    #[serde(rename = "predicted_m6A_status")]
    pub predicted_m6a_status: M6aStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_parse_only_their_levels() {
        assert_eq!(RnaType::parse_level("lincRNA"), Some(RnaType::LincRna));
        assert_eq!(RnaType::parse_level("miRNA"), None);
        assert_eq!(RnaRegion::parse_level("3'UTR"), Some(RnaRegion::ThreePrimeUtr));
        assert_eq!(RnaRegion::parse_level("cds"), None);
        assert_eq!(Nucleotide::from_char('g'), None);
        assert_eq!(Nucleotide::level_names(), vec!["A", "T", "C", "G"]);
    }

    #[test]
    fn status_boundary_is_exclusive() {
        assert_eq!(M6aStatus::from_probability(0.5, 0.5), M6aStatus::Negative);
        assert_eq!(M6aStatus::from_probability(0.5001, 0.5), M6aStatus::Positive);
        assert_eq!(M6aStatus::from_probability(0.0, 0.0), M6aStatus::Negative);
        assert_eq!(M6aStatus::Positive.to_string(), "Positive");
    }

    #[test]
    fn single_prediction_uses_output_column_names() {
        let prediction = SinglePrediction {
            predicted_m6a_prob: 0.75,
            predicted_m6a_status: M6aStatus::Positive,
        };
        let json = serde_json::to_value(prediction).unwrap();
        assert_eq!(json["predicted_m6A_prob"], 0.75);
        assert_eq!(json["predicted_m6A_status"], "Positive");
    }
}
