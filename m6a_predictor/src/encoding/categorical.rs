use polars::prelude::*;
use tracing::{debug, warn};

use crate::models::CategoricalDomain;

/// Restrict a column to the levels of `D`.
///
/// Values outside the domain become null, which is how an unmapped level
/// reaches the classifier. The column keeps its name.
pub fn restrict_to_domain<D: CategoricalDomain>(column: &Column) -> PolarsResult<Series> {
    let name = column.name().clone();
    let as_text = column.cast(&DataType::String)?;
    let values = as_text.str()?;

    let mut unmapped = 0usize;
    let restricted: Vec<Option<&'static str>> = values
        .into_iter()
        .map(|opt| {
            opt.and_then(|raw| {
                let level = D::parse_level(raw).map(|level| level.as_str());
                if level.is_none() {
                    debug!("Unmapped level `{}` in column {}", raw, name);
                    unmapped += 1;
                }
                level
            })
        })
        .collect();

    if unmapped > 0 {
        warn!(
            "{} value(s) in `{}` fall outside {{{}}} and are left unmapped",
            unmapped,
            name,
            D::level_names().join(",")
        );
    }

    Ok(Series::new(name, restricted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RnaRegion, RnaType};
    use polars::df;

    #[test]
    fn out_of_domain_values_become_null() {
        let df = df![
            "RNA_type" => &[Some("mRNA"), Some("snoRNA"), None, Some("pseudogene")]
        ]
        .unwrap();

        let restricted = restrict_to_domain::<RnaType>(df.column("RNA_type").unwrap()).unwrap();
        let values: Vec<Option<&str>> = restricted.str().unwrap().into_iter().collect();

        assert_eq!(restricted.name().as_str(), "RNA_type");
        assert_eq!(values, vec![Some("mRNA"), None, None, Some("pseudogene")]);
    }

    #[test]
    fn utr_levels_keep_their_apostrophe() {
        let df = df!["RNA_region" => &["3'UTR", "5'UTR", "UTR3", "intron"]].unwrap();

        let restricted = restrict_to_domain::<RnaRegion>(df.column("RNA_region").unwrap()).unwrap();
        let values: Vec<Option<&str>> = restricted.str().unwrap().into_iter().collect();

        assert_eq!(values, vec![Some("3'UTR"), Some("5'UTR"), None, Some("intron")]);
    }
}
