use polars::prelude::*;

use crate::errors::ClassifierError;

/// Class whose probability drives the m6A call.
pub const POSITIVE_CLASS: &str = "Positive";

/// A pre-trained model that scores encoded feature tables.
pub trait Classifier {
    /// Class labels, in the column order of [`Classifier::predict_proba`].
    fn classes(&self) -> &[String];

    /// Per-row class probabilities: one `Float64` column per class, named by
    /// the class label, with one row per input row.
    fn predict_proba(&self, features: &DataFrame) -> Result<DataFrame, ClassifierError>;
}

/// Pull one class column out of a probability table and check it.
pub(crate) fn class_probabilities(
    probabilities: &DataFrame,
    class: &str,
    expected_rows: usize,
) -> Result<Vec<f64>, ClassifierError> {
    if !probabilities.schema().contains(class) {
        return Err(ClassifierError::MissingClass(class.to_string()));
    }
    if probabilities.height() != expected_rows {
        return Err(ClassifierError::RowCountMismatch {
            expected: expected_rows,
            found: probabilities.height(),
        });
    }

    let column = probabilities.column(class)?.cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, opt)| match opt {
            Some(p) if (0.0..=1.0).contains(&p) => Ok(p),
            value => Err(ClassifierError::InvalidProbability { row, value }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn extracts_positive_column() {
        let probs = df![
            "Negative" => &[0.9, 0.2],
            "Positive" => &[0.1, 0.8]
        ]
        .unwrap();
        assert_eq!(class_probabilities(&probs, POSITIVE_CLASS, 2).unwrap(), vec![0.1, 0.8]);
    }

    #[test]
    fn rejects_malformed_outputs() {
        let probs = df!["Negative" => &[1.0]].unwrap();
        assert!(matches!(
            class_probabilities(&probs, POSITIVE_CLASS, 1),
            Err(ClassifierError::MissingClass(_))
        ));

        let probs = df!["Positive" => &[0.3]].unwrap();
        assert!(matches!(
            class_probabilities(&probs, POSITIVE_CLASS, 2),
            Err(ClassifierError::RowCountMismatch { expected: 2, found: 1 })
        ));

        let probs = df!["Positive" => &[Some(0.3), None, Some(1.2)]].unwrap();
        assert!(matches!(
            class_probabilities(&probs, POSITIVE_CLASS, 3),
            Err(ClassifierError::InvalidProbability { row: 1, value: None })
        ));
    }
}
