//! Serialized random forest classifier
//!
//! A forest is stored as JSON: the class labels, the features it was trained
//! on (numeric, or categorical with their levels) and a flat node list per
//! tree. Children always sit at a higher index than their parent, so every
//! walk from the root ends at a leaf.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ClassifierError;
use crate::prediction_tools::classifier::Classifier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    Numeric { name: String },
    Categorical { name: String, levels: Vec<String> },
}

impl FeatureSpec {
    pub fn name(&self) -> &str {
        match self {
            FeatureSpec::Numeric { name } => name,
            FeatureSpec::Categorical { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// `x <= threshold` goes left.
    NumericSplit {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Levels listed in `left_levels` go left, all others right.
    CategoricalSplit {
        feature: usize,
        left_levels: Vec<String>,
        left: usize,
        right: usize,
    },
    /// Class votes, normalized per tree.
    Leaf { votes: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub classes: Vec<String>,
    pub features: Vec<FeatureSpec>,
    pub trees: Vec<Vec<TreeNode>>,
}

// Validated node with categorical levels resolved to indices
#[derive(Debug, Clone)]
enum CompiledNode {
    Numeric {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Categorical {
        feature: usize,
        goes_left: Vec<bool>,
        left: usize,
        right: usize,
    },
    Leaf {
        probabilities: Vec<f64>,
    },
}

// Per-feature predictor values for every row of the table being scored
enum FeatureColumn {
    Numeric(Vec<f64>),
    Categorical(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestSummary {
    pub classes: Vec<String>,
    pub features: Vec<String>,
    pub n_trees: usize,
    pub max_depth: usize,
}

impl fmt::Display for ForestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Random forest with {} trees (max depth {})", self.n_trees, self.max_depth)?;
        writeln!(f, "Classes:  {}", self.classes.join(", "))?;
        write!(f, "Features: {}", self.features.join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    model: ForestModel,
    trees: Vec<Vec<CompiledNode>>,
}

fn invalid(msg: String) -> ClassifierError {
    ClassifierError::InvalidModel(msg)
}

fn check_child(tree: usize, node: usize, child: usize, len: usize) -> Result<(), ClassifierError> {
    if child <= node || child >= len {
        return Err(invalid(format!(
            "tree {} node {} points to child {} (tree has {} nodes, children must come after their parent)",
            tree, node, child, len
        )));
    }
    Ok(())
}

impl RandomForestClassifier {
    /// Validate a deserialized forest and prepare it for scoring.
    pub fn from_model(model: ForestModel) -> Result<Self, ClassifierError> {
        if model.classes.is_empty() {
            return Err(invalid("model declares no classes".to_string()));
        }
        let unique: HashSet<&str> = model.classes.iter().map(String::as_str).collect();
        if unique.len() != model.classes.len() {
            return Err(invalid("class labels must be unique".to_string()));
        }
        if model.trees.is_empty() {
            return Err(invalid("model contains no trees".to_string()));
        }

        let n_classes = model.classes.len();
        let mut trees = Vec::with_capacity(model.trees.len());

        for (t, nodes) in model.trees.iter().enumerate() {
            if nodes.is_empty() {
                return Err(invalid(format!("tree {} has no nodes", t)));
            }

            let mut compiled = Vec::with_capacity(nodes.len());
            for (i, node) in nodes.iter().enumerate() {
                let c = match node {
                    TreeNode::NumericSplit { feature, threshold, left, right } => {
                        match model.features.get(*feature) {
                            Some(FeatureSpec::Numeric { .. }) => {}
                            _ => {
                                return Err(invalid(format!(
                                    "tree {} node {}: feature {} is not a numeric feature",
                                    t, i, feature
                                )))
                            }
                        }
                        if threshold.is_nan() {
                            return Err(invalid(format!("tree {} node {}: threshold is NaN", t, i)));
                        }
                        check_child(t, i, *left, nodes.len())?;
                        check_child(t, i, *right, nodes.len())?;
                        CompiledNode::Numeric {
                            feature: *feature,
                            threshold: *threshold,
                            left: *left,
                            right: *right,
                        }
                    }
                    TreeNode::CategoricalSplit { feature, left_levels, left, right } => {
                        let levels = match model.features.get(*feature) {
                            Some(FeatureSpec::Categorical { levels, .. }) => levels,
                            _ => {
                                return Err(invalid(format!(
                                    "tree {} node {}: feature {} is not a categorical feature",
                                    t, i, feature
                                )))
                            }
                        };
                        let mut goes_left = vec![false; levels.len()];
                        for level in left_levels {
                            match levels.iter().position(|l| l == level) {
                                Some(idx) => goes_left[idx] = true,
                                None => {
                                    return Err(invalid(format!(
                                        "tree {} node {}: level `{}` is not a level of feature `{}`",
                                        t,
                                        i,
                                        level,
                                        model.features[*feature].name()
                                    )))
                                }
                            }
                        }
                        check_child(t, i, *left, nodes.len())?;
                        check_child(t, i, *right, nodes.len())?;
                        CompiledNode::Categorical {
                            feature: *feature,
                            goes_left,
                            left: *left,
                            right: *right,
                        }
                    }
                    TreeNode::Leaf { votes } => {
                        if votes.len() != n_classes {
                            return Err(invalid(format!(
                                "tree {} node {}: {} votes for {} classes",
                                t,
                                i,
                                votes.len(),
                                n_classes
                            )));
                        }
                        if votes.iter().any(|v| !v.is_finite() || *v < 0.0) {
                            return Err(invalid(format!(
                                "tree {} node {}: votes must be finite and non-negative",
                                t, i
                            )));
                        }
                        let total: f64 = votes.iter().sum();
                        if total <= 0.0 {
                            return Err(invalid(format!("tree {} node {}: leaf has no votes", t, i)));
                        }
                        CompiledNode::Leaf {
                            probabilities: votes.iter().map(|v| v / total).collect(),
                        }
                    }
                };
                compiled.push(c);
            }
            trees.push(compiled);
        }

        Ok(Self { model, trees })
    }

    /// Read a forest from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        info!("Loading random forest from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let model: ForestModel = serde_json::from_reader(reader)?;
        let forest = Self::from_model(model)?;
        debug!("{}", forest.describe());
        Ok(forest)
    }

    pub fn describe(&self) -> ForestSummary {
        ForestSummary {
            classes: self.model.classes.clone(),
            features: self.model.features.iter().map(|f| f.name().to_string()).collect(),
            n_trees: self.trees.len(),
            max_depth: self.trees.iter().map(|t| tree_depth(t)).max().unwrap_or(0),
        }
    }

    fn resolve_features(&self, df: &DataFrame) -> Result<Vec<FeatureColumn>, ClassifierError> {
        let mut resolved = Vec::with_capacity(self.model.features.len());

        for spec in &self.model.features {
            let name = spec.name();
            if !df.schema().contains(name) {
                return Err(ClassifierError::MissingFeature(name.to_string()));
            }
            let column = df.column(name)?;

            match spec {
                FeatureSpec::Numeric { .. } => {
                    let values = column.cast(&DataType::Float64)?;
                    let values = values
                        .f64()?
                        .into_iter()
                        .enumerate()
                        .map(|(row, opt)| match opt {
                            Some(v) if !v.is_nan() => Ok(v),
                            _ => Err(ClassifierError::MissingValue {
                                feature: name.to_string(),
                                row,
                            }),
                        })
                        .collect::<Result<Vec<f64>, _>>()?;
                    resolved.push(FeatureColumn::Numeric(values));
                }
                FeatureSpec::Categorical { levels, .. } => {
                    let values = column.cast(&DataType::String)?;
                    let values = values
                        .str()?
                        .into_iter()
                        .enumerate()
                        .map(|(row, opt)| {
                            let value = opt.ok_or_else(|| ClassifierError::MissingValue {
                                feature: name.to_string(),
                                row,
                            })?;
                            levels
                                .iter()
                                .position(|l| l == value)
                                .ok_or_else(|| ClassifierError::UnknownLevel {
                                    feature: name.to_string(),
                                    level: value.to_string(),
                                    row,
                                })
                        })
                        .collect::<Result<Vec<usize>, _>>()?;
                    resolved.push(FeatureColumn::Categorical(values));
                }
            }
        }

        Ok(resolved)
    }
}

fn walk<'a>(tree: &'a [CompiledNode], features: &[FeatureColumn], row: usize) -> &'a [f64] {
    let mut idx = 0;
    loop {
        idx = match &tree[idx] {
            CompiledNode::Leaf { probabilities } => return probabilities,
            CompiledNode::Numeric { feature, threshold, left, right } => match &features[*feature] {
                FeatureColumn::Numeric(values) if values[row] <= *threshold => *left,
                _ => *right,
            },
            CompiledNode::Categorical { feature, goes_left, left, right } => match &features[*feature] {
                FeatureColumn::Categorical(values) if goes_left[values[row]] => *left,
                _ => *right,
            },
        };
    }
}

// Depth of the deepest leaf reachable from the root
fn tree_depth(tree: &[CompiledNode]) -> usize {
    let mut depth = vec![0usize; tree.len()];
    depth[0] = 1;
    let mut deepest = 0;
    for (i, node) in tree.iter().enumerate() {
        if depth[i] == 0 {
            continue;
        }
        match node {
            CompiledNode::Leaf { .. } => deepest = deepest.max(depth[i]),
            CompiledNode::Numeric { left, right, .. } | CompiledNode::Categorical { left, right, .. } => {
                depth[*left] = depth[*left].max(depth[i] + 1);
                depth[*right] = depth[*right].max(depth[i] + 1);
            }
        }
    }
    deepest
}

impl Classifier for RandomForestClassifier {
    fn classes(&self) -> &[String] {
        &self.model.classes
    }

    fn predict_proba(&self, features: &DataFrame) -> Result<DataFrame, ClassifierError> {
        let resolved = self.resolve_features(features)?;
        let n_rows = features.height();
        let n_classes = self.model.classes.len();
        let n_trees = self.trees.len() as f64;

        let mut per_class: Vec<Vec<f64>> = vec![Vec::with_capacity(n_rows); n_classes];
        for row in 0..n_rows {
            let mut acc = vec![0.0; n_classes];
            for tree in &self.trees {
                for (a, p) in acc.iter_mut().zip(walk(tree, &resolved, row)) {
                    *a += p;
                }
            }
            for (class, total) in acc.into_iter().enumerate() {
                per_class[class].push(total / n_trees);
            }
        }

        let columns: Vec<Column> = self
            .model
            .classes
            .iter()
            .zip(per_class)
            .map(|(class, probs)| Series::new(class.as_str().into(), probs).into())
            .collect();

        debug!("Scored {} rows with {} trees", n_rows, self.trees.len());
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use serde_json::json;

    fn toy_model() -> ForestModel {
        serde_json::from_value(json!({
            "classes": ["Negative", "Positive"],
            "features": [
                {"kind": "numeric", "name": "gc_content"},
                {"kind": "categorical", "name": "RNA_region", "levels": ["CDS", "intron", "3'UTR", "5'UTR"]}
            ],
            "trees": [
                [
                    {"type": "numeric_split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                    {"type": "leaf", "votes": [1.0, 0.0]},
                    {"type": "leaf", "votes": [0.0, 1.0]}
                ],
                [
                    {"type": "categorical_split", "feature": 1, "left_levels": ["3'UTR"], "left": 1, "right": 2},
                    {"type": "leaf", "votes": [1.0, 3.0]},
                    {"type": "leaf", "votes": [2.0, 0.0]}
                ]
            ]
        }))
        .unwrap()
    }

    #[test]
    fn forest_averages_tree_votes() {
        let forest = RandomForestClassifier::from_model(toy_model()).unwrap();
        let df = df![
            "gc_content" => &[0.7, 0.3, 0.5],
            "RNA_region" => &["3'UTR", "CDS", "3'UTR"]
        ]
        .unwrap();

        let probs = forest.predict_proba(&df).unwrap();
        let positive: Vec<f64> = probs.column("Positive").unwrap().f64().unwrap().into_no_null_iter().collect();
        let negative: Vec<f64> = probs.column("Negative").unwrap().f64().unwrap().into_no_null_iter().collect();

        // row 0: (1 + 0.75) / 2, row 1: (0 + 0) / 2, row 2: threshold is inclusive on the left
        assert_eq!(positive, vec![0.875, 0.0, 0.375]);
        for (p, n) in positive.iter().zip(&negative) {
            assert!((p + n - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn unmapped_and_unknown_levels_are_errors() {
        let forest = RandomForestClassifier::from_model(toy_model()).unwrap();

        let df = df![
            "gc_content" => &[0.7, 0.3],
            "RNA_region" => &[Some("CDS"), None]
        ]
        .unwrap();
        assert!(matches!(
            forest.predict_proba(&df),
            Err(ClassifierError::MissingValue { row: 1, .. })
        ));

        let df = df![
            "gc_content" => &[0.7],
            "RNA_region" => &["exon"]
        ]
        .unwrap();
        assert!(matches!(forest.predict_proba(&df), Err(ClassifierError::UnknownLevel { .. })));

        let df = df!["gc_content" => &[0.7]].unwrap();
        match forest.predict_proba(&df) {
            Err(ClassifierError::MissingFeature(name)) => assert_eq!(name, "RNA_region"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_backward_edges_and_foreign_levels() {
        let mut model = toy_model();
        model.trees[0][0] = TreeNode::NumericSplit { feature: 0, threshold: 0.5, left: 0, right: 2 };
        assert!(matches!(
            RandomForestClassifier::from_model(model),
            Err(ClassifierError::InvalidModel(_))
        ));

        let mut model = toy_model();
        model.trees[1][0] = TreeNode::CategoricalSplit {
            feature: 1,
            left_levels: vec!["UTR3".to_string()],
            left: 1,
            right: 2,
        };
        assert!(RandomForestClassifier::from_model(model).is_err());

        let mut model = toy_model();
        model.trees[0][1] = TreeNode::Leaf { votes: vec![1.0] };
        assert!(RandomForestClassifier::from_model(model).is_err());

        let mut model = toy_model();
        model.trees[0][0] = TreeNode::NumericSplit { feature: 1, threshold: 0.5, left: 1, right: 2 };
        assert!(RandomForestClassifier::from_model(model).is_err());
    }

    #[test]
    fn loads_from_json_file_and_describes_itself() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");
        std::fs::write(&path, serde_json::to_string_pretty(&toy_model()).unwrap()).unwrap();

        let forest = RandomForestClassifier::load(&path).unwrap();
        let summary = forest.describe();

        assert_eq!(summary.n_trees, 2);
        assert_eq!(summary.max_depth, 2);
        assert_eq!(summary.features, vec!["gc_content", "RNA_region"]);
        assert_eq!(forest.classes().to_vec(), vec!["Negative".to_string(), "Positive".to_string()]);
    }
}
