pub mod batch;
pub mod classifier;
pub mod random_forest;
pub mod single;

pub use batch::{encode_features, predict_batch, DEFAULT_POSITIVE_THRESHOLD};
pub use classifier::{Classifier, POSITIVE_CLASS};
pub use random_forest::{ForestModel, ForestSummary, RandomForestClassifier};
pub use single::{predict_single, record_to_frame};
