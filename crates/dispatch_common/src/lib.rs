//! Shared library for the Ardence ticket dispatch predictor.
//!
//! The pipeline, leaf to root: raw assignee names normalize to canonical
//! [`Tech`] identities; a ticket's text fields compose into one feature
//! string; a fitted [`TfidfVectorizer`] turns that string into a sparse
//! vector; a [`RandomForest`] maps the vector to a distribution over
//! identities. The trainer fits and evaluates the pair offline and the
//! predictor serves it read-only.

pub mod artifact;
pub mod compose;
pub mod config;
pub mod error;
pub mod forest;
pub mod normalize;
pub mod persist;
pub mod predictor;
pub mod report;
pub mod ticket;
pub mod trainer;
pub mod vectorizer;

pub use artifact::ModelArtifact;
pub use compose::compose;
pub use config::DispatchConfig;
pub use error::{DispatchError, Result};
pub use forest::{ForestParams, RandomForest};
pub use normalize::Tech;
pub use predictor::{BatchPrediction, DispatchPredictor, Prediction};
pub use report::ClassificationReport;
pub use ticket::{load_tickets, Comment, Ticket, TicketFile, TicketUser};
pub use trainer::{train, TrainOutcome, TrainParams};
pub use vectorizer::{SparseVector, TfidfVectorizer};
