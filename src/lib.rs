//! Item-item collaborative filtering over a dense user x item rating matrix.
//!
//! A [`ratings::RatingMatrix`] is turned into an item similarity table
//! ([`itemknn::similarity::SimilarityMatrix`]), which fills every unrated cell
//! with a similarity-weighted estimate ([`itemknn::prediction::PredictedMatrix`]).
//! [`recommend::Recommender`] ties both together and answers yes/no queries
//! for single (user, item) pairs.

pub mod config;
pub mod config_processors;
pub mod endpoints;
pub mod error;
pub mod holdout;
pub mod io;
pub mod itemknn;
pub mod logging;
pub mod metrics;
pub mod ratings;
pub mod recommend;
pub mod stopwatch;
