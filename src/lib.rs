//! Temperature logger reports.
//!
//! A raw logger export is cleaned line by line ([`data::sanitize`]), parsed
//! into a [`data::model::LoggerTable`], summarized per sensor
//! ([`data::stats`]) and turned into figures ([`figure`]) that are written to
//! disk ([`report`]) or shown in the viewer window ([`app`]).

pub mod app;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod pipeline;
pub mod report;
pub mod state;
pub mod ui;
