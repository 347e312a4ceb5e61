//! # Integration Scenarios

pub mod fixtures;

#[cfg(test)]
mod decode_flow;
#[cfg(test)]
mod scan_flow;
#[cfg(test)]
mod signing_flow;
#[cfg(test)]
mod trust_flow;
