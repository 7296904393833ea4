//! Integration tests: the full candidate pipeline and open-price
//! persistence across simulated restarts.

mod fixtures;
mod pipeline;
mod restart;
