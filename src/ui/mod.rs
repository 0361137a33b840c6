//! egui widgets: controls on the left, charts in the centre.

pub mod panels;
pub mod plot;
