pub mod acuity;
pub mod blend;
pub mod compositor;
pub mod eccentricity;
pub mod foveate;
pub mod inter_area;
pub mod kernel;
pub mod preprocess;
pub mod pyramid;
