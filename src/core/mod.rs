pub mod model;
pub mod scaffold;
