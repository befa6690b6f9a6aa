pub mod gbdt;
pub mod linear;
pub mod random_forest;
pub mod utils;

pub mod factory;
pub mod regressor_trait;
