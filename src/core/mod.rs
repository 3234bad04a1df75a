pub mod gamma;
pub mod history;
pub mod pricing;
pub mod ranking;
