pub mod college;
pub mod forecast;
pub mod types;

pub use college::college_cmd;
pub use forecast::forecast_cmd;
