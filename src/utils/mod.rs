pub mod ids;
pub mod logging;

pub use ids::simple_uuid;
pub use logging::truncate_text;
