// agrisight-core/src/domain/survey/mod.rs

pub mod geography;
pub mod record;
pub mod schema;

pub use geography::{CROPS, COUNTRIES, CountryProfile, GeoBounds, RegionProfile};
pub use record::{NumericField, SurveyRecord};
pub use schema::{FlatTable, ParsedRows, SURVEY_COLUMNS};
