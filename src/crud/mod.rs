pub mod db;
pub mod generations;

pub use db::DB;
pub use generations::{GenerationErrorRow, GenerationRow};
