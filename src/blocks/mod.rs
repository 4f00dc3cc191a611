//! Day-content block model: schema, storage encoding, and the rules that turn
//! whatever is stored in a day's `content` column back into a usable block list.
//!
//! Everything here is synchronous and free of I/O.

pub mod history;
pub mod parse;
pub mod prompt;
pub mod prune;
pub mod resolve;
pub mod schema;
pub mod serialize;

pub use parse::{normalize_blocks, parse_day_content};
pub use prompt::{discussion_prompt_or_default, extract_discussion_prompt};
pub use prune::{legacy_video_url, prune_for_save};
pub use resolve::{resolve_primary_resource, PrimaryResource};
pub use schema::{create_block, BlockType, DayBlock};
pub use serialize::serialize_day_content;
