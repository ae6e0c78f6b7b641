//! Domain models and wire types.
//!
//! Row types (`*Row`) mirror database columns; view types are what handlers
//! serialize into the response envelope.

pub mod lookup;
pub mod product;
pub mod tag;
pub mod user;

pub use lookup::StateRecord;
pub use product::{
    IMAGE_PLACEHOLDER_URL, InvalidProduct, Product, ProductInput, ProductPayload, ProductRow,
};
pub use tag::{ProductTagRow, TagDetail, TagSummary, normalize_tag_name};
pub use user::CurrentUser;
