pub mod review_item;

pub use review_item::{parse_tag_list, EditDraft, ReviewItem};
