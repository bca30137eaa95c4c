pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod optimize;
pub mod orientation;
pub mod params;
pub mod resize;

pub use decode::{decode_with_format, read_metadata, ImageMeta};
pub use dimensions::{fit_within, shrink_to_max};
pub use encode::encode_image;
pub use optimize::{optimize_original, placeholder, webp_copy};
pub use orientation::{detect_orientation, Orientation};
pub use params::{content_type_for_ext, OutputFormat};
pub use resize::resize_image;
