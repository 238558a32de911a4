//! Image intake and transport encoding.
//!
//! Everything between "a file on disk / bytes from a caller" and "a base64
//! payload a hosted API accepts" lives here.

pub mod intake;
pub mod mime_detect;
pub mod transport;

pub use intake::{decode, from_dynamic, load_image, read_image, MediaError};
pub use mime_detect::{detect_mime_type, sniff_format};
pub use transport::{
    from_transport, to_inline_transport, to_png_transport, to_transport, TransportImage,
};
