//! Configuration module for songbook
//!
//! Server settings are layered from defaults, an optional TOML file, the
//! environment and CLI flags. Filesystem locations live in [`Paths`].

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{Settings, UserStoreKind};

/// Form field carrying an uploaded song image
pub const SONG_IMAGE_FIELD: &str = "image";

/// Form field used by the standalone upload route
pub const UPLOAD_FILE_FIELD: &str = "audioFile";

/// URL prefix the public image directory is served under
pub const IMAGES_URL_PREFIX: &str = "/images";
