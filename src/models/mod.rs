pub mod article;
pub mod section;

pub use article::*;
pub use section::*;

// Embed branding matching the original board watcher
pub const EMOJI_PIN: &str = "📌";
pub const GOLD: u32 = 15844367;
pub const DEFAULT_USERNAME: &str = "7DS Origins • Veille";
pub const FALLBACK_DESCRIPTION: &str = "Nouveau post détecté sur le site officiel.";
pub const NEW_POST_SUFFIX: &str = "Nouveau post";
