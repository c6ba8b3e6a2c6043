pub mod tgtg;
pub mod traits;
pub mod types;

pub use tgtg::TgtgClient;
pub use traits::FavoritesSource;
pub use types::RawFavorite;
