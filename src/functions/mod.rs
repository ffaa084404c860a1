pub mod markdown;
pub mod static_asset;
pub mod url;
