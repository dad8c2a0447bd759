pub mod arxiv;
pub mod wiley;

pub use arxiv::ArxivExtractor;
pub use wiley::WileyExtractor;
