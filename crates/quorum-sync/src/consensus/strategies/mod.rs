//! Concrete agreement rules, cheapest first.

pub mod fallback;
pub mod hyperedge;
pub mod majority;
pub mod triangle;

pub use fallback::LinkFallback;
pub use hyperedge::UniformHyperedge;
pub use majority::MajorityGraph;
pub use triangle::TriangleQuorum;
